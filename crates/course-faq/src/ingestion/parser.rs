//! Text extraction from uploaded PDF, DOCX, TXT and CSV files

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::{Document, FileType};

/// Upper bound on a single pdf-extract run before falling back to lopdf
const PDF_EXTRACT_TIMEOUT: Duration = Duration::from_secs(60);

/// Run `work` on its own thread and wait at most `timeout` for the result.
///
/// A panic in `work` comes back as `Disconnected`; this needs the unwinding panic
/// strategy, so release builds must not set `panic = "abort"`. On `Timeout` the thread
/// is detached and runs to completion in the background, since std threads cannot be
/// cancelled.
fn run_in_worker<T, F>(timeout: Duration, work: F) -> std::result::Result<T, mpsc::RecvTimeoutError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(work());
    });
    rx.recv_timeout(timeout)
}

/// Turns an uploaded file into one UTF-8 text blob
pub struct TextExtractor;

impl TextExtractor {
    /// Extract text based on the filename's extension
    pub fn extract(filename: &str, data: &[u8]) -> Result<Document> {
        let file_type = FileType::from_filename(filename);

        let text = match file_type {
            FileType::Pdf => Self::parse_pdf(filename, data)?,
            FileType::Docx => Self::parse_docx(filename, data)?,
            FileType::Txt => Self::parse_text(data),
            FileType::Csv => Self::parse_csv(filename, data)?,
            FileType::Unknown => {
                let ext = filename.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
                return Err(Error::UnsupportedFileType(format!(
                    "'{}' - please upload PDF, DOCX, TXT, or CSV",
                    ext
                )));
            }
        };

        if text.trim().is_empty() {
            return Err(Error::extraction(filename, "no text content could be extracted"));
        }

        tracing::info!(
            "Extracted {} characters from {} ({})",
            text.chars().count(),
            filename,
            file_type.display_name()
        );

        Ok(Document::new(filename, file_type, text))
    }

    /// Parse PDF document
    fn parse_pdf(filename: &str, data: &[u8]) -> Result<String> {
        let content = Self::extract_pdf_with_timeout(filename, data)?;

        let content = content
            .replace('\0', "")
            .replace('\u{00A0}', " ")
            .replace('\u{FB01}', "fi")
            .replace('\u{FB02}', "fl");

        Ok(content
            .lines()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string())
    }

    /// pdf-extract in a worker thread; it can hang on unusual fonts or panic on
    /// malformed input, and either way the lopdf fallback takes over.
    fn extract_pdf_with_timeout(filename: &str, data: &[u8]) -> Result<String> {
        let data_vec = data.to_vec();
        let outcome = run_in_worker(PDF_EXTRACT_TIMEOUT, move || {
            pdf_extract::extract_text_from_mem(&data_vec)
        });

        match outcome {
            Ok(Ok(text)) if !text.trim().is_empty() => Ok(text),
            Ok(Ok(_)) => {
                tracing::warn!("pdf-extract produced no text for {}, trying lopdf", filename);
                Self::extract_pdf_text_fallback(filename, data)
            }
            Ok(Err(e)) => {
                tracing::warn!("pdf-extract failed for {}: {}, trying lopdf", filename, e);
                Self::extract_pdf_text_fallback(filename, data)
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::error!(
                    "PDF extraction timeout after {:?} for {}",
                    PDF_EXTRACT_TIMEOUT,
                    filename
                );
                Self::extract_pdf_text_fallback(filename, data)
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                tracing::error!("PDF extraction thread crashed for {}", filename);
                Self::extract_pdf_text_fallback(filename, data)
            }
        }
    }

    /// Page-by-page text via lopdf, pages joined by blank lines
    fn extract_pdf_text_fallback(filename: &str, data: &[u8]) -> Result<String> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::extraction(filename, format!("failed to load PDF: {}", e)))?;

        let mut pages = Vec::new();
        for page_number in doc.get_pages().keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(text) => pages.push(text),
                Err(e) => {
                    tracing::debug!("Could not extract page {} of {}: {}", page_number, filename, e);
                    pages.push(String::new());
                }
            }
        }

        let text = pages.join("\n\n");
        if text.trim().is_empty() {
            return Err(Error::extraction(
                filename,
                "PDF appears to be image-based or has no extractable text",
            ));
        }
        Ok(text)
    }

    /// Parse DOCX document: one line per paragraph
    fn parse_docx(filename: &str, data: &[u8]) -> Result<String> {
        let doc = docx_rs::read_docx(data).map_err(|e| Error::extraction(filename, e.to_string()))?;

        let mut paragraphs = Vec::new();
        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                let mut line = String::new();
                for child in p.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                line.push_str(&t.text);
                            }
                        }
                    }
                }
                paragraphs.push(line);
            }
        }

        Ok(paragraphs.join("\n"))
    }

    /// Parse plain text, dropping undecodable bytes
    fn parse_text(data: &[u8]) -> String {
        let data = strip_bom(data);
        String::from_utf8_lossy(data)
            .chars()
            .filter(|c| *c != char::REPLACEMENT_CHARACTER)
            .collect()
    }

    /// Parse CSV and render it as an aligned table without an index column
    fn parse_csv(filename: &str, data: &[u8]) -> Result<String> {
        let decoded = decode_utf8_or_latin1(data);

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(decoded.as_bytes());

        let mut rows: Vec<Vec<String>> = Vec::new();

        let headers = reader
            .headers()
            .map_err(|e| Error::extraction(filename, format!("invalid CSV header: {}", e)))?;
        rows.push(headers.iter().map(|h| h.trim().to_string()).collect());

        for record in reader.records() {
            let record =
                record.map_err(|e| Error::extraction(filename, format!("invalid CSV row: {}", e)))?;
            rows.push(record.iter().map(|c| c.trim().to_string()).collect());
        }

        Ok(render_table(&rows))
    }
}

fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data)
}

/// UTF-8 (BOM stripped) when valid, otherwise every byte read as Latin-1
fn decode_utf8_or_latin1(data: &[u8]) -> String {
    let data = strip_bom(data);
    match std::str::from_utf8(data) {
        Ok(s) => s.to_string(),
        Err(_) => {
            tracing::debug!("CSV is not valid UTF-8, decoding as Latin-1");
            data.iter().map(|&b| b as char).collect()
        }
    }
}

/// Right-aligned columns separated by a single space
fn render_table(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    rows.iter()
        .map(|row| {
            (0..columns)
                .map(|i| {
                    let cell = row.get(i).map(String::as_str).unwrap_or("");
                    format!("{:>width$}", cell, width = widths[i])
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txt_extraction() {
        let doc = TextExtractor::extract(
            "policy.txt",
            "\u{FEFF}The refund deadline is March 3.".as_bytes(),
        )
        .unwrap();
        assert_eq!(doc.text, "The refund deadline is March 3.");
        assert_eq!(doc.file_type, FileType::Txt);
        assert_eq!(doc.filename, "policy.txt");
    }

    #[test]
    fn test_txt_drops_invalid_bytes() {
        let doc = TextExtractor::extract("a.txt", b"caf\xff rules").unwrap();
        assert_eq!(doc.text, "caf rules");
    }

    #[test]
    fn test_csv_rendered_as_table() {
        let data = b"country,gdp\nQatar,87661\nOman,20150\n";
        let doc = TextExtractor::extract("gdp.csv", data).unwrap();
        assert_eq!(doc.text, "country   gdp\n  Qatar 87661\n   Oman 20150");
    }

    #[test]
    fn test_csv_latin1_fallback() {
        let data = b"name,city\nJos\xe9,Doha\n";
        let doc = TextExtractor::extract("people.csv", data).unwrap();
        assert!(doc.text.contains("José"));
    }

    #[test]
    fn test_unsupported_type() {
        let err = TextExtractor::extract("slides.pptx", b"PK").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFileType(_)));
    }

    #[test]
    fn test_empty_text_is_extraction_error() {
        let err = TextExtractor::extract("blank.txt", b"   \n ").unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }

    #[test]
    fn test_garbage_pdf_is_extraction_error() {
        let err = TextExtractor::extract("broken.pdf", b"not a pdf at all").unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }

    #[test]
    fn test_garbage_docx_is_extraction_error() {
        let err = TextExtractor::extract("broken.docx", b"not a zip").unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }

    #[test]
    fn test_worker_panic_is_recoverable() {
        let outcome = run_in_worker(Duration::from_secs(5), || -> String {
            panic!("unsupported font encoding")
        });
        assert_eq!(outcome.unwrap_err(), mpsc::RecvTimeoutError::Disconnected);

        // The caller keeps working after the worker died
        let outcome = run_in_worker(Duration::from_secs(5), || 42);
        assert_eq!(outcome.unwrap(), 42);
    }

    #[test]
    fn test_worker_timeout_returns_without_waiting() {
        let outcome = run_in_worker(Duration::from_millis(50), || {
            thread::sleep(Duration::from_secs(2));
        });
        assert_eq!(outcome.unwrap_err(), mpsc::RecvTimeoutError::Timeout);
    }
}
