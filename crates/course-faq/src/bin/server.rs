//! Course FAQ server binary
//!
//! Run with: cargo run -p course-faq --bin course-faq-server -- --config faq.toml

use clap::Parser;
use std::path::PathBuf;

use course_faq::{
    config::FaqConfig, providers::ProviderKind, secrets::LayeredSecrets, server::FaqServer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "course-faq-server", version, about = "Document-grounded course FAQ assistant")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "COURSE_FAQ_CONFIG")]
    config: Option<PathBuf>,

    /// TOML secrets file (POE_API_KEY = "...")
    #[arg(long, env = "COURSE_FAQ_SECRETS")]
    secrets: Option<PathBuf>,

    /// Bind address
    #[arg(long)]
    host: Option<String>,

    /// Port
    #[arg(short, long)]
    port: Option<u16>,

    /// Completion backend: poe, openai, together, zhipu, ollama, rule_based
    #[arg(long)]
    provider: Option<ProviderKind>,

    /// Model name for the selected backend
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "course_faq=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => FaqConfig::from_file(path)?,
        None => FaqConfig::default(),
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(provider) = args.provider {
        config.completion.provider = provider;
    }
    if args.model.is_some() {
        config.completion.model = args.model;
    }
    if args.secrets.is_some() {
        config.secrets_path = args.secrets;
    }
    config.validate()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Provider: {}", config.completion.provider);
    tracing::info!("  - Model: {}", config.completion.model_name());
    tracing::info!("  - Course: {}", config.course.display_name());
    tracing::info!(
        "  - Chunking: {} chars, {} overlap",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );

    let secrets_file = config.secrets_file();
    let secrets = LayeredSecrets::file_then_env(secrets_file.as_deref())?;

    let server = FaqServer::new(config, &secrets)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
