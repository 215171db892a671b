//! Per-user session context: the loaded document, chat transcript and last answer

use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{ChatMessage, Document, SessionSummary, Transcript};

/// State owned by one session.
///
/// Accessors hand out clones; no lock is ever held across an `.await`.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    created_at: chrono::DateTime<chrono::Utc>,
    document: RwLock<Option<Arc<Document>>>,
    transcript: RwLock<Transcript>,
    last_answer: RwLock<Option<String>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            document: RwLock::new(None),
            transcript: RwLock::new(Transcript::new()),
            last_answer: RwLock::new(None),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
    }

    /// Currently loaded document
    pub fn document(&self) -> Option<Arc<Document>> {
        self.document.read().clone()
    }

    /// Replace the loaded document; returns the one it replaced
    pub fn set_document(&self, document: Document) -> Option<Arc<Document>> {
        let previous = self.document.write().replace(Arc::new(document));
        if let Some(prev) = &previous {
            tracing::info!(session = %self.id, "Replaced document {}", prev.filename);
        }
        previous
    }

    pub fn transcript(&self) -> Transcript {
        self.transcript.read().clone()
    }

    pub fn push_message(&self, message: ChatMessage) {
        self.transcript.write().push(message);
    }

    pub fn clear_transcript(&self) {
        self.transcript.write().clear();
    }

    /// Most recent answer shown to the user (FAQ or chat)
    pub fn last_answer(&self) -> Option<String> {
        self.last_answer.read().clone()
    }

    pub fn set_last_answer(&self, answer: impl Into<String>) {
        *self.last_answer.write() = Some(answer.into());
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id,
            document: self.document.read().as_ref().map(|d| d.filename.clone()),
            messages: self.transcript.read().len(),
            has_answer: self.last_answer.read().is_some(),
            created_at: self.created_at,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Default bound on live sessions
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

/// In-memory session registry, bounded by evicting the oldest session
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<Uuid, Arc<Session>>,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Start a new, empty session
    pub fn create(&self) -> Arc<Session> {
        while self.sessions.len() >= self.max_sessions {
            if !self.evict_oldest() {
                break;
            }
        }

        let session = Arc::new(Session::new());
        self.sessions.insert(session.id(), Arc::clone(&session));
        tracing::info!(session = %session.id(), "Session created");
        session
    }

    pub fn get(&self, id: &Uuid) -> Result<Arc<Session>> {
        self.sessions
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))
    }

    pub fn remove(&self, id: &Uuid) -> Result<()> {
        self.sessions
            .remove(id)
            .map(|_| tracing::info!(session = %id, "Session removed"))
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))
    }

    /// Drop the session created first; false when the store is empty
    fn evict_oldest(&self) -> bool {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|entry| entry.value().created_at())
            .map(|entry| *entry.key());

        match oldest {
            Some(id) => {
                self.sessions.remove(&id);
                tracing::info!(session = %id, "Session evicted (limit {})", self.max_sessions);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
