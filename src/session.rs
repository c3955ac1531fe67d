use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::media;
use crate::subtitle;

/// Number of characters shown in the transcript preview
pub const PREVIEW_CHARS: usize = 500;

/// Identifier of one interactive browser session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(SessionId)
            .map_err(|_| AppError::SessionNotFound(s.to_string()))
    }
}

/// Last successful transcription of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResult {
    transcript: String,
    source_filename: String,
    /// Upload size as shown to the user, e.g. `1.50 MB`
    source_size: Option<String>,
    source_content_type: Option<String>,
    completed_at: DateTime<Utc>,
}

impl TranscriptResult {
    pub fn new(transcript: String, source_filename: impl Into<String>) -> Self {
        Self {
            transcript,
            source_filename: source_filename.into(),
            source_size: None,
            source_content_type: None,
            completed_at: Utc::now(),
        }
    }

    /// Attach the upload details shown next to the transcript
    pub fn with_source_details(mut self, size: impl Into<String>, content_type: impl Into<String>) -> Self {
        self.source_size = Some(size.into());
        self.source_content_type = Some(content_type.into());
        self
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn source_filename(&self) -> &str {
        &self.source_filename
    }

    pub fn source_size(&self) -> Option<&str> {
        self.source_size.as_deref()
    }

    pub fn source_content_type(&self) -> Option<&str> {
        self.source_content_type.as_deref()
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    pub fn char_count(&self) -> usize {
        self.transcript.chars().count()
    }

    /// First [`PREVIEW_CHARS`] characters, with `...` appended when truncated
    pub fn preview(&self) -> String {
        if self.char_count() > PREVIEW_CHARS {
            let head: String = self.transcript.chars().take(PREVIEW_CHARS).collect();
            format!("{}...", head)
        } else {
            self.transcript.clone()
        }
    }

    pub fn transcript_filename(&self) -> String {
        media::transcript_filename(&self.source_filename)
    }

    pub fn subtitle_filename(&self) -> String {
        media::subtitle_filename(&self.source_filename)
    }

    /// Subtitle document, rebuilt on every call
    pub fn subtitle(&self) -> String {
        subtitle::to_subtitle(&self.transcript)
    }
}

#[derive(Debug)]
struct SessionEntry {
    result: Option<TranscriptResult>,
    last_seen: Instant,
    in_flight: Arc<AtomicUsize>,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            result: None,
            last_seen: Instant::now(),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }
}

/// Marks a request as running in its session. The idle sweeper leaves busy
/// sessions alone; dropping the guard (on any exit path) clears the mark.
#[derive(Debug)]
pub struct ActiveRequest {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for ActiveRequest {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Per-session result holders, keyed by session id.
///
/// Sessions never share entries. Cloning the store shares the same map.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionEntry>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Open a new, empty session
    pub async fn create(&self) -> SessionId {
        let id = SessionId::new();
        self.sessions.write().await.insert(id, SessionEntry::new());
        debug!("Opened session {}", id);
        id
    }

    pub async fn exists(&self, id: SessionId) -> bool {
        self.sessions.read().await.contains_key(&id)
    }

    /// Refresh the session and mark a request as in flight until the
    /// returned guard is dropped
    pub async fn begin_request(&self, id: SessionId) -> Result<ActiveRequest> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::SessionNotFound(id.to_string()))?;
        entry.last_seen = Instant::now();
        entry.in_flight.fetch_add(1, Ordering::SeqCst);
        Ok(ActiveRequest {
            in_flight: Arc::clone(&entry.in_flight),
        })
    }

    /// Current result, or `None` when nothing has succeeded yet
    pub async fn get(&self, id: SessionId) -> Result<Option<TranscriptResult>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::SessionNotFound(id.to_string()))?;
        entry.last_seen = Instant::now();
        Ok(entry.result.clone())
    }

    /// Replace the session's result (last write wins)
    pub async fn set(&self, id: SessionId, result: TranscriptResult) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::SessionNotFound(id.to_string()))?;
        entry.last_seen = Instant::now();
        entry.result = Some(result);
        Ok(())
    }

    /// Tear down a session. Returns false if it did not exist.
    pub async fn end(&self, id: SessionId) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            debug!("Closed session {}", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Tear down sessions idle for at least the idle timeout. Sessions with a
    /// request in flight are never idle.
    pub async fn sweep_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let idle_timeout = self.idle_timeout;
        sessions.retain(|_, entry| entry.is_busy() || entry.last_seen.elapsed() < idle_timeout);
        let removed = before - sessions.len();
        if removed > 0 {
            info!("🧹 Closed {} idle session(s)", removed);
        }
        removed
    }

    /// Periodically sweep idle sessions in the background
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                store.sweep_idle().await;
            }
        })
    }
}
