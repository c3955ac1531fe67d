//! API data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{SessionId, TranscriptResult};

/// API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Liveness information
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Returned when a session is opened
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionCreated {
    pub session_id: SessionId,
}

/// A downloadable artifact of the current transcript
#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadLink {
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Downloads {
    pub txt: DownloadLink,
    pub vtt: DownloadLink,
}

/// What the result view shows after a successful transcription
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptSummary {
    pub filename: String,
    /// Upload size, e.g. `1.50 MB`
    pub size: Option<String>,
    pub content_type: Option<String>,
    pub characters: usize,
    pub preview: String,
    pub completed_at: DateTime<Utc>,
    pub downloads: Downloads,
}

impl TranscriptSummary {
    pub fn from_result(session: SessionId, result: &TranscriptResult) -> Self {
        let base = format!("/api/sessions/{}/transcript", session);
        Self {
            filename: result.source_filename().to_string(),
            size: result.source_size().map(str::to_owned),
            content_type: result.source_content_type().map(str::to_owned),
            characters: result.char_count(),
            preview: result.preview(),
            completed_at: result.completed_at(),
            downloads: Downloads {
                txt: DownloadLink {
                    filename: result.transcript_filename(),
                    url: format!("{}.txt", base),
                },
                vtt: DownloadLink {
                    filename: result.subtitle_filename(),
                    url: format!("{}.vtt", base),
                },
            },
        }
    }
}

/// A file handed to the browser as an attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}
