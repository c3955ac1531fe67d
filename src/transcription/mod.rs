//! Speech-to-text client abstraction.
//!
//! The pipeline talks to a [`Transcriber`]; production uses
//! [`WhisperApiClient`], tests plug in their own implementations.

pub mod openai;

pub use openai::WhisperApiClient;

use async_trait::async_trait;
use std::fmt;

/// Opaque API key supplied by the user for a single request.
///
/// Never serialized, and redacted in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct TranscriptionCredential(String);

impl TranscriptionCredential {
    /// Returns `None` for empty or whitespace-only input
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        let trimmed = secret.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TranscriptionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TranscriptionCredential(<redacted>)")
    }
}

/// Readable handle on the stored upload plus what the API needs to know about it
#[derive(Debug)]
pub struct TranscriptionInput {
    pub file: tokio::fs::File,
    pub length: u64,
    /// Original upload filename; the API infers the container from it
    pub filename: String,
    pub mime_type: String,
}

/// Any failure of the external call, carried as a single message.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TranscriptionError {
    message: String,
}

impl TranscriptionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for TranscriptionError {
    fn from(err: reqwest::Error) -> Self {
        TranscriptionError::new(err.to_string())
    }
}

/// One blocking (from the caller's view) transcription attempt
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the file to plain text. Single attempt, no partial results.
    async fn transcribe(
        &self,
        credential: &TranscriptionCredential,
        input: TranscriptionInput,
    ) -> Result<String, TranscriptionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_credential_is_missing() {
        assert!(TranscriptionCredential::new("").is_none());
        assert!(TranscriptionCredential::new("   \n").is_none());
    }

    #[test]
    fn test_credential_is_trimmed() {
        let credential = TranscriptionCredential::new("  sk-test\n").unwrap();
        assert_eq!(credential.expose(), "sk-test");
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = TranscriptionCredential::new("sk-very-secret").unwrap();
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_error_display_is_the_message() {
        let err = TranscriptionError::new("Rate limit reached");
        assert_eq!(err.to_string(), "Rate limit reached");
        assert_eq!(err.message(), "Rate limit reached");
    }
}
