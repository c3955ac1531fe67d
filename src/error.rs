//! Error taxonomy for the transcription pipeline and its HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::api::models::ApiResponse;
use crate::transcription::TranscriptionError;

/// Result type for pipeline and API operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Errors reported back to the user as an inline message
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// No file or no credential was supplied; nothing was started
    #[error("Missing input: {0}")]
    InputMissing(String),

    /// The upload's extension is not one the transcription API accepts
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// Any failure from the external transcription call
    #[error("Transcription failed: {0}")]
    TranscriptionFailure(String),

    /// Request body is larger than the configured upload limit (bytes)
    #[error("Upload exceeds the limit of {0} bytes ({})", megabytes(.0))]
    UploadTooLarge(usize),

    /// Scratch file write/read or upload read error
    #[error("Error processing file: {0}")]
    LocalProcessingFailure(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Download requested before any transcription succeeded in the session
    #[error("No transcription available for this session")]
    ResultAbsent,
}

fn megabytes(bytes: &usize) -> String {
    format!("{:.2} MB", *bytes as f64 / (1024.0 * 1024.0))
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InputMissing(_) => StatusCode::BAD_REQUEST,
            AppError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::UploadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::TranscriptionFailure(_) => StatusCode::BAD_GATEWAY,
            AppError::LocalProcessingFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SessionNotFound(_) | AppError::ResultAbsent => StatusCode::NOT_FOUND,
        }
    }
}

impl From<TranscriptionError> for AppError {
    fn from(err: TranscriptionError) -> Self {
        AppError::TranscriptionFailure(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::LocalProcessingFailure(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::InputMissing("file".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::TranscriptionFailure("401".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(AppError::ResultAbsent.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::UploadTooLarge(1024).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_upload_too_large_names_the_limit() {
        let err = AppError::UploadTooLarge(32 * 1024 * 1024);
        assert_eq!(
            err.to_string(),
            "Upload exceeds the limit of 33554432 bytes (32.00 MB)"
        );
    }

    #[test]
    fn test_transcription_error_conversion_keeps_message() {
        let err: AppError = TranscriptionError::new("Incorrect API key provided").into();
        assert!(matches!(err, AppError::TranscriptionFailure(_)));
        assert!(err.to_string().contains("Incorrect API key provided"));
    }

    #[test]
    fn test_io_error_is_local_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::LocalProcessingFailure(_)));
    }
}
