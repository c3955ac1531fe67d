//! Transcritor
//!
//! Web service that sends a short audio/video upload to the OpenAI Whisper
//! API with the user's own key and offers the transcript as plain text or as
//! a WebVTT subtitle file.

pub mod api;
pub mod config;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod scratch;
pub mod session;
pub mod subtitle;
pub mod transcription;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::AppError;
pub use crate::media::{SupportedFormat, UploadedMedia};
pub use crate::pipeline::{PipelineStage, TranscriptionPipeline};
pub use crate::scratch::{ScratchFile, ScratchStore};
pub use crate::session::{SessionId, SessionStore, TranscriptResult};
pub use crate::subtitle::{to_subtitle, SubtitleDocument};
pub use crate::transcription::{
    Transcriber, TranscriptionCredential, TranscriptionError, TranscriptionInput, WhisperApiClient,
};
