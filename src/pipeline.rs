//! Upload → store → transcribe → clean up, for one request.

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::{AppError, Result};
use crate::media::{SupportedFormat, UploadedMedia};
use crate::scratch::{ScratchFile, ScratchStore};
use crate::session::{SessionId, SessionStore, TranscriptResult};
use crate::transcription::{Transcriber, TranscriptionCredential, TranscriptionInput};

/// Stages a single transcription request moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    MediaReceived,
    Storing,
    Transcribing,
    Succeeded,
    Failed,
    /// Scratch file removed; reached from both outcomes
    CleanedUp,
}

/// Runs transcription requests against a [`Transcriber`]
#[derive(Clone)]
pub struct TranscriptionPipeline {
    scratch: ScratchStore,
    transcriber: Arc<dyn Transcriber>,
}

impl TranscriptionPipeline {
    pub fn new(scratch: ScratchStore, transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            scratch,
            transcriber,
        }
    }

    /// Transcribe one upload and store the result in the session.
    ///
    /// Nothing is written and no API call is made unless both the credential
    /// and the media are present. On failure the session's previous result is
    /// left untouched. The scratch file is gone when this returns.
    pub async fn run(
        &self,
        sessions: &SessionStore,
        session: SessionId,
        credential: Option<TranscriptionCredential>,
        media: Option<UploadedMedia>,
    ) -> Result<TranscriptResult> {
        let _active = sessions.begin_request(session).await?;

        let (credential, media) = match (credential, media) {
            (Some(credential), Some(media)) => (credential, media),
            (None, _) => return Err(AppError::InputMissing("OpenAI API key".to_string())),
            (_, None) => return Err(AppError::InputMissing("file to transcribe".to_string())),
        };
        enter(PipelineStage::MediaReceived, session);

        let format = media.format().ok_or_else(|| {
            AppError::UnsupportedFormat(format!(
                "{} (supported: {})",
                media.filename(),
                SupportedFormat::accepted_list()
            ))
        })?;

        let filename = media.filename().to_string();
        let size = media.size_mb();
        let mime_type = media
            .content_type()
            .unwrap_or(format.default_mime())
            .to_string();
        info!("🎬 Received {} ({}, {})", filename, size, mime_type);

        enter(PipelineStage::Storing, session);
        let mut scratch = self.scratch.store(media.into_bytes(), format.extension()).await?;

        let outcome = match self
            .transcribe_stored(&credential, &scratch, filename.clone(), mime_type.clone(), session)
            .await
        {
            Ok(text) => {
                enter(PipelineStage::Succeeded, session);
                let result = TranscriptResult::new(text, filename).with_source_details(size, mime_type);
                sessions.set(session, result.clone()).await.map(|_| result)
            }
            Err(e) => {
                enter(PipelineStage::Failed, session);
                error!("❌ Transcription of {} failed: {}", filename, e);
                Err(e)
            }
        };

        scratch.release();
        enter(PipelineStage::CleanedUp, session);
        enter(PipelineStage::Idle, session);

        outcome
    }

    async fn transcribe_stored(
        &self,
        credential: &TranscriptionCredential,
        scratch: &ScratchFile,
        filename: String,
        mime_type: String,
        session: SessionId,
    ) -> Result<String> {
        let file = tokio::fs::File::open(scratch.path()).await?;
        let length = file.metadata().await?.len();

        enter(PipelineStage::Transcribing, session);
        let input = TranscriptionInput {
            file,
            length,
            filename,
            mime_type,
        };

        Ok(self.transcriber.transcribe(credential, input).await?)
    }
}

fn enter(stage: PipelineStage, session: SessionId) {
    debug!("Session {} pipeline stage: {:?}", session, stage);
}
