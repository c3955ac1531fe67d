//! API request handlers

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use tracing::debug;

use super::models::{Download, HealthStatus, SessionCreated, TranscriptSummary};
use crate::error::{AppError, Result};
use crate::media::UploadedMedia;
use crate::pipeline::TranscriptionPipeline;
use crate::session::{SessionId, SessionStore};
use crate::transcription::TranscriptionCredential;

/// Multipart field carrying the user's API key
pub const CREDENTIAL_FIELD: &str = "api_key";

/// Multipart field carrying the media file
pub const FILE_FIELD: &str = "file";

pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
pub const VTT_CONTENT_TYPE: &str = "text/vtt; charset=utf-8";

/// Handle health check requests
pub fn health_check() -> HealthStatus {
    HealthStatus {
        status: "healthy".to_string(),
        service: "transcritor".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    }
}

pub async fn create_session(sessions: &SessionStore) -> SessionCreated {
    SessionCreated {
        session_id: sessions.create().await,
    }
}

pub async fn end_session(sessions: &SessionStore, session: SessionId) -> Result<()> {
    if sessions.end(session).await {
        Ok(())
    } else {
        Err(AppError::SessionNotFound(session.to_string()))
    }
}

/// Read the credential and the file out of the upload form.
///
/// Unknown fields are ignored. A file field without a filename and without
/// content (what browsers send when nothing was picked) counts as absent.
/// A body over `max_upload_bytes` is reported as [`AppError::UploadTooLarge`].
pub async fn read_upload(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> Result<(Option<TranscriptionCredential>, Option<UploadedMedia>)> {
    let read_error = |err: MultipartError| upload_error(err, max_upload_bytes);

    let mut credential = None;
    let mut media = None;

    while let Some(field) = multipart.next_field().await.map_err(read_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(CREDENTIAL_FIELD) => {
                let secret = field.text().await.map_err(read_error)?;
                credential = TranscriptionCredential::new(secret);
            }
            Some(FILE_FIELD) => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(|ct| ct.to_string());
                let bytes = field.bytes().await.map_err(read_error)?;

                if filename.is_empty() && bytes.is_empty() {
                    continue;
                }
                media = Some(UploadedMedia::new(bytes.to_vec(), filename, content_type));
            }
            other => debug!("Ignoring upload field {:?}", other),
        }
    }

    Ok((credential, media))
}

fn upload_error(err: MultipartError, max_upload_bytes: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::UploadTooLarge(max_upload_bytes)
    } else {
        AppError::LocalProcessingFailure(format!("Failed to read upload: {}", err.body_text()))
    }
}

/// Run the pipeline and summarize the new result
pub async fn transcribe(
    pipeline: &TranscriptionPipeline,
    sessions: &SessionStore,
    session: SessionId,
    credential: Option<TranscriptionCredential>,
    media: Option<UploadedMedia>,
) -> Result<TranscriptSummary> {
    let result = pipeline.run(sessions, session, credential, media).await?;
    Ok(TranscriptSummary::from_result(session, &result))
}

/// Summary of the session's current result
pub async fn transcript_summary(sessions: &SessionStore, session: SessionId) -> Result<TranscriptSummary> {
    let result = sessions.get(session).await?.ok_or(AppError::ResultAbsent)?;
    Ok(TranscriptSummary::from_result(session, &result))
}

/// Raw transcript as `<stem>_transcricao.txt`
pub async fn download_text(sessions: &SessionStore, session: SessionId) -> Result<Download> {
    let result = sessions.get(session).await?.ok_or(AppError::ResultAbsent)?;
    Ok(Download {
        filename: result.transcript_filename(),
        content_type: TEXT_CONTENT_TYPE,
        body: result.transcript().to_string(),
    })
}

/// Single-cue WebVTT document as `<stem>_legendas.vtt`
pub async fn download_subtitle(sessions: &SessionStore, session: SessionId) -> Result<Download> {
    let result = sessions.get(session).await?.ok_or(AppError::ResultAbsent)?;
    Ok(Download {
        filename: result.subtitle_filename(),
        content_type: VTT_CONTENT_TYPE,
        body: result.subtitle(),
    })
}

/// `Content-Disposition` value with an ASCII fallback and the UTF-8 name
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TranscriptResult;
    use std::time::Duration;

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition("lecture_transcricao.txt"),
            "attachment; filename=\"lecture_transcricao.txt\"; filename*=UTF-8''lecture_transcricao.txt"
        );
    }

    #[test]
    fn test_content_disposition_escapes_unsafe_names() {
        let header = content_disposition("aula \"1\" ção_legendas.vtt");
        assert!(header.contains("filename=\"aula _1_ __o_legendas.vtt\""));
        assert!(header.contains("filename*=UTF-8''aula%20%221%22%20%C3%A7%C3%A3o_legendas.vtt"));
    }

    #[tokio::test]
    async fn test_downloads_require_a_result() {
        let sessions = SessionStore::new(Duration::from_secs(60));
        let id = sessions.create().await;

        assert!(matches!(download_text(&sessions, id).await, Err(AppError::ResultAbsent)));
        assert!(matches!(download_subtitle(&sessions, id).await, Err(AppError::ResultAbsent)));
        assert!(matches!(transcript_summary(&sessions, id).await, Err(AppError::ResultAbsent)));
    }

    #[tokio::test]
    async fn test_downloads_use_derived_names() {
        let sessions = SessionStore::new(Duration::from_secs(60));
        let id = sessions.create().await;
        sessions
            .set(id, TranscriptResult::new("Bom dia.".into(), "lecture.mp4"))
            .await
            .unwrap();

        let txt = download_text(&sessions, id).await.unwrap();
        assert_eq!(txt.filename, "lecture_transcricao.txt");
        assert_eq!(txt.body, "Bom dia.");
        assert_eq!(txt.content_type, TEXT_CONTENT_TYPE);

        let vtt = download_subtitle(&sessions, id).await.unwrap();
        assert_eq!(vtt.filename, "lecture_legendas.vtt");
        assert_eq!(vtt.body, "WEBVTT\n\n00:00:00.000 --> 99:59:59.999\nBom dia.");
        assert_eq!(vtt.content_type, VTT_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn test_end_unknown_session() {
        let sessions = SessionStore::new(Duration::from_secs(60));
        let result = end_session(&sessions, SessionId::new()).await;
        assert!(matches!(result, Err(AppError::SessionNotFound(_))));
    }
}
