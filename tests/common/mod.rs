#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::AsyncReadExt;

use transcritor::{Transcriber, TranscriptionCredential, TranscriptionError, TranscriptionInput};

/// What the fake saw during one call
#[derive(Debug, Clone)]
pub struct Received {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
    pub scratch_files_during_call: usize,
}

/// Transcriber that answers with a canned reply and records its inputs
pub struct FakeTranscriber {
    reply: Mutex<Result<String, TranscriptionError>>,
    scratch_dir: PathBuf,
    calls: AtomicUsize,
    received: Mutex<Vec<Received>>,
}

impl FakeTranscriber {
    pub fn succeeding(scratch_dir: &Path, text: &str) -> Self {
        Self::with_reply(scratch_dir, Ok(text.to_string()))
    }

    pub fn failing(scratch_dir: &Path, message: &str) -> Self {
        Self::with_reply(scratch_dir, Err(TranscriptionError::new(message)))
    }

    fn with_reply(scratch_dir: &Path, reply: Result<String, TranscriptionError>) -> Self {
        Self {
            reply: Mutex::new(reply),
            scratch_dir: scratch_dir.to_path_buf(),
            calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Change the canned reply for subsequent calls
    pub fn set_reply(&self, reply: Result<String, TranscriptionError>) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(
        &self,
        _credential: &TranscriptionCredential,
        mut input: TranscriptionInput,
    ) -> Result<String, TranscriptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut bytes = Vec::new();
        input
            .file
            .read_to_end(&mut bytes)
            .await
            .map_err(|e| TranscriptionError::new(e.to_string()))?;

        self.received.lock().unwrap().push(Received {
            bytes,
            filename: input.filename,
            mime_type: input.mime_type,
            scratch_files_during_call: count_files(&self.scratch_dir),
        });

        self.reply.lock().unwrap().clone()
    }
}

/// Transcriber that blows up mid-request
pub struct PanickingTranscriber;

#[async_trait]
impl Transcriber for PanickingTranscriber {
    async fn transcribe(
        &self,
        _credential: &TranscriptionCredential,
        _input: TranscriptionInput,
    ) -> Result<String, TranscriptionError> {
        panic!("simulated crash inside the transcription client");
    }
}

pub fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

pub fn credential() -> Option<TranscriptionCredential> {
    TranscriptionCredential::new("sk-test")
}

/// Transcriber that takes a while before succeeding
pub struct SlowTranscriber {
    delay: Duration,
    text: String,
}

impl SlowTranscriber {
    pub fn new(delay: Duration, text: &str) -> Self {
        Self {
            delay,
            text: text.to_string(),
        }
    }
}

#[async_trait]
impl Transcriber for SlowTranscriber {
    async fn transcribe(
        &self,
        _credential: &TranscriptionCredential,
        _input: TranscriptionInput,
    ) -> Result<String, TranscriptionError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.text.clone())
    }
}
