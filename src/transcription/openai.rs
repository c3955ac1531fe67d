//! OpenAI Whisper API client
//!
//! Sends the stored upload to `/audio/transcriptions` and asks for plain text
//! (no timestamps, no segments).

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{error, info};

use super::{TranscriptionCredential, TranscriptionError, TranscriptionInput, Transcriber};
use crate::config::TranscriptionConfig;

/// OpenAI API error envelope
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// HTTP client for the Whisper transcription endpoint
#[derive(Debug, Clone)]
pub struct WhisperApiClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    response_format: String,
}

impl WhisperApiClient {
    pub fn new(config: &TranscriptionConfig) -> Self {
        // Library default timeouts; uploads of up to 25MB can take a while.
        let client = reqwest::Client::builder()
            .user_agent(concat!("transcritor/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            endpoint: format!(
                "{}/audio/transcriptions",
                config.api_base_url.trim_end_matches('/')
            ),
            model: config.model.clone(),
            response_format: config.response_format.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Transcriber for WhisperApiClient {
    async fn transcribe(
        &self,
        credential: &TranscriptionCredential,
        input: TranscriptionInput,
    ) -> Result<String, TranscriptionError> {
        info!(
            "🤖 Transcribing {} ({} bytes) with {}",
            input.filename, input.length, self.model
        );

        let file_part = Part::stream_with_length(input.file, input.length)
            .file_name(input.filename)
            .mime_str(&input.mime_type)?;

        let form = Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", self.response_format.clone());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential.expose())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let text = response.text().await?;
            info!("✅ Transcription completed: {} characters", text.chars().count());
            return Ok(text);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(parsed) => parsed.error.message,
            Err(_) => body,
        };

        error!("OpenAI API error ({}): {}", status.as_u16(), message);
        Err(TranscriptionError::new(format!(
            "API error ({}): {}",
            status.as_u16(),
            message
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use std::io::Write;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> WhisperApiClient {
        let config = ConfigBuilder::new().with_api_base_url(server.uri()).build();
        WhisperApiClient::new(&config.transcription)
    }

    async fn input_with(bytes: &[u8]) -> (tempfile::NamedTempFile, TranscriptionInput) {
        let mut tmp = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        tmp.write_all(bytes).unwrap();
        tmp.flush().unwrap();
        let file = tokio::fs::File::open(tmp.path()).await.unwrap();
        let input = TranscriptionInput {
            file,
            length: bytes.len() as u64,
            filename: "aula.wav".to_string(),
            mime_type: "audio/wav".to_string(),
        };
        (tmp, input)
    }

    fn credential() -> TranscriptionCredential {
        TranscriptionCredential::new("sk-test").unwrap()
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let config = ConfigBuilder::new()
            .with_api_base_url("http://localhost:9999/v1/")
            .build();
        let client = WhisperApiClient::new(&config.transcription);
        assert_eq!(client.endpoint(), "http://localhost:9999/v1/audio/transcriptions");
        assert_eq!(client.model(), "whisper-1");
    }

    #[tokio::test]
    async fn test_returns_raw_text_on_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_string_contains("whisper-1"))
            .and(body_string_contains("name=\"response_format\""))
            .and(body_string_contains("filename=\"aula.wav\""))
            .respond_with(ResponseTemplate::new(200).set_body_string("  Olá, turma.\n"))
            .expect(1)
            .mount(&server)
            .await;

        let (_tmp, input) = input_with(b"RIFF fake wav").await;
        let text = client_for(&server)
            .transcribe(&credential(), input)
            .await
            .unwrap();

        assert_eq!(text, "  Olá, turma.\n");
    }

    #[tokio::test]
    async fn test_api_error_envelope_becomes_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {
                    "message": "Incorrect API key provided",
                    "type": "invalid_request_error"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (_tmp, input) = input_with(b"data").await;
        let err = client_for(&server)
            .transcribe(&credential(), input)
            .await
            .unwrap_err();

        assert!(err.message().contains("401"));
        assert!(err.message().contains("Incorrect API key provided"));
    }

    #[tokio::test]
    async fn test_unstructured_error_body_is_kept() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(413).set_body_string("payload too large"))
            .mount(&server)
            .await;

        let (_tmp, input) = input_with(b"data").await;
        let err = client_for(&server)
            .transcribe(&credential(), input)
            .await
            .unwrap_err();

        assert_eq!(err.message(), "API error (413): payload too large");
    }

    #[tokio::test]
    async fn test_network_failure_is_an_error() {
        let config = ConfigBuilder::new()
            .with_api_base_url("http://127.0.0.1:1")
            .build();
        let client = WhisperApiClient::new(&config.transcription);

        let (_tmp, input) = input_with(b"data").await;
        let result = client.transcribe(&credential(), input).await;
        assert!(result.is_err());
    }
}
