//! Speech-to-text client
//!
//! The recorded WAV clip is submitted to a remote recognition endpoint. The
//! service understanding no speech is a normal outcome
//! ([`TranscriptOutcome::Unrecognized`]); only network and service failures
//! surface as [`Error::Transcription`].

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Result of one transcription attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptOutcome {
    /// The service returned text for the clip.
    Recognized(String),
    /// The service answered but understood no speech. Not an error.
    Unrecognized,
}

/// Speech recognition seam. The production implementation calls a cloud
/// endpoint; tests substitute canned outcomes.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe the WAV file at `path`.
    async fn transcribe(&self, path: &Path) -> Result<TranscriptOutcome>;
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    #[serde(default)]
    text: Option<String>,
}

/// HTTP transcription client: multipart POST of the WAV bytes, JSON
/// `{ "text": "..." }` back. Empty or missing text maps to
/// [`TranscriptOutcome::Unrecognized`].
pub struct HttpTranscriber {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTranscriber {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transcription(format!("failed to build client: {}", e)))?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl SpeechToText for HttpTranscriber {
    async fn transcribe(&self, path: &Path) -> Result<TranscriptOutcome> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::Transcription(format!("failed to read clip: {}", e)))?;

        debug!(bytes = bytes.len(), endpoint = %self.endpoint, "submitting clip");

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name("clip.wav")
            .mime_str("audio/wav")
            .map_err(|e| Error::Transcription(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("audio", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Transcription(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transcription(format!(
                "service returned {}",
                status
            )));
        }

        let body: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("bad response body: {}", e)))?;

        match body.text.map(|t| t.trim().to_string()) {
            Some(text) if !text.is_empty() => {
                info!(chars = text.len(), "speech recognized");
                Ok(TranscriptOutcome::Recognized(text))
            }
            _ => {
                info!("no speech recognized in clip");
                Ok(TranscriptOutcome::Unrecognized)
            }
        }
    }
}
