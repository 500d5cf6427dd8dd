use crate::audio::{CaptureConfig, CpalSource, SampleSource};
use crate::config::Config;
use crate::query::{self, QueryEngine};
use crate::session::{SessionStore, TranscriptRetention};
use crate::transcribe::{HttpTranscriber, SpeechToText};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state for HTTP handlers.
///
/// The adapters sit behind trait objects so tests can swap in mocks
/// without touching the router.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub capture_config: CaptureConfig,
    pub sample_source: Arc<dyn SampleSource>,
    pub transcriber: Arc<dyn SpeechToText>,
    pub engine: Arc<dyn QueryEngine>,
    /// Recordings share one fixed temp file, so they are serialized.
    pub capture_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Production wiring from config.
    pub fn new(config: &Config) -> Result<Self> {
        let transcriber = HttpTranscriber::new(
            config.transcribe.endpoint.clone(),
            config.transcribe_timeout(),
        )?;

        Ok(Self::with_adapters(
            config.capture_config(),
            config.ui.transcript_retention,
            Arc::new(CpalSource::new()),
            Arc::new(transcriber),
            Arc::new(query::SharedEngine),
        ))
    }

    /// Explicit wiring; integration tests inject mocks here.
    pub fn with_adapters(
        capture_config: CaptureConfig,
        retention: TranscriptRetention,
        sample_source: Arc<dyn SampleSource>,
        transcriber: Arc<dyn SpeechToText>,
        engine: Arc<dyn QueryEngine>,
    ) -> Self {
        Self {
            sessions: SessionStore::new(retention),
            capture_config,
            sample_source,
            transcriber,
            engine,
            capture_lock: Arc::new(Mutex::new(())),
        }
    }
}
