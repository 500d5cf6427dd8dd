use crate::session::TranscriptRetention;
use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub transcribe: TranscribeConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    /// Fixed recording length in seconds.
    pub duration_secs: u64,
    pub sample_rate: u32,
    pub channels: u16,
    /// Temp WAV path; defaults to the system temp dir when unset.
    pub wav_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct TranscribeConfig {
    /// Speech-recognition endpoint URL.
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct UiConfig {
    pub transcript_retention: TranscriptRetention,
}

impl Config {
    /// Load config from `<path>.toml`, with compiled-in defaults for every
    /// field. A missing file yields pure defaults.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "iris-dashboard")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 8080)?
            .set_default("audio.duration_secs", 5)?
            .set_default("audio.sample_rate", 44100)?
            .set_default("audio.channels", 1)?
            .set_default("transcribe.endpoint", "http://127.0.0.1:9000/transcribe")?
            .set_default("transcribe.timeout_secs", 30)?
            .set_default("ui.transcript_retention", "one-shot")?
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn capture_config(&self) -> crate::audio::CaptureConfig {
        crate::audio::CaptureConfig {
            duration: Duration::from_secs(self.audio.duration_secs),
            sample_rate: self.audio.sample_rate,
            channels: self.audio.channels,
            wav_path: self
                .audio
                .wav_path
                .clone()
                .unwrap_or_else(|| std::env::temp_dir().join("iris-dashboard-capture.wav")),
        }
    }

    pub fn transcribe_timeout(&self) -> Duration {
        Duration::from_secs(self.transcribe.timeout_secs)
    }
}
