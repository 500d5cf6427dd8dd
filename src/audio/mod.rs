//! Fixed-duration microphone capture
//!
//! One recording samples the default input device for a configured number of
//! seconds, then lands in a fixed-name WAV temp file that the transcription
//! client re-reads. The file path is shared across invocations, so callers
//! serialize recordings (the HTTP layer holds a capture lock).

pub mod capture;

pub use capture::CpalSource;

use crate::error::{Error, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use tracing::info;

/// Source of raw PCM samples. The production implementation wraps the
/// default cpal input device; tests substitute synthetic buffers.
pub trait SampleSource: Send + Sync {
    /// Block for up to `duration` while sampling, honoring `cancel`.
    ///
    /// Returns interleaved 16-bit PCM at the requested rate and channel
    /// count. A set cancel flag ends the capture early with whatever was
    /// collected so far.
    fn record(
        &self,
        duration: Duration,
        sample_rate: u32,
        channels: u16,
        cancel: &AtomicBool,
    ) -> Result<Vec<i16>>;
}

impl SampleSource for std::sync::Arc<dyn SampleSource> {
    fn record(
        &self,
        duration: Duration,
        sample_rate: u32,
        channels: u16,
        cancel: &AtomicBool,
    ) -> Result<Vec<i16>> {
        (**self).record(duration, sample_rate, channels, cancel)
    }
}

/// Capture settings, taken from config.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub duration: Duration,
    pub sample_rate: u32,
    pub channels: u16,
    /// Fixed temp file path, overwritten on every recording.
    pub wav_path: PathBuf,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(5),
            sample_rate: 44100,
            channels: 1,
            wav_path: std::env::temp_dir().join("iris-dashboard-capture.wav"),
        }
    }
}

/// Records one clip and persists it as a WAV file.
pub struct Recorder<S: SampleSource> {
    source: S,
    config: CaptureConfig,
}

impl<S: SampleSource> Recorder<S> {
    pub fn new(source: S, config: CaptureConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Capture one clip and write it to the configured temp path.
    ///
    /// Blocks the caller for the full configured duration unless `cancel`
    /// is set. Returns the WAV path on success.
    pub fn capture_to_wav(&self, cancel: &AtomicBool) -> Result<PathBuf> {
        if self.config.duration.is_zero() {
            return Err(Error::Capture("capture duration must be positive".into()));
        }

        let samples = self.source.record(
            self.config.duration,
            self.config.sample_rate,
            self.config.channels,
            cancel,
        )?;

        info!(
            samples = samples.len(),
            path = %self.config.wav_path.display(),
            "recording complete"
        );

        write_wav(
            &self.config.wav_path,
            &samples,
            self.config.sample_rate,
            self.config.channels,
        )?;

        Ok(self.config.wav_path.clone())
    }
}

/// Write interleaved 16-bit PCM to `path`, overwriting any previous clip.
pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32, channels: u16) -> Result<()> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let file = File::create(path)
        .map_err(|e| Error::Capture(format!("failed to create {}: {}", path.display(), e)))?;
    let mut writer = hound::WavWriter::new(BufWriter::new(file), spec)
        .map_err(|e| Error::Capture(format!("failed to start WAV: {}", e)))?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| Error::Capture(format!("failed to write sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| Error::Capture(format!("failed to finalize WAV: {}", e)))?;

    Ok(())
}
