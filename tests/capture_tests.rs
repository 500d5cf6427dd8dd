// Tests for the capture adapter against mocked sample sources
//
// The real device path needs hardware; these tests exercise the recorder's
// contract through the SampleSource seam: timing bounds, cancellation, and
// the WAV file it leaves behind.

use iris_dashboard::audio::{CaptureConfig, Recorder, SampleSource};
use iris_dashboard::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Mimics a blocking device: sleeps in cancel-poll steps for the requested
/// duration, then yields exactly duration * rate samples.
struct BlockingSource;

impl SampleSource for BlockingSource {
    fn record(
        &self,
        duration: Duration,
        sample_rate: u32,
        channels: u16,
        cancel: &AtomicBool,
    ) -> Result<Vec<i16>> {
        let deadline = Instant::now() + duration;
        while Instant::now() < deadline && !cancel.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(10));
        }
        let n = (duration.as_secs_f64() * sample_rate as f64) as usize * channels as usize;
        Ok(vec![0i16; n])
    }
}

struct FailingSource;

impl SampleSource for FailingSource {
    fn record(
        &self,
        _duration: Duration,
        _sample_rate: u32,
        _channels: u16,
        _cancel: &AtomicBool,
    ) -> Result<Vec<i16>> {
        Err(iris_dashboard::Error::Capture("no input device".into()))
    }
}

fn config_in(dir: &tempfile::TempDir, duration_ms: u64) -> CaptureConfig {
    CaptureConfig {
        duration: Duration::from_millis(duration_ms),
        sample_rate: 8000,
        channels: 1,
        wav_path: dir.path().join("capture.wav"),
    }
}

#[test]
fn capture_completes_within_duration_plus_bounded_overhead() {
    let dir = tempfile::tempdir().unwrap();
    let recorder = Recorder::new(BlockingSource, config_in(&dir, 200));
    let cancel = AtomicBool::new(false);

    let start = Instant::now();
    let path = recorder.capture_to_wav(&cancel).unwrap();
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(200));
    assert!(
        elapsed < Duration::from_millis(200) + Duration::from_millis(500),
        "capture overhead too large: {:?}",
        elapsed
    );

    let reader = hound::WavReader::open(path).unwrap();
    assert_eq!(reader.len() as usize, 8000 / 5); // 200ms at 8kHz
}

#[test]
fn cancel_flag_ends_the_capture_early() {
    let dir = tempfile::tempdir().unwrap();
    let recorder = Recorder::new(BlockingSource, config_in(&dir, 60_000));
    let cancel = AtomicBool::new(true); // cancelled before it starts

    let start = Instant::now();
    let result = recorder.capture_to_wav(&cancel);
    assert!(result.is_ok());
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn device_failure_maps_to_capture_error() {
    let dir = tempfile::tempdir().unwrap();
    let recorder = Recorder::new(FailingSource, config_in(&dir, 100));
    let cancel = AtomicBool::new(false);

    match recorder.capture_to_wav(&cancel) {
        Err(iris_dashboard::Error::Capture(_)) => {}
        other => panic!("expected Capture error, got {:?}", other.map(|p| p.display().to_string())),
    }
}

#[test]
fn temp_file_is_overwritten_on_each_recording() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, 100);
    let recorder = Recorder::new(BlockingSource, config.clone());
    let cancel = AtomicBool::new(false);

    let first = recorder.capture_to_wav(&cancel).unwrap();
    let second = recorder.capture_to_wav(&cancel).unwrap();

    // Fixed name: both recordings land at the same path.
    assert_eq!(first, second);
    assert_eq!(first, config.wav_path);
}
