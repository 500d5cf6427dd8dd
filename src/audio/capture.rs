//! cpal-backed microphone source.

use super::SampleSource;
use crate::error::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Granularity of the cancel check while a capture is in flight.
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Default-input-device sample source.
///
/// Opens a fresh input stream per recording and closes it when the duration
/// elapses (or the cancel flag is set). The device runs at its native
/// format; samples are collapsed to the requested channel count and
/// decimated to the requested rate on the fly.
pub struct CpalSource;

impl CpalSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CpalSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSource for CpalSource {
    fn record(
        &self,
        duration: Duration,
        sample_rate: u32,
        channels: u16,
        cancel: &AtomicBool,
    ) -> Result<Vec<i16>> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Capture("no default input device".into()))?;

        let device_name = device.name().unwrap_or_else(|_| "<unknown>".into());
        info!(device = %device_name, "opening input stream");

        let supported = device
            .default_input_config()
            .map_err(|e| Error::Capture(format!("no usable input config: {}", e)))?;

        let native_rate = supported.sample_rate().0;
        let native_channels = supported.channels();
        let decimation = (native_rate / sample_rate).max(1) as usize;
        if native_rate % sample_rate != 0 {
            warn!(
                native_rate,
                requested = sample_rate,
                "native rate is not a multiple of the requested rate; decimating approximately"
            );
        }

        let buffer: Arc<Mutex<Vec<i16>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buffer);
        let err_flag = Arc::new(AtomicBool::new(false));
        let err_seen = Arc::clone(&err_flag);

        let config = supported.config();
        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    push_frames(&sink, data, native_channels, channels, decimation, |s| {
                        (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
                    });
                },
                move |e| {
                    warn!("input stream error: {}", e);
                    err_seen.store(true, Ordering::SeqCst);
                },
                None,
            ),
            cpal::SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    push_frames(&sink, data, native_channels, channels, decimation, |s| s);
                },
                move |e| {
                    warn!("input stream error: {}", e);
                    err_seen.store(true, Ordering::SeqCst);
                },
                None,
            ),
            other => {
                return Err(Error::Capture(format!(
                    "unsupported input sample format: {:?}",
                    other
                )))
            }
        }
        .map_err(|e| Error::Capture(format!("failed to build input stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| Error::Capture(format!("failed to start input stream: {}", e)))?;

        // Time-bounded, cancellable wait.
        let deadline = Instant::now() + duration;
        while Instant::now() < deadline {
            if cancel.load(Ordering::SeqCst) {
                info!("capture cancelled");
                break;
            }
            if err_flag.load(Ordering::SeqCst) {
                drop(stream);
                return Err(Error::Capture("input stream failed while sampling".into()));
            }
            std::thread::sleep(CANCEL_POLL.min(deadline.saturating_duration_since(Instant::now())));
        }

        drop(stream);

        let samples = Arc::try_unwrap(buffer)
            .map(|m| m.into_inner().unwrap_or_default())
            .unwrap_or_else(|arc| arc.lock().map(|g| g.clone()).unwrap_or_default());

        if samples.is_empty() {
            return Err(Error::Capture("device produced no samples".into()));
        }

        Ok(samples)
    }
}

/// Collapse interleaved native frames to the target channel count and
/// decimate to the target rate, appending to the shared buffer.
fn push_frames<T: Copy>(
    sink: &Mutex<Vec<i16>>,
    data: &[T],
    native_channels: u16,
    target_channels: u16,
    decimation: usize,
    convert: impl Fn(T) -> i16,
) {
    let Ok(mut buf) = sink.lock() else {
        return;
    };
    let native = native_channels.max(1) as usize;

    for (i, frame) in data.chunks(native).enumerate() {
        if i % decimation != 0 {
            continue;
        }
        if target_channels == 1 {
            // Average all native channels down to mono.
            let sum: i64 = frame.iter().map(|&s| convert(s) as i64).sum();
            buf.push((sum / frame.len() as i64) as i16);
        } else {
            for ch in 0..target_channels as usize {
                let sample = frame.get(ch).or_else(|| frame.last()).copied();
                if let Some(s) = sample {
                    buf.push(convert(s));
                }
            }
        }
    }
}
