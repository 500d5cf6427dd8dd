pub mod audio;
pub mod config;
pub mod dataset;
pub mod error;
pub mod http;
pub mod plots;
pub mod query;
pub mod session;
pub mod stats;
pub mod transcribe;
pub mod view;

pub use audio::{CaptureConfig, CpalSource, Recorder, SampleSource};
pub use config::Config;
pub use error::{Error, Result};
pub use http::{create_router, AppState};
pub use query::{Answer, QueryEngine};
pub use session::{SessionStore, TranscriptRetention};
pub use transcribe::{SpeechToText, TranscriptOutcome};
pub use view::DashboardView;
