//! Per-session state
//!
//! One session is one browser connection. The store keeps the recording
//! flags across requests and, subject to the retention policy, the last
//! transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// What happens to a transcript after the dashboard shows it once.
///
/// Under `OneShot`, a transcript appears on the first view after its
/// recording and is then cleared; `Persistent` keeps it until the next
/// recording replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TranscriptRetention {
    #[default]
    OneShot,
    Persistent,
}

/// Flags and transcript for one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    /// True while a recording is in flight for this session.
    pub recording_in_progress: bool,
    /// Recording flag as of the previous request; None before the first.
    pub previous_recording_state: Option<bool>,
    /// Most recent transcript, if any survives the retention policy.
    pub last_transcript: Option<String>,
    /// When this session was first touched.
    pub created_at: DateTime<Utc>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            recording_in_progress: false,
            previous_recording_state: None,
            last_transcript: None,
            created_at: Utc::now(),
        }
    }
}

/// Session-id → state map. Sessions are created on first touch and live for
/// the process lifetime.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionState>>>,
    retention: TranscriptRetention,
}

impl SessionStore {
    pub fn new(retention: TranscriptRetention) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            retention,
        }
    }

    pub fn retention(&self) -> TranscriptRetention {
        self.retention
    }

    /// Snapshot of a session's state, creating it if this is the first
    /// touch. Both flags exist before any read.
    pub async fn get(&self, session_id: &str) -> SessionState {
        let mut sessions = self.sessions.write().await;
        sessions.entry(session_id.to_string()).or_default().clone()
    }

    /// Flip the recording flag, remembering the previous value.
    pub async fn set_recording(&self, session_id: &str, recording: bool) {
        let mut sessions = self.sessions.write().await;
        let state = sessions.entry(session_id.to_string()).or_default();
        state.previous_recording_state = Some(state.recording_in_progress);
        state.recording_in_progress = recording;
    }

    /// Store the transcript of a completed recording, replacing any
    /// previous one wholesale.
    pub async fn set_transcript(&self, session_id: &str, transcript: Option<String>) {
        let mut sessions = self.sessions.write().await;
        let state = sessions.entry(session_id.to_string()).or_default();
        state.last_transcript = transcript;
    }

    /// Transcript for display. Under `OneShot` retention the read consumes
    /// it, so only the first view after a recording shows it.
    pub async fn take_transcript(&self, session_id: &str) -> Option<String> {
        let mut sessions = self.sessions.write().await;
        let state = sessions.entry(session_id.to_string()).or_default();
        match self.retention {
            TranscriptRetention::OneShot => state.last_transcript.take(),
            TranscriptRetention::Persistent => state.last_transcript.clone(),
        }
    }
}
