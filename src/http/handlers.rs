use super::state::AppState;
use crate::audio::Recorder;
use crate::dataset;
use crate::error::Error;
use crate::plots;
use crate::query::Answer;
use crate::transcribe::TranscriptOutcome;
use crate::view::{self, Notice};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{error, info, warn};

const DASHBOARD_PAGE: &str = include_str!("../../assets/dashboard.html");

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    /// Session to read the transcript from; anonymous if absent.
    pub session_id: Option<String>,

    /// The "Hide Raw Data" checkbox.
    #[serde(default)]
    pub hide_raw: bool,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub session_id: Option<String>,
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub question: String,
    pub answer: Answer,
    pub notice: Notice,
}

#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    /// "answered", "no_speech", or "answer_failed".
    pub outcome: &'static str,
    pub transcript: Option<String>,
    pub answer: Option<Answer>,
    pub notice: Notice,
}

#[derive(Debug, Serialize)]
pub struct BadRequestResponse {
    pub error: String,
    pub kind: &'static str,
}

fn session_or_anonymous(session_id: Option<String>) -> String {
    session_id.unwrap_or_else(|| "anonymous".to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
/// The embedded dashboard page
pub async fn index() -> impl IntoResponse {
    Html(DASHBOARD_PAGE)
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
}

/// POST /api/session
/// Mint a session ID; state for it is created on first touch
pub async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let session_id = format!("session-{}", uuid::Uuid::new_v4());
    state.sessions.get(&session_id).await;
    info!(session = %session_id, "session created");
    (StatusCode::OK, Json(SessionResponse { session_id }))
}

/// GET /api/dashboard
/// Build one dashboard view: table (unless hidden), figures, transcript
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Response {
    let dataset = match dataset::get() {
        Ok(d) => d,
        Err(e) => return e.into_response(),
    };

    let session_id = session_or_anonymous(params.session_id);
    let transcript = state.sessions.take_transcript(&session_id).await;

    let view = view::build(dataset, params.hide_raw, transcript, None);
    (StatusCode::OK, Json(view)).into_response()
}

/// GET /api/dataset
/// Raw table rows
pub async fn get_dataset() -> Response {
    match dataset::get() {
        Ok(d) => (StatusCode::OK, Json(d.rows())).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/plots
/// The six-figure plot catalog
pub async fn get_plots() -> Response {
    match dataset::get() {
        Ok(d) => (StatusCode::OK, Json(plots::catalog(d))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/query
/// Answer a typed question. An empty question never reaches the engine.
pub async fn post_query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Response {
    let question = req.question.trim();
    if question.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(BadRequestResponse {
                error: "question must not be empty".to_string(),
                kind: "bad_request",
            }),
        )
            .into_response();
    }

    let dataset = match dataset::get() {
        Ok(d) => d,
        Err(e) => return e.into_response(),
    };

    info!(question = %question, "answering typed question");

    match state.engine.answer(question, dataset) {
        Ok(answer) => {
            let notice = Notice::answer(answer.text.clone());
            (
                StatusCode::OK,
                Json(QueryResponse {
                    question: question.to_string(),
                    answer,
                    notice,
                }),
            )
                .into_response()
        }
        Err(e) => {
            // The page shows a generic failure notice; the detail goes to
            // the log, not the user.
            warn!("query engine failed: {}", e);
            Error::Query("the question could not be answered".to_string()).into_response()
        }
    }
}

/// POST /api/record
/// Record a clip, transcribe it, and feed the transcript through the same
/// answering path as a typed question.
pub async fn post_record(
    State(state): State<AppState>,
    Json(req): Json<RecordRequest>,
) -> Response {
    let session_id = session_or_anonymous(req.session_id);

    let dataset = match dataset::get() {
        Ok(d) => d,
        Err(e) => return e.into_response(),
    };

    // One fixed temp file, so one recording at a time.
    let _capture_guard = state.capture_lock.lock().await;

    state.sessions.set_recording(&session_id, true).await;
    info!(session = %session_id, "recording started");

    let recorder = Recorder::new(
        Arc::clone(&state.sample_source),
        state.capture_config.clone(),
    );
    let cancel = Arc::new(AtomicBool::new(false));

    // The capture blocks for the full configured duration.
    let captured = tokio::task::spawn_blocking(move || recorder.capture_to_wav(&cancel)).await;

    let wav_path = match captured {
        Ok(Ok(path)) => path,
        Ok(Err(e)) => {
            state.sessions.set_recording(&session_id, false).await;
            error!("capture failed: {}", e);
            return e.into_response();
        }
        Err(e) => {
            state.sessions.set_recording(&session_id, false).await;
            error!("capture task panicked: {}", e);
            return Error::Capture("capture task failed".to_string()).into_response();
        }
    };

    let outcome = match state.transcriber.transcribe(&wav_path).await {
        Ok(o) => o,
        Err(e) => {
            state.sessions.set_recording(&session_id, false).await;
            error!("transcription failed: {}", e);
            return e.into_response();
        }
    };

    state.sessions.set_recording(&session_id, false).await;

    match outcome {
        TranscriptOutcome::Unrecognized => {
            state.sessions.set_transcript(&session_id, None).await;
            (
                StatusCode::OK,
                Json(RecordResponse {
                    outcome: "no_speech",
                    transcript: None,
                    answer: None,
                    notice: Notice::error("No speech was recognized. Press Speak Now to retry."),
                }),
            )
                .into_response()
        }
        TranscriptOutcome::Recognized(text) => {
            state
                .sessions
                .set_transcript(&session_id, Some(text.clone()))
                .await;
            info!(session = %session_id, transcript = %text, "speech transcribed");

            match state.engine.answer(&text, dataset) {
                Ok(answer) => {
                    let notice = Notice::answer(answer.text.clone());
                    (
                        StatusCode::OK,
                        Json(RecordResponse {
                            outcome: "answered",
                            transcript: Some(text),
                            answer: Some(answer),
                            notice,
                        }),
                    )
                        .into_response()
                }
                Err(e) => {
                    warn!("query engine failed on transcript: {}", e);
                    (
                        StatusCode::OK,
                        Json(RecordResponse {
                            outcome: "answer_failed",
                            transcript: Some(text),
                            answer: None,
                            notice: Notice::error("The question could not be answered."),
                        }),
                    )
                        .into_response()
                }
            }
        }
    }
}
