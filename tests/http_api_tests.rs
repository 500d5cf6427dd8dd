// End-to-end tests over the HTTP surface
//
// These drive the real router with mock adapters injected through the
// trait seams: a synthetic sample source, a canned speech service, and an
// instrumented query engine.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use iris_dashboard::audio::{CaptureConfig, SampleSource};
use iris_dashboard::dataset::Dataset;
use iris_dashboard::query::{AggregateEngine, Answer, QueryEngine};
use iris_dashboard::transcribe::{SpeechToText, TranscriptOutcome};
use iris_dashboard::{create_router, AppState, Error, Result, TranscriptRetention};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

// ============================================================================
// Mock adapters
// ============================================================================

/// Instant synthetic clip: no sleeping, fixed sample count.
struct SyntheticSource;

impl SampleSource for SyntheticSource {
    fn record(
        &self,
        duration: Duration,
        sample_rate: u32,
        channels: u16,
        _cancel: &AtomicBool,
    ) -> Result<Vec<i16>> {
        let n = (duration.as_secs_f64() * sample_rate as f64) as usize * channels as usize;
        Ok(vec![0i16; n.max(1)])
    }
}

struct BrokenSource;

impl SampleSource for BrokenSource {
    fn record(
        &self,
        _duration: Duration,
        _sample_rate: u32,
        _channels: u16,
        _cancel: &AtomicBool,
    ) -> Result<Vec<i16>> {
        Err(Error::Capture("no input device".into()))
    }
}

/// Speech service returning a canned outcome.
enum CannedStt {
    Recognized(&'static str),
    Unrecognized,
    Failing,
}

#[async_trait]
impl SpeechToText for CannedStt {
    async fn transcribe(&self, _path: &Path) -> Result<TranscriptOutcome> {
        match self {
            CannedStt::Recognized(text) => Ok(TranscriptOutcome::Recognized(text.to_string())),
            CannedStt::Unrecognized => Ok(TranscriptOutcome::Unrecognized),
            CannedStt::Failing => Err(Error::Transcription("service unreachable".into())),
        }
    }
}

/// Records every question it is asked, then answers via the real engine or
/// a canned fallback.
struct CountingEngine {
    calls: Mutex<Vec<String>>,
}

impl CountingEngine {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl QueryEngine for CountingEngine {
    fn answer(&self, question: &str, dataset: &Dataset) -> Result<Answer> {
        self.calls.lock().unwrap().push(question.to_string());
        AggregateEngine::new().answer(question, dataset).or(Ok(Answer {
            text: format!("Computed a summary for {:?}.", question),
            value: None,
        }))
    }
}

struct FailingEngine;

impl QueryEngine for FailingEngine {
    fn answer(&self, _question: &str, _dataset: &Dataset) -> Result<Answer> {
        Err(Error::Query("engine exploded".into()))
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    router: Router,
    state: AppState,
    _dir: tempfile::TempDir,
}

fn harness(
    source: Arc<dyn SampleSource>,
    stt: Arc<dyn SpeechToText>,
    engine: Arc<dyn QueryEngine>,
    retention: TranscriptRetention,
) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let capture = CaptureConfig {
        duration: Duration::from_millis(50),
        sample_rate: 8000,
        channels: 1,
        wav_path: dir.path().join("capture.wav"),
    };
    let state = AppState::with_adapters(capture, retention, source, stt, engine);
    Harness {
        router: create_router(state.clone()),
        state,
        _dir: dir,
    }
}

fn default_harness() -> Harness {
    harness(
        Arc::new(SyntheticSource),
        Arc::new(CannedStt::Unrecognized),
        Arc::new(AggregateEngine::new()),
        TranscriptRetention::OneShot,
    )
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn health_check_is_ok() {
    let h = default_harness();
    let response = h.router.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn index_serves_the_dashboard_page() {
    let h = default_harness();
    let response = h.router.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("Hide Raw Data"));
    assert!(page.contains("Speak Now"));
}

#[tokio::test]
async fn session_endpoint_mints_fresh_ids_with_clean_flags() {
    let h = default_harness();

    let (status, first) = send(&h.router, post_json("/api/session", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = send(&h.router, post_json("/api/session", json!({}))).await;

    let first_id = first["session_id"].as_str().unwrap();
    assert_ne!(first_id, second["session_id"].as_str().unwrap());

    // Flags exist before any read.
    let flags = h.state.sessions.get(first_id).await;
    assert!(!flags.recording_in_progress);
    assert_eq!(flags.previous_recording_state, None);
}

#[tokio::test]
async fn typed_question_reaches_the_engine_exactly_once() {
    let engine = CountingEngine::new();
    let h = harness(
        Arc::new(SyntheticSource),
        Arc::new(CannedStt::Unrecognized),
        engine.clone(),
        TranscriptRetention::OneShot,
    );

    let question = "What is the average petal length?";
    let (status, body) = send(
        &h.router,
        post_json("/api/query", json!({ "question": question })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(engine.calls(), vec![question.to_string()]);
    assert_eq!(body["notice"]["level"], "answer");
    assert!(body["answer"]["text"].as_str().unwrap().contains("average"));
}

#[tokio::test]
async fn empty_question_never_reaches_the_engine() {
    let engine = CountingEngine::new();
    let h = harness(
        Arc::new(SyntheticSource),
        Arc::new(CannedStt::Unrecognized),
        engine.clone(),
        TranscriptRetention::OneShot,
    );

    let (status, body) = send(
        &h.router,
        post_json("/api/query", json!({ "question": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "bad_request");
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn engine_failure_is_a_notice_not_a_crash() {
    let h = harness(
        Arc::new(SyntheticSource),
        Arc::new(CannedStt::Unrecognized),
        Arc::new(FailingEngine),
        TranscriptRetention::OneShot,
    );

    let (status, body) = send(
        &h.router,
        post_json("/api/query", json!({ "question": "average petal length" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "query");

    // The page keeps rendering after an engine failure.
    let (status, body) = send(&h.router, get("/api/dashboard")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["figures"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn hide_raw_toggles_only_table_visibility() {
    let h = default_harness();

    for _ in 0..2 {
        let (status, body) = send(&h.router, get("/api/dashboard?hide_raw=true")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["table"].is_null(), "hidden table must never render");
        assert_eq!(body["figures"].as_array().unwrap().len(), 6);
    }

    for _ in 0..2 {
        let (status, body) = send(&h.router, get("/api/dashboard?hide_raw=false")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["table"].as_array().unwrap().len(), 150);
        assert_eq!(body["figures"].as_array().unwrap().len(), 6);
    }
}

#[tokio::test]
async fn spoken_question_follows_the_same_answering_path() {
    let engine = CountingEngine::new();
    let h = harness(
        Arc::new(SyntheticSource),
        Arc::new(CannedStt::Recognized("show me petal width")),
        engine.clone(),
        TranscriptRetention::OneShot,
    );

    let (status, body) = send(
        &h.router,
        post_json("/api/record", json!({ "session_id": "s1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "answered");
    assert_eq!(body["transcript"], "show me petal width");
    // The transcript went through the question path; nothing typed was involved.
    assert_eq!(engine.calls(), vec!["show me petal width".to_string()]);

    // Recording flags settled back.
    let flags = h.state.sessions.get("s1").await;
    assert!(!flags.recording_in_progress);
    assert_eq!(flags.previous_recording_state, Some(true));
}

#[tokio::test]
async fn one_shot_transcript_shows_on_exactly_one_view() {
    let h = harness(
        Arc::new(SyntheticSource),
        Arc::new(CannedStt::Recognized("how many rows are there")),
        Arc::new(AggregateEngine::new()),
        TranscriptRetention::OneShot,
    );

    let (status, _) = send(
        &h.router,
        post_json("/api/record", json!({ "session_id": "s1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, first) = send(&h.router, get("/api/dashboard?session_id=s1")).await;
    assert_eq!(first["transcript"], "how many rows are there");

    let (_, second) = send(&h.router, get("/api/dashboard?session_id=s1")).await;
    assert!(second["transcript"].is_null());
}

#[tokio::test]
async fn persistent_transcript_survives_views() {
    let h = harness(
        Arc::new(SyntheticSource),
        Arc::new(CannedStt::Recognized("how many rows are there")),
        Arc::new(AggregateEngine::new()),
        TranscriptRetention::Persistent,
    );

    send(
        &h.router,
        post_json("/api/record", json!({ "session_id": "s1" })),
    )
    .await;

    for _ in 0..2 {
        let (_, body) = send(&h.router, get("/api/dashboard?session_id=s1")).await;
        assert_eq!(body["transcript"], "how many rows are there");
    }
}

#[tokio::test]
async fn unrecognized_speech_is_not_an_error() {
    let h = harness(
        Arc::new(SyntheticSource),
        Arc::new(CannedStt::Unrecognized),
        Arc::new(AggregateEngine::new()),
        TranscriptRetention::OneShot,
    );

    let (status, body) = send(&h.router, post_json("/api/record", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "no_speech");
    assert!(body["answer"].is_null());
    assert_eq!(body["notice"]["level"], "error");
}

#[tokio::test]
async fn transcription_failure_is_a_distinct_notice() {
    let h = harness(
        Arc::new(SyntheticSource),
        Arc::new(CannedStt::Failing),
        Arc::new(AggregateEngine::new()),
        TranscriptRetention::OneShot,
    );

    let (status, body) = send(&h.router, post_json("/api/record", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "transcription");
}

#[tokio::test]
async fn capture_failure_is_a_distinct_notice() {
    let h = harness(
        Arc::new(BrokenSource),
        Arc::new(CannedStt::Unrecognized),
        Arc::new(AggregateEngine::new()),
        TranscriptRetention::OneShot,
    );

    let (status, body) = send(&h.router, post_json("/api/record", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "capture");

    // The session is not stuck in the recording state.
    let flags = h.state.sessions.get("anonymous").await;
    assert!(!flags.recording_in_progress);
}

#[tokio::test]
async fn dataset_endpoint_returns_all_rows() {
    let h = default_harness();
    let (status, body) = send(&h.router, get("/api/dataset")).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 150);
    assert_eq!(rows[0]["species"], "setosa");
}

#[tokio::test]
async fn plots_endpoint_returns_the_six_figures() {
    let h = default_harness();
    let (status, body) = send(&h.router, get("/api/plots")).await;
    assert_eq!(status, StatusCode::OK);
    let figures = body.as_array().unwrap();
    assert_eq!(figures.len(), 6);
    let kinds: Vec<&str> = figures
        .iter()
        .map(|f| f["kind"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"histogram"));
    assert!(kinds.contains(&"density"));
    assert!(kinds.contains(&"joint_density"));
    assert!(kinds.contains(&"regression"));
}
