use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use thiserror::Error;

/// Failure taxonomy for the dashboard.
///
/// Unrecognized speech is deliberately NOT a variant here: the speech
/// service reporting "no speech understood" is a normal outcome
/// (`TranscriptOutcome::Unrecognized`), not a failure.
#[derive(Debug, Error)]
pub enum Error {
    /// The bundled dataset could not be loaded. Fatal for the render pass.
    #[error("dataset unavailable: {0}")]
    DataUnavailable(String),

    /// No usable input device, or the stream failed while sampling.
    #[error("audio capture failed: {0}")]
    Capture(String),

    /// Network or service failure while transcribing a recording.
    #[error("transcription failed: {0}")]
    Transcription(String),

    /// The query engine could not parse or answer the question.
    #[error("could not answer question: {0}")]
    Query(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

impl Error {
    fn kind(&self) -> &'static str {
        match self {
            Error::DataUnavailable(_) => "data_unavailable",
            Error::Capture(_) => "capture",
            Error::Transcription(_) => "transcription",
            Error::Query(_) => "query",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Only DataUnavailable is unrecoverable for a render pass; adapter
        // failures come back as inline notices the page can display.
        let status = match &self {
            Error::DataUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Capture(_) | Error::Transcription(_) => StatusCode::BAD_GATEWAY,
            Error::Query(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };

        let body = ErrorResponse {
            error: self.to_string(),
            kind: self.kind(),
        };

        (status, Json(body)).into_response()
    }
}
