//! Dashboard view construction
//!
//! One `DashboardView` is the described output of one render pass: the raw
//! table (unless hidden), the six figures, the session's transcript subject
//! to retention, and any notice. Building it is a pure function of its
//! inputs, so the same inputs always produce the same view.

use crate::dataset::{Dataset, Row};
use crate::plots::{self, Figure};
use serde::Serialize;

/// An inline notice shown under the controls.
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    /// "answer" for a computed answer, "error" for a failure notice.
    pub level: &'static str,
    pub text: String,
}

impl Notice {
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            level: "answer",
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: "error",
            text: text.into(),
        }
    }
}

/// Everything one render pass displays.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    /// Raw table rows; None when hide-raw-data is set.
    pub table: Option<Vec<Row>>,
    pub figures: Vec<Figure>,
    /// Transcript from the most recent recording, if retained.
    pub transcript: Option<String>,
    pub notice: Option<Notice>,
}

/// Build the view for one request.
pub fn build(
    dataset: &Dataset,
    hide_raw: bool,
    transcript: Option<String>,
    notice: Option<Notice>,
) -> DashboardView {
    DashboardView {
        table: if hide_raw {
            None
        } else {
            Some(dataset.rows().to_vec())
        },
        figures: plots::catalog(dataset),
        transcript,
        notice,
    }
}
