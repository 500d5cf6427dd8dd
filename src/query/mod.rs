//! Natural-language question answering over the dataset
//!
//! The engine is a process-wide singleton: [`init`] builds it exactly once
//! (repeated calls are no-ops) and [`engine`] hands out the shared instance.
//! Handlers never let the engine render anything; it returns an [`Answer`]
//! artifact and the caller decides placement.

mod aggregate;

pub use aggregate::AggregateEngine;

use crate::dataset::Dataset;
use crate::error::Result;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::info;

/// A computed answer, ready for the caller to place.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    /// One-line textual answer.
    pub text: String,
    /// The numeric result, when the question reduced to one number.
    pub value: Option<f64>,
}

/// Answering engine seam.
///
/// Implementations must not display anything themselves; precondition
/// (enforced by callers, see the HTTP handlers): `question` is non-empty.
pub trait QueryEngine: Send + Sync {
    fn answer(&self, question: &str, dataset: &Dataset) -> Result<Answer>;
}

static ENGINE: OnceLock<AggregateEngine> = OnceLock::new();

/// One-time engine initialization, invoked at process start.
///
/// Safe to call again; subsequent calls are no-ops.
pub fn init() {
    let mut first = false;
    ENGINE.get_or_init(|| {
        first = true;
        AggregateEngine::new()
    });
    if first {
        info!("query engine initialized");
    }
}

/// The process-wide engine. Initializes it if [`init`] was never called.
pub fn engine() -> &'static AggregateEngine {
    ENGINE.get_or_init(AggregateEngine::new)
}

/// Handle to the process-wide engine, usable behind `dyn QueryEngine`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SharedEngine;

impl QueryEngine for SharedEngine {
    fn answer(&self, question: &str, dataset: &Dataset) -> Result<Answer> {
        engine().answer(question, dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        let a = engine() as *const AggregateEngine;
        init();
        let b = engine() as *const AggregateEngine;
        assert_eq!(a, b);
    }
}
