//! HTTP surface of the dashboard
//!
//! One endpoint per discrete UI event:
//! - GET  /                — the embedded dashboard page
//! - GET  /health          — health check
//! - GET  /api/dashboard   — build one DashboardView
//! - GET  /api/dataset     — raw table rows
//! - GET  /api/plots       — the six-figure catalog
//! - POST /api/query       — answer a typed question
//! - POST /api/record      — record, transcribe, answer

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
