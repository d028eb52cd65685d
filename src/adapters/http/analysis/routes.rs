//! HTTP routes for analysis endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{cancel_job, get_job, trigger_analysis, AnalysisState};

/// Creates the analysis router with all endpoints.
pub fn analysis_routes(state: AnalysisState) -> Router {
    Router::new()
        .route("/", post(trigger_analysis))
        .route("/:job_id", get(get_job))
        .route("/:job_id/cancel", post(cancel_job))
        .with_state(state)
}
