//! HTTP handlers for the agent endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::domain_error_response;
use crate::adapters::http::middleware::RequirePrincipal;
use crate::application::{AiOrchestrator, PostArtworkRequest};
use crate::domain::foundation::DomainError;

use super::dto::{PostArtworkRequestDto, PostArtworkResponse};

/// Shared handler state.
pub type AgentState = Arc<AiOrchestrator>;

/// POST /api/agent/artworks - post an AI-authored artwork record.
///
/// The route sits behind the agent bearer middleware, so the principal in
/// extensions is always the agent; the orchestrator still authorizes it.
pub async fn post_artwork(
    State(orchestrator): State<AgentState>,
    RequirePrincipal(principal): RequirePrincipal,
    Json(req): Json<PostArtworkRequestDto>,
) -> Response {
    let job_id = match req.job_id.parse() {
        Ok(job_id) => job_id,
        Err(_) => {
            return domain_error_response(DomainError::invalid_input(
                "job_id",
                "not a valid job id",
            ))
        }
    };

    let request = PostArtworkRequest {
        job_id,
        title: req.title,
        images: req.images,
        ai_context: req.ai_context,
    };

    match orchestrator.post_artwork(&principal, request).await {
        Ok(artwork_id) => (
            StatusCode::CREATED,
            Json(PostArtworkResponse {
                artwork_id: artwork_id.to_string(),
            }),
        )
            .into_response(),
        Err(e) => domain_error_response(e),
    }
}
