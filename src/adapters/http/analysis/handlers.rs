//! HTTP handlers for analysis endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::{domain_error_response, ErrorResponse};
use crate::adapters::http::middleware::RequirePrincipal;
use crate::application::AiOrchestrator;
use crate::domain::foundation::{ArtworkId, DomainError, JobId, UserId};
use crate::domain::prompt::{ArtifactDescriptor, TaskType};

use super::dto::{JobStatusResponse, TriggerAnalysisRequest, TriggerAnalysisResponse};

/// Shared handler state.
pub type AnalysisState = Arc<AiOrchestrator>;

/// POST /api/analysis - trigger analysis of an artifact.
pub async fn trigger_analysis(
    State(orchestrator): State<AnalysisState>,
    RequirePrincipal(principal): RequirePrincipal,
    Json(req): Json<TriggerAnalysisRequest>,
) -> Response {
    let artifact: ArtworkId = match req.artifact_id.parse() {
        Ok(artifact) => artifact,
        Err(_) => {
            return domain_error_response(DomainError::invalid_input(
                "artifact_id",
                "not a valid artifact id",
            ))
        }
    };
    let owner = match UserId::new(req.owner_id) {
        Ok(owner) => owner,
        Err(e) => return domain_error_response(e.into()),
    };

    let mut descriptor = ArtifactDescriptor::new(req.title);
    if let Some(artist) = req.artist_name {
        descriptor = descriptor.with_artist(artist);
    }
    if let Some(medium) = req.medium {
        descriptor = descriptor.with_medium(medium);
    }
    if let Some(notes) = req.notes {
        descriptor = descriptor.with_notes(notes);
    }

    let tasks = req.task_types.unwrap_or_else(|| TaskType::ALL.to_vec());

    match orchestrator.start_analysis(&principal, &owner, artifact, descriptor, tasks) {
        Ok(job_id) => {
            let state = orchestrator
                .registry()
                .status(job_id)
                .map(|s| s.state)
                .unwrap_or(crate::domain::analysis::JobState::Dispatched);
            (
                StatusCode::ACCEPTED,
                Json(TriggerAnalysisResponse {
                    job_id: job_id.to_string(),
                    state,
                }),
            )
                .into_response()
        }
        Err(e) => domain_error_response(e),
    }
}

/// GET /api/analysis/:job_id - job status with per-task detail once terminal.
pub async fn get_job(
    State(orchestrator): State<AnalysisState>,
    RequirePrincipal(principal): RequirePrincipal,
    Path(job_id): Path<String>,
) -> Response {
    let Ok(job_id) = job_id.parse::<JobId>() else {
        return not_found(&job_id_message());
    };

    match orchestrator.job_status(&principal, job_id) {
        Ok(status) => {
            let response: JobStatusResponse = status.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => domain_error_response(e),
    }
}

/// POST /api/analysis/:job_id/cancel - cooperative cancellation.
pub async fn cancel_job(
    State(orchestrator): State<AnalysisState>,
    RequirePrincipal(principal): RequirePrincipal,
    Path(job_id): Path<String>,
) -> Response {
    let Ok(job_id) = job_id.parse::<JobId>() else {
        return not_found(&job_id_message());
    };

    match orchestrator.cancel_job(&principal, job_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => domain_error_response(e),
    }
}

fn job_id_message() -> String {
    "job not found".to_string()
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.to_string(),
            code: "INVALID_INPUT".to_string(),
        }),
    )
        .into_response()
}
