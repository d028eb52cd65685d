//! HTTP handlers for provider settings endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::domain_error_response;
use crate::adapters::http::middleware::RequirePrincipal;
use crate::application::AiOrchestrator;

use super::dto::{ProviderSettingsResponse, UpdateProviderSettingsRequest};

/// Shared handler state.
pub type SettingsState = Arc<AiOrchestrator>;

/// GET /api/settings/providers - read the active selection (admin).
pub async fn get_provider_settings(
    State(orchestrator): State<SettingsState>,
    RequirePrincipal(principal): RequirePrincipal,
) -> Response {
    match orchestrator.provider_settings(&principal).await {
        Ok(settings) => {
            let response: ProviderSettingsResponse = settings.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => domain_error_response(e),
    }
}

/// PUT /api/settings/providers - replace the active selection (admin).
pub async fn update_provider_settings(
    State(orchestrator): State<SettingsState>,
    RequirePrincipal(principal): RequirePrincipal,
    Json(req): Json<UpdateProviderSettingsRequest>,
) -> Response {
    match orchestrator
        .update_provider_settings(&principal, req.primary_provider, req.fallback_provider)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => domain_error_response(e),
    }
}
