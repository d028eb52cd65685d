//! HTTP adapters - the thin axum surface over the orchestrator.

pub mod agent;
pub mod analysis;
pub mod error;
pub mod middleware;
pub mod settings;

use std::sync::Arc;

use axum::{middleware as axum_middleware, Router};
use tower_http::trace::TraceLayer;

use crate::application::AiOrchestrator;
use crate::config::AuthConfig;

use self::middleware::{principal_middleware, AgentAuthState};

/// Builds the full API router.
///
/// User-facing routes trust the upstream identity headers; the agent
/// routes carry their own bearer middleware.
pub fn api_router(orchestrator: Arc<AiOrchestrator>, auth: &AuthConfig) -> Router {
    let agent_auth = Arc::new(AgentAuthState::new(auth.agent_token.clone()));

    let user_routes = Router::new()
        .nest("/api/analysis", analysis::analysis_routes(orchestrator.clone()))
        .nest(
            "/api/settings",
            settings::settings_routes(orchestrator.clone()),
        )
        .layer(axum_middleware::from_fn(principal_middleware));

    let agent_routes = Router::new().nest(
        "/api/agent",
        agent::agent_routes(orchestrator, agent_auth),
    );

    user_routes
        .merge(agent_routes)
        .layer(TraceLayer::new_for_http())
}
