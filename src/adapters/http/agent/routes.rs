//! HTTP routes for the agent endpoints.

use std::sync::Arc;

use axum::{middleware, routing::post, Router};

use crate::adapters::http::middleware::{agent_auth_middleware, AgentAuthState};

use super::handlers::{post_artwork, AgentState};

/// Creates the agent router. Every route is behind the bearer middleware.
pub fn agent_routes(state: AgentState, auth: Arc<AgentAuthState>) -> Router {
    Router::new()
        .route("/artworks", post(post_artwork))
        .layer(middleware::from_fn_with_state(auth, agent_auth_middleware))
        .with_state(state)
}
