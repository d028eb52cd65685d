//! HTTP routes for provider settings endpoints.

use axum::{
    routing::{get, put},
    Router,
};

use super::handlers::{get_provider_settings, update_provider_settings, SettingsState};

/// Creates the settings router with all endpoints.
pub fn settings_routes(state: SettingsState) -> Router {
    Router::new()
        .route("/providers", get(get_provider_settings))
        .route("/providers", put(update_provider_settings))
        .with_state(state)
}
