//! DTOs for provider settings endpoints.

use serde::{Deserialize, Serialize};

use crate::ports::{ProviderKind, ProviderSettings};

/// GET /api/settings/providers response body.
#[derive(Debug, Serialize)]
pub struct ProviderSettingsResponse {
    pub primary_provider: ProviderKind,
    pub fallback_provider: Option<ProviderKind>,
}

impl From<ProviderSettings> for ProviderSettingsResponse {
    fn from(settings: ProviderSettings) -> Self {
        Self {
            primary_provider: settings.primary(),
            fallback_provider: settings.fallback(),
        }
    }
}

/// PUT /api/settings/providers request body.
#[derive(Debug, Deserialize)]
pub struct UpdateProviderSettingsRequest {
    pub primary_provider: ProviderKind,
    pub fallback_provider: Option<ProviderKind>,
}
