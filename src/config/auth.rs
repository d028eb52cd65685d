//! Authentication and agent-access configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Authentication configuration
///
/// The end-user session validation itself happens in the managed auth
/// backend; this section only carries what the orchestration core needs:
/// the shared secret for the machine-to-machine agent path and the
/// reserved system profile id that AI-authored content is posted under.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared-secret bearer token for the agent (machine-to-machine) path
    pub agent_token: Option<Secret<String>>,

    /// Reserved profile id that AI-authored artworks are posted under
    #[serde(default = "default_system_profile_id")]
    pub system_profile_id: String,
}

impl AuthConfig {
    /// Check if an agent token is configured and non-empty
    pub fn has_agent_token(&self) -> bool {
        self.agent_token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().is_empty())
    }

    /// Validate auth configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if *environment != Environment::Development && !self.has_agent_token() {
            return Err(ValidationError::MissingAgentToken);
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            agent_token: None,
            system_profile_id: default_system_profile_id(),
        }
    }
}

fn default_system_profile_id() -> String {
    "atelier-agent".to_string()
}
