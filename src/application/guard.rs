//! Authorization Guard.
//!
//! Validates that the caller is entitled to the requested orchestration
//! action. Decisions are made per call with no caching; failure is always
//! an explicit `UNAUTHORIZED`, never a default-allow.
//!
//! - End users may trigger analysis on their own artifacts only.
//! - Admins may read and write the provider settings. The admin variant is
//!   only constructed after the role check, and the guard re-matches on it
//!   for every call.
//! - Agents may only post AI-authored content; the bearer token was
//!   exact-matched before the agent principal exists.

use crate::domain::foundation::{AuthPrincipal, DomainError, UserId};

/// An action the guard can authorize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run the analysis pipeline on an artifact owned by `owner`.
    TriggerAnalysis { owner: UserId },
    /// Cancel or inspect a job owned by `owner`.
    ManageJob { owner: UserId },
    /// Read the active provider settings.
    ReadProviderSettings,
    /// Replace the active provider settings.
    WriteProviderSettings,
    /// Post AI-authored content under the reserved system profile.
    PostAgentContent,
}

/// Stateless authorization guard.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationGuard;

impl AuthorizationGuard {
    /// Creates the guard.
    pub fn new() -> Self {
        Self
    }

    /// Authorizes `principal` for `action`, failing closed.
    pub fn authorize(
        &self,
        principal: &AuthPrincipal,
        action: &Action,
    ) -> Result<(), DomainError> {
        let granted = match (principal, action) {
            (
                AuthPrincipal::EndUser { user_id, .. },
                Action::TriggerAnalysis { owner } | Action::ManageJob { owner },
            ) => user_id == owner,
            (AuthPrincipal::EndUser { .. }, _) => false,

            (
                AuthPrincipal::Admin { user_id, .. },
                Action::TriggerAnalysis { owner } | Action::ManageJob { owner },
            ) => user_id == owner,
            (
                AuthPrincipal::Admin { .. },
                Action::ReadProviderSettings | Action::WriteProviderSettings,
            ) => true,
            (AuthPrincipal::Admin { .. }, Action::PostAgentContent) => false,

            (AuthPrincipal::Agent { .. }, Action::PostAgentContent) => true,
            (AuthPrincipal::Agent { .. }, _) => false,
        };

        if granted {
            Ok(())
        } else {
            tracing::warn!(?action, "authorization denied");
            Err(DomainError::unauthorized("not entitled to this action"))
        }
    }
}
