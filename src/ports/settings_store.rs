//! Provider Settings Port - the single admin-mutable provider selection.
//!
//! Exactly one active record exists at any time. The gateway reads it
//! through a TTL cache; admin writes invalidate the cache explicitly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ProviderKind;

/// The active provider selection.
///
/// Invariant: the fallback, if set, differs from the primary. Enforced at
/// construction so no store can hold an invalid record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    primary: ProviderKind,
    fallback: Option<ProviderKind>,
}

impl ProviderSettings {
    /// Creates a settings record, rejecting a fallback equal to the primary.
    pub fn new(
        primary: ProviderKind,
        fallback: Option<ProviderKind>,
    ) -> Result<Self, SettingsError> {
        if fallback == Some(primary) {
            return Err(SettingsError::FallbackEqualsPrimary { provider: primary });
        }
        Ok(Self { primary, fallback })
    }

    /// Creates a primary-only record.
    pub fn primary_only(primary: ProviderKind) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    /// The primary provider.
    pub fn primary(&self) -> ProviderKind {
        self.primary
    }

    /// The configured fallback, if any.
    pub fn fallback(&self) -> Option<ProviderKind> {
        self.fallback
    }
}

/// Port for loading and storing the active provider settings.
#[async_trait]
pub trait ProviderSettingsStore: Send + Sync {
    /// Loads the single active record.
    async fn load(&self) -> Result<ProviderSettings, SettingsError>;

    /// Replaces the single active record.
    async fn save(&self, settings: ProviderSettings) -> Result<(), SettingsError>;
}

/// Settings store errors.
#[derive(Debug, Clone, Error)]
pub enum SettingsError {
    /// Fallback must differ from primary.
    #[error("fallback provider '{provider}' equals the primary provider")]
    FallbackEqualsPrimary { provider: ProviderKind },

    /// Backing store failure.
    #[error("settings store error: {0}")]
    Storage(String),
}

impl SettingsError {
    /// Creates a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}
