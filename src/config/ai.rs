//! AI provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::ports::ProviderKind;

/// AI provider configuration
///
/// Holds the API keys for the generation backends plus the boot-time
/// default provider selection. The runtime selection (admin-mutable) lives
/// behind the `ProviderSettingsStore` port; these values only seed it.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// ChatGPT (OpenAI-compatible) API key
    pub chatgpt_api_key: Option<Secret<String>>,

    /// Gemini API key
    pub gemini_api_key: Option<Secret<String>>,

    /// Primary AI provider
    #[serde(default = "default_provider")]
    pub primary_provider: ProviderKind,

    /// Fallback AI provider
    pub fallback_provider: Option<ProviderKind>,

    /// Per-generation-call timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// TTL for the cached provider-settings record, in seconds
    #[serde(default = "default_settings_cache_ttl")]
    pub settings_cache_ttl_secs: u64,

    /// Maximum tokens requested per generation call
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl AiConfig {
    /// Get the per-call timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the settings cache TTL as a Duration
    pub fn settings_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.settings_cache_ttl_secs)
    }

    /// Check if ChatGPT is configured
    pub fn has_chatgpt(&self) -> bool {
        self.chatgpt_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    /// Check if Gemini is configured
    pub fn has_gemini(&self) -> bool {
        self.gemini_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    fn has_key_for(&self, provider: ProviderKind) -> bool {
        match provider {
            ProviderKind::ChatGpt => self.has_chatgpt(),
            ProviderKind::Gemini => self.has_gemini(),
        }
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_chatgpt() && !self.has_gemini() {
            return Err(ValidationError::NoProviderConfigured);
        }

        if !self.has_key_for(self.primary_provider) {
            return Err(match self.primary_provider {
                ProviderKind::ChatGpt => ValidationError::MissingRequired("CHATGPT_API_KEY"),
                ProviderKind::Gemini => ValidationError::MissingRequired("GEMINI_API_KEY"),
            });
        }

        if let Some(fallback) = self.fallback_provider {
            if fallback == self.primary_provider {
                return Err(ValidationError::FallbackEqualsPrimary);
            }
            if !self.has_key_for(fallback) {
                return Err(match fallback {
                    ProviderKind::ChatGpt => ValidationError::MissingRequired("CHATGPT_API_KEY"),
                    ProviderKind::Gemini => ValidationError::MissingRequired("GEMINI_API_KEY"),
                });
            }
        }

        if self.settings_cache_ttl_secs == 0 {
            return Err(ValidationError::InvalidSettingsCacheTtl);
        }

        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            chatgpt_api_key: None,
            gemini_api_key: None,
            primary_provider: default_provider(),
            fallback_provider: None,
            timeout_secs: default_timeout(),
            settings_cache_ttl_secs: default_settings_cache_ttl(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

fn default_provider() -> ProviderKind {
    ProviderKind::ChatGpt
}

fn default_timeout() -> u64 {
    60
}

fn default_settings_cache_ttl() -> u64 {
    30
}

fn default_max_output_tokens() -> u32 {
    1024
}
