//! Generation Port - Interface for AI provider integrations.
//!
//! This port abstracts the outbound "generate content given a prompt and
//! parameters" capability. Providers are opaque: the orchestration core
//! knows their identifier, latency, and failure profile, never their
//! API shapes.
//!
//! # Design
//!
//! - One request, one text completion; streaming delivery is out of scope.
//! - Error variants distinguish transient failures (fallback-eligible)
//!   from terminal ones.
//! - Every response names the model that produced it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ArtworkId;
use crate::domain::persona::Persona;
use crate::domain::prompt::TaskType;

/// External AI backend identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    ChatGpt,
    Gemini,
}

impl ProviderKind {
    /// Wire name of the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::ChatGpt => "chatgpt",
            ProviderKind::Gemini => "gemini",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Port for AI generation backends.
///
/// Implementations connect to external services (ChatGPT, Gemini) and
/// translate between the provider-specific API and our domain types.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a single completion for the request.
    async fn generate(&self, request: &GenerationRequest)
        -> Result<ProviderResponse, GenerationError>;

    /// Which backend this provider talks to.
    fn kind(&self) -> ProviderKind;

    /// Model identifier used for requests (e.g. "gpt-4o-mini").
    fn model(&self) -> &str;
}

/// Request for one generation call.
///
/// Constructed fresh per call and never mutated after dispatch.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The analysis dimension this call serves.
    pub task_type: TaskType,
    /// Fully-expanded prompt: persona tone framing plus catalog instructions.
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Output budget in tokens.
    pub max_output_tokens: u32,
    /// Persona fronting the response.
    pub persona: Persona,
    /// The artifact under analysis.
    pub artifact_ref: ArtworkId,
}

impl GenerationRequest {
    /// Creates a request with default parameters.
    pub fn new(
        task_type: TaskType,
        prompt: impl Into<String>,
        persona: Persona,
        artifact_ref: ArtworkId,
    ) -> Self {
        Self {
            task_type,
            prompt: prompt.into(),
            temperature: 0.5,
            max_output_tokens: 1024,
            persona,
            artifact_ref,
        }
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the output token budget.
    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = max;
        self
    }
}

/// Raw response from a provider.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Generated text.
    pub content: String,
    /// Model that generated the response.
    pub model: String,
}

/// Outcome of a gateway generation: the response plus provenance tags.
///
/// `provider_used` names the provider that actually produced the content;
/// outputs from two providers are never merged for one task.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub content: String,
    pub model: String,
    pub provider_used: ProviderKind,
    pub fallback_used: bool,
}

/// Generation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    /// Rate limited by the provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// Provider returned a server-side error.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// Network failure during the request.
    #[error("network error: {0}")]
    Network(String),

    /// The call exceeded its time budget.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },

    /// Provider returned no usable content.
    #[error("empty output from provider")]
    EmptyOutput,

    /// Provider response could not be parsed.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// API key rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The request itself was invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Terminal: both the primary attempt and the single fallback hop
    /// failed (or no fallback was configured). Never retried further.
    #[error("provider unavailable after fallback: {message}")]
    ProviderUnavailable { message: String },
}

impl GenerationError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates the terminal exhaustion error.
    pub fn exhausted(message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            message: message.into(),
        }
    }

    /// True if this failure is eligible for the single fallback hop:
    /// timeouts, rate limits, provider-side errors, and empty or
    /// malformed output.
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(
            self,
            GenerationError::RateLimited { .. }
                | GenerationError::Unavailable { .. }
                | GenerationError::Network(_)
                | GenerationError::Timeout { .. }
                | GenerationError::EmptyOutput
                | GenerationError::MalformedResponse(_)
        )
    }
}
