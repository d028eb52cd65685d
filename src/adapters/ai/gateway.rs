//! Provider Gateway - uniform generation capability with failover.
//!
//! Wraps the registered providers behind a single `generate` entry point.
//! The active primary/fallback selection comes from the cached settings
//! record. On a transient failure (timeout, rate limit, server error) or
//! blank output from the primary, the gateway retries exactly once against
//! the configured fallback, provided it differs from the provider just
//! tried. The retry budget is one fallback hop; exhaustion is terminal.
//!
//! Every outcome is tagged with the provider that actually produced it.
//! Outputs from two providers are never merged for one task.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::settings::CachedSettings;
use crate::ports::{
    GenerationError, GenerationOutcome, GenerationProvider, GenerationRequest, ProviderKind,
};

/// Gateway over the registered generation providers.
pub struct ProviderGateway {
    providers: HashMap<ProviderKind, Arc<dyn GenerationProvider>>,
    settings: Arc<CachedSettings>,
    call_timeout: Duration,
}

impl ProviderGateway {
    /// Creates a gateway with no registered providers.
    pub fn new(settings: Arc<CachedSettings>, call_timeout: Duration) -> Self {
        Self {
            providers: HashMap::new(),
            settings,
            call_timeout,
        }
    }

    /// Registers a provider implementation for its backend.
    pub fn with_provider(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    /// Runs one generation call with the primary/fallback policy.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        let settings = self
            .settings
            .get()
            .await
            .map_err(|e| GenerationError::unavailable(format!("settings unavailable: {}", e)))?;

        let primary = settings.primary();
        let primary_err = match self.attempt(primary, request).await {
            Ok(outcome) => return Ok(outcome),
            Err(err) => err,
        };

        if !primary_err.is_fallback_eligible() {
            return Err(primary_err);
        }

        let fallback = match settings.fallback().filter(|f| *f != primary) {
            Some(fallback) => fallback,
            None => {
                tracing::error!(
                    provider = %primary,
                    error = %primary_err,
                    "generation failed with no fallback configured"
                );
                return Err(GenerationError::exhausted(format!(
                    "{} failed ({}), no fallback configured",
                    primary, primary_err
                )));
            }
        };

        tracing::warn!(
            primary = %primary,
            fallback = %fallback,
            reason = %primary_err,
            task = request.task_type.as_str(),
            "falling back to secondary provider"
        );

        match self.attempt(fallback, request).await {
            Ok(outcome) => Ok(GenerationOutcome {
                fallback_used: true,
                ..outcome
            }),
            Err(fallback_err) => {
                tracing::error!(
                    primary = %primary,
                    fallback = %fallback,
                    error = %fallback_err,
                    "both providers exhausted"
                );
                Err(GenerationError::exhausted(format!(
                    "{} failed ({}), fallback {} failed ({})",
                    primary, primary_err, fallback, fallback_err
                )))
            }
        }
    }

    /// One attempt against one provider, with the per-call time budget.
    async fn attempt(
        &self,
        kind: ProviderKind,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        let provider = self
            .providers
            .get(&kind)
            .ok_or_else(|| GenerationError::unavailable(format!("{} is not registered", kind)))?;

        let response = tokio::time::timeout(self.call_timeout, provider.generate(request))
            .await
            .map_err(|_| GenerationError::Timeout {
                timeout_secs: self.call_timeout.as_secs() as u32,
            })??;

        if response.content.trim().is_empty() {
            return Err(GenerationError::EmptyOutput);
        }

        Ok(GenerationOutcome {
            content: response.content,
            model: response.model,
            provider_used: kind,
            fallback_used: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockProvider;
    use crate::adapters::settings::InMemorySettingsStore;
    use crate::domain::foundation::ArtworkId;
    use crate::domain::persona::Persona;
    use crate::domain::prompt::TaskType;
    use crate::ports::ProviderSettings;

    fn request() -> GenerationRequest {
        GenerationRequest::new(
            TaskType::Description,
            "Describe the artwork",
            Persona::Mentor,
            ArtworkId::new(),
        )
    }

    fn settings_with_fallback() -> Arc<CachedSettings> {
        let store = Arc::new(InMemorySettingsStore::new(
            ProviderSettings::new(ProviderKind::ChatGpt, Some(ProviderKind::Gemini)).unwrap(),
        ));
        Arc::new(CachedSettings::new(store, Duration::from_secs(60)))
    }

    fn settings_primary_only() -> Arc<CachedSettings> {
        let store = Arc::new(InMemorySettingsStore::new(ProviderSettings::primary_only(
            ProviderKind::ChatGpt,
        )));
        Arc::new(CachedSettings::new(store, Duration::from_secs(60)))
    }

    fn gateway(
        settings: Arc<CachedSettings>,
        primary: MockProvider,
        fallback: Option<MockProvider>,
    ) -> (ProviderGateway, Arc<MockProvider>, Option<Arc<MockProvider>>) {
        let primary = Arc::new(primary);
        let fallback = fallback.map(Arc::new);
        let mut gw = ProviderGateway::new(settings, Duration::from_secs(5))
            .with_provider(primary.clone() as Arc<dyn GenerationProvider>);
        if let Some(ref f) = fallback {
            gw = gw.with_provider(f.clone() as Arc<dyn GenerationProvider>);
        }
        (gw, primary, fallback)
    }

    #[tokio::test]
    async fn primary_success_is_tagged_and_single_attempt() {
        let primary = MockProvider::new(ProviderKind::ChatGpt).with_response("A painting.");
        let fallback = MockProvider::new(ProviderKind::Gemini).with_response("unused");
        let (gw, primary, fallback) = gateway(settings_with_fallback(), primary, Some(fallback));

        let outcome = gw.generate(&request()).await.unwrap();

        assert_eq!(outcome.content, "A painting.");
        assert_eq!(outcome.provider_used, ProviderKind::ChatGpt);
        assert!(!outcome.fallback_used);
        assert_eq!(primary.call_count(), 1);
        assert_eq!(fallback.unwrap().call_count(), 0);
    }

    #[tokio::test]
    async fn transient_failure_uses_fallback_once() {
        let primary = MockProvider::new(ProviderKind::ChatGpt)
            .with_error(GenerationError::RateLimited { retry_after_secs: 30 });
        let fallback = MockProvider::new(ProviderKind::Gemini).with_response("From fallback");
        let (gw, primary, fallback) = gateway(settings_with_fallback(), primary, Some(fallback));

        let outcome = gw.generate(&request()).await.unwrap();

        assert_eq!(outcome.content, "From fallback");
        assert_eq!(outcome.provider_used, ProviderKind::Gemini);
        assert!(outcome.fallback_used);
        assert_eq!(primary.call_count(), 1);
        assert_eq!(fallback.unwrap().call_count(), 1);
    }

    #[tokio::test]
    async fn empty_output_is_fallback_eligible() {
        let primary = MockProvider::new(ProviderKind::ChatGpt).with_response("   ");
        let fallback = MockProvider::new(ProviderKind::Gemini).with_response("Real content");
        let (gw, _, _) = gateway(settings_with_fallback(), primary, Some(fallback));

        let outcome = gw.generate(&request()).await.unwrap();

        assert_eq!(outcome.content, "Real content");
        assert!(outcome.fallback_used);
    }

    #[tokio::test]
    async fn no_fallback_configured_means_exactly_one_attempt() {
        let primary = MockProvider::new(ProviderKind::ChatGpt)
            .with_error(GenerationError::unavailable("down"));
        let (gw, primary, _) = gateway(settings_primary_only(), primary, None);

        let err = gw.generate(&request()).await.unwrap_err();

        assert!(matches!(err, GenerationError::ProviderUnavailable { .. }));
        assert_eq!(primary.call_count(), 1);
    }

    #[tokio::test]
    async fn non_transient_failure_skips_fallback() {
        let primary =
            MockProvider::new(ProviderKind::ChatGpt).with_error(GenerationError::AuthenticationFailed);
        let fallback = MockProvider::new(ProviderKind::Gemini).with_response("unused");
        let (gw, _, fallback) = gateway(settings_with_fallback(), primary, Some(fallback));

        let err = gw.generate(&request()).await.unwrap_err();

        assert!(matches!(err, GenerationError::AuthenticationFailed));
        assert_eq!(fallback.unwrap().call_count(), 0);
    }

    #[tokio::test]
    async fn both_providers_failing_is_terminal() {
        let primary = MockProvider::new(ProviderKind::ChatGpt)
            .with_error(GenerationError::unavailable("down"));
        let fallback = MockProvider::new(ProviderKind::Gemini)
            .with_error(GenerationError::unavailable("also down"));
        let (gw, primary, fallback) = gateway(settings_with_fallback(), primary, Some(fallback));

        let err = gw.generate(&request()).await.unwrap_err();

        assert!(matches!(err, GenerationError::ProviderUnavailable { .. }));
        // Exactly one attempt each, never more
        assert_eq!(primary.call_count(), 1);
        assert_eq!(fallback.unwrap().call_count(), 1);
    }

    #[tokio::test]
    async fn slow_provider_hits_the_call_timeout() {
        let primary = MockProvider::new(ProviderKind::ChatGpt)
            .with_response("too late")
            .with_delay(Duration::from_millis(200));
        let fallback = MockProvider::new(ProviderKind::Gemini).with_response("Fast answer");
        let primary = Arc::new(primary);
        let fallback = Arc::new(fallback);

        let gw = ProviderGateway::new(settings_with_fallback(), Duration::from_millis(20))
            .with_provider(primary.clone() as Arc<dyn GenerationProvider>)
            .with_provider(fallback.clone() as Arc<dyn GenerationProvider>);

        let outcome = gw.generate(&request()).await.unwrap();

        assert_eq!(outcome.content, "Fast answer");
        assert!(outcome.fallback_used);
    }

    #[tokio::test]
    async fn unregistered_primary_falls_back() {
        let fallback = MockProvider::new(ProviderKind::Gemini).with_response("Covering");
        let fallback = Arc::new(fallback);
        let gw = ProviderGateway::new(settings_with_fallback(), Duration::from_secs(5))
            .with_provider(fallback.clone() as Arc<dyn GenerationProvider>);

        let outcome = gw.generate(&request()).await.unwrap();

        assert_eq!(outcome.provider_used, ProviderKind::Gemini);
        assert!(outcome.fallback_used);
    }
}
