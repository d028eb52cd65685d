//! Mock Generation Provider for testing.
//!
//! Provides a configurable mock implementation of the GenerationProvider
//! port, allowing tests to run without calling real AI APIs.
//!
//! # Features
//!
//! - Pre-configured responses, consumed in order
//! - Simulated delays for timeout testing
//! - Error injection for resilience testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockProvider::new(ProviderKind::ChatGpt)
//!     .with_response("Oil Paint, Watercolor")
//!     .with_delay(Duration::from_millis(100));
//!
//! let response = provider.generate(&request).await?;
//! assert_eq!(response.content, "Oil Paint, Watercolor");
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::prompt::TaskType;
use crate::ports::{
    GenerationError, GenerationProvider, GenerationRequest, ProviderKind, ProviderResponse,
};

/// A configured mock response.
#[derive(Debug, Clone)]
enum MockResponse {
    Success(String),
    Error(GenerationError),
}

/// Mock generation provider for testing.
///
/// Configurable to return specific responses, simulate delays, or inject
/// errors. Returns a default response once the queue is exhausted.
#[derive(Debug, Clone)]
pub struct MockProvider {
    kind: ProviderKind,
    model: String,
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Task-keyed responses, checked before the queue. Needed when calls
    /// arrive concurrently and queue order would be nondeterministic.
    task_responses: Arc<Mutex<HashMap<TaskType, MockResponse>>>,
    delay: Duration,
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockProvider {
    /// Creates a new mock provider posing as the given backend.
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            model: format!("{}-mock", kind.as_str()),
            responses: Arc::new(Mutex::new(VecDeque::new())),
            task_responses: Arc::new(Mutex::new(HashMap::new())),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockResponse::Success(content.into()));
        self
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: GenerationError) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockResponse::Error(error));
        self
    }

    /// Fixes the response for one task type, regardless of call order.
    pub fn with_task_response(self, task: TaskType, content: impl Into<String>) -> Self {
        self.task_responses
            .lock()
            .unwrap()
            .insert(task, MockResponse::Success(content.into()));
        self
    }

    /// Fixes an error for one task type, regardless of call order.
    pub fn with_task_error(self, task: TaskType, error: GenerationError) -> Self {
        self.task_responses
            .lock()
            .unwrap()
            .insert(task, MockResponse::Error(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the reported model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn next_response(&self, task: TaskType) -> MockResponse {
        if let Some(response) = self.task_responses.lock().unwrap().get(&task) {
            return response.clone();
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success("Mock response".to_string()))
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<ProviderResponse, GenerationError> {
        self.calls.lock().unwrap().push(request.clone());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response(request.task_type) {
            MockResponse::Success(content) => Ok(ProviderResponse {
                content,
                model: self.model.clone(),
            }),
            MockResponse::Error(err) => Err(err),
        }
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ArtworkId;
    use crate::domain::persona::Persona;
    use crate::domain::prompt::TaskType;

    fn request() -> GenerationRequest {
        GenerationRequest::new(
            TaskType::Style,
            "List styles",
            Persona::Guide,
            ArtworkId::new(),
        )
    }

    #[tokio::test]
    async fn returns_configured_responses_in_order() {
        let provider = MockProvider::new(ProviderKind::ChatGpt)
            .with_response("First")
            .with_response("Second");

        let r1 = provider.generate(&request()).await.unwrap();
        let r2 = provider.generate(&request()).await.unwrap();

        assert_eq!(r1.content, "First");
        assert_eq!(r2.content, "Second");
        assert_eq!(r1.model, "chatgpt-mock");
    }

    #[tokio::test]
    async fn returns_default_after_queue_exhausted() {
        let provider = MockProvider::new(ProviderKind::Gemini).with_response("Only one");

        provider.generate(&request()).await.unwrap();
        let r = provider.generate(&request()).await.unwrap();
        assert_eq!(r.content, "Mock response");
    }

    #[tokio::test]
    async fn returns_configured_error() {
        let provider = MockProvider::new(ProviderKind::ChatGpt)
            .with_error(GenerationError::RateLimited { retry_after_secs: 30 });

        let err = provider.generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::RateLimited { retry_after_secs: 30 }));
    }

    #[tokio::test]
    async fn tracks_calls() {
        let provider = MockProvider::new(ProviderKind::ChatGpt);
        assert_eq!(provider.call_count(), 0);

        provider.generate(&request()).await.unwrap();
        provider.generate(&request()).await.unwrap();

        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.calls()[0].task_type, TaskType::Style);
    }

    #[tokio::test]
    async fn task_keyed_responses_ignore_call_order() {
        let provider = MockProvider::new(ProviderKind::ChatGpt)
            .with_task_response(TaskType::Style, "Cubism")
            .with_task_error(
                TaskType::Keywords,
                GenerationError::unavailable("down"),
            );

        let mut style_request = request();
        style_request.task_type = TaskType::Style;
        let mut keywords_request = request();
        keywords_request.task_type = TaskType::Keywords;

        // Keywords first, style second; responses still match the task
        assert!(provider.generate(&keywords_request).await.is_err());
        let r = provider.generate(&style_request).await.unwrap();
        assert_eq!(r.content, "Cubism");
    }

    #[tokio::test]
    async fn respects_delay() {
        let provider = MockProvider::new(ProviderKind::ChatGpt)
            .with_response("Delayed")
            .with_delay(Duration::from_millis(50));

        let start = std::time::Instant::now();
        provider.generate(&request()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
