//! AI adapters - provider clients and the failover gateway.

mod chatgpt_provider;
mod gateway;
mod gemini_provider;
mod mock_provider;

pub use chatgpt_provider::{ChatGptConfig, ChatGptProvider};
pub use gateway::ProviderGateway;
pub use gemini_provider::{GeminiConfig, GeminiProvider};
pub use mock_provider::MockProvider;
