//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `GenerationProvider` - outbound "generate content" capability
//! - `ProviderSettingsStore` - the single admin-mutable provider selection
//! - `ContentGateway` - artwork/content creation collaborator

mod content_gateway;
mod generation;
mod settings_store;

pub use content_gateway::{ContentError, ContentGateway, PostArtworkParams};
pub use generation::{
    GenerationError, GenerationOutcome, GenerationProvider, GenerationRequest, ProviderKind,
    ProviderResponse,
};
pub use settings_store::{ProviderSettings, ProviderSettingsStore, SettingsError};
