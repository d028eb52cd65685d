//! Content Gateway Port - the boundary into artwork/content CRUD.
//!
//! The orchestration core's only obligation at this boundary is to hand
//! over a fully-populated `AgentMetadata`; partial jobs never cross it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::analysis::AgentMetadata;
use crate::domain::foundation::{ArtworkId, DomainError, ErrorCode};

/// Parameters for posting an AI-authored artwork record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostArtworkParams {
    pub title: String,
    pub images: Vec<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    /// Always true for content crossing this boundary.
    pub ai_generated: bool,
    /// Free-form provenance note shown alongside the record.
    pub ai_context: String,
    /// Raw per-task results for downstream display, if retained.
    pub analysis_results: Option<serde_json::Value>,
    pub metadata: AgentMetadata,
}

/// Port for the content-creation collaborator.
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// Posts an artwork record under the given profile id.
    async fn post_artwork(
        &self,
        profile_id: &str,
        params: PostArtworkParams,
    ) -> Result<ArtworkId, ContentError>;
}

/// Content boundary errors.
#[derive(Debug, Clone, Error)]
pub enum ContentError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("accessibility metadata rejected: {0}")]
    Accessibility(String),

    #[error("image processing failed: {0}")]
    ImageProcessing(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ContentError {
    /// The caller-facing error code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            ContentError::InvalidInput(_) => ErrorCode::InvalidInput,
            ContentError::Database(_) => ErrorCode::DatabaseError,
            ContentError::Accessibility(_) => ErrorCode::AccessibilityError,
            ContentError::ImageProcessing(_) => ErrorCode::ImageProcessingError,
            ContentError::Unexpected(_) => ErrorCode::UnexpectedError,
        }
    }
}

impl From<ContentError> for DomainError {
    fn from(err: ContentError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
