//! In-memory content gateway.
//!
//! Records posted artworks for inspection. The production deployment backs
//! the `ContentGateway` port with the managed artwork CRUD service; tests
//! and local runs use this recording implementation.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::foundation::ArtworkId;
use crate::ports::{ContentError, ContentGateway, PostArtworkParams};

/// A recorded posting.
#[derive(Debug, Clone)]
pub struct PostedArtwork {
    pub artwork_id: ArtworkId,
    pub profile_id: String,
    pub params: PostArtworkParams,
}

/// Recording content gateway for tests and local runs.
#[derive(Default)]
pub struct InMemoryContentGateway {
    posted: Mutex<Vec<PostedArtwork>>,
    fail_with: Mutex<Option<ContentError>>,
}

impl InMemoryContentGateway {
    /// Creates an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next postings fail with the given error.
    pub async fn set_failure(&self, error: Option<ContentError>) {
        *self.fail_with.lock().await = error;
    }

    /// Returns all recorded postings.
    pub async fn posted(&self) -> Vec<PostedArtwork> {
        self.posted.lock().await.clone()
    }

    /// Number of recorded postings.
    pub async fn posted_count(&self) -> usize {
        self.posted.lock().await.len()
    }
}

#[async_trait]
impl ContentGateway for InMemoryContentGateway {
    async fn post_artwork(
        &self,
        profile_id: &str,
        params: PostArtworkParams,
    ) -> Result<ArtworkId, ContentError> {
        if let Some(err) = self.fail_with.lock().await.clone() {
            return Err(err);
        }

        if params.title.trim().is_empty() {
            return Err(ContentError::InvalidInput("title cannot be empty".into()));
        }
        if !params.ai_generated {
            return Err(ContentError::InvalidInput(
                "this boundary only accepts AI-authored content".into(),
            ));
        }

        let artwork_id = ArtworkId::new();
        self.posted.lock().await.push(PostedArtwork {
            artwork_id,
            profile_id: profile_id.to_string(),
            params,
        });
        Ok(artwork_id)
    }
}
