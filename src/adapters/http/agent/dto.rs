//! DTOs for the agent (machine-to-machine) endpoints.

use serde::{Deserialize, Serialize};

/// POST /api/agent/artworks request body.
#[derive(Debug, Deserialize)]
pub struct PostArtworkRequestDto {
    /// The completed analysis job backing this record.
    pub job_id: String,
    pub title: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub ai_context: String,
}

/// POST /api/agent/artworks response body.
#[derive(Debug, Serialize)]
pub struct PostArtworkResponse {
    pub artwork_id: String,
}
