//! Frame-embedding collaborator interface and HTTP adapter.
//!
//! The embedding service accepts one image and returns a fixed-dimension
//! float vector plus a cost estimate. Vector dimension is whatever the model
//! produces (e.g. 1024); the visual segmenter verifies all frames of a video
//! agree.

use crate::config::CollaboratorConfig;
use crate::error::CoreResult;
use crate::external::{build_blocking_client, map_reqwest_error};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Embedding result for one frame image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddingOutput {
    /// Fixed-dimension embedding vector.
    #[serde(alias = "embedding")]
    pub vector: Vec<f32>,
    /// Estimated service cost in dollars, if reported.
    #[serde(default)]
    pub estimated_cost: Option<f64>,
}

/// Trait for the frame-embedding collaborator. Implementations must be
/// shareable across the bounded embedding fan-out threads.
pub trait FrameEmbedder: Send + Sync {
    fn embed_frame(&self, image_path: &Path) -> CoreResult<EmbeddingOutput>;
}

/// HTTP implementation of `FrameEmbedder` posting JPEG bytes to a configured
/// endpoint.
pub struct HttpFrameEmbedder {
    config: CollaboratorConfig,
    client: reqwest::blocking::Client,
}

impl HttpFrameEmbedder {
    pub fn new(config: CollaboratorConfig) -> CoreResult<Self> {
        let client = build_blocking_client("embedding", &config)?;
        Ok(Self { config, client })
    }
}

impl FrameEmbedder for HttpFrameEmbedder {
    fn embed_frame(&self, image_path: &Path) -> CoreResult<EmbeddingOutput> {
        let image = std::fs::read(image_path)?;

        let mut request = self
            .client
            .post(&self.config.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
            .body(image);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| map_reqwest_error("embedding", e))?;

        response
            .json::<EmbeddingOutput>()
            .map_err(|e| map_reqwest_error("embedding", e))
    }
}
