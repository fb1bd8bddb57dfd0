//! Vision-language contextualization collaborator interface and HTTP adapter.
//!
//! The contextualization service accepts a scene's representative frames plus
//! the owning chapter's transcript text and returns a natural-language
//! description of the scene in its narrative context.

use crate::config::CollaboratorConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{build_blocking_client, map_reqwest_error};

use reqwest::blocking::multipart;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Contextual description produced for one scene.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneNarration {
    /// Natural-language description combining visual and transcript context.
    pub description: String,
    /// Estimated service cost in dollars, if reported.
    #[serde(default)]
    pub estimated_cost: Option<f64>,
}

/// Trait for the contextualization collaborator. Implementations must be
/// shareable across concurrent per-scene calls.
pub trait SceneNarrator: Send + Sync {
    fn describe_scene(&self, frames: &[PathBuf], chapter_text: &str) -> CoreResult<SceneNarration>;
}

/// HTTP implementation of `SceneNarrator` sending a multipart request with
/// the chapter text and the representative frame images.
pub struct HttpSceneNarrator {
    config: CollaboratorConfig,
    client: reqwest::blocking::Client,
}

impl HttpSceneNarrator {
    pub fn new(config: CollaboratorConfig) -> CoreResult<Self> {
        let client = build_blocking_client("contextualization", &config)?;
        Ok(Self { config, client })
    }
}

impl SceneNarrator for HttpSceneNarrator {
    fn describe_scene(&self, frames: &[PathBuf], chapter_text: &str) -> CoreResult<SceneNarration> {
        let mut form = multipart::Form::new().text("chapter_text", chapter_text.to_string());

        for (index, frame) in frames.iter().enumerate() {
            let bytes = std::fs::read(frame)?;
            let filename = frame
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| format!("frame{index}.jpg"));
            let part = multipart::Part::bytes(bytes)
                .file_name(filename)
                .mime_str("image/jpeg")
                .map_err(|e| CoreError::CollaboratorFailure {
                    collaborator: "contextualization".to_string(),
                    message: format!("invalid frame part for {}: {e}", frame.display()),
                })?;
            form = form.part(format!("frame{index}"), part);
        }

        let mut request = self.client.post(&self.config.endpoint).multipart(form);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| map_reqwest_error("contextualization", e))?;

        response
            .json::<SceneNarration>()
            .map_err(|e| map_reqwest_error("contextualization", e))
    }
}
