// scenescribe-core/tests/common/mod.rs
//
// Scripted substitute collaborators for pipeline integration tests.

#![allow(dead_code)]

use scenescribe_core::error::{CoreError, CoreResult};
use scenescribe_core::external::{
    EmbeddingOutput, FrameEmbedder, FrameExtractor, SampledFrame, SceneNarration, SceneNarrator,
    StreamInfo, StreamProber, TranscriptionOutput, Transcriber,
};
use scenescribe_core::notifications::Notifier;

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Prober returning a fixed `StreamInfo` for every input.
pub struct MockStreamProber {
    pub info: StreamInfo,
}

impl MockStreamProber {
    pub fn with_duration_ms(duration_ms: u64) -> Self {
        Self {
            info: StreamInfo {
                duration_ms,
                frame_rate: 25.0,
                width: 1280,
                height: 720,
            },
        }
    }
}

impl StreamProber for MockStreamProber {
    fn probe(&self, _input_path: &Path) -> CoreResult<StreamInfo> {
        Ok(self.info.clone())
    }
}

/// Extractor writing `frame_count` dummy JPEG files into the output dir.
pub struct MockFrameExtractor {
    pub frame_count: usize,
}

impl FrameExtractor for MockFrameExtractor {
    fn extract_frames(
        &self,
        _input_path: &Path,
        _stream_info: &StreamInfo,
        interval_ms: u64,
        _size: (u32, u32),
        output_dir: &Path,
    ) -> CoreResult<Vec<SampledFrame>> {
        std::fs::create_dir_all(output_dir)?;
        let mut frames = Vec::with_capacity(self.frame_count);
        for n in 0..self.frame_count {
            let path = output_dir.join(format!("frames.{n}.jpg"));
            let mut file = File::create(&path)?;
            file.write_all(b"\xff\xd8\xff\xe0 not a real jpeg")?;
            frames.push(SampledFrame {
                timestamp_ms: n as u64 * interval_ms,
                path,
            });
        }
        Ok(frames)
    }
}

/// Embedder returning a scripted vector per frame index (parsed from the
/// `frames.<n>.jpg` filename), cycling through `block_vectors` every
/// `block_len` frames.
pub struct MockFrameEmbedder {
    pub block_vectors: Vec<Vec<f32>>,
    pub block_len: usize,
    pub cost_per_frame: Option<f64>,
}

impl MockFrameEmbedder {
    fn frame_index(path: &Path) -> CoreResult<usize> {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix("frames."))
            .and_then(|n| n.strip_suffix(".jpg"))
            .and_then(|n| n.parse::<usize>().ok())
            .ok_or_else(|| CoreError::CollaboratorFailure {
                collaborator: "embedding".to_string(),
                message: format!("unexpected frame path {}", path.display()),
            })
    }
}

impl FrameEmbedder for MockFrameEmbedder {
    fn embed_frame(&self, image_path: &Path) -> CoreResult<EmbeddingOutput> {
        let index = Self::frame_index(image_path)?;
        let block = (index / self.block_len) % self.block_vectors.len();
        Ok(EmbeddingOutput {
            vector: self.block_vectors[block].clone(),
            estimated_cost: self.cost_per_frame,
        })
    }
}

/// Transcriber with a scripted response per input filename.
#[derive(Default)]
pub struct MockTranscriber {
    pub responses: HashMap<String, TranscriptionOutput>,
}

impl MockTranscriber {
    pub fn with_response(filename: &str, output: TranscriptionOutput) -> Self {
        let mut transcriber = Self::default();
        transcriber.responses.insert(filename.to_string(), output);
        transcriber
    }

    pub fn add_response(&mut self, filename: &str, output: TranscriptionOutput) {
        self.responses.insert(filename.to_string(), output);
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, input_path: &Path) -> CoreResult<TranscriptionOutput> {
        let filename = input_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.responses
            .get(&filename)
            .cloned()
            .ok_or_else(|| CoreError::CollaboratorFailure {
                collaborator: "transcription".to_string(),
                message: format!("no scripted response for {filename}"),
            })
    }
}

/// Narrator that fails whenever a representative frame path contains the
/// configured marker, otherwise describes the scene from its inputs.
#[derive(Default)]
pub struct MockSceneNarrator {
    pub fail_marker: Option<String>,
    pub cost_per_scene: Option<f64>,
    pub calls: Mutex<usize>,
}

impl SceneNarrator for MockSceneNarrator {
    fn describe_scene(&self, frames: &[PathBuf], chapter_text: &str) -> CoreResult<SceneNarration> {
        *self.calls.lock().unwrap() += 1;
        if let Some(marker) = &self.fail_marker {
            if frames.iter().any(|f| f.to_string_lossy().contains(marker.as_str())) {
                return Err(CoreError::CollaboratorFailure {
                    collaborator: "contextualization".to_string(),
                    message: "scripted failure".to_string(),
                });
            }
        }
        Ok(SceneNarration {
            description: format!(
                "{} frames in the context of: {chapter_text}",
                frames.len()
            ),
            estimated_cost: self.cost_per_scene,
        })
    }
}

/// Notifier recording every message it is asked to send.
#[derive(Default)]
pub struct MockNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl Notifier for MockNotifier {
    fn send(
        &self,
        topic_url: &str,
        message: &str,
        _title: Option<&str>,
        _priority: Option<u8>,
    ) -> CoreResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((topic_url.to_string(), message.to_string()));
        Ok(())
    }
}
