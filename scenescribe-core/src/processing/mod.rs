//! Core pipeline logic and orchestration.
//!
//! This module hosts the segmentation, alignment, contextualization and cost
//! accounting stages of the pipeline, and the driver that composes them per
//! video.

/// Transcript turns -> semantic chapters
pub mod chapters;

/// Frames -> shots -> scenes
pub mod visual;

/// Chapter/scene timeline reconciliation
pub mod alignment;

/// Aligned scenes -> contextual scene documents
pub mod context;

/// Per-stage cost accumulation
pub mod cost;

/// Main per-video orchestration
pub mod pipeline;

pub use alignment::{align_scenes, AlignedChapter};
pub use chapters::{segment_chapters, ChapterSegment};
pub use context::{ContextualizationOutcome, SceneDocument};
pub use cost::{CostAccountant, CostRecord, CostStage};
pub use pipeline::{process_videos, RunSummary, VideoOutcome, VideoReport};
pub use visual::{build_visual_timeline, Frame, Scene, Shot, VisualTimeline};
