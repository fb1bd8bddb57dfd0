//! Core library for turning long-form video into time-bounded, semantically
//! contextualized scene documents suitable for embedding and retrieval.
//!
//! The pipeline reconciles two independently computed timelines — a
//! transcript-derived chapter timeline and a vision-derived shot/scene/frame
//! timeline — into one nested structure, then emits one contextual document
//! per scene with provenance metadata.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use scenescribe_core::{CancellationToken, CoreConfig, CostAccountant, process_videos};
//! use scenescribe_core::config::CollaboratorConfig;
//! use scenescribe_core::external::{
//!     CrateFfprobeExecutor, HttpFrameEmbedder, HttpSceneNarrator, HttpTranscriber,
//!     SidecarFrameExtractor,
//! };
//! use scenescribe_core::notifications::NtfyNotifier;
//! use std::path::PathBuf;
//!
//! let config = CoreConfig::new(PathBuf::from("/videos"), PathBuf::from("/out"));
//! config.validate().unwrap();
//!
//! let files = scenescribe_core::find_processable_files(&config.input_dir).unwrap();
//! let transcriber =
//!     HttpTranscriber::new(CollaboratorConfig::new("https://models.example/transcribe")).unwrap();
//! let embedder =
//!     HttpFrameEmbedder::new(CollaboratorConfig::new("https://models.example/embed")).unwrap();
//! let narrator =
//!     HttpSceneNarrator::new(CollaboratorConfig::new("https://models.example/describe")).unwrap();
//! let notifier = NtfyNotifier::new().unwrap();
//!
//! let accountant = CostAccountant::new();
//! let cancel = CancellationToken::new();
//! let summary = process_videos(
//!     &CrateFfprobeExecutor::new(),
//!     &SidecarFrameExtractor::new(),
//!     &transcriber,
//!     &embedder,
//!     &narrator,
//!     Some(&notifier),
//!     &config,
//!     &files,
//!     &accountant,
//!     &cancel,
//! )
//! .unwrap();
//! println!("{}", summary.format());
//! ```

pub mod cancel;
pub mod config;
pub mod discovery;
pub mod error;
pub mod external;
pub mod notifications;
pub mod processing;
pub mod retry;
pub mod utils;

// Re-exports for public API
pub use cancel::CancellationToken;
pub use config::CoreConfig;
pub use discovery::find_processable_files;
pub use error::{CoreError, CoreResult};
pub use processing::{
    process_videos, CostAccountant, RunSummary, SceneDocument, VideoOutcome, VideoReport,
};
pub use retry::RetryPolicy;
pub use utils::{format_cost, format_duration, format_timestamp_ms};
