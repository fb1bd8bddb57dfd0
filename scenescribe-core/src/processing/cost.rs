// ============================================================================
// scenescribe-core/src/processing/cost.rs
// ============================================================================
//
// COST ACCOUNTANT: Per-Stage Cost Accumulation
//
// Each pipeline stage reports an estimated collaborator cost after it
// completes; the accountant sums them into per-video totals and a single run
// total. Accumulation is additive and order-independent, so concurrently
// processed videos can report without coordination. A stage that cannot
// report a cost is logged as a gap and counted as zero; it never fails the
// pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

/// Per-minute rate used to estimate transcription cost from media duration
/// when the collaborator does not report a cost itself.
pub const TRANSCRIPTION_RATE_PER_MINUTE: f64 = 0.024;

/// Pipeline stages that incur collaborator cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostStage {
    Transcription,
    ChapterAnalysis,
    Embedding,
    Contextualization,
}

impl fmt::Display for CostStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CostStage::Transcription => "transcription",
            CostStage::ChapterAnalysis => "chapter-analysis",
            CostStage::Embedding => "embedding",
            CostStage::Contextualization => "contextualization",
        };
        f.write_str(name)
    }
}

/// One reported cost entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub video_name: String,
    pub stage: CostStage,
    pub estimated_cost: f64,
}

/// Thread-safe additive cost accumulator for one run.
#[derive(Debug, Default)]
pub struct CostAccountant {
    records: Mutex<Vec<CostRecord>>,
}

impl CostAccountant {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a stage's estimated cost. `None` is treated as zero with a
    /// logged gap. Negative values are clamped to zero.
    pub fn record(&self, video_name: &str, stage: CostStage, estimated_cost: Option<f64>) {
        let cost = match estimated_cost {
            Some(cost) if cost >= 0.0 => cost,
            Some(cost) => {
                log::warn!("Negative cost {cost} reported for {stage} on {video_name}; clamping to zero");
                0.0
            }
            None => {
                log::warn!("No cost reported for {stage} on {video_name}; counting as zero");
                0.0
            }
        };
        self.records
            .lock()
            .expect("cost accountant mutex poisoned")
            .push(CostRecord {
                video_name: video_name.to_string(),
                stage,
                estimated_cost: cost,
            });
    }

    /// Total estimated cost for one video.
    #[must_use]
    pub fn video_total(&self, video_name: &str) -> f64 {
        self.records
            .lock()
            .expect("cost accountant mutex poisoned")
            .iter()
            .filter(|r| r.video_name == video_name)
            .map(|r| r.estimated_cost)
            .sum()
    }

    /// Total estimated cost across the run.
    #[must_use]
    pub fn run_total(&self) -> f64 {
        self.records
            .lock()
            .expect("cost accountant mutex poisoned")
            .iter()
            .map(|r| r.estimated_cost)
            .sum()
    }

    /// Copy of all records, for the run summary.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CostRecord> {
        self.records
            .lock()
            .expect("cost accountant mutex poisoned")
            .clone()
    }
}

/// Estimates transcription cost from media duration at the per-minute rate.
#[must_use]
pub fn estimate_transcription_cost(duration_ms: u64) -> f64 {
    (duration_ms as f64 / 60_000.0) * TRANSCRIPTION_RATE_PER_MINUTE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_per_video_and_run_totals() {
        let accountant = CostAccountant::new();
        accountant.record("a.mp4", CostStage::Transcription, Some(0.10));
        accountant.record("a.mp4", CostStage::Embedding, Some(0.05));
        accountant.record("b.mp4", CostStage::Contextualization, Some(0.20));

        assert!((accountant.video_total("a.mp4") - 0.15).abs() < 1e-9);
        assert!((accountant.video_total("b.mp4") - 0.20).abs() < 1e-9);
        assert!((accountant.run_total() - 0.35).abs() < 1e-9);
    }

    #[test]
    fn missing_cost_counts_as_zero() {
        let accountant = CostAccountant::new();
        accountant.record("a.mp4", CostStage::Embedding, None);
        assert_eq!(accountant.run_total(), 0.0);
        assert_eq!(accountant.snapshot().len(), 1);
    }

    #[test]
    fn negative_cost_clamped() {
        let accountant = CostAccountant::new();
        accountant.record("a.mp4", CostStage::Embedding, Some(-1.0));
        assert_eq!(accountant.run_total(), 0.0);
    }

    #[test]
    fn concurrent_accumulation_is_order_independent() {
        use std::sync::Arc;

        let accountant = Arc::new(CostAccountant::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let accountant = Arc::clone(&accountant);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        accountant.record(
                            &format!("video-{}.mp4", i % 2),
                            CostStage::Embedding,
                            Some(0.01),
                        );
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!((accountant.run_total() - 8.0).abs() < 1e-6);
        assert!((accountant.video_total("video-0.mp4") - 4.0).abs() < 1e-6);
    }

    #[test]
    fn transcription_estimate_from_duration() {
        // 10 minutes at the per-minute rate.
        assert!((estimate_transcription_cost(600_000) - 0.24).abs() < 1e-9);
    }
}
