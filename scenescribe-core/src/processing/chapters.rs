// ============================================================================
// scenescribe-core/src/processing/chapters.rs
// ============================================================================
//
// CHAPTER SEGMENTER: Transcript Turns -> Semantic Chapters
//
// Turns the ordered speech turns returned by the transcription collaborator
// into coarse, non-overlapping chapters whose boundaries follow discourse
// breaks (speaker change or a long silence gap) rather than fixed-length
// windows. Overlapping chapter candidates are merged and the final boundary
// is clamped to the probed video duration.
//
// A transcript with zero turns produces an empty chapter list. Turns with
// non-monotonic timestamps fail with MalformedTranscript rather than being
// silently reordered.

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::TranscriptTurn;

use serde::{Deserialize, Serialize};

/// One transcript-derived chapter with its time range and text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterSegment {
    pub start_ms: u64,
    pub end_ms: u64,
    /// Concatenated transcript text of the turns in this chapter.
    pub text: String,
}

impl ChapterSegment {
    /// Duration of the chapter in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

/// Segments transcript turns into ordered, non-overlapping chapters.
///
/// Boundary criterion (configurable via `CoreConfig`): a new chapter starts
/// on a speaker change (when `chapter_break_on_speaker_change` is set) or
/// when the silence gap since the previous turn reaches
/// `chapter_pause_threshold_ms`.
pub fn segment_chapters(
    turns: &[TranscriptTurn],
    duration_ms: u64,
    config: &CoreConfig,
) -> CoreResult<Vec<ChapterSegment>> {
    if turns.is_empty() {
        log::info!("Transcript has no speech turns; producing zero chapters");
        return Ok(Vec::new());
    }

    validate_turns(turns)?;

    // Group consecutive turns into chapter candidates at discourse breaks.
    let mut candidates: Vec<ChapterSegment> = Vec::new();
    let mut current = ChapterSegment {
        start_ms: turns[0].start_ms,
        end_ms: turns[0].end_ms,
        text: turns[0].text.clone(),
    };
    let mut current_speaker = turns[0].speaker.clone();

    for turn in &turns[1..] {
        let gap = turn.start_ms.saturating_sub(current.end_ms);
        let speaker_changed = config.chapter_break_on_speaker_change
            && turn.speaker.is_some()
            && turn.speaker != current_speaker;

        if gap >= config.chapter_pause_threshold_ms || speaker_changed {
            candidates.push(current);
            current = ChapterSegment {
                start_ms: turn.start_ms,
                end_ms: turn.end_ms,
                text: turn.text.clone(),
            };
        } else {
            current.end_ms = current.end_ms.max(turn.end_ms);
            if !current.text.is_empty() && !turn.text.is_empty() {
                current.text.push(' ');
            }
            current.text.push_str(&turn.text);
        }
        if turn.speaker.is_some() {
            current_speaker = turn.speaker.clone();
        }
    }
    candidates.push(current);

    let merged = merge_overlapping(candidates);
    Ok(clamp_to_duration(merged, duration_ms))
}

/// Rejects transcripts whose turns are not in ascending timestamp order or
/// whose individual turns are inverted.
fn validate_turns(turns: &[TranscriptTurn]) -> CoreResult<()> {
    let mut previous_start = 0u64;
    for (index, turn) in turns.iter().enumerate() {
        if turn.end_ms <= turn.start_ms {
            return Err(CoreError::MalformedTranscript(format!(
                "turn {index} has end {} <= start {}",
                turn.end_ms, turn.start_ms
            )));
        }
        if turn.start_ms < previous_start {
            return Err(CoreError::MalformedTranscript(format!(
                "turn {index} starts at {} before previous turn at {previous_start}",
                turn.start_ms
            )));
        }
        previous_start = turn.start_ms;
    }
    Ok(())
}

/// Merges chapter candidates whose time ranges overlap, concatenating text.
fn merge_overlapping(candidates: Vec<ChapterSegment>) -> Vec<ChapterSegment> {
    let mut merged: Vec<ChapterSegment> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match merged.last_mut() {
            Some(last) if candidate.start_ms < last.end_ms => {
                log::debug!(
                    "Merging overlapping chapter candidates at {}..{} and {}..{}",
                    last.start_ms,
                    last.end_ms,
                    candidate.start_ms,
                    candidate.end_ms
                );
                last.end_ms = last.end_ms.max(candidate.end_ms);
                if !last.text.is_empty() && !candidate.text.is_empty() {
                    last.text.push(' ');
                }
                last.text.push_str(&candidate.text);
            }
            _ => merged.push(candidate),
        }
    }
    merged
}

/// Clamps chapters to the probed video duration, dropping any segment that
/// collapses to zero length.
fn clamp_to_duration(chapters: Vec<ChapterSegment>, duration_ms: u64) -> Vec<ChapterSegment> {
    chapters
        .into_iter()
        .filter_map(|mut chapter| {
            if chapter.start_ms >= duration_ms {
                log::warn!(
                    "Dropping chapter starting at {} beyond video duration {}",
                    chapter.start_ms,
                    duration_ms
                );
                return None;
            }
            if chapter.end_ms > duration_ms {
                log::debug!(
                    "Clamping chapter end {} to video duration {}",
                    chapter.end_ms,
                    duration_ms
                );
                chapter.end_ms = duration_ms;
            }
            (chapter.end_ms > chapter.start_ms).then_some(chapter)
        })
        .collect()
}
