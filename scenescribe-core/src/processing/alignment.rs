// ============================================================================
// scenescribe-core/src/processing/alignment.rs
// ============================================================================
//
// TIMELINE ALIGNER: Chapters x Scenes -> AlignedChapters
//
// Reconciles the two independently computed timelines of a video: the
// transcript-derived chapter sequence and the vision-derived scene sequence.
// Every scene is assigned to exactly one chapter (total coverage, no
// duplication), even when the raw boundaries disagree:
//
//   - A scene goes to the chapter with the largest overlap duration;
//     ties break toward the chapter with the earlier start.
//   - A scene is never split across chapters: chapter boundaries are the
//     authority for narrative grouping, scene boundaries for visual grouping.
//   - A scene lying entirely in a gap between chapters goes to the nearest
//     chapter by boundary distance, ties toward the preceding chapter.
//
// The sweep walks both ordered lists with two cursors and is fully
// deterministic: the same inputs always produce the same structure.

use crate::processing::chapters::ChapterSegment;
use crate::processing::visual::Scene;

use serde::{Deserialize, Serialize};

/// A chapter together with the scenes assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedChapter {
    pub chapter: ChapterSegment,
    /// Indices into the scene list, in timestamp order.
    pub scenes: Vec<usize>,
}

/// Assigns every scene to exactly one chapter.
///
/// When the chapter list is empty (a transcript with zero turns) a single
/// synthetic chapter with empty text spanning all scenes keeps the coverage
/// total.
#[must_use]
pub fn align_scenes(chapters: &[ChapterSegment], scenes: &[Scene]) -> Vec<AlignedChapter> {
    if chapters.is_empty() {
        let end_ms = scenes.iter().map(|s| s.end_ms).max().unwrap_or(0);
        let mut aligned = AlignedChapter {
            chapter: ChapterSegment {
                start_ms: 0,
                end_ms,
                text: String::new(),
            },
            scenes: Vec::new(),
        };
        aligned.scenes.extend(0..scenes.len());
        if !scenes.is_empty() {
            log::warn!(
                "No chapters available; assigning all {} scenes to a synthetic covering chapter",
                scenes.len()
            );
        }
        return vec![aligned];
    }

    let mut aligned: Vec<AlignedChapter> = chapters
        .iter()
        .map(|chapter| AlignedChapter {
            chapter: chapter.clone(),
            scenes: Vec::new(),
        })
        .collect();

    // Cursor into the chapter list; never moves backwards because scenes are
    // ordered by start time.
    let mut cursor = 0usize;

    for (scene_index, scene) in scenes.iter().enumerate() {
        while cursor + 1 < chapters.len() && chapters[cursor].end_ms <= scene.start_ms {
            cursor += 1;
        }

        let chapter_index = match best_overlap(chapters, scene, cursor) {
            Some(index) => index,
            None => {
                let index = nearest_chapter(chapters, scene, cursor);
                log::warn!(
                    "Scene {}..{} has no chapter overlap; assigning to nearest chapter {}..{}",
                    scene.start_ms,
                    scene.end_ms,
                    chapters[index].start_ms,
                    chapters[index].end_ms
                );
                index
            }
        };

        aligned[chapter_index].scenes.push(scene_index);
    }

    aligned
}

/// Overlap duration between a chapter and a scene, zero when disjoint.
fn overlap_ms(chapter: &ChapterSegment, scene: &Scene) -> u64 {
    let start = chapter.start_ms.max(scene.start_ms);
    let end = chapter.end_ms.min(scene.end_ms);
    end.saturating_sub(start)
}

/// Index of the chapter with the largest overlap against the scene, scanning
/// forward from the cursor. Chapters are ordered by start, so the first
/// maximum encountered is the tie-break winner (earlier `start_ms`).
fn best_overlap(chapters: &[ChapterSegment], scene: &Scene, cursor: usize) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;
    for (offset, chapter) in chapters[cursor..].iter().enumerate() {
        if chapter.start_ms >= scene.end_ms {
            break;
        }
        let overlap = overlap_ms(chapter, scene);
        if overlap > 0 && best.map_or(true, |(_, best_overlap)| overlap > best_overlap) {
            best = Some((cursor + offset, overlap));
        }
    }
    best.map(|(index, _)| index)
}

/// Index of the chapter nearest to a gap scene by boundary distance, ties
/// toward the preceding chapter.
fn nearest_chapter(chapters: &[ChapterSegment], scene: &Scene, cursor: usize) -> usize {
    let distance = |chapter: &ChapterSegment| -> u64 {
        if chapter.end_ms <= scene.start_ms {
            scene.start_ms - chapter.end_ms
        } else if chapter.start_ms >= scene.end_ms {
            chapter.start_ms - scene.end_ms
        } else {
            0
        }
    };

    // The cursor sits on the first chapter ending after the scene start, so
    // for a gap scene the preceding chapter is at cursor - 1 and the
    // following chapter at the cursor. Scanning one index either side keeps
    // this robust at the list edges. Earlier index wins ties (strict `<`),
    // which is the preceding chapter.
    let mut best = cursor.saturating_sub(1);
    let mut best_distance = distance(&chapters[best]);
    for candidate in [cursor, cursor + 1] {
        if candidate == best {
            continue;
        }
        if let Some(chapter) = chapters.get(candidate) {
            let d = distance(chapter);
            if d < best_distance {
                best = candidate;
                best_distance = d;
            }
        }
    }
    best
}
