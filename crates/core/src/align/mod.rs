use serde::{Deserialize, Serialize};

use crate::{Grid, RhythmClass};

/// One word aligned to the grid. The raw timestamp is the durable source of
/// truth; the snapped value and class are derived and rebuilt on re-tempo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridEntry {
    pub word: String,
    pub raw_start: f64,
    pub snapped_start: f64,
    pub class: RhythmClass,
}

impl GridEntry {
    pub fn new(word: impl Into<String>, raw_start: f64, grid: &Grid) -> Self {
        let snapped_start = grid.snap(raw_start);
        Self {
            word: word.into(),
            raw_start,
            snapped_start,
            class: grid.classify(snapped_start),
        }
    }
}

/// A word with an externally supplied timestamp, as delivered by the
/// transcription collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedWord {
    pub text: String,
    pub start: f64,
}

/// External-timestamp path: snap and classify each word, preserving input
/// order. Words are not deduplicated even when they snap to the same point.
pub fn align_timestamps(words: &[TimedWord], grid: &Grid) -> Vec<GridEntry> {
    words
        .iter()
        .map(|word| GridEntry::new(word.text.clone(), word.start, grid))
        .collect()
}

/// Uniform-distribution path: spread whitespace-delimited tokens evenly
/// across quarter-note slots. No overlap or duration bound checking; the
/// step is simply how many beats each word advances.
pub fn distribute_uniform(text: &str, duration_seconds: f64, grid: &Grid) -> Vec<GridEntry> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return Vec::new();
    }

    let total_beats = (duration_seconds / grid.quarter).floor() as i64;
    let step = (total_beats / tokens.len() as i64).max(1);

    tokens
        .iter()
        .enumerate()
        .map(|(index, token)| {
            let raw = index as f64 * step as f64 * grid.quarter;
            GridEntry::new(*token, raw, grid)
        })
        .collect()
}

/// Re-tempo path: rebuild every entry from its raw timestamp against a new
/// grid. The whole sequence is replaced; snapped values are disposable.
pub fn retempo(entries: &[GridEntry], grid: &Grid) -> Vec<GridEntry> {
    entries
        .iter()
        .map(|entry| GridEntry::new(entry.word.clone(), entry.raw_start, grid))
        .collect()
}
