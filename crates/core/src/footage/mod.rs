use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One external footage item. Clips with non-positive or indeterminate
/// duration are rejected by the duration-probing collaborator before they
/// reach this sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub name: String,
    pub path: PathBuf,
    pub duration_seconds: f64,
}

/// Accumulated comparison of clip footage against the song length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootageReport {
    pub total_clip_seconds: f64,
    /// Unclamped percentage; the numeric label shows this value rounded.
    pub raw_percent: f64,
    /// Percentage clamped to 100 for the fill-bar width.
    pub display_percent: f64,
    pub remaining_seconds: f64,
    pub done: bool,
    pub over: bool,
}

/// Pure accumulation over the clip sequence. `song_duration` of zero means
/// no song is loaded and yields a zero percentage.
pub fn report(clips: &[Clip], song_duration: f64) -> FootageReport {
    let total_clip_seconds: f64 = clips.iter().map(|clip| clip.duration_seconds).sum();
    let raw_percent = if song_duration > 0.0 {
        total_clip_seconds / song_duration * 100.0
    } else {
        0.0
    };
    FootageReport {
        total_clip_seconds,
        raw_percent,
        display_percent: raw_percent.min(100.0),
        remaining_seconds: (song_duration - total_clip_seconds).max(0.0),
        done: raw_percent >= 100.0,
        over: raw_percent > 100.0,
    }
}
