use serde::{Deserialize, Serialize};

use crate::{timefmt, Grid, GridEntry, Result, RhythmClass, Tempo};

/// Root of the JSON export payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub metadata: ExportMetadata,
    pub lyrics_grid: Vec<ExportedEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub track: String,
    pub bpm: f64,
    pub duration_seconds: f64,
    pub grid_intervals: GridIntervals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridIntervals {
    pub eighth: f64,
    pub quarter: f64,
    pub half: f64,
    pub downbeat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedEntry {
    pub word: String,
    pub raw_start: f64,
    pub snapped_start: f64,
    #[serde(rename = "type")]
    pub class: RhythmClass,
}

/// Builds the export payload with the rounding the format promises: BPM and
/// duration to 2 decimals, intervals to 6, timestamps to 4.
pub fn build_document(
    track_name: &str,
    tempo: Tempo,
    duration_seconds: f64,
    grid: &Grid,
    entries: &[GridEntry],
) -> ExportDocument {
    ExportDocument {
        metadata: ExportMetadata {
            track: track_name.to_string(),
            bpm: round_to(tempo.bpm(), 2),
            duration_seconds: round_to(duration_seconds, 2),
            grid_intervals: GridIntervals {
                eighth: round_to(grid.eighth, 6),
                quarter: round_to(grid.quarter, 6),
                half: round_to(grid.half, 6),
                downbeat: round_to(grid.downbeat, 6),
            },
        },
        lyrics_grid: entries
            .iter()
            .map(|entry| ExportedEntry {
                word: entry.word.clone(),
                raw_start: round_to(entry.raw_start, 4),
                snapped_start: round_to(entry.snapped_start, 4),
                class: entry.class,
            })
            .collect(),
    }
}

pub fn to_json(document: &ExportDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

pub fn from_json(json: &str) -> Result<ExportDocument> {
    Ok(serde_json::from_str(json)?)
}

/// One LRC line per entry, in sequence order: `[MM:SS.ss] word`.
pub fn to_lrc(entries: &[GridEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!(
            "[{}] {}\n",
            timefmt::format_lrc(entry.snapped_start),
            entry.word
        ));
    }
    out
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{align_timestamps, TimedWord};

    fn session_parts() -> (Tempo, Grid, Vec<GridEntry>) {
        let tempo = Tempo::new(97.0).unwrap();
        let grid = Grid::from_tempo(tempo);
        let words = vec![
            TimedWord {
                text: "first".to_string(),
                start: 0.123_456,
            },
            TimedWord {
                text: "second".to_string(),
                start: 2.5,
            },
        ];
        let entries = align_timestamps(&words, &grid);
        (tempo, grid, entries)
    }

    #[test]
    fn metadata_carries_rounded_fields() {
        let (tempo, grid, entries) = session_parts();
        let doc = build_document("song.wav", tempo, 212.3456, &grid, &entries);

        assert_eq!(doc.metadata.track, "song.wav");
        assert_eq!(doc.metadata.bpm, 97.0);
        assert_eq!(doc.metadata.duration_seconds, 212.35);
        // 60/97 = 0.618557... rounded to six decimals.
        assert_eq!(doc.metadata.grid_intervals.quarter, 0.618557);
        assert_eq!(doc.metadata.grid_intervals.eighth, 0.309278);
        assert_eq!(doc.lyrics_grid[0].raw_start, 0.1235);
    }

    #[test]
    fn json_round_trip_preserves_entries_within_rounding() {
        let (tempo, grid, entries) = session_parts();
        let doc = build_document("song.wav", tempo, 180.0, &grid, &entries);
        let json = to_json(&doc).unwrap();
        let parsed = from_json(&json).unwrap();

        assert_eq!(parsed, doc);
        assert_eq!(parsed.lyrics_grid.len(), entries.len());
        for (exported, original) in parsed.lyrics_grid.iter().zip(&entries) {
            assert_eq!(exported.word, original.word);
            assert!((exported.raw_start - original.raw_start).abs() < 5e-5);
            assert!((exported.snapped_start - original.snapped_start).abs() < 5e-5);
            assert_eq!(exported.class, original.class);
        }
    }

    #[test]
    fn class_serialises_as_lowercase_type_field() {
        let (tempo, grid, entries) = session_parts();
        let doc = build_document("song.wav", tempo, 180.0, &grid, &entries);
        let json = to_json(&doc).unwrap();
        assert!(json.contains("\"type\""));
        assert!(json.contains("\"downbeat\"") || json.contains("\"offbeat\""));
    }

    #[test]
    fn lrc_lines_follow_entry_order() {
        let grid = Grid::from_tempo(Tempo::new(120.0).unwrap());
        let entries = vec![
            GridEntry::new("hello", 2.05, &grid),
            GridEntry::new("world", 127.49, &grid),
        ];
        let lrc = to_lrc(&entries);
        let lines: Vec<&str> = lrc.lines().collect();

        assert_eq!(lines[0], "[00:02.00] hello");
        assert_eq!(lines[1], "[02:07.50] world");
    }
}
