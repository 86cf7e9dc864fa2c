use serde::{Deserialize, Serialize};

use crate::{BeatlineError, Result};

/// Lower bound of the plausible musical tempo range in BPM.
pub const MIN_BPM: f64 = 40.0;
/// Upper bound of the plausible musical tempo range in BPM.
pub const MAX_BPM: f64 = 280.0;
/// Tempo used when detection fails or returns an out-of-range value.
pub const DEFAULT_BPM: f64 = 120.0;

/// Absolute tolerance for the modular-residue membership test used by
/// classification. Snapped values carry a little floating-point noise, so
/// exact equality against interval multiples is never tested.
const CLASSIFY_TOLERANCE: f64 = 1e-4;

/// Validated tempo in beats per minute. The single source of truth for all
/// rhythmic intervals; a [`Grid`] is always derived from it, never edited.
/// Only serialisable, never deserialised, so the range check cannot be
/// bypassed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tempo(f64);

impl Tempo {
    /// Accepts a BPM inside the plausible range [`MIN_BPM`]..=[`MAX_BPM`].
    pub fn new(bpm: f64) -> Result<Self> {
        if !bpm.is_finite() || !(MIN_BPM..=MAX_BPM).contains(&bpm) {
            return Err(BeatlineError::InvalidInput(
                "tempo must be a finite BPM between 40 and 280",
            ));
        }
        Ok(Self(bpm))
    }

    /// The fallback tempo applied when detection fails; the caller is
    /// expected to prompt for manual entry afterwards.
    pub fn fallback_default() -> Self {
        Self(DEFAULT_BPM)
    }

    pub fn bpm(self) -> f64 {
        self.0
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::fallback_default()
    }
}

/// Rhythmic importance of a grid point, coarsest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RhythmClass {
    Downbeat,
    Half,
    Quarter,
    Offbeat,
}

impl RhythmClass {
    pub fn as_str(self) -> &'static str {
        match self {
            RhythmClass::Downbeat => "downbeat",
            RhythmClass::Half => "half",
            RhythmClass::Quarter => "quarter",
            RhythmClass::Offbeat => "offbeat",
        }
    }
}

/// Immutable snapshot of the four interval lengths derived from one tempo.
/// Recomputed wholesale whenever the tempo changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub eighth: f64,
    pub quarter: f64,
    pub half: f64,
    pub downbeat: f64,
}

impl Grid {
    pub fn from_tempo(tempo: Tempo) -> Self {
        let quarter = 60.0 / tempo.bpm();
        Self {
            eighth: quarter * 0.5,
            quarter,
            half: quarter * 2.0,
            downbeat: quarter * 4.0,
        }
    }

    /// Snaps a raw time to the nearest multiple of the eighth-note interval,
    /// the finest grid resolution. Exact half-interval ties round away from
    /// zero, i.e. to the later grid point for non-negative input.
    pub fn snap(&self, seconds: f64) -> f64 {
        (seconds / self.eighth).round() * self.eighth
    }

    /// Classifies a snapped time by testing interval families coarsest to
    /// finest; the first match wins. Every downbeat is also numerically a
    /// half and quarter multiple, so the order encodes rhythmic priority.
    /// Anything that matches no coarser family is an offbeat (the eighth
    /// family is the fallback and is never tested itself).
    pub fn classify(&self, snapped_seconds: f64) -> RhythmClass {
        let families = [
            (self.downbeat, RhythmClass::Downbeat),
            (self.half, RhythmClass::Half),
            (self.quarter, RhythmClass::Quarter),
        ];
        for (interval, class) in families {
            if on_multiple(snapped_seconds, interval) {
                return class;
            }
        }
        RhythmClass::Offbeat
    }

    /// Interval length for one grid level.
    pub fn interval(&self, level: GridLevel) -> f64 {
        match level {
            GridLevel::Eighth => self.eighth,
            GridLevel::Quarter => self.quarter,
            GridLevel::Half => self.half,
            GridLevel::Downbeat => self.downbeat,
        }
    }
}

/// The four grid-line families, finest first (the rendering order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridLevel {
    Eighth,
    Quarter,
    Half,
    Downbeat,
}

/// Membership test for one interval family: the residue must sit within
/// tolerance of 0 or of the interval itself (the wrap-around case).
fn on_multiple(value: f64, interval: f64) -> bool {
    let residue = value % interval;
    residue.abs() < CLASSIFY_TOLERANCE || (interval - residue).abs() < CLASSIFY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(bpm: f64) -> Grid {
        Grid::from_tempo(Tempo::new(bpm).unwrap())
    }

    #[test]
    fn intervals_scale_from_quarter() {
        let g = grid(120.0);
        assert_eq!(g.quarter, 0.5);
        assert_eq!(g.eighth, 0.25);
        assert_eq!(g.half, 1.0);
        assert_eq!(g.downbeat, 2.0);

        for bpm in [40.0, 97.3, 280.0] {
            let g = grid(bpm);
            assert!((g.quarter - 60.0 / bpm).abs() < 1e-12);
            assert!((g.eighth - g.quarter / 2.0).abs() < 1e-12);
            assert!((g.half - g.quarter * 2.0).abs() < 1e-12);
            assert!((g.downbeat - g.quarter * 4.0).abs() < 1e-12);
        }
    }

    #[test]
    fn rejects_out_of_range_tempo() {
        assert!(Tempo::new(0.0).is_err());
        assert!(Tempo::new(-120.0).is_err());
        assert!(Tempo::new(39.99).is_err());
        assert!(Tempo::new(280.01).is_err());
        assert!(Tempo::new(f64::NAN).is_err());
        assert!(Tempo::new(40.0).is_ok());
        assert!(Tempo::new(280.0).is_ok());
    }

    #[test]
    fn snap_finds_nearest_eighth() {
        let g = grid(120.0);
        assert!((g.snap(2.05) - 2.0).abs() < 1e-12);
        assert!((g.snap(0.13) - 0.25).abs() < 1e-12);
        assert!((g.snap(0.0) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn snap_is_idempotent() {
        let g = grid(97.0);
        for raw in [0.0, 0.31, 1.77, 12.345, 100.0] {
            let once = g.snap(raw);
            assert!((g.snap(once) - once).abs() < 1e-9);
        }
    }

    #[test]
    fn snap_ties_round_to_later_point() {
        let g = grid(120.0); // eighth = 0.25
        assert!((g.snap(0.125) - 0.25).abs() < 1e-12);
        assert!((g.snap(0.375) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn classify_priority_is_coarsest_first() {
        let g = grid(120.0);
        assert_eq!(g.classify(0.0), RhythmClass::Downbeat);
        assert_eq!(g.classify(2.0), RhythmClass::Downbeat);
        assert_eq!(g.classify(1.0), RhythmClass::Half);
        assert_eq!(g.classify(0.5), RhythmClass::Quarter);
        assert_eq!(g.classify(1.5), RhythmClass::Quarter);
        assert_eq!(g.classify(0.25), RhythmClass::Offbeat);
        assert_eq!(g.classify(1.75), RhythmClass::Offbeat);
    }

    #[test]
    fn every_downbeat_multiple_classifies_as_downbeat() {
        let g = grid(137.0);
        for k in 0..64 {
            let t = k as f64 * g.downbeat;
            assert_eq!(g.classify(g.snap(t)), RhythmClass::Downbeat, "k = {k}");
        }
    }

    #[test]
    fn classify_is_total_over_snapped_values() {
        let g = grid(93.0);
        for k in 0..256 {
            let snapped = k as f64 * g.eighth;
            // Must resolve to exactly one class without panicking.
            let _ = g.classify(snapped);
        }
    }

    #[test]
    fn scenario_120_bpm_snaps_2_05_to_downbeat() {
        let g = grid(120.0);
        let snapped = g.snap(2.05);
        assert!((snapped - 2.0).abs() < 1e-12);
        assert_eq!(g.classify(snapped), RhythmClass::Downbeat);
    }
}
