use crate::Grid;

/// Horizontal pixel density: logical pixels allotted per quarter-note beat.
pub const PIXELS_PER_BEAT: f64 = 8.0;

/// Extra logical pixels folded into the total width on top of the
/// beat-derived span. The time axis stretches over the full widened width,
/// so this slack lowers the effective density rather than leaving blank
/// space after the last beat.
pub const EDGE_MARGIN_PX: f64 = 120.0;

/// Width returned while no track or tempo is loaded, so empty-state
/// rendering never divides by zero.
pub const DEFAULT_WIDTH_PX: f64 = 960.0;

/// Shared time-to-pixel mapping. Every layer (waveform, ruler, grid lines,
/// word markers) must use the same mapper instance so vertical alignment
/// across layers stays pixel-exact. Rebuilt whenever duration or tempo
/// changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    width: f64,
    duration: f64,
}

impl CoordinateMapper {
    pub fn new(duration_seconds: f64, grid: &Grid) -> Self {
        if duration_seconds <= 0.0 {
            return Self::empty();
        }
        let width = (duration_seconds / grid.quarter * PIXELS_PER_BEAT).ceil() + EDGE_MARGIN_PX;
        Self {
            width,
            duration: duration_seconds,
        }
    }

    /// Degenerate mapper for the empty session state.
    pub fn empty() -> Self {
        Self {
            width: DEFAULT_WIDTH_PX,
            duration: 0.0,
        }
    }

    /// Total logical render width in pixels.
    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// X-coordinate in logical pixels for a time in seconds.
    pub fn x_at(&self, seconds: f64) -> f64 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        seconds / self.duration * self.width
    }
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tempo;

    fn grid(bpm: f64) -> Grid {
        Grid::from_tempo(Tempo::new(bpm).unwrap())
    }

    #[test]
    fn width_scales_with_beats() {
        let g = grid(120.0); // quarter = 0.5 s -> 240 beats over 120 s
        let mapper = CoordinateMapper::new(120.0, &g);
        assert_eq!(mapper.width(), 240.0 * PIXELS_PER_BEAT + EDGE_MARGIN_PX);
    }

    #[test]
    fn width_is_ceiled_before_margin() {
        let g = grid(97.0);
        let duration = 33.3;
        let mapper = CoordinateMapper::new(duration, &g);
        let expected = (duration / g.quarter * PIXELS_PER_BEAT).ceil() + EDGE_MARGIN_PX;
        assert_eq!(mapper.width(), expected);
    }

    #[test]
    fn x_is_proportional_to_time() {
        let g = grid(120.0);
        let mapper = CoordinateMapper::new(100.0, &g);
        assert_eq!(mapper.x_at(0.0), 0.0);
        assert!((mapper.x_at(50.0) - mapper.width() / 2.0).abs() < 1e-9);
        assert!((mapper.x_at(100.0) - mapper.width()).abs() < 1e-9);
    }

    #[test]
    fn empty_state_has_fixed_width_and_zero_x() {
        let mapper = CoordinateMapper::empty();
        assert_eq!(mapper.width(), DEFAULT_WIDTH_PX);
        assert_eq!(mapper.x_at(12.0), 0.0);

        let g = grid(120.0);
        assert_eq!(CoordinateMapper::new(0.0, &g), CoordinateMapper::empty());
    }
}
