//! Timeline rendering: two aligned layers rebuilt in full on every change to
//! tempo, track or the word sequence. Each layer is an ordered display list
//! of primitives replayed onto a [`PaintTarget`] backend, so the layering
//! rules (waveform below, coarse grid lines over fine ones, word markers
//! last) are encoded in command order rather than in the backend.

pub mod svg;

use serde::{Deserialize, Serialize};

use crate::{timefmt, CoordinateMapper, Grid, GridEntry, GridLevel, RhythmClass};

/// Solid RGB color; per-primitive opacity is carried separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// One drawing primitive in backend-agnostic device pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Line {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        color: Color,
        opacity: f32,
        weight: f32,
    },
    Dot {
        x: f64,
        y: f64,
        radius: f64,
        color: Color,
        opacity: f32,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        size: f32,
        color: Color,
        opacity: f32,
        rotation_degrees: f32,
    },
}

/// Backend that turns primitives into pixels (or markup).
pub trait PaintTarget {
    fn apply(&mut self, cmd: &DrawCmd);
}

/// An ordered display list with the surface dimensions it was laid out for.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<DrawCmd>,
}

impl Layer {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    fn push(&mut self, cmd: DrawCmd) {
        self.commands.push(cmd);
    }

    /// Replays the display list in order onto a backend.
    pub fn replay<T: PaintTarget>(&self, target: &mut T) {
        for cmd in &self.commands {
            target.apply(cmd);
        }
    }
}

/// Output of one full render pass: waveform below, grid/word overlay above.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineFrame {
    pub waveform: Layer,
    pub overlay: Layer,
}

/// Style of one grid-line family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: Color,
    /// Fraction of the layer height the line spans, anchored at the bottom.
    pub height_fraction: f64,
    pub opacity: f32,
    pub weight: f32,
}

/// Visual parameters for both layers. Defaults give each grid family
/// monotonically increasing prominence from eighth to downbeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderStyle {
    pub waveform_height: f64,
    pub overlay_height: f64,
    /// Fraction of the waveform layer height used by the amplitude band.
    pub band_fraction: f64,
    pub waveform_color: Color,
    pub center_line_color: Color,
    pub ruler_color: Color,
    pub ruler_text_size: f32,
    pub measure_text_size: f32,
    pub word_text_size: f32,
    pub word_label_rotation: f32,
    pub word_dot_radius: f64,
    pub eighth: LineStyle,
    pub quarter: LineStyle,
    pub half: LineStyle,
    pub downbeat: LineStyle,
    pub offbeat_color: Color,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            waveform_height: 140.0,
            overlay_height: 180.0,
            band_fraction: 0.85,
            waveform_color: Color::rgb(96, 168, 220),
            center_line_color: Color::rgb(70, 80, 90),
            ruler_color: Color::rgb(140, 140, 150),
            ruler_text_size: 10.0,
            measure_text_size: 11.0,
            word_text_size: 11.0,
            word_label_rotation: -45.0,
            word_dot_radius: 3.0,
            eighth: LineStyle {
                color: Color::rgb(92, 92, 100),
                height_fraction: 0.25,
                opacity: 0.35,
                weight: 1.0,
            },
            quarter: LineStyle {
                color: Color::rgb(120, 160, 200),
                height_fraction: 0.45,
                opacity: 0.55,
                weight: 1.0,
            },
            half: LineStyle {
                color: Color::rgb(205, 170, 90),
                height_fraction: 0.7,
                opacity: 0.75,
                weight: 1.5,
            },
            downbeat: LineStyle {
                color: Color::rgb(222, 84, 84),
                height_fraction: 1.0,
                opacity: 0.9,
                weight: 2.0,
            },
            offbeat_color: Color::rgb(150, 150, 150),
        }
    }
}

impl RenderStyle {
    /// The fixed drawing order for grid-line families: finest first, so the
    /// coarser, more important lines land on top.
    fn grid_line_order(&self) -> [(GridLevel, LineStyle); 4] {
        [
            (GridLevel::Eighth, self.eighth),
            (GridLevel::Quarter, self.quarter),
            (GridLevel::Half, self.half),
            (GridLevel::Downbeat, self.downbeat),
        ]
    }

    /// Marker color for a word entry, keyed by its rhythmic class.
    pub fn class_color(&self, class: RhythmClass) -> Color {
        match class {
            RhythmClass::Downbeat => self.downbeat.color,
            RhythmClass::Half => self.half.color,
            RhythmClass::Quarter => self.quarter.color,
            RhythmClass::Offbeat => self.offbeat_color,
        }
    }
}

/// Builds both layers from the shared mapper so their x-axes line up
/// pixel-exactly at any zoom or display scale.
#[derive(Debug, Clone)]
pub struct TimelineRenderer {
    style: RenderStyle,
    scale: f64,
}

impl TimelineRenderer {
    /// `scale` is the display scale factor (1.0 for standard density).
    pub fn new(style: RenderStyle, scale: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        Self { style, scale }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Full redraw of both layers. Idempotent; safe to call on every state
    /// change.
    pub fn render(
        &self,
        samples: &[f32],
        grid: &Grid,
        entries: &[GridEntry],
        mapper: &CoordinateMapper,
    ) -> TimelineFrame {
        TimelineFrame {
            waveform: self.waveform_layer(samples, mapper),
            overlay: self.overlay_layer(grid, entries, mapper),
        }
    }

    /// Waveform layer: one min/max column per output pixel, then the center
    /// reference line.
    fn waveform_layer(&self, samples: &[f32], mapper: &CoordinateMapper) -> Layer {
        let width = self.device_px(mapper.width());
        let height = self.device_px(self.style.waveform_height);
        let mut layer = Layer::new(width, height);

        let center = height as f64 / 2.0;
        let half_band = height as f64 * self.style.band_fraction / 2.0;

        if !samples.is_empty() {
            let window = (samples.len() / width as usize).max(1);
            for column in 0..width as usize {
                let start = column * window;
                if start >= samples.len() {
                    break;
                }
                let end = (start + window).min(samples.len());
                let mut low = f32::MAX;
                let mut high = f32::MIN;
                for sample in &samples[start..end] {
                    low = low.min(*sample);
                    high = high.max(*sample);
                }
                let x = column as f64 + 0.5;
                layer.push(DrawCmd::Line {
                    x0: x,
                    y0: center - high as f64 * half_band,
                    x1: x,
                    y1: center - low as f64 * half_band,
                    color: self.style.waveform_color,
                    opacity: 1.0,
                    weight: 1.0,
                });
            }
        }

        layer.push(DrawCmd::Line {
            x0: 0.0,
            y0: center,
            x1: width as f64,
            y1: center,
            color: self.style.center_line_color,
            opacity: 0.8,
            weight: 1.0,
        });

        layer
    }

    /// Overlay layer: ruler, then grid families finest to coarsest with
    /// measure numbers at downbeats, then word markers on top.
    fn overlay_layer(
        &self,
        grid: &Grid,
        entries: &[GridEntry],
        mapper: &CoordinateMapper,
    ) -> Layer {
        let width = self.device_px(mapper.width());
        let height = self.device_px(self.style.overlay_height);
        let mut layer = Layer::new(width, height);
        let h = height as f64;
        let duration = mapper.duration();

        if duration > 0.0 {
            self.draw_ruler(&mut layer, mapper, duration, h);
            self.draw_grid_lines(&mut layer, grid, mapper, duration, h);
        }
        self.draw_word_markers(&mut layer, entries, mapper, h);

        layer
    }

    fn draw_ruler(&self, layer: &mut Layer, mapper: &CoordinateMapper, duration: f64, h: f64) {
        let step = ruler_step_seconds(duration);
        let mut t = 0.0;
        while t <= duration {
            let x = self.x(mapper, t);
            layer.push(DrawCmd::Line {
                x0: x,
                y0: 0.0,
                x1: x,
                y1: h * 0.06,
                color: self.style.ruler_color,
                opacity: 0.9,
                weight: 1.0,
            });
            layer.push(DrawCmd::Text {
                x: x + 3.0 * self.scale,
                y: h * 0.06,
                text: timefmt::format_clock(t),
                size: self.style.ruler_text_size * self.scale as f32,
                color: self.style.ruler_color,
                opacity: 0.9,
                rotation_degrees: 0.0,
            });
            t += step;
        }
    }

    fn draw_grid_lines(
        &self,
        layer: &mut Layer,
        grid: &Grid,
        mapper: &CoordinateMapper,
        duration: f64,
        h: f64,
    ) {
        for (level, style) in self.style.grid_line_order() {
            let interval = grid.interval(level);
            let span = h * style.height_fraction;
            let mut index = 0u32;
            loop {
                let t = index as f64 * interval;
                if t > duration {
                    break;
                }
                let x = self.x(mapper, t);
                layer.push(DrawCmd::Line {
                    x0: x,
                    y0: h - span,
                    x1: x,
                    y1: h,
                    color: style.color,
                    opacity: style.opacity,
                    weight: style.weight * self.scale as f32,
                });
                if level == GridLevel::Downbeat {
                    layer.push(DrawCmd::Text {
                        x: x + 2.0 * self.scale,
                        y: h - span + self.style.measure_text_size as f64 * self.scale,
                        text: format!("{}", index + 1),
                        size: self.style.measure_text_size * self.scale as f32,
                        color: style.color,
                        opacity: style.opacity,
                        rotation_degrees: 0.0,
                    });
                }
                index += 1;
            }
        }
    }

    fn draw_word_markers(
        &self,
        layer: &mut Layer,
        entries: &[GridEntry],
        mapper: &CoordinateMapper,
        h: f64,
    ) {
        for entry in entries {
            let x = self.x(mapper, entry.snapped_start);
            let y = h * 0.3;
            let color = self.style.class_color(entry.class);
            layer.push(DrawCmd::Dot {
                x,
                y,
                radius: self.style.word_dot_radius * self.scale,
                color,
                opacity: 1.0,
            });
            layer.push(DrawCmd::Text {
                x: x + 4.0 * self.scale,
                y: y - 4.0 * self.scale,
                text: entry.word.clone(),
                size: self.style.word_text_size * self.scale as f32,
                color,
                opacity: 1.0,
                rotation_degrees: self.style.word_label_rotation,
            });
        }
    }

    fn x(&self, mapper: &CoordinateMapper, seconds: f64) -> f64 {
        mapper.x_at(seconds) * self.scale
    }

    fn device_px(&self, logical: f64) -> u32 {
        ((logical * self.scale).round() as u32).max(1)
    }
}

/// Adaptive ruler label spacing: sparser labels for longer tracks.
fn ruler_step_seconds(duration: f64) -> f64 {
    if duration > 120.0 {
        10.0
    } else if duration > 60.0 {
        5.0
    } else {
        2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mapping, Tempo};

    fn grid(bpm: f64) -> Grid {
        Grid::from_tempo(Tempo::new(bpm).unwrap())
    }

    fn renderer() -> TimelineRenderer {
        TimelineRenderer::new(RenderStyle::default(), 1.0)
    }

    #[test]
    fn ruler_step_adapts_to_duration() {
        assert_eq!(ruler_step_seconds(30.0), 2.0);
        assert_eq!(ruler_step_seconds(60.0), 2.0);
        assert_eq!(ruler_step_seconds(61.0), 5.0);
        assert_eq!(ruler_step_seconds(120.0), 5.0);
        assert_eq!(ruler_step_seconds(121.0), 10.0);
    }

    #[test]
    fn waveform_column_spans_window_min_max() {
        let g = grid(120.0);
        let duration = 10.0;
        let mapper = CoordinateMapper::new(duration, &g);
        let width = mapper.width() as usize;

        // Two samples per column, alternating so min/max differ.
        let mut samples = Vec::new();
        for _ in 0..width {
            samples.push(-0.5_f32);
            samples.push(0.5_f32);
        }

        let layer = renderer().waveform_layer(&samples, &mapper);
        let center = layer.height as f64 / 2.0;
        let half_band = layer.height as f64 * 0.85 / 2.0;

        let DrawCmd::Line { y0, y1, .. } = &layer.commands[0] else {
            panic!("first waveform command should be a column line");
        };
        assert!((y0 - (center - 0.5 * half_band)).abs() < 1e-9);
        assert!((y1 - (center + 0.5 * half_band)).abs() < 1e-9);

        // One column per pixel plus the trailing center reference line.
        assert_eq!(layer.commands.len(), width + 1);
        let DrawCmd::Line { y0, y1, .. } = layer.commands.last().unwrap() else {
            panic!("last waveform command should be the center line");
        };
        assert_eq!(y0, y1);
    }

    #[test]
    fn waveform_window_never_drops_below_one_sample() {
        let g = grid(120.0);
        let mapper = CoordinateMapper::new(5.0, &g);
        // Far fewer samples than pixels: columns past the data are skipped.
        let samples = vec![0.25_f32; 8];
        let layer = renderer().waveform_layer(&samples, &mapper);
        assert_eq!(layer.commands.len(), 8 + 1);
    }

    #[test]
    fn overlay_draws_families_finest_to_coarsest() {
        let style = RenderStyle::default();
        let g = grid(120.0);
        let mapper = CoordinateMapper::new(8.0, &g);
        let layer = renderer().overlay_layer(&g, &[], &mapper);

        let position_of = |color: Color, last: bool| {
            let mut found = None;
            for (index, cmd) in layer.commands.iter().enumerate() {
                if let DrawCmd::Line { color: c, .. } = cmd {
                    if *c == color {
                        found = Some(index);
                        if !last {
                            break;
                        }
                    }
                }
            }
            found.expect("family should be drawn")
        };

        assert!(position_of(style.eighth.color, true) < position_of(style.quarter.color, false));
        assert!(position_of(style.quarter.color, true) < position_of(style.half.color, false));
        assert!(position_of(style.half.color, true) < position_of(style.downbeat.color, false));
    }

    #[test]
    fn measure_numbers_are_stamped_at_downbeats() {
        let g = grid(120.0); // downbeat every 2 s
        let mapper = CoordinateMapper::new(6.0, &g);
        let layer = renderer().overlay_layer(&g, &[], &mapper);

        let numbers: Vec<&str> = layer
            .commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCmd::Text { text, .. } if text.parse::<u32>().is_ok() => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(numbers, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn word_markers_are_drawn_last_and_colored_by_class() {
        let style = RenderStyle::default();
        let g = grid(120.0);
        let mapper = CoordinateMapper::new(8.0, &g);
        let entries = vec![GridEntry::new("hey", 2.05, &g)];
        let layer = renderer().overlay_layer(&g, &entries, &mapper);

        let last = layer.commands.last().unwrap();
        let DrawCmd::Text {
            text,
            color,
            rotation_degrees,
            ..
        } = last
        else {
            panic!("word label should be the final command");
        };
        assert_eq!(text, "hey");
        assert_eq!(*color, style.downbeat.color);
        assert!(*rotation_degrees != 0.0);

        let DrawCmd::Dot { x, .. } = &layer.commands[layer.commands.len() - 2] else {
            panic!("word dot should precede its label");
        };
        assert!((x - mapper.x_at(2.0)).abs() < 1e-9);
    }

    #[test]
    fn empty_state_renders_default_width_without_panicking() {
        let g = grid(120.0);
        let mapper = CoordinateMapper::empty();
        let frame = renderer().render(&[], &g, &[], &mapper);
        assert_eq!(frame.waveform.width, mapping::DEFAULT_WIDTH_PX as u32);
        assert_eq!(frame.overlay.width, frame.waveform.width);
        // Only the center reference line is drawn.
        assert_eq!(frame.waveform.commands.len(), 1);
        assert!(frame.overlay.commands.is_empty());
    }

    #[test]
    fn display_scale_multiplies_device_dimensions() {
        let g = grid(120.0);
        let mapper = CoordinateMapper::new(10.0, &g);
        let one = renderer().render(&[], &g, &[], &mapper);
        let two = TimelineRenderer::new(RenderStyle::default(), 2.0).render(&[], &g, &[], &mapper);
        assert_eq!(two.waveform.width, one.waveform.width * 2);
        assert_eq!(two.overlay.height, one.overlay.height * 2);
    }

    #[test]
    fn layers_share_the_same_x_axis() {
        let g = grid(110.0);
        let mapper = CoordinateMapper::new(45.0, &g);
        let frame = renderer().render(&[0.1; 4096], &g, &[], &mapper);
        assert_eq!(frame.waveform.width, frame.overlay.width);
    }
}
