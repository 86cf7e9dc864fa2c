//! SVG paint backend so the CLI can write the rendered layers to disk
//! without a windowing stack.

use std::fmt::Write as _;

use super::{Color, DrawCmd, Layer, PaintTarget};

/// Accumulates primitives into an SVG document body.
#[derive(Debug)]
pub struct SvgTarget {
    width: u32,
    height: u32,
    body: String,
}

impl SvgTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            body: String::new(),
        }
    }

    /// Renders a whole layer into a standalone SVG document.
    pub fn document_for(layer: &Layer) -> String {
        let mut target = Self::new(layer.width, layer.height);
        layer.replay(&mut target);
        target.finish()
    }

    pub fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" \
             viewBox=\"0 0 {} {}\">\n{}</svg>\n",
            self.width, self.height, self.width, self.height, self.body
        )
    }
}

impl PaintTarget for SvgTarget {
    fn apply(&mut self, cmd: &DrawCmd) {
        match cmd {
            DrawCmd::Line {
                x0,
                y0,
                x1,
                y1,
                color,
                opacity,
                weight,
            } => {
                let _ = writeln!(
                    self.body,
                    "  <line x1=\"{x0:.2}\" y1=\"{y0:.2}\" x2=\"{x1:.2}\" y2=\"{y1:.2}\" \
                     stroke=\"{}\" stroke-opacity=\"{opacity}\" stroke-width=\"{weight}\"/>",
                    hex(*color)
                );
            }
            DrawCmd::Dot {
                x,
                y,
                radius,
                color,
                opacity,
            } => {
                let _ = writeln!(
                    self.body,
                    "  <circle cx=\"{x:.2}\" cy=\"{y:.2}\" r=\"{radius:.2}\" fill=\"{}\" \
                     fill-opacity=\"{opacity}\"/>",
                    hex(*color)
                );
            }
            DrawCmd::Text {
                x,
                y,
                text,
                size,
                color,
                opacity,
                rotation_degrees,
            } => {
                let transform = if *rotation_degrees != 0.0 {
                    format!(" transform=\"rotate({rotation_degrees:.1} {x:.2} {y:.2})\"")
                } else {
                    String::new()
                };
                let _ = writeln!(
                    self.body,
                    "  <text x=\"{x:.2}\" y=\"{y:.2}\" font-size=\"{size}\" fill=\"{}\" \
                     fill-opacity=\"{opacity}\"{transform}>{}</text>",
                    hex(*color),
                    escape(text)
                );
            }
        }
    }
}

fn hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
