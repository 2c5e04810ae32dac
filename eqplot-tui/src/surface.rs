use eqplot_core::plot::{Rgb, Stroke, Surface};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::canvas::{Canvas, Circle, Line as CanvasLine, Rectangle},
};

/// Logical pixels per terminal cell. Keeps hit radii roughly one cell tall.
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line {
        from: (f64, f64),
        to: (f64, f64),
        color: Rgb,
    },
    Circle {
        center: (f64, f64),
        radius: f64,
        color: Rgb,
    },
    Rect {
        origin: (f64, f64),
        size: (f64, f64),
        color: Rgb,
    },
    Text {
        pos: (f64, f64),
        text: String,
        color: Rgb,
    },
}

/// Records what the plot renderer draws so it can be replayed onto a ratatui
/// canvas every terminal frame.
#[derive(Debug, Clone, Default)]
pub struct ShapeRecorder {
    size: (f64, f64),
    background: Option<Rgb>,
    shapes: Vec<Shape>,
}

impl ShapeRecorder {
    pub fn new(size: (f64, f64)) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Logical canvas size for a terminal area
    pub fn for_area(area: Rect) -> Self {
        Self::new(logical_size(area))
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }
}

pub fn logical_size(area: Rect) -> (f64, f64) {
    (
        area.width as f64 * CELL_WIDTH_PX,
        area.height as f64 * CELL_HEIGHT_PX,
    )
}

/// Center of a terminal cell in logical pixels relative to `area`
pub fn cell_to_pixel(area: Rect, column: u16, row: u16) -> (f64, f64) {
    (
        (column.saturating_sub(area.x) as f64 + 0.5) * CELL_WIDTH_PX,
        (row.saturating_sub(area.y) as f64 + 0.5) * CELL_HEIGHT_PX,
    )
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

impl Surface for ShapeRecorder {
    fn size(&self) -> (f64, f64) {
        self.size
    }

    fn clear(&mut self, color: Rgb) {
        self.background = Some(color);
        self.shapes.clear();
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: &Stroke) {
        // the terminal canvas has no line styles, dashed lines become dimmer
        let color = match stroke.dash {
            Some(_) => Rgb::new(stroke.color.r / 3, stroke.color.g / 3, stroke.color.b / 3),
            None => stroke.color,
        };
        self.shapes.push(Shape::Line { from, to, color });
    }

    fn circle(&mut self, center: (f64, f64), radius: f64, fill: Option<Rgb>, stroke: Option<&Stroke>) {
        if let Some(color) = fill {
            self.shapes.push(Shape::Circle {
                center,
                radius: radius / 2.0,
                color,
            });
        }
        if let Some(stroke) = stroke {
            self.shapes.push(Shape::Circle {
                center,
                radius,
                color: stroke.color,
            });
        }
    }

    fn fill_rect(&mut self, origin: (f64, f64), size: (f64, f64), color: Rgb) {
        self.shapes.push(Shape::Rect {
            origin,
            size,
            color,
        });
    }

    fn text(&mut self, pos: (f64, f64), text: &str, color: Rgb) {
        self.shapes.push(Shape::Text {
            pos,
            text: text.to_string(),
            color,
        });
    }

    fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * CELL_WIDTH_PX
    }
}

/// Replay a recording onto `area`. Pixel y grows downwards, canvas y upwards.
pub fn draw_recording(f: &mut Frame, area: Rect, recording: &ShapeRecorder) {
    let (width, height) = recording.size;
    let flip = |y: f64| height - y;

    let mut canvas = Canvas::default()
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            for shape in recording.shapes() {
                match shape {
                    Shape::Line { from, to, color } => ctx.draw(&CanvasLine {
                        x1: from.0,
                        y1: flip(from.1),
                        x2: to.0,
                        y2: flip(to.1),
                        color: to_color(*color),
                    }),
                    Shape::Circle {
                        center,
                        radius,
                        color,
                    } => ctx.draw(&Circle {
                        x: center.0,
                        y: flip(center.1),
                        radius: *radius,
                        color: to_color(*color),
                    }),
                    Shape::Rect {
                        origin,
                        size,
                        color,
                    } => ctx.draw(&Rectangle {
                        x: origin.0,
                        y: flip(origin.1 + size.1),
                        width: size.0,
                        height: size.1,
                        color: to_color(*color),
                    }),
                    Shape::Text { .. } => {}
                }
            }
            // labels go on top of every curve
            ctx.layer();
            for shape in recording.shapes() {
                if let Shape::Text { pos, text, color } = shape {
                    ctx.print(
                        pos.0.max(0.0),
                        flip(pos.1),
                        Span::styled(text.clone(), Style::default().fg(to_color(*color))),
                    );
                }
            }
        });
    if let Some(background) = recording.background {
        canvas = canvas.background_color(to_color(background));
    }
    f.render_widget(canvas, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use eqplot_core::plot::CurveRenderer;
    use eqplot_core::plot::PlotOptions;
    use eqplot_core::{BiquadSubtype, FilterDefinition, FilterSet, PlotConfig};

    #[test]
    fn test_cell_mapping() {
        let area = Rect::new(2, 1, 100, 30);
        assert_eq!(logical_size(area), (800.0, 480.0));
        assert_eq!(cell_to_pixel(area, 2, 1), (4.0, 8.0));
        assert_eq!(cell_to_pixel(area, 12, 3), (84.0, 40.0));
    }

    #[test]
    fn test_records_plot() {
        let mut recorder = ShapeRecorder::for_area(Rect::new(0, 0, 120, 34));
        let filters = FilterSet::new().with(
            "F1",
            FilterDefinition::biquad(BiquadSubtype::Peaking, 1000.0, 3.0, 1.0),
        );
        recorder.clear(Rgb::BLACK);
        let out = CurveRenderer::new(PlotConfig::default()).plot(
            &mut recorder,
            &filters,
            &PlotOptions::default(),
        );
        assert_eq!(out.markers.len(), 1);
        assert!(recorder.shapes().iter().any(|s| matches!(s, Shape::Text { text, .. } if text == "0dB")));
        assert!(recorder.shapes().iter().any(|s| matches!(s, Shape::Line { color, .. } if *color == Rgb::WHITE)));
    }
}
