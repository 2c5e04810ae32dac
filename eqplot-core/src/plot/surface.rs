//! Drawing surface abstraction.
//!
//! The renderer only needs lines, circles, rectangles and text. Hosts implement
//! [`Surface`] on top of whatever they draw with; [`PixelCanvas`] is a plain RGB
//! buffer used for headless rendering and tests.

use super::color::Rgb;

/// Line style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f64,
    /// `(on, off)` dash lengths in px, solid when `None`
    pub dash: Option<(f64, f64)>,
}

impl Stroke {
    pub fn solid(color: Rgb, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub fn dashed(color: Rgb, width: f64, on: f64, off: f64) -> Self {
        Self {
            color,
            width,
            dash: Some((on, off)),
        }
    }
}

pub trait Surface {
    /// Canvas size in px as `(width, height)`
    fn size(&self) -> (f64, f64);

    fn clear(&mut self, color: Rgb);

    fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: &Stroke);

    fn circle(&mut self, center: (f64, f64), radius: f64, fill: Option<Rgb>, stroke: Option<&Stroke>);

    fn fill_rect(&mut self, origin: (f64, f64), size: (f64, f64), color: Rgb);

    fn stroke_rect(&mut self, origin: (f64, f64), size: (f64, f64), stroke: &Stroke) {
        let (x, y) = origin;
        let (w, h) = size;
        self.line((x, y), (x + w, y), stroke);
        self.line((x + w, y), (x + w, y + h), stroke);
        self.line((x + w, y + h), (x, y + h), stroke);
        self.line((x, y + h), (x, y), stroke);
    }

    /// Text with its baseline-left corner at `pos`
    fn text(&mut self, pos: (f64, f64), text: &str, color: Rgb);

    /// Approximate rendered width of `text` in px
    fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * 7.0
    }

    fn polyline(&mut self, points: &[(f64, f64)], stroke: &Stroke) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], stroke);
        }
    }
}

/// In-memory RGB pixel buffer. Text is not rasterized; printed strings are
/// recorded so callers can inspect them.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
    texts: Vec<((f64, f64), String)>,
}

impl PixelCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK; width * height],
            texts: Vec::new(),
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn texts(&self) -> &[((f64, f64), String)] {
        &self.texts
    }

    /// Number of pixels set to exactly `color`
    pub fn count(&self, color: Rgb) -> usize {
        self.pixels.iter().filter(|p| **p == color).count()
    }

    fn put(&mut self, x: f64, y: f64, color: Rgb) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        let (x, y) = (x.round() as usize, y.round() as usize);
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    fn brush(&mut self, x: f64, y: f64, stroke: &Stroke) {
        let half = ((stroke.width.max(1.0) - 1.0) / 2.0).round() as i64;
        for dy in -half..=half {
            for dx in -half..=half {
                self.put(x + dx as f64, y + dy as f64, stroke.color);
            }
        }
    }
}

impl Surface for PixelCanvas {
    fn size(&self) -> (f64, f64) {
        (self.width as f64, self.height as f64)
    }

    fn clear(&mut self, color: Rgb) {
        self.pixels.fill(color);
        self.texts.clear();
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: &Stroke) {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let length = dx.hypot(dy);
        if !length.is_finite() {
            return;
        }
        let steps = length.ceil().max(1.0) as usize;
        // cap runaway lines from off-canvas points
        let steps = steps.min(4 * (self.width + self.height).max(1));
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            if let Some((on, off)) = stroke.dash {
                let travelled = t * length;
                if travelled % (on + off) >= on {
                    continue;
                }
            }
            self.brush(from.0 + dx * t, from.1 + dy * t, stroke);
        }
    }

    fn circle(&mut self, center: (f64, f64), radius: f64, fill: Option<Rgb>, stroke: Option<&Stroke>) {
        let (cx, cy) = center;
        let r = radius.max(0.0);
        let reach = (r + stroke.map_or(0.0, |s| s.width)).ceil() as i64;
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let d = ((dx * dx + dy * dy) as f64).sqrt();
                let (x, y) = (cx + dx as f64, cy + dy as f64);
                if let Some(s) = stroke {
                    if (d - r).abs() <= s.width.max(1.0) / 2.0 {
                        self.put(x, y, s.color);
                        continue;
                    }
                }
                if let Some(color) = fill {
                    if d < r {
                        self.put(x, y, color);
                    }
                }
            }
        }
    }

    fn fill_rect(&mut self, origin: (f64, f64), size: (f64, f64), color: Rgb) {
        let (x0, y0) = (origin.0.max(0.0).round() as usize, origin.1.max(0.0).round() as usize);
        let x1 = ((origin.0 + size.0).round().max(0.0) as usize).min(self.width);
        let y1 = ((origin.1 + size.1).round().max(0.0) as usize).min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.pixels[y * self.width + x] = color;
            }
        }
    }

    fn text(&mut self, pos: (f64, f64), text: &str, _color: Rgb) {
        self.texts.push((pos, text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = PixelCanvas::new(20, 10);
        canvas.line((2.0, 5.0), (12.0, 5.0), &Stroke::solid(Rgb::WHITE, 1.0));
        assert_eq!(canvas.count(Rgb::WHITE), 11);
        assert_eq!(canvas.pixel(2, 5), Some(Rgb::WHITE));
        assert_eq!(canvas.pixel(13, 5), Some(Rgb::BLACK));
    }

    #[test]
    fn test_dashed_line_leaves_gaps() {
        let mut canvas = PixelCanvas::new(40, 4);
        canvas.line((0.0, 1.0), (30.0, 1.0), &Stroke::dashed(Rgb::WHITE, 1.0, 2.0, 4.0));
        let lit = canvas.count(Rgb::WHITE);
        assert!(lit > 0 && lit < 31);
    }

    #[test]
    fn test_off_canvas_drawing_is_clipped() {
        let mut canvas = PixelCanvas::new(10, 10);
        canvas.line((-50.0, -50.0), (50.0, 50.0), &Stroke::solid(Rgb::WHITE, 3.0));
        canvas.circle((100.0, 100.0), 5.0, Some(Rgb::WHITE), None);
        canvas.fill_rect((-5.0, -5.0), (100.0, 2.0), Rgb::WHITE);
        assert!(canvas.count(Rgb::WHITE) > 0);
    }

    #[test]
    fn test_filled_circle() {
        let mut canvas = PixelCanvas::new(30, 30);
        let red = Rgb::new(255, 0, 0);
        canvas.circle((15.0, 15.0), 4.0, Some(red), Some(&Stroke::solid(Rgb::WHITE, 1.0)));
        assert_eq!(canvas.pixel(15, 15), Some(red));
        assert_eq!(canvas.pixel(19, 15), Some(Rgb::WHITE));
        assert_eq!(canvas.pixel(25, 15), Some(Rgb::BLACK));
    }

    #[test]
    fn test_text_is_recorded() {
        let mut canvas = PixelCanvas::new(10, 10);
        canvas.text((1.0, 2.0), "0dB", Rgb::WHITE);
        assert_eq!(canvas.texts()[0].1, "0dB");
        canvas.clear(Rgb::BLACK);
        assert!(canvas.texts().is_empty());
    }
}
