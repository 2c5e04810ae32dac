//! Curve renderer: grid, per-filter response curves, the summed total curve and
//! marker glyphs, drawn onto any [`Surface`].

use super::color::{Rgb, color_change};
use super::mapper::CoordinateMapper;
use super::markers::{FilterPredicate, IndexOptions, Marker, build_marker_index};
use super::surface::{Stroke, Surface};
use crate::config::PlotConfig;
use crate::dsp::response::{ResponseCurve, filter_response};
use crate::filter::{FilterSet, MAX_FREQ, MIN_FREQ};

const GRID_COLOR: Rgb = Rgb::new(0xCC, 0xCC, 0xCC);
const GRID_EMPHASIS_COLOR: Rgb = Rgb::new(0xDD, 0xDD, 0xDD);
const LABEL_COLOR: Rgb = Rgb::new(0xDD, 0xDD, 0xDD);
const CURVE_WIDTH: f64 = 0.5;
const TOTAL_WIDTH: f64 = 2.5;
/// Vertical inset of the frequency gridlines (px)
const GRID_INSET: f64 = 16.0;

/// Per-pass options for [`CurveRenderer::plot`]
pub struct PlotOptions<'a> {
    /// centered at the top of the canvas
    pub title: Option<&'a str>,
    pub color_seed: Rgb,
    pub channel: Option<usize>,
    /// false for the second and later channel passes
    pub draw_grid: bool,
    pub marker_filter: Option<FilterPredicate<'a>>,
    pub interactive_filter: Option<FilterPredicate<'a>>,
    pub selected_bases: Option<&'a [String]>,
}

impl Default for PlotOptions<'_> {
    fn default() -> Self {
        Self {
            title: None,
            color_seed: Rgb::DEFAULT_SEED,
            channel: None,
            draw_grid: true,
            marker_filter: None,
            interactive_filter: None,
            selected_bases: None,
        }
    }
}

/// What one plot pass leaves behind for the gesture controller
#[derive(Debug, Clone, Default)]
pub struct PlotOutput {
    pub markers: Vec<Marker>,
    /// additive sum of all plotted filters
    pub total: ResponseCurve,
    /// rounded maximum of the total curve
    pub peak_db: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CurveRenderer {
    config: PlotConfig,
    mapper: CoordinateMapper,
}

impl CurveRenderer {
    pub fn new(config: PlotConfig) -> Self {
        let mapper = CoordinateMapper::new(&config);
        Self { config, mapper }
    }

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// dB gridlines on every odd step of the span, log-spaced frequency lines
    /// with labels at 100 Hz, 1 kHz and 10 kHz
    pub fn draw_grid<S: Surface + ?Sized>(&self, surface: &mut S) {
        let (width, height) = surface.size();
        let left = self.mapper.left_margin();
        let right = width - self.config.right_margin;

        let grid = Stroke::dashed(GRID_COLOR, 0.5, 1.0, 5.0);
        let span = self.config.db_span.round() as i64;
        for i in (1..span).step_by(2) {
            let level = span / 2 - i;
            let y = self.mapper.gain_to_y(level as f64, height);
            surface.line((left, y), (right, y), &grid);
            surface.text((0.0, y), &format!("{}dB", level), LABEL_COLOR);
        }

        let (top, bottom) = (GRID_INSET, height - GRID_INSET);
        for freq in grid_frequencies() {
            let x = self.mapper.frequency_to_x(freq, width);
            surface.line((x, top), (x, bottom), &grid);
        }

        let emphasis = Stroke::dashed(GRID_EMPHASIS_COLOR, 0.8, 3.0, 5.0);
        for freq in [100.0, 1000.0, 10000.0] {
            let x = self.mapper.frequency_to_x(freq, width);
            surface.line((x, top), (x, bottom), &emphasis);
            let label = format!("{}Hz", group_thousands(freq as u64));
            surface.text((x - 20.0, height - 2.0), &label, LABEL_COLOR);
        }
    }

    /// Draw one channel's curves and return its marker index.
    ///
    /// Every plottable filter gets a thin curve colored by its plot index; the
    /// thick total curve is the dB sum of all of them. The sum is an
    /// approximation of the cascade that matches what the curves look like
    /// stacked on the grid.
    pub fn plot<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        filters: &FilterSet,
        options: &PlotOptions<'_>,
    ) -> PlotOutput {
        if options.draw_grid {
            self.draw_grid(surface);
        }

        let mut total =
            ResponseCurve::flat(self.config.response_len, self.config.reference_sample_rate);
        let mut filter_num = 0;
        for (name, filter) in filters.iter() {
            let Some(params) = filter.plottable() else {
                log::trace!("skipping {} ({}) in plot", name, filter.kind_name());
                continue;
            };
            let curve = filter_response(params, &self.config);
            total.accumulate(&curve);
            let color = color_change(options.color_seed, filter_num);
            self.draw_curve(surface, &curve, &Stroke::solid(color, CURVE_WIDTH));
            filter_num += 1;
        }
        self.draw_curve(surface, &total, &Stroke::solid(Rgb::WHITE, TOTAL_WIDTH));

        if let Some(title) = options.title {
            let text = format!(" {} ", title);
            let (width, _) = surface.size();
            let left = (width - surface.text_width(&text)) / 2.0;
            surface.text((left, 12.0), &text, Rgb::WHITE);
        }

        let mut index = IndexOptions::new(surface.size(), options.color_seed);
        index.channel = options.channel;
        index.marker_filter = options.marker_filter;
        index.interactive_filter = options.interactive_filter;
        index.selected_bases = options.selected_bases;
        let markers = build_marker_index(filters, &index, &self.mapper, &self.config);

        let peak_db = total.max_db().unwrap_or(0.0).round();
        PlotOutput {
            markers,
            total,
            peak_db,
        }
    }

    pub fn draw_curve<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        curve: &ResponseCurve,
        stroke: &Stroke,
    ) {
        let (width, height) = surface.size();
        let points: Vec<(f64, f64)> = (0..curve.len())
            .map(|i| {
                (
                    self.mapper.frequency_to_x(curve.frequency_at(i), width),
                    self.mapper.gain_to_y(curve.points[i].1, height),
                )
            })
            .collect();
        surface.polyline(&points, stroke);
    }

    /// Marker glyphs plus an info box for the hovered (else selected) marker
    pub fn draw_overlay<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        markers: &[Marker],
        selected: Option<&str>,
        hovered: Option<&str>,
    ) {
        for marker in markers {
            let is_selected = marker.selected || selected == Some(marker.id.as_str());
            let is_hovered = hovered == Some(marker.id.as_str());
            self.draw_marker(surface, marker, is_selected, is_hovered);
        }

        let active = hovered.or(selected);
        if let Some(marker) = active.and_then(|id| markers.iter().find(|m| m.id == id)) {
            self.draw_info_overlay(surface, marker);
        }
    }

    fn draw_marker<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        marker: &Marker,
        selected: bool,
        hovered: bool,
    ) {
        let (width, _) = surface.size();
        let (lo, hi) = bandwidth_edges(marker.frequency, marker.q);
        let x_lo = self.mapper.frequency_to_x(lo, width);
        let x_hi = self.mapper.frequency_to_x(hi, width);
        surface.line(
            (x_lo, marker.y),
            (x_hi, marker.y),
            &Stroke::solid(marker.color, 1.0),
        );

        let radius = if selected {
            self.config.selected_dot_radius
        } else {
            self.config.dot_radius
        };
        let ring = if selected {
            Stroke::solid(Rgb::WHITE, 3.0)
        } else if hovered {
            Stroke::solid(Rgb::WHITE, 2.0)
        } else {
            Stroke::solid(Rgb::BLACK, 1.5)
        };
        surface.circle((marker.x, marker.y), radius, Some(marker.color), Some(&ring));
    }

    fn draw_info_overlay<S: Surface + ?Sized>(&self, surface: &mut S, marker: &Marker) {
        const PADDING: f64 = 8.0;
        const OFFSET_Y: f64 = -25.0;
        const TEXT_HEIGHT: f64 = 16.0;

        let text = format_marker_info(marker);
        let (width, _) = surface.size();
        let text_width = surface.text_width(&text);

        let max_x = width - text_width - PADDING * 2.0 - 5.0;
        let box_x = (marker.x - text_width / 2.0 - PADDING).min(max_x).max(5.0);
        let box_y = (marker.y + OFFSET_Y - TEXT_HEIGHT - PADDING).max(5.0);
        let size = (text_width + PADDING * 2.0, TEXT_HEIGHT + PADDING * 2.0);

        surface.fill_rect((box_x, box_y), size, Rgb::BLACK);
        surface.stroke_rect((box_x, box_y), size, &Stroke::solid(marker.color, 2.0));
        surface.text(
            (box_x + PADDING, box_y + TEXT_HEIGHT + PADDING / 2.0),
            &text,
            Rgb::WHITE,
        );
    }
}

/// `"1.20 kHz | -3.0 dB | Q: 0.71"`
pub fn format_marker_info(marker: &Marker) -> String {
    format!(
        "{} | {:.1} dB | Q: {:.2}",
        format_frequency(marker.frequency),
        marker.gain,
        marker.q
    )
}

pub fn format_frequency(freq: f64) -> String {
    if freq < 1000.0 {
        format!("{} Hz", freq.round())
    } else {
        format!("{:.2} kHz", freq / 1000.0)
    }
}

/// Band edges of a filter with quality `q`, using the octave bandwidth
/// `N = 2/ln2 · asinh(1/(2Q))`
pub fn bandwidth_edges(freq: f64, q: f64) -> (f64, f64) {
    let octaves = 2.0 / std::f64::consts::LN_2 * (1.0 / (2.0 * q.max(0.01))).asinh();
    let factor = 2f64.powf(octaves / 2.0);
    (
        (freq / factor).clamp(MIN_FREQ, MAX_FREQ),
        (freq * factor).clamp(MIN_FREQ, MAX_FREQ),
    )
}

/// 20, 30 ... 90, 100, 200 ... 20000
fn grid_frequencies() -> impl Iterator<Item = f64> {
    [10.0, 100.0, 1000.0, 10000.0]
        .into_iter()
        .flat_map(|decade| (1..=9).map(move |m| m as f64 * decade))
        .chain(std::iter::once(MAX_FREQ))
        .filter(|f| (MIN_FREQ..=MAX_FREQ).contains(f))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{BiquadSubtype, FilterDefinition};
    use crate::plot::surface::PixelCanvas;

    fn renderer() -> CurveRenderer {
        CurveRenderer::new(PlotConfig::default())
    }

    #[test]
    fn test_grid_labels() {
        let mut canvas = PixelCanvas::new(1000, 540);
        renderer().draw_grid(&mut canvas);
        let labels: Vec<&str> = canvas.texts().iter().map(|(_, t)| t.as_str()).collect();
        assert!(labels.contains(&"14dB"));
        assert!(labels.contains(&"0dB"));
        assert!(labels.contains(&"-14dB"));
        assert!(!labels.contains(&"15dB"));
        assert!(labels.contains(&"100Hz"));
        assert!(labels.contains(&"1,000Hz"));
        assert!(labels.contains(&"10,000Hz"));
        assert!(canvas.count(GRID_COLOR) > 0);
    }

    #[test]
    fn test_grid_frequencies() {
        let freqs: Vec<f64> = grid_frequencies().collect();
        assert_eq!(freqs.first(), Some(&20.0));
        assert_eq!(freqs.last(), Some(&20000.0));
        assert!(freqs.contains(&1000.0));
        assert!(freqs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_plot_sums_filters() {
        let filters = FilterSet::new()
            .with("A", FilterDefinition::biquad(BiquadSubtype::Peaking, 1000.0, 4.0, 1.0))
            .with("B", FilterDefinition::biquad(BiquadSubtype::Peaking, 1000.0, 2.0, 1.0))
            .with("G", FilterDefinition::Gain { gain: 10.0 });
        let mut canvas = PixelCanvas::new(1000, 540);
        let out = renderer().plot(&mut canvas, &filters, &PlotOptions::default());

        assert_eq!(out.markers.len(), 2);
        assert_eq!(out.total.len(), 2048);
        assert_eq!(out.peak_db, 6.0);
        assert!(canvas.count(Rgb::WHITE) > 0);
    }

    #[test]
    fn test_malformed_filter_does_not_stop_the_others() {
        let filters = FilterSet::new()
            .with("A", FilterDefinition::biquad(BiquadSubtype::Peaking, 500.0, 3.0, 1.0))
            .with("Bad", FilterDefinition::biquad(BiquadSubtype::Peaking, f64::NAN, 5.0, 1.0))
            .with("B", FilterDefinition::biquad(BiquadSubtype::Peaking, 5000.0, 4.0, 1.0));
        let mut canvas = PixelCanvas::new(1000, 540);
        let out = renderer().plot(&mut canvas, &filters, &PlotOptions::default());

        let names: Vec<&str> = out.markers.iter().map(|m| m.filter_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(out.total.db().all(|db| db.is_finite()));
        assert_eq!(out.peak_db, 4.0);
        // B keeps the second curve color
        assert_eq!(out.markers[1].curve_color, color_change(Rgb::DEFAULT_SEED, 1));
        assert!(canvas.count(color_change(Rgb::DEFAULT_SEED, 0)) > 0);
        assert!(canvas.count(color_change(Rgb::DEFAULT_SEED, 1)) > 0);
    }

    #[test]
    fn test_plot_without_grid_and_with_title() {
        let mut canvas = PixelCanvas::new(800, 540);
        let options = PlotOptions {
            title: Some("Headphones"),
            draw_grid: false,
            ..PlotOptions::default()
        };
        let out = renderer().plot(&mut canvas, &FilterSet::new(), &options);
        assert!(out.markers.is_empty());
        assert_eq!(out.peak_db, 0.0);
        assert_eq!(canvas.count(GRID_COLOR), 0);
        assert!(canvas.texts().iter().any(|(_, t)| t == " Headphones "));
    }

    #[test]
    fn test_overlay_draws_info_for_hovered_marker() {
        let filters = FilterSet::new().with(
            "A",
            FilterDefinition::biquad(BiquadSubtype::Highshelf, 4500.0, -3.0, 0.7),
        );
        let r = renderer();
        let mut canvas = PixelCanvas::new(1000, 540);
        let out = r.plot(&mut canvas, &filters, &PlotOptions::default());
        r.draw_overlay(&mut canvas, &out.markers, None, Some("A"));

        let info = canvas.texts().last().map(|(_, t)| t.clone());
        assert_eq!(info.as_deref(), Some("4.50 kHz | -3.0 dB | Q: 0.70"));
        let m = &out.markers[0];
        assert_eq!(
            canvas.pixel(m.x.round() as usize, m.y.round() as usize),
            Some(m.color)
        );
    }

    #[test]
    fn test_frequency_formatting() {
        assert_eq!(format_frequency(440.4), "440 Hz");
        assert_eq!(format_frequency(1234.0), "1.23 kHz");
        assert_eq!(group_thousands(100), "100");
        assert_eq!(group_thousands(10000), "10,000");
    }

    #[test]
    fn test_bandwidth_edges() {
        // Q = sqrt(2) is one octave wide
        let (lo, hi) = bandwidth_edges(1000.0, std::f64::consts::SQRT_2);
        assert!((hi / lo - 2.0).abs() < 1e-9);
        assert!((lo * hi - 1000.0 * 1000.0).abs() < 1e-6);
        let (narrow_lo, narrow_hi) = bandwidth_edges(1000.0, 10.0);
        assert!(narrow_hi / narrow_lo < hi / lo);
    }
}
