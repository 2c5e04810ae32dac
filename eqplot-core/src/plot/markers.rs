// Draggable markers derived from the filter set, and pixel hit testing.

use std::collections::HashMap;

use super::color::{Rgb, color_change, subtype_palette};
use super::mapper::CoordinateMapper;
use crate::config::PlotConfig;
use crate::filter::{BiquadSubtype, FilterDefinition, FilterSet, base_name, marker_id};

/// One on-canvas marker. Rebuilt on every render pass; the filter set stays the
/// source of truth.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// filter name plus the channel suffix when plotted per channel
    pub id: String,
    pub filter_name: String,
    /// filter name with any channel suffix stripped
    pub base_name: String,
    pub channel: Option<usize>,
    pub frequency: f64,
    pub gain: f64,
    pub q: f64,
    pub subtype: BiquadSubtype,
    /// glyph color, shared by all markers of the same subtype
    pub color: Rgb,
    /// color of this filter's response curve
    pub curve_color: Rgb,
    pub x: f64,
    pub y: f64,
    pub hit_radius: f64,
    pub interactive: bool,
    pub selected: bool,
}

impl Marker {
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        (x - self.x).hypot(y - self.y)
    }
}

pub type FilterPredicate<'a> = &'a dyn Fn(&str, &FilterDefinition) -> bool;

/// Inputs to [`build_marker_index`] besides the filters themselves
pub struct IndexOptions<'a> {
    pub canvas_size: (f64, f64),
    /// seed for the per-index curve colors
    pub color_seed: Rgb,
    pub channel: Option<usize>,
    /// which filters get a marker at all, applied after the plottable check
    pub marker_filter: Option<FilterPredicate<'a>>,
    /// which markers react to the pointer, defaults to `marker_filter`
    pub interactive_filter: Option<FilterPredicate<'a>>,
    /// base names rendered as selected
    pub selected_bases: Option<&'a [String]>,
    /// glyph colors keyed by subtype, generated from the filters when `None`
    pub palette: Option<&'a HashMap<BiquadSubtype, Rgb>>,
}

impl<'a> IndexOptions<'a> {
    pub fn new(canvas_size: (f64, f64), color_seed: Rgb) -> Self {
        Self {
            canvas_size,
            color_seed,
            channel: None,
            marker_filter: None,
            interactive_filter: None,
            selected_bases: None,
            palette: None,
        }
    }
}

/// Markers for every plottable filter, in filter order
pub fn build_marker_index(
    filters: &FilterSet,
    options: &IndexOptions<'_>,
    mapper: &CoordinateMapper,
    config: &PlotConfig,
) -> Vec<Marker> {
    let (width, height) = options.canvas_size;

    let generated;
    let palette = match options.palette {
        Some(p) => p,
        None => {
            generated = subtype_palette(
                filters
                    .iter()
                    .filter_map(|(_, f)| f.plottable().map(|p| p.subtype)),
            );
            &generated
        }
    };

    let mut markers = Vec::new();
    // index over plotted filters only, so curve colors match the renderer
    let mut filter_num = 0;
    for (name, filter) in filters.iter() {
        let Some(params) = filter.plottable() else {
            continue;
        };
        let visible = options.marker_filter.is_none_or(|accept| accept(name, filter));
        let curve_color = color_change(options.color_seed, filter_num);
        filter_num += 1;
        if !visible {
            continue;
        }

        let interactive = match options.interactive_filter {
            Some(accept) => accept(name, filter),
            None => visible,
        };
        let base = base_name(name);
        let selected = options
            .selected_bases
            .is_some_and(|bases| bases.iter().any(|b| b == base));

        let marker = Marker {
            id: marker_id(name, options.channel),
            filter_name: name.to_string(),
            base_name: base.to_string(),
            channel: options.channel,
            frequency: params.frequency,
            gain: params.gain,
            q: params.q,
            subtype: params.subtype,
            color: palette
                .get(&params.subtype)
                .copied()
                .unwrap_or(curve_color),
            curve_color,
            x: mapper.frequency_to_x(params.frequency, width),
            y: mapper.gain_to_y(params.gain, height),
            hit_radius: config.hit_radius(),
            interactive,
            selected,
        };
        log::trace!(
            "marker {} at ({:.1}, {:.1}) {}Hz {}dB Q{}",
            marker.id,
            marker.x,
            marker.y,
            marker.frequency,
            marker.gain,
            marker.q
        );
        markers.push(marker);
    }

    log::debug!("built marker index with {} markers", markers.len());
    markers
}

/// Topmost interactive marker within its hit radius of `(x, y)`. Later markers
/// are drawn on top, so they win over earlier ones.
pub fn hit_test(x: f64, y: f64, markers: &[Marker]) -> Option<&Marker> {
    hit_test_index(x, y, markers).map(|i| &markers[i])
}

pub fn hit_test_index(x: f64, y: f64, markers: &[Marker]) -> Option<usize> {
    let idx = markers
        .iter()
        .enumerate()
        .rev()
        .find(|(_, m)| m.interactive && m.distance_to(x, y) <= m.hit_radius)
        .map(|(i, _)| i);
    if let Some(i) = idx {
        log::trace!(
            "hit marker {} at distance {:.2}px",
            markers[i].id,
            markers[i].distance_to(x, y)
        );
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::is_system_filter;

    const CANVAS: (f64, f64) = (1000.0, 540.0);

    fn filters() -> FilterSet {
        FilterSet::new()
            .with("F1", FilterDefinition::biquad(BiquadSubtype::Peaking, 1000.0, 3.0, 1.0))
            .with("Gain", FilterDefinition::Gain { gain: -3.0 })
            .with("LP", FilterDefinition::biquad(BiquadSubtype::Lowpass, 8000.0, 0.0, 0.7))
            .with("F2", FilterDefinition::biquad(BiquadSubtype::Lowshelf, 100.0, -2.0, 0.7))
            .with("__bass", FilterDefinition::biquad(BiquadSubtype::Peaking, 80.0, 1.0, 1.0))
            .with("F3", FilterDefinition::biquad(BiquadSubtype::Peaking, 5000.0, 0.0, 2.0))
    }

    fn index(filters: &FilterSet, options: &IndexOptions<'_>) -> Vec<Marker> {
        let config = PlotConfig::default();
        build_marker_index(filters, options, &CoordinateMapper::new(&config), &config)
    }

    #[test]
    fn test_only_plottable_biquads_are_indexed() {
        let markers = index(&filters(), &IndexOptions::new(CANVAS, Rgb::DEFAULT_SEED));
        let names: Vec<&str> = markers.iter().map(|m| m.filter_name.as_str()).collect();
        assert_eq!(names, vec!["F1", "F2", "__bass", "F3"]);
        assert!(markers.iter().all(|m| m.interactive));
    }

    #[test]
    fn test_marker_positions_follow_mapper() {
        let markers = index(&filters(), &IndexOptions::new(CANVAS, Rgb::DEFAULT_SEED));
        let mapper = CoordinateMapper::default();
        let f1 = &markers[0];
        assert_eq!(f1.x, mapper.frequency_to_x(1000.0, CANVAS.0));
        assert_eq!(f1.y, mapper.gain_to_y(3.0, CANVAS.1));
        assert_eq!(f1.hit_radius, 16.0);
    }

    #[test]
    fn test_marker_predicate_and_colors() {
        let not_system = |name: &str, _: &FilterDefinition| !is_system_filter(name);
        let mut options = IndexOptions::new(CANVAS, Rgb::DEFAULT_SEED);
        options.marker_filter = Some(&not_system);
        let markers = index(&filters(), &options);

        let names: Vec<&str> = markers.iter().map(|m| m.filter_name.as_str()).collect();
        assert_eq!(names, vec!["F1", "F2", "F3"]);

        // curve colors count hidden plotted filters too
        assert_eq!(markers[0].curve_color, color_change(Rgb::DEFAULT_SEED, 0));
        assert_eq!(markers[1].curve_color, color_change(Rgb::DEFAULT_SEED, 1));
        assert_eq!(markers[2].curve_color, color_change(Rgb::DEFAULT_SEED, 3));

        // same subtype, same glyph color
        assert_eq!(markers[0].color, markers[2].color);
        assert_ne!(markers[0].color, markers[1].color);
    }

    #[test]
    fn test_channel_suffix_and_selection() {
        let bases = vec!["F2".to_string()];
        let mut options = IndexOptions::new(CANVAS, Rgb::DEFAULT_SEED);
        options.channel = Some(1);
        options.selected_bases = Some(&bases);
        let set = FilterSet::new().with(
            "F2__c1",
            FilterDefinition::biquad(BiquadSubtype::Peaking, 200.0, 1.0, 1.0),
        );
        let markers = index(&set, &options);

        assert_eq!(markers[0].id, "F2__c1__c1");
        assert_eq!(markers[0].base_name, "F2");
        assert!(markers[0].selected);
    }

    #[test]
    fn test_malformed_filter_is_skipped_between_valid_ones() {
        let set = FilterSet::new()
            .with("A", FilterDefinition::biquad(BiquadSubtype::Peaking, 300.0, 2.0, 1.0))
            .with("Bad", FilterDefinition::biquad(BiquadSubtype::Lowshelf, f64::NAN, 1.0, 0.7))
            .with("B", FilterDefinition::biquad(BiquadSubtype::Highshelf, 6000.0, -2.0, 0.7));
        let markers = index(&set, &IndexOptions::new(CANVAS, Rgb::DEFAULT_SEED));

        let names: Vec<&str> = markers.iter().map(|m| m.filter_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(markers.iter().all(|m| m.x.is_finite() && m.y.is_finite()));
        let b = &markers[1];
        assert_eq!(hit_test(b.x, b.y, &markers).map(|m| m.id.as_str()), Some("B"));
    }

    #[test]
    fn test_non_interactive_markers_are_not_hit() {
        let never = |_: &str, _: &FilterDefinition| false;
        let mut options = IndexOptions::new(CANVAS, Rgb::DEFAULT_SEED);
        options.interactive_filter = Some(&never);
        let markers = index(&filters(), &options);
        assert!(!markers.is_empty());
        let m = &markers[0];
        assert!(hit_test(m.x, m.y, &markers).is_none());
    }

    #[test]
    fn test_hit_test_radius() {
        let markers = index(&filters(), &IndexOptions::new(CANVAS, Rgb::DEFAULT_SEED));
        let f1 = &markers[0];
        assert_eq!(hit_test(f1.x + 15.0, f1.y, &markers).map(|m| m.id.as_str()), Some("F1"));
        assert_eq!(hit_test(f1.x + 12.0, f1.y + 9.0, &markers).map(|m| m.id.as_str()), Some("F1"));
        assert!(hit_test(f1.x + 17.0, f1.y, &markers).is_none());
    }

    #[test]
    fn test_topmost_marker_wins() {
        let set = FilterSet::new()
            .with("A", FilterDefinition::biquad(BiquadSubtype::Peaking, 1000.0, 0.0, 1.0))
            .with("B", FilterDefinition::biquad(BiquadSubtype::Peaking, 1010.0, 0.2, 1.0));
        let markers = index(&set, &IndexOptions::new(CANVAS, Rgb::DEFAULT_SEED));
        let (x, y) = (markers[0].x, markers[0].y);
        for _ in 0..10 {
            assert_eq!(hit_test(x, y, &markers).map(|m| m.id.as_str()), Some("B"));
        }
    }
}
