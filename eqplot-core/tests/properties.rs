use eqplot_core::interaction::{GestureController, PlotEvent, PointerEvent, PointerKind};
use eqplot_core::plot::markers::{IndexOptions, build_marker_index, hit_test};
use eqplot_core::plot::{CoordinateMapper, Marker, Rgb};
use eqplot_core::{BiquadSubtype, FilterDefinition, FilterSet, PlotConfig};
use proptest::prelude::*;

const CANVAS: (f64, f64) = (1000.0, 540.0);

fn subtype() -> impl Strategy<Value = BiquadSubtype> {
    prop_oneof![
        Just(BiquadSubtype::Peaking),
        Just(BiquadSubtype::Lowshelf),
        Just(BiquadSubtype::Highshelf),
    ]
}

fn filter_set() -> impl Strategy<Value = FilterSet> {
    prop::collection::vec((subtype(), 20.0f64..20000.0, -15.0f64..15.0, 0.1f64..10.0), 1..8)
        .prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (subtype, f, g, q))| {
                    (format!("F{}", i), FilterDefinition::biquad(subtype, f, g, q))
                })
                .collect()
        })
}

fn markers(filters: &FilterSet) -> Vec<Marker> {
    let config = PlotConfig::default();
    build_marker_index(
        filters,
        &IndexOptions::new(CANVAS, Rgb::DEFAULT_SEED),
        &CoordinateMapper::new(&config),
        &config,
    )
}

proptest! {
    #[test]
    fn prop_hit_test_is_deterministic_and_topmost(
        filters in filter_set(),
        x in 0.0f64..1000.0,
        y in 0.0f64..540.0,
    ) {
        let markers = markers(&filters);
        let first = hit_test(x, y, &markers).map(|m| m.id.clone());
        let second = hit_test(x, y, &markers).map(|m| m.id.clone());
        prop_assert_eq!(&first, &second);

        let in_range: Vec<&Marker> = markers
            .iter()
            .filter(|m| m.distance_to(x, y) <= m.hit_radius)
            .collect();
        prop_assert_eq!(first, in_range.last().map(|m| m.id.clone()));
    }

    #[test]
    fn prop_drag_gain_stays_within_limit(
        filters in filter_set(),
        moves in prop::collection::vec((-2000.0f64..3000.0, -5000.0f64..5000.0), 1..20),
    ) {
        let markers = markers(&filters);
        let (x, y) = (markers[0].x, markers[0].y);
        let mut controller = GestureController::new(PlotConfig::default());
        controller.set_markers(markers, CANVAS);
        controller.handle_pointer(&PointerEvent::new(PointerKind::Down, x, y));
        prop_assert!(controller.is_dragging());

        for (mx, my) in moves {
            for event in controller.handle_pointer(&PointerEvent::new(PointerKind::Move, mx, my)) {
                if let PlotEvent::Drag { params, .. } = event {
                    let gain = params.gain.unwrap_or_default();
                    let freq = params.frequency.unwrap_or(20.0);
                    prop_assert!((-15.0..=15.0).contains(&gain));
                    prop_assert!((20.0..=20000.0).contains(&freq));
                }
            }
        }
    }
}
