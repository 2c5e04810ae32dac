//! Frequency/gain <-> pixel transforms.
//!
//! The x axis is logarithmic over [`MIN_FREQ`, `MAX_FREQ`], the y axis linear in dB
//! with 0 dB on the vertical center of the canvas.

use crate::config::PlotConfig;
use crate::filter::{MAX_FREQ, MIN_FREQ};

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMapper {
    left_margin: f64,
    right_margin: f64,
    height_scale: f64,
    gain_limit: f64,
}

impl CoordinateMapper {
    pub fn new(config: &PlotConfig) -> Self {
        Self {
            left_margin: config.left_margin,
            right_margin: config.right_margin,
            height_scale: config.height_scale,
            gain_limit: config.gain_limit,
        }
    }

    pub fn left_margin(&self) -> f64 {
        self.left_margin
    }

    pub fn height_scale(&self) -> f64 {
        self.height_scale
    }

    /// Width of the plotted frequency range in pixels
    pub fn plot_width(&self, canvas_width: f64) -> f64 {
        (canvas_width - self.left_margin - self.right_margin).max(1.0)
    }

    pub fn frequency_to_x(&self, freq: f64, canvas_width: f64) -> f64 {
        let freq = if freq.is_nan() {
            MIN_FREQ
        } else {
            freq.clamp(MIN_FREQ, MAX_FREQ)
        };
        let normalized =
            (freq.log10() - MIN_FREQ.log10()) / (MAX_FREQ.log10() - MIN_FREQ.log10());
        self.left_margin + normalized * self.plot_width(canvas_width)
    }

    pub fn x_to_frequency(&self, x: f64, canvas_width: f64) -> f64 {
        let normalized = (x - self.left_margin) / self.plot_width(canvas_width);
        let log_freq =
            MIN_FREQ.log10() + normalized * (MAX_FREQ.log10() - MIN_FREQ.log10());
        let freq = 10f64.powf(log_freq);
        if freq.is_nan() {
            return MIN_FREQ;
        }
        freq.clamp(MIN_FREQ, MAX_FREQ)
    }

    pub fn gain_to_y(&self, gain: f64, canvas_height: f64) -> f64 {
        canvas_height / 2.0 - gain * self.height_scale
    }

    /// Inverse of [`gain_to_y`](Self::gain_to_y), clamped to the absolute gain limit
    pub fn y_to_gain(&self, y: f64, canvas_height: f64) -> f64 {
        self.y_to_gain_within(y, canvas_height, self.gain_limit)
    }

    /// Inverse of [`gain_to_y`](Self::gain_to_y), clamped to `±limit`
    pub fn y_to_gain_within(&self, y: f64, canvas_height: f64, limit: f64) -> f64 {
        let gain = (canvas_height / 2.0 - y) / self.height_scale;
        if gain.is_nan() {
            return 0.0;
        }
        gain.clamp(-limit, limit)
    }
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self::new(&PlotConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_frequency_bounds_map_to_plot_edges() {
        let mapper = CoordinateMapper::default();
        let width = 1000.0;
        assert!((mapper.frequency_to_x(MIN_FREQ, width) - 35.0).abs() < 1e-9);
        assert!((mapper.frequency_to_x(MAX_FREQ, width) - 995.0).abs() < 1e-9);
        // 2 kHz sits at two thirds of the decade span 20..20k
        let x = mapper.frequency_to_x(2000.0, width);
        assert!((x - (35.0 + 960.0 * 2.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_frequency_is_clamped() {
        let mapper = CoordinateMapper::default();
        assert_eq!(
            mapper.frequency_to_x(5.0, 800.0),
            mapper.frequency_to_x(MIN_FREQ, 800.0)
        );
        assert_eq!(
            mapper.frequency_to_x(96000.0, 800.0),
            mapper.frequency_to_x(MAX_FREQ, 800.0)
        );
        assert_eq!(mapper.x_to_frequency(-500.0, 800.0), MIN_FREQ);
        assert_eq!(mapper.x_to_frequency(5000.0, 800.0), MAX_FREQ);
    }

    #[test]
    fn test_gain_axis() {
        let mapper = CoordinateMapper::default();
        assert_eq!(mapper.gain_to_y(0.0, 540.0), 270.0);
        assert_eq!(mapper.gain_to_y(10.0, 540.0), 270.0 - 165.0);
        assert_eq!(mapper.y_to_gain(-10_000.0, 540.0), 24.0);
        assert_eq!(mapper.y_to_gain_within(-10_000.0, 540.0, 15.0), 15.0);
        assert_eq!(mapper.y_to_gain_within(10_000.0, 540.0, 15.0), -15.0);
    }

    proptest! {
        #[test]
        fn prop_frequency_round_trip(f in 20.0f64..=20000.0, w in 100.0f64..4000.0) {
            let mapper = CoordinateMapper::default();
            let back = mapper.x_to_frequency(mapper.frequency_to_x(f, w), w);
            prop_assert!(((back - f) / f).abs() < 0.005);
        }

        #[test]
        fn prop_gain_round_trip(g in -24.0f64..=24.0, h in 100.0f64..2000.0) {
            let mapper = CoordinateMapper::default();
            let back = mapper.y_to_gain(mapper.gain_to_y(g, h), h);
            prop_assert!((back - g).abs() < 1e-9);
        }
    }
}
