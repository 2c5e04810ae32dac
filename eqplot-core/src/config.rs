use std::time::Duration;

/// Layout and interaction constants shared by the mapper, renderer and gesture controller
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    /// Space left of the plot area for dB labels (px)
    pub left_margin: f64,
    /// Space right of the plot area (px)
    pub right_margin: f64,
    /// Vertical scale (px per dB)
    pub height_scale: f64,
    /// dB span covered by the horizontal grid
    pub db_span: f64,
    /// Gain limit while dragging a marker (dB)
    pub drag_gain_limit: f64,
    /// Gain limit for keyboard edits and the inverse y mapping (dB)
    pub gain_limit: f64,
    /// Q range while dragging in Q mode
    pub drag_q_range: (f64, f64),
    /// Q range for wheel edits
    pub wheel_q_range: (f64, f64),
    /// Q change per wheel notch
    pub wheel_q_step: f64,
    /// Vertical pixels for an e-fold change of Q in Q mode
    pub q_drag_sensitivity: f64,
    /// Gain change per arrow key (dB)
    pub key_gain_step: f64,
    /// Frequency factor per arrow key
    pub key_freq_factor: f64,
    /// Marker dot radius (px)
    pub dot_radius: f64,
    /// Marker dot radius when selected (px)
    pub selected_dot_radius: f64,
    /// Extra radius added to the dot for hit testing (px)
    pub hit_slop: f64,
    /// Quiet period before a pending upload is committed
    pub upload_delay: Duration,
    /// Reference rate for the analytic response formulas (Hz)
    pub reference_sample_rate: f64,
    /// Number of points per response curve
    pub response_len: usize,
}

impl PlotConfig {
    /// Radius within which a pointer hits a marker
    pub fn hit_radius(&self) -> f64 {
        self.dot_radius + self.hit_slop
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            left_margin: 35.0,
            right_margin: 5.0,
            height_scale: 16.5,
            db_span: 30.0,
            drag_gain_limit: 15.0,
            gain_limit: 24.0,
            drag_q_range: (0.1, 10.0),
            wheel_q_range: (0.1, 20.0),
            wheel_q_step: 0.1,
            q_drag_sensitivity: 120.0,
            key_gain_step: 0.1,
            key_freq_factor: 1.01,
            dot_radius: 6.0,
            selected_dot_radius: 8.0,
            hit_slop: 10.0,
            upload_delay: Duration::from_millis(100),
            reference_sample_rate: 40000.0,
            response_len: 2048,
        }
    }
}
