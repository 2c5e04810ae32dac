// Analytic magnitude response of a single biquad section.
// Coefficients follow the bilinear-transform forms of the RBJ Audio EQ Cookbook,
// with the boost/cut split for peaking and shelving filters so both sides of 0 dB
// stay mirror images of each other.

use std::f64::consts::{PI, SQRT_2};

use crate::config::PlotConfig;
use crate::filter::{BiquadParams, BiquadSubtype};

/// Reference rate used only as the basis for the frequency-warping constant
pub const REFERENCE_SAMPLE_RATE: f64 = 40000.0;
/// Points per response curve
pub const RESPONSE_LEN: usize = 2048;
/// Floor for log(0) responses (dB)
pub const DB_FLOOR: f64 = -200.0;
/// Highest usable fraction of the sample rate for coefficient calculation
const NYQUIST_GUARD: f64 = 0.4999;

/// Normalized biquad coefficients (a0 == 1)
/// $$ H(z) = \frac{b_0 + b_1 z^{-1} + b_2 z^{-2}}{1 + a_1 z^{-1} + a_2 z^{-2}} $$
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoefficients {
    pub fn calculate(params: &BiquadParams, sample_rate: f64) -> Self {
        let BiquadParams {
            subtype,
            frequency: freq,
            gain,
            q,
        } = *params;
        // tan(πf/fs) diverges at Nyquist
        let freq = freq.min(sample_rate * NYQUIST_GUARD);

        let v = 10f64.powf(gain.abs() / 20.0);
        let k = (PI * freq / sample_rate).tan();
        let kk = k * k;
        let sqrt_2v = (2.0 * v).sqrt();

        match subtype {
            BiquadSubtype::OnePoleLowpass => {
                let pole = (-2.0 * PI * (freq / sample_rate)).exp();
                Self {
                    b0: 1.0 - pole,
                    b1: 0.0,
                    b2: 0.0,
                    a1: -pole,
                    a2: 0.0,
                }
            }
            BiquadSubtype::OnePoleHighpass => {
                let pole = -(-2.0 * PI * (0.5 - freq / sample_rate)).exp();
                Self {
                    b0: 1.0 + pole,
                    b1: 0.0,
                    b2: 0.0,
                    a1: -pole,
                    a2: 0.0,
                }
            }
            BiquadSubtype::Lowpass => {
                let norm = 1.0 / (1.0 + k / q + kk);
                let b0 = kk * norm;
                Self {
                    b0,
                    b1: 2.0 * b0,
                    b2: b0,
                    a1: 2.0 * (kk - 1.0) * norm,
                    a2: (1.0 - k / q + kk) * norm,
                }
            }
            BiquadSubtype::Highpass => {
                let norm = 1.0 / (1.0 + k / q + kk);
                Self {
                    b0: norm,
                    b1: -2.0 * norm,
                    b2: norm,
                    a1: 2.0 * (kk - 1.0) * norm,
                    a2: (1.0 - k / q + kk) * norm,
                }
            }
            BiquadSubtype::Bandpass => {
                let norm = 1.0 / (1.0 + k / q + kk);
                let b0 = k / q * norm;
                Self {
                    b0,
                    b1: 0.0,
                    b2: -b0,
                    a1: 2.0 * (kk - 1.0) * norm,
                    a2: (1.0 - k / q + kk) * norm,
                }
            }
            BiquadSubtype::Notch => {
                let norm = 1.0 / (1.0 + k / q + kk);
                let b1 = 2.0 * (kk - 1.0) * norm;
                Self {
                    b0: (1.0 + kk) * norm,
                    b1,
                    b2: (1.0 + kk) * norm,
                    a1: b1,
                    a2: (1.0 - k / q + kk) * norm,
                }
            }
            BiquadSubtype::Peaking => {
                if gain >= 0.0 {
                    let norm = 1.0 / (1.0 + k / q + kk);
                    let b1 = 2.0 * (kk - 1.0) * norm;
                    Self {
                        b0: (1.0 + v / q * k + kk) * norm,
                        b1,
                        b2: (1.0 - v / q * k + kk) * norm,
                        a1: b1,
                        a2: (1.0 - k / q + kk) * norm,
                    }
                } else {
                    let norm = 1.0 / (1.0 + v / q * k + kk);
                    let b1 = 2.0 * (kk - 1.0) * norm;
                    Self {
                        b0: (1.0 + k / q + kk) * norm,
                        b1,
                        b2: (1.0 - k / q + kk) * norm,
                        a1: b1,
                        a2: (1.0 - v / q * k + kk) * norm,
                    }
                }
            }
            BiquadSubtype::Lowshelf => {
                if gain >= 0.0 {
                    let norm = 1.0 / (1.0 + SQRT_2 * k + kk);
                    Self {
                        b0: (1.0 + sqrt_2v * k + v * kk) * norm,
                        b1: 2.0 * (v * kk - 1.0) * norm,
                        b2: (1.0 - sqrt_2v * k + v * kk) * norm,
                        a1: 2.0 * (kk - 1.0) * norm,
                        a2: (1.0 - SQRT_2 * k + kk) * norm,
                    }
                } else {
                    let norm = 1.0 / (1.0 + sqrt_2v * k + v * kk);
                    Self {
                        b0: (1.0 + SQRT_2 * k + kk) * norm,
                        b1: 2.0 * (kk - 1.0) * norm,
                        b2: (1.0 - SQRT_2 * k + kk) * norm,
                        a1: 2.0 * (v * kk - 1.0) * norm,
                        a2: (1.0 - sqrt_2v * k + v * kk) * norm,
                    }
                }
            }
            BiquadSubtype::Highshelf => {
                if gain >= 0.0 {
                    let norm = 1.0 / (1.0 + SQRT_2 * k + kk);
                    Self {
                        b0: (v + sqrt_2v * k + kk) * norm,
                        b1: 2.0 * (kk - v) * norm,
                        b2: (v - sqrt_2v * k + kk) * norm,
                        a1: 2.0 * (kk - 1.0) * norm,
                        a2: (1.0 - SQRT_2 * k + kk) * norm,
                    }
                } else {
                    let norm = 1.0 / (v + sqrt_2v * k + kk);
                    Self {
                        b0: (1.0 + SQRT_2 * k + kk) * norm,
                        b1: 2.0 * (kk - 1.0) * norm,
                        b2: (1.0 - SQRT_2 * k + kk) * norm,
                        a1: 2.0 * (kk - v) * norm,
                        a2: (v - sqrt_2v * k + kk) * norm,
                    }
                }
            }
        }
    }

    /// |H|² in dB at normalized angular frequency `w` (0..π), using the
    /// closed form in `phi = sin²(w/2)`
    pub fn magnitude_db(&self, w: f64) -> f64 {
        let Self { b0, b1, b2, a1, a2 } = *self;
        let phi = (w / 2.0).sin().powi(2);

        let num = (b0 + b1 + b2).powi(2) - 4.0 * (b0 * b1 + 4.0 * b0 * b2 + b1 * b2) * phi
            + 16.0 * b0 * b2 * phi * phi;
        let den = (1.0 + a1 + a2).powi(2) - 4.0 * (a1 + 4.0 * a2 + a1 * a2) * phi
            + 16.0 * a2 * phi * phi;

        let db = 10.0 * (num / den).log10();
        if db.is_finite() { db.max(DB_FLOOR) } else { DB_FLOOR }
    }
}

/// A sampled magnitude response: `(normalized frequency, dB)` pairs where the
/// normalized frequency runs from 0.0 to 0.5 (Nyquist).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseCurve {
    pub points: Vec<(f64, f64)>,
    sample_rate: f64,
}

impl ResponseCurve {
    /// A flat 0 dB curve, used as the accumulator for the total response
    pub fn flat(len: usize, sample_rate: f64) -> Self {
        let points = (0..len).map(|i| (normalized_position(i, len), 0.0)).collect();
        Self {
            points,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Frequency in Hz of sample `i`
    pub fn frequency_at(&self, i: usize) -> f64 {
        angular_frequency(i, self.points.len()) / PI * self.sample_rate / 2.0
    }

    /// dB values only
    pub fn db(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|(_, db)| *db)
    }

    /// Add another curve sample-by-sample in dB
    pub fn accumulate(&mut self, other: &ResponseCurve) {
        for (acc, (_, db)) in self.points.iter_mut().zip(other.points.iter()) {
            acc.1 += db;
        }
    }

    pub fn max_db(&self) -> Option<f64> {
        self.db().fold(None, |max, db| match max {
            Some(m) if m >= db => Some(m),
            _ => Some(db),
        })
    }
}

/// Geometric spacing from 0.001·π to π
fn angular_frequency(i: usize, len: usize) -> f64 {
    if len < 2 {
        return PI;
    }
    (1000f64.ln() * i as f64 / (len - 1) as f64).exp() * 0.001 * PI
}

fn normalized_position(i: usize, len: usize) -> f64 {
    if len < 2 {
        return 0.5;
    }
    i as f64 / (len - 1) as f64 / 2.0
}

/// Sample the magnitude response of one filter at `len` geometric points
pub fn response_curve(params: &BiquadParams, sample_rate: f64, len: usize) -> ResponseCurve {
    let coeffs = BiquadCoefficients::calculate(params, sample_rate);
    let points = (0..len)
        .map(|i| {
            let w = angular_frequency(i, len);
            (normalized_position(i, len), coeffs.magnitude_db(w))
        })
        .collect();
    ResponseCurve {
        points,
        sample_rate,
    }
}

/// Response with the configured reference rate and length
pub fn filter_response(params: &BiquadParams, config: &PlotConfig) -> ResponseCurve {
    response_curve(params, config.reference_sample_rate, config.response_len)
}
