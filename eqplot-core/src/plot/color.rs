use std::collections::HashMap;
use std::fmt;

use crate::filter::BiquadSubtype;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    /// Fallback curve seed when the host does not pass one
    pub const DEFAULT_SEED: Rgb = Rgb::new(0x66, 0x88, 0xBB);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// From `0xRRGGBB`
    pub const fn from_packed(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xFF) as u8,
            g: ((packed >> 8) & 0xFF) as u8,
            b: (packed & 0xFF) as u8,
        }
    }

    pub const fn to_packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Parse `#RGB` or `#RRGGBB` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
        match hex.len() {
            3 => Some(Self::new(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
            6 => u32::from_str_radix(hex, 16).ok().map(Self::from_packed),
            _ => None,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Per-index walk over the RGB channels: adds `(1, 4, 2) * index` modulo 255.
/// Not perceptually uniform; enough to tell a handful of overlaid curves apart.
pub fn color_change(base: Rgb, index: usize) -> Rgb {
    let step = |channel: u8, delta: usize| ((channel as usize + delta * index) % 255) as u8;
    Rgb::new(step(base.r, 1), step(base.g, 4), step(base.b, 2))
}

/// HSL to RGB, all inputs in 0.0..=1.0
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let to_u8 = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;

    if s == 0.0 {
        let v = to_u8(l);
        return Rgb::new(v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Rgb::new(
        to_u8(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        to_u8(hue_to_rgb(p, q, h)),
        to_u8(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    )
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// `n` evenly spaced hues at 70% saturation and 60% lightness
pub fn generate_color_palette(n: usize) -> Vec<Rgb> {
    (0..n)
        .map(|i| hsl_to_rgb(i as f64 / n as f64, 0.7, 0.6))
        .collect()
}

/// One palette color per distinct subtype, in order of first appearance
pub fn subtype_palette<I>(subtypes: I) -> HashMap<BiquadSubtype, Rgb>
where
    I: IntoIterator<Item = BiquadSubtype>,
{
    let mut distinct: Vec<BiquadSubtype> = Vec::new();
    for subtype in subtypes {
        if !distinct.contains(&subtype) {
            distinct.push(subtype);
        }
    }
    let palette = generate_color_palette(distinct.len());
    distinct.into_iter().zip(palette).collect()
}

/// Curve seed for single-channel plots, derived from a background hue in degrees
pub fn seed_from_hue(hue_degrees: f64) -> Rgb {
    let hue = ((hue_degrees + 10.0).abs() % 360.0) / 360.0;
    hsl_to_rgb(hue, 0.3, 0.3)
}

/// Fixed per-channel seeds for dual-channel plots
pub const CHANNEL_COLORS: [Rgb; 6] = [
    Rgb::new(0xBB, 0x55, 0x55),
    Rgb::new(0x55, 0x55, 0xBB),
    Rgb::new(0x55, 0xBB, 0x55),
    Rgb::new(0xFF, 0x33, 0x33),
    Rgb::new(0x33, 0x33, 0xFF),
    Rgb::new(0x33, 0xFF, 0x33),
];

pub fn channel_color(channel: usize) -> Rgb {
    CHANNEL_COLORS[channel % CHANNEL_COLORS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_change_walk() {
        let base = Rgb::from_packed(0x6688BB);
        assert_eq!(color_change(base, 0), base);
        assert_eq!(color_change(base, 1), Rgb::new(0x67, 0x8C, 0xBD));
        // channels wrap modulo 255
        let wrapped = color_change(Rgb::new(250, 250, 250), 3);
        assert_eq!(wrapped, Rgb::new(253, ((250u32 + 12) % 255) as u8, 1));
    }

    #[test]
    fn test_color_change_is_deterministic() {
        let base = Rgb::from_packed(0x123456);
        assert_eq!(color_change(base, 7), color_change(base, 7));
        assert_ne!(color_change(base, 7), color_change(base, 8));
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), Rgb::new(255, 0, 0));
        assert_eq!(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), Rgb::new(0, 255, 0));
        assert_eq!(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), Rgb::new(0, 0, 255));
        assert_eq!(hsl_to_rgb(0.3, 0.0, 0.5), Rgb::new(128, 128, 128));
    }

    #[test]
    fn test_palette_is_evenly_spaced() {
        let palette = generate_color_palette(3);
        assert_eq!(palette.len(), 3);
        // hue 0 at s=0.7, l=0.6
        assert_eq!(palette[0], Rgb::new(224, 82, 82));
        assert_ne!(palette[0], palette[1]);
        assert_ne!(palette[1], palette[2]);
        assert!(generate_color_palette(0).is_empty());
    }

    #[test]
    fn test_subtype_palette_groups_same_types() {
        let map = subtype_palette([
            BiquadSubtype::Peaking,
            BiquadSubtype::Lowshelf,
            BiquadSubtype::Peaking,
        ]);
        assert_eq!(map.len(), 2);
        assert_eq!(map[&BiquadSubtype::Peaking], generate_color_palette(2)[0]);
        assert_eq!(map[&BiquadSubtype::Lowshelf], generate_color_palette(2)[1]);
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Rgb::from_hex("#B55"), Some(Rgb::new(0xBB, 0x55, 0x55)));
        assert_eq!(Rgb::from_hex("6688BB"), Some(Rgb::from_packed(0x6688BB)));
        assert_eq!(Rgb::from_hex("#12"), None);
        assert_eq!(Rgb::from_packed(0x6688BB).to_string(), "#6688BB");
    }
}
