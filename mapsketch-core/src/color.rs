use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LayerError;

/// 8-bit RGB color, written as `#RRGGBB` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components scaled to `0.0..=1.0`
    pub fn to_unit(self) -> (f64, f64, f64) {
        (
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        )
    }

    /// Mix toward white; `opacity` 1.0 keeps the color, 0.0 yields white.
    pub fn over_white(self, opacity: f64) -> Rgb {
        let a = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 1.0 };
        let mix = |c: u8| (a * c as f64 + (1.0 - a) * 255.0).round() as u8;
        Rgb::new(mix(self.r), mix(self.g), mix(self.b))
    }

    /// Move toward white by `amount` (0.0..=1.0), used for dimmed legend rows
    pub fn dimmed(self, amount: f64) -> Rgb {
        self.over_white(1.0 - amount)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::BLACK
    }
}

impl FromStr for Rgb {
    type Err = LayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(LayerError::InvalidColor(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| LayerError::InvalidColor(s.to_string()))
        };
        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = LayerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
