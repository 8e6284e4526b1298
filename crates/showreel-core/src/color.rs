//! RGBA colors shared by renderers and configuration files.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Straight (non-premultiplied) RGBA color with components in 0.0 - 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Color {
    /// Fully transparent black
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    /// Opaque white
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    /// Opaque black
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    /// Create a color from components
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from 8-bit components
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`
    pub fn from_hex(hex: &str) -> Result<Self, ConfigError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let invalid = || ConfigError::InvalidConfig(format!("invalid color '{}'", hex));

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

        match digits.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in digits.chars().enumerate() {
                    let v = c.to_digit(16).ok_or_else(invalid)? as u8;
                    out[i] = v * 17;
                }
                Ok(Self::from_rgb8(out[0], out[1], out[2]))
            }
            6 | 8 if digits.is_ascii() => {
                let r = channel(&digits[0..2])?;
                let g = channel(&digits[2..4])?;
                let b = channel(&digits[4..6])?;
                let a = if digits.len() == 8 {
                    channel(&digits[6..8])?
                } else {
                    255
                };
                Ok(Self::from_rgb8(r, g, b).with_alpha(a as f32 / 255.0))
            }
            _ => Err(invalid()),
        }
    }

    /// Same color with a different alpha
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Same color with alpha multiplied by `factor`
    pub fn fade(self, factor: f32) -> Self {
        let factor = if factor.is_finite() { factor } else { 0.0 };
        self.with_alpha(self.a * factor)
    }

    /// Components quantized to 8 bits
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

impl Default for Color {
    fn default() -> Self {
        // Cyan accent used across the site
        Color::from_rgb8(0x22, 0xd3, 0xee)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }
}

impl FromStr for Color {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s.trim())
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}
