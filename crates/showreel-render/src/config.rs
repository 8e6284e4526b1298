//! Renderer configuration

use serde::{Deserialize, Serialize};
use showreel_core::{Color, ConfigError};
use std::fmt;
use std::str::FromStr;

/// Drawing style for the frequency visualizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderVariant {
    /// Vertical bars, one per bin
    #[default]
    Bars,
    /// Spokes around a ring
    Circle,
    /// Mirrored filled silhouette
    Waveform,
    /// Polar particles joined by faint lines
    Particles,
}

impl RenderVariant {
    /// All variants in display order
    pub const ALL: [RenderVariant; 4] = [
        RenderVariant::Bars,
        RenderVariant::Circle,
        RenderVariant::Waveform,
        RenderVariant::Particles,
    ];

    /// Config/CLI name
    pub fn name(self) -> &'static str {
        match self {
            RenderVariant::Bars => "bars",
            RenderVariant::Circle => "circle",
            RenderVariant::Waveform => "waveform",
            RenderVariant::Particles => "particles",
        }
    }
}

impl fmt::Display for RenderVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RenderVariant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RenderVariant::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::InvalidConfig(format!("unknown render variant '{}'", s)))
    }
}

/// Visual configuration, fixed at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Drawing style
    pub variant: RenderVariant,
    /// Columns/spokes drawn; bins past the sample length read as silence
    pub bin_count: usize,
    /// Preferred surface width
    pub width: u32,
    /// Preferred surface height
    pub height: u32,
    /// Magnitude multiplier
    pub sensitivity: f32,
    /// Foreground color
    pub color: Color,
    /// Color every frame is cleared to
    pub background: Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            variant: RenderVariant::Bars,
            bin_count: 64,
            width: 640,
            height: 240,
            sensitivity: 1.0,
            color: Color::default(),
            background: Color::BLACK,
        }
    }
}

impl RenderConfig {
    /// Reject configurations no frame could be drawn with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bin_count == 0 {
            return Err(ConfigError::InvalidConfig(
                "bin_count must be at least 1".to_string(),
            ));
        }
        if !self.sensitivity.is_finite() || self.sensitivity < 0.0 {
            return Err(ConfigError::InvalidConfig(format!(
                "sensitivity must be a non-negative number, got {}",
                self.sensitivity
            )));
        }
        Ok(())
    }
}
