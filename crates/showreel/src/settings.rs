//! TOML settings file
//!
//! Every section is optional; a missing file section falls back to its defaults and
//! command-line flags override on top.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use showreel_core::{
    AnalyserConfig, CircularProgress, DotProgress, LogConfig, SpringConfig, TiltMapping,
};
use showreel_render::RenderConfig;
use showreel_ui::{ProgressSmoothing, ProgressStyle};
use std::path::Path;

/// Scroll indicator section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressSettings {
    /// Indicator shape reported by `scroll`
    pub style: ProgressStyle,
    /// Spring or exponential approach
    pub smoothing: ProgressSmoothing,
    /// Ring geometry
    pub ring: CircularProgress,
    /// Dot row
    pub dots: DotProgress,
}

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowreelConfig {
    pub log: LogConfig,
    pub analyser: AnalyserConfig,
    pub render: RenderConfig,
    /// Spring driving the scroll simulation, and the rest delta of the exponential mode
    pub spring: SpringConfig,
    pub tilt: TiltMapping,
    pub progress: ProgressSettings,
}

impl Default for ShowreelConfig {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            analyser: AnalyserConfig::default(),
            render: RenderConfig::default(),
            spring: SpringConfig::scroll_progress(),
            tilt: TiltMapping::default(),
            progress: ProgressSettings::default(),
        }
    }
}

impl ShowreelConfig {
    /// Parse settings from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse settings")
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {:?}", path))?;
        Self::from_toml(&text).with_context(|| format!("Invalid settings file: {:?}", path))
    }

    /// Defaults when no file is given
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showreel_render::RenderVariant;
    use std::io::Write;

    #[test]
    fn test_empty_file_is_default() {
        let config = ShowreelConfig::from_toml("").unwrap();
        assert_eq!(config, ShowreelConfig::default());
        assert_eq!(config.spring, SpringConfig::scroll_progress());
    }

    #[test]
    fn test_partial_sections() {
        let config = ShowreelConfig::from_toml(
            r#"
            [log]
            level = "debug"

            [render]
            variant = "particles"
            sensitivity = 1.5

            [tilt]
            max_tilt_deg = 20.0

            [progress]
            style = "dots"
            [progress.dots]
            count = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.log.level, "debug");
        assert!(config.log.console_output);
        assert_eq!(config.render.variant, RenderVariant::Particles);
        assert_eq!(config.render.sensitivity, 1.5);
        assert_eq!(config.render.bin_count, 64);
        assert_eq!(config.tilt.max_tilt_deg, 20.0);
        assert_eq!(config.tilt.glare_opacity, 0.3);
        assert_eq!(config.progress.style, ProgressStyle::Dots);
        assert_eq!(config.progress.dots.count, 8);
    }

    #[test]
    fn test_exponential_progress_smoothing() {
        let config = ShowreelConfig::from_toml(
            "[progress.smoothing]\nkind = \"exponential\"\ntime_constant = 0.2\n",
        )
        .unwrap();
        assert_eq!(
            config.progress.smoothing,
            ProgressSmoothing::Exponential { time_constant: 0.2 }
        );
    }

    #[test]
    fn test_unknown_variant_rejected() {
        let result = ShowreelConfig::from_toml("[render]\nvariant = \"spiral\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[spring]\nstiffness = 200.0").unwrap();

        let config = ShowreelConfig::load(file.path()).unwrap();
        assert_eq!(config.spring.stiffness, 200.0);
        assert_eq!(config.spring.mass, 1.0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(ShowreelConfig::load_or_default(Some(&missing)).is_err());
        assert!(ShowreelConfig::load_or_default(None).is_ok());
    }
}
