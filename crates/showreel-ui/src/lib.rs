//! Showreel UI - Composed Visual Components
//!
//! This crate wires signals, smoothing, playback and painting into mountable widgets:
//! - `Page`: owns the event target and frame clock, routes events and frames
//! - `AudioVisualizer`: media element to frequency frames
//! - `ScrollProgress`: scroll position to a line, ring or dot indicator
//! - `TiltCard`: pointer position to a tilted card with glare

#![warn(missing_docs)]

use showreel_core::{AudioError, ConfigError};
use showreel_render::RenderError;
use thiserror::Error;

pub mod page;
pub mod widgets;

pub use page::{Page, UiAction, Widget, WidgetContext};
pub use widgets::{
    AudioVisualizer, ProgressSmoothing, ProgressStyle, ScrollProgress, ScrollProgressConfig,
    SharedMedia, TiltCard, TiltCardConfig, VisualizerConfig,
};

/// Errors that prevent a visualizer from being created
#[derive(Error, Debug)]
pub enum VisualizerError {
    /// Analyser or renderer configuration rejected
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    /// The media element already feeds another visualizer
    #[error("Media #{0} is already attached to a visualizer")]
    AlreadyAttached(u64),

    /// Other audio failure during attach
    #[error(transparent)]
    Audio(AudioError),
}

impl From<AudioError> for VisualizerError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::InvalidConfig(e) => VisualizerError::InvalidConfig(e),
            AudioError::AlreadyAttached(id) => VisualizerError::AlreadyAttached(id),
            other => VisualizerError::Audio(other),
        }
    }
}

impl From<RenderError> for VisualizerError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::InvalidConfig(e) => VisualizerError::InvalidConfig(e),
            other => VisualizerError::InvalidConfig(ConfigError::InvalidConfig(other.to_string())),
        }
    }
}

/// Result type for widget construction
pub type Result<T> = std::result::Result<T, VisualizerError>;
