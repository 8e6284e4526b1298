//! Showreel Core - Signal, Audio and Animation Model
//!
//! This crate contains everything the showreel widgets compute before a pixel is drawn:
//! - Frequency analysis of a playing media element
//! - Playback state machine and frame scheduling
//! - Spring and exponential smoothing
//! - Scroll/pointer signals and their visual mappings
//! - Configuration and logging settings

#![warn(missing_docs)]

use thiserror::Error;

pub mod audio;
pub mod color;
pub mod frame;
pub mod logging;
pub mod mapping;
pub mod playback;
pub mod signal;
pub mod smoothing;

// --- Re-exports grouped by category ---

// Audio
pub use audio::{
    AnalyserConfig, AnalyserStage, AudioContext, AudioError, AudioHost, AudioSource, DecodedClip,
    FftSize, FrequencySample, HostPolicy, MediaElement, OfflineHost, SourceStats,
};

// Playback & Scheduling
pub use frame::{DueFrame, FrameClock, FrameHandle, FrameScheduler, OwnerId};
pub use playback::{PlaybackController, PlaybackState};

// Signals, Smoothing & Mapping
pub use mapping::{line_scale, CircularProgress, DotProgress, TiltMapping, TiltOutput};
pub use signal::{
    ElementBounds, EventKind, EventKinds, EventTarget, InputEvent, ListenerId, PointerSignal,
    ScrollMetrics, ScrollSignal, SignalSource,
};
pub use smoothing::{ExponentialSmoother, Smoother, Spring, Spring2, SpringConfig};

// Misc
pub use color::Color;
pub use logging::LogConfig;

pub use glam::Vec2;

/// Configuration errors, raised at construction before any playback or frame work
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A configuration value is out of its accepted range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for configuration validation
pub type Result<T> = std::result::Result<T, ConfigError>;
