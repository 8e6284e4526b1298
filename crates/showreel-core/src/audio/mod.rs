//! Audio analysis for the frequency visualizer.
//!
//! Data flow: `MediaElement` → analysis tap → `AnalyserStage` (windowed FFT) →
//! `FrequencySample` (one byte per bin) read once per frame by the renderer.

pub mod analyser;
pub mod host;
pub mod media;
pub mod source;

pub use analyser::AnalyserStage;
pub use host::{AudioContext, AudioHost, HostPolicy, OfflineHost};
pub use media::{DecodedClip, MediaElement};
pub use source::{AudioSource, SourceStats};

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Audio errors
#[derive(Error, Debug)]
pub enum AudioError {
    /// The platform refused to create an audio-processing context (autoplay/permission policy)
    #[error("Audio context unavailable: {0}")]
    AudioContextUnavailable(String),

    /// The media element already feeds a live analysis path
    #[error("Media element {0} is already attached to an analysis path")]
    AlreadyAttached(u64),

    /// Analyser configuration rejected at attach time
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    /// Caller-provided sample buffer has the wrong number of bins
    #[error("Sample length mismatch: expected {expected} bins, got {actual}")]
    SampleLengthMismatch {
        /// Bins produced by the analyser
        expected: usize,
        /// Bins in the provided buffer
        actual: usize,
    },

    /// The source was already torn down
    #[error("Audio source has been torn down")]
    Detached,

    /// Failed to decode an audio file
    #[error("Decode error: {0}")]
    Decode(#[from] hound::Error),

    /// Decoded file contains no samples
    #[error("Audio clip is empty")]
    EmptyClip,
}

/// Result type for audio operations
pub type Result<T> = std::result::Result<T, AudioError>;

/// Analysis window size, always a power of two in `32..=32768`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct FftSize(usize);

impl FftSize {
    /// Smallest accepted window
    pub const MIN: usize = 32;
    /// Largest accepted window
    pub const MAX: usize = 32768;

    /// Validate a window size
    pub fn new(size: usize) -> std::result::Result<Self, ConfigError> {
        if !size.is_power_of_two() {
            return Err(ConfigError::InvalidConfig(format!(
                "fft_size {} is not a power of two",
                size
            )));
        }
        if !(Self::MIN..=Self::MAX).contains(&size) {
            return Err(ConfigError::InvalidConfig(format!(
                "fft_size {} outside {}..={}",
                size,
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(size))
    }

    /// Window size in samples
    pub fn get(self) -> usize {
        self.0
    }

    /// Number of frequency bins (half the window)
    pub fn bin_count(self) -> usize {
        self.0 / 2
    }
}

impl Default for FftSize {
    fn default() -> Self {
        Self(128)
    }
}

impl TryFrom<usize> for FftSize {
    type Error = ConfigError;

    fn try_from(value: usize) -> std::result::Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FftSize> for usize {
    fn from(size: FftSize) -> Self {
        size.0
    }
}

/// Configuration for the analysis stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyserConfig {
    /// Analysis window size
    pub fft_size: FftSize,
    /// Blend factor with the previous spectrum (0.0 = no smoothing, < 1.0)
    pub smoothing_time_constant: f32,
    /// Magnitude mapped to byte 0
    pub min_decibels: f32,
    /// Magnitude mapped to byte 255
    pub max_decibels: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: FftSize::default(),
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyserConfig {
    /// Config with a given window size and default everything else
    pub fn with_fft_size(size: usize) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            fft_size: FftSize::new(size)?,
            ..Self::default()
        })
    }

    /// Check value ranges
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        // Re-check in case the struct was built by hand
        FftSize::new(self.fft_size.get())?;

        if !(0.0..1.0).contains(&self.smoothing_time_constant) {
            return Err(ConfigError::InvalidConfig(format!(
                "smoothing_time_constant {} outside [0, 1)",
                self.smoothing_time_constant
            )));
        }
        if !self.min_decibels.is_finite()
            || !self.max_decibels.is_finite()
            || self.min_decibels >= self.max_decibels
        {
            return Err(ConfigError::InvalidConfig(format!(
                "decibel range [{}, {}] is empty",
                self.min_decibels, self.max_decibels
            )));
        }
        Ok(())
    }
}

/// One frame of frequency magnitudes, one byte (0-255) per bin.
///
/// The length is fixed by the window size it was created for and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencySample {
    bins: Vec<u8>,
}

impl FrequencySample {
    /// All-zero sample for the given window
    pub fn new(fft_size: FftSize) -> Self {
        Self {
            bins: vec![0; fft_size.bin_count()],
        }
    }

    /// Sample with explicit contents; the length must be a valid bin count
    pub fn from_bins(bins: Vec<u8>) -> std::result::Result<Self, ConfigError> {
        FftSize::new(bins.len() * 2)?;
        Ok(Self { bins })
    }

    /// Number of bins
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// Always false for a valid sample
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Read-only view of the bins
    pub fn as_slice(&self) -> &[u8] {
        &self.bins
    }

    /// Mutable view for in-place snapshot writes
    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bins
    }

    /// Loudest bin
    pub fn peak(&self) -> u8 {
        self.bins.iter().copied().max().unwrap_or(0)
    }

    /// True when every bin is zero
    pub fn is_silent(&self) -> bool {
        self.bins.iter().all(|&b| b == 0)
    }

    /// Reset every bin to zero
    pub fn clear(&mut self) {
        self.bins.fill(0);
    }
}
