//! Showreel Render - 2D Drawing Layer
//!
//! This crate paints frames for the showreel widgets:
//! - `Surface` abstraction with a tiny-skia raster backend and a recording backend
//! - Frequency renderer with bars, circle, waveform and particle variants
//! - Progress and tilt-card indicator painters

use showreel_core::ConfigError;
use thiserror::Error;

pub mod config;
pub mod indicator;
pub mod renderer;
pub mod surface;
pub mod variants;

pub use config::{RenderConfig, RenderVariant};
pub use renderer::FrequencyRenderer;
pub use surface::{DrawOp, Fill, PixmapSurface, RecordingSurface, Rect, Surface};

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// Surface has no pixels (not mounted or zero-size)
    #[error("Surface unavailable: {width}x{height}")]
    SurfaceUnavailable {
        /// Surface width
        width: u32,
        /// Surface height
        height: u32,
    },

    /// Renderer configuration rejected
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    /// PNG encoding failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// File I/O failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for rendering operations
pub type Result<T> = std::result::Result<T, RenderError>;
