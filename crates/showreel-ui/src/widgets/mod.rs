//! Mountable widgets

pub mod audio_visualizer;
pub mod scroll_progress;
pub mod tilt_card;

pub use audio_visualizer::{AudioVisualizer, SharedMedia, VisualizerConfig};
pub use scroll_progress::{ProgressSmoothing, ProgressStyle, ScrollProgress, ScrollProgressConfig};
pub use tilt_card::{TiltCard, TiltCardConfig};
