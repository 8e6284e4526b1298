//! Per-variant draw functions
//!
//! Every variant has the same shape: `(surface, sample, config)`, drawing over a
//! surface the renderer has already cleared. None of them mutate their inputs.

use crate::{RenderConfig, Surface};
use glam::Vec2;
use showreel_core::FrequencySample;

pub mod bars;
pub mod circle;
pub mod particles;
pub mod waveform;

/// Signature shared by all variants
pub type DrawFn = fn(&mut dyn Surface, &FrequencySample, &RenderConfig);

/// Bin `index` as a fraction of full scale; bins past the end are silent
pub(crate) fn magnitude(sample: &FrequencySample, index: usize) -> f32 {
    sample
        .as_slice()
        .get(index)
        .map(|&v| f32::from(v) / 255.0)
        .unwrap_or(0.0)
}

pub(crate) fn surface_center(surface: &dyn Surface) -> Vec2 {
    let (w, h) = surface.size();
    Vec2::new(w as f32 / 2.0, h as f32 / 2.0)
}

/// Ring radius used by the polar variants
pub(crate) fn base_radius(surface: &dyn Surface) -> f32 {
    let (w, h) = surface.size();
    w.min(h) as f32 * 0.25
}
