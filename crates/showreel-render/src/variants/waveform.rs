//! Mirrored filled waveform

use super::magnitude;
use crate::{Fill, RenderConfig, Surface};
use glam::Vec2;
use showreel_core::FrequencySample;

/// Closed outline: top edge left to right, mirrored bottom edge right to left
pub fn outline(sample: &FrequencySample, config: &RenderConfig, width: f32, height: f32) -> Vec<Vec2> {
    let n = config.bin_count;
    let mid = height / 2.0;
    let step = if n > 1 { width / (n - 1) as f32 } else { width };
    let amplitude = |i: usize| (magnitude(sample, i) * mid * config.sensitivity).min(mid);

    let top = (0..n).map(|i| Vec2::new(i as f32 * step, mid - amplitude(i)));
    let bottom = (0..n).rev().map(|i| Vec2::new(i as f32 * step, mid + amplitude(i)));
    top.chain(bottom).collect()
}

/// Fill the silhouette with a horizontal gradient; a flat silhouette is skipped
pub fn draw(surface: &mut dyn Surface, sample: &FrequencySample, config: &RenderConfig) {
    let (w, h) = surface.size();
    let (width, height) = (w as f32, h as f32);
    let points = outline(sample, config, width, height);
    let mid = height / 2.0;
    if points.iter().all(|p| p.y == mid) {
        return;
    }

    let fill = Fill::LinearGradient {
        start: Vec2::new(0.0, height / 2.0),
        end: Vec2::new(width, height / 2.0),
        stops: vec![
            (0.0, config.color.fade(0.3)),
            (0.5, config.color),
            (1.0, config.color.fade(0.3)),
        ],
    };
    surface.fill_polygon(&points, &fill);
}
