//! Vertical bars, centred on the horizontal midline

use super::magnitude;
use crate::{Fill, Rect, RenderConfig, Surface};
use glam::Vec2;
use showreel_core::FrequencySample;

/// Bar height per column for a surface `height` pixels tall
pub fn bar_heights(sample: &FrequencySample, config: &RenderConfig, height: f32) -> Vec<f32> {
    (0..config.bin_count)
        .map(|i| (magnitude(sample, i) * height * config.sensitivity).clamp(0.0, height))
        .collect()
}

/// Draw one bar per bin
pub fn draw(surface: &mut dyn Surface, sample: &FrequencySample, config: &RenderConfig) {
    let (w, h) = surface.size();
    let (width, height) = (w as f32, h as f32);
    let column = width / config.bin_count as f32;
    let gap = (column * 0.2).min(2.0);

    for (i, bar_height) in bar_heights(sample, config, height).into_iter().enumerate() {
        if bar_height <= 0.0 {
            continue;
        }
        let top = (height - bar_height) / 2.0;
        let rect = Rect::new(i as f32 * column + gap / 2.0, top, column - gap, bar_height);
        // Fades toward both ends of the bar
        let fill = Fill::LinearGradient {
            start: Vec2::new(0.0, top),
            end: Vec2::new(0.0, rect.bottom()),
            stops: vec![
                (0.0, config.color.fade(0.25)),
                (0.5, config.color),
                (1.0, config.color.fade(0.25)),
            ],
        };
        surface.fill_rect(rect, &fill);
    }
}
