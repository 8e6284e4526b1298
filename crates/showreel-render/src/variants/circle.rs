//! Radial spokes around a base ring

use super::{base_radius, magnitude, surface_center};
use crate::{RenderConfig, Surface};
use glam::Vec2;
use showreel_core::FrequencySample;
use std::f32::consts::{FRAC_PI_2, TAU};

/// Spoke stroke width
const SPOKE_WIDTH: f32 = 2.0;

/// Draw one spoke per bin, starting at twelve o'clock
pub fn draw(surface: &mut dyn Surface, sample: &FrequencySample, config: &RenderConfig) {
    let center = surface_center(surface);
    let radius = base_radius(surface);

    for i in 0..config.bin_count {
        let value = magnitude(sample, i);
        let length = value * radius * config.sensitivity;
        if length <= 0.0 {
            continue;
        }
        let angle = i as f32 / config.bin_count as f32 * TAU - FRAC_PI_2;
        let dir = Vec2::from_angle(angle);
        surface.stroke_line(
            center + dir * radius,
            center + dir * (radius + length),
            SPOKE_WIDTH,
            config.color.fade(value),
        );
    }
}
