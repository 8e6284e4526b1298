//! Polar particle field

use super::{base_radius, magnitude, surface_center};
use crate::{Fill, RenderConfig, Surface};
use glam::Vec2;
use showreel_core::FrequencySample;
use std::f32::consts::TAU;

/// Largest particle radius at full scale
const MAX_PARTICLE_RADIUS: f32 = 6.0;

/// One particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Centre
    pub position: Vec2,
    /// Radius, zero for a silent bin
    pub radius: f32,
    /// Magnitude in `[0, 1]`
    pub magnitude: f32,
}

/// One particle for every other bin
pub fn particles(
    sample: &FrequencySample,
    config: &RenderConfig,
    center: Vec2,
    radius: f32,
) -> Vec<Particle> {
    let count = config.bin_count.div_ceil(2);
    (0..config.bin_count)
        .step_by(2)
        .enumerate()
        .map(|(k, bin)| {
            let value = magnitude(sample, bin);
            let angle = k as f32 / count as f32 * TAU;
            let distance = radius * (0.5 + value * config.sensitivity);
            Particle {
                position: center + Vec2::from_angle(angle) * distance,
                radius: value * MAX_PARTICLE_RADIUS * config.sensitivity,
                magnitude: value,
            }
        })
        .collect()
}

/// Draw particles and the faint lines joining consecutive ones
pub fn draw(surface: &mut dyn Surface, sample: &FrequencySample, config: &RenderConfig) {
    let field = particles(sample, config, surface_center(surface), base_radius(surface));
    let link = config.color.fade(0.2);

    // Two silent neighbours are not linked
    for pair in field.windows(2) {
        if pair[0].radius > 0.0 || pair[1].radius > 0.0 {
            surface.stroke_line(pair[0].position, pair[1].position, 1.0, link);
        }
    }
    for particle in field.iter().filter(|p| p.radius > 0.0) {
        surface.fill_circle(
            particle.position,
            particle.radius,
            &Fill::Solid(config.color.fade(0.4 + 0.6 * particle.magnitude)),
        );
    }
}
