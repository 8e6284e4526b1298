//! Progress and tilt indicators
//!
//! Painters take already-mapped values; the mapping itself lives in
//! `showreel_core::mapping`.

use crate::{Fill, Rect, Surface};
use glam::{Vec2, Vec3};
use showreel_core::{line_scale, CircularProgress, Color, DotProgress, TiltOutput};
use std::f32::consts::{FRAC_PI_2, TAU};

/// Thickness of the line progress bar
pub const LINE_THICKNESS: f32 = 4.0;

/// Perspective distance used when projecting the tilt card
pub const PERSPECTIVE_PX: f32 = 1000.0;

/// Bar along the top edge, scaled from the left
pub fn paint_line_progress(surface: &mut dyn Surface, value: f32, color: Color) {
    let (w, _) = surface.size();
    let rect = Rect::new(0.0, 0.0, w as f32 * line_scale(value), LINE_THICKNESS);
    if !rect.is_empty() {
        surface.fill_rect(rect, &Fill::Solid(color));
    }
}

/// Points of the drawn part of the ring, clockwise from twelve o'clock
pub fn arc_points(center: Vec2, ring: &CircularProgress, value: f32) -> Vec<Vec2> {
    let sweep = ring.sweep(value);
    if sweep <= 0.0 {
        return Vec::new();
    }
    let segments = ((sweep / TAU) * 96.0).ceil().max(2.0) as usize;
    (0..=segments)
        .map(|i| {
            let angle = -FRAC_PI_2 + sweep * i as f32 / segments as f32;
            center + Vec2::from_angle(angle) * ring.radius
        })
        .collect()
}

/// Ring centred on the surface with a faint track behind the progress arc
pub fn paint_circular_progress(
    surface: &mut dyn Surface,
    ring: &CircularProgress,
    value: f32,
    color: Color,
) {
    let (w, h) = surface.size();
    let center = Vec2::new(w as f32 / 2.0, h as f32 / 2.0);
    surface.stroke_circle(center, ring.radius, ring.stroke_width, color.fade(0.2));

    let points = arc_points(center, ring, value);
    if points.len() >= 2 {
        surface.stroke_polyline(&points, ring.stroke_width, color);
    }
}

/// Row of dots across the vertical centre
pub fn paint_dot_progress(surface: &mut dyn Surface, dots: &DotProgress, value: f32, color: Color) {
    let (w, h) = surface.size();
    let spacing = w as f32 / dots.count.max(1) as f32;
    let radius = (spacing * 0.25).min(h as f32 / 4.0).max(1.0);
    let y = h as f32 / 2.0;

    for (i, opacity) in dots.opacities(value).into_iter().enumerate() {
        let center = Vec2::new(spacing * (i as f32 + 0.5), y);
        surface.fill_circle(center, radius, &Fill::Solid(color.fade(opacity)));
    }
}

/// Corners of a card of half-extent `half`, rotated and projected around `center`
///
/// Order is top-left, top-right, bottom-right, bottom-left in screen space (y down).
pub fn project_card(center: Vec2, half: Vec2, tilt: &TiltOutput, perspective: f32) -> [Vec2; 4] {
    let (sx, cx) = tilt.rotate_x_deg.to_radians().sin_cos();
    let (sy, cy) = tilt.rotate_y_deg.to_radians().sin_cos();
    let corners = [
        Vec3::new(-half.x, -half.y, 0.0),
        Vec3::new(half.x, -half.y, 0.0),
        Vec3::new(half.x, half.y, 0.0),
        Vec3::new(-half.x, half.y, 0.0),
    ];

    corners.map(|p| {
        // rotateX then rotateY; +z faces the viewer
        let p = Vec3::new(p.x, p.y * cx - p.z * sx, p.y * sx + p.z * cx);
        let p = Vec3::new(p.x * cy + p.z * sy, p.y, -p.x * sy + p.z * cy);
        let scale = perspective / (perspective - p.z).max(1.0);
        center + Vec2::new(p.x, p.y) * scale
    })
}

/// Tilted card with a glare gradient following the pointer
pub fn paint_tilt_card(surface: &mut dyn Surface, tilt: &TiltOutput, card: Color) {
    let (w, h) = surface.size();
    let (width, height) = (w as f32, h as f32);
    let center = Vec2::new(width / 2.0, height / 2.0);
    let half = Vec2::new(width, height) * 0.35;
    let quad = project_card(center, half, tilt, PERSPECTIVE_PX);

    surface.fill_polygon(&quad, &Fill::Solid(card));

    if tilt.glare_opacity > 0.0 {
        let origin = center - half + Vec2::new(tilt.glare_x_pct, tilt.glare_y_pct) / 100.0 * half * 2.0;
        let reach = Vec2::from_angle(tilt.glare_angle_deg.to_radians() + std::f32::consts::PI)
            * half.length();
        surface.fill_polygon(
            &quad,
            &Fill::LinearGradient {
                start: origin,
                end: origin + reach,
                stops: vec![
                    (0.0, Color::WHITE.with_alpha(tilt.glare_opacity)),
                    (1.0, Color::TRANSPARENT),
                ],
            },
        );
    }
}
