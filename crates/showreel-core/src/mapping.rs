//! Visual mappings from a smoothed signal value to paint parameters
//!
//! Everything here is a pure function of its input and static configuration.

use crate::ConfigError;
use glam::Vec2;
use serde::{Deserialize, Serialize};

fn unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Horizontal scale for a line progress bar anchored at its left edge
pub fn line_scale(value: f32) -> f32 {
    unit(value)
}

/// Circular progress ring drawn with a stroke dash
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircularProgress {
    /// Ring radius in pixels
    pub radius: f32,
    /// Stroke width in pixels
    pub stroke_width: f32,
}

impl Default for CircularProgress {
    fn default() -> Self {
        Self {
            radius: 20.0,
            stroke_width: 3.0,
        }
    }
}

impl CircularProgress {
    /// Ring of the given radius
    pub fn new(radius: f32) -> Result<Self, ConfigError> {
        let ring = Self {
            radius,
            ..Self::default()
        };
        ring.validate()?;
        Ok(ring)
    }

    /// Check the radius and stroke width
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ConfigError::InvalidConfig(format!(
                "progress radius must be positive, got {}",
                self.radius
            )));
        }
        if !(self.stroke_width.is_finite() && self.stroke_width >= 0.0) {
            return Err(ConfigError::InvalidConfig(format!(
                "progress stroke width must be non-negative, got {}",
                self.stroke_width
            )));
        }
        Ok(())
    }

    /// Full dash length
    pub fn circumference(&self) -> f32 {
        std::f32::consts::TAU * self.radius
    }

    /// Dash offset; equals the circumference at 0 and reaches 0 at 1
    pub fn dash_offset(&self, value: f32) -> f32 {
        self.circumference() * (1.0 - unit(value))
    }

    /// Swept angle in radians, clockwise from twelve o'clock
    pub fn sweep(&self, value: f32) -> f32 {
        std::f32::consts::TAU * unit(value)
    }
}

/// Row of N dots where exactly one is highlighted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotProgress {
    /// Number of dots
    pub count: usize,
    /// Opacity of the active dot
    pub active_opacity: f32,
    /// Opacity of every other dot
    pub inactive_opacity: f32,
}

impl Default for DotProgress {
    fn default() -> Self {
        Self {
            count: 5,
            active_opacity: 1.0,
            inactive_opacity: 0.3,
        }
    }
}

impl DotProgress {
    /// Row of `count` dots with default opacities
    pub fn new(count: usize) -> Result<Self, ConfigError> {
        let dots = Self {
            count,
            ..Self::default()
        };
        dots.validate()?;
        Ok(dots)
    }

    /// Requires at least one dot and opacities in `[0, 1]`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(ConfigError::InvalidConfig(
                "dot progress needs at least one dot".to_string(),
            ));
        }
        for opacity in [self.active_opacity, self.inactive_opacity] {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(ConfigError::InvalidConfig(format!(
                    "dot opacity must be within [0, 1], got {}",
                    opacity
                )));
            }
        }
        Ok(())
    }

    /// Sub-range of `[0, 1]` covered by dot `index`
    pub fn range(&self, index: usize) -> (f32, f32) {
        let n = self.count.max(1) as f32;
        (index as f32 / n, (index + 1) as f32 / n)
    }

    /// Dot whose range contains `value`; a shared boundary belongs to the lower dot
    pub fn active_dot(&self, value: f32) -> usize {
        let last = self.count.saturating_sub(1);
        let scaled = (unit(value) * self.count as f32).ceil();
        if scaled <= 1.0 {
            0
        } else {
            (scaled as usize - 1).min(last)
        }
    }

    /// Opacity per dot
    pub fn opacities(&self, value: f32) -> Vec<f32> {
        let active = self.active_dot(value);
        (0..self.count)
            .map(|i| {
                if i == active {
                    self.active_opacity
                } else {
                    self.inactive_opacity
                }
            })
            .collect()
    }
}

/// Pointer tilt with a synchronized glare
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltMapping {
    /// Rotation at the element edge, in degrees
    pub max_tilt_deg: f32,
    /// Glare opacity at the element edge
    pub glare_opacity: f32,
}

impl Default for TiltMapping {
    fn default() -> Self {
        Self {
            max_tilt_deg: 15.0,
            glare_opacity: 0.3,
        }
    }
}

/// Paint parameters for a tilted element
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TiltOutput {
    /// Rotation around the horizontal axis
    pub rotate_x_deg: f32,
    /// Rotation around the vertical axis
    pub rotate_y_deg: f32,
    /// Glare centre, percent of width
    pub glare_x_pct: f32,
    /// Glare centre, percent of height
    pub glare_y_pct: f32,
    /// Glare gradient direction
    pub glare_angle_deg: f32,
    /// Glare opacity
    pub glare_opacity: f32,
}

impl TiltMapping {
    /// Check the tilt angle and glare opacity
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_tilt_deg.is_finite() && (0.0..=90.0).contains(&self.max_tilt_deg)) {
            return Err(ConfigError::InvalidConfig(format!(
                "max tilt must be within [0, 90] degrees, got {}",
                self.max_tilt_deg
            )));
        }
        if !(0.0..=1.0).contains(&self.glare_opacity) {
            return Err(ConfigError::InvalidConfig(format!(
                "glare opacity must be within [0, 1], got {}",
                self.glare_opacity
            )));
        }
        Ok(())
    }

    /// Map a `[-1, 1]²` pointer offset
    ///
    /// Pointer to the right turns the element right (positive Y rotation); pointer
    /// below tips the top edge away (negative X rotation). The glare follows the
    /// pointer and brightens toward the edge.
    pub fn map(&self, offset: Vec2) -> TiltOutput {
        let offset = if offset.is_finite() {
            offset.clamp(Vec2::splat(-1.0), Vec2::splat(1.0))
        } else {
            Vec2::ZERO
        };
        let strength = offset.length().min(1.0);
        let angle = if offset == Vec2::ZERO {
            0.0
        } else {
            offset.y.atan2(offset.x).to_degrees()
        };

        TiltOutput {
            rotate_x_deg: -offset.y * self.max_tilt_deg,
            rotate_y_deg: offset.x * self.max_tilt_deg,
            glare_x_pct: 50.0 + offset.x * 50.0,
            glare_y_pct: 50.0 + offset.y * 50.0,
            glare_angle_deg: angle,
            glare_opacity: self.glare_opacity * strength,
        }
    }
}

impl TiltOutput {
    /// CSS-style transform string
    pub fn css_transform(&self, perspective_px: f32) -> String {
        // -0.0 would print as "-0.00"
        let unsigned_zero = |deg: f32| if deg == 0.0 { 0.0 } else { deg };
        format!(
            "perspective({:.0}px) rotateX({:.2}deg) rotateY({:.2}deg)",
            perspective_px,
            unsigned_zero(self.rotate_x_deg),
            unsigned_zero(self.rotate_y_deg)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_scale_clamps() {
        assert_eq!(line_scale(-0.5), 0.0);
        assert_eq!(line_scale(0.25), 0.25);
        assert_eq!(line_scale(3.0), 1.0);
        assert_eq!(line_scale(f32::NAN), 0.0);
    }

    #[test]
    fn test_circle_dash_offset_endpoints() {
        let ring = CircularProgress::new(10.0).unwrap();
        assert_eq!(ring.dash_offset(0.0), ring.circumference());
        assert_eq!(ring.dash_offset(1.0), 0.0);
        assert!(CircularProgress::new(0.0).is_err());
    }

    #[test]
    fn test_dot_boundaries_go_to_lower_dot() {
        let dots = DotProgress::new(4).unwrap();
        assert_eq!(dots.active_dot(0.0), 0);
        assert_eq!(dots.active_dot(0.25), 0);
        assert_eq!(dots.active_dot(0.26), 1);
        assert_eq!(dots.active_dot(0.5), 1);
        assert_eq!(dots.active_dot(1.0), 3);
        assert_eq!(dots.active_dot(7.0), 3);
    }

    #[test]
    fn test_dot_opacities_highlight_one() {
        let dots = DotProgress::new(3).unwrap();
        let opacities = dots.opacities(0.5);
        assert_eq!(opacities, vec![0.3, 1.0, 0.3]);
        assert!(DotProgress::new(0).is_err());
    }

    #[test]
    fn test_centered_pointer_has_no_tilt() {
        let out = TiltMapping::default().map(Vec2::ZERO);
        assert_eq!(out.rotate_x_deg, 0.0);
        assert_eq!(out.rotate_y_deg, 0.0);
        assert_eq!(out.glare_x_pct, 50.0);
        assert_eq!(out.glare_y_pct, 50.0);
        assert_eq!(out.glare_opacity, 0.0);
    }

    #[test]
    fn test_corner_pointer() {
        let mapping = TiltMapping {
            max_tilt_deg: 10.0,
            glare_opacity: 0.5,
        };
        let out = mapping.map(Vec2::new(1.0, -1.0));
        assert_eq!(out.rotate_x_deg, 10.0);
        assert_eq!(out.rotate_y_deg, 10.0);
        assert_eq!(out.glare_x_pct, 100.0);
        assert_eq!(out.glare_y_pct, 0.0);
        assert_eq!(out.glare_opacity, 0.5);
        assert!((out.glare_angle_deg + 45.0).abs() < 1e-4);
    }

    #[test]
    fn test_css_transform() {
        let out = TiltOutput {
            rotate_x_deg: 1.5,
            rotate_y_deg: -2.0,
            ..TiltOutput::default()
        };
        assert_eq!(
            out.css_transform(1000.0),
            "perspective(1000px) rotateX(1.50deg) rotateY(-2.00deg)"
        );
    }
}
