//! `showreel tilt` - map one pointer position to card rotation and glare

use anyhow::{ensure, Result};
use serde::Serialize;
use showreel_core::{ElementBounds, TiltMapping, TiltOutput, Vec2};
use showreel_render::indicator::PERSPECTIVE_PX;

/// Mapping result for one pointer position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TiltReport {
    /// Offset from the centre, each axis in [-1, 1]
    pub offset: [f32; 2],
    pub output: TiltOutput,
    pub transform: String,
}

/// Map `point` inside an element of `width` x `height` anchored at the origin
pub fn map_point(point: Vec2, width: f32, height: f32, mapping: &TiltMapping) -> Result<TiltReport> {
    ensure!(
        width > 0.0 && height > 0.0,
        "element size must be positive, got {}x{}",
        width,
        height
    );
    mapping.validate()?;

    let bounds = ElementBounds::new(0.0, 0.0, width, height);
    let offset = bounds.normalized_offset(point);
    let output = mapping.map(offset);
    Ok(TiltReport {
        offset: offset.to_array(),
        transform: output.css_transform(PERSPECTIVE_PX),
        output,
    })
}

impl TiltReport {
    /// Human-readable summary
    pub fn describe(&self) -> String {
        let o = &self.output;
        format!(
            "offset      ({:.3}, {:.3})\ntransform   {}\nglare       {:.1}% {:.1}% at {:.1}deg, opacity {:.3}\n",
            self.offset[0],
            self.offset[1],
            self.transform,
            o.glare_x_pct,
            o.glare_y_pct,
            o.glare_angle_deg,
            o.glare_opacity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_is_flat() {
        let report = map_point(Vec2::new(150.0, 100.0), 300.0, 200.0, &TiltMapping::default())
            .unwrap();
        assert_eq!(report.offset, [0.0, 0.0]);
        assert_eq!(report.output.rotate_x_deg, 0.0);
        assert_eq!(report.output.rotate_y_deg, 0.0);
        assert_eq!(report.output.glare_opacity, 0.0);
        assert_eq!(
            report.transform,
            "perspective(1000px) rotateX(0.00deg) rotateY(0.00deg)"
        );
    }

    #[test]
    fn test_corner_reaches_max_tilt() {
        let mapping = TiltMapping::default();
        let report = map_point(Vec2::new(300.0, 0.0), 300.0, 200.0, &mapping).unwrap();
        assert_eq!(report.offset, [1.0, -1.0]);
        assert!((report.output.rotate_y_deg - mapping.max_tilt_deg).abs() < 1e-5);
        assert!((report.output.rotate_x_deg - mapping.max_tilt_deg).abs() < 1e-5);
    }

    #[test]
    fn test_outside_point_clamps() {
        let report =
            map_point(Vec2::new(-500.0, 100.0), 300.0, 200.0, &TiltMapping::default()).unwrap();
        assert_eq!(report.offset, [-1.0, 0.0]);
    }

    #[test]
    fn test_empty_element_rejected() {
        assert!(map_point(Vec2::ZERO, 0.0, 200.0, &TiltMapping::default()).is_err());
    }

    #[test]
    fn test_json_shape() {
        let report =
            map_point(Vec2::new(10.0, 10.0), 100.0, 100.0, &TiltMapping::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["output"]["rotate_x_deg"].is_number());
        assert!(json["transform"].as_str().unwrap().starts_with("perspective("));
    }
}
