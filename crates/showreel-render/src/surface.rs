//! Drawing surfaces
//!
//! `Surface` is the minimal set of primitives the variants and indicators need.
//! `PixmapSurface` rasterizes with tiny-skia; `RecordingSurface` keeps an op log
//! so geometry can be asserted without looking at pixels.

use crate::{RenderError, Result};
use glam::Vec2;
use showreel_core::Color;
use std::path::Path;
use tiny_skia::{
    FillRule, GradientStop, LinearGradient, Paint, PathBuilder, Pixmap, Point, SpreadMode, Stroke,
    Transform,
};
use tracing::debug;

/// Axis-aligned rectangle in surface pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Rectangle from position and size
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether the rectangle covers no pixels
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// How a shape is filled
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    /// Single color
    Solid(Color),
    /// Linear gradient between two points; stops are `(position, color)` in `[0, 1]`
    LinearGradient {
        /// Gradient start
        start: Vec2,
        /// Gradient end
        end: Vec2,
        /// Color stops
        stops: Vec<(f32, Color)>,
    },
}

/// 2D drawing target
pub trait Surface {
    /// Size in pixels
    fn size(&self) -> (u32, u32);

    /// Overwrite every pixel with `color`
    fn clear(&mut self, color: Color);

    /// Fill an axis-aligned rectangle
    fn fill_rect(&mut self, rect: Rect, fill: &Fill);

    /// Fill a closed polygon
    fn fill_polygon(&mut self, points: &[Vec2], fill: &Fill);

    /// Stroke one line segment
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);

    /// Stroke an open polyline
    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Color);

    /// Fill a circle
    fn fill_circle(&mut self, center: Vec2, radius: f32, fill: &Fill);

    /// Stroke a circle outline
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color);

    /// Whether the surface has any pixels
    fn is_available(&self) -> bool {
        let (w, h) = self.size();
        w > 0 && h > 0
    }
}

fn skia_color(color: Color) -> tiny_skia::Color {
    let c = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
    tiny_skia::Color::from_rgba(c(color.r), c(color.g), c(color.b), c(color.a))
        .unwrap_or(tiny_skia::Color::TRANSPARENT)
}

fn paint_for(fill: &Fill) -> Option<Paint<'static>> {
    let mut paint = Paint {
        anti_alias: true,
        ..Paint::default()
    };
    match fill {
        Fill::Solid(color) => paint.set_color(skia_color(*color)),
        Fill::LinearGradient { start, end, stops } => {
            let stops: Vec<GradientStop> = stops
                .iter()
                .map(|(pos, color)| GradientStop::new(*pos, skia_color(*color)))
                .collect();
            paint.shader = LinearGradient::new(
                Point::from_xy(start.x, start.y),
                Point::from_xy(end.x, end.y),
                stops,
                SpreadMode::Pad,
                Transform::identity(),
            )?;
        }
    }
    Some(paint)
}

fn solid(color: Color) -> Paint<'static> {
    let mut paint = Paint {
        anti_alias: true,
        ..Paint::default()
    };
    paint.set_color(skia_color(color));
    paint
}

fn polyline_path(points: &[Vec2], close: bool) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    if close {
        pb.close();
    }
    pb.finish()
}

/// tiny-skia raster surface
pub struct PixmapSurface {
    pixmap: Pixmap,
}

impl std::fmt::Debug for PixmapSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixmapSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .finish()
    }
}

impl PixmapSurface {
    /// Transparent surface of the given size
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap =
            Pixmap::new(width, height).ok_or(RenderError::SurfaceUnavailable { width, height })?;
        Ok(Self { pixmap })
    }

    /// Backing pixmap
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight-alpha RGBA of one pixel
    pub fn pixel_rgba(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// PNG bytes of the current frame
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }

    /// Write the current frame as a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.encode_png()?;
        std::fs::write(path.as_ref(), bytes)?;
        debug!("Frame written to {:?}", path.as_ref());
        Ok(())
    }
}

impl Surface for PixmapSurface {
    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn clear(&mut self, color: Color) {
        self.pixmap.fill(skia_color(color));
    }

    fn fill_rect(&mut self, rect: Rect, fill: &Fill) {
        if rect.is_empty() {
            return;
        }
        let Some(r) = tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height) else {
            return;
        };
        if let Some(paint) = paint_for(fill) {
            self.pixmap.fill_rect(r, &paint, Transform::identity(), None);
        }
    }

    fn fill_polygon(&mut self, points: &[Vec2], fill: &Fill) {
        if points.len() < 3 {
            return;
        }
        let (Some(path), Some(paint)) = (polyline_path(points, true), paint_for(fill)) else {
            return;
        };
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.stroke_polyline(&[from, to], width, color);
    }

    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Color) {
        if points.len() < 2 || !(width > 0.0) {
            return;
        }
        let Some(path) = polyline_path(points, false) else {
            return;
        };
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &solid(color), &stroke, Transform::identity(), None);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, fill: &Fill) {
        if !(radius > 0.0) {
            return;
        }
        let (Some(path), Some(paint)) = (
            PathBuilder::from_circle(center.x, center.y, radius),
            paint_for(fill),
        ) else {
            return;
        };
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color) {
        if !(radius > 0.0 && width > 0.0) {
            return;
        }
        let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) else {
            return;
        };
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &solid(color), &stroke, Transform::identity(), None);
    }
}

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// `clear`
    Clear(Color),
    /// `fill_rect`
    FillRect {
        /// Rectangle
        rect: Rect,
        /// Fill
        fill: Fill,
    },
    /// `fill_polygon`
    FillPolygon {
        /// Vertices
        points: Vec<Vec2>,
        /// Fill
        fill: Fill,
    },
    /// `stroke_line`
    StrokeLine {
        /// Start
        from: Vec2,
        /// End
        to: Vec2,
        /// Stroke width
        width: f32,
        /// Stroke color
        color: Color,
    },
    /// `stroke_polyline`
    StrokePolyline {
        /// Vertices
        points: Vec<Vec2>,
        /// Stroke width
        width: f32,
        /// Stroke color
        color: Color,
    },
    /// `fill_circle`
    FillCircle {
        /// Centre
        center: Vec2,
        /// Radius
        radius: f32,
        /// Fill
        fill: Fill,
    },
    /// `stroke_circle`
    StrokeCircle {
        /// Centre
        center: Vec2,
        /// Radius
        radius: f32,
        /// Stroke width
        width: f32,
        /// Stroke color
        color: Color,
    },
}

/// Surface that records calls instead of drawing
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    /// Recorder reporting the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    /// Change the reported size
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Calls recorded so far
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drain the recorded calls
    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    /// Rectangles passed to `fill_rect`, in call order
    pub fn filled_rects(&self) -> Vec<Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillRect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    /// Number of `clear` calls
    pub fn clear_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Clear(_)))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) {
        self.ops.push(DrawOp::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, fill: &Fill) {
        self.ops.push(DrawOp::FillRect {
            rect,
            fill: fill.clone(),
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], fill: &Fill) {
        self.ops.push(DrawOp::FillPolygon {
            points: points.to_vec(),
            fill: fill.clone(),
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.ops.push(DrawOp::StrokeLine {
            from,
            to,
            width,
            color,
        });
    }

    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Color) {
        self.ops.push(DrawOp::StrokePolyline {
            points: points.to_vec(),
            width,
            color,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, fill: &Fill) {
        self.ops.push(DrawOp::FillCircle {
            center,
            radius,
            fill: fill.clone(),
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color) {
        self.ops.push(DrawOp::StrokeCircle {
            center,
            radius,
            width,
            color,
        });
    }
}
