//! TiltCard - pointer position to a tilted card with glare

use crate::page::{Widget, WidgetContext};
use serde::{Deserialize, Serialize};
use showreel_core::{
    Color, ConfigError, DueFrame, ElementBounds, FrameHandle, InputEvent, PointerSignal,
    SignalSource, Spring2, SpringConfig, TiltMapping, TiltOutput, Vec2,
};
use showreel_render::{indicator, Surface};
use std::any::Any;

/// Tilt card settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltCardConfig {
    /// Rotation and glare limits
    pub mapping: TiltMapping,
    /// Smoothing of the pointer offset
    pub spring: SpringConfig,
    /// Card bounds in page coordinates
    pub bounds: ElementBounds,
    /// Card fill
    pub card_color: Color,
    /// Background cleared to every frame
    pub background: Color,
}

impl Default for TiltCardConfig {
    fn default() -> Self {
        Self {
            mapping: TiltMapping::default(),
            spring: SpringConfig::tilt(),
            bounds: ElementBounds::new(0.0, 0.0, 320.0, 200.0),
            card_color: Color::from_rgb8(0x1e, 0x29, 0x3b),
            background: Color::TRANSPARENT,
        }
    }
}

/// Card that tilts toward the pointer
pub struct TiltCard<S: Surface> {
    mapping: TiltMapping,
    card_color: Color,
    background: Color,
    surface: S,
    signal: PointerSignal,
    spring: Spring2,
    pending: Option<FrameHandle>,
    disposed: bool,
}

impl<S: Surface> std::fmt::Debug for TiltCard<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiltCard")
            .field("offset", &self.spring.value())
            .field("pending", &self.pending)
            .finish()
    }
}

impl<S: Surface> TiltCard<S> {
    /// Flat card drawing on `surface`
    pub fn new(config: TiltCardConfig, surface: S) -> Result<Self, ConfigError> {
        config.mapping.validate()?;
        let spring = Spring2::new(config.spring, Vec2::ZERO)?;
        Ok(Self {
            mapping: config.mapping,
            card_color: config.card_color,
            background: config.background,
            surface,
            signal: PointerSignal::new(config.bounds),
            spring,
            pending: None,
            disposed: false,
        })
    }

    /// Paint parameters for the current smoothed offset
    pub fn output(&self) -> TiltOutput {
        self.mapping.map(self.spring.value())
    }

    /// Smoothed pointer offset
    pub fn offset(&self) -> Vec2 {
        self.spring.value()
    }

    /// Cached element bounds
    pub fn bounds(&self) -> ElementBounds {
        self.signal.bounds()
    }

    /// Outstanding frame request
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Drawing surface
    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn paint(&mut self) {
        if !self.surface.is_available() {
            return;
        }
        let output = self.output();
        self.surface.clear(self.background);
        indicator::paint_tilt_card(&mut self.surface, &output, self.card_color);
    }
}

impl<S: Surface + 'static> Widget for TiltCard<S> {
    fn on_mount(&mut self, ctx: &mut WidgetContext<'_>) {
        self.signal.attach(ctx.events, ctx.owner);
        self.paint();
    }

    fn on_event(&mut self, event: &InputEvent, ctx: &mut WidgetContext<'_>) {
        if self.disposed || !self.signal.handle_event(event) {
            return;
        }
        self.spring.update(self.signal.current());
        if self.pending.is_none() && !self.spring.is_settled() {
            self.pending = Some(ctx.frames.request_frame(ctx.owner));
        }
    }

    fn on_frame(&mut self, frame: &DueFrame, ctx: &mut WidgetContext<'_>) {
        if self.pending != Some(frame.handle) {
            return;
        }
        self.pending = None;

        self.spring.tick(frame.dt as f32);
        self.paint();

        if !self.spring.is_settled() {
            self.pending = Some(ctx.frames.request_frame(ctx.owner));
        }
    }

    fn dispose(&mut self, ctx: &mut WidgetContext<'_>) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.signal.detach(ctx.events);
        if let Some(handle) = self.pending.take() {
            ctx.frames.cancel_frame(handle);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
