//! ScrollProgress - page scroll to a progress indicator
//!
//! Scroll events retarget a smoother; frames are requested only while it is
//! moving, so a page at rest costs nothing per frame.

use crate::page::{Widget, WidgetContext};
use serde::{Deserialize, Serialize};
use showreel_core::{
    CircularProgress, Color, ConfigError, DotProgress, DueFrame, ExponentialSmoother,
    FrameHandle, InputEvent, ScrollSignal, SignalSource, Smoother, Spring, SpringConfig,
};
use showreel_render::{indicator, Surface};
use std::any::Any;
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// Indicator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStyle {
    /// Bar along the top edge
    #[default]
    Line,
    /// Ring with a stroke-dash arc
    Circle,
    /// Row of dots with one highlighted
    Dots,
}

impl fmt::Display for ProgressStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProgressStyle::Line => "line",
            ProgressStyle::Circle => "circle",
            ProgressStyle::Dots => "dots",
        };
        f.write_str(name)
    }
}

impl FromStr for ProgressStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(ProgressStyle::Line),
            "circle" => Ok(ProgressStyle::Circle),
            "dots" => Ok(ProgressStyle::Dots),
            other => Err(ConfigError::InvalidConfig(format!(
                "unknown progress style '{}'",
                other
            ))),
        }
    }
}

/// How the indicator follows the raw scroll fraction
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ProgressSmoothing {
    /// Damped spring from `ScrollProgressConfig::spring`
    #[default]
    Spring,
    /// Exponential approach, enough for a plain bar
    Exponential {
        /// Seconds to cover ~63% of the remaining distance
        time_constant: f32,
    },
}

impl ProgressSmoothing {
    /// Smoother resting at `initial`; the exponential mode reuses the spring's rest delta
    pub fn build(
        &self,
        spring: SpringConfig,
        initial: f32,
    ) -> Result<Box<dyn Smoother>, ConfigError> {
        Ok(match *self {
            ProgressSmoothing::Spring => Box::new(Spring::new(spring, initial)?),
            ProgressSmoothing::Exponential { time_constant } => Box::new(
                ExponentialSmoother::new(time_constant, spring.rest_delta, initial)?,
            ),
        })
    }
}

/// Scroll indicator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollProgressConfig {
    /// Indicator shape
    pub style: ProgressStyle,
    /// Smoothing mode
    pub smoothing: ProgressSmoothing,
    /// Spring parameters; `rest_delta` also bounds the exponential mode
    pub spring: SpringConfig,
    /// Ring geometry for `Circle`
    pub ring: CircularProgress,
    /// Dot row for `Dots`
    pub dots: DotProgress,
    /// Indicator color
    pub color: Color,
    /// Background cleared to every frame
    pub background: Color,
}

impl Default for ScrollProgressConfig {
    fn default() -> Self {
        Self {
            style: ProgressStyle::Line,
            smoothing: ProgressSmoothing::Spring,
            spring: SpringConfig::scroll_progress(),
            ring: CircularProgress::default(),
            dots: DotProgress::default(),
            color: Color::default(),
            background: Color::TRANSPARENT,
        }
    }
}

impl ScrollProgressConfig {
    /// Validate every part
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let ProgressSmoothing::Exponential { time_constant } = self.smoothing {
            if !time_constant.is_finite() || time_constant <= 0.0 {
                return Err(ConfigError::InvalidConfig(format!(
                    "progress time_constant must be positive, got {}",
                    time_constant
                )));
            }
        }
        self.spring.validate()?;
        self.ring.validate()?;
        self.dots.validate()
    }
}

/// Scroll-linked progress indicator
pub struct ScrollProgress<S: Surface> {
    config: ScrollProgressConfig,
    surface: S,
    signal: ScrollSignal,
    smoother: Box<dyn Smoother>,
    pending: Option<FrameHandle>,
    disposed: bool,
}

impl<S: Surface> fmt::Debug for ScrollProgress<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollProgress")
            .field("style", &self.config.style)
            .field("smoothing", &self.config.smoothing)
            .field("value", &self.smoother.value())
            .field("pending", &self.pending)
            .finish()
    }
}

impl<S: Surface> ScrollProgress<S> {
    /// Indicator at 0 drawing on `surface`
    pub fn new(config: ScrollProgressConfig, surface: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let smoother = config.smoothing.build(config.spring, 0.0)?;
        Ok(Self {
            config,
            surface,
            signal: ScrollSignal::new(),
            smoother,
            pending: None,
            disposed: false,
        })
    }

    /// Smoothed progress
    pub fn value(&self) -> f32 {
        self.smoother.value()
    }

    /// Raw scroll fraction
    pub fn target(&self) -> f32 {
        self.signal.current()
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
        let value = self.smoother.value();
        self.surface.clear(self.config.background);
        match self.config.style {
            ProgressStyle::Line => {
                indicator::paint_line_progress(&mut self.surface, value, self.config.color)
            }
            ProgressStyle::Circle => indicator::paint_circular_progress(
                &mut self.surface,
                &self.config.ring,
                value,
                self.config.color,
            ),
            ProgressStyle::Dots => indicator::paint_dot_progress(
                &mut self.surface,
                &self.config.dots,
                value,
                self.config.color,
            ),
        }
    }
}

impl<S: Surface + 'static> Widget for ScrollProgress<S> {
    fn on_mount(&mut self, ctx: &mut WidgetContext<'_>) {
        self.signal.attach(ctx.events, ctx.owner);
        self.paint();
    }

    fn on_event(&mut self, event: &InputEvent, ctx: &mut WidgetContext<'_>) {
        if self.disposed || !self.signal.handle_event(event) {
            return;
        }
        self.smoother.update(self.signal.current());
        if self.pending.is_none() && !self.smoother.is_settled() {
            self.pending = Some(ctx.frames.request_frame(ctx.owner));
        }
    }

    fn on_frame(&mut self, frame: &DueFrame, ctx: &mut WidgetContext<'_>) {
        if self.pending != Some(frame.handle) {
            return;
        }
        self.pending = None;

        self.smoother.tick(frame.dt as f32);
        self.paint();

        if self.smoother.is_settled() {
            trace!("ScrollProgress settled at {:.3}", self.smoother.value());
        } else {
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
