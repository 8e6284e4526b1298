//! FrequencyRenderer - one frame per call
//!
//! The variant is chosen once at construction. Each frame clears the surface, draws
//! the idle baseline and then the variant on top, so a silent sample still shows the
//! visualizer's resting shape.

use crate::variants::{self, base_radius, surface_center, DrawFn};
use crate::{RenderConfig, RenderError, RenderVariant, Result, Surface};
use glam::Vec2;
use showreel_core::FrequencySample;
use tracing::{debug, trace};

/// Paints frequency samples with a fixed configuration
#[derive(Clone)]
pub struct FrequencyRenderer {
    config: RenderConfig,
    draw: DrawFn,
    frames: u64,
}

impl std::fmt::Debug for FrequencyRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrequencyRenderer")
            .field("config", &self.config)
            .field("frames", &self.frames)
            .finish()
    }
}

impl FrequencyRenderer {
    /// Renderer for `config`
    pub fn new(config: RenderConfig) -> Result<Self> {
        config.validate()?;
        let draw: DrawFn = match config.variant {
            RenderVariant::Bars => variants::bars::draw,
            RenderVariant::Circle => variants::circle::draw,
            RenderVariant::Waveform => variants::waveform::draw,
            RenderVariant::Particles => variants::particles::draw,
        };
        debug!(
            "FrequencyRenderer: variant={}, bins={}, sensitivity={}",
            config.variant, config.bin_count, config.sensitivity
        );
        Ok(Self {
            config,
            draw,
            frames: 0,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Frames painted so far
    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// Draw `sample` as one frame
    ///
    /// A zero-size surface is left untouched and reported as `SurfaceUnavailable`.
    pub fn render(&mut self, surface: &mut dyn Surface, sample: &FrequencySample) -> Result<()> {
        self.begin_frame(surface)?;
        (self.draw)(surface, sample, &self.config);
        self.frames += 1;
        if self.frames % 600 == 0 {
            trace!("FrequencyRenderer: {} frames rendered", self.frames);
        }
        Ok(())
    }

    /// Draw only the resting shape, used while the visualizer is inert
    pub fn render_idle(&mut self, surface: &mut dyn Surface) -> Result<()> {
        self.begin_frame(surface)
    }

    fn begin_frame(&self, surface: &mut dyn Surface) -> Result<()> {
        let (width, height) = surface.size();
        if width == 0 || height == 0 {
            return Err(RenderError::SurfaceUnavailable { width, height });
        }

        surface.clear(self.config.background);
        let baseline = self.config.color.fade(0.3);
        match self.config.variant {
            RenderVariant::Bars | RenderVariant::Waveform => {
                let mid = height as f32 / 2.0;
                surface.stroke_line(
                    Vec2::new(0.0, mid),
                    Vec2::new(width as f32, mid),
                    1.0,
                    baseline,
                );
            }
            RenderVariant::Circle | RenderVariant::Particles => {
                let (center, radius) = (surface_center(surface), base_radius(surface));
                surface.stroke_circle(center, radius, 1.0, baseline);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DrawOp, RecordingSurface};
    use showreel_core::FftSize;

    fn silent() -> FrequencySample {
        FrequencySample::new(FftSize::new(128).unwrap())
    }

    #[test]
    fn test_zero_size_surface_is_skipped() {
        let mut renderer = FrequencyRenderer::new(RenderConfig::default()).unwrap();
        let mut surface = RecordingSurface::new(0, 100);

        let result = renderer.render(&mut surface, &silent());
        assert!(matches!(result, Err(RenderError::SurfaceUnavailable { .. })));
        assert!(surface.ops().is_empty());
        assert_eq!(renderer.frames_rendered(), 0);
    }

    #[test]
    fn test_silent_frame_draws_only_the_baseline() {
        for variant in RenderVariant::ALL {
            let config = RenderConfig {
                variant,
                ..RenderConfig::default()
            };
            let mut renderer = FrequencyRenderer::new(config).unwrap();
            let mut surface = RecordingSurface::new(200, 100);
            renderer.render(&mut surface, &silent()).unwrap();

            let ops = surface.ops();
            assert_eq!(ops.len(), 2, "{}: {:?}", variant, ops);
            assert!(matches!(ops[0], DrawOp::Clear(_)), "{}", variant);
            match variant {
                RenderVariant::Bars | RenderVariant::Waveform => {
                    assert!(matches!(ops[1], DrawOp::StrokeLine { .. }), "{}", variant)
                }
                RenderVariant::Circle | RenderVariant::Particles => {
                    assert!(matches!(ops[1], DrawOp::StrokeCircle { .. }), "{}", variant)
                }
            }
        }
    }

    #[test]
    fn test_each_frame_starts_with_clear() {
        let mut renderer = FrequencyRenderer::new(RenderConfig::default()).unwrap();
        let mut surface = RecordingSurface::new(64, 64);
        for _ in 0..3 {
            renderer.render(&mut surface, &silent()).unwrap();
        }
        assert_eq!(surface.clear_count(), 3);
        assert_eq!(renderer.frames_rendered(), 3);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RenderConfig {
            bin_count: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(
            FrequencyRenderer::new(config),
            Err(RenderError::InvalidConfig(_))
        ));
    }
}
