//! AudioVisualizer - media element to frequency frames
//!
//! Construction attaches the analysis path. If the host refuses an audio context the
//! widget still mounts but stays `Unavailable` and only ever shows the resting
//! baseline. While playing, every frame advances the media by the frame's `dt`,
//! samples the spectrum and repaints.

use crate::page::{UiAction, Widget, WidgetContext};
use crate::Result;
use serde::{Deserialize, Serialize};
use showreel_core::{
    AnalyserConfig, AudioError, AudioHost, AudioSource, DueFrame, FrequencySample, InputEvent,
    MediaElement, PlaybackController, PlaybackState, SourceStats,
};
use showreel_render::{FrequencyRenderer, RenderConfig, RenderError, Surface};
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// Media element shared between the page and the widgets that play it
pub type SharedMedia = Rc<RefCell<MediaElement>>;

/// Analyser and renderer settings for one visualizer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Frequency analysis
    pub analyser: AnalyserConfig,
    /// Drawing
    pub render: RenderConfig,
}

/// Frequency visualizer bound to one media element
pub struct AudioVisualizer<S: Surface> {
    surface: S,
    media: SharedMedia,
    source: Option<AudioSource>,
    sample: Option<FrequencySample>,
    renderer: FrequencyRenderer,
    controller: Option<PlaybackController>,
    unavailable: bool,
    skipped_frames: u64,
    disposed: bool,
}

impl<S: Surface> std::fmt::Debug for AudioVisualizer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioVisualizer")
            .field("state", &self.state())
            .field("source", &self.source)
            .field("frames", &self.renderer.frames_rendered())
            .finish()
    }
}

impl<S: Surface> AudioVisualizer<S> {
    /// Attach to `media` and prepare to draw on `surface`
    ///
    /// Fails only for a bad configuration or when `media` already feeds another
    /// visualizer. A refused audio context yields an inert widget instead.
    pub fn create(
        config: VisualizerConfig,
        surface: S,
        media: SharedMedia,
        host: &dyn AudioHost,
    ) -> Result<Self> {
        let renderer = FrequencyRenderer::new(config.render)?;

        let attached = {
            let mut element = media.borrow_mut();
            AudioSource::attach(&mut element, host, &config.analyser)
        };
        let (source, unavailable) = match attached {
            Ok(source) => (Some(source), false),
            Err(AudioError::AudioContextUnavailable(reason)) => {
                warn!("AudioVisualizer is inert: {}", reason);
                (None, true)
            }
            Err(e) => return Err(e.into()),
        };
        let sample = source.as_ref().map(AudioSource::new_sample);

        Ok(Self {
            surface,
            media,
            source,
            sample,
            renderer,
            controller: None,
            unavailable,
            skipped_frames: 0,
            disposed: false,
        })
    }

    /// Playback state; `Idle` until mounted
    pub fn state(&self) -> PlaybackState {
        match &self.controller {
            Some(controller) => controller.state(),
            None if self.unavailable => PlaybackState::Unavailable,
            None => PlaybackState::Idle,
        }
    }

    /// Drawing surface
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Latest frequency sample, if attached
    pub fn sample(&self) -> Option<&FrequencySample> {
        self.sample.as_ref()
    }

    /// Frames painted with live data
    pub fn frames_rendered(&self) -> u64 {
        self.renderer.frames_rendered()
    }

    /// Frames dropped because sampling or drawing failed
    pub fn skipped_frames(&self) -> u64 {
        self.skipped_frames
    }

    /// Analysis counters, if attached
    pub fn source_stats(&self) -> Option<SourceStats> {
        self.source.as_ref().map(AudioSource::stats)
    }

    /// Request playback
    pub fn play(&mut self, ctx: &mut WidgetContext<'_>) -> PlaybackState {
        self.sync_metadata();
        let Some(controller) = self.controller.as_mut() else {
            return self.state();
        };
        let mut media = self.media.borrow_mut();
        controller.play(&mut media, ctx.host, ctx.frames)
    }

    /// Pause playback
    pub fn pause(&mut self, ctx: &mut WidgetContext<'_>) -> PlaybackState {
        self.sync_metadata();
        let Some(controller) = self.controller.as_mut() else {
            return self.state();
        };
        let mut media = self.media.borrow_mut();
        controller.pause(&mut media, ctx.frames)
    }

    /// Play if paused, pause if playing
    pub fn toggle(&mut self, ctx: &mut WidgetContext<'_>) -> PlaybackState {
        self.sync_metadata();
        let Some(controller) = self.controller.as_mut() else {
            return self.state();
        };
        let mut media = self.media.borrow_mut();
        controller.toggle(&mut media, ctx.host, ctx.frames)
    }

    /// Media loaded after mount moves `Idle` to `Ready`
    fn sync_metadata(&mut self) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        if controller.state() == PlaybackState::Idle && self.media.borrow().is_loaded() {
            controller.on_metadata_loaded();
        }
    }

    fn paint_idle(&mut self) {
        match self.renderer.render_idle(&mut self.surface) {
            Ok(()) | Err(RenderError::SurfaceUnavailable { .. }) => {}
            Err(e) => warn!("AudioVisualizer idle paint failed: {}", e),
        }
    }
}

impl<S: Surface + 'static> Widget for AudioVisualizer<S> {
    fn on_mount(&mut self, ctx: &mut WidgetContext<'_>) {
        let mut controller = PlaybackController::new(ctx.owner);
        if self.unavailable {
            controller.mark_unavailable(ctx.frames);
        } else if self.media.borrow().is_loaded() {
            controller.on_metadata_loaded();
        }
        self.controller = Some(controller);
        self.paint_idle();
    }

    fn on_event(&mut self, _event: &InputEvent, _ctx: &mut WidgetContext<'_>) {}

    fn on_frame(&mut self, frame: &DueFrame, ctx: &mut WidgetContext<'_>) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        if !controller.on_frame(frame.handle, ctx.frames) {
            return;
        }

        let advance = self.media.borrow_mut().advance(frame.dt);

        if let (Some(source), Some(sample)) = (self.source.as_mut(), self.sample.as_mut()) {
            let drawn = source
                .sample_into(sample)
                .map_err(|e| e.to_string())
                .and_then(|()| {
                    self.renderer
                        .render(&mut self.surface, sample)
                        .map_err(|e| e.to_string())
                });
            if let Err(reason) = drawn {
                self.skipped_frames += 1;
                debug!("AudioVisualizer frame skipped: {}", reason);
            }
        }

        // A reload under a running loop stops the element without an end of stream
        if advance.ended || !self.media.borrow().is_playing() {
            controller.on_ended(ctx.frames);
        }
    }

    fn on_action(&mut self, action: UiAction, ctx: &mut WidgetContext<'_>) {
        let state = match action {
            UiAction::Play => self.play(ctx),
            UiAction::Pause => self.pause(ctx),
            UiAction::TogglePlayback => self.toggle(ctx),
        };
        debug!("AudioVisualizer {:?} -> {:?}", action, state);
    }

    fn dispose(&mut self, ctx: &mut WidgetContext<'_>) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Some(controller) = self.controller.as_mut() {
            let mut media = self.media.borrow_mut();
            controller.teardown(&mut media, ctx.frames);
        }
        if let Some(source) = self.source.as_mut() {
            source.teardown();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
