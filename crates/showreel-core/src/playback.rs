//! Playback state machine and its frame loop.
//!
//! ```text
//! Idle --metadata--> Ready --play--> Playing --pause/end--> Ready
//!   any --attach failure--> Unavailable (terminal)
//! ```
//!
//! The frame loop runs only in `Playing`: each delivered frame schedules exactly one
//! successor, and leaving `Playing` cancels the pending one.

use crate::audio::{AudioHost, MediaElement};
use crate::frame::{FrameHandle, FrameScheduler, OwnerId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No media loaded
    Idle,
    /// Media loaded, not playing
    Ready,
    /// Playing; the frame loop is active
    Playing,
    /// Analysis path could not be created; no recovery for this instance
    Unavailable,
}

/// Owns play/pause state and the pending frame of the render loop
#[derive(Debug)]
pub struct PlaybackController {
    owner: OwnerId,
    state: PlaybackState,
    pending_frame: Option<FrameHandle>,
    torn_down: bool,
}

impl PlaybackController {
    /// Controller in `Idle` for the component `owner`
    pub fn new(owner: OwnerId) -> Self {
        Self {
            owner,
            state: PlaybackState::Idle,
            pending_frame: None,
            torn_down: false,
        }
    }

    /// Current state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether a frame callback is outstanding
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    fn transition(&mut self, next: PlaybackState) {
        if self.state != next {
            debug!(
                "Playback (owner {}): {:?} -> {:?}",
                self.owner, self.state, next
            );
            self.state = next;
        }
    }

    /// Media metadata became available
    pub fn on_metadata_loaded(&mut self) {
        if self.state == PlaybackState::Idle && !self.torn_down {
            self.transition(PlaybackState::Ready);
        }
    }

    /// Request playback; stays in `Ready` if the host rejects it
    pub fn play(
        &mut self,
        media: &mut MediaElement,
        host: &dyn AudioHost,
        scheduler: &mut dyn FrameScheduler,
    ) -> PlaybackState {
        if self.state != PlaybackState::Ready || self.torn_down {
            return self.state;
        }
        if !host.allows_playback() {
            warn!("Play request rejected by host (autoplay policy)");
            return self.state;
        }
        if !media.start() {
            return self.state;
        }

        self.transition(PlaybackState::Playing);
        self.schedule(scheduler);
        self.state
    }

    /// Pause playback
    pub fn pause(
        &mut self,
        media: &mut MediaElement,
        scheduler: &mut dyn FrameScheduler,
    ) -> PlaybackState {
        if self.state == PlaybackState::Playing {
            media.stop();
            self.transition(PlaybackState::Ready);
            self.cancel(scheduler);
        }
        self.state
    }

    /// Play if paused, pause if playing
    pub fn toggle(
        &mut self,
        media: &mut MediaElement,
        host: &dyn AudioHost,
        scheduler: &mut dyn FrameScheduler,
    ) -> PlaybackState {
        match self.state {
            PlaybackState::Playing => self.pause(media, scheduler),
            PlaybackState::Ready => self.play(media, host, scheduler),
            other => other,
        }
    }

    /// Natural end of stream
    pub fn on_ended(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.state == PlaybackState::Playing {
            self.transition(PlaybackState::Ready);
            self.cancel(scheduler);
        }
    }

    /// Attaching the analysis path failed
    pub fn mark_unavailable(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.cancel(scheduler);
        self.transition(PlaybackState::Unavailable);
    }

    /// A frame was delivered; returns true if it belongs to the live loop
    ///
    /// While `Playing`, exactly one successor frame is scheduled.
    pub fn on_frame(&mut self, handle: FrameHandle, scheduler: &mut dyn FrameScheduler) -> bool {
        if self.pending_frame != Some(handle) {
            return false;
        }
        self.pending_frame = None;

        if self.state == PlaybackState::Playing && !self.torn_down {
            self.schedule(scheduler);
            true
        } else {
            false
        }
    }

    /// Cancel any in-flight frame and stop for good; idempotent
    pub fn teardown(&mut self, media: &mut MediaElement, scheduler: &mut dyn FrameScheduler) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        if self.state == PlaybackState::Playing {
            media.stop();
            self.transition(PlaybackState::Ready);
        }
        self.cancel(scheduler);
    }

    fn schedule(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.pending_frame.is_none() {
            self.pending_frame = Some(scheduler.request_frame(self.owner));
        }
    }

    fn cancel(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let Some(handle) = self.pending_frame.take() {
            scheduler.cancel_frame(handle);
        }
    }
}
