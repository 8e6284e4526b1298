//! Frame scheduling - the "run before next repaint" primitive
//!
//! Components request a frame for themselves and receive exactly one callback per
//! request. Requests made while frames are being delivered are due on the next
//! `advance`, so a component that reschedules from its own callback sees one callback
//! per frame.

use std::collections::BTreeMap;
use tracing::trace;

/// Identifies the component that owns a frame request or listener
pub type OwnerId = u64;

/// Handle to a scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    /// Raw handle value
    pub fn id(self) -> u64 {
        self.0
    }
}

/// A frame callback that became due
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DueFrame {
    /// Handle returned by `request_frame`
    pub handle: FrameHandle,
    /// Component that requested it
    pub owner: OwnerId,
    /// Clock time for this frame in seconds
    pub timestamp: f64,
    /// Seconds since the previous frame
    pub dt: f64,
}

/// Platform frame scheduler
pub trait FrameScheduler {
    /// Schedule one callback for `owner` before the next repaint
    fn request_frame(&mut self, owner: OwnerId) -> FrameHandle;

    /// Cancel a scheduled callback; returns false if it was not pending
    fn cancel_frame(&mut self, handle: FrameHandle) -> bool;

    /// Whether `handle` is still waiting to be delivered
    fn is_pending(&self, handle: FrameHandle) -> bool;
}

/// Deterministic frame clock for offline rendering and tests
#[derive(Debug, Default)]
pub struct FrameClock {
    next_id: u64,
    pending: BTreeMap<FrameHandle, OwnerId>,
    now: f64,
    frames_delivered: u64,
}

impl FrameClock {
    /// Clock at t = 0 with nothing scheduled
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance time by `dt` seconds and take every frame requested so far
    pub fn advance(&mut self, dt: f64) -> Vec<DueFrame> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.now += dt;

        let due: Vec<DueFrame> = std::mem::take(&mut self.pending)
            .into_iter()
            .map(|(handle, owner)| DueFrame {
                handle,
                owner,
                timestamp: self.now,
                dt,
            })
            .collect();

        self.frames_delivered += due.len() as u64;
        if !due.is_empty() {
            trace!("FrameClock t={:.3}: {} frame(s) due", self.now, due.len());
        }
        due
    }

    /// Current clock time in seconds
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Callbacks waiting for the next frame
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Pending callbacks for one owner
    pub fn pending_for(&self, owner: OwnerId) -> usize {
        self.pending.values().filter(|&&o| o == owner).count()
    }

    /// Total callbacks delivered
    pub fn frames_delivered(&self) -> u64 {
        self.frames_delivered
    }
}

impl FrameScheduler for FrameClock {
    fn request_frame(&mut self, owner: OwnerId) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.insert(handle, owner);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) -> bool {
        self.pending.remove(&handle).is_some()
    }

    fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.contains_key(&handle)
    }
}
