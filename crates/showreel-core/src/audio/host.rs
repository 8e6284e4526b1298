//! Platform seam for audio-context creation and autoplay policy.

use super::{AudioError, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Platform that can open audio-processing contexts and start playback
pub trait AudioHost {
    /// Open a processing context at the given sample rate
    fn create_context(&self, sample_rate: u32) -> Result<AudioContext>;

    /// Whether a play request is currently allowed
    fn allows_playback(&self) -> bool;
}

/// Audio-processing context owned by exactly one `AudioSource`
#[derive(Debug)]
pub struct AudioContext {
    id: u64,
    sample_rate: u32,
    closed: bool,
}

impl AudioContext {
    fn open(sample_rate: u32) -> Self {
        let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
        debug!("AudioContext #{} opened @ {}Hz", id, sample_rate);
        Self {
            id,
            sample_rate,
            closed: false,
        }
    }

    /// Context identifier
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Processing sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Whether `close` was called
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Release the context; repeated calls are no-ops
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            debug!("AudioContext #{} closed", self.id);
        }
    }
}

impl Drop for AudioContext {
    fn drop(&mut self) {
        self.close();
    }
}

/// What the offline host permits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostPolicy {
    /// Allow audio-context creation
    pub audio_context: bool,
    /// Allow play requests
    pub autoplay: bool,
}

impl Default for HostPolicy {
    fn default() -> Self {
        Self {
            audio_context: true,
            autoplay: true,
        }
    }
}

/// In-process host used for offline rendering and tests
#[derive(Debug, Clone, Default)]
pub struct OfflineHost {
    policy: HostPolicy,
}

impl OfflineHost {
    /// Host with everything allowed
    pub fn new() -> Self {
        Self::default()
    }

    /// Host with an explicit policy
    pub fn with_policy(policy: HostPolicy) -> Self {
        Self { policy }
    }

    /// Active policy
    pub fn policy(&self) -> HostPolicy {
        self.policy
    }
}

impl AudioHost for OfflineHost {
    fn create_context(&self, sample_rate: u32) -> Result<AudioContext> {
        if !self.policy.audio_context {
            warn!("Audio context creation denied by host policy");
            return Err(AudioError::AudioContextUnavailable(
                "denied by host policy".to_string(),
            ));
        }
        if sample_rate == 0 {
            return Err(AudioError::AudioContextUnavailable(
                "sample rate must be non-zero".to_string(),
            ));
        }
        Ok(AudioContext::open(sample_rate))
    }

    fn allows_playback(&self) -> bool {
        self.policy.autoplay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denied_context() {
        let host = OfflineHost::with_policy(HostPolicy {
            audio_context: false,
            autoplay: true,
        });
        assert!(matches!(
            host.create_context(44100),
            Err(AudioError::AudioContextUnavailable(_))
        ));
    }

    #[test]
    fn test_close_is_idempotent() {
        let host = OfflineHost::new();
        let mut ctx = host.create_context(48000).unwrap();
        assert_eq!(ctx.sample_rate(), 48000);

        ctx.close();
        ctx.close();
        assert!(ctx.is_closed());
    }

    #[test]
    fn test_context_ids_are_unique() {
        let host = OfflineHost::new();
        let a = host.create_context(44100).unwrap();
        let b = host.create_context(44100).unwrap();
        assert_ne!(a.id(), b.id());
    }
}
