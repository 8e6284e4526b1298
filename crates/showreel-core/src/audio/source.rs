//! AudioSource - bridge from a media element to per-frame byte spectra
//!
//! `attach` installs a one-time analysis path on a `MediaElement`. Every frame the
//! owner calls `sample_into`, which drains whatever audio the element played since the
//! last call and copies the current spectrum. `teardown` releases the path and the
//! processing context and may be called any number of times.

use super::host::{AudioContext, AudioHost};
use super::media::{AnalysisTap, MediaElement};
use super::{AnalyserConfig, AnalyserStage, AudioError, FrequencySample, Result};
use crossbeam_channel::{bounded, Receiver};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Chunks buffered between the media element and the analyser
const TAP_CAPACITY: usize = 64;

/// Snapshots between stats log lines
const STATS_LOG_INTERVAL: u64 = 600;

/// Counters for a live attachment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    /// Samples fed into the analyser
    pub samples_analysed: u64,
    /// Snapshots copied out
    pub snapshots: u64,
}

/// Exclusive analysis path on one media element
pub struct AudioSource {
    media_id: u64,
    analyser: AnalyserStage,
    receiver: Receiver<Vec<f32>>,
    live: Arc<AtomicBool>,
    context: Option<AudioContext>,
}

impl std::fmt::Debug for AudioSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSource")
            .field("media_id", &self.media_id)
            .field("live", &self.is_attached())
            .finish()
    }
}

impl AudioSource {
    /// Attach an analysis path to `media`
    ///
    /// Fails with `InvalidConfig` for a bad analyser config, `AlreadyAttached` when the
    /// element already feeds a live source, and `AudioContextUnavailable` when the host
    /// refuses a processing context. A failed attach leaves the element untouched.
    pub fn attach(
        media: &mut MediaElement,
        host: &dyn AudioHost,
        config: &AnalyserConfig,
    ) -> Result<Self> {
        config.validate()?;

        if media.has_live_tap() {
            warn!("Media #{} already has a live analysis path", media.id());
            return Err(AudioError::AlreadyAttached(media.id()));
        }

        let sample_rate = media.sample_rate().unwrap_or(44100);
        let context = host.create_context(sample_rate)?;

        let (sender, receiver) = bounded(TAP_CAPACITY);
        let live = Arc::new(AtomicBool::new(true));
        media.install_tap(AnalysisTap {
            sender,
            live: Arc::clone(&live),
        });

        info!(
            "AudioSource attached to media #{} (context #{}, fft_size={})",
            media.id(),
            context.id(),
            config.fft_size.get()
        );

        Ok(Self {
            media_id: media.id(),
            analyser: AnalyserStage::new(config.clone()),
            receiver,
            live,
            context: Some(context),
        })
    }

    /// Bins per sample for this attachment
    pub fn bin_count(&self) -> usize {
        self.analyser.config().fft_size.bin_count()
    }

    /// Zeroed sample buffer sized for this attachment
    pub fn new_sample(&self) -> FrequencySample {
        FrequencySample::new(self.analyser.config().fft_size)
    }

    /// Fill `sample` with the current magnitude-per-bin snapshot
    ///
    /// Never blocks: pending audio is drained with `try_recv`.
    pub fn sample_into(&mut self, sample: &mut FrequencySample) -> Result<()> {
        if !self.is_attached() {
            return Err(AudioError::Detached);
        }
        if sample.len() != self.bin_count() {
            return Err(AudioError::SampleLengthMismatch {
                expected: self.bin_count(),
                actual: sample.len(),
            });
        }

        while let Ok(chunk) = self.receiver.try_recv() {
            self.analyser.push_samples(&chunk);
        }

        self.analyser.snapshot_into(sample);
        if self.analyser.snapshot_count() % STATS_LOG_INTERVAL == 0 {
            debug!("AudioSource media #{}: {:?}", self.media_id, self.stats());
        }
        Ok(())
    }

    /// Whether the path is still live
    pub fn is_attached(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Media element this source listens to
    pub fn media_id(&self) -> u64 {
        self.media_id
    }

    /// Attachment counters
    pub fn stats(&self) -> SourceStats {
        SourceStats {
            samples_analysed: self.analyser.total_samples(),
            snapshots: self.analyser.snapshot_count(),
        }
    }

    /// Release the analysis path and processing context; idempotent
    pub fn teardown(&mut self) {
        if !self.live.swap(false, Ordering::AcqRel) {
            return;
        }

        while self.receiver.try_recv().is_ok() {}
        if let Some(mut context) = self.context.take() {
            context.close();
        }

        debug!(
            "AudioSource for media #{} torn down after {} snapshots",
            self.media_id,
            self.analyser.snapshot_count()
        );
    }
}

impl Drop for AudioSource {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{DecodedClip, FftSize, HostPolicy, OfflineHost};

    fn tone_media() -> MediaElement {
        let samples: Vec<f32> = (0..44100)
            .map(|i| (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 44100.0).sin() * 0.5)
            .collect();
        MediaElement::with_clip(DecodedClip::from_samples(samples, 44100).unwrap())
    }

    #[test]
    fn test_attach_and_sample() {
        let mut media = tone_media();
        let host = OfflineHost::new();
        let mut source = AudioSource::attach(&mut media, &host, &AnalyserConfig::default()).unwrap();
        let mut sample = source.new_sample();
        assert_eq!(sample.len(), 64);

        media.start();
        media.advance(1.0 / 60.0);
        source.sample_into(&mut sample).unwrap();

        assert!(!sample.is_silent());
        assert_eq!(source.stats().snapshots, 1);
        assert!(source.stats().samples_analysed > 0);
    }

    #[test]
    fn test_double_attach_rejected() {
        let mut media = tone_media();
        let host = OfflineHost::new();
        let _first = AudioSource::attach(&mut media, &host, &AnalyserConfig::default()).unwrap();

        let second = AudioSource::attach(&mut media, &host, &AnalyserConfig::default());
        assert!(matches!(second, Err(AudioError::AlreadyAttached(_))));
    }

    #[test]
    fn test_reattach_after_teardown() {
        let mut media = tone_media();
        let host = OfflineHost::new();
        let mut first = AudioSource::attach(&mut media, &host, &AnalyserConfig::default()).unwrap();
        first.teardown();
        first.teardown();

        assert!(AudioSource::attach(&mut media, &host, &AnalyserConfig::default()).is_ok());
    }

    #[test]
    fn test_denied_context_leaves_media_unattached() {
        let mut media = tone_media();
        let denied = OfflineHost::with_policy(HostPolicy {
            audio_context: false,
            autoplay: true,
        });
        let result = AudioSource::attach(&mut media, &denied, &AnalyserConfig::default());
        assert!(matches!(result, Err(AudioError::AudioContextUnavailable(_))));

        assert!(AudioSource::attach(&mut media, &OfflineHost::new(), &AnalyserConfig::default()).is_ok());
    }

    #[test]
    fn test_wrong_length_sample() {
        let mut media = tone_media();
        let mut source =
            AudioSource::attach(&mut media, &OfflineHost::new(), &AnalyserConfig::default()).unwrap();
        let mut wrong = FrequencySample::new(FftSize::new(256).unwrap());

        assert!(matches!(
            source.sample_into(&mut wrong),
            Err(AudioError::SampleLengthMismatch {
                expected: 64,
                actual: 128
            })
        ));
    }

    #[test]
    fn test_sample_after_teardown_fails() {
        let mut media = tone_media();
        let mut source =
            AudioSource::attach(&mut media, &OfflineHost::new(), &AnalyserConfig::default()).unwrap();
        let mut sample = source.new_sample();
        source.teardown();

        assert!(matches!(
            source.sample_into(&mut sample),
            Err(AudioError::Detached)
        ));
    }
}
