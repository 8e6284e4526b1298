//! Playable media handle with an optional analysis tap.

use super::{AudioError, Result};
use crossbeam_channel::{Sender, TrySendError};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace};

static NEXT_MEDIA_ID: AtomicU64 = AtomicU64::new(1);

/// Decoded mono PCM audio
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedClip {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl DecodedClip {
    /// Wrap in-memory mono samples
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if samples.is_empty() {
            return Err(AudioError::EmptyClip);
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Decode a WAV file, downmixing all channels to mono
    pub fn from_wav<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        let samples: Vec<f32> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();

        info!(
            "Decoded {:?}: {} frames, {} channel(s) @ {}Hz",
            path,
            samples.len(),
            channels,
            spec.sample_rate
        );

        Self::from_samples(samples, spec.sample_rate)
    }

    /// Mono samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Sending half of an analysis path
#[derive(Debug)]
pub(crate) struct AnalysisTap {
    pub(crate) sender: Sender<Vec<f32>>,
    pub(crate) live: Arc<AtomicBool>,
}

/// Result of advancing playback by one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Advance {
    /// Samples consumed this step
    pub consumed: usize,
    /// End of stream reached during this step
    pub ended: bool,
}

/// Playable audio handle supplied by the embedding page
#[derive(Debug)]
pub struct MediaElement {
    id: u64,
    clip: Option<DecodedClip>,
    position: usize,
    /// Fractional samples carried between steps
    carry: f64,
    playing: bool,
    ended: bool,
    tap: Option<AnalysisTap>,
    dropped_chunks: u64,
}

impl Default for MediaElement {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaElement {
    /// Element with no media loaded
    pub fn new() -> Self {
        Self {
            id: NEXT_MEDIA_ID.fetch_add(1, Ordering::Relaxed),
            clip: None,
            position: 0,
            carry: 0.0,
            playing: false,
            ended: false,
            tap: None,
            dropped_chunks: 0,
        }
    }

    /// Element with a clip already loaded
    pub fn with_clip(clip: DecodedClip) -> Self {
        let mut element = Self::new();
        element.load(clip);
        element
    }

    /// Load (or replace) the clip and rewind
    pub fn load(&mut self, clip: DecodedClip) {
        debug!(
            "Media #{} loaded: {:.2}s @ {}Hz",
            self.id,
            clip.duration_secs(),
            clip.sample_rate()
        );
        self.clip = Some(clip);
        self.position = 0;
        self.carry = 0.0;
        self.playing = false;
        self.ended = false;
    }

    /// Element identifier
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether metadata (a clip) is available
    pub fn is_loaded(&self) -> bool {
        self.clip.is_some()
    }

    /// Loaded clip, if any
    pub fn clip(&self) -> Option<&DecodedClip> {
        self.clip.as_ref()
    }

    /// Sample rate of the loaded clip
    pub fn sample_rate(&self) -> Option<u32> {
        self.clip.as_ref().map(DecodedClip::sample_rate)
    }

    /// Whether playback is running
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether the last playback reached end of stream
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Playback position in seconds
    pub fn position_secs(&self) -> f64 {
        match &self.clip {
            Some(clip) if clip.sample_rate() > 0 => {
                self.position as f64 / clip.sample_rate() as f64
            }
            _ => 0.0,
        }
    }

    /// Chunks the analysis path could not accept
    pub fn dropped_chunks(&self) -> u64 {
        self.dropped_chunks
    }

    /// Start playback; restarts from the beginning after end of stream
    pub(crate) fn start(&mut self) -> bool {
        if self.clip.is_none() {
            return false;
        }
        if self.ended {
            self.position = 0;
            self.carry = 0.0;
            self.ended = false;
        }
        self.playing = true;
        true
    }

    /// Halt playback at the current position
    pub(crate) fn stop(&mut self) {
        self.playing = false;
    }

    /// Whether a live analysis path is installed
    pub(crate) fn has_live_tap(&self) -> bool {
        self.tap
            .as_ref()
            .map(|tap| tap.live.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    /// Install the analysis path; the caller checks `has_live_tap` first
    pub(crate) fn install_tap(&mut self, tap: AnalysisTap) {
        self.tap = Some(tap);
    }

    /// Advance playback by `dt` seconds of audio
    ///
    /// Consumed samples are copied into the analysis path; playback itself is unaffected
    /// by whether anyone is listening.
    pub fn advance(&mut self, dt: f64) -> Advance {
        if !self.playing || !dt.is_finite() || dt <= 0.0 {
            return Advance::default();
        }
        let Some(clip) = &self.clip else {
            return Advance::default();
        };

        let wanted = dt * clip.sample_rate() as f64 + self.carry;
        let whole = wanted.floor();
        self.carry = wanted - whole;

        let start = self.position;
        let end = (start + whole as usize).min(clip.samples().len());
        self.position = end;

        if end > start {
            let chunk = &clip.samples()[start..end];
            if let Some(tap) = &self.tap {
                if tap.live.load(Ordering::Acquire) {
                    match tap.sender.try_send(chunk.to_vec()) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            self.dropped_chunks += 1;
                            trace!("Media #{} analysis path full, chunk dropped", self.id);
                        }
                        Err(TrySendError::Disconnected(_)) => self.tap = None,
                    }
                } else {
                    self.tap = None;
                }
            }
        }

        let ended = self.position >= clip.samples().len();
        if ended {
            debug!("Media #{} reached end of stream", self.id);
            self.playing = false;
            self.ended = true;
        }

        Advance {
            consumed: end - start,
            ended,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(len: usize, sample_rate: u32) -> DecodedClip {
        DecodedClip::from_samples(vec![0.25; len], sample_rate).unwrap()
    }

    #[test]
    fn test_empty_clip_rejected() {
        assert!(matches!(
            DecodedClip::from_samples(Vec::new(), 44100),
            Err(AudioError::EmptyClip)
        ));
    }

    #[test]
    fn test_advance_requires_playing() {
        let mut media = MediaElement::with_clip(clip(1000, 1000));
        assert_eq!(media.advance(0.1).consumed, 0);

        assert!(media.start());
        assert_eq!(media.advance(0.1).consumed, 100);
        assert!((media.position_secs() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_fractional_carry() {
        let mut media = MediaElement::with_clip(clip(10_000, 1000));
        media.start();

        let total: usize = (0..3).map(|_| media.advance(0.0015).consumed).sum();
        // 4.5 samples requested, whole samples only
        assert_eq!(total, 4);
    }

    #[test]
    fn test_end_of_stream_stops_and_rewinds_on_start() {
        let mut media = MediaElement::with_clip(clip(100, 1000));
        media.start();

        let step = media.advance(1.0);
        assert!(step.ended);
        assert_eq!(step.consumed, 100);
        assert!(!media.is_playing());
        assert!(media.is_ended());

        assert!(media.start());
        assert_eq!(media.position_secs(), 0.0);
    }

    #[test]
    fn test_start_without_clip_fails() {
        let mut media = MediaElement::new();
        assert!(!media.start());
    }

    #[test]
    fn test_wav_decode_downmixes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..100 {
            writer.write_sample(16384i16).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let clip = DecodedClip::from_wav(&path).unwrap();
        assert_eq!(clip.samples().len(), 100);
        assert_eq!(clip.sample_rate(), 8000);
        assert!((clip.samples()[0] - 0.25).abs() < 1e-3);
    }
}
