//! Analyser stage - windowed FFT over the most recent samples
//!
//! Keeps a ring buffer of the last `fft_size` mono samples. On every snapshot the
//! buffer is windowed, transformed, smoothed against the previous spectrum and
//! mapped from decibels onto the 0-255 byte range.

use super::{AnalyserConfig, FrequencySample};
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;
use tracing::{debug, trace};

/// FFT stage feeding `FrequencySample` snapshots
pub struct AnalyserStage {
    /// FFT instance
    fft: Arc<dyn Fft<f32>>,

    /// Configuration
    config: AnalyserConfig,

    /// Most recent samples (ring buffer)
    input_buffer: Vec<f32>,

    /// Write position in ring buffer
    write_pos: usize,

    /// FFT complex buffer
    fft_buffer: Vec<Complex<f32>>,

    /// FFT scratch buffer
    scratch_buffer: Vec<Complex<f32>>,

    /// Blackman window coefficients
    window: Vec<f32>,

    /// Smoothed linear magnitudes (half of FFT size)
    smoothed_magnitudes: Vec<f32>,

    /// Samples pushed since creation
    total_samples: u64,

    /// Snapshots computed since creation
    snapshot_count: u64,
}

impl AnalyserStage {
    /// Create a stage; `config` is expected to be validated already
    pub fn new(config: AnalyserConfig) -> Self {
        let fft_size = config.fft_size.get();
        let half_size = config.fft_size.bin_count();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch_len = fft.get_inplace_scratch_len();

        debug!(
            "AnalyserStage created: fft_size={}, bins={}, smoothing={}",
            fft_size, half_size, config.smoothing_time_constant
        );

        Self {
            fft,
            input_buffer: vec![0.0; fft_size],
            write_pos: 0,
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch_buffer: vec![Complex::new(0.0, 0.0); scratch_len],
            window: blackman_window(fft_size),
            smoothed_magnitudes: vec![0.0; half_size],
            total_samples: 0,
            snapshot_count: 0,
            config,
        }
    }

    /// Append decoded samples to the analysis window
    pub fn push_samples(&mut self, samples: &[f32]) {
        let size = self.input_buffer.len();
        for &sample in samples {
            // NaN/Inf would poison every later magnitude through the smoothing
            self.input_buffer[self.write_pos] = if sample.is_finite() { sample } else { 0.0 };
            self.write_pos = (self.write_pos + 1) % size;
        }
        self.total_samples += samples.len() as u64;
    }

    /// Compute the current spectrum into `out` (one byte per bin)
    pub fn snapshot_into(&mut self, out: &mut FrequencySample) {
        let size = self.input_buffer.len();
        self.snapshot_count += 1;

        // Unwrap ring buffer: oldest sample sits at the write position
        for i in 0..size {
            let src_idx = (self.write_pos + i) % size;
            self.fft_buffer[i] = Complex::new(self.input_buffer[src_idx] * self.window[i], 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.fft_buffer, &mut self.scratch_buffer);

        let tau = self.config.smoothing_time_constant;
        let norm_factor = 1.0 / size as f32;
        let min_db = self.config.min_decibels;
        let range_db = self.config.max_decibels - min_db;

        let bins = out.as_mut_slice();
        for (i, byte) in bins.iter_mut().enumerate() {
            let magnitude = self.fft_buffer[i].norm() * norm_factor;
            let smoothed = tau * self.smoothed_magnitudes[i] + (1.0 - tau) * magnitude;
            self.smoothed_magnitudes[i] = smoothed;

            *byte = if smoothed > 0.0 {
                let db = 20.0 * smoothed.log10();
                let scaled = 255.0 * (db - min_db) / range_db;
                scaled.clamp(0.0, 255.0) as u8
            } else {
                0
            };
        }

        if self.snapshot_count % 600 == 0 {
            trace!(
                "Analyser snapshot #{}: peak bin value {}",
                self.snapshot_count,
                out.peak()
            );
        }
    }

    /// Forget all buffered audio and smoothing history
    pub fn reset(&mut self) {
        self.input_buffer.fill(0.0);
        self.write_pos = 0;
        self.smoothed_magnitudes.fill(0.0);
        self.total_samples = 0;
        self.snapshot_count = 0;

        debug!("AnalyserStage reset");
    }

    /// Samples pushed since creation or reset
    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    /// Snapshots computed since creation or reset
    pub fn snapshot_count(&self) -> u64 {
        self.snapshot_count
    }

    /// Active configuration
    pub fn config(&self) -> &AnalyserConfig {
        &self.config
    }
}

/// Blackman window coefficients (alpha = 0.16)
fn blackman_window(size: usize) -> Vec<f32> {
    let a0 = 0.42;
    let a1 = 0.5;
    let a2 = 0.08;
    (0..size)
        .map(|i| {
            let t = 2.0 * std::f32::consts::PI * i as f32 / size as f32;
            a0 - a1 * t.cos() + a2 * (2.0 * t).cos()
        })
        .collect()
}
