//! `showreel visualize` - render a WAV file through a frequency visualizer

use anyhow::{bail, ensure, Context, Result};
use serde::Serialize;
use showreel_core::{AnalyserConfig, DecodedClip, MediaElement, OfflineHost, PlaybackState};
use showreel_render::{PixmapSurface, RenderConfig};
use showreel_ui::{AudioVisualizer, Page, UiAction, VisualizerConfig};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Offline render job
#[derive(Debug, Clone)]
pub struct VisualizeJob {
    pub input: PathBuf,
    pub out_dir: PathBuf,
    /// Upper bound on frames; rendering also stops when the clip ends
    pub frames: u32,
    pub fps: f64,
    /// Write every k-th frame
    pub every: u32,
    pub analyser: AnalyserConfig,
    pub render: RenderConfig,
}

/// What a job produced
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VisualizeReport {
    pub frames_advanced: u32,
    pub frames_rendered: u64,
    pub skipped_frames: u64,
    pub images: Vec<PathBuf>,
    pub reached_end: bool,
}

type PixmapVisualizer = AudioVisualizer<PixmapSurface>;

fn frame_path(dir: &Path, index: u32) -> PathBuf {
    dir.join(format!("frame_{:05}.png", index))
}

/// Decode, play and snapshot
pub fn run(job: &VisualizeJob) -> Result<VisualizeReport> {
    ensure!(job.fps.is_finite() && job.fps > 0.0, "--fps must be positive");
    ensure!(job.every > 0, "--every must be at least 1");

    let clip = DecodedClip::from_wav(&job.input)
        .with_context(|| format!("Failed to decode {:?}", job.input))?;
    std::fs::create_dir_all(&job.out_dir)
        .with_context(|| format!("Failed to create output directory {:?}", job.out_dir))?;

    let surface = PixmapSurface::new(job.render.width, job.render.height)
        .context("Failed to allocate drawing surface")?;
    let media = Rc::new(RefCell::new(MediaElement::with_clip(clip)));
    let mut page = Page::new(OfflineHost::new());

    let config = VisualizerConfig {
        analyser: job.analyser.clone(),
        render: job.render.clone(),
    };
    let visualizer = AudioVisualizer::create(config, surface, Rc::clone(&media), page.host())
        .context("Failed to create visualizer")?;
    let id = page.mount(visualizer);
    page.send(id, UiAction::Play);

    match page.widget::<PixmapVisualizer>(id).map(PixmapVisualizer::state) {
        Some(PlaybackState::Playing) => {}
        Some(state) => bail!("Playback did not start (state {:?})", state),
        None => bail!("Visualizer vanished after mount"),
    }
    info!(
        "Rendering {:?} at {} fps into {:?}",
        job.input, job.fps, job.out_dir
    );

    let dt = 1.0 / job.fps;
    let mut report = VisualizeReport::default();
    for index in 0..job.frames {
        if page.advance(dt) == 0 {
            warn!("No frame was due at step {}", index);
        }
        report.frames_advanced += 1;

        let Some(widget) = page.widget::<PixmapVisualizer>(id) else {
            bail!("Visualizer vanished during playback");
        };
        if index % job.every == 0 {
            let path = frame_path(&job.out_dir, index);
            widget
                .surface()
                .save_png(&path)
                .with_context(|| format!("Failed to write {:?}", path))?;
            debug!("Wrote {:?}", path);
            report.images.push(path);
        }
        if widget.state() != PlaybackState::Playing {
            report.reached_end = media.borrow().is_ended();
            break;
        }
    }

    if let Some(widget) = page.widget::<PixmapVisualizer>(id) {
        report.frames_rendered = widget.frames_rendered();
        report.skipped_frames = widget.skipped_frames();
    }
    page.unmount(id);

    info!(
        "Rendered {} frame(s), wrote {} image(s)",
        report.frames_rendered,
        report.images.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use showreel_render::RenderVariant;

    fn write_tone(path: &Path, seconds: f32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let total = (8000.0 * seconds) as usize;
        for i in 0..total {
            let t = i as f32 / 8000.0;
            let v = (t * 440.0 * std::f32::consts::TAU).sin() * 0.8;
            writer.write_sample((v * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn job(dir: &Path, frames: u32, every: u32) -> VisualizeJob {
        VisualizeJob {
            input: dir.join("tone.wav"),
            out_dir: dir.join("frames"),
            frames,
            fps: 20.0,
            every,
            analyser: AnalyserConfig::default(),
            render: RenderConfig {
                variant: RenderVariant::Circle,
                width: 64,
                height: 64,
                ..RenderConfig::default()
            },
        }
    }

    #[test]
    fn test_writes_every_kth_frame() {
        let dir = tempfile::tempdir().unwrap();
        write_tone(&dir.path().join("tone.wav"), 2.0);

        let report = run(&job(dir.path(), 10, 3)).unwrap();
        assert_eq!(report.frames_advanced, 10);
        assert_eq!(report.images.len(), 4);
        assert!(report.images.iter().all(|p| p.exists()));
        assert!(frame_path(&dir.path().join("frames"), 9).exists());
        assert!(!report.reached_end);
    }

    #[test]
    fn test_stops_at_end_of_clip() {
        let dir = tempfile::tempdir().unwrap();
        write_tone(&dir.path().join("tone.wav"), 0.5);

        let report = run(&job(dir.path(), 100, 50)).unwrap();
        assert!(report.reached_end);
        assert!(report.frames_advanced < 100);
    }

    #[test]
    fn test_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&job(dir.path(), 5, 1)).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to decode"));
    }

    #[test]
    fn test_rejects_zero_fps() {
        let dir = tempfile::tempdir().unwrap();
        let mut bad = job(dir.path(), 5, 1);
        bad.fps = 0.0;
        assert!(run(&bad).is_err());
    }
}
