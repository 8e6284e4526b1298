//! `showreel scroll` - simulate a scroll jump through the progress smoother

use anyhow::{ensure, Result};
use serde::Serialize;
use showreel_core::{line_scale, SpringConfig};
use showreel_ui::ProgressStyle;

use crate::settings::ProgressSettings;

/// One simulated frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollFrame {
    pub frame: u32,
    pub time_secs: f64,
    pub value: f32,
    /// Horizontal scale of the line bar
    pub line_scale: f32,
    /// Stroke dash offset of the ring
    pub dash_offset: f32,
    pub active_dot: usize,
    pub settled: bool,
}

/// Simulation parameters
#[derive(Debug, Clone)]
pub struct ScrollJob {
    pub from: f32,
    pub to: f32,
    pub frames: u32,
    pub fps: f64,
    pub spring: SpringConfig,
    pub progress: ProgressSettings,
}

/// Run `frames` frames of the smoother from `from` toward `to`
///
/// Stops early once it settles; the settled frame is included.
pub fn simulate(job: &ScrollJob) -> Result<Vec<ScrollFrame>> {
    ensure!(job.fps.is_finite() && job.fps > 0.0, "--fps must be positive");
    job.progress.ring.validate()?;
    job.progress.dots.validate()?;

    let mut smoother = job
        .progress
        .smoothing
        .build(job.spring, job.from.clamp(0.0, 1.0))?;
    smoother.update(job.to);

    let dt = 1.0 / job.fps;
    let mut frames = Vec::new();
    for frame in 1..=job.frames {
        let value = smoother.tick(dt as f32);
        let settled = smoother.is_settled();
        frames.push(ScrollFrame {
            frame,
            time_secs: frame as f64 * dt,
            value,
            line_scale: line_scale(value),
            dash_offset: job.progress.ring.dash_offset(value),
            active_dot: job.progress.dots.active_dot(value),
            settled,
        });
        if settled {
            break;
        }
    }
    Ok(frames)
}

/// One line per frame, showing the column for `style`
pub fn format_table(frames: &[ScrollFrame], style: ProgressStyle) -> String {
    let mut out = format!("{:>5} {:>8} {:>8} {:>10}\n", "frame", "time", "value", style.to_string());
    for f in frames {
        let shown = match style {
            ProgressStyle::Line => format!("{:.4}", f.line_scale),
            ProgressStyle::Circle => format!("{:.3}", f.dash_offset),
            ProgressStyle::Dots => f.active_dot.to_string(),
        };
        let marker = if f.settled { " *" } else { "" };
        out.push_str(&format!(
            "{:>5} {:>8.3} {:>8.4} {:>10}{}\n",
            f.frame, f.time_secs, f.value, shown, marker
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use showreel_ui::ProgressSmoothing;

    fn job(from: f32, to: f32, frames: u32) -> ScrollJob {
        ScrollJob {
            from,
            to,
            frames,
            fps: 60.0,
            spring: SpringConfig::scroll_progress(),
            progress: ProgressSettings::default(),
        }
    }

    #[test]
    fn test_settles_on_target() {
        let frames = simulate(&job(0.0, 1.0, 600)).unwrap();
        let last = frames.last().unwrap();
        assert!(last.settled);
        assert_eq!(last.value, 1.0);
        assert_eq!(last.line_scale, 1.0);
        assert_eq!(last.active_dot, 4);
        assert!(last.dash_offset.abs() < 1e-4);
        assert!(frames.len() < 600);
    }

    #[test]
    fn test_frame_budget_caps_output() {
        let frames = simulate(&job(0.0, 1.0, 3)).unwrap();
        assert_eq!(frames.len(), 3);
        assert!(!frames[2].settled);
        assert!(frames[0].value > 0.0 && frames[0].value < frames[2].value);
    }

    #[test]
    fn test_jump_back_passes_through_middle() {
        let frames = simulate(&job(1.0, 0.0, 600)).unwrap();
        assert!(frames.iter().any(|f| f.value > 0.3 && f.value < 0.7));
        assert_eq!(frames.last().unwrap().value, 0.0);
    }

    #[test]
    fn test_table_marks_settled_frame() {
        let frames = simulate(&job(0.0, 1.0, 600)).unwrap();
        let table = format_table(&frames, ProgressStyle::Dots);
        assert!(table.starts_with("frame"));
        assert!(table.trim_end().ends_with("4 *"));
    }

    #[test]
    fn test_exponential_mode_settles_on_target() {
        let mut exp = job(0.0, 1.0, 600);
        exp.progress.smoothing = ProgressSmoothing::Exponential { time_constant: 0.15 };
        let frames = simulate(&exp).unwrap();
        let last = frames.last().unwrap();
        assert!(last.settled);
        assert_eq!(last.value, 1.0);
        assert!(frames.windows(2).all(|w| w[1].value >= w[0].value));
    }

    #[test]
    fn test_bad_spring_rejected() {
        let mut bad = job(0.0, 1.0, 10);
        bad.spring.mass = 0.0;
        assert!(simulate(&bad).is_err());
    }
}
