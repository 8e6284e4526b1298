//! Showreel - offline renderer for the showreel widgets
//!
//! `visualize` plays a WAV file through a frequency visualizer and writes PNG frames,
//! `scroll` simulates the progress spring, `tilt` maps a pointer position.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use showreel_core::{Color, Vec2};
use showreel_render::RenderVariant;
use showreel_ui::ProgressStyle;
use std::path::PathBuf;
use tracing::{debug, info};

mod commands;
mod logging_setup;
mod settings;

use commands::scroll::{self, ScrollJob};
use commands::tilt;
use commands::visualize::{self, VisualizeJob};
use settings::ShowreelConfig;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "showreel")]
#[command(about = "Audio-reactive and scroll/pointer-driven visuals, rendered offline", long_about = None)]
struct Cli {
    /// Settings file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a WAV file to PNG frames
    Visualize(VisualizeArgs),
    /// Simulate a scroll jump through the progress spring
    Scroll(ScrollArgs),
    /// Map a pointer position to card tilt and glare
    Tilt(TiltArgs),
}

#[derive(Args, Debug)]
struct VisualizeArgs {
    /// Input WAV file
    input: PathBuf,

    /// Drawing style: bars, circle, waveform, particles
    #[arg(long)]
    variant: Option<RenderVariant>,

    /// Maximum frames to render
    #[arg(long, default_value_t = 300)]
    frames: u32,

    /// Frames per second of playback
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Output directory for PNG frames
    #[arg(long, value_name = "DIR")]
    out: PathBuf,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Magnitude multiplier
    #[arg(long)]
    sensitivity: Option<f32>,

    /// Foreground color, #rrggbb or #rrggbbaa
    #[arg(long)]
    color: Option<Color>,

    /// Write every k-th frame
    #[arg(long, default_value_t = 1, value_name = "K")]
    every: u32,
}

#[derive(Args, Debug)]
struct ScrollArgs {
    /// Starting progress
    #[arg(long, default_value_t = 0.0)]
    from: f32,

    /// Target progress
    #[arg(long, default_value_t = 1.0)]
    to: f32,

    /// Maximum frames to simulate
    #[arg(long, default_value_t = 120)]
    frames: u32,

    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Indicator shape shown in the table
    #[arg(long)]
    style: Option<ProgressStyle>,

    /// Print frames as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct TiltArgs {
    /// Pointer x, relative to the element's left edge
    #[arg(long, allow_negative_numbers = true)]
    x: f32,

    /// Pointer y, relative to the element's top edge
    #[arg(long, allow_negative_numbers = true)]
    y: f32,

    #[arg(long, default_value_t = 320.0)]
    width: f32,

    #[arg(long, default_value_t = 200.0)]
    height: f32,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ShowreelConfig::load_or_default(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }
    let _log_session = logging_setup::init(&config.log)?;
    info!("Showreel {} started", env!("CARGO_PKG_VERSION"));
    match &cli.config {
        Some(path) => info!("Loaded settings from {:?}", path),
        None => debug!("No settings file, using defaults"),
    }

    match cli.command {
        Command::Visualize(args) => run_visualize(args, config),
        Command::Scroll(args) => run_scroll(args, config),
        Command::Tilt(args) => run_tilt(args, config),
    }
}

fn run_visualize(args: VisualizeArgs, config: ShowreelConfig) -> Result<()> {
    let mut render = config.render;
    if let Some(variant) = args.variant {
        render.variant = variant;
    }
    if let Some(width) = args.width {
        render.width = width;
    }
    if let Some(height) = args.height {
        render.height = height;
    }
    if let Some(sensitivity) = args.sensitivity {
        render.sensitivity = sensitivity;
    }
    if let Some(color) = args.color {
        render.color = color;
    }

    let job = VisualizeJob {
        input: args.input,
        out_dir: args.out,
        frames: args.frames,
        fps: args.fps,
        every: args.every,
        analyser: config.analyser,
        render,
    };
    let report = visualize::run(&job)?;
    println!(
        "{} frame(s) rendered, {} skipped, {} image(s) written to {:?}{}",
        report.frames_rendered,
        report.skipped_frames,
        report.images.len(),
        job.out_dir,
        if report.reached_end { " (end of clip)" } else { "" }
    );
    Ok(())
}

fn run_scroll(args: ScrollArgs, config: ShowreelConfig) -> Result<()> {
    let style = args.style.unwrap_or(config.progress.style);
    let job = ScrollJob {
        from: args.from,
        to: args.to,
        frames: args.frames,
        fps: args.fps,
        spring: config.spring,
        progress: config.progress,
    };
    let frames = scroll::simulate(&job)?;

    if args.json {
        let json = serde_json::to_string_pretty(&frames).context("Failed to encode frames")?;
        println!("{}", json);
    } else {
        print!("{}", scroll::format_table(&frames, style));
    }
    Ok(())
}

fn run_tilt(args: TiltArgs, config: ShowreelConfig) -> Result<()> {
    let report = tilt::map_point(
        Vec2::new(args.x, args.y),
        args.width,
        args.height,
        &config.tilt,
    )?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to encode result")?;
        println!("{}", json);
    } else {
        print!("{}", report.describe());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_visualize_args() {
        let cli = Cli::try_parse_from([
            "showreel",
            "--log-level",
            "debug",
            "visualize",
            "song.wav",
            "--variant",
            "Waveform",
            "--out",
            "frames",
            "--color",
            "#ff0000",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        let Command::Visualize(args) = cli.command else {
            panic!("expected visualize");
        };
        assert_eq!(args.variant, Some(RenderVariant::Waveform));
        assert_eq!(args.color, Some(Color::from_rgb8(255, 0, 0)));
        assert_eq!(args.every, 1);
    }

    #[test]
    fn test_unknown_style_rejected() {
        let result = Cli::try_parse_from(["showreel", "scroll", "--style", "bar"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_tilt_accepts_negative_positions() {
        let cli = Cli::try_parse_from(["showreel", "tilt", "--x", "-10", "--y", "5"]).unwrap();
        let Command::Tilt(args) = cli.command else {
            panic!("expected tilt");
        };
        assert_eq!((args.x, args.y), (-10.0, 5.0));
    }
}
