//! Headless runner: sweeps progress from 0 to 1 and writes frames as PNG.

use clap::Parser;
use forestfall::prelude::*;
use forestfall::RunnerError;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "forestfall")]
#[command(about = "Render a scripted forest-to-city sweep to PNG frames", long_about = None)]
#[command(version)]
struct Cli {
    /// Scene configuration (JSON). Defaults are used when omitted.
    config: Option<PathBuf>,

    /// Frames in the sweep.
    #[arg(long, default_value_t = 240)]
    frames: u64,

    /// Write every Nth frame.
    #[arg(long, default_value_t = 24)]
    every: u64,

    /// Output directory.
    #[arg(long, default_value = "frames")]
    out: PathBuf,

    /// Simulation speed multiplier.
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Events fired once when the sweep reaches the given progress.
fn script(bounds: Bounds) -> Vec<(f32, Cue)> {
    let mid = Vec2::new(bounds.width * 0.5, bounds.height * 0.3);
    vec![
        (0.10, Cue::Trigger(Trigger::TreeClick(0))),
        (0.30, Cue::Trigger(Trigger::TreeClick(1))),
        (0.45, Cue::Mic(0.6)),
        (0.60, Cue::Trigger(Trigger::TreeFelled(2))),
        (0.70, Cue::Trigger(Trigger::KnockDown { at: mid, velocity: Vec2::new(3.0, 1.0) })),
        (0.80, Cue::Vehicle(Vehicle::new(Vec2::new(-60.0, bounds.ground_y), Vec2::new(2.5, 0.0)))),
        (0.95, Cue::Trigger(Trigger::Exhaust { at: Vec2::new(bounds.width * 0.8, bounds.ground_y - 40.0), count: 12 })),
    ]
}

enum Cue {
    Trigger(Trigger),
    Mic(f32),
    Vehicle(Vehicle),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(cli.verbose))).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Default filter for `-v` repeats. `RUST_LOG` still wins when set.
fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn run(cli: &Cli) -> Result<(), RunnerError> {
    if cli.frames < 2 {
        return Err(RunnerError::Usage("--frames must be at least 2".into()));
    }
    if cli.every == 0 {
        return Err(RunnerError::Usage("--every must be at least 1".into()));
    }

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    let bounds = config.bounds;
    fs::create_dir_all(&cli.out).map_err(forestfall::ExportError::from)?;

    let mut scene = Scene::new(config);
    scene.time_mut().set_fixed_delta(Some(1.0 / 60.0));
    scene.time_mut().set_time_scale(cli.speed);
    let mut canvas = SoftwareCanvas::new(bounds.width.round() as u32, bounds.height.round() as u32);
    let mut cues = script(bounds).into_iter().peekable();
    let last = (cli.frames - 1) as f32;
    let mut written = 0;
    let mut frame_time = 1.0 / 60.0;

    for i in 0..cli.frames {
        let progress = i as f32 / last;
        while let Some((_, cue)) = cues.next_if(|(at, _)| *at <= progress) {
            match cue {
                Cue::Trigger(t) => {
                    scene.trigger(t);
                }
                Cue::Mic(level) => scene.mic_response(level),
                Cue::Vehicle(v) => scene.set_vehicle(Some(v)),
            }
        }

        let started = Instant::now();
        scene.set_stage_progress(progress);
        scene.tick(frame_time);
        scene.render(&mut canvas);
        frame_time = started.elapsed().as_secs_f32();
        scene.observe_frame_time(frame_time * 1000.0);

        if i % cli.every == 0 || i + 1 == cli.frames {
            canvas.save_png(cli.out.join(format!("frame_{:05}.png", i)))?;
            written += 1;
        }
    }

    log::info!(
        "wrote {} frames to {} at {:.0} fps, final quality {:.2}, {} live bodies",
        written,
        cli.out.display(),
        scene.time().fps(),
        scene.quality().quality(),
        scene.live_count()
    );
    Ok(())
}
