#![deny(unsafe_code)]
//! Headless CLI for the algorithm gallery.
//!
//! Subcommands:
//! - `run <panel>`: drive a panel for N frames, optionally replaying an
//!   input script, and write the result as PNG or a JSON draw list
//! - `list`: print available panels
//! - `schema <panel>`: print a panel's parameter schema

mod error;
mod script;

use clap::{Parser, Subcommand};
use error::CliError;
use gallery_core::frame::{FrameLoop, ManualClock, Panel};
use gallery_core::{Frame, Seed, Surface};
use gallery_panels::pixel::Raster;
use gallery_panels::PanelKind;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "gallery", about = "Algorithm gallery CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a panel for N frames and write the last result.
    Run {
        /// Panel name (e.g. "quadtree"). Optional when --seed-file is given.
        panel: Option<String>,

        /// Surface width in CSS pixels.
        #[arg(short = 'W', long, default_value_t = 640)]
        width: usize,

        /// Surface height in CSS pixels.
        #[arg(short = 'H', long, default_value_t = 400)]
        height: usize,

        /// Number of frames to tick.
        #[arg(short, long, default_value_t = 60)]
        frames: usize,

        /// Simulated milliseconds between frames.
        #[arg(long, default_value_t = 1000.0 / 60.0)]
        frame_ms: f64,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Panel parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Replay a saved run; overrides panel, size, seed, params and frames.
        #[arg(long)]
        seed_file: Option<PathBuf>,

        /// Write the run's Seed as JSON for later replay.
        #[arg(long)]
        save_seed: Option<PathBuf>,

        /// JSON input script (`[{"frame": n, "event": {...}}]`).
        #[arg(long)]
        events: Option<PathBuf>,

        /// Output file; `.png` writes the rasterized surface, `.json` the
        /// last frame's draw commands.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,
    },
    /// List available panels.
    List,
    /// Print a panel's parameter schema as JSON.
    Schema {
        /// Panel name.
        panel: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Png,
    Json,
}

impl OutputFormat {
    fn from_path(path: &Path) -> Result<Self, CliError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("png") => Ok(OutputFormat::Png),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(OutputFormat::Json),
            _ => Err(CliError::Input(format!(
                "unsupported output '{}': expected .png or .json",
                path.display()
            ))),
        }
    }
}

/// Builds the Seed for a run, from a file or from the individual flags.
fn resolve_seed(
    panel: Option<String>,
    width: usize,
    height: usize,
    frames: usize,
    seed: u64,
    params: &str,
    seed_file: Option<&Path>,
) -> Result<Seed, CliError> {
    if let Some(path) = seed_file {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
        let seed: Seed = serde_json::from_str(&text)
            .map_err(|e| CliError::Input(format!("invalid seed file: {e}")))?;
        return Ok(seed);
    }
    let panel = panel.ok_or_else(|| CliError::Input("a panel name or --seed-file is required".into()))?;
    let params: serde_json::Value = serde_json::from_str(params)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    if !params.is_object() {
        return Err(CliError::Input("--params must be a JSON object".into()));
    }
    Ok(Seed::new(&panel, width, height, seed)
        .with_params(params)
        .with_frames(frames))
}

/// Ticks the panel described by `seed`, returning the last frame and, when
/// requested, the raster every frame was composited onto.
fn drive(
    seed: &Seed,
    frame_ms: f64,
    script: Vec<script::ScriptedEvent>,
    rasterize: bool,
) -> Result<(Frame, Option<Raster>), CliError> {
    let panel = PanelKind::from_seed(seed)?;
    let mut raster = if rasterize {
        Some(Raster::new(seed.width, seed.height)?)
    } else {
        None
    };
    let mut lp = FrameLoop::new(panel);
    lp.start();
    let mut clock = ManualClock::new(0.0);
    let mut script = script.into_iter().peekable();
    let mut last = None;

    for index in 0..seed.frames.max(1) as u64 {
        while let Some(scripted) = script.next_if(|e| e.frame <= index) {
            lp.dispatch(scripted.event);
        }
        if let Some(frame) = lp.tick_with(&clock)? {
            if let Some(r) = raster.as_mut() {
                r.draw(&frame)?;
            }
            last = Some(frame);
        }
        clock.advance(frame_ms);
    }
    let skipped = script.count();
    if skipped > 0 {
        log::warn!("{skipped} scripted events fall after the last frame and were ignored");
    }

    let last = last.ok_or_else(|| CliError::Input("panel produced no frames".into()))?;
    Ok((last, raster))
}

#[allow(clippy::too_many_arguments)]
fn run_panel(
    json: bool,
    panel: Option<String>,
    width: usize,
    height: usize,
    frames: usize,
    frame_ms: f64,
    seed: u64,
    params: String,
    seed_file: Option<PathBuf>,
    save_seed: Option<PathBuf>,
    events: Option<PathBuf>,
    output: PathBuf,
) -> Result<(), CliError> {
    if !(frame_ms.is_finite() && frame_ms >= 0.0) {
        return Err(CliError::Input("--frame-ms must be a non-negative number".into()));
    }
    let format = OutputFormat::from_path(&output)?;
    let seed = resolve_seed(panel, width, height, frames, seed, &params, seed_file.as_deref())?;
    let script = match events.as_deref() {
        Some(path) => script::load(path)?,
        None => Vec::new(),
    };
    let scripted = script.len();

    let (last, raster) = drive(&seed, frame_ms, script, format == OutputFormat::Png)?;

    match raster {
        Some(raster) => gallery_panels::snapshot::write_png(&raster, &output)?,
        None => std::fs::write(&output, serde_json::to_string_pretty(&last)?)?,
    }
    if let Some(path) = save_seed.as_deref() {
        std::fs::write(path, serde_json::to_string_pretty(&seed)?)?;
    }

    if json {
        let info = serde_json::json!({
            "panel": seed.panel,
            "width": seed.width,
            "height": seed.height,
            "frames": seed.frames.max(1),
            "seed": seed.seed,
            "events": scripted,
            "commands": last.len(),
            "output": output.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        eprintln!(
            "ran {} ({}x{}, {} frames, seed {}) -> {}",
            seed.panel,
            seed.width,
            seed.height,
            seed.frames.max(1),
            seed.seed,
            output.display()
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let panels = PanelKind::list_panels();
            if cli.json {
                let info = serde_json::json!({ "panels": panels });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Panels:");
                for name in panels {
                    println!("  {name}");
                }
            }
        }
        Command::Schema { panel } => {
            let surface = Surface::css(640.0, 400.0)?;
            let built = PanelKind::from_name(&panel, surface, 0, &serde_json::json!({}))?;
            let info = serde_json::json!({
                "panel": built.name(),
                "params": built.params(),
                "schema": built.param_schema(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::Run {
            panel,
            width,
            height,
            frames,
            frame_ms,
            seed,
            params,
            seed_file,
            save_seed,
            events,
            output,
        } => run_panel(
            cli.json, panel, width, height, frames, frame_ms, seed, params, seed_file, save_seed,
            events, output,
        )?,
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
