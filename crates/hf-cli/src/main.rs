mod inference;
mod run;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hf_core::{
    GestureStabilizer, PerformanceTier, ShapeKind, SimConfig, Simulation, classify, generate,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde_json::json;
use tokio::time::Instant;

use crate::inference::{DriverConfig, ReplayEstimator, ScriptedEstimator};
use crate::run::LoopConfig;

#[derive(Parser)]
#[command(name = "hf", about = "Gesture-driven particle field engine")]
struct Cli {
    /// Config file (default: $HF_CONFIG, then $HF_DATA_DIR/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation in real time and print the final HUD snapshot
    Run {
        /// Replay a JSONL landmark recording instead of the scripted hand
        #[arg(long)]
        recording: Option<PathBuf>,

        /// Loop the recording
        #[arg(long = "loop")]
        looping: bool,

        /// Seconds to run (default: until Ctrl-C)
        #[arg(long)]
        duration: Option<f64>,

        /// Simulation ticks per second
        #[arg(long, default_value_t = 60)]
        fps: u32,

        /// Inference requests per second
        #[arg(long, default_value_t = 30)]
        infer_hz: u32,

        /// Artificial per-call latency of the scripted estimator, in ms
        #[arg(long, default_value_t = 0)]
        latency_ms: u64,

        /// Scripted estimator runs out of resources after this many calls
        #[arg(long)]
        call_budget: Option<u64>,

        /// RNG seed (default: random)
        #[arg(long)]
        seed: Option<u64>,

        /// Particle count, overriding the config
        #[arg(long)]
        particles: Option<usize>,

        /// Performance tier: low, medium, high
        #[arg(long, value_parser = parse_tier)]
        tier: Option<PerformanceTier>,
    },

    /// Print raw and stabilized gesture labels for a recording
    Classify {
        /// JSONL landmark recording
        recording: PathBuf,
    },

    /// Generate target points for a shape as JSON
    Shape {
        /// sphere, ring, star, heart or text
        kind: ShapeKind,

        #[arg(long, default_value_t = 2000)]
        count: usize,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Write a synthetic landmark recording cycling through every gesture
    Demo {
        /// Output JSONL path
        out: PathBuf,

        #[arg(long, default_value_t = 10.0)]
        seconds: f64,

        #[arg(long, default_value_t = 30.0)]
        fps: f64,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn parse_tier(s: &str) -> std::result::Result<PerformanceTier, String> {
    match s.to_ascii_lowercase().as_str() {
        "low" => Ok(PerformanceTier::Low),
        "medium" => Ok(PerformanceTier::Medium),
        "high" => Ok(PerformanceTier::High),
        other => Err(format!("unknown tier '{other}' (expected low, medium or high)")),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<SimConfig> {
    let (config, source) =
        hf_store::load_config(cli.config.as_deref()).context("failed to load config")?;
    tracing::debug!("config source: {source}");
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Run {
            recording,
            looping,
            duration,
            fps,
            infer_hz,
            latency_ms,
            call_budget,
            seed,
            particles,
            tier,
        } => {
            let mut config = load_config(&cli)?;
            if let Some(t) = tier {
                config.tier = *t;
            }
            if let Some(n) = particles {
                config.particle_count = Some(*n);
            }
            let opts = RunOpts {
                recording: recording.as_deref(),
                looping: *looping,
                duration: *duration,
                fps: *fps,
                infer_hz: *infer_hz,
                latency: Duration::from_millis(*latency_ms),
                call_budget: *call_budget,
                seed: seed.unwrap_or_else(rand::random),
            };
            cmd_run(config, opts).await
        }
        Commands::Classify { recording } => cmd_classify(&cli, recording),
        Commands::Shape {
            kind,
            count,
            seed,
            out,
        } => cmd_shape(&cli, *kind, *count, *seed, out.as_deref()),
        Commands::Demo { out, seconds, fps } => cmd_demo(out, *seconds, *fps),
        Commands::Config => cmd_config(&cli),
    }
}

struct RunOpts<'a> {
    recording: Option<&'a Path>,
    looping: bool,
    duration: Option<f64>,
    fps: u32,
    infer_hz: u32,
    latency: Duration,
    call_budget: Option<u64>,
    seed: u64,
}

async fn cmd_run(config: SimConfig, opts: RunOpts<'_>) -> Result<()> {
    anyhow::ensure!(opts.fps > 0, "--fps must be positive");
    anyhow::ensure!(opts.infer_hz > 0, "--infer-hz must be positive");
    let duration = opts
        .duration
        .map(Duration::try_from_secs_f64)
        .transpose()
        .context("--duration must be a finite, non-negative number of seconds")?;

    let mut sim = Simulation::new(config, opts.seed).context("invalid configuration")?;
    tracing::info!(
        "running {} particles, seed {}",
        sim.field().len(),
        opts.seed
    );

    let driver_config = DriverConfig {
        interval: Duration::from_secs_f64(1.0 / f64::from(opts.infer_hz)),
        ..DriverConfig::default()
    };
    let origin = Instant::now();
    let driver = match opts.recording {
        Some(path) => {
            let frames = hf_store::read_recording(path)
                .with_context(|| format!("failed to load recording {}", path.display()))?;
            tracing::info!("replaying {} frames from {}", frames.len(), path.display());
            let looping = opts.looping;
            inference::spawn(
                move || Ok(ReplayEstimator::new(frames.clone(), looping)),
                driver_config,
                origin,
            )
        }
        None => {
            let (latency, budget) = (opts.latency, opts.call_budget);
            inference::spawn(
                move || {
                    Ok(ScriptedEstimator::default()
                        .with_latency(latency)
                        .with_call_budget(budget))
                },
                driver_config,
                origin,
            )
        }
    };

    let summary = run::run_loop(
        &mut sim,
        driver.frames,
        origin,
        LoopConfig {
            fps: opts.fps,
            duration,
        },
    )
    .await;
    let stats = driver.task.await.context("inference task failed")?;
    if stats.fatal {
        tracing::warn!("inference pipeline stopped early; field idled without a hand");
    }

    let commits: Vec<_> = summary
        .commits
        .iter()
        .map(|(t, shape)| json!({ "atMs": t, "shape": shape }))
        .collect();
    let output = json!({
        "snapshot": sim.snapshot(),
        "commits": commits,
        "framesTaken": summary.frames_taken,
        "timeouts": summary.timeouts,
        "inference": {
            "requests": stats.requests,
            "completed": stats.completed,
            "failures": stats.failures,
            "restarts": stats.restarts,
            "discarded": stats.discarded,
            "fatal": stats.fatal,
        },
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_classify(cli: &Cli, recording: &Path) -> Result<()> {
    let config = load_config(cli)?;
    let frames = hf_store::read_recording(recording)
        .with_context(|| format!("failed to load recording {}", recording.display()))?;
    let mut stabilizer =
        GestureStabilizer::new(config.gesture.stability_window, config.gesture.history_len);

    let mut with_hand = 0usize;
    let mut commits = 0usize;
    for frame in &frames {
        let (raw, committed) = match frame.valid_landmarks() {
            Some(landmarks) => {
                with_hand += 1;
                let label = classify(landmarks);
                let raw = label.map_or("none", |s| s.name());
                (raw, stabilizer.push(label))
            }
            None => {
                stabilizer.clear_history();
                ("no-hand", None)
            }
        };
        match committed {
            Some(shape) => {
                commits += 1;
                println!("{:>10.1}  {raw:<8} -> {shape}", frame.timestamp_ms);
            }
            None => println!("{:>10.1}  {raw}", frame.timestamp_ms),
        }
    }
    println!(
        "frames: {}  with hand: {with_hand}  commits: {commits}",
        frames.len()
    );
    Ok(())
}

fn cmd_shape(
    cli: &Cli,
    kind: ShapeKind,
    count: usize,
    seed: u64,
    out: Option<&Path>,
) -> Result<()> {
    let config = load_config(cli)?;
    let mut rng = SmallRng::seed_from_u64(seed);
    let points: Vec<[f32; 3]> = generate(kind, count, &config.shapes, &mut rng)
        .into_iter()
        .map(|p| p.to_array())
        .collect();
    let body = serde_json::to_string(&json!({
        "shape": kind,
        "count": points.len(),
        "points": points,
    }))?;

    match out {
        Some(path) => {
            std::fs::write(path, body)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("wrote {} {kind} points to {}", points.len(), path.display());
        }
        None => println!("{body}"),
    }
    Ok(())
}

fn cmd_demo(out: &Path, seconds: f64, fps: f64) -> Result<()> {
    anyhow::ensure!(seconds > 0.0 && fps > 0.0, "seconds and fps must be positive");
    let frames = ScriptedEstimator::default().record(seconds * 1000.0, fps);
    hf_store::write_recording(out, &frames)
        .with_context(|| format!("failed to write {}", out.display()))?;
    println!("wrote {} frames to {}", frames.len(), out.display());
    Ok(())
}

fn cmd_config(cli: &Cli) -> Result<()> {
    let (config, source) =
        hf_store::load_config(cli.config.as_deref()).context("failed to load config")?;
    let text = hf_store::render_config(&config)?;
    println!("# source: {source}");
    print!("{text}");
    Ok(())
}
