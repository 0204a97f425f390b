//! Real-time tick loop: one `Simulation::tick` per display frame.

use std::time::Duration;

use hf_core::{HudSnapshot, LandmarkFrame, Simulation, TickReport};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use crate::inference::elapsed_ms;

#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    pub fps: u32,
    /// Stop after this long; `None` runs until Ctrl-C.
    pub duration: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub ticks: u64,
    pub frames_taken: u64,
    pub commits: Vec<(f64, hf_core::ShapeKind)>,
    pub timeouts: u64,
}

/// Drive `sim` at `config.fps` until the deadline or Ctrl-C.
///
/// The newest unseen frame in `frames` is submitted at the start of a tick;
/// the loop never waits for one to arrive.
pub async fn run_loop(
    sim: &mut Simulation,
    mut frames: watch::Receiver<Option<LandmarkFrame>>,
    origin: Instant,
    config: LoopConfig,
) -> RunSummary {
    let period = Duration::from_secs_f64(1.0 / f64::from(config.fps.max(1)));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let deadline = config.duration.map(|d| origin + d);
    let hud_every = u64::from(config.fps.max(1));
    let mut summary = RunSummary::default();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("interrupted");
                break;
            }
            _ = ticker.tick() => {
                let latest = {
                    let seen = frames.borrow_and_update();
                    if seen.has_changed() { seen.clone() } else { None }
                };
                if let Some(frame) = latest {
                    summary.frames_taken += 1;
                    sim.submit(frame);
                }

                let now_ms = elapsed_ms(origin);
                let report = sim.tick(now_ms);
                summary.ticks += 1;
                log_report(&report, now_ms, &mut summary);

                if summary.ticks % hud_every == 0 {
                    log_hud(&sim.snapshot());
                }
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    break;
                }
            }
        }
    }
    summary
}

fn log_report(report: &TickReport, now_ms: f64, summary: &mut RunSummary) {
    if let Some(shape) = report.committed {
        tracing::info!("{now_ms:.0}ms: shape -> {shape}");
        summary.commits.push((now_ms, shape));
    }
    if report.hand_lost {
        tracing::debug!("{now_ms:.0}ms: hand lost");
    }
    if report.timed_out {
        summary.timeouts += 1;
        tracing::debug!("{now_ms:.0}ms: hand timed out");
    }
}

fn log_hud(hud: &HudSnapshot) {
    tracing::debug!(
        "hud: fps={:.1} frame={:.2}ms hand={} shape={} stability={} explosions={}",
        hud.fps,
        hud.frame_ms,
        hud.hand.present,
        hud.shape.map_or("-", |s| s.name()),
        hud.stability,
        hud.explosions
    );
}
