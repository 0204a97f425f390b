//! Asynchronous hand-pose inference driver.
//!
//! The estimator runs on the blocking pool, one request at a time. Results
//! land in a `watch` channel that holds only the latest frame; the tick loop
//! picks it up whenever it likes and never waits on inference.
//!
//! A request still in flight after the watchdog timeout gets the estimator
//! torn down and rebuilt; whatever the abandoned request eventually returns
//! is discarded by generation. A resource-class failure stops the pipeline
//! for good and publishes an empty frame so the simulation idles hand-absent.

use std::fmt;
use std::time::Duration;

use hf_core::{Digits, Landmark, LandmarkFrame, synthetic_hand};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

#[derive(Debug, Clone, PartialEq)]
pub enum EstimatorError {
    /// The call failed; the estimator stays usable.
    Failed(String),
    /// Out of memory or similar; the pipeline cannot continue.
    ResourceExhausted(String),
}

impl fmt::Display for EstimatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimatorError::Failed(msg) => write!(f, "estimation failed: {msg}"),
            EstimatorError::ResourceExhausted(msg) => write!(f, "estimator out of resources: {msg}"),
        }
    }
}

impl std::error::Error for EstimatorError {}

/// Produces zero or one hand for the frame captured at `timestamp_ms`.
///
/// Implementations may block; they are only ever called from the blocking pool.
pub trait HandEstimator: Send + 'static {
    fn estimate(&mut self, timestamp_ms: f64) -> Result<Option<Vec<Landmark>>, EstimatorError>;
}

/// Plays a recording back against the driver clock.
pub struct ReplayEstimator {
    frames: Vec<LandmarkFrame>,
    base_ms: f64,
    period_ms: Option<f64>,
}

impl ReplayEstimator {
    /// `looping` wraps the clock around the recording's length.
    pub fn new(frames: Vec<LandmarkFrame>, looping: bool) -> Self {
        let base_ms = frames.first().map_or(0.0, |f| f.timestamp_ms);
        let span = frames.last().map_or(0.0, |f| f.timestamp_ms - base_ms);
        let step = frames
            .windows(2)
            .map(|w| w[1].timestamp_ms - w[0].timestamp_ms)
            .find(|d| *d > 0.0)
            .unwrap_or(33.0);
        let period_ms = (looping && !frames.is_empty()).then_some(span + step);
        Self {
            frames,
            base_ms,
            period_ms,
        }
    }

    /// Landmarks of the latest recorded frame at or before `elapsed_ms`.
    pub fn frame_at(&self, elapsed_ms: f64) -> Option<&LandmarkFrame> {
        let t = match self.period_ms {
            Some(period) if period > 0.0 => elapsed_ms.rem_euclid(period),
            _ => elapsed_ms,
        };
        let idx = self
            .frames
            .partition_point(|f| f.timestamp_ms - self.base_ms <= t);
        idx.checked_sub(1).map(|i| &self.frames[i])
    }
}

impl HandEstimator for ReplayEstimator {
    fn estimate(&mut self, timestamp_ms: f64) -> Result<Option<Vec<Landmark>>, EstimatorError> {
        let Some(frame) = self.frame_at(timestamp_ms) else {
            return Ok(None);
        };
        match (&frame.landmarks, frame.valid_landmarks()) {
            (None, _) => Ok(None),
            (Some(_), Some(valid)) => Ok(Some(valid.to_vec())),
            (Some(raw), None) => Err(EstimatorError::Failed(format!(
                "malformed frame at {}ms ({} landmarks)",
                frame.timestamp_ms,
                raw.len()
            ))),
        }
    }
}

/// Gesture sequence the scripted estimator cycles through.
pub const SCRIPT: [Digits; 5] = [
    Digits::OPEN,
    Digits::VICTORY,
    Digits::POINT,
    Digits::THUMB_UP,
    Digits::FIST,
];

/// Synthetic hand that walks through [`SCRIPT`], drifting sideways, with a
/// short no-hand gap between gestures.
pub struct ScriptedEstimator {
    hold_ms: f64,
    gap_ms: f64,
    latency: Duration,
    call_budget: Option<u64>,
    calls: u64,
}

impl ScriptedEstimator {
    pub fn new(hold_ms: f64, gap_ms: f64) -> Self {
        Self {
            hold_ms,
            gap_ms,
            latency: Duration::ZERO,
            call_budget: None,
            calls: 0,
        }
    }

    /// Sleep this long inside every call, like a real model would.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Report the backend as out of resources once `calls` requests have
    /// been served.
    pub fn with_call_budget(mut self, calls: Option<u64>) -> Self {
        self.call_budget = calls;
        self
    }

    pub fn pose_at(&self, t_ms: f64) -> Option<Vec<Landmark>> {
        let segment = self.hold_ms + self.gap_ms;
        if !(segment > 0.0) || t_ms < 0.0 {
            return None;
        }
        let n = (t_ms / segment).floor() as usize;
        if t_ms - n as f64 * segment >= self.hold_ms {
            return None;
        }
        let digits = SCRIPT[n % SCRIPT.len()];
        let cx = 0.5 + 0.12 * (t_ms as f32 / 700.0).sin();
        let cy = 0.75 + 0.04 * (t_ms as f32 / 450.0).cos();
        Some(synthetic_hand(digits, cx, cy))
    }

    /// Sample the script into a recording at `fps` for `duration_ms`.
    pub fn record(&self, duration_ms: f64, fps: f64) -> Vec<LandmarkFrame> {
        let step = 1000.0 / fps.max(1.0);
        let frames = (duration_ms / step).floor() as usize + 1;
        (0..frames)
            .map(|i| {
                let t = i as f64 * step;
                LandmarkFrame {
                    timestamp_ms: t,
                    landmarks: self.pose_at(t),
                }
            })
            .collect()
    }
}

impl Default for ScriptedEstimator {
    fn default() -> Self {
        Self::new(1500.0, 250.0)
    }
}

impl HandEstimator for ScriptedEstimator {
    fn estimate(&mut self, timestamp_ms: f64) -> Result<Option<Vec<Landmark>>, EstimatorError> {
        if self.call_budget.is_some_and(|budget| self.calls >= budget) {
            return Err(EstimatorError::ResourceExhausted(format!(
                "call budget of {} exhausted",
                self.calls
            )));
        }
        self.calls += 1;
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        Ok(self.pose_at(timestamp_ms))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    /// How often a new request is attempted.
    pub interval: Duration,
    /// In-flight time after which the estimator is rebuilt.
    pub timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(33),
            timeout: Duration::from_millis(hf_core::INFERENCE_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub requests: u64,
    pub completed: u64,
    pub failures: u64,
    pub restarts: u64,
    pub discarded: u64,
    pub fatal: bool,
}

struct Completion<E> {
    generation: u64,
    timestamp_ms: f64,
    estimator: E,
    result: Result<Option<Vec<Landmark>>, EstimatorError>,
}

/// Running driver: the latest-frame mailbox plus the task itself.
pub struct InferenceHandle {
    pub frames: watch::Receiver<Option<LandmarkFrame>>,
    pub task: JoinHandle<DriverStats>,
}

/// Milliseconds since `origin`; the clock shared by driver and tick loop.
pub fn elapsed_ms(origin: Instant) -> f64 {
    origin.elapsed().as_secs_f64() * 1000.0
}

/// Spawn the driver. `factory` builds the estimator and is called again on
/// every watchdog restart. The task ends when every frame receiver is
/// dropped or the pipeline fails fatally.
pub fn spawn<F, E>(factory: F, config: DriverConfig, origin: Instant) -> InferenceHandle
where
    F: FnMut() -> Result<E, EstimatorError> + Send + 'static,
    E: HandEstimator,
{
    let (tx, frames) = watch::channel(None);
    let task = tokio::spawn(drive(factory, config, origin, tx));
    InferenceHandle { frames, task }
}

async fn drive<F, E>(
    mut factory: F,
    config: DriverConfig,
    origin: Instant,
    tx: watch::Sender<Option<LandmarkFrame>>,
) -> DriverStats
where
    F: FnMut() -> Result<E, EstimatorError> + Send + 'static,
    E: HandEstimator,
{
    let mut stats = DriverStats::default();
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion<E>>();
    let mut generation: u64 = 0;
    let mut busy_since: Option<Instant> = None;

    let mut idle = match factory() {
        Ok(estimator) => Some(estimator),
        Err(e) => {
            tear_down(&tx, &mut stats, elapsed_ms(origin), &e);
            return stats;
        }
    };

    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tx.closed() => {
                tracing::debug!("frame receiver gone, stopping inference");
                break;
            }
            Some(done) = done_rx.recv() => {
                if done.generation != generation {
                    stats.discarded += 1;
                    tracing::debug!("discarding result from abandoned request (generation {})", done.generation);
                    continue;
                }
                busy_since = None;
                match done.result {
                    Ok(landmarks) => {
                        stats.completed += 1;
                        tx.send_replace(Some(LandmarkFrame {
                            timestamp_ms: done.timestamp_ms,
                            landmarks,
                        }));
                        idle = Some(done.estimator);
                    }
                    Err(EstimatorError::Failed(msg)) => {
                        stats.failures += 1;
                        tracing::warn!("inference call failed: {msg}");
                        idle = Some(done.estimator);
                    }
                    Err(e @ EstimatorError::ResourceExhausted(_)) => {
                        tear_down(&tx, &mut stats, done.timestamp_ms, &e);
                        break;
                    }
                }
            }
            _ = ticker.tick() => {
                if let Some(since) = busy_since {
                    if since.elapsed() <= config.timeout {
                        continue;
                    }
                    tracing::warn!(
                        "inference busy for more than {:?}, restarting estimator",
                        config.timeout
                    );
                    generation += 1;
                    busy_since = None;
                    stats.restarts += 1;
                    match factory() {
                        Ok(estimator) => idle = Some(estimator),
                        Err(e) => {
                            tear_down(&tx, &mut stats, elapsed_ms(origin), &e);
                            break;
                        }
                    }
                }
                let Some(mut estimator) = idle.take() else {
                    continue;
                };
                let timestamp_ms = elapsed_ms(origin);
                let request_generation = generation;
                let done_tx = done_tx.clone();
                busy_since = Some(Instant::now());
                stats.requests += 1;
                tokio::task::spawn_blocking(move || {
                    let result = estimator.estimate(timestamp_ms);
                    let _ = done_tx.send(Completion {
                        generation: request_generation,
                        timestamp_ms,
                        estimator,
                        result,
                    });
                });
            }
        }
    }
    stats
}

fn tear_down(
    tx: &watch::Sender<Option<LandmarkFrame>>,
    stats: &mut DriverStats,
    timestamp_ms: f64,
    err: &EstimatorError,
) {
    tracing::error!("inference pipeline stopped: {err}");
    stats.fatal = true;
    tx.send_replace(Some(LandmarkFrame::empty(timestamp_ms)));
}
