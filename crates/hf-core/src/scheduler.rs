//! The per-tick orchestrator.
//!
//! `Simulation` owns every piece of mutable state. Pose results arrive through
//! a single-slot mailbox (`submit`, latest wins) and are folded in at the start
//! of the next `tick`; a tick never waits for one.

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::color::ColorCycler;
use crate::config::{ConfigError, SimConfig};
use crate::gesture::{ShapeKind, classify};
use crate::hand::HandPose;
use crate::landmarks::LandmarkFrame;
use crate::occlusion::OcclusionPass;
use crate::particles::ParticleField;
use crate::physics::PhysicsEngine;
use crate::pose::normalize;
use crate::scene::SceneTransform;
use crate::shapes::fill_targets;
use crate::smoother::PoseSmoother;
use crate::snapshot::{FrameTimer, HudSnapshot};
use crate::stabilizer::GestureStabilizer;

/// What happened during one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// A pose result was taken from the mailbox
    pub frame_applied: bool,
    /// Shape committed this tick
    pub committed: Option<ShapeKind>,
    /// Raw label of the applied frame
    pub raw_label: Option<ShapeKind>,
    /// The pose source reported no hand after one was present
    pub hand_lost: bool,
    /// The staleness timeout fired
    pub timed_out: bool,
    pub colors_dirty: bool,
}

pub struct Simulation {
    config: SimConfig,
    field: ParticleField,
    hand: HandPose,
    smoother: PoseSmoother,
    stabilizer: GestureStabilizer,
    physics: PhysicsEngine,
    occlusion: OcclusionPass,
    colors: ColorCycler,
    scene: SceneTransform,
    timer: FrameTimer,
    rng: SmallRng,
    pending: Option<LandmarkFrame>,
    last_frame_ms: Option<f64>,
}

impl Simulation {
    /// Build a simulation; the particle count is fixed here for its lifetime.
    /// Particles start at rest on the idle sphere, with no committed shape.
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let count = config.resolved_particle_count();
        let mut rng = SmallRng::seed_from_u64(seed);

        let mut field = ParticleField::new(count);
        fill_targets(ShapeKind::Sphere, &mut field.target, &config.shapes, &mut rng);
        field.snap_to_targets();

        let mut colors = ColorCycler::new(config.color.clone());
        colors.retarget(&mut field, None, 0.0);

        Ok(Self {
            smoother: PoseSmoother::new(config.smoothing.clone()),
            stabilizer: GestureStabilizer::new(
                config.gesture.stability_window,
                config.gesture.history_len,
            ),
            physics: PhysicsEngine::new(config.physics.clone()),
            occlusion: OcclusionPass::new(config.occlusion.clone()),
            scene: SceneTransform::new(config.scene.clone()),
            colors,
            field,
            hand: HandPose::absent(),
            timer: FrameTimer::new(),
            rng,
            pending: None,
            last_frame_ms: None,
            config,
        })
    }

    /// Deliver a pose result. Replaces any result not yet consumed.
    pub fn submit(&mut self, frame: LandmarkFrame) {
        self.pending = Some(frame);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Advance one render frame at monotonic time `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> TickReport {
        let mut report = TickReport::default();

        if let Some(frame) = self.pending.take() {
            self.apply_frame(&frame, now_ms, &mut report);
        }

        if self.hand.is_stale(now_ms, self.config.hand_timeout_ms) {
            self.drop_hand();
            self.scene.stop_follow();
            report.timed_out = true;
        }

        self.colors.update(&mut self.field, now_ms);
        self.physics
            .step(&mut self.field, &self.hand, now_ms, &mut self.rng);
        report.colors_dirty = self.occlusion.apply(&mut self.field, &self.hand);
        self.timer.tick(now_ms);
        self.scene.update(&self.hand, now_ms);

        report
    }

    fn apply_frame(&mut self, frame: &LandmarkFrame, now_ms: f64, report: &mut TickReport) {
        // Results that complete out of order are stale on arrival
        if self.last_frame_ms.is_some_and(|last| frame.timestamp_ms < last) {
            return;
        }
        self.last_frame_ms = Some(frame.timestamp_ms);
        report.frame_applied = true;

        let Some(landmarks) = frame.valid_landmarks() else {
            report.hand_lost = self.hand.present;
            self.drop_hand();
            return;
        };

        let raw = normalize(landmarks, &self.config.world);
        self.smoother.update(&mut self.hand, &raw, now_ms);

        let label = classify(landmarks);
        report.raw_label = label;
        if let Some(shape) = self.stabilizer.push(label) {
            self.commit(shape, now_ms);
            report.committed = Some(shape);
        }
    }

    fn drop_hand(&mut self) {
        self.smoother.reset(&mut self.hand);
        self.stabilizer.clear_history();
    }

    fn commit(&mut self, shape: ShapeKind, now_ms: f64) {
        fill_targets(shape, &mut self.field.target, &self.config.shapes, &mut self.rng);
        self.physics.trigger_explosion(now_ms);
        self.colors.retarget(&mut self.field, Some(shape), now_ms);
    }

    /// Switch shape directly, bypassing gesture debounce (keyboard/menu input).
    /// Re-selecting the current shape is a no-op.
    pub fn select_shape(&mut self, shape: ShapeKind, now_ms: f64) -> bool {
        if self.stabilizer.committed() == Some(shape) {
            return false;
        }
        self.stabilizer.force(shape);
        self.commit(shape, now_ms);
        true
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// Renderer access, e.g. to take the color dirty flag after upload.
    pub fn field_mut(&mut self) -> &mut ParticleField {
        &mut self.field
    }

    pub fn hand(&self) -> &HandPose {
        &self.hand
    }

    pub fn shape(&self) -> Option<ShapeKind> {
        self.stabilizer.committed()
    }

    pub fn stabilizer(&self) -> &GestureStabilizer {
        &self.stabilizer
    }

    pub fn scene(&self) -> &SceneTransform {
        &self.scene
    }

    pub fn explosions(&self) -> u64 {
        self.physics.explosions()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn snapshot(&self) -> HudSnapshot {
        HudSnapshot {
            hand: self.hand.view(),
            shape: self.shape(),
            stability: self.stabilizer.stability_count(),
            particle_count: self.field.len(),
            frame_ms: self.timer.avg_frame_ms(),
            fps: self.timer.fps(),
            ticks: self.timer.ticks(),
            explosions: self.physics.explosions(),
            dynamic_radius: self.physics.dynamic_radius(),
            scene: self.scene.view(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Digits, synthetic_hand};

    fn sim() -> Simulation {
        let cfg = SimConfig {
            particle_count: Some(200),
            ..SimConfig::default()
        };
        Simulation::new(cfg, 7).unwrap()
    }

    fn frame(d: Digits, t: f64) -> LandmarkFrame {
        LandmarkFrame::hand(t, synthetic_hand(d, 0.5, 0.8))
    }

    #[test]
    fn test_rejects_invalid_config() {
        let cfg = SimConfig {
            particle_count: Some(0),
            ..SimConfig::default()
        };
        assert!(Simulation::new(cfg, 1).is_err());
    }

    #[test]
    fn test_mailbox_keeps_latest() {
        let mut sim = sim();
        sim.submit(frame(Digits::FIST, 0.0));
        sim.submit(frame(Digits::OPEN, 1.0));
        let report = sim.tick(16.0);
        assert!(report.frame_applied);
        assert_eq!(report.raw_label, Some(ShapeKind::Sphere));
        assert!(!sim.has_pending());

        // No new result: the tick still runs, nothing is applied
        let report = sim.tick(32.0);
        assert!(!report.frame_applied);
    }

    #[test]
    fn test_out_of_order_result_dropped() {
        let mut sim = sim();
        sim.submit(frame(Digits::OPEN, 100.0));
        sim.tick(110.0);
        sim.submit(frame(Digits::FIST, 50.0));
        assert!(!sim.tick(120.0).frame_applied);
    }

    #[test]
    fn test_empty_frame_drops_hand_and_history() {
        let mut sim = sim();
        sim.submit(frame(Digits::OPEN, 0.0));
        sim.tick(0.0);
        sim.submit(frame(Digits::OPEN, 16.0));
        sim.tick(16.0);
        assert!(sim.hand().present);
        assert_eq!(sim.stabilizer().len(), 2);

        sim.submit(LandmarkFrame::empty(32.0));
        let report = sim.tick(32.0);
        assert!(report.hand_lost);
        assert!(!sim.hand().present);
        assert!(sim.stabilizer().is_empty());
        assert_eq!(sim.shape(), None);
    }

    #[test]
    fn test_select_shape() {
        let mut sim = sim();
        assert!(sim.select_shape(ShapeKind::Heart, 0.0));
        assert!(!sim.select_shape(ShapeKind::Heart, 10.0));
        assert_eq!(sim.shape(), Some(ShapeKind::Heart));
        assert_eq!(sim.explosions(), 1);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut sim = sim();
        for i in 0..4 {
            sim.submit(frame(Digits::POINT, i as f64 * 16.0));
            sim.tick(i as f64 * 16.0);
        }
        let snap = sim.snapshot();
        assert_eq!(snap.shape, Some(ShapeKind::Star));
        assert_eq!(snap.stability, 4);
        assert_eq!(snap.particle_count, 200);
        assert_eq!(snap.ticks, 4);
        assert!(snap.hand.present);
        assert!((snap.frame_ms - 16.0).abs() < 1e-9);
    }
}
