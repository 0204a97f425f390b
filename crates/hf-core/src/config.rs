//! Startup configuration surface.
//!
//! Every field has a default, so a partial TOML file (or none) is valid.
//! `validate` is the single gate: `Simulation::new` refuses anything it rejects.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Upper bound on font pixels per bitmap pixel; the raster grows with its square.
pub const MAX_TEXT_RASTER_SCALE: usize = 16;

/// Device class used to pick the particle count when none is given explicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTier {
    Low,
    #[default]
    Medium,
    High,
}

impl PerformanceTier {
    pub fn particle_count(self) -> usize {
        match self {
            PerformanceTier::Low => 4_000,
            PerformanceTier::Medium => 8_000,
            PerformanceTier::High => 15_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World-space width spanned by the normalized x axis
    pub width: f32,
    /// World-space height spanned by the normalized y axis
    pub height: f32,
    /// Multiplier for landmark z; negative so that closer-to-camera maps to +z
    pub depth_scale: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 8.0,
            height: 6.0,
            depth_scale: -4.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub centroid_alpha: f32,
    pub radius_alpha: f32,
    /// Smoothed centroid moves shorter than this are discarded
    pub dead_zone: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            centroid_alpha: 0.35,
            radius_alpha: 0.25,
            dead_zone: 0.004,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Identical consecutive labels required to commit (K)
    pub stability_window: usize,
    pub history_len: usize,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            stability_window: 3,
            history_len: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub return_speed: f32,
    pub damping: f32,
    pub explosion_force: f32,
    pub explosion_ms: f64,
    pub depth_push_strength: f32,
    /// Peak pull inside the inner tier
    pub inner_strength: f32,
    /// Peak pull of the middle tier
    pub middle_strength: f32,
    /// Peak pull of the outer tier
    pub outer_strength: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Per-tick blend toward the target dynamic radius
    pub radius_smoothing: f32,
    /// Palm length to force-field radius
    pub palm_scale: f32,
    /// Weight of the palm estimate against the landmark-spread radius
    pub palm_weight: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            return_speed: 0.035,
            damping: 0.92,
            explosion_force: 0.25,
            explosion_ms: 300.0,
            depth_push_strength: 0.02,
            inner_strength: 0.05,
            middle_strength: 0.02,
            outer_strength: 0.006,
            min_radius: 0.4,
            max_radius: 3.5,
            radius_smoothing: 0.15,
            palm_scale: 1.8,
            palm_weight: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcclusionConfig {
    pub max_fade: f32,
    /// Factor changes at or below this do not mark the color buffer dirty
    pub epsilon: f32,
}

impl Default for OcclusionConfig {
    fn default() -> Self {
        Self {
            max_fade: 0.85,
            epsilon: 0.002,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    pub sphere_radius: f32,
    pub ring_major: f32,
    pub ring_minor: f32,
    pub star_radius: f32,
    pub star_points: u32,
    pub heart_scale: f32,
    pub text: String,
    /// World size of one text bitmap pixel
    pub text_pixel: f32,
    /// Font pixels per bitmap pixel
    pub text_raster_scale: usize,
    /// Half-range of the random z jitter on flat shapes
    pub depth_jitter: f32,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            sphere_radius: 2.0,
            ring_major: 2.0,
            ring_minor: 0.45,
            star_radius: 1.4,
            star_points: 5,
            heart_scale: 0.13,
            text: "HELLO".to_string(),
            text_pixel: 0.035,
            text_raster_scale: 3,
            depth_jitter: 0.15,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub cycle: bool,
    pub cycle_period_ms: f64,
    /// Hue advance per cycle step, in turns
    pub hue_step: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            cycle: true,
            cycle_period_ms: 4_000.0,
            hue_step: 0.08,
            saturation: 0.75,
            lightness: 0.6,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Idle rotation about y, radians per tick
    pub idle_spin: f32,
    pub breathe_amplitude: f32,
    pub breathe_period_ms: f64,
    /// Fraction of the hand centroid the mesh follows
    pub follow_gain: f32,
    pub follow_stiffness: f32,
    pub follow_damping: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            idle_spin: 0.003,
            breathe_amplitude: 0.03,
            breathe_period_ms: 5_000.0,
            follow_gain: 0.15,
            follow_stiffness: 0.08,
            follow_damping: 0.85,
        }
    }
}

/// Full simulation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub tier: PerformanceTier,
    /// Explicit particle count; overrides `tier`
    pub particle_count: Option<usize>,
    pub particle_size: f32,
    pub hand_timeout_ms: f64,
    pub world: WorldConfig,
    pub smoothing: SmoothingConfig,
    pub gesture: GestureConfig,
    pub physics: PhysicsConfig,
    pub occlusion: OcclusionConfig,
    pub shapes: ShapeConfig,
    pub color: ColorConfig,
    pub scene: SceneConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tier: PerformanceTier::default(),
            particle_count: None,
            particle_size: 0.05,
            hand_timeout_ms: 800.0,
            world: WorldConfig::default(),
            smoothing: SmoothingConfig::default(),
            gesture: GestureConfig::default(),
            physics: PhysicsConfig::default(),
            occlusion: OcclusionConfig::default(),
            shapes: ShapeConfig::default(),
            color: ColorConfig::default(),
            scene: SceneConfig::default(),
        }
    }
}

impl SimConfig {
    /// Particle count fixed at startup.
    pub fn resolved_particle_count(&self) -> usize {
        self.particle_count
            .unwrap_or_else(|| self.tier.particle_count())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check_finite()?;
        if self.resolved_particle_count() == 0 {
            return Err(ConfigError::invalid("particle_count", "must be positive"));
        }
        if !(self.particle_size > 0.0) {
            return Err(ConfigError::invalid("particle_size", "must be positive"));
        }
        if !(self.hand_timeout_ms > 0.0) {
            return Err(ConfigError::invalid("hand_timeout_ms", "must be positive"));
        }
        unit_open("physics.damping", self.physics.damping)?;
        unit_half_open("smoothing.centroid_alpha", self.smoothing.centroid_alpha)?;
        unit_half_open("smoothing.radius_alpha", self.smoothing.radius_alpha)?;
        unit_half_open("physics.radius_smoothing", self.physics.radius_smoothing)?;
        if !(0.0..1.0).contains(&self.occlusion.max_fade) {
            return Err(ConfigError::invalid("occlusion.max_fade", "must lie in [0, 1)"));
        }
        if !(0.0..=1.0).contains(&self.physics.palm_weight) {
            return Err(ConfigError::invalid("physics.palm_weight", "must lie in [0, 1]"));
        }
        if self.gesture.stability_window == 0 {
            return Err(ConfigError::invalid("gesture.stability_window", "must be at least 1"));
        }
        if self.gesture.history_len < self.gesture.stability_window {
            return Err(ConfigError::invalid(
                "gesture.history_len",
                "must be at least the stability window",
            ));
        }
        if !(self.physics.min_radius > 0.0) || self.physics.max_radius < self.physics.min_radius {
            return Err(ConfigError::invalid(
                "physics.min_radius",
                "need 0 < min_radius <= max_radius",
            ));
        }
        if self.physics.explosion_ms < 0.0 || self.physics.explosion_force < 0.0 {
            return Err(ConfigError::invalid("physics.explosion", "must be non-negative"));
        }
        if !(1..=MAX_TEXT_RASTER_SCALE).contains(&self.shapes.text_raster_scale) {
            return Err(ConfigError::invalid("shapes.text_raster_scale", "must lie in 1..=16"));
        }
        if self.shapes.depth_jitter < 0.0 {
            return Err(ConfigError::invalid("shapes.depth_jitter", "must be non-negative"));
        }
        if self.color.cycle && !(self.color.cycle_period_ms > 0.0) {
            return Err(ConfigError::invalid("color.cycle_period_ms", "must be positive"));
        }
        Ok(())
    }

    /// TOML accepts `inf` and `nan`; none of them survive the physics step.
    fn check_finite(&self) -> Result<(), ConfigError> {
        let (w, sm, ph, oc, sh, co, sc) = (
            &self.world,
            &self.smoothing,
            &self.physics,
            &self.occlusion,
            &self.shapes,
            &self.color,
            &self.scene,
        );
        let fields: &[(&'static str, f64)] = &[
            ("particle_size", f64::from(self.particle_size)),
            ("hand_timeout_ms", self.hand_timeout_ms),
            ("world.width", f64::from(w.width)),
            ("world.height", f64::from(w.height)),
            ("world.depth_scale", f64::from(w.depth_scale)),
            ("smoothing.centroid_alpha", f64::from(sm.centroid_alpha)),
            ("smoothing.radius_alpha", f64::from(sm.radius_alpha)),
            ("smoothing.dead_zone", f64::from(sm.dead_zone)),
            ("physics.return_speed", f64::from(ph.return_speed)),
            ("physics.damping", f64::from(ph.damping)),
            ("physics.explosion_force", f64::from(ph.explosion_force)),
            ("physics.explosion_ms", ph.explosion_ms),
            ("physics.depth_push_strength", f64::from(ph.depth_push_strength)),
            ("physics.inner_strength", f64::from(ph.inner_strength)),
            ("physics.middle_strength", f64::from(ph.middle_strength)),
            ("physics.outer_strength", f64::from(ph.outer_strength)),
            ("physics.min_radius", f64::from(ph.min_radius)),
            ("physics.max_radius", f64::from(ph.max_radius)),
            ("physics.radius_smoothing", f64::from(ph.radius_smoothing)),
            ("physics.palm_scale", f64::from(ph.palm_scale)),
            ("physics.palm_weight", f64::from(ph.palm_weight)),
            ("occlusion.max_fade", f64::from(oc.max_fade)),
            ("occlusion.epsilon", f64::from(oc.epsilon)),
            ("shapes.sphere_radius", f64::from(sh.sphere_radius)),
            ("shapes.ring_major", f64::from(sh.ring_major)),
            ("shapes.ring_minor", f64::from(sh.ring_minor)),
            ("shapes.star_radius", f64::from(sh.star_radius)),
            ("shapes.heart_scale", f64::from(sh.heart_scale)),
            ("shapes.text_pixel", f64::from(sh.text_pixel)),
            ("shapes.depth_jitter", f64::from(sh.depth_jitter)),
            ("color.cycle_period_ms", co.cycle_period_ms),
            ("color.hue_step", f64::from(co.hue_step)),
            ("color.saturation", f64::from(co.saturation)),
            ("color.lightness", f64::from(co.lightness)),
            ("scene.idle_spin", f64::from(sc.idle_spin)),
            ("scene.breathe_amplitude", f64::from(sc.breathe_amplitude)),
            ("scene.breathe_period_ms", sc.breathe_period_ms),
            ("scene.follow_gain", f64::from(sc.follow_gain)),
            ("scene.follow_stiffness", f64::from(sc.follow_stiffness)),
            ("scene.follow_damping", f64::from(sc.follow_damping)),
        ];
        for &(field, v) in fields {
            if !v.is_finite() {
                return Err(ConfigError::invalid(field, "must be finite"));
            }
        }
        Ok(())
    }
}

fn unit_open(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v > 0.0 && v < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must lie in (0, 1)"))
    }
}

fn unit_half_open(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v > 0.0 && v <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must lie in (0, 1]"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: &'static str) -> Self {
        ConfigError::Invalid { field, reason }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { field, reason } => write!(f, "invalid {field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}
