//! Per-tick particle integration: target spring, hand force field,
//! explosion impulse, damping, semi-implicit Euler.

use glam::Vec3;
use rand::Rng;

use crate::config::PhysicsConfig;
use crate::constants::{EPSILON, TIER_INNER, TIER_MIDDLE, TIER_OUTER};
use crate::hand::HandPose;
use crate::particles::ParticleField;
use crate::shapes::symmetric;

#[derive(Clone, Debug)]
pub struct PhysicsEngine {
    config: PhysicsConfig,
    dynamic_radius: f32,
    explosion_until_ms: Option<f64>,
    explosions: u64,
}

impl PhysicsEngine {
    pub fn new(config: PhysicsConfig) -> Self {
        let dynamic_radius = 1.0_f32.clamp(config.min_radius, config.max_radius);
        Self {
            config,
            dynamic_radius,
            explosion_until_ms: None,
            explosions: 0,
        }
    }

    pub fn dynamic_radius(&self) -> f32 {
        self.dynamic_radius
    }

    /// Total explosions triggered since startup.
    pub fn explosions(&self) -> u64 {
        self.explosions
    }

    /// Start a burst lasting `explosion_ms`. Restarting an active burst extends it.
    pub fn trigger_explosion(&mut self, now_ms: f64) {
        self.explosion_until_ms = Some(now_ms + self.config.explosion_ms);
        self.explosions += 1;
    }

    pub fn is_exploding(&self, now_ms: f64) -> bool {
        self.explosion_until_ms.is_some_and(|until| now_ms < until)
    }

    /// Ease the force-field radius toward a clamped blend of the palm-size and
    /// landmark-spread estimates. Holds its value while the hand is absent.
    pub fn update_dynamic_radius(&mut self, hand: &HandPose) {
        if !hand.present {
            return;
        }
        let palm = hand.palm_size * self.config.palm_scale;
        let spread = hand.radius;
        let target = (spread + (palm - spread) * self.config.palm_weight)
            .clamp(self.config.min_radius, self.config.max_radius);
        self.dynamic_radius += (target - self.dynamic_radius) * self.config.radius_smoothing;
    }

    /// Inward pull magnitude at `distance` from the hand centroid.
    ///
    /// Tiers at 0.45R, R and 1.7R: quadratic inside the inner tier, quadratic
    /// between inner and middle, linear out to the outer edge, zero beyond.
    /// Each tier sits on top of the ones outside it, so the profile is
    /// continuous and non-increasing.
    pub fn tier_strength(&self, distance: f32, radius: f32) -> f32 {
        let radius = radius.max(EPSILON);
        let r1 = TIER_INNER * radius;
        let r2 = TIER_MIDDLE * radius;
        let r3 = TIER_OUTER * radius;
        let c = &self.config;

        if distance >= r3 {
            0.0
        } else if distance >= r2 {
            c.outer_strength * (r3 - distance) / (r3 - r2)
        } else if distance >= r1 {
            let t = (r2 - distance) / (r2 - r1);
            c.middle_strength * t * t + c.outer_strength
        } else {
            let t = (r1 - distance) / r1;
            c.inner_strength * t * t + c.middle_strength + c.outer_strength
        }
    }

    /// Advance every particle by one tick.
    pub fn step(&mut self, field: &mut ParticleField, hand: &HandPose, now_ms: f64, rng: &mut impl Rng) {
        self.update_dynamic_radius(hand);
        if self.explosion_until_ms.is_some_and(|until| now_ms >= until) {
            self.explosion_until_ms = None;
        }
        let exploding = self.is_exploding(now_ms);
        let radius = self.dynamic_radius.max(EPSILON);
        let inner = TIER_INNER * radius;
        let force = self.config.explosion_force;

        for i in 0..field.len() {
            let p = field.position_at(i);
            let mut v = field.velocity_at(i);

            v += (field.target_at(i) - p) * self.config.return_speed;

            if hand.present {
                let offset = p - hand.centroid;
                let d = offset.length();
                if d > EPSILON {
                    v -= offset / d * self.tier_strength(d, radius);
                }
                if d < inner {
                    let side = if offset.z >= 0.0 { 1.0 } else { -1.0 };
                    v.z += side * self.config.depth_push_strength * (1.0 - d / inner);
                }
            }

            if exploding && force > 0.0 {
                v += Vec3::new(
                    symmetric(rng, force),
                    symmetric(rng, force),
                    symmetric(rng, force),
                );
            }

            v *= self.config.damping;
            field.set_velocity(i, v);
            field.set_position(i, p + v);
        }
    }
}
