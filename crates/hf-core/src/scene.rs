//! Mesh transform: idle spin and breathing, plus a damped follow of the hand.

use std::f64::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::SceneConfig;
use crate::hand::HandPose;

#[derive(Clone, Debug)]
pub struct SceneTransform {
    config: SceneConfig,
    /// Euler angles, radians
    pub rotation: Vec3,
    pub scale: f32,
    pub position: Vec3,
    pub follow_velocity: Vec3,
}

impl SceneTransform {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            rotation: Vec3::ZERO,
            scale: 1.0,
            position: Vec3::ZERO,
            follow_velocity: Vec3::ZERO,
        }
    }

    /// Spin and breathe while idle; with a hand present, drift the mesh toward
    /// a scaled copy of the hand centroid. Without a hand it eases home with
    /// zero follow velocity.
    pub fn update(&mut self, hand: &HandPose, now_ms: f64) {
        let c = &self.config;
        if !hand.present {
            self.rotation.y = (self.rotation.y + c.idle_spin).rem_euclid(std::f32::consts::TAU);
        }
        let phase = if c.breathe_period_ms > 0.0 {
            (TAU * now_ms / c.breathe_period_ms).sin() as f32
        } else {
            0.0
        };
        self.scale = 1.0 + c.breathe_amplitude * phase;

        if hand.present {
            let anchor = hand.centroid * c.follow_gain;
            self.follow_velocity += (anchor - self.position) * c.follow_stiffness;
            self.follow_velocity *= c.follow_damping;
            self.position += self.follow_velocity;
        } else {
            // Ease home kinematically; follow momentum only exists with a hand
            self.follow_velocity = Vec3::ZERO;
            self.position = self.position.lerp(Vec3::ZERO, c.follow_stiffness);
        }
    }

    /// Kill follow momentum, e.g. when the hand times out.
    pub fn stop_follow(&mut self) {
        self.follow_velocity = Vec3::ZERO;
    }

    pub fn view(&self) -> SceneView {
        SceneView {
            rotation: self.rotation.to_array(),
            scale: self.scale,
            position: self.position.to_array(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneView {
    pub rotation: [f32; 3],
    pub scale: f32,
    pub position: [f32; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_spins() {
        let mut scene = SceneTransform::new(SceneConfig::default());
        scene.update(&HandPose::absent(), 0.0);
        assert!(scene.rotation.y > 0.0);
        assert_eq!(scene.position, Vec3::ZERO);
    }

    #[test]
    fn test_follows_hand() {
        let mut scene = SceneTransform::new(SceneConfig::default());
        let hand = HandPose {
            centroid: Vec3::new(2.0, 0.0, 0.0),
            present: true,
            ..HandPose::absent()
        };
        for t in 0..200 {
            scene.update(&hand, t as f64 * 16.0);
        }
        let anchor = 2.0 * SceneConfig::default().follow_gain;
        assert!((scene.position.x - anchor).abs() < 0.01);

        scene.stop_follow();
        assert_eq!(scene.follow_velocity, Vec3::ZERO);

        let before = scene.position.x;
        scene.update(&HandPose::absent(), 4_000.0);
        assert_eq!(scene.follow_velocity, Vec3::ZERO);
        assert!(scene.position.x < before);
    }

    #[test]
    fn test_breathing_bounded() {
        let cfg = SceneConfig::default();
        let mut scene = SceneTransform::new(cfg.clone());
        for t in 0..500 {
            scene.update(&HandPose::absent(), t as f64 * 37.0);
            assert!((scene.scale - 1.0).abs() <= cfg.breathe_amplitude + 1e-6);
        }
    }
}
