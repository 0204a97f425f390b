//! Gesture-driven particle simulation engine.
//!
//! Turns a stream of hand-landmark estimates into a smoothed 3D hand pose,
//! debounces a discrete gesture label out of it, and advances a fixed-size
//! particle field toward the selected shape under a tiered hand force field,
//! explosion impulses on shape changes and a depth-occlusion fade.
//!
//! Zero I/O and single-threaded: callers own a [`Simulation`], feed it pose
//! results with `submit` and drive it with `tick` once per display frame.

pub mod color;
pub mod config;
pub mod constants;
pub mod font;
pub mod gesture;
pub mod hand;
pub mod landmarks;
pub mod occlusion;
pub mod particles;
pub mod physics;
pub mod pose;
pub mod scene;
pub mod scheduler;
pub mod shapes;
pub mod smoother;
pub mod snapshot;
pub mod stabilizer;

pub use color::{ColorCycler, hsl_to_rgb, palette_hue};
pub use config::{
    ColorConfig, ConfigError, GestureConfig, OcclusionConfig, PerformanceTier, PhysicsConfig,
    SceneConfig, ShapeConfig, SimConfig, SmoothingConfig, WorldConfig,
};
pub use constants::{EPSILON, GOLDEN_ANGLE, INFERENCE_TIMEOUT_MS, LANDMARK_COUNT, PHI};
pub use gesture::{ShapeKind, classify, extended_digits, label_for};
pub use hand::{HandPose, HandView};
pub use landmarks::{Digits, Landmark, LandmarkFrame, synthetic_hand};
pub use occlusion::OcclusionPass;
pub use particles::ParticleField;
pub use physics::PhysicsEngine;
pub use pose::{NormalizedHand, normalize};
pub use scene::{SceneTransform, SceneView};
pub use scheduler::{Simulation, TickReport};
pub use shapes::{fill_targets, generate};
pub use smoother::PoseSmoother;
pub use snapshot::{FrameTimer, HudSnapshot};
pub use stabilizer::GestureStabilizer;
