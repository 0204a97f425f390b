/// Golden ratio: (1 + √5) / 2
pub const PHI: f32 = 1.618_034;

/// Golden angle in radians: 2π / φ²
pub const GOLDEN_ANGLE: f32 = 2.399_963_3;

/// Numerical epsilon floor for radii and other divisors
pub const EPSILON: f32 = 1e-6;

/// Landmarks per detected hand
pub const LANDMARK_COUNT: usize = 21;

/// Safety margin applied to the hand bounding radius
pub const RADIUS_MARGIN: f32 = 1.05;

/// Force-field tier radii as multiples of the dynamic radius
pub const TIER_INNER: f32 = 0.45;
pub const TIER_MIDDLE: f32 = 1.0;
pub const TIER_OUTER: f32 = 1.7;

/// Occlusion applies inside this multiple of the hand radius (lateral plane)
pub const OCCLUSION_LATERAL_REACH: f32 = 1.25;

/// Depth over which occlusion ramps to full strength, in hand radii
pub const OCCLUSION_DEPTH_RAMP: f32 = 1.5;

/// Finger-extension ratio thresholds
pub const TIP_TO_PIP_RATIO: f32 = 1.25;
pub const PIP_TO_MCP_RATIO: f32 = 0.9;
pub const THUMB_EXTENSION_RATIO: f32 = 0.4;

/// Inference watchdog: an in-flight estimate older than this is abandoned
pub const INFERENCE_TIMEOUT_MS: u64 = 5_000;
