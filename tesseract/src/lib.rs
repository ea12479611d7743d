//! Tesseract trails
//!
//! A 4-dimensional hypercube rotated continuously through its six rotation planes,
//! projected to 2D and drawn with accumulating ghost trails:
//!
//! - **hypercube**: vertex/edge topology, plane rotations, 4D→3D→2D projection
//! - **trail**: bounded history of past projections
//! - **burst**: pointer velocity tracking, burst shards and linger timing
//! - **engine**: the per-tick simulation step and draw-call emission
//! - **renderer**: wgpu backend with a persistent accumulation canvas
//! - **controls_ui**: egui control strip

pub mod hypercube;
pub mod trail;
pub mod burst;
pub mod engine;
pub mod renderer;
pub mod controls_ui;

pub use engine::{HypercubeConfig, HypercubeEngine};

/// Tunables of the piece
pub mod constants {
    /// Number of retained ghost frames
    pub const TRAIL_LENGTH: usize = 42;

    /// Rotation speed with a still pointer
    pub const BASE_SPEED: f32 = 0.0015;
    /// Extra rotation speed at full pointer displacement
    pub const SPEED_BOOST: f32 = 0.02;
    /// Pointer displacement (pixels per tick) giving the full boost
    pub const DISPLACEMENT_CAP: f32 = 60.0;

    /// Pixels per unit coordinate, relative to the shorter surface side
    pub const PROJECTION_SCALE: f32 = 0.22;
    /// x/y scale at w = -2 and w = +2
    pub const W_FACTOR_NEAR: f32 = 1.4;
    pub const W_FACTOR_FAR: f32 = 0.3;
    /// z is carried into 3D at half magnitude
    pub const Z_SCALE: f32 = 0.5;
    /// Camera distance with the pointer at the top and bottom edge
    pub const CAMERA_Z_NEAR: f32 = 900.0;
    pub const CAMERA_Z_FAR: f32 = 2200.0;

    /// Pixels of displacement per unit of velocity
    pub const VELOCITY_DIVISOR: f32 = 10.0;
    /// Exponential smoothing factor for velocity
    pub const VELOCITY_SMOOTHING: f32 = 0.35;
    /// Velocity treated as "fast" by burst sizing and the HUD ring
    pub const VELOCITY_FULL_SCALE: f32 = 8.0;

    pub const BURST_THRESHOLD: f32 = 0.8;
    pub const BURST_COOLDOWN_TICKS: u32 = 12;
    pub const SHARD_COUNT_MIN: usize = 10;
    pub const SHARD_COUNT_MAX: usize = 40;

    pub const LINGER_VELOCITY: f32 = 0.4;
    /// Low-velocity time before the first shimmer outline appears
    pub const LINGER_ONSET_SECS: f32 = 0.6;
    /// Low-velocity time per additional outline
    pub const LINGER_STEP_SECS: f32 = 0.35;
    pub const MAX_SHIMMER_OUTLINES: usize = 9;

    /// Ghost frame alpha and stroke width, oldest to newest
    pub const GHOST_ALPHA_OLDEST: f32 = 6.0 / 255.0;
    pub const GHOST_ALPHA_NEWEST: f32 = 160.0 / 255.0;
    pub const GHOST_WIDTH_OLDEST: f32 = 0.2;
    pub const GHOST_WIDTH_NEWEST: f32 = 1.6;

    /// Alpha of the full-surface fade painted every tick
    pub const FADE_ALPHA: u8 = 26;

    /// HUD ring diameter at rest and at full velocity
    pub const RING_DIAMETER_SLOW: f32 = 180.0;
    pub const RING_DIAMETER_FAST: f32 = 30.0;
}
