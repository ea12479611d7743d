//! Flip panels
//!
//! Text cards arranged on rings in four zones that flip over, revealing their
//! next text at the halfway turn. Pointer presses flip the card under the
//! pointer; a long idle spell makes cards flip on their own.
//!
//! - **zone**: zone identities, styles and the built-in layout
//! - **flip**: flip timing, easing and the per-panel flip state
//! - **text**: text card rasterization
//! - **panel**: panel placement and lifecycle
//! - **engine**: panel collection, hit tests and idle auto-cycle
//! - **scene**: projection of panels into paintable egui shapes
//! - **controls_ui**: egui control strip

pub mod zone;
pub mod flip;
pub mod text;
pub mod panel;
pub mod engine;
pub mod scene;
pub mod controls_ui;

pub use engine::{Layout, PanelFlipEngine};
pub use zone::{default_layout, Zone, ZoneConfig};

/// Tunables of the piece
pub mod constants {
    /// Pointer idle time before cards start flipping on their own, in ms
    pub const IDLE_THRESHOLD_MS: f64 = 5000.0;
    /// Minimum time between idle auto-cycle attempts, in ms
    pub const AUTO_INTERVAL_MS: f64 = 1400.0;
    /// Chance that an auto-cycle attempt flips a card
    pub const AUTO_PROBABILITY: f64 = 0.55;
    /// Speed factor range for auto and random flips
    pub const AUTO_SPEED_MIN: f32 = 0.6;
    pub const AUTO_SPEED_MAX: f32 = 3.2;
    /// Speed factor of a flip started by a pointer hit
    pub const HIT_SPEED: f32 = 2.2;

    /// Decorative frame size relative to its card, and its offset behind it
    pub const FRAME_SCALE: f32 = 1.08;
    pub const FRAME_DEPTH: f32 = -0.5;

    // Layout jitter
    pub const RADIUS_JITTER: f32 = 0.08;
    pub const Y_JITTER: f32 = 18.0;
    pub const YAW_JITTER: f32 = 0.35;
    pub const PITCH_JITTER: f32 = 0.25;
    pub const ROLL_JITTER: f32 = 0.12;

    /// Camera rest position and look-at target
    pub const CAMERA_EYE: [f32; 3] = [0.0, 90.0, 900.0];
    pub const CAMERA_TARGET: [f32; 3] = [0.0, 20.0, 0.0];
    /// How far the camera drifts at the edge of the screen
    pub const CAMERA_DRIFT: [f32; 2] = [120.0, 60.0];

    /// Cards whose text would be smaller than this are drawn without it, in px
    pub const MIN_TEXT_PX: f32 = 4.0;
}
