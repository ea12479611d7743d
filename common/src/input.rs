//! Pointer and frame-clock adapter
//!
//! Window events push the latest pointer position and interaction time in; each
//! animation tick pulls exactly one [`FrameInput`] out via [`PointerClock::begin_frame`].
//! Times are milliseconds on a caller-supplied monotonic clock.

use glam::Vec2;

use crate::constants::MAX_FRAME_DT;

/// Snapshot of pointer and clock state for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Timestamp of this frame, in milliseconds
    pub now_ms: f64,
    /// Seconds since the previous frame, clamped to [`MAX_FRAME_DT`]
    pub dt: f32,
    /// Milliseconds since the last pointer interaction
    pub idle_ms: f64,
    /// Pointer position in surface pixels (origin top-left, y down)
    pub pointer: Vec2,
    /// Pointer position normalized to [0,1]×[0,1]
    pub uv: Vec2,
    /// Surface size in pixels
    pub size: Vec2,
    /// Whether a press arrived since the previous frame
    pub pressed: bool,
}

impl FrameInput {
    /// Pointer in [-1,1]² with y pointing down, as screen space does
    pub fn signed(&self) -> Vec2 {
        self.uv * 2.0 - Vec2::ONE
    }

    /// Pointer in normalized device coordinates (y up)
    pub fn ndc(&self) -> Vec2 {
        Vec2::new(self.uv.x * 2.0 - 1.0, 1.0 - self.uv.y * 2.0)
    }
}

/// Collects pointer events between ticks and hands them to the engines once per frame
#[derive(Debug, Clone)]
pub struct PointerClock {
    size: Vec2,
    pointer: Option<Vec2>,
    last_interaction_ms: f64,
    last_frame_ms: Option<f64>,
    pending_press: bool,
}

impl PointerClock {
    pub fn new(width: f32, height: f32, now_ms: f64) -> Self {
        Self {
            size: Vec2::new(width.max(1.0), height.max(1.0)),
            pointer: None,
            last_interaction_ms: now_ms,
            last_frame_ms: None,
            pending_press: false,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width.max(1.0), height.max(1.0));
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Record a pointer or touch move, in surface pixels
    pub fn pointer_moved(&mut self, position: Vec2, now_ms: f64) {
        self.pointer = Some(position);
        self.last_interaction_ms = now_ms;
    }

    /// Record a pointer press or touch start
    pub fn pointer_pressed(&mut self, now_ms: f64) {
        self.pending_press = true;
        self.last_interaction_ms = now_ms;
    }

    /// Pointer position in pixels; the surface centre until the first move
    pub fn pointer(&self) -> Vec2 {
        self.pointer.unwrap_or(self.size * 0.5)
    }

    pub fn idle_ms(&self, now_ms: f64) -> f64 {
        (now_ms - self.last_interaction_ms).max(0.0)
    }

    /// Produce the input snapshot for the tick at `now_ms`
    pub fn begin_frame(&mut self, now_ms: f64) -> FrameInput {
        let dt = match self.last_frame_ms {
            Some(last) => (((now_ms - last) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT),
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);

        let pointer = self.pointer();
        let uv = (pointer / self.size).clamp(Vec2::ZERO, Vec2::ONE);
        let pressed = std::mem::take(&mut self.pending_press);

        FrameInput {
            now_ms,
            dt,
            idle_ms: self.idle_ms(now_ms),
            pointer,
            uv,
            size: self.size,
            pressed,
        }
    }
}
