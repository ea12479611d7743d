//! Flip timing: durations, easing and the per-panel flip state

use std::f32::consts::PI;

/// Longest and shortest flip, in milliseconds
pub const MIN_FLIP_MS: f64 = 360.0;
pub const MAX_FLIP_MS: f64 = 1100.0;

/// Flip duration for a speed factor: faster means shorter, within a believable range
pub fn flip_duration_ms(speed_factor: f32) -> f64 {
    if speed_factor <= 0.0 || !speed_factor.is_finite() {
        return MAX_FLIP_MS;
    }
    (400.0 / speed_factor as f64).clamp(MIN_FLIP_MS, MAX_FLIP_MS)
}

/// Quadratic ease-in-out on [0,1]
pub fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

/// Axis a panel turns about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipAxis {
    X,
    Y,
}

/// What one call to advance did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipEvent {
    Idle,
    Turning,
    /// Crossed the midpoint: the panel's text should change now
    Swapped,
    /// Crossed the midpoint and finished in the same step
    SwappedAndFinished,
    Finished,
}

impl FlipEvent {
    pub fn swapped(self) -> bool {
        matches!(self, FlipEvent::Swapped | FlipEvent::SwappedAndFinished)
    }

    pub fn finished(self) -> bool {
        matches!(self, FlipEvent::Finished | FlipEvent::SwappedAndFinished)
    }
}

/// In-flight flip of one panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlipState {
    pub active: bool,
    pub start_ms: f64,
    pub duration_ms: f64,
    pub axis: FlipAxis,
    /// Set once the midpoint swap has happened
    pub swapped: bool,
    /// Axis angle when the flip started
    pub origin: f32,
}

impl Default for FlipState {
    fn default() -> Self {
        Self {
            active: false,
            start_ms: 0.0,
            duration_ms: MAX_FLIP_MS,
            axis: FlipAxis::Y,
            swapped: false,
            origin: 0.0,
        }
    }
}

impl FlipState {
    /// Start a flip. Returns false, changing nothing, when one is already running.
    pub fn start(&mut self, now_ms: f64, speed_factor: f32, axis: FlipAxis, origin: f32) -> bool {
        if self.active {
            return false;
        }
        *self = FlipState {
            active: true,
            start_ms: now_ms,
            duration_ms: flip_duration_ms(speed_factor),
            axis,
            swapped: false,
            origin,
        };
        true
    }

    /// Linear progress in [0,1]
    pub fn progress(&self, now_ms: f64) -> f32 {
        (((now_ms - self.start_ms) / self.duration_ms) as f32).clamp(0.0, 1.0)
    }

    /// Advance to `now_ms`; returns the event and the axis angle to apply
    pub fn advance(&mut self, now_ms: f64) -> (FlipEvent, f32) {
        if !self.active {
            return (FlipEvent::Idle, self.origin);
        }

        let t = self.progress(now_ms);
        let angle = self.origin + ease_in_out_quad(t) * PI;

        let mut swapped = false;
        if t >= 0.5 && !self.swapped {
            self.swapped = true;
            swapped = true;
        }

        if t >= 1.0 {
            self.active = false;
            self.swapped = false;
            let settled = (self.origin + PI).rem_euclid(std::f32::consts::TAU);
            self.origin = settled;
            let event = if swapped {
                FlipEvent::SwappedAndFinished
            } else {
                FlipEvent::Finished
            };
            return (event, settled);
        }

        let event = if swapped {
            FlipEvent::Swapped
        } else {
            FlipEvent::Turning
        };
        (event, angle)
    }

    /// Move the flip later by `delta_ms`, e.g. after a pause
    pub fn shift(&mut self, delta_ms: f64) {
        if self.active {
            self.start_ms += delta_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_fixed_points() {
        assert_eq!(ease_in_out_quad(0.0), 0.0);
        assert_eq!(ease_in_out_quad(0.5), 0.5);
        assert_eq!(ease_in_out_quad(1.0), 1.0);
    }

    #[test]
    fn easing_is_monotonic() {
        let mut last = ease_in_out_quad(0.0);
        for i in 1..=1000 {
            let value = ease_in_out_quad(i as f32 / 1000.0);
            assert!(value >= last);
            last = value;
        }
    }

    #[test]
    fn duration_bounds() {
        assert_eq!(flip_duration_ms(1.0), 400.0);
        assert_eq!(flip_duration_ms(2.2), MIN_FLIP_MS);
        assert_eq!(flip_duration_ms(0.1), MAX_FLIP_MS);
        assert_eq!(flip_duration_ms(0.0), MAX_FLIP_MS);
        assert_eq!(flip_duration_ms(-3.0), MAX_FLIP_MS);
    }

    #[test]
    fn start_is_noop_while_active() {
        let mut flip = FlipState::default();
        assert!(flip.start(100.0, 1.0, FlipAxis::X, 0.0));
        let before = flip;
        assert!(!flip.start(150.0, 3.0, FlipAxis::Y, 1.0));
        assert_eq!(flip, before);
    }

    #[test]
    fn swaps_once_and_settles() {
        let mut flip = FlipState::default();
        flip.start(0.0, 1.0, FlipAxis::Y, 0.3);
        let mut swaps = 0;
        let mut last = FlipEvent::Idle;
        for step in 0..=50 {
            let (event, _) = flip.advance(step as f64 * 10.0);
            if event.swapped() {
                swaps += 1;
            }
            last = event;
            if event.finished() {
                break;
            }
        }
        assert_eq!(swaps, 1);
        assert_eq!(last, FlipEvent::Finished);
        assert!(!flip.active);
        assert!(!flip.swapped);
        assert!((flip.origin - (0.3 + PI)).abs() < 1e-5);
    }

    #[test]
    fn settled_angle_wraps_full_turns() {
        let mut flip = FlipState::default();
        flip.start(0.0, 1.0, FlipAxis::X, 1.5 * PI);
        let (event, angle) = flip.advance(10_000.0);
        assert_eq!(event, FlipEvent::SwappedAndFinished);
        assert!((angle - 0.5 * PI).abs() < 1e-5);
    }
}
