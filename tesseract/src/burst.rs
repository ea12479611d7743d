//! Pointer motion tracking, burst detection and linger accumulation

use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

use crate::constants::{
    LINGER_ONSET_SECS, LINGER_STEP_SECS, MAX_SHIMMER_OUTLINES, SHARD_COUNT_MAX, SHARD_COUNT_MIN,
    VELOCITY_DIVISOR, VELOCITY_FULL_SCALE, VELOCITY_SMOOTHING,
};

/// Motion figures for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Motion {
    /// Pointer displacement since the previous tick, in pixels
    pub displacement: f32,
    /// Smoothed pointer velocity
    pub velocity: f32,
    /// Change of velocity since the previous tick
    pub jump: f32,
}

/// Smooths pointer velocity and measures how long it has stayed low
#[derive(Debug, Clone, Default)]
pub struct MotionTracker {
    last_pointer: Option<Vec2>,
    velocity: f32,
    linger_secs: f32,
}

impl MotionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the pointer position of this tick. `linger_below` is the velocity under which
    /// the linger timer keeps running; any faster motion resets it immediately.
    pub fn update(&mut self, pointer: Vec2, dt: f32, linger_below: f32) -> Motion {
        let displacement = match self.last_pointer {
            Some(last) => pointer.distance(last),
            None => 0.0,
        };
        self.last_pointer = Some(pointer);

        let previous = self.velocity;
        let instant = displacement / VELOCITY_DIVISOR;
        self.velocity += (instant - previous) * VELOCITY_SMOOTHING;

        if self.velocity < linger_below {
            self.linger_secs += dt.max(0.0);
        } else {
            self.linger_secs = 0.0;
        }

        Motion {
            displacement,
            velocity: self.velocity,
            jump: self.velocity - previous,
        }
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn linger_secs(&self) -> f32 {
        self.linger_secs
    }
}

/// Number of shimmer outlines for a given linger duration
pub fn shimmer_outlines(linger_secs: f32) -> usize {
    if linger_secs < LINGER_ONSET_SECS {
        return 0;
    }
    let steps = ((linger_secs - LINGER_ONSET_SECS) / LINGER_STEP_SECS).floor() as usize;
    (1 + steps).min(MAX_SHIMMER_OUTLINES)
}

/// A short line shard thrown off by a burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shard {
    pub origin: Vec2,
    /// Unit direction
    pub direction: Vec2,
    pub length: f32,
}

impl Shard {
    pub fn end(&self) -> Vec2 {
        self.origin + self.direction * self.length
    }
}

/// Fires bursts on sudden velocity jumps, then holds off for a fixed number of ticks
#[derive(Debug, Clone)]
pub struct BurstEmitter {
    threshold: f32,
    cooldown_ticks: u32,
    cooldown: u32,
}

impl BurstEmitter {
    pub fn new(threshold: f32, cooldown_ticks: u32) -> Self {
        Self {
            threshold,
            cooldown_ticks,
            cooldown: 0,
        }
    }

    /// Ticks left before another burst may fire
    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Called once per tick. Returns the shards of a burst if one fires this tick,
    /// anchored at random entries of `anchors`.
    pub fn update<R: Rng>(
        &mut self,
        motion: Motion,
        anchors: &[Vec2],
        rng: &mut R,
    ) -> Option<Vec<Shard>> {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return None;
        }
        if motion.jump <= self.threshold || anchors.is_empty() {
            return None;
        }

        self.cooldown = self.cooldown_ticks;
        let shards = emit_shards(motion.velocity, anchors, rng);
        log::debug!(
            "burst: velocity {:.2}, jump {:.2}, {} shards",
            motion.velocity,
            motion.jump,
            shards.len()
        );
        Some(shards)
    }
}

/// Generate burst shards; count and length grow with velocity
pub fn emit_shards<R: Rng>(velocity: f32, anchors: &[Vec2], rng: &mut R) -> Vec<Shard> {
    if anchors.is_empty() {
        return Vec::new();
    }
    let intensity = (velocity / VELOCITY_FULL_SCALE).clamp(0.0, 1.0);
    let extra = (SHARD_COUNT_MAX - SHARD_COUNT_MIN) as f32 * intensity;
    let count = SHARD_COUNT_MIN + extra.round() as usize;
    let max_length = 12.0 + 10.0 * velocity.max(0.0);

    (0..count)
        .map(|_| {
            let origin = anchors[rng.gen_range(0..anchors.len())];
            let angle = rng.gen::<f32>() * TAU;
            Shard {
                origin,
                direction: Vec2::from_angle(angle),
                length: max_length * rng.gen_range(0.4..=1.0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn motion(jump: f32, velocity: f32) -> Motion {
        Motion {
            displacement: 0.0,
            velocity,
            jump,
        }
    }

    #[test]
    fn burst_respects_threshold_and_cooldown() {
        let mut rng = StdRng::seed_from_u64(7);
        let anchors = [Vec2::ZERO, Vec2::ONE];
        let mut emitter = BurstEmitter::new(0.8, 12);

        assert!(emitter.update(motion(0.5, 3.0), &anchors, &mut rng).is_none());
        assert!(emitter.update(motion(0.9, 3.0), &anchors, &mut rng).is_some());
        for _ in 0..12 {
            assert!(emitter.update(motion(5.0, 8.0), &anchors, &mut rng).is_none());
        }
        assert!(emitter.update(motion(5.0, 8.0), &anchors, &mut rng).is_some());
    }

    #[test]
    fn shard_count_scales_with_velocity() {
        let mut rng = StdRng::seed_from_u64(1);
        let anchors = [Vec2::new(10.0, 10.0)];
        assert_eq!(emit_shards(0.0, &anchors, &mut rng).len(), SHARD_COUNT_MIN);
        assert_eq!(emit_shards(100.0, &anchors, &mut rng).len(), SHARD_COUNT_MAX);

        for shard in emit_shards(4.0, &anchors, &mut rng) {
            assert_eq!(shard.origin, anchors[0]);
            assert!((shard.direction.length() - 1.0).abs() < 1e-5);
            assert!(shard.length <= 12.0 + 40.0 + 1e-4);
        }
    }

    #[test]
    fn linger_resets_on_fast_motion() {
        let mut tracker = MotionTracker::new();
        for _ in 0..60 {
            tracker.update(Vec2::ZERO, 0.05, 0.4);
        }
        assert!((tracker.linger_secs() - 3.0).abs() < 1e-3);

        tracker.update(Vec2::new(400.0, 0.0), 0.05, 0.4);
        assert!(tracker.velocity() > 0.4);
        assert_eq!(tracker.linger_secs(), 0.0);
    }

    #[test]
    fn shimmer_outline_count_is_capped() {
        assert_eq!(shimmer_outlines(0.0), 0);
        assert_eq!(shimmer_outlines(LINGER_ONSET_SECS), 1);
        assert_eq!(shimmer_outlines(LINGER_ONSET_SECS + LINGER_STEP_SECS * 2.5), 3);
        assert_eq!(shimmer_outlines(1000.0), MAX_SHIMMER_OUTLINES);
    }
}
