//! Ghost-trail history: a bounded FIFO of past edge projections

use std::collections::VecDeque;

use glam::Vec2;

use crate::constants::{
    GHOST_ALPHA_NEWEST, GHOST_ALPHA_OLDEST, GHOST_WIDTH_NEWEST, GHOST_WIDTH_OLDEST,
};

/// Snapshot of the projected edges of one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TrailFrame {
    /// Tick number the frame was captured on (first tick is 1)
    pub tick: u64,
    pub segments: Vec<(Vec2, Vec2)>,
}

/// Bounded history, oldest frame first
#[derive(Debug, Clone)]
pub struct TrailHistory {
    frames: VecDeque<TrailFrame>,
    capacity: usize,
}

impl TrailHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append the newest frame, evicting the oldest ones beyond capacity
    pub fn push(&mut self, frame: TrailFrame) {
        self.frames.push_back(frame);
        while self.frames.len() > self.capacity {
            self.frames.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn oldest(&self) -> Option<&TrailFrame> {
        self.frames.front()
    }

    pub fn newest(&self) -> Option<&TrailFrame> {
        self.frames.back()
    }

    /// Frames from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &TrailFrame> {
        self.frames.iter()
    }
}

/// Alpha (0..1) and stroke width for the frame at `index` of `len` retained frames,
/// where index 0 is the oldest. Both grow linearly with recency.
pub fn ghost_style(index: usize, len: usize) -> (f32, f32) {
    let t = if len > 1 {
        index as f32 / (len - 1) as f32
    } else {
        1.0
    };
    let alpha = GHOST_ALPHA_OLDEST + (GHOST_ALPHA_NEWEST - GHOST_ALPHA_OLDEST) * t;
    let width = GHOST_WIDTH_OLDEST + (GHOST_WIDTH_NEWEST - GHOST_WIDTH_OLDEST) * t;
    (alpha, width)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(tick: u64) -> TrailFrame {
        TrailFrame {
            tick,
            segments: vec![(Vec2::ZERO, Vec2::splat(tick as f32))],
        }
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut history = TrailHistory::new(3);
        for tick in 1..=5 {
            history.push(frame(tick));
            assert!(history.len() <= 3);
        }
        let ticks: Vec<u64> = history.iter().map(|f| f.tick).collect();
        assert_eq!(ticks, vec![3, 4, 5]);
    }

    #[test]
    fn style_grows_with_recency() {
        let (a0, w0) = ghost_style(0, 42);
        let (a1, w1) = ghost_style(41, 42);
        assert!((a0 - GHOST_ALPHA_OLDEST).abs() < 1e-6);
        assert!((w0 - GHOST_WIDTH_OLDEST).abs() < 1e-6);
        assert!((a1 - GHOST_ALPHA_NEWEST).abs() < 1e-6);
        assert!((w1 - GHOST_WIDTH_NEWEST).abs() < 1e-6);

        let mut last = (0.0, 0.0);
        for i in 0..42 {
            let style = ghost_style(i, 42);
            assert!(style.0 >= last.0 && style.1 >= last.1);
            last = style;
        }
    }
}
