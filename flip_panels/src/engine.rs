//! Panel flip engine
//!
//! Owns every panel, the element-to-panel owner map used by hit tests, and the
//! idle auto-cycle timer. Driven once per tick with a [`FrameInput`].

use std::collections::HashMap;

use common::{Camera3D, FrameInput, Ray};
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants;
use crate::flip::FlipAxis;
use crate::panel::{ring_angles, ElementId, Panel, Placement};
use crate::text::{CardRasterizer, TextRasterizer};
use crate::zone::ZoneConfig;

/// Placement mode for [`PanelFlipEngine::build_panels`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Bounded random jitter on every panel
    Jittered,
    /// Exact ring positions
    Exact,
}

/// A hit on a visual element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub element: ElementId,
    pub distance: f32,
}

pub struct PanelFlipEngine<R: Rng = StdRng> {
    panels: Vec<Panel>,
    owners: HashMap<ElementId, usize>,
    rasterizer: Box<dyn TextRasterizer>,
    rng: R,
    last_auto_ms: f64,
    auto_attempts: u64,
    paused_at: Option<f64>,
}

impl PanelFlipEngine<StdRng> {
    /// Engine with the default card rasterizer and an entropy-seeded RNG
    pub fn new(configs: &[ZoneConfig]) -> Self {
        Self::with_rng(
            configs,
            Box::new(CardRasterizer::default()),
            StdRng::from_entropy(),
        )
    }

    pub fn seeded(configs: &[ZoneConfig], seed: u64) -> Self {
        Self::with_rng(
            configs,
            Box::new(CardRasterizer::default()),
            StdRng::seed_from_u64(seed),
        )
    }
}

impl<R: Rng> PanelFlipEngine<R> {
    pub fn with_rng(
        configs: &[ZoneConfig],
        rasterizer: Box<dyn TextRasterizer>,
        rng: R,
    ) -> Self {
        Self::build(configs, rasterizer, rng, Layout::Jittered)
    }

    /// Engine with an explicit layout mode
    pub fn build(
        configs: &[ZoneConfig],
        rasterizer: Box<dyn TextRasterizer>,
        rng: R,
        layout: Layout,
    ) -> Self {
        let mut engine = Self {
            panels: Vec::new(),
            owners: HashMap::new(),
            rasterizer,
            rng,
            last_auto_ms: f64::NEG_INFINITY,
            auto_attempts: 0,
            paused_at: None,
        };
        engine.build_panels(configs, layout);
        engine
    }

    /// Place `count` panels per zone on its ring and register their elements
    pub fn build_panels(&mut self, configs: &[ZoneConfig], layout: Layout) {
        for config in configs {
            for angle in ring_angles(config.count, config.angle_offset) {
                let placement = match layout {
                    Layout::Jittered => Placement::jittered(config, angle, &mut self.rng),
                    Layout::Exact => Placement::on_ring(config, angle),
                };

                let index = self.panels.len();
                let card = ElementId(2 * index as u32);
                let frame = ElementId(2 * index as u32 + 1);
                let panel = Panel::new(
                    config.zone,
                    placement,
                    config.texts.clone(),
                    self.rasterizer.as_mut(),
                    (card, frame),
                );

                self.owners.insert(card, index);
                self.owners.insert(frame, index);
                self.panels.push(panel);
            }
            log::info!(
                "built {} {} panels at radius {}",
                config.count,
                config.zone.name(),
                config.radius
            );
        }
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel(&self, index: usize) -> Option<&Panel> {
        self.panels.get(index)
    }

    pub fn paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn last_auto_ms(&self) -> f64 {
        self.last_auto_ms
    }

    /// Idle auto-cycle attempts made so far, fired or not
    pub fn auto_attempts(&self) -> u64 {
        self.auto_attempts
    }

    pub fn active_flips(&self) -> usize {
        self.panels.iter().filter(|p| p.is_flipping()).count()
    }

    /// Panel owning a visual element
    pub fn owner_of(&self, element: ElementId) -> Option<usize> {
        self.owners.get(&element).copied()
    }

    /// Start a flip on one panel; false if it is already flipping or does not exist
    pub fn trigger_flip(
        &mut self,
        index: usize,
        speed_factor: f32,
        axis: FlipAxis,
        now_ms: f64,
    ) -> bool {
        let Some(panel) = self.panels.get_mut(index) else {
            return false;
        };
        let started = panel.trigger_flip(now_ms, speed_factor, axis);
        if started {
            log::debug!(
                "flip panel {} ({}) axis {:?} over {:.0}ms",
                index,
                panel.zone.name(),
                axis,
                panel.flip().duration_ms
            );
        }
        started
    }

    /// Advance every in-flight flip; returns how many panels swapped text
    pub fn advance_flips(&mut self, now_ms: f64) -> usize {
        let mut swaps = 0;
        for (index, panel) in self.panels.iter_mut().enumerate() {
            let event = panel.advance(now_ms, self.rasterizer.as_mut());
            if event.swapped() {
                swaps += 1;
                log::debug!("panel {} shows \"{}\"", index, panel.current_text());
            }
            if event.finished() {
                log::debug!("panel {} settled", index);
            }
        }
        swaps
    }

    /// Nearest element hit by a world-space ray
    pub fn hit_test(&self, ray: &Ray) -> Option<Hit> {
        let mut best: Option<Hit> = None;
        for panel in &self.panels {
            let inverse = panel.model_matrix().inverse();
            let origin = inverse.transform_point3(ray.origin);
            let direction = inverse.transform_vector3(ray.direction);

            for (element, kind) in panel.elements() {
                let half = kind.half_extent(panel.size);
                let Some(distance) = intersect_quad(origin, direction, half, kind.depth_offset())
                else {
                    continue;
                };
                if best.map_or(true, |b| distance < b.distance) {
                    best = Some(Hit { element, distance });
                }
            }
        }
        best
    }

    /// Flip whichever panel the ray hits first, fast and on a random axis
    pub fn dispatch_pointer_hit(&mut self, ray: &Ray, now_ms: f64) -> Option<usize> {
        let hit = self.hit_test(ray)?;
        let index = self.owner_of(hit.element)?;
        let axis = self.random_axis();
        self.trigger_flip(index, constants::HIT_SPEED, axis, now_ms);
        Some(index)
    }

    /// Occasionally flip a random panel once the pointer has been idle long enough
    pub fn idle_auto_cycle(&mut self, now_ms: f64, idle_ms: f64) -> Option<usize> {
        if idle_ms < constants::IDLE_THRESHOLD_MS {
            return None;
        }
        if now_ms - self.last_auto_ms < constants::AUTO_INTERVAL_MS {
            return None;
        }

        self.last_auto_ms = now_ms;
        self.auto_attempts += 1;

        if self.panels.is_empty() || !self.rng.gen_bool(constants::AUTO_PROBABILITY) {
            log::debug!("idle auto-cycle skipped at {:.0}ms", now_ms);
            return None;
        }

        let index = self.rng.gen_range(0..self.panels.len());
        let speed = self
            .rng
            .gen_range(constants::AUTO_SPEED_MIN..=constants::AUTO_SPEED_MAX);
        let axis = self.random_axis();
        log::debug!("idle auto-cycle picked panel {} at speed {:.2}", index, speed);
        self.trigger_flip(index, speed, axis, now_ms).then_some(index)
    }

    /// Flip a random panel with a random speed and axis
    pub fn trigger_random_flip(&mut self, now_ms: f64) -> Option<usize> {
        if self.panels.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..self.panels.len());
        let speed = self
            .rng
            .gen_range(constants::AUTO_SPEED_MIN..=constants::AUTO_SPEED_MAX);
        let axis = self.random_axis();
        self.trigger_flip(index, speed, axis, now_ms).then_some(index)
    }

    /// Freeze or resume; flips and the auto-cycle timer skip the paused interval
    pub fn toggle_pause(&mut self, now_ms: f64) -> bool {
        match self.paused_at.take() {
            Some(since) => {
                let delta = (now_ms - since).max(0.0);
                for panel in &mut self.panels {
                    panel.delay_flip(delta);
                }
                self.last_auto_ms += delta;
                log::info!("resumed after {:.0}ms", delta);
                false
            }
            None => {
                self.paused_at = Some(now_ms);
                log::info!("paused");
                true
            }
        }
    }

    /// One animation tick: pointer press, idle auto-cycle, then flip progress
    pub fn tick(&mut self, input: &FrameInput, camera: &Camera3D) {
        if self.paused() {
            return;
        }
        if input.pressed {
            let ray = camera.screen_ray(input.ndc());
            self.dispatch_pointer_hit(&ray, input.now_ms);
        }
        self.idle_auto_cycle(input.now_ms, input.idle_ms);
        self.advance_flips(input.now_ms);
    }

    fn random_axis(&mut self) -> FlipAxis {
        if self.rng.gen_bool(0.5) {
            FlipAxis::X
        } else {
            FlipAxis::Y
        }
    }
}

/// Distance along a local-space ray to a square quad centred on the z axis
fn intersect_quad(origin: Vec3, direction: Vec3, half: f32, z: f32) -> Option<f32> {
    if direction.z.abs() < 1e-6 {
        return None;
    }
    let t = (z - origin.z) / direction.z;
    if t < 0.0 {
        return None;
    }
    let p = origin + direction * t;
    let inside = Vec2::new(p.x, p.y).abs().cmple(Vec2::splat(half)).all();
    inside.then_some(t * direction.length())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::Zone;

    fn single(count: usize) -> Vec<ZoneConfig> {
        let mut cfg = ZoneConfig::new(Zone::Present, count, 100.0, 0.0, &["a", "b"]);
        cfg.angle_offset = 0.0;
        vec![cfg]
    }

    fn engine(count: usize) -> PanelFlipEngine {
        PanelFlipEngine::build(
            &single(count),
            Box::new(CardRasterizer::default()),
            StdRng::seed_from_u64(11),
            Layout::Exact,
        )
    }

    #[test]
    fn four_panels_on_quarter_turns() {
        let engine = engine(4);
        assert_eq!(engine.panels().len(), 4);
        let expected = [0.0, 0.5, 1.0, 1.5].map(|k| k * std::f32::consts::PI);
        for (panel, angle) in engine.panels().iter().zip(expected) {
            assert!((panel.layout_angle - angle).abs() < 1e-5);
            assert!((panel.position.length() - 100.0).abs() < 1e-3);
        }
    }

    #[test]
    fn every_element_has_an_owner() {
        let engine = engine(3);
        for (index, panel) in engine.panels().iter().enumerate() {
            assert_eq!(engine.owner_of(panel.card()), Some(index));
            assert_eq!(engine.owner_of(panel.frame()), Some(index));
        }
        assert_eq!(engine.owner_of(ElementId(99)), None);
    }

    #[test]
    fn ray_hits_nearest_card() {
        let engine = engine(4);
        // panel 0 sits at +x facing +x
        let ray = Ray {
            origin: Vec3::new(500.0, 0.0, 0.0),
            direction: Vec3::NEG_X,
        };
        let hit = engine.hit_test(&ray).expect("hit");
        assert_eq!(hit.element, engine.panels()[0].card());
        assert!((hit.distance - 400.0).abs() < 1e-2);
    }

    #[test]
    fn frame_rim_hits_resolve_to_owner() {
        let mut engine = engine(4);
        let size = engine.panels()[0].size;
        // inside the frame's border but outside the card
        let offset = size * 0.5 + size * 0.02;
        let ray = Ray {
            origin: Vec3::new(500.0, offset, 0.0),
            direction: Vec3::NEG_X,
        };
        let hit = engine.hit_test(&ray).expect("hit");
        assert_eq!(hit.element, engine.panels()[0].frame());
        assert_eq!(engine.dispatch_pointer_hit(&ray, 0.0), Some(0));
        assert!(engine.panels()[0].is_flipping());
        assert_eq!(engine.panels()[0].flip().duration_ms, crate::flip::MIN_FLIP_MS);
    }

    #[test]
    fn miss_returns_none() {
        let mut engine = engine(4);
        let ray = Ray {
            origin: Vec3::new(0.0, 500.0, 0.0),
            direction: Vec3::Y,
        };
        assert!(engine.hit_test(&ray).is_none());
        assert_eq!(engine.dispatch_pointer_hit(&ray, 0.0), None);
    }

    #[test]
    fn retrigger_leaves_flip_untouched() {
        let mut engine = engine(2);
        assert!(engine.trigger_flip(0, 1.0, FlipAxis::X, 10.0));
        let before = *engine.panels()[0].flip();
        assert!(!engine.trigger_flip(0, 3.0, FlipAxis::Y, 50.0));
        assert_eq!(*engine.panels()[0].flip(), before);
        assert!(!engine.trigger_flip(7, 1.0, FlipAxis::X, 0.0));
    }

    #[test]
    fn idle_cycle_waits_for_threshold_and_interval() {
        let mut engine = engine(4);
        assert_eq!(engine.idle_auto_cycle(10_000.0, 4_999.0), None);
        assert_eq!(engine.auto_attempts(), 0);

        engine.idle_auto_cycle(10_000.0, 5_000.0);
        assert_eq!(engine.auto_attempts(), 1);
        assert_eq!(engine.last_auto_ms(), 10_000.0);

        engine.idle_auto_cycle(11_399.0, 6_399.0);
        assert_eq!(engine.auto_attempts(), 1);

        engine.idle_auto_cycle(11_400.0, 6_400.0);
        assert_eq!(engine.auto_attempts(), 2);
        assert_eq!(engine.last_auto_ms(), 11_400.0);
    }

    #[test]
    fn pause_shifts_flip_and_timer() {
        let mut engine = engine(2);
        engine.trigger_flip(1, 1.0, FlipAxis::Y, 100.0);
        engine.idle_auto_cycle(100.0, 6_000.0);

        assert!(engine.toggle_pause(200.0));
        assert!(engine.paused());
        assert!(!engine.toggle_pause(1_200.0));

        assert_eq!(engine.panels()[1].flip().start_ms, 1_100.0);
        assert_eq!(engine.last_auto_ms(), 1_100.0);
    }
}
