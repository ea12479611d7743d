//! Hypercube engine: one simulation step and one set of draw calls per tick

use common::{map_clamped, rgba8, with_alpha, Canvas2D, Color, FrameInput, Stroke};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::burst::{shimmer_outlines, BurstEmitter, Motion, MotionTracker, Shard};
use crate::constants::*;
use crate::hypercube::{ProjectedPoint, Projection, Rotation4D, Tesseract, VERTEX_COUNT};
use crate::trail::{ghost_style, TrailFrame, TrailHistory};

const TRAIL_COLOR: [u8; 3] = [150, 200, 255];
const EDGE_COLOR_NEAR: [u8; 3] = [255, 196, 140];
const EDGE_COLOR_FAR: [u8; 3] = [140, 210, 255];
const SHARD_COLOR: [u8; 3] = [255, 250, 235];
const SHIMMER_COLOR: [u8; 3] = [200, 230, 255];
const RING_SEGMENTS: usize = 64;

/// Engine settings
#[derive(Debug, Clone)]
pub struct HypercubeConfig {
    pub trail_length: usize,
    pub burst_threshold: f32,
    pub burst_cooldown_ticks: u32,
    pub linger_velocity: f32,
    /// Wipe the accumulated canvas when the surface is resized
    pub clear_on_resize: bool,
}

impl Default for HypercubeConfig {
    fn default() -> Self {
        Self {
            trail_length: TRAIL_LENGTH,
            burst_threshold: BURST_THRESHOLD,
            burst_cooldown_ticks: BURST_COOLDOWN_TICKS,
            linger_velocity: LINGER_VELOCITY,
            clear_on_resize: false,
        }
    }
}

/// Everything computed by the latest step that rendering needs
#[derive(Debug, Clone)]
pub struct FrameState {
    pub projection: Projection,
    pub points: [Option<ProjectedPoint>; VERTEX_COUNT],
    pub motion: Motion,
    pub linger_secs: f32,
    /// Shards of a burst fired this tick; never kept past the frame
    pub shards: Vec<Shard>,
}

/// Rotating tesseract with ghost trails, bursts and linger shimmer
pub struct HypercubeEngine<R: Rng = StdRng> {
    config: HypercubeConfig,
    tesseract: Tesseract,
    rotation: Rotation4D,
    trail: TrailHistory,
    motion: MotionTracker,
    bursts: BurstEmitter,
    rng: R,
    ticks: u64,
    paused: bool,
    frame: Option<FrameState>,
}

impl HypercubeEngine<StdRng> {
    /// Engine with an entropy-seeded RNG
    pub fn new(config: HypercubeConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Engine with a reproducible RNG
    pub fn seeded(config: HypercubeConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> HypercubeEngine<R> {
    pub fn with_rng(config: HypercubeConfig, rng: R) -> Self {
        let tesseract = Tesseract::new();
        log::info!(
            "tesseract initialised: {} vertices, {} edges, {} trail frames",
            tesseract.vertices().len(),
            tesseract.edges().len(),
            config.trail_length
        );

        Self {
            trail: TrailHistory::new(config.trail_length),
            bursts: BurstEmitter::new(config.burst_threshold, config.burst_cooldown_ticks),
            config,
            tesseract,
            rotation: Rotation4D::new(),
            motion: MotionTracker::new(),
            rng,
            ticks: 0,
            paused: false,
            frame: None,
        }
    }

    pub fn config(&self) -> &HypercubeConfig {
        &self.config
    }

    pub fn tesseract(&self) -> &Tesseract {
        &self.tesseract
    }

    pub fn rotation(&self) -> &Rotation4D {
        &self.rotation
    }

    pub fn trail(&self) -> &TrailHistory {
        &self.trail
    }

    /// State of the most recent step, if any
    pub fn frame(&self) -> Option<&FrameState> {
        self.frame.as_ref()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Freeze or resume tick progression
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        if !self.paused {
            // Pointer travel during the pause must not read as a sudden jump
            self.motion = MotionTracker::new();
        }
        log::info!("tesseract {}", if self.paused { "paused" } else { "resumed" });
    }

    /// Forget the ghost history
    pub fn clear_trail(&mut self) {
        self.trail.clear();
    }

    /// Advance one tick and draw it. Returns false when paused (nothing drawn).
    pub fn tick(&mut self, input: &FrameInput, canvas: &mut impl Canvas2D) -> bool {
        if self.paused {
            return false;
        }
        self.step(input);
        self.render(canvas);
        true
    }

    /// Simulation half of a tick: rotate, project, detect bursts, record the trail
    pub fn step(&mut self, input: &FrameInput) -> &FrameState {
        self.ticks += 1;

        let signed = input.signed();
        let motion = self.motion.update(input.pointer, input.dt, self.config.linger_velocity);
        let boost = map_clamped(
            motion.displacement,
            (0.0, DISPLACEMENT_CAP),
            (0.0, SPEED_BOOST),
        );
        let base_speed = BASE_SPEED + boost;
        self.rotation.advance(base_speed, signed.x, signed.y);

        let projection = Projection::for_surface(input.size, input.pointer.y);
        let points = self
            .tesseract
            .rotated(&self.rotation)
            .map(|p| projection.project(p));

        let segments = edge_segments(&self.tesseract, &points);
        if segments.len() < self.tesseract.edges().len() {
            log::trace!(
                "skipped {} degenerate edges",
                self.tesseract.edges().len() - segments.len()
            );
        }

        let midpoints: Vec<Vec2> = segments.iter().map(|(a, b)| (*a + *b) * 0.5).collect();
        let shards = self
            .bursts
            .update(motion, &midpoints, &mut self.rng)
            .unwrap_or_default();

        self.trail.push(TrailFrame {
            tick: self.ticks,
            segments,
        });

        self.frame.insert(FrameState {
            projection,
            points,
            motion,
            linger_secs: self.motion.linger_secs(),
            shards,
        })
    }

    /// Drawing half of a tick. Draws nothing before the first step.
    pub fn render(&self, canvas: &mut impl Canvas2D) {
        let Some(frame) = self.frame.as_ref() else {
            return;
        };
        let velocity = frame.motion.velocity;
        let center = frame.projection.center;

        // Fade whatever the surface accumulated so far
        canvas.fill(rgba8(0, 0, 0, FADE_ALPHA));

        // Ghosts, oldest first
        let len = self.trail.len();
        for (i, ghost) in self.trail.iter().enumerate() {
            let (alpha, width) = ghost_style(i, len);
            let stroke = Stroke::new(with_alpha(color3(TRAIL_COLOR), alpha), width);
            for (a, b) in &ghost.segments {
                canvas.line(*a, *b, stroke);
            }
        }

        // Current edges, tinted by their mean w
        let width = (1.2 + velocity * 0.35).clamp(1.2, 4.0);
        for edge in self.tesseract.edges() {
            let (Some(a), Some(b)) = (frame.points[edge.v1], frame.points[edge.v2]) else {
                continue;
            };
            let t = map_clamped((a.w + b.w) * 0.5, (-2.0, 2.0), (0.0, 1.0));
            let color = with_alpha(mix(EDGE_COLOR_NEAR, EDGE_COLOR_FAR, t), 235.0 / 255.0);
            canvas.line(a.screen, b.screen, Stroke::new(color, width));
        }

        for shard in &frame.shards {
            draw_shard(canvas, shard);
        }

        let outlines = shimmer_outlines(frame.linger_secs);
        if outlines > 0 {
            let hull = angular_outline(&frame.points, center);
            if hull.len() >= 3 {
                for k in 1..=outlines {
                    let grow = 1.0 + k as f32 * 0.045;
                    let ring: Vec<Vec2> =
                        hull.iter().map(|p| center + (*p - center) * grow).collect();
                    let alpha = (0.32 - 0.03 * k as f32).max(0.04);
                    let color = with_alpha(color3(SHIMMER_COLOR), alpha);
                    canvas.polygon(&ring, Stroke::new(color, 0.6));
                }
            }
        }

        canvas.ellipse(center, Vec2::splat(6.0), rgba8(255, 255, 255, 90));

        let diameter = map_clamped(
            velocity,
            (0.0, VELOCITY_FULL_SCALE),
            (RING_DIAMETER_SLOW, RING_DIAMETER_FAST),
        );
        canvas.polygon(
            &circle_points(center, diameter * 0.5, RING_SEGMENTS),
            Stroke::new(rgba8(180, 220, 255, 70), 0.8),
        );
    }
}

/// Screen segments of every edge whose endpoints both projected
pub fn edge_segments(
    tesseract: &Tesseract,
    points: &[Option<ProjectedPoint>; VERTEX_COUNT],
) -> Vec<(Vec2, Vec2)> {
    tesseract
        .edges()
        .iter()
        .filter_map(|edge| match (points[edge.v1], points[edge.v2]) {
            (Some(a), Some(b)) => Some((a.screen, b.screen)),
            _ => None,
        })
        .collect()
}

/// Projected points ordered by angle around `center`, forming a closed outline
pub fn angular_outline(points: &[Option<ProjectedPoint>], center: Vec2) -> Vec<Vec2> {
    let mut outline: Vec<Vec2> = points.iter().flatten().map(|p| p.screen).collect();
    outline.sort_by(|a, b| {
        let da = *a - center;
        let db = *b - center;
        da.y.atan2(da.x).total_cmp(&db.y.atan2(db.x))
    });
    outline
}

fn circle_points(center: Vec2, radius: f32, segments: usize) -> Vec<Vec2> {
    (0..segments)
        .map(|i| center + Vec2::from_angle(i as f32 / segments as f32 * TAU) * radius)
        .collect()
}

/// A shard fades out along its length in three pieces
fn draw_shard(canvas: &mut impl Canvas2D, shard: &Shard) {
    const PIECES: usize = 3;
    for i in 0..PIECES {
        let t0 = i as f32 / PIECES as f32;
        let t1 = (i + 1) as f32 / PIECES as f32;
        let a = shard.origin + shard.direction * shard.length * t0;
        let b = shard.origin + shard.direction * shard.length * t1;
        let alpha = 0.85 * (1.0 - t0);
        canvas.line(a, b, Stroke::new(with_alpha(color3(SHARD_COLOR), alpha), 1.0));
    }
}

fn color3(rgb: [u8; 3]) -> Color {
    rgba8(rgb[0], rgb[1], rgb[2], 255)
}

fn mix(a: [u8; 3], b: [u8; 3], t: f32) -> Color {
    let a = color3(a);
    let b = color3(b);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        1.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{DrawCmd, DrawList};

    fn still_input(tick: u64) -> FrameInput {
        FrameInput {
            now_ms: tick as f64 * 16.0,
            dt: 0.016,
            idle_ms: 0.0,
            pointer: Vec2::new(400.0, 300.0),
            uv: Vec2::splat(0.5),
            size: Vec2::new(800.0, 600.0),
            pressed: false,
        }
    }

    #[test]
    fn trail_keeps_last_forty_two_ticks() {
        let mut engine = HypercubeEngine::seeded(HypercubeConfig::default(), 3);
        let mut canvas = DrawList::new(Vec2::new(800.0, 600.0));
        for tick in 1..=50 {
            canvas.reset(Vec2::new(800.0, 600.0));
            assert!(engine.tick(&still_input(tick), &mut canvas));
            assert!(engine.trail().len() <= TRAIL_LENGTH);
        }
        assert_eq!(engine.trail().len(), TRAIL_LENGTH);
        assert_eq!(engine.trail().oldest().map(|f| f.tick), Some(9));
        assert_eq!(engine.trail().newest().map(|f| f.tick), Some(50));
    }

    #[test]
    fn still_pointer_rotates_at_base_speed() {
        let mut engine = HypercubeEngine::seeded(HypercubeConfig::default(), 3);
        engine.step(&still_input(1));
        let rotation = engine.rotation();
        assert!((rotation.xy - BASE_SPEED * 0.6).abs() < 1e-7);
        assert!((rotation.xw - BASE_SPEED * 0.9).abs() < 1e-7);
    }

    #[test]
    fn render_order_starts_with_fade_and_ends_with_ring() {
        let mut engine = HypercubeEngine::seeded(HypercubeConfig::default(), 3);
        let mut canvas = DrawList::new(Vec2::new(800.0, 600.0));
        engine.tick(&still_input(1), &mut canvas);

        let commands = canvas.commands();
        assert!(matches!(commands.first(), Some(DrawCmd::Fill(_))));
        assert!(matches!(commands.last(), Some(DrawCmd::Polygon { .. })));
        let lines = commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::Line { .. }))
            .count();
        // one ghost frame plus the current frame
        assert_eq!(lines, 64);
    }

    fn line_widths(canvas: &DrawList) -> Vec<f32> {
        canvas
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Line { stroke, .. } => Some(stroke.width),
                _ => None,
            })
            .collect()
    }

    fn ring_radii(canvas: &DrawList, center: Vec2) -> Vec<f32> {
        match canvas.commands().last() {
            Some(DrawCmd::Polygon { points, .. }) => {
                points.iter().map(|p| p.distance(center)).collect()
            }
            other => panic!("last command is not the ring: {:?}", other),
        }
    }

    #[test]
    fn missing_vertex_drops_its_four_edges() {
        let tesseract = Tesseract::new();
        let projection = Projection::for_surface(Vec2::new(800.0, 600.0), 300.0);
        let mut points = tesseract
            .rotated(&Rotation4D::new())
            .map(|p| projection.project(p));
        assert_eq!(edge_segments(&tesseract, &points).len(), 32);

        points[0] = None;
        assert_eq!(edge_segments(&tesseract, &points).len(), 28);
        points[15] = None;
        assert_eq!(edge_segments(&tesseract, &points).len(), 24);
    }

    #[test]
    fn render_skips_edges_of_unprojected_vertices() {
        let mut engine = HypercubeEngine::seeded(HypercubeConfig::default(), 3);
        engine.step(&still_input(1));
        if let Some(frame) = engine.frame.as_mut() {
            frame.points[0] = None;
        }

        let mut canvas = DrawList::new(Vec2::new(800.0, 600.0));
        engine.render(&mut canvas);
        // full ghost of the step plus the current frame minus four edges
        assert_eq!(line_widths(&canvas).len(), 32 + 28);
        assert!(matches!(canvas.commands().last(), Some(DrawCmd::Polygon { .. })));
    }

    #[test]
    fn still_pointer_draws_thin_edges_and_wide_ring() {
        let mut engine = HypercubeEngine::seeded(HypercubeConfig::default(), 3);
        let mut canvas = DrawList::new(Vec2::new(800.0, 600.0));
        engine.tick(&still_input(1), &mut canvas);

        let center = engine.frame().map(|f| f.projection.center);
        assert_eq!(center, Some(Vec2::new(400.0, 300.0)));
        let radii = ring_radii(&canvas, Vec2::new(400.0, 300.0));
        assert_eq!(radii.len(), RING_SEGMENTS);
        for r in radii {
            assert!((r - RING_DIAMETER_SLOW / 2.0).abs() < 1e-3, "{}", r);
        }

        // current edges are the last lines: no shards without motion
        let widths = line_widths(&canvas);
        for w in &widths[widths.len() - 32..] {
            assert_eq!(*w, 1.2);
        }
    }

    #[test]
    fn fast_pointer_thickens_edges_and_shrinks_ring() {
        let mut engine = HypercubeEngine::seeded(HypercubeConfig::default(), 3);
        let mut canvas = DrawList::new(Vec2::new(800.0, 600.0));
        engine.tick(&still_input(1), &mut canvas);

        let mut jerk = still_input(2);
        jerk.pointer = Vec2::new(790.0, 300.0);
        canvas.reset(Vec2::new(800.0, 600.0));
        engine.tick(&jerk, &mut canvas);

        let velocity = engine.frame().map_or(0.0, |f| f.motion.velocity);
        assert!(velocity > 1.0, "{}", velocity);

        let radii = ring_radii(&canvas, Vec2::new(400.0, 300.0));
        for r in radii {
            assert!(r < RING_DIAMETER_SLOW / 2.0 - 1.0, "{}", r);
        }

        // ghosts never exceed GHOST_WIDTH_NEWEST and shards are 1px
        let thick = line_widths(&canvas)
            .into_iter()
            .filter(|w| *w > GHOST_WIDTH_NEWEST)
            .count();
        assert_eq!(thick, 32);
    }

    #[test]
    fn paused_engine_does_not_advance() {
        let mut engine = HypercubeEngine::seeded(HypercubeConfig::default(), 3);
        let mut canvas = DrawList::new(Vec2::new(800.0, 600.0));
        engine.toggle_pause();
        assert!(!engine.tick(&still_input(1), &mut canvas));
        assert_eq!(engine.ticks(), 0);
        assert!(canvas.is_empty());
    }

    #[test]
    fn outline_is_sorted_by_angle() {
        let center = Vec2::ZERO;
        let pts = [Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0)];
        let points: Vec<Option<ProjectedPoint>> = pts
            .iter()
            .map(|&screen| {
                Some(ProjectedPoint {
                    screen,
                    depth: 0.0,
                    w: 0.0,
                })
            })
            .chain(std::iter::once(None))
            .collect();
        let outline = angular_outline(&points, center);
        assert_eq!(
            outline,
            vec![Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(-1.0, 0.0)]
        );
    }
}
