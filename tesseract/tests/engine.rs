//! Engine scenarios driven through the public API with a recording canvas.
use common::{DrawCmd, DrawList, FrameInput, PointerClock};
use glam::Vec2;
use tesseract::burst::shimmer_outlines;
use tesseract::constants::{MAX_SHIMMER_OUTLINES, TRAIL_LENGTH};
use tesseract::{HypercubeConfig, HypercubeEngine};

const SIZE: Vec2 = Vec2::new(800.0, 600.0);

fn run(
    engine: &mut HypercubeEngine,
    clock: &mut PointerClock,
    now_ms: f64,
) -> (FrameInput, DrawList) {
    let frame = clock.begin_frame(now_ms);
    let mut canvas = DrawList::new(frame.size);
    engine.tick(&frame, &mut canvas);
    (frame, canvas)
}

fn count_lines(canvas: &DrawList) -> usize {
    canvas
        .commands()
        .iter()
        .filter(|c| matches!(c, DrawCmd::Line { .. }))
        .count()
}

#[test]
fn oldest_ghost_after_fifty_ticks_is_tick_nine() {
    let mut engine = HypercubeEngine::seeded(HypercubeConfig::default(), 11);
    let mut clock = PointerClock::new(SIZE.x, SIZE.y, 0.0);
    for i in 0..50 {
        clock.pointer_moved(Vec2::new(100.0 + i as f32 * 3.0, 200.0), i as f64 * 16.0);
        run(&mut engine, &mut clock, i as f64 * 16.0);
    }
    assert_eq!(engine.trail().len(), TRAIL_LENGTH);
    assert_eq!(engine.trail().oldest().unwrap().tick, 9);
}

#[test]
fn sudden_jerk_fires_one_burst_then_cools_down() {
    let mut engine = HypercubeEngine::seeded(HypercubeConfig::default(), 5);
    let mut clock = PointerClock::new(SIZE.x, SIZE.y, 0.0);
    clock.pointer_moved(Vec2::new(400.0, 300.0), 0.0);
    run(&mut engine, &mut clock, 0.0);

    // One big jump: velocity rises well above the threshold in a single tick
    clock.pointer_moved(Vec2::new(760.0, 300.0), 16.0);
    let (_, canvas) = run(&mut engine, &mut clock, 16.0);
    let shards = engine.frame().unwrap().shards.len();
    assert!((10..=40).contains(&shards), "shards = {}", shards);
    // 2 ghost frames + current edges + 3 pieces per shard
    assert_eq!(count_lines(&canvas), 64 + 32 + shards * 3);

    // Jerking back and forth during the cooldown does not fire again
    for i in 0..12 {
        let x = if i % 2 == 0 { 40.0 } else { 760.0 };
        let now = 32.0 + i as f64 * 16.0;
        clock.pointer_moved(Vec2::new(x, 300.0), now);
        run(&mut engine, &mut clock, now);
        assert!(engine.frame().unwrap().shards.is_empty());
    }
}

#[test]
fn shards_are_not_kept_in_history() {
    let mut engine = HypercubeEngine::seeded(HypercubeConfig::default(), 5);
    let mut clock = PointerClock::new(SIZE.x, SIZE.y, 0.0);
    run(&mut engine, &mut clock, 0.0);
    clock.pointer_moved(Vec2::new(20.0, 20.0), 16.0);
    run(&mut engine, &mut clock, 16.0);
    assert!(engine.trail().iter().all(|f| f.segments.len() == 32));
}

#[test]
fn lingering_grows_shimmer_up_to_cap() {
    let mut engine = HypercubeEngine::seeded(HypercubeConfig::default(), 2);
    let mut clock = PointerClock::new(SIZE.x, SIZE.y, 0.0);
    let mut last = DrawList::new(SIZE);
    for i in 0..400 {
        last = run(&mut engine, &mut clock, i as f64 * 50.0).1;
    }
    let linger = engine.frame().unwrap().linger_secs;
    assert_eq!(shimmer_outlines(linger), MAX_SHIMMER_OUTLINES);

    let polygons = last
        .commands()
        .iter()
        .filter(|c| matches!(c, DrawCmd::Polygon { .. }))
        .count();
    // shimmer outlines plus the HUD ring
    assert_eq!(polygons, MAX_SHIMMER_OUTLINES + 1);
}

#[test]
fn same_seed_same_pictures() {
    let mut a = HypercubeEngine::seeded(HypercubeConfig::default(), 99);
    let mut b = HypercubeEngine::seeded(HypercubeConfig::default(), 99);
    let mut clock_a = PointerClock::new(SIZE.x, SIZE.y, 0.0);
    let mut clock_b = PointerClock::new(SIZE.x, SIZE.y, 0.0);
    for i in 0..30 {
        let p = Vec2::new((i * 97 % 800) as f32, (i * 53 % 600) as f32);
        let now = i as f64 * 16.0;
        clock_a.pointer_moved(p, now);
        clock_b.pointer_moved(p, now);
        let (_, ca) = run(&mut a, &mut clock_a, now);
        let (_, cb) = run(&mut b, &mut clock_b, now);
        assert_eq!(ca.commands(), cb.commands());
    }
}

#[test]
fn clear_trail_empties_history() {
    let mut engine = HypercubeEngine::seeded(HypercubeConfig::default(), 1);
    let mut clock = PointerClock::new(SIZE.x, SIZE.y, 0.0);
    for i in 0..5 {
        run(&mut engine, &mut clock, i as f64 * 16.0);
    }
    engine.clear_trail();
    assert!(engine.trail().is_empty());
}
