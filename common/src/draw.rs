//! Abstract immediate-mode drawing surface
//!
//! Engines never talk to the GPU directly. They issue primitive draw calls against a
//! [`Canvas2D`]; backends decide how to turn them into pixels. [`DrawList`] records the
//! calls so a backend can consume them later, and so tests can inspect them.

use glam::Vec2;

/// Straight-alpha RGBA colour, components in [0,1]
pub type Color = [f32; 4];

/// Build a colour from 8-bit components
pub fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Color {
    [
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        a as f32 / 255.0,
    ]
}

/// Replace the alpha of a colour
pub fn with_alpha(color: Color, alpha: f32) -> Color {
    [color[0], color[1], color[2], alpha.clamp(0.0, 1.0)]
}

/// Linear remap of `value` from one range to another, without clamping
pub fn map_range(value: f32, from: (f32, f32), to: (f32, f32)) -> f32 {
    let span = from.1 - from.0;
    if span.abs() < f32::EPSILON {
        return to.0;
    }
    to.0 + (value - from.0) / span * (to.1 - to.0)
}

/// Linear remap with the input clamped to its source range first
pub fn map_clamped(value: f32, from: (f32, f32), to: (f32, f32)) -> f32 {
    let (lo, hi) = if from.0 <= from.1 { from } else { (from.1, from.0) };
    map_range(value.clamp(lo, hi), from, to)
}

/// Stroke colour and width for outlines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

impl Stroke {
    pub fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

/// A 2D immediate-mode surface in pixel coordinates (origin top-left, y down)
pub trait Canvas2D {
    /// Surface size in pixels
    fn size(&self) -> Vec2;

    /// Paint the whole surface with a (usually translucent) colour
    fn fill(&mut self, color: Color);

    fn line(&mut self, a: Vec2, b: Vec2, stroke: Stroke);

    /// Closed outline through `points`
    fn polygon(&mut self, points: &[Vec2], stroke: Stroke);

    /// Filled axis-aligned ellipse; `size` is the full width and height
    fn ellipse(&mut self, center: Vec2, size: Vec2, color: Color);
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Fill(Color),
    Line { a: Vec2, b: Vec2, stroke: Stroke },
    Polygon { points: Vec<Vec2>, stroke: Stroke },
    Ellipse { center: Vec2, size: Vec2, color: Color },
}

/// Canvas that records draw calls for a backend to replay
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    size: Vec2,
    commands: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop recorded commands, optionally adopting a new surface size
    pub fn reset(&mut self, size: Vec2) {
        self.size = size;
        self.commands.clear();
    }
}

impl Canvas2D for DrawList {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn fill(&mut self, color: Color) {
        self.commands.push(DrawCmd::Fill(color));
    }

    fn line(&mut self, a: Vec2, b: Vec2, stroke: Stroke) {
        self.commands.push(DrawCmd::Line { a, b, stroke });
    }

    fn polygon(&mut self, points: &[Vec2], stroke: Stroke) {
        self.commands.push(DrawCmd::Polygon {
            points: points.to_vec(),
            stroke,
        });
    }

    fn ellipse(&mut self, center: Vec2, size: Vec2, color: Color) {
        self.commands.push(DrawCmd::Ellipse {
            center,
            size,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_clamped_handles_reversed_targets() {
        assert_eq!(map_clamped(0.0, (0.0, 8.0), (180.0, 30.0)), 180.0);
        assert_eq!(map_clamped(8.0, (0.0, 8.0), (180.0, 30.0)), 30.0);
        assert_eq!(map_clamped(100.0, (0.0, 8.0), (180.0, 30.0)), 30.0);
        assert_eq!(map_clamped(-3.0, (-2.0, 2.0), (1.4, 0.3)), 1.4);
    }

    #[test]
    fn draw_list_records_in_order() {
        let mut list = DrawList::new(Vec2::new(10.0, 10.0));
        list.fill(rgba8(0, 0, 0, 20));
        list.line(Vec2::ZERO, Vec2::ONE, Stroke::new(rgba8(255, 255, 255, 255), 1.0));
        assert_eq!(list.len(), 2);
        assert!(matches!(list.commands()[0], DrawCmd::Fill(_)));
        list.reset(Vec2::new(20.0, 20.0));
        assert!(list.is_empty());
        assert_eq!(list.size(), Vec2::new(20.0, 20.0));
    }
}
