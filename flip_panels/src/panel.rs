//! Panels: placement, orientation and the per-panel flip lifecycle

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{EulerRot, Mat4, Vec3};
use rand::Rng;

use crate::constants;
use crate::flip::{FlipAxis, FlipEvent, FlipState};
use crate::text::{TextRasterizer, TextTexture};
use crate::zone::{Zone, ZoneConfig};

/// Handle of a visual element (card or decorative frame) in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

/// Visual elements a panel is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Card,
    Frame,
}

impl ElementKind {
    /// Half extent of the element's quad for a panel of the given size
    pub fn half_extent(self, size: f32) -> f32 {
        match self {
            ElementKind::Card => size * 0.5,
            ElementKind::Frame => size * constants::FRAME_SCALE * 0.5,
        }
    }

    /// Offset along the panel's local z axis
    pub fn depth_offset(self) -> f32 {
        match self {
            ElementKind::Card => 0.0,
            ElementKind::Frame => constants::FRAME_DEPTH,
        }
    }
}

/// Evenly spaced angles around a circle, starting at `offset`
pub fn ring_angles(count: usize, offset: f32) -> Vec<f32> {
    (0..count)
        .map(|i| offset + i as f32 * TAU / count as f32)
        .collect()
}

/// Where a panel sits and how it is turned
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    /// Euler angles (pitch about x, yaw about y, roll about z)
    pub rotation: Vec3,
    /// Un-jittered angle on the zone's ring
    pub layout_angle: f32,
}

impl Placement {
    /// Exact ring position, facing outwards from the centre
    pub fn on_ring(config: &ZoneConfig, angle: f32) -> Self {
        Self {
            position: Vec3::new(
                angle.cos() * config.radius,
                config.y_offset,
                angle.sin() * config.radius,
            ),
            rotation: Vec3::new(0.0, FRAC_PI_2 - angle, 0.0),
            layout_angle: angle,
        }
    }

    /// Ring position with bounded random jitter on radius, height and orientation
    pub fn jittered<R: Rng>(config: &ZoneConfig, angle: f32, rng: &mut R) -> Self {
        let radius = config.radius
            * (1.0 + rng.gen_range(-constants::RADIUS_JITTER..=constants::RADIUS_JITTER));
        let y = config.y_offset + rng.gen_range(-constants::Y_JITTER..=constants::Y_JITTER);
        Self {
            position: Vec3::new(angle.cos() * radius, y, angle.sin() * radius),
            rotation: Vec3::new(
                rng.gen_range(-constants::PITCH_JITTER..=constants::PITCH_JITTER),
                FRAC_PI_2 - angle
                    + rng.gen_range(-constants::YAW_JITTER..=constants::YAW_JITTER),
                rng.gen_range(-constants::ROLL_JITTER..=constants::ROLL_JITTER),
            ),
            layout_angle: angle,
        }
    }
}

/// A flip-panel: a text card with a frame, cycling through its texts
#[derive(Debug, Clone)]
pub struct Panel {
    pub zone: Zone,
    pub position: Vec3,
    pub rotation: Vec3,
    pub size: f32,
    pub layout_angle: f32,
    texts: Vec<String>,
    text_index: usize,
    texture: TextTexture,
    flip: FlipState,
    card: ElementId,
    frame: ElementId,
}

impl Panel {
    /// Build a panel showing its first text
    pub fn new(
        zone: Zone,
        placement: Placement,
        texts: Vec<String>,
        rasterizer: &mut dyn TextRasterizer,
        elements: (ElementId, ElementId),
    ) -> Self {
        let first = texts.first().map(String::as_str).unwrap_or("");
        let texture = rasterizer.rasterize(first, &zone.text_style());
        Self {
            zone,
            position: placement.position,
            rotation: placement.rotation,
            size: zone.style().panel_size,
            layout_angle: placement.layout_angle,
            texts,
            text_index: 0,
            texture,
            flip: FlipState::default(),
            card: elements.0,
            frame: elements.1,
        }
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn text_index(&self) -> usize {
        self.text_index
    }

    pub fn current_text(&self) -> &str {
        self.texts
            .get(self.text_index)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn texture(&self) -> &TextTexture {
        &self.texture
    }

    pub fn flip(&self) -> &FlipState {
        &self.flip
    }

    pub fn is_flipping(&self) -> bool {
        self.flip.active
    }

    pub fn card(&self) -> ElementId {
        self.card
    }

    pub fn frame(&self) -> ElementId {
        self.frame
    }

    pub fn elements(&self) -> [(ElementId, ElementKind); 2] {
        [(self.card, ElementKind::Card), (self.frame, ElementKind::Frame)]
    }

    fn axis_angle(&self, axis: FlipAxis) -> f32 {
        match axis {
            FlipAxis::X => self.rotation.x,
            FlipAxis::Y => self.rotation.y,
        }
    }

    fn set_axis_angle(&mut self, axis: FlipAxis, angle: f32) {
        match axis {
            FlipAxis::X => self.rotation.x = angle,
            FlipAxis::Y => self.rotation.y = angle,
        }
    }

    /// Start a flip; a no-op returning false while one is in flight
    pub fn trigger_flip(&mut self, now_ms: f64, speed_factor: f32, axis: FlipAxis) -> bool {
        let origin = self.axis_angle(axis);
        self.flip.start(now_ms, speed_factor, axis, origin)
    }

    /// Advance the flip; at the midpoint the next text is rasterized and shown
    pub fn advance(&mut self, now_ms: f64, rasterizer: &mut dyn TextRasterizer) -> FlipEvent {
        let axis = self.flip.axis;
        let (event, angle) = self.flip.advance(now_ms);
        if event == FlipEvent::Idle {
            return event;
        }

        self.set_axis_angle(axis, angle);
        if event.swapped() {
            self.text_index = (self.text_index + 1) % self.texts.len().max(1);
            self.texture = rasterizer.rasterize(self.current_text(), &self.zone.text_style());
        }
        event
    }

    /// Push an in-flight flip later, e.g. to skip a paused interval
    pub fn delay_flip(&mut self, delta_ms: f64) {
        self.flip.shift(delta_ms);
    }

    /// Local-to-world transform of the panel
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_euler(
                EulerRot::YXZ,
                self.rotation.y,
                self.rotation.x,
                self.rotation.z,
            )
    }
}
