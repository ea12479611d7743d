//! Panel scene
//!
//! Projects panels through a [`Camera3D`] into screen-space shapes, sorted back
//! to front, and paints them with an egui painter. Additive zones are painted
//! with premultiplied colours of zero alpha, which egui's blend state adds onto
//! whatever is already there.

use common::{with_alpha, Camera3D, Color};
use egui::{Align2, Color32, FontId, Painter, Pos2, Shape};
use glam::{Mat4, Vec2, Vec3};

use crate::constants;
use crate::panel::{ElementKind, Panel};
use crate::zone::{ambient_opacity, BlendMode};

/// A line of card text placed on screen
#[derive(Debug, Clone, PartialEq)]
pub struct SceneText {
    pub text: String,
    pub position: Vec2,
    pub font_px: f32,
    pub color: Color,
}

/// One projected element, ready to paint
#[derive(Debug, Clone, PartialEq)]
pub struct SceneShape {
    pub panel: usize,
    pub kind: ElementKind,
    /// NDC depth of the element centre; larger is farther
    pub depth: f32,
    /// Screen-space corners, in viewport units
    pub corners: [Vec2; 4],
    pub color: Color,
    pub blend: BlendMode,
    pub texts: Vec<SceneText>,
}

/// Camera at its rest position for the given aspect ratio
pub fn scene_camera(aspect_ratio: f32) -> Camera3D {
    let mut camera = Camera3D::new(aspect_ratio);
    camera.fov = 50.0f32.to_radians();
    camera.near = 1.0;
    camera.far = 4000.0;
    camera.look_at(
        Vec3::from(constants::CAMERA_EYE),
        Vec3::from(constants::CAMERA_TARGET),
    );
    camera
}

/// Move the camera slightly with the pointer, keeping its look-at target
pub fn drift_camera(camera: &mut Camera3D, ndc: Vec2) {
    let drift = Vec2::from(constants::CAMERA_DRIFT) * ndc.clamp(Vec2::NEG_ONE, Vec2::ONE);
    let eye = Vec3::from(constants::CAMERA_EYE) + Vec3::new(drift.x, drift.y, 0.0);
    camera.look_at(eye, Vec3::from(constants::CAMERA_TARGET));
}

fn to_viewport(ndc: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(
        (ndc.x + 1.0) * 0.5 * viewport.x,
        (1.0 - ndc.y) * 0.5 * viewport.y,
    )
}

fn project_quad(
    camera: &Camera3D,
    model: Mat4,
    half: f32,
    z: f32,
    viewport: Vec2,
) -> Option<([Vec2; 4], f32)> {
    let local = [
        Vec3::new(-half, half, z),
        Vec3::new(half, half, z),
        Vec3::new(half, -half, z),
        Vec3::new(-half, -half, z),
    ];
    let mut corners = [Vec2::ZERO; 4];
    for (corner, point) in corners.iter_mut().zip(local) {
        let (ndc, _) = camera.project(model.transform_point3(point))?;
        *corner = to_viewport(ndc, viewport);
    }
    let (_, depth) = camera.project(model.transform_point3(Vec3::new(0.0, 0.0, z)))?;
    Some((corners, depth))
}

fn card_texts(
    camera: &Camera3D,
    panel: &Panel,
    model: Mat4,
    corners: &[Vec2; 4],
    opacity: f32,
    viewport: Vec2,
) -> Vec<SceneText> {
    let texture = panel.texture();
    let width = corners[0].distance(corners[1]);
    let height = corners[0].distance(corners[3]);
    let extent = width.max(height);
    if extent <= f32::EPSILON {
        return Vec::new();
    }

    let font_px = texture.font_px / texture.canvas_px * extent;
    if font_px < constants::MIN_TEXT_PX {
        return Vec::new();
    }
    // Edge-on cards fade their text out
    let squash = width.min(height) / extent;
    let color = with_alpha(texture.foreground, opacity * squash);

    texture
        .lines
        .iter()
        .filter_map(|line| {
            let anchor = texture.local_anchor(line) * panel.size;
            let world = model.transform_point3(Vec3::new(anchor.x, anchor.y, 0.5));
            let (ndc, _) = camera.project(world)?;
            Some(SceneText {
                text: line.text.clone(),
                position: to_viewport(ndc, viewport),
                font_px,
                color,
            })
        })
        .collect()
}

/// Project every panel element, sorted back to front
pub fn build_scene(
    camera: &Camera3D,
    panels: &[Panel],
    now_ms: f64,
    viewport: Vec2,
) -> Vec<SceneShape> {
    let mut shapes = Vec::with_capacity(panels.len() * 2);

    for (index, panel) in panels.iter().enumerate() {
        let style = panel.zone.style();
        let ambient = ambient_opacity(panel.zone, now_ms);
        let opacity = (panel.texture().opacity * ambient).clamp(0.0, 1.0);
        let model = panel.model_matrix();

        for (_, kind) in panel.elements() {
            let Some((corners, depth)) = project_quad(
                camera,
                model,
                kind.half_extent(panel.size),
                kind.depth_offset(),
                viewport,
            ) else {
                log::trace!("panel {} {:?} behind camera", index, kind);
                continue;
            };

            let (color, texts) = match kind {
                ElementKind::Card => (
                    with_alpha(panel.texture().background, opacity),
                    card_texts(camera, panel, model, &corners, opacity, viewport),
                ),
                ElementKind::Frame => (with_alpha(style.color, opacity * 0.6), Vec::new()),
            };

            shapes.push(SceneShape {
                panel: index,
                kind,
                depth,
                corners,
                color,
                blend: style.blend,
                texts,
            });
        }
    }

    shapes.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    shapes
}

/// egui colour for a linear RGBA colour under a blend mode
pub fn to_color32(color: Color, blend: BlendMode) -> Color32 {
    let [r, g, b, a] = color.map(|c| c.clamp(0.0, 1.0));
    match blend {
        BlendMode::Normal => Color32::from_rgba_unmultiplied(
            (r * 255.0) as u8,
            (g * 255.0) as u8,
            (b * 255.0) as u8,
            (a * 255.0) as u8,
        ),
        BlendMode::Additive => Color32::from_rgba_premultiplied(
            (r * a * 255.0) as u8,
            (g * a * 255.0) as u8,
            (b * a * 255.0) as u8,
            0,
        ),
    }
}

/// Paint projected shapes with their top-left at `origin`
pub fn paint(painter: &Painter, origin: Pos2, shapes: &[SceneShape]) {
    let at = |p: Vec2| origin + egui::vec2(p.x, p.y);

    for shape in shapes {
        let points: Vec<Pos2> = shape.corners.iter().map(|&c| at(c)).collect();
        let color = to_color32(shape.color, shape.blend);

        match shape.kind {
            ElementKind::Card => {
                painter.add(Shape::convex_polygon(points, color, egui::Stroke::NONE));
            }
            ElementKind::Frame => {
                painter.add(Shape::closed_line(points, egui::Stroke::new(1.5, color)));
            }
        }

        for text in &shape.texts {
            painter.text(
                at(text.position),
                Align2::CENTER_CENTER,
                &text.text,
                FontId::proportional(text.font_px),
                to_color32(text.color, shape.blend),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Layout, PanelFlipEngine};
    use crate::text::CardRasterizer;
    use crate::zone::{Zone, ZoneConfig};
    use rand::{rngs::StdRng, SeedableRng};

    fn engine() -> PanelFlipEngine {
        let mut config = ZoneConfig::new(Zone::Present, 4, 100.0, 0.0, &["hello there"]);
        config.angle_offset = 0.0;
        PanelFlipEngine::build(
            &[config],
            Box::new(CardRasterizer::default()),
            StdRng::seed_from_u64(1),
            Layout::Exact,
        )
    }

    #[test]
    fn shapes_are_sorted_back_to_front() {
        let engine = engine();
        let camera = scene_camera(16.0 / 9.0);
        let shapes = build_scene(&camera, engine.panels(), 0.0, Vec2::new(1280.0, 720.0));
        assert_eq!(shapes.len(), 8);
        for pair in shapes.windows(2) {
            assert!(pair[0].depth >= pair[1].depth);
        }
        // the card nearest the camera (angle π/2, +z) comes last
        assert_eq!(shapes.last().map(|s| s.panel), Some(1));
    }

    #[test]
    fn panels_behind_camera_are_skipped() {
        let engine = engine();
        let mut camera = scene_camera(1.0);
        camera.look_at(Vec3::new(0.0, 0.0, 50.0), Vec3::new(0.0, 0.0, 200.0));
        let shapes = build_scene(&camera, engine.panels(), 0.0, Vec2::splat(800.0));
        assert!(!shapes.is_empty());
        assert!(shapes.iter().all(|s| s.panel == 1));
    }

    #[test]
    fn facing_card_carries_text() {
        let engine = engine();
        let camera = scene_camera(16.0 / 9.0);
        let shapes = build_scene(&camera, engine.panels(), 0.0, Vec2::new(1280.0, 720.0));
        let card = shapes
            .iter()
            .find(|s| s.panel == 1 && s.kind == ElementKind::Card)
            .expect("front card");
        assert_eq!(card.texts.len(), 1);
        assert_eq!(card.texts[0].text, "hello there");
        assert!(card.texts[0].font_px > constants::MIN_TEXT_PX);
    }

    #[test]
    fn additive_colours_have_zero_alpha() {
        let color = to_color32([1.0, 0.5, 0.0, 0.5], BlendMode::Additive);
        assert_eq!(color.a(), 0);
        assert_eq!(color.r(), 127);
        let normal = to_color32([1.0, 0.5, 0.0, 0.5], BlendMode::Normal);
        assert_eq!(normal.a(), 127);
    }

    #[test]
    fn drift_keeps_target() {
        let mut camera = scene_camera(1.0);
        drift_camera(&mut camera, Vec2::new(1.0, -1.0));
        assert_eq!(camera.target, Vec3::from(constants::CAMERA_TARGET));
        assert!((camera.position.x - 120.0).abs() < 1e-3);
        assert!((camera.position.y - 30.0).abs() < 1e-3);
    }
}
