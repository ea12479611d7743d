//! Tesseract topology, 4D rotation and the two-stage perspective projection
//!
//! The canonical vertex set is generated once and never mutated; every frame works on
//! rotated copies. Rotation is composed plane by plane in a fixed order, since rotations
//! in different planes do not commute.

use common::map_clamped;
use glam::{Vec2, Vec4};

use crate::constants::{
    CAMERA_Z_NEAR, CAMERA_Z_FAR, PROJECTION_SCALE, W_FACTOR_FAR, W_FACTOR_NEAR, Z_SCALE,
};

/// Number of tesseract vertices (2^4)
pub const VERTEX_COUNT: usize = 16;

/// Number of tesseract edges (4 * 2^3)
pub const EDGE_COUNT: usize = 32;

/// One of the six coordinate planes of 4D space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plane {
    XY,
    XZ,
    XW,
    YZ,
    YW,
    ZW,
}

impl Plane {
    /// Composition order used for every frame
    pub const ORDER: [Plane; 6] = [
        Plane::XY,
        Plane::XZ,
        Plane::XW,
        Plane::YZ,
        Plane::YW,
        Plane::ZW,
    ];

    /// Indices of the two axes spanning this plane
    pub fn axes(self) -> (usize, usize) {
        match self {
            Plane::XY => (0, 1),
            Plane::XZ => (0, 2),
            Plane::XW => (0, 3),
            Plane::YZ => (1, 2),
            Plane::YW => (1, 3),
            Plane::ZW => (2, 3),
        }
    }
}

/// Rotate a 4D point by `angle` radians within a single coordinate plane
pub fn rotate4d(p: Vec4, plane: Plane, angle: f32) -> Vec4 {
    let (a, b) = plane.axes();
    let (s, c) = angle.sin_cos();
    let mut out = p;
    out[a] = p[a] * c - p[b] * s;
    out[b] = p[a] * s + p[b] * c;
    out
}

/// Edge connecting two vertices that differ in exactly one coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub v1: usize,
    pub v2: usize,
}

/// The 4-cube: 16 vertices in {-1,+1}^4 and its 32 edges
#[derive(Debug, Clone)]
pub struct Tesseract {
    vertices: [Vec4; VERTEX_COUNT],
    edges: Vec<Edge>,
}

impl Tesseract {
    pub fn new() -> Self {
        // Bit d of the index selects the sign of axis d
        let mut vertices = [Vec4::ZERO; VERTEX_COUNT];
        for (i, vertex) in vertices.iter_mut().enumerate() {
            for d in 0..4 {
                vertex[d] = if (i >> d) & 1 == 1 { 1.0 } else { -1.0 };
            }
        }

        let mut edges = Vec::with_capacity(EDGE_COUNT);
        for i in 0..VERTEX_COUNT {
            for j in (i + 1)..VERTEX_COUNT {
                if hamming(vertices[i], vertices[j]) == 1 {
                    edges.push(Edge { v1: i, v2: j });
                }
            }
        }

        Self { vertices, edges }
    }

    pub fn vertices(&self) -> &[Vec4; VERTEX_COUNT] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Rotated copies of the canonical vertices
    pub fn rotated(&self, rotation: &Rotation4D) -> [Vec4; VERTEX_COUNT] {
        self.vertices.map(|v| rotation.rotate(v))
    }
}

impl Default for Tesseract {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of coordinates in which two vertices differ
fn hamming(a: Vec4, b: Vec4) -> usize {
    (0..4).filter(|&d| (a[d] - b[d]).abs() > 0.5).count()
}

/// Accumulated rotation angle per coordinate plane
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rotation4D {
    pub xy: f32,
    pub xz: f32,
    pub xw: f32,
    pub yz: f32,
    pub yw: f32,
    pub zw: f32,
}

impl Rotation4D {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn angle(&self, plane: Plane) -> f32 {
        match plane {
            Plane::XY => self.xy,
            Plane::XZ => self.xz,
            Plane::XW => self.xw,
            Plane::YZ => self.yz,
            Plane::YW => self.yw,
            Plane::ZW => self.zw,
        }
    }

    fn angle_mut(&mut self, plane: Plane) -> &mut f32 {
        match plane {
            Plane::XY => &mut self.xy,
            Plane::XZ => &mut self.xz,
            Plane::XW => &mut self.xw,
            Plane::YZ => &mut self.yz,
            Plane::YW => &mut self.yw,
            Plane::ZW => &mut self.zw,
        }
    }

    /// Advance every plane by `base_speed` times its pointer-modulated coefficient.
    /// `nx`/`ny` are the pointer position in [-1,1].
    pub fn advance(&mut self, base_speed: f32, nx: f32, ny: f32) {
        for plane in Plane::ORDER {
            *self.angle_mut(plane) += base_speed * plane_coefficient(plane, nx, ny);
        }
    }

    /// Apply all six plane rotations in [`Plane::ORDER`]
    pub fn rotate(&self, p: Vec4) -> Vec4 {
        Plane::ORDER
            .iter()
            .fold(p, |acc, &plane| rotate4d(acc, plane, self.angle(plane)))
    }
}

/// Per-plane rate multiplier: a fixed base plus a pointer-dependent term, so each plane
/// reacts to a different pointer axis.
pub fn plane_coefficient(plane: Plane, nx: f32, ny: f32) -> f32 {
    match plane {
        Plane::XY => 0.6 + 0.4 * nx,
        Plane::XZ => 0.4 + 0.3 * ny,
        Plane::XW => 0.9 + 0.6 * nx,
        Plane::YZ => 0.3 - 0.2 * ny,
        Plane::YW => 0.7 + 0.5 * ny,
        Plane::ZW => 0.5 - 0.4 * nx,
    }
}

/// A vertex projected to the screen, keeping the depth values used along the way
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// Screen position in pixels
    pub screen: Vec2,
    /// z after the 4D→3D stage
    pub depth: f32,
    /// Original w coordinate of the rotated vertex
    pub w: f32,
}

/// Per-frame projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub center: Vec2,
    /// Pixels per unit coordinate
    pub scale: f32,
    /// Camera distance for the 3D→2D stage
    pub camera_z: f32,
}

impl Projection {
    /// Projection for a surface of `size` with the pointer at height `pointer_y` (pixels)
    pub fn for_surface(size: Vec2, pointer_y: f32) -> Self {
        Self {
            center: size * 0.5,
            scale: size.min_element() * PROJECTION_SCALE,
            camera_z: map_clamped(pointer_y, (0.0, size.y), (CAMERA_Z_NEAR, CAMERA_Z_FAR)),
        }
    }

    /// Scale applied to x and y by the 4D→3D stage: extreme w shrinks or grows the point
    pub fn w_factor(w: f32) -> f32 {
        map_clamped(w, (-2.0, 2.0), (W_FACTOR_NEAR, W_FACTOR_FAR))
    }

    /// Project a rotated 4D point. Returns `None` when the point lands on or behind the
    /// camera plane, or the arithmetic degenerates.
    pub fn project(&self, p: Vec4) -> Option<ProjectedPoint> {
        let factor = Self::w_factor(p.w);
        let x3 = p.x * factor * self.scale;
        let y3 = p.y * factor * self.scale;
        let z3 = p.z * Z_SCALE * self.scale;

        let denom = self.camera_z - z3;
        if denom <= f32::EPSILON {
            return None;
        }
        let perspective = self.camera_z / denom;
        let screen = self.center + Vec2::new(x3, y3) * perspective;
        if !screen.is_finite() {
            return None;
        }

        Some(ProjectedPoint {
            screen,
            depth: z3,
            w: p.w,
        })
    }
}
