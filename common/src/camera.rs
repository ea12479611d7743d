//! Camera system for 2D canvases and 3D scenes

use glam::{Mat4, Vec2, Vec3};

/// 2D orthographic camera whose world units are surface pixels
/// (origin top-left, y down)
#[derive(Debug, Clone)]
pub struct Camera2D {
    pub extent: Vec2,
}

impl Camera2D {
    pub fn pixel_space(width: f32, height: f32) -> Self {
        Self {
            extent: Vec2::new(width.max(1.0), height.max(1.0)),
        }
    }

    /// Get the view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        Mat4::orthographic_rh(0.0, self.extent.x, self.extent.y, 0.0, -1.0, 1.0)
    }

    pub fn update_pixel_extent(&mut self, width: f32, height: f32) {
        self.extent = Vec2::new(width.max(1.0), height.max(1.0));
    }
}

/// A ray in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// 3D perspective camera
#[derive(Debug, Clone)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera3D {
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 3.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 45.0f32.to_radians(),
            aspect_ratio,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn look_at(&mut self, eye: Vec3, target: Vec3) {
        self.position = eye;
        self.target = target;
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// Get the combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn update_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Project a world point to normalized device coordinates (y up).
    /// Returns `None` for points behind the camera.
    pub fn project(&self, point: Vec3) -> Option<(Vec2, f32)> {
        let clip = self.view_projection() * point.extend(1.0);
        if clip.w <= 1e-5 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some((ndc.truncate(), ndc.z))
    }

    /// World-space ray through a point given in normalized device coordinates (y up)
    pub fn screen_ray(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray {
            origin: near,
            direction: (far - near).normalize_or_zero(),
        }
    }
}

/// Camera uniform data for shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera_2d(camera: &Camera2D) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            position: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_space_maps_corners_to_ndc() {
        let camera = Camera2D::pixel_space(800.0, 600.0);
        let vp = camera.view_projection();
        let top_left = vp.project_point3(Vec3::new(0.0, 0.0, 0.0));
        let bottom_right = vp.project_point3(Vec3::new(800.0, 600.0, 0.0));
        assert!((top_left.x + 1.0).abs() < 1e-5 && (top_left.y - 1.0).abs() < 1e-5);
        assert!((bottom_right.x - 1.0).abs() < 1e-5 && (bottom_right.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn screen_ray_through_centre_hits_target() {
        let mut camera = Camera3D::new(16.0 / 9.0);
        camera.look_at(Vec3::new(0.0, 0.0, 50.0), Vec3::ZERO);
        let ray = camera.screen_ray(Vec2::ZERO);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
        assert!(ray.at(ray.origin.z).length() < 1e-3);
        let (ndc, _) = camera.project(Vec3::ZERO).unwrap();
        assert!(ndc.length() < 1e-4);
    }

    #[test]
    fn points_behind_camera_do_not_project() {
        let mut camera = Camera3D::new(1.0);
        camera.look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        assert!(camera.project(Vec3::new(0.0, 0.0, 20.0)).is_none());
    }
}
