//! Perspective camera looking at a fixed target

use glam::{Mat4, Vec3};

/// Simple perspective camera used by the renderer
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// Camera position
    pub eye: Vec3,
    /// Point the camera is looking at
    pub target: Vec3,
    /// Up vector
    pub up: Vec3,
    /// Render target aspect ratio
    pub aspect: f32,
    /// Field of view in radians
    pub fovy: f32,
    /// Near clipping plane distance
    pub znear: f32,
    /// Far clipping plane distance
    pub zfar: f32,
}

impl Camera {
    /// Create a camera from a vertical field of view given in degrees
    #[must_use]
    pub fn new(eye: Vec3, target: Vec3, fovy_degrees: f32, znear: f32, zfar: f32) -> Self {
        Self {
            eye,
            target,
            up: Vec3::Y,
            aspect: 16.0 / 9.0,
            fovy: fovy_degrees.to_radians(),
            znear,
            zfar,
        }
    }

    /// Update aspect ratio when the window is resized
    #[allow(clippy::cast_precision_loss)]
    pub fn resize(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize_or_zero()
    }

    /// Computes a view projection matrix from the camera parameters
    #[must_use]
    pub fn build_view_projection_matrix(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let proj = Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 20.0, -22.0), Vec3::ZERO, 60.0, 0.2, 2000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_projects_to_screen_centre() {
        let camera = Camera::default();
        let clip = camera.build_view_projection_matrix() * camera.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5, "ndc={ndc}");
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn resize_ignores_zero_height() {
        let mut camera = Camera::default();
        camera.resize(800, 0);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);
        camera.resize(800, 400);
        assert!((camera.aspect - 2.0).abs() < 1e-6);
    }
}
