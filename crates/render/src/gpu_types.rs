//! GPU-compatible type definitions for rendering
//!
//! All types are `Pod` so they can be copied straight into buffers.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::camera::Camera;

/// One vertex of the flat-shaded triangle list
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

/// Uniform holding the camera matrix and the lighting terms
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    /// Combined view projection matrix used by the vertex shader
    pub view_proj: [[f32; 4]; 4],
    /// Direction the directional light travels in, w unused
    pub light_dir: [f32; 4],
    /// Ambient intensity in x, rest unused
    pub ambient: [f32; 4],
}

impl CameraUniform {
    /// Light shining straight down from above the table
    #[must_use]
    pub fn new(camera: &Camera) -> Self {
        let light = Vec3::NEG_Y;
        Self {
            view_proj: camera.build_view_projection_matrix().to_cols_array_2d(),
            light_dir: light.extend(0.0).to_array(),
            ambient: [0.45, 0.0, 0.0, 0.0],
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera) {
        self.view_proj = camera.build_view_projection_matrix().to_cols_array_2d();
    }
}
