//! Curved corner walls
//!
//! A flat grid in the XY plane is bent along its width into a circular arc
//! through both end points and a middle point raised by the sagitta. The
//! bent grid is both the (hidden) visual mesh and the static triangle mesh
//! the ball collides with.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Vec2, Vec3};
use physics::TriangleMesh;
use render::Geometry;

/// Indexed grid with per-vertex texture coordinates
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneGrid {
    pub width: f32,
    pub height: f32,
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<[u32; 3]>,
}

impl PlaneGrid {
    /// A `width` x `height` plane centred on the origin, facing +Z, with
    /// rows running from the top edge down.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Self {
        let columns = width_segments.max(1);
        let rows = height_segments.max(1);
        let segment_width = width / columns as f32;
        let segment_height = height / rows as f32;

        let mut vertices = Vec::new();
        let mut uvs = Vec::new();
        for iy in 0..=rows {
            let y = height * 0.5 - iy as f32 * segment_height;
            for ix in 0..=columns {
                let x = ix as f32 * segment_width - width * 0.5;
                vertices.push(Vec3::new(x, y, 0.0));
                uvs.push(Vec2::new(
                    ix as f32 / columns as f32,
                    1.0 - iy as f32 / rows as f32,
                ));
            }
        }

        let stride = columns + 1;
        let mut indices = Vec::with_capacity((columns * rows * 2) as usize);
        for iy in 0..rows {
            for ix in 0..columns {
                let a = ix + stride * iy;
                let b = ix + stride * (iy + 1);
                let c = ix + 1 + stride * (iy + 1);
                let d = ix + 1 + stride * iy;
                indices.push([a, b, d]);
                indices.push([b, c, d]);
            }
        }

        Self {
            width,
            height,
            vertices,
            uvs,
            indices,
        }
    }

    /// Bend the grid along its width into an arc whose middle rises by
    /// `sagitta`. The curve bulges towards -Z; the end columns stay put.
    pub fn bend(&mut self, sagitta: f32) {
        if sagitta.abs() <= f32::EPSILON {
            return;
        }
        let half_width = self.width * 0.5;
        let a = Vec2::new(-half_width, 0.0);
        let b = Vec2::new(0.0, sagitta);
        let c = Vec2::new(half_width, 0.0);

        let ab = a - b;
        let bc = b - c;
        let ac = a - c;
        let radius = ab.length() * bc.length() * ac.length() / (2.0 * ab.perp_dot(ac).abs());

        let center = Vec2::new(0.0, sagitta - radius);
        let base = a - center;
        let base_angle = base.y.atan2(base.x).rem_euclid(TAU) - FRAC_PI_2;
        let arc = base_angle * 2.0;

        for (vertex, uv) in self.vertices.iter_mut().zip(&self.uvs) {
            let bent = rotate_around(c, center, arc * (1.0 - uv.x));
            *vertex = Vec3::new(bent.x, vertex.y, -bent.y);
        }
    }

    #[must_use]
    pub fn triangle_mesh(&self) -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        for [a, b, c] in &self.indices {
            let vertex = |i: u32| self.vertices.get(i as usize).copied();
            if let (Some(a), Some(b), Some(c)) = (vertex(*a), vertex(*b), vertex(*c)) {
                mesh.add_triangle(a, b, c);
            }
        }
        mesh
    }

    #[must_use]
    pub fn geometry(&self) -> Geometry {
        Geometry::Mesh {
            vertices: self.vertices.clone(),
            indices: self.indices.clone(),
        }
    }
}

fn rotate_around(point: Vec2, center: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    let d = point - center;
    Vec2::new(
        center.x + d.x * cos - d.y * sin,
        center.y + d.x * sin + d.y * cos,
    )
}
