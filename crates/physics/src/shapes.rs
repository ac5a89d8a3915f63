//! Collision shape primitives
//!
//! Shapes are described engine-independently and turned into colliders when a
//! body is added to the world.

use glam::Vec3;
use rapier3d::na::Point3;
use rapier3d::prelude::ColliderBuilder;

use crate::error::PhysicsError;

/// Collision shape of a rigid body, in the body's local frame
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Axis aligned box given by its half extents
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
    /// Cylinder along the local Y axis. `half_extents.x` is the radius and
    /// `half_extents.y` the half height, matching the box-style description.
    Cylinder { half_extents: Vec3 },
    /// Immovable triangle soup, only meaningful for static bodies
    TriangleMesh(TriangleMesh),
}

impl Shape {
    #[must_use]
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Self::Box {
            half_extents: Vec3::new(hx, hy, hz),
        }
    }

    #[must_use]
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    #[must_use]
    pub fn cylinder(radius: f32, half_height: f32) -> Self {
        Self::Cylinder {
            half_extents: Vec3::new(radius, half_height, radius),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Sphere { .. } => "sphere",
            Self::Cylinder { .. } => "cylinder",
            Self::TriangleMesh(_) => "triangle mesh",
        }
    }

    /// Principal moments of inertia for a body of `mass` with this shape.
    ///
    /// Zero mass gives zero inertia, as does a triangle mesh since it can
    /// only back static bodies.
    #[must_use]
    pub fn local_inertia(&self, mass: f32) -> Vec3 {
        if mass <= 0.0 {
            return Vec3::ZERO;
        }
        match self {
            Self::Box { half_extents } => {
                let l = *half_extents * 2.0;
                Vec3::new(
                    l.y * l.y + l.z * l.z,
                    l.x * l.x + l.z * l.z,
                    l.x * l.x + l.y * l.y,
                ) * (mass / 12.0)
            }
            Self::Sphere { radius } => Vec3::splat(0.4 * mass * radius * radius),
            Self::Cylinder { half_extents } => {
                let r2 = half_extents.x * half_extents.x;
                let h = half_extents.y * 2.0;
                let side = mass * (3.0 * r2 + h * h) / 12.0;
                Vec3::new(side, 0.5 * mass * r2, side)
            }
            Self::TriangleMesh(_) => Vec3::ZERO,
        }
    }

    pub(crate) fn collider_builder(&self) -> Result<ColliderBuilder, PhysicsError> {
        Ok(match self {
            Self::Box { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            Self::Sphere { radius } => ColliderBuilder::ball(*radius),
            Self::Cylinder { half_extents } => {
                ColliderBuilder::cylinder(half_extents.y, half_extents.x)
            }
            Self::TriangleMesh(mesh) => {
                if mesh.is_empty() {
                    return Err(PhysicsError::EmptyTriangleMesh);
                }
                let (vertices, indices) = mesh.to_buffers();
                ColliderBuilder::trimesh(vertices, indices)
            }
        })
    }
}

/// Triangle list accumulated one triangle at a time
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleMesh {
    triangles: Vec<[Vec3; 3]>,
}

impl TriangleMesh {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        self.triangles.push([a, b, c]);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    #[must_use]
    pub fn triangles(&self) -> &[[Vec3; 3]] {
        &self.triangles
    }

    fn to_buffers(&self) -> (Vec<Point3<f32>>, Vec<[u32; 3]>) {
        let mut vertices = Vec::with_capacity(self.triangles.len() * 3);
        let mut indices = Vec::with_capacity(self.triangles.len());
        for tri in &self.triangles {
            let base = u32::try_from(vertices.len()).unwrap_or(u32::MAX);
            for v in tri {
                vertices.push(Point3::new(v.x, v.y, v.z));
            }
            indices.push([base, base + 1, base + 2]);
        }
        (vertices, indices)
    }
}
