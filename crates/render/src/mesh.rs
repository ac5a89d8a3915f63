//! CPU-side triangulation of the scene graph
//!
//! Every drawable, effectively visible node is expanded into world-space
//! triangles with flat per-face normals. The output feeds the window
//! renderer's vertex buffer directly.

use glam::{Mat3, Mat4, Vec3};

use crate::gpu_types::Vertex;
use crate::scene::{Geometry, SceneGraph};

const CYLINDER_SEGMENTS: u32 = 24;
const SPHERE_RINGS: u32 = 10;
const SPHERE_SECTORS: u32 = 16;

/// Triangulate every visible primitive of `scene` in world space.
#[must_use]
pub fn triangulate(scene: &SceneGraph) -> Vec<Vertex> {
    let mut out = Vec::new();
    for (id, node) in scene.iter() {
        if !node.geometry.is_drawable() || !scene.is_effectively_visible(id) {
            continue;
        }
        let Some(world) = scene.world_matrix(id) else {
            continue;
        };
        let local = local_triangles(&node.geometry);
        emit(&mut out, &world, &local, node.color);
    }
    out
}

fn emit(out: &mut Vec<Vertex>, world: &Mat4, triangles: &[[Vec3; 3]], color: [f32; 3]) {
    let normal_matrix = Mat3::from_mat4(*world).inverse().transpose();
    for [a, b, c] in triangles {
        let normal = normal_matrix
            .mul_vec3((*b - *a).cross(*c - *a))
            .normalize_or_zero();
        for v in [a, b, c] {
            out.push(Vertex {
                position: world.transform_point3(*v).to_array(),
                normal: normal.to_array(),
                color,
            });
        }
    }
}

/// Triangles of a primitive in its own local frame
#[must_use]
pub fn local_triangles(geometry: &Geometry) -> Vec<[Vec3; 3]> {
    match geometry {
        Geometry::Group | Geometry::Imported { .. } => Vec::new(),
        Geometry::Box { size } => box_triangles(*size * 0.5),
        Geometry::Sphere { radius } => sphere_triangles(*radius),
        Geometry::Cylinder { radius, height } => cylinder_triangles(*radius, *height * 0.5),
        Geometry::Mesh { vertices, indices } => indices
            .iter()
            .filter_map(|[a, b, c]| {
                Some([
                    *vertices.get(*a as usize)?,
                    *vertices.get(*b as usize)?,
                    *vertices.get(*c as usize)?,
                ])
            })
            .collect(),
    }
}

fn box_triangles(h: Vec3) -> Vec<[Vec3; 3]> {
    let corner = |x: f32, y: f32, z: f32| Vec3::new(x * h.x, y * h.y, z * h.z);
    // Each face as a counter-clockwise quad seen from outside
    let faces = [
        [corner(-1.0, -1.0, 1.0), corner(1.0, -1.0, 1.0), corner(1.0, 1.0, 1.0), corner(-1.0, 1.0, 1.0)],
        [corner(1.0, -1.0, -1.0), corner(-1.0, -1.0, -1.0), corner(-1.0, 1.0, -1.0), corner(1.0, 1.0, -1.0)],
        [corner(-1.0, 1.0, 1.0), corner(1.0, 1.0, 1.0), corner(1.0, 1.0, -1.0), corner(-1.0, 1.0, -1.0)],
        [corner(-1.0, -1.0, -1.0), corner(1.0, -1.0, -1.0), corner(1.0, -1.0, 1.0), corner(-1.0, -1.0, 1.0)],
        [corner(1.0, -1.0, 1.0), corner(1.0, -1.0, -1.0), corner(1.0, 1.0, -1.0), corner(1.0, 1.0, 1.0)],
        [corner(-1.0, -1.0, -1.0), corner(-1.0, -1.0, 1.0), corner(-1.0, 1.0, 1.0), corner(-1.0, 1.0, -1.0)],
    ];
    faces
        .iter()
        .flat_map(|[a, b, c, d]| [[*a, *b, *c], [*a, *c, *d]])
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn cylinder_triangles(radius: f32, half_height: f32) -> Vec<[Vec3; 3]> {
    let rim = |i: u32, y: f32| {
        let angle = i as f32 / CYLINDER_SEGMENTS as f32 * std::f32::consts::TAU;
        Vec3::new(radius * angle.sin(), y, radius * angle.cos())
    };
    let top = Vec3::new(0.0, half_height, 0.0);
    let bottom = -top;
    let mut triangles = Vec::with_capacity(CYLINDER_SEGMENTS as usize * 4);
    for i in 0..CYLINDER_SEGMENTS {
        let (a_top, b_top) = (rim(i, half_height), rim(i + 1, half_height));
        let (a_bot, b_bot) = (rim(i, -half_height), rim(i + 1, -half_height));
        triangles.push([a_bot, b_bot, b_top]);
        triangles.push([a_bot, b_top, a_top]);
        triangles.push([top, a_top, b_top]);
        triangles.push([bottom, b_bot, a_bot]);
    }
    triangles
}

#[allow(clippy::cast_precision_loss)]
fn sphere_triangles(radius: f32) -> Vec<[Vec3; 3]> {
    let point = |ring: u32, sector: u32| {
        let theta = ring as f32 / SPHERE_RINGS as f32 * std::f32::consts::PI;
        let phi = sector as f32 / SPHERE_SECTORS as f32 * std::f32::consts::TAU;
        Vec3::new(
            radius * theta.sin() * phi.sin(),
            radius * theta.cos(),
            radius * theta.sin() * phi.cos(),
        )
    };
    let mut triangles = Vec::new();
    for ring in 0..SPHERE_RINGS {
        for sector in 0..SPHERE_SECTORS {
            let a = point(ring, sector);
            let b = point(ring + 1, sector);
            let c = point(ring + 1, sector + 1);
            let d = point(ring, sector + 1);
            if ring != 0 {
                triangles.push([a, b, d]);
            }
            if ring != SPHERE_RINGS - 1 {
                triangles.push([b, c, d]);
            }
        }
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Node;

    #[test]
    fn box_has_twelve_outward_triangles() {
        let triangles = box_triangles(Vec3::ONE);
        assert_eq!(triangles.len(), 12);
        for [a, b, c] in triangles {
            let normal = (b - a).cross(c - a);
            let centre = (a + b + c) / 3.0;
            assert!(normal.dot(centre) > 0.0, "inward face at {centre}");
        }
    }

    #[test]
    fn triangulation_applies_world_transform() {
        let mut scene = SceneGraph::new();
        scene.add(
            Node::new("cube", Geometry::Box { size: Vec3::splat(2.0) })
                .with_position(Vec3::new(5.0, 0.0, 0.0)),
        );
        let vertices = triangulate(&scene);
        assert_eq!(vertices.len(), 36);
        for v in vertices {
            assert!(v.position[0] >= 4.0 - 1e-5 && v.position[0] <= 6.0 + 1e-5);
        }
    }

    #[test]
    fn hidden_and_non_drawable_nodes_are_skipped() {
        let mut scene = SceneGraph::new();
        scene.add(Node::group("group"));
        scene.add(Node::new("plane", Geometry::Box { size: Vec3::ONE }).hidden());
        scene.add(Node::new(
            "model",
            Geometry::Imported {
                source: "models/ball.glb".into(),
                byte_len: 10,
            },
        ));
        assert!(triangulate(&scene).is_empty());
    }

    #[test]
    fn mesh_ignores_out_of_range_indices() {
        let geometry = Geometry::Mesh {
            vertices: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            indices: vec![[0, 1, 2], [0, 1, 7]],
        };
        assert_eq!(local_triangles(&geometry).len(), 1);
    }
}
