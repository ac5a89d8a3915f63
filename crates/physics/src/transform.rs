//! World transforms for rigid bodies
//!
//! A [`Transform`] is a position plus a unit quaternion. This module also
//! converts between the `glam` types used by the rest of the workspace and
//! the `nalgebra` isometries the dynamics engine works with.

use glam::{Mat4, Quat, Vec3};
use rapier3d::na::{Isometry3, Quaternion, Translation3, UnitQuaternion, Vector3};

/// Position and orientation of a body in world space
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    #[must_use]
    pub const fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    #[must_use]
    pub const fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// 4x4 matrix for the renderer, column major
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }

    #[must_use]
    pub(crate) fn to_isometry(self) -> Isometry3<f32> {
        let q = self.orientation;
        Isometry3::from_parts(
            Translation3::new(self.position.x, self.position.y, self.position.z),
            UnitQuaternion::new_unchecked(Quaternion::new(q.w, q.x, q.y, q.z)),
        )
    }

    #[must_use]
    pub(crate) fn from_isometry(iso: &Isometry3<f32>) -> Self {
        let t = iso.translation.vector;
        // Quaternion coords are stored as [i, j, k, w]
        let c = iso.rotation.quaternion().coords;
        Self {
            position: Vec3::new(t.x, t.y, t.z),
            orientation: Quat::from_xyzw(c.x, c.y, c.z, c.w),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

pub(crate) fn to_vector(v: Vec3) -> Vector3<f32> {
    Vector3::new(v.x, v.y, v.z)
}

pub(crate) fn from_vector(v: &Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_matrix() {
        let transform = Transform::IDENTITY.to_matrix().to_cols_array_2d();

        assert_eq!(transform[0], [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(transform[1], [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(transform[2], [0.0, 0.0, 1.0, 0.0]);
        assert_eq!(transform[3], [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_translation_only() {
        let transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0))
            .to_matrix()
            .to_cols_array_2d();

        // Translation should be in the last column
        assert_eq!(transform[3], [1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_isometry_round_trip_is_bit_exact() {
        let t = Transform::new(
            Vec3::new(-9.0, -0.5, -14.0),
            Quat::from_rotation_x(-std::f32::consts::PI / 30.0),
        );
        let back = Transform::from_isometry(&t.to_isometry());
        assert_eq!(back, t);
    }
}
