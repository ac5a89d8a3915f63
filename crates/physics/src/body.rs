//! # Rigid Body Construction
//!
//! A body is described first ([`RigidBodyConstructionInfo`] + [`RigidBody`])
//! and only enters the simulation once it is handed to
//! [`PhysicsWorld::add_body`](crate::PhysicsWorld::add_body), which consumes
//! it. Adding the same body twice is therefore impossible by construction.

use glam::Vec3;
use rapier3d::prelude::RigidBodyHandle;

use crate::error::PhysicsError;
use crate::shapes::Shape;
use crate::transform::Transform;

/// Friction applied when none is set explicitly
pub const DEFAULT_FRICTION: f32 = 0.5;

/// Stable reference to a body living inside a [`PhysicsWorld`](crate::PhysicsWorld)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub(crate) RigidBodyHandle);

/// How the solver treats a body
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BodyKind {
    /// Positive mass, moved by gravity, contacts and velocity writes
    Dynamic,
    /// Zero mass, placed once at construction
    Static,
    /// Zero mass, pose driven from outside every frame
    Kinematic,
}

/// Sleep bookkeeping, mirroring the classic activation tags
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ActivationState {
    /// Simulated, may fall asleep once it comes to rest
    Active,
    /// Asleep, skipped by the solver until something wakes it
    Sleeping,
    /// Simulated and never allowed to fall asleep
    AlwaysActive,
}

/// Inputs for building a body, as handed to the engine
#[derive(Clone, Debug, PartialEq)]
pub struct RigidBodyConstructionInfo {
    pub mass: f32,
    /// Initial world transform, also the initial motion state
    pub motion_state: Transform,
    pub shape: Shape,
    pub local_inertia: Vec3,
}

impl RigidBodyConstructionInfo {
    #[must_use]
    pub fn new(mass: f32, motion_state: Transform, shape: Shape, local_inertia: Vec3) -> Self {
        Self {
            mass,
            motion_state,
            shape,
            local_inertia,
        }
    }
}

/// A body that has been configured but not yet added to a world
#[derive(Clone, Debug, PartialEq)]
pub struct RigidBody {
    pub(crate) info: RigidBodyConstructionInfo,
    pub(crate) friction: f32,
    pub(crate) kinematic: bool,
    pub(crate) activation: ActivationState,
    pub(crate) linear_velocity: Vec3,
    pub(crate) angular_velocity: Vec3,
}

impl RigidBody {
    /// Validate the construction info and create an unattached body.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidMass`] for negative or non-finite mass.
    pub fn new(info: RigidBodyConstructionInfo) -> Result<Self, PhysicsError> {
        if !info.mass.is_finite() || info.mass < 0.0 {
            return Err(PhysicsError::InvalidMass(info.mass));
        }
        Ok(Self {
            info,
            friction: DEFAULT_FRICTION,
            kinematic: false,
            activation: ActivationState::Active,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        })
    }

    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction;
    }

    pub fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.linear_velocity = velocity;
    }

    pub fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.angular_velocity = velocity;
    }

    /// Flag a zero-mass body as externally driven. Has no effect on
    /// dynamic bodies.
    pub fn set_kinematic(&mut self) {
        self.kinematic = true;
    }

    pub fn set_activation_state(&mut self, state: ActivationState) {
        self.activation = state;
    }

    #[must_use]
    pub fn kind(&self) -> BodyKind {
        if self.info.mass > 0.0 {
            BodyKind::Dynamic
        } else if self.kinematic {
            BodyKind::Kinematic
        } else {
            BodyKind::Static
        }
    }

    #[must_use]
    pub fn mass(&self) -> f32 {
        self.info.mass
    }

    #[must_use]
    pub fn friction(&self) -> f32 {
        self.friction
    }

    #[must_use]
    pub fn activation_state(&self) -> ActivationState {
        self.activation
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.info.shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(mass: f32) -> RigidBodyConstructionInfo {
        RigidBodyConstructionInfo::new(mass, Transform::IDENTITY, Shape::sphere(0.5), Vec3::ZERO)
    }

    #[test]
    fn kind_follows_mass_and_flag() {
        assert_eq!(RigidBody::new(info(1.0)).unwrap().kind(), BodyKind::Dynamic);
        assert_eq!(RigidBody::new(info(0.0)).unwrap().kind(), BodyKind::Static);

        let mut body = RigidBody::new(info(0.0)).unwrap();
        body.set_kinematic();
        assert_eq!(body.kind(), BodyKind::Kinematic);

        let mut dynamic = RigidBody::new(info(2.0)).unwrap();
        dynamic.set_kinematic();
        assert_eq!(dynamic.kind(), BodyKind::Dynamic);
    }

    #[test]
    fn negative_mass_is_rejected() {
        assert_eq!(
            RigidBody::new(info(-1.0)).err(),
            Some(PhysicsError::InvalidMass(-1.0))
        );
    }

    #[test]
    fn friction_defaults_to_half() {
        assert_eq!(RigidBody::new(info(1.0)).unwrap().friction(), 0.5);
    }
}
