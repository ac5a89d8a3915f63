#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Pinball Physics World
//!
//! A thin, typed layer over the `rapier3d` dynamics engine. Collision
//! detection, the broad phase and impulse resolution are all the engine's;
//! this crate adds the vocabulary the table code is written against.
//!
//! ## Key Components
//!
//! -   **Shapes:** [`Shape`] covers boxes, spheres, Y-axis cylinders and
//!     static [`TriangleMesh`]es, and knows the local inertia of each.
//! -   **Bodies:** a [`RigidBody`] is built from a
//!     [`RigidBodyConstructionInfo`] (mass, initial motion state, shape, local
//!     inertia). Positive mass makes it dynamic; zero mass makes it static, or
//!     kinematic once flagged with [`RigidBody::set_kinematic`].
//! -   **World:** [`PhysicsWorld`] owns gravity and stepping. Every body has a
//!     motion state holding its last known world [`Transform`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use physics::{PhysicsWorld, RigidBody, RigidBodyConstructionInfo, Shape, Transform};
//!
//! let mut world = PhysicsWorld::initialize(glam::Vec3::new(0.0, -9.8, 0.0));
//! let shape = Shape::sphere(0.5);
//! let inertia = shape.local_inertia(1.0);
//! let info = RigidBodyConstructionInfo::new(1.0, Transform::IDENTITY, shape, inertia);
//! let ball = world.add_body(RigidBody::new(info)?)?;
//!
//! world.step(1.0 / 60.0, 10)?;
//! let pose = world.motion_state(ball)?;
//! ```

pub mod body;
pub mod error;
pub mod shapes;
pub mod transform;
pub mod world;

pub use body::{
    ActivationState, BodyHandle, BodyKind, RigidBody, RigidBodyConstructionInfo,
    DEFAULT_FRICTION,
};
pub use error::PhysicsError;
pub use shapes::{Shape, TriangleMesh};
pub use transform::Transform;
pub use world::{PhysicsWorld, DEFAULT_FIXED_TIMESTEP};
