//! # Rigid Body Factory
//!
//! [`create_body`] is the single path by which a scene node gets a physics
//! body. It derives local inertia from the shape, applies the table-wide
//! friction, registers the body with the world and binds it to the node.
//! Positive mass yields a dynamic body that never sleeps and is listed in the
//! registry; zero mass yields a static body, or a kinematic one when the
//! request asks for it, and neither is listed.

use glam::Vec3;
use physics::{
    ActivationState, BodyHandle, PhysicsError, PhysicsWorld, RigidBody,
    RigidBodyConstructionInfo, Shape, Transform, DEFAULT_FRICTION,
};
use render::NodeId;

use crate::registry::RigidBodyRegistry;

/// Everything needed to build one body
#[derive(Clone, Debug, PartialEq)]
pub struct BodySpec {
    pub shape: Shape,
    pub mass: f32,
    pub transform: Transform,
    pub linear_velocity: Option<Vec3>,
    pub angular_velocity: Option<Vec3>,
    /// Only meaningful for zero mass: drive the pose from outside
    pub kinematic: bool,
}

impl BodySpec {
    #[must_use]
    pub fn new(shape: Shape, mass: f32, transform: Transform) -> Self {
        Self {
            shape,
            mass,
            transform,
            linear_velocity: None,
            angular_velocity: None,
            kinematic: false,
        }
    }

    /// Zero-mass body placed once and never moved again
    #[must_use]
    pub fn fixed(shape: Shape, transform: Transform) -> Self {
        Self::new(shape, 0.0, transform)
    }

    /// Zero-mass body whose pose is written every frame
    #[must_use]
    pub fn kinematic(shape: Shape, transform: Transform) -> Self {
        Self {
            kinematic: true,
            ..Self::new(shape, 0.0, transform)
        }
    }

    #[must_use]
    pub fn with_linear_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = Some(velocity);
        self
    }

    #[must_use]
    pub fn with_angular_velocity(mut self, velocity: Vec3) -> Self {
        self.angular_velocity = Some(velocity);
        self
    }
}

/// Build a body for `node`, add it to `world` and bind the two together.
///
/// # Errors
///
/// Propagates [`PhysicsError`] for invalid mass or an unusable shape.
pub fn create_body(
    world: &mut PhysicsWorld,
    registry: &mut RigidBodyRegistry,
    node: NodeId,
    spec: BodySpec,
) -> Result<BodyHandle, PhysicsError> {
    let local_inertia = spec.shape.local_inertia(spec.mass);
    let info = RigidBodyConstructionInfo::new(spec.mass, spec.transform, spec.shape, local_inertia);
    let mut body = RigidBody::new(info)?;
    body.set_friction(DEFAULT_FRICTION);
    if let Some(velocity) = spec.linear_velocity {
        body.set_linear_velocity(velocity);
    }
    if let Some(velocity) = spec.angular_velocity {
        body.set_angular_velocity(velocity);
    }

    let dynamic = spec.mass > 0.0;
    if dynamic {
        body.set_activation_state(ActivationState::AlwaysActive);
    } else if spec.kinematic {
        body.set_kinematic();
        body.set_activation_state(ActivationState::AlwaysActive);
    }

    let handle = world.add_body(body)?;
    registry.bind(node, handle);
    if dynamic {
        registry.insert_dynamic(node);
    }
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use physics::BodyKind;

    fn world() -> PhysicsWorld {
        PhysicsWorld::initialize(Vec3::new(0.0, -9.8, 0.0))
    }

    #[test]
    fn dynamic_bodies_are_registered_and_never_sleep() {
        let mut world = world();
        let mut registry = RigidBodyRegistry::new();
        let mut scene = render::SceneGraph::new();
        let node = scene.add(render::Node::group("ball"));

        let spec = BodySpec::new(Shape::sphere(0.5), 1.0, Transform::IDENTITY);
        let handle = create_body(&mut world, &mut registry, node, spec).unwrap();

        assert_eq!(registry.dynamic(), &[node]);
        assert_eq!(registry.body(node), Some(handle));
        assert_eq!(world.body_kind(handle).unwrap(), BodyKind::Dynamic);
        assert_eq!(
            world.activation_state(handle).unwrap(),
            ActivationState::AlwaysActive
        );
    }

    #[test]
    fn zero_mass_bodies_are_bound_but_not_listed() {
        let mut world = world();
        let mut registry = RigidBodyRegistry::new();
        let mut scene = render::SceneGraph::new();
        let wall = scene.add(render::Node::group("wall"));
        let flipper = scene.add(render::Node::group("flipper"));

        let wall_body = create_body(
            &mut world,
            &mut registry,
            wall,
            BodySpec::fixed(Shape::cuboid(1.0, 1.0, 1.0), Transform::IDENTITY),
        )
        .unwrap();
        let flipper_body = create_body(
            &mut world,
            &mut registry,
            flipper,
            BodySpec::kinematic(Shape::cuboid(3.0, 0.5, 0.25), Transform::IDENTITY),
        )
        .unwrap();

        assert!(registry.is_empty());
        assert_eq!(registry.bound(), 2);
        assert_eq!(world.body_kind(wall_body).unwrap(), BodyKind::Static);
        assert_eq!(world.body_kind(flipper_body).unwrap(), BodyKind::Kinematic);
    }

    #[test]
    fn initial_velocity_is_applied() {
        let mut world = world();
        let mut registry = RigidBodyRegistry::new();
        let mut scene = render::SceneGraph::new();
        let node = scene.add(render::Node::group("ball"));

        let spec = BodySpec::new(Shape::sphere(0.5), 1.0, Transform::IDENTITY)
            .with_linear_velocity(Vec3::new(1.0, 0.0, 0.0));
        let handle = create_body(&mut world, &mut registry, node, spec).unwrap();
        assert_eq!(world.linear_velocity(handle).unwrap(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn negative_mass_is_rejected_before_binding() {
        let mut world = world();
        let mut registry = RigidBodyRegistry::new();
        let mut scene = render::SceneGraph::new();
        let node = scene.add(render::Node::group("bad"));

        let spec = BodySpec::new(Shape::sphere(0.5), -1.0, Transform::IDENTITY);
        assert!(create_body(&mut world, &mut registry, node, spec).is_err());
        assert_eq!(registry.bound(), 0);
        assert_eq!(world.body_count(), 0);
    }
}
