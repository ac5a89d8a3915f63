use glam::{Quat, Vec3};
use physics::{
    ActivationState, BodyKind, PhysicsWorld, RigidBody, RigidBodyConstructionInfo, Shape,
    Transform, TriangleMesh,
};

fn world() -> PhysicsWorld {
    PhysicsWorld::initialize(Vec3::new(0.0, -9.8, 0.0))
}

fn static_box(world: &mut PhysicsWorld, transform: Transform) -> physics::BodyHandle {
    let info = RigidBodyConstructionInfo::new(
        0.0,
        transform,
        Shape::cuboid(10.0, 0.25, 10.0),
        Vec3::ZERO,
    );
    world.add_body(RigidBody::new(info).unwrap()).unwrap()
}

fn dynamic_ball(world: &mut PhysicsWorld, position: Vec3) -> physics::BodyHandle {
    let shape = Shape::sphere(0.5);
    let inertia = shape.local_inertia(1.0);
    let info =
        RigidBodyConstructionInfo::new(1.0, Transform::from_position(position), shape, inertia);
    let mut body = RigidBody::new(info).unwrap();
    body.set_activation_state(ActivationState::AlwaysActive);
    world.add_body(body).unwrap()
}

#[test]
fn ball_comes_to_rest_on_static_box() {
    let mut world = world();
    static_box(&mut world, Transform::IDENTITY);
    let ball = dynamic_ball(&mut world, Vec3::new(0.0, 2.0, 0.0));

    for _ in 0..180 {
        world.step(1.0 / 60.0, 10).unwrap();
    }

    let y = world.motion_state(ball).unwrap().position.y;
    assert!((y - 0.75).abs() < 0.1, "ball rests at y={y}");
}

#[test]
fn static_body_never_moves() {
    let mut world = world();
    let pose = Transform::new(
        Vec3::new(1.0, -2.0, 3.0),
        Quat::from_rotation_x(-std::f32::consts::PI / 30.0),
    );
    let floor = static_box(&mut world, pose);
    dynamic_ball(&mut world, Vec3::new(0.0, 1.0, 0.0));

    for _ in 0..60 {
        world.step(1.0 / 60.0, 10).unwrap();
    }

    assert_eq!(world.body_kind(floor).unwrap(), BodyKind::Static);
    assert_eq!(world.motion_state(floor).unwrap(), pose);
}

#[test]
fn kinematic_motion_state_is_only_written_externally() {
    let mut world = world();
    let info = RigidBodyConstructionInfo::new(
        0.0,
        Transform::IDENTITY,
        Shape::cuboid(3.0, 0.5, 0.25),
        Vec3::ZERO,
    );
    let mut body = RigidBody::new(info).unwrap();
    body.set_kinematic();
    body.set_activation_state(ActivationState::AlwaysActive);
    let flipper = world.add_body(body).unwrap();

    world.step(1.0 / 60.0, 10).unwrap();
    assert_eq!(world.motion_state(flipper).unwrap(), Transform::IDENTITY);

    let target = Transform::new(Vec3::new(4.9, -0.75, -13.5), Quat::from_rotation_y(0.6));
    world.set_motion_state(flipper, target).unwrap();
    world.set_world_transform(flipper, target).unwrap();
    world.activate(flipper).unwrap();
    world.step(1.0 / 60.0, 10).unwrap();

    assert_eq!(world.body_kind(flipper).unwrap(), BodyKind::Kinematic);
    assert_eq!(world.motion_state(flipper).unwrap(), target);
}

#[test]
fn velocity_write_wakes_and_moves_the_ball() {
    let mut world = PhysicsWorld::initialize(Vec3::ZERO);
    let ball = dynamic_ball(&mut world, Vec3::ZERO);

    world
        .set_activation_state(ball, ActivationState::Active)
        .unwrap();
    world
        .set_linear_velocity(ball, Vec3::new(0.0, 0.0, 26.5))
        .unwrap();
    assert_eq!(
        world.linear_velocity(ball).unwrap(),
        Vec3::new(0.0, 0.0, 26.5)
    );
    assert_eq!(
        world.activation_state(ball).unwrap(),
        ActivationState::Active
    );

    world.step(1.0 / 60.0, 10).unwrap();
    let z = world.motion_state(ball).unwrap().position.z;
    assert!((z - 26.5 / 60.0).abs() < 1e-3, "z={z}");
}

#[test]
fn bodies_are_grouped_by_kind() {
    let mut world = world();
    static_box(&mut world, Transform::IDENTITY);
    dynamic_ball(&mut world, Vec3::Y);
    dynamic_ball(&mut world, Vec3::Y * 3.0);

    assert_eq!(world.body_count(), 3);
    assert_eq!(world.bodies_of_kind(BodyKind::Dynamic).len(), 2);
    assert_eq!(world.bodies_of_kind(BodyKind::Static).len(), 1);
    assert!(world.bodies_of_kind(BodyKind::Kinematic).is_empty());
}

#[test]
fn ball_lands_on_static_triangle_mesh() -> anyhow::Result<()> {
    let mut world = world();
    let mut mesh = TriangleMesh::new();
    let (a, b, c, d) = (
        Vec3::new(-5.0, 0.0, -5.0),
        Vec3::new(5.0, 0.0, -5.0),
        Vec3::new(5.0, 0.0, 5.0),
        Vec3::new(-5.0, 0.0, 5.0),
    );
    mesh.add_triangle(a, c, b);
    mesh.add_triangle(a, d, c);
    let info = RigidBodyConstructionInfo::new(
        0.0,
        Transform::IDENTITY,
        Shape::TriangleMesh(mesh),
        Vec3::ZERO,
    );
    let floor = world.add_body(RigidBody::new(info)?)?;
    let ball = dynamic_ball(&mut world, Vec3::new(0.0, 2.0, 0.0));

    for _ in 0..180 {
        world.step(1.0 / 60.0, 10)?;
    }

    let y = world.motion_state(ball)?.position.y;
    assert!((y - 0.5).abs() < 0.15, "ball rests at y={y}");
    assert_eq!(world.body_kind(floor)?, BodyKind::Static);
    Ok(())
}

fn resting_ball(world: &mut PhysicsWorld) -> physics::BodyHandle {
    let shape = Shape::sphere(0.5);
    let inertia = shape.local_inertia(1.0);
    let info = RigidBodyConstructionInfo::new(
        1.0,
        Transform::from_position(Vec3::new(0.0, 0.76, 0.0)),
        shape,
        inertia,
    );
    world.add_body(RigidBody::new(info).unwrap()).unwrap()
}

fn settle(world: &mut PhysicsWorld, frames: usize) {
    for _ in 0..frames {
        world.step(1.0 / 60.0, 10).unwrap();
    }
}

#[test]
fn always_active_requested_after_add_never_sleeps() {
    let mut world = world();
    static_box(&mut world, Transform::IDENTITY);
    let ball = resting_ball(&mut world);
    assert_eq!(world.activation_state(ball).unwrap(), ActivationState::Active);

    world
        .set_activation_state(ball, ActivationState::AlwaysActive)
        .unwrap();
    settle(&mut world, 600);

    assert_eq!(
        world.activation_state(ball).unwrap(),
        ActivationState::AlwaysActive
    );
}

#[test]
fn always_active_ball_set_active_may_fall_asleep() {
    let mut world = world();
    static_box(&mut world, Transform::IDENTITY);
    let ball = dynamic_ball(&mut world, Vec3::new(0.0, 0.76, 0.0));

    world
        .set_activation_state(ball, ActivationState::Active)
        .unwrap();
    settle(&mut world, 600);

    assert_eq!(
        world.activation_state(ball).unwrap(),
        ActivationState::Sleeping
    );
}
