//! # Scene Assembly
//!
//! Builds the table once at start-up: playfield, walls, curved corners,
//! flippers and plunger, each with its body, plus the purely decorative
//! models (towers, rocks, scenery) requested from the asset loader. The
//! placements below are the table's parameter tables; the sizes they are
//! derived from come from [`TableConfig`].

use std::f32::consts::FRAC_PI_2;

use glam::{EulerRot, Quat, Vec3};
use physics::{BodyHandle, PhysicsWorld, Shape, Transform};
use render::{Geometry, Node, NodeId, SceneGraph};

use crate::assets::{AssetLoader, AssetRequest, Placement};
use crate::config::{vec3, FlipperPlacement, TableConfig};
use crate::curved::PlaneGrid;
use crate::error::TableError;
use crate::factory::{create_body, BodySpec};
use crate::flipper::{Flipper, FlipperSide};
use crate::plunger::{Plunger, PlungerTunables};
use crate::registry::RigidBodyRegistry;

const PLAYFIELD_COLOR: u32 = 0x2a_2a2a;
const WALL_COLOR: u32 = 0x22_2222;
const METAL_COLOR: u32 = 0xaa_aaaa;
const FLIPPER_COLOR: u32 = 0xee_eeee;
const BALL_COLOR: u32 = 0xff_0000;

const CURVE_WIDTH: f32 = 8.0;
const CURVE_HEIGHT: f32 = 2.0;
const CURVE_SEGMENTS: u32 = 32;
const CURVE_SAGITTA: f32 = 0.8;

/// Everything bodies and nodes are created into
pub struct Stage {
    pub world: PhysicsWorld,
    pub scene: SceneGraph,
    pub registry: RigidBodyRegistry,
    pub assets: AssetLoader,
}

impl Stage {
    /// Initialise an empty world and scene from the physics and asset
    /// sections of `config`.
    ///
    /// # Errors
    ///
    /// Fails when the configured fixed timestep is not positive.
    pub fn new(config: &TableConfig) -> Result<Self, TableError> {
        let world = PhysicsWorld::initialize(vec3(config.physics.gravity))
            .with_fixed_timestep(config.physics.fixed_timestep)?;
        Ok(Self {
            world,
            scene: SceneGraph::new(),
            registry: RigidBodyRegistry::new(),
            assets: AssetLoader::new(config.assets.root.clone()),
        })
    }

    fn add_node(&mut self, parent: Option<NodeId>, node: Node) -> NodeId {
        match parent {
            Some(parent) => self.scene.add_child(parent, node),
            None => self.scene.add(node),
        }
    }

    fn world_transform(&self, id: NodeId) -> Result<Transform, TableError> {
        let position = self
            .scene
            .world_position(id)
            .ok_or(TableError::UnknownNode(id))?;
        let orientation = self
            .scene
            .world_orientation(id)
            .ok_or(TableError::UnknownNode(id))?;
        Ok(Transform::new(position, orientation))
    }

    /// Add `node` and give it a body built from its world pose.
    fn add_body_node(
        &mut self,
        parent: Option<NodeId>,
        node: Node,
        spec: impl FnOnce(Transform) -> BodySpec,
    ) -> Result<(NodeId, BodyHandle), TableError> {
        let id = self.add_node(parent, node);
        let transform = self.world_transform(id)?;
        let body = create_body(&mut self.world, &mut self.registry, id, spec(transform))?;
        Ok((id, body))
    }

    fn add_static(
        &mut self,
        parent: Option<NodeId>,
        node: Node,
        shape: Shape,
    ) -> Result<NodeId, TableError> {
        let (id, _) = self.add_body_node(parent, node, |t| BodySpec::fixed(shape, t))?;
        Ok(id)
    }

    fn request_model(&mut self, path: &str, parent: Option<NodeId>, placement: Placement) {
        self.assets
            .request(AssetRequest::new(path, parent, placement));
    }
}

/// A ball spawned for a shot
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ball {
    pub node: NodeId,
    pub body: BodyHandle,
}

/// Handles to what [`assemble`] built
#[derive(Debug)]
pub struct Layout {
    pub table: NodeId,
    pub playfield: NodeId,
    pub walls: Vec<NodeId>,
    pub curved_walls: Vec<NodeId>,
    pub left_flipper: Flipper,
    pub right_flipper: Flipper,
    pub plunger: Plunger,
}

/// A straight wall: visual box, static collision box and model placement
struct WallSpec {
    name: &'static str,
    position: Vec3,
    orientation: Quat,
    size: Vec3,
    half_extents: Vec3,
    model_scale: Vec3,
    model_offset_y: f32,
    model_yaw: f32,
}

fn wall_specs(config: &TableConfig) -> Vec<WallSpec> {
    let dims = &config.table;
    let (w, l, t, h) = (dims.width, dims.length, dims.wall_thickness, dims.wall_height);
    let tilted = Quat::from_rotation_x(dims.tilt);
    let guide = |yaw: f32| Quat::from_euler(EulerRot::XYZ, dims.tilt, yaw, 0.0);
    let straight = |name: &'static str,
                    position: Vec3,
                    size: Vec3,
                    model_scale: Vec3,
                    model_offset_y: f32,
                    model_yaw: f32| {
        WallSpec {
            name,
            position,
            orientation: tilted,
            size,
            half_extents: size * 0.5,
            model_scale,
            model_offset_y,
            model_yaw,
        }
    };

    vec![
        straight(
            "right_wall",
            Vec3::new(-w / 2.0 - t / 2.0, h / 2.0, 0.0),
            Vec3::new(t, h, l),
            Vec3::new(22.0, 4.4, 6.0),
            -0.7,
            FRAC_PI_2,
        ),
        straight(
            "left_wall",
            Vec3::new(w / 2.0 + t / 2.0, h / 2.0, 0.0),
            Vec3::new(t, h, l),
            Vec3::new(22.0, 4.6, 6.0),
            -0.7,
            FRAC_PI_2,
        ),
        straight(
            "top_wall",
            Vec3::new(0.0, 2.45 + t / 2.0, l / 2.0 - t / 2.0),
            Vec3::new(w, h, t),
            Vec3::new(13.0, 4.4, 6.0),
            -0.8,
            0.0,
        ),
        WallSpec {
            name: "left_guide_wall",
            position: Vec3::new(7.5, -0.1, -12.0),
            orientation: guide(1.0),
            size: Vec3::new(t, h, 6.4),
            half_extents: Vec3::new(t / 2.0, h / 2.0, 3.0),
            model_scale: Vec3::new(4.4, 4.4, 6.0),
            model_offset_y: -0.87,
            model_yaw: FRAC_PI_2,
        },
        WallSpec {
            name: "right_guide_wall",
            position: Vec3::new(-5.2, -0.1, -12.0),
            orientation: guide(-1.0),
            size: Vec3::new(t, h, 6.4),
            half_extents: Vec3::new(t / 2.0, h / 2.0, 3.0),
            model_scale: Vec3::new(4.4, 4.4, 6.0),
            model_offset_y: -0.87,
            model_yaw: FRAC_PI_2,
        },
        straight(
            "shoot_lane_wall",
            Vec3::new(-w / 2.0 + 2.0, 0.25, -l / 2.0 + l / 4.0),
            Vec3::new(t, h, l / 2.0),
            Vec3::new(10.8, 4.4, 6.0),
            -0.7,
            FRAC_PI_2,
        ),
    ]
}

/// Build the whole table into `stage`.
///
/// # Errors
///
/// Propagates body creation failures; asset failures are reported later,
/// when their completions are drained.
pub fn assemble(stage: &mut Stage, config: &TableConfig) -> Result<Layout, TableError> {
    let dims = &config.table;
    let table = stage.add_node(None, Node::group("table"));

    let playfield = stage.add_static(
        Some(table),
        Node::new(
            "playfield",
            Geometry::Box {
                size: Vec3::new(dims.width, dims.thickness, dims.length),
            },
        )
        .with_orientation(Quat::from_rotation_x(dims.tilt))
        .with_color(PLAYFIELD_COLOR),
        Shape::cuboid(dims.width / 2.0, dims.thickness / 2.0, dims.length / 2.0),
    )?;

    for x in [dims.width / 2.0, -dims.width / 2.0] {
        let placement = Placement::at(Vec3::new(x, 2.0, dims.length / 2.0))
            .with_uniform_scale(config.assets.tower_scale);
        stage.request_model(&config.assets.tower, Some(table), placement);
    }

    let mut walls = Vec::new();
    for wall in wall_specs(config) {
        let node = Node::new(wall.name, Geometry::Box { size: wall.size })
            .with_position(wall.position)
            .with_orientation(wall.orientation)
            .with_color(WALL_COLOR);
        let half = wall.half_extents;
        let id = stage.add_static(Some(table), node, Shape::cuboid(half.x, half.y, half.z))?;
        let placement = Placement::at(Vec3::new(0.0, wall.model_offset_y, 0.0))
            .with_yaw(wall.model_yaw)
            .with_scale(wall.model_scale);
        stage.request_model(&config.assets.wall, Some(id), placement);
        walls.push(id);
    }

    let curved_walls = add_curved_walls(stage, config)?;

    for rock in &config.rocks.0 {
        let placement = Placement::at(vec3(rock.position))
            .with_yaw(rock.yaw)
            .with_uniform_scale(rock.scale);
        stage.request_model(&rock.model, None, placement);
    }

    let left_flipper = add_flipper(stage, config, FlipperSide::Left, &config.flippers.left)?;
    let right_flipper = add_flipper(stage, config, FlipperSide::Right, &config.flippers.right)?;
    let plunger = add_plunger(stage, config)?;

    if let Some(background) = &config.background {
        let [x, y, z] = background.rotation;
        let placement = Placement::at(vec3(background.position))
            .with_orientation(Quat::from_euler(EulerRot::XYZ, x, y, z))
            .with_scale(vec3(background.scale));
        stage.request_model(&background.model, None, placement);
    }

    tracing::info!(
        "Assembled table: {} nodes, {} bodies, {} models requested",
        stage.scene.len(),
        stage.world.body_count(),
        stage.assets.in_flight()
    );

    Ok(Layout {
        table,
        playfield,
        walls,
        curved_walls,
        left_flipper,
        right_flipper,
        plunger,
    })
}

fn add_curved_walls(stage: &mut Stage, config: &TableConfig) -> Result<Vec<NodeId>, TableError> {
    let mut grid = PlaneGrid::new(CURVE_WIDTH, CURVE_HEIGHT, CURVE_SEGMENTS, CURVE_SEGMENTS);
    grid.bend(CURVE_SAGITTA);

    let mut ids = Vec::new();
    for (name, x, yaw) in [("curved_wall_right", -7.5, -4.0), ("curved_wall_left", 7.5, 4.0)] {
        let node = Node::new(name, grid.geometry())
            .with_position(Vec3::new(x, 2.35, 13.3))
            .with_orientation(Quat::from_euler(EulerRot::XYZ, config.table.tilt, yaw, 0.0))
            .with_color(METAL_COLOR)
            .hidden();
        ids.push(stage.add_static(None, node, Shape::TriangleMesh(grid.triangle_mesh()))?);
    }
    Ok(ids)
}

fn add_flipper(
    stage: &mut Stage,
    config: &TableConfig,
    side: FlipperSide,
    placement: &FlipperPlacement,
) -> Result<Flipper, TableError> {
    let flippers = &config.flippers;
    let half_extents = Vec3::new(
        flippers.length,
        flippers.height / 2.0,
        flippers.width / 2.0 + 0.05,
    );
    let name = match side {
        FlipperSide::Left => "left_flipper",
        FlipperSide::Right => "right_flipper",
    };
    let node = Node::new(name, Geometry::Box { size: half_extents * 2.0 })
        .with_position(vec3(placement.position))
        .with_orientation(Quat::from_rotation_y(placement.yaw))
        .with_color(FLIPPER_COLOR);
    let shape = Shape::cuboid(half_extents.x, half_extents.y, half_extents.z);
    let (id, body) = stage.add_body_node(None, node, |t| BodySpec::kinematic(shape, t))?;
    let base = stage
        .scene
        .world_orientation(id)
        .ok_or(TableError::UnknownNode(id))?;

    let model = Placement::at(vec3(placement.model_offset))
        .with_yaw(placement.model_yaw)
        .with_uniform_scale(flippers.model_scale);
    stage.request_model(&config.assets.flipper, Some(id), model);

    Ok(Flipper::new(side, id, body, base, flippers))
}

fn add_plunger(stage: &mut Stage, config: &TableConfig) -> Result<Plunger, TableError> {
    let plunger = &config.plunger;
    let rest = vec3(plunger.position);
    let orientation = Quat::from_rotation_x(FRAC_PI_2);
    let node = Node::new(
        "plunger",
        Geometry::Cylinder {
            radius: plunger.radius,
            height: plunger.length,
        },
    )
    .with_position(rest)
    .with_orientation(orientation)
    .with_color(METAL_COLOR);
    let shape = Shape::cylinder(plunger.radius, plunger.length / 2.0);
    let (id, body) = stage.add_body_node(None, node, |t| BodySpec::kinematic(shape, t))?;
    Ok(Plunger::new(
        id,
        body,
        rest,
        orientation,
        PlungerTunables::from(plunger),
    ))
}

/// Create a fresh dynamic ball at the spawn point, resting in the tilt of
/// the playfield.
///
/// # Errors
///
/// Propagates body creation failures, e.g. a negative configured mass.
pub fn spawn_ball(stage: &mut Stage, config: &TableConfig) -> Result<Ball, TableError> {
    let ball = &config.ball;
    let node = Node::new("ball", Geometry::Sphere { radius: ball.radius })
        .with_position(vec3(ball.spawn))
        .with_orientation(Quat::from_rotation_x(config.table.tilt))
        .with_color(BALL_COLOR);
    let (id, body) = stage.add_body_node(None, node, |t| {
        BodySpec::new(Shape::sphere(ball.radius), ball.mass, t)
    })?;
    stage.request_model(
        &config.assets.ball,
        Some(id),
        Placement::default().with_uniform_scale(ball.model_scale),
    );
    tracing::debug!("Spawned ball {:?} at {:?}", id, ball.spawn);
    Ok(Ball { node: id, body })
}
