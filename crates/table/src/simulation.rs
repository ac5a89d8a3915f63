//! # Simulation Context
//!
//! [`Simulation`] owns every piece of table state: the physics world, the
//! scene, the registry, the actuators, the ball being charged and the clock.
//! The loop driver holds it and calls [`Simulation::handle_input`] for input
//! edges and [`Simulation::frame`] once per displayed frame.

use std::path::Path;
use std::time::Duration;

use physics::{ActivationState, PhysicsWorld};
use render::{Geometry, Node, NodeId, SceneGraph};

use crate::assembly::{assemble, spawn_ball, Ball, Stage};
use crate::assets::LoadedAsset;
use crate::config::TableConfig;
use crate::error::TableError;
use crate::flipper::{Flipper, FlipperSide};
use crate::input::{Edge, Gesture, InputEvent};
use crate::plunger::{Plunger, PlungerTunables, Shot};
use crate::registry::RigidBodyRegistry;
use crate::sync::{sync_transforms, Actuator};

/// What one call to [`Simulation::frame`] did
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    /// Simulated clock after the frame, in seconds
    pub clock: f64,
    pub substeps: u32,
    pub dynamic_synced: usize,
    pub kinematic_synced: usize,
    pub assets_attached: usize,
    pub assets_failed: usize,
}

pub struct Simulation {
    config: TableConfig,
    stage: Stage,
    table: NodeId,
    playfield: NodeId,
    walls: Vec<NodeId>,
    curved_walls: Vec<NodeId>,
    left_flipper: Flipper,
    right_flipper: Flipper,
    plunger: Plunger,
    ball: Option<Ball>,
    balls: Vec<Ball>,
    clock: f64,
    frame: u64,
}

impl Simulation {
    /// Initialise the world and assemble the table.
    ///
    /// # Errors
    ///
    /// Fails when the config describes an unusable world or body.
    pub fn new(config: TableConfig) -> Result<Self, TableError> {
        let mut stage = Stage::new(&config)?;
        let layout = assemble(&mut stage, &config)?;
        Ok(Self {
            config,
            stage,
            table: layout.table,
            playfield: layout.playfield,
            walls: layout.walls,
            curved_walls: layout.curved_walls,
            left_flipper: layout.left_flipper,
            right_flipper: layout.right_flipper,
            plunger: layout.plunger,
            ball: None,
            balls: Vec::new(),
            clock: 0.0,
            frame: 0,
        })
    }

    /// Apply one input edge. Returns the shot when the edge fired the
    /// plunger.
    ///
    /// # Errors
    ///
    /// Fails when a ball cannot be spawned or launched.
    pub fn handle_input(&mut self, event: InputEvent) -> Result<Option<Shot>, TableError> {
        match (event.gesture, event.edge) {
            (Gesture::Charge, Edge::Press) => {
                self.start_charging()?;
                return Ok(None);
            }
            (Gesture::Charge, Edge::Release) => return self.release_shot(),
            (Gesture::FlipLeft, Edge::Press) => self.left_flipper.press(),
            (Gesture::FlipLeft, Edge::Release) => self.left_flipper.release(),
            (Gesture::FlipRight, Edge::Press) => self.right_flipper.press(),
            (Gesture::FlipRight, Edge::Release) => self.right_flipper.release(),
        }
        Ok(None)
    }

    fn start_charging(&mut self) -> Result<(), TableError> {
        if !self.plunger.start_charging(self.clock) {
            return Ok(());
        }
        if self.ball.is_none() {
            let ball = spawn_ball(&mut self.stage, &self.config)?;
            self.balls.push(ball);
            self.ball = Some(ball);
        }
        Ok(())
    }

    fn release_shot(&mut self) -> Result<Option<Shot>, TableError> {
        let Some(shot) = self.plunger.release(self.clock) else {
            return Ok(None);
        };
        if let Some(ball) = self.ball.take() {
            let world = &mut self.stage.world;
            world.set_activation_state(ball.body, ActivationState::Active)?;
            world.set_linear_velocity(ball.body, shot.velocity())?;
            tracing::info!(
                "Shot fired: charge {:.2}s, impulse {:.2}",
                shot.charge_seconds,
                shot.impulse
            );
        }
        Ok(Some(shot))
    }

    /// Advance one displayed frame.
    ///
    /// Completed model loads are attached first, then the clock and actuator
    /// animations advance by `wall_dt`, the world steps by the configured
    /// frame step, and finally transforms are synced.
    ///
    /// # Errors
    ///
    /// Any error here means the context is inconsistent and the loop should
    /// stop.
    pub fn frame(&mut self, wall_dt: f32) -> Result<FrameReport, TableError> {
        let completed = self.stage.assets.poll();
        let (assets_attached, assets_failed) = self.attach_assets(completed);

        let dt = wall_dt.max(0.0);
        self.clock += f64::from(dt);
        self.left_flipper.advance(dt);
        self.right_flipper.advance(dt);
        self.plunger.advance(dt);

        let physics = &self.config.physics;
        let substeps = self
            .stage
            .world
            .step(physics.frame_step, physics.max_substeps)?;

        let actuators: [&dyn Actuator; 3] =
            [&self.left_flipper, &self.right_flipper, &self.plunger];
        let sync = sync_transforms(
            &mut self.stage.world,
            &mut self.stage.scene,
            &self.stage.registry,
            &actuators,
        )?;

        self.frame += 1;
        Ok(FrameReport {
            frame: self.frame,
            clock: self.clock,
            substeps,
            dynamic_synced: sync.dynamic_read,
            kinematic_synced: sync.kinematic_written,
            assets_attached,
            assets_failed,
        })
    }

    /// Block until outstanding model loads finish, attaching them. Returns
    /// how many were attached.
    ///
    /// # Errors
    ///
    /// Fails only if the loader's completion channel closes.
    pub fn settle_assets(&mut self, timeout: Duration) -> Result<usize, crate::AssetError> {
        let completed = self.stage.assets.wait_idle(timeout)?;
        Ok(self.attach_assets(completed).0)
    }

    fn attach_assets(&mut self, completed: Vec<LoadedAsset>) -> (usize, usize) {
        let (mut attached, mut failed) = (0, 0);
        for LoadedAsset { request, result } in completed {
            let fragment = match result {
                Ok(fragment) => fragment,
                Err(e) => {
                    tracing::warn!("Skipping model {}: {e}", request.path);
                    failed += 1;
                    continue;
                }
            };
            let name = Path::new(&request.path)
                .file_stem()
                .map_or_else(|| request.path.clone(), |s| s.to_string_lossy().into_owned());
            let placement = request.placement;
            let node = Node::new(
                name,
                Geometry::Imported {
                    source: fragment.source.display().to_string(),
                    byte_len: fragment.byte_len,
                },
            )
            .with_position(placement.position)
            .with_orientation(placement.orientation)
            .with_scale(placement.scale);
            match request.parent {
                Some(parent) => self.stage.scene.add_child(parent, node),
                None => self.stage.scene.add(node),
            };
            attached += 1;
        }
        (attached, failed)
    }

    /// Update the live-tunable actuator settings from `config`. Positions,
    /// sizes and the world itself are fixed after start-up.
    pub fn apply_tunables(&mut self, config: &TableConfig) {
        self.config.flippers.activated_angle = config.flippers.activated_angle;
        self.config.flippers.swing_duration = config.flippers.swing_duration;
        self.left_flipper.set_tunables(&self.config.flippers);
        self.right_flipper.set_tunables(&self.config.flippers);

        let plunger = &mut self.config.plunger;
        plunger.charge_offset = config.plunger.charge_offset;
        plunger.charge_duration = config.plunger.charge_duration;
        plunger.release_offset = config.plunger.release_offset;
        plunger.release_duration = config.plunger.release_duration;
        plunger.min_impulse = config.plunger.min_impulse;
        plunger.max_impulse = config.plunger.max_impulse;
        plunger.max_charge = config.plunger.max_charge;
        self.plunger.set_tunables(PlungerTunables::from(&*plunger));
        tracing::info!("Applied actuator tunables");
    }

    /// The ball waiting on the plunger, if one has been spawned and not shot
    #[must_use]
    pub fn ball(&self) -> Option<Ball> {
        self.ball
    }

    /// Every ball spawned so far, shot or not
    #[must_use]
    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    #[must_use]
    pub fn flipper(&self, side: FlipperSide) -> &Flipper {
        match side {
            FlipperSide::Left => &self.left_flipper,
            FlipperSide::Right => &self.right_flipper,
        }
    }

    #[must_use]
    pub fn plunger(&self) -> &Plunger {
        &self.plunger
    }

    #[must_use]
    pub fn scene(&self) -> &SceneGraph {
        &self.stage.scene
    }

    #[must_use]
    pub fn world(&self) -> &PhysicsWorld {
        &self.stage.world
    }

    #[must_use]
    pub fn registry(&self) -> &RigidBodyRegistry {
        &self.stage.registry
    }

    #[must_use]
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    #[must_use]
    pub fn clock(&self) -> f64 {
        self.clock
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    #[must_use]
    pub fn table(&self) -> NodeId {
        self.table
    }

    #[must_use]
    pub fn playfield(&self) -> NodeId {
        self.playfield
    }

    #[must_use]
    pub fn walls(&self) -> &[NodeId] {
        &self.walls
    }

    #[must_use]
    pub fn curved_walls(&self) -> &[NodeId] {
        &self.curved_walls
    }
}
