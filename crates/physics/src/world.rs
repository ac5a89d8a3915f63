//! # Physics World
//!
//! Owns the dynamics engine state (body and collider sets, broad and narrow
//! phase, solver) together with a motion state per body. Motion states are
//! the read/write surface for the rest of the workspace: dynamic bodies have
//! theirs refreshed at the end of every [`PhysicsWorld::step`], kinematic and
//! static bodies only change when written from outside.

use std::collections::HashMap;

use glam::Vec3;
use rapier3d::prelude::{
    BroadPhase, CCDSolver, ColliderSet, ImpulseJointSet, IntegrationParameters, IslandManager,
    MassProperties, MultibodyJointSet, NarrowPhase, PhysicsPipeline, Point, RigidBodyActivation,
    RigidBodyBuilder, RigidBodySet, Vector,
};

use crate::body::{ActivationState, BodyHandle, BodyKind, RigidBody};
use crate::error::PhysicsError;
use crate::transform::{from_vector, to_vector, Transform};

/// Internal increment used when subdividing a frame step
pub const DEFAULT_FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Slack absorbing float drift when a frame step is an exact multiple of the
/// fixed increment.
const ACCUMULATOR_EPSILON: f32 = 1e-6;

/// Per-body bookkeeping kept next to the engine's own state
#[derive(Clone, Debug)]
struct BodyRecord {
    kind: BodyKind,
    motion_state: Transform,
    activation: ActivationState,
}

/// The dynamics world every body lives in
pub struct PhysicsWorld {
    gravity: Vector<f32>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    records: HashMap<BodyHandle, BodyRecord>,
    fixed_timestep: f32,
    time_accumulator: f32,
}

impl PhysicsWorld {
    /// Build an empty world with the given gravity vector.
    #[must_use]
    pub fn initialize(gravity: Vec3) -> Self {
        tracing::info!(
            "Initializing physics world: gravity = {:?}, fixed timestep = {:.5}",
            gravity,
            DEFAULT_FIXED_TIMESTEP
        );
        Self {
            gravity: to_vector(gravity),
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            records: HashMap::new(),
            fixed_timestep: DEFAULT_FIXED_TIMESTEP,
            time_accumulator: 0.0,
        }
    }

    /// Override the internal subdivision increment.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidTimestep`] unless `fixed_timestep` is
    /// positive and finite.
    pub fn with_fixed_timestep(mut self, fixed_timestep: f32) -> Result<Self, PhysicsError> {
        if !fixed_timestep.is_finite() || fixed_timestep <= 0.0 {
            return Err(PhysicsError::InvalidTimestep(fixed_timestep));
        }
        self.fixed_timestep = fixed_timestep;
        Ok(self)
    }

    #[must_use]
    pub fn gravity(&self) -> Vec3 {
        from_vector(&self.gravity)
    }

    #[must_use]
    pub fn fixed_timestep(&self) -> f32 {
        self.fixed_timestep
    }

    #[must_use]
    pub fn body_count(&self) -> usize {
        self.records.len()
    }

    /// Register a body so it takes part in stepping and collision.
    ///
    /// # Errors
    ///
    /// Fails when the body's shape cannot be turned into a collider.
    pub fn add_body(&mut self, body: RigidBody) -> Result<BodyHandle, PhysicsError> {
        let kind = body.kind();
        let collider = body
            .info
            .shape
            .collider_builder()?
            .density(0.0)
            .friction(body.friction)
            .build();

        let builder = match kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic()
                .additional_mass_properties(MassProperties::new(
                    Point::origin(),
                    body.info.mass,
                    to_vector(body.info.local_inertia),
                ))
                .linvel(to_vector(body.linear_velocity))
                .angvel(to_vector(body.angular_velocity))
                .can_sleep(body.activation != ActivationState::AlwaysActive),
            BodyKind::Static => RigidBodyBuilder::fixed(),
            BodyKind::Kinematic => RigidBodyBuilder::kinematic_position_based(),
        };
        let mut rigid_body = builder.position(body.info.motion_state.to_isometry()).build();
        if body.activation == ActivationState::Sleeping {
            rigid_body.sleep();
        }

        let raw = self.bodies.insert(rigid_body);
        self.colliders
            .insert_with_parent(collider, raw, &mut self.bodies);

        let handle = BodyHandle(raw);
        tracing::debug!(
            "Added {:?} body {:?} with {} shape",
            kind,
            handle,
            body.info.shape.name()
        );
        self.records.insert(
            handle,
            BodyRecord {
                kind,
                motion_state: body.info.motion_state,
                activation: body.activation,
            },
        );
        Ok(handle)
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Time is consumed in fixed increments; at most `max_substeps` of them
    /// run per call and any excess is dropped. With `max_substeps == 0` a
    /// single variable step of exactly `dt` is taken instead. Returns the
    /// number of engine steps executed.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidTimestep`] for negative or non-finite `dt`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn step(&mut self, dt: f32, max_substeps: u32) -> Result<u32, PhysicsError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(PhysicsError::InvalidTimestep(dt));
        }

        let executed = if max_substeps == 0 {
            if dt > 0.0 {
                self.step_once(dt);
                1
            } else {
                0
            }
        } else {
            self.time_accumulator += dt;
            let due = ((self.time_accumulator + ACCUMULATOR_EPSILON) / self.fixed_timestep)
                .floor() as u32;
            if due > 0 {
                self.time_accumulator =
                    (self.time_accumulator - due as f32 * self.fixed_timestep).max(0.0);
            }
            let substeps = due.min(max_substeps);
            if due > substeps {
                tracing::debug!("Dropping {} physics substeps", due - substeps);
            }
            for _ in 0..substeps {
                self.step_once(self.fixed_timestep);
            }
            substeps
        };

        self.synchronize_motion_states();
        Ok(executed)
    }

    fn step_once(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    /// Copy solver poses of dynamic bodies into their motion states.
    fn synchronize_motion_states(&mut self) {
        for (handle, record) in &mut self.records {
            if record.kind != BodyKind::Dynamic {
                continue;
            }
            if let Some(body) = self.bodies.get(handle.0) {
                record.motion_state = Transform::from_isometry(body.position());
                if body.is_sleeping() {
                    record.activation = ActivationState::Sleeping;
                } else if record.activation == ActivationState::Sleeping {
                    record.activation = ActivationState::Active;
                }
            }
        }
    }

    fn record(&self, handle: BodyHandle) -> Result<&BodyRecord, PhysicsError> {
        self.records
            .get(&handle)
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    fn record_mut(&mut self, handle: BodyHandle) -> Result<&mut BodyRecord, PhysicsError> {
        self.records
            .get_mut(&handle)
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    fn body_mut(
        &mut self,
        handle: BodyHandle,
    ) -> Result<&mut rapier3d::prelude::RigidBody, PhysicsError> {
        self.bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    /// Read a body's world transform through its motion state.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for handles from another world.
    pub fn motion_state(&self, handle: BodyHandle) -> Result<Transform, PhysicsError> {
        Ok(self.record(handle)?.motion_state)
    }

    /// Overwrite a body's motion state. The engine-side pose is untouched;
    /// use [`PhysicsWorld::set_world_transform`] for that.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for handles from another world.
    pub fn set_motion_state(
        &mut self,
        handle: BodyHandle,
        transform: Transform,
    ) -> Result<(), PhysicsError> {
        self.record_mut(handle)?.motion_state = transform;
        Ok(())
    }

    /// Place the engine-side body at `transform`.
    ///
    /// Kinematic bodies receive it as their target pose for the next step so
    /// the solver derives a velocity from the motion; every other body is
    /// teleported.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for handles from another world.
    pub fn set_world_transform(
        &mut self,
        handle: BodyHandle,
        transform: Transform,
    ) -> Result<(), PhysicsError> {
        let kind = self.record(handle)?.kind;
        let iso = transform.to_isometry();
        let body = self.body_mut(handle)?;
        if kind == BodyKind::Kinematic {
            body.set_next_kinematic_position(iso);
        } else {
            body.set_position(iso, true);
        }
        Ok(())
    }

    /// Wake a body so the next step simulates it.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for handles from another world.
    pub fn activate(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.wake_up(true);
        let record = self.record_mut(handle)?;
        if record.activation == ActivationState::Sleeping {
            record.activation = ActivationState::Active;
        }
        Ok(())
    }

    /// Change whether the body may fall asleep, waking or sleeping it to
    /// match. The engine's sleep thresholds follow the requested state.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for handles from another world.
    pub fn set_activation_state(
        &mut self,
        handle: BodyHandle,
        state: ActivationState,
    ) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        match state {
            ActivationState::Sleeping => body.sleep(),
            ActivationState::Active => {
                *body.activation_mut() = RigidBodyActivation::active();
                body.wake_up(true);
            }
            ActivationState::AlwaysActive => {
                *body.activation_mut() = RigidBodyActivation::cannot_sleep();
                body.wake_up(true);
            }
        }
        self.record_mut(handle)?.activation = state;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for handles from another world.
    pub fn activation_state(&self, handle: BodyHandle) -> Result<ActivationState, PhysicsError> {
        Ok(self.record(handle)?.activation)
    }

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for handles from another world.
    pub fn body_kind(&self, handle: BodyHandle) -> Result<BodyKind, PhysicsError> {
        Ok(self.record(handle)?.kind)
    }

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for handles from another world.
    pub fn set_linear_velocity(
        &mut self,
        handle: BodyHandle,
        velocity: Vec3,
    ) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.set_linvel(to_vector(velocity), true);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for handles from another world.
    pub fn linear_velocity(&self, handle: BodyHandle) -> Result<Vec3, PhysicsError> {
        self.bodies
            .get(handle.0)
            .map(|body| from_vector(body.linvel()))
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for handles from another world.
    pub fn angular_velocity(&self, handle: BodyHandle) -> Result<Vec3, PhysicsError> {
        self.bodies
            .get(handle.0)
            .map(|body| from_vector(body.angvel()))
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    /// Handles of every body of the given kind, in no particular order
    #[must_use]
    pub fn bodies_of_kind(&self, kind: BodyKind) -> Vec<BodyHandle> {
        self.records
            .iter()
            .filter(|(_, record)| record.kind == kind)
            .map(|(handle, _)| *handle)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::RigidBodyConstructionInfo;
    use crate::shapes::Shape;

    fn ball(world: &mut PhysicsWorld, height: f32) -> BodyHandle {
        let shape = Shape::sphere(0.5);
        let inertia = shape.local_inertia(1.0);
        let info = RigidBodyConstructionInfo::new(
            1.0,
            Transform::from_position(Vec3::new(0.0, height, 0.0)),
            shape,
            inertia,
        );
        world.add_body(RigidBody::new(info).unwrap()).unwrap()
    }

    #[test]
    fn frame_step_runs_exactly_one_substep() {
        let mut world = PhysicsWorld::initialize(Vec3::new(0.0, -9.8, 0.0));
        ball(&mut world, 10.0);
        for _ in 0..120 {
            assert_eq!(world.step(1.0 / 60.0, 10).unwrap(), 1);
        }
    }

    #[test]
    fn long_frame_is_clamped_to_max_substeps() {
        let mut world = PhysicsWorld::initialize(Vec3::new(0.0, -9.8, 0.0));
        ball(&mut world, 10.0);
        assert_eq!(world.step(1.0, 10).unwrap(), 10);
        // The excess was dropped rather than carried over
        assert_eq!(world.step(1.0 / 60.0, 10).unwrap(), 1);
    }

    #[test]
    fn zero_substeps_takes_one_variable_step() {
        let mut world = PhysicsWorld::initialize(Vec3::ZERO);
        ball(&mut world, 0.0);
        assert_eq!(world.step(0.25, 0).unwrap(), 1);
        assert_eq!(world.step(0.0, 0).unwrap(), 0);
    }

    #[test]
    fn negative_timestep_is_rejected() {
        let mut world = PhysicsWorld::initialize(Vec3::ZERO);
        assert_eq!(
            world.step(-0.1, 10).err(),
            Some(PhysicsError::InvalidTimestep(-0.1))
        );
    }

    #[test]
    fn unknown_handle_is_reported() {
        let mut other = PhysicsWorld::initialize(Vec3::ZERO);
        let foreign = ball(&mut other, 0.0);
        let world = PhysicsWorld::initialize(Vec3::ZERO);
        assert_eq!(
            world.motion_state(foreign).err(),
            Some(PhysicsError::UnknownBody(foreign))
        );
    }
}
