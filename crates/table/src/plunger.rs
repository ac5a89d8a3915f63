//! # Plunger Actuator
//!
//! `Idle -> Charging -> Released -> Idle`. Charging pulls the plunger back
//! along the launch axis; releasing converts the charge time into a launch
//! speed and drives the plunger forward, snapping it to rest once the forward
//! stroke finishes. The ball itself belongs to the simulation, which applies
//! the returned [`Shot`].

use glam::{Quat, Vec3};
use physics::BodyHandle;
use render::{Node, NodeId};

use crate::config::PlungerConfig;
use crate::sync::Actuator;
use crate::tween::{Animated, Ease};

/// Direction the ball leaves the plunger in
pub const LAUNCH_AXIS: Vec3 = Vec3::Z;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PlungerState {
    Idle,
    Charging { started_at: f64 },
    Released,
}

/// Outcome of releasing a charged plunger
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Shot {
    /// Charge time used, already clamped
    pub charge_seconds: f32,
    pub impulse: f32,
}

impl Shot {
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        LAUNCH_AXIS * self.impulse
    }
}

/// The timing and strength knobs of the plunger, live-tunable
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlungerTunables {
    pub charge_offset: f32,
    pub charge_duration: f32,
    pub release_offset: f32,
    pub release_duration: f32,
    pub min_impulse: f32,
    pub max_impulse: f32,
    pub max_charge: f32,
}

impl From<&PlungerConfig> for PlungerTunables {
    fn from(config: &PlungerConfig) -> Self {
        Self {
            charge_offset: config.charge_offset,
            charge_duration: config.charge_duration,
            release_offset: config.release_offset,
            release_duration: config.release_duration,
            min_impulse: config.min_impulse,
            max_impulse: config.max_impulse,
            max_charge: config.max_charge,
        }
    }
}

impl PlungerTunables {
    /// Launch speed for a charge held `elapsed` seconds: linear from the
    /// minimum to the maximum impulse, saturating at `max_charge`.
    #[must_use]
    pub fn impulse(&self, elapsed: f32) -> f32 {
        let fraction = if self.max_charge > 0.0 {
            elapsed.clamp(0.0, self.max_charge) / self.max_charge
        } else {
            1.0
        };
        self.min_impulse + fraction * (self.max_impulse - self.min_impulse)
    }
}

#[derive(Clone, Debug)]
pub struct Plunger {
    node: NodeId,
    body: BodyHandle,
    rest_position: Vec3,
    orientation: Quat,
    offset: Animated,
    state: PlungerState,
    tunables: PlungerTunables,
}

impl Plunger {
    #[must_use]
    pub fn new(
        node: NodeId,
        body: BodyHandle,
        rest_position: Vec3,
        orientation: Quat,
        tunables: PlungerTunables,
    ) -> Self {
        Self {
            node,
            body,
            rest_position,
            orientation,
            offset: Animated::new(0.0),
            state: PlungerState::Idle,
            tunables,
        }
    }

    /// Begin pulling back. Returns `false`, changing nothing, when a charge
    /// is already in progress.
    pub fn start_charging(&mut self, now: f64) -> bool {
        if self.is_charging() {
            return false;
        }
        self.state = PlungerState::Charging { started_at: now };
        self.offset.animate_to(
            self.tunables.charge_offset,
            self.tunables.charge_duration,
            Ease::Power1InOut,
        );
        true
    }

    /// Fire. Returns `None` when nothing was charging.
    #[allow(clippy::cast_possible_truncation)]
    pub fn release(&mut self, now: f64) -> Option<Shot> {
        let PlungerState::Charging { started_at } = self.state else {
            return None;
        };
        let charge_seconds = ((now - started_at).max(0.0) as f32).min(self.tunables.max_charge);
        let impulse = self.tunables.impulse(charge_seconds);

        self.state = PlungerState::Released;
        self.offset.animate_to(
            self.tunables.release_offset,
            self.tunables.release_duration,
            Ease::Power1InOut,
        );
        Some(Shot {
            charge_seconds,
            impulse,
        })
    }

    pub fn advance(&mut self, dt: f32) {
        let Some(step) = self.offset.advance(dt) else {
            return;
        };
        if step.completed && self.state == PlungerState::Released {
            self.offset.snap(0.0);
            self.state = PlungerState::Idle;
        }
    }

    pub fn set_tunables(&mut self, tunables: PlungerTunables) {
        self.tunables = tunables;
    }

    #[must_use]
    pub fn tunables(&self) -> &PlungerTunables {
        &self.tunables
    }

    #[must_use]
    pub fn state(&self) -> PlungerState {
        self.state
    }

    #[must_use]
    pub fn is_charging(&self) -> bool {
        matches!(self.state, PlungerState::Charging { .. })
    }

    #[must_use]
    pub fn offset(&self) -> f32 {
        self.offset.value()
    }

    #[must_use]
    pub fn rest_position(&self) -> Vec3 {
        self.rest_position
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.rest_position + LAUNCH_AXIS * self.offset.value()
    }
}

impl Actuator for Plunger {
    fn node(&self) -> NodeId {
        self.node
    }

    fn body(&self) -> BodyHandle {
        self.body
    }

    fn pose(&self, node: &mut Node) {
        node.position = self.position();
        node.orientation = self.orientation;
    }
}
