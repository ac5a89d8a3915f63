//! # Flipper Actuator
//!
//! A flipper is a kinematic box hanging off a pivot node. Its orientation is
//! the base orientation captured at creation composed with a yaw offset,
//! `base * rot_y(offset)`, and the offset is animated between rest (zero) and
//! the activated angle whenever its key goes down or up.

use glam::Quat;
use physics::BodyHandle;
use render::{Node, NodeId};

use crate::config::FlipperConfig;
use crate::sync::Actuator;
use crate::tween::{Animated, Ease};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FlipperSide {
    Left,
    Right,
}

impl FlipperSide {
    /// Sign of the swing: left flippers turn positive, right negative
    #[must_use]
    pub fn direction(self) -> f32 {
        match self {
            Self::Left => 1.0,
            Self::Right => -1.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Flipper {
    side: FlipperSide,
    node: NodeId,
    body: BodyHandle,
    base_orientation: Quat,
    offset: Animated,
    activated_angle: f32,
    swing_duration: f32,
}

impl Flipper {
    #[must_use]
    pub fn new(
        side: FlipperSide,
        node: NodeId,
        body: BodyHandle,
        base_orientation: Quat,
        config: &FlipperConfig,
    ) -> Self {
        Self {
            side,
            node,
            body,
            base_orientation,
            offset: Animated::new(0.0),
            activated_angle: config.activated_angle,
            swing_duration: config.swing_duration,
        }
    }

    /// Swing towards the activated angle.
    pub fn press(&mut self) {
        self.swing_to(self.side.direction() * self.activated_angle);
    }

    /// Swing back to rest.
    pub fn release(&mut self) {
        self.swing_to(0.0);
    }

    #[allow(clippy::float_cmp)]
    fn swing_to(&mut self, target: f32) {
        // Re-pressing towards the goal already in flight keeps the old timing
        if self.offset.target() == Some(target) {
            return;
        }
        if !self.offset.is_animating() && self.offset.value() == target {
            return;
        }
        tracing::debug!("{:?} flipper swinging to {:.3}", self.side, target);
        self.offset
            .animate_to(target, self.swing_duration, Ease::Power1InOut);
    }

    pub fn advance(&mut self, dt: f32) {
        self.offset.advance(dt);
    }

    pub fn set_tunables(&mut self, config: &FlipperConfig) {
        self.activated_angle = config.activated_angle;
        self.swing_duration = config.swing_duration;
    }

    #[must_use]
    pub fn effective_orientation(&self) -> Quat {
        self.base_orientation * Quat::from_rotation_y(self.offset.value())
    }

    #[must_use]
    pub fn side(&self) -> FlipperSide {
        self.side
    }

    #[must_use]
    pub fn offset(&self) -> f32 {
        self.offset.value()
    }

    #[must_use]
    pub fn base_orientation(&self) -> Quat {
        self.base_orientation
    }

    #[must_use]
    pub fn is_swinging(&self) -> bool {
        self.offset.is_animating()
    }
}

impl Actuator for Flipper {
    fn node(&self) -> NodeId {
        self.node
    }

    fn body(&self) -> BodyHandle {
        self.body
    }

    fn pose(&self, node: &mut Node) {
        node.orientation = self.effective_orientation();
    }
}
