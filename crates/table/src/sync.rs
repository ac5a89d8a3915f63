//! # Transform Sync
//!
//! The one place per frame where physics and visuals meet, run strictly
//! after the world has stepped:
//!
//! 1. every node in the [`RigidBodyRegistry`] takes its body's motion state,
//!    verbatim, with no interpolation;
//! 2. every [`Actuator`] poses its node, and the node's resulting transform
//!    is pushed into its kinematic body through both the motion state and
//!    the engine-side pose, after which the body is woken.
//!
//! Input handling never writes kinematic bodies, so this pass is their only
//! writer.

use physics::{BodyHandle, PhysicsWorld, Transform};
use render::{Node, NodeId, SceneGraph};

use crate::error::TableError;
use crate::registry::RigidBodyRegistry;

/// Something whose visual pose is driven by game logic and whose kinematic
/// body must follow it
pub trait Actuator {
    fn node(&self) -> NodeId;
    fn body(&self) -> BodyHandle;
    /// Write the animated pose onto the actuator's node.
    fn pose(&self, node: &mut Node);
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub dynamic_read: usize,
    pub kinematic_written: usize,
}

/// Run both sync passes.
///
/// # Errors
///
/// Fails when a registry entry or actuator refers to a node or body that no
/// longer exists.
pub fn sync_transforms(
    world: &mut PhysicsWorld,
    scene: &mut SceneGraph,
    registry: &RigidBodyRegistry,
    actuators: &[&dyn Actuator],
) -> Result<SyncReport, TableError> {
    let dynamic_read = read_dynamic(world, scene, registry)?;
    let kinematic_written = write_kinematic(world, scene, actuators)?;
    Ok(SyncReport {
        dynamic_read,
        kinematic_written,
    })
}

fn read_dynamic(
    world: &PhysicsWorld,
    scene: &mut SceneGraph,
    registry: &RigidBodyRegistry,
) -> Result<usize, TableError> {
    for &id in registry.dynamic() {
        let handle = registry.body(id).ok_or(TableError::UnknownNode(id))?;
        let transform = world.motion_state(handle)?;
        let node = scene.node_mut(id).ok_or(TableError::UnknownNode(id))?;
        node.position = transform.position;
        node.orientation = transform.orientation;
    }
    Ok(registry.len())
}

fn write_kinematic(
    world: &mut PhysicsWorld,
    scene: &mut SceneGraph,
    actuators: &[&dyn Actuator],
) -> Result<usize, TableError> {
    for actuator in actuators {
        let id = actuator.node();
        let node = scene.node_mut(id).ok_or(TableError::UnknownNode(id))?;
        actuator.pose(node);
        let transform = Transform::new(node.position, node.orientation);

        let body = actuator.body();
        world.set_motion_state(body, transform)?;
        world.set_world_transform(body, transform)?;
        world.activate(body)?;
    }
    Ok(actuators.len())
}
