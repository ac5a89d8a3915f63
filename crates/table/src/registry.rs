//! Typed side-table between scene nodes and physics bodies
//!
//! Every node that owns a body has an entry in the binding table. Nodes whose
//! body is dynamic are additionally listed, in creation order, as the set
//! Transform Sync reads back every frame. Zero-mass bodies are bound but
//! never listed: they are written to, never read from.

use std::collections::HashMap;

use physics::BodyHandle;
use render::NodeId;

#[derive(Clone, Debug, Default)]
pub struct RigidBodyRegistry {
    bindings: HashMap<NodeId, BodyHandle>,
    dynamic: Vec<NodeId>,
}

impl RigidBodyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `node` to its body. A node owns at most one body; binding it again
    /// replaces the old handle.
    pub fn bind(&mut self, node: NodeId, body: BodyHandle) {
        if let Some(previous) = self.bindings.insert(node, body) {
            tracing::warn!("Node {:?} rebound from {:?} to {:?}", node, previous, body);
        }
    }

    /// List an already bound node for per-frame read-back.
    pub fn insert_dynamic(&mut self, node: NodeId) {
        if !self.dynamic.contains(&node) {
            self.dynamic.push(node);
        }
    }

    #[must_use]
    pub fn body(&self, node: NodeId) -> Option<BodyHandle> {
        self.bindings.get(&node).copied()
    }

    /// Nodes with a dynamic body, in creation order
    #[must_use]
    pub fn dynamic(&self) -> &[NodeId] {
        &self.dynamic
    }

    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.dynamic.contains(&node)
    }

    /// Number of dynamic members
    #[must_use]
    pub fn len(&self) -> usize {
        self.dynamic.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dynamic.is_empty()
    }

    /// Number of nodes bound to any body
    #[must_use]
    pub fn bound(&self) -> usize {
        self.bindings.len()
    }
}
