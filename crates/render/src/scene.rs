//! Scene graph of positioned, oriented and scaled nodes
//!
//! Nodes are stored in a flat arena and addressed by [`NodeId`]. A node's
//! world matrix is its parent's world matrix times its own local
//! scale/rotation/translation.

use glam::{Mat4, Quat, Vec3};

/// Index of a node inside a [`SceneGraph`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a node draws
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// Pure transform node
    Group,
    /// Box with full side lengths
    Box { size: Vec3 },
    Sphere { radius: f32 },
    /// Cylinder along local Y
    Cylinder { radius: f32, height: f32 },
    /// Indexed triangle mesh in local space
    Mesh {
        vertices: Vec<Vec3>,
        indices: Vec<[u32; 3]>,
    },
    /// Model fragment delivered by the asset loader. Decoding is out of
    /// scope, so these nodes only carry their placement.
    Imported { source: String, byte_len: usize },
}

impl Geometry {
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        !matches!(self, Self::Group | Self::Imported { .. })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: Vec3,
    pub geometry: Geometry,
    pub color: [f32; 3],
    pub visible: bool,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            scale: Vec3::ONE,
            geometry,
            color: [0.8, 0.8, 0.8],
            visible: true,
        }
    }

    #[must_use]
    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, Geometry::Group)
    }

    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: u32) -> Self {
        self.color = rgb(color);
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.orientation, self.position)
    }
}

/// Split a `0xRRGGBB` colour into linear-ish float channels
#[must_use]
pub fn rgb(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| f32::from(u8::try_from((hex >> shift) & 0xff).unwrap_or(0)) / 255.0;
    [channel(16), channel(8), channel(0)]
}

#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node at the root of the scene.
    pub fn add(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        self.push(node)
    }

    /// Add a node under `parent`. Unknown parents put the node at the root.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        if parent.index() >= self.nodes.len() {
            tracing::warn!("Parent {:?} does not exist, adding {} at root", parent, node.name);
            return self.add(node);
        }
        node.parent = Some(parent);
        let id = self.push(node);
        self.nodes[parent.index()].children.push(id);
        id
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(node);
        id
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(u32::try_from(i).unwrap_or(u32::MAX)), node))
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    /// Composite transform from the node's local space to world space
    #[must_use]
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let node = self.node(id)?;
        let local = node.local_matrix();
        match node.parent {
            Some(parent) => Some(self.world_matrix(parent)? * local),
            None => Some(local),
        }
    }

    #[must_use]
    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.world_matrix(id)
            .map(|m| m.to_scale_rotation_translation().2)
    }

    /// Product of the orientations along the parent chain, scale ignored
    #[must_use]
    pub fn world_orientation(&self, id: NodeId) -> Option<Quat> {
        let node = self.node(id)?;
        match node.parent {
            Some(parent) => Some(self.world_orientation(parent)? * node.orientation),
            None => Some(node.orientation),
        }
    }

    /// A node is shown only if it and all of its ancestors are visible
    #[must_use]
    pub fn is_effectively_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current.and_then(|id| self.node(id)) {
            if !node.visible {
                return false;
            }
            current = node.parent;
        }
        true
    }
}
