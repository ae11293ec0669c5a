//! Render-agnostic scene graph
//!
//! A `SceneNode` is one transformable thing in the world (a tree, a rock)
//! built from leaf `Part`s, each a primitive shape with a colour and a local
//! offset. The simulation only drives node poses, through `Posable`; the
//! renderer turns parts into meshes.

use std::collections::BTreeMap;

use glam::{Mat4, Quat, Vec3};

/// Node identifier (shared with the swallowable object that owns it)
pub type NodeId = u32;

/// Primitive shape of a leaf part, in the part's local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeSpec {
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
    /// Y-aligned, centered on its midpoint
    Cylinder { radius_top: f32, radius_bottom: f32, height: f32 },
    /// Y-aligned, apex up, centered on its midpoint
    Cone { radius: f32, height: f32 },
}

/// A leaf drawable
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub shape: ShapeSpec,
    pub color: [f32; 4],
    /// Offset from the node origin
    pub offset: Vec3,
}

impl Part {
    pub fn new(shape: ShapeSpec, color: [f32; 4], offset: Vec3) -> Self {
        Self { shape, color, offset }
    }
}

/// Anything that can be placed by a position and orientation
pub trait Posable {
    fn set_pose(&mut self, position: Vec3, rotation: Quat);
    fn position(&self) -> Vec3;
    fn rotation(&self) -> Quat;

    fn transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation(), self.position())
    }
}

/// A group of parts sharing one transform
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    position: Vec3,
    rotation: Quat,
    pub parts: Vec<Part>,
}

impl SceneNode {
    pub fn new(parts: Vec<Part>) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            parts,
        }
    }
}

impl Posable for SceneNode {
    fn set_pose(&mut self, position: Vec3, rotation: Quat) {
        self.position = position;
        self.rotation = rotation;
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }
}

/// All object visuals, iterated in id order
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: BTreeMap<NodeId, SceneNode>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: NodeId, node: SceneNode) {
        self.nodes.insert(id, node);
    }

    /// Remove a node. Returns false if it was not present.
    pub fn remove(&mut self, id: NodeId) -> bool {
        self.nodes.remove(&id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().map(|(&id, node)| (id, node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Copy a pose onto any posable target
pub fn sync_pose<P: Posable + ?Sized>(target: &mut P, position: Vec3, rotation: Quat) {
    target.set_pose(position, rotation);
}
