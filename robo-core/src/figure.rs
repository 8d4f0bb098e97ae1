//! Node arena for one articulated figure and the traversal passes over it.

use crate::{
    animation::Animation,
    geometry::Geometry,
    render::{DrawCommand, DrawQueue, MeshBackend},
    types::{NodeId, ROOT},
    weapon::WeaponMount,
};
use glam::{Affine2, Vec2};

/// One rigid part of a figure.
///
/// ### Fields
/// - `parent` - Owning node, `None` for the root.
/// - `children` - Child ids in draw order.
/// - `local` - Transform relative to the parent, refreshed by animation.
/// - `world` - Cached `parent.world * local` from the last pass.
/// - `base` - Rest pose the animation perturbs; `None` for static nodes.
/// - `geometry` - Drawable fans.
/// - `mounts` - Weapon discs in local space.
/// - `animation` - Motion applied before composition each tick.
/// - `extent` - Lowest visible y of this subtree from the last tick,
///   `-inf` if the subtree draws nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub local: Affine2,
    pub world: Affine2,
    pub base: Option<Affine2>,
    pub geometry: Vec<Geometry>,
    pub mounts: Vec<WeaponMount>,
    pub animation: Animation,
    pub extent: f32,
}

impl Node {
    fn new(parent: Option<NodeId>, local: Affine2) -> Self {
        Self {
            parent,
            children: Vec::with_capacity(4),
            local,
            world: Affine2::IDENTITY,
            base: None,
            geometry: Vec::new(),
            mounts: Vec::new(),
            animation: Animation::None,
            extent: f32::NEG_INFINITY,
        }
    }

    /// Lowest y reached by this node's own geometry in its parent chain's frame.
    fn own_extent(&self) -> f32 {
        self.geometry
            .iter()
            .map(|g| self.world.translation.y + g.h)
            .fold(f32::NEG_INFINITY, f32::max)
    }
}

/// A tree of [`Node`]s stored in a flat arena.
///
/// Node `0` is the root. Children are always pushed after their parent, and
/// a node is only ever attached once, so the arena is a tree by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub nodes: Vec<Node>,
}

impl Default for Figure {
    fn default() -> Self {
        Self::new()
    }
}

impl Figure {
    /// Creates a figure holding only an identity root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(None, Affine2::IDENTITY)],
        }
    }

    /// Appends a child under `parent` and returns its id.
    pub fn add_child(&mut self, parent: NodeId, local: Affine2) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::new(Some(parent), local));
        self.nodes[parent].children.push(id);
        id
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Attaches an animation and snapshots the current local transform as
    /// its rest pose.
    pub fn animate(&mut self, id: NodeId, animation: Animation) {
        let node = &mut self.nodes[id];
        node.base = Some(node.local);
        node.animation = animation;
    }

    /// Node ids in pre-order, children visited in their stored order.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            figure: self,
            stack: if self.nodes.is_empty() { Vec::new() } else { vec![ROOT] },
        }
    }

    /// Animates every node, recomposes world transforms and folds extents.
    ///
    /// ### Parameters
    /// - `parent` - Transform the root is composed against.
    /// - `t` - Frame time in milliseconds.
    ///
    /// ### Returns
    /// The lowest visible y of the whole figure in `parent`'s frame, or
    /// `-inf` when nothing is drawable.
    pub fn tick(&mut self, parent: Affine2, t: f64) -> f32 {
        let order: Vec<NodeId> = self.preorder().collect();
        for &id in &order {
            let node = &mut self.nodes[id];
            if let Some(base) = node.base
                && let Some(pose) = node.animation.pose(&base, t)
            {
                node.local = pose;
            }
            self.compose(id, parent);
        }

        // Children follow their parent in pre-order, so walking it backwards
        // finishes every subtree before its root.
        for &id in order.iter().rev() {
            let node = &self.nodes[id];
            let extent = node
                .children
                .iter()
                .map(|&c| self.nodes[c].extent)
                .fold(node.own_extent(), f32::max);
            self.nodes[id].extent = extent;
        }
        self.nodes.first().map_or(f32::NEG_INFINITY, |root| root.extent)
    }

    /// Recomposes world transforms and queues every part and weapon.
    ///
    /// Composition here matches [`Figure::tick`] without animating, so
    /// calling both in one frame is idempotent.
    ///
    /// ### Parameters
    /// - `parent` - Transform placing the figure on screen.
    /// - `z_offset` - Added to every z key so units lower on screen paint
    ///   over units above them.
    /// - `queue` - Receives the draw commands.
    pub fn draw(&mut self, parent: Affine2, z_offset: f32, queue: &mut DrawQueue) {
        let order: Vec<NodeId> = self.preorder().collect();
        for id in order {
            self.compose(id, parent);
            let node = &self.nodes[id];
            for g in &node.geometry {
                let Some(mesh) = g.mesh else {
                    log::trace!("node {id}: skipping geometry that was never uploaded");
                    continue;
                };
                queue.push(DrawCommand::Mesh {
                    z: g.z + z_offset,
                    transform: node.world,
                    color: g.color,
                    mesh,
                });
            }
            for m in &node.mounts {
                queue.push(DrawCommand::Circle {
                    z: m.z + z_offset,
                    pos: node.world.transform_point2(m.pos),
                    radius: m.radius,
                    spread: m.spread,
                    color: m.color,
                });
            }
        }
    }

    /// World position of a point given in `id`'s local space, using the
    /// transforms from the last pass.
    pub fn world_point(&self, id: NodeId, local: Vec2) -> Vec2 {
        self.nodes[id].world.transform_point2(local)
    }

    /// Uploads every fan that does not have a mesh yet.
    pub fn upload(&mut self, backend: &mut impl MeshBackend) {
        for node in &mut self.nodes {
            for g in &mut node.geometry {
                if g.mesh.is_none() {
                    g.mesh = Some(backend.create_mesh(&g.fan));
                }
            }
        }
    }

    /// Disposes every uploaded mesh, children before parents.
    ///
    /// Handles are taken out of their geometry, so a second call or a call
    /// on a partially released figure never disposes anything twice.
    pub fn release(&mut self, backend: &mut impl MeshBackend) {
        let order: Vec<NodeId> = self.preorder().collect();
        for &id in order.iter().rev() {
            for g in &mut self.nodes[id].geometry {
                if let Some(mesh) = g.mesh.take() {
                    backend.dispose(mesh);
                }
            }
        }
    }

    /// Total number of weapon mounts across the figure.
    pub fn mount_count(&self) -> usize {
        self.nodes.iter().map(|n| n.mounts.len()).sum()
    }

    fn compose(&mut self, id: NodeId, root_parent: Affine2) {
        let parent_world = match self.nodes[id].parent {
            Some(p) => self.nodes[p].world,
            None => root_parent,
        };
        let node = &mut self.nodes[id];
        node.world = parent_world * node.local;
    }
}

/// Depth-first pre-order walk over a [`Figure`].
pub struct Preorder<'a> {
    figure: &'a Figure,
    stack: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.figure.nodes[id].children.iter().rev().copied());
        Some(id)
    }
}
