//! Contract with the drawing collaborator.
//!
//! The core never talks to a GPU. It asks a [`MeshBackend`] to turn fans
//! into opaque [`MeshHandle`]s and pushes [`DrawCommand`]s into a
//! [`DrawQueue`], which the collaborator consumes in z order.

use crate::{color::Color, geometry::Fan};
use glam::{Affine2, Vec2};

/// Opaque handle to an uploaded mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u64);

/// Creates and disposes meshes on behalf of the core.
///
/// `dispose` is called at most once per handle returned by `create_mesh`.
pub trait MeshBackend {
    fn create_mesh(&mut self, fan: &Fan) -> MeshHandle;
    fn dispose(&mut self, handle: MeshHandle);
}

/// A single queued draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    /// An uploaded fan drawn with a full transform.
    Mesh {
        z: f32,
        transform: Affine2,
        color: Color,
        mesh: MeshHandle,
    },
    /// A glowing weapon disc at a world position.
    Circle {
        z: f32,
        pos: Vec2,
        radius: f32,
        spread: f32,
        color: Color,
    },
}

impl DrawCommand {
    pub fn z(&self) -> f32 {
        match *self {
            DrawCommand::Mesh { z, .. } | DrawCommand::Circle { z, .. } => z,
        }
    }
}

/// Frame-local list of draw commands.
#[derive(Debug, Default)]
pub struct DrawQueue {
    commands: Vec<DrawCommand>,
}

impl DrawQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, cmd: DrawCommand) {
        self.commands.push(cmd);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Commands in submission order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Sorts by z; the sort is stable so submission order breaks ties.
    pub fn sort(&mut self) {
        self.commands.sort_by(|a, b| a.z().total_cmp(&b.z()));
    }

    /// Sorts and hands out every command, leaving the queue empty.
    pub fn drain_sorted(&mut self) -> std::vec::Drain<'_, DrawCommand> {
        self.sort();
        self.commands.drain(..)
    }
}

/// In-memory backend that tracks live handles.
///
/// Useful for headless runs and tests; it also catches double disposal.
#[derive(Debug, Default)]
pub struct CountingBackend {
    next: u64,
    live: std::collections::BTreeSet<MeshHandle>,
    pub created: usize,
    pub disposed: usize,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles created and not yet disposed.
    pub fn live(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, handle: MeshHandle) -> bool {
        self.live.contains(&handle)
    }
}

impl MeshBackend for CountingBackend {
    fn create_mesh(&mut self, fan: &Fan) -> MeshHandle {
        debug_assert!(fan.triangle_count() > 0);
        let handle = MeshHandle(self.next);
        self.next += 1;
        self.live.insert(handle);
        self.created += 1;
        handle
    }

    fn dispose(&mut self, handle: MeshHandle) {
        let was_live = self.live.remove(&handle);
        assert!(was_live, "mesh {handle:?} disposed twice");
        self.disposed += 1;
    }
}
