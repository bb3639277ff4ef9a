use std::borrow::Cow;

use glam::Affine3A;

use crate::scene::transform::Transform;
use crate::scene::{CameraKey, LightKey, MeshKey, NodeHandle};

/// A scene node.
///
/// # Hierarchy
///
/// Nodes form a tree through parent/child links. A node is owned by exactly
/// one parent (or is a root of the scene); removing it removes its subtree.
///
/// # Components
///
/// A node may reference one mesh, one camera and one light, all owned by the
/// [`Scene`](crate::scene::Scene) arenas.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: Cow<'static, str>,

    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    pub transform: Transform,

    /// An invisible node hides its whole subtree from rendering and picking.
    pub visible: bool,

    pub mesh: Option<MeshKey>,
    pub camera: Option<CameraKey>,
    pub light: Option<LightKey>,
}

impl Node {
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: Cow::Borrowed(""),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            visible: true,
            mesh: None,
            camera: None,
            light: None,
        }
    }

    #[must_use]
    pub fn with_name(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ..Self::new()
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// World transformation, refreshed by the transform system each frame.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}
