//! Transform system
//!
//! Propagates world matrices down the hierarchy. It borrows only the node and
//! camera arenas, not the whole [`Scene`](crate::scene::Scene), so callers can
//! hold other scene borrows while it runs.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::camera::Camera;
use crate::scene::node::Node;
use crate::scene::{CameraKey, NodeHandle};

/// Updates world matrices for every tree reachable from `roots`.
///
/// A node's world matrix is recomputed when its own TRS changed or when any
/// ancestor's did. Cameras attached to updated nodes get their view matrices
/// refreshed in the same pass.
pub fn update_hierarchy(
    nodes: &mut SlotMap<NodeHandle, Node>,
    cameras: &mut SlotMap<CameraKey, Camera>,
    roots: &[NodeHandle],
) {
    // (node, parent world matrix, parent changed)
    let mut stack: Vec<(NodeHandle, Affine3A, bool)> = Vec::with_capacity(64);
    for &root in roots.iter().rev() {
        stack.push((root, Affine3A::IDENTITY, false));
    }

    while let Some((handle, parent_world, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };

        let local_changed = node.transform.update_local_matrix();
        let world_needs_update = local_changed || parent_changed;

        if world_needs_update {
            let new_world = parent_world * node.transform.local_matrix;
            node.transform.set_world_matrix(new_world);

            if let Some(camera) = node.camera.and_then(|key| cameras.get_mut(key)) {
                camera.update_view_projection(&new_world);
            }
        }

        let current_world = node.transform.world_matrix;
        for &child in node.children.iter().rev() {
            stack.push((child, current_world, world_needs_update));
        }
    }
}
