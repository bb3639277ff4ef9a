//! Scene graph
//!
//! Manages the node hierarchy and its components:
//! - [`Node`]: hierarchy entry with a [`Transform`] and optional mesh / camera / light
//! - [`Scene`]: the arena owning nodes and every resource they reference
//! - [`Camera`], [`Light`]: components attached to nodes
//! - [`transform_system`]: world-matrix propagation, decoupled from `Scene`
//! - [`raycast`]: ray construction from a camera and mesh intersection

pub mod camera;
pub mod light;
pub mod node;
pub mod raycast;
pub mod scene;
pub mod transform;
pub mod transform_system;

pub use camera::{Camera, Frustum};
pub use light::{AmbientLight, Light, LightKind};
pub use node::Node;
pub use raycast::{Intersection, Intersections, Ray, Raycaster};
pub use scene::{NodeBuilder, ResourceCounts, Scene};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    /// Handle of a node inside a [`Scene`].
    pub struct NodeHandle;
    pub struct MeshKey;
    pub struct CameraKey;
    pub struct LightKey;
}
