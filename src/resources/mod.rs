//! Core resource definitions
//!
//! CPU-side data the scene owns and the renderer uploads. Nothing in here
//! touches the GPU:
//! - [`Geometry`]: vertex attributes, indices and bounding volumes
//! - [`Material`]: surface parameters of a mesh
//! - [`Image`] / [`Texture`]: RGBA8 pixel data
//! - [`Mesh`]: a (geometry, material) pair referenced by a scene node
//! - [`primitives`]: parametric shape generators

pub mod geometry;
pub mod image;
pub mod material;
pub mod mesh;
pub mod primitives;
pub mod texture;

use slotmap::new_key_type;

new_key_type! {
    /// Key of a [`Geometry`] inside a scene arena.
    pub struct GeometryKey;
    /// Key of a [`Material`] inside a scene arena.
    pub struct MaterialKey;
    /// Key of a [`Texture`] inside a scene arena.
    pub struct TextureKey;
}

pub use geometry::{Attribute, BoundingBox, BoundingSphere, Geometry};
pub use image::Image;
pub use material::{Material, MaterialKind, Side};
pub use mesh::Mesh;
pub use texture::Texture;
