use crate::resources::{GeometryKey, MaterialKey};

/// A drawable pairing of geometry and material.
///
/// Several meshes may share a geometry or a material; both live in the owning
/// scene's arenas and are released together with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mesh {
    pub geometry: GeometryKey,
    pub material: MaterialKey,
    /// Draw order among transparent meshes; larger draws later.
    pub render_order: i32,
}

impl Mesh {
    #[must_use]
    pub fn new(geometry: GeometryKey, material: MaterialKey) -> Self {
        Self {
            geometry,
            material,
            render_order: 0,
        }
    }
}
