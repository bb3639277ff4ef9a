use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Affine3A, Vec3};
use rustc_hash::FxHashMap;
use wgpu::VertexFormat;

/// Attribute holds CPU-side vertex data and its layout metadata.
///
/// Data is stored as raw bytes shared through an `Arc`, so cloning a geometry
/// does not duplicate the vertex payload.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub data: Arc<Vec<u8>>,
    /// Data version for change detection
    pub version: u64,
    pub format: VertexFormat,
    pub count: u32,
    pub stride: u64,
}

static NEXT_ATTR_VERSION: AtomicU64 = AtomicU64::new(1);

impl Attribute {
    /// Creates a planar (non-interleaved) attribute.
    pub fn new_planar<T: bytemuck::Pod>(data: &[T], format: VertexFormat) -> Self {
        Self {
            data: Arc::new(bytemuck::cast_slice(data).to_vec()),
            version: NEXT_ATTR_VERSION.fetch_add(1, Ordering::Relaxed),
            format,
            count: data.len() as u32,
            stride: std::mem::size_of::<T>() as u64,
        }
    }

    /// Reads element `i` as `T`. Returns `None` when out of range.
    ///
    /// Reads are unaligned-safe: the backing store is a byte vector.
    #[must_use]
    pub fn read<T: bytemuck::Pod>(&self, i: u32) -> Option<T> {
        let size = std::mem::size_of::<T>();
        let start = (i as usize) * self.stride as usize;
        let bytes = self.data.get(start..start + size)?;
        Some(bytemuck::pod_read_unaligned(bytes))
    }

    #[must_use]
    pub fn read_vec3(&self, i: u32) -> Option<Vec3> {
        if self.format != VertexFormat::Float32x3 {
            return None;
        }
        self.read::<[f32; 3]>(i).map(Vec3::from_array)
    }
}

// ============================================================================
// Bounding volumes
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[must_use]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Transforms all eight corners and returns their axis-aligned bounds.
    #[must_use]
    pub fn transform(&self, matrix: &Affine3A) -> Self {
        let mut new_min = Vec3::splat(f32::INFINITY);
        let mut new_max = Vec3::splat(f32::NEG_INFINITY);
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            let transformed = matrix.transform_point3(corner);
            new_min = new_min.min(transformed);
            new_max = new_max.max(transformed);
        }
        Self {
            min: new_min,
            max: new_max,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

// ============================================================================
// Geometry
// ============================================================================

/// Triangle-list geometry with named planar attributes.
///
/// Builders fill `position`, `normal` and `uv`. The renderer interleaves these
/// three on upload; any other attribute is ignored by the forward pipeline.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    attributes: FxHashMap<String, Attribute>,
    indices: Option<Vec<u32>>,

    pub bounding_box: Option<BoundingBox>,
    pub bounding_sphere: Option<BoundingSphere>,
}

impl Geometry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attributes(&self) -> &FxHashMap<String, Attribute> {
        &self.attributes
    }

    pub fn set_attribute(&mut self, name: &str, attr: Attribute) {
        self.attributes.insert(name.to_string(), attr);
    }

    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn set_indices(&mut self, indices: &[u32]) {
        self.indices = Some(indices.to_vec());
    }

    #[must_use]
    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    /// Number of vertices in the `position` attribute.
    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        self.attributes.get("position").map_or(0, |a| a.count)
    }

    /// Number of indices that will be drawn.
    #[must_use]
    pub fn draw_count(&self) -> u32 {
        match &self.indices {
            Some(indices) => indices.len() as u32,
            None => self.vertex_count(),
        }
    }

    /// Iterates over the triangles of the geometry in local space.
    ///
    /// Triangles referencing out-of-range vertices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        let pos = self.attributes.get("position");
        let tri_count = (self.draw_count() / 3) as usize;

        (0..tri_count).filter_map(move |t| {
            let pos = pos?;
            let (i0, i1, i2) = match &self.indices {
                Some(idx) => (idx[t * 3], idx[t * 3 + 1], idx[t * 3 + 2]),
                None => {
                    let base = (t * 3) as u32;
                    (base, base + 1, base + 2)
                }
            };
            Some([pos.read_vec3(i0)?, pos.read_vec3(i1)?, pos.read_vec3(i2)?])
        })
    }

    /// Recomputes smooth vertex normals (area weighted) from the positions.
    pub fn compute_vertex_normals(&mut self) {
        let Some(pos_attr) = self.attributes.get("position") else {
            return;
        };
        if pos_attr.format != VertexFormat::Float32x3 {
            return;
        }

        let pos_count = pos_attr.count as usize;
        let mut normals = vec![Vec3::ZERO; pos_count];

        let mut accumulate = |i0: usize, i1: usize, i2: usize| {
            if i0 >= pos_count || i1 >= pos_count || i2 >= pos_count {
                return;
            }
            let (Some(v0), Some(v1), Some(v2)) = (
                pos_attr.read_vec3(i0 as u32),
                pos_attr.read_vec3(i1 as u32),
                pos_attr.read_vec3(i2 as u32),
            ) else {
                return;
            };
            // |cross| = 2 * triangle area
            let face_normal = (v1 - v0).cross(v2 - v0);
            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        };

        if let Some(indices) = &self.indices {
            for chunk in indices.chunks_exact(3) {
                accumulate(chunk[0] as usize, chunk[1] as usize, chunk[2] as usize);
            }
        } else {
            for i in (0..pos_count.saturating_sub(2)).step_by(3) {
                accumulate(i, i + 1, i + 2);
            }
        }

        let normals: Vec<[f32; 3]> = normals
            .into_iter()
            .map(|n| n.normalize_or_zero().to_array())
            .collect();
        self.set_attribute(
            "normal",
            Attribute::new_planar(&normals, VertexFormat::Float32x3),
        );
    }

    /// Computes the AABB and a bounding sphere centered on the AABB center.
    pub fn compute_bounding_volume(&mut self) {
        let Some(pos_attr) = self.attributes.get("position") else {
            return;
        };
        if pos_attr.format != VertexFormat::Float32x3 || pos_attr.count == 0 {
            return;
        }

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for i in 0..pos_attr.count {
            if let Some(p) = pos_attr.read_vec3(i) {
                min = min.min(p);
                max = max.max(p);
            }
        }

        let center = (min + max) * 0.5;
        let mut max_dist_sq: f32 = 0.0;
        for i in 0..pos_attr.count {
            if let Some(p) = pos_attr.read_vec3(i) {
                max_dist_sq = max_dist_sq.max(p.distance_squared(center));
            }
        }

        self.bounding_box = Some(BoundingBox { min, max });
        self.bounding_sphere = Some(BoundingSphere {
            center,
            radius: max_dist_sq.sqrt(),
        });
    }

    /// Builds a geometry from the three standard attributes and an index list.
    #[must_use]
    pub fn from_parts(
        positions: &[[f32; 3]],
        normals: &[[f32; 3]],
        uvs: &[[f32; 2]],
        indices: &[u32],
    ) -> Self {
        let mut geo = Geometry::new();
        geo.set_attribute(
            "position",
            Attribute::new_planar(positions, VertexFormat::Float32x3),
        );
        geo.set_attribute(
            "normal",
            Attribute::new_planar(normals, VertexFormat::Float32x3),
        );
        geo.set_attribute("uv", Attribute::new_planar(uvs, VertexFormat::Float32x2));
        geo.set_indices(indices);
        geo.compute_bounding_volume();
        geo
    }
}
