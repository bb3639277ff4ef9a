//! Per-scene GPU resource cache
//!
//! Scenes own CPU-side geometries, materials and textures in slot-map
//! arenas. The renderer mirrors them lazily into [`SceneCache`], keyed by the
//! same slot-map keys and grouped by scene id so a whole scene's GPU memory
//! can be released in one call.
//!
//! Change detection is version based:
//! - geometries re-upload when their position attribute version changes;
//! - textures re-upload when [`Texture::version`] changes, recreating the GPU
//!   texture only when the size changed;
//! - material uniforms are rewritten when the packed values differ, and the
//!   bind group is rebuilt when its map points at a recreated texture.

use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use crate::renderer::pipeline::{BindLayouts, Vertex};
use crate::renderer::uniforms::MaterialUniforms;
use crate::resources::texture::FilterMode;
use crate::resources::{Geometry, GeometryKey, Image, Material, MaterialKey, Texture, TextureKey};

/// Builds the interleaved vertex array of a geometry. Missing normals default
/// to +Y and missing uvs to zero.
#[must_use]
pub fn interleave(geometry: &Geometry) -> Vec<Vertex> {
    let Some(positions) = geometry.get_attribute("position") else {
        return Vec::new();
    };
    let normals = geometry.get_attribute("normal");
    let uvs = geometry.get_attribute("uv");

    (0..positions.count)
        .map(|i| Vertex {
            position: positions.read::<[f32; 3]>(i).unwrap_or_default(),
            normal: normals
                .and_then(|a| a.read::<[f32; 3]>(i))
                .unwrap_or([0.0, 1.0, 0.0]),
            uv: uvs.and_then(|a| a.read::<[f32; 2]>(i)).unwrap_or_default(),
        })
        .collect()
}

pub struct GpuGeometry {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    version: u64,
}

impl GpuGeometry {
    fn new(device: &wgpu::Device, geometry: &Geometry) -> Option<Self> {
        let vertices = interleave(geometry);
        if vertices.is_empty() {
            return None;
        }
        let indices: Vec<u32> = match geometry.indices() {
            Some(indices) => indices.to_vec(),
            None => (0..vertices.len() as u32).collect(),
        };
        if indices.is_empty() {
            return None;
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Some(Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            version: geometry_version(geometry),
        })
    }
}

fn geometry_version(geometry: &Geometry) -> u64 {
    geometry.get_attribute("position").map_or(0, |a| a.version)
}

pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub filter: FilterMode,
    version: u64,
    /// Bumped whenever `texture` is recreated; bind groups compare against it.
    generation: u64,
}

impl GpuTexture {
    fn new(device: &wgpu::Device, queue: &wgpu::Queue, image: &Image, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(image),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        write_pixels(queue, &texture, image);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            filter: FilterMode::Linear,
            version: 0,
            generation: 0,
        }
    }

    fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, source: &Texture) {
        if self.version == source.version {
            self.filter = source.filter;
            return;
        }
        let size = self.texture.size();
        let wanted = extent(&source.image);
        if size.width == wanted.width && size.height == wanted.height {
            write_pixels(queue, &self.texture, &source.image);
        } else {
            let generation = self.generation + 1;
            *self = Self::new(device, queue, &source.image, &source.name);
            self.generation = generation;
        }
        self.version = source.version;
        self.filter = source.filter;
    }
}

fn extent(image: &Image) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: image.width.max(1),
        height: image.height.max(1),
        depth_or_array_layers: 1,
    }
}

fn write_pixels(queue: &wgpu::Queue, texture: &wgpu::Texture, image: &Image) {
    if image.width == 0 || image.height == 0 {
        return;
    }
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width),
            rows_per_image: Some(image.height),
        },
        extent(image),
    );
}

pub struct GpuMaterial {
    pub bind_group: wgpu::BindGroup,
    buffer: wgpu::Buffer,
    uniforms: MaterialUniforms,
    /// Texture key and generation the bind group was built against.
    bound_map: Option<(TextureKey, u64)>,
}

/// Resources shared by every cached scene.
pub struct SharedResources {
    pub linear_sampler: wgpu::Sampler,
    pub nearest_sampler: wgpu::Sampler,
    /// 1x1 white texture bound when a material has no map.
    pub white: GpuTexture,
}

impl SharedResources {
    #[must_use]
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let sampler = |label, filter| {
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some(label),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                mag_filter: filter,
                min_filter: filter,
                ..Default::default()
            })
        };
        Self {
            linear_sampler: sampler("Linear Sampler", wgpu::FilterMode::Linear),
            nearest_sampler: sampler("Nearest Sampler", wgpu::FilterMode::Nearest),
            white: GpuTexture::new(
                device,
                queue,
                &Image::solid(1, 1, [255, 255, 255, 255]),
                "White Texture",
            ),
        }
    }

    fn sampler(&self, filter: FilterMode) -> &wgpu::Sampler {
        match filter {
            FilterMode::Linear => &self.linear_sampler,
            FilterMode::Nearest => &self.nearest_sampler,
        }
    }
}

/// GPU mirror of one scene's arenas.
#[derive(Default)]
pub struct SceneCache {
    pub geometries: FxHashMap<GeometryKey, GpuGeometry>,
    pub textures: FxHashMap<TextureKey, GpuTexture>,
    pub materials: FxHashMap<MaterialKey, GpuMaterial>,
}

impl SceneCache {
    pub fn prepare_geometry(
        &mut self,
        device: &wgpu::Device,
        key: GeometryKey,
        geometry: &Geometry,
    ) -> Option<&GpuGeometry> {
        let stale = self
            .geometries
            .get(&key)
            .is_none_or(|gpu| gpu.version != geometry_version(geometry));
        if stale {
            match GpuGeometry::new(device, geometry) {
                Some(gpu) => {
                    self.geometries.insert(key, gpu);
                }
                None => {
                    self.geometries.remove(&key);
                    return None;
                }
            }
        }
        self.geometries.get(&key)
    }

    pub fn prepare_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        key: TextureKey,
        texture: &Texture,
    ) {
        self.textures
            .entry(key)
            .and_modify(|gpu| gpu.sync(device, queue, texture))
            .or_insert_with(|| {
                let mut gpu = GpuTexture::new(device, queue, &texture.image, &texture.name);
                gpu.version = texture.version;
                gpu.filter = texture.filter;
                gpu
            });
    }

    /// Uploads the material (its map must already be prepared) and returns
    /// its bind group.
    pub fn prepare_material(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &BindLayouts,
        shared: &SharedResources,
        key: MaterialKey,
        material: &Material,
    ) -> Option<&wgpu::BindGroup> {
        let map = material
            .map
            .and_then(|k| self.textures.get(&k).map(|gpu| (k, gpu)));
        let bound_map = map.map(|(k, gpu)| (k, gpu.generation));
        let uniforms = MaterialUniforms::from_material(material, map.is_some());

        let needs_bind_group = self
            .materials
            .get(&key)
            .is_none_or(|gpu| gpu.bound_map != bound_map);

        if needs_bind_group {
            let texture = map.map_or(&shared.white, |(_, gpu)| gpu);
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Material Uniforms"),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Material Bind Group"),
                layout: &layouts.material,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(shared.sampler(texture.filter)),
                    },
                ],
            });
            self.materials.insert(
                key,
                GpuMaterial {
                    bind_group,
                    buffer,
                    uniforms,
                    bound_map,
                },
            );
        } else if let Some(gpu) = self.materials.get_mut(&key)
            && gpu.uniforms != uniforms
        {
            queue.write_buffer(&gpu.buffer, 0, bytemuck::bytes_of(&uniforms));
            gpu.uniforms = uniforms;
        }

        self.materials.get(&key).map(|gpu| &gpu.bind_group)
    }

    /// Drops cached entries whose keys no longer exist in the scene.
    pub fn retain(
        &mut self,
        geometry_alive: impl Fn(GeometryKey) -> bool,
        material_alive: impl Fn(MaterialKey) -> bool,
        texture_alive: impl Fn(TextureKey) -> bool,
    ) {
        self.geometries.retain(|k, _| geometry_alive(*k));
        self.materials.retain(|k, _| material_alive(*k));
        self.textures.retain(|k, _| texture_alive(*k));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.geometries.len() + self.textures.len() + self.materials.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::primitives::create_box;

    #[test]
    fn interleave_keeps_every_vertex() {
        let geometry = create_box(1.0, 2.0, 3.0);
        let vertices = interleave(&geometry);
        assert_eq!(vertices.len() as u32, geometry.vertex_count());
        for v in &vertices {
            let n = glam::Vec3::from_array(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn interleave_of_empty_geometry_is_empty() {
        assert!(interleave(&Geometry::new()).is_empty());
    }
}
