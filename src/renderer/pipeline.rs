//! Render pipelines
//!
//! One shader module serves every mesh; pipelines only differ in blending,
//! depth writes and face culling. [`PipelineFlags`] captures that difference
//! and keys the [`PipelineCache`].

use std::borrow::Cow;

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::renderer::uniforms::{GlobalUniforms, MODEL_STRIDE, MaterialUniforms, ModelUniforms};
use crate::resources::{Material, Side};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct PipelineFlags: u32 {
        /// Alpha blending, no depth writes.
        const TRANSPARENT  = 1 << 0;
        /// No back-face culling.
        const DOUBLE_SIDED = 1 << 1;
    }
}

impl PipelineFlags {
    #[must_use]
    pub fn for_material(material: &Material) -> Self {
        let mut flags = Self::empty();
        flags.set(Self::TRANSPARENT, material.transparent);
        flags.set(Self::DOUBLE_SIDED, material.side == Side::Double);
        flags
    }

    #[must_use]
    pub fn cull_mode(self) -> Option<wgpu::Face> {
        if self.contains(Self::DOUBLE_SIDED) {
            None
        } else {
            Some(wgpu::Face::Back)
        }
    }

    /// Transparent meshes test against depth but never write it.
    #[must_use]
    pub fn depth_stencil(self, format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format,
            depth_write_enabled: Some(!self.contains(Self::TRANSPARENT)),
            depth_compare: Some(wgpu::CompareFunction::LessEqual),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

/// Interleaved vertex: position, normal, uv.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// The three bind group layouts shared by all pipelines.
pub struct BindLayouts {
    pub global: wgpu::BindGroupLayout,
    pub material: wgpu::BindGroupLayout,
    pub model: wgpu::BindGroupLayout,
}

impl BindLayouts {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform = |binding, size: u64, dynamic| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: dynamic,
                min_binding_size: wgpu::BufferSize::new(size),
            },
            count: None,
        };

        let global = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Global Layout"),
            entries: &[uniform(0, std::mem::size_of::<GlobalUniforms>() as u64, false)],
        });
        let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Layout"),
            entries: &[
                uniform(0, std::mem::size_of::<MaterialUniforms>() as u64, false),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let model = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Layout"),
            entries: &[uniform(0, std::mem::size_of::<ModelUniforms>() as u64, true)],
        });
        debug_assert!(std::mem::size_of::<ModelUniforms>() as u64 <= MODEL_STRIDE);

        Self {
            global,
            material,
            model,
        }
    }
}

/// Lazily built pipelines, one per flag combination.
pub struct PipelineCache {
    shader: wgpu::ShaderModule,
    layout: wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
    pipelines: FxHashMap<PipelineFlags, wgpu::RenderPipeline>,
}

impl PipelineCache {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        layouts: &BindLayouts,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/scene.wgsl"))),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[
                Some(&layouts.global),
                Some(&layouts.material),
                Some(&layouts.model),
            ],
            immediate_size: 0,
        });
        Self {
            shader,
            layout,
            color_format,
            depth_format,
            pipelines: FxHashMap::default(),
        }
    }

    pub fn get_or_create(
        &mut self,
        device: &wgpu::Device,
        flags: PipelineFlags,
    ) -> &wgpu::RenderPipeline {
        self.pipelines.entry(flags).or_insert_with(|| {
            log::debug!("Creating pipeline {flags:?}");
            let transparent = flags.contains(PipelineFlags::TRANSPARENT);
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Scene Pipeline"),
                layout: Some(&self.layout),
                vertex: wgpu::VertexState {
                    module: &self.shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &self.shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.color_format,
                        blend: Some(if transparent {
                            wgpu::BlendState::ALPHA_BLENDING
                        } else {
                            wgpu::BlendState::REPLACE
                        }),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: flags.cull_mode(),
                    ..Default::default()
                },
                depth_stencil: Some(flags.depth_stencil(self.depth_format)),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        })
    }

    #[must_use]
    pub fn get(&self, flags: PipelineFlags) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&flags)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_follow_material() {
        let opaque = Material::standard(0xffffff);
        assert_eq!(PipelineFlags::for_material(&opaque), PipelineFlags::empty());

        let card = Material::basic(0xffffff).with_opacity(0.5).double_sided();
        assert_eq!(
            PipelineFlags::for_material(&card),
            PipelineFlags::TRANSPARENT | PipelineFlags::DOUBLE_SIDED
        );
    }

    #[test]
    fn transparent_meshes_keep_depth_test_without_writes() {
        let format = wgpu::TextureFormat::Depth32Float;
        let opaque = PipelineFlags::empty().depth_stencil(format);
        assert_eq!(opaque.depth_write_enabled, Some(true));
        assert_eq!(opaque.depth_compare, Some(wgpu::CompareFunction::LessEqual));

        let glass = PipelineFlags::TRANSPARENT.depth_stencil(format);
        assert_eq!(glass.depth_write_enabled, Some(false));
        assert_eq!(glass.depth_compare, Some(wgpu::CompareFunction::LessEqual));
    }

    #[test]
    fn double_sided_disables_culling() {
        assert_eq!(PipelineFlags::empty().cull_mode(), Some(wgpu::Face::Back));
        assert_eq!(PipelineFlags::DOUBLE_SIDED.cull_mode(), None);
    }

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }
}
