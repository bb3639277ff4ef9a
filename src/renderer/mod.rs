//! Rendering
//!
//! A single forward pass over the active scene:
//!
//! 1. [`queue`]: extract visible meshes, frustum cull, sort
//! 2. [`cache`]: upload geometries, textures and materials the scene owns
//! 3. draw opaque meshes, then transparent ones back to front
//!
//! Bind group layout:
//! - Group 0: camera, exposure and lights ([`uniforms::GlobalUniforms`])
//! - Group 1: material uniforms, base map and sampler
//! - Group 2: per-object transforms through a dynamic offset
//!
//! GPU resources are cached per scene id. [`Renderer::release_scene`] drops a
//! scene's cache in one step when the scene is torn down.

pub mod cache;
pub mod context;
pub mod pipeline;
pub mod queue;
pub mod settings;
pub mod uniforms;

use rustc_hash::FxHashMap;

use crate::errors::Result;
use crate::scene::Scene;

use self::cache::{SceneCache, SharedResources};
use self::context::WgpuContext;
use self::pipeline::{BindLayouts, PipelineCache};
use self::uniforms::{GlobalUniforms, MODEL_STRIDE, ModelUniforms};

pub use self::pipeline::PipelineFlags;
pub use self::settings::RenderSettings;

/// Frames between sweeps of cache entries whose scene resources are gone.
const PRUNE_INTERVAL: u64 = 120;
const INITIAL_MODEL_SLOTS: u64 = 512;

/// GPU state that only exists after [`Renderer::init`].
struct GpuState {
    context: WgpuContext,
    layouts: BindLayouts,
    pipelines: PipelineCache,
    shared: SharedResources,

    global_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,

    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    model_slots: u64,
    model_staging: Vec<u8>,

    scenes: FxHashMap<u32, SceneCache>,
}

impl GpuState {
    fn new(context: WgpuContext) -> Self {
        let device = &context.device;
        let layouts = BindLayouts::new(device);
        let pipelines =
            PipelineCache::new(device, &layouts, context.view_format, context.depth_format);
        let shared = SharedResources::new(device, &context.queue);

        let global_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Global Uniforms"),
            size: std::mem::size_of::<GlobalUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global Bind Group"),
            layout: &layouts.global,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: global_buffer.as_entire_binding(),
            }],
        });

        let (model_buffer, model_bind_group) =
            Self::create_model_buffer(device, &layouts, INITIAL_MODEL_SLOTS);

        Self {
            context,
            layouts,
            pipelines,
            shared,
            global_buffer,
            global_bind_group,
            model_buffer,
            model_bind_group,
            model_slots: INITIAL_MODEL_SLOTS,
            model_staging: Vec::new(),
            scenes: FxHashMap::default(),
        }
    }

    fn create_model_buffer(
        device: &wgpu::Device,
        layouts: &BindLayouts,
        slots: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Uniforms"),
            size: slots * MODEL_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Bind Group"),
            layout: &layouts.model,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ModelUniforms>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    /// Grows the dynamic model buffer to hold at least `count` slots.
    fn ensure_model_slots(&mut self, count: u64) {
        if count <= self.model_slots {
            return;
        }
        let slots = count.next_power_of_two();
        log::debug!("Growing model buffer to {slots} slots");
        let (buffer, bind_group) =
            Self::create_model_buffer(&self.context.device, &self.layouts, slots);
        self.model_buffer = buffer;
        self.model_bind_group = bind_group;
        self.model_slots = slots;
    }
}

/// The forward renderer.
///
/// Created without GPU resources; [`init`](Self::init) binds it to a window or
/// canvas. Until then [`render`](Self::render) and [`resize`](Self::resize)
/// are no-ops, which keeps headless stages usable.
pub struct Renderer {
    settings: RenderSettings,
    gpu: Option<GpuState>,
    frame_count: u64,
}

impl Renderer {
    #[must_use]
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            gpu: None,
            frame_count: 0,
        }
    }

    /// Creates the GPU context for `target` (a winit window, or a canvas on
    /// the web).
    pub async fn init(
        &mut self,
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<()> {
        let context = WgpuContext::new(target, &self.settings, width, height).await?;
        log::info!(
            "Renderer ready: {:?}, {}x{}",
            context.view_format,
            context.config.width,
            context.config.height
        );
        self.gpu = Some(GpuState::new(context));
        Ok(())
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.gpu.is_some()
    }

    #[must_use]
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Returns the surface size, or `(0, 0)` before initialization.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.gpu.as_ref().map_or((0, 0), |gpu| gpu.context.size())
    }

    /// Resizes the surface. Zero-sized requests are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Ignoring zero-sized resize");
            return;
        }
        if let Some(gpu) = &mut self.gpu {
            gpu.context.resize(width, height);
        }
    }

    /// Drops every GPU resource cached for scene `scene_id`.
    pub fn release_scene(&mut self, scene_id: u32) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        if let Some(cache) = gpu.scenes.remove(&scene_id) {
            log::info!(
                "Released GPU resources of scene {scene_id}: {} geometries, {} textures, {} materials",
                cache.geometries.len(),
                cache.textures.len(),
                cache.materials.len()
            );
        }
    }

    /// Number of scenes with cached GPU resources.
    #[must_use]
    pub fn cached_scene_count(&self) -> usize {
        self.gpu.as_ref().map_or(0, |gpu| gpu.scenes.len())
    }

    /// Draws `scene` through its active camera and presents the frame.
    ///
    /// World matrices must be current. Surface loss reconfigures the surface
    /// and skips the frame.
    pub fn render(&mut self, scene: &Scene) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        let Some(camera) = scene.main_camera() else {
            log::trace!("Scene {} has no active camera", scene.id);
            return;
        };
        self.frame_count += 1;

        let items = queue::collect(scene, camera);

        // ------------------------------------------------------------------
        // Upload
        // ------------------------------------------------------------------
        let device = &gpu.context.device;
        let gpu_queue = &gpu.context.queue;
        let cache = gpu.scenes.entry(scene.id).or_default();

        if self.frame_count % PRUNE_INTERVAL == 0 {
            cache.retain(
                |k| scene.geometries.contains_key(k),
                |k| scene.materials.contains_key(k),
                |k| scene.textures.contains_key(k),
            );
        }

        for (key, texture) in &scene.textures {
            cache.prepare_texture(device, gpu_queue, key, texture);
        }
        for item in &items {
            if let Some(geometry) = scene.geometries.get(item.geometry) {
                cache.prepare_geometry(device, item.geometry, geometry);
            }
            if let Some(material) = scene.materials.get(item.material) {
                cache.prepare_material(
                    device,
                    gpu_queue,
                    &gpu.layouts,
                    &gpu.shared,
                    item.material,
                    material,
                );
            }
            gpu.pipelines.get_or_create(device, item.flags);
        }

        let globals = GlobalUniforms::new(
            camera.view_projection_matrix(),
            camera.position(),
            self.settings.exposure,
            &scene.ambient,
            scene.iter_active_lights(),
        );
        gpu_queue.write_buffer(&gpu.global_buffer, 0, bytemuck::bytes_of(&globals));

        gpu.ensure_model_slots(items.len() as u64);
        gpu.model_staging.clear();
        gpu.model_staging.resize(items.len() * MODEL_STRIDE as usize, 0);
        let slots = gpu.model_staging.chunks_exact_mut(MODEL_STRIDE as usize);
        for (slot, item) in slots.zip(&items) {
            let model = ModelUniforms::new(&item.world);
            let bytes = bytemuck::bytes_of(&model);
            slot[..bytes.len()].copy_from_slice(bytes);
        }
        if !gpu.model_staging.is_empty() {
            gpu.context
                .queue
                .write_buffer(&gpu.model_buffer, 0, &gpu.model_staging);
        }

        // ------------------------------------------------------------------
        // Draw
        // ------------------------------------------------------------------
        let output = match gpu.context.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output)
            | wgpu::CurrentSurfaceTexture::Suboptimal(output) => output,
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                log::warn!("Surface lost or outdated, reconfiguring");
                gpu.context.reconfigure();
                return;
            }
            wgpu::CurrentSurfaceTexture::Timeout | wgpu::CurrentSurfaceTexture::Occluded => {
                log::debug!("Surface unavailable, frame skipped");
                return;
            }
            #[allow(unreachable_patterns)]
            _ => {
                log::error!("Failed to acquire the surface texture, frame skipped");
                return;
            }
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(gpu.context.view_format),
            ..Default::default()
        });

        let clear_color = scene.background.map_or(self.settings.clear_color, |c| wgpu::Color {
            r: f64::from(c.x),
            g: f64::from(c.y),
            b: f64::from(c.z),
            a: 1.0,
        });

        let Some(cache) = gpu.scenes.get(&scene.id) else {
            return;
        };
        let mut encoder = gpu
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Forward Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &gpu.context.depth_texture_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_bind_group(0, &gpu.global_bind_group, &[]);
            let mut current_flags = None;
            for (slot, item) in items.iter().enumerate() {
                let (Some(geometry), Some(material), Some(pipeline)) = (
                    cache.geometries.get(&item.geometry),
                    cache.materials.get(&item.material),
                    gpu.pipelines.get(item.flags),
                ) else {
                    continue;
                };
                if current_flags != Some(item.flags) {
                    pass.set_pipeline(pipeline);
                    current_flags = Some(item.flags);
                }
                pass.set_bind_group(1, &material.bind_group, &[]);
                let offset = (slot as u64 * MODEL_STRIDE) as u32;
                pass.set_bind_group(2, &gpu.model_bind_group, &[offset]);
                pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
                pass.set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..geometry.index_count, 0, 0..1);
            }
        }

        gpu.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}
