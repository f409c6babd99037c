//! WGPU-backed render target
//!
//! Draws a [`Frame`] with one textured Lambert pipeline. Every mesh part is a
//! single instance in a shared instance buffer; opaque parts go first, then
//! transparent parts with depth writes off. GPU meshes and textures are
//! uploaded on first use, keyed by asset id, and pruned once a frame no longer
//! references them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Context;
use wgpu::util::DeviceExt;

use super::target::{Frame, RenderTarget};
use crate::error::{GardenError, Result};
use crate::gfx::resources::{AssetId, DepthBuffer, Geometry, Texture, TextureResource};
use crate::gfx::scene::vertex::{InstanceRaw, Vertex3D};
use crate::wgpu_utils::{binding_types, UniformBuffer};

pub const MAX_POINT_LIGHTS: usize = 16;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
struct DirectionalLightRaw {
    direction: [f32; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
struct PointLightRaw {
    position_range: [f32; 4],
    color: [f32; 4],
}

/// Mirrors `Globals` in shader.wgsl
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct GlobalsUniform {
    view_proj: [[f32; 4]; 4],
    view_position: [f32; 4],
    ambient: [f32; 4],
    light_info: [u32; 4],
    directional: [DirectionalLightRaw; 2],
    point_lights: [PointLightRaw; MAX_POINT_LIGHTS],
}

impl GlobalsUniform {
    fn from_frame(frame: &Frame<'_>) -> Self {
        let mut directional = [DirectionalLightRaw::default(); 2];
        for (slot, light) in directional.iter_mut().zip(&frame.directional) {
            slot.direction = [light.direction[0], light.direction[1], light.direction[2], 0.0];
            slot.color = [light.color[0], light.color[1], light.color[2], 1.0];
        }

        if frame.point_lights.len() > MAX_POINT_LIGHTS {
            log::debug!(
                "Frame has {} point lights, only {} are shaded",
                frame.point_lights.len(),
                MAX_POINT_LIGHTS
            );
        }
        let mut point_lights = [PointLightRaw::default(); MAX_POINT_LIGHTS];
        for (slot, light) in point_lights.iter_mut().zip(&frame.point_lights) {
            let [x, y, z] = light.position;
            slot.position_range = [x, y, z, light.range];
            slot.color = [light.color[0], light.color[1], light.color[2], 1.0];
        }

        let [r, g, b] = frame.ambient;
        Self {
            view_proj: frame.camera.view_proj,
            view_position: frame.camera.view_position,
            ambient: [r, g, b, 1.0],
            light_info: [
                frame.directional.len().min(2) as u32,
                frame.point_lights.len().min(MAX_POINT_LIGHTS) as u32,
                0,
                0,
            ],
            directional,
            point_lights,
        }
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, geometry: &Geometry) -> Self {
        let label = format!("{:?}", geometry.shape);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(&geometry.data.to_vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(&geometry.data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: geometry.data.indices.len() as u32,
        }
    }
}

struct GpuTexture {
    _resource: TextureResource,
    bind_group: wgpu::BindGroup,
}

/// Surface content acquired by `render` and presented by `finish_frame`
struct PendingFrame {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

pub struct WgpuRenderer {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    format: wgpu::TextureFormat,
    depth: DepthBuffer,
    opaque_pipeline: wgpu::RenderPipeline,
    transparent_pipeline: wgpu::RenderPipeline,
    globals: UniformBuffer<GlobalsUniform>,
    globals_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    white_texture: GpuTexture,
    textures: HashMap<AssetId, GpuTexture>,
    meshes: HashMap<AssetId, GpuMesh>,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    pending: Option<PendingFrame>,
}

impl WgpuRenderer {
    /// Creates a renderer drawing into `window`
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width` - Initial surface width in pixels
    /// * `height` - Initial surface height in pixels
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to request adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Garden Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to request a device")?;

        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .context("Surface reports no supported formats")?;
        let alpha_mode = capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth = DepthBuffer::new(&device, config.width, config.height);

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: binding_types::uniform(),
                count: None,
            }],
        });
        let globals = UniformBuffer::<GlobalsUniform>::new(&device);
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals.binding_resource(),
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: binding_types::texture_2d(),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: binding_types::sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Garden Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Garden Pipeline Layout"),
            bind_group_layouts: &[&globals_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let opaque_pipeline = create_pipeline(&device, &layout, &shader, format, false);
        let transparent_pipeline = create_pipeline(&device, &layout, &shader, format, true);

        let white = TextureResource::white(&device, &queue);
        let white_texture = GpuTexture {
            bind_group: texture_bind_group(&device, &texture_layout, &white),
            _resource: white,
        };

        let instance_capacity = 64;
        let instance_buffer = create_instance_buffer(&device, instance_capacity);

        log::info!("Renderer ready ({:?}, {}x{})", format, config.width, config.height);

        Ok(Self {
            surface,
            device: Arc::new(device),
            queue: Arc::new(queue),
            config,
            format,
            depth,
            opaque_pipeline,
            transparent_pipeline,
            globals,
            globals_bind_group,
            texture_layout,
            white_texture,
            textures: HashMap::new(),
            meshes: HashMap::new(),
            instance_buffer,
            instance_capacity,
            pending: None,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Draws the overlay on top of the last rendered frame and presents it
    ///
    /// Does nothing when `render` skipped the frame.
    pub fn finish_frame<F>(&mut self, overlay: F)
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let Some(pending) = self.pending.take() else {
            return;
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Overlay Encoder"),
            });
        overlay(&*self.device, &*self.queue, &mut encoder, &pending.view);
        self.queue.submit(std::iter::once(encoder.finish()));
        pending.surface_texture.present();
    }

    /// Starts a frame that is only cleared to `color`, for screens without a garden
    pub fn clear_frame(&mut self, color: [f32; 3]) -> Result<()> {
        self.pending = None;
        let Some(surface_texture) = self.acquire()? else {
            return Ok(());
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Clear Encoder"),
            });
        {
            let [r, g, b] = color;
            encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        self.pending = Some(PendingFrame {
            surface_texture,
            view,
        });
        Ok(())
    }

    fn acquire(&mut self) -> Result<Option<wgpu::SurfaceTexture>> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(Some(texture)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface texture timed out, skipping frame");
                Ok(None)
            }
            Err(err) => Err(GardenError::Render(err.to_string())),
        }
    }

    fn ensure_texture(&mut self, texture: &Texture) {
        if self.textures.contains_key(&texture.id) {
            return;
        }
        let resource = TextureResource::from_texture(&self.device, &self.queue, texture);
        let bind_group = texture_bind_group(&self.device, &self.texture_layout, &resource);
        self.textures.insert(
            texture.id,
            GpuTexture {
                _resource: resource,
                bind_group,
            },
        );
    }

    fn ensure_instance_capacity(&mut self, needed: usize) {
        if needed <= self.instance_capacity {
            return;
        }
        self.instance_capacity = needed.next_power_of_two();
        self.instance_buffer = create_instance_buffer(&self.device, self.instance_capacity);
    }
}

impl RenderTarget for WgpuRenderer {
    fn render(&mut self, frame: &Frame<'_>) -> Result<()> {
        self.pending = None;
        let Some(surface_texture) = self.acquire()? else {
            return Ok(());
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // opaque first, then transparent
        let mut order: Vec<usize> = (0..frame.draws.len()).collect();
        order.sort_by_key(|&i| frame.draws[i].material.transparent);
        let opaque_count = order
            .iter()
            .take_while(|&&i| !frame.draws[i].material.transparent)
            .count();

        let mut used_meshes = HashSet::new();
        let mut used_textures = HashSet::new();
        let mut instances = Vec::with_capacity(order.len());
        for &i in &order {
            let draw = &frame.draws[i];
            if !self.meshes.contains_key(&draw.geometry.id) {
                let mesh = GpuMesh::upload(&self.device, draw.geometry);
                self.meshes.insert(draw.geometry.id, mesh);
            }
            used_meshes.insert(draw.geometry.id);

            let repeat = match &draw.material.map {
                Some(texture) => {
                    self.ensure_texture(texture);
                    used_textures.insert(texture.id);
                    texture.repeat
                }
                None => 1.0,
            };
            let [er, eg, eb] = draw.emissive;
            instances.push(InstanceRaw {
                model: draw.model.into(),
                color: draw.material.rgba(),
                emissive: [er, eg, eb, 0.0],
                params: [repeat, if draw.material.is_lit() { 1.0 } else { 0.0 }, 0.0, 0.0],
            });
        }

        self.ensure_instance_capacity(instances.len());
        if !instances.is_empty() {
            self.queue
                .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }
        self.globals
            .update_content(&self.queue, GlobalsUniform::from_frame(frame));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let [r, g, b] = frame.clear_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

            for (slot, &i) in order.iter().enumerate() {
                if slot == 0 {
                    render_pass.set_pipeline(&self.opaque_pipeline);
                }
                if slot == opaque_count {
                    render_pass.set_pipeline(&self.transparent_pipeline);
                }

                let draw = &frame.draws[i];
                let Some(mesh) = self.meshes.get(&draw.geometry.id) else {
                    continue;
                };
                let texture = draw
                    .material
                    .map
                    .as_ref()
                    .and_then(|t| self.textures.get(&t.id))
                    .unwrap_or(&self.white_texture);

                render_pass.set_bind_group(1, &texture.bind_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                let instance = slot as u32;
                render_pass.draw_indexed(0..mesh.index_count, 0, instance..instance + 1);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        self.meshes.retain(|id, _| used_meshes.contains(id));
        self.textures.retain(|id, _| used_textures.contains(id));

        self.pending = Some(PendingFrame {
            surface_texture,
            view,
        });
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthBuffer::new(&self.device, width, height);
    }

    fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    transparent: bool,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(if transparent {
            "Transparent Pipeline"
        } else {
            "Opaque Pipeline"
        }),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex3D::desc(), InstanceRaw::desc()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // planes, rings and petals are seen from both sides
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthBuffer::FORMAT,
            depth_write_enabled: !transparent,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Instance Buffer"),
        size: (capacity * std::mem::size_of::<InstanceRaw>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    resource: &TextureResource,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Texture Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&resource.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&resource.sampler),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LightingConfig, SceneConfig};
    use crate::gfx::camera::PerspectiveCamera;
    use crate::gfx::rendering::target::PointLightData;
    use crate::gfx::scene::Lighting;

    #[test]
    fn test_globals_layout_matches_shader() {
        // 4x4 matrix + 3 vec4 + 2 directional + 16 point lights
        assert_eq!(std::mem::size_of::<GlobalsUniform>(), 64 + 48 + 64 + 16 * 32);
        assert_eq!(std::mem::size_of::<GlobalsUniform>() % 16, 0);
    }

    #[test]
    fn test_globals_clamp_point_lights() {
        let lighting = Lighting::new(&SceneConfig::default(), &LightingConfig::default());
        let camera = PerspectiveCamera::new(&SceneConfig::default(), 1.0);
        let mut frame = Frame::new(camera.uniform(), &lighting);
        for i in 0..20 {
            frame.point_lights.push(PointLightData {
                position: [i as f32, 2.0, 0.0],
                color: [1.0, 1.0, 0.6],
                range: 4.0,
            });
        }

        let globals = GlobalsUniform::from_frame(&frame);
        assert_eq!(globals.light_info[0], 1);
        assert_eq!(globals.light_info[1], MAX_POINT_LIGHTS as u32);
        assert_eq!(globals.point_lights[3].position_range, [3.0, 2.0, 0.0, 4.0]);
    }
}
