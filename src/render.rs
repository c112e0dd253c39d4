use crate::constants::{CLEAR_RGBA, POINT_SPRITE_VERTICES};
use anyhow::{anyhow, bail};
use glam::Vec3;
use viz_core::{BlendMode, GeometryDesc, Light, MaterialDesc, RenderFrame, Renderer, SurfaceSize, Topology};
use web_sys as web;
use wgpu::util::DeviceExt;

mod helpers;
mod post;
mod scene;
mod targets;

use post::{PostBindGroups, PostResources};
use scene::{FrameUniforms, ItemUniforms, MaterialUniforms, PipelineKey, SceneResources, Vertex};
use targets::RenderTargets;

pub(crate) const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

pub(crate) static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");
pub(crate) static POST_WGSL: &str = include_str!("../shaders/post.wgsl");

pub struct GpuGeometry {
    topology: Topology,
    /// CPU copy so point positions can be rewritten in place.
    vertices: Vec<Vertex>,
    /// `None` for empty geometry; nothing is drawn.
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<(wgpu::Buffer, u32)>,
}

pub struct GpuMaterial {
    blend: BlendMode,
    transparent: bool,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    texture: Option<wgpu::Texture>,
}

/// WebGPU renderer bound to one canvas.
pub struct GpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    targets: RenderTargets,
    linear_sampler: wgpu::Sampler,
    post: PostResources,
    post_bgs: PostBindGroups,
    scene: SceneResources,
    clear_color: wgpu::Color,
    released: bool,
}

impl GpuRenderer {
    pub async fn new(canvas: &web::HtmlCanvasElement, size: SurfaceSize) -> anyhow::Result<Self> {
        let width = size.width.max(1);
        let height = size.height.max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: Some("viz_device"),
                },
                None,
            )
            .await
            .map_err(|e| anyhow!("request_device error: {:?}", e))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
        let alpha_mode = if caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let targets = RenderTargets::new(&device, width, height);
        let post_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("post_shader"),
            source: wgpu::ShaderSource::Wgsl(POST_WGSL.into()),
        });
        let linear_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let post = post::create_post_resources(&device, &post_shader, HDR_FORMAT, format);
        let post_bgs = post.bind_groups(&device, &linear_sampler, &targets);
        let scene = SceneResources::new(&device, &queue);
        log::info!("[render] WebGPU ready: {}x{} {:?}", width, height, format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            targets,
            linear_sampler,
            post,
            post_bgs,
            scene,
            clear_color: wgpu::Color {
                r: CLEAR_RGBA[0],
                g: CLEAR_RGBA[1],
                b: CLEAR_RGBA[2],
                a: CLEAR_RGBA[3],
            },
            released: false,
        })
    }

    fn frame_uniforms(frame: &RenderFrame<'_, Self>) -> FrameUniforms {
        let mut ambient = Vec3::ZERO;
        let mut light_dir = Vec3::ZERO;
        let mut light_color = Vec3::ZERO;
        for light in frame.lights {
            match *light {
                Light::Ambient { color, intensity } => ambient += color * intensity,
                Light::Directional {
                    color,
                    intensity,
                    position,
                } => {
                    // Only the first directional light is shaded.
                    if light_color == Vec3::ZERO {
                        light_dir = position.normalize_or_zero();
                        light_color = color * intensity;
                    }
                }
            }
        }
        FrameUniforms {
            view: frame.view.to_cols_array_2d(),
            proj: frame.projection.to_cols_array_2d(),
            camera_pos: frame.camera_position.extend(1.0).to_array(),
            ambient: ambient.extend(1.0).to_array(),
            light_dir: light_dir.extend(0.0).to_array(),
            light_color: light_color.extend(1.0).to_array(),
        }
    }

    fn pipeline_key(geometry: &GpuGeometry, material: &GpuMaterial) -> PipelineKey {
        PipelineKey {
            topology: geometry.topology,
            blend: material.blend,
            transparent: material.transparent,
        }
    }
}

fn vertices_of(desc: &GeometryDesc) -> Vec<Vertex> {
    desc.positions
        .iter()
        .enumerate()
        .map(|(i, p)| Vertex {
            position: p.to_array(),
            normal: p.normalize_or_zero().to_array(),
            color: desc
                .colors
                .as_ref()
                .and_then(|c| c.get(i))
                .map_or([1.0; 3], |c| c.to_array()),
            uv: desc
                .uvs
                .as_ref()
                .and_then(|u| u.get(i))
                .map_or([0.0; 2], |u| u.to_array()),
        })
        .collect()
}

impl Renderer for GpuRenderer {
    type Geometry = GpuGeometry;
    type Material = GpuMaterial;

    fn create_geometry(&mut self, desc: &GeometryDesc) -> anyhow::Result<GpuGeometry> {
        if self.released {
            bail!("renderer released");
        }
        let vertices = vertices_of(desc);
        let vertex_buffer = (!vertices.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(desc.label),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                })
        });
        let index_buffer = match desc.indices.as_deref() {
            Some(indices) if !indices.is_empty() => {
                if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
                    bail!("{}: index {} out of range", desc.label, bad);
                }
                let buf = self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(desc.label),
                        contents: bytemuck::cast_slice(indices),
                        usage: wgpu::BufferUsages::INDEX,
                    });
                Some((buf, indices.len() as u32))
            }
            _ => None,
        };
        Ok(GpuGeometry {
            topology: desc.topology,
            vertices,
            vertex_buffer,
            index_buffer,
        })
    }

    fn write_positions(&mut self, geometry: &mut GpuGeometry, positions: &[Vec3]) {
        let Some(buffer) = geometry.vertex_buffer.as_ref() else {
            return;
        };
        for (v, p) in geometry.vertices.iter_mut().zip(positions) {
            v.position = p.to_array();
        }
        self.queue
            .write_buffer(buffer, 0, bytemuck::cast_slice(&geometry.vertices));
    }

    fn release_geometry(&mut self, geometry: GpuGeometry) {
        if let Some(b) = geometry.vertex_buffer {
            b.destroy();
        }
        if let Some((b, _)) = geometry.index_buffer {
            b.destroy();
        }
    }

    fn create_material(&mut self, desc: &MaterialDesc) -> anyhow::Result<GpuMaterial> {
        if self.released {
            bail!("renderer released");
        }
        let texture = match desc.texture.as_ref() {
            Some(t) => {
                let limit = self.device.limits().max_texture_dimension_2d;
                if t.width > limit || t.height > limit {
                    bail!("{}: texture {}x{} exceeds {}", desc.label, t.width, t.height, limit);
                }
                let expected = t.width as usize * t.height as usize * 4;
                if t.width == 0 || t.height == 0 || t.rgba.len() != expected {
                    bail!(
                        "{}: texture {}x{} has {} bytes",
                        desc.label,
                        t.width,
                        t.height,
                        t.rgba.len()
                    );
                }
                Some(helpers::upload_rgba(
                    &self.device,
                    &self.queue,
                    desc.label,
                    t.width,
                    t.height,
                    &t.rgba,
                ))
            }
            None => None,
        };
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let params = MaterialUniforms {
            params: [
                desc.point_size,
                flag(desc.lit),
                flag(desc.vertex_colors),
                flag(texture.is_some()),
            ],
        };
        let uniforms = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(desc.label),
                contents: bytemuck::bytes_of(&params),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let view = texture
            .as_ref()
            .map_or(&self.scene.white_view, |(_, view)| view);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(desc.label),
            layout: &self.scene.material_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.scene.sampler),
                },
            ],
        });
        Ok(GpuMaterial {
            blend: desc.blend,
            transparent: desc.transparent,
            uniforms,
            bind_group,
            texture: texture.map(|(tex, _)| tex),
        })
    }

    fn release_material(&mut self, material: GpuMaterial) {
        material.uniforms.destroy();
        if let Some(t) = material.texture {
            t.destroy();
        }
    }

    fn resize(&mut self, size: SurfaceSize) {
        if self.released || size.width == 0 || size.height == 0 {
            return;
        }
        if size.width == self.config.width && size.height == self.config.height {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.targets.recreate(&self.device, size.width, size.height);
        self.post_bgs = self
            .post
            .bind_groups(&self.device, &self.linear_sampler, &self.targets);
    }

    fn render(&mut self, frame: &RenderFrame<'_, Self>) -> anyhow::Result<()> {
        if self.released {
            return Ok(());
        }
        let fu = Self::frame_uniforms(frame);
        self.queue
            .write_buffer(&self.scene.frame_uniforms, 0, bytemuck::bytes_of(&fu));

        // Opaque first, blended after, otherwise in scene order.
        let mut order: Vec<usize> = (0..frame.items.len())
            .filter(|&i| frame.items[i].geometry.vertex_buffer.is_some())
            .collect();
        order.sort_by_key(|&i| {
            let item = &frame.items[i];
            let key = Self::pipeline_key(item.geometry, item.material);
            key.transparent || key.blend != BlendMode::Normal
        });
        self.scene.ensure_item_capacity(&self.device, order.len());
        let stride = self.scene.item_stride as usize;
        let mut staging = vec![0u8; stride * order.len()];
        for (slot, &i) in order.iter().enumerate() {
            let item = &frame.items[i];
            self.scene
                .ensure_pipeline(&self.device, Self::pipeline_key(item.geometry, item.material));
            let u = ItemUniforms::new(item.model, item.tint);
            let bytes = bytemuck::bytes_of(&u);
            staging[slot * stride..slot * stride + bytes.len()].copy_from_slice(bytes);
        }
        if !staging.is_empty() {
            self.queue
                .write_buffer(&self.scene.item_uniforms, 0, &staging);
        }
        self.post
            .write_uniforms(&self.queue, self.targets.bloom_extent, frame.bloom);

        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => return Ok(()),
            Err(e) => return Err(anyhow!("surface error: {:?}", e)),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.hdr_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_bind_group(0, &self.scene.frame_bg, &[]);
            for (slot, &i) in order.iter().enumerate() {
                let item = &frame.items[i];
                let (geometry, material) = (item.geometry, item.material);
                let Some(vertices) = geometry.vertex_buffer.as_ref() else {
                    continue;
                };
                let Some(pipeline) = self.scene.pipeline(Self::pipeline_key(geometry, material)) else {
                    continue;
                };
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(1, &material.bind_group, &[]);
                rpass.set_bind_group(2, &self.scene.item_bg, &[(slot * stride) as u32]);
                rpass.set_vertex_buffer(0, vertices.slice(..));
                let count = geometry.vertices.len() as u32;
                match (geometry.topology, geometry.index_buffer.as_ref()) {
                    (Topology::Points, _) => rpass.draw(0..POINT_SPRITE_VERTICES, 0..count),
                    (_, Some((indices, n))) => {
                        rpass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                        rpass.draw_indexed(0..*n, 0, 0..1);
                    }
                    (_, None) => rpass.draw(0..count, 0..1),
                }
            }
        }

        if frame.bloom.is_some() {
            post::blit(
                &mut encoder,
                "bright_pass",
                &self.targets.bloom_a_view,
                wgpu::Color::BLACK,
                &self.post.bright_pipeline,
                &self.post_bgs.hdr,
                None,
            );
            post::blit(
                &mut encoder,
                "blur_h",
                &self.targets.bloom_b_view,
                wgpu::Color::BLACK,
                &self.post.blur_pipeline,
                &self.post_bgs.from_bloom_a,
                None,
            );
            post::blit(
                &mut encoder,
                "blur_v",
                &self.targets.bloom_a_view,
                wgpu::Color::BLACK,
                &self.post.blur_pipeline,
                &self.post_bgs.from_bloom_b,
                None,
            );
        }
        post::blit(
            &mut encoder,
            "composite",
            &view,
            self.clear_color,
            &self.post.composite_pipeline,
            &self.post_bgs.hdr,
            Some(&self.post_bgs.bloom_a_only),
        );

        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.targets.destroy();
        self.post.destroy();
        self.scene.destroy();
        self.device.destroy();
        log::info!("[render] context released");
    }
}
