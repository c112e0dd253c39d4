use super::{helpers, DEPTH_FORMAT, HDR_FORMAT};
use crate::constants::{align_to, INITIAL_DRAW_CAPACITY};
use fnv::FnvHashMap;
use glam::{Mat4, Vec4};
use viz_core::{BlendMode, Topology};

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct Vertex {
    pub(crate) position: [f32; 3],
    pub(crate) normal: [f32; 3],
    pub(crate) color: [f32; 3],
    pub(crate) uv: [f32; 2],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 4] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x3, 3 => Float32x2];

    fn layout(step_mode: wgpu::VertexStepMode) -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct FrameUniforms {
    pub(crate) view: [[f32; 4]; 4],
    pub(crate) proj: [[f32; 4]; 4],
    pub(crate) camera_pos: [f32; 4],
    pub(crate) ambient: [f32; 4],
    pub(crate) light_dir: [f32; 4],
    pub(crate) light_color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct MaterialUniforms {
    /// x: point size, y: lit, z: vertex colors, w: textured
    pub(crate) params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct ItemUniforms {
    model: [[f32; 4]; 4],
    tint: [f32; 4],
}

impl ItemUniforms {
    pub(crate) fn new(model: Mat4, tint: Vec4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            tint: tint.to_array(),
        }
    }
}

/// Distinct render state a draw needs; one pipeline per key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct PipelineKey {
    pub(crate) topology: Topology,
    pub(crate) blend: BlendMode,
    pub(crate) transparent: bool,
}

impl PipelineKey {
    fn blend_state(self) -> Option<wgpu::BlendState> {
        match (self.blend, self.transparent) {
            (BlendMode::Additive, _) => Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            }),
            (BlendMode::Normal, true) => Some(wgpu::BlendState::ALPHA_BLENDING),
            (BlendMode::Normal, false) => Some(wgpu::BlendState::REPLACE),
        }
    }

    /// Blended draws test depth but do not write it.
    fn writes_depth(self) -> bool {
        !self.transparent && self.blend == BlendMode::Normal
    }
}

/// Pipelines, layouts and shared uniforms for the scene pass.
pub(crate) struct SceneResources {
    shader: wgpu::ShaderModule,
    layout: wgpu::PipelineLayout,
    pub(crate) material_bgl: wgpu::BindGroupLayout,
    item_bgl: wgpu::BindGroupLayout,
    pipelines: FnvHashMap<PipelineKey, wgpu::RenderPipeline>,
    pub(crate) frame_uniforms: wgpu::Buffer,
    pub(crate) frame_bg: wgpu::BindGroup,
    pub(crate) item_uniforms: wgpu::Buffer,
    pub(crate) item_bg: wgpu::BindGroup,
    pub(crate) item_stride: u64,
    item_capacity: usize,
    /// Bound in place of a texture for untextured materials.
    pub(crate) white: wgpu::Texture,
    pub(crate) white_view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
}

impl SceneResources {
    pub(crate) fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(super::SCENE_WGSL.into()),
        });
        let vis = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
        let frame_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_frame_bgl"),
            entries: &[helpers::uniform_entry(0, vis, false)],
        });
        let [tex, samp] = helpers::texture_sampler_entries(1);
        let material_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_material_bgl"),
            entries: &[helpers::uniform_entry(0, vis, false), tex, samp],
        });
        let item_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_item_bgl"),
            entries: &[helpers::uniform_entry(0, vis, true)],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_layout"),
            bind_group_layouts: &[&frame_bgl, &material_bgl, &item_bgl],
            push_constant_ranges: &[],
        });

        let frame_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene_frame_uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_frame_bg"),
            layout: &frame_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_uniforms.as_entire_binding(),
            }],
        });

        let item_stride = align_to(
            std::mem::size_of::<ItemUniforms>() as u64,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let (item_uniforms, item_bg) =
            create_item_buffer(device, &item_bgl, item_stride, INITIAL_DRAW_CAPACITY);

        let (white, white_view) = helpers::upload_rgba(device, queue, "white", 1, 1, &[255; 4]);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("scene_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            shader,
            layout,
            material_bgl,
            item_bgl,
            pipelines: FnvHashMap::default(),
            frame_uniforms,
            frame_bg,
            item_uniforms,
            item_bg,
            item_stride,
            item_capacity: INITIAL_DRAW_CAPACITY,
            white,
            white_view,
            sampler,
        }
    }

    /// Grow the per-draw uniform buffer to hold at least `count` slots.
    pub(crate) fn ensure_item_capacity(&mut self, device: &wgpu::Device, count: usize) {
        if count <= self.item_capacity {
            return;
        }
        let capacity = count.next_power_of_two();
        self.item_uniforms.destroy();
        (self.item_uniforms, self.item_bg) =
            create_item_buffer(device, &self.item_bgl, self.item_stride, capacity);
        self.item_capacity = capacity;
        log::debug!("[render] per-draw uniforms grown to {} slots", capacity);
    }

    pub(crate) fn ensure_pipeline(&mut self, device: &wgpu::Device, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        let pipeline = make_scene_pipeline(device, &self.layout, &self.shader, key);
        self.pipelines.insert(key, pipeline);
    }

    pub(crate) fn pipeline(&self, key: PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&key)
    }

    pub(crate) fn destroy(&self) {
        self.frame_uniforms.destroy();
        self.item_uniforms.destroy();
        self.white.destroy();
    }
}

fn create_item_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("scene_item_uniforms"),
        size: stride * capacity as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("scene_item_bg"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<ItemUniforms>() as u64),
            }),
        }],
    });
    (buffer, bg)
}

fn make_scene_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    let (vs_entry, step_mode, topology) = match key.topology {
        Topology::Points => (
            "vs_points",
            wgpu::VertexStepMode::Instance,
            wgpu::PrimitiveTopology::TriangleList,
        ),
        Topology::Lines => (
            "vs_mesh",
            wgpu::VertexStepMode::Vertex,
            wgpu::PrimitiveTopology::LineList,
        ),
        Topology::Triangles => (
            "vs_mesh",
            wgpu::VertexStepMode::Vertex,
            wgpu::PrimitiveTopology::TriangleList,
        ),
    };
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("scene_pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs_entry),
            buffers: &[Vertex::layout(step_mode)],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: HDR_FORMAT,
                blend: key.blend_state(),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: key.writes_depth(),
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        cache: None,
        multiview: None,
    })
}
