// src/rendering_lib/renderer.rs

use std::sync::Arc;

use bytemuck::Pod;
use wgpu::util::DeviceExt;

use super::backend::{GpuBackend, MaterialHandle, MeshHandle, TextureHandle};
use super::frame_plan::{CameraBlock, ColorBlock, DrawCall, FramePlan, MatrixBlock, PassTarget, PipelineKind};
use super::shader::{self, ShaderLibrary};
use super::vertex::MeshVertex;
use crate::config::ShadowConfig;
use crate::error::{Result, SceneError};
use crate::media::LoadedImage;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
pub const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Float;
const INITIAL_DRAW_SLOTS: u64 = 64;

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

struct DepthTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthTarget {
    fn new(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { _texture: texture, view }
    }
}

/// One uniform buffer holding a slot per draw, addressed with dynamic offsets.
struct SlotBuffer {
    buffer: wgpu::Buffer,
    stride: u64,
    block_size: u64,
}

impl SlotBuffer {
    fn new<T: Pod>(device: &wgpu::Device, label: &str, slots: u64, alignment: u64) -> Self {
        let block_size = std::mem::size_of::<T>() as u64;
        let stride = block_size.div_ceil(alignment) * alignment;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: stride * slots,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buffer, stride, block_size }
    }

    fn binding(&self) -> wgpu::BindingResource<'_> {
        wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer: &self.buffer,
            offset: 0,
            size: wgpu::BufferSize::new(self.block_size),
        })
    }

    fn offset(&self, slot: usize) -> u32 {
        (self.stride * slot as u64) as u32
    }

    /// Every slot is rewritten in full, in draw order.
    fn pack<T: Pod>(&self, blocks: impl Iterator<Item = T>) -> Vec<u8> {
        let mut bytes = Vec::new();
        for block in blocks {
            bytes.extend_from_slice(bytemuck::bytes_of(&block));
            bytes.resize(bytes.len() + (self.stride - self.block_size) as usize, 0);
        }
        bytes
    }
}

struct DrawUniforms {
    matrices: SlotBuffer,
    camera: SlotBuffer,
    color: SlotBuffer,
    bind_group: wgpu::BindGroup,
    capacity: u64,
}

impl DrawUniforms {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, capacity: u64) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let matrices = SlotBuffer::new::<MatrixBlock>(device, "Matrix Slots", capacity, alignment);
        let camera = SlotBuffer::new::<CameraBlock>(device, "Camera Slots", capacity, alignment);
        let color = SlotBuffer::new::<ColorBlock>(device, "Color Slots", capacity, alignment);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw_uniforms_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: matrices.binding() },
                wgpu::BindGroupEntry { binding: 1, resource: camera.binding() },
                wgpu::BindGroupEntry { binding: 2, resource: color.binding() },
            ],
        });
        Self { matrices, camera, color, bind_group, capacity }
    }

    fn offsets(&self, slot: usize) -> [u32; 3] {
        [self.matrices.offset(slot), self.camera.offset(slot), self.color.offset(slot)]
    }
}

struct ShadowTarget {
    _color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth: DepthTarget,
    bind_group: wgpu::BindGroup,
}

pub struct Renderer {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,

    shadow_pipeline: wgpu::RenderPipeline,
    skybox_pipeline: wgpu::RenderPipeline,
    terrain_pipeline: wgpu::RenderPipeline,
    standard_pipeline: wgpu::RenderPipeline,

    uniform_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    uniforms: DrawUniforms,

    sampler: wgpu::Sampler,
    white_view: wgpu::TextureView,
    flat_normal_view: wgpu::TextureView,
    fallback_material: wgpu::BindGroup,

    shadow: ShadowTarget,
    depth: DepthTarget,

    meshes: Vec<GpuMesh>,
    textures: Vec<wgpu::TextureView>,
    materials: Vec<wgpu::BindGroup>,
}

fn uniform_entry(binding: u32, size: usize) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: true,
            min_binding_size: wgpu::BufferSize::new(size as u64),
        },
        count: None,
    }
}

fn texture_entry(binding: u32, filterable: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32, kind: wgpu::SamplerBindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(kind),
        count: None,
    }
}

struct PipelineSpec<'a> {
    label: &'a str,
    module: &'a wgpu::ShaderModule,
    layout: &'a wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    cull_mode: Option<wgpu::Face>,
    depth_write: bool,
    depth_compare: wgpu::CompareFunction,
}

fn create_pipeline(device: &wgpu::Device, spec: PipelineSpec<'_>) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(spec.layout),
        vertex: wgpu::VertexState {
            module: spec.module,
            entry_point: "vs_main",
            buffers: &[MeshVertex::desc()],
        },
        fragment: Some(wgpu::FragmentState {
            module: spec.module,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: spec.format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Cw,
            cull_mode: spec.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: spec.depth_write,
            depth_compare: spec.depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

fn solid_texture(device: &wgpu::Device, queue: &wgpu::Queue, label: &str, rgba: [u8; 4]) -> wgpu::TextureView {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d { width: 1, height: 1, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &rgba,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

impl Renderer {
    pub async fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        shadow_config: &ShadowConfig,
        shaders: &ShaderLibrary,
    ) -> Result<Self> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_uniforms_layout"),
            entries: &[
                uniform_entry(0, std::mem::size_of::<MatrixBlock>()),
                uniform_entry(1, std::mem::size_of::<CameraBlock>()),
                uniform_entry(2, std::mem::size_of::<ColorBlock>()),
            ],
        });
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_layout"),
            entries: &[
                texture_entry(0, true),
                sampler_entry(1, wgpu::SamplerBindingType::Filtering),
                texture_entry(2, true),
            ],
        });
        let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow_map_layout"),
            entries: &[
                texture_entry(0, false),
                sampler_entry(1, wgpu::SamplerBindingType::NonFiltering),
            ],
        });

        let module = |name: &str| -> Result<wgpu::ShaderModule> {
            let source = shaders.source(name)?;
            Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(name),
                source: wgpu::ShaderSource::Wgsl(source.into_owned().into()),
            }))
        };
        let shadow_module = module(shader::SHADOW)?;
        let skybox_module = module(shader::SKYBOX)?;
        let terrain_module = module(shader::TERRAIN)?;
        let standard_module = module(shader::STANDARD)?;

        let layout = |label: &str, groups: &[&wgpu::BindGroupLayout]| {
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: groups,
                push_constant_ranges: &[],
            })
        };
        let shadow_pl = layout("Shadow Pipeline Layout", &[&uniform_layout]);
        let skybox_pl = layout("Skybox Pipeline Layout", &[&uniform_layout, &material_layout]);
        let lit_pl = layout("Lit Pipeline Layout", &[&uniform_layout, &material_layout, &shadow_layout]);

        let shadow_pipeline = create_pipeline(&device, PipelineSpec {
            label: "Shadow Pipeline",
            module: &shadow_module,
            layout: &shadow_pl,
            format: SHADOW_FORMAT,
            cull_mode: Some(wgpu::Face::Back),
            depth_write: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
        });
        // Seen from inside, always behind everything drawn after it.
        let skybox_pipeline = create_pipeline(&device, PipelineSpec {
            label: "Skybox Pipeline",
            module: &skybox_module,
            layout: &skybox_pl,
            format: surface_format,
            cull_mode: None,
            depth_write: false,
            depth_compare: wgpu::CompareFunction::Always,
        });
        let terrain_pipeline = create_pipeline(&device, PipelineSpec {
            label: "Terrain Pipeline",
            module: &terrain_module,
            layout: &lit_pl,
            format: surface_format,
            cull_mode: Some(wgpu::Face::Back),
            depth_write: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
        });
        let standard_pipeline = create_pipeline(&device, PipelineSpec {
            label: "Standard Pipeline",
            module: &standard_module,
            layout: &lit_pl,
            format: surface_format,
            cull_mode: Some(wgpu::Face::Back),
            depth_write: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let white_view = solid_texture(&device, &queue, "White Texture", [255, 255, 255, 255]);
        let flat_normal_view = solid_texture(&device, &queue, "Flat Normal Texture", [128, 128, 255, 255]);
        let fallback_material = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("fallback_material"),
            layout: &material_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&white_view) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&sampler) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::TextureView(&flat_normal_view) },
            ],
        });

        let shadow_color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map"),
            size: wgpu::Extent3d {
                width: shadow_config.map_width.max(1),
                height: shadow_config.map_height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let shadow_view = shadow_color.create_view(&wgpu::TextureViewDescriptor::default());
        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_map_bind_group"),
            layout: &shadow_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&shadow_view) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&shadow_sampler) },
            ],
        });
        let shadow = ShadowTarget {
            _color: shadow_color,
            color_view: shadow_view,
            depth: DepthTarget::new(&device, shadow_config.map_width, shadow_config.map_height, "Shadow Depth"),
            bind_group: shadow_bind_group,
        };

        let uniforms = DrawUniforms::new(&device, &uniform_layout, INITIAL_DRAW_SLOTS);
        let depth = DepthTarget::new(&device, width, height, "Primary Depth");

        if let Some(err) = device.pop_error_scope().await {
            return Err(SceneError::Gpu(err.to_string()));
        }
        log::info!("Renderer ready ({surface_format:?}, {width}x{height})");

        Ok(Self {
            device,
            queue,
            shadow_pipeline,
            skybox_pipeline,
            terrain_pipeline,
            standard_pipeline,
            uniform_layout,
            material_layout,
            uniforms,
            sampler,
            white_view,
            flat_normal_view,
            fallback_material,
            shadow,
            depth,
            meshes: Vec::new(),
            textures: Vec::new(),
            materials: Vec::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.depth = DepthTarget::new(&self.device, width, height, "Primary Depth");
    }

    fn pipeline(&self, kind: PipelineKind) -> &wgpu::RenderPipeline {
        match kind {
            PipelineKind::Shadow => &self.shadow_pipeline,
            PipelineKind::Skybox => &self.skybox_pipeline,
            PipelineKind::Terrain => &self.terrain_pipeline,
            PipelineKind::Standard => &self.standard_pipeline,
        }
    }

    fn ensure_draw_slots(&mut self, draws: usize) {
        let needed = draws as u64;
        if needed <= self.uniforms.capacity {
            return;
        }
        let capacity = needed.next_power_of_two();
        log::debug!("Growing draw uniform slots to {capacity}");
        self.uniforms = DrawUniforms::new(&self.device, &self.uniform_layout, capacity);
    }

    /// Writes one uniform slot per draw, then records the plan's passes in order.
    pub fn execute(&mut self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView, plan: &FramePlan) {
        let draws: Vec<&DrawCall> = plan.passes.iter().flat_map(|p| p.draws.iter()).collect();
        self.ensure_draw_slots(plan.draw_count());

        if !draws.is_empty() {
            let u = &self.uniforms;
            let matrices = u.matrices.pack(draws.iter().map(|d| d.constants.matrices));
            let camera = u.camera.pack(draws.iter().map(|d| d.constants.camera));
            let color = u.color.pack(draws.iter().map(|d| d.constants.color));
            self.queue.write_buffer(&u.matrices.buffer, 0, &matrices);
            self.queue.write_buffer(&u.camera.buffer, 0, &camera);
            self.queue.write_buffer(&u.color.buffer, 0, &color);
        }

        let [r, g, b, a] = plan.clear_color;
        {
            let _clear = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations { load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }), store: wgpu::StoreOp::Store },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: wgpu::StoreOp::Store }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
        }

        let mut slot = 0usize;
        for pass in &plan.passes {
            let (color_view, depth_view) = match pass.target {
                PassTarget::ShadowMap => (&self.shadow.color_view, &self.shadow.depth.view),
                PassTarget::Primary => (target, &self.depth.view),
            };
            let color_load = match pass.clear_color {
                Some([r, g, b, a]) => wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                None => wgpu::LoadOp::Load,
            };
            let depth_load = if pass.clear_depth { wgpu::LoadOp::Clear(1.0) } else { wgpu::LoadOp::Load };

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(pass.label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations { load: color_load, store: wgpu::StoreOp::Store },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations { load: depth_load, store: wgpu::StoreOp::Store }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let mut bound: Option<PipelineKind> = None;
            for draw in &pass.draws {
                let current = slot;
                slot += 1;
                let Some(mesh) = self.meshes.get(draw.mesh.0 as usize) else {
                    log::warn!("Skipping draw with released mesh {:?}", draw.mesh);
                    continue;
                };

                if bound != Some(draw.pipeline) {
                    render_pass.set_pipeline(self.pipeline(draw.pipeline));
                    bound = Some(draw.pipeline);
                }
                render_pass.set_bind_group(0, &self.uniforms.bind_group, &self.uniforms.offsets(current));
                if draw.pipeline != PipelineKind::Shadow {
                    let material = draw
                        .material
                        .and_then(|m| self.materials.get(m.0 as usize))
                        .unwrap_or(&self.fallback_material);
                    render_pass.set_bind_group(1, material, &[]);
                }
                if draw.samples_shadow_map {
                    render_pass.set_bind_group(2, &self.shadow.bind_group, &[]);
                }
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }
    }

    fn texture_view<'a>(
        &'a self,
        handle: Option<TextureHandle>,
        fallback: &'a wgpu::TextureView,
    ) -> Result<&'a wgpu::TextureView> {
        match handle {
            Some(h) => self
                .textures
                .get(h.0 as usize)
                .ok_or(SceneError::InvalidState("unknown texture handle")),
            None => Ok(fallback),
        }
    }
}

impl GpuBackend for Renderer {
    fn upload_mesh(&mut self, label: &str, vertices: &[MeshVertex], indices: &[u32]) -> Result<MeshHandle> {
        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        self.meshes.push(GpuMesh { vertex_buffer, index_buffer });
        log::debug!("Uploaded mesh {label}: {} vertices, {} indices", vertices.len(), indices.len());
        Ok(MeshHandle(self.meshes.len() as u32 - 1))
    }

    fn upload_texture(&mut self, label: &str, image: &LoadedImage, srgb: bool) -> Result<TextureHandle> {
        if image.rgba.len() != (image.width * image.height * 4) as usize {
            return Err(SceneError::InvalidState("image data does not match its dimensions"));
        }
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: if srgb { wgpu::TextureFormat::Rgba8UnormSrgb } else { wgpu::TextureFormat::Rgba8Unorm },
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );
        self.textures.push(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        Ok(TextureHandle(self.textures.len() as u32 - 1))
    }

    fn create_material(
        &mut self,
        texture: Option<TextureHandle>,
        normal_map: Option<TextureHandle>,
    ) -> Result<MaterialHandle> {
        let diffuse = self.texture_view(texture, &self.white_view)?;
        let normal = self.texture_view(normal_map, &self.flat_normal_view)?;
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("material_bind_group"),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(diffuse) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&self.sampler) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::TextureView(normal) },
            ],
        });
        self.materials.push(bind_group);
        Ok(MaterialHandle(self.materials.len() as u32 - 1))
    }

    fn release_all(&mut self) {
        log::debug!(
            "Releasing {} meshes, {} textures, {} materials",
            self.meshes.len(),
            self.textures.len(),
            self.materials.len()
        );
        self.materials.clear();
        self.textures.clear();
        self.meshes.clear();
    }
}
