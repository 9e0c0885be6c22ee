use std::collections::HashMap;

use anyhow::Result;

use crate::device::{Gpu, GpuFrame};
use crate::texture::{TextureManager, ATLAS_SLOT, GLYPH_SLOT, MAX_TEXTURE_SLOTS};
use crate::text::Font;

use super::canvas::{FramePlan, PassTarget, TargetDesc};
use super::{Canvas, FramebufferId, RenderCtx, Vertex};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// First texture binding; bindings 0 and 1 are the samplers.
const FIRST_TEXTURE_BINDING: u32 = 2;

/// Counters for one submitted frame.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub passes: u32,
    pub vertices: u32,
    /// Passes dropped because their framebuffer has no valid GPU target.
    pub skipped: u32,
}

struct GpuTarget {
    slot: u32,
    width: u32,
    height: u32,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
}

/// Owns every GPU resource of the primitive pipeline.
///
/// The CPU side ([`Canvas`]) records passes; `draw` mirrors the atlases and
/// framebuffer attachments, uploads the frame's vertices with one buffer
/// write and issues one draw per pass.
pub struct Renderer {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    nearest_sampler: wgpu::Sampler,
    linear_sampler: wgpu::Sampler,
    fallback_view: wgpu::TextureView,

    vertex_buffer: Option<wgpu::Buffer>,
    vertex_capacity: usize,
    max_vertices: usize,

    glyph_view: Option<wgpu::TextureView>,
    glyph_generation: u64,

    atlas_texture: Option<wgpu::Texture>,
    atlas_view: Option<wgpu::TextureView>,
    atlas_generation: u64,

    main_depth: Option<(wgpu::TextureView, (u32, u32))>,
    targets: HashMap<FramebufferId, GpuTarget>,

    // Keyed by the slot hidden from the pass (its own render target).
    bind_groups: HashMap<Option<u32>, wgpu::BindGroup>,
    views_generation: u64,
    bind_group_generation: u64,
}

impl Renderer {
    /// Compiles the primitive shader and builds the pipeline for `gpu`'s
    /// surface format.
    pub fn new(gpu: &Gpu<'_>) -> Result<Self> {
        let ctx = RenderCtx::new(gpu);
        let device = ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("plantain primitive shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/primitive.wgsl").into()),
        });
        let info = pollster::block_on(shader.get_compilation_info());
        let errors: Vec<String> = info
            .messages
            .iter()
            .filter(|m| matches!(m.message_type, wgpu::CompilationMessageType::Error))
            .map(|m| m.message.clone())
            .collect();
        if !errors.is_empty() {
            anyhow::bail!("primitive shader failed to compile: {}", errors.join("; "));
        }

        let bind_group_layout = create_bind_group_layout(device);
        let pipeline = create_pipeline(&ctx, &shader, &bind_group_layout);

        let sampler = |label, filter| {
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some(label),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: filter,
                min_filter: filter,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            })
        };
        let nearest_sampler = sampler("plantain nearest sampler", wgpu::FilterMode::Nearest);
        let linear_sampler = sampler("plantain linear sampler", wgpu::FilterMode::Linear);

        let fallback = create_fallback_texture(&ctx);
        let fallback_view = fallback.create_view(&wgpu::TextureViewDescriptor::default());

        log::info!(
            "renderer ready ({:?}, up to {} vertices per frame)",
            ctx.surface_format,
            ctx.max_vertices()
        );

        Ok(Self {
            pipeline,
            bind_group_layout,
            nearest_sampler,
            linear_sampler,
            fallback_view,
            vertex_buffer: None,
            vertex_capacity: 0,
            max_vertices: ctx.max_vertices(),
            glyph_view: None,
            glyph_generation: u64::MAX,
            atlas_texture: None,
            atlas_view: None,
            atlas_generation: u64::MAX,
            main_depth: None,
            targets: HashMap::new(),
            bind_groups: HashMap::new(),
            views_generation: 0,
            bind_group_generation: u64::MAX,
        })
    }

    /// Vertex count the device's largest buffer can hold. Canvases drawn by
    /// this renderer should be limited to it with [`Canvas::set_vertex_limit`].
    #[inline]
    pub fn max_vertices(&self) -> usize {
        self.max_vertices
    }

    /// Renders everything `canvas` recorded since its last `begin` into
    /// `frame`.
    pub fn draw(&mut self, gpu: &Gpu<'_>, canvas: &mut Canvas, frame: &mut GpuFrame) -> DrawStats {
        let ctx = RenderCtx::new(gpu);
        let plan = canvas.finish_frame();
        if plan.vertices.len() > self.max_vertices {
            log::error!(
                "frame has {} vertices, device buffers hold {}; skipping frame",
                plan.vertices.len(),
                self.max_vertices
            );
            return DrawStats::default();
        }

        self.sync_glyphs(&ctx, plan.font, plan.font_generation);
        self.sync_atlas(&ctx, plan.textures);
        self.sync_targets(&ctx, &plan.framebuffers);
        self.ensure_main_depth(&ctx, frame.size());
        self.ensure_vertex_capacity(&ctx, plan.vertices.len());
        self.ensure_bind_groups(&ctx, &plan);

        let Some(vertex_buffer) = self.vertex_buffer.as_ref() else {
            return DrawStats::default();
        };
        if !plan.vertices.is_empty() {
            ctx.queue
                .write_buffer(vertex_buffer, 0, bytemuck::cast_slice(plan.vertices));
        }

        let mut stats = DrawStats::default();
        for pass in plan.passes {
            let (color_view, depth_view, key) = match pass.target {
                PassTarget::Main => {
                    let Some((depth, _)) = self.main_depth.as_ref() else {
                        stats.skipped += 1;
                        continue;
                    };
                    (&frame.view, depth, None)
                }
                PassTarget::Framebuffer(id) => {
                    let Some(t) = self.targets.get(&id) else {
                        stats.skipped += 1;
                        continue;
                    };
                    (&t.color_view, &t.depth_view, Some(t.slot))
                }
            };
            let Some(bind_group) = self.bind_groups.get(&key) else {
                stats.skipped += 1;
                continue;
            };

            let load = match pass.clear {
                Some(c) => wgpu::LoadOp::Clear(c.to_wgpu()),
                None => wgpu::LoadOp::Load,
            };

            let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("plantain primitive pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0),
                        store: wgpu::StoreOp::Discard,
                    }),
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, bind_group, &[]);
            rpass.set_vertex_buffer(0, vertex_buffer.slice(..));
            rpass.draw(pass.vertices.clone(), 0..1);

            stats.passes += 1;
            stats.vertices += pass.vertex_count();
        }
        stats
    }

    // ── texture mirrors ───────────────────────────────────────────────────

    fn sync_glyphs(&mut self, ctx: &RenderCtx<'_>, font: Option<&Font>, generation: u64) {
        if generation == self.glyph_generation {
            return;
        }
        self.glyph_generation = generation;
        self.views_generation += 1;

        let Some(font) = font else {
            self.glyph_view = None;
            return;
        };
        let atlas = font.atlas();
        let texture = upload_texture(
            ctx,
            "plantain glyph atlas",
            wgpu::TextureFormat::R8Unorm,
            (atlas.width(), atlas.height()),
            atlas.pixels(),
            1,
        );
        self.glyph_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        log::debug!("glyph atlas uploaded ({}x{})", atlas.width(), atlas.height());
    }

    fn sync_atlas(&mut self, ctx: &RenderCtx<'_>, textures: &TextureManager) {
        if textures.generation() == self.atlas_generation && self.atlas_texture.is_some() {
            return;
        }
        self.atlas_generation = textures.generation();

        let image = textures.atlas().image();
        let size = image.dimensions();
        let reusable = self
            .atlas_texture
            .as_ref()
            .is_some_and(|t| (t.width(), t.height()) == size);

        if reusable {
            if let Some(texture) = self.atlas_texture.as_ref() {
                write_texture(ctx, texture, size, image.as_raw(), 4);
                return;
            }
        }

        let texture = upload_texture(
            ctx,
            "plantain texture atlas",
            wgpu::TextureFormat::Rgba8Unorm,
            size,
            image.as_raw(),
            4,
        );
        self.atlas_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.atlas_texture = Some(texture);
        self.views_generation += 1;
        log::debug!("texture atlas created at {}x{}", size.0, size.1);
    }

    // ── render targets ────────────────────────────────────────────────────

    fn sync_targets(&mut self, ctx: &RenderCtx<'_>, live: &[TargetDesc]) {
        let before = self.targets.len();
        self.targets.retain(|id, _| live.iter().any(|d| d.id == *id));
        if self.targets.len() != before {
            self.views_generation += 1;
        }

        let max = ctx.max_texture_dimension();
        for desc in live {
            let current = self.targets.get(&desc.id);
            if current.is_some_and(|t| (t.slot, t.width, t.height) == (desc.slot, desc.width, desc.height)) {
                continue;
            }
            self.views_generation += 1;

            if desc.width > max || desc.height > max {
                log::error!(
                    "framebuffer {} ({}x{}) exceeds the device limit of {max}; its passes are skipped",
                    desc.id,
                    desc.width,
                    desc.height
                );
                self.targets.remove(&desc.id);
                continue;
            }

            let color = create_attachment(
                ctx,
                "plantain framebuffer color",
                ctx.surface_format,
                (desc.width, desc.height),
                wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            );
            let depth = create_attachment(
                ctx,
                "plantain framebuffer depth",
                DEPTH_FORMAT,
                (desc.width, desc.height),
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            );
            log::debug!("allocated framebuffer {} at {}x{}", desc.id, desc.width, desc.height);

            self.targets.insert(
                desc.id,
                GpuTarget {
                    slot: desc.slot,
                    width: desc.width,
                    height: desc.height,
                    color_view: color.create_view(&wgpu::TextureViewDescriptor::default()),
                    depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
                },
            );
        }
    }

    fn ensure_main_depth(&mut self, ctx: &RenderCtx<'_>, size: (u32, u32)) {
        if self.main_depth.as_ref().is_some_and(|(_, s)| *s == size) {
            return;
        }
        let depth = create_attachment(
            ctx,
            "plantain surface depth",
            DEPTH_FORMAT,
            size,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        self.main_depth = Some((depth.create_view(&wgpu::TextureViewDescriptor::default()), size));
    }

    // ── buffers & bindings ────────────────────────────────────────────────

    fn ensure_vertex_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.vertex_capacity && self.vertex_buffer.is_some() {
            return;
        }

        let new_cap = required.next_power_of_two().max(64).min(self.max_vertices);
        self.vertex_buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("plantain vertex buffer"),
            size: (new_cap * std::mem::size_of::<Vertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        log::debug!("vertex buffer grown to {new_cap} vertices");
        self.vertex_capacity = new_cap;
    }

    fn ensure_bind_groups(&mut self, ctx: &RenderCtx<'_>, plan: &FramePlan<'_>) {
        if self.bind_group_generation != self.views_generation {
            self.bind_groups.clear();
            self.bind_group_generation = self.views_generation;
        }

        for pass in plan.passes {
            let key = match pass.target {
                PassTarget::Main => None,
                PassTarget::Framebuffer(id) => match self.targets.get(&id) {
                    Some(t) => Some(t.slot),
                    None => continue,
                },
            };
            if self.bind_groups.contains_key(&key) {
                continue;
            }
            let bind_group = self.create_bind_group(ctx, key);
            self.bind_groups.insert(key, bind_group);
        }
    }

    /// Binds every slot's current view; `hidden` (the pass's own target)
    /// gets the fallback texture instead.
    fn create_bind_group(&self, ctx: &RenderCtx<'_>, hidden: Option<u32>) -> wgpu::BindGroup {
        let views: Vec<&wgpu::TextureView> = (0..MAX_TEXTURE_SLOTS)
            .map(|slot| {
                if Some(slot) == hidden {
                    return &self.fallback_view;
                }
                let view = match slot {
                    GLYPH_SLOT => self.glyph_view.as_ref(),
                    ATLAS_SLOT => self.atlas_view.as_ref(),
                    _ => self
                        .targets
                        .values()
                        .find(|t| t.slot == slot)
                        .map(|t| &t.color_view),
                };
                view.unwrap_or(&self.fallback_view)
            })
            .collect();

        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Sampler(&self.nearest_sampler),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&self.linear_sampler),
            },
        ];
        entries.extend(views.into_iter().enumerate().map(|(i, view)| wgpu::BindGroupEntry {
            binding: FIRST_TEXTURE_BINDING + i as u32,
            resource: wgpu::BindingResource::TextureView(view),
        }));

        ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("plantain primitive bind group"),
            layout: &self.bind_group_layout,
            entries: &entries,
        })
    }
}

fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let sampler = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    };

    let mut entries = vec![sampler(0), sampler(1)];
    entries.extend((0..MAX_TEXTURE_SLOTS).map(|slot| wgpu::BindGroupLayoutEntry {
        binding: FIRST_TEXTURE_BINDING + slot,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }));

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("plantain primitive bgl"),
        entries: &entries,
    })
}

fn create_pipeline(
    ctx: &RenderCtx<'_>,
    shader: &wgpu::ShaderModule,
    bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("plantain primitive pipeline layout"),
        bind_group_layouts: &[bind_group_layout],
        immediate_size: 0,
    });

    ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("plantain primitive pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // Polygons of either winding are drawn.
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Always,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

fn create_attachment(
    ctx: &RenderCtx<'_>,
    label: &str,
    format: wgpu::TextureFormat,
    (width, height): (u32, u32),
    usage: wgpu::TextureUsages,
) -> wgpu::Texture {
    ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    })
}

/// Creates a sampled texture and fills it with `pixels`.
fn upload_texture(
    ctx: &RenderCtx<'_>,
    label: &str,
    format: wgpu::TextureFormat,
    size: (u32, u32),
    pixels: &[u8],
    bytes_per_texel: u32,
) -> wgpu::Texture {
    let texture = create_attachment(
        ctx,
        label,
        format,
        size,
        wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
    );
    write_texture(ctx, &texture, size, pixels, bytes_per_texel);
    texture
}

fn write_texture(
    ctx: &RenderCtx<'_>,
    texture: &wgpu::Texture,
    (width, height): (u32, u32),
    pixels: &[u8],
    bytes_per_texel: u32,
) {
    if width == 0 || height == 0 {
        return;
    }
    ctx.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * bytes_per_texel),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

/// 1×1 white texture bound to every empty slot.
fn create_fallback_texture(ctx: &RenderCtx<'_>) -> wgpu::Texture {
    upload_texture(
        ctx,
        "plantain fallback texture",
        wgpu::TextureFormat::Rgba8Unorm,
        (1, 1),
        &[255; 4],
        4,
    )
}
