//! wgpu implementation of [`RenderSurface`].
//!
//! Every clear and draw is recorded into its own encoder and submitted
//! immediately, so the surface behaves like an immediate-mode context: a
//! clear followed by draws followed by a pixel read observes them in order.
//! Offscreen targets are `Rgba8Unorm` with a `Depth32Float` attachment.
//! Pipelines are created lazily per target format because the swapchain
//! format (usually sRGB) differs from the offscreen one.

use std::sync::mpsc;

use rustc_hash::FxHashMap;

use super::dynamic_buffer::DynamicBuffer;
use super::render_context::RenderContext;
use super::surface::{
    BufferId, ProgramId, ProgramKind, ProgramSource, RenderSurface, TargetId,
};
use super::texture::{DepthTarget, RenderTarget, DEPTH_FORMAT, OFFSCREEN_FORMAT};
use crate::error::PickError;
use crate::options::PointOptions;
use crate::picking::{point_vertex_buffer_layout, PointVertex};

/// Row pitch of the single-pixel staging copy.
const STAGING_ROW_BYTES: u32 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

/// Per-draw uniforms shared by both point programs.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct PointUniforms {
    viewport: [f32; 2],
    point_size: f32,
    highlight_size: f32,
}

struct GpuProgram {
    label: &'static str,
    kind: ProgramKind,
    module: wgpu::ShaderModule,
    pipelines: FxHashMap<wgpu::TextureFormat, wgpu::RenderPipeline>,
}

/// Where the default target's pixels live.
enum Screen {
    /// Swapchain images plus a depth buffer sized to the window.
    Window {
        depth: DepthTarget,
        frame: Option<(wgpu::SurfaceTexture, wgpu::TextureView)>,
    },
    /// An owned texture standing in for the window.
    Headless(RenderTarget),
}

/// Views and size of whatever target is currently bound.
struct Attachment<'a> {
    color: &'a wgpu::TextureView,
    depth: &'a wgpu::TextureView,
    format: wgpu::TextureFormat,
    size: (u32, u32),
}

/// Render surface backed by a wgpu device.
pub struct GpuSurface {
    context: RenderContext,
    points: PointOptions,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline_layout: wgpu::PipelineLayout,
    staging_buffer: wgpu::Buffer,
    screen: Screen,
    targets: Vec<Option<RenderTarget>>,
    buffers: Vec<Option<DynamicBuffer>>,
    programs: Vec<Option<GpuProgram>>,
    bound: Option<TargetId>,
}

impl GpuSurface {
    /// Wrap a render context. With a window surface the default target is
    /// the swapchain; headless contexts get an owned default texture.
    #[must_use]
    pub fn new(context: RenderContext, points: PointOptions) -> Self {
        let device = &context.device;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Point Uniform Buffer"),
            size: size_of::<PointUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Point Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Point Uniform Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Point Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Picking Staging Buffer"),
            size: u64::from(STAGING_ROW_BYTES),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let (width, height) = (context.width(), context.height());
        let screen = if context.has_surface() {
            Screen::Window {
                depth: DepthTarget::new(device, width, height),
                frame: None,
            }
        } else {
            Screen::Headless(RenderTarget::new(
                device,
                "Headless Screen Texture",
                width,
                height,
                context.format(),
            ))
        };

        Self {
            context,
            points,
            uniform_buffer,
            bind_group,
            pipeline_layout,
            staging_buffer,
            screen,
            targets: Vec::new(),
            buffers: Vec::new(),
            programs: Vec::new(),
            bound: None,
        }
    }

    /// Create a windowless surface of the given size.
    ///
    /// # Errors
    ///
    /// Returns [`PickError::Gpu`] if no adapter or device is available.
    pub async fn headless(
        width: u32,
        height: u32,
        points: PointOptions,
    ) -> Result<Self, PickError> {
        let context =
            RenderContext::headless(width, height, OFFSCREEN_FORMAT).await?;
        Ok(Self::new(context, points))
    }

    /// The render context this surface draws with.
    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Acquire a swapchain image for the default target if none is held.
    fn acquire_frame(&mut self) -> Result<(), PickError> {
        if self.bound.is_some() {
            return Ok(());
        }
        let Screen::Window { frame, .. } = &mut self.screen else {
            return Ok(());
        };
        if frame.is_some() {
            return Ok(());
        }
        let texture = match self.context.get_next_frame() {
            Ok(texture) => texture,
            Err(e) => {
                if matches!(
                    e,
                    wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated
                ) {
                    let (w, h) = (self.context.width(), self.context.height());
                    self.context.resize(w, h);
                }
                return Err(PickError::resource(
                    "swapchain frame",
                    e.to_string(),
                ));
            }
        };
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        *frame = Some((texture, view));
        Ok(())
    }

    fn attachment(&self) -> Result<Attachment<'_>, PickError> {
        match self.bound {
            Some(TargetId(i)) => {
                let target = self
                    .targets
                    .get(i)
                    .and_then(Option::as_ref)
                    .ok_or(PickError::UnknownHandle("target"))?;
                Ok(target_attachment(target))
            }
            None => match &self.screen {
                Screen::Headless(target) => Ok(target_attachment(target)),
                Screen::Window {
                    depth,
                    frame: Some((texture, view)),
                } => Ok(Attachment {
                    color: view,
                    depth: &depth.view,
                    format: texture.texture.format(),
                    size: (self.context.width(), self.context.height()),
                }),
                Screen::Window { frame: None, .. } => Err(PickError::resource(
                    "swapchain frame",
                    "no frame acquired",
                )),
            },
        }
    }

    fn bound_format(&self) -> wgpu::TextureFormat {
        match self.bound {
            Some(TargetId(i)) => self
                .targets
                .get(i)
                .and_then(Option::as_ref)
                .map_or(OFFSCREEN_FORMAT, RenderTarget::format),
            None => self.context.format(),
        }
    }

    fn ensure_pipeline(
        &mut self,
        program: ProgramId,
        format: wgpu::TextureFormat,
    ) -> Result<(), PickError> {
        let device = &self.context.device;
        let layout = &self.pipeline_layout;
        let program = self
            .programs
            .get_mut(program.0)
            .and_then(Option::as_mut)
            .ok_or(PickError::UnknownHandle("program"))?;
        if program.pipelines.contains_key(&format) {
            return Ok(());
        }
        if program.kind == ProgramKind::Picking && format.is_srgb() {
            log::warn!(
                "{} drawn into sRGB target {format:?}; ids will not decode",
                program.label
            );
        }
        let pipeline = create_point_pipeline(
            device,
            layout,
            &program.module,
            program.label,
            format,
        );
        log::debug!("created {} pipeline for {format:?}", program.label);
        let _ = program.pipelines.insert(format, pipeline);
        Ok(())
    }
}

fn target_attachment(target: &RenderTarget) -> Attachment<'_> {
    Attachment {
        color: &target.view,
        depth: &target.depth.view,
        format: target.format(),
        size: (target.width, target.height),
    }
}

fn create_point_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    label: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            buffers: &[point_vertex_buffer_layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(point_depth_stencil()),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

/// Later points win depth ties, matching draw order.
fn point_depth_stencil() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::LessEqual,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

fn color_attachment<'a>(
    view: &'a wgpu::TextureView,
    load: wgpu::LoadOp<wgpu::Color>,
) -> wgpu::RenderPassColorAttachment<'a> {
    wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        ops: wgpu::Operations {
            load,
            store: wgpu::StoreOp::Store,
        },
        depth_slice: None,
    }
}

fn depth_attachment(
    view: &wgpu::TextureView,
    load: wgpu::LoadOp<f32>,
) -> wgpu::RenderPassDepthStencilAttachment<'_> {
    wgpu::RenderPassDepthStencilAttachment {
        view,
        depth_ops: Some(wgpu::Operations {
            load,
            store: wgpu::StoreOp::Store,
        }),
        stencil_ops: None,
    }
}

impl RenderSurface for GpuSurface {
    fn size(&self) -> (u32, u32) {
        (self.context.width(), self.context.height())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.context.resize(width, height);
        let device = &self.context.device;
        match &mut self.screen {
            Screen::Window { depth, frame } => {
                *frame = None;
                *depth = DepthTarget::new(device, width, height);
            }
            Screen::Headless(target) => {
                *target = RenderTarget::new(
                    device,
                    "Headless Screen Texture",
                    width,
                    height,
                    self.context.config.format,
                );
            }
        }
    }

    fn create_target(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<TargetId, PickError> {
        let max = self.context.max_texture_dimension();
        if width == 0 || height == 0 {
            return Err(PickError::resource(
                "offscreen target",
                format!("zero-sized target {width}x{height}"),
            ));
        }
        if width > max || height > max {
            return Err(PickError::resource(
                "offscreen target",
                format!("{width}x{height} exceeds the {max} pixel limit"),
            ));
        }
        let target = RenderTarget::new(
            &self.context.device,
            "Picking Texture",
            width,
            height,
            OFFSCREEN_FORMAT,
        );
        self.targets.push(Some(target));
        Ok(TargetId(self.targets.len() - 1))
    }

    fn destroy_target(&mut self, target: TargetId) {
        if self.bound == Some(target) {
            self.bound = None;
        }
        if let Some(slot) = self.targets.get_mut(target.0) {
            if let Some(target) = slot.take() {
                target.texture.destroy();
                target.depth.texture.destroy();
            }
        }
    }

    fn bind_target(
        &mut self,
        target: Option<TargetId>,
    ) -> Result<(), PickError> {
        if let Some(TargetId(i)) = target {
            if !matches!(self.targets.get(i), Some(Some(_))) {
                return Err(PickError::UnknownHandle("target"));
            }
        }
        self.bound = target;
        Ok(())
    }

    fn bound_target(&self) -> Option<TargetId> {
        self.bound
    }

    fn create_vertex_buffer(
        &mut self,
        label: &str,
        vertices: &[PointVertex],
    ) -> Result<BufferId, PickError> {
        let bytes = size_of_val(vertices) as u64;
        let max = self.context.device.limits().max_buffer_size;
        if bytes > max {
            return Err(PickError::resource(
                "vertex buffer",
                format!("{label}: {bytes} bytes exceed the {max} byte limit"),
            ));
        }
        self.buffers.push(Some(DynamicBuffer::new_with_data(
            &self.context.device,
            label,
            vertices,
        )));
        Ok(BufferId(self.buffers.len() - 1))
    }

    fn write_vertex_buffer(
        &mut self,
        buffer: BufferId,
        vertices: &[PointVertex],
    ) -> Result<(), PickError> {
        let target = self
            .buffers
            .get_mut(buffer.0)
            .and_then(Option::as_mut)
            .ok_or(PickError::UnknownHandle("buffer"))?;
        let _ = target.write(&self.context.device, &self.context.queue, vertices);
        Ok(())
    }

    fn destroy_vertex_buffer(&mut self, buffer: BufferId) {
        if let Some(buffer) = self.buffers.get_mut(buffer.0).and_then(Option::take)
        {
            buffer.buffer().destroy();
        }
    }

    fn compile_program(
        &mut self,
        source: &ProgramSource,
    ) -> Result<ProgramId, PickError> {
        if !source.wgsl.contains("fn vs_main")
            || !source.wgsl.contains("fn fs_main")
        {
            return Err(PickError::resource(
                "shader program",
                format!("{} is missing vs_main/fs_main", source.label),
            ));
        }
        let module = self.context.device.create_shader_module(
            wgpu::ShaderModuleDescriptor {
                label: Some(source.label),
                source: wgpu::ShaderSource::Wgsl(source.wgsl.into()),
            },
        );
        self.programs.push(Some(GpuProgram {
            label: source.label,
            kind: source.kind,
            module,
            pipelines: FxHashMap::default(),
        }));
        Ok(ProgramId(self.programs.len() - 1))
    }

    fn destroy_program(&mut self, program: ProgramId) {
        if let Some(slot) = self.programs.get_mut(program.0) {
            *slot = None;
        }
    }

    fn clear(&mut self, color: [f32; 4]) -> Result<(), PickError> {
        self.acquire_frame()?;
        let target = self.attachment()?;
        let [r, g, b, a] = color.map(f64::from);

        let mut encoder = self.context.create_encoder("Point Clear Encoder");
        {
            let _pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Point Clear Pass"),
                    color_attachments: &[Some(color_attachment(
                        target.color,
                        wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                    ))],
                    depth_stencil_attachment: Some(depth_attachment(
                        target.depth,
                        wgpu::LoadOp::Clear(1.0),
                    )),
                    ..Default::default()
                });
        }
        self.context.submit(encoder);
        Ok(())
    }

    fn draw_points(
        &mut self,
        program: ProgramId,
        buffer: BufferId,
        count: u32,
    ) -> Result<(), PickError> {
        self.acquire_frame()?;
        self.ensure_pipeline(program, self.bound_format())?;

        let target = self.attachment()?;
        let vertices = self
            .buffers
            .get(buffer.0)
            .and_then(Option::as_ref)
            .ok_or(PickError::UnknownHandle("buffer"))?;
        let pipeline = self
            .programs
            .get(program.0)
            .and_then(Option::as_ref)
            .and_then(|p| p.pipelines.get(&target.format))
            .ok_or(PickError::UnknownHandle("program"))?;
        let count = count.min(vertices.len() as u32);
        if count == 0 {
            return Ok(());
        }

        let (width, height) = target.size;
        let uniforms = PointUniforms {
            viewport: [width as f32, height as f32],
            point_size: self.points.size,
            highlight_size: self.points.highlight_size,
        };
        self.context.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&uniforms),
        );

        let mut encoder = self.context.create_encoder("Point Draw Encoder");
        {
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Point Draw Pass"),
                    color_attachments: &[Some(color_attachment(
                        target.color,
                        wgpu::LoadOp::Load,
                    ))],
                    depth_stencil_attachment: Some(depth_attachment(
                        target.depth,
                        wgpu::LoadOp::Load,
                    )),
                    ..Default::default()
                });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.set_vertex_buffer(0, vertices.buffer().slice(..));
            pass.draw(0..6, 0..count);
        }
        self.context.submit(encoder);
        Ok(())
    }

    fn read_pixel(&mut self, x: u32, y: u32) -> Result<[u8; 4], PickError> {
        let texture = match self.bound {
            Some(TargetId(i)) => self
                .targets
                .get(i)
                .and_then(Option::as_ref)
                .ok_or(PickError::UnknownHandle("target"))?,
            None => match &self.screen {
                Screen::Headless(target) => target,
                Screen::Window { .. } => {
                    return Err(PickError::Readback(
                        "the swapchain cannot be read back".to_owned(),
                    ))
                }
            },
        };
        if x >= texture.width || y >= texture.height {
            return Ok([0; 4]);
        }
        // Textures are top-left origin.
        let texture_y = texture.height - 1 - y;
        let format = texture.format();

        let mut encoder = self.context.create_encoder("Picking Readback Encoder");
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x,
                    y: texture_y,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.staging_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(STAGING_ROW_BYTES),
                    rows_per_image: Some(1),
                },
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        self.context.submit(encoder);

        let (sender, receiver) = mpsc::channel();
        let slice = self.staging_buffer.slice(..4);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let _ = self.context
            .device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .map_err(|e| PickError::Readback(e.to_string()))?;
        receiver
            .recv()
            .map_err(|_| PickError::Readback("map callback dropped".to_owned()))?
            .map_err(|e| PickError::Readback(e.to_string()))?;

        let data = slice.get_mapped_range();
        let mut pixel = [data[0], data[1], data[2], data[3]];
        drop(data);
        self.staging_buffer.unmap();

        if matches!(
            format,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        ) {
            pixel.swap(0, 2);
        }
        Ok(pixel)
    }

    fn finish_frame(&mut self) {
        if let Screen::Window { frame, .. } = &mut self.screen {
            if let Some((texture, view)) = frame.take() {
                drop(view);
                texture.present();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::PickingOptions;
    use crate::picking::PickingRenderer;
    use crate::scene::{Dataset, PointRecord};

    /// `None` on machines without a usable adapter.
    fn headless(width: u32, height: u32) -> Option<GpuSurface> {
        match pollster::block_on(GpuSurface::headless(
            width,
            height,
            PointOptions::default(),
        )) {
            Ok(surface) => Some(surface),
            Err(e) => {
                eprintln!("no GPU available, skipping: {e}");
                None
            }
        }
    }

    fn record(id: u32, x: f32, y: f32, color: [u8; 3], label: &str) -> PointRecord {
        PointRecord {
            id,
            x,
            y,
            color,
            label: label.to_owned(),
        }
    }

    #[test]
    fn readback_decodes_ids_in_bottom_left_pixel_space() {
        let Some(surface) = headless(200, 100) else {
            return;
        };
        let dataset = Dataset::from_records(vec![
            record(5, 0.2, 0.3, [255, 0, 0], "red"),
            record(6, -0.5, -0.5, [0, 255, 0], "green"),
        ])
        .unwrap();
        let mut renderer = PickingRenderer::initialize(
            surface,
            &dataset,
            &PickingOptions::default(),
        )
        .unwrap();

        assert_eq!(renderer.query_at(120, 65).unwrap(), 5);
        assert_eq!(renderer.query_at(50, 25).unwrap(), 6);
        // The same column mirrored top-to-bottom is background.
        assert_eq!(renderer.query_at(120, 34).unwrap(), 0);
        assert_eq!(renderer.query_at(199, 99).unwrap(), 0);
        assert_eq!(renderer.query_at(200, 50).unwrap(), 0);
        assert_eq!(renderer.surface().bound_target(), None);
    }

    #[test]
    fn headless_screen_reads_back_display_colors() {
        let Some(surface) = headless(200, 100) else {
            return;
        };
        let dataset =
            Dataset::from_records(vec![record(5, 0.2, 0.3, [255, 0, 0], "red")])
                .unwrap();
        let mut renderer = PickingRenderer::initialize(
            surface,
            &dataset,
            &PickingOptions::default(),
        )
        .unwrap();

        renderer.render_screen_pass(None).unwrap();
        let surface = renderer.surface_mut();
        assert_eq!(surface.read_pixel(120, 65).unwrap(), [255, 0, 0, 255]);
        assert_eq!(surface.read_pixel(0, 0).unwrap(), [0, 0, 0, 255]);
    }
}
