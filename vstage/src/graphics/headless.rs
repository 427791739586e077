//! Offscreen renderer driving the stage through the probe pipeline

use wgpu::util::DeviceExt;

use vstage_common::{
    BACKGROUND, ClipW, PassVertex, ProvokingVertex, QuadBatch, TexIndexImage, validate_indices,
};

use super::error::RenderError;
use super::pipeline::{PROBE_FORMAT, PipelineCache, PipelineKey};
use super::readback::read_tex_index_target;
use crate::config::RenderConfig;
use crate::shader::{self, PASSTHROUGH_WGSL};

/// Headless wgpu context rendering into an `R32Uint` texture index target.
///
/// Every draw starts from a target cleared to [`BACKGROUND`] and returns the
/// full readback, so texels not covered by any fragment stay [`BACKGROUND`].
///
/// The provoking vertex of the adapter is measured once at creation by
/// drawing a triangle whose corners carry different indices.
pub struct HeadlessRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_info: wgpu::AdapterInfo,
    shader_module: wgpu::ShaderModule,
    pipelines: PipelineCache,
    target: wgpu::Texture,
    target_view: wgpu::TextureView,
    width: u32,
    height: u32,
    provoking_vertex: ProvokingVertex,
}

/// Corner indices of the calibration triangle
const CALIBRATION_INDICES: [u32; 3] = [1, 2, 3];

impl HeadlessRenderer {
    /// Create the device and target described by `config`.
    pub fn new(config: &RenderConfig) -> Result<Self, RenderError> {
        let RenderConfig { width, height, .. } = *config;
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyTarget { width, height });
        }

        // Catch interface drift before the driver sees the module
        shader::check_passthrough(PASSTHROUGH_WGSL)?;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: config.power_preference.to_wgpu(),
            compatible_surface: None,
            force_fallback_adapter: config.force_fallback_adapter,
        }))?;
        let adapter_info = adapter.get_info();

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("vstage Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
            memory_hints: wgpu::MemoryHints::Performance,
            experimental_features: Default::default(),
            trace: wgpu::Trace::Off,
        }))?;

        let max = device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(RenderError::TargetTooLarge { width, height, max });
        }

        tracing::info!(
            "Headless renderer on {} ({:?}), target {}x{}",
            adapter_info.name,
            adapter_info.backend,
            width,
            height
        );

        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Pass-through Probe Shader"),
            source: wgpu::ShaderSource::Wgsl(shader::probe_source().into()),
        });

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Tex Index Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: PROBE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let mut renderer = Self {
            device,
            queue,
            adapter_info,
            shader_module,
            pipelines: PipelineCache::new(),
            target,
            target_view,
            width,
            height,
            provoking_vertex: ProvokingVertex::default(),
        };
        renderer.provoking_vertex = renderer.measure_provoking_vertex()?;
        tracing::info!("Provoking vertex: {:?}", renderer.provoking_vertex);
        Ok(renderer)
    }

    /// Draw a full-target triangle with distinct corner indices and see which
    /// one reaches the fragments.
    fn measure_provoking_vertex(&mut self) -> Result<ProvokingVertex, RenderError> {
        let [first, second, last] = CALIBRATION_INDICES;
        let triangle = [
            PassVertex::new([-1.0, -1.0, 0.5], first),
            PassVertex::new([3.0, -1.0, 0.5], second),
            PassVertex::new([-1.0, 3.0, 0.5], last),
        ];
        let image = self.draw_indexed(&triangle, &[0, 1, 2], ClipW::One)?;

        match image.distinct_indices().as_slice() {
            [index] if *index == first => Ok(ProvokingVertex::First),
            [index] if *index == last => Ok(ProvokingVertex::Last),
            seen => {
                let fallback = provoking_vertex_for_backend(self.adapter_info.backend);
                tracing::warn!(
                    "Calibration triangle produced {:?}, assuming {:?}",
                    seen,
                    fallback
                );
                Ok(fallback)
            }
        }
    }

    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    /// Target size in pixels as `(width, height)`.
    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Vertex whose flat outputs this adapter forwards to every fragment.
    pub fn provoking_vertex(&self) -> ProvokingVertex {
        self.provoking_vertex
    }

    /// Number of probe pipelines built so far.
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    /// Clear the target and read it back.
    pub fn clear(&mut self) -> Result<TexIndexImage, RenderError> {
        self.render(None)
    }

    /// Draw an indexed triangle list through the stage and read back the
    /// flat texture index of every covered pixel.
    pub fn draw_indexed(
        &mut self,
        vertices: &[PassVertex],
        indices: &[u16],
        clip_w: ClipW,
    ) -> Result<TexIndexImage, RenderError> {
        validate_indices(indices, vertices.len())?;
        if indices.is_empty() {
            return self.render(None);
        }

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Pass Vertex Buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Pass Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        self.render(Some(DrawCall {
            vertex_buffer: &vertex_buffer,
            index_buffer: &index_buffer,
            index_count: indices.len() as u32,
            clip_w,
        }))
    }

    /// Draw every quad of `batch`.
    pub fn draw_quads(
        &mut self,
        batch: &QuadBatch,
        clip_w: ClipW,
    ) -> Result<TexIndexImage, RenderError> {
        tracing::debug!("Drawing {} quads", batch.len());
        self.draw_indexed(batch.vertices(), batch.indices(), clip_w)
    }

    fn render(&mut self, draw: Option<DrawCall<'_>>) -> Result<TexIndexImage, RenderError> {
        let pipeline = match &draw {
            Some(call) => Some(self.pipelines.get_or_create(
                &self.device,
                &self.shader_module,
                PipelineKey::probe(call.clip_w),
            )?),
            None => None,
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Probe Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Probe Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target_view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(BACKGROUND),
                            g: 0.0,
                            b: 0.0,
                            a: 0.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let (Some(pipeline), Some(call)) = (pipeline, &draw) {
                render_pass.set_pipeline(pipeline);
                render_pass.set_vertex_buffer(0, call.vertex_buffer.slice(..));
                render_pass.set_index_buffer(call.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..call.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));

        read_tex_index_target(
            &self.device,
            &self.queue,
            &self.target,
            self.width,
            self.height,
        )
    }
}

/// Documented convention of each backend's native API.
pub(crate) fn provoking_vertex_for_backend(backend: wgpu::Backend) -> ProvokingVertex {
    match backend {
        wgpu::Backend::Gl => ProvokingVertex::Last,
        _ => ProvokingVertex::First,
    }
}

struct DrawCall<'a> {
    vertex_buffer: &'a wgpu::Buffer,
    index_buffer: &'a wgpu::Buffer,
    index_count: u32,
    clip_w: ClipW,
}
