//! Probe pipeline creation and caching
//!
//! The probe pipeline runs the pass-through stage and writes the flat
//! texture index of every fragment into an integer colour target.

use hashbrown::HashMap;

use vstage_common::ClipW;

use super::error::RenderError;
use super::vertex::vertex_buffer_layout;
use crate::shader::{CLIP_W_CONSTANT, PROBE_FRAGMENT_ENTRY, VERTEX_ENTRY};

/// Colour format of the probe target (one texture index per texel)
pub const PROBE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Uint;

/// Everything a probe pipeline is specialized on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub clip_w: ClipW,
    pub target_format: wgpu::TextureFormat,
}

impl PipelineKey {
    pub const fn probe(clip_w: ClipW) -> Self {
        Self {
            clip_w,
            target_format: PROBE_FORMAT,
        }
    }
}

/// Create the probe pipeline for `key` from a module holding both entry points.
///
/// Validation errors are captured in an error scope and returned instead of
/// reaching the device's uncaptured error handler.
pub fn create_probe_pipeline(
    device: &wgpu::Device,
    module: &wgpu::ShaderModule,
    key: PipelineKey,
) -> Result<wgpu::RenderPipeline, RenderError> {
    let constants = [(CLIP_W_CONSTANT, f64::from(key.clip_w.value()))];

    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Probe Pipeline Layout"),
        bind_group_layouts: &[],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("Probe Pipeline W={:?}", key.clip_w)),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some(VERTEX_ENTRY),
            buffers: &[vertex_buffer_layout()],
            compilation_options: wgpu::PipelineCompilationOptions {
                constants: &constants,
                ..Default::default()
            },
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(PROBE_FRAGMENT_ENTRY),
            targets: &[Some(wgpu::ColorTargetState {
                format: key.target_format,
                blend: None, // Integer targets cannot blend
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        return Err(RenderError::Pipeline(err.to_string()));
    }

    tracing::debug!("Created probe pipeline for {:?}", key);
    Ok(pipeline)
}

/// Lazily built probe pipelines, one per [`PipelineKey`].
#[derive(Default)]
pub struct PipelineCache {
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl PipelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the pipeline for `key`, creating it on first use.
    pub fn get_or_create(
        &mut self,
        device: &wgpu::Device,
        module: &wgpu::ShaderModule,
        key: PipelineKey,
    ) -> Result<&wgpu::RenderPipeline, RenderError> {
        if !self.pipelines.contains_key(&key) {
            let pipeline = create_probe_pipeline(device, module, key)?;
            self.pipelines.insert(key, pipeline);
        }
        Ok(&self.pipelines[&key])
    }

    /// Number of pipelines built so far.
    pub(crate) fn len(&self) -> usize {
        self.pipelines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_key_uses_integer_target() {
        let key = PipelineKey::probe(ClipW::Zero);
        assert_eq!(key.target_format, wgpu::TextureFormat::R32Uint);
        assert_ne!(key, PipelineKey::probe(ClipW::One));
    }

    #[test]
    fn test_cache_starts_empty() {
        assert_eq!(PipelineCache::new().len(), 0);
    }
}
