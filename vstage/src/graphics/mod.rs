//! wgpu runtime for the pass-through stage
//!
//! - [`vertex`] - GPU vertex buffer layout
//! - [`pipeline`] - Probe pipeline creation and caching
//! - [`headless`] - Offscreen renderer with texture index readback

mod error;
mod headless;
mod pipeline;
mod readback;
mod vertex;

pub use error::RenderError;
pub use headless::HeadlessRenderer;
pub use pipeline::{PROBE_FORMAT, PipelineCache, PipelineKey, create_probe_pipeline};
pub use vertex::vertex_buffer_layout;
