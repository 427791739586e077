use thiserror::Error;

use vstage_common::AssemblyError;

use crate::shader::ShaderError;

/// Errors raised while setting up or driving the headless renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("No suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("Failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("Render target must be at least 1x1, got {width}x{height}")]
    EmptyTarget { width: u32, height: u32 },

    #[error("Render target {width}x{height} exceeds the device limit of {max} texels per side")]
    TargetTooLarge { width: u32, height: u32, max: u32 },

    #[error("Stage shader rejected: {0}")]
    Shader(#[from] ShaderError),

    #[error("Pipeline creation failed: {0}")]
    Pipeline(String),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error("Device poll failed: {0}")]
    Poll(#[from] wgpu::PollError),

    #[error("Failed to map readback buffer: {0}")]
    Map(#[from] wgpu::BufferAsyncError),

    #[error("Readback channel closed before the buffer was mapped")]
    ReadbackChannelClosed,

    #[error("Readback returned {found} texels, expected {expected}")]
    ReadbackSize { expected: usize, found: usize },
}
