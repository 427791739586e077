//! GPU vertex layout of [`PassVertex`]
//!
//! Shader locations:
//! - Location 0: Position (Float32x3)
//! - Location 1: Texture index (Uint32)

use vstage_common::{
    LOC_POSITION, LOC_TEX_INDEX, POSITION_OFFSET, PassVertex, TEX_INDEX_OFFSET, VERTEX_STRIDE,
};

const fn attr_pos() -> wgpu::VertexAttribute {
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: POSITION_OFFSET,
        shader_location: LOC_POSITION,
    }
}

const fn attr_tex_index() -> wgpu::VertexAttribute {
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Uint32,
        offset: TEX_INDEX_OFFSET,
        shader_location: LOC_TEX_INDEX,
    }
}

static ATTRIBUTES: [wgpu::VertexAttribute; 2] = [attr_pos(), attr_tex_index()];

/// Buffer layout for a tightly packed array of [`PassVertex`].
pub fn vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: VERTEX_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}
