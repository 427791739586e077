//! Vertex record layout for the pass-through stage
//!
//! The GPU vertex buffer is an array of [`PassVertex`] records:
//!
//! | Field       | Format    | Offset | Shader location |
//! |-------------|-----------|--------|-----------------|
//! | `position`  | Float32x3 | 0      | 0               |
//! | `tex_index` | Uint32    | 12     | 1               |
//!
//! The forwarded texture index leaves the stage at location 1 as well.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

// ============================================================================
// Attribute locations and layout constants
// ============================================================================

/// Shader location of the `vert_pos` input (Float32x3)
pub const LOC_POSITION: u32 = 0;
/// Shader location of the `tex_index` input (Uint32)
pub const LOC_TEX_INDEX: u32 = 1;
/// Shader location of the flat `tex_index_out` output (Uint32)
pub const LOC_TEX_INDEX_OUT: u32 = 1;

/// Byte offset of the position within a vertex record
pub const POSITION_OFFSET: u64 = 0;
/// Byte offset of the texture index within a vertex record
pub const TEX_INDEX_OFFSET: u64 = 12;
/// Size of one vertex record in bytes (3 x f32 + u32)
pub const VERTEX_STRIDE: u64 = 16;

/// One vertex as stored in the GPU vertex buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PassVertex {
    /// Object-space position
    pub position: [f32; 3],
    /// Texture array / atlas selector, forwarded unchanged
    pub tex_index: u32,
}

impl PassVertex {
    #[inline]
    pub const fn new(position: [f32; 3], tex_index: u32) -> Self {
        Self {
            position,
            tex_index,
        }
    }
}

/// Per-invocation input of the stage, as seen by the CPU reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexInput {
    pub position: Vec3,
    pub tex_index: u32,
}

impl VertexInput {
    #[inline]
    pub const fn new(position: Vec3, tex_index: u32) -> Self {
        Self {
            position,
            tex_index,
        }
    }
}

impl From<PassVertex> for VertexInput {
    fn from(v: PassVertex) -> Self {
        Self::new(Vec3::from_array(v.position), v.tex_index)
    }
}

impl From<VertexInput> for PassVertex {
    fn from(v: VertexInput) -> Self {
        Self::new(v.position.to_array(), v.tex_index)
    }
}
