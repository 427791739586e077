//! Shared types and utilities for the vstage vertex pass-through stage
//!
//! This crate is GPU-independent and is used by:
//! - `vstage` (wgpu runtime, shader reflection, CLI)
//! - tests that need a reference answer without a GPU adapter
//!
//! # Modules
//!
//! - [`vertex`] - Vertex record layout and attribute locations
//! - [`stage`] - CPU reference of the pass-through stage
//! - [`assembly`] - Primitive assembly and flat-forwarding rasterization
//! - [`image`] - Texture index images (render readback / reference output)
//! - [`geometry`] - Quads and quad batches

pub mod assembly;
pub mod geometry;
pub mod image;
pub mod stage;
pub mod vertex;

pub use assembly::{
    AssemblyError, ProvokingVertex, Triangle, assemble_triangles, rasterize, reference_image,
    validate_indices,
};
pub use geometry::{
    BatchError, DEFAULT_MAX_QUADS, MAX_INDEXED_QUADS, QUAD_INDICES, Quad, Quad2d, QuadBatch,
};
pub use image::{BACKGROUND, TexIndexImage};
pub use stage::{ClipW, PassThroughStage, VertexOutput};
pub use vertex::{
    LOC_POSITION, LOC_TEX_INDEX, LOC_TEX_INDEX_OUT, POSITION_OFFSET, PassVertex,
    TEX_INDEX_OFFSET, VERTEX_STRIDE, VertexInput,
};
