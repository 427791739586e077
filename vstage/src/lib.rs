//! vstage - vertex pass-through stage runtime
//!
//! Ships the WGSL source of the stage, checks its interface against the
//! declared bindings with naga, and provides the wgpu plumbing to drive it:
//! vertex buffer layout, pipeline creation and a headless renderer that reads
//! the forwarded texture index back from an `R32Uint` target.
//!
//! GPU-independent types and the CPU reference live in `vstage-common` and are
//! re-exported here.

pub mod config;
pub mod graphics;
pub mod shader;

pub use vstage_common::*;
