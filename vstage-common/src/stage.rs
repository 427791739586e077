//! CPU reference of the vertex pass-through stage
//!
//! Mirrors `vs` in `passthrough.wgsl`. The position becomes the first three
//! clip-space components and `w` is the `CLIP_W` pipeline constant (0 unless
//! overridden). The texture index is forwarded unchanged.

use glam::Vec4;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::vertex::VertexInput;

/// Value written into the fourth clip-space component.
///
/// `Zero` is the stage's declared behavior. Clip space with `w = 0` is
/// empty, so nothing reaches the rasterizer; hosts that want visible output
/// select `One` through the pipeline-overridable constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipW {
    #[default]
    Zero,
    One,
}

impl ClipW {
    #[inline]
    pub const fn value(self) -> f32 {
        match self {
            ClipW::Zero => 0.0,
            ClipW::One => 1.0,
        }
    }
}

/// Per-invocation output of the stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexOutput {
    /// Builtin position output
    pub clip_position: Vec4,
    /// Flat-qualified texture index (location 1)
    pub tex_index: u32,
}

/// The pass-through stage. Holds no per-vertex state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassThroughStage {
    clip_w: ClipW,
}

impl PassThroughStage {
    pub const fn new(clip_w: ClipW) -> Self {
        Self { clip_w }
    }

    #[inline]
    pub const fn clip_w(&self) -> ClipW {
        self.clip_w
    }

    /// Run one invocation.
    #[inline]
    pub fn invoke(&self, input: &VertexInput) -> VertexOutput {
        VertexOutput {
            clip_position: input.position.extend(self.clip_w.value()),
            tex_index: input.tex_index,
        }
    }

    /// Run one invocation per vertex.
    ///
    /// Invocations execute in parallel with no ordering between them; the
    /// returned outputs are in input order.
    pub fn invoke_batch(&self, inputs: &[VertexInput]) -> Vec<VertexOutput> {
        inputs.par_iter().map(|input| self.invoke(input)).collect()
    }
}

#[cfg(test)]
mod tests;
