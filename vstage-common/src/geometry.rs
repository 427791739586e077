//! Quads and quad batches
//!
//! A quad is four corners in winding order, drawn as two triangles through
//! [`QUAD_INDICES`]. [`QuadBatch`] accumulates quads into a vertex/index
//! buffer pair ready for upload.

use glam::{Vec2, Vec3};
use thiserror::Error;

use crate::vertex::PassVertex;

/// Index pattern for one quad: triangles (0, 1, 2) and (2, 3, 0)
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

/// Default batch capacity in quads
pub const DEFAULT_MAX_QUADS: usize = 1024;

/// Largest capacity addressable with u16 indices (4 vertices per quad)
pub const MAX_INDEXED_QUADS: usize = (u16::MAX as usize + 1) / 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub points: [Vec3; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad2d {
    pub points: [Vec2; 4],
}

impl Quad {
    /// Axis-aligned rectangle in the `z` plane, corners counter-clockwise
    /// starting at `min`.
    pub fn rect(min: Vec2, max: Vec2, z: f32) -> Self {
        Self {
            points: [
                Vec3::new(min.x, min.y, z),
                Vec3::new(max.x, min.y, z),
                Vec3::new(max.x, max.y, z),
                Vec3::new(min.x, max.y, z),
            ],
        }
    }
}

impl From<Quad2d> for Quad {
    fn from(quad: Quad2d) -> Quad {
        Quad {
            points: quad.points.map(|p| p.extend(0.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("Quad batch is full ({0} quads)")]
    Full(usize),

    #[error("Requested capacity {requested} exceeds u16 index limit of {limit} quads")]
    CapacityTooLarge { requested: usize, limit: usize },
}

/// CPU-side accumulation of quads for a single indexed draw.
#[derive(Debug, Clone)]
pub struct QuadBatch {
    max_quads: usize,
    vertices: Vec<PassVertex>,
    indices: Vec<u16>,
}

impl Default for QuadBatch {
    fn default() -> Self {
        Self {
            max_quads: DEFAULT_MAX_QUADS,
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }
}

impl QuadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_quads: usize) -> Result<Self, BatchError> {
        if max_quads > MAX_INDEXED_QUADS {
            return Err(BatchError::CapacityTooLarge {
                requested: max_quads,
                limit: MAX_INDEXED_QUADS,
            });
        }
        Ok(Self {
            max_quads,
            vertices: Vec::with_capacity(max_quads * 4),
            indices: Vec::with_capacity(max_quads * QUAD_INDICES.len()),
        })
    }

    /// Add a quad whose four corners share one texture index.
    pub fn push(&mut self, quad: impl Into<Quad>, tex_index: u32) -> Result<(), BatchError> {
        self.push_corners(quad, [tex_index; 4])
    }

    /// Add a quad with a texture index per corner.
    ///
    /// With flat forwarding only the provoking corner of each triangle is
    /// observed: corner 0 and corner 2 under the first-vertex convention.
    pub fn push_corners(
        &mut self,
        quad: impl Into<Quad>,
        tex_indices: [u32; 4],
    ) -> Result<(), BatchError> {
        if self.len() >= self.max_quads {
            return Err(BatchError::Full(self.max_quads));
        }

        let quad = quad.into();
        // Bounded by MAX_INDEXED_QUADS, so the base index fits in u16
        let base = self.vertices.len() as u16;
        self.vertices.extend(
            quad.points
                .iter()
                .zip(tex_indices)
                .map(|(p, t)| PassVertex::new(p.to_array(), t)),
        );
        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
        Ok(())
    }

    /// Number of quads in the batch
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len() / 4
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_quads
    }

    #[inline]
    pub fn vertices(&self) -> &[PassVertex] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }
}
