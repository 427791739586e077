//! Primitive assembly and flat-forwarding reference rasterizer
//!
//! Groups stage outputs into triangles and resolves flat-qualified outputs
//! through the provoking vertex. [`rasterize`] is a small software rasterizer
//! used to predict what the GPU probe pass should produce.
//!
//! Clipping is simplified: a triangle with any vertex at `w <= 0` is rejected
//! as a whole. For the stage's declared `w = 0` every triangle is degenerate,
//! so this matches the hardware result exactly.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::image::TexIndexImage;
use crate::stage::{PassThroughStage, VertexOutput};
use crate::vertex::{PassVertex, VertexInput};

/// Vertex of a primitive whose flat outputs reach every fragment.
///
/// Host-API defined. Vulkan, Metal and D3D12 use the first vertex; OpenGL
/// uses the last unless told otherwise. The headless renderer measures it
/// for its adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvokingVertex {
    #[default]
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("Index count {0} is not a multiple of 3")]
    IncompleteTriangle(usize),

    #[error("Index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}

/// An assembled triangle (triangle-list topology).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [VertexOutput; 3],
}

impl Triangle {
    /// Flat texture index seen by every fragment of this triangle.
    #[inline]
    pub fn flat_tex_index(&self, provoking: ProvokingVertex) -> u32 {
        match provoking {
            ProvokingVertex::First => self.vertices[0].tex_index,
            ProvokingVertex::Last => self.vertices[2].tex_index,
        }
    }

    /// True if the clip volume of at least one vertex is empty.
    pub fn is_rejected(&self) -> bool {
        self.vertices
            .iter()
            .any(|v| !v.clip_position.is_finite() || v.clip_position.w <= 0.0)
    }
}

/// Check a triangle-list index buffer against `vertex_count` vertices.
pub fn validate_indices<I>(indices: &[I], vertex_count: usize) -> Result<(), AssemblyError>
where
    I: Copy + Into<u32>,
{
    if indices.len() % 3 != 0 {
        return Err(AssemblyError::IncompleteTriangle(indices.len()));
    }
    match indices
        .iter()
        .map(|&i| i.into())
        .find(|&i| i as usize >= vertex_count)
    {
        Some(index) => Err(AssemblyError::IndexOutOfRange {
            index,
            vertex_count,
        }),
        None => Ok(()),
    }
}

/// Build triangles from stage outputs and a triangle-list index buffer.
pub fn assemble_triangles<I>(
    outputs: &[VertexOutput],
    indices: &[I],
) -> Result<Vec<Triangle>, AssemblyError>
where
    I: Copy + Into<u32>,
{
    validate_indices(indices, outputs.len())?;

    let fetch = |i: I| -> Result<VertexOutput, AssemblyError> {
        let index: u32 = i.into();
        outputs
            .get(index as usize)
            .copied()
            .ok_or(AssemblyError::IndexOutOfRange {
                index,
                vertex_count: outputs.len(),
            })
    };

    indices
        .chunks_exact(3)
        .map(|tri| {
            Ok(Triangle {
                vertices: [fetch(tri[0])?, fetch(tri[1])?, fetch(tri[2])?],
            })
        })
        .collect()
}

/// Signed doubled area of `(a, b, p)`.
#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Top or left edge of a triangle with positive [`edge`] area (clockwise on
/// screen, y down).
#[inline]
fn is_top_left(a: Vec2, b: Vec2) -> bool {
    (a.y == b.y && b.x > a.x) || b.y < a.y
}

/// Inside test for one edge with the top-left tie-break: a sample exactly on
/// the edge belongs to the triangle only if the edge is top or left.
#[inline]
fn covers(weight: f32, top_left: bool) -> bool {
    weight > 0.0 || (weight == 0.0 && top_left)
}

/// Rasterize triangles into a `width` x `height` texture index image.
///
/// Uses the wgpu viewport convention (NDC y up, framebuffer y down) and
/// samples pixel centers. Samples on an edge follow the top-left fill rule,
/// so a pixel on an edge shared by two triangles is written once. No face
/// culling and no depth test: later triangles overwrite earlier ones.
/// Fragments outside `0 <= z <= 1` are dropped.
pub fn rasterize(
    triangles: &[Triangle],
    width: u32,
    height: u32,
    provoking: ProvokingVertex,
) -> TexIndexImage {
    let mut image = TexIndexImage::new(width, height);
    if width == 0 || height == 0 {
        return image;
    }

    for tri in triangles {
        if tri.is_rejected() {
            continue;
        }

        let mut screen = [Vec2::ZERO; 3];
        let mut depth = [0.0f32; 3];
        for (i, v) in tri.vertices.iter().enumerate() {
            let ndc = v.clip_position.truncate() / v.clip_position.w;
            screen[i] = Vec2::new(
                (ndc.x + 1.0) * 0.5 * width as f32,
                (1.0 - ndc.y) * 0.5 * height as f32,
            );
            depth[i] = ndc.z;
        }

        let mut area = edge(screen[0], screen[1], screen[2]);
        if area == 0.0 || !area.is_finite() {
            continue;
        }
        // Coverage does not depend on winding
        if area < 0.0 {
            screen.swap(1, 2);
            depth.swap(1, 2);
            area = -area;
        }

        let top_left = [
            is_top_left(screen[1], screen[2]),
            is_top_left(screen[2], screen[0]),
            is_top_left(screen[0], screen[1]),
        ];

        let min = screen[0].min(screen[1]).min(screen[2]);
        let max = screen[0].max(screen[1]).max(screen[2]);
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil() as i64).clamp(0, width as i64) as u32;
        let y1 = (max.y.ceil() as i64).clamp(0, height as i64) as u32;

        let value = tri.flat_tex_index(provoking);

        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w = [
                    edge(screen[1], screen[2], p),
                    edge(screen[2], screen[0], p),
                    edge(screen[0], screen[1], p),
                ];
                if !(0..3).all(|i| covers(w[i], top_left[i])) {
                    continue;
                }
                let z = (w[0] * depth[0] + w[1] * depth[1] + w[2] * depth[2]) / area;
                if !(0.0..=1.0).contains(&z) {
                    continue;
                }
                image.set(x, y, value);
            }
        }
    }

    image
}

/// Expected texture index image for an indexed draw of `vertices`.
///
/// Runs `stage` over every vertex, assembles triangles and rasterizes them.
pub fn reference_image<I>(
    stage: &PassThroughStage,
    vertices: &[PassVertex],
    indices: &[I],
    width: u32,
    height: u32,
    provoking: ProvokingVertex,
) -> Result<TexIndexImage, AssemblyError>
where
    I: Copy + Into<u32>,
{
    let inputs: Vec<VertexInput> = vertices.iter().map(|&v| v.into()).collect();
    let outputs = stage.invoke_batch(&inputs);
    let triangles = assemble_triangles(&outputs, indices)?;
    Ok(rasterize(&triangles, width, height, provoking))
}
