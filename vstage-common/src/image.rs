//! Texture index images
//!
//! A [`TexIndexImage`] holds one `u32` per pixel: the flat texture index that
//! reached that pixel, or [`BACKGROUND`] where no primitive was rasterized.
//! Both the GPU readback and the software rasterizer produce this type so the
//! two can be compared directly.

use std::collections::BTreeMap;

/// Texel value for pixels not covered by any primitive
pub const BACKGROUND: u32 = u32::MAX;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TexIndexImage {
    width: u32,
    height: u32,
    texels: Vec<u32>,
}

impl TexIndexImage {
    /// Create an image filled with [`BACKGROUND`].
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            texels: vec![BACKGROUND; width as usize * height as usize],
        }
    }

    /// Wrap row-major texels. Returns `None` if the length doesn't match.
    pub fn from_texels(width: u32, height: u32, texels: Vec<u32>) -> Option<Self> {
        (texels.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            texels,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn texels(&self) -> &[u32] {
        &self.texels
    }

    /// Texel at `(x, y)`, origin top-left.
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.texels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub(crate) fn set(&mut self, x: u32, y: u32, value: u32) {
        let idx = y as usize * self.width as usize + x as usize;
        if let Some(texel) = self.texels.get_mut(idx) {
            *texel = value;
        }
    }

    /// Number of pixels covered by some primitive.
    pub fn covered_count(&self) -> usize {
        self.texels.iter().filter(|&&t| t != BACKGROUND).count()
    }

    /// Coverage per texture index, sorted by index.
    pub fn coverage(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for &t in self.texels.iter().filter(|&&t| t != BACKGROUND) {
            *counts.entry(t).or_insert(0) += 1;
        }
        counts
    }

    /// Texture indices present in the image, ascending.
    pub fn distinct_indices(&self) -> Vec<u32> {
        self.coverage().into_keys().collect()
    }
}
