//! Texture readback into a [`TexIndexImage`]

use vstage_common::TexIndexImage;

use super::error::RenderError;

const BYTES_PER_TEXEL: u32 = 4;

/// Bytes per row of a staging copy, padded to `COPY_BYTES_PER_ROW_ALIGNMENT`.
pub(crate) fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_TEXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Copy an `R32Uint` texture to a staging buffer and read it back.
pub(crate) fn read_tex_index_target(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    width: u32,
    height: u32,
) -> Result<TexIndexImage, RenderError> {
    let padded_row = padded_bytes_per_row(width);

    let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Tex Index Staging Buffer"),
        size: u64::from(padded_row) * u64::from(height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Tex Index Readback Encoder"),
    });

    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging_buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );

    queue.submit(std::iter::once(encoder.finish()));

    let slice = staging_buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });

    device.poll(wgpu::PollType::wait_indefinitely())?;
    rx.recv().map_err(|_| RenderError::ReadbackChannelClosed)??;

    // Strip row padding; rows start on 256-byte boundaries so u32 casts are aligned
    let mapped = slice.get_mapped_range();
    let mut texels = Vec::with_capacity(width as usize * height as usize);
    for row in 0..height as usize {
        let start = row * padded_row as usize;
        let end = start + (width * BYTES_PER_TEXEL) as usize;
        texels.extend_from_slice(bytemuck::cast_slice::<u8, u32>(&mapped[start..end]));
    }

    drop(mapped);
    staging_buffer.unmap();

    let found = texels.len();
    TexIndexImage::from_texels(width, height, texels).ok_or(RenderError::ReadbackSize {
        expected: width as usize * height as usize,
        found,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_padding() {
        assert_eq!(padded_bytes_per_row(1), 256);
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(128), 512);
    }
}
