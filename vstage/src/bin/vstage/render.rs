//! Render command - draw a demo quad batch headlessly
//!
//! The batch is four quadrant quads (indices 0..=3) with a centre quad on top
//! whose corners carry different indices (10..=13). The centre shows which
//! corner provokes each of its two triangles.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use glam::Vec2;

use vstage::config::{Config, RenderConfig};
use vstage::graphics::HeadlessRenderer;
use vstage::{
    BACKGROUND, ClipW, PassThroughStage, Quad, QuadBatch, TexIndexImage, reference_image,
};

use crate::ClipWArg;

/// Arguments for the render command
#[derive(Args)]
pub struct RenderArgs {
    /// Write a false-colour PNG of the texture index image
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Fourth clip-space component (overrides the config)
    #[arg(long, value_enum)]
    pub clip_w: Option<ClipWArg>,

    /// Target width in pixels (overrides the config)
    #[arg(long)]
    pub width: Option<u32>,

    /// Target height in pixels (overrides the config)
    #[arg(long)]
    pub height: Option<u32>,
}

fn demo_batch() -> Result<QuadBatch> {
    let mut batch = QuadBatch::with_capacity(5)?;
    let quadrants = [
        (Vec2::new(-1.0, -1.0), Vec2::new(0.0, 0.0)),
        (Vec2::new(0.0, -1.0), Vec2::new(1.0, 0.0)),
        (Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0)),
        (Vec2::new(-1.0, 0.0), Vec2::new(0.0, 1.0)),
    ];
    for (tex_index, (min, max)) in (0u32..).zip(quadrants) {
        batch.push(Quad::rect(min, max, 0.5), tex_index)?;
    }
    batch.push_corners(
        Quad::rect(Vec2::splat(-0.5), Vec2::splat(0.5), 0.25),
        [10, 11, 12, 13],
    )?;
    Ok(batch)
}

/// Distinct colour per texture index, black for uncovered texels.
fn false_colour(tex_index: u32) -> image::Rgb<u8> {
    if tex_index == BACKGROUND {
        return image::Rgb([0, 0, 0]);
    }
    let h = tex_index.wrapping_add(1).wrapping_mul(0x9E37_79B9);
    let [r, g, b, _] = h.to_le_bytes();
    image::Rgb([r | 0x40, g | 0x40, b | 0x40])
}

fn write_png(image: &TexIndexImage, path: &Path) -> Result<()> {
    let rgb = image::RgbImage::from_fn(image.width(), image.height(), |x, y| {
        false_colour(image.get(x, y).unwrap_or(BACKGROUND))
    });
    rgb.save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Execute the render command
pub fn execute(args: RenderArgs, config: &Config) -> Result<()> {
    let render_config = RenderConfig {
        width: args.width.unwrap_or(config.render.width),
        height: args.height.unwrap_or(config.render.height),
        clip_w: args.clip_w.map(Into::into).unwrap_or(config.render.clip_w),
        ..config.render.clone()
    };
    let clip_w = render_config.clip_w;

    let mut renderer =
        HeadlessRenderer::new(&render_config).context("Failed to start headless renderer")?;
    let info = renderer.adapter_info();
    println!(
        "Adapter: {} ({:?}), provoking vertex: {:?}",
        info.name,
        info.backend,
        renderer.provoking_vertex()
    );

    let batch = demo_batch()?;
    let image = renderer.draw_quads(&batch, clip_w)?;
    let (width, height) = renderer.extent();

    println!(
        "Rendered {} quads into {}x{} with w = {}",
        batch.len(),
        width,
        height,
        clip_w.value()
    );
    if image.covered_count() == 0 {
        println!("No texels covered");
        if clip_w == ClipW::Zero {
            println!("  w = 0 puts every vertex at infinity; try --clip-w one");
        }
    }
    for (tex_index, count) in image.coverage() {
        println!("  tex_index {:>3}: {} texels", tex_index, count);
    }

    let expected = reference_image(
        &PassThroughStage::new(clip_w),
        batch.vertices(),
        batch.indices(),
        width,
        height,
        renderer.provoking_vertex(),
    )?;
    let differing = image
        .texels()
        .iter()
        .zip(expected.texels())
        .filter(|(gpu, cpu)| gpu != cpu)
        .count();
    if differing == 0 {
        println!("Matches CPU reference");
    } else if image.distinct_indices() == expected.distinct_indices() {
        // Pixel centers exactly on a shared edge follow the driver's tie rule
        println!(
            "Same indices as CPU reference, {} texels on shared edges differ",
            differing
        );
    } else {
        tracing::warn!(
            "GPU indices {:?} differ from CPU reference {:?}",
            image.distinct_indices(),
            expected.distinct_indices()
        );
    }

    if let Some(path) = &args.out {
        write_png(&image, path)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vstage::ProvokingVertex;
    use vstage::graphics::RenderError;

    fn no_adapter(err: &anyhow::Error) -> bool {
        err.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<RenderError>(),
                Some(RenderError::Adapter(_) | RenderError::Device(_))
            )
        })
    }

    #[test]
    fn test_demo_batch_layout() {
        let batch = demo_batch().unwrap();
        assert_eq!(batch.len(), 5);
        assert_eq!(batch.indices().len(), 30);
    }

    #[test]
    fn test_demo_batch_reference_shows_provoking_corners() {
        let batch = demo_batch().unwrap();
        let image = reference_image(
            &PassThroughStage::new(ClipW::One),
            batch.vertices(),
            batch.indices(),
            32,
            32,
            ProvokingVertex::First,
        )
        .unwrap();
        assert_eq!(image.distinct_indices(), vec![0, 1, 2, 3, 10, 12]);
        assert_eq!(image.covered_count(), 32 * 32);
    }

    #[test]
    fn test_false_colour_background_is_black() {
        assert_eq!(false_colour(BACKGROUND), image::Rgb([0, 0, 0]));
        assert_ne!(false_colour(0), false_colour(1));
    }

    #[test]
    fn test_png_dump() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coverage.png");

        let batch = demo_batch().unwrap();
        let image = reference_image(
            &PassThroughStage::new(ClipW::One),
            batch.vertices(),
            batch.indices(),
            16,
            8,
            ProvokingVertex::First,
        )
        .unwrap();
        write_png(&image, &path).unwrap();

        let png = image::open(&path).unwrap().to_rgb8();
        assert_eq!(png.dimensions(), (16, 8));
        assert_eq!(*png.get_pixel(0, 0), false_colour(3));
        assert_eq!(*png.get_pixel(8, 4), false_colour(image.get(8, 4).unwrap()));
    }

    #[test]
    fn test_execute_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.png");
        let args = RenderArgs {
            out: Some(path.clone()),
            clip_w: Some(ClipWArg::One),
            width: Some(16),
            height: Some(16),
        };

        match execute(args, &Config::default()) {
            Ok(()) => {
                let png = image::open(&path).unwrap().to_rgb8();
                assert_eq!(png.dimensions(), (16, 16));
                assert_ne!(*png.get_pixel(0, 0), false_colour(BACKGROUND));
            }
            Err(e) if no_adapter(&e) => eprintln!("skipping GPU test: {:#}", e),
            Err(e) => panic!("render failed: {:#}", e),
        }
    }

    #[test]
    fn test_execute_rejects_oversized_target() {
        let args = RenderArgs {
            out: None,
            clip_w: None,
            width: Some(1 << 16),
            height: None,
        };
        let Err(err) = execute(args, &Config::default()) else {
            panic!("oversized target accepted");
        };
        if no_adapter(&err) {
            return;
        }
        assert!(err.chain().any(|cause| matches!(
            cause.downcast_ref::<RenderError>(),
            Some(RenderError::TargetTooLarge { .. })
        )));
    }
}
