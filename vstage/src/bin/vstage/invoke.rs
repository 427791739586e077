//! Invoke command - run the CPU reference on one vertex

use anyhow::Result;
use clap::Args;
use glam::Vec3;

use vstage::config::Config;
use vstage::{PassThroughStage, VertexInput, VertexOutput};

use crate::ClipWArg;

/// Arguments for the invoke command
#[derive(Args)]
pub struct InvokeArgs {
    /// Vertex position
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true, required = true)]
    pub pos: Vec<f32>,

    /// Texture index
    #[arg(long)]
    pub tex: u32,

    /// Fourth clip-space component (overrides the config)
    #[arg(long, value_enum)]
    pub clip_w: Option<ClipWArg>,
}

fn invoke(args: &InvokeArgs, config: &Config) -> Result<VertexOutput> {
    let [x, y, z] = args.pos[..] else {
        anyhow::bail!("--pos takes exactly three values, got {}", args.pos.len());
    };

    let clip_w = args.clip_w.map(Into::into).unwrap_or(config.render.clip_w);
    let stage = PassThroughStage::new(clip_w);
    Ok(stage.invoke(&VertexInput::new(Vec3::new(x, y, z), args.tex)))
}

/// Execute the invoke command
pub fn execute(args: InvokeArgs, config: &Config) -> Result<()> {
    let out = invoke(&args, config)?;

    let p = out.clip_position;
    println!("clip_position = ({}, {}, {}, {})", p.x, p.y, p.z, p.w);
    println!("tex_index     = {}", out.tex_index);
    Ok(())
}
