//! Validate command - naga validation plus the interface contract

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use vstage::shader::{self, CLIP_W_CONSTANT, InterfaceVariable, PASSTHROUGH_WGSL};

/// Arguments for the validate command
#[derive(Args)]
pub struct ValidateArgs {
    /// WGSL file to check instead of the built-in stage
    #[arg(value_name = "FILE")]
    pub source: Option<PathBuf>,
}

fn describe(var: &InterfaceVariable) -> String {
    match &var.name {
        Some(name) => format!("{:<12} {} {}", var.slot.to_string(), name, var.ty),
        None => format!("{:<12} {}", var.slot.to_string(), var.ty),
    }
}

/// Describe the `CLIP_W` override of a source that already validated.
fn clip_w_line(source: &str) -> Result<String> {
    let (module, _) = shader::parse_and_validate(source)?;
    Ok(match shader::override_default(&module, CLIP_W_CONSTANT) {
        Some(w) => format!("{} = {} (pipeline-overridable)", CLIP_W_CONSTANT, w),
        None => format!("{} not declared", CLIP_W_CONSTANT),
    })
}

/// Execute the validate command
pub fn execute(args: ValidateArgs) -> Result<()> {
    let (label, source) = match &args.source {
        Some(path) => (
            path.display().to_string(),
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read shader: {}", path.display()))?,
        ),
        None => ("built-in stage".to_string(), PASSTHROUGH_WGSL.to_string()),
    };

    let iface = shader::check_passthrough(&source)
        .with_context(|| format!("{} does not satisfy the pass-through interface", label))?;

    println!("{}: OK (entry point `{}`)", label, iface.entry_point);
    println!("  inputs:");
    for var in &iface.inputs {
        println!("    {}", describe(var));
    }
    println!("  outputs:");
    for var in &iface.outputs {
        println!("    {}", describe(var));
    }
    println!("  {}", clip_w_line(&source)?);
    Ok(())
}
