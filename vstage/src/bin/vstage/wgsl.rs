//! Wgsl command - print the stage source

use anyhow::Result;

use vstage::shader::PASSTHROUGH_WGSL;

pub fn execute() -> Result<()> {
    print!("{}", PASSTHROUGH_WGSL);
    Ok(())
}
