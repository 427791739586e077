//! vstage CLI - inspect and exercise the vertex pass-through stage
//!
//! # Commands
//!
//! - `vstage wgsl` - Print the stage's WGSL source
//! - `vstage validate` - Validate the source and check its declared interface
//! - `vstage invoke` - Run the CPU reference on one vertex
//! - `vstage render` - Render a demo quad batch headlessly and report coverage
//! - `vstage config` - Show the effective settings or write a default config.toml
//!
//! # Usage
//!
//! ```bash
//! vstage invoke --pos 0.5 -0.25 1.0 --tex 7
//! vstage render --clip-w one --out coverage.png
//! ```
//!
//! Settings are read from `config.toml` in the platform config directory, or
//! from the file given with `--config`. Set `RUST_LOG=debug` for more output.

mod config_cmd;
mod invoke;
mod render;
mod validate;
mod wgsl;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use vstage::ClipW;
use vstage::config::{self, Config};

/// vstage CLI - vertex pass-through stage tooling
#[derive(Parser)]
#[command(name = "vstage")]
#[command(about = "Inspect and exercise the vertex pass-through stage")]
#[command(version)]
struct Cli {
    /// Path to a config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stage's WGSL source
    Wgsl,

    /// Validate the stage source and check its declared interface
    Validate(validate::ValidateArgs),

    /// Run the CPU reference of the stage on a single vertex
    Invoke(invoke::InvokeArgs),

    /// Render a demo quad batch headlessly and report texture index coverage
    Render(render::RenderArgs),

    /// Show the effective settings, or write a default config.toml with --init
    Config(config_cmd::ConfigArgs),
}

/// Fourth clip-space component as a command line value
#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum ClipWArg {
    /// Declared behavior (w = 0)
    Zero,
    /// Conventional homogeneous coordinate (w = 1)
    One,
}

impl From<ClipWArg> for ClipW {
    fn from(arg: ClipWArg) -> Self {
        match arg {
            ClipWArg::Zero => ClipW::Zero,
            ClipWArg::One => ClipW::One,
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => config::load_from(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(config::load()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Wgsl => wgsl::execute(),
        Commands::Validate(args) => validate::execute(args),
        Commands::Invoke(args) => {
            let config = load_config(cli.config.as_deref())?;
            invoke::execute(args, &config)
        }
        Commands::Render(args) => {
            let config = load_config(cli.config.as_deref())?;
            render::execute(args, &config)
        }
        Commands::Config(args) => {
            let path = cli.config.as_deref();
            let config = match path {
                Some(path) => config::load_or_default(path),
                None => config::load(),
            };
            config_cmd::execute(args, path, &config)
        }
    }
}
