//! Config command - show or create config.toml

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use vstage::config::{self, Config};

/// Arguments for the config command
#[derive(Args)]
pub struct ConfigArgs {
    /// Write a config.toml with default settings
    #[arg(long)]
    pub init: bool,

    /// Overwrite an existing file with --init
    #[arg(long, requires = "init")]
    pub force: bool,
}

fn target_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(config::config_path)
}

fn init(path: Option<&Path>, force: bool) -> Result<PathBuf> {
    if let Some(existing) = target_path(path) {
        if existing.exists() && !force {
            anyhow::bail!("{} already exists (use --force)", existing.display());
        }
    }

    let defaults = Config::default();
    match path {
        Some(path) => {
            config::save_to(&defaults, path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Ok(path.to_path_buf())
        }
        None => config::save(&defaults)
            .context("Failed to write config")?
            .context("No platform config directory"),
    }
}

/// Execute the config command
pub fn execute(args: ConfigArgs, path: Option<&Path>, current: &Config) -> Result<()> {
    if args.init {
        let written = init(path, args.force)?;
        println!("Wrote {}", written.display());
        return Ok(());
    }

    match target_path(path) {
        Some(path) => println!("# {}", path.display()),
        None => println!("# no config directory, showing defaults"),
    }
    print!(
        "{}",
        toml::to_string_pretty(current).context("Failed to serialize config")?
    );
    Ok(())
}
