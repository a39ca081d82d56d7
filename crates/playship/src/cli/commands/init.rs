//! Init command

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::info;

use playship_core::config::{DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_TOML};

use crate::cli::output::{self, path_style};
use crate::cli::Cli;

/// Write a starter Playship configuration
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, "executing init command");
        let cwd = std::env::current_dir()?;
        let config_path = self
            .output
            .clone()
            .unwrap_or_else(|| cwd.join(DEFAULT_CONFIG_TOML));

        write_template(&config_path, self.force)?;

        if !cli.quiet {
            output::success(&format!(
                "Created configuration at {}",
                path_style().apply_to(config_path.display())
            ));
            println!();
            println!("Next steps:");
            println!("  1. Point `binary` at your release APK or bundle");
            println!(
                "  2. Export {} with your service account key",
                style(playship_stores::credentials::PLAY_KEY_ENV).cyan()
            );
            println!("  3. Run {} to publish", style("playship publish").cyan());
        }

        Ok(())
    }
}

fn write_template(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
    Ok(())
}
