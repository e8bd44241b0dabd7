//! Configuration initialization and hierarchy management

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::TomlConfigAdapter;
use crate::app::EditorConfig;
use crate::cli::Cli;

/// Build the effective configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration(cli: &Cli) -> Result<EditorConfig> {
    let mut config = load_config_file(cli)?;

    config
        .apply_env()
        .context("Invalid environment configuration")?;

    apply_cli_overrides(&mut config, cli)?;

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Explicit `--config` file, else the first discovered one, else defaults
fn load_config_file(cli: &Cli) -> Result<EditorConfig> {
    let path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => TomlConfigAdapter::discover(),
    };

    match path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            TomlConfigAdapter::load(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))
        }
        None => Ok(EditorConfig::default()),
    }
}

fn apply_cli_overrides(config: &mut EditorConfig, cli: &Cli) -> Result<()> {
    let mut cli_overrides = 0;

    if let Some(level) = &cli.log_level {
        config.log_level = level.parse().map_err(anyhow::Error::msg)?;
        cli_overrides += 1;
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.parse().map_err(anyhow::Error::msg)?;
        cli_overrides += 1;
    }
    if let Some(ffmpeg) = &cli.ffmpeg {
        config.ffmpeg_path = ffmpeg.clone();
        cli_overrides += 1;
    }
    if let Some(dir) = &cli.project_dir {
        config.project_dir = dir.clone();
        cli_overrides += 1;
    }
    if let Some(jobs) = cli.jobs {
        config.max_concurrent_jobs = jobs;
        cli_overrides += 1;
    }
    if let Some(timeout) = cli.timeout {
        config.operation_timeout_secs = Some(timeout);
        cli_overrides += 1;
    }

    if cli_overrides > 0 {
        info!("Applied {} CLI configuration overrides", cli_overrides);
    }
    Ok(())
}
