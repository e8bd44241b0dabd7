//! Reelcut CLI
//!
//! Timeline editing and ffmpeg orchestration for a non-linear video editor.
//!
//! # Usage
//!
//! ```bash
//! reelcut timeline --file project.json insert --rid clips/a.mp4 --start 0 --end 12.5
//! reelcut export --timeline project.json --output-dir out --filename final
//! reelcut cut --timeline project.json --output-dir out --all
//! reelcut import --input clips/a.mp4 --project-dir project
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use reelcut::cli::{commands, Cli};
use reelcut::config_initialization::initialize_configuration;
use reelcut::utils::logging::init_logging;

/// Main entry point for the Reelcut CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = initialize_configuration(&cli)?;
    init_logging(&config.logging());

    info!("Starting reelcut");
    if let Err(err) = commands::run(cli, config).await {
        error!("{:#}", err);
        return Err(err);
    }

    info!("Reelcut completed successfully");
    Ok(())
}
