// TOML config adapter - Configuration loading from TOML files

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::config::EditorConfig;
use crate::error::{EditorError, EditorResult};

/// Files probed, in order, when no config path is given
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["reelcut.toml", "config/reelcut.toml"];

/// Settings live under a `[reelcut]` table
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    reelcut: EditorConfig,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse a config document; missing keys keep their defaults
    pub fn parse(content: &str) -> EditorResult<EditorConfig> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| EditorError::Config {
            message: format!("Failed to parse TOML config: {}", e),
        })?;
        Ok(file.reelcut)
    }

    pub fn load(path: &Path) -> EditorResult<EditorConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| EditorError::Config {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;
        let config = Self::parse(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// First existing file among [`DEFAULT_CONFIG_PATHS`]
    pub fn discover() -> Option<PathBuf> {
        DEFAULT_CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.is_file())
            .or_else(|| {
                debug!("No configuration file found");
                None
            })
    }

    pub fn serialize(config: &EditorConfig) -> EditorResult<String> {
        let file = ConfigFile {
            reelcut: config.clone(),
        };
        toml::to_string_pretty(&file).map_err(|e| EditorError::Config {
            message: format!("Failed to serialize config: {}", e),
        })
    }
}
