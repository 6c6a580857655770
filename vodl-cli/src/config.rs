use crate::cli::OutputFormat;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use vodl_engine::JoinConfig;

const CONFIG_DIR: &str = "vodl";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory segments are downloaded to when `--output-dir` is not given
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Quality used instead of prompting when `--quality` is not given
    #[serde(default)]
    pub default_quality: Option<String>,

    /// File name of the join playlist written next to the segments
    #[serde(default = "default_playlist_name")]
    pub playlist_name: String,

    #[serde(default)]
    pub output_format: OutputFormat,

    #[serde(default)]
    pub join: JoinConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_playlist_name() -> String {
    "playlist_downloaded.m3u8".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            default_quality: None,
            playlist_name: default_playlist_name(),
            output_format: OutputFormat::default(),
            join: JoinConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config from `path`, or from the user config directory. A
    /// missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            debug!("No config directory available, using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config = toml::from_str(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Overwrites the config file with the defaults and returns its path.
    pub fn reset(path: Option<&Path>) -> Result<PathBuf> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(Self::default_path)
            .ok_or_else(|| {
                crate::error::AppError::InvalidInput(
                    "no config directory available, pass --config".to_string(),
                )
            })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, Self::default().show()?)?;
        Ok(path)
    }

    pub fn show(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }
}
