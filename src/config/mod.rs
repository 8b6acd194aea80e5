pub mod categories;
pub mod color;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::domain::BoundingBox;
use crate::error::ConfigError;
use crate::export::ExportFormat;

pub use categories::{
    BridgeConfig, BuildingConfig, ExportConfig, GenerationConfig, ProjectionConfig, RoadConfig,
    RoadStyle, TerrainConfig, VegetationConfig, WaterConfig,
};
pub use color::Color;

/// Contents of a `mapmesh.toml` file
///
/// Top-level keys are run defaults for the binary; the category tables
/// (`[buildings]`, `[roads]`, ...) form the generation config.
#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub input: Option<PathBuf>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub format: Option<ExportFormat>,
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
    #[serde(default)]
    pub verbose: bool,
    #[serde(flatten)]
    pub generation: GenerationConfig,
}

impl FileConfig {
    /// Parse a config document
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Read and parse a config file; missing or malformed files are errors
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Search the default locations; the first file that parses wins
    pub fn load() -> Option<Self> {
        for path in get_config_paths() {
            if !path.exists() {
                continue;
            }
            match Self::from_path(&path) {
                Ok(config) => return Some(config),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping config file"),
            }
        }
        None
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("mapmesh.toml"));
    paths.push(PathBuf::from(".mapmesh.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("mapmesh").join("config.toml"));
        paths.push(config_dir.join("mapmesh.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".mapmesh.toml"));
        paths.push(home.join(".config").join("mapmesh").join("config.toml"));
    }

    paths
}
