use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::EngineError;

const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
}

fn default_max_upload_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            upload_dir: default_upload_dir(),
        }
    }
}

pub fn write_default_config(path: &Path) -> Result<(), EngineError> {
    let config = EngineConfig::default();
    let toml_str =
        toml::to_string_pretty(&config).map_err(|e| EngineError::Config(e.to_string()))?;
    std::fs::write(path, toml_str).map_err(|e| EngineError::Config(e.to_string()))?;
    Ok(())
}

pub fn read_config(path: &Path) -> Result<EngineConfig, EngineError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| EngineError::Config(e.to_string()))?;
    let config: EngineConfig =
        toml::from_str(&content).map_err(|e| EngineError::Config(e.to_string()))?;
    Ok(config)
}
