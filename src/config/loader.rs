//! Configuration loading and discovery for `assetpipe.toml`
//!
//! Provides functions to find, load, and validate configuration.

use super::schema::RawConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file name searched for.
pub const CONFIG_FILE: &str = "assetpipe.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse assetpipe.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// A loaded configuration plus the project root it was found under.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The parsed configuration tree
    pub raw: RawConfig,
    /// Directory containing the config file (or the cwd if none was found)
    pub root: PathBuf,
}

/// Find `assetpipe.toml` by walking up from the current working directory.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find `assetpipe.toml` by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// If a path is provided, loads from that file. Otherwise walks up from the
/// current directory; when no config file exists anywhere, an empty
/// configuration rooted at the cwd is returned (a build with zero tasks).
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            let raw = load_config_file(&p)?;
            let root = p.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
            Ok(LoadedConfig { raw, root })
        }
        None => Ok(LoadedConfig {
            raw: RawConfig::default(),
            root: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: RawConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Resolve a path relative to the project root.
///
/// Absolute paths are returned unchanged.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
