//! Configuration for sysundo
//!
//! Loads user configuration from `~/.config/sysundo/config.toml`.
//! Holds the interface language, the backup directory and the backup policy.

use crate::error::SysundoError;
use crate::paths::PathResolver;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Overrides the config file location
pub const CONFIG_ENV: &str = "SYSUNDO_CONFIG";
/// Overrides the backup directory
pub const BACKUP_DIR_ENV: &str = "SYSUNDO_BACKUP_DIR";

/// Files above this size are not backed up (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

const DEFAULT_INCLUDED: [&str; 8] = [".txt", ".md", ".json", ".yaml", ".yml", ".sh", ".js", ".py"];
const DEFAULT_EXCLUDED: [&str; 4] = [".mp4", ".zip", ".tar", ".gz"];

/// Configuration structure
///
/// Example config.toml:
/// ```toml
/// language = "tr"
/// backup_dir = "~/.sysundo/cache"
///
/// [policy]
/// max_file_size = 10485760
/// included_extensions = [".txt", ".md"]
/// excluded_extensions = [".zip"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Interface language code; detected from the environment when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Directory for backup copies and the last backup record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<String>,

    /// Which files get backed up
    #[serde(default)]
    pub policy: Policy,
}

/// Size and extension rules deciding which files are backed up.
///
/// Extensions are an allow-list: a file is backed up only when its
/// extension is included and not excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub max_file_size: u64,
    pub included_extensions: BTreeSet<String>,
    pub excluded_extensions: BTreeSet<String>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            included_extensions: DEFAULT_INCLUDED.iter().map(|e| e.to_string()).collect(),
            excluded_extensions: DEFAULT_EXCLUDED.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl Policy {
    /// Lower-case every extension and give it a leading dot
    pub fn normalize(&mut self) {
        self.included_extensions = Self::normalize_set(&self.included_extensions);
        self.excluded_extensions = Self::normalize_set(&self.excluded_extensions);
    }

    fn normalize_set(set: &BTreeSet<String>) -> BTreeSet<String> {
        set.iter()
            .filter_map(|ext| Self::normalize_extension(ext))
            .collect()
    }

    fn normalize_extension(ext: &str) -> Option<String> {
        let trimmed = ext.trim().trim_start_matches('.').to_lowercase();
        if trimmed.is_empty() {
            None
        } else {
            Some(format!(".{}", trimmed))
        }
    }
}

impl Config {
    /// Get the config file path: ~/.config/sysundo/config.toml
    ///
    /// If SYSUNDO_CONFIG environment variable is set, uses that path instead.
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|d| d.join(".config").join("sysundo").join("config.toml"))
    }

    /// Load configuration from default path
    pub fn load() -> Self {
        Self::load_from_path(Self::config_path())
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<Config>(&content) {
                Ok(mut config) => {
                    config.policy.normalize();
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "config parse error, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read config, using defaults");
                Self::default()
            }
        }
    }

    /// Write this configuration to `path`, creating its directory
    pub fn save_to_path(&self, path: &Path) -> Result<(), SysundoError> {
        let write_error = |source: io::Error| SysundoError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        };

        let content = toml::to_string(self)
            .map_err(|e| write_error(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(write_error)?;
        }
        std::fs::write(path, content).map_err(write_error)
    }

    /// Backup directory: SYSUNDO_BACKUP_DIR, then `backup_dir`, then
    /// `~/.sysundo/cache`
    pub fn backup_dir(&self) -> PathBuf {
        let from_env = std::env::var_os(BACKUP_DIR_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        self.backup_dir_with(from_env)
    }

    fn backup_dir_with(&self, from_env: Option<PathBuf>) -> PathBuf {
        if let Some(dir) = from_env {
            return dir;
        }
        if let Some(dir) = self.backup_dir.as_deref().filter(|d| !d.is_empty()) {
            return PathResolver::expand_tilde(dir);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sysundo")
            .join("cache")
    }
}
