//! Path helpers for sysundo
//!
//! Resolves command-line paths to absolute form and extracts the pieces
//! the selector and the store key on.

use path_clean::PathClean;
use std::io;
use std::path::{Path, PathBuf};

/// Path resolution helpers
pub struct PathResolver;

impl PathResolver {
    /// Resolve `path` against the current working directory and clean it
    /// lexically (`.` and `..` removed, symlinks left alone).
    pub fn absolute(path: &Path) -> io::Result<PathBuf> {
        let cwd = std::env::current_dir()?;
        Ok(Self::to_absolute(&cwd, path))
    }

    /// Make `path` absolute relative to `base`
    pub fn to_absolute(base: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.clean()
        } else {
            base.join(path).clean()
        }
    }

    /// Lower-cased suffix of the file name from its last `.`, or "" when
    /// the name has no dot. Dotfiles count as all extension (`.env`).
    pub fn extension_of(path: &Path) -> String {
        let Some(name) = path.file_name() else {
            return String::new();
        };
        let name = name.to_string_lossy();
        name.rfind('.')
            .map(|dot| name[dot..].to_lowercase())
            .unwrap_or_default()
    }

    /// Expand tilde (~) prefix to the user's home directory
    pub fn expand_tilde(path: &str) -> PathBuf {
        if path == "~" {
            dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"))
        } else if let Some(rest) = path.strip_prefix("~/") {
            dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(path))
        } else {
            PathBuf::from(path)
        }
    }
}
