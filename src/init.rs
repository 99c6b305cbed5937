//! Configuration initialization for sysundo
//!
//! Generates a default config file at ~/.config/sysundo/config.toml

use crate::config::Config;
use crate::error::SysundoError;
use crate::lang::Messages;
use std::fs;
use std::io;
use std::path::Path;

/// Default config template, mirroring `Policy::default()`
const CONFIG_TEMPLATE: &str = r#"# sysundo configuration
# Location: ~/.config/sysundo/config.toml

# Interface language (en, tr). Detected from LANG when unset.
# language = "en"

# Where backup copies and the last backup record are kept.
# backup_dir = "~/.sysundo/cache"

[policy]
# Files larger than this many bytes are not backed up (10 MiB).
max_file_size = 10485760

# Only files with one of these extensions are backed up.
included_extensions = [".txt", ".md", ".json", ".yaml", ".yml", ".sh", ".js", ".py"]

# Files with these extensions are never backed up.
excluded_extensions = [".mp4", ".zip", ".tar", ".gz"]
"#;

/// Run the init subcommand
pub fn run_init(messages: &Messages) -> Result<(), SysundoError> {
    let config_path = Config::config_path().ok_or_else(|| SysundoError::ConfigWrite {
        path: "~/.config/sysundo/config.toml".into(),
        source: io::Error::new(io::ErrorKind::NotFound, "home directory not found"),
    })?;

    if write_template(&config_path)? {
        println!(
            "{}",
            messages.get("config_created", &[&config_path.display()])
        );
    } else {
        eprintln!(
            "{}",
            messages.get("config_exists", &[&config_path.display()])
        );
        eprintln!("{}", messages.get("config_regenerate_hint", &[]));
    }
    Ok(())
}

/// Write the template to `path` unless a file is already there.
///
/// Returns whether a new file was written.
pub fn write_template(path: &Path) -> Result<bool, SysundoError> {
    if path.exists() {
        return Ok(false);
    }

    let write_error = |source: io::Error| SysundoError::ConfigWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(write_error)?;
    }
    fs::write(path, CONFIG_TEMPLATE).map_err(write_error)?;
    Ok(true)
}
