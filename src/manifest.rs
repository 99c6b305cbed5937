//! Last backup record
//!
//! A manifest lists every file copied by the most recent watched command.
//! It is serialized as `last_backup.json` in the backup directory.

use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Backup record of one watched command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub timestamp: DateTime<Local>,
    pub command: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub args: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub files: Vec<BackupEntry>,
}

/// One preserved file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupEntry {
    pub original_path: PathBuf,
    pub backup_path: PathBuf,
    /// Size of the backup copy in bytes
    pub size: u64,
}

impl Manifest {
    /// Recorded command line, shell-quoted
    pub fn command_line(&self) -> String {
        let words = std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str));
        shlex::try_join(words.clone()).unwrap_or_else(|_| words.collect::<Vec<_>>().join(" "))
    }

    /// Sum of all backup sizes
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|entry| entry.size).sum()
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
