//! Error types for sysundo
//!
//! Defines SysundoError and the exit code each failure maps to.

use crate::lang::Messages;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// What a `NotFound` error was looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// File named on the command line
    Source,
    /// Copy inside the backup directory
    Backup,
    /// Last backup record
    Manifest,
}

impl Missing {
    fn message_key(self) -> &'static str {
        match self {
            Self::Source => "source_not_found",
            Self::Backup => "backup_file_not_found",
            Self::Manifest => "backup_record_not_found",
        }
    }
}

/// Errors raised by sysundo
#[derive(Debug)]
pub enum SysundoError {
    // Backup / restore errors (Exit 1)
    /// Source file, backup copy or manifest does not exist
    NotFound { missing: Missing, path: PathBuf },
    /// Open, create, copy or chmod failed while copying a file
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    /// Directory creation failed
    CreateFailed { path: PathBuf, source: io::Error },
    /// Manifest is not valid JSON for a backup record
    ParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Manifest could not be serialized or written
    PersistFailed { path: PathBuf, source: io::Error },
    /// Undo restored zero files
    NothingRestored,

    // Wrapped command (exit code mirrors the child)
    /// `watch` was given no command
    MissingCommand,
    /// Child exited with a non-zero status
    CommandFailed { command: String, code: i32 },
    /// Child was killed by a signal
    CommandTerminated {
        command: String,
        signal: Option<i32>,
    },
    /// Child could not be started
    Spawn { command: String, source: io::Error },

    // Settings (Exit 1)
    /// No catalog for the requested language
    UnknownLanguage(String),
    /// Config file could not be written
    ConfigWrite { path: PathBuf, source: io::Error },

    /// Other I/O failure
    Io(io::Error),
}

impl SysundoError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::CommandFailed { code, .. } => u8::try_from(*code)
                .ok()
                .filter(|code| *code != 0)
                .unwrap_or(1),
            Self::CommandTerminated { signal, .. } => signal
                .and_then(|signal| u8::try_from(128 + signal).ok())
                .unwrap_or(1),
            Self::Spawn { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => 127,
                io::ErrorKind::PermissionDenied => 126,
                _ => 1,
            },
            Self::MissingCommand => 2,
            _ => 1,
        }
    }

    /// True for the `NotFound` family
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Message in the language of `messages`
    pub fn user_message(&self, messages: &Messages) -> String {
        match self {
            Self::NotFound { missing, path } => {
                messages.get(missing.message_key(), &[&path.display()])
            }
            Self::CopyFailed { from, to, source } => messages.get(
                "file_copy_error",
                &[&from.display(), &to.display(), source],
            ),
            Self::CreateFailed { path, source } => {
                messages.get("target_dir_create_error", &[&path.display(), source])
            }
            Self::ParseFailed { path, source } => {
                messages.get("backup_record_read_error", &[&path.display(), source])
            }
            Self::PersistFailed { path, source } => {
                messages.get("backup_record_write_error", &[&path.display(), source])
            }
            Self::NothingRestored => messages.get("no_files_restored", &[]),
            Self::MissingCommand => messages.get("watch_command_usage", &[]),
            Self::CommandFailed { command, code } => {
                messages.get("command_failed", &[command, code])
            }
            Self::CommandTerminated { command, .. } => {
                messages.get("command_terminated", &[command])
            }
            Self::Spawn { command, source } => {
                messages.get("command_spawn_error", &[command, source])
            }
            Self::UnknownLanguage(code) => messages.get("invalid_language", &[code]),
            Self::ConfigWrite { path, source } => {
                messages.get("config_write_error", &[&path.display(), source])
            }
            Self::Io(e) => messages.get("io_error", &[e]),
        }
    }
}

impl fmt::Display for SysundoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message(Messages::english()))
    }
}

impl std::error::Error for SysundoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CopyFailed { source, .. }
            | Self::CreateFailed { source, .. }
            | Self::PersistFailed { source, .. }
            | Self::Spawn { source, .. }
            | Self::ConfigWrite { source, .. } => Some(source),
            Self::ParseFailed { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SysundoError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
