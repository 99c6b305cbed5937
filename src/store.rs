//! Backup storage
//!
//! Keeps file copies and the last backup record in one flat directory.
//! Copies are named `<YYYYmmdd_HHMMSS>_<sanitized name>_<id>`.

use crate::error::{Missing, SysundoError};
use crate::manifest::{BackupEntry, Manifest};
use crate::paths::PathResolver;
use chrono::{DateTime, Local};
use indexmap::IndexMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the last backup record inside the backup directory
pub const MANIFEST_FILE_NAME: &str = "last_backup.json";

/// Backup ids are sub-second nanoseconds modulo this value
const ID_MODULUS: u32 = 100_000;

/// Flat directory holding backup copies and the manifest
#[derive(Debug, Clone)]
pub struct BackupStore {
    dir: PathBuf,
}

impl BackupStore {
    /// Open the store rooted at `dir`, creating the directory if needed.
    ///
    /// A creation failure is only logged; operations that need the
    /// directory report their own errors later.
    pub fn open(dir: PathBuf) -> Self {
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!(dir = %dir.display(), error = %e, "cannot create backup directory");
        }
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE_NAME)
    }

    /// Copy `path` into the store and return the path of the copy.
    ///
    /// Permission bits of the source are carried over. A partially
    /// written copy is left in place when the copy fails.
    pub fn backup(&self, path: &Path) -> Result<PathBuf, SysundoError> {
        let not_found = || SysundoError::NotFound {
            missing: Missing::Source,
            path: path.to_path_buf(),
        };

        let source = PathResolver::absolute(path).map_err(|_| not_found())?;
        fs::metadata(&source).map_err(|_| not_found())?;

        let backup_path = self.next_backup_path(&source, Local::now());
        copy_file(&source, &backup_path)?;

        debug!(source = %source.display(), backup = %backup_path.display(), "backed up");
        Ok(backup_path)
    }

    fn next_backup_path(&self, source: &Path, now: DateTime<Local>) -> PathBuf {
        let name = source
            .file_name()
            .map(|n| sanitize_file_name(&n.to_string_lossy()))
            .unwrap_or_default();
        let stamp = now.format("%Y%m%d_%H%M%S");
        let mut id = now.timestamp_subsec_nanos() % ID_MODULUS;

        let mut candidate = self.dir.join(format!("{}_{}_{}", stamp, name, id));
        for _ in 0..ID_MODULUS {
            if !candidate.exists() {
                break;
            }
            id = (id + 1) % ID_MODULUS;
            candidate = self.dir.join(format!("{}_{}_{}", stamp, name, id));
        }
        candidate
    }

    /// Replace the manifest with a record of `backups` (original -> copy).
    ///
    /// Entries whose copy no longer exists are skipped. The record is
    /// written to a temp file and renamed into place.
    pub fn write_manifest(
        &self,
        backups: &IndexMap<PathBuf, PathBuf>,
        command: &str,
        args: &[String],
    ) -> Result<Manifest, SysundoError> {
        let files = backups
            .iter()
            .filter_map(|(original, backup)| match fs::metadata(backup) {
                Ok(meta) => Some(BackupEntry {
                    original_path: original.clone(),
                    backup_path: backup.clone(),
                    size: meta.len(),
                }),
                Err(e) => {
                    warn!(backup = %backup.display(), error = %e, "backup copy vanished, not recorded");
                    None
                }
            })
            .collect();

        let manifest = Manifest {
            timestamp: Local::now(),
            command: command.to_string(),
            args: args.to_vec(),
            files,
        };

        let path = self.manifest_path();
        let data = serde_json::to_vec_pretty(&manifest).map_err(|e| {
            SysundoError::PersistFailed {
                path: path.clone(),
                source: e.into(),
            }
        })?;

        let temp_path = self
            .dir
            .join(format!(".{}.{}.tmp", MANIFEST_FILE_NAME, std::process::id()));
        let persisted = fs::write(&temp_path, &data).and_then(|()| fs::rename(&temp_path, &path));
        if let Err(source) = persisted {
            let _ = fs::remove_file(&temp_path);
            return Err(SysundoError::PersistFailed { path, source });
        }

        debug!(path = %path.display(), files = manifest.files.len(), "manifest written");
        Ok(manifest)
    }

    /// Read the last backup record
    pub fn read_manifest(&self) -> Result<Manifest, SysundoError> {
        let path = self.manifest_path();
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SysundoError::NotFound {
                    missing: Missing::Manifest,
                    path,
                })
            }
            Err(e) => return Err(SysundoError::Io(e)),
        };

        serde_json::from_slice(&data).map_err(|source| SysundoError::ParseFailed { path, source })
    }

    /// Copy a backup over its original path, creating parent directories.
    ///
    /// Whatever exists at the original path is overwritten.
    pub fn restore(&self, entry: &BackupEntry) -> Result<(), SysundoError> {
        if fs::metadata(&entry.backup_path).is_err() {
            return Err(SysundoError::NotFound {
                missing: Missing::Backup,
                path: entry.backup_path.clone(),
            });
        }

        if let Some(parent) = entry.original_path.parent() {
            fs::create_dir_all(parent).map_err(|source| SysundoError::CreateFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        copy_file(&entry.backup_path, &entry.original_path)?;
        debug!(original = %entry.original_path.display(), "restored");
        Ok(())
    }
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Stream `from` into `to` and copy the permission bits
fn copy_file(from: &Path, to: &Path) -> Result<(), SysundoError> {
    let copy_failed = |source: io::Error| SysundoError::CopyFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    let mut reader = fs::File::open(from).map_err(copy_failed)?;
    let mut writer = fs::File::create(to).map_err(copy_failed)?;
    io::copy(&mut reader, &mut writer).map_err(copy_failed)?;

    let permissions = reader.metadata().map_err(copy_failed)?.permissions();
    fs::set_permissions(to, permissions).map_err(copy_failed)?;
    Ok(())
}
