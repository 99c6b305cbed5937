//! `sysundo undo` and `sysundo list`
//!
//! Restores every file of the last backup record. Failures are reported per
//! file; undo only fails as a whole when nothing could be restored.

use crate::error::SysundoError;
use crate::lang::Messages;
use crate::store::BackupStore;
use std::path::PathBuf;
use tracing::debug;

/// Outcome of a successful undo
#[derive(Debug, Default)]
pub struct RestoreSummary {
    pub restored: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, SysundoError)>,
}

pub struct Restorer<'a> {
    store: &'a BackupStore,
    messages: &'a Messages,
}

impl<'a> Restorer<'a> {
    pub fn new(store: &'a BackupStore, messages: &'a Messages) -> Self {
        Self { store, messages }
    }

    /// Restore every file in the last backup record.
    ///
    /// # Errors
    ///
    /// Propagates manifest read errors; `NothingRestored` when no entry
    /// could be restored, including an empty record.
    pub fn restore_all(&self) -> Result<RestoreSummary, SysundoError> {
        let manifest = self.store.read_manifest()?;
        debug!(files = manifest.files.len(), command = %manifest.command, "restoring last backup");

        let mut summary = RestoreSummary::default();
        for entry in manifest.files {
            match self.store.restore(&entry) {
                Ok(()) => {
                    println!(
                        "{}",
                        self.messages
                            .get("restored", &[&entry.original_path.display()])
                    );
                    summary.restored.push(entry.original_path);
                }
                Err(e) => {
                    eprintln!(
                        "{}",
                        self.messages.get(
                            "file_restore_warning",
                            &[&entry.original_path.display(), &e.user_message(self.messages)]
                        )
                    );
                    summary.failed.push((entry.original_path, e));
                }
            }
        }

        if summary.restored.is_empty() {
            return Err(SysundoError::NothingRestored);
        }

        println!(
            "{}",
            self.messages
                .get("total_files_restored", &[&summary.restored.len()])
        );
        Ok(summary)
    }

    /// Human-readable description of the last backup record
    pub fn list_backups(&self) -> Result<String, SysundoError> {
        let manifest = self.store.read_manifest()?;

        let mut lines = vec![
            self.messages.get(
                "last_backup",
                &[&manifest.timestamp.format("%Y-%m-%d %H:%M:%S")],
            ),
            self.messages.get("backup_command", &[&manifest.command_line()]),
            self.messages.get("backed_up_files", &[]),
        ];
        lines.extend(manifest.files.iter().map(|entry| {
            self.messages.get(
                "backed_up_file_entry",
                &[&entry.original_path.display(), &entry.size],
            )
        }));
        lines.push(self.messages.get(
            "backup_total_size",
            &[&manifest.files.len(), &manifest.total_size()],
        ));

        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Missing;
    use indexmap::IndexMap;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, BackupStore) {
        let dir = TempDir::new().unwrap();
        let store = BackupStore::open(dir.path().join("cache"));
        (dir, store)
    }

    /// Back up `names` (created with their own name as content) and record them
    fn record(dir: &TempDir, store: &BackupStore, names: &[&str]) -> Vec<PathBuf> {
        let mut backups = IndexMap::new();
        let mut originals = Vec::new();
        for name in names {
            let path = dir.path().join(name);
            fs::write(&path, name).unwrap();
            backups.insert(path.clone(), store.backup(&path).unwrap());
            originals.push(path);
        }
        store.write_manifest(&backups, "rm", &[]).unwrap();
        originals
    }

    #[test]
    fn test_restore_all_recreates_deleted_files() {
        let (dir, store) = setup();
        let originals = record(&dir, &store, &["a.txt", "b.txt"]);
        for path in &originals {
            fs::remove_file(path).unwrap();
        }

        let summary = Restorer::new(&store, Messages::english())
            .restore_all()
            .unwrap();

        assert_eq!(summary.restored, originals);
        assert!(summary.failed.is_empty());
        assert_eq!(fs::read_to_string(&originals[0]).unwrap(), "a.txt");
        assert_eq!(fs::read_to_string(&originals[1]).unwrap(), "b.txt");
    }

    #[test]
    fn test_restore_all_partial_success() {
        let (dir, store) = setup();
        let originals = record(&dir, &store, &["a.txt", "b.txt", "c.txt"]);
        let manifest = store.read_manifest().unwrap();
        fs::remove_file(&manifest.files[1].backup_path).unwrap();

        let summary = Restorer::new(&store, Messages::english())
            .restore_all()
            .unwrap();

        assert_eq!(summary.restored, vec![originals[0].clone(), originals[2].clone()]);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, originals[1]);
        assert!(summary.failed[0].1.is_not_found());
    }

    #[test]
    fn test_restore_all_single_missing_backup() {
        let (dir, store) = setup();
        record(&dir, &store, &["a.txt"]);
        let manifest = store.read_manifest().unwrap();
        fs::remove_file(&manifest.files[0].backup_path).unwrap();

        let err = Restorer::new(&store, Messages::english())
            .restore_all()
            .unwrap_err();
        assert!(matches!(err, SysundoError::NothingRestored));
    }

    #[test]
    fn test_restore_all_empty_record() {
        let (_dir, store) = setup();
        store.write_manifest(&IndexMap::new(), "rm", &[]).unwrap();

        let err = Restorer::new(&store, Messages::english())
            .restore_all()
            .unwrap_err();
        assert!(matches!(err, SysundoError::NothingRestored));
    }

    #[test]
    fn test_restore_all_without_record() {
        let (_dir, store) = setup();
        let err = Restorer::new(&store, Messages::english())
            .restore_all()
            .unwrap_err();
        assert!(matches!(
            err,
            SysundoError::NotFound {
                missing: Missing::Manifest,
                ..
            }
        ));
    }

    #[test]
    fn test_restore_all_malformed_record() {
        let (_dir, store) = setup();
        fs::write(store.manifest_path(), "[]").unwrap();
        let err = Restorer::new(&store, Messages::english())
            .restore_all()
            .unwrap_err();
        assert!(matches!(err, SysundoError::ParseFailed { .. }));
    }

    #[test]
    fn test_list_backups() {
        let (dir, store) = setup();
        let originals = record(&dir, &store, &["a.txt", "bb.txt"]);

        let listing = Restorer::new(&store, Messages::english())
            .list_backups()
            .unwrap();

        assert!(listing.starts_with("Last backup: "));
        assert!(listing.contains("Command: rm"));
        assert!(listing.contains("Backed up files:"));
        assert!(listing.contains(&format!("  - {} (5 bytes)", originals[0].display())));
        assert!(listing.contains(&format!("  - {} (6 bytes)", originals[1].display())));
        assert!(listing.ends_with("Total: 2 file(s), 11 bytes"));
    }

    #[test]
    fn test_list_backups_without_record() {
        let (_dir, store) = setup();
        let err = Restorer::new(&store, Messages::english())
            .list_backups()
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
