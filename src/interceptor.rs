//! Backup-then-run orchestration for `sysundo watch`
//!
//! Backups are best effort: a failed copy or manifest write is reported as
//! a warning and the wrapped command runs regardless. Only the command's
//! own outcome is returned as an error.

use crate::config::Policy;
use crate::error::SysundoError;
use crate::lang::Messages;
use crate::manifest::Manifest;
use crate::paths::PathResolver;
use crate::selector;
use crate::store::BackupStore;
use indexmap::IndexMap;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

/// What the backup half of a watch run did
#[derive(Debug, Default)]
pub struct BackupReport {
    /// Absolute original path -> backup copy, in command-line order
    pub backups: IndexMap<PathBuf, PathBuf>,
    /// Files that could not be copied
    pub failures: Vec<(PathBuf, SysundoError)>,
    /// Record written for this run, if any
    pub manifest: Option<Manifest>,
    pub manifest_error: Option<SysundoError>,
}

/// Wraps a command with backups of the files it will touch
pub struct Interceptor<'a> {
    store: &'a BackupStore,
    policy: &'a Policy,
    messages: &'a Messages,
}

impl<'a> Interceptor<'a> {
    pub fn new(store: &'a BackupStore, policy: &'a Policy, messages: &'a Messages) -> Self {
        Self {
            store,
            policy,
            messages,
        }
    }

    /// Back up what `command` will touch (if it is watched), then run it
    pub fn run(&self, command: &str, args: &[String]) -> Result<(), SysundoError> {
        if selector::is_watched(command) {
            self.back_up(command, args);
        } else {
            debug!(command, "not a watched command, running without backup");
        }
        execute_command(command, args)
    }

    /// Copy every eligible affected file and record the batch.
    ///
    /// The manifest is only replaced when at least one copy succeeded.
    pub fn back_up(&self, command: &str, args: &[String]) -> BackupReport {
        let mut report = BackupReport::default();

        for path in selector::affected_paths(command, args) {
            if !selector::is_eligible(&path, self.policy) {
                debug!(path = %path.display(), "not eligible for backup");
                continue;
            }

            match self.store.backup(&path) {
                Ok(backup_path) => {
                    println!("{}", self.messages.get("backed_up", &[&path.display()]));
                    let original = PathResolver::absolute(&path).unwrap_or_else(|_| path.clone());
                    report.backups.insert(original, backup_path);
                }
                Err(e) => {
                    eprintln!(
                        "{}",
                        self.messages.get(
                            "backup_failed_warning",
                            &[&path.display(), &e.user_message(self.messages)]
                        )
                    );
                    report.failures.push((path, e));
                }
            }
        }

        if !report.backups.is_empty() {
            match self.store.write_manifest(&report.backups, command, args) {
                Ok(manifest) => report.manifest = Some(manifest),
                Err(e) => {
                    eprintln!(
                        "{}",
                        self.messages
                            .get("manifest_write_warning", &[&e.user_message(self.messages)])
                    );
                    report.manifest_error = Some(e);
                }
            }
        }

        report
    }
}

/// Run `command` with inherited stdio and wait for it.
///
/// # Errors
///
/// `Spawn` when the program cannot be started, `CommandFailed` or
/// `CommandTerminated` when it does not exit successfully.
pub fn execute_command(command: &str, args: &[String]) -> Result<(), SysundoError> {
    let status = Command::new(command)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|source| SysundoError::Spawn {
            command: command.to_string(),
            source,
        })?;

    if status.success() {
        return Ok(());
    }

    match status.code() {
        Some(code) => Err(SysundoError::CommandFailed {
            command: command.to_string(),
            code,
        }),
        None => Err(SysundoError::CommandTerminated {
            command: command.to_string(),
            signal: termination_signal(&status),
        }),
    }
}

#[cfg(unix)]
fn termination_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn termination_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        store: BackupStore,
        policy: Policy,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let store = BackupStore::open(dir.path().join("cache"));
            Self {
                dir,
                store,
                policy: Policy::default(),
            }
        }

        fn interceptor(&self) -> Interceptor<'_> {
            Interceptor::new(&self.store, &self.policy, Messages::english())
        }

        fn file(&self, name: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            fs::write(&path, content).unwrap();
            path
        }
    }

    fn arg(path: &std::path::Path) -> String {
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_back_up_eligible_files() {
        let fx = Fixture::new();
        let a = fx.file("a.txt", "alpha");
        let b = fx.file("b.md", "beta");

        let report = fx.interceptor().back_up("rm", &[arg(&a), arg(&b)]);

        assert_eq!(report.backups.len(), 2);
        assert!(report.failures.is_empty());
        let manifest = report.manifest.unwrap();
        assert_eq!(manifest.command, "rm");
        assert_eq!(manifest.files.len(), 2);
        assert_eq!(manifest.files[0].original_path, a);
        assert_eq!(
            fs::read_to_string(&manifest.files[0].backup_path).unwrap(),
            "alpha"
        );
        assert_eq!(fx.store.read_manifest().unwrap(), manifest);
    }

    #[test]
    fn test_back_up_one_entry_per_distinct_path() {
        let fx = Fixture::new();
        let a = fx.file("a.txt", "alpha");
        let dotted = fx.dir.path().join(".").join("a.txt");

        let report = fx
            .interceptor()
            .back_up("rm", &[arg(&a), arg(&dotted), arg(&a)]);

        let manifest = report.manifest.unwrap();
        assert_eq!(manifest.files.len(), 1);
        assert_eq!(manifest.files[0].original_path, a);
    }

    #[test]
    fn test_back_up_skips_ineligible() {
        let fx = Fixture::new();
        let bin = fx.file("a.bin", "raw");
        let dest = fx.dir.path().join("b");

        let report = fx.interceptor().back_up("cp", &[arg(&bin), arg(&dest)]);

        assert!(report.backups.is_empty());
        assert!(report.manifest.is_none());
        assert!(!fx.store.manifest_path().exists());
    }

    #[test]
    fn test_back_up_nothing_leaves_previous_manifest() {
        let fx = Fixture::new();
        let a = fx.file("a.txt", "alpha");
        fx.interceptor().back_up("rm", &[arg(&a)]);
        let before = fx.store.read_manifest().unwrap();

        let bin = fx.file("c.bin", "raw");
        fx.interceptor().back_up("rm", &[arg(&bin)]);

        assert_eq!(fx.store.read_manifest().unwrap(), before);
    }

    #[test]
    fn test_back_up_respects_policy() {
        let mut fx = Fixture::new();
        fx.policy = Policy {
            max_file_size: 3,
            included_extensions: [".txt".to_string()].into_iter().collect::<BTreeSet<_>>(),
            excluded_extensions: BTreeSet::new(),
        };
        let small = fx.file("small.txt", "abc");
        let big = fx.file("big.txt", "abcd");

        let report = fx.interceptor().back_up("rm", &[arg(&small), arg(&big)]);
        assert_eq!(report.backups.keys().collect::<Vec<_>>(), vec![&small]);
    }

    #[test]
    fn test_back_up_mv_keeps_destination() {
        let fx = Fixture::new();
        let a = fx.file("a.txt", "alpha");
        let b = fx.file("b.txt", "beta");

        let report = fx.interceptor().back_up("mv", &[arg(&a), arg(&b)]);
        assert_eq!(report.backups.keys().collect::<Vec<_>>(), vec![&a]);
    }

    #[test]
    fn test_back_up_failure_is_reported_not_fatal() {
        let fx = Fixture::new();
        let blocker = fx.file("blocker", "x");
        let store = BackupStore::open(blocker.join("cache"));
        let interceptor = Interceptor::new(&store, &fx.policy, Messages::english());
        let a = fx.file("a.txt", "alpha");

        let report = interceptor.back_up("rm", &[arg(&a)]);

        assert!(report.backups.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0].1, SysundoError::CopyFailed { .. }));
        assert!(report.manifest.is_none());
        assert!(report.manifest_error.is_none());
    }

    #[test]
    #[cfg(unix)]
    fn test_run_rm_backs_up_then_removes() {
        let fx = Fixture::new();
        let a = fx.file("a.txt", "alpha");

        fx.interceptor().run("rm", &[arg(&a)]).unwrap();

        assert!(!a.exists());
        let manifest = fx.store.read_manifest().unwrap();
        assert_eq!(manifest.files.len(), 1);
        assert_eq!(
            fs::read_to_string(&manifest.files[0].backup_path).unwrap(),
            "alpha"
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_run_executes_even_when_backup_fails() {
        let fx = Fixture::new();
        let blocker = fx.file("blocker", "x");
        let store = BackupStore::open(blocker.join("cache"));
        let a = fx.file("a.txt", "alpha");

        Interceptor::new(&store, &fx.policy, Messages::english())
            .run("rm", &[arg(&a)])
            .unwrap();
        assert!(!a.exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_run_unwatched_command_forwards_failure() {
        let fx = Fixture::new();
        let err = fx.interceptor().run("false", &[]).unwrap_err();
        assert!(matches!(err, SysundoError::CommandFailed { code: 1, .. }));
        assert!(!fx.store.manifest_path().exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_run_child_failure_is_returned() {
        let fx = Fixture::new();
        let a = fx.file("a.txt", "alpha");
        let missing = fx.dir.path().join("missing.txt");

        let err = fx
            .interceptor()
            .run("rm", &[arg(&a), arg(&missing)])
            .unwrap_err();

        assert!(matches!(err, SysundoError::CommandFailed { .. }));
        assert_eq!(fx.store.read_manifest().unwrap().files.len(), 1);
    }

    #[test]
    #[cfg(unix)]
    fn test_execute_command_exit_code() {
        let args = vec!["-c".to_string(), "exit 7".to_string()];
        let err = execute_command("sh", &args).unwrap_err();
        assert_eq!(err.exit_code(), 7);
    }

    #[test]
    fn test_execute_missing_program() {
        let err = execute_command("sysundo-no-such-program", &[]).unwrap_err();
        assert!(matches!(err, SysundoError::Spawn { .. }));
        assert_eq!(err.exit_code(), 127);
    }
}
