//! File selection for watched commands
//!
//! Works out which files `rm`, `mv` and `cp` will touch and which of those
//! the backup policy accepts.
//!
//! `mv` and `cp` treat the last argument as the destination and every other
//! argument as a source. Flags such as `-r` or `-v` are not recognized; they
//! end up as candidates that simply do not exist on disk and get dropped.

use crate::config::Policy;
use crate::paths::PathResolver;
use glob::MatchOptions;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Commands whose files are backed up before they run
pub const WATCHED_COMMANDS: [&str; 3] = ["rm", "mv", "cp"];

/// Shell-like matching: `*` stops at `/` and never matches a leading dot
const SHELL_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Whether `command` gets backups
pub fn is_watched(command: &str) -> bool {
    WATCHED_COMMANDS.contains(&command)
}

/// Existing regular files named by the arguments of `command`.
///
/// Wildcard arguments are expanded; the rest pass through literally, as
/// does a pattern that matches nothing.
/// Missing paths and directories are dropped, duplicates (by absolute path)
/// keep their first position. An empty result is normal.
pub fn affected_paths(command: &str, args: &[String]) -> Vec<PathBuf> {
    let candidates: &[String] = match command {
        "rm" => args,
        "mv" | "cp" => args.split_last().map(|(_, sources)| sources).unwrap_or(&[]),
        _ => &[],
    };

    let mut seen = HashSet::new();
    candidates
        .iter()
        .flat_map(|candidate| expand(candidate))
        .filter(|path| is_existing_file(path))
        .filter(|path| {
            let key = PathResolver::absolute(path).unwrap_or_else(|_| path.clone());
            seen.insert(key)
        })
        .collect()
}

/// Whether `path` passes the size and extension policy
pub fn is_eligible(path: &Path, policy: &Policy) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    if metadata.is_dir() {
        return false;
    }
    if metadata.len() > policy.max_file_size {
        debug!(path = %path.display(), size = metadata.len(), "over size limit");
        return false;
    }

    let extension = PathResolver::extension_of(path);
    if policy.excluded_extensions.contains(&extension) {
        return false;
    }
    policy.included_extensions.contains(&extension)
}

fn has_wildcard(candidate: &str) -> bool {
    candidate.contains(['*', '?', '['])
}

fn expand(candidate: &str) -> Vec<PathBuf> {
    if !has_wildcard(candidate) {
        return vec![PathBuf::from(candidate)];
    }

    match glob::glob_with(candidate, SHELL_MATCH) {
        Ok(paths) => {
            let matches: Vec<PathBuf> = paths.filter_map(Result::ok).collect();
            if matches.is_empty() {
                // the shell hands an unmatched pattern to the command verbatim
                vec![PathBuf::from(candidate)]
            } else {
                matches
            }
        }
        Err(e) => {
            debug!(pattern = candidate, error = %e, "invalid pattern, using it literally");
            vec![PathBuf::from(candidate)]
        }
    }
}

fn is_existing_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| !m.is_dir()).unwrap_or(false)
}
