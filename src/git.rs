//! Source revision discovery
//!
//! Stacks are tagged with the repository name and the short commit hash of the
//! working copy the configuration lives in. Both are found by walking up from
//! the configuration file to the nearest `.git` directory and asking the
//! system `git` for `HEAD`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use crate::error::{Error, Result};

/// Length of the abbreviated revision used in tags and image urls
pub const SHORT_REVISION_LEN: usize = 7;

/// Walk up from `from` until a directory containing `.git` is found.
///
/// `from` may be a file or a directory. Fails once the filesystem root has
/// been checked.
pub fn find_git_directory(from: &Path) -> Result<PathBuf> {
    debug!("Searching for git directory in {}", from.display());
    let metadata = fs::metadata(from).map_err(|e| Error::GitRevision {
        path: from.display().to_string(),
        message: e.to_string(),
    })?;

    let mut dir = if metadata.is_dir() {
        from.to_path_buf()
    } else {
        from.parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    };

    loop {
        let git_path = dir.join(".git");
        if git_path.is_dir() {
            return Ok(git_path);
        }
        if !dir.pop() {
            return Err(Error::GitRevision {
                path: from.display().to_string(),
                message: "Unable to find git repo".to_string(),
            });
        }
    }
}

/// Resolve the abbreviated `HEAD` revision of the repository containing `from`.
pub fn find_revision(from: &Path) -> Result<String> {
    let git_dir = find_git_directory(from)?;
    debug!("Loading revision from git directory '{}'", git_dir.display());

    let output = Command::new("git")
        .arg("--git-dir")
        .arg(&git_dir)
        .args(["rev-parse", "HEAD"])
        .output()
        .map_err(|e| Error::GitRevision {
            path: git_dir.display().to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitRevision {
            path: git_dir.display().to_string(),
            message: stderr.trim().to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(short_revision(stdout.trim()))
}

/// Name of the repository owning a `.git` directory: its parent's basename.
pub fn repository_name(git_dir: &Path) -> Option<String> {
    git_dir
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
}

fn short_revision(hash: &str) -> String {
    hash.chars().take(SHORT_REVISION_LEN).collect()
}
