//! Backups and atomic writes for request files.
//!
//! A backup lives next to its request file as `<stem>.bak`. Every write goes
//! through a temporary file in the same directory that is then renamed over
//! the target, so an interrupted run leaves either the old or the new bytes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::bru::REQUEST_EXTENSION;
use crate::config::BackupPolicy;
use crate::error::MergeError;

pub const BACKUP_EXTENSION: &str = "bak";

/// `widgets/Get Widget.bru` -> `widgets/Get Widget.bak`
pub fn backup_path(request: &Path) -> PathBuf {
    request.with_extension(BACKUP_EXTENSION)
}

/// `widgets/Get Widget.bak` -> `widgets/Get Widget.bru`
pub fn request_path(backup: &Path) -> PathBuf {
    backup.with_extension(REQUEST_EXTENSION)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupOutcome {
    Created,
    /// A backup from an earlier run was left as is.
    Preserved,
    Refreshed,
}

/// Make sure a backup of `request` exists before it is modified.
/// `current` is the file's present content.
pub fn ensure_backup(
    request: &Path,
    current: &str,
    policy: BackupPolicy,
) -> Result<BackupOutcome, MergeError> {
    let backup = backup_path(request);
    let outcome = match (backup.exists(), policy) {
        (true, BackupPolicy::KeepOriginal) => return Ok(BackupOutcome::Preserved),
        (true, BackupPolicy::Refresh) => BackupOutcome::Refreshed,
        (false, _) => BackupOutcome::Created,
    };
    write_atomic(&backup, current.as_bytes())?;
    Ok(outcome)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertOutcome {
    /// The request file was restored and the backup removed.
    Reverted { request: PathBuf },
    /// The backup has no request file next to it; it was left in place.
    Orphaned,
}

/// Restore the request file that `backup` belongs to and consume the backup.
pub fn restore(backup: &Path) -> Result<RevertOutcome, MergeError> {
    let request = request_path(backup);
    if !request.is_file() {
        return Ok(RevertOutcome::Orphaned);
    }
    let content = fs::read(backup).map_err(|source| io_error(backup, source))?;
    write_atomic(&request, &content)?;
    fs::remove_file(backup).map_err(|source| io_error(backup, source))?;
    Ok(RevertOutcome::Reverted { request })
}

/// Replace `path` with `contents` via a temporary sibling and a rename.
/// Permissions of an existing target are carried over.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), MergeError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|source| io_error(path, source))?;
    tmp.write_all(contents)
        .map_err(|source| io_error(path, source))?;
    tmp.as_file()
        .sync_all()
        .map_err(|source| io_error(path, source))?;
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(|source| io_error(path, source))?;
    }
    tmp.persist(path).map_err(|source| MergeError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> MergeError {
    MergeError::Io {
        path: path.to_path_buf(),
        source,
    }
}
