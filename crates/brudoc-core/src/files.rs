use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

use crate::backup::BACKUP_EXTENSION;
use crate::bru::REQUEST_EXTENSION;

/// Request files under `root`, sorted by path.
pub fn request_files(root: &Path) -> Vec<PathBuf> {
    files_with_extension(root, REQUEST_EXTENSION)
}

/// Backup files under `root`, sorted by path.
pub fn backup_files(root: &Path) -> Vec<PathBuf> {
    files_with_extension(root, BACKUP_EXTENSION)
}

fn files_with_extension(root: &Path, extension: &str) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry: {err}");
                continue;
            }
        };
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == extension) {
            found.push(path.to_path_buf());
        }
    }
    found.sort();
    found
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn finds_files_recursively_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("widgets/nested")).unwrap();
        fs::write(root.join("widgets/b.bru"), "").unwrap();
        fs::write(root.join("widgets/a.bru"), "").unwrap();
        fs::write(root.join("widgets/a.bak"), "").unwrap();
        fs::write(root.join("widgets/nested/c.bru"), "").unwrap();
        fs::write(root.join("collection.json"), "{}").unwrap();

        let requests = request_files(root);
        assert_eq!(
            requests,
            vec![
                root.join("widgets/a.bru"),
                root.join("widgets/b.bru"),
                root.join("widgets/nested/c.bru"),
            ]
        );
        assert_eq!(backup_files(root), vec![root.join("widgets/a.bak")]);
    }
}
