use std::path::{Path, PathBuf};

use super::blocks::{self, Block};
use crate::error::MergeError;
use crate::ir::HttpMethod;

/// What the matcher knows about one request file. Recomputed on every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceFileMeta {
    pub file_path: PathBuf,
    pub http_method: HttpMethod,
    /// Folder of the file relative to the workspace root; `None` at the root.
    pub display_tag: Option<String>,
    /// `meta.name`, or the file stem when the meta block has no name.
    pub display_name: String,
}

/// Read the matching inputs of a request file.
///
/// Returns `Ok(None)` for files that are not HTTP requests (folder and
/// collection settings, GraphQL requests).
pub fn read_file_meta(
    path: &Path,
    root: &Path,
    text: &str,
) -> Result<Option<WorkspaceFileMeta>, MergeError> {
    let blocks = blocks::scan(text)?;
    let Some(http_method) = blocks.iter().find_map(|b| HttpMethod::parse(&b.name)) else {
        return Ok(None);
    };

    let display_name = meta_name(&blocks, text)
        .or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
        })
        .unwrap_or_default();

    Ok(Some(WorkspaceFileMeta {
        file_path: path.to_path_buf(),
        http_method,
        display_tag: folder_tag(path, root),
        display_name,
    }))
}

fn meta_name(blocks: &[Block], text: &str) -> Option<String> {
    let meta = blocks.iter().find(|b| b.name == "meta")?;
    meta.entries(text)
        .find(|(key, _)| *key == "name")
        .map(|(_, value)| value.to_string())
        .filter(|name| !name.is_empty())
}

/// The parent folder path relative to `root`, `/`-separated.
fn folder_tag(path: &Path, root: &Path) -> Option<String> {
    let parent = path.parent()?.strip_prefix(root).ok()?;
    let parts: Vec<String> = parent
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
