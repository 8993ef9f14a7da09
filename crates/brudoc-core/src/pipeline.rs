//! The `doc` and `revert` runs over a workspace.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::backup::{self, BackupOutcome, RevertOutcome};
use crate::bru::{WorkspaceFileMeta, read_file_meta};
use crate::config::BrudocConfig;
use crate::error::{MergeError, RunError};
use crate::files;
use crate::ir::OperationDoc;
use crate::matcher::{MatchOutcome, UnmatchedReason, match_files};
use crate::merge::merge_docs;
use crate::parse::spec::SpecIndex;
use crate::render::DocRenderer;
use crate::transform::{ExtractOptions, extract};

/// Outcome of a `doc` run. File lists are in path order.
#[derive(Debug, Default)]
pub struct DocReport {
    pub updated: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub unmatched: Vec<(PathBuf, UnmatchedReason)>,
    /// Request files without an HTTP method block.
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, MergeError)>,
    /// `(operation label, warning)` for every recovered extraction fault.
    pub warnings: Vec<(String, String)>,
}

/// Outcome of a `revert` run.
#[derive(Debug, Default)]
pub struct RevertReport {
    pub reverted: Vec<PathBuf>,
    /// Backups whose request file no longer exists.
    pub orphaned: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, MergeError)>,
}

enum FileOutcome {
    Updated(BackupOutcome),
    Unchanged,
}

/// Document every request file in `workspace` that matches an operation.
///
/// Only a workspace that is not a directory or a template that fails to
/// compile stops the run; per-file problems land in the report.
pub fn run_doc(
    spec: &SpecIndex,
    workspace: &Path,
    config: &BrudocConfig,
) -> Result<DocReport, RunError> {
    ensure_dir(workspace)?;
    let mut report = DocReport::default();

    let options = ExtractOptions {
        examples: config.render.examples,
    };
    let docs = extract(spec, &options);
    for doc in &docs {
        for w in &doc.warnings {
            report.warnings.push((doc.label(), w.clone()));
        }
    }
    let renderer = DocRenderer::new(config.render)?;

    let mut metas: Vec<WorkspaceFileMeta> = Vec::new();
    let mut texts: Vec<String> = Vec::new();
    for path in files::request_files(workspace) {
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(source) => {
                warn!("cannot read {}: {}", path.display(), source);
                report.failed.push((path.clone(), MergeError::Io { path, source }));
                continue;
            }
        };
        match read_file_meta(&path, workspace, &text) {
            Ok(Some(meta)) => {
                metas.push(meta);
                texts.push(text);
            }
            Ok(None) => report.skipped.push(path),
            Err(err) => {
                warn!("{}: {}", path.display(), err);
                report.failed.push((path, err));
            }
        }
    }

    for (result, text) in match_files(&metas, &docs, &config.matching)
        .into_iter()
        .zip(&texts)
    {
        let path = result.file.file_path;
        let op_index = match result.outcome {
            MatchOutcome::Matched { op_index, score } => {
                info!("{} <- {} (score {})", path.display(), docs[op_index].label(), score);
                op_index
            }
            MatchOutcome::Unmatched(reason) => {
                info!("{} left untouched: {}", path.display(), reason);
                report.unmatched.push((path, reason));
                continue;
            }
        };
        match document_file(&path, text, &docs[op_index], &renderer, config) {
            Ok(FileOutcome::Updated(backup)) => {
                info!("updated {} (backup {:?})", path.display(), backup);
                report.updated.push(path);
            }
            Ok(FileOutcome::Unchanged) => report.unchanged.push(path),
            Err(err) => {
                warn!("{}: {}", path.display(), err);
                report.failed.push((path, err));
            }
        }
    }

    report.failed.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(report)
}

fn document_file(
    path: &Path,
    text: &str,
    doc: &OperationDoc,
    renderer: &DocRenderer,
    config: &BrudocConfig,
) -> Result<FileOutcome, MergeError> {
    let rendered = renderer.render(doc)?;
    let merged = merge_docs(text, &rendered, config.merge.policy)?;
    if merged == text {
        return Ok(FileOutcome::Unchanged);
    }
    let backup = backup::ensure_backup(path, text, config.backup.policy)?;
    backup::write_atomic(path, merged.as_bytes())?;
    Ok(FileOutcome::Updated(backup))
}

/// Restore every backed-up request file in `workspace`.
pub fn run_revert(workspace: &Path) -> Result<RevertReport, RunError> {
    ensure_dir(workspace)?;
    let mut report = RevertReport::default();
    for bak in files::backup_files(workspace) {
        match backup::restore(&bak) {
            Ok(RevertOutcome::Reverted { request }) => {
                info!("reverted {}", request.display());
                report.reverted.push(request);
            }
            Ok(RevertOutcome::Orphaned) => {
                warn!("no request file for backup {}", bak.display());
                report.orphaned.push(bak);
            }
            Err(err) => {
                warn!("{}: {}", bak.display(), err);
                report.failed.push((bak, err));
            }
        }
    }
    Ok(report)
}

fn ensure_dir(workspace: &Path) -> Result<(), RunError> {
    if workspace.is_dir() {
        Ok(())
    } else {
        Err(RunError::NotADirectory(workspace.to_path_buf()))
    }
}
