use std::collections::HashSet;
use std::fmt;

use log::debug;

use crate::bru::WorkspaceFileMeta;
use crate::config::MatchConfig;
use crate::ir::OperationDoc;
use crate::transform::name_normalizer::names_overlap;

/// A request file and the operation chosen for it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub file: WorkspaceFileMeta,
    pub outcome: MatchOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// `op_index` points into the extracted operation list.
    Matched { op_index: usize, score: u32 },
    Unmatched(UnmatchedReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedReason {
    /// No readable operation shares the file's method.
    NoSameMethod,
    BelowThreshold { best_score: u32, min_score: u32 },
    /// Every candidate went to a better scoring file in the same folder.
    Taken { best_score: u32 },
}

impl fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedReason::NoSameMethod => f.write_str("no operation with this method"),
            UnmatchedReason::BelowThreshold {
                best_score,
                min_score,
            } => write!(f, "best score {best_score} is below {min_score}"),
            UnmatchedReason::Taken { best_score } => write!(
                f,
                "best candidate (score {best_score}) already documents another file in this folder"
            ),
        }
    }
}

/// Score a file against an operation. `None` when the methods differ.
pub fn score(file: &WorkspaceFileMeta, doc: &OperationDoc, config: &MatchConfig) -> Option<u32> {
    if file.http_method != doc.method {
        return None;
    }
    let mut score = 0;
    if let Some(tag) = &file.display_tag {
        if doc.tags.iter().any(|t| t == tag) {
            score += config.tag_weight;
        }
    }
    if let Some(summary) = &doc.summary {
        if names_overlap(&file.display_name, summary) {
            score += config.name_weight;
        }
    }
    Some(score)
}

/// Pair files with operations.
///
/// Candidate pairs (same method, score at least `min_score`) are taken
/// greedily by descending score, then file path, then operation order. A
/// file gets at most one operation and an operation documents at most one
/// file per folder. Results come back in the order of `files`.
pub fn match_files(
    files: &[WorkspaceFileMeta],
    docs: &[OperationDoc],
    config: &MatchConfig,
) -> Vec<MatchResult> {
    let mut candidates: Vec<(u32, usize, usize)> = Vec::new();
    let mut best: Vec<Option<u32>> = vec![None; files.len()];

    for (fi, file) in files.iter().enumerate() {
        for (oi, doc) in docs.iter().enumerate() {
            if !doc.readable {
                continue;
            }
            let Some(s) = score(file, doc, config) else {
                continue;
            };
            debug!("score {} for {} -> {}", s, file.file_path.display(), doc.label());
            best[fi] = best[fi].max(Some(s));
            if s >= config.min_score {
                candidates.push((s, fi, oi));
            }
        }
    }

    candidates.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| files[a.1].file_path.cmp(&files[b.1].file_path))
            .then(a.2.cmp(&b.2))
    });

    let mut assigned: Vec<Option<(usize, u32)>> = vec![None; files.len()];
    let mut taken: HashSet<(usize, Option<&str>)> = HashSet::new();
    for (s, fi, oi) in candidates {
        if assigned[fi].is_some() {
            continue;
        }
        if taken.insert((oi, files[fi].display_tag.as_deref())) {
            assigned[fi] = Some((oi, s));
        }
    }

    files
        .iter()
        .zip(assigned)
        .zip(best)
        .map(|((file, assigned), best)| {
            let outcome = match (assigned, best) {
                (Some((op_index, score)), _) => MatchOutcome::Matched { op_index, score },
                (None, None) => MatchOutcome::Unmatched(UnmatchedReason::NoSameMethod),
                (None, Some(best_score)) if best_score < config.min_score => {
                    MatchOutcome::Unmatched(UnmatchedReason::BelowThreshold {
                        best_score,
                        min_score: config.min_score,
                    })
                }
                (None, Some(best_score)) => {
                    MatchOutcome::Unmatched(UnmatchedReason::Taken { best_score })
                }
            };
            MatchResult {
                file: file.clone(),
                outcome,
            }
        })
        .collect()
}
