use std::path::PathBuf;

use thiserror::Error;

/// The OpenAPI document cannot be used at all. Fatal for a `doc` run.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unsupported OpenAPI version: {0} (only 3.0.x is supported)")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("malformed document at {location}: {reason}")]
    Malformed { location: String, reason: String },
}

/// A `$ref` could not be followed. Recovered per operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unresolved reference: {0}")]
    UnresolvedRef(String),

    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// A single request file could not be merged, backed up or restored.
/// Recorded in the run report; the remaining files are still processed.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("block `{block}` opened at line {line} is never closed")]
    UnbalancedBlock { block: String, line: usize },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
    },

    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },
}

/// A `doc` or `revert` run cannot start.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error("workspace {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error(transparent)]
    Render(#[from] RenderError),
}
