pub mod components;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod ref_resolve;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod security;
pub mod spec;

use std::fs;
use std::path::Path;

use crate::error::SpecError;
use spec::SpecIndex;

/// Parse an OpenAPI document from YAML.
pub fn from_yaml(input: &str) -> Result<SpecIndex, SpecError> {
    let doc: serde_json::Value = serde_yaml_ng::from_str(input)?;
    SpecIndex::from_value(doc)
}

/// Parse an OpenAPI document from JSON.
pub fn from_json(input: &str) -> Result<SpecIndex, SpecError> {
    let doc: serde_json::Value = serde_json::from_str(input)?;
    SpecIndex::from_value(doc)
}

/// Read and parse a document from disk. A `.json` extension selects the JSON
/// parser, anything else is read as YAML.
pub fn load(path: &Path) -> Result<SpecIndex, SpecError> {
    let content = fs::read_to_string(path).map_err(|source| SpecError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => from_json(&content),
        _ => from_yaml(&content),
    }
}
