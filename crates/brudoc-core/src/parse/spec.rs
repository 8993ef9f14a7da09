use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::components::Components;
use super::security::SecurityRequirement;
use crate::error::SpecError;
use crate::ir::HttpMethod;

/// Identifies one operation: a path template plus an HTTP method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationKey {
    pub path: String,
    pub method: HttpMethod,
}

/// An operation node kept untyped until extraction, so that a node with an
/// unexpected shape only affects its own operation.
#[derive(Debug, Clone)]
pub struct RawOperation {
    pub node: Value,
    /// The path item's shared `parameters` list, if any.
    pub path_parameters: Option<Value>,
}

/// The loaded document: an index of operations in document order plus the
/// shared definitions needed to resolve references.
#[derive(Debug, Clone)]
pub struct SpecIndex {
    pub openapi: String,
    pub title: Option<String>,
    pub operations: IndexMap<OperationKey, RawOperation>,
    pub components: Components,
    pub security: Option<Vec<SecurityRequirement>>,
}

impl SpecIndex {
    /// Build the index from a parsed document tree.
    pub fn from_value(doc: Value) -> Result<Self, SpecError> {
        let Value::Object(root) = doc else {
            return Err(SpecError::Malformed {
                location: "<root>".to_string(),
                reason: "document is not a mapping".to_string(),
            });
        };

        let openapi = match root.get("openapi") {
            Some(Value::String(v)) => v.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(_) => {
                return Err(SpecError::Malformed {
                    location: "openapi".to_string(),
                    reason: "version is not a string".to_string(),
                });
            }
            None => return Err(SpecError::MissingField("openapi".to_string())),
        };
        if !openapi.starts_with("3.0") {
            return Err(SpecError::UnsupportedVersion(openapi));
        }

        let paths = match root.get("paths") {
            Some(Value::Object(paths)) => paths,
            Some(_) => {
                return Err(SpecError::Malformed {
                    location: "paths".to_string(),
                    reason: "expected a mapping of path templates".to_string(),
                });
            }
            None => return Err(SpecError::MissingField("paths".to_string())),
        };

        let operations = index_operations(paths)?;

        let components = root
            .get("components")
            .map(Components::from_value)
            .unwrap_or_default();

        let security = match root.get("security") {
            Some(node) => Some(serde_json::from_value(node.clone()).map_err(|e| {
                SpecError::Malformed {
                    location: "security".to_string(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        let title = root
            .get("info")
            .and_then(|info| info.get("title"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            openapi,
            title,
            operations,
            components,
            security,
        })
    }
}

fn index_operations(
    paths: &Map<String, Value>,
) -> Result<IndexMap<OperationKey, RawOperation>, SpecError> {
    let mut operations = IndexMap::new();

    for (path, item) in paths {
        let Value::Object(item) = item else {
            return Err(SpecError::Malformed {
                location: format!("paths.{path}"),
                reason: "path item is not a mapping".to_string(),
            });
        };
        let path_parameters = item.get("parameters").cloned();

        for (key, node) in item {
            // summary, description, parameters, servers, $ref and x-* are not operations
            let Some(method) = HttpMethod::parse(key) else {
                continue;
            };
            if !node.is_object() {
                return Err(SpecError::Malformed {
                    location: format!("paths.{path}.{key}"),
                    reason: "operation is not a mapping".to_string(),
                });
            }
            operations.insert(
                OperationKey {
                    path: path.clone(),
                    method,
                },
                RawOperation {
                    node: node.clone(),
                    path_parameters: path_parameters.clone(),
                },
            );
        }
    }

    Ok(operations)
}
