use indexmap::IndexMap;
use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::media_type::ExampleOrRef;
use super::parameter::ParameterOrRef;
use super::request_body::RequestBodyOrRef;
use super::response::ResponseOrRef;
use super::schema::SchemaOrRef;

/// Components object holding reusable definitions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Components {
    pub schemas: IndexMap<String, SchemaOrRef>,
    pub responses: IndexMap<String, ResponseOrRef>,
    pub parameters: IndexMap<String, ParameterOrRef>,
    pub request_bodies: IndexMap<String, RequestBodyOrRef>,
    pub examples: IndexMap<String, ExampleOrRef>,
}

impl Components {
    /// Build the components table from the raw `components` node.
    ///
    /// Each entry is read on its own. An entry that does not have the expected
    /// shape is dropped with a warning; operations referring to it later see an
    /// unresolved reference instead of the whole document being rejected.
    pub fn from_value(node: &Value) -> Self {
        Self {
            schemas: section(node, "schemas"),
            responses: section(node, "responses"),
            parameters: section(node, "parameters"),
            request_bodies: section(node, "requestBodies"),
            examples: section(node, "examples"),
        }
    }
}

fn section<T: DeserializeOwned>(node: &Value, key: &str) -> IndexMap<String, T> {
    let Some(entries) = node.get(key).and_then(Value::as_object) else {
        return IndexMap::new();
    };
    let mut out = IndexMap::with_capacity(entries.len());
    for (name, entry) in entries {
        match serde_json::from_value::<T>(entry.clone()) {
            Ok(parsed) => {
                out.insert(name.clone(), parsed);
            }
            Err(e) => warn!("skipping components.{key}.{name}: {e}"),
        }
    }
    out
}
