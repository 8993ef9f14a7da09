use serde::Serialize;

/// One property of a body schema, flattened to a readable type label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDoc {
    pub name: String,
    pub description: Option<String>,
    pub type_desc: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<PropertyDoc>,
}

impl PropertyDoc {
    /// Number of properties in this subtree, this one included.
    pub fn count(&self) -> usize {
        1 + self.nested.iter().map(PropertyDoc::count).sum::<usize>()
    }
}
