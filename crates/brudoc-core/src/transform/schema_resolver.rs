use indexmap::IndexMap;
use serde_json::Value;

use crate::ir::PropertyDoc;
use crate::parse::ref_resolve::{RefResolver, ref_tail};
use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef};

/// Label used for anything whose reference could not be followed.
pub const UNAVAILABLE: &str = "unavailable";

/// A schema position reduced to text: a type label, the description that
/// applies to it, and the properties nested under it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Described {
    pub label: String,
    pub description: Option<String>,
    pub nested: Vec<PropertyDoc>,
}

/// The shape of a request body's root schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyShape {
    pub label: String,
    pub properties: Vec<PropertyDoc>,
    pub required: Vec<String>,
    pub example: Option<Value>,
}

/// Flattens schemas into property trees.
///
/// References are expanded at most once per expansion path: the names of the
/// schemas currently being expanded are kept on a stack, and meeting one of
/// them again yields a terminal `"<Name> (recursive)"` label. The same schema
/// is still expanded in full at unrelated positions.
pub struct SchemaDescriber<'a> {
    resolver: RefResolver<'a>,
    expanding: Vec<String>,
    warnings: Vec<String>,
}

impl<'a> SchemaDescriber<'a> {
    pub fn new(resolver: RefResolver<'a>) -> Self {
        Self {
            resolver,
            expanding: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Warnings collected so far, drained and deduplicated.
    pub fn take_warnings(&mut self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for w in self.warnings.drain(..) {
            if !out.contains(&w) {
                out.push(w);
            }
        }
        out
    }

    /// Describe a schema position.
    pub fn describe(&mut self, schema_or_ref: &SchemaOrRef) -> Described {
        match schema_or_ref {
            SchemaOrRef::Ref { ref_path } => self.describe_ref(ref_path),
            SchemaOrRef::Schema(schema) => self.describe_schema(schema),
        }
    }

    /// Describe a request body's root schema. Objects and composed schemas
    /// yield their properties; arrays yield one synthetic `items` property.
    pub fn body(&mut self, schema_or_ref: &SchemaOrRef) -> BodyShape {
        match schema_or_ref {
            SchemaOrRef::Ref { ref_path } => match self.resolver.lookup_schema(ref_path) {
                Ok((name, schema)) => {
                    self.expanding.push(name.to_string());
                    let mut shape = self.body_of_schema(schema);
                    self.expanding.pop();
                    if schema.is_object() || !schema.all_of.is_empty() {
                        shape.label = name.to_string();
                    }
                    shape
                }
                Err(e) => {
                    self.warnings.push(e.to_string());
                    BodyShape {
                        label: UNAVAILABLE.to_string(),
                        ..BodyShape::default()
                    }
                }
            },
            SchemaOrRef::Schema(schema) => self.body_of_schema(schema),
        }
    }

    /// The example attached to a schema position, following a reference.
    pub fn schema_example(&self, schema_or_ref: &SchemaOrRef) -> Option<Value> {
        match schema_or_ref {
            SchemaOrRef::Ref { ref_path } => self
                .resolver
                .lookup_schema(ref_path)
                .ok()
                .and_then(|(_, schema)| schema.example.clone()),
            SchemaOrRef::Schema(schema) => schema.example.clone(),
        }
    }

    fn body_of_schema(&mut self, schema: &Schema) -> BodyShape {
        if schema.is_composed() || schema.is_object() {
            let (properties, required) = self.properties(schema);
            return BodyShape {
                label: self.describe_schema(schema).label,
                properties,
                required,
                example: schema.example.clone(),
            };
        }
        if let Some(items) = &schema.items {
            let item = self.describe(items);
            let label = decorate(format!("array of {}", item.label), schema);
            let synthetic = PropertyDoc {
                name: "items".to_string(),
                description: schema.description.clone().or(item.description),
                type_desc: item.label,
                required: false,
                nested: item.nested,
            };
            return BodyShape {
                label,
                properties: vec![synthetic],
                required: Vec::new(),
                example: schema.example.clone(),
            };
        }
        BodyShape {
            label: self.describe_schema(schema).label,
            properties: Vec::new(),
            required: Vec::new(),
            example: schema.example.clone(),
        }
    }

    fn describe_ref(&mut self, ref_path: &str) -> Described {
        let (name, schema) = match self.resolver.lookup_schema(ref_path) {
            Ok(found) => found,
            Err(e) => {
                self.warnings.push(e.to_string());
                return Described {
                    label: UNAVAILABLE.to_string(),
                    ..Described::default()
                };
            }
        };

        if self.expanding.iter().any(|n| n == name) {
            return Described {
                label: format!("{name} (recursive)"),
                description: schema.description.clone(),
                nested: Vec::new(),
            };
        }

        self.expanding.push(name.to_string());
        let inner = self.describe_schema(schema);
        self.expanding.pop();

        let label = if schema.is_object() || !schema.all_of.is_empty() {
            decorate(name.to_string(), schema)
        } else {
            inner.label
        };
        Described {
            label,
            description: inner.description,
            nested: inner.nested,
        }
    }

    fn describe_schema(&mut self, schema: &Schema) -> Described {
        let description = schema.description.clone();

        if !schema.all_of.is_empty() {
            // A lone allOf wrapper is the usual way to attach a description to a $ref.
            if schema.all_of.len() == 1 && schema.properties.is_empty() {
                let inner = self.describe(&schema.all_of[0]);
                return Described {
                    label: decorate(inner.label, schema),
                    description: description.or(inner.description),
                    nested: inner.nested,
                };
            }
            let (nested, _) = self.properties(schema);
            return Described {
                label: decorate("object".to_string(), schema),
                description,
                nested,
            };
        }

        if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
            let (prefix, branches) = if !schema.one_of.is_empty() {
                ("one of", &schema.one_of)
            } else {
                ("any of", &schema.any_of)
            };
            let labels: Vec<String> = branches.iter().map(|b| self.describe(b).label).collect();
            let (nested, _) = self.properties(schema);
            return Described {
                label: decorate(format!("{prefix}: {}", labels.join(" | ")), schema),
                description,
                nested,
            };
        }

        if !schema.enum_values.is_empty() {
            let base = schema
                .schema_type
                .map(|t| t.as_str())
                .unwrap_or_else(|| enum_base_type(&schema.enum_values));
            let values: Vec<String> = schema.enum_values.iter().map(enum_value_text).collect();
            return Described {
                label: decorate(format!("{base}, enum: {}", values.join(" | ")), schema),
                description,
                nested: Vec::new(),
            };
        }

        if let Some(items) = &schema.items {
            let item = self.describe(items);
            return Described {
                label: decorate(format!("array of {}", item.label), schema),
                description,
                nested: item.nested,
            };
        }

        if schema.is_object() {
            if schema.properties.is_empty() {
                if let Some(AdditionalProperties::Schema(value)) = &schema.additional_properties {
                    let value = self.describe(value);
                    return Described {
                        label: decorate(format!("map of {}", value.label), schema),
                        description,
                        nested: value.nested,
                    };
                }
            }
            let (nested, _) = self.properties(schema);
            return Described {
                label: decorate("object".to_string(), schema),
                description,
                nested,
            };
        }

        let base = match (schema.schema_type, schema.format.as_deref()) {
            (Some(t), Some(format)) => format!("{}, {format}", t.as_str()),
            (Some(t), None) => t.as_str().to_string(),
            (None, _) => "any".to_string(),
        };
        Described {
            label: decorate(base, schema),
            description,
            nested: Vec::new(),
        }
    }

    /// Flatten the properties of an object or composed schema.
    ///
    /// Composition branches come first (`allOf`, then `oneOf`, then `anyOf`,
    /// each in branch order), then the schema's own properties. A name seen
    /// twice keeps its first occurrence. The required set is the schema's own
    /// list plus the lists of its `allOf` branches.
    pub fn properties(&mut self, schema: &Schema) -> (Vec<PropertyDoc>, Vec<String>) {
        let mut merged: IndexMap<String, PropertyDoc> = IndexMap::new();
        let mut required: Vec<String> = Vec::new();

        let branches = schema
            .all_of
            .iter()
            .map(|b| (b, true))
            .chain(schema.one_of.iter().map(|b| (b, false)))
            .chain(schema.any_of.iter().map(|b| (b, false)));

        for (branch, all_of) in branches {
            let (props, branch_required) = self.branch_properties(branch);
            for prop in props {
                merged.entry(prop.name.clone()).or_insert(prop);
            }
            if all_of {
                for name in branch_required {
                    if !required.contains(&name) {
                        required.push(name);
                    }
                }
            }
        }

        for name in &schema.required {
            if !required.contains(name) {
                required.push(name.clone());
            }
        }

        for (name, prop) in &schema.properties {
            if merged.contains_key(name) {
                continue;
            }
            let described = self.describe(prop);
            merged.insert(
                name.clone(),
                PropertyDoc {
                    name: name.clone(),
                    description: described.description,
                    type_desc: described.label,
                    required: false,
                    nested: described.nested,
                },
            );
        }

        let properties = merged
            .into_values()
            .map(|mut prop| {
                prop.required = required.contains(&prop.name);
                prop
            })
            .collect();
        (properties, required)
    }

    fn branch_properties(&mut self, branch: &SchemaOrRef) -> (Vec<PropertyDoc>, Vec<String>) {
        match branch {
            SchemaOrRef::Schema(schema) => self.properties(schema),
            SchemaOrRef::Ref { ref_path } => match self.resolver.lookup_schema(ref_path) {
                Ok((name, schema)) => {
                    if self.expanding.iter().any(|n| n == name) {
                        return (Vec::new(), Vec::new());
                    }
                    self.expanding.push(name.to_string());
                    let out = self.properties(schema);
                    self.expanding.pop();
                    out
                }
                Err(e) => {
                    self.warnings.push(e.to_string());
                    let name = ref_tail(ref_path).to_string();
                    let placeholder = PropertyDoc {
                        name,
                        description: None,
                        type_desc: UNAVAILABLE.to_string(),
                        required: false,
                        nested: Vec::new(),
                    };
                    (vec![placeholder], Vec::new())
                }
            },
        }
    }
}

/// Append the flags that change how a value is used.
fn decorate(mut label: String, schema: &Schema) -> String {
    if schema.nullable == Some(true) {
        label.push_str(", nullable");
    }
    if schema.read_only == Some(true) {
        label.push_str(", read-only");
    }
    if schema.write_only == Some(true) {
        label.push_str(", write-only");
    }
    if schema.deprecated == Some(true) {
        label.push_str(", deprecated");
    }
    label
}

fn enum_base_type(values: &[Value]) -> &'static str {
    match values.first() {
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => "integer",
        Some(Value::Number(_)) => "number",
        Some(Value::Bool(_)) => "boolean",
        _ => "string",
    }
}

fn enum_value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
