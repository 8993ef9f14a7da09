use indexmap::IndexMap;
use serde_json::Value;

use crate::config::ExampleFormat;
use crate::parse::media_type::{Example, ExampleOrRef};
use crate::parse::ref_resolve::RefResolver;

/// Serialize an example value to readable text.
///
/// Strings are printed bare; structured values are pretty printed with their
/// keys in document order.
pub fn example_text(value: &Value, format: ExampleFormat) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null | Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(_) | Value::Object(_) => match format {
            ExampleFormat::Json => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            ExampleFormat::Yaml => serde_yaml_ng::to_string(value)
                .map(|s| s.trim_end().to_string())
                .unwrap_or_else(|_| value.to_string()),
        },
    }
}

/// Pick the example to show: the inline `example`, else the first entry of
/// `examples`. A reference that cannot be followed is reported in `warnings`.
pub fn first_example(
    example: Option<&Value>,
    examples: &IndexMap<String, ExampleOrRef>,
    resolver: &RefResolver<'_>,
    warnings: &mut Vec<String>,
) -> Option<Value> {
    if let Some(value) = example {
        return Some(value.clone());
    }
    let (_, first) = examples.first()?;
    match first {
        ExampleOrRef::Example(e) => example_value(e),
        ExampleOrRef::Ref { ref_path } => match resolver.lookup_example(ref_path) {
            Ok(e) => example_value(e),
            Err(err) => {
                warnings.push(err.to_string());
                None
            }
        },
    }
}

fn example_value(example: &Example) -> Option<Value> {
    example.value.clone().or_else(|| {
        example
            .external_value
            .as_ref()
            .map(|url| Value::String(format!("see {url}")))
    })
}
