use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::Value;

use crate::config::ExampleFormat;
use crate::ir::{BodyDoc, Documented, OperationDoc, ParamDoc, ResponseDoc};
use crate::parse::operation::Operation;
use crate::parse::parameter::{Parameter, ParameterOrRef};
use crate::parse::ref_resolve::{RefResolver, ref_tail};
use crate::parse::request_body::{RequestBody, RequestBodyOrRef};
use crate::parse::response::ResponseOrRef;
use crate::parse::security::SecurityRequirement;
use crate::parse::spec::{OperationKey, RawOperation, SpecIndex};

use super::example::{example_text, first_example};
use super::schema_resolver::{SchemaDescriber, UNAVAILABLE};

/// Recorded for operations the default weights can never match.
pub const MISSING_TAGS_OR_SUMMARY: &str = "missing tags or summary";

/// Options controlling how records are extracted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    pub examples: ExampleFormat,
}

/// Extract one `OperationDoc` per operation, in document order.
///
/// Faults inside one operation are recorded as warnings on that record and
/// logged; they never stop extraction of the others.
pub fn extract(spec: &SpecIndex, options: &ExtractOptions) -> Vec<OperationDoc> {
    let resolver = RefResolver::new(&spec.components);
    spec.operations
        .iter()
        .map(|(key, raw)| {
            let doc = OperationExtractor::new(spec, resolver, options).run(key, raw);
            for w in &doc.warnings {
                warn!("{}: {}", doc.label(), w);
            }
            debug!(
                "extracted {} ({} parameters, {} responses)",
                doc.label(),
                doc.parameters.len(),
                doc.responses.len()
            );
            doc
        })
        .collect()
}

struct OperationExtractor<'a> {
    spec: &'a SpecIndex,
    resolver: RefResolver<'a>,
    describer: SchemaDescriber<'a>,
    options: &'a ExtractOptions,
    warnings: Vec<String>,
}

impl<'a> OperationExtractor<'a> {
    fn new(spec: &'a SpecIndex, resolver: RefResolver<'a>, options: &'a ExtractOptions) -> Self {
        Self {
            spec,
            resolver,
            describer: SchemaDescriber::new(resolver),
            options,
            warnings: Vec::new(),
        }
    }

    fn run(mut self, key: &OperationKey, raw: &RawOperation) -> OperationDoc {
        let mut doc = OperationDoc::new(&key.path, key.method);

        let op: Operation = match serde_json::from_value(raw.node.clone()) {
            Ok(op) => op,
            Err(e) => {
                doc.readable = false;
                doc.warnings
                    .push(format!("operation could not be read: {e}"));
                return doc;
            }
        };

        let path_params: &[Value] = match &raw.path_parameters {
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.warnings
                    .push("path-level parameters are not a list".to_string());
                &[]
            }
            None => &[],
        };

        doc.summary = trimmed(op.summary.as_deref());
        doc.description = trimmed(op.description.as_deref());
        doc.tags = op.tags.clone();
        if doc.tags.is_empty() || doc.summary.is_none() {
            self.warnings.push(MISSING_TAGS_OR_SUMMARY.to_string());
        }
        doc.security = render_security(op.security.as_ref().or(self.spec.security.as_ref()));
        doc.parameters = self.parameters(path_params, &op.parameters);
        doc.request_body = op.request_body.as_ref().map(|b| self.request_body(b));
        doc.responses = op
            .responses
            .iter()
            .map(|(code, resp)| self.response(code, resp))
            .collect();

        let mut warnings = std::mem::take(&mut self.warnings);
        warnings.extend(self.describer.take_warnings());
        for w in warnings {
            if !doc.warnings.contains(&w) {
                doc.warnings.push(w);
            }
        }
        doc
    }

    /// Path-level parameters first, then operation-level ones. An operation
    /// parameter with the same name and location replaces the path-level one
    /// in place.
    fn parameters(&mut self, path_params: &[Value], op_params: &[Value]) -> Vec<Documented<ParamDoc>> {
        let mut merged: IndexMap<(String, &'static str), Documented<ParamDoc>> = IndexMap::new();
        for (index, node) in path_params.iter().chain(op_params).enumerate() {
            let entry = match serde_json::from_value::<ParameterOrRef>(node.clone()) {
                Ok(ParameterOrRef::Parameter(p)) => Documented::Available(self.parameter(&p)),
                Ok(ParameterOrRef::Ref { ref_path }) => match self.resolver.lookup_parameter(&ref_path) {
                    Ok(p) => Documented::Available(self.parameter(p)),
                    Err(e) => {
                        self.warnings.push(e.to_string());
                        Documented::Unavailable {
                            reference: ref_path,
                        }
                    }
                },
                Err(e) => {
                    let name = node
                        .get("name")
                        .and_then(Value::as_str)
                        .map_or_else(|| format!("#{}", index + 1), str::to_string);
                    self.warnings
                        .push(format!("parameter {name} could not be read: {e}"));
                    Documented::Unavailable { reference: name }
                }
            };
            let key = match &entry {
                Documented::Available(p) => (p.name.clone(), p.location.as_str()),
                Documented::Unavailable { reference } => (reference.clone(), "$ref"),
            };
            merged.insert(key, entry);
        }
        merged.into_values().collect()
    }

    fn parameter(&mut self, param: &Parameter) -> ParamDoc {
        let described = param.schema.as_ref().map(|s| self.describer.describe(s));
        let example = first_example(
            param.example.as_ref(),
            &param.examples,
            &self.resolver,
            &mut self.warnings,
        )
        .or_else(|| {
            param
                .schema
                .as_ref()
                .and_then(|s| self.describer.schema_example(s))
        });

        ParamDoc {
            name: param.name.clone(),
            location: param.location,
            required: param.required,
            description: trimmed(param.description.as_deref())
                .or_else(|| described.as_ref().and_then(|d| d.description.clone())),
            type_desc: described.map(|d| d.label),
            example: example.map(|v| example_text(&v, self.options.examples)),
        }
    }

    fn request_body(&mut self, node: &Value) -> Documented<BodyDoc> {
        match serde_json::from_value::<RequestBodyOrRef>(node.clone()) {
            Ok(RequestBodyOrRef::RequestBody(rb)) => Documented::Available(self.body_doc(&rb)),
            Ok(RequestBodyOrRef::Ref { ref_path }) => match self.resolver.lookup_request_body(&ref_path) {
                Ok(rb) => Documented::Available(self.body_doc(rb)),
                Err(e) => {
                    self.warnings.push(e.to_string());
                    Documented::Unavailable {
                        reference: ref_path,
                    }
                }
            },
            Err(e) => {
                self.warnings
                    .push(format!("request body could not be read: {e}"));
                Documented::Unavailable {
                    reference: "requestBody".to_string(),
                }
            }
        }
    }

    fn body_doc(&mut self, rb: &RequestBody) -> BodyDoc {
        let mut content = rb.content.iter();
        let Some((content_type, media)) = content.next() else {
            return BodyDoc {
                content_type: String::new(),
                other_content_types: Vec::new(),
                description: trimmed(rb.description.as_deref()),
                required: rb.required,
                schema_type: None,
                properties: Vec::new(),
                required_properties: Vec::new(),
                example: None,
            };
        };
        let other_content_types = content.map(|(ct, _)| ct.clone()).collect();

        let shape = media
            .schema
            .as_ref()
            .map(|s| self.describer.body(s))
            .unwrap_or_default();
        let example = first_example(
            media.example.as_ref(),
            &media.examples,
            &self.resolver,
            &mut self.warnings,
        )
        .or(shape.example);

        BodyDoc {
            content_type: content_type.clone(),
            other_content_types,
            description: trimmed(rb.description.as_deref()),
            required: rb.required,
            schema_type: if shape.label.is_empty() {
                None
            } else {
                Some(shape.label)
            },
            properties: shape.properties,
            required_properties: shape.required,
            example: example.map(|v| example_text(&v, self.options.examples)),
        }
    }

    fn response(&mut self, code: &str, node: &Value) -> ResponseDoc {
        let unavailable = |description: String| ResponseDoc {
            status_code: code.to_string(),
            description,
            content_type: None,
            example: None,
        };
        let parsed = match serde_json::from_value::<ResponseOrRef>(node.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.warnings
                    .push(format!("response {code} could not be read: {e}"));
                return unavailable(UNAVAILABLE.to_string());
            }
        };
        let resp = match &parsed {
            ResponseOrRef::Response(r) => r,
            ResponseOrRef::Ref { ref_path } => match self.resolver.lookup_response(ref_path) {
                Ok(r) => r,
                Err(e) => {
                    self.warnings.push(e.to_string());
                    return unavailable(format!("{UNAVAILABLE} ({})", ref_tail(ref_path)));
                }
            },
        };

        let first = resp.content.first();
        let example = first.and_then(|(_, media)| {
            first_example(
                media.example.as_ref(),
                &media.examples,
                &self.resolver,
                &mut self.warnings,
            )
            .or_else(|| {
                media
                    .schema
                    .as_ref()
                    .and_then(|s| self.describer.schema_example(s))
            })
        });

        ResponseDoc {
            status_code: code.to_string(),
            description: resp.description.trim().to_string(),
            content_type: first.map(|(ct, _)| ct.clone()),
            example: example.map(|v| example_text(&v, self.options.examples)),
        }
    }
}

/// Render requirements as `scheme: [scope, ...]`; schemes that must hold
/// together are joined with ` + `. An empty requirement object means
/// anonymous access is allowed.
fn render_security(requirements: Option<&Vec<SecurityRequirement>>) -> Vec<String> {
    let Some(requirements) = requirements else {
        return Vec::new();
    };
    requirements
        .iter()
        .map(|req| {
            if req.is_empty() {
                return "anonymous".to_string();
            }
            req.iter()
                .map(|(scheme, scopes)| format!("{scheme}: [{}]", scopes.join(", ")))
                .collect::<Vec<_>>()
                .join(" + ")
        })
        .collect()
}

fn trimmed(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::HttpMethod;
    use crate::parse;

    fn extract_yaml(yaml: &str) -> Vec<OperationDoc> {
        let spec = parse::from_yaml(yaml).unwrap();
        extract(&spec, &ExtractOptions::default())
    }

    #[test]
    fn security_rendering() {
        let yaml = r#"
openapi: 3.0.3
info: { title: T, version: "1" }
security:
  - apiKey: []
paths:
  /inherit:
    get:
      responses: { "200": { description: ok } }
  /none:
    get:
      security: []
      responses: { "200": { description: ok } }
  /scoped:
    get:
      security:
        - oauth: [read, write]
        - apiKey: []
          signed: []
        - {}
      responses: { "200": { description: ok } }
"#;
        let docs = extract_yaml(yaml);
        assert_eq!(docs[0].security, ["apiKey: []"]);
        assert!(docs[1].security.is_empty());
        assert_eq!(
            docs[2].security,
            ["oauth: [read, write]", "apiKey: [] + signed: []", "anonymous"]
        );
    }

    #[test]
    fn operation_parameters_override_path_parameters() {
        let yaml = r#"
openapi: 3.0.0
info: { title: T, version: "1" }
paths:
  /widgets/{id}:
    parameters:
      - { name: id, in: path, required: true, description: shared }
      - { name: trace, in: header }
    get:
      parameters:
        - { name: id, in: path, required: true, description: specific }
        - { name: limit, in: query }
      responses: { "200": { description: ok } }
"#;
        let docs = extract_yaml(yaml);
        let names: Vec<(&str, Option<&str>)> = docs[0]
            .parameters
            .iter()
            .map(|p| match p {
                Documented::Available(p) => (p.name.as_str(), p.description.as_deref()),
                Documented::Unavailable { .. } => panic!("unexpected placeholder"),
            })
            .collect();
        assert_eq!(
            names,
            [
                ("id", Some("specific")),
                ("trace", None),
                ("limit", None)
            ]
        );
    }

    #[test]
    fn faults_stay_with_their_own_entry() {
        let yaml = r##"
openapi: 3.0.0
info: { title: T, version: "1" }
paths:
  /bad-param:
    get:
      tags: [misc]
      summary: Bad Param
      parameters:
        - { name: nowhere }
        - { name: limit, in: query }
      responses: { "200": { description: ok } }
  /missing-ref:
    get:
      tags: [misc]
      summary: Missing Ref
      parameters:
        - $ref: "#/components/parameters/Gone"
      responses:
        "404":
          $ref: "#/components/responses/NotFound"
  /good:
    post:
      tags: [misc]
      summary: Create
      responses: { "201": { description: Created } }
"##;
        let docs = extract_yaml(yaml);
        assert_eq!(docs.len(), 3);

        assert!(docs[0].readable);
        assert_eq!(docs[0].warnings.len(), 1);
        assert!(docs[0].warnings[0].starts_with("parameter nowhere could not be read"));
        assert_eq!(docs[0].parameters.len(), 2);
        assert_eq!(
            docs[0].parameters[0],
            Documented::Unavailable {
                reference: "nowhere".to_string()
            }
        );
        assert!(matches!(&docs[0].parameters[1], Documented::Available(p) if p.name == "limit"));

        assert!(docs[1].readable);
        assert_eq!(docs[1].warnings.len(), 2);
        assert_eq!(
            docs[1].parameters,
            [Documented::Unavailable {
                reference: "#/components/parameters/Gone".to_string()
            }]
        );
        assert_eq!(docs[1].responses[0].description, "unavailable (NotFound)");

        assert_eq!(docs[2].method, HttpMethod::Post);
        assert_eq!(docs[2].summary.as_deref(), Some("Create"));
        assert!(docs[2].warnings.is_empty());
    }

    #[test]
    fn malformed_inline_schema_only_loses_its_field() {
        let yaml = r#"
openapi: 3.0.0
info: { title: T, version: "1" }
paths:
  /upload:
    post:
      tags: [files]
      summary: Upload
      description: Stores a file.
      requestBody:
        content:
          application/json:
            schema:
              type: object
              properties:
                name: { type: string, required: true }
      responses:
        "201": { description: Stored }
        "400": { description: 7, content: [] }
"#;
        let docs = extract_yaml(yaml);
        let doc = &docs[0];
        assert!(doc.readable);
        assert_eq!(doc.description.as_deref(), Some("Stores a file."));
        assert_eq!(
            doc.request_body,
            Some(Documented::Unavailable {
                reference: "requestBody".to_string()
            })
        );
        assert_eq!(doc.responses.len(), 2);
        assert_eq!(doc.responses[0].description, "Stored");
        assert_eq!(doc.responses[1].status_code, "400");
        assert_eq!(doc.responses[1].description, "unavailable");
        assert_eq!(doc.warnings.len(), 2);
        assert!(doc.warnings[0].starts_with("request body could not be read"));
        assert!(doc.warnings[1].starts_with("response 400 could not be read"));
    }

    #[test]
    fn unreadable_operation_keeps_only_its_identity() {
        let yaml = r#"
openapi: 3.0.0
info: { title: T, version: "1" }
paths:
  /odd:
    get:
      summary: [not, a, string]
      responses: { "200": { description: ok } }
"#;
        let docs = extract_yaml(yaml);
        assert!(!docs[0].readable);
        assert_eq!(docs[0].warnings.len(), 1);
        assert!(docs[0].responses.is_empty());
    }

    #[test]
    fn missing_tags_or_summary_is_reported() {
        let yaml = r#"
openapi: 3.0.0
info: { title: T, version: "1" }
paths:
  /untagged:
    get:
      summary: Untagged
      responses: { "200": { description: ok } }
  /unnamed:
    get:
      tags: [misc]
      responses: { "200": { description: ok } }
  /complete:
    get:
      tags: [misc]
      summary: Complete
      responses: { "200": { description: ok } }
"#;
        let docs = extract_yaml(yaml);
        assert_eq!(docs[0].warnings, [MISSING_TAGS_OR_SUMMARY]);
        assert_eq!(docs[1].warnings, [MISSING_TAGS_OR_SUMMARY]);
        assert!(docs[2].warnings.is_empty());
    }

    #[test]
    fn body_keeps_first_content_type_only() {
        let yaml = r#"
openapi: 3.0.0
info: { title: T, version: "1" }
paths:
  /upload:
    post:
      requestBody:
        required: true
        content:
          application/json:
            schema:
              type: object
              required: [name]
              properties:
                name: { type: string, description: The name }
            example: { name: demo }
          application/xml:
            schema: { type: object }
      responses: { "204": { description: Done } }
"#;
        let docs = extract_yaml(yaml);
        let Some(Documented::Available(body)) = &docs[0].request_body else {
            panic!("expected a body");
        };
        assert_eq!(body.content_type, "application/json");
        assert_eq!(body.other_content_types, ["application/xml"]);
        assert!(body.required);
        assert_eq!(body.required_properties, ["name"]);
        assert_eq!(body.properties[0].type_desc, "string");
        assert!(body.properties[0].required);
        assert_eq!(body.example.as_deref(), Some("{\n  \"name\": \"demo\"\n}"));
    }
}
