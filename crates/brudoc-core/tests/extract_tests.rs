use brudoc_core::config::{ExampleFormat, RenderOptions};
use brudoc_core::ir::{Documented, HttpMethod, OperationDoc, PropertyDoc};
use brudoc_core::parse;
use brudoc_core::render::render_docs;
use brudoc_core::transform::{ExtractOptions, extract};

const WIDGETS: &str = include_str!("fixtures/widgets.yaml");

fn widgets() -> Vec<OperationDoc> {
    let spec = parse::from_yaml(WIDGETS).unwrap();
    extract(&spec, &ExtractOptions::default())
}

fn find(docs: &[OperationDoc], method: HttpMethod, path: &str) -> OperationDoc {
    docs.iter()
        .find(|d| d.method == method && d.path == path)
        .cloned()
        .unwrap_or_else(|| panic!("no {method} {path}"))
}

fn count_recursive(props: &[PropertyDoc]) -> usize {
    props
        .iter()
        .map(|p| usize::from(p.type_desc.contains("(recursive)")) + count_recursive(&p.nested))
        .sum()
}

#[test]
fn one_record_per_operation_in_document_order() {
    let docs = widgets();
    let labels: Vec<String> = docs.iter().map(OperationDoc::label).collect();
    assert_eq!(
        labels,
        [
            "GET /widgets",
            "POST /widgets",
            "GET /widgets/{id}",
            "DELETE /widgets/{id}",
            "GET /nodes",
        ]
    );
}

#[test]
fn get_widget_by_id() {
    let doc = find(&widgets(), HttpMethod::Get, "/widgets/{id}");
    assert_eq!(doc.summary.as_deref(), Some("Get Widget"));
    assert_eq!(doc.tags, ["widgets"]);
    assert_eq!(doc.security, ["apiKey: []"]);

    let Documented::Available(id) = &doc.parameters[0] else {
        panic!("id should resolve");
    };
    assert_eq!(id.name, "id");
    assert!(id.required);
    assert_eq!(id.description.as_deref(), Some("Widget identifier"));
    assert_eq!(id.example.as_deref(), Some("42"));

    let codes: Vec<(&str, &str)> = doc
        .responses
        .iter()
        .map(|r| (r.status_code.as_str(), r.description.as_str()))
        .collect();
    assert_eq!(codes, [("200", "Found"), ("404", "No such widget")]);
}

#[test]
fn explicit_empty_security_means_none() {
    let doc = find(&widgets(), HttpMethod::Get, "/widgets");
    assert!(doc.security.is_empty());
    let text = render_docs(&doc, &RenderOptions::default()).unwrap();
    assert!(!text.contains("Security"));
}

#[test]
fn referenced_parameter_and_schema_example() {
    let doc = find(&widgets(), HttpMethod::Get, "/widgets");
    let Documented::Available(limit) = &doc.parameters[0] else {
        panic!("limit should resolve");
    };
    assert_eq!(limit.name, "limit");
    assert_eq!(limit.type_desc.as_deref(), Some("integer, int32"));
    assert_eq!(limit.example.as_deref(), Some("20"));
}

#[test]
fn request_body_from_referenced_schema() {
    let doc = find(&widgets(), HttpMethod::Post, "/widgets");
    assert_eq!(doc.security, ["oauth: [widgets.write]"]);
    let Some(Documented::Available(body)) = &doc.request_body else {
        panic!("body should resolve");
    };
    assert_eq!(body.content_type, "application/json");
    assert_eq!(body.other_content_types, ["application/xml"]);
    assert!(body.required);
    assert_eq!(body.schema_type.as_deref(), Some("Widget"));
    assert_eq!(body.required_properties, ["name"]);

    let names: Vec<&str> = body.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["id", "name", "owner"]);
    assert_eq!(body.properties[0].type_desc, "string, read-only");
    assert!(body.properties[1].required);
    assert_eq!(body.properties[2].type_desc, "Owner");
    assert_eq!(body.properties[2].nested[0].type_desc, "string, email");
}

#[test]
fn referenced_response_is_resolved() {
    let doc = find(&widgets(), HttpMethod::Post, "/widgets");
    assert_eq!(doc.responses[1].status_code, "422");
    assert_eq!(doc.responses[1].description, "Validation failed");
}

#[test]
fn self_referential_schema_terminates_with_one_marker() {
    let doc = find(&widgets(), HttpMethod::Get, "/nodes");
    let Some(Documented::Available(body)) = &doc.request_body else {
        panic!("body should resolve");
    };
    assert_eq!(body.properties[1].name, "children");
    assert_eq!(body.properties[1].type_desc, "array of Node (recursive)");
    assert_eq!(count_recursive(&body.properties), 1);
}

#[test]
fn unresolved_reference_becomes_warning() {
    let doc = find(&widgets(), HttpMethod::Delete, "/widgets/{id}");
    assert!(doc.readable);
    assert_eq!(doc.parameters.len(), 2);
    assert_eq!(
        doc.parameters[1],
        Documented::Unavailable {
            reference: "#/components/parameters/Missing".to_string()
        }
    );
    assert_eq!(doc.warnings.len(), 1);
    assert!(doc.warnings[0].contains("Missing"));
}

#[test]
fn yaml_examples() {
    let spec = parse::from_yaml(WIDGETS).unwrap();
    let docs = extract(
        &spec,
        &ExtractOptions {
            examples: ExampleFormat::Yaml,
        },
    );
    let doc = find(&docs, HttpMethod::Get, "/widgets");
    assert_eq!(
        doc.responses[0].example.as_deref(),
        Some("- id: '42'\n  name: Sprocket")
    );
}

#[test]
fn rendered_list_operation() {
    let doc = find(&widgets(), HttpMethod::Get, "/widgets");
    let text = render_docs(&doc, &RenderOptions::default()).unwrap();
    insta::assert_snapshot!(text, @r#"
    Description: Returns every widget visible to the caller.

    Parameters:
      * limit (query, optional): Page size
        Type: integer, int32
        Example: 20
      * owner (query, optional)
        Type: string

    Responses:
      * 200: A page of widgets
        Example (application/json):
          [
            {
              "id": "42",
              "name": "Sprocket"
            }
          ]
    "#);
}
