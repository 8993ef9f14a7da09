use brudoc_core::error::SpecError;
use brudoc_core::ir::HttpMethod;
use brudoc_core::parse;

const WIDGETS: &str = include_str!("fixtures/widgets.yaml");

#[test]
fn parse_widgets_yaml() {
    let spec = parse::from_yaml(WIDGETS).expect("should parse widgets.yaml");
    assert_eq!(spec.openapi, "3.0.3");
    assert_eq!(spec.title.as_deref(), Some("Widget API"));

    let keys: Vec<(HttpMethod, &str)> = spec
        .operations
        .keys()
        .map(|k| (k.method, k.path.as_str()))
        .collect();
    assert_eq!(
        keys,
        [
            (HttpMethod::Get, "/widgets"),
            (HttpMethod::Post, "/widgets"),
            (HttpMethod::Get, "/widgets/{id}"),
            (HttpMethod::Delete, "/widgets/{id}"),
            (HttpMethod::Get, "/nodes"),
        ]
    );

    assert_eq!(spec.components.schemas.len(), 3);
    assert_eq!(spec.components.parameters.len(), 1);
    assert_eq!(spec.security.as_ref().map(Vec::len), Some(1));
}

#[test]
fn path_level_parameters_travel_with_each_operation() {
    let spec = parse::from_yaml(WIDGETS).unwrap();
    let with_shared = spec
        .operations
        .iter()
        .filter(|(_, raw)| raw.path_parameters.is_some())
        .count();
    assert_eq!(with_shared, 2);
}

#[test]
fn parse_json_document() {
    let json = r#"{
        "openapi": "3.0.1",
        "info": { "title": "J", "version": "1" },
        "paths": { "/ping": { "get": { "responses": { "200": { "description": "pong" } } } } }
    }"#;
    let spec = parse::from_json(json).unwrap();
    assert_eq!(spec.operations.len(), 1);
}

#[test]
fn parse_invalid_version() {
    let yaml = r#"
openapi: "3.1.0"
info:
  title: Test
  version: "1"
paths: {}
"#;
    let err = parse::from_yaml(yaml).unwrap_err();
    assert!(matches!(err, SpecError::UnsupportedVersion(v) if v == "3.1.0"));
}

#[test]
fn missing_openapi_field() {
    let err = parse::from_yaml("paths: {}\n").unwrap_err();
    assert!(matches!(err, SpecError::MissingField(f) if f == "openapi"));
}

#[test]
fn missing_paths_field() {
    let err = parse::from_yaml("openapi: 3.0.0\n").unwrap_err();
    assert!(matches!(err, SpecError::MissingField(f) if f == "paths"));
}

#[test]
fn malformed_documents_are_fatal() {
    let cases = [
        "- just\n- a list\n",
        "openapi: 3.0.0\npaths: [a, b]\n",
        "openapi: 3.0.0\npaths:\n  /x: 12\n",
        "openapi: 3.0.0\npaths:\n  /x:\n    get: nope\n",
    ];
    for yaml in cases {
        let err = parse::from_yaml(yaml).unwrap_err();
        assert!(
            matches!(err, SpecError::Malformed { .. }),
            "expected malformed for {yaml:?}, got {err}"
        );
    }
}

#[test]
fn non_method_keys_are_not_operations() {
    let yaml = r#"
openapi: 3.0.0
paths:
  /x:
    summary: shared
    description: shared
    servers: []
    x-internal: true
    get:
      responses: { "200": { description: ok } }
"#;
    let spec = parse::from_yaml(yaml).unwrap();
    assert_eq!(spec.operations.len(), 1);
}

#[test]
fn invalid_yaml_is_an_error() {
    let err = parse::from_yaml("openapi: [unclosed\n").unwrap_err();
    assert!(matches!(err, SpecError::Yaml(_)));
}

#[test]
fn load_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("api.yaml");
    std::fs::write(&path, WIDGETS).unwrap();
    assert_eq!(parse::load(&path).unwrap().operations.len(), 5);

    let missing = parse::load(&dir.path().join("nope.yaml")).unwrap_err();
    assert!(matches!(missing, SpecError::Read { .. }));
}
