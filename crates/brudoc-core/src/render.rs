//! Rendering of an `OperationDoc` into the text placed inside a `docs` block.
//!
//! Sections always appear in the order Description, Security, Parameters,
//! Body, Responses, and a section without data is left out. The output only
//! depends on the record's ordered fields, has no trailing whitespace and no
//! trailing newline.

use minijinja::{AutoEscape, Environment};
use serde::Serialize;

use crate::config::RenderOptions;
use crate::error::RenderError;
use crate::ir::{BodyDoc, Documented, OperationDoc, ParamDoc, PropertyDoc, ResponseDoc};
use crate::parse::ref_resolve::ref_tail;

const TEMPLATE_NAME: &str = "docs.md.j2";

/// Renders records with a compiled template. Build once per run.
pub struct DocRenderer {
    env: Environment<'static>,
    options: RenderOptions,
}

impl DocRenderer {
    pub fn new(options: RenderOptions) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_template(TEMPLATE_NAME, include_str!("../templates/docs.md.j2"))?;
        Ok(Self { env, options })
    }

    pub fn render(&self, doc: &OperationDoc) -> Result<String, RenderError> {
        let tmpl = self.env.get_template(TEMPLATE_NAME)?;
        let view = DocView::build(doc, &self.options);
        let raw = tmpl.render(&view)?;
        Ok(tidy(&raw))
    }
}

/// Render a single record with a throwaway renderer.
pub fn render_docs(doc: &OperationDoc, options: &RenderOptions) -> Result<String, RenderError> {
    DocRenderer::new(*options)?.render(doc)
}

/// Strip trailing whitespace from every line and blank lines from both ends.
fn tidy(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().map(str::trim_end).collect();
    lines.join("\n").trim_matches('\n').to_string()
}

#[derive(Debug, Serialize)]
struct DocView {
    description: Option<String>,
    security: Option<String>,
    parameters: Vec<ParamView>,
    body: Option<BodyView>,
    responses: Vec<ResponseView>,
}

#[derive(Debug, Serialize)]
struct ParamView {
    head: String,
    type_desc: Option<String>,
    example: Option<String>,
    example_block: bool,
}

#[derive(Debug, Default, Serialize)]
struct BodyView {
    unavailable: Option<String>,
    description: Option<String>,
    content_type: Option<String>,
    other_content_types: Option<String>,
    schema_type: Option<String>,
    properties: Vec<String>,
    example: Option<String>,
}

#[derive(Debug, Serialize)]
struct ResponseView {
    status_code: String,
    description: String,
    content_type: Option<String>,
    example: Option<String>,
}

impl DocView {
    fn build(doc: &OperationDoc, options: &RenderOptions) -> Self {
        Self {
            description: doc.description.clone(),
            security: if doc.security.is_empty() {
                None
            } else {
                Some(doc.security.join("; "))
            },
            parameters: doc
                .parameters
                .iter()
                .map(|p| match p {
                    Documented::Available(p) => ParamView::build(p, options),
                    Documented::Unavailable { reference } => ParamView {
                        head: format!("{}: unavailable", ref_tail(reference)),
                        type_desc: None,
                        example: None,
                        example_block: false,
                    },
                })
                .collect(),
            body: doc.request_body.as_ref().map(|b| match b {
                Documented::Available(body) => BodyView::build(body),
                Documented::Unavailable { reference } => BodyView {
                    unavailable: Some(ref_tail(reference).to_string()),
                    ..BodyView::default()
                },
            }),
            responses: doc.responses.iter().map(ResponseView::build).collect(),
        }
    }
}

impl ParamView {
    fn build(p: &ParamDoc, options: &RenderOptions) -> Self {
        let presence = if p.required { "required" } else { "optional" };
        let mut head = format!("{} ({}, {})", p.name, p.location.as_str(), presence);
        if let Some(desc) = &p.description {
            head.push_str(": ");
            head.push_str(desc);
        }
        Self {
            head,
            type_desc: if options.parameter_types {
                p.type_desc.clone()
            } else {
                None
            },
            example_block: p.example.as_deref().is_some_and(|e| e.contains('\n')),
            example: p.example.clone(),
        }
    }
}

impl BodyView {
    fn build(body: &BodyDoc) -> Self {
        let content_type = if body.content_type.is_empty() {
            None
        } else if body.required {
            Some(format!("{} (required)", body.content_type))
        } else {
            Some(body.content_type.clone())
        };
        let mut properties = Vec::new();
        for prop in &body.properties {
            property_lines(prop, 1, &mut properties);
        }
        Self {
            unavailable: None,
            description: body.description.clone(),
            content_type,
            other_content_types: if body.other_content_types.is_empty() {
                None
            } else {
                Some(body.other_content_types.join(", "))
            },
            schema_type: body.schema_type.clone(),
            properties,
            example: body.example.clone(),
        }
    }
}

impl ResponseView {
    fn build(r: &ResponseDoc) -> Self {
        Self {
            status_code: r.status_code.clone(),
            description: r.description.clone(),
            content_type: r.content_type.clone(),
            example: r.example.clone(),
        }
    }
}

/// `* name (type[, required]): description`, children two spaces deeper.
fn property_lines(prop: &PropertyDoc, depth: usize, out: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    let mut line = format!("{indent}* {} ({}", prop.name, prop.type_desc);
    if prop.required {
        line.push_str(", required");
    }
    line.push(')');
    if let Some(desc) = &prop.description {
        let continuation = format!("\n{indent}  ");
        line.push_str(": ");
        line.push_str(&desc.lines().collect::<Vec<_>>().join(&continuation));
    }
    out.push(line);
    for child in &prop.nested {
        property_lines(child, depth + 1, out);
    }
}
