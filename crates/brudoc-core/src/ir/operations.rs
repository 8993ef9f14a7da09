use std::fmt;

use serde::Serialize;

use super::schemas::PropertyDoc;
use crate::parse::parameter::ParameterLocation;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Case-insensitive parse of a method keyword.
    pub fn parse(s: &str) -> Option<HttpMethod> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A documentation field whose source could not be resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Documented<T> {
    Available(T),
    Unavailable { reference: String },
}

/// The normalized documentation of one operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDoc {
    pub path: String,
    pub method: HttpMethod,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub description: Option<String>,
    /// Rendered requirements, e.g. `oauth: [read, write]`. Empty means none.
    pub security: Vec<String>,
    pub parameters: Vec<Documented<ParamDoc>>,
    pub request_body: Option<Documented<BodyDoc>>,
    pub responses: Vec<ResponseDoc>,
    /// Recovered faults met while extracting this operation.
    pub warnings: Vec<String>,
    /// False when the operation node itself could not be read; such a record
    /// only carries its identity and warnings and is never rendered.
    pub readable: bool,
}

impl OperationDoc {
    pub fn new(path: &str, method: HttpMethod) -> Self {
        Self {
            path: path.to_string(),
            method,
            summary: None,
            tags: Vec::new(),
            description: None,
            security: Vec::new(),
            parameters: Vec::new(),
            request_body: None,
            responses: Vec::new(),
            warnings: Vec::new(),
            readable: true,
        }
    }

    /// `GET /widgets/{id}`
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// A documented parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamDoc {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub description: Option<String>,
    pub type_desc: Option<String>,
    pub example: Option<String>,
}

/// The documented request body. Only the first declared content type is
/// described; the others are listed in `other_content_types`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyDoc {
    pub content_type: String,
    pub other_content_types: Vec<String>,
    pub description: Option<String>,
    pub required: bool,
    pub schema_type: Option<String>,
    pub properties: Vec<PropertyDoc>,
    pub required_properties: Vec<String>,
    pub example: Option<String>,
}

/// A documented response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseDoc {
    pub status_code: String,
    pub description: String,
    pub content_type: Option<String>,
    pub example: Option<String>,
}
