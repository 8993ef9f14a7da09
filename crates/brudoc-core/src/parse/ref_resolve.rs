use super::components::Components;
use super::media_type::{Example, ExampleOrRef};
use super::parameter::{Parameter, ParameterOrRef};
use super::request_body::{RequestBody, RequestBodyOrRef};
use super::response::{Response, ResponseOrRef};
use super::schema::{Schema, SchemaOrRef};
use crate::error::ResolveError;

/// Upper bound on `$ref -> $ref` hops inside one components section.
const MAX_REF_HOPS: usize = 32;

/// Looks up `#/components/...` references against the document's shared
/// definitions. Lookups never expand nested schemas; cycle handling during
/// expansion belongs to the caller, which knows the current expansion path.
#[derive(Debug, Clone, Copy)]
pub struct RefResolver<'a> {
    components: &'a Components,
}

impl<'a> RefResolver<'a> {
    pub fn new(components: &'a Components) -> Self {
        Self { components }
    }

    /// Resolve a schema reference to its target, following alias chains such
    /// as `Pet: { $ref: Animal }`. Returns the name of the final target with it.
    pub fn lookup_schema(&self, ref_path: &str) -> Result<(&'a str, &'a Schema), ResolveError> {
        let mut current = ref_path;
        for _ in 0..MAX_REF_HOPS {
            let name = parse_ref_name(current, "schemas")?;
            let (key, target) = self
                .components
                .schemas
                .get_key_value(name)
                .ok_or_else(|| ResolveError::UnresolvedRef(ref_path.to_string()))?;
            match target {
                SchemaOrRef::Schema(schema) => return Ok((key.as_str(), schema)),
                SchemaOrRef::Ref { ref_path: inner } => current = inner,
            }
        }
        Err(ResolveError::UnresolvedRef(ref_path.to_string()))
    }

    pub fn lookup_parameter(&self, ref_path: &str) -> Result<&'a Parameter, ResolveError> {
        let mut current = ref_path;
        for _ in 0..MAX_REF_HOPS {
            let name = parse_ref_name(current, "parameters")?;
            match self.components.parameters.get(name) {
                Some(ParameterOrRef::Parameter(param)) => return Ok(param),
                Some(ParameterOrRef::Ref { ref_path: inner }) => current = inner,
                None => break,
            }
        }
        Err(ResolveError::UnresolvedRef(ref_path.to_string()))
    }

    pub fn lookup_request_body(&self, ref_path: &str) -> Result<&'a RequestBody, ResolveError> {
        let mut current = ref_path;
        for _ in 0..MAX_REF_HOPS {
            let name = parse_ref_name(current, "requestBodies")?;
            match self.components.request_bodies.get(name) {
                Some(RequestBodyOrRef::RequestBody(body)) => return Ok(body),
                Some(RequestBodyOrRef::Ref { ref_path: inner }) => current = inner,
                None => break,
            }
        }
        Err(ResolveError::UnresolvedRef(ref_path.to_string()))
    }

    pub fn lookup_response(&self, ref_path: &str) -> Result<&'a Response, ResolveError> {
        let mut current = ref_path;
        for _ in 0..MAX_REF_HOPS {
            let name = parse_ref_name(current, "responses")?;
            match self.components.responses.get(name) {
                Some(ResponseOrRef::Response(resp)) => return Ok(resp),
                Some(ResponseOrRef::Ref { ref_path: inner }) => current = inner,
                None => break,
            }
        }
        Err(ResolveError::UnresolvedRef(ref_path.to_string()))
    }

    pub fn lookup_example(&self, ref_path: &str) -> Result<&'a Example, ResolveError> {
        let mut current = ref_path;
        for _ in 0..MAX_REF_HOPS {
            let name = parse_ref_name(current, "examples")?;
            match self.components.examples.get(name) {
                Some(ExampleOrRef::Example(example)) => return Ok(example),
                Some(ExampleOrRef::Ref { ref_path: inner }) => current = inner,
                None => break,
            }
        }
        Err(ResolveError::UnresolvedRef(ref_path.to_string()))
    }
}

/// Parse a `$ref` path like `#/components/schemas/Foo` and extract the name.
pub fn parse_ref_name<'a>(
    ref_path: &'a str,
    expected_section: &str,
) -> Result<&'a str, ResolveError> {
    let stripped = ref_path
        .strip_prefix("#/components/")
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    let (section, name) = stripped
        .split_once('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    if section != expected_section {
        return Err(ResolveError::InvalidRefFormat(format!(
            "expected section '{}', got '{}' in {}",
            expected_section, section, ref_path
        )));
    }
    Ok(name)
}

/// The last segment of a reference, used as a display name.
pub fn ref_tail(ref_path: &str) -> &str {
    ref_path.rsplit('/').next().unwrap_or(ref_path)
}
