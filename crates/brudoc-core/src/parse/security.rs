use indexmap::IndexMap;

/// A security requirement: map of scheme name → required scopes.
///
/// All schemes inside one requirement must be satisfied together; the
/// requirements of an operation are alternatives.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;
