use heck::ToSnakeCase;

/// Normalize a display name or summary for matching.
///
/// Case, separators and punctuation are collapsed so that `Get Widget`,
/// `get-widget`, `getWidget` and `Get widget!` all compare equal.
pub fn match_key(name: &str) -> String {
    name.trim().to_snake_case()
}

/// Whether two names match: both non-empty after normalization and one
/// contains the other.
pub fn names_overlap(a: &str, b: &str) -> bool {
    let a = match_key(a);
    let b = match_key(b);
    !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
}
