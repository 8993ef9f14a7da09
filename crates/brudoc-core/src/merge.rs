//! Merging rendered documentation into the `docs` block of a request file.

use crate::bru::{self, DOCS_BLOCK};
use crate::config::MergePolicy;
use crate::error::MergeError;

pub const BEGIN_MARKER: &str = "<!-- brudoc:begin -->";
pub const END_MARKER: &str = "<!-- brudoc:end -->";

const INDENT: &str = "  ";

/// Return `file_text` with `rendered` placed in its `docs` block.
///
/// The generated text sits between marker lines so later runs replace it
/// instead of appending a second copy. Everything outside the `docs` block
/// is returned byte for byte.
pub fn merge_docs(file_text: &str, rendered: &str, policy: MergePolicy) -> Result<String, MergeError> {
    let blocks = bru::scan(file_text)?;
    let region = generated_region(rendered);

    let Some(docs) = blocks.iter().find(|b| b.name == DOCS_BLOCK) else {
        let head = file_text.trim_end_matches(['\n', '\r']);
        let separator = if head.is_empty() { "" } else { "\n\n" };
        return Ok(format!("{head}{separator}{DOCS_BLOCK} {{\n{region}}}\n"));
    };

    let interior = match policy {
        MergePolicy::Preserve => preserve_notes(docs.interior(file_text), &region),
        MergePolicy::Replace => region,
    };

    let mut merged = String::with_capacity(file_text.len() + interior.len());
    merged.push_str(&file_text[..docs.open]);
    merged.push('\n');
    merged.push_str(&interior);
    merged.push_str(&file_text[docs.close..]);
    Ok(merged)
}

/// Marker-wrapped, indented block interior for `rendered`.
fn generated_region(rendered: &str) -> String {
    let rendered = balance_braces(rendered);
    let mut region = format!("{INDENT}{BEGIN_MARKER}\n");
    for line in rendered.lines() {
        if !line.is_empty() {
            region.push_str(INDENT);
            region.push_str(line);
        }
        region.push('\n');
    }
    region.push_str(INDENT);
    region.push_str(END_MARKER);
    region.push('\n');
    region
}

/// Replace braces without a partner with HTML character references.
///
/// The block scanner counts braces to find the end of `docs`, so a lone
/// brace in a description or example would move the block boundary on the
/// next run. Paired braces are left alone.
fn balance_braces(text: &str) -> String {
    let mut stray = Vec::new();
    let mut open = Vec::new();
    for (i, c) in text.char_indices() {
        match c {
            '{' => open.push(i),
            '}' => {
                if open.pop().is_none() {
                    stray.push(i);
                }
            }
            _ => {}
        }
    }
    if stray.is_empty() && open.is_empty() {
        return text.to_string();
    }
    stray.extend(open);
    stray.sort_unstable();

    let mut out = String::with_capacity(text.len() + stray.len() * 5);
    let mut last = 0;
    for i in stray {
        out.push_str(&text[last..i]);
        out.push_str(if text.as_bytes()[i] == b'{' { "&#123;" } else { "&#125;" });
        last = i + 1;
    }
    out.push_str(&text[last..]);
    out
}

fn preserve_notes(interior: &str, region: &str) -> String {
    let lines: Vec<&str> = interior.split_inclusive('\n').collect();
    let Some(begin) = lines.iter().position(|l| l.trim() == BEGIN_MARKER) else {
        let notes = interior.trim_end();
        if notes.trim().is_empty() {
            return region.to_string();
        }
        return format!("{notes}\n\n{region}");
    };
    // A begin marker without an end marker owns the rest of the block.
    let after = lines[begin..]
        .iter()
        .position(|l| l.trim() == END_MARKER)
        .map(|i| lines[begin + i + 1..].concat())
        .unwrap_or_default();
    format!("{}{region}{after}", lines[..begin].concat())
}
