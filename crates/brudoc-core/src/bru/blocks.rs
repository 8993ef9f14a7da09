use crate::error::MergeError;

/// A top-level `name { ... }` block of a request file. Offsets are byte
/// positions into the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub name: String,
    /// 1-based line of the header.
    pub line: usize,
    /// Start of the header line.
    pub start: usize,
    /// Just past the opening `{`.
    pub open: usize,
    /// Position of the matching `}`.
    pub close: usize,
    /// Past the closing line, newline included.
    pub end: usize,
}

impl Block {
    /// Text between the header line and the closing brace.
    pub fn interior<'t>(&self, text: &'t str) -> &'t str {
        let inner = &text[self.open..self.close];
        inner
            .strip_prefix("\r\n")
            .or_else(|| inner.strip_prefix('\n'))
            .unwrap_or(inner)
    }

    /// `key: value` lines of the interior, keys and values trimmed.
    pub fn entries<'t>(&self, text: &'t str) -> impl Iterator<Item = (&'t str, &'t str)> {
        self.interior(text).lines().filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            Some((key.trim(), value.trim()))
        })
    }
}

/// Find the top-level blocks of a request file.
///
/// A header is a line starting at column 0 with `<name> {`. The block runs to
/// the brace that brings the depth back to zero, so braces inside JSON bodies
/// and examples are counted rather than ending the block early. Lines outside
/// any block are ignored.
pub fn scan(text: &str) -> Result<Vec<Block>, MergeError> {
    let mut blocks = Vec::new();
    let mut pos = 0;
    let mut line = 1;
    while pos < text.len() {
        let line_end = text[pos..].find('\n').map_or(text.len(), |i| pos + i + 1);
        let Some(name) = header_name(&text[pos..line_end]) else {
            pos = line_end;
            line += 1;
            continue;
        };
        let open = pos + text[pos..line_end].trim_end().len();
        let close = matching_close(text, open).ok_or_else(|| MergeError::UnbalancedBlock {
            block: name.to_string(),
            line,
        })?;
        let end = text[close..].find('\n').map_or(text.len(), |i| close + i + 1);
        blocks.push(Block {
            name: name.to_string(),
            line,
            start: pos,
            open,
            close,
            end,
        });
        line += text[pos..end].matches('\n').count();
        pos = end;
    }
    Ok(blocks)
}

fn header_name(line: &str) -> Option<&str> {
    let name = line.trim_end().strip_suffix('{')?.trim_end();
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '-' | '_' | '.'));
    valid.then_some(name)
}

fn matching_close(text: &str, from: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (i, b) in text.as_bytes()[from..].iter().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(from + i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST: &str = "meta {
  name: Create Widget
  type: http
  seq: 2
}

post {
  url: {{baseUrl}}/widgets
  body: json
}

body:json {
  {
    \"name\": \"w\",
    \"tags\": {\"a\": {}}
  }
}
";

    #[test]
    fn finds_top_level_blocks() {
        let blocks = scan(REQUEST).unwrap();
        let names: Vec<&str> = blocks.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["meta", "post", "body:json"]);
        assert_eq!(blocks[0].line, 1);
        assert_eq!(blocks[1].line, 7);
        assert_eq!(blocks[2].line, 12);
        assert_eq!(blocks[2].end, REQUEST.len());
    }

    #[test]
    fn nested_braces_do_not_close_the_block() {
        let blocks = scan(REQUEST).unwrap();
        let body = blocks[2].interior(REQUEST);
        assert!(body.starts_with("  {\n"));
        assert!(body.ends_with("  }\n"));
    }

    #[test]
    fn template_variables_in_values_are_balanced() {
        let blocks = scan(REQUEST).unwrap();
        let entries: Vec<_> = blocks[1].entries(REQUEST).collect();
        assert_eq!(entries[0], ("url", "{{baseUrl}}/widgets"));
    }

    #[test]
    fn reads_meta_entries() {
        let blocks = scan(REQUEST).unwrap();
        let name = blocks[0]
            .entries(REQUEST)
            .find(|(k, _)| *k == "name")
            .map(|(_, v)| v);
        assert_eq!(name, Some("Create Widget"));
    }

    #[test]
    fn unclosed_block_is_an_error() {
        let err = scan("meta {\n  name: x\n}\n\ndocs {\n  open { brace\n}\n").unwrap_err();
        match err {
            MergeError::UnbalancedBlock { block, line } => {
                assert_eq!(block, "docs");
                assert_eq!(line, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn indented_and_free_text_lines_are_not_headers() {
        let blocks = scan("  meta {\n}\nsome text\nget {\n}").unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "get");
        assert_eq!(blocks[0].end, "  meta {\n}\nsome text\nget {\n}".len());
    }
}
