//! Minimal YAML front-matter parsing.
//!
//! Supports the subset the documentation corpora actually use: scalar
//! values, quoted strings and single-level sequences (`[a, b]` or dashed
//! list items). Malformed front-matter yields an empty map, never an error;
//! the harvester and URL resolver both rely on that.

use std::collections::BTreeMap;

/// Parsed front-matter: scalar fields plus sequence fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    scalars: BTreeMap<String, String>,
    sequences: BTreeMap<String, Vec<String>>,
}

impl FrontMatter {
    /// Scalar value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.scalars.get(key).map(String::as_str)
    }

    /// Sequence value for `key`, if present.
    #[must_use]
    pub fn get_seq(&self, key: &str) -> Option<&[String]> {
        self.sequences.get(key).map(Vec::as_slice)
    }

    /// True when no fields were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty() && self.sequences.is_empty()
    }
}

/// Split `content` into parsed front-matter and the remaining body.
///
/// Front-matter is recognized only when the very first line is `---`; the
/// block ends at the next `---` line. When the closing fence is missing the
/// whole content is treated as body.
#[must_use]
pub fn split(content: &str) -> (FrontMatter, &str) {
    let Some(rest) = content.strip_prefix("---") else {
        return (FrontMatter::default(), content);
    };
    if !rest.starts_with('\n') && !rest.starts_with("\r\n") {
        return (FrontMatter::default(), content);
    }

    let mut offset = 3;
    let mut block_end = None;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" && offset > 3 {
            block_end = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }

    match block_end {
        Some((fm_end, body_start)) => {
            let fm = parse_block(&content[3..fm_end]);
            (fm, &content[body_start..])
        },
        None => (FrontMatter::default(), content),
    }
}

fn parse_block(block: &str) -> FrontMatter {
    let mut fm = FrontMatter::default();
    let mut pending_seq: Option<String> = None;

    for raw_line in block.lines() {
        let line = raw_line.trim_end();
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        // Dashed list item under the most recent key.
        if let Some(item) = line.trim_start().strip_prefix("- ") {
            if let Some(key) = &pending_seq {
                fm.sequences
                    .entry(key.clone())
                    .or_default()
                    .push(unquote(item).to_string());
            }
            continue;
        }

        let Some(colon) = line.find(':') else {
            // Not a mapping line and not a list item: bail on this line only.
            continue;
        };
        let key = line[..colon].trim();
        if key.is_empty() || key.contains(' ') {
            continue;
        }
        let value = line[colon + 1..].trim();

        if value.is_empty() {
            // Either a dashed sequence follows or the key stays empty.
            pending_seq = Some(key.to_string());
            continue;
        }
        pending_seq = None;

        if value.starts_with('[') && value.ends_with(']') {
            let items: Vec<String> = value[1..value.len() - 1]
                .split(',')
                .map(|item| unquote(item.trim()).to_string())
                .filter(|item| !item.is_empty())
                .collect();
            fm.sequences.insert(key.to_string(), items);
        } else {
            fm.scalars
                .insert(key.to_string(), unquote(value).to_string());
        }
    }

    fm
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    if value.len() >= 2 {
        let bytes = value.as_bytes();
        if (bytes[0] == b'"' && bytes[value.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[value.len() - 1] == b'\'')
        {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalars_and_body() {
        let content = "---\nid: locators\ntitle: \"Using Locators\"\n---\n# Heading\nBody.\n";
        let (fm, body) = split(content);
        assert_eq!(fm.get("id"), Some("locators"));
        assert_eq!(fm.get("title"), Some("Using Locators"));
        assert_eq!(body, "# Heading\nBody.\n");
    }

    #[test]
    fn parses_inline_and_dashed_sequences() {
        let content = "---\ntags: [ui5, \"testing\"]\nkeywords:\n  - wizard\n  - dialog\n---\nBody";
        let (fm, _) = split(content);
        assert_eq!(fm.get_seq("tags"), Some(&["ui5".to_string(), "testing".to_string()][..]));
        assert_eq!(
            fm.get_seq("keywords"),
            Some(&["wizard".to_string(), "dialog".to_string()][..])
        );
    }

    #[test]
    fn missing_fence_is_not_front_matter() {
        let content = "# Just a doc\nwith text\n";
        let (fm, body) = split(content);
        assert!(fm.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn unterminated_front_matter_yields_body() {
        let content = "---\nid: dangling\nno closing fence\n";
        let (fm, body) = split(content);
        assert!(fm.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let content = "---\n:::: weird\nvalid: yes\n[broken\n---\nBody";
        let (fm, body) = split(content);
        assert_eq!(fm.get("valid"), Some("yes"));
        assert_eq!(body, "Body");
    }
}
