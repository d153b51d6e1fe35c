//! JSDoc extractor for UI5 control sources.
//!
//! A file is only considered when it carries both a class-extension marker
//! (`.extend("ns.Name", ...)`) and a `metadata:` block. Properties, events
//! and aggregations are pulled out of the metadata block by matching keys
//! at the top nesting level of each map.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{ControlMetadata, DocKind, Document};

static EXTEND_RE: Lazy<Regex> = Lazy::new(|| {
    // `BaseClass.extend("sap.m.Button", {` — capture the qualified name.
    #[allow(clippy::unwrap_used)]
    Regex::new(r#"\.extend\(\s*["']([A-Za-z0-9_.$]+)["']"#).unwrap()
});

static METADATA_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"metadata\s*:\s*\{").unwrap()
});

/// Extracts an API reference document from a control source.
///
/// Returns `None` when the file lacks the extension marker or the
/// metadata block, which filters out helpers and library modules.
#[must_use]
pub fn extract_jsdoc(library: &str, rel_file: &str, content: &str) -> Option<Document> {
    let extend = EXTEND_RE.captures(content)?;
    let metadata_start = METADATA_RE.find(content)?;

    let qualified = extend.get(1)?.as_str();
    let (namespace, control_name) = qualified
        .rsplit_once('.')
        .map_or(("", qualified), |(ns, name)| (ns, name));

    let metadata_block = balanced_block(content, metadata_start.end() - 1)?;

    let metadata = ControlMetadata {
        control_name: control_name.to_string(),
        namespace: namespace.to_string(),
        properties: map_keys(metadata_block, "properties"),
        events: map_keys(metadata_block, "events"),
        aggregations: map_keys(metadata_block, "aggregations"),
        keywords: Vec::new(),
    };

    let description = leading_comment(content, extend.get(0)?.start()).unwrap_or_default();

    let stem = rel_file.trim_end_matches(".js");
    Some(Document {
        id: format!("{library}/{stem}"),
        library: library.to_string(),
        kind: DocKind::ApiReference,
        title: qualified.to_string(),
        description,
        rel_file: rel_file.to_string(),
        snippet_count: 0,
        metadata: Some(metadata),
        section: None,
    })
}

/// The brace-balanced substring starting at the `{` at `open`, braces
/// included. Returns `None` when the block never closes.
fn balanced_block(content: &str, open: usize) -> Option<&str> {
    let bytes = content.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }
    let mut depth = 0usize;
    let mut in_string: Option<u8> = None;
    for (offset, &byte) in bytes[open..].iter().enumerate() {
        if let Some(quote) = in_string {
            if byte == quote && bytes.get(open + offset - 1) != Some(&b'\\') {
                in_string = None;
            }
            continue;
        }
        match byte {
            b'"' | b'\'' => in_string = Some(byte),
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[open..=open + offset]);
                }
            },
            _ => {},
        }
    }
    None
}

/// Keys of a named map (`properties: { text: {...}, enabled: {...} }`)
/// at the first nesting level of that map.
fn map_keys(metadata_block: &str, map_name: &str) -> Vec<String> {
    #[allow(clippy::unwrap_used)]
    let open_re = Regex::new(&format!(r"{map_name}\s*:\s*\{{")).unwrap();
    let Some(open) = open_re.find(metadata_block) else {
        return Vec::new();
    };
    let Some(block) = balanced_block(metadata_block, open.end() - 1) else {
        return Vec::new();
    };

    static KEY_RE: Lazy<Regex> = Lazy::new(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r#"(?m)^\s*["']?([A-Za-z_$][A-Za-z0-9_$]*)["']?\s*:"#).unwrap()
    });

    // Blank out nested blocks so only depth-1 keys match.
    let inner = &block[1..block.len() - 1];
    let mut flattened = String::with_capacity(inner.len());
    let mut depth = 0usize;
    for ch in inner.chars() {
        match ch {
            '{' => {
                depth += 1;
                flattened.push(ch);
            },
            '}' => {
                depth = depth.saturating_sub(1);
                flattened.push(ch);
            },
            _ if depth > 0 && ch != '\n' => flattened.push(' '),
            _ => flattened.push(ch),
        }
    }

    KEY_RE
        .captures_iter(&flattened)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Text of the block comment immediately preceding `before`, truncated at
/// the first `@`-tag, with comment decoration stripped.
fn leading_comment(content: &str, before: usize) -> Option<String> {
    let head = &content[..before];
    let start = head.rfind("/**")?;
    let end = head[start..].find("*/")? + start;
    let raw = &head[start + 3..end];

    let mut text = String::new();
    for line in raw.lines() {
        let line = line.trim().trim_start_matches('*').trim();
        if line.starts_with('@') {
            break;
        }
        if !line.is_empty() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(line);
        }
    }
    if text.is_empty() { None } else { Some(text) }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    const BUTTON: &str = r#"
sap.ui.define(["./library", "sap/ui/core/Control"], function(library, Control) {
    "use strict";

    /**
     * Enables users to trigger actions.
     * The button control is placed in toolbars and forms.
     *
     * @extends sap.ui.core.Control
     * @public
     */
    var Button = Control.extend("sap.m.Button", {
        metadata: {
            library: "sap.m",
            properties: {
                text: { type: "string", defaultValue: "" },
                enabled: { type: "boolean", defaultValue: true },
                "icon": { type: "sap.ui.core.URI" }
            },
            events: {
                press: {}
            },
            aggregations: {
                tooltip: { type: "sap.ui.core.TooltipBase", multiple: false }
            }
        }
    });

    return Button;
});
"#;

    #[test]
    fn extracts_qualified_name_and_maps() {
        let doc = extract_jsdoc("/openui5-api", "src/sap.m/src/sap/m/Button.js", BUTTON).unwrap();
        assert_eq!(doc.title, "sap.m.Button");
        assert_eq!(doc.kind, DocKind::ApiReference);

        let meta = doc.metadata.unwrap();
        assert_eq!(meta.namespace, "sap.m");
        assert_eq!(meta.control_name, "Button");
        assert_eq!(meta.properties, vec!["text", "enabled", "icon"]);
        assert_eq!(meta.events, vec!["press"]);
        assert_eq!(meta.aggregations, vec!["tooltip"]);
    }

    #[test]
    fn description_stops_at_first_tag() {
        let doc = extract_jsdoc("/openui5-api", "src/sap.m/src/sap/m/Button.js", BUTTON).unwrap();
        assert_eq!(
            doc.description,
            "Enables users to trigger actions. The button control is placed in toolbars and forms."
        );
    }

    #[test]
    fn files_without_markers_are_ignored() {
        assert!(extract_jsdoc("/openui5-api", "x.js", "var a = 1;").is_none());
        // Extension marker without metadata block is not a control.
        let helper = r#"var Util = Base.extend("sap.m.Util", { render: function() {} });"#;
        assert!(extract_jsdoc("/openui5-api", "x.js", helper).is_none());
    }

    #[test]
    fn nested_keys_do_not_leak() {
        let meta = extract_jsdoc("/openui5-api", "src/sap.m/src/sap/m/Button.js", BUTTON)
            .unwrap()
            .metadata
            .unwrap();
        // `type`/`defaultValue` live one level deeper and must not appear.
        assert!(!meta.properties.contains(&"type".to_string()));
        assert!(!meta.properties.contains(&"defaultValue".to_string()));
    }
}
