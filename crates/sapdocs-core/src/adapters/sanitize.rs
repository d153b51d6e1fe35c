//! Best-effort HTML sanitization for adapter responses.
//!
//! Live sources occasionally hand back HTML (sometimes a bot-protection
//! interstitial). Titles, snippets and links are extracted by tag stripping
//! and entity decoding; the output is always plain text.

use html_escape::decode_html_entities;

/// Strips tags and decodes entities, collapsing whitespace runs.
#[must_use]
pub fn strip_html(input: &str) -> String {
    let mut text = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                text.push(' ');
            },
            _ if !in_tag => text.push(ch),
            _ => {},
        }
    }
    let decoded = decode_html_entities(&text);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts `(href, link text)` pairs from an HTML fragment.
///
/// Only absolute `https` links survive; malformed anchors are skipped.
#[must_use]
pub fn extract_links(input: &str) -> Vec<(String, String)> {
    let mut links = Vec::new();
    let mut rest = input;
    while let Some(open) = rest.find("<a ") {
        let Some(tag_end) = rest[open..].find('>') else { break };
        let tag = &rest[open..open + tag_end];
        let after_tag = &rest[open + tag_end + 1..];
        let Some(close) = after_tag.find("</a>") else { break };
        let inner = &after_tag[..close];

        if let Some(href) = attribute(tag, "href") {
            if href.starts_with("https://") {
                let text = strip_html(inner);
                if !text.is_empty() {
                    links.push((href, text));
                }
            }
        }
        rest = &after_tag[close + 4..];
    }
    links
}

fn attribute(tag: &str, name: &str) -> Option<String> {
    let pattern = format!("{name}=");
    let start = tag.find(&pattern)? + pattern.len();
    let rest = &tag[start..];
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let end = rest[1..].find(quote)?;
    Some(decode_html_entities(&rest[1..=end]).into_owned())
}

/// Heuristic for bot-protection interstitials that should be treated as an
/// empty result, never retried aggressively.
#[must_use]
pub fn looks_like_bot_challenge(body: &str) -> bool {
    let head: String = body.chars().take(2048).collect::<String>().to_lowercase();
    head.contains("captcha")
        || head.contains("are you a robot")
        || head.contains("cf-challenge")
        || head.contains("request unsuccessful")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_decodes_entities() {
        let html = "<p>OData &amp; <b>CDS</b> services</p>";
        assert_eq!(strip_html(html), "OData & CDS services");
    }

    #[test]
    fn extracts_https_links_only() {
        let html = r#"<a href="https://community.sap.com/t5/post/1">A &lt;post&gt;</a>
                      <a href="/relative">skip</a>
                      <a href='https://example.com'><span>Nested</span> text</a>"#;
        let links = extract_links(html);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].0, "https://community.sap.com/t5/post/1");
        assert_eq!(links[0].1, "A <post>");
        assert_eq!(links[1].1, "Nested text");
    }

    #[test]
    fn detects_bot_challenges() {
        assert!(looks_like_bot_challenge("<html>Request unsuccessful. Incapsula..."));
        assert!(!looks_like_bot_challenge("<html><body>Normal results</body></html>"));
    }
}
