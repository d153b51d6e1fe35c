//! Deterministic URL generation for catalog documents.
//!
//! Maps `(library, relative file, content, config)` to a canonical public
//! documentation URL. Strategies are selected by a dispatch table on the
//! library identifier with a generic fallback; the resolver never fails on
//! malformed input, it returns `None` and callers render "URL unavailable".

use once_cell::sync::Lazy;
use regex::Regex;

use crate::frontmatter;
use crate::text::github_anchor;
use crate::types::{AnchorStyle, UrlConfig};

static LOIO_COMMENT_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"<!--\s*loio([0-9a-f]{32})\s*-->").unwrap()
});

static FILENAME_UUID_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"([0-9a-f]{32}|[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})")
        .unwrap()
});

type Strategy = fn(&str, &str, &UrlConfig) -> Option<String>;

/// Dispatch table from library identifier to strategy.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("/sapui5", topic_id_strategy),
    ("/openui5-api", api_reference_strategy),
    ("/openui5-samples", sample_strategy),
    ("/wdi5", docsify_strategy),
    ("/abap-docs-758", abap_strategy),
    ("/abap-docs-cloud", abap_strategy),
];

/// Resolves the canonical public URL for a document.
///
/// Returns `None` when no strategy produces a URL and the generic fallback
/// cannot either (e.g. empty base URL).
#[must_use]
pub fn resolve_url(
    library: &str,
    rel_file: &str,
    content: &str,
    config: &UrlConfig,
) -> Option<String> {
    let strategy = STRATEGIES
        .iter()
        .find(|(id, _)| *id == library)
        .map(|(_, strategy)| *strategy);

    if let Some(strategy) = strategy {
        if let Some(url) = strategy(rel_file, content, config) {
            return validate(url);
        }
    }
    validate(generic_strategy(rel_file, content, config)?)
}

/// Resolves a section URL: the parent URL plus an anchor in the library's
/// configured style.
#[must_use]
pub fn resolve_section_url(
    library: &str,
    rel_file: &str,
    content: &str,
    heading: &str,
    config: &UrlConfig,
) -> Option<String> {
    let base = resolve_url(library, rel_file, content, config)?;
    Some(append_anchor(base, heading, config.anchor_style))
}

fn append_anchor(url: String, heading: &str, style: AnchorStyle) -> String {
    let slug = github_anchor(heading);
    if slug.is_empty() {
        return url;
    }
    match style {
        AnchorStyle::GithubFlavored => format!("{url}#{slug}"),
        AnchorStyle::DocsifyFlavored => format!("{url}?id={slug}"),
        AnchorStyle::Raw => url,
    }
}

/// Preferred stable identifier: front-matter `id`, then `slug`, then the
/// filename without extension.
fn preferred_id<'a>(rel_file: &'a str, content: &str) -> Option<String> {
    let (fm, _) = frontmatter::split(content);
    if let Some(id) = fm.get("id").or_else(|| fm.get("slug")) {
        return Some(id.to_string());
    }
    let stem = file_stem(rel_file)?;
    Some(stem.to_string())
}

fn file_stem(rel_file: &str) -> Option<&str> {
    let name = rel_file.rsplit('/').next()?;
    let stem = name.split_once('.').map_or(name, |(stem, _)| stem);
    if stem.is_empty() { None } else { Some(stem) }
}

/// Topic-id pages: a `loio<hex>` comment or a UUID-bearing filename maps to
/// `<base>/#/topic/<id>`.
fn topic_id_strategy(rel_file: &str, content: &str, config: &UrlConfig) -> Option<String> {
    let topic = LOIO_COMMENT_RE
        .captures(content)
        .and_then(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .or_else(|| {
            let name = rel_file.rsplit('/').next()?;
            FILENAME_UUID_RE
                .captures(name)
                .and_then(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        })?;
    Some(format!("{}/#/topic/{topic}", config.base_url))
}

/// Docsify sites: `<base>/#/<section>/<id>`, section taken from the path
/// prefix when the file is nested.
fn docsify_strategy(rel_file: &str, content: &str, config: &UrlConfig) -> Option<String> {
    let id = preferred_id(rel_file, content)?;
    let section = rel_file.rsplit_once('/').map(|(dir, _)| dir);
    match section {
        Some(dir) if !dir.is_empty() => Some(format!("{}/#/{dir}/{id}", config.base_url)),
        _ => Some(format!("{}/#/{id}", config.base_url)),
    }
}

/// API reference sources: `src/<lib>/src/<ns...>/<Name>.js` yields
/// `<base>/#/api/<ns>.<Name>`.
fn api_reference_strategy(rel_file: &str, _content: &str, config: &UrlConfig) -> Option<String> {
    let stripped = rel_file.strip_suffix(".js")?;
    // Take the path after the last `src/` segment: that is the namespace
    // tree regardless of how the repository nests its module roots.
    let module_path = stripped
        .rsplit_once("src/")
        .map_or(stripped, |(_, tail)| tail);
    if module_path.is_empty() || module_path.contains("..") {
        return None;
    }
    let qualified = module_path.replace('/', ".");
    // A qualified control name has at least one namespace segment and a
    // capitalized leaf.
    let (_, leaf) = qualified.rsplit_once('.')?;
    if !leaf.chars().next().is_some_and(char::is_uppercase) {
        return None;
    }
    Some(format!("{}/#/api/{qualified}", config.base_url))
}

/// Demo kit samples: `<base>/entity/<control>/sample/<sampleName>`.
fn sample_strategy(rel_file: &str, _content: &str, config: &UrlConfig) -> Option<String> {
    let (_, after) = rel_file.rsplit_once("sample/")?;
    let control = after.split('/').next()?;
    if control.is_empty() {
        return None;
    }
    Some(format!(
        "{}/entity/{control}/sample/{control}",
        config.base_url
    ))
}

/// ABAP keyword documentation: `<base>/<filename>.html`; the flavored base
/// is already selected by the caller via the registry.
fn abap_strategy(rel_file: &str, _content: &str, config: &UrlConfig) -> Option<String> {
    let stem = file_stem(rel_file)?;
    Some(format!("{}/{stem}.html", config.base_url))
}

/// Generic fallback: base URL + path pattern with `{file}` substituted by
/// the preferred identifier, prefixed by the directory section when the
/// pattern expects a bare file.
fn generic_strategy(rel_file: &str, content: &str, config: &UrlConfig) -> Option<String> {
    if config.base_url.is_empty() {
        return None;
    }
    let id = preferred_id(rel_file, content)?;
    let section = rel_file.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    let file = if section.is_empty() {
        id
    } else {
        format!("{section}/{id}")
    };
    Some(format!(
        "{}{}",
        config.base_url,
        config.path_pattern.replace("{file}", &file)
    ))
}

fn validate(url: String) -> Option<String> {
    url::Url::parse(&url)
        .ok()
        .filter(|parsed| parsed.scheme() == "https")
        .map(|_| url)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn config(base: &str, pattern: &str, style: AnchorStyle) -> UrlConfig {
        UrlConfig {
            base_url: base.into(),
            path_pattern: pattern.into(),
            anchor_style: style,
        }
    }

    #[test]
    fn topic_id_from_loio_comment() {
        let cfg = config("https://ui5.sap.com", "/topic/{file}", AnchorStyle::Raw);
        let url = resolve_url(
            "/sapui5",
            "06_SAP_Fiori_Elements/column-micro-chart.md",
            "<!-- loio640cabfd35c3469aacf31be28924d50d -->\n# Column Micro Chart\n",
            &cfg,
        );
        assert_eq!(
            url.as_deref(),
            Some("https://ui5.sap.com/#/topic/640cabfd35c3469aacf31be28924d50d")
        );
    }

    #[test]
    fn topic_id_from_filename_uuid() {
        let cfg = config("https://ui5.sap.com", "/topic/{file}", AnchorStyle::Raw);
        let url = resolve_url(
            "/sapui5",
            "04_Essentials/data-binding-91f0652b418f41a3916fb401a1c6a6a0.md",
            "# Data Binding\n",
            &cfg,
        );
        assert_eq!(
            url.as_deref(),
            Some("https://ui5.sap.com/#/topic/91f0652b418f41a3916fb401a1c6a6a0")
        );
    }

    #[test]
    fn api_reference_from_source_path() {
        let cfg = config("https://sdk.openui5.org", "/api/{file}", AnchorStyle::Raw);
        let url = resolve_url("/openui5-api", "src/sap.m/src/sap/m/Button.js", "", &cfg);
        assert_eq!(url.as_deref(), Some("https://sdk.openui5.org/#/api/sap.m.Button"));
    }

    #[test]
    fn docsify_prefers_front_matter_id() {
        let cfg = config(
            "https://ui5-community.github.io/wdi5",
            "/#/{file}",
            AnchorStyle::DocsifyFlavored,
        );
        let url = resolve_url("/wdi5", "locators.md", "---\nid: locators\n---\n# Locators\n", &cfg);
        assert_eq!(
            url.as_deref(),
            Some("https://ui5-community.github.io/wdi5/#/locators")
        );
    }

    #[test]
    fn sample_urls_use_the_control_segment() {
        let cfg = config("https://ui5.sap.com", "/entity/{file}", AnchorStyle::Raw);
        let url = resolve_url(
            "/openui5-samples",
            "sap/m/demokit/sample/Wizard/Page.view.xml",
            "",
            &cfg,
        );
        assert_eq!(
            url.as_deref(),
            Some("https://ui5.sap.com/entity/Wizard/sample/Wizard")
        );
    }

    #[test]
    fn abap_maps_filename_to_html() {
        let cfg = config(
            "https://help.sap.com/doc/abapdocu_758_index_htm/7.58/en-US",
            "/{file}.html",
            AnchorStyle::Raw,
        );
        let url = resolve_url("/abap-docs-758", "abenclass.md", "# CLASS\n", &cfg);
        assert_eq!(
            url.as_deref(),
            Some("https://help.sap.com/doc/abapdocu_758_index_htm/7.58/en-US/abenclass.html")
        );
    }

    #[test]
    fn generic_fallback_composes_section_and_id() {
        let cfg = config("https://cap.cloud.sap/docs", "/{file}", AnchorStyle::GithubFlavored);
        let url = resolve_url("/cap", "guides/providing-services.md", "# Providing\n", &cfg);
        assert_eq!(
            url.as_deref(),
            Some("https://cap.cloud.sap/docs/guides/providing-services")
        );
    }

    #[test]
    fn section_urls_carry_style_anchors() {
        let cfg = config("https://cap.cloud.sap/docs", "/{file}", AnchorStyle::GithubFlavored);
        let url = resolve_section_url(
            "/cap",
            "guides/providing-services.md",
            "# Providing\n",
            "Custom Handlers",
            &cfg,
        );
        assert_eq!(
            url.as_deref(),
            Some("https://cap.cloud.sap/docs/guides/providing-services#custom-handlers")
        );

        let docsify = config(
            "https://ui5-community.github.io/wdi5",
            "/#/{file}",
            AnchorStyle::DocsifyFlavored,
        );
        let url = resolve_section_url("/wdi5", "locators.md", "", "Control Selectors", &docsify);
        assert_eq!(
            url.as_deref(),
            Some("https://ui5-community.github.io/wdi5/#/locators?id=control-selectors")
        );
    }

    #[test]
    fn malformed_input_yields_none_not_panic() {
        let cfg = config("", "/{file}", AnchorStyle::Raw);
        assert!(resolve_url("/unknown", "", "", &cfg).is_none());

        let cfg = config("not a url", "/{file}", AnchorStyle::Raw);
        assert!(resolve_url("/unknown", "x.md", "", &cfg).is_none());
    }

    #[test]
    fn resolved_urls_are_https() {
        let cfg = config("http://insecure.example", "/{file}", AnchorStyle::Raw);
        assert!(resolve_url("/cap", "a.md", "", &cfg).is_none());
    }
}
