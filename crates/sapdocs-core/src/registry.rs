//! Built-in registry of documentation corpora.
//!
//! The set of harvested source trees and their URL configurations is fixed
//! at compile time. Runtime code resolves user-supplied library filters
//! against this registry with fuzzy matching, so `ui5` or `cloud sdk` find
//! the right bundle without the exact `/sapui5` spelling.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::types::{AnchorStyle, Flavor, UrlConfig};

/// Extractor applied to files of a source tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorKind {
    /// Markdown guides with optional YAML front-matter.
    Markdown,
    /// JSDoc-annotated control sources (`Control.extend` + metadata block).
    Jsdoc,
    /// Framework sample trees (`.../sample/<Control>/...`).
    Sample,
}

/// One harvested source tree.
#[derive(Debug, Clone)]
pub struct SourceSpec {
    /// Repository label, for logs only.
    pub repo: &'static str,
    /// Directory relative to the configured sources root.
    pub dir: &'static str,
    /// Library identifier with leading slash.
    pub library: &'static str,
    /// Display name for the bundle.
    pub name: &'static str,
    /// Bundle description for listings.
    pub description: &'static str,
    /// Include glob, relative to `dir`.
    pub include: &'static str,
    /// Optional exclude glob.
    pub exclude: Option<&'static str>,
    /// Extractor kind for matched files.
    pub extractor: ExtractorKind,
}

/// A library entry: identifier, display metadata and URL configuration.
#[derive(Debug, Clone)]
pub struct LibraryEntry {
    /// Library identifier with leading slash.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Loose aliases accepted from `sources` filters.
    pub aliases: &'static [&'static str],
    /// URL generation settings.
    pub url: UrlConfig,
}

/// Registry of all known libraries and source trees.
pub struct Registry {
    sources: Vec<SourceSpec>,
    libraries: Vec<LibraryEntry>,
}

impl Registry {
    /// Creates the registry with the built-in corpus set.
    #[must_use]
    pub fn new() -> Self {
        let sources = vec![
            SourceSpec {
                repo: "sapui5-docs",
                dir: "sapui5/docs",
                library: "/sapui5",
                name: "SAPUI5 Documentation",
                description: "Official SAPUI5 developer guide and Fiori elements documentation",
                include: "**/*.md",
                exclude: None,
                extractor: ExtractorKind::Markdown,
            },
            SourceSpec {
                repo: "cap-docs",
                dir: "cap",
                library: "/cap",
                name: "CAP Documentation",
                description: "SAP Cloud Application Programming model guides (CDS, Node.js, Java)",
                include: "**/*.md",
                exclude: Some("**/.github/**"),
                extractor: ExtractorKind::Markdown,
            },
            SourceSpec {
                repo: "wdi5",
                dir: "wdi5/docs",
                library: "/wdi5",
                name: "wdi5 Documentation",
                description: "End-to-end test framework for UI5 applications",
                include: "**/*.md",
                exclude: None,
                extractor: ExtractorKind::Markdown,
            },
            SourceSpec {
                repo: "cloud-sdk",
                dir: "cloud-sdk/docs-js",
                library: "/cloud-sdk-js",
                name: "SAP Cloud SDK (JavaScript)",
                description: "Cloud SDK for JavaScript/TypeScript documentation",
                include: "**/*.mdx",
                exclude: None,
                extractor: ExtractorKind::Markdown,
            },
            SourceSpec {
                repo: "cloud-sdk-ai",
                dir: "cloud-sdk-ai/docs",
                library: "/cloud-sdk-ai",
                name: "SAP Cloud SDK for AI",
                description: "AI SDK for integrating SAP AI Core and generative AI hub",
                include: "**/*.{md,mdx}",
                exclude: None,
                extractor: ExtractorKind::Markdown,
            },
            SourceSpec {
                repo: "openui5",
                dir: "openui5/src",
                library: "/openui5-api",
                name: "OpenUI5 API Reference",
                description: "Control API metadata extracted from OpenUI5 sources",
                include: "**/src/**/*.js",
                exclude: Some("**/thirdparty/**"),
                extractor: ExtractorKind::Jsdoc,
            },
            SourceSpec {
                repo: "openui5",
                dir: "openui5/samples",
                library: "/openui5-samples",
                name: "OpenUI5 Samples",
                description: "Demo kit sample applications for OpenUI5 controls",
                include: "**/sample/**/*.{js,xml,json,html}",
                exclude: None,
                extractor: ExtractorKind::Sample,
            },
            SourceSpec {
                repo: "abap-docs",
                dir: "abap-docs/758",
                library: "/abap-docs-758",
                name: "ABAP Keyword Documentation (7.58)",
                description: "ABAP keyword documentation for on-premise release 7.58",
                include: "**/*.md",
                exclude: None,
                extractor: ExtractorKind::Markdown,
            },
            SourceSpec {
                repo: "abap-docs",
                dir: "abap-docs/cloud",
                library: "/abap-docs-cloud",
                name: "ABAP Keyword Documentation (Cloud)",
                description: "ABAP keyword documentation for SAP BTP ABAP Environment",
                include: "**/*.md",
                exclude: None,
                extractor: ExtractorKind::Markdown,
            },
        ];

        let libraries = vec![
            LibraryEntry {
                id: "/sapui5",
                name: "SAPUI5 Documentation",
                aliases: &["sapui5", "ui5", "fiori-elements"],
                url: UrlConfig {
                    base_url: "https://ui5.sap.com".into(),
                    path_pattern: "/topic/{file}".into(),
                    anchor_style: AnchorStyle::Raw,
                },
            },
            LibraryEntry {
                id: "/cap",
                name: "CAP Documentation",
                aliases: &["cap", "cds", "capire"],
                url: UrlConfig {
                    base_url: "https://cap.cloud.sap/docs".into(),
                    path_pattern: "/{file}".into(),
                    anchor_style: AnchorStyle::GithubFlavored,
                },
            },
            LibraryEntry {
                id: "/wdi5",
                name: "wdi5 Documentation",
                aliases: &["wdi5", "webdriver"],
                url: UrlConfig {
                    base_url: "https://ui5-community.github.io/wdi5".into(),
                    path_pattern: "/#/{file}".into(),
                    anchor_style: AnchorStyle::DocsifyFlavored,
                },
            },
            LibraryEntry {
                id: "/cloud-sdk-js",
                name: "SAP Cloud SDK (JavaScript)",
                aliases: &["cloud-sdk", "cloud-sdk-js", "sdk"],
                url: UrlConfig {
                    base_url: "https://sap.github.io/cloud-sdk/docs/js".into(),
                    path_pattern: "/{file}".into(),
                    anchor_style: AnchorStyle::GithubFlavored,
                },
            },
            LibraryEntry {
                id: "/cloud-sdk-ai",
                name: "SAP Cloud SDK for AI",
                aliases: &["cloud-sdk-ai", "ai-sdk"],
                url: UrlConfig {
                    base_url: "https://sap.github.io/ai-sdk".into(),
                    path_pattern: "/{file}".into(),
                    anchor_style: AnchorStyle::GithubFlavored,
                },
            },
            LibraryEntry {
                id: "/openui5-api",
                name: "OpenUI5 API Reference",
                aliases: &["openui5", "openui5-api", "api"],
                url: UrlConfig {
                    base_url: "https://sdk.openui5.org".into(),
                    path_pattern: "/api/{file}".into(),
                    anchor_style: AnchorStyle::Raw,
                },
            },
            LibraryEntry {
                id: "/openui5-samples",
                name: "OpenUI5 Samples",
                aliases: &["samples", "openui5-samples"],
                url: UrlConfig {
                    base_url: "https://ui5.sap.com".into(),
                    path_pattern: "/entity/{file}".into(),
                    anchor_style: AnchorStyle::Raw,
                },
            },
            LibraryEntry {
                id: "/abap-docs-758",
                name: "ABAP Keyword Documentation (7.58)",
                aliases: &["abap", "abap-docs", "abap-758"],
                url: UrlConfig {
                    base_url: "https://help.sap.com/doc/abapdocu_758_index_htm/7.58/en-US".into(),
                    path_pattern: "/{file}.html".into(),
                    anchor_style: AnchorStyle::Raw,
                },
            },
            LibraryEntry {
                id: "/abap-docs-cloud",
                name: "ABAP Keyword Documentation (Cloud)",
                aliases: &["abap-cloud", "abap-docs-cloud", "btp-abap"],
                url: UrlConfig {
                    base_url: "https://help.sap.com/doc/abapdocu_cp_index_htm/CLOUD/en-US".into(),
                    path_pattern: "/{file}.html".into(),
                    anchor_style: AnchorStyle::Raw,
                },
            },
        ];

        Self { sources, libraries }
    }

    /// All harvested source trees.
    #[must_use]
    pub fn sources(&self) -> &[SourceSpec] {
        &self.sources
    }

    /// All known libraries.
    #[must_use]
    pub fn libraries(&self) -> &[LibraryEntry] {
        &self.libraries
    }

    /// Library entry by exact identifier.
    #[must_use]
    pub fn library(&self, id: &str) -> Option<&LibraryEntry> {
        self.libraries.iter().find(|lib| lib.id == id)
    }

    /// Source directory (relative to the sources root) for a library.
    #[must_use]
    pub fn source_dir(&self, library: &str) -> Option<&'static str> {
        self.sources
            .iter()
            .find(|spec| spec.library == library)
            .map(|spec| spec.dir)
    }

    /// URL configuration for a library. An explicit ABAP flavor redirects
    /// between the on-premise and cloud corpora; `None` keeps the library
    /// as-is.
    #[must_use]
    pub fn url_config(&self, library: &str, flavor: Option<Flavor>) -> Option<&UrlConfig> {
        let effective = match (library, flavor) {
            ("/abap-docs-758", Some(Flavor::Cloud)) => "/abap-docs-cloud",
            ("/abap-docs-cloud", Some(Flavor::OnPrem)) => "/abap-docs-758",
            _ => library,
        };
        self.library(effective).map(|lib| &lib.url)
    }

    /// Resolve a loose library name to its identifier.
    ///
    /// Exact identifiers and aliases win; otherwise the best fuzzy match
    /// over names and aliases is taken. Returns `None` for garbage input.
    #[must_use]
    pub fn resolve_library(&self, input: &str) -> Option<&'static str> {
        let needle = input.trim().trim_start_matches('/').to_lowercase();
        if needle.is_empty() {
            return None;
        }

        for lib in &self.libraries {
            if lib.id.trim_start_matches('/') == needle
                || lib.aliases.iter().any(|alias| *alias == needle)
            {
                return Some(lib.id);
            }
        }

        let matcher = SkimMatcherV2::default();
        let mut best: Option<(i64, &'static str)> = None;
        for lib in &self.libraries {
            let candidates = std::iter::once(lib.name.to_lowercase())
                .chain(lib.aliases.iter().map(|alias| (*alias).to_string()));
            for candidate in candidates {
                if let Some(score) = matcher.fuzzy_match(&candidate, &needle) {
                    if best.is_none_or(|(prev, _)| score > prev) {
                        best = Some((score, lib.id));
                    }
                }
            }
        }
        best.map(|(_, id)| id)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
