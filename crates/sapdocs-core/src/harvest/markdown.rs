//! Markdown extractor: one parent document per file plus section documents
//! for level 2-4 headings.

use crate::frontmatter;
use crate::text::{first_text_line, slugify};
use crate::types::{DocKind, Document, SectionInfo};

/// A section must carry at least this much body text to become a document.
const MIN_SECTION_BODY: usize = 100;
/// Minimum heading length for a section document.
const MIN_SECTION_TITLE: usize = 3;

/// Builds the parent document for a markdown file.
///
/// Title is the first `# ` heading, else the filename without extension.
/// Description prefers front-matter `synopsis`, else the first non-heading
/// non-empty line. Snippet count is fenced code-block openings divided by
/// two. Returns `None` for files with no usable text at all.
#[must_use]
pub fn extract_markdown(library: &str, rel_file: &str, content: &str) -> Option<Document> {
    let (fm, body) = frontmatter::split(content);

    let file_stem = rel_file
        .rsplit('/')
        .next()
        .unwrap_or(rel_file)
        .trim_end_matches(".mdx")
        .trim_end_matches(".md");

    let title = body
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("# "))
        .map_or_else(|| file_stem.to_string(), |heading| heading.trim().to_string());

    if title.is_empty() {
        return None;
    }

    let description = fm
        .get("synopsis")
        .map(str::to_string)
        .or_else(|| first_text_line(body))
        .unwrap_or_default();

    let fence_openings = body
        .lines()
        .filter(|line| line.trim_start().starts_with("```"))
        .count();

    Some(Document {
        id: doc_id(library, rel_file),
        library: library.to_string(),
        kind: DocKind::Guide,
        title,
        description,
        rel_file: rel_file.to_string(),
        snippet_count: fence_openings / 2,
        metadata: None,
        section: None,
    })
}

/// One still-accumulating section during the scan.
struct OpenSection {
    title: String,
    level: u8,
    start_line: usize,
    body: String,
}

/// Splits the body into section documents.
///
/// A section opens on any `##`/`###`/`####` heading and closes on the next
/// heading of equal or lesser level, so a `###` section lives inside the
/// enclosing `##` section and both accumulate its text. Sections below the
/// body/title length thresholds are dropped. Fenced code blocks never open
/// or close sections.
#[must_use]
pub fn extract_sections(parent: &Document, content: &str) -> Vec<Document> {
    let (_, body) = frontmatter::split(content);
    // Line numbers are reported against the full file.
    let fm_offset = content.lines().count() - body.lines().count();

    let mut sections: Vec<Document> = Vec::new();
    let mut stack: Vec<OpenSection> = Vec::new();
    let mut in_fence = false;

    for (idx, line) in body.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
        }
        let heading = if in_fence { None } else { heading_level(trimmed) };

        match heading {
            Some((level @ 2..=4, title)) => {
                while stack.last().is_some_and(|open| open.level >= level) {
                    if let Some(open) = stack.pop() {
                        close_section(parent, open, &mut sections);
                    }
                }
                // The heading line itself belongs to enclosing sections.
                for open in &mut stack {
                    open.body.push_str(line);
                    open.body.push('\n');
                }
                stack.push(OpenSection {
                    title: title.to_string(),
                    level,
                    start_line: fm_offset + idx + 1,
                    body: String::new(),
                });
            },
            Some((1, _)) => {
                while let Some(open) = stack.pop() {
                    close_section(parent, open, &mut sections);
                }
            },
            _ => {
                for open in &mut stack {
                    open.body.push_str(line);
                    open.body.push('\n');
                }
            },
        }
    }
    while let Some(open) = stack.pop() {
        close_section(parent, open, &mut sections);
    }

    // Closing order is inner-first; report sections in document order.
    sections.sort_by_key(|doc| doc.section.as_ref().map_or(0, |s| s.start_line));
    sections
}

fn close_section(parent: &Document, open: OpenSection, sections: &mut Vec<Document>) {
    if open.body.trim().len() < MIN_SECTION_BODY || open.title.len() < MIN_SECTION_TITLE {
        return;
    }
    let slug = slugify(&open.title);
    if slug.is_empty() {
        return;
    }
    sections.push(Document {
        id: format!("{}#{slug}", parent.id),
        library: parent.library.clone(),
        kind: DocKind::Section,
        title: open.title,
        description: first_text_line(&open.body).unwrap_or_default(),
        snippet_count: open
            .body
            .lines()
            .filter(|line| line.trim_start().starts_with("```"))
            .count()
            / 2,
        rel_file: parent.rel_file.clone(),
        metadata: None,
        section: Some(SectionInfo {
            parent_id: parent.id.clone(),
            level: open.level,
            start_line: open.start_line,
        }),
    });
}

fn doc_id(library: &str, rel_file: &str) -> String {
    let stem = rel_file
        .trim_end_matches(".mdx")
        .trim_end_matches(".md");
    format!("{library}/{stem}")
}

fn heading_level(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let title = line[hashes..].strip_prefix(' ')?;
    #[allow(clippy::cast_possible_truncation)]
    Some((hashes as u8, title.trim()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    const DOC: &str = "---\nsynopsis: Short summary.\n---\n# Column Micro Chart\n\nIntro paragraph about the chart.\n\n## Usage\n\nThe column micro chart shows vertical bars for a series of data points, and supports thresholds, colors and more customization than fits in one line.\n\n```xml\n<ColumnMicroChart/>\n```\n\n## API\n\nIntro to the API.\n\n### Properties\n\nProperties include size and allowColumnLabels; every property follows the standard micro chart conventions documented in the API reference for this control family.\n";

    #[test]
    fn parent_uses_heading_and_synopsis() {
        let doc = extract_markdown("/sapui5", "06_SAP_Fiori_Elements/column-micro-chart.md", DOC)
            .unwrap();
        assert_eq!(doc.id, "/sapui5/06_SAP_Fiori_Elements/column-micro-chart");
        assert_eq!(doc.title, "Column Micro Chart");
        assert_eq!(doc.description, "Short summary.");
        assert_eq!(doc.snippet_count, 1);
        assert_eq!(doc.kind, DocKind::Guide);
    }

    #[test]
    fn filename_fallback_title() {
        let doc = extract_markdown("/cap", "guides/no-heading.md", "Just text, no headings.\n")
            .unwrap();
        assert_eq!(doc.title, "no-heading");
        assert_eq!(doc.description, "Just text, no headings.");
    }

    #[test]
    fn sections_nest_and_respect_thresholds() {
        let parent =
            extract_markdown("/sapui5", "06_SAP_Fiori_Elements/column-micro-chart.md", DOC)
                .unwrap();
        let sections = extract_sections(&parent, DOC);

        let ids: Vec<&str> = sections.iter().map(|s| s.id.as_str()).collect();
        // "API" qualifies because its span includes the nested "Properties"
        // subsection; both are emitted, in document order.
        assert_eq!(
            ids,
            vec![
                "/sapui5/06_SAP_Fiori_Elements/column-micro-chart#usage",
                "/sapui5/06_SAP_Fiori_Elements/column-micro-chart#api",
                "/sapui5/06_SAP_Fiori_Elements/column-micro-chart#properties",
            ]
        );
        for section in &sections {
            let info = section.section.as_ref().unwrap();
            assert_eq!(info.parent_id, parent.id);
            assert!((2..=4).contains(&info.level));
            assert!(info.start_line > 0);
        }
    }

    #[test]
    fn short_sections_are_dropped() {
        let content = "# T\n\nIntro.\n\n## Tiny\n\nshort\n\n## Long Enough\n\nBody text long enough to pass the minimum body threshold for section extraction in this test case, padded a little more for margin.\n";
        let parent = extract_markdown("/cap", "x.md", content).unwrap();
        let sections = extract_sections(&parent, content);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Long Enough");
    }

    #[test]
    fn fenced_hashes_do_not_open_sections() {
        let content = "# T\n\nIntro.\n\n```sh\n## not a heading\n```\n\n## Real Section\n\nBody text long enough to pass the minimum body threshold for section extraction in this test case, padded a bit more.\n";
        let parent = extract_markdown("/cap", "x.md", content).unwrap();
        let sections = extract_sections(&parent, content);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Real Section");
    }

    #[test]
    fn section_line_numbers_account_for_front_matter() {
        let parent =
            extract_markdown("/sapui5", "06_SAP_Fiori_Elements/column-micro-chart.md", DOC)
                .unwrap();
        let sections = extract_sections(&parent, DOC);
        // "## Usage" is on line 8 of the full file (front matter included).
        assert_eq!(sections[0].section.as_ref().unwrap().start_line, 8);
    }
}
