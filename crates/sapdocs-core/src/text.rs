//! Text normalization helpers shared by the harvester, scorer and resolver.

/// Slugify a heading title: lowercase, non-alphanumeric runs collapsed to a
/// single `-`, no leading or trailing dash.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// GitHub-flavored anchor slug: lowercase, spaces to dashes, punctuation
/// dropped. Differs from [`slugify`] in that consecutive dashes survive.
#[must_use]
pub fn github_anchor(heading: &str) -> String {
    let mut anchor = String::with_capacity(heading.len());
    for ch in heading.trim().chars() {
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                anchor.push(lower);
            }
        } else if ch == ' ' || ch == '-' {
            anchor.push('-');
        }
        // Other punctuation is dropped entirely.
    }
    anchor
}

/// Lowercased whitespace tokens of at least one character.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '.' && c != '-')
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Levenshtein edit distance with an early-exit bound.
///
/// Returns `bound + 1` as soon as the distance provably exceeds `bound`,
/// which keeps the fuzzy-title stage cheap on long candidate titles.
#[must_use]
pub fn levenshtein_bounded(a: &str, b: &str, bound: usize) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > bound {
        return bound + 1;
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
            row_min = row_min.min(curr[j + 1]);
        }
        if row_min > bound {
            return bound + 1;
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Extract the first non-heading, non-empty line of a markdown body.
/// HTML comments (topic-id markers and the like) are skipped too.
#[must_use]
pub fn first_text_line(body: &str) -> Option<String> {
    let mut in_fence = false;
    for line in body.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence
            || trimmed.is_empty()
            || trimmed.starts_with('#')
            || trimmed.starts_with("<!--")
        {
            continue;
        }
        return Some(trimmed.to_string());
    }
    None
}

/// Character-windowed excerpt around the first case-insensitive occurrence
/// of `needle`, or the head of the text when there is no match.
#[must_use]
pub fn excerpt_around(text: &str, needle: &str, max_chars: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let needle_lower = needle.to_lowercase();
    let needle_chars: Vec<char> = needle_lower.chars().collect();

    let mut match_pos = None;
    if !needle_chars.is_empty() && needle_chars.len() <= chars.len() {
        'outer: for start in 0..=(chars.len() - needle_chars.len()) {
            for (offset, nc) in needle_chars.iter().enumerate() {
                if !chars[start + offset].to_lowercase().eq(nc.to_lowercase()) {
                    continue 'outer;
                }
            }
            match_pos = Some(start);
            break;
        }
    }

    let (start, end) = match match_pos {
        Some(pos) => {
            let context = max_chars.saturating_sub(needle_chars.len()) / 2;
            let start = pos.saturating_sub(context);
            let end = (pos + needle_chars.len() + context).min(chars.len());
            (start, end.min(start + max_chars))
        },
        None => (0, max_chars.min(chars.len())),
    };

    let mut excerpt = String::with_capacity((end - start) * 4 + 6);
    if start > 0 {
        excerpt.push_str("...");
    }
    excerpt.extend(&chars[start..end]);
    if end < chars.len() {
        excerpt.push_str("...");
    }
    excerpt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_runs() {
        assert_eq!(slugify("Column Micro Chart"), "column-micro-chart");
        assert_eq!(slugify("OData  V4 -- Basics!"), "odata-v4-basics");
        assert_eq!(slugify("  leading & trailing  "), "leading-trailing");
    }

    #[test]
    fn github_anchor_keeps_double_dashes() {
        assert_eq!(github_anchor("Step 1 -- Setup"), "step-1----setup");
        assert_eq!(github_anchor("What's New?"), "whats-new");
    }

    #[test]
    fn levenshtein_exact_and_bounded() {
        assert_eq!(levenshtein_bounded("button", "button", 2), 0);
        assert_eq!(levenshtein_bounded("buton", "button", 2), 1);
        assert_eq!(levenshtein_bounded("chart", "charm", 2), 1);
        // Distance 4 with bound 2 must exit early with bound + 1.
        assert_eq!(levenshtein_bounded("wizard", "table", 2), 3);
    }

    #[test]
    fn first_text_line_skips_headings_and_fences() {
        let body = "# Title\n\n```js\nconst x = 1;\n```\n\n## Sub\nThe actual text.\n";
        assert_eq!(first_text_line(body).as_deref(), Some("The actual text."));
        assert_eq!(first_text_line("# only a heading\n"), None);
    }

    #[test]
    fn excerpt_centers_on_match() {
        let text = "aaaa bbbb cccc needle dddd eeee ffff";
        let excerpt = excerpt_around(text, "needle", 20);
        assert!(excerpt.contains("needle"));
        assert!(excerpt.starts_with("..."));
        assert!(excerpt.chars().count() <= 20 + 6);
    }

    #[test]
    fn excerpt_without_match_truncates_head() {
        let excerpt = excerpt_around("short body", "zzz", 5);
        assert_eq!(excerpt, "short...");
    }
}
