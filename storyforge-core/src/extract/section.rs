//! Splitting raw text into `=== LABEL ===` delimited blocks.

use std::collections::HashMap;

/// Match a section header line and capture its label as written.
///
/// A header is `=== LABEL ===` where the label is one or more words of
/// letters separated by spaces. Case is not significant for matching.
fn header_label(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix("===")?.strip_suffix("===")?;
    let label = inner.trim();
    if label.is_empty() {
        return None;
    }
    if label.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
        Some(label)
    } else {
        None
    }
}

/// Split text into named sections keyed by their header label.
///
/// Content between a header and the next header (or end of input) belongs
/// to that label. Lines before the first header are discarded. A label
/// that re-opens later in the text replaces its earlier content rather
/// than merging with it. Input with no headers yields an empty map.
pub fn split_sections(text: &str) -> HashMap<String, String> {
    let mut sections = HashMap::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in text.lines() {
        if let Some(label) = header_label(line) {
            if let Some((name, lines)) = current.take() {
                sections.insert(name, lines.join("\n").trim().to_string());
            }
            current = Some((label.to_string(), Vec::new()));
        } else if let Some((_, lines)) = &mut current {
            lines.push(line);
        }
    }

    if let Some((name, lines)) = current {
        sections.insert(name, lines.join("\n").trim().to_string());
    }

    sections
}

/// Split text into an ordered sequence of blocks delimited by a fixed
/// literal header such as `=== ARC ===`.
///
/// Unlike [`split_sections`] the header carries no distinguishing name, so
/// every occurrence starts a new block and order is preserved.
pub fn split_blocks(text: &str, label: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut in_block = false;

    for line in text.lines() {
        match header_label(line) {
            Some(found) if found.eq_ignore_ascii_case(label) => {
                if in_block && !current.is_empty() {
                    blocks.push(current.join("\n").trim().to_string());
                }
                current = Vec::new();
                in_block = true;
            }
            _ => {
                if in_block {
                    current.push(line);
                }
            }
        }
    }

    if in_block && !current.is_empty() {
        blocks.push(current.join("\n").trim().to_string());
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_sections() {
        let text = "preamble is dropped\n\
                    === CHARACTERS ===\n\
                    name: Gorvoth\n\
                    === LOCATIONS ===\n\
                    name: Silver Keep\n";

        let sections = split_sections(text);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections["CHARACTERS"], "name: Gorvoth");
        assert_eq!(sections["LOCATIONS"], "name: Silver Keep");
    }

    #[test]
    fn test_no_headers_yields_empty_map() {
        assert!(split_sections("just some prose\nwith lines").is_empty());
    }

    #[test]
    fn test_reopened_label_last_occurrence_wins() {
        let text = "=== CHARACTERS ===\n\
                    name: Old Bob\n\
                    === LOCATIONS ===\n\
                    name: Keep\n\
                    === CHARACTERS ===\n\
                    name: New Bob\n";

        let sections = split_sections(text);
        assert_eq!(sections["CHARACTERS"], "name: New Bob");
    }

    #[test]
    fn test_header_matching_is_case_insensitive_but_captures_as_written() {
        let sections = split_sections("=== Characters ===\nname: Bob\n");
        assert_eq!(sections["Characters"], "name: Bob");
    }

    #[test]
    fn test_header_with_loose_spacing() {
        let sections = split_sections("===  WORLD OVERVIEW  ===\nname: Aetheria\n");
        assert_eq!(sections["WORLD OVERVIEW"], "name: Aetheria");
    }

    #[test]
    fn test_non_label_lines_are_not_headers() {
        let sections = split_sections("=== 123 ===\ncontent\n");
        assert!(sections.is_empty());
    }

    #[test]
    fn test_arc_blocks_ordered() {
        let text = "=== ARC SUMMARY ===\n\
                    === ARC ===\n\
                    title: First\n\
                    === ARC ===\n\
                    title: Second\n";

        let blocks = split_blocks(text, "ARC");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], "title: First");
        assert_eq!(blocks[1], "title: Second");
    }

    #[test]
    fn test_arc_blocks_case_insensitive() {
        let blocks = split_blocks("=== arc ===\ntitle: Lower\n", "ARC");
        assert_eq!(blocks, vec!["title: Lower"]);
    }

    #[test]
    fn test_no_arc_headers() {
        assert!(split_blocks("title: floating\n", "ARC").is_empty());
    }
}
