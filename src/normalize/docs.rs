//! Doc comment cleaning and grouping

use crate::parsing::{SyntaxKind, SyntaxNode};

/// Strip comment markers from one raw comment.
///
/// Handles `//`, `#`, `/* */` and `/** */`; leading `*` on block lines is
/// dropped. Empty first and last lines are removed.
pub fn clean_comment(raw: &str) -> String {
    let trimmed = raw.trim();
    let lines: Vec<String> = if let Some(body) = trimmed.strip_prefix("/*") {
        let body = body.strip_suffix("*/").unwrap_or(body);
        let body = body.strip_prefix('*').unwrap_or(body);
        body.lines()
            .map(|line| {
                let line = line.trim();
                let line = line.strip_prefix('*').unwrap_or(line);
                line.strip_prefix(' ').unwrap_or(line).trim_end().to_string()
            })
            .collect()
    } else {
        trimmed
            .lines()
            .map(|line| {
                let line = line.trim();
                let line = line
                    .strip_prefix("//")
                    .or_else(|| line.strip_prefix('#'))
                    .unwrap_or(line);
                line.strip_prefix(' ').unwrap_or(line).trim_end().to_string()
            })
            .collect()
    };

    let start = lines
        .iter()
        .position(|line| !line.is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .map_or(start, |last| last + 1);
    lines[start..end].join("\n")
}

/// Joined text of a run of adjacent comments, `None` when nothing remains
pub(crate) fn comment_group(comments: &[&SyntaxNode]) -> Option<String> {
    let parts: Vec<String> = comments
        .iter()
        .filter(|node| matches!(node.kind, SyntaxKind::Comment { .. }))
        .filter_map(|node| node.text.as_deref())
        .map(clean_comment)
        .filter(|text| !text.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Range;

    #[test]
    fn test_line_comments() {
        assert_eq!(clean_comment("// Global variable"), "Global variable");
        assert_eq!(clean_comment("# A global variable"), "A global variable");
        assert_eq!(clean_comment("//no space"), "no space");
    }

    #[test]
    fn test_block_comments() {
        assert_eq!(clean_comment("/* Comprehensive struct. */"), "Comprehensive struct.");
        assert_eq!(
            clean_comment("/**\n * First line\n * Second line\n */"),
            "First line\nSecond line"
        );
    }

    #[test]
    fn test_group_joins_lines() {
        let first = SyntaxNode::new(SyntaxKind::Comment { block: false }, Range::new(0, 0, 0, 9))
            .with_text("// Process");
        let second = SyntaxNode::new(SyntaxKind::Comment { block: false }, Range::new(1, 0, 1, 12))
            .with_text("// all items");
        assert_eq!(
            comment_group(&[&first, &second]).as_deref(),
            Some("Process\nall items")
        );

        let empty = SyntaxNode::new(SyntaxKind::Comment { block: false }, Range::new(0, 0, 0, 2))
            .with_text("//");
        assert_eq!(comment_group(&[&empty]), None);
    }
}
