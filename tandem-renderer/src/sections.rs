//! Section decomposition — a body as an ordered list of (heading, text) pairs.
//!
//! Every heading level splits a section; recomposition always writes `##`.
//! Stamp lines are dropped on the way in. Lines inside fenced code blocks are
//! never headings.

use std::sync::OnceLock;

use regex::Regex;
use tandem_core::stamp::is_stamp_line;

static HEADING_RE: OnceLock<Regex> = OnceLock::new();

fn heading_re() -> &'static Regex {
    HEADING_RE.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("heading pattern is valid"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// `None` for text that precedes the first heading (or a body with no
    /// headings at all); rendered without a heading line.
    pub heading: Option<String>,
    /// Trimmed section text.
    pub body: String,
}

impl Section {
    pub fn new(heading: Option<&str>, body: &str) -> Self {
        Self {
            heading: heading.map(str::to_string),
            body: body.to_string(),
        }
    }

    fn render(&self) -> String {
        match (&self.heading, self.body.is_empty()) {
            (Some(heading), true) => format!("## {heading}"),
            (Some(heading), false) => format!("## {heading}\n\n{}", self.body),
            (None, _) => self.body.clone(),
        }
    }
}

fn heading_text(line: &str) -> Option<String> {
    heading_re()
        .captures(line.trim_end())
        .map(|caps| caps[2].trim().to_string())
}

pub(crate) fn is_fence(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("```") || line.starts_with("~~~")
}

/// Split `body` into sections.
pub fn decompose(body: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut heading: Option<String> = None;
    let mut lines: Vec<&str> = Vec::new();
    let mut in_fence = false;

    for line in body.lines() {
        if is_stamp_line(line) {
            continue;
        }
        if is_fence(line) {
            in_fence = !in_fence;
        } else if !in_fence {
            if let Some(next) = heading_text(line) {
                push_section(&mut sections, heading.take(), &lines);
                heading = Some(next);
                lines.clear();
                continue;
            }
        }
        lines.push(line);
    }
    push_section(&mut sections, heading, &lines);
    sections
}

fn push_section(sections: &mut Vec<Section>, heading: Option<String>, lines: &[&str]) {
    let body = lines.join("\n").trim().to_string();
    if heading.is_none() && body.is_empty() {
        return;
    }
    sections.push(Section { heading, body });
}

/// Join sections with one blank line between them.
pub fn recompose(sections: &[Section]) -> String {
    sections
        .iter()
        .map(Section::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_of_any_level_split_sections() {
        let body = "# Title\n\nintro\n\n### Deep\n- a\n- b\n";
        assert_eq!(
            decompose(body),
            vec![
                Section::new(Some("Title"), "intro"),
                Section::new(Some("Deep"), "- a\n- b"),
            ]
        );
    }

    #[test]
    fn body_without_headings_is_one_headless_section() {
        let sections = decompose("\n- item one\n`inline`\n\n");
        assert_eq!(sections, vec![Section::new(None, "- item one\n`inline`")]);
        assert_eq!(recompose(&sections), "- item one\n`inline`");
    }

    #[test]
    fn preamble_is_kept_before_first_heading() {
        let sections = decompose("Read me first.\n\n## Setup\n\nrun it");
        assert_eq!(sections[0], Section::new(None, "Read me first."));
        assert_eq!(recompose(&sections), "Read me first.\n\n## Setup\n\nrun it");
    }

    #[test]
    fn stamp_lines_are_dropped() {
        let body = "<!-- Last synced: 2024-05-01T12:00:00.000Z -->\n\
                    <!-- Source: /a.md -->\n\
                    <!-- Sync version: 1.0.0 -->\n\n## A\n\ntext";
        assert_eq!(decompose(body), vec![Section::new(Some("A"), "text")]);
    }

    #[test]
    fn hashes_inside_fences_are_not_headings() {
        let body = "## Build\n\n```sh\n# comment\nmake\n```";
        let sections = decompose(body);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body, "```sh\n# comment\nmake\n```");
    }

    #[test]
    fn empty_heading_survives_recompose() {
        let sections = decompose("## Empty\n## Next\n\nx");
        assert_eq!(recompose(&sections), "## Empty\n\n## Next\n\nx");
    }

    #[test]
    fn recompose_then_decompose_keeps_pairing() {
        let sections = vec![
            Section::new(Some("Commands"), "- `make test`"),
            Section::new(Some("Notes"), "line one\n\nline two"),
        ];
        assert_eq!(decompose(&recompose(&sections)), sections);
    }
}
