//! Heading vocabulary and inline markup between the context and rule dialects.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

use crate::sections::is_fence;

/// Which way a conversion runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Context dialect → rule dialect.
    ToRule,
    /// Rule dialect → context dialect.
    ToContext,
}

/// `(context heading, rule heading)`; each column is unique, so the two
/// lookups are inverses of each other.
pub const HEADING_MAP: &[(&str, &str)] = &[
    ("Commands", "Workflows"),
    ("Project Structure", "Architecture Guidelines"),
    ("Setup", "Project Setup Rules"),
    ("Tech Stack", "Technology Rules"),
];

/// Translate a heading; unmapped headings pass through.
pub fn adapt_heading(direction: Direction, heading: &str) -> &str {
    let found = match direction {
        Direction::ToRule => HEADING_MAP.iter().find(|(c, _)| *c == heading).map(|(_, r)| *r),
        Direction::ToContext => HEADING_MAP.iter().find(|(_, r)| *r == heading).map(|(c, _)| *c),
    };
    found.unwrap_or(heading)
}

static CODE_SPAN: OnceLock<Regex> = OnceLock::new();
static BOLD_SPAN: OnceLock<Regex> = OnceLock::new();

fn code_span() -> &'static Regex {
    CODE_SPAN.get_or_init(|| Regex::new(r"`([^`]+)`").expect("code span pattern is valid"))
}

fn bold_span() -> &'static Regex {
    BOLD_SPAN.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").expect("bold pattern is valid"))
}

/// Rewrite bullets and inline spans line by line, leaving fenced code alone.
///
/// `ToRule` turns a leading `- ` into `* ` and `` `x` `` into `**x**`;
/// `ToContext` does the opposite. Text already in the target dialect is
/// rewritten anyway, so the round trip is lossy for mixed input.
pub fn adapt_body_markup(direction: Direction, text: &str) -> String {
    let mut in_fence = false;
    let mut out = Vec::new();
    for line in text.split('\n') {
        if is_fence(line) {
            in_fence = !in_fence;
            out.push(Cow::Borrowed(line));
            continue;
        }
        if in_fence {
            out.push(Cow::Borrowed(line));
            continue;
        }
        out.push(Cow::Owned(adapt_line(direction, line)));
    }
    out.join("\n")
}

fn adapt_line(direction: Direction, line: &str) -> String {
    match direction {
        Direction::ToRule => {
            let line = match line.strip_prefix("- ") {
                Some(rest) => format!("* {rest}"),
                None => line.to_string(),
            };
            code_span().replace_all(&line, "**${1}**").into_owned()
        }
        Direction::ToContext => {
            let line = match line.strip_prefix("* ") {
                Some(rest) => format!("- {rest}"),
                None => line.to_string(),
            };
            bold_span().replace_all(&line, "`${1}`").into_owned()
        }
    }
}
