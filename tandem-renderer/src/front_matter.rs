//! Front-matter parsing for the rule and workflow dialects.
//!
//! The block opens with a first line of exactly `---` and closes on the next
//! lone `---`. Without a closing delimiter the document has no front-matter.
//! Only top-level `key: value` pairs are read; surrounding double quotes are
//! stripped and unknown keys are ignored.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

pub const RULE_DESCRIPTION_PLACEHOLDER: &str =
    "\"🤖 AI: Please add a clear description of when this rule should apply\"";
pub const WORKFLOW_DESCRIPTION_PLACEHOLDER: &str =
    "\"🤖 AI: Please add a clear description of what this workflow does\"";

/// When an editor applies a rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Manual,
    #[default]
    ModelDecision,
    AlwaysOff,
    AlwaysOn,
    Glob,
}

impl Trigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::Manual => "manual",
            Trigger::ModelDecision => "model_decision",
            Trigger::AlwaysOff => "always_off",
            Trigger::AlwaysOn => "always_on",
            Trigger::Glob => "glob",
        }
    }

    /// Triggers where the model decides whether the rule applies, so it
    /// needs a description to decide with.
    pub fn wants_description(self) -> bool {
        matches!(self, Trigger::ModelDecision | Trigger::AlwaysOn)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTrigger(pub String);

impl fmt::Display for UnknownTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown trigger '{}'", self.0)
    }
}

impl std::error::Error for UnknownTrigger {}

impl FromStr for Trigger {
    type Err = UnknownTrigger;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Trigger::Manual),
            "model_decision" => Ok(Trigger::ModelDecision),
            "always_off" => Ok(Trigger::AlwaysOff),
            "always_on" => Ok(Trigger::AlwaysOn),
            "glob" => Ok(Trigger::Glob),
            other => Err(UnknownTrigger(other.to_string())),
        }
    }
}

/// One of the two front-matter shapes; `trigger` decides which.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontMatter {
    Rule {
        trigger: Trigger,
        description: Option<String>,
        globs: Option<String>,
    },
    Workflow {
        description: String,
    },
}

impl FrontMatter {
    pub fn description(&self) -> Option<&str> {
        match self {
            FrontMatter::Rule { description, .. } => description.as_deref(),
            FrontMatter::Workflow { description } => Some(description),
        }
    }
}

/// Split `content` into `(front-matter lines, rest)`.
///
/// `rest` is everything after the closing delimiter, untrimmed.
fn split(content: &str) -> Option<(Vec<&str>, &str)> {
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }
    let mut offset = first.len();
    let mut block = Vec::new();
    for line in lines {
        offset += line.len();
        if line.trim() == "---" {
            return Some((block, &content[offset..]));
        }
        block.push(line.trim_end_matches(|c: char| c == '\n' || c == '\r'));
    }
    None
}

/// Parse the front-matter block at the top of `content`, if any.
///
/// A block with neither `trigger` nor a non-empty `description` counts as
/// absent.
pub fn parse_front_matter(content: &str) -> Option<FrontMatter> {
    let (block, _) = split(content)?;

    let mut trigger = None;
    let mut description = None;
    let mut globs = None;
    for line in block {
        if line.starts_with(|c: char| c == ' ' || c == '\t') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = unquote(value.trim());
        if value.is_empty() {
            continue;
        }
        match key.trim() {
            "trigger" => trigger = Some(value.to_string()),
            "description" => description = Some(value.to_string()),
            "globs" => globs = Some(value.to_string()),
            _ => {}
        }
    }

    match (trigger, description) {
        (Some(raw), description) => {
            let trigger = raw.parse().unwrap_or_else(|e: UnknownTrigger| {
                tracing::warn!(error = %e, "unknown trigger, falling back to model_decision");
                Trigger::default()
            });
            Some(FrontMatter::Rule {
                trigger,
                description,
                globs,
            })
        }
        (None, Some(description)) => Some(FrontMatter::Workflow { description }),
        (None, None) => None,
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// `value` as a YAML scalar: double-quoted when a `:` or `#` would otherwise
/// change its meaning, verbatim when plain text is safe.
///
/// Quotes already escaped with a backslash stay as they are, so a value that
/// went through [`parse_front_matter`] comes back unchanged.
pub fn quote_scalar(value: &str) -> Cow<'_, str> {
    if !value.contains([':', '#']) {
        return Cow::Borrowed(value);
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    let mut escaped = false;
    for c in value.chars() {
        if c == '"' && !escaped {
            quoted.push('\\');
        }
        escaped = c == '\\' && !escaped;
        quoted.push(c);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

/// `content` without its front-matter block, trimmed; unchanged when there is
/// no complete block.
pub fn strip_front_matter(content: &str) -> &str {
    match split(content) {
        Some((_, rest)) => rest.trim(),
        None => content,
    }
}
