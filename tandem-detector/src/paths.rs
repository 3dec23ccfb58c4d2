//! Counterpart paths between stores.
//!
//! Every pair is an exact inverse: mapping there and back reproduces the
//! input path for any path the forward map accepts.

use std::path::{Component, Path, PathBuf};

use tandem_core::config::{ProjectLayout, Roots};
use tandem_core::DocumentKind;

/// Start index (into `path.components()`) of the last occurrence of
/// `segment` among the directory components of `path`.
pub(crate) fn segment_index(path: &Path, segment: &Path) -> Option<usize> {
    let dirs: Vec<Component<'_>> = path.parent()?.components().collect();
    let seg: Vec<Component<'_>> = segment.components().collect();
    if seg.is_empty() || seg.len() > dirs.len() {
        return None;
    }
    (0..=dirs.len() - seg.len())
        .rev()
        .find(|&i| dirs[i..i + seg.len()] == seg[..])
}

pub(crate) fn contains_segment(path: &Path, segment: &Path) -> bool {
    segment_index(path, segment).is_some()
}

fn replace_segment(path: &Path, from: &Path, to: &Path) -> Option<PathBuf> {
    let at = segment_index(path, from)?;
    let width = from.components().count();
    let parts: Vec<Component<'_>> = path.components().collect();

    let mut out = PathBuf::new();
    for part in &parts[..at] {
        out.push(part);
    }
    out.push(to);
    for part in &parts[at + width..] {
        out.push(part);
    }
    Some(out)
}

/// `dir/NAME.md` → `dir/.windsurf/rules/NAME.md`.
pub fn context_to_rule(path: &Path, layout: &ProjectLayout) -> PathBuf {
    let name = path.file_name().unwrap_or_default();
    path.parent()
        .unwrap_or_else(|| Path::new(""))
        .join(&layout.rules_dir)
        .join(name)
}

/// `dir/.windsurf/rules/NAME.md` → `dir/NAME.md`.
///
/// Only defined when the rules directory is the immediate parent.
pub fn rule_to_context(path: &Path, layout: &ProjectLayout) -> Option<PathBuf> {
    let name = path.file_name()?;
    let parent = path.parent()?;
    if !parent.ends_with(&layout.rules_dir) {
        return None;
    }
    let depth = layout.rules_dir.components().count();
    let base = parent.ancestors().nth(depth)?;
    Some(base.join(name))
}

/// `…/.claude/commands/…` → `…/.windsurf/workflows/…`.
pub fn command_to_workflow(path: &Path, layout: &ProjectLayout) -> Option<PathBuf> {
    replace_segment(path, &layout.commands_dir, &layout.workflows_dir)
}

/// `…/.windsurf/workflows/…` → `…/.claude/commands/…`.
pub fn workflow_to_command(path: &Path, layout: &ProjectLayout) -> Option<PathBuf> {
    replace_segment(path, &layout.workflows_dir, &layout.commands_dir)
}

/// Which of the three global command roots a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalRoot {
    Source,
    Command,
    Workflow,
}

impl GlobalRoot {
    pub fn all() -> &'static [GlobalRoot] {
        &[GlobalRoot::Source, GlobalRoot::Command, GlobalRoot::Workflow]
    }

    /// Kind of the documents stored under this root.
    pub fn kind(self) -> DocumentKind {
        match self {
            GlobalRoot::Source => DocumentKind::GlobalSource,
            GlobalRoot::Command => DocumentKind::GlobalCommand,
            GlobalRoot::Workflow => DocumentKind::GlobalWorkflow,
        }
    }

    pub fn dir(self, roots: &Roots) -> &Path {
        match self {
            GlobalRoot::Source => &roots.source,
            GlobalRoot::Command => &roots.claude,
            GlobalRoot::Workflow => &roots.windsurf,
        }
    }
}

/// The same relative path under another global root.
pub fn global_counterpart(
    path: &Path,
    roots: &Roots,
    from: GlobalRoot,
    to: GlobalRoot,
) -> Option<PathBuf> {
    let rel = path.strip_prefix(from.dir(roots)).ok()?;
    Some(to.dir(roots).join(rel))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn layout() -> ProjectLayout {
        ProjectLayout::default()
    }

    #[rstest]
    #[case("/work/app/CLAUDE.md", "/work/app/.windsurf/rules/CLAUDE.md")]
    #[case("/work/app/docs/AGENTS.md", "/work/app/docs/.windsurf/rules/AGENTS.md")]
    #[case("CLAUDE.md", ".windsurf/rules/CLAUDE.md")]
    fn context_rule_inverse(#[case] context: &str, #[case] rule: &str) {
        let mapped = context_to_rule(Path::new(context), &layout());
        assert_eq!(mapped, PathBuf::from(rule));
        assert_eq!(rule_to_context(&mapped, &layout()), Some(PathBuf::from(context)));
    }

    #[test]
    fn rule_outside_rules_dir_has_no_context() {
        assert_eq!(rule_to_context(Path::new("/work/app/WINDSURF.md"), &layout()), None);
        assert_eq!(
            rule_to_context(Path::new("/work/app/.windsurf/rules/sub/X.md"), &layout()),
            None
        );
    }

    #[rstest]
    #[case("/work/app/.claude/commands/deploy.md", "/work/app/.windsurf/workflows/deploy.md")]
    #[case("/work/app/.claude/commands/ops/rollback.md", "/work/app/.windsurf/workflows/ops/rollback.md")]
    #[case("/.claude/commands/a.md", "/.windsurf/workflows/a.md")]
    fn command_workflow_inverse(#[case] command: &str, #[case] workflow: &str) {
        let to_workflow = command_to_workflow(Path::new(command), &layout()).unwrap();
        assert_eq!(to_workflow, PathBuf::from(workflow));
        assert_eq!(workflow_to_command(&to_workflow, &layout()), Some(PathBuf::from(command)));
        let to_command = workflow_to_command(Path::new(workflow), &layout()).unwrap();
        assert_eq!(command_to_workflow(&to_command, &layout()), Some(PathBuf::from(workflow)));
    }

    #[test]
    fn file_named_like_segment_is_not_a_segment() {
        assert_eq!(command_to_workflow(Path::new("/work/.claude/commands"), &layout()), None);
        assert_eq!(command_to_workflow(Path::new("/work/notes/deploy.md"), &layout()), None);
    }

    #[test]
    fn global_counterpart_keeps_relative_path() {
        let roots = Roots {
            source: PathBuf::from("/g/src"),
            claude: PathBuf::from("/g/claude"),
            windsurf: PathBuf::from("/g/windsurf"),
        };
        let path = Path::new("/g/claude/ops/deploy.md");
        assert_eq!(
            global_counterpart(path, &roots, GlobalRoot::Command, GlobalRoot::Workflow),
            Some(PathBuf::from("/g/windsurf/ops/deploy.md"))
        );
        assert_eq!(global_counterpart(path, &roots, GlobalRoot::Source, GlobalRoot::Workflow), None);
    }
}
