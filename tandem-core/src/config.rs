//! Immutable sync configuration, resolved once at startup.
//!
//! # Storage layout
//!
//! ```text
//! ~/.config/tandem/config.yaml   (optional — every key may be omitted)
//! ```
//!
//! # API pattern
//!
//! - `load_at(home)` — explicit home; used in tests with `TempDir`
//! - `load()` — derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! The resolved [`SyncConfig`] is passed by reference to every component;
//! nothing looks paths up on its own.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_CONTEXT_SOURCE: &str = "~/.config/ai/global";
pub const DEFAULT_CONTEXT_CLAUDE: &str = "~/dotfiles/claude/.claude/CLAUDE.md";
pub const DEFAULT_CONTEXT_WINDSURF: &str = "~/dotfiles/codeium/.codeium/windsurf/memories/global_rules.md";

pub const DEFAULT_COMMANDS_SOURCE: &str = "~/dotfiles/ai/.config/ai/commands";
pub const DEFAULT_COMMANDS_CLAUDE: &str = "~/dotfiles/claude/.claude/commands";
pub const DEFAULT_COMMANDS_WINDSURF: &str = "~/dotfiles/codeium/.codeium/windsurf/global_workflows";

/// `.tera` files here override the embedded front-matter and layout templates.
pub const DEFAULT_TEMPLATES_DIR: &str = "~/.config/tandem/templates";

/// A target copy must be newer than its source by more than this to win.
pub const DEFAULT_MTIME_TOLERANCE_MS: u64 = 5_000;
/// Delay before re-reading a file that looked empty despite a non-zero size.
pub const DEFAULT_EMPTY_READ_RETRY_MS: u64 = 100;

// ---------------------------------------------------------------------------
// On-disk shape
// ---------------------------------------------------------------------------

/// Three locations of one logical document set; unset keys take defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootsFile {
    pub source: Option<String>,
    pub claude: Option<String>,
    pub windsurf: Option<String>,
}

/// Project-relative sub-paths and canonical file names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectLayout {
    pub commands_dir: PathBuf,
    pub rules_dir: PathBuf,
    pub workflows_dir: PathBuf,
    pub context_file: String,
    pub rule_file: String,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            commands_dir: PathBuf::from(".claude").join("commands"),
            rules_dir: PathBuf::from(".windsurf").join("rules"),
            workflows_dir: PathBuf::from(".windsurf").join("workflows"),
            context_file: "CLAUDE.md".to_string(),
            rule_file: "WINDSURF.md".to_string(),
        }
    }
}

/// External markdown linter invoked after every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    pub enabled: bool,
    /// Program followed by its leading arguments; the file path is appended.
    pub command: Vec<String>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: vec!["npx".to_string(), "markdownlint-cli2".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub global_context: RootsFile,
    pub commands: RootsFile,
    pub project: ProjectLayout,
    pub templates_dir: Option<String>,
    pub mtime_tolerance_ms: u64,
    pub empty_read_retry_ms: u64,
    pub lint: LintConfig,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            global_context: RootsFile::default(),
            commands: RootsFile::default(),
            project: ProjectLayout::default(),
            templates_dir: None,
            mtime_tolerance_ms: DEFAULT_MTIME_TOLERANCE_MS,
            empty_read_retry_ms: DEFAULT_EMPTY_READ_RETRY_MS,
            lint: LintConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved shape
// ---------------------------------------------------------------------------

/// Absolute locations of one logical document set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    /// Canonical location.
    pub source: PathBuf,
    /// Claude-style mirror (commands dir, or global `CLAUDE.md`).
    pub claude: PathBuf,
    /// Windsurf-style mirror (global workflows dir, or global rules file).
    pub windsurf: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub home: PathBuf,
    /// Global context: `source` is a directory, the mirrors are single files.
    pub global_context: Roots,
    /// Global command templates: all three are directories.
    pub commands: Roots,
    pub project: ProjectLayout,
    pub templates_dir: PathBuf,
    pub mtime_tolerance: Duration,
    pub empty_read_retry: Duration,
    pub lint: LintConfig,
}

impl SyncConfig {
    /// Built-in defaults resolved against `home`.
    pub fn defaults_at(home: &Path) -> Self {
        Self::resolve(home, ConfigFile::default())
    }

    /// Defaults overlaid with `~/.config/tandem/config.yaml` when present.
    pub fn load_at(home: &Path) -> Result<Self, ConfigError> {
        let path = config_path_at(home);
        if !path.exists() {
            return Ok(Self::defaults_at(home));
        }
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let file: ConfigFile = if contents.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(&contents)
                .map_err(|source| ConfigError::Parse { path, source })?
        };
        Ok(Self::resolve(home, file))
    }

    /// `load_at` convenience wrapper.
    pub fn load() -> Result<Self, ConfigError> {
        load_home().and_then(|home| Self::load_at(&home))
    }

    fn resolve(home: &Path, file: ConfigFile) -> Self {
        let pick = |value: &Option<String>, default: &str| {
            expand_home(value.as_deref().unwrap_or(default), home)
        };
        Self {
            home: home.to_path_buf(),
            global_context: Roots {
                source: pick(&file.global_context.source, DEFAULT_CONTEXT_SOURCE),
                claude: pick(&file.global_context.claude, DEFAULT_CONTEXT_CLAUDE),
                windsurf: pick(&file.global_context.windsurf, DEFAULT_CONTEXT_WINDSURF),
            },
            commands: Roots {
                source: pick(&file.commands.source, DEFAULT_COMMANDS_SOURCE),
                claude: pick(&file.commands.claude, DEFAULT_COMMANDS_CLAUDE),
                windsurf: pick(&file.commands.windsurf, DEFAULT_COMMANDS_WINDSURF),
            },
            project: file.project,
            templates_dir: pick(&file.templates_dir, DEFAULT_TEMPLATES_DIR),
            mtime_tolerance: Duration::from_millis(file.mtime_tolerance_ms),
            empty_read_retry: Duration::from_millis(file.empty_read_retry_ms),
            lint: file.lint,
        }
    }

    /// Same configuration with every global root moved under `base`.
    ///
    /// Tests use this to point the whole path table into a temp dir.
    pub fn with_roots_under(mut self, base: &Path) -> Self {
        self.global_context = Roots {
            source: base.join("global"),
            claude: base.join("claude").join("CLAUDE.md"),
            windsurf: base.join("windsurf").join("global_rules.md"),
        };
        self.commands = Roots {
            source: base.join("commands"),
            claude: base.join("claude").join("commands"),
            windsurf: base.join("windsurf").join("global_workflows"),
        };
        self.templates_dir = base.join("templates");
        self
    }

    pub fn without_lint(mut self) -> Self {
        self.lint.enabled = false;
        self
    }
}

/// `<home>/.config/tandem/config.yaml` — pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".config").join("tandem").join("config.yaml")
}

pub fn load_home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

/// Replace a leading `~` with `home`; anything else is taken verbatim.
pub fn expand_home(raw: &str, home: &Path) -> PathBuf {
    if raw == "~" {
        return home.to_path_buf();
    }
    match raw.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(raw),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn expand_home_handles_tilde_forms() {
        let home = Path::new("/home/dev");
        assert_eq!(expand_home("~", home), PathBuf::from("/home/dev"));
        assert_eq!(expand_home("~/a/b", home), PathBuf::from("/home/dev/a/b"));
        assert_eq!(expand_home("/etc/x", home), PathBuf::from("/etc/x"));
    }

    #[test]
    fn defaults_match_the_path_table() {
        let home = Path::new("/home/dev");
        let config = SyncConfig::defaults_at(home);
        assert_eq!(
            config.commands.source,
            PathBuf::from("/home/dev/dotfiles/ai/.config/ai/commands")
        );
        assert_eq!(
            config.commands.windsurf,
            PathBuf::from("/home/dev/dotfiles/codeium/.codeium/windsurf/global_workflows")
        );
        assert_eq!(config.mtime_tolerance, Duration::from_millis(5_000));
        assert_eq!(config.empty_read_retry, Duration::from_millis(100));
        assert_eq!(config.project.context_file, "CLAUDE.md");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let home = TempDir::new().unwrap();
        let config = SyncConfig::load_at(home.path()).unwrap();
        assert_eq!(config, SyncConfig::defaults_at(home.path()));
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let home = TempDir::new().unwrap();
        let path = config_path_at(home.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "commands:\n  source: ~/cmds\nmtime_tolerance_ms: 250\nlint:\n  enabled: false\n",
        )
        .unwrap();

        let config = SyncConfig::load_at(home.path()).unwrap();
        assert_eq!(config.commands.source, home.path().join("cmds"));
        assert_eq!(
            config.commands.claude,
            home.path().join("dotfiles/claude/.claude/commands")
        );
        assert_eq!(config.mtime_tolerance, Duration::from_millis(250));
        assert!(!config.lint.enabled);
        assert_eq!(config.lint.command, LintConfig::default().command);
    }

    #[test]
    fn malformed_file_reports_path() {
        let home = TempDir::new().unwrap();
        let path = config_path_at(home.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "commands: [unclosed").unwrap();

        let err = SyncConfig::load_at(home.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
        assert!(err.to_string().contains("config.yaml"));
    }
}
