//! Config file serialisation and path-resolution tests for `tandem-core`.
//!
//! Each `#[case]` is isolated — no shared state.

use std::path::{Path, PathBuf};

use rstest::rstest;
use tandem_core::config::{expand_home, ConfigFile, RootsFile, SyncConfig};
use tempfile::TempDir;

#[test]
fn default_config_file_roundtrips_through_yaml() {
    let file = ConfigFile::default();
    let yaml = serde_yaml::to_string(&file).expect("serialize");
    let back: ConfigFile = serde_yaml::from_str(&yaml).expect("deserialize");
    assert_eq!(file, back);
}

#[test]
fn overridden_roots_roundtrip_through_yaml() {
    let file = ConfigFile {
        commands: RootsFile {
            source: Some("~/cmds".to_string()),
            claude: None,
            windsurf: Some("/abs/workflows".to_string()),
        },
        ..ConfigFile::default()
    };
    let yaml = serde_yaml::to_string(&file).expect("serialize");
    let back: ConfigFile = serde_yaml::from_str(&yaml).expect("deserialize");
    assert_eq!(back.commands.source.as_deref(), Some("~/cmds"));
    assert_eq!(back.commands.claude, None);
}

#[rstest]
#[case("~", "/home/u")]
#[case("~/dotfiles/ai", "/home/u/dotfiles/ai")]
#[case("/opt/ai/commands", "/opt/ai/commands")]
#[case("relative/dir", "relative/dir")]
fn expand_home_cases(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(expand_home(raw, Path::new("/home/u")), PathBuf::from(expected));
}

#[test]
fn empty_config_file_is_all_defaults() {
    let home = TempDir::new().expect("home");
    let path = tandem_core::config::config_path_at(home.path());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "").unwrap();

    let config = SyncConfig::load_at(home.path()).expect("load");
    assert_eq!(config, SyncConfig::defaults_at(home.path()));
}

#[test]
fn roots_under_moves_every_global_location() {
    let base = TempDir::new().expect("base");
    let config = SyncConfig::defaults_at(Path::new("/home/u")).with_roots_under(base.path());
    for root in [
        &config.commands.source,
        &config.commands.claude,
        &config.commands.windsurf,
        &config.global_context.source,
        &config.global_context.claude,
        &config.global_context.windsurf,
    ] {
        assert!(root.starts_with(base.path()), "{} not under base", root.display());
    }
}
