use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tandem_core::{SyncConfig, EXCLUDED_DIRS};

use crate::error::{io_err, DaemonError};

/// Events for the same path inside this window collapse into one.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);
/// Events for a path the processor wrote within this window are ignored.
pub const SELF_WRITE_WINDOW: Duration = Duration::from_secs(2);

/// Roots to watch: the three global command roots, plus `project` if given.
/// Roots that do not exist are left out.
pub fn watch_roots(config: &SyncConfig, project: Option<&Path>) -> Vec<PathBuf> {
    let mut roots = vec![
        config.commands.source.clone(),
        config.commands.claude.clone(),
        config.commands.windsurf.clone(),
    ];
    roots.extend(project.map(Path::to_path_buf));
    roots.retain(|root| root.is_dir());
    roots.dedup();
    roots
}

/// `root` and every directory below it, pruning [`EXCLUDED_DIRS`].
pub fn collect_dirs(root: &Path) -> Result<Vec<PathBuf>, DaemonError> {
    let mut dirs = vec![root.to_path_buf()];
    let mut cursor = 0;
    while cursor < dirs.len() {
        let current = dirs[cursor].clone();
        cursor += 1;
        let entries = match fs::read_dir(&current) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => continue,
            Err(err) => return Err(io_err(&current, err)),
        };
        for entry in entries {
            let entry = entry.map_err(|e| io_err(&current, e))?;
            let ty = entry.file_type().map_err(|e| io_err(entry.path(), e))?;
            if ty.is_dir() && !is_excluded_dir(&entry.file_name().to_string_lossy()) {
                dirs.push(entry.path());
            }
        }
    }
    dirs.sort();
    dirs.dedup();
    Ok(dirs)
}

/// Markdown files only; the accessor's `.tandem.tmp` files never match.
pub fn is_watched_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

/// A path inside an excluded directory (`node_modules`, `.git`, ...).
pub fn in_excluded_dir(path: &Path) -> bool {
    path.parent().is_some_and(|parent| {
        parent
            .components()
            .any(|c| is_excluded_dir(&c.as_os_str().to_string_lossy()))
    })
}

fn is_excluded_dir(name: &str) -> bool {
    EXCLUDED_DIRS.contains(&name)
}
