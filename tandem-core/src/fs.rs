//! File accessor — the only place tandem touches the filesystem.
//!
//! Every operation returns `Result<_, AccessError>`; a missing file is an
//! ordinary [`AccessError::NotFound`], never a panic. All calls are async
//! (tokio::fs) and are awaited immediately by callers, so there is never more
//! than one operation in flight.
//!
//! ## `write` — atomic protocol
//!
//! 1. Normalise line endings to LF.
//! 2. Create the parent directory.
//! 3. Write to `<path>.tandem.tmp`.
//! 4. Rename to the final path (atomic on POSIX); remove the tmp on failure.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::fs;

use crate::config::SyncConfig;
use crate::error::{access_err, AccessError};
use crate::types::EXCLUDED_DIRS;

#[derive(Debug, Clone)]
pub struct FileAccessor {
    empty_read_retry: Duration,
}

impl FileAccessor {
    pub fn new(empty_read_retry: Duration) -> Self {
        Self { empty_read_retry }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.empty_read_retry)
    }

    /// Read a UTF-8 file.
    ///
    /// A read that comes back blank while the file reports a non-zero size is
    /// racing another writer; wait once for the configured delay and re-read.
    pub async fn read(&self, path: &Path) -> Result<String, AccessError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| access_err(path, e))?;
        if !content.trim().is_empty() {
            return Ok(content);
        }

        let size = fs::metadata(path)
            .await
            .map_err(|e| access_err(path, e))?
            .len();
        if size == 0 {
            return Ok(content);
        }

        tracing::debug!(path = %path.display(), size, "empty read with non-zero size, retrying");
        tokio::time::sleep(self.empty_read_retry).await;
        fs::read_to_string(path)
            .await
            .map_err(|e| access_err(path, e))
    }

    /// Atomically replace `path` with `content`, creating parents as needed.
    pub async fn write(&self, path: &Path, content: &str) -> Result<(), AccessError> {
        let tmp = PathBuf::from(format!("{}.tandem.tmp", path.display()));
        self.write_with_tmp(path, content, &tmp).await
    }

    async fn write_with_tmp(&self, path: &Path, content: &str, tmp: &Path) -> Result<(), AccessError> {
        let content = content.replace("\r\n", "\n");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| access_err(parent, e))?;
        }
        fs::write(tmp, &content)
            .await
            .map_err(|e| access_err(tmp, e))?;

        if let Err(e) = fs::rename(tmp, path).await {
            let _ = fs::remove_file(tmp).await;
            return Err(access_err(path, e));
        }
        Ok(())
    }

    /// Last-modified time of `path`.
    pub async fn modified(&self, path: &Path) -> Result<DateTime<Utc>, AccessError> {
        let meta = fs::metadata(path).await.map_err(|e| access_err(path, e))?;
        let mtime = meta.modified().map_err(|e| access_err(path, e))?;
        Ok(DateTime::<Utc>::from(mtime))
    }

    pub async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    /// Recursively list regular files under `dir` whose file name satisfies
    /// `matches`, pruning [`EXCLUDED_DIRS`]. Results are sorted.
    ///
    /// Returns `NotFound` when `dir` itself is missing; unreadable
    /// subdirectories are skipped.
    pub async fn find<F>(&self, dir: &Path, matches: F) -> Result<Vec<PathBuf>, AccessError>
    where
        F: Fn(&str) -> bool,
    {
        let mut pending = vec![dir.to_path_buf()];
        let mut found = Vec::new();
        let mut is_root = true;

        while let Some(current) = pending.pop() {
            let mut entries = match fs::read_dir(&current).await {
                Ok(entries) => entries,
                Err(e) if is_root => return Err(access_err(&current, e)),
                Err(e) => {
                    tracing::debug!(path = %current.display(), error = %e, "skipping unreadable directory");
                    continue;
                }
            };
            is_root = false;

            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::debug!(path = %current.display(), error = %e, "directory read interrupted");
                        break;
                    }
                };
                let Ok(file_type) = entry.file_type().await else {
                    continue;
                };
                let name = entry.file_name().to_string_lossy().into_owned();
                if file_type.is_dir() {
                    if !EXCLUDED_DIRS.contains(&name.as_str()) {
                        pending.push(entry.path());
                    }
                } else if file_type.is_file() && matches(&name) {
                    found.push(entry.path());
                }
            }
        }

        found.sort();
        Ok(found)
    }

    /// Regular files directly inside `dir` (no recursion), sorted.
    pub async fn list(&self, dir: &Path) -> Result<Vec<PathBuf>, AccessError> {
        let mut entries = fs::read_dir(dir).await.map_err(|e| access_err(dir, e))?;
        let mut found = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| access_err(dir, e))? {
            if entry.file_type().await.is_ok_and(|t| t.is_file()) {
                found.push(entry.path());
            }
        }
        found.sort();
        Ok(found)
    }
}

impl Default for FileAccessor {
    fn default() -> Self {
        Self::new(Duration::from_millis(crate::config::DEFAULT_EMPTY_READ_RETRY_MS))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn read_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = FileAccessor::default()
            .read(&tmp.path().join("absent.md"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::NotFound { .. }), "got: {err}");
    }

    #[tokio::test]
    async fn blank_read_of_non_empty_file_waits_and_rereads() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("CLAUDE.md");
        std::fs::write(&path, "   \n").unwrap();
        let files = FileAccessor::new(Duration::from_millis(300));

        let started = std::time::Instant::now();
        let content = files.read(&path).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(300));
        assert_eq!(content, "   \n");
    }

    #[tokio::test]
    async fn zero_length_read_does_not_wait() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("CLAUDE.md");
        std::fs::write(&path, "").unwrap();
        let files = FileAccessor::new(Duration::from_secs(30));

        let started = std::time::Instant::now();
        assert_eq!(files.read(&path).await.unwrap(), "");
        assert!(started.elapsed() < Duration::from_secs(30));
    }

    #[tokio::test]
    async fn write_creates_parents_and_cleans_tmp() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".windsurf").join("rules").join("CLAUDE.md");
        let files = FileAccessor::default();
        files.write(&path, "a\r\nb\n").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\n");
        let tmp_path = PathBuf::from(format!("{}.tandem.tmp", path.display()));
        assert!(!tmp_path.exists(), ".tandem.tmp must be cleaned up");
    }

    #[tokio::test]
    async fn find_prunes_excluded_dirs_and_filters_names() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        std::fs::create_dir_all(root.join("docs")).unwrap();
        std::fs::write(root.join("CLAUDE.md"), "x").unwrap();
        std::fs::write(root.join("docs/AGENTS.md"), "x").unwrap();
        std::fs::write(root.join("docs/notes.txt"), "x").unwrap();
        std::fs::write(root.join("node_modules/pkg/CLAUDE.md"), "x").unwrap();

        let found = FileAccessor::default()
            .find(root, |name| name.ends_with(".md"))
            .await
            .unwrap();
        assert_eq!(found, vec![root.join("CLAUDE.md"), root.join("docs/AGENTS.md")]);
    }

    #[tokio::test]
    async fn find_on_missing_root_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let result = FileAccessor::default()
            .find(&tmp.path().join("nope"), |_| true)
            .await;
        assert!(matches!(result, Err(AccessError::NotFound { .. })));
    }

    #[tokio::test]
    async fn list_is_flat_and_sorted() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("nested")).unwrap();
        std::fs::write(tmp.path().join("b.toml"), "x").unwrap();
        std::fs::write(tmp.path().join("a.md"), "x").unwrap();
        std::fs::write(tmp.path().join("nested/c.md"), "x").unwrap();

        let found = FileAccessor::default().list(tmp.path()).await.unwrap();
        assert_eq!(found, vec![tmp.path().join("a.md"), tmp.path().join("b.toml")]);
    }

    #[tokio::test]
    async fn exists_and_modified() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.md");
        let files = FileAccessor::default();
        assert!(!files.exists(&path).await);
        std::fs::write(&path, "x").unwrap();
        assert!(files.exists(&path).await);
        let modified = files.modified(&path).await.unwrap();
        assert!(modified <= Utc::now());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn rename_failure_leaves_original_and_cleans_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let readonly_dir = root.path().join("readonly");
        std::fs::create_dir_all(&readonly_dir).unwrap();
        let path = readonly_dir.join("file.md");
        std::fs::write(&path, "original").unwrap();

        let mut perms = std::fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o555);
        std::fs::set_permissions(&readonly_dir, perms).unwrap();

        let tmp_dir = TempDir::new().unwrap();
        let tmp_path = tmp_dir.path().join("file.md.tandem.tmp");
        let result = FileAccessor::default()
            .write_with_tmp(&path, "new content", &tmp_path)
            .await;

        let mut perms = std::fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&readonly_dir, perms).unwrap();

        // Running as root bypasses directory permissions; only assert when it failed.
        if result.is_err() {
            assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");
            assert!(!tmp_path.exists(), ".tandem.tmp should be cleaned up");
        }
    }
}
