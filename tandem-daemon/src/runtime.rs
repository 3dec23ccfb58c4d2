use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

use tandem_core::{SyncConfig, SyncResult};
use tandem_sync::Orchestrator;

use crate::error::{io_err, DaemonError};
use crate::paths::{
    collect_dirs, in_excluded_dir, is_watched_file, watch_roots, DEBOUNCE_WINDOW,
    SELF_WRITE_WINDOW,
};

/// One edited file, queued for the processor.
#[derive(Debug)]
struct EditJob {
    path: PathBuf,
}

/// Start the watcher and block the current thread until it exits.
pub fn start_blocking(config: SyncConfig, project: Option<PathBuf>) -> Result<(), DaemonError> {
    init_tracing("info");
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(config, project))
}

/// Watch, process, and wait for ctrl-c.
pub async fn run(config: SyncConfig, project: Option<PathBuf>) -> Result<(), DaemonError> {
    let roots = watch_roots(&config, project.as_deref());
    if roots.is_empty() {
        tracing::warn!("no existing roots to watch");
    }
    let processor = Processor::new(Orchestrator::new(config)?, project);

    let (job_tx, job_rx) = mpsc::channel::<EditJob>(64);
    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    let watcher_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let result = watcher_task(roots, job_tx, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let processor_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let result = processor_task(processor, job_rx, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down watcher");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(DaemonError::Signal(err.to_string())),
                    }
                }
            }
        })
    };

    let (watcher_result, processor_result, signal_result) =
        tokio::join!(watcher_handle, processor_handle, signal_handle);

    handle_join("watcher", watcher_result)?;
    handle_join("processor", processor_result)?;
    handle_join("signal_handler", signal_result)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Watcher
// ---------------------------------------------------------------------------

async fn watcher_task(
    roots: Vec<PathBuf>,
    job_tx: mpsc::Sender<EditJob>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
    let mut watcher: RecommendedWatcher = recommended_watcher(move |event| {
        let _ = event_tx.send(event);
    })?;

    let mut watched_dirs = HashSet::new();
    for root in &roots {
        register_tree(&mut watcher, &mut watched_dirs, root)?;
        tracing::info!(root = %root.display(), "watching");
    }

    let mut debounce = HashMap::<PathBuf, Instant>::new();

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                let event = match event {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::warn!(error = %err, "watcher event error");
                        continue;
                    }
                };
                if !is_relevant_event_kind(&event.kind) {
                    continue;
                }

                for path in event.paths {
                    if in_excluded_dir(&path) {
                        continue;
                    }
                    if path.is_dir() {
                        if roots.iter().any(|root| path.starts_with(root)) {
                            register_tree(&mut watcher, &mut watched_dirs, &path)?;
                        }
                        continue;
                    }
                    if !is_watched_file(&path) {
                        continue;
                    }
                    if !should_process_event(&mut debounce, &path, Instant::now()) {
                        continue;
                    }
                    if job_tx.send(EditJob { path }).await.is_err() {
                        tracing::debug!("processor gone, stopping watcher");
                        return Ok(());
                    }
                }
            }
        }
    }

    Ok(())
}

fn register_tree(
    watcher: &mut RecommendedWatcher,
    watched_dirs: &mut HashSet<PathBuf>,
    root: &Path,
) -> Result<(), DaemonError> {
    for dir in collect_dirs(root)? {
        if watched_dirs.insert(dir.clone()) {
            watcher.watch(&dir, RecursiveMode::NonRecursive)?;
            tracing::debug!(path = %dir.display(), "watching directory");
        }
    }
    Ok(())
}

fn is_relevant_event_kind(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

fn should_process_event(
    debounce: &mut HashMap<PathBuf, Instant>,
    path: &Path,
    now: Instant,
) -> bool {
    should_process_event_with_threshold(debounce, path, now, DEBOUNCE_WINDOW)
}

fn should_process_event_with_threshold(
    debounce: &mut HashMap<PathBuf, Instant>,
    path: &Path,
    now: Instant,
    threshold: Duration,
) -> bool {
    debounce.retain(|_, seen_at| now.duration_since(*seen_at) <= Duration::from_secs(30));
    match debounce.get(path) {
        Some(last_seen) if now.duration_since(*last_seen) < threshold => false,
        _ => {
            debounce.insert(path.to_path_buf(), now);
            true
        }
    }
}

// ---------------------------------------------------------------------------
// Processor
// ---------------------------------------------------------------------------

/// Paths the processor wrote recently, with the time of the write.
#[derive(Debug, Default)]
struct SelfWrites {
    written: HashMap<PathBuf, Instant>,
}

impl SelfWrites {
    fn record(&mut self, paths: &[PathBuf], now: Instant) {
        for path in paths {
            self.written.insert(path.clone(), now);
        }
    }

    fn is_own(&mut self, path: &Path, now: Instant, window: Duration) -> bool {
        self.written
            .retain(|_, written_at| now.duration_since(*written_at) <= window);
        self.written.contains_key(path)
    }
}

/// Handles jobs strictly in order. Own-write suppression is checked here,
/// at dequeue time, so the previous job's writes are always recorded first.
struct Processor {
    orchestrator: Orchestrator,
    project: Option<PathBuf>,
    self_writes: SelfWrites,
}

impl Processor {
    fn new(orchestrator: Orchestrator, project: Option<PathBuf>) -> Self {
        Self {
            orchestrator,
            project,
            self_writes: SelfWrites::default(),
        }
    }

    /// `None` when `path` is one of our own recent writes.
    async fn handle(&mut self, path: &Path) -> Option<SyncResult> {
        if self.self_writes.is_own(path, Instant::now(), SELF_WRITE_WINDOW) {
            tracing::debug!(path = %path.display(), "ignoring own write");
            return None;
        }

        let started = Instant::now();
        let result = self
            .orchestrator
            .dispatch(path, self.project.as_deref())
            .await;
        self.self_writes.record(&result.updated, Instant::now());

        if result.success {
            tracing::info!(
                path = %path.display(),
                processed = result.files_processed,
                updated = result.files_updated,
                duration_ms = started.elapsed().as_millis(),
                "sync completed",
            );
        } else {
            tracing::error!(path = %path.display(), "sync failed");
        }
        Some(result)
    }
}

async fn processor_task(
    mut processor: Processor,
    mut job_rx: mpsc::Receiver<EditJob>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            maybe_job = job_rx.recv() => {
                let Some(job) = maybe_job else { break };
                processor.handle(&job.path).await;
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn handle_join(
    task: &'static str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Join {
            task,
            message: err.to_string(),
        }),
    }
}

/// Install the stderr subscriber: `TANDEM_LOG`, then `RUST_LOG`, then
/// `default_level`.
pub fn init_tracing(default_level: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_env("TANDEM_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use tempfile::TempDir;
    use tokio::time::advance;

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn debounce_coalesces_rapid_events() {
        let threshold = Duration::from_millis(100);
        let mut debounce = HashMap::<PathBuf, Instant>::new();
        let path = PathBuf::from("/tmp/app/CLAUDE.md");
        let mut sync_triggers = 0usize;

        for _ in 0..5 {
            if should_process_event_with_threshold(&mut debounce, &path, Instant::now(), threshold)
            {
                sync_triggers += 1;
            }
            advance(Duration::from_millis(10)).await;
        }

        advance(Duration::from_millis(150)).await;
        assert!(should_process_event_with_threshold(
            &mut debounce,
            &path,
            Instant::now(),
            threshold
        ));
        assert_eq!(
            sync_triggers, 1,
            "rapid saves should collapse to one sync trigger"
        );
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn self_writes_expire_after_window() {
        let mut writes = SelfWrites::default();
        let path = PathBuf::from("/tmp/app/.windsurf/rules/CLAUDE.md");
        writes.record(std::slice::from_ref(&path), Instant::now());

        assert!(writes.is_own(&path, Instant::now(), SELF_WRITE_WINDOW));
        assert!(!writes.is_own(Path::new("/tmp/app/CLAUDE.md"), Instant::now(), SELF_WRITE_WINDOW));

        advance(SELF_WRITE_WINDOW + Duration::from_millis(1)).await;
        assert!(!writes.is_own(&path, Instant::now(), SELF_WRITE_WINDOW));
    }

    #[test]
    fn only_create_and_modify_are_relevant() {
        use notify::event::{CreateKind, ModifyKind, RemoveKind};
        assert!(is_relevant_event_kind(&EventKind::Create(CreateKind::File)));
        assert!(is_relevant_event_kind(&EventKind::Modify(ModifyKind::Any)));
        assert!(!is_relevant_event_kind(&EventKind::Remove(RemoveKind::File)));
    }

    #[tokio::test]
    async fn processor_ignores_its_own_writes() {
        let tmp = TempDir::new().expect("tmp");
        let project = tmp.path().join("app");
        fs::create_dir_all(&project).expect("mkdir");
        let context = project.join("CLAUDE.md");
        fs::write(&context, "watched body\n").expect("write");
        let config = SyncConfig::defaults_at(tmp.path())
            .with_roots_under(&tmp.path().join("roots"))
            .without_lint();
        let mut processor = Processor::new(
            Orchestrator::new(config).expect("orchestrator"),
            Some(project.clone()),
        );

        let first = processor.handle(&context).await.expect("processed");
        assert_eq!(first.files_updated, 1);
        let rule = project.join(".windsurf/rules/CLAUDE.md");
        assert!(fs::read_to_string(&rule).expect("rule").contains("watched body"));

        // The watcher would now report the rule write; it must not bounce back.
        assert!(processor.handle(&rule).await.is_none());
        assert_eq!(fs::read_to_string(&context).expect("context"), "watched body\n");
    }

    #[tokio::test]
    async fn processor_task_drains_queue_then_stops() {
        let tmp = TempDir::new().expect("tmp");
        let mirror_root = tmp.path().join("roots");
        let config = SyncConfig::defaults_at(tmp.path())
            .with_roots_under(&mirror_root)
            .without_lint();
        let mirror = config.commands.claude.join("deploy.md");
        fs::create_dir_all(mirror.parent().expect("parent")).expect("mkdir");
        fs::write(&mirror, "deploy steps\n").expect("write");
        let source = config.commands.source.join("deploy.md");

        let processor = Processor::new(Orchestrator::new(config).expect("orchestrator"), None);
        let (job_tx, job_rx) = mpsc::channel(4);
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
        job_tx.send(EditJob { path: mirror }).await.expect("send");
        drop(job_tx);

        processor_task(processor, job_rx, shutdown_rx).await.expect("processor");
        assert!(fs::read_to_string(&source).expect("source").contains("deploy steps"));
    }
}
