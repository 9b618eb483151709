//! File watching for rebuild-on-change.

use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

const DEBOUNCE: Duration = Duration::from_millis(100);

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    Created(PathBuf),
    Modified(PathBuf),
    Deleted(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::Created(path) | Self::Modified(path) | Self::Deleted(path) => path,
        }
    }
}

/// Callback that recompiles the site.
pub type RebuildFn = Arc<dyn Fn() + Send + Sync>;

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Watch `paths` recursively, dropping events for anything under `ignore`.
    ///
    /// A burst of events is reported once, with its last event, after
    /// `DEBOUNCE` passes without another change. Returns the watcher and a
    /// channel to receive events. Events stop when the watcher is dropped.
    pub fn new(
        paths: &[PathBuf],
        ignore: &[PathBuf],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        for path in paths {
            if path.exists() {
                watcher
                    .watch(path, RecursiveMode::Recursive)
                    .map_err(std::io::Error::other)?;
            }
        }

        let ignore: Vec<PathBuf> = ignore.iter().flat_map(|p| ignore_forms(p)).collect();

        std::thread::spawn(move || {
            // Latest event of the current burst, sent once events go quiet
            let mut pending: Option<WatchEvent> = None;

            loop {
                let received = if pending.is_some() {
                    sync_rx.recv_timeout(DEBOUNCE)
                } else {
                    sync_rx
                        .recv()
                        .map_err(|_| mpsc::RecvTimeoutError::Disconnected)
                };

                let event = match received {
                    Ok(event) => event,
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        if let Some(watch_event) = pending.take() {
                            if async_tx.blocking_send(watch_event).is_err() {
                                return;
                            }
                        }
                        continue;
                    }
                    Err(mpsc::RecvTimeoutError::Disconnected) => break,
                };

                for path in &event.paths {
                    if ignore.iter().any(|prefix| path.starts_with(prefix)) {
                        continue;
                    }
                    if let Some(watch_event) = classify_event(path, &event.kind) {
                        pending = Some(watch_event);
                    }
                }
            }

            if let Some(watch_event) = pending {
                let _ = async_tx.blocking_send(watch_event);
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// The path as given plus its canonical form, so prefixes match the absolute
/// paths notify reports.
fn ignore_forms(path: &Path) -> Vec<PathBuf> {
    let mut forms = vec![path.to_path_buf()];
    if let Ok(canonical) = path.canonicalize() {
        if canonical != path {
            forms.push(canonical);
        }
    }
    forms
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    match kind {
        EventKind::Create(_) => Some(WatchEvent::Created(path.to_path_buf())),
        EventKind::Remove(_) => Some(WatchEvent::Deleted(path.to_path_buf())),
        EventKind::Modify(_) => Some(WatchEvent::Modified(path.to_path_buf())),
        _ => None,
    }
}

/// Run `rebuild` once per burst of events until the channel closes.
///
/// Rebuilds run one at a time on the blocking pool; events queued while a
/// rebuild runs collapse into the next one.
pub async fn rebuild_on_change(mut rx: async_mpsc::Receiver<WatchEvent>, rebuild: RebuildFn) {
    while let Some(event) = rx.recv().await {
        while rx.try_recv().is_ok() {}
        tracing::info!("{} changed, rebuilding", event.path().display());

        let rebuild = Arc::clone(&rebuild);
        if let Err(e) = tokio::task::spawn_blocking(move || rebuild()).await {
            tracing::error!("Rebuild task failed: {}", e);
        }
    }
}
