//! Supervision of the live sensor watchers.

use std::collections::BTreeMap;
use std::sync::Arc;

use hearth_io::SensorSource;
use hearth_types::SensorKind;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::board::StatusBoard;
use crate::controller::ControllerEvent;
use crate::watcher::{SensorWatcher, WatcherConfig};

struct WatcherHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Exactly one cancellable task per sensor kind.
#[derive(Default)]
pub struct WatcherSet {
    handles: BTreeMap<SensorKind, WatcherHandle>,
}

impl WatcherSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of watchers still running. Tasks that exited, by panic or
    /// otherwise, are not counted.
    pub fn len(&self) -> usize {
        self.handles
            .values()
            .filter(|handle| !handle.task.is_finished())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_running(&self, kind: SensorKind) -> bool {
        self.handles
            .get(&kind)
            .is_some_and(|handle| !handle.task.is_finished())
    }

    /// Spawn a watcher for every configured kind that has no live one.
    ///
    /// Returns how many were spawned; zero when all are already running.
    pub fn spawn_missing(
        &mut self,
        configs: &[WatcherConfig],
        source: &Arc<dyn SensorSource>,
        events: &mpsc::Sender<ControllerEvent>,
        board: &StatusBoard,
    ) -> usize {
        let mut spawned = 0;
        for config in configs {
            if self.is_running(config.kind) {
                continue;
            }
            if self.handles.remove(&config.kind).is_some() {
                warn!(kind = %config.kind, "watcher had exited, respawning");
            }
            let cancel = CancellationToken::new();
            let watcher =
                SensorWatcher::new(*config, Arc::clone(source), events.clone(), board.clone());
            let task = tokio::spawn(watcher.run(cancel.clone()));
            self.handles.insert(config.kind, WatcherHandle { cancel, task });
            spawned += 1;
        }
        if spawned > 0 {
            info!(spawned, total = self.len(), "watchers started");
        }
        spawned
    }

    /// Cancel every watcher and wait until each task has finished.
    pub async fn shutdown(&mut self) {
        if self.handles.is_empty() {
            return;
        }
        for handle in self.handles.values() {
            handle.cancel.cancel();
        }
        let handles = std::mem::take(&mut self.handles);
        let count = handles.len();
        for (kind, handle) in handles {
            if let Err(e) = handle.task.await {
                warn!(%kind, error = %e, "watcher task ended abnormally");
            }
            debug!(%kind, "watcher joined");
        }
        info!(count, "watchers stopped");
    }
}

impl Drop for WatcherSet {
    fn drop(&mut self) {
        for handle in self.handles.values() {
            handle.cancel.cancel();
        }
    }
}
