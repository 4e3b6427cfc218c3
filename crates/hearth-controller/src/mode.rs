//! Automatic/manual mode and the watchers that go with it.

use std::sync::Arc;
use std::time::Duration;

use hearth_io::SensorSource;
use hearth_types::{CodePurpose, Notice, SystemMode};
use tracing::{debug, info};

use crate::controller::Ports;
use crate::error::ControllerError;
use crate::supervisor::WatcherSet;
use crate::watcher::WatcherConfig;

/// Owns [`SystemMode`] and keeps the watcher set in lock-step with it:
/// watchers run iff the mode is automatic.
pub struct ModeController {
    mode: SystemMode,
    watchers: WatcherSet,
    configs: Vec<WatcherConfig>,
    source: Arc<dyn SensorSource>,
    switch_timeout: Duration,
}

impl ModeController {
    /// Starts in manual mode with no watchers.
    pub fn new(
        configs: Vec<WatcherConfig>,
        source: Arc<dyn SensorSource>,
        switch_timeout: Duration,
    ) -> Self {
        Self {
            mode: SystemMode::Manual,
            watchers: WatcherSet::new(),
            configs,
            source,
            switch_timeout,
        }
    }

    pub fn mode(&self) -> SystemMode {
        self.mode
    }

    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }

    /// Leave automatic mode after a confirmed code.
    ///
    /// On success every watcher has been cancelled and joined before this
    /// returns. On a wrong or missing code nothing changes.
    pub(crate) async fn switch_to_manual(&mut self, ports: &mut Ports) -> Result<(), ControllerError> {
        if self.mode == SystemMode::Manual {
            debug!("already in manual mode");
            return Ok(());
        }

        ports.notify(Notice::ManualModeRequested).await;
        let outcome = ports
            .request_code(CodePurpose::ManualMode, self.switch_timeout)
            .await;
        if !outcome.is_accepted() {
            info!(?outcome, "manual mode denied");
            ports.notify(Notice::ModeSwitchDenied).await;
            return Err(ControllerError::ModeSwitchDenied);
        }

        // Edges still queued from here on are dropped by the dispatcher.
        self.mode = SystemMode::Manual;
        self.watchers.shutdown().await;
        ports.board.update(|s| {
            s.mode = SystemMode::Manual;
            s.active_watchers = 0;
        });
        info!("switched to manual mode");
        ports.notify(Notice::ManualMode).await;
        Ok(())
    }

    /// Enter automatic mode, spawning any missing watcher. Idempotent.
    pub(crate) async fn switch_to_auto(&mut self, ports: &mut Ports) {
        let spawned =
            self.watchers
                .spawn_missing(&self.configs, &self.source, &ports.events, &ports.board);
        let previous = self.mode;
        self.mode = SystemMode::Automatic;
        let count = self.watchers.len();
        ports.board.update(|s| {
            s.mode = SystemMode::Automatic;
            s.active_watchers = count;
        });

        if previous == SystemMode::Automatic {
            debug!(spawned, "already in automatic mode");
        } else {
            info!(watchers = count, "switched to automatic mode");
            ports.notify(Notice::AutomaticMode).await;
        }
    }

    /// Stop all watchers without changing the mode, for process shutdown.
    pub(crate) async fn shutdown(&mut self, ports: &Ports) {
        self.watchers.shutdown().await;
        ports.board.update(|s| s.active_watchers = 0);
    }
}
