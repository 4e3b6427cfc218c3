//! Sensor watchers: poll one sensor, derive its predicate, report edges.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hearth_io::SensorSource;
use hearth_types::{Comparison, EdgeEvent, RawValue, SensorKind, SensorObservation};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::board::StatusBoard;
use crate::controller::ControllerEvent;

/// Immutable settings for one watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherConfig {
    pub kind: SensorKind,
    pub poll_interval: Duration,
    pub comparison: Comparison,
}

/// Turns a stream of raw readings into predicate changes.
///
/// The previous predicate starts unknown, so the first reading always
/// produces an event (with `previous == None`).
#[derive(Debug)]
pub struct EdgeDetector {
    kind: SensorKind,
    comparison: Comparison,
    previous: Option<bool>,
}

impl EdgeDetector {
    pub fn new(kind: SensorKind, comparison: Comparison) -> Self {
        Self {
            kind,
            comparison,
            previous: None,
        }
    }

    /// Feed one reading. Returns the derived predicate and, if it differs
    /// from the previous one, the edge event.
    pub fn observe(&mut self, raw: RawValue, at: DateTime<Utc>) -> (bool, Option<EdgeEvent>) {
        let active = self.comparison.evaluate(raw);
        if self.previous == Some(active) {
            return (active, None);
        }
        let event = EdgeEvent {
            kind: self.kind,
            active,
            previous: self.previous,
            raw,
            at,
        };
        self.previous = Some(active);
        (active, Some(event))
    }
}

/// A long-lived task polling one sensor.
pub struct SensorWatcher {
    config: WatcherConfig,
    source: Arc<dyn SensorSource>,
    events: mpsc::Sender<ControllerEvent>,
    board: StatusBoard,
}

impl SensorWatcher {
    pub fn new(
        config: WatcherConfig,
        source: Arc<dyn SensorSource>,
        events: mpsc::Sender<ControllerEvent>,
        board: StatusBoard,
    ) -> Self {
        Self {
            config,
            source,
            events,
            board,
        }
    }

    /// Poll until `cancel` fires.
    ///
    /// Each edge is handed to the controller and the watcher waits for it to
    /// be fully handled before polling again. Read failures are logged and
    /// skipped; cancellation is the only way out of the loop.
    pub async fn run(self, cancel: CancellationToken) {
        let kind = self.config.kind;
        let mut detector = EdgeDetector::new(kind, self.config.comparison);
        debug!(%kind, interval = ?self.config.poll_interval, "watcher started");

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.config.poll_interval) => {}
            }

            let read = tokio::select! {
                () = cancel.cancelled() => break,
                read = self.source.read(kind) => read,
            };
            let raw = match read {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(%kind, error = %e, "sensor read failed");
                    continue;
                }
            };

            let at = Utc::now();
            let (active, edge) = detector.observe(raw, at);
            self.board
                .record_reading(kind, SensorObservation { raw, active, at });

            let Some(event) = edge else {
                continue;
            };
            if event.is_first_observation() {
                debug!(%kind, raw, predicate = kind.predicate_name(), active, "first observation");
            } else {
                info!(%kind, raw, predicate = kind.predicate_name(), active, "edge");
            }

            let (done_tx, done_rx) = oneshot::channel();
            let delivered = tokio::select! {
                () = cancel.cancelled() => break,
                sent = self.events.send(ControllerEvent::Edge { event, done: done_tx }) => sent.is_ok(),
            };
            if !delivered {
                debug!(%kind, "controller gone, watcher exiting");
                break;
            }
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = done_rx => {}
            }
        }

        debug!(%kind, "watcher stopped");
    }
}
