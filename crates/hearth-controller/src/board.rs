//! Shared status board.
//!
//! Holds the one [`StatusSnapshot`] behind a `watch` channel. Owners write
//! through the crate-private methods, each write lands as a single atomic
//! modification, and readers clone the whole snapshot at once.

use std::sync::Arc;

use hearth_types::{SensorKind, SensorObservation, StatusSnapshot};
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct StatusBoard {
    tx: Arc<watch::Sender<StatusSnapshot>>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBoard {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StatusSnapshot::default());
        Self { tx: Arc::new(tx) }
    }

    /// Consistent point-in-time copy of the whole status.
    pub fn snapshot(&self) -> StatusSnapshot {
        self.tx.borrow().clone()
    }

    /// Receiver that wakes on every published change.
    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.tx.subscribe()
    }

    /// Apply several field changes as one update.
    pub(crate) fn update(&self, modify: impl FnOnce(&mut StatusSnapshot)) {
        self.tx.send_modify(modify);
    }

    /// Store the latest reading of `kind`.
    ///
    /// Subscribers are only woken when the raw value or predicate changed.
    pub(crate) fn record_reading(&self, kind: SensorKind, observation: SensorObservation) {
        self.tx.send_if_modified(|status| {
            let previous = status.readings.insert(kind, observation);
            previous.map_or(true, |p| p.raw != observation.raw || p.active != observation.active)
        });
    }
}
