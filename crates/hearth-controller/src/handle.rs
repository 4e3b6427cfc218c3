//! Cloneable front-end handle to a running controller.

use std::sync::Arc;

use hearth_io::{Notifier, SensorSource};
use hearth_types::{ClothingAdvice, Notice, StatusSnapshot};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::warn;

use crate::board::StatusBoard;
use crate::controller::{Command, ControllerEvent, ManualAction};
use crate::error::ControllerError;

/// Requests are queued to the controller task and answered once handled.
/// Requests that need a code only complete after the code session ends,
/// so type the code with [`press_keys`](Self::press_keys) from another
/// task while awaiting them.
#[derive(Clone)]
pub struct ControllerHandle {
    events: mpsc::Sender<ControllerEvent>,
    keys: mpsc::Sender<char>,
    board: StatusBoard,
    sensors: Arc<dyn SensorSource>,
    notifier: Arc<dyn Notifier>,
}

impl ControllerHandle {
    pub(crate) fn new(
        events: mpsc::Sender<ControllerEvent>,
        keys: mpsc::Sender<char>,
        board: StatusBoard,
        sensors: Arc<dyn SensorSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            events,
            keys,
            board,
            sensors,
            notifier,
        }
    }

    async fn request(&self, command: Command) -> Result<(), ControllerError> {
        let (reply, rx) = oneshot::channel();
        self.events
            .send(ControllerEvent::Command { command, reply })
            .await
            .map_err(|_| ControllerError::NotRunning)?;
        rx.await.map_err(|_| ControllerError::NotRunning)?
    }

    /// Leave automatic mode. Needs the code within the mode-switch timeout.
    pub async fn switch_to_manual(&self) -> Result<(), ControllerError> {
        self.request(Command::SwitchToManual).await
    }

    /// Enter automatic mode and start any missing watcher.
    pub async fn switch_to_auto(&self) -> Result<(), ControllerError> {
        self.request(Command::SwitchToAuto).await
    }

    /// Ask to arm the alarm. Needs the code; arming completes after the
    /// activation delay.
    pub async fn arm(&self) -> Result<(), ControllerError> {
        self.request(Command::Arm).await
    }

    /// Disarm from any engaged state. Needs the code.
    pub async fn disarm(&self) -> Result<(), ControllerError> {
        self.request(Command::Disarm).await
    }

    /// Replace the alarm code.
    pub async fn set_new_code(&self, code: &str) -> Result<(), ControllerError> {
        self.request(Command::SetCode(code.to_string())).await
    }

    /// Direct actuator or alarm control. Manual mode only.
    pub async fn manual(&self, action: ManualAction) -> Result<(), ControllerError> {
        self.request(Command::Manual(action)).await
    }

    /// Type keys on the keypad.
    ///
    /// Keys only count while a code prompt is open; anything typed before
    /// it opens is discarded. Keys that do not fit in the queue are dropped.
    pub fn press_keys(&self, keys: &str) -> Result<(), ControllerError> {
        for key in keys.chars() {
            match self.keys.try_send(key) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!("keypad queue full, dropping input");
                    return Ok(());
                }
                Err(TrySendError::Closed(_)) => return Err(ControllerError::NotRunning),
            }
        }
        Ok(())
    }

    /// Consistent snapshot of mode, alarm state, readings and actuators.
    pub fn status(&self) -> StatusSnapshot {
        self.board.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.board.subscribe()
    }

    /// Read the climate sensor and announce what to wear.
    pub async fn clothing_advice(&self) -> Result<ClothingAdvice, ControllerError> {
        let reading = self.sensors.read_climate().await?;
        let advice = ClothingAdvice::for_reading(reading);
        self.notifier
            .notify(&Notice::Clothing { reading, advice })
            .await;
        Ok(advice)
    }

    /// Stop the controller. Watchers are joined before `run` returns.
    pub async fn shutdown(&self) -> Result<(), ControllerError> {
        self.events
            .send(ControllerEvent::Shutdown)
            .await
            .map_err(|_| ControllerError::NotRunning)
    }
}
