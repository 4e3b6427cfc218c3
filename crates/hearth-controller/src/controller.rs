//! Core controller orchestration.
//!
//! A single task owns the alarm state machine, the mode controller and the
//! actuators. Watchers, timers and front-ends talk to it only through
//! [`ControllerEvent`]s, so every transition of `AlarmState` and
//! `SystemMode` happens on that one task, in arrival order.

use std::sync::Arc;
use std::time::Duration;

use hearth_io::{ActuatorDriver, CodePersistence, Notifier, SensorSource};
use hearth_types::{
    ActuatorCommand, AlarmState, CodeOutcome, CodePurpose, EdgeEvent, LightColor, Notice,
    SensorKind, StatusSnapshot, SystemMode,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::actuator::ActuatorGateway;
use crate::alarm::AlarmStateMachine;
use crate::board::StatusBoard;
use crate::code_entry::CodeEntry;
use crate::config::Config;
use crate::error::ControllerError;
use crate::handle::ControllerHandle;
use crate::mode::ModeController;

const EVENT_QUEUE: usize = 256;
const KEY_QUEUE: usize = 64;

/// Events processed by the controller's main loop.
pub enum ControllerEvent {
    /// A watcher saw its predicate change. `done` is signalled once the
    /// event has been fully handled.
    Edge {
        event: EdgeEvent,
        done: oneshot::Sender<()>,
    },
    /// An arm countdown finished.
    ArmTimerElapsed { generation: u64 },
    /// A front-end request.
    Command {
        command: Command,
        reply: oneshot::Sender<Result<(), ControllerError>>,
    },
    /// Stop the loop, joining all watchers.
    Shutdown,
}

/// Front-end requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SwitchToManual,
    SwitchToAuto,
    Arm,
    Disarm,
    SetCode(String),
    Manual(ManualAction),
}

/// Direct actuator and alarm control, only honoured in manual mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualAction {
    Light(Option<LightColor>),
    Window(bool),
    Siren(bool),
    Alarm(bool),
}

/// The collaborators a controller runs against.
pub struct Backends {
    pub sensors: Arc<dyn SensorSource>,
    pub actuators: Box<dyn ActuatorDriver>,
    pub notifier: Arc<dyn Notifier>,
    pub codes: Box<dyn CodePersistence>,
}

/// Everything the alarm and mode components act through.
pub(crate) struct Ports {
    pub(crate) gateway: ActuatorGateway,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) board: StatusBoard,
    pub(crate) codes: CodeEntry,
    pub(crate) events: mpsc::Sender<ControllerEvent>,
}

impl Ports {
    pub(crate) async fn notify(&self, notice: Notice) {
        self.notifier.notify(&notice).await;
    }

    /// Prompt for the code and wait for it to resolve.
    pub(crate) async fn request_code(
        &mut self,
        purpose: CodePurpose,
        timeout: Duration,
    ) -> CodeOutcome {
        self.codes.await_code(purpose, timeout, &self.board).await
    }

    async fn actuate(&mut self, command: ActuatorCommand) -> bool {
        self.actuate_with(command, |_| {}).await
    }

    async fn actuate_with(
        &mut self,
        command: ActuatorCommand,
        also: impl FnOnce(&mut StatusSnapshot),
    ) -> bool {
        let accepted = self.gateway.issue_with(command, also).await;
        if !accepted {
            self.notify(Notice::ActuatorFault { command }).await;
        }
        accepted
    }

    pub(crate) async fn set_light(&mut self, color: Option<LightColor>) {
        self.actuate(ActuatorCommand::Light(color)).await;
    }

    pub(crate) async fn set_siren(&mut self, on: bool) {
        self.actuate(ActuatorCommand::Siren(on)).await;
    }

    /// Switch the siren and publish the new alarm state with it.
    pub(crate) async fn set_siren_for(&mut self, on: bool, alarm: AlarmState) {
        self.actuate_with(ActuatorCommand::Siren(on), |s| s.alarm = alarm)
            .await;
    }

    pub(crate) async fn set_window(&mut self, open: bool) {
        if self.actuate(ActuatorCommand::Window(open)).await {
            self.notify(Notice::WindowMoved { open }).await;
        }
    }
}

/// The home controller.
pub struct Controller {
    config: Config,
    mode: ModeController,
    alarm: AlarmStateMachine,
    ports: Ports,
    event_rx: mpsc::Receiver<ControllerEvent>,
}

impl Controller {
    /// Create a controller and the handle front-ends use to reach it.
    ///
    /// Nothing runs until [`run`](Self::run) is awaited.
    pub fn new(config: Config, backends: Backends) -> (Self, ControllerHandle) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE);
        let (key_tx, key_rx) = mpsc::channel(KEY_QUEUE);
        let board = StatusBoard::new();

        let Backends {
            sensors,
            actuators,
            notifier,
            codes,
        } = backends;

        let handle = ControllerHandle::new(
            event_tx.clone(),
            key_tx,
            board.clone(),
            Arc::clone(&sensors),
            Arc::clone(&notifier),
        );

        let mode = ModeController::new(
            config.watcher_configs(),
            sensors,
            config.alarm.mode_switch_timeout(),
        );
        let alarm = AlarmStateMachine::new(&config.alarm);
        let codes = CodeEntry::new(key_rx, codes, Arc::clone(&notifier));
        let ports = Ports {
            gateway: ActuatorGateway::new(actuators, board.clone()),
            notifier,
            board,
            codes,
            events: event_tx,
        };

        let controller = Self {
            config,
            mode,
            alarm,
            ports,
            event_rx,
        };
        (controller, handle)
    }

    /// Run the controller event loop until shutdown.
    pub async fn run(mut self) -> Result<(), ControllerError> {
        info!(startup_mode = %self.config.controller.startup_mode, "controller starting");
        if self.config.controller.startup_mode == SystemMode::Automatic {
            self.mode.switch_to_auto(&mut self.ports).await;
        }

        while let Some(event) = self.event_rx.recv().await {
            match event {
                ControllerEvent::Edge { event, done } => {
                    self.handle_edge(&event).await;
                    let _ = done.send(());
                }
                ControllerEvent::ArmTimerElapsed { generation } => {
                    self.alarm.on_timer(generation, &mut self.ports).await;
                }
                ControllerEvent::Command { command, reply } => {
                    let result = self.handle_command(command).await;
                    if let Err(e) = &result {
                        debug!(error = %e, "command failed");
                    }
                    let _ = reply.send(result);
                }
                ControllerEvent::Shutdown => {
                    info!("shutting down");
                    break;
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    async fn handle_edge(&mut self, event: &EdgeEvent) {
        if self.mode.mode() == SystemMode::Manual {
            debug!(kind = %event.kind, "edge dropped in manual mode");
            return;
        }

        match event.kind {
            SensorKind::Light => {
                let color = event.active.then_some(self.config.lighting.color);
                self.ports.set_light(color).await;
            }
            SensorKind::Motion => {
                if event.is_rising() {
                    self.ports.notify(Notice::MotionDetected).await;
                }
            }
            SensorKind::Range => {
                self.alarm.on_presence(event, &mut self.ports).await;
            }
            SensorKind::Gas => self.handle_gas(event).await,
        }
    }

    async fn handle_gas(&mut self, event: &EdgeEvent) {
        // Clean air at startup is the baseline, not a recovery.
        if event.is_first_observation() && !event.active {
            return;
        }
        if event.active {
            self.ports.notify(Notice::GasDanger { raw: event.raw }).await;
        } else {
            self.ports.notify(Notice::GasNormal { raw: event.raw }).await;
        }
        self.ports.set_window(event.active).await;
    }

    async fn handle_command(&mut self, command: Command) -> Result<(), ControllerError> {
        debug!(?command, "command");
        match command {
            Command::SwitchToManual => self.mode.switch_to_manual(&mut self.ports).await,
            Command::SwitchToAuto => {
                self.mode.switch_to_auto(&mut self.ports).await;
                Ok(())
            }
            Command::Arm => self.alarm.request_arm(&mut self.ports).await,
            Command::Disarm => self.alarm.disarm(&mut self.ports).await,
            Command::SetCode(candidate) => {
                self.ports.codes.set_new_code(&candidate).await?;
                self.ports.notify(Notice::CodeChanged).await;
                Ok(())
            }
            Command::Manual(action) => self.handle_manual(action).await,
        }
    }

    async fn handle_manual(&mut self, action: ManualAction) -> Result<(), ControllerError> {
        if self.mode.mode() != SystemMode::Manual {
            return Err(ControllerError::NotInManualMode);
        }
        match action {
            ManualAction::Light(color) => self.ports.set_light(color).await,
            ManualAction::Window(open) => self.ports.set_window(open).await,
            ManualAction::Siren(on) => self.ports.set_siren(on).await,
            ManualAction::Alarm(armed) => self.alarm.force(armed, &mut self.ports).await,
        }
        Ok(())
    }

    async fn shutdown(&mut self) {
        info!("controller shutting down");
        self.alarm.shutdown();
        self.mode.shutdown(&self.ports).await;
        info!(
            alarm = %self.alarm.state(),
            watchers = self.mode.watcher_count(),
            "controller shut down complete"
        );
    }
}
