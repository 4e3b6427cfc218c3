//! Intrusion alarm state machine.
//!
//! ```text
//!            code ok                 delay elapsed
//!  Disarmed ────────► ArmingCountdown ────────────► Armed
//!     ▲                                               │ presence
//!     │ code ok                                       ▼
//!     └───────────────────────────────────────── AwaitingCode
//!                                                     │ wrong / late
//!                                                     ▼
//!                                                 Triggered
//! ```
//!
//! `Triggered` is left only through an operator action: [`disarm`] with the
//! code, or forcing the alarm off from manual mode.
//!
//! [`disarm`]: AlarmStateMachine::disarm

use std::time::Duration;

use hearth_types::{AlarmState, CodePurpose, EdgeEvent, Notice};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::AlarmConfig;
use crate::controller::{ControllerEvent, Ports};
use crate::error::ControllerError;

pub struct AlarmStateMachine {
    state: AlarmState,
    activation_delay: Duration,
    code_timeout: Duration,
    /// Bumped whenever a countdown starts or is abandoned, so a timer that
    /// fires late can tell it is stale.
    generation: u64,
    arm_timer: Option<JoinHandle<()>>,
}

impl AlarmStateMachine {
    pub fn new(config: &AlarmConfig) -> Self {
        Self {
            state: AlarmState::Disarmed,
            activation_delay: config.activation_delay(),
            code_timeout: config.code_entry_timeout(),
            generation: 0,
            arm_timer: None,
        }
    }

    pub fn state(&self) -> AlarmState {
        self.state
    }

    fn enter(&mut self, next: AlarmState) {
        if self.state != next {
            info!(from = %self.state, to = %next, "alarm state");
        }
        self.state = next;
    }

    fn set_state(&mut self, next: AlarmState, ports: &Ports) {
        self.enter(next);
        ports.board.update(|s| s.alarm = next);
    }

    /// Move to `next` and switch the siren; the board sees both at once.
    async fn set_state_with_siren(&mut self, next: AlarmState, siren: bool, ports: &mut Ports) {
        self.enter(next);
        ports.set_siren_for(siren, next).await;
    }

    /// React to a range-sensor edge.
    ///
    /// Only rising edges matter. While armed, presence opens the intrusion
    /// challenge; while disarmed it asks for the code to arm.
    pub(crate) async fn on_presence(&mut self, event: &EdgeEvent, ports: &mut Ports) {
        if !event.is_rising() {
            return;
        }
        match self.state {
            AlarmState::Armed => self.challenge(ports).await,
            AlarmState::Disarmed => {
                if let Err(e) = self.confirm_arm(ports).await {
                    debug!(error = %e, "arm on presence not confirmed");
                }
            }
            AlarmState::ArmingCountdown | AlarmState::AwaitingCode | AlarmState::Triggered => {
                debug!(state = %self.state, "presence ignored");
            }
        }
    }

    /// Armed + presence: siren on, then wait for the code.
    async fn challenge(&mut self, ports: &mut Ports) {
        self.set_state_with_siren(AlarmState::AwaitingCode, true, ports)
            .await;

        let outcome = ports
            .request_code(CodePurpose::Intrusion, self.code_timeout)
            .await;
        if outcome.is_accepted() {
            self.set_state_with_siren(AlarmState::Disarmed, false, ports)
                .await;
            ports.notify(Notice::WelcomeHome).await;
        } else {
            self.set_state(AlarmState::Triggered, ports);
            ports.notify(Notice::UnauthorizedAccess).await;
        }
    }

    /// Operator request to arm. Refused while anyone is detected inside.
    pub(crate) async fn request_arm(&mut self, ports: &mut Ports) -> Result<(), ControllerError> {
        if self.state != AlarmState::Disarmed {
            return Err(ControllerError::AlarmBusy(self.state));
        }
        if ports.board.snapshot().presence_detected() {
            return Err(ControllerError::PresenceDetected);
        }
        self.confirm_arm(ports).await
    }

    async fn confirm_arm(&mut self, ports: &mut Ports) -> Result<(), ControllerError> {
        let outcome = ports.request_code(CodePurpose::Arm, self.code_timeout).await;
        if let Some(err) = ControllerError::from_outcome(outcome) {
            ports.notify(Notice::ArmFailed).await;
            return Err(err);
        }
        self.start_countdown(ports);
        ports
            .notify(Notice::ArmingScheduled {
                delay_secs: self.activation_delay.as_secs(),
            })
            .await;
        Ok(())
    }

    fn start_countdown(&mut self, ports: &Ports) {
        self.cancel_countdown();
        let generation = self.generation;
        let delay = self.activation_delay;
        let events = ports.events.clone();
        self.arm_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events
                .send(ControllerEvent::ArmTimerElapsed { generation })
                .await;
        }));
        self.set_state(AlarmState::ArmingCountdown, ports);
    }

    fn cancel_countdown(&mut self) {
        if let Some(timer) = self.arm_timer.take() {
            timer.abort();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    /// The activation delay of countdown `generation` elapsed.
    pub(crate) async fn on_timer(&mut self, generation: u64, ports: &mut Ports) {
        if generation != self.generation || self.state != AlarmState::ArmingCountdown {
            debug!(generation, current = self.generation, "stale arm timer");
            return;
        }
        self.arm_timer = None;
        self.set_state(AlarmState::Armed, ports);
        ports.notify(Notice::AlarmArmed).await;
    }

    /// Operator disarm with the code, from any engaged state.
    pub(crate) async fn disarm(&mut self, ports: &mut Ports) -> Result<(), ControllerError> {
        if !self.state.is_engaged() {
            return Ok(());
        }
        let outcome = ports
            .request_code(CodePurpose::Disarm, self.code_timeout)
            .await;
        if let Some(err) = ControllerError::from_outcome(outcome) {
            ports.notify(Notice::DisarmFailed).await;
            return Err(err);
        }
        self.cancel_countdown();
        self.set_state_with_siren(AlarmState::Disarmed, false, ports)
            .await;
        ports.notify(Notice::AlarmDisarmed).await;
        Ok(())
    }

    /// Manual-mode override: arm at once or disarm and silence the siren.
    pub(crate) async fn force(&mut self, armed: bool, ports: &mut Ports) {
        self.cancel_countdown();
        if armed {
            self.set_state(AlarmState::Armed, ports);
        } else {
            self.set_state_with_siren(AlarmState::Disarmed, false, ports)
                .await;
        }
        ports.notify(Notice::AlarmForced { armed }).await;
    }

    pub(crate) fn shutdown(&mut self) {
        self.cancel_countdown();
    }
}
