//! Ordered, best-effort actuator commands.

use hearth_io::ActuatorDriver;
use hearth_types::{ActuatorCommand, StatusSnapshot};
use tracing::{debug, warn};

use crate::board::StatusBoard;

/// Sends commands to the actuator driver one at a time, in call order.
///
/// Failures are logged and returned to the caller as `false`. The board
/// records the command as the last one issued either way.
pub struct ActuatorGateway {
    driver: Box<dyn ActuatorDriver>,
    board: StatusBoard,
}

impl ActuatorGateway {
    pub fn new(driver: Box<dyn ActuatorDriver>, board: StatusBoard) -> Self {
        Self { driver, board }
    }

    /// Issue one command. Returns whether the driver accepted it.
    pub async fn issue(&mut self, command: ActuatorCommand) -> bool {
        self.issue_with(command, |_| {}).await
    }

    /// Like [`issue`](Self::issue), and applies `also` in the same board
    /// update that records the command.
    pub async fn issue_with(
        &mut self,
        command: ActuatorCommand,
        also: impl FnOnce(&mut StatusSnapshot),
    ) -> bool {
        let result = match command {
            ActuatorCommand::Light(color) => self.driver.set_light(color).await,
            ActuatorCommand::Window(open) => self.driver.set_window(open).await,
            ActuatorCommand::Siren(on) => self.driver.set_siren(on).await,
        };
        self.board.update(|s| {
            match command {
                ActuatorCommand::Light(color) => s.light = color,
                ActuatorCommand::Window(open) => s.window_open = open,
                ActuatorCommand::Siren(on) => s.siren_on = on,
            }
            also(s);
        });
        match result {
            Ok(()) => {
                debug!(%command, "actuator command issued");
                true
            }
            Err(e) => {
                warn!(%command, error = %e, "actuator command failed");
                false
            }
        }
    }
}
