//! Interactive console driving a controller over simulated hardware.
//!
//! Each stdin line is one command. Requests that need a code run in the
//! background so the code can be typed on the next line.

use std::fmt::Write as _;
use std::future::Future;
use std::sync::Arc;

use anyhow::{bail, Context};
use async_trait::async_trait;
use hearth_controller::{
    setup, Backends, Config, Controller, ControllerError, ControllerHandle, ManualAction,
};
use hearth_io::sim::{RecordingActuators, SimSensors};
use hearth_io::Notifier;
use hearth_types::{ClimateReading, LightColor, Notice, RawValue, SensorKind, StatusSnapshot};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

const HELP: &str = "\
commands:
  status                     show mode, alarm, readings and actuators
  auto | manual              switch mode (manual needs the code)
  arm | disarm               alarm control (needs the code)
  1234#  or  keys 1234#      type on the keypad
  code NNNN                  set a new alarm code
  light COLOR|off            manual mode: light colour
  window open|close          manual mode: window
  siren on|off               manual mode: siren
  alarm on|off               manual mode: force the alarm
  sensor KIND VALUE          set a simulated reading (light, motion, range, gas)
  fail KIND on|off           make a simulated sensor fail
  climate TEMP HUM           set the simulated climate sensor
  advice                     clothing advice for the current climate
  help | quit";

/// Prints notices for the operator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, notice: &Notice) {
        info!(?notice, "notice");
        println!(">> {notice}");
    }
}

/// One parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Status,
    Auto,
    Manual,
    Arm,
    Disarm,
    Keys(String),
    SetCode(String),
    Action(ManualAction),
    Sensor(SensorKind, RawValue),
    Fail(SensorKind, bool),
    Climate(ClimateReading),
    Advice,
    Help,
    Quit,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> anyhow::Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let command = match words.as_slice() {
            ["status"] => Self::Status,
            ["auto"] => Self::Auto,
            ["manual"] => Self::Manual,
            ["arm"] => Self::Arm,
            ["disarm"] => Self::Disarm,
            ["keys", keys @ ..] if !keys.is_empty() => Self::Keys(keys.concat()),
            [keys] if keys.ends_with('#') => Self::Keys((*keys).to_string()),
            ["code", code] => Self::SetCode((*code).to_string()),
            ["light", "off"] => Self::Action(ManualAction::Light(None)),
            ["light", color] => {
                let color: LightColor = color.parse()?;
                Self::Action(ManualAction::Light(Some(color)))
            }
            ["window", state] => Self::Action(ManualAction::Window(switch(state)?)),
            ["siren", state] => Self::Action(ManualAction::Siren(switch(state)?)),
            ["alarm", state] => Self::Action(ManualAction::Alarm(switch(state)?)),
            ["sensor", kind, value] => Self::Sensor(
                kind.parse()?,
                value
                    .parse()
                    .with_context(|| format!("invalid sensor value: {value}"))?,
            ),
            ["fail", kind, state] => Self::Fail(kind.parse()?, switch(state)?),
            ["climate", temperature, humidity] => Self::Climate(ClimateReading {
                temperature_c: temperature
                    .parse()
                    .with_context(|| format!("invalid temperature: {temperature}"))?,
                humidity_pct: humidity
                    .parse()
                    .with_context(|| format!("invalid humidity: {humidity}"))?,
            }),
            ["advice"] => Self::Advice,
            ["help" | "?"] => Self::Help,
            ["quit" | "exit"] => Self::Quit,
            _ => bail!("unknown command: {line} (try `help`)"),
        };
        Ok(command)
    }
}

fn switch(word: &str) -> anyhow::Result<bool> {
    match word {
        "on" | "open" => Ok(true),
        "off" | "close" | "closed" => Ok(false),
        other => bail!("expected on/off or open/close, got {other}"),
    }
}

/// Multi-line human-readable status.
pub fn render_status(status: &StatusSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "mode:     {} ({} watchers)", status.mode, status.active_watchers);
    let _ = writeln!(out, "alarm:    {}", status.alarm);
    if let Some(purpose) = status.code_prompt {
        let _ = writeln!(out, "prompt:   code for {purpose}, finish with #");
    }
    let light = status
        .light
        .map_or_else(|| "off".to_string(), |color| color.to_string());
    let _ = writeln!(
        out,
        "light:    {light}  window: {}  siren: {}",
        if status.window_open { "open" } else { "closed" },
        if status.siren_on { "on" } else { "off" },
    );
    for kind in SensorKind::ALL {
        match status.reading(kind) {
            Some(r) => {
                let _ = writeln!(
                    out,
                    "{kind:<9} {:>5}  {}={}",
                    r.raw,
                    kind.predicate_name(),
                    r.active
                );
            }
            None => {
                let _ = writeln!(out, "{kind:<9}     -");
            }
        }
    }
    out
}

/// Run the controller and read commands from stdin until `quit` or EOF.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let sensors = SimSensors::new();
    let codes = setup::code_store(&config)?;
    info!(path = %codes.path().display(), "alarm code store");

    let backends = Backends {
        sensors: Arc::new(sensors.clone()),
        actuators: Box::new(RecordingActuators::new()),
        notifier: Arc::new(ConsoleNotifier),
        codes: Box::new(codes),
    };
    let (controller, handle) = Controller::new(config, backends);
    let task = tokio::spawn(controller.run());

    println!("hearth console, type `help` for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match ConsoleCommand::parse(&line) {
            Ok(ConsoleCommand::Quit) => break,
            Ok(command) => dispatch(command, &handle, &sensors),
            Err(e) => println!("{e}"),
        }
    }

    handle.shutdown().await?;
    task.await??;
    Ok(())
}

fn dispatch(command: ConsoleCommand, handle: &ControllerHandle, sensors: &SimSensors) {
    let h = handle.clone();
    match command {
        ConsoleCommand::Status => print!("{}", render_status(&handle.status())),
        ConsoleCommand::Auto => request("automatic mode", async move { h.switch_to_auto().await }),
        ConsoleCommand::Manual => request("manual mode", async move { h.switch_to_manual().await }),
        ConsoleCommand::Arm => request("arm", async move { h.arm().await }),
        ConsoleCommand::Disarm => request("disarm", async move { h.disarm().await }),
        ConsoleCommand::SetCode(code) => {
            request("new code", async move { h.set_new_code(&code).await });
        }
        ConsoleCommand::Action(action) => {
            request("manual action", async move { h.manual(action).await });
        }
        ConsoleCommand::Keys(keys) => {
            if let Err(e) = handle.press_keys(&keys) {
                println!("{e}");
            }
        }
        ConsoleCommand::Sensor(kind, value) => sensors.set(kind, value),
        ConsoleCommand::Fail(kind, failing) => sensors.set_failing(kind, failing),
        ConsoleCommand::Climate(reading) => sensors.set_climate(Some(reading)),
        ConsoleCommand::Advice => {
            tokio::spawn(async move {
                if let Err(e) = h.clothing_advice().await {
                    println!("no advice: {e}");
                }
            });
        }
        ConsoleCommand::Help => println!("{HELP}"),
        ConsoleCommand::Quit => {}
    }
}

/// Run a controller request in the background. The controller may be
/// waiting on a code, and the console must stay free to type it.
fn request<F>(what: &'static str, fut: F)
where
    F: Future<Output = Result<(), ControllerError>> + Send + 'static,
{
    tokio::spawn(async move { report(what, fut.await) });
}

fn report(what: &str, result: Result<(), ControllerError>) {
    match result {
        Ok(()) => println!("{what}: ok"),
        Err(e) => {
            warn!(error = %e, "{what} failed");
            println!("{what}: {e}");
        }
    }
}
