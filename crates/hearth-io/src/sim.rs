//! In-memory backends for simulation and testing.
//!
//! Every backend here is a cheap `Clone` around shared state, so a test (or
//! the console front-end) keeps one clone to drive and observe the backend
//! while the controller owns another.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use hearth_types::{
    ActuatorCommand, AlarmCode, ClimateReading, LightColor, Notice, RawValue, SensorKind,
};
use tokio::sync::mpsc;

use crate::error::IoError;
use crate::{ActuatorDriver, CodePersistence, Notifier, SensorSource};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// SimSensors
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct SimSensorState {
    values: HashMap<SensorKind, RawValue>,
    failing: HashSet<SensorKind>,
    reads: HashMap<SensorKind, u64>,
    climate: Option<ClimateReading>,
}

/// Sensor source whose values are set by hand.
///
/// Starts from a quiet house: bright, no motion, nobody within range, clean
/// air.
#[derive(Debug, Clone)]
pub struct SimSensors {
    state: Arc<Mutex<SimSensorState>>,
}

impl Default for SimSensors {
    fn default() -> Self {
        Self::new()
    }
}

impl SimSensors {
    pub fn new() -> Self {
        let values = HashMap::from([
            (SensorKind::Light, 800),
            (SensorKind::Motion, 0),
            (SensorKind::Range, 1000),
            (SensorKind::Gas, 100),
        ]);
        Self {
            state: Arc::new(Mutex::new(SimSensorState {
                values,
                failing: HashSet::new(),
                reads: HashMap::new(),
                climate: Some(ClimateReading {
                    temperature_c: 22.5,
                    humidity_pct: 55.0,
                }),
            })),
        }
    }

    /// Set the value returned by subsequent reads of `kind`.
    pub fn set(&self, kind: SensorKind, value: RawValue) {
        lock(&self.state).values.insert(kind, value);
    }

    /// Make reads of `kind` fail (or succeed again).
    pub fn set_failing(&self, kind: SensorKind, failing: bool) {
        let mut state = lock(&self.state);
        if failing {
            state.failing.insert(kind);
        } else {
            state.failing.remove(&kind);
        }
    }

    /// Set the climate reading; `None` makes the climate sensor unavailable.
    pub fn set_climate(&self, reading: Option<ClimateReading>) {
        lock(&self.state).climate = reading;
    }

    /// How many reads of `kind` were attempted, failed ones included.
    pub fn read_count(&self, kind: SensorKind) -> u64 {
        lock(&self.state).reads.get(&kind).copied().unwrap_or(0)
    }
}

#[async_trait]
impl SensorSource for SimSensors {
    async fn read(&self, kind: SensorKind) -> Result<RawValue, IoError> {
        let mut state = lock(&self.state);
        *state.reads.entry(kind).or_insert(0) += 1;
        if state.failing.contains(&kind) {
            return Err(IoError::SensorUnavailable {
                kind,
                reason: "simulated failure".to_string(),
            });
        }
        Ok(state.values.get(&kind).copied().unwrap_or(0))
    }

    async fn read_climate(&self) -> Result<ClimateReading, IoError> {
        lock(&self.state).climate.ok_or(IoError::ClimateUnavailable)
    }
}

// ---------------------------------------------------------------------------
// RecordingActuators
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct RecordingState {
    commands: Vec<ActuatorCommand>,
    failing: bool,
}

/// Actuator driver that records every command it receives.
///
/// When set failing, commands are still recorded but return
/// [`IoError::ActuatorFailure`].
#[derive(Debug, Clone, Default)]
pub struct RecordingActuators {
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingActuators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all commands received so far, in order.
    pub fn commands(&self) -> Vec<ActuatorCommand> {
        lock(&self.state).commands.clone()
    }

    pub fn set_failing(&self, failing: bool) {
        lock(&self.state).failing = failing;
    }

    fn record(&self, command: ActuatorCommand) -> Result<(), IoError> {
        let mut state = lock(&self.state);
        state.commands.push(command);
        if state.failing {
            return Err(IoError::ActuatorFailure(format!("{command} rejected")));
        }
        tracing::debug!(%command, "simulated actuator");
        Ok(())
    }
}

#[async_trait]
impl ActuatorDriver for RecordingActuators {
    async fn set_light(&mut self, color: Option<LightColor>) -> Result<(), IoError> {
        self.record(ActuatorCommand::Light(color))
    }

    async fn set_window(&mut self, open: bool) -> Result<(), IoError> {
        self.record(ActuatorCommand::Window(open))
    }

    async fn set_siren(&mut self, on: bool) -> Result<(), IoError> {
        self.record(ActuatorCommand::Siren(on))
    }
}

// ---------------------------------------------------------------------------
// MemoryCodeStore
// ---------------------------------------------------------------------------

/// Code store that keeps the code in memory only.
#[derive(Debug, Clone)]
pub struct MemoryCodeStore {
    code: Arc<Mutex<AlarmCode>>,
}

impl MemoryCodeStore {
    pub fn new(code: AlarmCode) -> Self {
        Self {
            code: Arc::new(Mutex::new(code)),
        }
    }
}

#[async_trait]
impl CodePersistence for MemoryCodeStore {
    async fn get_code(&self) -> Result<AlarmCode, IoError> {
        Ok(lock(&self.code).clone())
    }

    async fn set_code(&self, code: &AlarmCode) -> Result<(), IoError> {
        *lock(&self.code) = code.clone();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ChannelNotifier
// ---------------------------------------------------------------------------

/// Notifier that forwards every notice into a channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiver its notices arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, notice: &Notice) {
        // A dropped receiver just means nobody is listening.
        let _ = self.tx.send(notice.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sim_sensors_count_and_fail() {
        let sensors = SimSensors::new();
        sensors.set(SensorKind::Gas, 350);
        assert_eq!(sensors.read(SensorKind::Gas).await.unwrap(), 350);

        sensors.set_failing(SensorKind::Gas, true);
        assert!(matches!(
            sensors.read(SensorKind::Gas).await,
            Err(IoError::SensorUnavailable {
                kind: SensorKind::Gas,
                ..
            })
        ));
        assert_eq!(sensors.read_count(SensorKind::Gas), 2);
        assert_eq!(sensors.read_count(SensorKind::Light), 0);
    }

    #[tokio::test]
    async fn recording_actuators_keep_order_even_when_failing() {
        let mut actuators = RecordingActuators::new();
        let observer = actuators.clone();

        actuators.set_siren(true).await.unwrap();
        observer.set_failing(true);
        assert!(actuators.set_window(true).await.is_err());

        assert_eq!(
            observer.commands(),
            vec![ActuatorCommand::Siren(true), ActuatorCommand::Window(true)]
        );
    }

    #[tokio::test]
    async fn memory_code_store_replaces_code() {
        let store = MemoryCodeStore::new(AlarmCode::parse("1234").unwrap());
        store
            .set_code(&AlarmCode::parse("5678").unwrap())
            .await
            .unwrap();
        assert!(store.get_code().await.unwrap().matches("5678"));
    }

    #[tokio::test]
    async fn channel_notifier_survives_dropped_receiver() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(&Notice::MotionDetected).await;
    }
}
