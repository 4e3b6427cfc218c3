//! Integration tests driving a full controller against simulated hardware.

use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use hearth_controller::{
    Backends, Config, Controller, ControllerError, ControllerHandle, ManualAction,
};
use hearth_io::sim::{ChannelNotifier, MemoryCodeStore, RecordingActuators, SimSensors};
use hearth_io::Notifier;
use hearth_types::{
    ActuatorCommand, AlarmCode, AlarmState, ClothingAdvice, CodePurpose, LightColor, Notice,
    SensorKind, StatusSnapshot, SystemMode,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

const WAIT: Duration = Duration::from_secs(5);

struct Harness {
    handle: ControllerHandle,
    sensors: SimSensors,
    actuators: RecordingActuators,
    notices: mpsc::UnboundedReceiver<Notice>,
    status: watch::Receiver<StatusSnapshot>,
    task: JoinHandle<Result<(), ControllerError>>,
}

impl Harness {
    async fn shutdown(self) {
        self.handle.shutdown().await.unwrap();
        let result = tokio::time::timeout(WAIT, self.task)
            .await
            .expect("controller should stop")
            .unwrap();
        assert!(result.is_ok());
    }

    async fn wait_for(&mut self, pred: impl Fn(&StatusSnapshot) -> bool) -> StatusSnapshot {
        wait_for_status(&mut self.status, WAIT, pred)
            .await
            .expect("status condition not reached")
    }

    /// Wait until a notice matching `pred` arrives, skipping others.
    async fn expect_notice(&mut self, pred: impl Fn(&Notice) -> bool) -> Notice {
        tokio::time::timeout(WAIT, async {
            loop {
                let notice = self.notices.recv().await.expect("notifier closed");
                if pred(&notice) {
                    return notice;
                }
            }
        })
        .await
        .expect("notice not received")
    }

    fn drain_notices(&mut self) -> Vec<Notice> {
        let mut out = Vec::new();
        while let Ok(notice) = self.notices.try_recv() {
            out.push(notice);
        }
        out
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn start(config: Config, sensors: SimSensors) -> Harness {
    let (notifier, notices) = ChannelNotifier::new();
    start_with(config, sensors, Arc::new(notifier), notices)
}

fn start_with(
    config: Config,
    sensors: SimSensors,
    notifier: Arc<dyn Notifier>,
    notices: mpsc::UnboundedReceiver<Notice>,
) -> Harness {
    init_tracing();
    let actuators = RecordingActuators::new();
    let backends = Backends {
        sensors: Arc::new(sensors.clone()),
        actuators: Box::new(actuators.clone()),
        notifier,
        codes: Box::new(MemoryCodeStore::new(AlarmCode::parse("1234").unwrap())),
    };
    let (controller, handle) = Controller::new(config, backends);
    let status = handle.subscribe();
    let task = tokio::spawn(controller.run());
    Harness {
        handle,
        sensors,
        actuators,
        notices,
        status,
        task,
    }
}

fn automatic() -> Harness {
    start(Config::default(), SimSensors::new())
}

fn manual_config() -> Config {
    let mut config = Config::default();
    config.controller.startup_mode = SystemMode::Manual;
    config
}

fn manual() -> Harness {
    start(manual_config(), SimSensors::new())
}

/// A front-end that reacts to notices through the controller handle, and
/// records the status it saw when each notice arrived.
struct Frontend {
    handle: OnceLock<ControllerHandle>,
    /// Typed on the keypad as soon as a code is requested.
    answer: Option<&'static str>,
    seen: Mutex<Vec<(Notice, StatusSnapshot)>>,
    forward: mpsc::UnboundedSender<Notice>,
}

impl Frontend {
    fn seen(&self) -> Vec<(Notice, StatusSnapshot)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for Frontend {
    async fn notify(&self, notice: &Notice) {
        let Some(handle) = self.handle.get() else {
            return;
        };
        if let (Notice::CodeRequested { .. }, Some(keys)) = (notice, self.answer) {
            handle.press_keys(keys).unwrap();
        }
        self.seen
            .lock()
            .unwrap()
            .push((notice.clone(), handle.status()));
        let _ = self.forward.send(notice.clone());
    }
}

fn start_frontend(config: Config, answer: Option<&'static str>) -> (Harness, Arc<Frontend>) {
    let (forward, notices) = mpsc::unbounded_channel();
    let frontend = Arc::new(Frontend {
        handle: OnceLock::new(),
        answer,
        seen: Mutex::new(Vec::new()),
        forward,
    });
    let h = start_with(config, SimSensors::new(), frontend.clone(), notices);
    let _ = frontend.handle.set(h.handle.clone());
    (h, frontend)
}

async fn wait_for_status(
    rx: &mut watch::Receiver<StatusSnapshot>,
    timeout: Duration,
    pred: impl Fn(&StatusSnapshot) -> bool,
) -> Result<StatusSnapshot, &'static str> {
    tokio::time::timeout(timeout, async {
        loop {
            {
                let status = rx.borrow_and_update().clone();
                if pred(&status) {
                    return Ok(status);
                }
            }
            if rx.changed().await.is_err() {
                return Err("watch closed");
            }
        }
    })
    .await
    .map_err(|_| "timeout")?
}

/// Wait for the prompt for `purpose` to open, then type `keys`.
async fn enter_code(
    handle: &ControllerHandle,
    status: &mut watch::Receiver<StatusSnapshot>,
    purpose: CodePurpose,
    keys: &str,
) {
    wait_for_status(status, WAIT, |s| s.code_prompt == Some(purpose))
        .await
        .expect("code prompt should open");
    handle.press_keys(keys).unwrap();
}

/// Force the alarm armed from manual mode, then hand over to automation.
async fn armed_and_automatic(h: &mut Harness) {
    h.handle.manual(ManualAction::Alarm(true)).await.unwrap();
    h.handle.switch_to_auto().await.unwrap();
    h.wait_for(|s| s.alarm == AlarmState::Armed && s.active_watchers == 4)
        .await;
}

#[tokio::test(start_paused = true)]
async fn starts_automatic_with_all_watchers() {
    let mut h = automatic();
    let status = h
        .wait_for(|s| s.mode == SystemMode::Automatic && s.readings.len() == 4)
        .await;
    assert_eq!(status.active_watchers, 4);
    assert_eq!(status.alarm, AlarmState::Disarmed);
    assert_eq!(status.reading(SensorKind::Gas).unwrap().raw, 100);
    assert!(!status.presence_detected());
    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn presence_while_armed_then_correct_code_disarms() {
    let mut h = manual();
    armed_and_automatic(&mut h).await;

    h.sensors.set(SensorKind::Range, 40);
    let status = h
        .wait_for(|s| s.code_prompt == Some(CodePurpose::Intrusion))
        .await;
    assert_eq!(status.alarm, AlarmState::AwaitingCode);
    assert!(status.siren_on);

    h.handle.press_keys("1234#").unwrap();
    let status = h.wait_for(|s| s.alarm == AlarmState::Disarmed).await;
    assert!(!status.siren_on);
    assert_eq!(status.code_prompt, None);
    h.expect_notice(|n| *n == Notice::WelcomeHome).await;

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn presence_during_intrusion_prompt_opens_no_second_session() {
    let mut h = manual();
    armed_and_automatic(&mut h).await;

    h.sensors.set(SensorKind::Range, 40);
    h.wait_for(|s| s.code_prompt == Some(CodePurpose::Intrusion))
        .await;
    h.sensors.set(SensorKind::Range, 1000);
    tokio::time::sleep(Duration::from_secs(1)).await;
    h.sensors.set(SensorKind::Range, 40);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(
        h.handle.status().code_prompt,
        Some(CodePurpose::Intrusion)
    );

    h.handle.press_keys("1234#").unwrap();
    h.wait_for(|s| s.alarm == AlarmState::Disarmed).await;
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(h.handle.status().code_prompt, None);

    let prompts: Vec<Notice> = h
        .drain_notices()
        .into_iter()
        .filter(|n| matches!(n, Notice::CodeRequested { .. }))
        .collect();
    assert_eq!(
        prompts,
        vec![Notice::CodeRequested {
            purpose: CodePurpose::Intrusion,
            timeout_secs: 10,
        }]
    );

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn siren_fault_is_announced_with_the_alarm_state_it_belongs_to() {
    let (mut h, frontend) = start_frontend(manual_config(), None);
    h.actuators.set_failing(true);
    armed_and_automatic(&mut h).await;

    h.sensors.set(SensorKind::Range, 40);
    h.wait_for(|s| s.code_prompt == Some(CodePurpose::Intrusion))
        .await;
    h.handle.press_keys("1234#").unwrap();
    h.expect_notice(|n| *n == Notice::WelcomeHome).await;

    let faults: Vec<(bool, AlarmState)> = frontend
        .seen()
        .into_iter()
        .filter(|(n, _)| {
            matches!(
                n,
                Notice::ActuatorFault {
                    command: ActuatorCommand::Siren(_)
                }
            )
        })
        .map(|(_, status)| (status.siren_on, status.alarm))
        .collect();
    assert_eq!(
        faults,
        vec![
            (true, AlarmState::AwaitingCode),
            (false, AlarmState::Disarmed)
        ]
    );

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn code_typed_as_soon_as_requested_is_accepted() {
    let (mut h, frontend) = start_frontend(manual_config(), Some("1234#"));

    let start = tokio::time::Instant::now();
    h.handle.arm().await.unwrap();
    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(h.handle.status().alarm, AlarmState::ArmingCountdown);
    h.expect_notice(|n| matches!(n, Notice::ArmingScheduled { .. }))
        .await;

    // The prompt was already open when it was announced.
    let announced = frontend
        .seen()
        .into_iter()
        .find(|(n, _)| matches!(n, Notice::CodeRequested { .. }))
        .map(|(_, status)| status.code_prompt);
    assert_eq!(announced, Some(Some(CodePurpose::Arm)));

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn presence_while_armed_without_code_triggers() {
    let mut h = manual();
    armed_and_automatic(&mut h).await;

    h.sensors.set(SensorKind::Range, 40);
    h.wait_for(|s| s.alarm == AlarmState::AwaitingCode).await;
    let status = wait_for_status(&mut h.status, Duration::from_secs(15), |s| {
        s.alarm == AlarmState::Triggered
    })
    .await
    .unwrap();
    assert!(status.siren_on);
    h.expect_notice(|n| *n == Notice::UnauthorizedAccess).await;

    // A code typed after the window closed does nothing.
    h.handle.press_keys("1234#").unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(h.handle.status().alarm, AlarmState::Triggered);

    // Only an operator disarm gets out of Triggered.
    let handle = h.handle.clone();
    let (result, ()) = tokio::join!(
        handle.disarm(),
        enter_code(&h.handle, &mut h.status, CodePurpose::Disarm, "1234#")
    );
    result.unwrap();
    let status = h.handle.status();
    assert_eq!(status.alarm, AlarmState::Disarmed);
    assert!(!status.siren_on);

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn wrong_code_triggers_before_timeout() {
    let mut h = manual();
    armed_and_automatic(&mut h).await;

    h.sensors.set(SensorKind::Range, 40);
    h.wait_for(|s| s.code_prompt == Some(CodePurpose::Intrusion))
        .await;
    let start = tokio::time::Instant::now();
    h.handle.press_keys("9999#").unwrap();
    h.wait_for(|s| s.alarm == AlarmState::Triggered).await;
    assert!(start.elapsed() < Duration::from_secs(10));

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn arm_rejects_wrong_code_and_accepts_right_one() {
    let mut h = automatic();
    h.wait_for(|s| s.readings.contains_key(&SensorKind::Range))
        .await;

    let handle = h.handle.clone();
    let (result, ()) = tokio::join!(
        handle.arm(),
        enter_code(&h.handle, &mut h.status, CodePurpose::Arm, "9999#")
    );
    assert!(matches!(result, Err(ControllerError::CodeRejected)));
    assert_eq!(h.handle.status().alarm, AlarmState::Disarmed);
    h.expect_notice(|n| *n == Notice::ArmFailed).await;

    let (result, ()) = tokio::join!(
        handle.arm(),
        enter_code(&h.handle, &mut h.status, CodePurpose::Arm, "1234#")
    );
    result.unwrap();
    assert_eq!(h.handle.status().alarm, AlarmState::ArmingCountdown);

    let status = wait_for_status(&mut h.status, Duration::from_secs(15), |s| {
        s.alarm == AlarmState::Armed
    })
    .await
    .unwrap();
    assert!(!status.siren_on);
    h.expect_notice(|n| *n == Notice::AlarmArmed).await;

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn arm_times_out_without_keys() {
    let h = automatic();
    let result = h.handle.arm().await;
    assert!(matches!(result, Err(ControllerError::CodeEntryTimeout)));
    assert_eq!(h.handle.status().alarm, AlarmState::Disarmed);
    assert_eq!(h.handle.status().code_prompt, None);
    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn arm_refused_while_someone_is_home() {
    let sensors = SimSensors::new();
    sensors.set(SensorKind::Range, 30);
    let mut h = start(Config::default(), sensors);

    // The first close-range observation asks for the arm code; let it lapse.
    h.wait_for(|s| s.code_prompt == Some(CodePurpose::Arm)).await;
    wait_for_status(&mut h.status, Duration::from_secs(15), |s| {
        s.code_prompt.is_none()
    })
    .await
    .unwrap();
    assert!(h.handle.status().presence_detected());

    let result = h.handle.arm().await;
    assert!(matches!(result, Err(ControllerError::PresenceDetected)));
    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn arm_while_engaged_is_busy() {
    let h = manual();
    h.handle.manual(ManualAction::Alarm(true)).await.unwrap();
    let result = h.handle.arm().await;
    assert!(matches!(
        result,
        Err(ControllerError::AlarmBusy(AlarmState::Armed))
    ));
    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn disarm_during_countdown_cancels_arming() {
    let mut h = automatic();
    h.wait_for(|s| s.readings.len() == 4).await;

    let handle = h.handle.clone();
    let (result, ()) = tokio::join!(
        handle.arm(),
        enter_code(&h.handle, &mut h.status, CodePurpose::Arm, "1234#")
    );
    result.unwrap();

    let (result, ()) = tokio::join!(
        handle.disarm(),
        enter_code(&h.handle, &mut h.status, CodePurpose::Disarm, "1234#")
    );
    result.unwrap();
    assert_eq!(h.handle.status().alarm, AlarmState::Disarmed);

    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(h.handle.status().alarm, AlarmState::Disarmed);
    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn presence_while_disarmed_asks_to_arm() {
    let mut h = automatic();
    h.wait_for(|s| s.readings.contains_key(&SensorKind::Range))
        .await;

    h.sensors.set(SensorKind::Range, 40);
    h.wait_for(|s| s.code_prompt == Some(CodePurpose::Arm)).await;
    h.handle.press_keys("1234#").unwrap();
    h.wait_for(|s| s.alarm == AlarmState::ArmingCountdown).await;
    h.expect_notice(|n| matches!(n, Notice::ArmingScheduled { delay_secs: 10 }))
        .await;

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn switch_to_manual_denied_keeps_watchers() {
    let mut h = automatic();
    h.wait_for(|s| s.active_watchers == 4).await;

    let handle = h.handle.clone();
    let (result, ()) = tokio::join!(
        handle.switch_to_manual(),
        enter_code(&h.handle, &mut h.status, CodePurpose::ManualMode, "9999#")
    );
    assert!(matches!(result, Err(ControllerError::ModeSwitchDenied)));
    let status = h.handle.status();
    assert_eq!(status.mode, SystemMode::Automatic);
    assert_eq!(status.active_watchers, 4);
    h.expect_notice(|n| *n == Notice::ModeSwitchDenied).await;

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn switch_to_manual_stops_all_polling() {
    let mut h = automatic();
    h.wait_for(|s| s.readings.len() == 4).await;

    let handle = h.handle.clone();
    let (result, ()) = tokio::join!(
        handle.switch_to_manual(),
        enter_code(&h.handle, &mut h.status, CodePurpose::ManualMode, "1234#")
    );
    result.unwrap();
    let status = h.handle.status();
    assert_eq!(status.mode, SystemMode::Manual);
    assert_eq!(status.active_watchers, 0);

    let before: Vec<u64> = SensorKind::ALL
        .iter()
        .map(|&k| h.sensors.read_count(k))
        .collect();
    tokio::time::sleep(Duration::from_secs(5)).await;
    let after: Vec<u64> = SensorKind::ALL
        .iter()
        .map(|&k| h.sensors.read_count(k))
        .collect();
    assert_eq!(before, after);

    // Automation no longer reacts.
    h.sensors.set(SensorKind::Gas, 900);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(!h.handle.status().window_open);

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn switch_to_auto_is_idempotent() {
    let mut h = manual();
    assert_eq!(h.handle.status().active_watchers, 0);

    h.handle.switch_to_auto().await.unwrap();
    h.handle.switch_to_auto().await.unwrap();
    let status = h.handle.status();
    assert_eq!(status.mode, SystemMode::Automatic);
    assert_eq!(status.active_watchers, 4);

    let automatic_notices = h
        .drain_notices()
        .into_iter()
        .filter(|n| *n == Notice::AutomaticMode)
        .count();
    assert_eq!(automatic_notices, 1);

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn gas_rise_and_fall_moves_window() {
    let sensors = SimSensors::new();
    sensors.set(SensorKind::Gas, 280);
    let mut h = start(Config::default(), sensors);
    h.wait_for(|s| s.reading(SensorKind::Gas).is_some_and(|r| r.raw == 280))
        .await;

    h.sensors.set(SensorKind::Gas, 350);
    h.wait_for(|s| s.window_open).await;

    h.sensors.set(SensorKind::Gas, 250);
    h.wait_for(|s| !s.window_open && s.reading(SensorKind::Gas).is_some_and(|r| r.raw == 250))
        .await;

    let gas: Vec<Notice> = h
        .drain_notices()
        .into_iter()
        .filter(|n| matches!(n, Notice::GasDanger { .. } | Notice::GasNormal { .. }))
        .collect();
    assert_eq!(
        gas,
        vec![
            Notice::GasDanger { raw: 350 },
            Notice::GasNormal { raw: 250 }
        ]
    );
    let windows: Vec<ActuatorCommand> = h
        .actuators
        .commands()
        .into_iter()
        .filter(|c| matches!(c, ActuatorCommand::Window(_)))
        .collect();
    assert_eq!(
        windows,
        vec![ActuatorCommand::Window(true), ActuatorCommand::Window(false)]
    );

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn gas_already_dangerous_at_startup_opens_window() {
    let sensors = SimSensors::new();
    sensors.set(SensorKind::Gas, 350);
    let mut h = start(Config::default(), sensors);

    h.wait_for(|s| s.window_open).await;
    h.expect_notice(|n| *n == Notice::GasDanger { raw: 350 })
        .await;
    assert!(h
        .actuators
        .commands()
        .contains(&ActuatorCommand::Window(true)));

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn darkness_switches_light_on_in_configured_color() {
    let mut config = Config::default();
    config.lighting.color = LightColor::Yellow;
    let mut h = start(config, SimSensors::new());
    h.wait_for(|s| s.readings.contains_key(&SensorKind::Light))
        .await;

    h.sensors.set(SensorKind::Light, 120);
    h.wait_for(|s| s.light == Some(LightColor::Yellow)).await;

    h.sensors.set(SensorKind::Light, 900);
    h.wait_for(|s| s.light.is_none() && s.reading(SensorKind::Light).is_some_and(|r| !r.active))
        .await;

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn motion_is_announced() {
    let mut h = automatic();
    h.wait_for(|s| s.readings.contains_key(&SensorKind::Motion))
        .await;
    h.sensors.set(SensorKind::Motion, 1);
    h.expect_notice(|n| *n == Notice::MotionDetected).await;
    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn failing_sensor_is_skipped_until_it_recovers() {
    let mut h = automatic();
    h.wait_for(|s| s.readings.len() == 4).await;

    h.sensors.set_failing(SensorKind::Gas, true);
    h.sensors.set(SensorKind::Gas, 700);
    tokio::time::sleep(Duration::from_secs(2)).await;
    let status = h.handle.status();
    assert!(!status.window_open);
    assert_eq!(status.reading(SensorKind::Gas).unwrap().raw, 100);
    assert_eq!(status.active_watchers, 4);

    h.sensors.set_failing(SensorKind::Gas, false);
    h.wait_for(|s| s.window_open).await;
    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn manual_actions_need_manual_mode() {
    let h = automatic();
    let result = h.handle.manual(ManualAction::Window(true)).await;
    assert!(matches!(result, Err(ControllerError::NotInManualMode)));
    h.shutdown().await;

    let h = manual();
    h.handle
        .manual(ManualAction::Light(Some(LightColor::Blue)))
        .await
        .unwrap();
    h.handle.manual(ManualAction::Window(true)).await.unwrap();
    h.handle.manual(ManualAction::Siren(true)).await.unwrap();
    let status = h.handle.status();
    assert_eq!(status.light, Some(LightColor::Blue));
    assert!(status.window_open);
    assert!(status.siren_on);

    h.handle.manual(ManualAction::Alarm(false)).await.unwrap();
    let status = h.handle.status();
    assert_eq!(status.alarm, AlarmState::Disarmed);
    assert!(!status.siren_on);
    assert_eq!(
        h.actuators.commands(),
        vec![
            ActuatorCommand::Light(Some(LightColor::Blue)),
            ActuatorCommand::Window(true),
            ActuatorCommand::Siren(true),
            ActuatorCommand::Siren(false),
        ]
    );
    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn actuator_fault_is_notified() {
    let mut h = manual();
    h.actuators.set_failing(true);
    h.handle.manual(ManualAction::Siren(true)).await.unwrap();
    h.expect_notice(|n| {
        *n == Notice::ActuatorFault {
            command: ActuatorCommand::Siren(true),
        }
    })
    .await;
    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn new_code_replaces_old_one() {
    let mut h = automatic();
    h.wait_for(|s| s.readings.len() == 4).await;

    let result = h.handle.set_new_code("12").await;
    assert!(matches!(result, Err(ControllerError::InvalidCodeFormat(_))));
    h.handle.set_new_code("5678").await.unwrap();
    h.expect_notice(|n| *n == Notice::CodeChanged).await;

    let handle = h.handle.clone();
    let (result, ()) = tokio::join!(
        handle.arm(),
        enter_code(&h.handle, &mut h.status, CodePurpose::Arm, "1234#")
    );
    assert!(matches!(result, Err(ControllerError::CodeRejected)));

    let (result, ()) = tokio::join!(
        handle.arm(),
        enter_code(&h.handle, &mut h.status, CodePurpose::Arm, "5678#")
    );
    result.unwrap();
    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn clothing_advice_from_climate_sensor() {
    let mut h = manual();
    assert_eq!(h.handle.clothing_advice().await.unwrap(), ClothingAdvice::Warm);
    h.expect_notice(|n| matches!(n, Notice::Clothing { advice: ClothingAdvice::Warm, .. }))
        .await;

    h.sensors.set_climate(None);
    assert!(matches!(
        h.handle.clothing_advice().await,
        Err(ControllerError::Io(_))
    ));
    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_joins_watchers() {
    let mut h = automatic();
    h.wait_for(|s| s.active_watchers == 4).await;
    let handle = h.handle.clone();
    let status = h.status.clone();
    h.shutdown().await;

    assert_eq!(status.borrow().active_watchers, 0);
    assert!(matches!(
        handle.switch_to_auto().await,
        Err(ControllerError::NotRunning)
    ));
}
