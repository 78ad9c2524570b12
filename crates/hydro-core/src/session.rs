//! Generator lifecycle state machine.
//!
//! A [`Session`] owns every piece of mutable simulation state (status,
//! settings, metrics, fault flags, regulator, operator log) together with
//! the three timers that drive it:
//!
//! * the plant tick, armed exactly while the status is active,
//! * the procedure sequencer,
//! * the grid-fault decay timer.
//!
//! Time only moves through [`Session::advance`] / [`Session::advance_to`],
//! which fire due timers in deadline order on the caller's thread.

use crate::command::Command;
use crate::config::{ConfigError, SimulationConfig};
use crate::event_log::{EventLog, LogEntry};
use crate::faults::FaultInjector;
use crate::metrics::{FaultFlags, Metrics};
use crate::noise::{NoiseSource, SeededNoise};
use crate::plant::TurbineModel;
use crate::regulator::VoltageRegulator;
use crate::sequencer::{SequenceEvent, SequenceKind, Sequencer};
use crate::settings::{SettingKey, Settings};
use crate::status::Status;
use serde::Serialize;
use std::time::Duration;

#[derive(Clone, Default, Debug, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub ticks_executed: u64,
    pub alerts_raised: u64,
    pub emergency_stops: u64,
    pub grid_trips: u64,
    pub commands_ignored: u64,
}

/// Deadlines currently armed, for inspection.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct ArmedTimers {
    pub tick: Option<Duration>,
    pub sequence: Option<Duration>,
    pub grid_decay: Option<Duration>,
}

impl ArmedTimers {
    pub fn count(&self) -> usize {
        [self.tick, self.sequence, self.grid_decay]
            .iter()
            .filter(|t| t.is_some())
            .count()
    }
}

/// Everything a host needs to render the unit.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub time_ms: u64,
    pub status: Status,
    pub metrics: Metrics,
    pub settings: Settings,
    pub faults: FaultFlags,
    pub logs: Vec<LogEntry>,
}

// Tie order when several timers share a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Timer {
    Sequence,
    GridDecay,
    Tick,
}

pub struct Session<N: NoiseSource = SeededNoise> {
    config: SimulationConfig,
    model: TurbineModel,
    regulator: VoltageRegulator,
    noise: N,
    status: Status,
    settings: Settings,
    metrics: Metrics,
    displayed: Metrics,
    faults: FaultInjector,
    sequencer: Sequencer,
    next_tick_at: Option<Duration>,
    log: EventLog,
    now: Duration,
    stats: SessionStats,
    disposed: bool,
}

impl Session<SeededNoise> {
    /// Seeds the noise from `config.seed`, or from entropy when unset.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        let noise = match config.seed {
            Some(seed) => SeededNoise::new(seed),
            None => SeededNoise::from_entropy(),
        };
        Self::with_noise(config, noise)
    }
}

impl<N: NoiseSource> Session<N> {
    pub fn with_noise(config: SimulationConfig, noise: N) -> Result<Self, ConfigError> {
        config.validate()?;
        let baseline = Metrics::baseline(config.generator.ambient_temp_c);
        let mut session = Self {
            model: TurbineModel::new(&config),
            regulator: VoltageRegulator::new(
                &config.regulator,
                config.tick_interval().as_secs_f64(),
            ),
            noise,
            status: Status::Stopped,
            settings: config.nominal,
            metrics: baseline,
            displayed: baseline,
            faults: FaultInjector::new(config.grid_fault_duration()),
            sequencer: Sequencer::new(config.sequence_step()),
            next_tick_at: None,
            log: EventLog::new(config.log_capacity),
            now: Duration::ZERO,
            stats: SessionStats::default(),
            disposed: false,
            config,
        };
        session.log("[SYSTEM] Simulator initialized. Awaiting commands.");
        Ok(session)
    }

    // ------------------------------------------------------------------
    // Observables
    // ------------------------------------------------------------------

    pub fn status(&self) -> Status {
        self.status
    }

    /// Metrics as seen by the operator; frozen while comms are lost.
    pub fn metrics(&self) -> &Metrics {
        &self.displayed
    }

    /// Metrics as computed by the plant, regardless of comms state.
    pub fn internal_metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn faults(&self) -> FaultFlags {
        self.faults.flags()
    }

    pub fn logs(&self) -> &EventLog {
        &self.log
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn regulator(&self) -> &VoltageRegulator {
        &self.regulator
    }

    pub fn active_sequence(&self) -> Option<SequenceKind> {
        self.sequencer.active_kind()
    }

    pub fn timers(&self) -> ArmedTimers {
        ArmedTimers {
            tick: self.next_tick_at,
            sequence: self.sequencer.next_deadline(),
            grid_decay: self.faults.grid_decay_deadline(),
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            time_ms: self.now.as_millis() as u64,
            status: self.status,
            metrics: self.displayed,
            settings: self.settings,
            faults: self.faults.flags(),
            logs: self.log.to_vec(),
        }
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Dispatches a host command. Returns false when the command was ignored.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Start => self.start(),
            Command::Stop => self.stop(),
            Command::EmergencyStop { reason } => self.emergency_stop(reason.as_deref()),
            Command::AcknowledgeAlert => self.acknowledge_alert(),
            Command::UpdateSetting { key, value } => self.update_setting(key, value),
            Command::TriggerGridFault => self.trigger_grid_fault(),
            Command::ToggleTrashRackClogging => self.toggle_trash_rack_clogging(),
            Command::ToggleCommsLoss => self.toggle_comms_loss(),
            Command::ResetFaults => self.reset_faults(),
        }
    }

    pub fn start(&mut self) -> bool {
        if self.disposed || !self.status.can_start() {
            return self.ignore("start");
        }
        self.sequencer.cancel();
        self.reset_faults();
        self.reset_plant();
        self.settings.intake_gate_position = 100.0;
        self.settings.guide_vane_position = 25.0;
        self.transition(Status::Starting);
        self.launch(SequenceKind::Start, Status::Running);
        true
    }

    pub fn stop(&mut self) -> bool {
        if self.disposed || !self.status.can_stop() {
            return self.ignore("stop");
        }
        self.settings.guide_vane_position = 0.0;
        self.transition(Status::Stopping);
        self.launch(SequenceKind::Stop, Status::Stopped);
        true
    }

    /// Tears down every pending timer and runs the emergency procedure.
    pub fn emergency_stop(&mut self, reason: Option<&str>) -> bool {
        if self.disposed || !self.status.can_emergency_stop() {
            return self.ignore("emergency_stop");
        }
        self.cancel_timers();
        if let Some(reason) = reason {
            self.log(format!("[SYSTEM] {reason}"));
        }
        log::warn!(
            "emergency stop from {}{}",
            self.status,
            reason.map(|r| format!(": {r}")).unwrap_or_default()
        );
        self.stats.emergency_stops += 1;
        self.transition(Status::EmergencyStop);
        self.launch(SequenceKind::Emergency, Status::Stopped);
        true
    }

    pub fn acknowledge_alert(&mut self) -> bool {
        if self.disposed || self.status != Status::Alert {
            return self.ignore("acknowledge_alert");
        }
        self.log("[SYSTEM] Alert acknowledged by operator.");
        self.transition(Status::Running);
        true
    }

    /// Overwrites one setpoint. Range gating is the host's job; only
    /// non-finite values are refused here.
    pub fn update_setting(&mut self, key: SettingKey, value: f64) -> bool {
        if self.disposed || !value.is_finite() {
            return self.ignore("update_setting");
        }
        log::debug!("{} {} -> {}", key, self.settings.get(key), value);
        self.settings.set(key, value);
        true
    }

    pub fn trigger_grid_fault(&mut self) -> bool {
        if self.disposed || !self.status.accepts_fault_injection() {
            return self.ignore("trigger_grid_fault");
        }
        self.log("[SCENARIO] Simulating major grid fault (generation loss).");
        self.faults.trigger_grid_fault(self.now);
        true
    }

    pub fn toggle_trash_rack_clogging(&mut self) -> bool {
        if self.disposed || !self.status.accepts_fault_injection() {
            return self.ignore("toggle_trash_rack_clogging");
        }
        if self.faults.toggle_trash_rack() {
            self.log("[SCENARIO] Simulating trash rack clogging. Reduced water flow.");
        } else {
            self.log("[SYSTEM] Trash rack cleaned. Water flow restored.");
        }
        true
    }

    pub fn toggle_comms_loss(&mut self) -> bool {
        if self.disposed {
            return self.ignore("toggle_comms_loss");
        }
        if self.status == Status::CommsLoss {
            self.faults.set_comms_loss(false);
            self.transition(Status::Running);
            self.publish_metrics();
            self.log("[SYSTEM] SCADA communication restored.");
            true
        } else if self.status.accepts_fault_injection() {
            self.faults.set_comms_loss(true);
            self.transition(Status::CommsLoss);
            self.log("[SCENARIO] Simulating SCADA communication loss. HMI data is frozen!");
            true
        } else {
            self.ignore("toggle_comms_loss")
        }
    }

    pub fn reset_faults(&mut self) -> bool {
        if self.disposed {
            return self.ignore("reset_faults");
        }
        self.faults.clear();
        self.settings.target_frequency = self.config.nominal.target_frequency;
        if self.status == Status::CommsLoss {
            self.transition(Status::Running);
        }
        self.publish_metrics();
        self.log("[SYSTEM] All fault conditions cleared.");
        true
    }

    /// Cancels every timer and refuses further commands.
    pub fn dispose(&mut self) {
        self.cancel_timers();
        self.disposed = true;
        log::info!("session disposed at {:?} in {}", self.now, self.status);
    }

    // ------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------

    /// Earliest armed deadline, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.next_due(Duration::MAX).map(|(at, _)| at)
    }

    pub fn advance(&mut self, dt: Duration) {
        self.advance_to(self.now.saturating_add(dt));
    }

    /// Fires every timer due up to `target`, in deadline order, then moves
    /// the clock to `target`. Targets in the past are ignored.
    pub fn advance_to(&mut self, target: Duration) {
        while let Some((at, timer)) = self.next_due(target) {
            self.now = self.now.max(at);
            self.fire(timer, at);
        }
        self.now = self.now.max(target);
    }

    fn next_due(&self, until: Duration) -> Option<(Duration, Timer)> {
        [
            (self.sequencer.next_deadline(), Timer::Sequence),
            (self.faults.grid_decay_deadline(), Timer::GridDecay),
            (self.next_tick_at, Timer::Tick),
        ]
        .into_iter()
        .filter_map(|(at, timer)| at.map(|at| (at, timer)))
        .filter(|(at, _)| *at <= until)
        .min()
    }

    fn fire(&mut self, timer: Timer, at: Duration) {
        match timer {
            Timer::Sequence => self.step_sequence(),
            Timer::GridDecay => {
                if self.faults.poll_decay(self.now) {
                    log::info!("grid fault decayed at {:?}", self.now);
                    self.log("[SYSTEM] Grid stabilizing after fault.");
                }
            }
            Timer::Tick => {
                self.next_tick_at = Some(at + self.config.tick_interval());
                self.tick();
            }
        }
    }

    fn step_sequence(&mut self) {
        match self.sequencer.fire(self.now) {
            Some(SequenceEvent::Line(line)) => self.log(line),
            Some(SequenceEvent::Finished { kind, final_status }) => {
                log::debug!("{:?} sequence complete", kind);
                self.transition(final_status);
            }
            None => {}
        }
    }

    fn tick(&mut self) {
        let prev = self.metrics;
        let flags = self.faults.flags();
        let outcome = self.model.step(
            &prev,
            &self.settings,
            &flags,
            &mut self.regulator,
            &mut self.noise,
        );
        self.metrics = outcome.metrics;
        self.stats.ticks_executed += 1;
        self.publish_metrics();

        if outcome.rocf_trip {
            let limit = self.model.limits().critical_rocf_hz_s;
            let rocf = outcome.metrics.rocf;
            log::warn!("rocf {:.3} Hz/s below critical {:.3} Hz/s", rocf, limit);
            self.stats.grid_trips += 1;
            self.transition(Status::GridUnstable);
            let reason = format!(
                "GRID INSTABILITY - RoCoF at {rocf:.2} Hz/s exceeded critical limit of {limit:.2} Hz/s."
            );
            self.emergency_stop(Some(&reason));
            return;
        }

        if let Some(breach) = outcome.breach {
            if self.status == Status::Running {
                log::warn!(
                    "operational limits exceeded: temp {:.1}C vibration {:.2}mm/s",
                    breach.temperature_c,
                    breach.vibration_mm_s
                );
                self.stats.alerts_raised += 1;
                self.transition(Status::Alert);
                self.log(format!(
                    "[ALERT] Operational limits exceeded! Temp: {:.1}°C, Vib: {:.2}mm/s",
                    breach.temperature_c, breach.vibration_mm_s
                ));
            }
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn transition(&mut self, next: Status) {
        if self.status == next {
            return;
        }
        log::info!("status {} -> {} at {:?}", self.status, next, self.now);
        self.status = next;
        self.sync_tick_timer();
        // Stopped always means the cold, nominal unit.
        if next == Status::Stopped {
            self.faults.clear();
            self.settings.target_frequency = self.config.nominal.target_frequency;
            self.reset_plant();
        }
    }

    /// Keeps exactly one tick armed while active and none otherwise.
    fn sync_tick_timer(&mut self) {
        if self.status.is_active() {
            if self.next_tick_at.is_none() {
                self.next_tick_at = Some(self.now + self.config.tick_interval());
            }
        } else {
            self.next_tick_at = None;
        }
    }

    fn launch(&mut self, kind: SequenceKind, final_status: Status) {
        self.sequencer.run(kind, kind.script(), final_status, self.now);
        // First line is written synchronously with the command.
        self.step_sequence();
    }

    fn cancel_timers(&mut self) {
        self.sequencer.cancel();
        self.faults.cancel_decay();
        self.next_tick_at = None;
    }

    fn reset_plant(&mut self) {
        self.metrics = Metrics::baseline(self.model.params().ambient_temp_c);
        self.regulator.reset();
        self.publish_metrics();
    }

    fn publish_metrics(&mut self) {
        if !self.faults.flags().is_comms_loss_active {
            self.displayed = self.metrics;
        }
    }

    fn log(&mut self, message: impl Into<String>) {
        self.log.push(self.now, message);
    }

    fn ignore(&mut self, command: &str) -> bool {
        log::debug!("ignoring {} in {}", command, self.status);
        self.stats.commands_ignored += 1;
        false
    }
}
