//! Application service: the hexagonal core.
//!
//! [`AppService`] owns every piece of engine state: the switch debounce
//! table, the relay map, the alarm schedule, the emergency window and the
//! display lease.  Hardware and network collaborators are injected at each
//! call site through port traits, so the whole service runs against mock
//! adapters in tests.
//!
//! ```text
//!      Board ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                │          AppService           │
//!     Remote ◀──▶│ Debounce · Relays · Alarms    │
//!                │ Emergency · Display lease     │
//!  TimePort ───▶ └──────────────────────────────┘
//! ```
//!
//! One call to [`AppService::tick`] is one polling cycle.  Steps run in a
//! fixed order and always to completion:
//!
//! 1. switch debounce and relay synchronisation
//! 2. alarm refresh, then firing of due alarms
//! 3. emergency: pending flag retry, heart-rate evaluation, expiry
//! 4. display lease expiry
//! 5. routine status screen
//! 6. telemetry

use core::fmt::Write;

use heapless::{String, Vec};
use log::{debug, info, warn};

use crate::alarms::{Alarm, AlarmReconciler};
use crate::clock::{CanonicalTime, Millis};
use crate::config::{DeviceId, MAX_DEVICES, SystemConfig};
use crate::debounce::DebounceGate;
use crate::display_gate::DisplayLease;
use crate::emergency::{EmergencyMachine, EmergencyReason, EmergencyState, Transition};
use crate::relay::RelaySynchronizer;

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryRecord};
use super::ports::{Board, ClimateReading, EventSink, RelayPort, Remote, TimePort};

/// Spoken when an emergency is entered.
pub const EMERGENCY_ANNOUNCEMENT: &str = "Emergency detected, notifying nurse";

/// Capacity of one status-screen line.
pub const STATUS_LEN: usize = 96;

/// Remote emergency flag write that has not been accepted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagWrite {
    Set(EmergencyReason),
    Clear,
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    debounce: DebounceGate,
    relays: RelaySynchronizer,
    alarms: AlarmReconciler,
    emergency: EmergencyMachine,
    display: DisplayLease,
    /// Last heart-rate sample (`0.0` = no reading).
    heart_rate: f32,
    climate: ClimateReading,
    last_status_ms: Option<Millis>,
    last_telemetry_ms: Millis,
    pending_flag: Option<FlagWrite>,
    cycle_count: u64,
}

impl AppService {
    /// Build the engine from a validated configuration.
    ///
    /// Does **not** touch hardware; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let debounce = DebounceGate::from_devices(&config.devices);
        let relays = RelaySynchronizer::new(&config.devices, config.emergency_relay_pin);
        let emergency = EmergencyMachine::new(config.heart_rate_threshold_bpm);

        Self {
            config,
            debounce,
            relays,
            alarms: AlarmReconciler::new(),
            emergency,
            display: DisplayLease::new(),
            heart_rate: 0.0,
            climate: ClimateReading::UNAVAILABLE,
            last_status_ms: None,
            last_telemetry_ms: 0,
            pending_flag: None,
            cycle_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every relay to off and announce readiness.
    pub fn start(&mut self, hw: &mut impl RelayPort, sink: &mut impl EventSink) {
        self.relays.drive_all_off(hw);
        let devices = self.relays.devices().len();
        sink.emit(&AppEvent::Started { devices });
        info!("AppService started with {} device(s)", devices);
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full polling cycle.
    ///
    /// The `hw` parameter satisfies every board port at once; this avoids
    /// a double mutable borrow while keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        hw: &mut impl Board,
        remote: &mut impl Remote,
        clock: &impl TimePort,
        sink: &mut impl EventSink,
    ) {
        self.cycle_count += 1;
        let now = clock.now_ms();

        // 1. Switches → relays
        self.poll_switches(hw, remote, now, sink);

        // 2. Alarms
        self.reconcile_alarms(hw, remote, clock, now, sink);

        // 3. Emergency
        self.flush_pending_flag(remote);
        self.heart_rate = hw.read_heart_rate();
        if let Some(t) = self.emergency.evaluate_heart_rate(self.heart_rate, now) {
            self.on_emergency(t, EmergencyReason::HeartRateHigh, hw, remote, sink);
        }
        if self.emergency.tick(now) {
            self.write_flag(FlagWrite::Clear, remote);
            sink.emit(&AppEvent::EmergencyCleared);
        }

        // 4. Display lease
        self.display.tick(now);

        // 5. Status screen
        self.refresh_status(hw, clock, now);

        // 6. Telemetry
        let interval_ms = Millis::from(self.config.telemetry_interval_secs) * 1000;
        if now.saturating_sub(self.last_telemetry_ms) >= interval_ms {
            self.publish_telemetry(remote, now, sink);
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an inbound command from the cloud channel.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl RelayPort,
        remote: &mut impl Remote,
        now: Millis,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::Power { device, on } => {
                let Ok(ack) = self.relays.apply_remote_command(&device, on, hw) else {
                    return;
                };
                sink.emit(&AppEvent::RelayCommanded {
                    device: ack.device,
                    on: ack.on,
                });
                if ack.emergency {
                    self.raise_emergency(EmergencyReason::ManualCall, hw, remote, now, sink);
                }
            }
            AppCommand::DismissAlarm(index) => {
                if self.alarms.dismiss(index).is_none() {
                    debug!("Alarms: #{} dismissed before it was scheduled", index);
                }
                if let Err(e) = remote.delete_alarm(index) {
                    warn!("Alarms: remote delete of #{} failed: {}", index, e);
                }
                sink.emit(&AppEvent::AlarmDismissed { index });
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry record from the latest samples.
    pub fn build_telemetry(&self, now: Millis) -> TelemetryRecord {
        TelemetryRecord {
            heart_rate_bpm: (self.heart_rate.is_finite() && self.heart_rate > 0.0)
                .then_some(self.heart_rate),
            temperature_c: finite(self.climate.temperature_c),
            humidity_pct: finite(self.climate.humidity_pct),
            emergency: self.emergency.is_active_at(now),
            emergency_reason: self
                .emergency
                .reason()
                .filter(|_| self.emergency.is_active_at(now)),
            uptime_secs: now / 1000,
        }
    }

    pub fn emergency_state(&self) -> EmergencyState {
        self.emergency.state()
    }

    pub fn emergency_active(&self, now: Millis) -> bool {
        self.emergency.is_active_at(now)
    }

    pub fn alarms(&self) -> &AlarmReconciler {
        &self.alarms
    }

    pub fn is_display_available(&self, now: Millis) -> bool {
        self.display.is_available(now)
    }

    pub fn relays(&self) -> &RelaySynchronizer {
        &self.relays
    }

    /// Polling cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn poll_switches(
        &mut self,
        hw: &mut impl Board,
        remote: &mut impl Remote,
        now: Millis,
        sink: &mut impl EventSink,
    ) {
        let mut triggered: Vec<DeviceId, MAX_DEVICES> = Vec::new();
        for dev in self.relays.devices() {
            let level = hw.read_switch(dev.switch_pin);
            if self.debounce.poll_actionable(dev.switch_pin, level, now).is_some() {
                // Capacity equals the device table size.
                let _ = triggered.push(dev.id.clone());
            }
        }

        for id in triggered {
            let Ok(n) = self.relays.apply_local_trigger(&id, hw) else {
                continue;
            };
            if let Err(e) = remote.send_power_state(&n.device, n.on) {
                warn!("Relay: state report for {} failed: {}", n.device, e);
            }
            sink.emit(&AppEvent::RelayToggled {
                device: n.device,
                on: n.on,
            });
            if n.emergency {
                self.raise_emergency(EmergencyReason::ManualCall, hw, remote, now, sink);
            }
        }
    }

    fn reconcile_alarms(
        &mut self,
        hw: &mut impl Board,
        remote: &mut impl Remote,
        clock: &impl TimePort,
        now: Millis,
        sink: &mut impl EventSink,
    ) {
        match remote.alarm_count() {
            Ok(count) => {
                if let Some(report) = self.alarms.refresh_if_stale(count, remote) {
                    sink.emit(&AppEvent::AlarmsRefreshed {
                        remote_count: count,
                        fetched: report.fetched,
                        failed: report.failed,
                    });
                }
            }
            Err(e) => debug!("Alarms: count unavailable: {}", e),
        }

        let Some(now_canonical) = clock.now_canonical() else {
            return;
        };
        for alarm in self.alarms.fire_due(&now_canonical) {
            self.on_alarm_fired(alarm, hw, remote, now, sink);
        }
    }

    fn on_alarm_fired(
        &mut self,
        alarm: Alarm,
        hw: &mut impl Board,
        remote: &mut impl Remote,
        now: Millis,
        sink: &mut impl EventSink,
    ) {
        info!("Alarms: #{} '{}' due", alarm.index, alarm.title);

        if self.display.acquire(now) {
            hw.render_alarm(&alarm.title);
        } else {
            debug!("Display: busy, notice for #{} not shown", alarm.index);
        }

        let mut message: String<STATUS_LEN> = String::new();
        let _ = write!(message, "Reminder: {}", alarm.title);
        if let Err(e) = remote.announce(&message) {
            warn!("Alarms: announcement for #{} failed: {}", alarm.index, e);
        }
        if let Err(e) = remote.delete_alarm(alarm.index) {
            warn!("Alarms: remote delete of #{} failed: {}", alarm.index, e);
        }

        sink.emit(&AppEvent::AlarmFired {
            index: alarm.index,
            title: alarm.title,
        });
    }

    fn raise_emergency(
        &mut self,
        reason: EmergencyReason,
        hw: &mut impl RelayPort,
        remote: &mut impl Remote,
        now: Millis,
        sink: &mut impl EventSink,
    ) {
        let t = self.emergency.raise(reason, now);
        self.on_emergency(t, reason, hw, remote, sink);
    }

    fn on_emergency(
        &mut self,
        transition: Transition,
        reason: EmergencyReason,
        hw: &mut impl RelayPort,
        remote: &mut impl Remote,
        sink: &mut impl EventSink,
    ) {
        match transition {
            Transition::Entered => {
                self.write_flag(FlagWrite::Set(reason), remote);
                if let Err(e) = remote.announce(EMERGENCY_ANNOUNCEMENT) {
                    warn!("Emergency: announcement failed: {}", e);
                }
                if reason == EmergencyReason::HeartRateHigh {
                    self.call_nurse(hw, remote, sink);
                }
            }
            Transition::Rearmed {
                reason_changed: true,
            } => self.write_flag(FlagWrite::Set(reason), remote),
            Transition::Rearmed { .. } => return,
        }
        sink.emit(&AppEvent::EmergencyRaised {
            reason,
            rearmed: transition != Transition::Entered,
        });
    }

    /// Switch the nurse-call relay on if it is provisioned and off.
    fn call_nurse(
        &mut self,
        hw: &mut impl RelayPort,
        remote: &mut impl Remote,
        sink: &mut impl EventSink,
    ) {
        let Some(id) = self.relays.emergency_device().map(|d| d.id.clone()) else {
            return;
        };
        if self.relays.logical_state(&id, hw) != Ok(false) {
            return;
        }
        let Ok(ack) = self.relays.apply_remote_command(&id, true, hw) else {
            return;
        };
        if let Err(e) = remote.send_power_state(&ack.device, true) {
            warn!("Relay: state report for {} failed: {}", ack.device, e);
        }
        sink.emit(&AppEvent::NurseCalled { device: ack.device });
    }

    fn write_flag(&mut self, write: FlagWrite, remote: &mut impl Remote) {
        let (active, reason) = match write {
            FlagWrite::Set(r) => (true, r.as_str()),
            FlagWrite::Clear => (false, ""),
        };
        match remote.set_emergency(active, reason) {
            Ok(()) => self.pending_flag = None,
            Err(e) => {
                warn!("Emergency: flag write failed, will retry: {}", e);
                self.pending_flag = Some(write);
            }
        }
    }

    fn flush_pending_flag(&mut self, remote: &mut impl Remote) {
        if let Some(write) = self.pending_flag.take() {
            self.write_flag(write, remote);
        }
    }

    fn refresh_status(&mut self, hw: &mut impl Board, clock: &impl TimePort, now: Millis) {
        let period = Millis::from(self.config.status_refresh_ms);
        if self
            .last_status_ms
            .is_some_and(|last| now.saturating_sub(last) < period)
        {
            return;
        }
        self.last_status_ms = Some(now);
        self.climate = hw.read_climate();

        if self.display.is_available(now) {
            let line = format_status(clock.now_canonical().as_ref(), self.climate, self.heart_rate);
            hw.render_status(&line);
        }
    }

    fn publish_telemetry(&mut self, remote: &mut impl Remote, now: Millis, sink: &mut impl EventSink) {
        self.last_telemetry_ms = now;
        let record = self.build_telemetry(now);
        if let Err(e) = remote.set_telemetry(&record) {
            warn!("Telemetry: publish failed: {}", e);
        }
        sink.emit(&AppEvent::Telemetry(record));
    }
}

fn finite(v: f32) -> Option<f32> {
    v.is_finite().then_some(v)
}

/// Render the routine status line.  Missing values show as `--`.
pub fn format_status(
    time: Option<&CanonicalTime>,
    climate: ClimateReading,
    heart_rate: f32,
) -> String<STATUS_LEN> {
    let mut line = String::new();
    let _ = match time {
        Some(t) => write!(line, "{}", t),
        None => write!(line, "--"),
    };
    let _ = match finite(climate.temperature_c) {
        Some(t) => write!(line, " | {:.1}C", t),
        None => write!(line, " | --C"),
    };
    let _ = match finite(climate.humidity_pct) {
        Some(h) => write!(line, " {:.0}%", h),
        None => write!(line, " --%"),
    };
    let _ = if heart_rate.is_finite() && heart_rate > 0.0 {
        write!(line, " | HR {:.0}", heart_rate)
    } else {
        write!(line, " | HR --")
    };
    line
}
