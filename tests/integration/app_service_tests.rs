//! Integration tests for the AppService → relays / cloud pipeline.
//!
//! These run on the host (x86_64) and drive full polling cycles against
//! the mock board, cloud and data store.

use carelink::app::commands::AppCommand;
use carelink::app::events::AppEvent;
use carelink::app::ports::ClimateReading;

use crate::mock_hw::{LAMP_RELAY, LAMP_SWITCH, NURSE_RELAY, NURSE_SWITCH, Rig};

// ── Start-up ──────────────────────────────────────────────────

#[test]
fn start_drives_every_relay_off() {
    let rig = Rig::new();
    // Active-low nurse-call relay is off when high; the lamp when low.
    assert!(rig.hw.level(NURSE_RELAY));
    assert!(!rig.hw.level(LAMP_RELAY));
    assert!(matches!(rig.sink.events[0], AppEvent::Started { devices: 2 }));
}

// ── Local triggers ────────────────────────────────────────────

#[test]
fn switch_toggles_relay_and_reports_to_cloud() {
    let mut rig = Rig::new();
    rig.set_switch(LAMP_SWITCH, true);
    rig.tick_at(1_000);

    assert!(rig.hw.level(LAMP_RELAY));
    assert_eq!(rig.remote.cloud.power_states, vec![("lamp".to_string(), true)]);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::RelayToggled { on: true, .. })),
        1
    );
}

#[test]
fn bounce_inside_refractory_window_is_ignored() {
    let mut rig = Rig::new();
    rig.set_switch(LAMP_SWITCH, true);
    rig.tick_at(1_000);
    rig.set_switch(LAMP_SWITCH, false);
    rig.tick_at(1_100);
    rig.set_switch(LAMP_SWITCH, true);
    rig.tick_at(1_200);

    assert!(rig.hw.level(LAMP_RELAY));
    assert_eq!(rig.remote.cloud.power_states.len(), 1);
}

#[test]
fn toggle_switch_acts_on_both_edges() {
    let mut rig = Rig::new();
    rig.set_switch(LAMP_SWITCH, true);
    rig.tick_at(1_000);
    rig.set_switch(LAMP_SWITCH, false);
    rig.tick_at(1_300);

    assert!(!rig.hw.level(LAMP_RELAY));
    assert_eq!(
        rig.remote.cloud.power_states,
        vec![("lamp".to_string(), true), ("lamp".to_string(), false)]
    );
}

#[test]
fn momentary_release_does_not_toggle() {
    let mut rig = Rig::new();
    rig.set_switch(NURSE_SWITCH, true);
    rig.tick_at(1_000);
    assert!(!rig.hw.level(NURSE_RELAY), "active-low relay driven low = on");

    rig.set_switch(NURSE_SWITCH, false);
    rig.tick_at(1_500);
    assert!(!rig.hw.level(NURSE_RELAY));
    assert_eq!(rig.remote.cloud.power_states.len(), 1);

    rig.set_switch(NURSE_SWITCH, true);
    rig.tick_at(2_000);
    assert!(rig.hw.level(NURSE_RELAY));
    assert_eq!(
        rig.remote.cloud.power_states.last(),
        Some(&("nurse-call".to_string(), false))
    );
}

#[test]
fn local_trigger_follows_physical_output_after_remote_command() {
    let mut rig = Rig::new();
    rig.power("lamp", true, 500);
    rig.set_switch(LAMP_SWITCH, true);
    rig.tick_at(1_000);

    // Remote turned it on; the switch flips what is physically there.
    assert!(!rig.hw.level(LAMP_RELAY));
    assert_eq!(rig.remote.cloud.power_states, vec![("lamp".to_string(), false)]);
}

#[test]
fn unreachable_cloud_does_not_block_relay() {
    let mut rig = Rig::new();
    rig.remote.cloud.offline = true;
    rig.set_switch(LAMP_SWITCH, true);
    rig.tick_at(1_000);
    assert!(rig.hw.level(LAMP_RELAY));
}

// ── Remote commands ───────────────────────────────────────────

#[test]
fn remote_command_drives_relay_without_echo() {
    let mut rig = Rig::new();
    rig.power("lamp", true, 1_000);

    assert!(rig.hw.level(LAMP_RELAY));
    assert!(rig.remote.cloud.power_states.is_empty());
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::RelayCommanded { on: true, .. })),
        1
    );
}

#[test]
fn remote_command_respects_polarity() {
    let mut rig = Rig::new();
    rig.power("nurse-call", false, 1_000);
    assert!(rig.hw.level(NURSE_RELAY));
    assert!(!rig.app.emergency_active(1_000));
}

#[test]
fn unknown_device_is_dropped() {
    let mut rig = Rig::new();
    let writes = rig.hw.relay_writes.len();
    let events = rig.sink.events.len();
    rig.power("ghost", true, 1_000);

    assert_eq!(rig.hw.relay_writes.len(), writes);
    assert_eq!(rig.sink.events.len(), events);
}

// ── Status screen & telemetry ─────────────────────────────────

#[test]
fn status_screen_refreshes_at_configured_rate() {
    let mut rig = Rig::new();
    for ms in (0..=2_000).step_by(100) {
        rig.tick_at(ms);
    }
    // t = 0, 1000, 2000
    assert_eq!(rig.hw.status_frames(), 3);
}

#[test]
fn telemetry_is_published_every_interval() {
    let mut rig = Rig::new();
    rig.tick_at(0);
    assert!(rig.remote.store.telemetry().is_none());

    rig.tick_at(5_000);
    let t = rig.remote.store.telemetry().unwrap();
    assert_eq!(t["heart_rate_bpm"], serde_json::json!(72.0));
    assert_eq!(t["uptime_secs"], serde_json::json!(5));
    assert_eq!(t["emergency"], serde_json::json!(false));
    assert!(t["emergency_reason"].is_null());

    rig.tick_at(7_000);
    rig.tick_at(10_000);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 2);
}

#[test]
fn missing_sensor_values_become_null_in_telemetry() {
    let mut rig = Rig::new();
    rig.hw.heart_rate = 0.0;
    rig.hw.climate = ClimateReading::UNAVAILABLE;
    rig.tick_at(5_000);

    let rec = rig.app.build_telemetry(5_000);
    assert_eq!(rec.heart_rate_bpm, None);
    assert_eq!(rec.temperature_c, None);
    assert!(rig.remote.store.telemetry().unwrap()["humidity_pct"].is_null());
}

#[test]
fn cycle_count_advances_per_tick() {
    let mut rig = Rig::new();
    rig.tick_at(100);
    rig.tick_at(200);
    rig.command(AppCommand::DismissAlarm(3), 250);
    assert_eq!(rig.app.cycle_count(), 2);
}
