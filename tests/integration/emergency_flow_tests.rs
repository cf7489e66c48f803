//! Emergency window: manual calls, heart-rate triggers, expiry and the
//! remote flag.

use carelink::app::events::AppEvent;
use carelink::app::service::EMERGENCY_ANNOUNCEMENT;
use carelink::emergency::{EmergencyReason, EmergencyState};

use crate::mock_hw::{NURSE_RELAY, NURSE_SWITCH, Rig};

fn raised(rig: &Rig) -> usize {
    rig.sink
        .count(|e| matches!(e, AppEvent::EmergencyRaised { .. }))
}

fn cleared(rig: &Rig) -> usize {
    rig.sink.count(|e| matches!(e, AppEvent::EmergencyCleared))
}

// ── Manual call ───────────────────────────────────────────────

#[test]
fn remote_nurse_call_raises_emergency() {
    let mut rig = Rig::new();
    rig.power("nurse-call", true, 1_000);

    assert!(rig.app.emergency_active(1_000));
    assert_eq!(rig.remote.store.emergency(), Some((true, "manual call")));
    assert_eq!(
        rig.remote.cloud.announcements,
        vec![EMERGENCY_ANNOUNCEMENT.to_string()]
    );
    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::EmergencyRaised {
            reason: EmergencyReason::ManualCall,
            rearmed: false
        }
    )));
}

#[test]
fn local_nurse_press_raises_emergency() {
    let mut rig = Rig::new();
    rig.set_switch(NURSE_SWITCH, true);
    rig.tick_at(1_000);

    assert!(!rig.hw.level(NURSE_RELAY));
    assert!(matches!(
        rig.app.emergency_state(),
        EmergencyState::Active {
            reason: EmergencyReason::ManualCall,
            raised_at: 1_000
        }
    ));
    assert_eq!(rig.remote.store.emergency(), Some((true, "manual call")));
}

#[test]
fn nurse_call_off_is_not_an_emergency() {
    let mut rig = Rig::new();
    rig.power("nurse-call", false, 1_000);
    assert_eq!(rig.app.emergency_state(), EmergencyState::Idle);
    assert_eq!(rig.remote.store.emergency(), None);
}

// ── Expiry ────────────────────────────────────────────────────

#[test]
fn emergency_clears_after_twenty_seconds() {
    let mut rig = Rig::new();
    rig.power("nurse-call", true, 1_000);

    rig.tick_at(20_999);
    assert!(rig.app.emergency_active(20_999));
    assert_eq!(cleared(&rig), 0);

    rig.tick_at(21_000);
    assert_eq!(rig.app.emergency_state(), EmergencyState::Idle);
    assert_eq!(rig.remote.store.emergency(), Some((false, "")));
    assert_eq!(cleared(&rig), 1);

    // The relay is left as it was.
    assert!(!rig.hw.level(NURSE_RELAY));

    rig.tick_at(30_000);
    assert_eq!(cleared(&rig), 1);
}

#[test]
fn repeated_call_extends_the_window() {
    let mut rig = Rig::new();
    rig.power("nurse-call", true, 1_000);
    rig.power("nurse-call", false, 5_000);
    rig.power("nurse-call", true, 15_000);

    rig.tick_at(21_000);
    assert!(rig.app.emergency_active(21_000));

    rig.tick_at(35_000);
    assert_eq!(cleared(&rig), 1);
    // Same reason on re-arm: one raised event, one announcement.
    assert_eq!(raised(&rig), 1);
    assert_eq!(rig.remote.cloud.announcements.len(), 1);
}

// ── Heart rate ────────────────────────────────────────────────

#[test]
fn high_heart_rate_calls_the_nurse() {
    let mut rig = Rig::new();
    rig.hw.heart_rate = 115.0;
    rig.tick_at(1_000);

    assert_eq!(rig.remote.store.emergency(), Some((true, "heartbeat high")));
    assert!(!rig.hw.level(NURSE_RELAY), "active-low relay driven on");
    assert_eq!(
        rig.remote.cloud.power_states,
        vec![("nurse-call".to_string(), true)]
    );
    assert_eq!(
        rig.remote.cloud.announcements,
        vec![EMERGENCY_ANNOUNCEMENT.to_string()]
    );
    // Logged as an escalation, not as a cloud command.
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::NurseCalled { device } if device.as_str() == "nurse-call")),
        1
    );
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::RelayCommanded { .. })),
        0
    );
}

#[test]
fn heart_rate_leaves_a_nurse_call_already_on_alone() {
    let mut rig = Rig::new();
    rig.power("nurse-call", true, 1_000);
    rig.tick_at(25_000);
    assert_eq!(rig.app.emergency_state(), EmergencyState::Idle);

    rig.hw.heart_rate = 115.0;
    rig.tick_at(26_000);
    assert!(rig.app.emergency_active(26_000));
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::NurseCalled { .. })),
        0
    );
}

#[test]
fn telemetry_carries_the_emergency_reason() {
    let mut rig = Rig::new();
    rig.hw.heart_rate = 115.0;
    rig.tick_at(5_000);
    let t = rig.remote.store.telemetry().unwrap();
    assert_eq!(t["emergency"], serde_json::json!(true));
    assert_eq!(t["emergency_reason"], serde_json::json!("heartbeat high"));

    rig.hw.heart_rate = 70.0;
    rig.tick_at(25_000);
    let t = rig.remote.store.telemetry().unwrap();
    assert_eq!(t["emergency"], serde_json::json!(false));
    assert!(t["emergency_reason"].is_null());
}

#[test]
fn normal_reading_does_not_clear_early() {
    let mut rig = Rig::new();
    rig.hw.heart_rate = 115.0;
    rig.tick_at(1_000);
    rig.hw.heart_rate = 70.0;

    rig.tick_at(10_000);
    assert!(rig.app.emergency_active(10_000));
    rig.tick_at(21_000);
    assert_eq!(rig.app.emergency_state(), EmergencyState::Idle);
}

#[test]
fn sustained_high_heart_rate_keeps_rearming() {
    let mut rig = Rig::new();
    rig.hw.heart_rate = 130.0;
    for ms in (1_000..=40_000).step_by(1_000) {
        rig.tick_at(ms);
    }
    assert!(rig.app.emergency_active(40_000));
    assert_eq!(cleared(&rig), 0);
    assert_eq!(raised(&rig), 1);
    assert_eq!(rig.remote.cloud.power_states.len(), 1);
}

#[test]
fn threshold_reading_is_not_an_emergency() {
    let mut rig = Rig::new();
    rig.hw.heart_rate = 110.0;
    rig.tick_at(1_000);
    assert_eq!(rig.app.emergency_state(), EmergencyState::Idle);
}

#[test]
fn reason_change_rewrites_the_flag() {
    let mut rig = Rig::new();
    rig.power("nurse-call", true, 1_000);
    rig.hw.heart_rate = 120.0;
    rig.tick_at(5_000);

    assert_eq!(rig.remote.store.emergency(), Some((true, "heartbeat high")));
    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::EmergencyRaised {
            reason: EmergencyReason::HeartRateHigh,
            rearmed: true
        }
    )));
    // Relay already on; nothing more reported.
    assert!(rig.remote.cloud.power_states.is_empty());
}

// ── Remote flag ───────────────────────────────────────────────

#[test]
fn failed_flag_write_is_retried_next_cycle() {
    let mut rig = Rig::new();
    rig.remote.store.set_online(false);
    rig.power("nurse-call", true, 1_000);
    assert_eq!(rig.remote.store.emergency(), None);

    rig.tick_at(1_100);
    assert_eq!(rig.remote.store.emergency(), None);

    rig.remote.store.set_online(true);
    rig.tick_at(1_200);
    assert_eq!(rig.remote.store.emergency(), Some((true, "manual call")));
}

#[test]
fn pending_clear_is_flushed_after_reconnect() {
    let mut rig = Rig::new();
    rig.power("nurse-call", true, 1_000);
    rig.remote.store.set_online(false);
    rig.tick_at(21_000);
    assert_eq!(rig.remote.store.emergency(), Some((true, "manual call")));

    rig.remote.store.set_online(true);
    rig.tick_at(21_100);
    assert_eq!(rig.remote.store.emergency(), Some((false, "")));
}
