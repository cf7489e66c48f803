//! Alarm reconciliation against the in-memory data store: refresh,
//! firing, display lease and dismissal.

use carelink::app::commands::AppCommand;
use carelink::app::events::AppEvent;
use carelink::error::AlarmField;
use serde_json::json;

use crate::mock_hw::Rig;

const NINE: &str = "Mon Jan  1 09:00:00 2024";
const TEN: &str = "Mon Jan  1 10:00:00 2024";

#[test]
fn due_alarm_fires_once_and_is_deleted_remotely() {
    let mut rig = Rig::new();
    rig.remote.store.push_alarm("Meds", NINE);
    rig.clock.set_wall(NINE);
    rig.tick_at(1_000);

    assert_eq!(rig.hw.alarm_frames(), vec!["Meds"]);
    assert_eq!(rig.remote.cloud.announcements, vec!["Reminder: Meds".to_string()]);
    assert!(!rig.remote.store.has_alarm(0));
    assert!(rig.app.alarms().is_consumed(0));
    assert!(rig.app.alarms().active().is_empty());
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::AlarmFired { index: 0, .. })),
        1
    );

    // Same minute, next cycles: nothing more.
    rig.tick_at(1_100);
    rig.tick_at(1_200);
    assert_eq!(rig.remote.cloud.announcements.len(), 1);
}

#[test]
fn future_alarm_waits_for_its_minute() {
    let mut rig = Rig::new();
    rig.remote.store.push_alarm("Water", TEN);
    rig.clock.set_wall(NINE);
    rig.tick_at(1_000);
    assert_eq!(rig.app.alarms().active().len(), 1);
    assert!(rig.hw.alarm_frames().is_empty());

    rig.clock.set_wall(TEN);
    rig.tick_at(2_000);
    assert_eq!(rig.hw.alarm_frames(), vec!["Water"]);
}

#[test]
fn unchanged_count_makes_no_field_reads() {
    let mut rig = Rig::new();
    rig.remote.store.push_alarm("Water", TEN);
    rig.clock.set_wall(NINE);
    rig.tick_at(1_000);
    let reads = rig.remote.store.field_reads();
    assert_eq!(reads, 2);

    for ms in (1_100..2_000).step_by(100) {
        rig.tick_at(ms);
    }
    assert_eq!(rig.remote.store.field_reads(), reads);
}

#[test]
fn fired_alarm_is_not_refired_when_remote_delete_was_lost() {
    let mut rig = Rig::new();
    rig.remote.store.push_alarm("Meds", NINE);
    rig.clock.set_wall(NINE);
    rig.tick_at(1_000);

    // The record reappears (the delete never reached the store) and a new
    // alarm bumps the count so the collection is re-scanned.
    rig.remote
        .store
        .set_alarm_field(0, AlarmField::Title, json!("Meds"));
    rig.remote
        .store
        .set_alarm_field(0, AlarmField::Time, json!(NINE));
    rig.remote.store.push_alarm("Walk", TEN);
    rig.tick_at(1_100);

    assert_eq!(rig.remote.cloud.announcements.len(), 1);
    let active: Vec<u32> = rig.app.alarms().active().iter().map(|a| a.index).collect();
    assert_eq!(active, vec![1]);
}

#[test]
fn malformed_alarm_is_skipped_and_retried_later() {
    let mut rig = Rig::new();
    rig.remote.store.push_alarm("Meds", NINE);
    rig.remote
        .store
        .set_alarm_field(0, AlarmField::Time, json!(900));
    rig.remote.store.push_alarm("Water", NINE);
    rig.clock.set_wall(NINE);
    rig.tick_at(1_000);

    assert_eq!(rig.hw.alarm_frames(), vec!["Water"]);
    assert!(!rig.app.alarms().is_consumed(0));
    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::AlarmsRefreshed {
            remote_count: 2,
            fetched: 1,
            failed: 1
        }
    )));

    // Fixed remotely; picked up on the next count change.
    rig.remote
        .store
        .set_alarm_field(0, AlarmField::Time, json!(TEN));
    rig.remote.store.push_alarm("Walk", TEN);
    rig.tick_at(2_000);
    assert_eq!(rig.app.alarms().active().len(), 2);
}

#[test]
fn unsynchronised_clock_defers_firing_but_not_refresh() {
    let mut rig = Rig::new();
    rig.remote.store.push_alarm("Meds", NINE);
    rig.clock.unsync();
    rig.tick_at(1_000);

    assert_eq!(rig.app.alarms().active().len(), 1);
    assert!(rig.hw.alarm_frames().is_empty());

    rig.clock.set_wall(NINE);
    rig.tick_at(1_100);
    assert_eq!(rig.hw.alarm_frames(), vec!["Meds"]);
}

#[test]
fn unreachable_store_skips_the_step() {
    let mut rig = Rig::new();
    rig.remote.store.push_alarm("Meds", NINE);
    rig.remote.store.set_online(false);
    rig.clock.set_wall(NINE);
    rig.tick_at(1_000);
    assert_eq!(rig.app.alarms().last_known_count(), 0);

    rig.remote.store.set_online(true);
    rig.tick_at(1_100);
    assert_eq!(rig.hw.alarm_frames(), vec!["Meds"]);
}

#[test]
fn alarm_notice_holds_the_screen_for_ten_seconds() {
    let mut rig = Rig::new();
    rig.tick_at(0);
    rig.remote.store.push_alarm("Meds", NINE);
    rig.clock.set_wall(NINE);
    rig.tick_at(1_000);
    let status_before = rig.hw.status_frames();
    assert!(!rig.app.is_display_available(1_000));

    for ms in (2_000..11_000).step_by(1_000) {
        rig.tick_at(ms);
    }
    assert_eq!(rig.hw.status_frames(), status_before);

    rig.tick_at(11_000);
    assert!(rig.app.is_display_available(11_000));
    assert_eq!(rig.hw.status_frames(), status_before + 1);
}

#[test]
fn second_alarm_in_same_window_is_announced_but_not_drawn() {
    let mut rig = Rig::new();
    rig.remote.store.push_alarm("Meds", NINE);
    rig.remote.store.push_alarm("Water", NINE);
    rig.clock.set_wall(NINE);
    rig.tick_at(1_000);

    assert_eq!(rig.hw.alarm_frames(), vec!["Meds"]);
    assert_eq!(
        rig.remote.cloud.announcements,
        vec!["Reminder: Meds".to_string(), "Reminder: Water".to_string()]
    );
    assert!(rig.app.alarms().is_consumed(1));
}

#[test]
fn dismissed_alarm_never_fires() {
    let mut rig = Rig::new();
    rig.remote.store.push_alarm("Meds", NINE);
    rig.tick_at(1_000);
    assert_eq!(rig.app.alarms().active().len(), 1);

    rig.command(AppCommand::DismissAlarm(0), 1_050);
    assert!(rig.app.alarms().active().is_empty());
    assert!(!rig.remote.store.has_alarm(0));

    rig.clock.set_wall(NINE);
    rig.tick_at(1_100);
    assert!(rig.hw.alarm_frames().is_empty());
    assert!(rig.remote.cloud.announcements.is_empty());
}

#[test]
fn time_in_another_layout_is_never_scheduled() {
    let mut rig = Rig::new();
    rig.remote.store.push_alarm("Meds", "9am");
    rig.remote.store.push_alarm("Water", "2024-01-01T09:00");
    rig.remote.store.push_alarm("Walk", NINE);
    rig.clock.set_wall(NINE);
    rig.tick_at(1_000);

    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::AlarmsRefreshed {
            remote_count: 3,
            fetched: 1,
            failed: 2
        }
    )));
    assert_eq!(rig.hw.alarm_frames(), vec!["Walk"]);
    assert!(rig.app.alarms().active().is_empty());
    assert!(!rig.app.alarms().is_consumed(0));
}
