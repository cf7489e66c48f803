//! Fuzz target: alarm reconciliation
//!
//! Interprets the input as a sequence of store mutations, refreshes,
//! firings and dismissals.  An index must never fire twice and no
//! consumed index may sit in the active schedule.
//!
//! cargo fuzz run fuzz_alarm_schedule

#![no_main]

use std::collections::BTreeSet;

use carelink::adapters::memory_store::MemoryDataStore;
use carelink::alarms::AlarmReconciler;
use carelink::app::ports::DataStorePort;
use carelink::clock::CanonicalTime;
use libfuzzer_sys::fuzz_target;

fn minute(m: u8) -> String {
    format!("Mon Jan  1 09:{:02}:00 2024", m % 60)
}

fuzz_target!(|data: &[u8]| {
    let mut store = MemoryDataStore::new();
    let mut alarms = AlarmReconciler::new();
    let mut fired = BTreeSet::new();

    for pair in data.chunks_exact(2) {
        let (op, arg) = (pair[0] % 4, pair[1]);
        match op {
            0 => {
                store.push_alarm("Meds", &minute(arg));
            }
            1 => {
                if let Some(now) = CanonicalTime::parse(&minute(arg)) {
                    for alarm in alarms.fire_due(&now) {
                        assert!(fired.insert(alarm.index), "alarm fired twice");
                        let _ = store.delete_alarm(alarm.index);
                    }
                }
            }
            2 => {
                alarms.dismiss(u32::from(arg % 16));
            }
            _ => store.set_online(arg % 2 == 0),
        }
        if let Ok(count) = store.alarm_count() {
            alarms.refresh_if_stale(count, &mut store);
        }
        assert!(alarms.active().iter().all(|a| !alarms.is_consumed(a.index)));
    }
});
