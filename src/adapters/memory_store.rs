//! In-memory data store.
//!
//! Holds the same JSON document the hosted database keeps for a patient:
//!
//! ```json
//! {
//!   "alarmCount": 2,
//!   "alarms":   { "0": { "title": "Meds", "time": "Mon Jan  1 09:00:00 2024" } },
//!   "patient":  { "telemetry": { ... }, "emergency": true, "reason": "heartbeat high" }
//! }
//! ```
//!
//! `alarmCount` counts index slots ever allocated; deleting an alarm
//! removes its record but never renumbers the others.  Used on the host
//! and as the on-device placeholder until a database client is wired in.

use serde_json::{Map, Value, json};

use crate::app::events::TelemetryRecord;
use crate::app::ports::{DataStorePort, RemoteError};
use crate::error::AlarmField;

pub struct MemoryDataStore {
    doc: Value,
    online: bool,
    field_reads: usize,
}

impl Default for MemoryDataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self {
            doc: json!({ "alarmCount": 0, "alarms": {}, "patient": {} }),
            online: true,
            field_reads: 0,
        }
    }

    /// Append an alarm in the next index slot and return its index.
    pub fn push_alarm(&mut self, title: &str, time: &str) -> u32 {
        let index = self.count();
        self.doc["alarms"][index.to_string()] = json!({ "title": title, "time": time });
        self.doc["alarmCount"] = json!(index + 1);
        index
    }

    /// Overwrite one raw field, e.g. to plant a malformed record.
    pub fn set_alarm_field(&mut self, index: u32, field: AlarmField, value: Value) {
        self.doc["alarms"][index.to_string()][field.key()] = value;
    }

    pub fn has_alarm(&self, index: u32) -> bool {
        self.alarms().is_some_and(|a| a.contains_key(&index.to_string()))
    }

    /// Simulate loss of connectivity: every call fails with `Unreachable`.
    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    /// Number of `alarm_field` calls served so far.
    pub fn field_reads(&self) -> usize {
        self.field_reads
    }

    pub fn telemetry(&self) -> Option<&Value> {
        self.doc["patient"].get("telemetry")
    }

    /// `(flag, reason)` as last written.
    pub fn emergency(&self) -> Option<(bool, &str)> {
        let patient = &self.doc["patient"];
        Some((
            patient.get("emergency")?.as_bool()?,
            patient.get("reason")?.as_str()?,
        ))
    }

    fn count(&self) -> u32 {
        self.doc["alarmCount"].as_u64().unwrap_or(0) as u32
    }

    fn alarms(&self) -> Option<&Map<String, Value>> {
        self.doc["alarms"].as_object()
    }

    fn check_online(&self) -> Result<(), RemoteError> {
        if self.online {
            Ok(())
        } else {
            Err(RemoteError::Unreachable)
        }
    }
}

impl DataStorePort for MemoryDataStore {
    fn alarm_count(&mut self) -> Result<u32, RemoteError> {
        self.check_online()?;
        Ok(self.count())
    }

    fn alarm_field(&mut self, index: u32, field: AlarmField) -> Result<String, RemoteError> {
        self.check_online()?;
        self.field_reads += 1;
        let value = self
            .alarms()
            .and_then(|a| a.get(&index.to_string()))
            .and_then(|rec| rec.get(field.key()))
            .ok_or(RemoteError::NotFound)?;
        value
            .as_str()
            .map(str::to_owned)
            .ok_or(RemoteError::ReadError)
    }

    fn delete_alarm(&mut self, index: u32) -> Result<(), RemoteError> {
        self.check_online()?;
        self.doc["alarms"]
            .as_object_mut()
            .and_then(|a| a.remove(&index.to_string()))
            .map(|_| ())
            .ok_or(RemoteError::NotFound)
    }

    fn set_telemetry(&mut self, record: &TelemetryRecord) -> Result<(), RemoteError> {
        self.check_online()?;
        let value = serde_json::to_value(record).map_err(|_| RemoteError::Rejected)?;
        self.doc["patient"]["telemetry"] = value;
        Ok(())
    }

    fn set_emergency(&mut self, active: bool, reason: &str) -> Result<(), RemoteError> {
        self.check_online()?;
        self.doc["patient"]["emergency"] = json!(active);
        self.doc["patient"]["reason"] = json!(reason);
        Ok(())
    }
}
