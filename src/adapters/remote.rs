//! Combines the cloud channel and the data store behind the single
//! [`Remote`](crate::app::ports::Remote) bound the service expects.

use crate::app::events::TelemetryRecord;
use crate::app::ports::{CloudPort, DataStorePort, NotifierPort, RemoteError};
use crate::config::DeviceId;
use crate::error::AlarmField;

pub struct RemoteAdapter<C, S> {
    pub cloud: C,
    pub store: S,
}

impl<C, S> RemoteAdapter<C, S> {
    pub fn new(cloud: C, store: S) -> Self {
        Self { cloud, store }
    }
}

impl<C: CloudPort, S> CloudPort for RemoteAdapter<C, S> {
    fn send_power_state(&mut self, device: &DeviceId, on: bool) -> Result<(), RemoteError> {
        self.cloud.send_power_state(device, on)
    }
}

impl<C: NotifierPort, S> NotifierPort for RemoteAdapter<C, S> {
    fn announce(&mut self, message: &str) -> Result<(), RemoteError> {
        self.cloud.announce(message)
    }
}

impl<C, S: DataStorePort> DataStorePort for RemoteAdapter<C, S> {
    fn alarm_count(&mut self) -> Result<u32, RemoteError> {
        self.store.alarm_count()
    }

    fn alarm_field(&mut self, index: u32, field: AlarmField) -> Result<String, RemoteError> {
        self.store.alarm_field(index, field)
    }

    fn delete_alarm(&mut self, index: u32) -> Result<(), RemoteError> {
        self.store.delete_alarm(index)
    }

    fn set_telemetry(&mut self, record: &TelemetryRecord) -> Result<(), RemoteError> {
        self.store.set_telemetry(record)
    }

    fn set_emergency(&mut self, active: bool, reason: &str) -> Result<(), RemoteError> {
        self.store.set_emergency(active, reason)
    }
}
