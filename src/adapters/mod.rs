//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements            | Connects to                 |
//! |----------------|-----------------------|-----------------------------|
//! | `hardware`     | SwitchPort, RelayPort | ESP32 GPIO (embedded-hal)   |
//! |                | SensorPort            | `SensorHub`                 |
//! |                | DisplayPort           | screen adapter              |
//! | `display`      | DisplayPort           | Serial log output           |
//! | `cloud`        | CloudPort             | embassy-sync channels       |
//! |                | NotifierPort          |                             |
//! | `memory_store` | DataStorePort         | In-memory JSON document     |
//! | `remote`       | Remote                | cloud + data store          |
//! | `log_sink`     | EventSink             | Serial log output           |
//! | `nvs`          | ConfigPort            | NVS / in-memory store       |
//! | `time`         | TimePort              | ESP32 system timer + libc   |

pub mod cloud;
pub mod display;
pub mod hardware;
pub mod log_sink;
pub mod memory_store;
pub mod nvs;
pub mod remote;
pub mod time;
