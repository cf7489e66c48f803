//! Fuzz target: persisted configuration blob
//!
//! Decodes arbitrary bytes as the NVS config blob.  Whatever decodes must
//! survive validation without panicking, and a config that validates must
//! be usable to build the application service.
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use carelink::app::service::AppService;
use carelink::config::SystemConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(cfg) = postcard::from_bytes::<SystemConfig>(data) else {
        return;
    };
    if cfg.validate().is_ok() {
        let app = AppService::new(cfg);
        assert!(app.relays().devices().len() <= carelink::config::MAX_DEVICES);
    }
});
