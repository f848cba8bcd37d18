//! Fuzz target: persisted config blob decoding
//!
//! Writes arbitrary bytes under the config key and loads them back.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - A blob without the current schema id always yields the defaults
//! - Whatever `load` returns survives a `save` / `load` cycle unchanged
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use libfuzzer_sys::fuzz_target;
use motion_detector::adapters::nvs::{CONFIG_KEY, CONFIG_NAMESPACE, NvsAdapter};
use motion_detector::app::ports::{ConfigPort, StoragePort};
use motion_detector::config::{CONFIG_SCHEMA_ID, NodeConfig};

fuzz_target!(|data: &[u8]| {
    let Ok(mut nvs) = NvsAdapter::new() else {
        return;
    };
    if nvs.write(CONFIG_NAMESPACE, CONFIG_KEY, data).is_err() {
        return;
    }

    let defaults = NodeConfig::default();
    let loaded = nvs.load(CONFIG_SCHEMA_ID, &defaults);

    let has_header = data.len() >= 2 && u16::from_le_bytes([data[0], data[1]]) == CONFIG_SCHEMA_ID;
    if !has_header {
        assert_eq!(loaded, defaults, "foreign blob must fall back to defaults");
    }

    // NaN deltas never compare equal; nothing else to check for them.
    if loaded.temperature.publish_delta_c.is_nan() {
        return;
    }
    nvs.save(&loaded).expect("save of a loaded record");
    assert_eq!(nvs.load(CONFIG_SCHEMA_ID, &defaults), loaded);
});
