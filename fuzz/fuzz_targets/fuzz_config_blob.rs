//! Fuzz target: stored config blob decoding
//!
//! Writes arbitrary bytes into the simulated NVS backend and loads them.
//! Invariants checked:
//! - No panics under any byte sequence
//! - Any config that loads successfully also passes `validate()`
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use libfuzzer_sys::fuzz_target;
use thermostat::adapters::nvs::NvsConfigStore;
use thermostat::app::ports::ConfigPort;

fuzz_target!(|data: &[u8]| {
    let Ok(nvs) = NvsConfigStore::new() else {
        return;
    };
    nvs.store_raw(data);
    if let Ok(cfg) = nvs.load() {
        assert!(cfg.validate().is_ok());
    }
});
