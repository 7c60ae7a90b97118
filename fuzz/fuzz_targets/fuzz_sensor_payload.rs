//! Fuzz target: `decode_payload` (sensor endpoint response body)
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Every accepted measurement lies inside the plausible sensor range
//!
//! cargo fuzz run fuzz_sensor_payload

#![no_main]

use libfuzzer_sys::fuzz_target;
use thermostat::adapters::http_sensor::decode_payload;

fuzz_target!(|data: &[u8]| {
    if let Ok(m) = decode_payload(data) {
        assert!(m.temperature_c.is_finite());
        assert!((-40.0..=80.0).contains(&m.temperature_c));
        assert!((0.0..=100.0).contains(&m.humidity_pct));
    }
});
