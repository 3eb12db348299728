#![no_main]

use libfuzzer_sys::fuzz_target;

use canopy::infrastructure::engine::{geojson, validity};

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok(vector) = geojson::parse(content) {
            for feature in vector.features {
                if let Some(geometry) = feature.geometry {
                    let repaired = validity::repair(geometry);
                    let _ = validity::area(&repaired);
                }
            }
        }
    }
});
