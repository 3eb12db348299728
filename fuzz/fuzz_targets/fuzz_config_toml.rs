#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Unknown keys become warnings; nothing here may panic
        let _ = canopy::Config::parse_with_warnings(content, Path::new("fuzz.toml"));
    }
});
