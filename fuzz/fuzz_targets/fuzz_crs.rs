#![no_main]

use libfuzzer_sys::fuzz_target;

use canopy::Crs;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let once = Crs::new(content);
        assert_eq!(once, Crs::new(once.as_str()));
    }
});
