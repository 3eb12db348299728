#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Inline JSON that is not an object must be an ArgumentParseError, never a panic
        if let Ok(args) = canopy::application::resolve(content, "out.geojson", "{}") {
            let _ = canopy::application::get_input(args.inputs(), "features", false);
        }
    }
});
