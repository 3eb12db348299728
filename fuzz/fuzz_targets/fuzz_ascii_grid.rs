#![no_main]

use libfuzzer_sys::fuzz_target;

use canopy::infrastructure::engine::ascii_grid;
use canopy::Crs;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok(raster) = ascii_grid::parse(content, Crs::new("EPSG:4326")) {
            let _ = ascii_grid::render(&raster);
        }
    }
});
