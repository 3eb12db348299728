//! Infrastructure Layer
//!
//! Concrete implementations of domain ports. All file I/O lives here.
//!
//! - `engine/` - `LocalGeoEngine`, the reference GeoEngine over local files

pub mod engine;

pub use engine::LocalGeoEngine;
