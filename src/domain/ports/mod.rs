//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod geo_engine;

pub use geo_engine::{EngineError, EngineResult, GeoEngine};

#[cfg(test)]
pub mod mock_engine;
