//! Canopy - execution contract for spatial-data primitives
//!
//! Each primitive is one process: it resolves `<inputs> <output> <params>`,
//! threads a warnings ledger through reconciliation and validation, and ends
//! with exactly one JSON envelope on stdout.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;

// Re-exports for convenience
pub use application::{
    execute, primitive_failure, primitive_success, Envelope, Primitive, PrimitiveContext,
    PrimitiveRunner,
};
pub use config::Config;
pub use domain::entities::{InvocationArgs, Warning, WarningsLedger};
pub use domain::ports::GeoEngine;
pub use domain::value_objects::{BoundingBox, Crs, Level};
pub use error::{CanopyError, CanopyResult};
pub use infrastructure::LocalGeoEngine;
