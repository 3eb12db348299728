//! Domain Layer
//!
//! The core of Canopy: the primitive lifecycle without I/O dependencies.
//!
//! ## Structure
//!
//! - `value_objects/` - Immutable value types (Level, Crs, BoundingBox)
//! - `entities/` - Per-invocation state (WarningsLedger, InvocationArgs, artifacts)
//! - `ports/` - The geospatial engine boundary
//! - `services/` - Reconciler, overlap validator, metadata extractor
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the file system directly
//! 2. **No ambient state** - The ledger is passed explicitly through every stage
//! 3. **Ports & Adapters** - Reading, writing and geometry work go through [`ports::GeoEngine`]

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
