//! Domain Entities
//!
//! State created at the start of one primitive invocation and consumed by
//! its end. Nothing here outlives the process.

pub mod artifact;
pub mod invocation;
pub mod ledger;

pub use artifact::{
    Artifact, Band, Coord, Feature, Geometry, RasterData, RasterDataType, SpatialData,
    TabularData, VectorData,
};
pub use invocation::InvocationArgs;
pub use ledger::{Warning, WarningsLedger};
