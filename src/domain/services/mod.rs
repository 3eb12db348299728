//! Domain Services
//!
//! Stateless reconciliation, validation and summarizing logic. Anything that
//! needs real geometry work goes through the [`GeoEngine`](crate::domain::ports::GeoEngine) port.

pub mod metadata;
pub mod overlap;
pub mod reconciler;

pub use metadata::{
    extract_raster_metadata, extract_tabular_metadata, extract_vector_metadata, GeometryTypes,
    RasterMetadata, RasterOptions, TabularMetadata, TabularOptions, VectorMetadata,
};
pub use overlap::{check_overlap, measure_overlap, validate_spatial_overlap, OverlapCheck, OverlapReport};
pub use reconciler::{validate_crs_match, validate_geometry, CrsTarget};
