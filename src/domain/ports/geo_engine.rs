//! GeoEngine port - the geospatial capability boundary
//!
//! Reading, writing, reprojection, validity checks, repair and extents are
//! delegated to an engine the core treats as opaque. The domain only decides
//! *when* to call these and how to report the outcome.

use std::path::{Path, PathBuf};

use crate::domain::entities::{RasterData, SpatialData, TabularData, VectorData};
use crate::domain::value_objects::{BoundingBox, Crs};

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine operation errors
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Reading an artifact failed (missing, unreadable, malformed)
    Read { path: PathBuf, message: String },
    /// Writing an artifact failed
    Write { path: PathBuf, message: String },
    /// No transformation between the two CRS is available
    UnsupportedCrs { from: String, to: String },
    /// The object has no positions to take an extent of
    EmptyExtent,
    /// Other engine failure
    Other(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Read { path, message } => {
                write!(f, "failed to read {}: {}", path.display(), message)
            }
            EngineError::Write { path, message } => {
                write!(f, "failed to write {}: {}", path.display(), message)
            }
            EngineError::UnsupportedCrs { from, to } => {
                write!(f, "no transformation from '{}' to '{}'", from, to)
            }
            EngineError::EmptyExtent => write!(f, "object has no extent (no geometries)"),
            EngineError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

/// Abstract geospatial engine
///
/// Implementations:
/// - `LocalGeoEngine` - GeoJSON, ASCII grid and JSON records on local disk
/// - test mocks counting calls
pub trait GeoEngine {
    fn read_vector(&self, path: &Path) -> EngineResult<VectorData>;

    fn read_raster(&self, path: &Path) -> EngineResult<RasterData>;

    fn read_table(&self, path: &Path) -> EngineResult<TabularData>;

    fn write_vector(&self, data: &VectorData, path: &Path) -> EngineResult<()>;

    fn write_raster(&self, data: &RasterData, path: &Path) -> EngineResult<()>;

    fn write_table(&self, data: &TabularData, path: &Path) -> EngineResult<()>;

    /// Transform `data` into `target`. The returned object carries `target` as its CRS.
    fn reproject(&self, data: SpatialData, target: &Crs) -> EngineResult<SpatialData>;

    /// Best-effort repair; may leave some geometries invalid
    fn repair_geometry(&self, data: VectorData) -> EngineResult<VectorData>;

    /// One flag per feature, `true` when valid
    fn geometry_validity(&self, data: &VectorData) -> Vec<bool>;

    fn bounding_box(&self, data: &SpatialData) -> EngineResult<BoundingBox>;

    /// Planar area of all polygonal geometries, in CRS units
    fn total_area(&self, data: &VectorData) -> f64;

    /// Read whichever spatial kind `path` holds
    fn read_spatial(&self, path: &Path) -> EngineResult<SpatialData> {
        match self.read_vector(path) {
            Ok(v) => Ok(SpatialData::Vector(v)),
            Err(vector_err) => self
                .read_raster(path)
                .map(SpatialData::Raster)
                .map_err(|_| vector_err),
        }
    }
}
