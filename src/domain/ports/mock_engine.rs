//! In-memory GeoEngine for unit tests
//!
//! Validity is driven by a per-feature property (`"valid": false`); repair
//! fixes every feature not marked `"stubborn": true`. Calls are recorded so
//! tests can assert that an operation did or did not happen.

use std::cell::RefCell;
use std::path::Path;

use serde_json::Value;

use crate::domain::entities::{RasterData, SpatialData, TabularData, VectorData};
use crate::domain::ports::{EngineError, EngineResult, GeoEngine};
use crate::domain::value_objects::{BoundingBox, Crs};

#[derive(Default)]
pub struct MockGeoEngine {
    pub calls: RefCell<Vec<String>>,
    /// Repair returns an error instead of data
    pub repair_fails: bool,
}

impl MockGeoEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn log(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }
}

impl GeoEngine for MockGeoEngine {
    fn read_vector(&self, path: &Path) -> EngineResult<VectorData> {
        Err(EngineError::Read {
            path: path.to_path_buf(),
            message: "mock engine has no disk".into(),
        })
    }

    fn read_raster(&self, path: &Path) -> EngineResult<RasterData> {
        Err(EngineError::Read {
            path: path.to_path_buf(),
            message: "mock engine has no disk".into(),
        })
    }

    fn read_table(&self, path: &Path) -> EngineResult<TabularData> {
        Err(EngineError::Read {
            path: path.to_path_buf(),
            message: "mock engine has no disk".into(),
        })
    }

    fn write_vector(&self, _data: &VectorData, path: &Path) -> EngineResult<()> {
        self.log(format!("write_vector {}", path.display()));
        Ok(())
    }

    fn write_raster(&self, _data: &RasterData, path: &Path) -> EngineResult<()> {
        self.log(format!("write_raster {}", path.display()));
        Ok(())
    }

    fn write_table(&self, _data: &TabularData, path: &Path) -> EngineResult<()> {
        self.log(format!("write_table {}", path.display()));
        Ok(())
    }

    fn reproject(&self, data: SpatialData, target: &Crs) -> EngineResult<SpatialData> {
        self.log(format!("reproject {} -> {}", data.crs(), target));
        Ok(match data {
            SpatialData::Vector(mut v) => {
                v.crs = target.clone();
                SpatialData::Vector(v)
            }
            SpatialData::Raster(mut r) => {
                r.crs = target.clone();
                SpatialData::Raster(r)
            }
        })
    }

    fn repair_geometry(&self, mut data: VectorData) -> EngineResult<VectorData> {
        self.log("repair_geometry");
        if self.repair_fails {
            return Err(EngineError::Other("repair exploded".into()));
        }
        for feature in &mut data.features {
            let stubborn = feature.properties.get("stubborn") == Some(&Value::Bool(true));
            if !stubborn {
                feature.properties.remove("valid");
            }
        }
        Ok(data)
    }

    fn geometry_validity(&self, data: &VectorData) -> Vec<bool> {
        data.features
            .iter()
            .map(|f| f.properties.get("valid") != Some(&Value::Bool(false)))
            .collect()
    }

    fn bounding_box(&self, data: &SpatialData) -> EngineResult<BoundingBox> {
        match data {
            SpatialData::Vector(v) => v.extent().ok_or(EngineError::EmptyExtent),
            SpatialData::Raster(r) => Ok(r.extent()),
        }
    }

    fn total_area(&self, data: &VectorData) -> f64 {
        data.features.len() as f64
    }
}
