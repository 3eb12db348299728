//! Local GeoEngine
//!
//! Reference implementation of the GeoEngine port over plain files:
//!
//! - `geojson` - vector FeatureCollections
//! - `ascii_grid` - single-band ESRI ASCII rasters with a `.prj` sidecar
//! - `records` - JSON / NDJSON tabular records
//! - `projection` - lon/lat <-> Web Mercator
//! - `validity` - structural geometry checks and repair

pub mod ascii_grid;
pub mod geojson;
pub mod projection;
pub mod records;
pub mod validity;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::entities::{Band, RasterData, SpatialData, TabularData, VectorData};
use crate::domain::ports::{EngineError, EngineResult, GeoEngine};
use crate::domain::value_objects::{BoundingBox, Crs};

use projection::Transform;

/// CRS assumed for a grid without a `.prj` sidecar
pub const DEFAULT_RASTER_CRS: &str = "EPSG:4326";

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalGeoEngine;

impl LocalGeoEngine {
    pub fn new() -> Self {
        Self
    }
}

fn read_text(path: &Path) -> EngineResult<String> {
    fs::read_to_string(path).map_err(|e| EngineError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn read_error(path: &Path, message: impl Into<String>) -> EngineError {
    EngineError::Read {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn write_error(path: &Path, message: impl ToString) -> EngineError {
    EngineError::Write {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// Write via a temp file in the destination directory, then rename
fn write_atomic(path: &Path, content: &str) -> EngineResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| write_error(path, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(|e| write_error(path, e))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| write_error(path, e))?;
    tmp.persist(path).map_err(|e| write_error(path, e.error))?;
    Ok(())
}

fn sidecar(path: &Path) -> PathBuf {
    path.with_extension("prj")
}

impl GeoEngine for LocalGeoEngine {
    fn read_vector(&self, path: &Path) -> EngineResult<VectorData> {
        let text = read_text(path)?;
        geojson::parse(&text).map_err(|e| read_error(path, e))
    }

    fn read_raster(&self, path: &Path) -> EngineResult<RasterData> {
        let text = read_text(path)?;
        let prj = sidecar(path);
        let crs = if prj.is_file() {
            Crs::new(read_text(&prj)?)
        } else {
            Crs::new(DEFAULT_RASTER_CRS)
        };
        ascii_grid::parse(&text, crs).map_err(|e| read_error(path, e))
    }

    fn read_table(&self, path: &Path) -> EngineResult<TabularData> {
        let text = read_text(path)?;
        records::parse(&text, records::is_line_delimited(path)).map_err(|e| read_error(path, e))
    }

    fn write_vector(&self, data: &VectorData, path: &Path) -> EngineResult<()> {
        write_atomic(path, &geojson::to_value(data).to_string())
    }

    fn write_raster(&self, data: &RasterData, path: &Path) -> EngineResult<()> {
        let text = ascii_grid::render(data).map_err(|e| write_error(path, e))?;
        write_atomic(path, &text)?;

        let prj = sidecar(path);
        if data.crs.is_undefined() {
            if prj.is_file() {
                fs::remove_file(&prj).map_err(|e| write_error(&prj, e))?;
            }
            Ok(())
        } else {
            write_atomic(&prj, data.crs.as_str())
        }
    }

    fn write_table(&self, data: &TabularData, path: &Path) -> EngineResult<()> {
        let text = records::render(data, records::is_line_delimited(path))
            .map_err(|e| write_error(path, e))?;
        write_atomic(path, &text)
    }

    fn reproject(&self, data: SpatialData, target: &Crs) -> EngineResult<SpatialData> {
        let transform =
            Transform::between(data.crs(), target).ok_or_else(|| EngineError::UnsupportedCrs {
                from: data.crs().to_string(),
                to: target.to_string(),
            })?;

        Ok(match data {
            SpatialData::Vector(mut vector) => {
                for feature in &mut vector.features {
                    feature.geometry = feature
                        .geometry
                        .take()
                        .map(|g| g.map_coords(&|c| transform.apply(c)));
                }
                vector.crs = target.clone();
                SpatialData::Vector(vector)
            }
            SpatialData::Raster(raster) => SpatialData::Raster(resample(raster, transform, target)),
        })
    }

    fn repair_geometry(&self, mut data: VectorData) -> EngineResult<VectorData> {
        for feature in &mut data.features {
            feature.geometry = feature.geometry.take().map(validity::repair);
        }
        Ok(data)
    }

    fn geometry_validity(&self, data: &VectorData) -> Vec<bool> {
        data.features
            .iter()
            .map(|f| f.geometry.as_ref().map_or(true, validity::is_valid))
            .collect()
    }

    fn bounding_box(&self, data: &SpatialData) -> EngineResult<BoundingBox> {
        match data {
            SpatialData::Vector(v) => v.extent().ok_or(EngineError::EmptyExtent),
            SpatialData::Raster(r) => Ok(r.extent()),
        }
    }

    fn total_area(&self, data: &VectorData) -> f64 {
        data.features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .map(validity::area)
            .sum()
    }
}

/// Nearest-neighbour resample onto a grid of the same dimensions covering
/// the transformed extent.
fn resample(raster: RasterData, transform: Transform, target: &Crs) -> RasterData {
    let source = raster.extent();
    let corners = [
        [source.xmin, source.ymin],
        [source.xmin, source.ymax],
        [source.xmax, source.ymin],
        [source.xmax, source.ymax],
    ];
    let extent = BoundingBox::from_points(corners.iter().map(|c| {
        let [x, y] = transform.apply(*c);
        (x, y)
    }))
    .unwrap_or(source);

    let cols = raster.cols;
    let rows = raster.rows;
    let res_x = extent.width() / cols.max(1) as f64;
    let res_y = extent.height() / rows.max(1) as f64;
    let inverse = transform.inverse();

    let bands = raster
        .bands
        .iter()
        .map(|band| {
            let fill = band.nodata.unwrap_or(f64::NAN);
            let mut values = Vec::with_capacity(cols * rows);
            for row in 0..rows {
                let y = extent.ymax - (row as f64 + 0.5) * res_y;
                for col in 0..cols {
                    let x = extent.xmin + (col as f64 + 0.5) * res_x;
                    let [sx, sy] = inverse.apply([x, y]);
                    values.push(sample(&raster, band, sx, sy).unwrap_or(fill));
                }
            }
            Band::new(values, band.nodata)
        })
        .collect();

    RasterData {
        crs: target.clone(),
        cols,
        rows,
        origin: [extent.xmin, extent.ymin],
        res_x,
        res_y,
        bands,
        data_type: raster.data_type,
    }
}

fn sample(raster: &RasterData, band: &Band, x: f64, y: f64) -> Option<f64> {
    let top = raster.origin[1] + raster.rows as f64 * raster.res_y;
    let col = ((x - raster.origin[0]) / raster.res_x).floor();
    let row = ((top - y) / raster.res_y).floor();
    if !(col >= 0.0 && row >= 0.0) {
        return None;
    }
    let (col, row) = (col as usize, row as usize);
    if col >= raster.cols || row >= raster.rows {
        return None;
    }
    band.values.get(row * raster.cols + col).copied()
}
