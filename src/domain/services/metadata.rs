//! Metadata extraction service
//!
//! Three side-effect-free summarizers, one per artifact kind. Each fails fast
//! with `TypeMismatch` on the wrong kind. Optional fields are `None` and are
//! omitted from the serialized envelope.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::domain::entities::{Artifact, RasterData, TabularData};
use crate::domain::ports::GeoEngine;
use crate::domain::value_objects::{BoundingBox, Crs};
use crate::error::{CanopyError, CanopyResult};

/// Geometry types present: a single name when homogeneous, else the sorted set
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeometryTypes {
    Single(String),
    Mixed(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorMetadata {
    pub crs: Crs,
    pub feature_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry_type: Option<GeometryTypes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    pub fields: Vec<String>,
    /// Only present when some geometry type is polygonal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_field: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimensions {
    pub rows: usize,
    pub cols: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasterMetadata {
    pub crs: Crs,
    pub resolution: f64,
    pub dimensions: Dimensions,
    pub bbox: BoundingBox,
    pub band_count: usize,
    pub nodata_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_range: Option<ValueRange>,
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataQuality {
    pub complete_rows: usize,
    pub missing_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabularMetadata {
    pub row_count: usize,
    pub column_count: usize,
    pub variables: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spatial_unit: Option<String>,
    pub data_quality: DataQuality,
}

/// Optional descriptors for raster summaries
#[derive(Debug, Clone, Default)]
pub struct RasterOptions {
    pub units: Option<String>,
    pub measurement_type: Option<String>,
}

/// Optional descriptors for tabular summaries
#[derive(Debug, Clone, Default)]
pub struct TabularOptions {
    pub id_field: Option<String>,
    pub spatial_unit: Option<String>,
}

fn mismatch(expected: &'static str, artifact: &Artifact) -> CanopyError {
    CanopyError::TypeMismatch {
        expected,
        found: artifact.kind(),
    }
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn extract_vector_metadata(
    engine: &dyn GeoEngine,
    artifact: &Artifact,
    id_field: Option<&str>,
) -> CanopyResult<VectorMetadata> {
    let Artifact::Vector(data) = artifact else {
        return Err(mismatch("vector", artifact));
    };

    let types: BTreeSet<&str> = data
        .features
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .map(|g| g.type_name())
        .collect();

    let has_polygons = types
        .iter()
        .any(|t| t.to_ascii_lowercase().contains("polygon"));

    let geometry_type = match types.len() {
        0 => None,
        1 => types.iter().next().map(|t| GeometryTypes::Single(t.to_string())),
        _ => Some(GeometryTypes::Mixed(
            types.iter().map(|t| t.to_string()).collect(),
        )),
    };

    let mut fields: Vec<String> = Vec::new();
    for feature in &data.features {
        for key in feature.properties.keys() {
            if !fields.iter().any(|f| f == key) {
                fields.push(key.clone());
            }
        }
    }

    let bbox = data.extent();

    let id_field = id_field
        .filter(|id| fields.iter().any(|f| f == id))
        .map(str::to_string);

    Ok(VectorMetadata {
        crs: data.crs.clone(),
        feature_count: data.features.len(),
        geometry_type,
        bbox,
        fields,
        total_area: has_polygons.then(|| engine.total_area(data)),
        id_field,
    })
}

pub fn extract_raster_metadata(
    artifact: &Artifact,
    options: &RasterOptions,
) -> CanopyResult<RasterMetadata> {
    let Artifact::Raster(data) = artifact else {
        return Err(mismatch("raster", artifact));
    };

    Ok(RasterMetadata {
        crs: data.crs.clone(),
        resolution: data.res_x,
        dimensions: Dimensions {
            rows: data.rows,
            cols: data.cols,
        },
        bbox: data.extent(),
        band_count: data.bands.len(),
        nodata_percentage: nodata_percentage(data),
        value_range: value_range(data),
        data_type: data.data_type.as_str().to_string(),
        units: options.units.clone(),
        measurement_type: options.measurement_type.clone(),
    })
}

fn nodata_percentage(data: &RasterData) -> f64 {
    let total: usize = data.bands.iter().map(|b| b.values.len()).sum();
    if total == 0 {
        return 0.0;
    }
    let missing: usize = data
        .bands
        .iter()
        .map(|b| b.values.iter().filter(|v| b.is_missing(**v)).count())
        .sum();
    round2(missing as f64 / total as f64 * 100.0)
}

fn value_range(data: &RasterData) -> Option<ValueRange> {
    data.bands
        .iter()
        .flat_map(|b| b.valid_values())
        .fold(None, |acc, v| {
            Some(match acc {
                None => ValueRange { min: v, max: v },
                Some(r) => ValueRange {
                    min: r.min.min(v),
                    max: r.max.max(v),
                },
            })
        })
}

pub fn extract_tabular_metadata(
    artifact: &Artifact,
    options: &TabularOptions,
) -> CanopyResult<TabularMetadata> {
    let Artifact::Tabular(data) = artifact else {
        return Err(mismatch("tabular", artifact));
    };

    let variables = data.variables();
    let row_count = data.rows.len();
    let column_count = variables.len();

    let (missing, complete_rows) = missing_cells(data, &variables);
    let cells = row_count * column_count;
    let missing_percentage = if cells == 0 {
        0.0
    } else {
        round2(missing as f64 / cells as f64 * 100.0)
    };

    let id_field = options
        .id_field
        .as_deref()
        .filter(|id| variables.contains(id))
        .map(str::to_string);

    Ok(TabularMetadata {
        row_count,
        column_count,
        variables: variables.iter().map(|v| v.to_string()).collect(),
        id_field,
        spatial_unit: options.spatial_unit.clone(),
        data_quality: DataQuality {
            complete_rows,
            missing_percentage,
        },
    })
}

/// `(missing cell count, complete row count)`; absent keys and nulls are missing
fn missing_cells(data: &TabularData, variables: &[&str]) -> (usize, usize) {
    let mut missing = 0;
    let mut complete = 0;
    for row in &data.rows {
        let row_missing = variables
            .iter()
            .filter(|v| row.get(**v).map_or(true, Value::is_null))
            .count();
        missing += row_missing;
        if row_missing == 0 {
            complete += 1;
        }
    }
    (missing, complete)
}
