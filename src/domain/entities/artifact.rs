//! Artifact entities
//!
//! In-memory representations of the three artifact kinds a primitive can
//! consume or produce. Dispatch is on an explicit kind discriminant
//! ([`Artifact`], [`SpatialData`]) rather than on probing a value's shape.

use serde_json::{Map, Value};

use crate::domain::value_objects::{BoundingBox, Crs};
use crate::error::{CanopyError, CanopyResult};

/// `[x, y]` position
pub type Coord = [f64; 2];

/// Simple-features geometry, GeoJSON flavoured
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coord),
    MultiPoint(Vec<Coord>),
    LineString(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    /// Exterior ring first, then holes
    Polygon(Vec<Vec<Coord>>),
    MultiPolygon(Vec<Vec<Vec<Coord>>>),
}

impl Geometry {
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Every position in the geometry, in storage order
    pub fn coords(&self) -> Box<dyn Iterator<Item = &Coord> + '_> {
        match self {
            Geometry::Point(c) => Box::new(std::iter::once(c)),
            Geometry::MultiPoint(cs) | Geometry::LineString(cs) => Box::new(cs.iter()),
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                Box::new(lines.iter().flatten())
            }
            Geometry::MultiPolygon(polys) => Box::new(polys.iter().flatten().flatten()),
        }
    }

    /// Apply `f` to every position
    pub fn map_coords(self, f: &impl Fn(Coord) -> Coord) -> Geometry {
        let line = |cs: Vec<Coord>| cs.into_iter().map(f).collect::<Vec<_>>();
        let rings = |rs: Vec<Vec<Coord>>| rs.into_iter().map(line).collect::<Vec<_>>();
        match self {
            Geometry::Point(c) => Geometry::Point(f(c)),
            Geometry::MultiPoint(cs) => Geometry::MultiPoint(line(cs)),
            Geometry::LineString(cs) => Geometry::LineString(line(cs)),
            Geometry::MultiLineString(ls) => Geometry::MultiLineString(rings(ls)),
            Geometry::Polygon(rs) => Geometry::Polygon(rings(rs)),
            Geometry::MultiPolygon(ps) => {
                Geometry::MultiPolygon(ps.into_iter().map(rings).collect())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// `None` for features without geometry
    pub geometry: Option<Geometry>,
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: Option<Geometry>, properties: Map<String, Value>) -> Self {
        Self {
            geometry,
            properties,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorData {
    pub crs: Crs,
    pub features: Vec<Feature>,
}

impl VectorData {
    pub fn new(crs: Crs, features: Vec<Feature>) -> Self {
        Self { crs, features }
    }

    /// Extent of all positions; `None` when there are no geometries
    pub fn extent(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(
            self.features
                .iter()
                .filter_map(|f| f.geometry.as_ref())
                .flat_map(|g| g.coords())
                .map(|c| (c[0], c[1])),
        )
    }
}

/// Storage type of raster cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterDataType {
    Int32,
    Float64,
}

impl RasterDataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RasterDataType::Int32 => "Int32",
            RasterDataType::Float64 => "Float64",
        }
    }
}

/// One raster band, row-major from the top row
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub values: Vec<f64>,
    pub nodata: Option<f64>,
}

impl Band {
    pub fn new(values: Vec<f64>, nodata: Option<f64>) -> Self {
        Self { values, nodata }
    }

    /// NaN cells and cells equal to the nodata sentinel are missing
    pub fn is_missing(&self, value: f64) -> bool {
        value.is_nan() || self.nodata.is_some_and(|nd| value == nd)
    }

    pub fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied().filter(|v| !self.is_missing(*v))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RasterData {
    pub crs: Crs,
    pub cols: usize,
    pub rows: usize,
    /// Lower-left corner `(x, y)`
    pub origin: Coord,
    /// Cell size along x
    pub res_x: f64,
    /// Cell size along y
    pub res_y: f64,
    pub bands: Vec<Band>,
    pub data_type: RasterDataType,
}

impl RasterData {
    pub fn extent(&self) -> BoundingBox {
        BoundingBox::new(
            self.origin[0],
            self.origin[1],
            self.origin[0] + self.cols as f64 * self.res_x,
            self.origin[1] + self.rows as f64 * self.res_y,
        )
    }

    pub fn cell_count(&self) -> usize {
        self.cols * self.rows * self.bands.len()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabularData {
    /// Column names in first-seen order, geometry column included
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
    pub geometry_column: Option<String>,
}

impl TabularData {
    /// Columns excluding the geometry column
    pub fn variables(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| Some(c.as_str()) != self.geometry_column.as_deref())
            .map(String::as_str)
            .collect()
    }
}

/// A spatial object: anything with a CRS and an extent
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialData {
    Vector(VectorData),
    Raster(RasterData),
}

impl SpatialData {
    pub fn crs(&self) -> &Crs {
        match self {
            SpatialData::Vector(v) => &v.crs,
            SpatialData::Raster(r) => &r.crs,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SpatialData::Vector(_) => "vector",
            SpatialData::Raster(_) => "raster",
        }
    }

    pub fn into_vector(self) -> CanopyResult<VectorData> {
        match self {
            SpatialData::Vector(v) => Ok(v),
            other => Err(CanopyError::TypeMismatch {
                expected: "vector",
                found: other.kind(),
            }),
        }
    }

    pub fn into_raster(self) -> CanopyResult<RasterData> {
        match self {
            SpatialData::Raster(r) => Ok(r),
            other => Err(CanopyError::TypeMismatch {
                expected: "raster",
                found: other.kind(),
            }),
        }
    }
}

impl From<VectorData> for SpatialData {
    fn from(v: VectorData) -> Self {
        SpatialData::Vector(v)
    }
}

impl From<RasterData> for SpatialData {
    fn from(r: RasterData) -> Self {
        SpatialData::Raster(r)
    }
}

/// Any artifact a primitive can summarize
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    Vector(VectorData),
    Raster(RasterData),
    Tabular(TabularData),
}

impl Artifact {
    pub fn kind(&self) -> &'static str {
        match self {
            Artifact::Vector(_) => "vector",
            Artifact::Raster(_) => "raster",
            Artifact::Tabular(_) => "tabular",
        }
    }
}

impl From<SpatialData> for Artifact {
    fn from(s: SpatialData) -> Self {
        match s {
            SpatialData::Vector(v) => Artifact::Vector(v),
            SpatialData::Raster(r) => Artifact::Raster(r),
        }
    }
}
