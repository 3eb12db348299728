//! Test fixtures - small spatial artifacts.

use serde_json::{json, Value};

/// Axis-aligned square polygon as a GeoJSON geometry
pub fn square(x: f64, y: f64, size: f64) -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[
            [x, y], [x + size, y], [x + size, y + size], [x, y + size], [x, y]
        ]]
    })
}

/// Same square with the closing position missing
pub fn open_square(x: f64, y: f64, size: f64) -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[
            [x, y], [x + size, y], [x + size, y + size], [x, y + size]
        ]]
    })
}

pub fn point(x: f64, y: f64) -> Value {
    json!({"type": "Point", "coordinates": [x, y]})
}

pub fn feature(geometry: Value, properties: Value) -> Value {
    json!({"type": "Feature", "properties": properties, "geometry": geometry})
}

/// FeatureCollection text; `crs` of `None` writes an explicit null CRS
pub fn collection(crs: Option<&str>, features: Vec<Value>) -> String {
    let crs = match crs {
        Some(name) => json!({"type": "name", "properties": {"name": name}}),
        None => Value::Null,
    };
    json!({"type": "FeatureCollection", "crs": crs, "features": features}).to_string()
}

/// 4 x 2 integer grid with one nodata cell
pub const SMALL_GRID: &str = "\
ncols 4
nrows 2
xllcorner 0
yllcorner 0
cellsize 1
NODATA_value -9999
1 2 3 4
5 6 7 -9999
";

/// 2 x 2 grid where every cell is nodata
pub const EMPTY_GRID: &str = "\
ncols 2
nrows 2
xllcorner 0
yllcorner 0
cellsize 1
NODATA_value -1
-1 -1
-1 -1
";

/// 10 rows x 4 columns with 5 missing cells
pub fn census_records() -> String {
    let rows: Vec<Value> = (0..10)
        .map(|i| {
            let income = if i % 2 == 0 { Value::Null } else { json!(40_000 + i) };
            json!({"tract_id": format!("T{:02}", i), "population": 1000 + i, "income": income, "area_km2": 1.5})
        })
        .collect();
    Value::Array(rows).to_string()
}
