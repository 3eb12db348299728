//! GeoJSON FeatureCollection codec.
//!
//! The CRS travels in the legacy `crs` member (`{"type": "name",
//! "properties": {"name": ...}}`). A missing member means the GeoJSON default
//! `OGC:CRS84`; an explicit `"crs": null` means no CRS at all.

use serde_json::{json, Map, Value};

use crate::domain::entities::{Coord, Feature, Geometry, VectorData};
use crate::domain::value_objects::Crs;

pub const DEFAULT_CRS: &str = "OGC:CRS84";

pub fn parse(text: &str) -> Result<VectorData, String> {
    let root: Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
    let object = root.as_object().ok_or("GeoJSON root must be an object")?;

    let crs = match object.get("crs") {
        None => Crs::new(DEFAULT_CRS),
        Some(Value::Null) => Crs::new(""),
        Some(value) => value
            .pointer("/properties/name")
            .and_then(Value::as_str)
            .map(Crs::new)
            .ok_or("crs member has no properties.name")?,
    };

    let features = match object.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => object
            .get("features")
            .and_then(Value::as_array)
            .ok_or("FeatureCollection without a features array")?
            .iter()
            .enumerate()
            .map(|(i, f)| parse_feature(f).map_err(|e| format!("feature {}: {}", i, e)))
            .collect::<Result<Vec<_>, _>>()?,
        Some("Feature") => vec![parse_feature(&root)?],
        Some(other) => return Err(format!("unsupported GeoJSON type '{}'", other)),
        None => return Err("GeoJSON object has no type".to_string()),
    };

    Ok(VectorData::new(crs, features))
}

fn parse_feature(value: &Value) -> Result<Feature, String> {
    if value.get("type").and_then(Value::as_str) != Some("Feature") {
        return Err("expected a Feature".to_string());
    }
    let properties = match value.get("properties") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => return Err("properties must be an object".to_string()),
    };
    let geometry = match value.get("geometry") {
        None | Some(Value::Null) => None,
        Some(g) => Some(parse_geometry(g)?),
    };
    Ok(Feature::new(geometry, properties))
}

fn parse_geometry(value: &Value) -> Result<Geometry, String> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or("geometry has no type")?;
    let coords = value.get("coordinates").ok_or("geometry has no coordinates")?;

    Ok(match kind {
        "Point" => Geometry::Point(position(coords)?),
        "MultiPoint" => Geometry::MultiPoint(positions(coords)?),
        "LineString" => Geometry::LineString(positions(coords)?),
        "MultiLineString" => Geometry::MultiLineString(nested(coords, positions)?),
        "Polygon" => Geometry::Polygon(nested(coords, positions)?),
        "MultiPolygon" => Geometry::MultiPolygon(nested(coords, |v| nested(v, positions))?),
        other => return Err(format!("unsupported geometry type '{}'", other)),
    })
}

fn position(value: &Value) -> Result<Coord, String> {
    let array = value.as_array().ok_or("position must be an array")?;
    match array.as_slice() {
        [x, y, ..] => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => Ok([x, y]),
            _ => Err("position members must be numbers".to_string()),
        },
        _ => Err("position needs at least two numbers".to_string()),
    }
}

fn positions(value: &Value) -> Result<Vec<Coord>, String> {
    nested(value, position)
}

fn nested<T>(value: &Value, item: impl Fn(&Value) -> Result<T, String>) -> Result<Vec<T>, String> {
    value
        .as_array()
        .ok_or("coordinates must be an array")?
        .iter()
        .map(item)
        .collect()
}

pub fn to_value(data: &VectorData) -> Value {
    let crs = if data.crs.is_undefined() {
        Value::Null
    } else {
        json!({"type": "name", "properties": {"name": data.crs.as_str()}})
    };

    let features: Vec<Value> = data
        .features
        .iter()
        .map(|f| {
            json!({
                "type": "Feature",
                "properties": f.properties,
                "geometry": f.geometry.as_ref().map_or(Value::Null, geometry_value),
            })
        })
        .collect();

    json!({"type": "FeatureCollection", "crs": crs, "features": features})
}

fn geometry_value(geometry: &Geometry) -> Value {
    let (kind, coordinates) = match geometry {
        Geometry::Point(c) => ("Point", json!(c)),
        Geometry::MultiPoint(cs) => ("MultiPoint", json!(cs)),
        Geometry::LineString(cs) => ("LineString", json!(cs)),
        Geometry::MultiLineString(ls) => ("MultiLineString", json!(ls)),
        Geometry::Polygon(rs) => ("Polygon", json!(rs)),
        Geometry::MultiPolygon(ps) => ("MultiPolygon", json!(ps)),
    };
    json!({"type": kind, "coordinates": coordinates})
}
