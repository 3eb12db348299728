//! Coordinate transformations between geographic lon/lat and Web Mercator.

use std::f64::consts::FRAC_PI_4;

use crate::domain::entities::Coord;
use crate::domain::value_objects::Crs;

/// WGS84 semi-major axis, metres
const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude limit of the square Web Mercator world
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Geographic,
    WebMercator,
}

fn family(crs: &Crs) -> Option<Family> {
    match crs.as_str() {
        "EPSG:4326" | "OGC:CRS84" | "EPSG:4979" => Some(Family::Geographic),
        "EPSG:3857" | "EPSG:900913" | "EPSG:102100" => Some(Family::WebMercator),
        _ => None,
    }
}

/// A point transformation between two supported systems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Identity,
    ToMercator,
    ToGeographic,
}

impl Transform {
    /// `None` when either side is outside the supported set
    pub fn between(from: &Crs, to: &Crs) -> Option<Transform> {
        match (family(from)?, family(to)?) {
            (a, b) if a == b => Some(Transform::Identity),
            (Family::Geographic, Family::WebMercator) => Some(Transform::ToMercator),
            _ => Some(Transform::ToGeographic),
        }
    }

    pub fn apply(&self, c: Coord) -> Coord {
        match self {
            Transform::Identity => c,
            Transform::ToMercator => to_mercator(c),
            Transform::ToGeographic => to_geographic(c),
        }
    }

    pub fn inverse(&self) -> Transform {
        match self {
            Transform::Identity => Transform::Identity,
            Transform::ToMercator => Transform::ToGeographic,
            Transform::ToGeographic => Transform::ToMercator,
        }
    }
}

fn to_mercator([lon, lat]: Coord) -> Coord {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    [
        EARTH_RADIUS * lon.to_radians(),
        EARTH_RADIUS * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln(),
    ]
}

fn to_geographic([x, y]: Coord) -> Coord {
    let lon = (x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    [lon, lat]
}
