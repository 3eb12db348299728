//! Structural geometry validity and best-effort repair.
//!
//! Checks finite coordinates, line length and ring closure/area only.
//! Self-intersection is not detected.

use crate::domain::entities::{Coord, Geometry};

pub fn is_valid(geometry: &Geometry) -> bool {
    if !geometry.coords().all(|c| c[0].is_finite() && c[1].is_finite()) {
        return false;
    }
    match geometry {
        Geometry::Point(_) => true,
        Geometry::MultiPoint(points) => !points.is_empty(),
        Geometry::LineString(line) => line_valid(line),
        Geometry::MultiLineString(lines) => !lines.is_empty() && lines.iter().all(|l| line_valid(l)),
        Geometry::Polygon(rings) => polygon_valid(rings),
        Geometry::MultiPolygon(polys) => !polys.is_empty() && polys.iter().all(|p| polygon_valid(p)),
    }
}

fn line_valid(line: &[Coord]) -> bool {
    line.len() >= 2 && line.iter().any(|c| *c != line[0])
}

fn ring_valid(ring: &[Coord]) -> bool {
    ring.len() >= 4 && ring.first() == ring.last() && ring_area(ring) != 0.0
}

fn polygon_valid(rings: &[Vec<Coord>]) -> bool {
    !rings.is_empty() && rings.iter().all(|r| ring_valid(r))
}

/// Signed shoelace area
fn ring_area(ring: &[Coord]) -> f64 {
    ring.windows(2)
        .map(|w| w[0][0] * w[1][1] - w[1][0] * w[0][1])
        .sum::<f64>()
        / 2.0
}

/// Planar area: exterior minus holes, summed over polygon parts
pub fn area(geometry: &Geometry) -> f64 {
    match geometry {
        Geometry::Polygon(rings) => polygon_area(rings),
        Geometry::MultiPolygon(polys) => polys.iter().map(|p| polygon_area(p)).sum(),
        _ => 0.0,
    }
}

fn polygon_area(rings: &[Vec<Coord>]) -> f64 {
    let mut rings = rings.iter();
    let exterior = rings.next().map_or(0.0, |r| ring_area(r).abs());
    let holes: f64 = rings.map(|r| ring_area(r).abs()).sum();
    (exterior - holes).max(0.0)
}

/// Best-effort repair; the result may still be invalid.
///
/// Consecutive duplicates are removed and open rings closed. Invalid holes
/// and polygon parts are dropped as long as something valid remains.
pub fn repair(geometry: Geometry) -> Geometry {
    match geometry {
        Geometry::LineString(line) => Geometry::LineString(dedup(line)),
        Geometry::MultiLineString(lines) => {
            let lines: Vec<_> = lines.into_iter().map(dedup).collect();
            let valid: Vec<_> = lines.iter().filter(|l| line_valid(l)).cloned().collect();
            Geometry::MultiLineString(if valid.is_empty() { lines } else { valid })
        }
        Geometry::Polygon(rings) => Geometry::Polygon(repair_polygon(rings)),
        Geometry::MultiPolygon(polys) => {
            let polys: Vec<_> = polys.into_iter().map(repair_polygon).collect();
            let valid: Vec<_> = polys.iter().filter(|p| polygon_valid(p)).cloned().collect();
            Geometry::MultiPolygon(if valid.is_empty() { polys } else { valid })
        }
        other => other,
    }
}

fn repair_polygon(rings: Vec<Vec<Coord>>) -> Vec<Vec<Coord>> {
    let mut rings = rings.into_iter().map(close_ring);
    let Some(exterior) = rings.next() else {
        return Vec::new();
    };
    let mut repaired = vec![exterior];
    repaired.extend(rings.filter(|r| ring_valid(r)));
    repaired
}

fn close_ring(ring: Vec<Coord>) -> Vec<Coord> {
    let mut ring = dedup(ring);
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
        if first != last {
            ring.push(first);
        }
    }
    ring
}

fn dedup(mut coords: Vec<Coord>) -> Vec<Coord> {
    coords.dedup();
    coords
}
