//! Bounding Box Value Object
//!
//! Axis-aligned rectangle `(xmin, ymin, xmax, ymax)`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Smallest box containing every `(x, y)`; `None` for no points
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        points.into_iter().fold(None, |acc, (x, y)| {
            Some(match acc {
                None => BoundingBox::new(x, y, x, y),
                Some(b) => b.expand(x, y),
            })
        })
    }

    fn expand(self, x: f64, y: f64) -> Self {
        BoundingBox::new(
            self.xmin.min(x),
            self.ymin.min(y),
            self.xmax.max(x),
            self.ymax.max(y),
        )
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.xmin.min(other.xmin),
            self.ymin.min(other.ymin),
            self.xmax.max(other.xmax),
            self.ymax.max(other.ymax),
        )
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Disjoint iff separated along either axis. Touching edges are not disjoint.
    pub fn is_disjoint(&self, other: &BoundingBox) -> bool {
        self.xmax < other.xmin
            || self.xmin > other.xmax
            || self.ymax < other.ymin
            || self.ymin > other.ymax
    }

    /// Overlapping rectangle, or `None` when disjoint
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if self.is_disjoint(other) {
            return None;
        }
        Some(BoundingBox::new(
            self.xmin.max(other.xmin),
            self.ymin.max(other.ymin),
            self.xmax.min(other.xmax),
            self.ymax.min(other.ymax),
        ))
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.xmin, self.ymin, self.xmax, self.ymax]
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(v: [f64; 4]) -> Self {
        BoundingBox::new(v[0], v[1], v[2], v[3])
    }
}
