//! Value Objects
//!
//! Immutable types compared by value.

mod bbox;
mod crs;
mod level;

pub use bbox::BoundingBox;
pub use crs::Crs;
pub use level::Level;
