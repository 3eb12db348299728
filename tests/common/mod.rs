//! Common test utilities for Canopy CLI tests.
//!
//! - `TestEnv`: isolated project and config directories, binary runner
//! - Fixtures: GeoJSON, ASCII grid and record builders

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
