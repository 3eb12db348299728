//! Invocation arguments entity
//!
//! The resolved three-part invocation contract: named inputs, an output path,
//! and free-form parameters. Immutable once resolved.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct InvocationArgs {
    inputs: Map<String, Value>,
    output: PathBuf,
    params: Map<String, Value>,
}

impl InvocationArgs {
    pub fn new(inputs: Map<String, Value>, output: impl Into<PathBuf>, params: Map<String, Value>) -> Self {
        Self {
            inputs,
            output: output.into(),
            params,
        }
    }

    pub fn inputs(&self) -> &Map<String, Value> {
        &self.inputs
    }

    /// Raw output path. Never checked for existence; the primitive creates it.
    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }
}
