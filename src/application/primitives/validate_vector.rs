//! validate-vector: check and optionally repair a vector layer.

use serde_json::Value;

use super::{check_id_field, required_input, Primitive, PrimitiveContext};
use crate::application::arguments::param;
use crate::domain::entities::{Artifact, InvocationArgs, WarningsLedger};
use crate::domain::services::{extract_vector_metadata, validate_geometry};
use crate::error::CanopyResult;

pub struct ValidateVector;

impl ValidateVector {
    pub const NAME: &'static str = "validate-vector";
}

impl Primitive for ValidateVector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(
        &self,
        ctx: &PrimitiveContext<'_>,
        args: &InvocationArgs,
        ledger: &mut WarningsLedger,
    ) -> CanopyResult<Value> {
        let features = required_input(args, "features")?;
        let repair = ctx.repair(args)?;
        let id_field = param::<String>(args.params(), "id_field")?;

        let data = ctx.engine.read_vector(&features)?;
        tracing::debug!(features = data.features.len(), crs = %data.crs, "vector read");

        let data = validate_geometry(ctx.engine, data, repair, ledger);

        ctx.engine.write_vector(&data, args.output())?;
        tracing::debug!(output = %args.output().display(), "vector written");

        let metadata = extract_vector_metadata(ctx.engine, &Artifact::Vector(data), id_field.as_deref())?;
        check_id_field(ledger, id_field.as_deref(), &metadata.fields);

        Ok(serde_json::to_value(metadata)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::primitives::execute;
    use crate::config::Config;
    use crate::domain::ports::mock_engine::MockGeoEngine;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_features_input_fails() {
        let engine = MockGeoEngine::new();
        let config = Config::default();
        let ctx = PrimitiveContext::new(&engine, &config);

        let envelope = execute(&ValidateVector, &ctx, &["{}", "out.geojson", "{}"]);

        assert_eq!(envelope.body()["error"], "MissingInput");
    }

    #[test]
    fn unreadable_features_is_external_io() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("parks.geojson");
        fs::write(&path, "{}").unwrap();

        let engine = MockGeoEngine::new();
        let config = Config::default();
        let ctx = PrimitiveContext::new(&engine, &config);
        let inputs = serde_json::json!({"features": path}).to_string();

        let envelope = execute(&ValidateVector, &ctx, &[inputs.as_str(), "out.geojson", "{}"]);

        assert_eq!(envelope.body()["error"], "ExternalIOError");
        assert!(engine.calls().is_empty());
    }
}
