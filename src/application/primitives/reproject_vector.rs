//! reproject-vector: move a vector layer into a target CRS.

use serde_json::Value;

use super::{required_input, Primitive, PrimitiveContext};
use crate::application::arguments::param;
use crate::domain::entities::{Artifact, InvocationArgs, SpatialData, WarningsLedger};
use crate::domain::services::{extract_vector_metadata, validate_geometry};
use crate::domain::value_objects::Crs;
use crate::error::{CanopyError, CanopyResult};

pub struct ReprojectVector;

impl ReprojectVector {
    pub const NAME: &'static str = "reproject-vector";
}

impl Primitive for ReprojectVector {
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
        let target = param::<String>(args.params(), "target_crs")?
            .map(Crs::new)
            .filter(|crs| !crs.is_undefined())
            .ok_or_else(|| CanopyError::InvalidParam {
                name: "target_crs".to_string(),
                message: "a target CRS is required".to_string(),
            })?;
        let repair = ctx.repair(args)?;

        let data = ctx.engine.read_vector(&features)?;
        if data.crs.is_undefined() {
            let message = "The vector object has no CRS defined; cannot reproject";
            ledger.critical(message);
            return Err(CanopyError::validation(message));
        }

        let data = if data.crs == target {
            ledger.info(format!("Already in {}; no reprojection needed", target));
            data
        } else {
            let from = data.crs.clone();
            let reprojected = ctx
                .engine
                .reproject(SpatialData::Vector(data), &target)?
                .into_vector()?;
            ledger.info(format!("Reprojected from {} to {}", from, target));
            reprojected
        };

        let data = validate_geometry(ctx.engine, data, repair, ledger);
        ctx.engine.write_vector(&data, args.output())?;

        Ok(serde_json::to_value(extract_vector_metadata(
            ctx.engine,
            &Artifact::Vector(data),
            None,
        )?)?)
    }
}
