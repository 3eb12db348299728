//! subset-vector: keep the features that fall within a boundary.
//!
//! The boundary may be a vector or a raster; only its extent is used. CRS
//! reconciliation runs first, then overlap validation. A failed overlap check
//! is fatal because the subset would be meaningless.

use serde_json::Value;

use super::{required_input, Primitive, PrimitiveContext};
use crate::application::arguments::param;
use crate::domain::entities::{Artifact, InvocationArgs, SpatialData, VectorData, WarningsLedger};
use crate::domain::services::{
    check_overlap, extract_vector_metadata, validate_crs_match, validate_geometry, CrsTarget,
    OverlapCheck,
};
use crate::domain::value_objects::BoundingBox;
use crate::error::{CanopyError, CanopyResult};

pub struct SubsetVector;

impl SubsetVector {
    pub const NAME: &'static str = "subset-vector";
}

impl Primitive for SubsetVector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(
        &self,
        ctx: &PrimitiveContext<'_>,
        args: &InvocationArgs,
        ledger: &mut WarningsLedger,
    ) -> CanopyResult<Value> {
        let features_path = required_input(args, "features")?;
        let boundary_path = required_input(args, "boundary")?;

        let min_overlap_pct = param::<f64>(args.params(), "min_overlap_pct")?
            .unwrap_or(ctx.config.reconcile.min_overlap_pct);
        let target = match param::<i64>(args.params(), "transform_to")? {
            Some(side) => CrsTarget::try_from(side)?,
            None => ctx.config.reconcile.crs_target(),
        };
        let repair = ctx.repair(args)?;

        let features = SpatialData::Vector(ctx.engine.read_vector(&features_path)?);
        let boundary = ctx.engine.read_spatial(&boundary_path)?;
        tracing::debug!(boundary = boundary.kind(), "inputs read");

        let (features, boundary) = validate_crs_match(ctx.engine, features, boundary, target, ledger)?;

        match check_overlap(ctx.engine, &features, &boundary, min_overlap_pct, ledger)? {
            OverlapCheck::Disjoint => {
                return Err(CanopyError::validation(
                    "Features and boundary do not overlap; nothing to subset",
                ))
            }
            OverlapCheck::Overlapping { report, passed: false } => {
                return Err(CanopyError::validation(format!(
                    "Overlap of {:.1}% is below the required {:.1}%",
                    report.overlap_pct, min_overlap_pct
                )))
            }
            OverlapCheck::Overlapping { .. } => {}
        }

        let extent = ctx.engine.bounding_box(&boundary)?;
        let features = validate_geometry(ctx.engine, features.into_vector()?, repair, ledger);

        let total = features.features.len();
        let subset = within_extent(features, &extent);
        let kept = subset.features.len();
        tracing::info!(total, kept, "features subset");
        if kept == 0 {
            ledger.warning("No features intersect the boundary extent; output is empty");
        }

        ctx.engine.write_vector(&subset, args.output())?;

        Ok(serde_json::to_value(extract_vector_metadata(
            ctx.engine,
            &Artifact::Vector(subset),
            None,
        )?)?)
    }
}

/// Features whose own extent intersects `extent`; geometry-less features are dropped
fn within_extent(mut data: VectorData, extent: &BoundingBox) -> VectorData {
    data.features.retain(|feature| {
        feature
            .geometry
            .as_ref()
            .and_then(|g| BoundingBox::from_points(g.coords().map(|c| (c[0], c[1]))))
            .is_some_and(|b| !b.is_disjoint(extent))
    });
    data
}
