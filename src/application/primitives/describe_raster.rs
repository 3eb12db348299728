//! describe-raster: summarize a raster, optionally reprojecting it first.

use serde_json::Value;

use super::{required_input, Primitive, PrimitiveContext};
use crate::application::arguments::param;
use crate::domain::entities::{Artifact, InvocationArgs, SpatialData, WarningsLedger};
use crate::domain::services::{extract_raster_metadata, RasterOptions};
use crate::domain::value_objects::Crs;
use crate::error::{CanopyError, CanopyResult};

/// Above this share of nodata cells the raster is flagged
const NODATA_WARNING_PCT: f64 = 50.0;

pub struct DescribeRaster;

impl DescribeRaster {
    pub const NAME: &'static str = "describe-raster";
}

impl Primitive for DescribeRaster {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(
        &self,
        ctx: &PrimitiveContext<'_>,
        args: &InvocationArgs,
        ledger: &mut WarningsLedger,
    ) -> CanopyResult<Value> {
        let raster_path = required_input(args, "raster")?;
        let options = RasterOptions {
            units: param::<String>(args.params(), "units")?,
            measurement_type: param::<String>(args.params(), "measurement_type")?,
        };
        let target = param::<String>(args.params(), "target_crs")?
            .map(Crs::new)
            .filter(|crs| !crs.is_undefined());

        let mut raster = ctx.engine.read_raster(&raster_path)?;

        if let Some(target) = target {
            if raster.crs.is_undefined() {
                let message = "The raster object has no CRS defined; cannot reproject";
                ledger.critical(message);
                return Err(CanopyError::validation(message));
            }
            if raster.crs != target {
                let from = raster.crs.clone();
                raster = ctx
                    .engine
                    .reproject(SpatialData::Raster(raster), &target)?
                    .into_raster()?;
                ledger.info(format!("Reprojected raster from {} to {}", from, target));
            }
        }

        ctx.engine.write_raster(&raster, args.output())?;

        let cell_count = raster.cell_count();
        let metadata = extract_raster_metadata(&Artifact::Raster(raster), &options)?;
        // the rounded percentage reaches 100.0 while valid cells remain
        if cell_count > 0 && metadata.value_range.is_none() {
            ledger.critical("Raster contains only nodata cells");
        } else if metadata.nodata_percentage > NODATA_WARNING_PCT {
            ledger.warning(format!(
                "High nodata share: {:.2}% of cells are missing",
                metadata.nodata_percentage
            ));
        }

        Ok(serde_json::to_value(metadata)?)
    }
}
