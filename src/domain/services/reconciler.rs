//! Spatial reconciliation service
//!
//! Makes two spatial objects comparable before a binary operation (CRS
//! reconciliation) and makes one vector internally consistent before further
//! processing (geometry reconciliation).

use crate::domain::entities::{SpatialData, VectorData, WarningsLedger};
use crate::domain::ports::GeoEngine;
use crate::error::{CanopyError, CanopyResult};

/// Which operand's CRS wins when the two differ
///
/// The direction is declared by the caller: there is no generally correct
/// automatic choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrsTarget {
    /// Reproject the second object into the first object's CRS (`transform_to = 1`)
    First,
    /// Reproject the first object into the second object's CRS (`transform_to = 2`)
    #[default]
    Second,
}

impl TryFrom<i64> for CrsTarget {
    type Error = CanopyError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(CrsTarget::First),
            2 => Ok(CrsTarget::Second),
            other => Err(CanopyError::InvalidParam {
                name: "transform_to".to_string(),
                message: format!("must be 1 or 2, got {}", other),
            }),
        }
    }
}

/// Reconcile the CRS of two spatial objects.
///
/// Descriptors are compared by canonical string equality. On mismatch exactly
/// one side is reprojected, chosen by `target`, and an `info` entry names the
/// source and destination CRS. Matching descriptors pass through untouched.
///
/// An object without a CRS cannot be reconciled: a `critical` entry is
/// recorded and `ValidationFailure` returned.
pub fn validate_crs_match(
    engine: &dyn GeoEngine,
    first: SpatialData,
    second: SpatialData,
    target: CrsTarget,
    ledger: &mut WarningsLedger,
) -> CanopyResult<(SpatialData, SpatialData)> {
    for (label, obj) in [("first", &first), ("second", &second)] {
        if obj.crs().is_undefined() {
            let message = format!("The {} {} object has no CRS defined", label, obj.kind());
            ledger.critical(message.clone());
            return Err(CanopyError::validation(message));
        }
    }

    if first.crs() == second.crs() {
        tracing::debug!(crs = %first.crs(), "CRS already match");
        return Ok((first, second));
    }

    match target {
        CrsTarget::Second => {
            let from = first.crs().clone();
            let to = second.crs().clone();
            let first = engine.reproject(first, &to)?;
            ledger.info(format!(
                "CRS mismatch: reprojected first object from {} to {}",
                from, to
            ));
            Ok((first, second))
        }
        CrsTarget::First => {
            let from = second.crs().clone();
            let to = first.crs().clone();
            let second = engine.reproject(second, &to)?;
            ledger.info(format!(
                "CRS mismatch: reprojected second object from {} to {}",
                from, to
            ));
            Ok((first, second))
        }
    }
}

/// Reconcile geometry validity of one vector.
///
/// Never fails: invalid geometry is always recoverable at the warning level,
/// and downstream consumers decide whether it is acceptable.
///
/// - no invalid geometries: returned unchanged, nothing recorded
/// - `repair` and everything fixed: `info` with the original count
/// - `repair` and some remain: `warning` with both counts
/// - `repair` but the engine errored: `warning`, original returned
/// - no `repair`: `warning` with the count, no corrective action
pub fn validate_geometry(
    engine: &dyn GeoEngine,
    data: VectorData,
    repair: bool,
    ledger: &mut WarningsLedger,
) -> VectorData {
    let invalid = count_invalid(engine, &data);
    if invalid == 0 {
        return data;
    }

    if !repair {
        ledger.warning(format!(
            "Found {} invalid geometries; repair disabled, left as-is",
            invalid
        ));
        return data;
    }

    match engine.repair_geometry(data.clone()) {
        Ok(repaired) => {
            let remaining = count_invalid(engine, &repaired);
            if remaining == 0 {
                ledger.info(format!("Repaired {} invalid geometries", invalid));
            } else {
                ledger.warning(format!(
                    "Found {} invalid geometries; {} remain invalid after repair",
                    invalid, remaining
                ));
            }
            repaired
        }
        Err(err) => {
            ledger.warning(format!(
                "Found {} invalid geometries; repair failed ({}), left as-is",
                invalid, err
            ));
            data
        }
    }
}

fn count_invalid(engine: &dyn GeoEngine, data: &VectorData) -> usize {
    engine
        .geometry_validity(data)
        .iter()
        .filter(|valid| !**valid)
        .count()
}
