//! Spatial overlap validation
//!
//! Decides whether two extents intersect enough to proceed. The percentage is
//! asymmetric: it is always relative to the first operand, the primary input
//! being subset or checked.

use serde::Serialize;

use crate::domain::entities::{SpatialData, WarningsLedger};
use crate::domain::ports::GeoEngine;
use crate::domain::value_objects::BoundingBox;
use crate::error::{CanopyError, CanopyResult};

/// Measured overlap between two extents
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlapReport {
    /// `intersection_area / first_area * 100`
    pub overlap_pct: f64,
    pub intersection_area: f64,
    pub first_area: f64,
}

/// Outcome of [`check_overlap`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlapCheck {
    /// No shared area at all
    Disjoint,
    Overlapping { report: OverlapReport, passed: bool },
}

impl OverlapCheck {
    pub fn passed(&self) -> bool {
        matches!(self, OverlapCheck::Overlapping { passed: true, .. })
    }

    pub fn report(&self) -> Option<&OverlapReport> {
        match self {
            OverlapCheck::Disjoint => None,
            OverlapCheck::Overlapping { report, .. } => Some(report),
        }
    }
}

/// Overlap of `second` relative to `first`; `None` when disjoint.
///
/// A zero-area `first` (a point or a line) is 100% covered when it lies
/// entirely inside `second`; otherwise the percentage is undefined and
/// `DegenerateExtentError` is returned.
pub fn measure_overlap(
    first: &BoundingBox,
    second: &BoundingBox,
) -> CanopyResult<Option<OverlapReport>> {
    let Some(intersection) = first.intersection(second) else {
        return Ok(None);
    };

    let first_area = first.area();
    let intersection_area = intersection.area();

    if first_area <= 0.0 {
        if intersection == *first {
            return Ok(Some(OverlapReport {
                overlap_pct: 100.0,
                intersection_area,
                first_area,
            }));
        }
        return Err(CanopyError::DegenerateExtent);
    }

    Ok(Some(OverlapReport {
        overlap_pct: intersection_area / first_area * 100.0,
        intersection_area,
        first_area,
    }))
}

/// Full overlap check with ledger reporting.
///
/// - disjoint: one `critical` entry regardless of `min_overlap_pct`
/// - partial (< 100%): one `warning` entry, even if the check passes
/// - passes iff `overlap_pct >= min_overlap_pct`
pub fn check_overlap(
    engine: &dyn GeoEngine,
    first: &SpatialData,
    second: &SpatialData,
    min_overlap_pct: f64,
    ledger: &mut WarningsLedger,
) -> CanopyResult<OverlapCheck> {
    let first_box = engine.bounding_box(first)?;
    let second_box = engine.bounding_box(second)?;

    let Some(report) = measure_overlap(&first_box, &second_box)? else {
        ledger.critical(format!(
            "Extents do not overlap: first {:?} vs second {:?}",
            first_box.as_array(),
            second_box.as_array()
        ));
        return Ok(OverlapCheck::Disjoint);
    };

    if report.overlap_pct < 100.0 {
        ledger.warning(format!(
            "Partial overlap: {:.1}% of the first extent is covered by the second",
            report.overlap_pct
        ));
    }

    let passed = report.overlap_pct >= min_overlap_pct;
    tracing::debug!(
        overlap_pct = report.overlap_pct,
        min_overlap_pct,
        passed,
        "overlap measured"
    );
    Ok(OverlapCheck::Overlapping { report, passed })
}

/// `true` iff the extents overlap by at least `min_overlap_pct` of the first
pub fn validate_spatial_overlap(
    engine: &dyn GeoEngine,
    first: &SpatialData,
    second: &SpatialData,
    min_overlap_pct: f64,
    ledger: &mut WarningsLedger,
) -> CanopyResult<bool> {
    check_overlap(engine, first, second, min_overlap_pct, ledger).map(|c| c.passed())
}
