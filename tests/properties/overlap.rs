//! Property tests for overlap validation.

use proptest::prelude::*;
use serde_json::Map;

use canopy::domain::entities::{Feature, Geometry, SpatialData, VectorData};
use canopy::domain::services::{check_overlap, measure_overlap, OverlapCheck};
use canopy::{BoundingBox, Crs, Level, LocalGeoEngine, WarningsLedger};

fn rect() -> impl Strategy<Value = BoundingBox> {
    (-1e3f64..1e3, -1e3f64..1e3, 0.0f64..500.0, 0.0f64..500.0)
        .prop_map(|(x, y, w, h)| BoundingBox::new(x, y, x + w, y + h))
}

fn polygon_layer(b: &BoundingBox) -> SpatialData {
    let ring = vec![
        [b.xmin, b.ymin],
        [b.xmax, b.ymin],
        [b.xmax, b.ymax],
        [b.xmin, b.ymax],
        [b.xmin, b.ymin],
    ];
    SpatialData::Vector(VectorData::new(
        Crs::new("EPSG:3857"),
        vec![Feature::new(Some(Geometry::Polygon(vec![ring])), Map::new())],
    ))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        max_global_rejects: 8192,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Measuring overlap never panics and stays within [0, 100].
    #[test]
    fn property_overlap_pct_is_bounded(a in rect(), b in rect()) {
        match measure_overlap(&a, &b) {
            Ok(Some(report)) => {
                prop_assert!(report.overlap_pct >= 0.0);
                prop_assert!(report.overlap_pct <= 100.0 + 1e-9);
            }
            Ok(None) => prop_assert!(a.is_disjoint(&b)),
            Err(err) => {
                prop_assert_eq!(err.code(), "DegenerateExtentError");
                prop_assert_eq!(a.area(), 0.0);
            }
        }
    }

    /// PROPERTY: Disjoint extents record exactly one critical entry whatever the threshold.
    #[test]
    fn property_disjoint_is_always_critical(
        a in rect(),
        gap in 0.001f64..100.0,
        min_overlap_pct in 0.0f64..100.0,
    ) {
        let b = BoundingBox::new(a.xmax + gap, a.ymin, a.xmax + gap + 10.0, a.ymax + 10.0);
        let engine = LocalGeoEngine::new();
        let mut ledger = WarningsLedger::new();

        let check = check_overlap(&engine, &polygon_layer(&a), &polygon_layer(&b), min_overlap_pct, &mut ledger)
            .unwrap();

        prop_assert_eq!(check, OverlapCheck::Disjoint);
        prop_assert!(!check.passed());
        prop_assert_eq!(ledger.count(Some(Level::Critical)), 1);
        prop_assert_eq!(ledger.count(None), 1);
    }

    /// PROPERTY: Overlapping extents never record a critical entry.
    #[test]
    fn property_overlap_is_never_critical(a in rect(), b in rect()) {
        prop_assume!(!a.is_disjoint(&b) && a.area() > 0.0);
        let engine = LocalGeoEngine::new();
        let mut ledger = WarningsLedger::new();

        let check = check_overlap(&engine, &polygon_layer(&a), &polygon_layer(&b), 0.0, &mut ledger)
            .unwrap();

        prop_assert!(check.passed());
        prop_assert!(!ledger.has_critical());
        prop_assert!(ledger.count(Some(Level::Warning)) <= 1);
    }
}
