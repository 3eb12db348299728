//! Property tests for the warnings ledger.

use proptest::prelude::*;

use canopy::{Level, WarningsLedger};

fn level_name() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("info"), Just("warning"), Just("critical")]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: N additions at a level are counted as N, in insertion order.
    #[test]
    fn property_count_matches_additions(levels in proptest::collection::vec(level_name(), 0..40)) {
        let mut ledger = WarningsLedger::new();
        for (i, level) in levels.iter().enumerate() {
            ledger.add(level, format!("entry {}", i)).unwrap();
        }

        prop_assert_eq!(ledger.count(None), levels.len());
        for level in [Level::Info, Level::Warning, Level::Critical] {
            let expected = levels.iter().filter(|l| **l == level.as_str()).count();
            prop_assert_eq!(ledger.count(Some(level)), expected);
        }
        for (i, entry) in ledger.entries().iter().enumerate() {
            prop_assert_eq!(&entry.message, &format!("entry {}", i));
            prop_assert_eq!(entry.level.as_str(), levels[i]);
        }
    }

    /// PROPERTY: has_critical is exactly "some critical entry was recorded".
    #[test]
    fn property_has_critical_iff_critical_count(levels in proptest::collection::vec(level_name(), 0..20)) {
        let mut ledger = WarningsLedger::new();
        for level in &levels {
            ledger.add(level, "m").unwrap();
        }

        prop_assert_eq!(ledger.has_critical(), ledger.count(Some(Level::Critical)) > 0);
    }

    /// PROPERTY: Unknown levels always fail and leave the ledger untouched.
    #[test]
    fn property_invalid_level_always_fails(level in "\\PC{0,12}") {
        prop_assume!(!matches!(level.as_str(), "info" | "warning" | "critical"));

        let mut ledger = WarningsLedger::new();
        ledger.info("before");
        let err = ledger.add(&level, "rejected").unwrap_err();

        prop_assert_eq!(err.code(), "InvalidLevel");
        prop_assert_eq!(ledger.count(None), 1);
    }
}
