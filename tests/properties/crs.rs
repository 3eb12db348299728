//! Property tests for CRS canonicalization.

use proptest::prelude::*;

use canopy::Crs;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Canonicalizing a canonical descriptor changes nothing.
    #[test]
    fn property_canonicalization_is_idempotent(raw in "\\PC{0,24}") {
        let once = Crs::new(&raw);
        let twice = Crs::new(once.as_str());
        prop_assert_eq!(once, twice);
    }

    /// PROPERTY: Authority codes compare case-insensitively and ignore padding.
    #[test]
    fn property_authority_case_is_ignored(
        authority in "[A-Za-z]{2,6}",
        code in "[0-9]{1,6}",
        pad in " {0,3}",
    ) {
        let upper = Crs::new(format!("{}:{}", authority.to_ascii_uppercase(), code));
        let mixed = Crs::new(format!("{}{}:{}{}", pad, authority.to_ascii_lowercase(), code, pad));
        prop_assert_eq!(upper, mixed);
    }

    /// PROPERTY: OGC URNs collapse to the same descriptor as the short form.
    #[test]
    fn property_urn_matches_short_form(code in "[0-9]{1,6}") {
        let urn = Crs::new(format!("urn:ogc:def:crs:EPSG::{}", code));
        prop_assert_eq!(urn, Crs::new(format!("EPSG:{}", code)));
    }
}
