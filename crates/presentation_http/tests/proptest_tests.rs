//! Property-based tests for parameter rules

use presentation_http::{ParamDescriptor, Rule};
use proptest::prelude::*;

fn check(param: &ParamDescriptor, value: &str) -> bool {
    tokio_test::block_on(param.validate(Some(value))).is_ok()
}

fn latitude() -> ParamDescriptor {
    ParamDescriptor::query("lat")
        .required()
        .rule(Rule::range(-90.0, 90.0))
}

proptest! {
    #[test]
    fn range_accepts_every_value_within_bounds(lat in -90.0f64..=90.0) {
        prop_assert!(check(&latitude(), &lat.to_string()));
    }

    #[test]
    fn range_ignores_surrounding_whitespace(lat in -90i32..=90) {
        let padded = format!("  {lat} ");
        prop_assert!(check(&latitude(), &padded));
    }

    #[test]
    fn range_rejects_values_beyond_bounds(excess in 1e-6f64..1e9, negative in any::<bool>()) {
        let lat = if negative { -90.0 - excess } else { 90.0 + excess };
        prop_assert!(!check(&latitude(), &lat.to_string()));
    }

    #[test]
    fn range_rejects_non_numeric_input(value in "[a-zA-Z_]{1,12}") {
        prop_assert!(!check(&latitude(), &value));
    }

    #[test]
    fn pattern_matches_whole_value_only(digits in "[0-9]{1,20}", suffix in "[a-z/.]{1,5}") {
        let station = ParamDescriptor::path("stationId")
            .rule(Rule::regex(r"\d{1,20}").unwrap());

        prop_assert!(check(&station, &digits));
        let with_suffix = format!("{digits}{suffix}");
        prop_assert!(!check(&station, &with_suffix));
    }
}
