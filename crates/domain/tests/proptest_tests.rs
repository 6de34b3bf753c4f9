//! Property-based tests for domain value objects
//!
//! These tests use proptest to verify invariants across many random inputs.

use domain::ServiceError;
use domain::value_objects::{GeoLocation, Timezone};
use proptest::prelude::*;

// ============================================================================
// GeoLocation Property Tests
// ============================================================================

mod geo_location_tests {
    use super::*;

    proptest! {
        #[test]
        fn valid_coordinates_create_location(
            lat in -90.0f64..=90.0f64,
            lon in -180.0f64..=180.0f64
        ) {
            let result = GeoLocation::new(lat, lon);
            prop_assert!(result.is_ok());

            let loc = result.unwrap();
            prop_assert!((loc.latitude() - lat).abs() < f64::EPSILON);
            prop_assert!((loc.longitude() - lon).abs() < f64::EPSILON);
        }

        #[test]
        fn invalid_latitude_rejected(
            lat in prop_oneof![
                (-1000.0f64..-90.1f64),
                (90.1f64..1000.0f64)
            ],
            lon in -180.0f64..=180.0f64
        ) {
            let result = GeoLocation::new(lat, lon);
            prop_assert!(result.is_err());
        }

        #[test]
        fn invalid_longitude_rejected(
            lat in -90.0f64..=90.0f64,
            lon in prop_oneof![
                (-1000.0f64..-180.1f64),
                (180.1f64..1000.0f64)
            ]
        ) {
            let result = GeoLocation::new(lat, lon);
            prop_assert!(result.is_err());
        }
    }
}

// ============================================================================
// Timezone Property Tests
// ============================================================================

mod timezone_tests {
    use super::*;

    proptest! {
        #[test]
        fn lowercase_garbage_is_rejected(name in "[a-z]{3,12}/[a-z]{3,12}") {
            // IANA names are capitalized; all-lowercase paths never resolve
            prop_assert!(Timezone::parse(&name).is_err());
        }
    }

    #[test]
    fn every_known_zone_round_trips_by_name() {
        for tz in chrono_tz::TZ_VARIANTS.iter().take(50) {
            let parsed = Timezone::parse(tz.name()).expect("known zone");
            assert_eq!(parsed.as_str(), tz.name());
        }
    }
}

// ============================================================================
// ServiceError Property Tests
// ============================================================================

mod service_error_tests {
    use super::*;

    proptest! {
        #[test]
        fn status_and_message_are_preserved(
            message in "[ -~]{0,64}",
            status in 100u16..600u16
        ) {
            let err = ServiceError::with_status(message.clone(), status);
            prop_assert_eq!(err.status(), status);
            prop_assert_eq!(err.message(), message.as_str());
            prop_assert_eq!(err.is_client_error(), (400..500).contains(&status));
        }
    }
}
