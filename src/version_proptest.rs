//! Property-based tests for release tag resolution.
//!
//! These tests use proptest to generate random tags and verify that the
//! tag grammar invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::error::Error;
    use crate::version::VersionSpec;
    use proptest::prelude::*;

    fn resolve(tag: &str) -> Result<String, Error> {
        VersionSpec::from_tag(tag)?
            .resolve("")
            .map(|v| v.to_string())
    }

    /// A version component: leading digits plus an optional alphanumeric
    /// suffix, never looking like a terminal marker.
    fn numeric_component() -> impl Strategy<Value = String> {
        "[0-9]{1,3}([ab][0-9]{1,2}|esr)?"
    }

    fn components() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(numeric_component(), 1..5)
    }

    fn terminal_marker() -> impl Strategy<Value = String> {
        prop_oneof![
            "[0-9]{1,20}".prop_map(|n| format!("BUILD{}", n)),
            Just("RELEASE".to_string()),
        ]
    }

    proptest! {
        /// Property: a single BUILD<n> marker always ends up as +build<n>,
        /// digits kept as written
        #[test]
        fn build_marker_becomes_build_suffix(
            product in "[A-Z]{3,12}",
            parts in components(),
            build in "[0-9]{1,20}",
        ) {
            let tag = format!("{}_{}_BUILD{}", product, parts.join("_"), build);
            let version = resolve(&tag).unwrap();
            let expected_suffix = format!("+build{}", build);
            prop_assert!(version.ends_with(&expected_suffix), "{} -> {}", tag, version);
            prop_assert_eq!(version.matches("+build").count(), 1);
        }

        /// Property: without a BUILD marker there is never a build suffix
        #[test]
        fn no_build_marker_no_build_suffix(
            product in "[A-Z]{3,12}",
            parts in components(),
            release in any::<bool>(),
        ) {
            let mut tag = format!("{}_{}", product, parts.join("_"));
            if release {
                tag.push_str("_RELEASE");
            }
            let version = resolve(&tag).unwrap();
            prop_assert!(!version.contains("+build"), "{} -> {}", tag, version);
        }

        /// Property: anything after a terminal marker is rejected
        #[test]
        fn component_after_terminal_marker_is_invalid(
            product in "[A-Z]{3,12}",
            parts in components(),
            marker in terminal_marker(),
            trailing in prop_oneof![numeric_component(), terminal_marker()],
        ) {
            let tag = format!("{}_{}_{}_{}", product, parts.join("_"), marker, trailing);
            let is_invalid_tag = matches!(VersionSpec::from_tag(&tag), Err(Error::InvalidTag { .. }));
            prop_assert!(is_invalid_tag, "{} should be invalid", tag);
        }

        /// Property: the number of dot-separated fields before the build
        /// suffix equals the number of version components
        #[test]
        fn components_are_dot_joined(
            product in "[A-Z]{3,12}",
            parts in components(),
        ) {
            let tag = format!("{}_{}_RELEASE", product, parts.join("_"));
            let version = resolve(&tag).unwrap();
            prop_assert_eq!(version.split('.').count(), parts.len());
        }

        /// Property: resolution is deterministic
        #[test]
        fn resolution_is_deterministic(tag in "[A-Z]{2,6}(_[0-9A-Za-z]{1,5}){0,5}") {
            let first = resolve(&tag).map_err(|e| e.to_string());
            let second = resolve(&tag).map_err(|e| e.to_string());
            prop_assert_eq!(first, second);
        }
    }
}
