//! Three-part version numbers and the total order over them.
//!
//! `"1.2"` parses as `1.2.0`; missing trailing components are zero.
//! Pre-release and build metadata are not supported.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VersionError;

/// A `MAJOR.MINOR.PATCH` version. Field order gives the derived `Ord`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// The version of a consumer that has never been migrated.
    pub const ZERO: Version = Version::new(0, 0, 0);

    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(VersionError::Empty);
        }

        let mut parts = [0u64; 3];
        for (idx, component) in s.split('.').enumerate() {
            if idx >= parts.len() {
                return Err(VersionError::TooManyComponents {
                    input: s.to_string(),
                });
            }
            parts[idx] = parse_component(s, component)?;
        }

        Ok(Version::new(parts[0], parts[1], parts[2]))
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.to_string()
    }
}

fn parse_component(input: &str, component: &str) -> Result<u64, VersionError> {
    let invalid = || VersionError::InvalidComponent {
        input: input.to_string(),
        component: component.to_string(),
    };
    // `u64::from_str` accepts a leading '+', which is not a version digit.
    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    component.parse().map_err(|_| invalid())
}

/// Compare two version strings component-wise.
///
/// Malformed input is returned as an error rather than coerced.
pub fn compare(a: &str, b: &str) -> Result<Ordering, VersionError> {
    let a: Version = a.parse()?;
    let b: Version = b.parse()?;
    Ok(a.cmp(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0.0.10", "0.0.10", Ordering::Equal)]
    #[case("0.0.9", "0.0.10", Ordering::Less)]
    #[case("0.0.1", "0.1.0", Ordering::Less)]
    #[case("1.0.0", "0.9.9", Ordering::Greater)]
    #[case("1.2", "1.2.0", Ordering::Equal)]
    #[case("1", "1.0.0", Ordering::Equal)]
    #[case("0.10.0", "0.9.0", Ordering::Greater)]
    fn compare_orders_component_wise(
        #[case] a: &str,
        #[case] b: &str,
        #[case] expected: Ordering,
    ) {
        assert_eq!(compare(a, b).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("1.x.0")]
    #[case("1..0")]
    #[case("+1.0.0")]
    #[case("1.0.0-beta")]
    #[case("1.2.3.4")]
    #[case("99999999999999999999.0.0")]
    fn malformed_versions_are_rejected(#[case] input: &str) {
        assert!(input.parse::<Version>().is_err(), "{input:?} should not parse");
        assert!(compare(input, "0.0.0").is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        let v = Version::new(3, 14, 159);
        assert_eq!(v.to_string(), "3.14.159");
        assert_eq!("3.14.159".parse::<Version>().unwrap(), v);
    }

    #[test]
    fn serde_uses_the_dotted_string_form() {
        let json = serde_json::to_string(&Version::new(0, 4, 0)).unwrap();
        assert_eq!(json, "\"0.4.0\"");
        let back: Version = serde_json::from_str("\"0.4\"").unwrap();
        assert_eq!(back, Version::new(0, 4, 0));
        assert!(serde_json::from_str::<Version>("\"nope\"").is_err());
    }

    #[test]
    fn too_many_components_error_mentions_input() {
        let err = "1.2.3.4".parse::<Version>().unwrap_err();
        assert!(matches!(err, VersionError::TooManyComponents { .. }));
        assert!(err.to_string().contains("1.2.3.4"));
    }

    #[test]
    fn zero_is_the_default() {
        assert_eq!(Version::default(), Version::ZERO);
        assert_eq!(Version::ZERO.to_string(), "0.0.0");
    }
}
