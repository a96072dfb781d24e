//! Release versions.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::TriageError;

/// A release identifier such as `7.11.0.CR1`.
///
/// Parsing tolerates a product prefix (`AMQ 7.11.0.GA`) and a qualifier
/// chain, where the last dotted token wins (`7.11.0.GA.CR1` has qualifier
/// `CR1`). Serialized as its display string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReleaseVersion {
    major: u32,
    minor: u32,
    patch: u32,
    qualifier: String,
}

impl ReleaseVersion {
    pub fn new(major: u32, minor: u32, patch: u32, qualifier: impl Into<String>) -> Self {
        Self {
            major,
            minor,
            patch,
            qualifier: qualifier.into(),
        }
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn patch(&self) -> u32 {
        self.patch
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// Same version with a different qualifier.
    pub fn with_qualifier(&self, qualifier: impl Into<String>) -> Self {
        Self {
            qualifier: qualifier.into(),
            ..self.clone()
        }
    }

    /// z-stream releases need explicit release-tracking issues.
    pub fn is_z_stream(&self) -> bool {
        self.patch > 0
    }

    /// Order by major, minor and patch only.
    pub fn cmp_without_qualifier(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }

    /// Name used for tracker target releases, e.g. `AMQ 7.11.0.GA`.
    pub fn release_name(&self, product: &str) -> String {
        format!("{} {}.{}.{}.GA", product, self.major, self.minor, self.patch)
    }

    /// Summary prefix for release-tracking clones, e.g. `[7.11]`.
    pub fn summary_prefix(&self) -> String {
        format!("[{}.{}]", self.major, self.minor)
    }
}

impl FromStr for ReleaseVersion {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TriageError::InvalidRelease(s.to_string());

        let start = s.find(|c: char| c.is_ascii_digit()).ok_or_else(invalid)?;
        let mut tokens = s[start..].trim().split('.');

        let mut number = || -> Result<u32, TriageError> {
            tokens
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or_else(invalid)
        };
        let (major, minor, patch) = (number()?, number()?, number()?);

        let qualifier = tokens.filter(|t| !t.is_empty()).last().unwrap_or_default();

        Ok(Self::new(major, minor, patch, qualifier))
    }
}

impl TryFrom<String> for ReleaseVersion {
    type Error = TriageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReleaseVersion> for String {
    fn from(value: ReleaseVersion) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.qualifier.is_empty() {
            write!(f, ".{}", self.qualifier)?;
        }
        Ok(())
    }
}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_without_qualifier(other)
            .then_with(|| compare_qualifiers(&self.qualifier, &other.qualifier))
    }
}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Alphabetic stem first, then trailing number: `CR2 < CR10 < GA`.
fn compare_qualifiers(a: &str, b: &str) -> Ordering {
    let split = |q: &str| {
        let stem = q.trim_end_matches(|c: char| c.is_ascii_digit());
        let number: u64 = q[stem.len()..].parse().unwrap_or(0);
        (stem.to_string(), number)
    };
    split(a).cmp(&split(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> ReleaseVersion {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_with_product_prefix() {
        let release = v("AMQ 7.11.0.GA");
        assert_eq!(
            (release.major(), release.minor(), release.patch()),
            (7, 11, 0)
        );
        assert_eq!(release.qualifier(), "GA");
    }

    #[test]
    fn test_last_qualifier_wins() {
        let candidate = v("AMQ 7.11.1.GA.CR1");
        assert_eq!(candidate.qualifier(), "CR1");
        assert_eq!(candidate.to_string(), "7.11.1.CR1");
        assert!(candidate.is_z_stream());
        assert_eq!(candidate.release_name("AMQ"), "AMQ 7.11.1.GA");
        assert_eq!(candidate.summary_prefix(), "[7.11]");
    }

    #[test]
    fn test_parse_without_qualifier() {
        let release = v("2.16.0");
        assert_eq!(release.qualifier(), "");
        assert_eq!(release.to_string(), "2.16.0");
        assert!(!release.is_z_stream());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("Future GA".parse::<ReleaseVersion>().is_err());
        assert!("7.x.0".parse::<ReleaseVersion>().is_err());
        assert!("7.11".parse::<ReleaseVersion>().is_err());
    }

    #[test]
    fn test_ordering_numeric_then_qualifier() {
        assert!(v("7.10.0.GA") < v("7.11.0.GA"));
        assert!(v("7.9.3.GA") < v("7.10.0.CR1"));
        assert!(v("7.11.0.CR2") < v("7.11.0.CR10"));
        assert!(v("7.11.0.CR10") < v("7.11.0.GA"));
    }

    #[test]
    fn test_compare_without_qualifier() {
        assert_eq!(
            v("7.11.0.CR1").cmp_without_qualifier(&v("AMQ 7.11.0.GA")),
            Ordering::Equal
        );
        assert_ne!(v("7.11.0.CR1"), v("7.11.0.GA"));
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&v("7.11.0.CR1")).unwrap();
        assert_eq!(json, "\"7.11.0.CR1\"");
        let back: ReleaseVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v("7.11.0.CR1"));
    }
}
