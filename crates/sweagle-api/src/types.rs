use std::fmt;
use std::path::PathBuf;

use serde::{
    Deserialize,
    Serialize,
};

use crate::policy::FailurePolicy;

/// Upper bound on validation errors or warnings.
///
/// Configured as an integer where `-1` means no limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Threshold {
    #[default]
    Unlimited,
    Max(u64),
}

impl Threshold {
    pub const UNLIMITED_SENTINEL: i64 = -1;

    pub fn exceeded_by(&self, count: u64) -> bool {
        match self {
            Threshold::Unlimited => false,
            Threshold::Max(max) => count > *max,
        }
    }
}

impl TryFrom<i64> for Threshold {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            Threshold::UNLIMITED_SENTINEL => Ok(Threshold::Unlimited),
            v if v >= 0 => Ok(Threshold::Max(v as u64)),
            v => Err(format!(
                "threshold must be -1 (no limit) or a non-negative count, got {v}"
            )),
        }
    }
}

impl From<Threshold> for i64 {
    fn from(threshold: Threshold) -> Self {
        match threshold {
            Threshold::Unlimited => Threshold::UNLIMITED_SENTINEL,
            Threshold::Max(max) => i64::try_from(max).unwrap_or(i64::MAX),
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Unlimited => write!(f, "unlimited"),
            Threshold::Max(max) => write!(f, "{max}"),
        }
    }
}

/// Error and warning limits applied to a validation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Thresholds {
    pub errors: Threshold,
    pub warnings: Threshold,
}

/// Where the Sweagle tenant lives. The credential is supplied separately by a
/// [`crate::SecretProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    base_url: String,
}

impl ServiceEndpoint {
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: base_url.as_ref().trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Clone)]
pub struct ValidationRequest {
    pub mds_name: String,
    pub thresholds: Thresholds,
    pub show_results: bool,
    pub policy: FailurePolicy,
}

/// Counts parsed out of a validation response, plus the raw body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: u64,
    pub warnings: u64,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Relative paths resolve against the workspace root
    pub file_location: PathBuf,
    pub node_path: String,
    pub format: String,
    pub policy: FailurePolicy,
}

#[derive(Debug, Clone)]
pub struct SnapshotRequest {
    pub mds_name: String,
    pub description: String,
    pub tag: String,
    pub policy: FailurePolicy,
}

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub mds_name: String,
    pub exporter: String,
    pub args: String,
    pub format: String,
    /// Relative paths resolve against the workspace root
    pub file_location: PathBuf,
    pub policy: FailurePolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_sentinel() {
        assert_eq!(Threshold::try_from(-1).unwrap(), Threshold::Unlimited);
        assert_eq!(Threshold::try_from(0).unwrap(), Threshold::Max(0));
        assert!(Threshold::try_from(-2).is_err());
        assert_eq!(i64::from(Threshold::Unlimited), -1);
    }

    #[test]
    fn test_unlimited_never_exceeded() {
        assert!(!Threshold::Unlimited.exceeded_by(0));
        assert!(!Threshold::Unlimited.exceeded_by(u64::MAX));
    }

    #[test]
    fn test_max_exceeded_strictly_above() {
        let threshold = Threshold::Max(3);
        assert!(!threshold.exceeded_by(3));
        assert!(threshold.exceeded_by(4));
    }

    #[test]
    fn test_threshold_deserializes_from_integer() {
        let thresholds: Thresholds =
            serde_json::from_str(r#"{"errors": 0, "warnings": -1}"#).unwrap();
        assert_eq!(thresholds.errors, Threshold::Max(0));
        assert_eq!(thresholds.warnings, Threshold::Unlimited);

        assert!(serde_json::from_str::<Thresholds>(r#"{"errors": -5, "warnings": 1}"#).is_err());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let endpoint = ServiceEndpoint::new(" https://tenant.sweagle.com/ ");
        assert_eq!(endpoint.base_url(), "https://tenant.sweagle.com");
    }
}
