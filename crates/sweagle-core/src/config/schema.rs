use std::path::PathBuf;
use std::time::Duration;

use serde::{
    Deserialize,
    Serialize,
};
use sweagle_api::{
    ExportRequest,
    FailurePolicy,
    SnapshotRequest,
    Threshold,
    Thresholds,
    UploadRequest,
    ValidationRequest,
};

pub const DEFAULT_API_KEY_ENV: &str = "SWEAGLE_API_KEY";

pub const CONFIG_FILE_NAME: &str = "sweagle.toml";

fn default_true() -> bool {
    true
}

/// A step file: the tenant to talk to and the steps to run, in order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepFileConfig {
    pub service: ServiceConfig,

    #[serde(default)]
    pub steps: Vec<StepConfig>,

    /// Set by the loader when `service.api_key` was written out literally
    #[serde(skip)]
    pub(crate) api_key_literal: bool,
}

#[derive(Clone, Serialize, Deserialize, Default)]
pub struct ServiceConfig {
    pub url: String,

    /// Literal token. Prefer `api_key_env` or `${VAR}` so the token stays out
    /// of the repository.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Build variable holding the token
    #[serde(default)]
    pub api_key_env: Option<String>,

    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_key_env", &self.api_key_env)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn api_key_env_or_default(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum StepConfig {
    Validate(ValidateStep),
    Upload(UploadStep),
    Snapshot(SnapshotStep),
    Export(ExportStep),
}

impl StepConfig {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Validate(_) => "validate",
            Self::Upload(_) => "upload",
            Self::Snapshot(_) => "snapshot",
            Self::Export(_) => "export",
        }
    }

    pub fn mark_failed(&self) -> bool {
        match self {
            Self::Validate(step) => step.mark_failed,
            Self::Upload(step) => step.mark_failed,
            Self::Snapshot(step) => step.mark_failed,
            Self::Export(step) => step.mark_failed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateStep {
    pub mds: String,

    #[serde(default = "default_true")]
    pub mark_failed: bool,

    #[serde(default)]
    pub warn_max: Threshold,

    #[serde(default)]
    pub err_max: Threshold,

    #[serde(default)]
    pub show_results: bool,
}

impl ValidateStep {
    pub fn to_request(&self) -> ValidationRequest {
        ValidationRequest {
            mds_name: self.mds.clone(),
            thresholds: Thresholds {
                errors: self.err_max,
                warnings: self.warn_max,
            },
            show_results: self.show_results,
            policy: FailurePolicy::from(self.mark_failed),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadStep {
    pub file_location: PathBuf,
    pub node_path: String,
    pub format: String,

    #[serde(default = "default_true")]
    pub mark_failed: bool,
}

impl UploadStep {
    pub fn to_request(&self) -> UploadRequest {
        UploadRequest {
            file_location: self.file_location.clone(),
            node_path: self.node_path.clone(),
            format: self.format.clone(),
            policy: FailurePolicy::from(self.mark_failed),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotStep {
    pub mds: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub tag: String,

    #[serde(default = "default_true")]
    pub mark_failed: bool,
}

impl SnapshotStep {
    pub fn to_request(&self) -> SnapshotRequest {
        SnapshotRequest {
            mds_name: self.mds.clone(),
            description: self.description.clone(),
            tag: self.tag.clone(),
            policy: FailurePolicy::from(self.mark_failed),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportStep {
    pub mds: String,
    pub exporter: String,

    #[serde(default)]
    pub args: String,

    pub format: String,
    pub file_location: PathBuf,

    #[serde(default = "default_true")]
    pub mark_failed: bool,
}

impl ExportStep {
    pub fn to_request(&self) -> ExportRequest {
        ExportRequest {
            mds_name: self.mds.clone(),
            exporter: self.exporter.clone(),
            args: self.args.clone(),
            format: self.format.clone(),
            file_location: self.file_location.clone(),
            policy: FailurePolicy::from(self.mark_failed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_defaults() {
        let config: StepFileConfig = toml::from_str(
            r#"
            [service]
            url = "https://tenant.sweagle.com"

            [[steps]]
            action = "validate"
            mds = "infra"

            [[steps]]
            action = "snapshot"
            mds = "infra"
            "#,
        )
        .unwrap();

        let StepConfig::Validate(validate) = &config.steps[0] else {
            panic!("expected a validate step");
        };
        assert!(validate.mark_failed);
        assert_eq!(validate.err_max, Threshold::Unlimited);
        assert_eq!(validate.warn_max, Threshold::Unlimited);
        assert!(!validate.show_results);

        let StepConfig::Snapshot(snapshot) = &config.steps[1] else {
            panic!("expected a snapshot step");
        };
        assert_eq!(snapshot.description, "");
        assert_eq!(snapshot.tag, "");
        assert_eq!(config.service.api_key_env_or_default(), DEFAULT_API_KEY_ENV);
        assert_eq!(config.service.timeout(), None);
    }

    #[test]
    fn test_validate_step_to_request() {
        let step = ValidateStep {
            mds: "infra".to_string(),
            mark_failed: false,
            warn_max: Threshold::Max(10),
            err_max: Threshold::Max(0),
            show_results: true,
        };

        let request = step.to_request();
        assert_eq!(request.thresholds.errors, Threshold::Max(0));
        assert_eq!(request.thresholds.warnings, Threshold::Max(10));
        assert_eq!(request.policy, FailurePolicy::Continue);
        assert!(request.show_results);
    }

    #[test]
    fn test_unknown_action_rejected() {
        let result: Result<StepFileConfig, _> = toml::from_str(
            r#"
            [service]
            url = "https://tenant.sweagle.com"

            [[steps]]
            action = "deploy"
            mds = "infra"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = StepFileConfig {
            service: ServiceConfig {
                url: "https://tenant.sweagle.com".to_string(),
                api_key: Some("secret-token".to_string()),
                api_key_env: None,
                timeout_secs: Some(30),
            },
            steps: Vec::new(),
            api_key_literal: true,
        };

        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("secret-token"));
        assert!(!format!("{config:?}").contains("secret-token"));
    }
}
