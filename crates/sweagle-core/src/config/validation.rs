use std::path::Path;

use sweagle_api::Threshold;

use super::schema::{
    ServiceConfig,
    StepConfig,
    StepFileConfig,
};

/// Upload formats the Sweagle data loader understands
pub const KNOWN_UPLOAD_FORMATS: &[&str] = &["json", "yaml", "yml", "xml", "properties", "ini"];

#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigError>,
    pub warnings: Vec<ConfigWarning>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>, code: ConfigErrorCode) {
        self.errors.push(ConfigError {
            field: field.into(),
            message: message.into(),
            code,
        });
    }

    pub fn add_warning(
        &mut self, field: impl Into<String>, message: impl Into<String>, code: ConfigWarningCode,
    ) {
        self.warnings.push(ConfigWarning {
            field: field.into(),
            message: message.into(),
            code,
        });
    }

    pub fn summary(&self) -> String {
        if self.errors.is_empty() && self.warnings.is_empty() {
            "Step file is valid".to_string()
        } else {
            format!(
                "{} error(s), {} warning(s)",
                self.errors.len(),
                self.warnings.len()
            )
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigError {
    pub field: String,
    pub message: String,
    pub code: ConfigErrorCode,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.field, self.message, self.code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorCode {
    MissingRequired,
    InvalidValue,
}

impl std::fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired => write!(f, "MISSING_REQUIRED"),
            Self::InvalidValue => write!(f, "INVALID_VALUE"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub code: ConfigWarningCode,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.field, self.message, self.code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigWarningCode {
    NoTokenConfigured,
    PlainTextToken,
    UnknownFormat,
    UnusedSetting,
}

impl std::fmt::Display for ConfigWarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoTokenConfigured => write!(f, "NO_TOKEN"),
            Self::PlainTextToken => write!(f, "PLAIN_TEXT_TOKEN"),
            Self::UnknownFormat => write!(f, "UNKNOWN_FORMAT"),
            Self::UnusedSetting => write!(f, "UNUSED"),
        }
    }
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &StepFileConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        Self::validate_service(&config.service, config.api_key_literal, &mut result);

        if config.steps.is_empty() {
            result.add_warning(
                "steps",
                "No steps configured, nothing will be sent to Sweagle",
                ConfigWarningCode::UnusedSetting,
            );
        }

        for (index, step) in config.steps.iter().enumerate() {
            Self::validate_step(index, step, &mut result);
        }

        result
    }

    fn validate_service(service: &ServiceConfig, api_key_literal: bool, result: &mut ValidationResult) {
        let url = service.url.trim();
        if url.is_empty() {
            result.add_error(
                "service.url",
                "Sweagle tenant URL is required",
                ConfigErrorCode::MissingRequired,
            );
        } else if !(url.starts_with("http://") || url.starts_with("https://")) {
            result.add_error(
                "service.url",
                format!("Sweagle tenant URL must start with http:// or https://, got '{url}'"),
                ConfigErrorCode::InvalidValue,
            );
        }

        match (&service.api_key, &service.api_key_env) {
            (Some(_), Some(_)) => result.add_warning(
                "service.api_key_env",
                "Both api_key and api_key_env are set; api_key wins",
                ConfigWarningCode::UnusedSetting,
            ),
            (Some(_), None) if api_key_literal => result.add_warning(
                "service.api_key",
                "API token is written in plain text; use api_key_env or ${VAR} instead",
                ConfigWarningCode::PlainTextToken,
            ),
            (None, None) => result.add_warning(
                "service.api_key_env",
                format!(
                    "No token configured, falling back to {}",
                    service.api_key_env_or_default()
                ),
                ConfigWarningCode::NoTokenConfigured,
            ),
            _ => {}
        }

        if service.timeout_secs == Some(0) {
            result.add_error(
                "service.timeout_secs",
                "Timeout must be at least one second; leave it out for no timeout",
                ConfigErrorCode::InvalidValue,
            );
        }
    }

    fn validate_step(index: usize, step: &StepConfig, result: &mut ValidationResult) {
        let prefix = format!("steps[{index}]");
        let require = |result: &mut ValidationResult, field: &str, value: &str| {
            if value.trim().is_empty() {
                result.add_error(
                    format!("{prefix}.{field}"),
                    format!("{} step requires {field}", step.action()),
                    ConfigErrorCode::MissingRequired,
                );
            }
        };

        match step {
            StepConfig::Validate(validate) => {
                require(result, "mds", &validate.mds);
                if validate.show_results
                    && validate.err_max == Threshold::Unlimited
                    && validate.warn_max == Threshold::Unlimited
                {
                    result.add_warning(
                        format!("{prefix}.show_results"),
                        "show_results has no effect without err_max or warn_max",
                        ConfigWarningCode::UnusedSetting,
                    );
                }
            }
            StepConfig::Upload(upload) => {
                require(result, "file_location", &path_text(&upload.file_location));
                require(result, "node_path", &upload.node_path);
                require(result, "format", &upload.format);
                let format = upload.format.trim().to_lowercase();
                if !format.is_empty() && !KNOWN_UPLOAD_FORMATS.contains(&format.as_str()) {
                    result.add_warning(
                        format!("{prefix}.format"),
                        format!(
                            "Unknown upload format '{}'. Known formats: {:?}",
                            upload.format, KNOWN_UPLOAD_FORMATS
                        ),
                        ConfigWarningCode::UnknownFormat,
                    );
                }
            }
            StepConfig::Snapshot(snapshot) => {
                require(result, "mds", &snapshot.mds);
            }
            StepConfig::Export(export) => {
                require(result, "mds", &export.mds);
                require(result, "exporter", &export.exporter);
                require(result, "format", &export.format);
                require(result, "file_location", &path_text(&export.file_location));
            }
        }
    }
}

fn path_text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl StepFileConfig {
    pub fn validate(&self) -> ValidationResult {
        ConfigValidator::validate(self)
    }
}
