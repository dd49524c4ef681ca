use std::collections::HashMap;
use std::path::{
    Path,
    PathBuf,
};

use thiserror::Error;

use super::interpolation::{
    interpolate_toml,
    referenced_variables,
    InterpolationError,
};
use super::schema::{
    StepFileConfig,
    CONFIG_FILE_NAME,
};

pub const CONFIG_PATH_ENV: &str = "SWEAGLE_CONFIG_PATH";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Step file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read step file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Build variable interpolation failed: {0}")]
    InterpolationError(#[from] InterpolationError),

    #[error("Invalid step file: {0}")]
    InvalidConfig(String),
}

pub type ConfigLoadResult<T> = Result<T, ConfigLoadError>;

pub struct StepFileLoader;

impl StepFileLoader {
    /// Resolves the step file: explicit path, then `SWEAGLE_CONFIG_PATH`, then
    /// `sweagle.toml` in the workspace, then the user config dir. Falls back to
    /// the workspace path so a missing file is reported against it.
    pub fn discover_config_path(
        explicit: Option<&Path>, env: &HashMap<String, String>, workspace: &Path,
    ) -> PathBuf {
        if let Some(path) = explicit {
            tracing::debug!("Using step file from arguments: {}", path.display());
            return path.to_path_buf();
        }

        if let Some(path) = env.get(CONFIG_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            tracing::debug!("Using step file from {}: {}", CONFIG_PATH_ENV, path);
            return PathBuf::from(path);
        }

        let in_workspace = workspace.join(CONFIG_FILE_NAME);
        if in_workspace.exists() {
            tracing::debug!("Using workspace step file: {}", in_workspace.display());
            return in_workspace;
        }

        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("sweagle").join("config.toml");
            if path.exists() {
                tracing::debug!("Using user step file: {}", path.display());
                return path;
            }
        }

        in_workspace
    }

    pub fn load(path: &Path, env: &HashMap<String, String>) -> ConfigLoadResult<StepFileConfig> {
        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, env)
    }

    pub fn parse(content: &str, env: &HashMap<String, String>) -> ConfigLoadResult<StepFileConfig> {
        let mut value: toml::Value = toml::from_str(content)?;

        let api_key_literal = value
            .get("service")
            .and_then(|service| service.get("api_key"))
            .and_then(|key| key.as_str())
            .is_some_and(|key| referenced_variables(key).is_empty());

        interpolate_toml(&mut value, env)?;

        let mut config: StepFileConfig = value.try_into().map_err(|e| {
            ConfigLoadError::InvalidConfig(format!("Failed to deserialize step file: {}", e))
        })?;
        config.api_key_literal = api_key_literal;

        let validation = config.validate();
        for warning in &validation.warnings {
            tracing::warn!("{}", warning);
        }
        if !validation.is_ok() {
            let errors: Vec<String> = validation.errors.iter().map(ToString::to_string).collect();
            return Err(ConfigLoadError::InvalidConfig(errors.join("; ")));
        }

        tracing::debug!(
            url = %config.service.url,
            steps = config.steps.len(),
            "Loaded step file"
        );

        Ok(config)
    }
}
