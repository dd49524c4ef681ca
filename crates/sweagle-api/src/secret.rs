use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use secrecy::{
    ExposeSecret,
    SecretString,
};

use crate::error::{
    StepError,
    StepResult,
};

/// Hands out the Sweagle API token at request time.
///
/// Implementations must never log the value. Callers expose it only to build
/// the `Authorization` header and drop it right after.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    async fn api_token(&self) -> StepResult<SecretString>;
}

/// A token known up front
pub struct StaticSecret {
    token: SecretString,
}

impl StaticSecret {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }
}

impl fmt::Debug for StaticSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticSecret")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl SecretProvider for StaticSecret {
    async fn api_token(&self) -> StepResult<SecretString> {
        if self.token.expose_secret().trim().is_empty() {
            return Err(StepError::InvalidConfig(
                "Sweagle API token is empty".to_string(),
            ));
        }
        Ok(SecretString::from(self.token.expose_secret().to_string()))
    }
}

/// Reads the token from a named entry of the build environment
pub struct EnvSecret {
    var: String,
    env: HashMap<String, String>,
}

impl EnvSecret {
    pub fn new(var: impl Into<String>, env: HashMap<String, String>) -> Self {
        Self {
            var: var.into(),
            env,
        }
    }
}

impl fmt::Debug for EnvSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvSecret").field("var", &self.var).finish()
    }
}

#[async_trait]
impl SecretProvider for EnvSecret {
    async fn api_token(&self) -> StepResult<SecretString> {
        match self.env.get(&self.var) {
            Some(value) if !value.trim().is_empty() => Ok(SecretString::from(value.clone())),
            _ => Err(StepError::InvalidConfig(format!(
                "Environment variable {} does not hold a Sweagle API token",
                self.var
            ))),
        }
    }
}
