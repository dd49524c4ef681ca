use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which validation counter crossed its threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdKind {
    Errors,
    Warnings,
}

impl fmt::Display for ThresholdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdKind::Errors => write!(f, "error"),
            ThresholdKind::Warnings => write!(f, "warning"),
        }
    }
}

/// Step error types
#[derive(Error, Debug)]
pub enum StepError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("{}: {count} exceeds {kind} threshold: {max}", kind_label(.kind))]
    ThresholdExceeded {
        kind: ThresholdKind,
        count: u64,
        max: u64,
    },

    #[error("Filesystem error on {}: {message}", .path.display())]
    Filesystem { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Step cancelled")]
    Cancelled,
}

fn kind_label(kind: &ThresholdKind) -> &'static str {
    match kind {
        ThresholdKind::Errors => "Errors",
        ThresholdKind::Warnings => "Warnings",
    }
}

impl StepError {
    pub fn filesystem(path: impl Into<PathBuf>, err: impl fmt::Display) -> Self {
        StepError::Filesystem {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Errors that abort the build even when the step is configured to
    /// continue on failure.
    pub fn is_always_fatal(&self) -> bool {
        matches!(
            self,
            StepError::MalformedResponse(_) | StepError::InvalidConfig(_) | StepError::Cancelled
        )
    }
}

pub type StepResult<T> = Result<T, StepError>;

impl From<serde_json::Error> for StepError {
    fn from(err: serde_json::Error) -> Self {
        StepError::MalformedResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_message_carries_count_and_max() {
        let err = StepError::ThresholdExceeded {
            kind: ThresholdKind::Errors,
            count: 5,
            max: 3,
        };
        assert_eq!(err.to_string(), "Errors: 5 exceeds error threshold: 3");

        let err = StepError::ThresholdExceeded {
            kind: ThresholdKind::Warnings,
            count: 7,
            max: 0,
        };
        assert_eq!(err.to_string(), "Warnings: 7 exceeds warning threshold: 0");
    }

    #[test]
    fn test_filesystem_message_names_path() {
        let err = StepError::filesystem("/tmp/out.json", "permission denied");
        assert_eq!(
            err.to_string(),
            "Filesystem error on /tmp/out.json: permission denied"
        );
    }

    #[test]
    fn test_always_fatal() {
        assert!(StepError::Cancelled.is_always_fatal());
        assert!(StepError::MalformedResponse("x".into()).is_always_fatal());
        assert!(!StepError::Transport("x".into()).is_always_fatal());
    }
}
