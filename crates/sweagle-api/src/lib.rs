pub mod error;
pub mod listener;
pub mod policy;
pub mod secret;
pub mod types;

pub use error::{
    StepError,
    StepResult,
    ThresholdKind,
};
pub use listener::{
    BuildListener,
    LogLevel,
    MemoryListener,
    TracingListener,
};
pub use policy::FailurePolicy;
pub use secret::{
    EnvSecret,
    SecretProvider,
    StaticSecret,
};
pub use types::{
    ExportRequest,
    ServiceEndpoint,
    SnapshotRequest,
    Threshold,
    Thresholds,
    UploadRequest,
    ValidationRequest,
    ValidationResult,
};
