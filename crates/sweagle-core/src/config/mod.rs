pub mod interpolation;
pub mod loader;
pub mod schema;
pub mod validation;

pub use interpolation::{
    interpolate,
    InterpolationError,
};
pub use loader::{
    ConfigLoadError,
    ConfigLoadResult,
    StepFileLoader,
    CONFIG_PATH_ENV,
};
pub use schema::{
    ExportStep,
    ServiceConfig,
    SnapshotStep,
    StepConfig,
    StepFileConfig,
    UploadStep,
    ValidateStep,
    CONFIG_FILE_NAME,
    DEFAULT_API_KEY_ENV,
};
pub use validation::{
    ConfigValidator,
    ValidationResult,
};
