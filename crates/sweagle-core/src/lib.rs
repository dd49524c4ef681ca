//! Step files and the step runner
//!
//! Loads a TOML step file with `${VAR}` expansion against the build
//! environment, then runs its steps in order through the config service.

pub mod config;
pub mod logging;
pub mod runner;

pub use config::{
    ConfigLoadError,
    StepConfig,
    StepFileConfig,
    StepFileLoader,
};
pub use runner::{
    workspace_root,
    BuildResult,
    RunReport,
    StepOutcome,
    StepRecord,
    StepRunner,
};
