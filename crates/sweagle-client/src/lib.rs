//! Sweagle config service client
//!
//! Calls a Sweagle tenant from a CI build to:
//! - Validate a configuration data set against error/warning thresholds
//! - Upload a workspace file into the data model
//! - Snapshot pending data
//! - Export a data set through a server-side exporter into a file
//!
//! # Architecture
//!
//! - `client` - Sweagle API calls, one request per call
//! - `service` - Build-step operations with thresholds and failure policy
//! - `types` - API response types
//! - `config` - URL construction and workspace paths
//! - `http_client` - HTTP client construction
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sweagle_api::*;
//! use sweagle_client::{
//!     http_client,
//!     ConfigService,
//!     SweagleClient,
//! };
//!
//! # async fn run() -> StepResult<()> {
//! let client = SweagleClient::new(
//!     http_client::build_client(None)?,
//!     ServiceEndpoint::new("https://tenant.sweagle.com"),
//!     Arc::new(StaticSecret::new("api-token")),
//! );
//! let service = ConfigService::new(client, Arc::new(TracingListener), "/workspace");
//!
//! service
//!     .validate_config(&ValidationRequest {
//!         mds_name: "infra".to_string(),
//!         thresholds: Thresholds::default(),
//!         show_results: true,
//!         policy: FailurePolicy::Abort,
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
pub mod http_client;
mod service;
mod types;

pub use client::SweagleClient;
pub use service::{
    enforce_thresholds,
    ConfigService,
};
