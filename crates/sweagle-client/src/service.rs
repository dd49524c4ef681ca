//! The four build-step operations
//!
//! Each operation logs its progress to the build listener, calls the API once
//! and routes any failure through the step's [`FailurePolicy`]. The result is
//! `Some(body)` on success and `None` when a failure was logged and the build
//! goes on.

use std::future::Future;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use sweagle_api::*;
use tokio_util::sync::CancellationToken;

use crate::client::SweagleClient;
use crate::{
    config,
    types,
};

/// Runs the Sweagle build steps against one tenant
pub struct ConfigService {
    client: SweagleClient,
    listener: Arc<dyn BuildListener>,
    workspace: PathBuf,
    cancel: CancellationToken,
}

impl ConfigService {
    pub fn new(
        client: SweagleClient, listener: Arc<dyn BuildListener>, workspace: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            listener,
            workspace: workspace.into(),
            cancel: CancellationToken::new(),
        }
    }

    /// Ties every call to the enclosing job's cancellation
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn listener(&self) -> &dyn BuildListener {
        self.listener.as_ref()
    }

    async fn cancellable<T>(&self, call: impl Future<Output = StepResult<T>>) -> StepResult<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(StepError::Cancelled),
            result = call => result,
        }
    }

    /// Turns a call result into a step result under the given policy
    fn settle(&self, policy: FailurePolicy, result: StepResult<String>) -> StepResult<Option<String>> {
        match result {
            Ok(body) => Ok(Some(body)),
            Err(err) => {
                policy.escalate(self.listener(), err)?;
                Ok(None)
            }
        }
    }

    /// Validates a configuration data set and checks its error and warning
    /// counts against the request's thresholds.
    ///
    /// A response without integer `summary.errors` and `summary.warnings`
    /// aborts the build whatever the policy.
    pub async fn validate_config(&self, request: &ValidationRequest) -> StepResult<Option<String>> {
        self.listener()
            .info(&format!("Checking MDS Validity: {}", request.mds_name));

        let result = self
            .cancellable(self.client.validate(&request.mds_name))
            .await;
        let Some(body) = self.settle(request.policy, result)? else {
            return Ok(None);
        };

        let result = types::parse_validation(body)?;
        self.listener().info(&format!(
            "{} contains {} warnings and {} errors.",
            request.mds_name, result.warnings, result.errors
        ));

        enforce_thresholds(&result, request, self.listener())?;

        Ok(Some(result.body))
    }

    /// Uploads a workspace file into the data model under `node_path`
    pub async fn upload_config(&self, request: &UploadRequest) -> StepResult<Option<String>> {
        self.listener().info(&format!(
            "Uploading Config from {} to {}",
            request.file_location.display(),
            request.node_path
        ));

        let path = config::resolve_workspace_path(&self.workspace, &request.file_location);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                request
                    .policy
                    .escalate(self.listener(), StepError::filesystem(&path, e))?;
                return Ok(None);
            }
        };

        let result = self
            .cancellable(
                self.client
                    .upload(&request.node_path, &request.format, content),
            )
            .await;
        self.settle(request.policy, result)
    }

    /// Snapshots the pending data of a configuration data set
    pub async fn snapshot_config(&self, request: &SnapshotRequest) -> StepResult<Option<String>> {
        self.listener().info(&format!(
            "Creating Snapshot from pending data for {}",
            request.mds_name
        ));

        let result = self
            .cancellable(
                self.client
                    .snapshot(&request.mds_name, &request.description, &request.tag),
            )
            .await;
        self.settle(request.policy, result)
    }

    /// Exports a configuration data set and writes the response verbatim to
    /// the target file. Nothing is written when the export call fails.
    pub async fn export_config(&self, request: &ExportRequest) -> StepResult<Option<String>> {
        self.listener().info(&format!(
            "Exporting from {} with exporter {} in format {} at {}",
            request.mds_name,
            request.exporter,
            request.format,
            self.client.endpoint().base_url()
        ));

        let result = self
            .cancellable(self.client.export(
                &request.mds_name,
                &request.exporter,
                &request.args,
                &request.format,
            ))
            .await;
        let Some(body) = self.settle(request.policy, result)? else {
            return Ok(None);
        };

        let path = config::resolve_workspace_path(&self.workspace, &request.file_location);
        if let Err(e) = write_export(&path, &body).await {
            request.policy.escalate(self.listener(), e)?;
        }

        Ok(Some(body))
    }
}

async fn write_export(path: &Path, body: &str) -> StepResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StepError::filesystem(parent, e))?;
    }

    tokio::fs::write(path, body.as_bytes())
        .await
        .map_err(|e| StepError::filesystem(path, e))?;

    tracing::debug!("Wrote {} bytes to {}", body.len(), path.display());
    Ok(())
}

/// Checks errors then warnings. Under `Abort` the first exceeded threshold
/// ends the check, so at most one fatal condition is reported.
pub fn enforce_thresholds(
    result: &ValidationResult, request: &ValidationRequest, listener: &dyn BuildListener,
) -> StepResult<()> {
    let checks = [
        (ThresholdKind::Errors, result.errors, request.thresholds.errors),
        (ThresholdKind::Warnings, result.warnings, request.thresholds.warnings),
    ];

    for (kind, count, threshold) in checks {
        let Threshold::Max(max) = threshold else {
            continue;
        };
        if count <= max {
            continue;
        }

        if request.show_results {
            listener.debug(&result.body);
        }
        request
            .policy
            .escalate(listener, StepError::ThresholdExceeded { kind, count, max })?;
    }

    Ok(())
}
