use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};
use std::sync::Arc;

use chrono::{
    DateTime,
    Utc,
};
use serde::Serialize;
use sweagle_api::{
    BuildListener,
    EnvSecret,
    LogLevel,
    SecretProvider,
    ServiceEndpoint,
    StaticSecret,
    StepResult,
};
use sweagle_client::{
    http_client,
    ConfigService,
    SweagleClient,
};
use tokio_util::sync::CancellationToken;

use crate::config::{
    StepConfig,
    StepFileConfig,
};

pub const WORKSPACE_ENV: &str = "WORKSPACE";

/// Workspace root from the build environment, else the current directory
pub fn workspace_root(env: &HashMap<String, String>) -> PathBuf {
    env.get(WORKSPACE_ENV)
        .filter(|w| !w.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum StepOutcome {
    Succeeded,
    /// Failed, logged, and the build went on
    Continued,
    Aborted(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub action: &'static str,
    pub outcome: StepOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl StepRecord {
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuildResult {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub records: Vec<StepRecord>,
    pub result: BuildResult,
}

impl RunReport {
    pub fn aborted(&self) -> Option<&StepRecord> {
        self.records
            .iter()
            .find(|r| matches!(r.outcome, StepOutcome::Aborted(_)))
    }

    pub fn summary(&self) -> String {
        let count = |wanted: fn(&StepOutcome) -> bool| {
            self.records.iter().filter(|r| wanted(&r.outcome)).count()
        };
        format!(
            "{:?}: {} step(s) run, {} succeeded, {} continued after failure, {} aborted",
            self.result,
            self.records.len(),
            count(|o| matches!(o, StepOutcome::Succeeded)),
            count(|o| matches!(o, StepOutcome::Continued)),
            count(|o| matches!(o, StepOutcome::Aborted(_))),
        )
    }
}

/// Forwards to the build listener and counts error lines, so a step that
/// soft-failed but still returned a body is recorded as continued.
struct CountingListener {
    inner: Arc<dyn BuildListener>,
    errors: AtomicUsize,
}

impl BuildListener for CountingListener {
    fn log(&self, level: LogLevel, message: &str) {
        if level == LogLevel::Error {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
        self.inner.log(level, message);
    }
}

/// Runs configured steps in order against one Sweagle tenant
pub struct StepRunner {
    service: ConfigService,
    listener: Arc<CountingListener>,
}

impl StepRunner {
    pub fn new(
        config: &StepFileConfig, env: &HashMap<String, String>, listener: Arc<dyn BuildListener>,
        cancel: CancellationToken,
    ) -> StepResult<Self> {
        let client = http_client::build_client(config.service.timeout())?;

        let secret: Arc<dyn SecretProvider> = match &config.service.api_key {
            Some(key) => Arc::new(StaticSecret::new(key.clone())),
            None => Arc::new(EnvSecret::new(
                config.service.api_key_env_or_default(),
                env.clone(),
            )),
        };

        let listener = Arc::new(CountingListener {
            inner: listener,
            errors: AtomicUsize::new(0),
        });

        let client = SweagleClient::new(client, ServiceEndpoint::new(&config.service.url), secret);
        let service = ConfigService::new(client, listener.clone(), workspace_root(env))
            .with_cancellation(cancel);

        Ok(Self { service, listener })
    }

    pub async fn run(&self, steps: &[StepConfig]) -> RunReport {
        let mut records = Vec::with_capacity(steps.len());

        for (index, step) in steps.iter().enumerate() {
            tracing::debug!(
                index,
                action = step.action(),
                mark_failed = step.mark_failed(),
                "Running step"
            );

            let errors_before = self.listener.errors.load(Ordering::Relaxed);
            let started_at = Utc::now();
            let result = self.run_step(step).await;
            let finished_at = Utc::now();
            let soft_failed = self.listener.errors.load(Ordering::Relaxed) > errors_before;

            let outcome = match result {
                Ok(Some(body)) => {
                    tracing::debug!(index, bytes = body.len(), "Step response: {}", body);
                    if soft_failed {
                        StepOutcome::Continued
                    } else {
                        StepOutcome::Succeeded
                    }
                }
                Ok(None) => StepOutcome::Continued,
                Err(e) => {
                    tracing::error!(index, action = step.action(), "Step aborted the build: {}", e);
                    StepOutcome::Aborted(e.to_string())
                }
            };

            let aborted = matches!(outcome, StepOutcome::Aborted(_));
            records.push(StepRecord {
                index,
                action: step.action(),
                outcome,
                started_at,
                finished_at,
            });
            if aborted {
                break;
            }
        }

        let result = if records
            .iter()
            .any(|r| matches!(r.outcome, StepOutcome::Aborted(_)))
        {
            BuildResult::Failure
        } else {
            BuildResult::Success
        };

        RunReport { records, result }
    }

    async fn run_step(&self, step: &StepConfig) -> StepResult<Option<String>> {
        match step {
            StepConfig::Validate(s) => self.service.validate_config(&s.to_request()).await,
            StepConfig::Upload(s) => self.service.upload_config(&s.to_request()).await,
            StepConfig::Snapshot(s) => self.service.snapshot_config(&s.to_request()).await,
            StepConfig::Export(s) => self.service.export_config(&s.to_request()).await,
        }
    }
}
