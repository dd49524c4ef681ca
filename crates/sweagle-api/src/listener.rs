//! Build log sink
//!
//! Steps report progress through a [`BuildListener`] instead of writing to a
//! console directly, so the host decides where the lines end up.

use std::sync::Mutex;

use serde::{
    Deserialize,
    Serialize,
};

/// Severity of a build log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Error,
}

/// Receives the progress lines a step writes to the build log
pub trait BuildListener: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

/// Forwards build log lines to `tracing` under the `sweagle::build` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingListener;

impl BuildListener for TracingListener {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(target: "sweagle::build", "{}", message),
            LogLevel::Info => tracing::info!(target: "sweagle::build", "{}", message),
            LogLevel::Error => tracing::error!(target: "sweagle::build", "{}", message),
        }
    }
}

/// Keeps every line in memory, in order
#[derive(Debug, Default)]
pub struct MemoryListener {
    lines: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }

    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.messages_at(level)
            .iter()
            .any(|message| message.contains(needle))
    }
}

impl BuildListener for MemoryListener {
    fn log(&self, level: LogLevel, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, message.to_string()));
        }
    }
}
