use serde::{
    Deserialize,
    Serialize,
};

use crate::error::{
    StepError,
    StepResult,
};
use crate::listener::BuildListener;

/// What a step does when one of its calls fails.
///
/// Chosen per step from the host's `markFailed` flag: `Abort` stops the build,
/// `Continue` writes the failure to the build log and lets the next step run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    #[default]
    Abort,
    Continue,
}

impl From<bool> for FailurePolicy {
    fn from(mark_failed: bool) -> Self {
        if mark_failed {
            FailurePolicy::Abort
        } else {
            FailurePolicy::Continue
        }
    }
}

impl FailurePolicy {
    pub fn marks_failed(&self) -> bool {
        matches!(self, FailurePolicy::Abort)
    }

    /// Routes a failure: returned as-is when it must abort the build, logged
    /// at error level otherwise.
    pub fn escalate(&self, listener: &dyn BuildListener, err: StepError) -> StepResult<()> {
        if self.marks_failed() || err.is_always_fatal() {
            return Err(err);
        }
        listener.error(&err.to_string());
        Ok(())
    }
}
