use serde::Deserialize;
use sweagle_api::{
    StepError,
    StepResult,
    ValidationResult,
};

#[derive(Debug, Deserialize)]
pub(crate) struct ValidationReport {
    pub summary: ValidationSummary,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ValidationSummary {
    pub errors: u64,
    pub warnings: u64,
}

/// Reads `summary.errors` and `summary.warnings` out of a validation
/// response. Any other field is ignored.
pub(crate) fn parse_validation(body: String) -> StepResult<ValidationResult> {
    let report: ValidationReport = serde_json::from_str(&body).map_err(|e| {
        StepError::MalformedResponse(format!(
            "validation response has no integer summary.errors/summary.warnings: {e}"
        ))
    })?;

    Ok(ValidationResult {
        errors: report.summary.errors,
        warnings: report.summary.warnings,
        body,
    })
}
