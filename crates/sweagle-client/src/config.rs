use std::path::{
    Path,
    PathBuf,
};

use reqwest::Url;
use sweagle_api::{
    ServiceEndpoint,
    StepError,
    StepResult,
};

pub(crate) const VALIDATE_PATH: &str = "/api/v1/data/include/validate";
pub(crate) const UPLOAD_PATH: &str = "/api/v1/data/bulk-operations/dataLoader/upload";
pub(crate) const SNAPSHOT_PATH: &str = "/api/v1/data/include/snapshot/byname";
pub(crate) const EXPORT_PATH: &str = "/api/v1/tenant/metadata-parser/parse";

/// Builds a Sweagle API URL one query parameter at a time
pub(crate) struct ServiceUrl {
    url: Url,
}

impl ServiceUrl {
    pub(crate) fn new(endpoint: &ServiceEndpoint, path: &str) -> StepResult<Self> {
        let raw = format!("{}{}", endpoint.base_url(), path);
        let url = Url::parse(&raw)
            .map_err(|e| StepError::InvalidConfig(format!("Invalid Sweagle URL {raw}: {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(StepError::InvalidConfig(format!(
                "Sweagle URL must use http or https, got {}",
                url.scheme()
            )));
        }

        Ok(Self { url })
    }

    /// Appends a form-encoded parameter
    pub(crate) fn param(mut self, key: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(key, value);
        self
    }

    /// Appends a parameter whose spaces must reach the service as `%20`
    pub(crate) fn spaced_param(mut self, key: &str, value: &str) -> Self {
        let pair = format!("{}={}", encode_spaced(key), encode_spaced(value));
        let query = match self.url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{pair}"),
            _ => pair,
        };
        self.url.set_query(Some(&query));
        self
    }

    pub(crate) fn into_url(self) -> Url {
        self.url
    }
}

/// Percent-encodes a query value for the snapshot endpoint, which rejects the
/// form encoding of a space (`+`). A literal `+` becomes `%2B`.
pub(crate) fn encode_spaced(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Resolves a step's file location against the build workspace. Absolute
/// locations are kept as they are.
pub(crate) fn resolve_workspace_path(workspace: &Path, file_location: &Path) -> PathBuf {
    if file_location.is_absolute() {
        file_location.to_path_buf()
    } else {
        workspace.join(file_location)
    }
}
