//! Sweagle API client and methods

use std::sync::Arc;

use reqwest::header::{
    HeaderValue,
    ACCEPT,
    AUTHORIZATION,
    CACHE_CONTROL,
    CONTENT_TYPE,
};
use reqwest::{
    Client,
    RequestBuilder,
};
use secrecy::ExposeSecret;
use sweagle_api::{
    SecretProvider,
    ServiceEndpoint,
    StepError,
    StepResult,
};

use crate::config::{
    self,
    ServiceUrl,
};

const ERROR_PREVIEW_LEN: usize = 300;

/// Sweagle API client. Every call is sent once: no retry, no backoff.
pub struct SweagleClient {
    client: Client,
    endpoint: ServiceEndpoint,
    secret: Arc<dyn SecretProvider>,
}

impl SweagleClient {
    pub fn new(client: Client, endpoint: ServiceEndpoint, secret: Arc<dyn SecretProvider>) -> Self {
        Self {
            client,
            endpoint,
            secret,
        }
    }

    pub fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    /// Fetches the token for this request only
    async fn bearer(&self) -> StepResult<HeaderValue> {
        let token = self.secret.api_token().await?;
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|_| {
                StepError::InvalidConfig(
                    "Sweagle API token contains characters not allowed in a header".to_string(),
                )
            })?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// Sends a request and returns the body of a 2xx response
    async fn send(&self, request: RequestBuilder, action: &str) -> StepResult<String> {
        let request = request.header(AUTHORIZATION, self.bearer().await?);

        let response = request
            .send()
            .await
            .map_err(|e| StepError::Transport(format!("Failed to {action}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StepError::Transport(format!("Failed to read {action} response: {e}")))?;

        if status.is_success() {
            return Ok(body);
        }

        let preview = if body.chars().count() > ERROR_PREVIEW_LEN {
            format!("{}...", body.chars().take(ERROR_PREVIEW_LEN).collect::<String>())
        } else {
            body
        };
        tracing::debug!("Sweagle {} failed with HTTP {}", action, status);
        Err(StepError::Transport(format!(
            "Failed to {action}: HTTP {status}: {preview}"
        )))
    }

    /// Runs the server-side validators of a configuration data set
    pub async fn validate(&self, mds_name: &str) -> StepResult<String> {
        let url = ServiceUrl::new(&self.endpoint, config::VALIDATE_PATH)?
            .param("name", mds_name)
            .param("forIncoming", "true")
            .param("withCustomValidations", "true")
            .into_url();

        tracing::debug!("Validating {} at {}", mds_name, url);

        let request = self
            .client
            .get(url)
            .header(ACCEPT, "application/json;charset=UTF-8");

        self.send(request, "validate config").await
    }

    /// Uploads raw configuration content under a node path
    pub async fn upload(&self, node_path: &str, format: &str, content: String) -> StepResult<String> {
        let url = ServiceUrl::new(&self.endpoint, config::UPLOAD_PATH)?
            .param("nodePath", node_path)
            .param("format", format)
            .param("allowDelete", "false")
            .param("autoApprove", "true")
            .param("storeSnapshotResults", "false")
            .param("validationLevel", "error")
            .into_url();

        tracing::debug!("Uploading {} bytes to {}", content.len(), url);

        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "text/plain")
            .header(ACCEPT, "*/*")
            .header(CACHE_CONTROL, "no-cache")
            .body(content);

        self.send(request, "upload config").await
    }

    /// Snapshots the pending data of a configuration data set
    pub async fn snapshot(&self, mds_name: &str, description: &str, tag: &str) -> StepResult<String> {
        let url = ServiceUrl::new(&self.endpoint, config::SNAPSHOT_PATH)?
            .spaced_param("name", mds_name)
            .param("level", "none")
            .spaced_param("description", description)
            .spaced_param("tag", tag)
            .into_url();

        tracing::debug!("Snapshotting {} at {}", mds_name, url);

        let request = self
            .client
            .post(url)
            .header(ACCEPT, "*/*")
            .body(Vec::<u8>::new());

        self.send(request, "snapshot config").await
    }

    /// Renders a configuration data set through a server-side exporter
    pub async fn export(
        &self, mds_name: &str, exporter: &str, args: &str, format: &str,
    ) -> StepResult<String> {
        let url = ServiceUrl::new(&self.endpoint, config::EXPORT_PATH)?.into_url();

        tracing::debug!("Exporting {} with {} at {}", mds_name, exporter, url);

        let form = [
            ("mds", mds_name),
            ("parser", exporter),
            ("args", args),
            ("format", format),
        ];

        let request = self
            .client
            .post(url)
            .header(ACCEPT, "*/*")
            .header(CACHE_CONTROL, "no-cache")
            .form(&form);

        self.send(request, "export config").await
    }
}

#[cfg(test)]
mod tests {
    use mockito::{
        Matcher,
        Server,
    };
    use sweagle_api::StaticSecret;

    use super::*;

    fn client_for(url: &str) -> SweagleClient {
        SweagleClient::new(
            crate::http_client::build_client(None).unwrap(),
            ServiceEndpoint::new(url),
            Arc::new(StaticSecret::new("test-token")),
        )
    }

    #[tokio::test]
    async fn test_validate_sends_bearer_and_accept() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/data/include/validate")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("name".into(), "my mds".into()),
                Matcher::UrlEncoded("forIncoming".into(), "true".into()),
                Matcher::UrlEncoded("withCustomValidations".into(), "true".into()),
            ]))
            .match_header("authorization", "Bearer test-token")
            .match_header("accept", "application/json;charset=UTF-8")
            .with_status(200)
            .with_body(r#"{"summary":{"errors":0,"warnings":0}}"#)
            .create_async()
            .await;

        let body = client_for(&server.url()).validate("my mds").await.unwrap();

        assert_eq!(body, r#"{"summary":{"errors":0,"warnings":0}}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_sends_exact_content_as_text_plain() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/data/bulk-operations/dataLoader/upload")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("nodePath".into(), "infra,db".into()),
                Matcher::UrlEncoded("format".into(), "properties".into()),
                Matcher::UrlEncoded("allowDelete".into(), "false".into()),
                Matcher::UrlEncoded("autoApprove".into(), "true".into()),
                Matcher::UrlEncoded("storeSnapshotResults".into(), "false".into()),
                Matcher::UrlEncoded("validationLevel".into(), "error".into()),
            ]))
            .match_header("content-type", "text/plain")
            .match_header("authorization", "Bearer test-token")
            .match_body(Matcher::Exact("k=v".to_string()))
            .with_status(200)
            .with_body("uploaded")
            .create_async()
            .await;

        let body = client_for(&server.url())
            .upload("infra,db", "properties", "k=v".to_string())
            .await
            .unwrap();

        assert_eq!(body, "uploaded");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_snapshot_encodes_description_and_tag() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/data/include/snapshot/byname")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("name".into(), "infra".into()),
                Matcher::UrlEncoded("level".into(), "none".into()),
                Matcher::UrlEncoded("description".into(), "a b".into()),
                Matcher::UrlEncoded("tag".into(), "x+y".into()),
            ]))
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_body("snapshot created")
            .create_async()
            .await;

        let body = client_for(&server.url())
            .snapshot("infra", "a b", "x+y")
            .await
            .unwrap();

        assert_eq!(body, "snapshot created");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_snapshot_name_spaces_are_percent_encoded() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/data/include/snapshot/byname")
            .match_query(Matcher::Regex(
                r"^name=my%20mds&level=none&description=&tag=$".to_string(),
            ))
            .with_status(200)
            .with_body("snapshot created")
            .create_async()
            .await;

        let body = client_for(&server.url())
            .snapshot("my mds", "", "")
            .await
            .unwrap();

        assert_eq!(body, "snapshot created");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_export_posts_form() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/tenant/metadata-parser/parse")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_header("authorization", "Bearer test-token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("mds".into(), "infra".into()),
                Matcher::UrlEncoded("parser".into(), "all".into()),
                Matcher::UrlEncoded("args".into(), "prod,eu".into()),
                Matcher::UrlEncoded("format".into(), "json".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"db":{"host":"x"}}"#)
            .create_async()
            .await;

        let body = client_for(&server.url())
            .export("infra", "all", "prod,eu", "json")
            .await
            .unwrap();

        assert_eq!(body, r#"{"db":{"host":"x"}}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_is_transport_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/data/include/validate")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("invalid token")
            .create_async()
            .await;

        let err = client_for(&server.url())
            .validate("infra")
            .await
            .unwrap_err();

        match err {
            StepError::Transport(message) => {
                assert!(message.contains("401"));
                assert!(message.contains("invalid token"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let err = client_for("http://127.0.0.1:1")
            .snapshot("infra", "d", "t")
            .await
            .unwrap_err();

        assert!(matches!(err, StepError::Transport(_)));
    }

    #[tokio::test]
    async fn test_token_never_in_error_message() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/tenant/metadata-parser/parse")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let err = client_for(&server.url())
            .export("infra", "all", "", "json")
            .await
            .unwrap_err();

        assert!(!err.to_string().contains("test-token"));
    }
}
