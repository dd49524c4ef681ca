use std::sync::Once;
use std::time::Duration;

use reqwest::Client;
use sweagle_api::{
    StepError,
    StepResult,
};

static CRYPTO_PROVIDER: Once = Once::new();

const USER_AGENT: &str = concat!("sweagle-steps/", env!("CARGO_PKG_VERSION"));

fn install_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        // Fails only when the host already installed a provider, which is fine.
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Builds the HTTP client shared by the steps of one build.
///
/// No timeout unless one is given; reqwest defaults otherwise.
pub fn build_client(timeout: Option<Duration>) -> StepResult<Client> {
    install_crypto_provider();

    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|e| StepError::InvalidConfig(format!("Failed to build HTTP client: {e}")))
}
