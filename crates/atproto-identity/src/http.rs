use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use tracing::warn;

const USER_AGENT: &str = concat!("atproto-identity/", env!("CARGO_PKG_VERSION"));

/// HTTP client shared by one resolver, with its own request timeout
pub(crate) fn build_client(timeout: Duration, accept: &'static str) -> Client {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(accept));

    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to build configured HTTP client, using defaults");
            Client::new()
        })
}
