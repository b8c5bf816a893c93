use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::HandleResolutionMethod;
use crate::http::build_client;
use crate::syntax;
use crate::types::ResolveHandleResponse;

pub const DEFAULT_PDS_ENDPOINT: &str = "https://bsky.social";

/// Asks a server to resolve the handle via `com.atproto.identity.resolveHandle`
pub struct XrpcHandleResolver {
    client: Client,
    service_url: String,
}

impl XrpcHandleResolver {
    pub fn new(service_url: &str, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout, "application/json"),
            service_url: service_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, handle: &str) -> Result<ResolveHandleResponse, reqwest::Error> {
        let url = format!(
            "{}/xrpc/com.atproto.identity.resolveHandle",
            self.service_url
        );
        self.client
            .get(&url)
            .query(&[("handle", handle)])
            .send()
            .await?
            .error_for_status()?
            .json::<ResolveHandleResponse>()
            .await
    }
}

impl Default for XrpcHandleResolver {
    fn default() -> Self {
        Self::new(DEFAULT_PDS_ENDPOINT, Duration::from_secs(10))
    }
}

#[async_trait]
impl HandleResolutionMethod for XrpcHandleResolver {
    async fn attempt(&self, handle: &str) -> Option<String> {
        if !syntax::is_domain_handle(handle) {
            debug!(handle = %handle, "Not a domain, skipping resolveHandle");
            return None;
        }

        match self.fetch(handle).await {
            Ok(ResolveHandleResponse { did: Some(did) }) if syntax::is_did(&did) => Some(did),
            Ok(_) => {
                debug!(handle = %handle, "resolveHandle response has no valid DID");
                None
            }
            Err(e) => {
                debug!(handle = %handle, error = %e, "resolveHandle failed");
                None
            }
        }
    }
}
