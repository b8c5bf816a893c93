use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::HandleResolutionMethod;
use crate::http::build_client;
use crate::syntax;

/// Bodies longer than this are not read further; no valid DID comes close
const MAX_BODY_LEN: usize = 4096;

/// Fetches `https://<handle>/.well-known/atproto-did`
pub struct WellKnownHandleResolver {
    client: Client,
    scheme: String,
}

impl WellKnownHandleResolver {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: build_client(timeout, "text/plain"),
            scheme: "https".to_string(),
        }
    }

    /// Fetch over a different scheme, e.g. plain `http` for a local test host
    pub fn with_scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_string();
        self
    }

    /// Response body, truncated just past `MAX_BODY_LEN`
    async fn fetch(&self, handle: &str) -> Result<Vec<u8>, reqwest::Error> {
        let url = format!("{}://{handle}/.well-known/atproto-did", self.scheme);
        let mut response = self.client.get(&url).send().await?.error_for_status()?;

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
            if body.len() > MAX_BODY_LEN {
                break;
            }
        }
        Ok(body)
    }
}

impl Default for WellKnownHandleResolver {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl HandleResolutionMethod for WellKnownHandleResolver {
    async fn attempt(&self, handle: &str) -> Option<String> {
        match self.fetch(handle).await {
            Ok(body) if body.len() > MAX_BODY_LEN => {
                debug!(handle = %handle, "Well-known body too large");
                None
            }
            Ok(body) => {
                let body = String::from_utf8_lossy(&body);
                let did = body.trim();
                if syntax::is_did(did) {
                    Some(did.to_string())
                } else {
                    debug!(handle = %handle, "Well-known body is not a DID");
                    None
                }
            }
            Err(e) => {
                debug!(handle = %handle, error = %e, "Well-known handle lookup failed");
                None
            }
        }
    }
}
