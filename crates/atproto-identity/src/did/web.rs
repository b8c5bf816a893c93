use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{document_from_response, DidResolver};
use crate::error::{IdentityError, Result};
use crate::http::build_client;
use crate::syntax;
use crate::types::DidDocument;

/// Resolves `did:web` identities from the domain they name
pub struct WebDidResolver {
    client: Client,
    scheme: String,
}

impl WebDidResolver {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: build_client(timeout, "application/json"),
            scheme: "https".to_string(),
        }
    }

    /// Fetch over a different scheme, e.g. plain `http` for a local test host
    pub fn with_scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_string();
        self
    }

    /// URL of the document for a `did:web` DID.
    ///
    /// - `did:web:example.com` → `https://example.com/.well-known/did.json`
    /// - `did:web:example.com:user:alice` → `https://example.com/user/alice/did.json`
    /// - `did:web:localhost%3A8080` → `https://localhost:8080/.well-known/did.json`
    pub fn document_url(&self, did: &str) -> Result<String> {
        let identifier = syntax::did_identifier(did)?;
        let mut segments = identifier.split(':');

        let host = segments
            .next()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| IdentityError::InvalidDidFormat(did.to_string()))?
            .replace("%3A", ":")
            .replace("%3a", ":");

        let path: Vec<&str> = segments.collect();
        let path = if path.is_empty() {
            ".well-known/did.json".to_string()
        } else {
            format!("{}/did.json", path.join("/"))
        };

        Ok(format!("{}://{host}/{path}", self.scheme))
    }
}

impl Default for WebDidResolver {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl DidResolver for WebDidResolver {
    async fn resolve(&self, did: &str) -> Result<DidDocument> {
        let method = syntax::did_method(did)?;
        if !self.supports(method) {
            return Err(IdentityError::UnsupportedDidMethod(method.to_string()));
        }

        let url = self.document_url(did)?;
        debug!(did = %did, url = %url, "Fetching did:web document");

        document_from_response(did, self.client.get(&url).send().await).await
    }

    fn supports(&self, method: &str) -> bool {
        method == "web"
    }
}
