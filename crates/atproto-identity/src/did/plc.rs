use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{document_from_response, DidResolver};
use crate::error::{IdentityError, Result};
use crate::http::build_client;
use crate::syntax;
use crate::types::DidDocument;

pub const DEFAULT_PLC_DIRECTORY: &str = "https://plc.directory";

/// Resolves `did:plc` identities against a PLC directory
pub struct PlcDidResolver {
    client: Client,
    directory: String,
}

impl PlcDidResolver {
    pub fn new(directory: &str, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout, "application/json"),
            directory: directory.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for PlcDidResolver {
    fn default() -> Self {
        Self::new(DEFAULT_PLC_DIRECTORY, Duration::from_secs(10))
    }
}

#[async_trait]
impl DidResolver for PlcDidResolver {
    async fn resolve(&self, did: &str) -> Result<DidDocument> {
        let method = syntax::did_method(did)?;
        if !self.supports(method) {
            return Err(IdentityError::UnsupportedDidMethod(method.to_string()));
        }

        let url = format!("{}/{did}", self.directory);
        debug!(did = %did, url = %url, "Fetching DID document from PLC directory");

        document_from_response(did, self.client.get(&url).send().await).await
    }

    fn supports(&self, method: &str) -> bool {
        method == "plc"
    }
}
