//! Lexicon schema resolution.
//!
//! An NSID's authority publishes a `did=` TXT record at `_lexicon.<domain>`,
//! where `<domain>` is the authority with its segments reversed
//! (`app.bsky.feed.post` → `_lexicon.feed.bsky.app`). The schema itself is a
//! `com.atproto.lexicon.schema` record, keyed by the NSID, in that DID's repo.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{IdentityError, Result};
use crate::handle::{did_from_txt_records, HickoryTxtResolver, TxtLookup};
use crate::http::build_client;
use crate::resolver::IdentityResolver;
use crate::syntax;
use crate::types::GetRecordResponse;

const SCHEMA_COLLECTION: &str = "com.atproto.lexicon.schema";

pub struct LexiconResolver {
    identity: Arc<IdentityResolver>,
    dns: Arc<dyn TxtLookup>,
    client: Client,
}

impl LexiconResolver {
    pub fn new(identity: Arc<IdentityResolver>, dns: Arc<dyn TxtLookup>, timeout: Duration) -> Self {
        Self {
            identity,
            dns,
            client: build_client(timeout, "application/json"),
        }
    }

    /// Resolver using the system DNS configuration
    pub fn with_system_dns(identity: Arc<IdentityResolver>, timeout: Duration) -> Self {
        Self::new(identity, Arc::new(HickoryTxtResolver::new(timeout)), timeout)
    }

    /// Fetch the schema for `nsid`, returned as the raw record value
    pub async fn resolve(&self, nsid: &str) -> Result<Value> {
        let authority = syntax::nsid_authority(nsid)?;

        let did = self
            .authority_did(authority)
            .await
            .ok_or_else(|| IdentityError::lexicon_failed(nsid, "No DID found for NSID"))?;

        let pds = self
            .identity
            .resolve_pds(&did, true)
            .await?
            .ok_or_else(|| IdentityError::lexicon_failed(nsid, "No PDS endpoint found"))?;

        self.fetch_schema(&pds, &did, nsid).await
    }

    /// DID published for an NSID authority, if any
    pub async fn authority_did(&self, authority: &str) -> Option<String> {
        let domain = authority.split('.').rev().collect::<Vec<_>>().join(".");
        let hostname = format!("_lexicon.{domain}");

        match self.dns.txt_records(&hostname).await {
            Ok(records) => did_from_txt_records(&records),
            Err(e) => {
                debug!(hostname = %hostname, error = %e, "Lexicon DNS lookup failed");
                None
            }
        }
    }

    async fn fetch_schema(&self, pds: &str, did: &str, nsid: &str) -> Result<Value> {
        let url = format!("{}/xrpc/com.atproto.repo.getRecord", pds.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .query(&[("repo", did), ("collection", SCHEMA_COLLECTION), ("rkey", nsid)])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| IdentityError::lexicon_failed(nsid, e.to_string()))?;

        let record: GetRecordResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::lexicon_failed(nsid, e.to_string()))?;

        match record.value {
            Some(value) if value.get("lexicon").is_some() => Ok(value),
            _ => Err(IdentityError::lexicon_failed(nsid, "Invalid schema response")),
        }
    }
}
