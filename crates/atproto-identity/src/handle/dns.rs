use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use tracing::debug;

use super::HandleResolutionMethod;
use crate::syntax;

/// DNS TXT lookups
#[async_trait]
pub trait TxtLookup: Send + Sync {
    /// Every TXT record published at `hostname`, one string per record
    async fn txt_records(&self, hostname: &str) -> io::Result<Vec<String>>;
}

/// [`TxtLookup`] backed by hickory's tokio resolver
pub struct HickoryTxtResolver {
    resolver: TokioAsyncResolver,
}

impl HickoryTxtResolver {
    /// Use the system resolver configuration, falling back to hickory's defaults
    pub fn new(timeout: Duration) -> Self {
        let (config, mut opts) = hickory_resolver::system_conf::read_system_conf()
            .unwrap_or_else(|e| {
                debug!(error = %e, "No system DNS configuration, using defaults");
                (ResolverConfig::default(), ResolverOpts::default())
            });
        opts.timeout = timeout;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

impl Default for HickoryTxtResolver {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl TxtLookup for HickoryTxtResolver {
    async fn txt_records(&self, hostname: &str) -> io::Result<Vec<String>> {
        let fqdn = if hostname.ends_with('.') {
            hostname.to_string()
        } else {
            format!("{hostname}.")
        };

        let lookup = self.resolver.txt_lookup(fqdn).await.map_err(io::Error::other)?;

        Ok(lookup
            .iter()
            .map(|txt| {
                txt.txt_data()
                    .iter()
                    .map(|chunk| String::from_utf8_lossy(chunk))
                    .collect::<String>()
            })
            .collect())
    }
}

/// Find the DID in a set of TXT records: the first `did=` entry holding a valid DID
pub(crate) fn did_from_txt_records(records: &[String]) -> Option<String> {
    records
        .iter()
        .filter_map(|txt| txt.strip_prefix("did="))
        .find(|did| syntax::is_did(did))
        .map(str::to_string)
}

/// Looks for a `did=` TXT record at `_atproto.<handle>`
pub struct DnsHandleResolver {
    dns: Arc<dyn TxtLookup>,
}

impl DnsHandleResolver {
    pub fn new(dns: Arc<dyn TxtLookup>) -> Self {
        Self { dns }
    }
}

impl Default for DnsHandleResolver {
    fn default() -> Self {
        Self::new(Arc::new(HickoryTxtResolver::default()))
    }
}

#[async_trait]
impl HandleResolutionMethod for DnsHandleResolver {
    async fn attempt(&self, handle: &str) -> Option<String> {
        let hostname = format!("_atproto.{handle}");

        match self.dns.txt_records(&hostname).await {
            Ok(records) => did_from_txt_records(&records),
            Err(e) => {
                debug!(handle = %handle, error = %e, "DNS handle lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory TXT zone that records every queried name
    #[derive(Default)]
    pub(crate) struct FakeTxt {
        zone: HashMap<String, Vec<String>>,
        pub(crate) queried: Mutex<Vec<String>>,
    }

    impl FakeTxt {
        pub(crate) fn with(mut self, hostname: &str, records: &[&str]) -> Self {
            self.zone.insert(
                hostname.to_string(),
                records.iter().map(|r| r.to_string()).collect(),
            );
            self
        }

        pub(crate) fn queried(&self) -> Vec<String> {
            self.queried.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TxtLookup for FakeTxt {
        async fn txt_records(&self, hostname: &str) -> io::Result<Vec<String>> {
            self.queried.lock().unwrap().push(hostname.to_string());
            self.zone
                .get(hostname)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "NXDOMAIN"))
        }
    }

    #[tokio::test]
    async fn test_finds_did_among_other_records() {
        let dns = Arc::new(FakeTxt::default().with(
            "_atproto.alice.bsky.social",
            &[
                "v=spf1 include:_spf.example.com ~all",
                "did=did:plc:ewvi7nxzyoun6zhxrhs64oiz",
            ],
        ));
        let resolver = DnsHandleResolver::new(dns.clone());

        let did = resolver.attempt("alice.bsky.social").await;

        assert_eq!(did.as_deref(), Some("did:plc:ewvi7nxzyoun6zhxrhs64oiz"));
        assert_eq!(dns.queried(), vec!["_atproto.alice.bsky.social"]);
    }

    #[tokio::test]
    async fn test_skips_invalid_did_values() {
        let dns = Arc::new(FakeTxt::default().with(
            "_atproto.alice.test",
            &["did=not-a-did", "did=did:web:alice.test"],
        ));
        let resolver = DnsHandleResolver::new(dns);

        assert_eq!(
            resolver.attempt("alice.test").await.as_deref(),
            Some("did:web:alice.test")
        );
    }

    #[tokio::test]
    async fn test_no_matching_record_is_none() {
        let dns = Arc::new(FakeTxt::default().with("_atproto.alice.test", &["v=spf1 -all"]));
        let resolver = DnsHandleResolver::new(dns);
        assert!(resolver.attempt("alice.test").await.is_none());
    }

    #[tokio::test]
    async fn test_lookup_error_is_swallowed() {
        let resolver = DnsHandleResolver::new(Arc::new(FakeTxt::default()));
        assert!(resolver.attempt("nobody.test").await.is_none());
    }

    #[test]
    fn test_did_from_empty_records() {
        assert!(did_from_txt_records(&[]).is_none());
    }
}
