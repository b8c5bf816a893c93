//! DID resolution, dispatched on the DID method

mod plc;
mod web;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{IdentityError, Result};
use crate::syntax;
use crate::types::DidDocument;

pub use plc::{PlcDidResolver, DEFAULT_PLC_DIRECTORY};
pub use web::WebDidResolver;

/// Resolves DIDs to DID documents
#[async_trait]
pub trait DidResolver: Send + Sync {
    async fn resolve(&self, did: &str) -> Result<DidDocument>;

    /// Whether this resolver handles the given DID method
    fn supports(&self, method: &str) -> bool;
}

/// Method → resolver table.
///
/// Comes with `plc` and `web` registered; further methods can be added
/// before the registry is handed to an [`IdentityResolver`](crate::IdentityResolver).
pub struct DidResolverRegistry {
    resolvers: HashMap<String, Arc<dyn DidResolver>>,
}

impl DidResolverRegistry {
    /// Registry with the default `plc` and `web` resolvers
    pub fn new(plc_directory: &str, timeout: Duration) -> Self {
        let mut registry = Self::empty();
        registry
            .register("plc", Arc::new(PlcDidResolver::new(plc_directory, timeout)))
            .register("web", Arc::new(WebDidResolver::new(timeout)));
        registry
    }

    /// Registry with nothing registered
    pub fn empty() -> Self {
        Self {
            resolvers: HashMap::new(),
        }
    }

    /// Register (or replace) the resolver for a DID method
    pub fn register(&mut self, method: &str, resolver: Arc<dyn DidResolver>) -> &mut Self {
        self.resolvers.insert(method.to_string(), resolver);
        self
    }

    pub fn with(mut self, method: &str, resolver: Arc<dyn DidResolver>) -> Self {
        self.register(method, resolver);
        self
    }

    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.resolvers.keys().map(String::as_str)
    }
}

impl Default for DidResolverRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_PLC_DIRECTORY, Duration::from_secs(10))
    }
}

#[async_trait]
impl DidResolver for DidResolverRegistry {
    async fn resolve(&self, did: &str) -> Result<DidDocument> {
        let method = syntax::did_method(did)?;

        let resolver = self
            .resolvers
            .get(method)
            .ok_or_else(|| IdentityError::UnsupportedDidMethod(method.to_string()))?;

        debug!(did = %did, method = %method, "Dispatching DID resolution");
        resolver.resolve(did).await
    }

    fn supports(&self, method: &str) -> bool {
        self.resolvers.contains_key(method)
    }
}

/// Shared tail of the HTTP method resolvers: decode the body and check it is a usable document
pub(crate) async fn document_from_response(
    did: &str,
    response: std::result::Result<reqwest::Response, reqwest::Error>,
) -> Result<DidDocument> {
    let response = response
        .and_then(|r| r.error_for_status())
        .map_err(|e| IdentityError::did_failed(did, e.to_string()))?;

    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| IdentityError::did_failed(did, e.to_string()))?;

    let doc = DidDocument::from_value(body)
        .ok_or_else(|| IdentityError::did_failed(did, "Invalid response format"))?;

    if doc.id.is_empty() {
        return Err(IdentityError::did_failed(did, "Document has no id"));
    }

    Ok(doc)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Resolver that hands back a fixed document and counts calls
    pub(crate) struct StaticDidResolver {
        method: &'static str,
        doc: serde_json::Value,
        pub(crate) calls: AtomicUsize,
    }

    impl StaticDidResolver {
        pub(crate) fn new(method: &'static str, doc: serde_json::Value) -> Self {
            Self {
                method,
                doc,
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DidResolver for StaticDidResolver {
        async fn resolve(&self, _did: &str) -> Result<DidDocument> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(DidDocument::from_value(self.doc.clone()).unwrap())
        }

        fn supports(&self, method: &str) -> bool {
            method == self.method
        }
    }

    #[test]
    fn test_default_registry_supports_plc_and_web() {
        let registry = DidResolverRegistry::default();
        assert!(registry.supports("plc"));
        assert!(registry.supports("web"));
        assert!(!registry.supports("key"));
    }

    #[tokio::test]
    async fn test_dispatches_to_registered_method() {
        let plc = Arc::new(StaticDidResolver::new(
            "plc",
            json!({ "id": "did:plc:abc123" }),
        ));
        let registry = DidResolverRegistry::empty().with("plc", plc.clone());

        let doc = registry.resolve("did:plc:abc123").await.unwrap();
        assert_eq!(doc.id, "did:plc:abc123");
        assert_eq!(plc.calls(), 1);
    }

    #[tokio::test]
    async fn test_unregistered_method_is_unsupported() {
        let registry = DidResolverRegistry::empty();
        let err = registry.resolve("did:key:z6Mkabc").await.unwrap_err();
        assert_eq!(err, IdentityError::UnsupportedDidMethod("key".to_string()));
    }

    #[tokio::test]
    async fn test_malformed_did_never_reaches_resolver() {
        let plc = Arc::new(StaticDidResolver::new("plc", json!({ "id": "did:plc:x" })));
        let registry = DidResolverRegistry::empty().with("plc", plc.clone());

        for input in ["", "plc:abc", "did:plc", "did:plc:", "alice.test"] {
            let err = registry.resolve(input).await.unwrap_err();
            assert_eq!(err, IdentityError::InvalidDidFormat(input.to_string()));
        }
        assert_eq!(plc.calls(), 0);
    }

    #[tokio::test]
    async fn test_register_replaces_existing_method() {
        let first = Arc::new(StaticDidResolver::new("web", json!({ "id": "did:web:one" })));
        let second = Arc::new(StaticDidResolver::new("web", json!({ "id": "did:web:two" })));
        let mut registry = DidResolverRegistry::empty();
        registry.register("web", first.clone());
        registry.register("web", second.clone());

        let doc = registry.resolve("did:web:example.com").await.unwrap();
        assert_eq!(doc.id, "did:web:two");
        assert_eq!(first.calls(), 0);
        assert_eq!(registry.methods().count(), 1);
    }
}
