use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheStore, CachedValue, MokaCacheStore};
use crate::config::{CacheSettings, ResolverConfig};
use crate::did::{DidResolver, DidResolverRegistry};
use crate::error::Result;
use crate::handle::{
    DnsHandleResolver, HandleMethod, HandleResolutionMethod, HandleResolver,
    HandleResolverChain, HickoryTxtResolver, WellKnownHandleResolver, XrpcHandleResolver,
};
use crate::syntax;
use crate::types::DidDocument;

fn did_key(did: &str) -> String {
    format!("did:{did}")
}

fn handle_key(handle: &str) -> String {
    format!("handle:{handle}")
}

fn pds_key(actor: &str) -> String {
    format!("pds:{actor}")
}

/// Resolves AT Protocol identities (handles ↔ DIDs ↔ documents) with a cache in front
pub struct IdentityResolver {
    did_resolver: Arc<dyn DidResolver>,
    handle_resolver: Arc<dyn HandleResolver>,
    cache: Arc<dyn CacheStore>,
    settings: CacheSettings,
}

impl IdentityResolver {
    /// Create a resolver with the default configuration
    pub fn new() -> Self {
        Self::from_config(&ResolverConfig::default())
    }

    /// Build the default collaborators from configuration: `plc` and `web`
    /// DID methods, the configured handle chain and an in-process cache
    pub fn from_config(config: &ResolverConfig) -> Self {
        let did_resolver = DidResolverRegistry::new(&config.plc_directory, config.timeout);
        let handle_resolver = HandleResolverChain::new(handle_methods(config));
        let cache = MokaCacheStore::new(config.cache_capacity);

        Self::with_components(
            Arc::new(did_resolver),
            Arc::new(handle_resolver),
            Arc::new(cache),
            config.cache,
        )
    }

    /// Assemble a resolver from caller-supplied parts
    pub fn with_components(
        did_resolver: Arc<dyn DidResolver>,
        handle_resolver: Arc<dyn HandleResolver>,
        cache: Arc<dyn CacheStore>,
        settings: CacheSettings,
    ) -> Self {
        Self {
            did_resolver,
            handle_resolver,
            cache,
            settings,
        }
    }

    fn caching(&self, use_cache: bool) -> bool {
        use_cache && self.settings.enabled
    }

    /// Resolve a DID to its document
    pub async fn resolve_did(&self, did: &str, use_cache: bool) -> Result<Arc<DidDocument>> {
        let use_cache = self.caching(use_cache);
        let key = did_key(did);

        // Check cache
        if use_cache {
            if let Some(CachedValue::Document(doc)) = self.cache.get(&key).await {
                debug!(did = %did, "DID document cache hit");
                return Ok(doc);
            }
        }

        let doc = Arc::new(self.did_resolver.resolve(did).await?);

        if use_cache {
            self.cache
                .put(&key, CachedValue::Document(doc.clone()), self.settings.did_ttl)
                .await;
        }

        Ok(doc)
    }

    /// Resolve a handle to a DID
    pub async fn handle_to_did(&self, handle: &str, use_cache: bool) -> Result<String> {
        let use_cache = self.caching(use_cache);
        let key = handle_key(handle);

        // Check cache
        if use_cache {
            if let Some(CachedValue::Did(did)) = self.cache.get(&key).await {
                debug!(handle = %handle, did = %did, "Handle cache hit");
                return Ok(did);
            }
        }

        let did = self.handle_resolver.resolve(handle).await?;

        if use_cache {
            self.cache
                .put(&key, CachedValue::Did(did.clone()), self.settings.handle_ttl)
                .await;
        }

        Ok(did)
    }

    /// Resolve a handle to its DID document (handle → DID → document)
    pub async fn resolve_handle(&self, handle: &str, use_cache: bool) -> Result<Arc<DidDocument>> {
        let did = self.handle_to_did(handle, use_cache).await?;
        self.resolve_did(&did, use_cache).await
    }

    /// Resolve either a DID or a handle to a DID document
    pub async fn resolve_identity(&self, actor: &str, use_cache: bool) -> Result<Arc<DidDocument>> {
        if syntax::is_did(actor) {
            self.resolve_did(actor, use_cache).await
        } else {
            self.resolve_handle(actor, use_cache).await
        }
    }

    /// Get the PDS endpoint for a DID or handle.
    ///
    /// Cached under the actor as given, so a handle and its DID have separate
    /// entries. A document without a PDS service is not cached.
    pub async fn resolve_pds(&self, actor: &str, use_cache: bool) -> Result<Option<String>> {
        let caching = self.caching(use_cache);
        let key = pds_key(actor);

        // Check cache
        if caching {
            if let Some(CachedValue::PdsEndpoint(endpoint)) = self.cache.get(&key).await {
                debug!(actor = %actor, "PDS endpoint cache hit");
                return Ok(Some(endpoint));
            }
        }

        let doc = self.resolve_identity(actor, use_cache).await?;
        let endpoint = doc.pds_endpoint().map(str::to_string);

        match &endpoint {
            Some(endpoint) if caching => {
                self.cache
                    .put(
                        &key,
                        CachedValue::PdsEndpoint(endpoint.clone()),
                        self.settings.pds_ttl,
                    )
                    .await;
            }
            None => debug!(actor = %actor, "No PDS endpoint in DID document"),
            _ => {}
        }

        Ok(endpoint)
    }

    pub async fn clear_did_cache(&self, did: &str) {
        self.cache.forget(&did_key(did)).await;
    }

    pub async fn clear_handle_cache(&self, handle: &str) {
        self.cache.forget(&handle_key(handle)).await;
    }

    pub async fn clear_pds_cache(&self, actor: &str) {
        self.cache.forget(&pds_key(actor)).await;
    }

    /// Flush the whole cache store
    pub async fn clear_cache(&self) {
        self.cache.flush().await;
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Instantiate the configured handle lookup methods, keeping their order
pub fn handle_methods(config: &ResolverConfig) -> Vec<Arc<dyn HandleResolutionMethod>> {
    let timeout: Duration = config.timeout;

    config
        .handle_methods
        .iter()
        .map(|method| -> Arc<dyn HandleResolutionMethod> {
            match method {
                HandleMethod::Dns => Arc::new(DnsHandleResolver::new(Arc::new(
                    HickoryTxtResolver::new(timeout),
                ))),
                HandleMethod::WellKnown => Arc::new(WellKnownHandleResolver::new(timeout)),
                HandleMethod::Rpc => {
                    Arc::new(XrpcHandleResolver::new(&config.pds_endpoint, timeout))
                }
            }
        })
        .collect()
}
