//! AT Protocol Identity Resolver
//!
//! Resolves handles to DIDs, DIDs to DID documents, and either to the
//! account's PDS endpoint. DID resolution is dispatched per DID method;
//! handle resolution walks an ordered chain of lookup methods (DNS TXT,
//! HTTPS well-known, `resolveHandle` RPC) until one answers. Results are
//! cached with a TTL per kind of value.

pub mod cache;
pub mod config;
pub mod did;
pub mod error;
pub mod handle;
mod http;
pub mod lexicon;
mod resolver;
pub mod syntax;
mod types;

pub use cache::{CacheStore, CachedValue, MokaCacheStore};
pub use config::{CacheSettings, ResolverConfig};
pub use did::{DidResolver, DidResolverRegistry, PlcDidResolver, WebDidResolver};
pub use error::{IdentityError, Result};
pub use handle::{
    DnsHandleResolver, HandleMethod, HandleResolutionMethod, HandleResolver, HandleResolverChain,
    HickoryTxtResolver, TxtLookup, WellKnownHandleResolver, XrpcHandleResolver,
};
pub use lexicon::LexiconResolver;
pub use resolver::{handle_methods, IdentityResolver};
pub use types::{DidDocument, DidService, PDS_SERVICE_TYPE};
