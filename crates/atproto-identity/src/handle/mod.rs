//! Handle → DID resolution through an ordered chain of lookup methods

mod dns;
mod well_known;
mod xrpc;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{IdentityError, Result};
use crate::syntax;

pub(crate) use dns::did_from_txt_records;
pub use dns::{DnsHandleResolver, HickoryTxtResolver, TxtLookup};
pub use well_known::WellKnownHandleResolver;
pub use xrpc::{XrpcHandleResolver, DEFAULT_PDS_ENDPOINT};

/// Resolves a handle to a DID, failing with an [`IdentityError`]
#[async_trait]
pub trait HandleResolver: Send + Sync {
    async fn resolve(&self, handle: &str) -> Result<String>;
}

/// One way of looking up a handle.
///
/// Implementations swallow their own failures; `None` means "this method
/// found nothing" whatever the reason.
#[async_trait]
pub trait HandleResolutionMethod: Send + Sync {
    async fn attempt(&self, handle: &str) -> Option<String>;
}

/// Names of the built-in lookup methods, as used in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleMethod {
    Dns,
    WellKnown,
    Rpc,
}

impl HandleMethod {
    pub const DEFAULT_ORDER: [HandleMethod; 3] =
        [HandleMethod::Dns, HandleMethod::WellKnown, HandleMethod::Rpc];

    pub fn as_str(&self) -> &'static str {
        match self {
            HandleMethod::Dns => "dns",
            HandleMethod::WellKnown => "well-known",
            HandleMethod::Rpc => "rpc",
        }
    }
}

impl fmt::Display for HandleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandleMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dns" => Ok(HandleMethod::Dns),
            "well-known" | "wellknown" | "well_known" => Ok(HandleMethod::WellKnown),
            "rpc" | "xrpc" => Ok(HandleMethod::Rpc),
            other => Err(format!("unknown handle resolution method: {other}")),
        }
    }
}

/// Tries each method in order; the first DID found wins
pub struct HandleResolverChain {
    methods: Vec<Arc<dyn HandleResolutionMethod>>,
}

impl HandleResolverChain {
    pub fn new(methods: Vec<Arc<dyn HandleResolutionMethod>>) -> Self {
        Self { methods }
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

#[async_trait]
impl HandleResolver for HandleResolverChain {
    async fn resolve(&self, handle: &str) -> Result<String> {
        if !syntax::is_handle(handle) {
            return Err(IdentityError::InvalidHandleFormat(handle.to_string()));
        }

        for (position, method) in self.methods.iter().enumerate() {
            if let Some(did) = method.attempt(handle).await {
                debug!(handle = %handle, did = %did, position, "Handle resolved");
                return Ok(did);
            }
        }

        Err(IdentityError::handle_failed(handle, "all methods failed"))
    }
}

#[cfg(test)]
pub(crate) use dns::tests::FakeTxt;
