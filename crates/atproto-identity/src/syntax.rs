//! Syntax checks for DIDs, handles and NSIDs
//!
//! These run before any lookup so malformed input never reaches the network.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{IdentityError, Result};

static DID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^did:[a-z]+:[a-zA-Z0-9._:%-]*[a-zA-Z0-9._-]$").unwrap());

static HANDLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$",
    )
    .unwrap()
});

static DOMAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

static NSID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .unwrap()
});

const NSID_MAX_LEN: usize = 317;
const NSID_MIN_SEGMENTS: usize = 3;

/// True if `s` looks like `did:<method>:<id>`
pub fn is_did(s: &str) -> bool {
    DID_RE.is_match(s)
}

/// True if `s` is a DNS-hostname-shaped handle
pub fn is_handle(s: &str) -> bool {
    HANDLE_RE.is_match(s)
}

/// Looser domain check used before calling a `resolveHandle` endpoint
pub fn is_domain_handle(s: &str) -> bool {
    DOMAIN_RE.is_match(s)
}

/// Extract the method segment (`plc` in `did:plc:abc`)
pub fn did_method(did: &str) -> Result<&str> {
    if !is_did(did) {
        return Err(IdentityError::InvalidDidFormat(did.to_string()));
    }
    did.split(':')
        .nth(1)
        .ok_or_else(|| IdentityError::InvalidDidFormat(did.to_string()))
}

/// Everything after the second colon
pub fn did_identifier(did: &str) -> Result<&str> {
    let mut parts = did.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("did"), Some(_), Some(id)) => Ok(id),
        _ => Err(IdentityError::InvalidDidFormat(did.to_string())),
    }
}

pub fn is_plc_did(did: &str) -> bool {
    matches!(did_method(did), Ok("plc"))
}

pub fn is_web_did(did: &str) -> bool {
    matches!(did_method(did), Ok("web"))
}

/// Validate an NSID and return its authority (every segment but the last)
pub fn nsid_authority(nsid: &str) -> Result<&str> {
    if nsid.len() > NSID_MAX_LEN
        || !NSID_RE.is_match(nsid)
        || nsid.split('.').count() < NSID_MIN_SEGMENTS
    {
        return Err(IdentityError::InvalidNsid(nsid.to_string()));
    }
    nsid.rsplit_once('.')
        .map(|(authority, _)| authority)
        .ok_or_else(|| IdentityError::InvalidNsid(nsid.to_string()))
}
