//! Error types for AT Protocol identity resolution

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    InvalidDidFormat(String),
    InvalidHandleFormat(String),
    UnsupportedDidMethod(String),
    DidResolutionFailed { did: String, reason: String },
    HandleResolutionFailed { handle: String, reason: String },
    InvalidNsid(String),
    LexiconResolutionFailed { nsid: String, reason: String },
}

impl IdentityError {
    pub fn did_failed(did: &str, reason: impl Into<String>) -> Self {
        IdentityError::DidResolutionFailed {
            did: did.to_string(),
            reason: reason.into(),
        }
    }

    pub fn handle_failed(handle: &str, reason: impl Into<String>) -> Self {
        IdentityError::HandleResolutionFailed {
            handle: handle.to_string(),
            reason: reason.into(),
        }
    }

    pub fn lexicon_failed(nsid: &str, reason: impl Into<String>) -> Self {
        IdentityError::LexiconResolutionFailed {
            nsid: nsid.to_string(),
            reason: reason.into(),
        }
    }
}

fn write_with_reason(f: &mut fmt::Formatter<'_>, head: &str, reason: &str) -> fmt::Result {
    if reason.is_empty() {
        write!(f, "{}", head)
    } else {
        write!(f, "{} ({})", head, reason)
    }
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityError::InvalidDidFormat(did) => write!(f, "Invalid DID format: {}", did),
            IdentityError::InvalidHandleFormat(handle) => {
                write!(f, "Invalid handle format: {}", handle)
            }
            IdentityError::UnsupportedDidMethod(method) => {
                write!(f, "Unsupported DID method: {}", method)
            }
            IdentityError::DidResolutionFailed { did, reason } => {
                write_with_reason(f, &format!("Failed to resolve DID: {}", did), reason)
            }
            IdentityError::HandleResolutionFailed { handle, reason } => {
                write_with_reason(f, &format!("Failed to resolve handle: {}", handle), reason)
            }
            IdentityError::InvalidNsid(nsid) => write!(f, "Invalid NSID: {}", nsid),
            IdentityError::LexiconResolutionFailed { nsid, reason } => {
                write_with_reason(f, &format!("Failed to resolve lexicon: {}", nsid), reason)
            }
        }
    }
}

impl std::error::Error for IdentityError {}

pub type Result<T> = std::result::Result<T, IdentityError>;
