use std::env;
use std::time::Duration;

use tracing::warn;

use crate::did::DEFAULT_PLC_DIRECTORY;
use crate::handle::{HandleMethod, DEFAULT_PDS_ENDPOINT};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TTL_SECS: u64 = 3600;
const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Resolver configuration
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// PLC directory used for `did:plc`
    pub plc_directory: String,
    /// Server asked by the `rpc` handle method
    pub pds_endpoint: String,
    /// Per-request timeout applied by every resolver
    pub timeout: Duration,
    pub cache: CacheSettings,
    pub cache_capacity: u64,
    /// Handle lookup methods, in the order they are tried
    pub handle_methods: Vec<HandleMethod>,
}

/// Cache switch and per-namespace TTLs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub enabled: bool,
    pub did_ttl: Duration,
    pub handle_ttl: Duration,
    pub pds_ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            did_ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            handle_ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            pds_ttl: Duration::from_secs(DEFAULT_TTL_SECS),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            plc_directory: DEFAULT_PLC_DIRECTORY.to_string(),
            pds_endpoint: DEFAULT_PDS_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache: CacheSettings::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            handle_methods: HandleMethod::DEFAULT_ORDER.to_vec(),
        }
    }
}

impl ResolverConfig {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let secs = |key: &str, default: Duration| {
            get(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        let plc_directory = get("ATP_PLC_DIRECTORY").unwrap_or(defaults.plc_directory);
        let pds_endpoint = get("ATP_PDS_ENDPOINT").unwrap_or(defaults.pds_endpoint);
        let timeout = secs("ATP_RESOLVER_TIMEOUT", defaults.timeout);

        let cache = CacheSettings {
            enabled: get("ATP_RESOLVER_CACHE_ENABLED")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.cache.enabled),
            did_ttl: secs("ATP_RESOLVER_CACHE_DID_TTL", defaults.cache.did_ttl),
            handle_ttl: secs("ATP_RESOLVER_CACHE_HANDLE_TTL", defaults.cache.handle_ttl),
            pds_ttl: secs("ATP_RESOLVER_CACHE_PDS_TTL", defaults.cache.pds_ttl),
        };

        let cache_capacity = get("ATP_RESOLVER_CACHE_CAPACITY")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.cache_capacity);

        let handle_methods = get("ATP_HANDLE_RESOLUTION_METHODS")
            .map(|v| parse_methods(&v))
            .unwrap_or(defaults.handle_methods);

        Self {
            plc_directory,
            pds_endpoint,
            timeout,
            cache,
            cache_capacity,
            handle_methods,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Comma-separated method names; unknown names are dropped
fn parse_methods(value: &str) -> Vec<HandleMethod> {
    value
        .split(',')
        .filter(|name| !name.trim().is_empty())
        .filter_map(|name| match name.parse::<HandleMethod>() {
            Ok(method) => Some(method),
            Err(e) => {
                warn!("Ignoring handle resolution method: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> ResolverConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ResolverConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.plc_directory, "https://plc.directory");
        assert_eq!(config.pds_endpoint, "https://bsky.social");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.cache, CacheSettings::default());
        assert_eq!(config.cache.did_ttl, Duration::from_secs(3600));
        assert_eq!(
            config.handle_methods,
            vec![HandleMethod::Dns, HandleMethod::WellKnown, HandleMethod::Rpc]
        );
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("ATP_PLC_DIRECTORY", "https://plc.example.com"),
            ("ATP_RESOLVER_TIMEOUT", "3"),
            ("ATP_RESOLVER_CACHE_ENABLED", "false"),
            ("ATP_RESOLVER_CACHE_PDS_TTL", "60"),
            ("ATP_HANDLE_RESOLUTION_METHODS", "xrpc, dns"),
        ]);
        assert_eq!(config.plc_directory, "https://plc.example.com");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.pds_ttl, Duration::from_secs(60));
        assert_eq!(config.cache.handle_ttl, Duration::from_secs(3600));
        assert_eq!(config.handle_methods, vec![HandleMethod::Rpc, HandleMethod::Dns]);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = config_from(&[
            ("ATP_RESOLVER_TIMEOUT", "soon"),
            ("ATP_RESOLVER_CACHE_ENABLED", "maybe"),
            ("ATP_HANDLE_RESOLUTION_METHODS", "smoke-signal,well-known"),
        ]);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.cache.enabled);
        assert_eq!(config.handle_methods, vec![HandleMethod::WellKnown]);
    }
}
