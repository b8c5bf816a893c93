use serde::Deserialize;
use serde_json::Value;

/// Service type advertised by an account's Personal Data Server
pub const PDS_SERVICE_TYPE: &str = "AtprotoPersonalDataServer";

/// Resolved DID document.
///
/// Only the members this crate reads are typed. The full payload is kept in
/// `raw` so callers can reach anything else the document carries.
#[derive(Debug, Clone, PartialEq)]
pub struct DidDocument {
    pub id: String,
    pub also_known_as: Vec<String>,
    pub verification_method: Vec<Value>,
    pub service: Vec<DidService>,
    raw: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DidService {
    pub id: Option<String>,
    pub service_type: String,
    pub service_endpoint: Option<String>,
}

impl DidDocument {
    /// Build a document from a decoded JSON body.
    ///
    /// Returns `None` unless the body is a JSON object. Missing or mistyped
    /// members default to empty values.
    pub fn from_value(raw: Value) -> Option<Self> {
        let obj = raw.as_object()?;

        let id = obj
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let also_known_as = obj
            .get("alsoKnownAs")
            .and_then(Value::as_array)
            .map(|akas| {
                akas.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let verification_method = obj
            .get("verificationMethod")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let service = obj
            .get("service")
            .and_then(Value::as_array)
            .map(|services| services.iter().filter_map(DidService::from_value).collect())
            .unwrap_or_default();

        Some(Self {
            id,
            also_known_as,
            verification_method,
            service,
            raw,
        })
    }

    /// Endpoint of the first `AtprotoPersonalDataServer` service
    pub fn pds_endpoint(&self) -> Option<&str> {
        self.service
            .iter()
            .find(|s| s.service_type == PDS_SERVICE_TYPE)
            .and_then(|s| s.service_endpoint.as_deref())
    }

    /// Handle claimed through an `at://` alias
    pub fn handle(&self) -> Option<&str> {
        self.also_known_as
            .iter()
            .find_map(|aka| aka.strip_prefix("at://"))
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }
}

impl DidService {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            id: obj.get("id").and_then(Value::as_str).map(str::to_string),
            service_type: obj
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            service_endpoint: obj
                .get("serviceEndpoint")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

/// `com.atproto.identity.resolveHandle` response
#[derive(Debug, Deserialize)]
pub(crate) struct ResolveHandleResponse {
    pub(crate) did: Option<String>,
}

/// `com.atproto.repo.getRecord` response
#[derive(Debug, Deserialize)]
pub(crate) struct GetRecordResponse {
    pub(crate) value: Option<Value>,
}
