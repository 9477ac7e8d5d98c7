//! Configuration types for the index client transport.

/// Service identifier used to sign requests to a managed search domain.
pub const DEFAULT_SIGNING_SERVICE: &str = "es";

/// Region used to sign requests when none is configured.
pub const DEFAULT_SIGNING_REGION: &str = "us-east-1";

/// Request-signing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningConfig {
    /// Service identifier the signature is scoped to.
    pub service_name: String,
    /// Region the signature is scoped to.
    pub region: String,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SIGNING_SERVICE.to_string(),
            region: DEFAULT_SIGNING_REGION.to_string(),
        }
    }
}

impl SigningConfig {
    pub fn new(service_name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            region: region.into(),
        }
    }
}

/// Configuration for building the index client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Index service endpoint, e.g. `https://search-domain.us-east-1.es.amazonaws.com`.
    pub endpoint: String,
    /// Signing parameters. `None` sends unsigned requests (local clusters only).
    pub signing: Option<SigningConfig>,
}

impl TransportConfig {
    /// Signed transport with the default service and region.
    pub fn signed(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            signing: Some(SigningConfig::default()),
        }
    }

    /// Unsigned transport, for a local cluster or a test server.
    pub fn unsigned(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            signing: None,
        }
    }

    /// Replace the signing parameters.
    pub fn with_signing(mut self, signing: SigningConfig) -> Self {
        self.signing = Some(signing);
        self
    }
}
