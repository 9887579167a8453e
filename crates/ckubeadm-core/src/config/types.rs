//! Configuration structure definitions
//!
//! Documents are YAML with camelCase keys. Every struct is
//! `#[serde(default)]`, so a partial document is completed from the
//! built-in defaults in `defaults.rs`.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// The configuration kinds known to the defaults registry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
pub enum ConfigKind {
    MasterConfiguration,
    NodeConfiguration,
}

/// Configuration consumed by `init` and the phase commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct MasterConfiguration {
    pub api_version: String,
    pub kind: String,
    pub api: ApiEndpoint,
    pub networking: Networking,
    pub kubernetes_version: String,
    pub certificates_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "tokenTTL")]
    pub token_ttl: String,
    #[serde(rename = "apiServerCertSANs", skip_serializing_if = "Vec::is_empty")]
    pub api_server_cert_sans: Vec<String>,
}

/// Where the API server listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ApiEndpoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertise_address: Option<String>,
    pub bind_port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Networking {
    pub service_subnet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_subnet: Option<String>,
    pub dns_domain: String,
}

/// Configuration consumed by `join`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct NodeConfiguration {
    pub api_version: String,
    pub kind: String,
    pub ca_cert_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery_token: Option<String>,
    #[serde(rename = "discoveryTokenAPIServers", skip_serializing_if = "Vec::is_empty")]
    pub discovery_token_api_servers: Vec<String>,
    #[serde(rename = "discoveryTokenCACertHashes", skip_serializing_if = "Vec::is_empty")]
    pub discovery_token_ca_cert_hashes: Vec<String>,
    #[serde(rename = "discoveryTokenUnsafeSkipCAVerification")]
    pub discovery_token_unsafe_skip_ca_verification: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_bootstrap_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl NodeConfiguration {
    /// `token` is shorthand for both the discovery and TLS bootstrap tokens.
    /// Explicit values win, and file discovery suppresses the discovery token.
    #[must_use]
    pub fn with_token_shorthand(self) -> Self {
        let Some(token) = self.token.clone() else {
            return self;
        };
        let discovery_token = match (&self.discovery_token, &self.discovery_file) {
            (None, None) => Some(token.clone()),
            _ => self.discovery_token.clone(),
        };
        Self {
            discovery_token,
            tls_bootstrap_token: self.tls_bootstrap_token.clone().or(Some(token)),
            ..self
        }
    }
}
