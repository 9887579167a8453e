//! Default configuration values
//!
//! This module provides Default trait implementations for all configuration types.

use super::types::{ApiEndpoint, ConfigKind, MasterConfiguration, Networking, NodeConfiguration};
use crate::constants::{
    API_VERSION, DEFAULT_API_BIND_PORT, DEFAULT_CA_CERT_PATH, DEFAULT_CERTIFICATES_DIR,
    DEFAULT_DNS_DOMAIN, DEFAULT_KUBERNETES_VERSION, DEFAULT_SERVICE_SUBNET, DEFAULT_TOKEN_TTL,
};

// ═══════════════════════════════════════════════════════════════════════════
// DEFAULT IMPLEMENTATIONS
// ═══════════════════════════════════════════════════════════════════════════

impl Default for MasterConfiguration {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: ConfigKind::MasterConfiguration.to_string(),
            api: ApiEndpoint::default(),
            networking: Networking::default(),
            kubernetes_version: DEFAULT_KUBERNETES_VERSION.to_string(),
            certificates_dir: DEFAULT_CERTIFICATES_DIR.to_string(),
            node_name: None,
            token: None,
            token_ttl: DEFAULT_TOKEN_TTL.to_string(),
            api_server_cert_sans: Vec::new(),
        }
    }
}

impl Default for ApiEndpoint {
    fn default() -> Self {
        Self {
            advertise_address: None,
            bind_port: DEFAULT_API_BIND_PORT,
        }
    }
}

impl Default for Networking {
    fn default() -> Self {
        Self {
            service_subnet: DEFAULT_SERVICE_SUBNET.to_string(),
            pod_subnet: None,
            dns_domain: DEFAULT_DNS_DOMAIN.to_string(),
        }
    }
}

impl Default for NodeConfiguration {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: ConfigKind::NodeConfiguration.to_string(),
            ca_cert_path: DEFAULT_CA_CERT_PATH.to_string(),
            discovery_file: None,
            discovery_token: None,
            discovery_token_api_servers: Vec::new(),
            discovery_token_ca_cert_hashes: Vec::new(),
            discovery_token_unsafe_skip_ca_verification: false,
            node_name: None,
            tls_bootstrap_token: None,
            token: None,
        }
    }
}
