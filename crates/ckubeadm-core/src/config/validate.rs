//! Configuration validation
//!
//! Validation stops at the first failing field and names it by its dotted
//! YAML path.

use std::{net::IpAddr, path::Path};

use super::types::{MasterConfiguration, NodeConfiguration};
use crate::{
    token::{BootstrapToken, TokenTtl},
    version::VersionSpec,
    Error, Result,
};

const CA_HASH_PREFIX: &str = "sha256:";
const DNS_SUBDOMAIN_MAX_LEN: usize = 253;
const DNS_LABEL_MAX_LEN: usize = 63;

impl MasterConfiguration {
    /// Validate every field of a master configuration.
    ///
    /// # Errors
    ///
    /// Returns `Validation` naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if let Some(address) = &self.api.advertise_address {
            validate_ip(address, "api.advertiseAddress")?;
        }
        if self.api.bind_port == 0 {
            return Err(Error::validation("api.bindPort", "must be greater than 0"));
        }
        validate_cidr(&self.networking.service_subnet, "networking.serviceSubnet")?;
        if let Some(pod_subnet) = &self.networking.pod_subnet {
            validate_cidr(pod_subnet, "networking.podSubnet")?;
        }
        validate_dns_subdomain(&self.networking.dns_domain, "networking.dnsDomain")?;
        validate_kubernetes_version(&self.kubernetes_version)?;
        validate_absolute_path(&self.certificates_dir, "certificatesDir")?;
        if let Some(node_name) = &self.node_name {
            validate_dns_subdomain(node_name, "nodeName")?;
        }
        if let Some(token) = &self.token {
            validate_token(token, "token")?;
        }
        self.token_ttl
            .parse::<TokenTtl>()
            .map_err(|e| Error::validation("tokenTTL", e.to_string()))?;
        self.api_server_cert_sans
            .iter()
            .try_for_each(|san| validate_san(san, "apiServerCertSANs"))
    }
}

impl NodeConfiguration {
    /// Validate every field of a node configuration.
    ///
    /// # Errors
    ///
    /// Returns `Validation` naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        validate_absolute_path(&self.ca_cert_path, "caCertPath")?;
        match (&self.discovery_file, &self.discovery_token) {
            (None, None) => {
                return Err(Error::validation(
                    "discoveryToken",
                    "one of discoveryFile or discoveryToken must be set",
                ))
            }
            (Some(_), Some(_)) => {
                return Err(Error::validation(
                    "discoveryToken",
                    "discoveryFile and discoveryToken are mutually exclusive",
                ))
            }
            (Some(file), None) => validate_discovery_file(file)?,
            (None, Some(token)) => self.validate_token_discovery(token)?,
        }
        match &self.tls_bootstrap_token {
            Some(token) => validate_token(token, "tlsBootstrapToken")?,
            None => return Err(Error::validation("tlsBootstrapToken", "must be set")),
        }
        if let Some(node_name) = &self.node_name {
            validate_dns_subdomain(node_name, "nodeName")?;
        }
        Ok(())
    }

    fn validate_token_discovery(&self, token: &str) -> Result<()> {
        validate_token(token, "discoveryToken")?;
        if self.discovery_token_api_servers.is_empty() {
            return Err(Error::validation(
                "discoveryTokenAPIServers",
                "at least one API server endpoint is required for token discovery",
            ));
        }
        self.discovery_token_api_servers
            .iter()
            .try_for_each(|endpoint| validate_endpoint(endpoint, "discoveryTokenAPIServers"))?;
        if self.discovery_token_ca_cert_hashes.is_empty()
            && !self.discovery_token_unsafe_skip_ca_verification
        {
            return Err(Error::validation(
                "discoveryTokenCACertHashes",
                "using token-based discovery without discoveryTokenCACertHashes can be unsafe; \
                 set discoveryTokenUnsafeSkipCAVerification to continue",
            ));
        }
        self.discovery_token_ca_cert_hashes
            .iter()
            .map(String::as_str)
            .try_for_each(validate_ca_cert_hash)
    }
}

/// Check a `sha256:<64 hex chars>` CA public key pin.
///
/// # Errors
///
/// Returns `Validation` for a wrong prefix or a digest that is not 32 bytes of hex.
pub fn validate_ca_cert_hash(hash: &str) -> Result<()> {
    let field = "discoveryTokenCACertHashes";
    let digest = hash.strip_prefix(CA_HASH_PREFIX).ok_or_else(|| {
        Error::validation(field, format!("{hash:?} must start with {CA_HASH_PREFIX:?}"))
    })?;
    let bytes = hex::decode(digest)
        .map_err(|e| Error::validation(field, format!("{hash:?} is not valid hex: {e}")))?;
    if bytes.len() != 32 {
        return Err(Error::validation(
            field,
            format!("{hash:?} must be a 32 byte sha256 digest"),
        ));
    }
    Ok(())
}

/// Check an `address/prefix` CIDR block.
///
/// # Errors
///
/// Returns `Validation` for a bad address or a prefix longer than the address.
pub fn validate_cidr(cidr: &str, field: &str) -> Result<()> {
    let invalid = || Error::validation(field, format!("{cidr:?} is not a valid CIDR"));
    let (address, prefix) = cidr.split_once('/').ok_or_else(invalid)?;
    let address: IpAddr = address.parse().map_err(|_| invalid())?;
    let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
    let max = if address.is_ipv4() { 32 } else { 128 };
    if prefix > max {
        return Err(invalid());
    }
    Ok(())
}

fn validate_ip(address: &str, field: &str) -> Result<()> {
    address
        .parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| Error::validation(field, format!("{address:?} is not a valid IP address")))
}

fn validate_dns_subdomain(name: &str, field: &str) -> Result<()> {
    let valid_label = |label: &str| {
        let bytes = label.as_bytes();
        !label.is_empty()
            && label.len() <= DNS_LABEL_MAX_LEN
            && bytes
                .iter()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
            && bytes.first().is_some_and(u8::is_ascii_alphanumeric)
            && bytes.last().is_some_and(u8::is_ascii_alphanumeric)
    };
    if name.is_empty() || name.len() > DNS_SUBDOMAIN_MAX_LEN || !name.split('.').all(valid_label)
    {
        return Err(Error::validation(
            field,
            format!("{name:?} is not a valid DNS subdomain"),
        ));
    }
    Ok(())
}

fn validate_san(san: &str, field: &str) -> Result<()> {
    if san.parse::<IpAddr>().is_ok() {
        return Ok(());
    }
    validate_dns_subdomain(san.strip_prefix("*.").unwrap_or(san), field)
}

fn validate_absolute_path(path: &str, field: &str) -> Result<()> {
    if Path::new(path).is_absolute() {
        Ok(())
    } else {
        Err(Error::validation(field, format!("{path:?} must be an absolute path")))
    }
}

fn validate_token(token: &str, field: &str) -> Result<()> {
    token
        .parse::<BootstrapToken>()
        .map(|_| ())
        .map_err(|e| Error::validation(field, e.to_string()))
}

fn validate_kubernetes_version(version: &str) -> Result<()> {
    let field = "kubernetesVersion";
    match version
        .parse::<VersionSpec>()
        .map_err(|e| Error::validation(field, e.to_string()))?
    {
        VersionSpec::Label(_) => Ok(()),
        VersionSpec::Exact(exact) => exact
            .check_control_plane()
            .map_err(|e| Error::validation(field, e.to_string())),
    }
}

fn validate_endpoint(endpoint: &str, field: &str) -> Result<()> {
    let invalid = || Error::validation(field, format!("{endpoint:?} is not a host:port endpoint"));
    let (host, port) = endpoint.rsplit_once(':').ok_or_else(invalid)?;
    let port: u16 = port.parse().map_err(|_| invalid())?;
    if host.is_empty() || port == 0 {
        return Err(invalid());
    }
    Ok(())
}

fn validate_discovery_file(file: &str) -> Result<()> {
    if file.starts_with("https://") {
        return Ok(());
    }
    validate_absolute_path(file, "discoveryFile")
}
