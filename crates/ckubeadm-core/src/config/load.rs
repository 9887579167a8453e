//! Configuration loading from YAML documents
//!
//! A document must carry the expected `apiVersion` and `kind`; every other
//! field may be omitted and is filled from the built-in defaults.

use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use super::types::{ConfigKind, MasterConfiguration, NodeConfiguration};
use crate::{constants::API_VERSION, Error, Result};

/// A top-level configuration document with an `apiVersion`/`kind` header.
pub trait ConfigDocument: DeserializeOwned + Serialize + Default {
    const KIND: ConfigKind;
}

impl ConfigDocument for MasterConfiguration {
    const KIND: ConfigKind = ConfigKind::MasterConfiguration;
}

impl ConfigDocument for NodeConfiguration {
    const KIND: ConfigKind = ConfigKind::NodeConfiguration;
}

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Read and parse a configuration file.
///
/// # Errors
///
/// Returns error if:
/// - The file cannot be read
/// - The YAML is malformed or contains unknown fields
/// - The header names another kind or API version
pub fn load_config_file<T: ConfigDocument>(path: &Path) -> Result<T> {
    let source = path.display().to_string();
    let contents = std::fs::read_to_string(path).map_err(|e| Error::io(&source, e))?;
    tracing::debug!(path = %source, kind = %T::KIND, "loading configuration file");
    parse_document(&source, &contents)
}

/// Parse a configuration document from a string.
///
/// # Errors
///
/// Returns error if the YAML is malformed or the header is missing or does
/// not match `T`.
pub fn parse_document<T: ConfigDocument>(source_name: &str, contents: &str) -> Result<T> {
    let kind = document_kind(source_name, contents)?;
    if kind != T::KIND {
        return Err(Error::InvalidConfig(format!(
            "{source_name}: expected kind {}, found {kind}",
            T::KIND
        )));
    }
    serde_yaml::from_str(contents).map_err(|e| Error::parse(source_name, e.to_string()))
}

/// Kind named by the header of a raw document.
///
/// Both `apiVersion` and `kind` must be present; defaults never fill them in.
///
/// # Errors
///
/// Returns error if the YAML is malformed, a header key is missing, the
/// API version is unsupported or the kind is unknown.
pub fn document_kind(source_name: &str, contents: &str) -> Result<ConfigKind> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(contents).map_err(|e| Error::parse(source_name, e.to_string()))?;
    let header = |key: &str| {
        value
            .get(key)
            .and_then(serde_yaml::Value::as_str)
            .ok_or_else(|| Error::InvalidConfig(format!("{source_name} has no {key}")))
    };
    let api_version = header("apiVersion")?;
    if api_version != API_VERSION {
        return Err(Error::InvalidConfig(format!(
            "{source_name}: unsupported apiVersion {api_version:?}, expected {API_VERSION:?}"
        )));
    }
    let kind = header("kind")?;
    kind.parse().map_err(|_| {
        Error::InvalidConfig(format!("{source_name} has unknown kind {kind:?}"))
    })
}

/// Render a document as YAML.
///
/// # Errors
///
/// Returns error if serialization fails.
pub fn to_yaml<T: Serialize>(document: &T) -> Result<String> {
    serde_yaml::to_string(document).map_err(|e| Error::parse("<output>", e.to_string()))
}
