//! Process-wide registry of configuration defaults
//!
//! The registry flattens the built-in defaults of every [`ConfigKind`] into
//! dotted keys (`api.bindPort`, `networking.serviceSubnet`) so command
//! factories can use them as flag defaults. It is populated at most once per
//! process by [`ensure_defaults_registered`] and is read-only afterwards.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        OnceLock,
    },
};

use serde::Serialize;
use serde_json::Value;
use strum::IntoEnumIterator;

use super::types::{ConfigKind, MasterConfiguration, NodeConfiguration};

static REGISTRY: OnceLock<DefaultsRegistry> = OnceLock::new();
static REGISTRATIONS: AtomicUsize = AtomicUsize::new(0);

/// Flattened default values keyed by configuration kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultsRegistry {
    kinds: BTreeMap<ConfigKind, BTreeMap<String, String>>,
}

impl DefaultsRegistry {
    fn build() -> Self {
        let kinds = ConfigKind::iter()
            .map(|kind| (kind, flatten_defaults(kind)))
            .collect();
        Self { kinds }
    }

    /// Default value for a dotted key of a kind.
    pub fn get(&self, kind: ConfigKind, key: &str) -> Option<&str> {
        self.kinds
            .get(&kind)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    /// Kinds with at least one registered default.
    pub fn kinds(&self) -> impl Iterator<Item = ConfigKind> + '_ {
        self.kinds
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(kind, _)| *kind)
    }

    /// Total number of registered keys across all kinds.
    pub fn len(&self) -> usize {
        self.kinds.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Populate the registry if this is the first call, then return it.
///
/// Idempotent; every caller after the first gets the same instance.
pub fn ensure_defaults_registered() -> &'static DefaultsRegistry {
    REGISTRY.get_or_init(|| {
        REGISTRATIONS.fetch_add(1, Ordering::SeqCst);
        let registry = DefaultsRegistry::build();
        tracing::debug!(entries = registry.len(), "registered configuration defaults");
        registry
    })
}

/// How many times the registry has been populated in this process (0 or 1).
pub fn registration_count() -> usize {
    REGISTRATIONS.load(Ordering::SeqCst)
}

fn flatten_defaults(kind: ConfigKind) -> BTreeMap<String, String> {
    let value = match kind {
        ConfigKind::MasterConfiguration => to_value(&MasterConfiguration::default()),
        ConfigKind::NodeConfiguration => to_value(&NodeConfiguration::default()),
    };
    let mut entries = BTreeMap::new();
    flatten_into(&mut entries, "", &value);
    entries
}

fn to_value<T: Serialize>(document: &T) -> Value {
    serde_json::to_value(document).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "failed to serialize configuration defaults");
        Value::Null
    })
}

fn flatten_into(entries: &mut BTreeMap<String, String>, prefix: &str, value: &Value) {
    let key = |name: &str| {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        }
    };
    match value {
        Value::Object(map) => map
            .iter()
            .for_each(|(name, child)| flatten_into(entries, &key(name), child)),
        Value::Array(items) if !items.is_empty() => {
            let joined = items
                .iter()
                .filter_map(scalar_to_string)
                .collect::<Vec<_>>()
                .join(",");
            entries.insert(prefix.to_string(), joined);
        }
        other => {
            if let Some(scalar) = scalar_to_string(other) {
                entries.insert(prefix.to_string(), scalar);
            }
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_flattens_nested_keys() {
        let registry = DefaultsRegistry::build();
        assert_eq!(
            registry.get(ConfigKind::MasterConfiguration, "api.bindPort"),
            Some("6443")
        );
        assert_eq!(
            registry.get(ConfigKind::MasterConfiguration, "networking.serviceSubnet"),
            Some("10.96.0.0/12")
        );
        assert_eq!(
            registry.get(ConfigKind::NodeConfiguration, "caCertPath"),
            Some("/etc/kubernetes/pki/ca.crt")
        );
        assert_eq!(
            registry.get(ConfigKind::NodeConfiguration, "discoveryTokenUnsafeSkipCAVerification"),
            Some("false")
        );
    }

    #[test]
    fn test_registry_omits_unset_optionals() {
        let registry = DefaultsRegistry::build();
        assert!(registry
            .get(ConfigKind::MasterConfiguration, "api.advertiseAddress")
            .is_none());
        assert!(registry.get(ConfigKind::MasterConfiguration, "token").is_none());
    }

    #[test]
    fn test_registry_covers_every_kind() {
        let registry = DefaultsRegistry::build();
        let kinds: Vec<ConfigKind> = registry.kinds().collect();
        assert_eq!(
            kinds,
            vec![ConfigKind::MasterConfiguration, ConfigKind::NodeConfiguration]
        );
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_ensure_registered_is_idempotent() {
        let first = ensure_defaults_registered();
        let second = ensure_defaults_registered();
        assert!(std::ptr::eq(first, second));
        assert_eq!(registration_count(), 1);
    }

    #[test]
    fn test_flatten_joins_arrays() {
        let mut entries = BTreeMap::new();
        let value = serde_json::json!({"sans": ["a", "b"], "empty": []});
        flatten_into(&mut entries, "", &value);
        assert_eq!(entries.get("sans").map(String::as_str), Some("a,b"));
        assert!(!entries.contains_key("empty"));
    }
}
