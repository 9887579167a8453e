//! Configuration schema, defaults and loading
//!
//! # Resolution
//!
//! Commands resolve their configuration in this order:
//! 1. Built-in defaults (also published through the [`DefaultsRegistry`])
//! 2. Either a `--config` file or the command-line flags, never both
//! 3. Validation
//!
//! # Example Config
//!
//! ```yaml
//! apiVersion: kubeadm.k8s.io/v1alpha1
//! kind: MasterConfiguration
//! api:
//!   advertiseAddress: 10.0.0.10
//!   bindPort: 6443
//! networking:
//!   podSubnet: 10.244.0.0/16
//! kubernetesVersion: v1.9.2
//! ```
//!
//! # Module Structure
//!
//! - `types`: Configuration structure definitions
//! - `defaults`: Default value implementations
//! - `registry`: Process-wide flattened defaults
//! - `load`: Parsing documents and files
//! - `validate`: Field validation

mod defaults;
mod load;
mod registry;
mod types;
mod validate;

pub use load::{document_kind, load_config_file, parse_document, to_yaml, ConfigDocument};
pub use registry::{ensure_defaults_registered, registration_count, DefaultsRegistry};
pub use types::{ApiEndpoint, ConfigKind, MasterConfiguration, Networking, NodeConfiguration};
pub use validate::{validate_ca_cert_hash, validate_cidr};
