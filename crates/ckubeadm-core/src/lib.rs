//! # ckubeadm Core
//!
//! Core functionality for ckubeadm: the configuration schema and its
//! process-wide defaults registry, bootstrap tokens, Kubernetes version
//! handling and the bootstrap plan derived from a configuration.
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` - returns `Result` instead
//! - No `expect()` - returns `Result` instead
//! - No `panic!()` - returns `Result` instead
//! - No `unsafe` - safe Rust only
//!
//! ## Error Handling
//!
//! All fallible operations return `Result<T, Error>`. Use:
//! - `?` operator for propagation
//! - `map`, `and_then` combinators for transformation
//! - `match` / `map_or` / `unwrap_or_else` for defaults

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![forbid(unsafe_code)]

pub mod config;
pub mod constants;
mod error;
pub mod plan;
pub mod token;
pub mod version;

pub use config::{
    ensure_defaults_registered, registration_count, ConfigKind, DefaultsRegistry,
    MasterConfiguration, NodeConfiguration,
};
pub use error::{Error, Result};
pub use token::{BootstrapToken, TokenTtl};
pub use version::{KubernetesVersion, VersionSpec};
