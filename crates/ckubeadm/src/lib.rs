//! # ckubeadm
//!
//! The `ckubeadm` command tree: stable commands on the root, experimental
//! ones under `alpha`, one flag normalization policy for the whole tree.
//!
//! ```no_run
//! use ckubeadm::cli::{build_root, Sink};
//!
//! let root = build_root(Sink::stdout(), Sink::stderr());
//! root.execute(["ckubeadm", "version", "-o", "short"])?;
//! # Ok::<(), anyhow::Error>(())
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;

pub use cli::{build_root, mount_experimental_group, RootCommand};
