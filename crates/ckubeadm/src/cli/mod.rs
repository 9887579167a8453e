//! CLI plumbing: the command tree, flag normalization, output sinks and
//! process setup.

pub mod error;
pub mod node;
pub mod normalize;
pub mod root;
pub mod setup;
pub mod sink;

pub use node::{Action, CommandNode, Invocation};
pub use normalize::{normalize_args, warn_word_sep_normalize, word_sep_normalize, NormalizeFn};
pub use root::{
    build_root, mount_experimental_group, ExperimentalFactory, RootCommand, ALPHA,
    EXPERIMENTAL_COMMANDS, STABLE_COMMANDS,
};
pub use sink::{Capture, Sink};
