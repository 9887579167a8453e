//! The `ckubeadm` root command
//!
//! [`build_root`] assembles the whole command tree: the stable commands
//! directly under the root, experimental ones under the non-runnable
//! `alpha` container. [`RootCommand::execute`] normalizes the command line,
//! matches it and dispatches to the selected node.

use std::ffi::OsString;

use anyhow::Result;
use clap::{error::ErrorKind, Command as ClapCommand};
use ckubeadm_core::{constants::PROGRAM_NAME, ensure_defaults_registered};

use super::{
    node::CommandNode,
    normalize::{normalize_args, warn_word_sep_normalize, word_sep_normalize, NormalizeFn},
    sink::Sink,
};
use crate::commands::{
    completion::new_cmd_completion, config::new_cmd_config, init::new_cmd_init,
    join::new_cmd_join, phase::new_cmd_phase, reset::new_cmd_reset, token::new_cmd_token,
    upgrade::new_cmd_upgrade, version::new_cmd_version,
};

pub const ROOT_SUMMARY: &str = "ckubeadm: easily bootstrap a secure Kubernetes cluster";

const ROOT_LONG_ABOUT: &str = r"
    ┌──────────────────────────────────────────────────────────┐
    │ CKUBEADM                                                 │
    │ Easily bootstrap a secure Kubernetes cluster             │
    └──────────────────────────────────────────────────────────┘

Example usage:

    Create a two-machine cluster with one master (which controls the cluster),
    and one node (where your workloads, like Pods and Deployments run).

    ┌──────────────────────────────────────────────────────────┐
    │ On the first machine:                                    │
    ├──────────────────────────────────────────────────────────┤
    │ master# ckubeadm init                                    │
    └──────────────────────────────────────────────────────────┘

    ┌──────────────────────────────────────────────────────────┐
    │ On the second machine:                                   │
    ├──────────────────────────────────────────────────────────┤
    │ node# ckubeadm join <arguments-returned-from-init>       │
    └──────────────────────────────────────────────────────────┘

    You can then repeat the second step on as many other machines as you like.
";

pub const ALPHA: &str = "alpha";
pub const ALPHA_SUMMARY: &str = "Experimental sub-commands not yet fully functional.";

/// Factory of an experimental command mounted under `alpha`.
pub type ExperimentalFactory = fn(&Sink) -> CommandNode;

/// Commands that are only reachable through `alpha`, in help order.
pub const EXPERIMENTAL_COMMANDS: &[ExperimentalFactory] = &[new_cmd_phase];

/// Stable commands mounted directly on the root, in help order.
pub const STABLE_COMMANDS: [&str; 8] = [
    "completion",
    "config",
    "init",
    "join",
    "reset",
    "version",
    "token",
    "upgrade",
];

/// The assembled command tree together with its global policies.
#[derive(Debug)]
pub struct RootCommand {
    node: CommandNode,
    normalize: NormalizeFn,
    out: Sink,
}

impl RootCommand {
    /// A root with the plain word-separator policy and no children.
    pub fn new(node: CommandNode, out: Sink) -> Self {
        Self {
            node,
            normalize: word_sep_normalize,
            out,
        }
    }

    /// Install the flag normalization policy for the whole tree.
    pub fn set_global_normalization_fn(&mut self, normalize: NormalizeFn) {
        self.normalize = normalize;
    }

    pub fn normalization_fn(&self) -> NormalizeFn {
        self.normalize
    }

    pub const fn node(&self) -> &CommandNode {
        &self.node
    }

    /// Lower the tree to a fully built `clap::Command`.
    pub fn to_clap(&self) -> ClapCommand {
        let mut command = self.node.to_clap();
        command.build();
        command
    }

    /// Normalize and match `args` without running anything.
    ///
    /// # Errors
    ///
    /// Returns the clap error when the command line does not match the tree.
    pub fn try_get_matches_from<I, T>(&self, args: I) -> Result<clap::ArgMatches, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.to_clap()
            .try_get_matches_from(normalize_args(args, self.normalize))
    }

    /// Parse `args` (program name first) and run the selected command.
    ///
    /// # Errors
    ///
    /// Returns clap usage errors as `clap::Error` inside the `anyhow::Error`,
    /// and whatever the selected command fails with.
    pub fn execute<I, T>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut command = self.to_clap();
        let args = normalize_args(args, self.normalize);
        let matches = match command.try_get_matches_from_mut(args) {
            Ok(matches) => matches,
            Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                self.out.text(&err.render().to_string())?;
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        self.node
            .dispatch(&command, &matches, &command, &mut Vec::new(), &self.out)
    }
}

/// Build the `ckubeadm` command tree.
///
/// Registers the configuration defaults first (a no-op after the first
/// call in a process), since the factories read flag defaults from them.
pub fn build_root(out: Sink, err: Sink) -> RootCommand {
    ensure_defaults_registered();

    let mut node = CommandNode::container(PROGRAM_NAME, ROOT_SUMMARY).long_about(ROOT_LONG_ABOUT);
    node.reset_flags();

    node.add_command(new_cmd_completion(&out, ""));
    node.add_command(new_cmd_config(&out));
    node.add_command(new_cmd_init(&out));
    node.add_command(new_cmd_join(&out));
    node.add_command(new_cmd_reset(&out));
    node.add_command(new_cmd_version(&out));
    node.add_command(new_cmd_token(&out, &err));
    node.add_command(new_cmd_upgrade(&out));

    mount_experimental_group(&mut node, EXPERIMENTAL_COMMANDS, &out);

    let mut root = RootCommand::new(node, out);
    root.set_global_normalization_fn(warn_word_sep_normalize);
    tracing::debug!(
        children = root.node().children().len(),
        "built {PROGRAM_NAME} command tree"
    );
    root
}

/// Create the `alpha` container, fill it from `factories` and mount it on
/// `root`. An empty factory list still mounts an empty `alpha`.
pub fn mount_experimental_group(
    root: &mut CommandNode,
    factories: &[ExperimentalFactory],
    out: &Sink,
) {
    let alpha = factories
        .iter()
        .fold(CommandNode::container(ALPHA, ALPHA_SUMMARY), |alpha, factory| {
            alpha.subcommand(factory(out))
        });
    root.add_command(alpha);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> RootCommand {
        let (out, _) = Sink::capture();
        let (err, _) = Sink::capture();
        build_root(out, err)
    }

    #[test]
    fn test_root_identity() {
        let root = root();
        assert_eq!(root.node().name(), "ckubeadm");
        assert_eq!(root.node().about(), ROOT_SUMMARY);
        assert!(root
            .node()
            .long_about_text()
            .is_some_and(|text| text.contains("ckubeadm init") && text.contains("ckubeadm join")));
        assert!(!root.node().is_runnable());
        assert_eq!(root.node().flags().count(), 0);
    }

    #[test]
    fn test_children_in_fixed_order() {
        let root = root();
        let expected: Vec<&str> = STABLE_COMMANDS.iter().copied().chain([ALPHA]).collect();
        assert_eq!(root.node().child_names(), expected);
    }

    #[test]
    fn test_normalization_policy_installed() {
        let root = root();
        assert_eq!((root.normalization_fn())("foo_bar"), "foo-bar");
    }

    #[test]
    fn test_mount_experimental_group_on_empty_root() {
        let (out, _) = Sink::capture();
        let mut node = CommandNode::container("bare", "bare");
        mount_experimental_group(&mut node, EXPERIMENTAL_COMMANDS, &out);
        assert_eq!(node.child_names(), vec![ALPHA]);
        let alpha = &node.children()[0];
        assert!(!alpha.is_runnable());
        assert_eq!(alpha.about(), ALPHA_SUMMARY);
        assert_eq!(alpha.children().len(), EXPERIMENTAL_COMMANDS.len());
    }

    #[test]
    fn test_alpha_without_experimental_commands() {
        let (out, capture) = Sink::capture();
        let mut node = CommandNode::container(PROGRAM_NAME, ROOT_SUMMARY);
        mount_experimental_group(&mut node, &[], &out);

        let alpha = node.find_child(ALPHA).unwrap();
        assert!(!alpha.is_runnable());
        assert!(alpha.children().is_empty());

        let root = RootCommand::new(node, out);
        root.execute(["ckubeadm", "alpha"]).unwrap();
        assert!(capture.contents().contains(ALPHA_SUMMARY));
    }

    #[test]
    fn test_help_goes_to_out_sink() {
        let (out, capture) = Sink::capture();
        let (err, _) = Sink::capture();
        let root = build_root(out, err);
        root.execute(["ckubeadm", "--help"]).unwrap();
        let help = capture.contents();
        assert!(help.contains("Example usage"));
        assert!(help.contains("alpha"));
    }

    #[test]
    fn test_bare_alpha_prints_help() {
        let (out, capture) = Sink::capture();
        let (err, _) = Sink::capture();
        let root = build_root(out, err);
        root.execute(["ckubeadm", "alpha"]).unwrap();
        let help = capture.contents();
        assert!(help.contains(ALPHA_SUMMARY));
        assert!(help.contains("phase"));
    }

    #[test]
    fn test_usage_errors_stay_clap_errors() {
        let root = root();
        let err = root.execute(["ckubeadm", "no-such-command"]).unwrap_err();
        let clap_err = err.downcast_ref::<clap::Error>().unwrap();
        assert_eq!(clap_err.kind(), ErrorKind::InvalidSubcommand);
    }

    #[test]
    fn test_clap_tree_is_well_formed() {
        root().to_clap().debug_assert();
    }
}
