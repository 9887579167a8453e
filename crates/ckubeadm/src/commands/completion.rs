//! Shell completion generation command
//!
//! Generates completion scripts for bash and zsh from the built command
//! tree, so every command mounted on the root is covered.

use anyhow::{anyhow, Context, Result};
use clap::{builder::PossibleValuesParser, Arg};
use clap_complete::{generate, Shell};
use ckubeadm_core::constants::PROGRAM_NAME;
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::cli::{CommandNode, Invocation, Sink};

const COMPLETION_LONG_ABOUT: &str = concat!(
    "Output shell completion code for the specified shell (bash or zsh).\n",
    "The shell code must be evaluated to provide interactive completion of\n",
    "ckubeadm commands. This can be done by sourcing it from .bash_profile.\n",
    "\n",
    "Examples:\n",
    "  # Load the ckubeadm completion code for bash into the current shell\n",
    "  source <(ckubeadm completion bash)\n",
    "\n",
    "  # Write bash completion code to a file and source it from .bash_profile\n",
    "  ckubeadm completion bash > ~/.kube/ckubeadm_completion.bash.inc\n",
    "  printf \"\\n# ckubeadm shell completion\\nsource '$HOME/.kube/ckubeadm_completion.bash.inc'\\n\" >> $HOME/.bash_profile\n",
    "  source $HOME/.bash_profile\n",
    "\n",
    "  # Load the ckubeadm completion code for zsh into the current shell\n",
    "  source <(ckubeadm completion zsh)"
);

/// Shells a completion script can be generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum CompletionShell {
    Bash,
    Zsh,
}

impl CompletionShell {
    pub fn name(self) -> &'static str {
        self.into()
    }

    const fn to_clap_shell(self) -> Shell {
        match self {
            Self::Bash => Shell::Bash,
            Self::Zsh => Shell::Zsh,
        }
    }
}

/// `completion SHELL`
///
/// `boilerplate` is written verbatim ahead of the generated script.
pub fn new_cmd_completion(out: &Sink, boilerplate: &str) -> CommandNode {
    let out = out.clone();
    let boilerplate = boilerplate.to_string();
    CommandNode::leaf(
        "completion",
        "Output shell completion code for the specified shell (bash or zsh)",
        move |inv| run_completion(inv, &out, &boilerplate),
    )
    .long_about(COMPLETION_LONG_ABOUT)
    .arg(
        Arg::new("shell")
            .value_name("SHELL")
            .required(true)
            .value_parser(PossibleValuesParser::new(
                CompletionShell::iter().map(CompletionShell::name),
            ))
            .help("Shell to generate completion code for"),
    )
}

fn run_completion(inv: &Invocation<'_>, out: &Sink, boilerplate: &str) -> Result<()> {
    let name = inv
        .matches()
        .get_one::<String>("shell")
        .ok_or_else(|| anyhow!("shell not specified"))?;
    let shell: CompletionShell = name
        .parse()
        .with_context(|| format!("unsupported shell type {name:?}"))?;
    tracing::debug!(shell = shell.name(), "generating completion script");

    if !boilerplate.is_empty() {
        out.text(boilerplate)?;
    }
    let mut command = inv.root().clone();
    let mut writer = out.clone();
    generate(shell.to_clap_shell(), &mut command, PROGRAM_NAME, &mut writer);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{build_root, RootCommand};

    fn run(args: &[&str]) -> String {
        let (out, capture) = Sink::capture();
        let (err, _) = Sink::capture();
        build_root(out, err).execute(args.iter().copied()).unwrap();
        capture.contents()
    }

    #[test]
    fn test_bash_script_covers_the_tree() {
        let script = run(&["ckubeadm", "completion", "bash"]);
        assert!(script.contains("_ckubeadm"));
        assert!(script.contains("alpha"));
        assert!(script.contains("upgrade"));
    }

    #[test]
    fn test_zsh_script() {
        let script = run(&["ckubeadm", "completion", "zsh"]);
        assert!(script.starts_with("#compdef ckubeadm"));
    }

    #[test]
    fn test_boilerplate_comes_first() {
        let (out, capture) = Sink::capture();
        let root = RootCommand::new(
            CommandNode::container(PROGRAM_NAME, "test root")
                .subcommand(new_cmd_completion(&out, "# generated for tests\n")),
            out,
        );
        root.execute(["ckubeadm", "completion", "bash"]).unwrap();
        assert!(capture.contents().starts_with("# generated for tests\n"));
    }

    #[test]
    fn test_unknown_shell_is_a_usage_error() {
        let (out, _) = Sink::capture();
        let (err, _) = Sink::capture();
        let err = build_root(out, err)
            .execute(["ckubeadm", "completion", "fish"])
            .unwrap_err();
        assert!(err.downcast_ref::<clap::Error>().is_some());
    }
}
