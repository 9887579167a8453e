//! Declarative command nodes
//!
//! A [`CommandNode`] is one addressable entry of the command tree: a name,
//! help text, declared flags, ordered children and an optional action.
//! Nodes with an action are runnable leaves; nodes without one are
//! containers that only namespace their children. The tree lowers to a
//! `clap::Command` for matching, and [`CommandNode::dispatch`] walks the
//! matched subcommand chain back to the node that should run.

use anyhow::{anyhow, Result};
use clap::{Arg, ArgMatches, Command as ClapCommand};

use super::sink::Sink;

/// What a runnable node does once its arguments are matched.
pub type Action = Box<dyn Fn(&Invocation<'_>) -> Result<()>>;

/// Everything an action gets to see about the current invocation.
pub struct Invocation<'a> {
    matches: &'a ArgMatches,
    root: &'a ClapCommand,
    path: &'a [&'static str],
}

impl<'a> Invocation<'a> {
    pub const fn new(
        matches: &'a ArgMatches,
        root: &'a ClapCommand,
        path: &'a [&'static str],
    ) -> Self {
        Self {
            matches,
            root,
            path,
        }
    }

    /// Matches of the command being run.
    pub const fn matches(&self) -> &'a ArgMatches {
        self.matches
    }

    /// The whole built command tree, for introspection such as completions.
    pub const fn root(&self) -> &'a ClapCommand {
        self.root
    }

    /// Names from the first child of the root down to the running command.
    pub const fn path(&self) -> &'a [&'static str] {
        self.path
    }

    /// `ckubeadm alpha phase certs ca`
    pub fn command_path(&self) -> String {
        std::iter::once(self.root.get_name())
            .chain(self.path.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub struct CommandNode {
    name: &'static str,
    about: String,
    long_about: Option<String>,
    args: Vec<Arg>,
    children: Vec<CommandNode>,
    action: Option<Action>,
}

impl CommandNode {
    /// A non-runnable node that only groups its children.
    pub fn container(name: &'static str, about: impl Into<String>) -> Self {
        Self {
            name,
            about: about.into(),
            long_about: None,
            args: Vec::new(),
            children: Vec::new(),
            action: None,
        }
    }

    /// A runnable node.
    pub fn leaf<F>(name: &'static str, about: impl Into<String>, action: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<()> + 'static,
    {
        Self {
            action: Some(Box::new(action)),
            ..Self::container(name, about)
        }
    }

    pub fn long_about(mut self, text: impl Into<String>) -> Self {
        self.long_about = Some(text.into());
        self
    }


    pub fn arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = Arg>) -> Self {
        self.args.extend(args);
        self
    }

    /// Builder form of [`CommandNode::add_command`].
    pub fn subcommand(mut self, child: Self) -> Self {
        self.add_command(child);
        self
    }

    /// Mount `child` as the last child of this node.
    ///
    /// Sibling names must be unique; a duplicate is a defect in the
    /// compiled command list.
    pub fn add_command(&mut self, child: Self) {
        debug_assert!(
            self.find_child(child.name).is_none(),
            "command {:?} already has a child named {:?}",
            self.name,
            child.name
        );
        tracing::trace!(parent = self.name, child = child.name, "mounting command");
        self.children.push(child);
    }

    /// Drop every flag declared on this node (children keep theirs).
    pub fn reset_flags(&mut self) {
        self.args.clear();
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn about(&self) -> &str {
        &self.about
    }

    pub fn long_about_text(&self) -> Option<&str> {
        self.long_about.as_deref()
    }

    pub const fn is_runnable(&self) -> bool {
        self.action.is_some()
    }

    pub fn children(&self) -> &[Self] {
        &self.children
    }

    pub fn child_names(&self) -> Vec<&'static str> {
        self.children.iter().map(Self::name).collect()
    }

    pub fn find_child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn flags(&self) -> impl Iterator<Item = &Arg> {
        self.args.iter()
    }

    /// Lower this node and its descendants to a `clap::Command`.
    pub fn to_clap(&self) -> ClapCommand {
        let command = ClapCommand::new(self.name)
            .about(self.about.clone())
            .args(self.args.iter().cloned())
            .subcommands(self.children.iter().map(Self::to_clap));
        match &self.long_about {
            Some(long_about) => command.long_about(long_about.clone()),
            None => command,
        }
    }

    /// Run the node selected by `matches`.
    ///
    /// `built` is the clap command lowered from this node, `root` the whole
    /// built tree. A container reached without a subcommand writes its help
    /// to `help_out` instead of failing.
    pub fn dispatch(
        &self,
        built: &ClapCommand,
        matches: &ArgMatches,
        root: &ClapCommand,
        path: &mut Vec<&'static str>,
        help_out: &Sink,
    ) -> Result<()> {
        if let Some((name, sub_matches)) = matches.subcommand() {
            let child = self
                .find_child(name)
                .ok_or_else(|| anyhow!("unknown command {name:?} for {:?}", self.name))?;
            let built_child = built
                .find_subcommand(name)
                .ok_or_else(|| anyhow!("command {name:?} missing from the built tree"))?;
            path.push(child.name);
            return child.dispatch(built_child, sub_matches, root, path, help_out);
        }

        match &self.action {
            Some(action) => {
                tracing::debug!(command = self.name, "running command");
                action(&Invocation::new(matches, root, path))
            }
            None => {
                tracing::debug!(command = self.name, "no subcommand given, printing help");
                let help = built.clone().render_long_help();
                help_out.text(&help.to_string())?;
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("runnable", &self.is_runnable())
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}
