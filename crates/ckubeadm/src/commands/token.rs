//! `ckubeadm token` - bootstrap token management

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgAction, ArgMatches};
use ckubeadm_core::{
    constants::{DEFAULT_TOKEN_GROUP, DEFAULT_TOKEN_USAGES},
    token::{validate_groups, validate_usages},
    BootstrapToken, ConfigKind, TokenTtl,
};

use super::{default_value, string_value, string_values};
use crate::cli::{CommandNode, Sink};

const TOKEN_LONG_ABOUT: &str = concat!(
    "This command manages bootstrap tokens. It is optional and needed only for\n",
    "advanced use cases.\n",
    "\n",
    "Bootstrap tokens establish bidirectional trust between a client and a\n",
    "server. A node about to join the cluster uses a token with the \"signing\"\n",
    "usage to trust the master it talks to; a token with the \"authentication\"\n",
    "usage lets the API server trust the node for the TLS bootstrap.\n",
    "\n",
    "A bootstrap token must be of the form \"[a-z0-9]{6}.[a-z0-9]{16}\". The first\n",
    "part is the public token id, the second is the token secret, which must be\n",
    "kept private."
);

/// `token` with its `generate` and `create` subcommands.
///
/// Token values go to `out`; warnings about them go to `err`.
pub fn new_cmd_token(out: &Sink, err: &Sink) -> CommandNode {
    CommandNode::container("token", "Manage bootstrap tokens")
        .long_about(TOKEN_LONG_ABOUT)
        .subcommand(new_cmd_token_generate(out))
        .subcommand(new_cmd_token_create(out, err))
}

fn new_cmd_token_generate(out: &Sink) -> CommandNode {
    let out = out.clone();
    CommandNode::leaf(
        "generate",
        "Generate and print a bootstrap token, but do not create it on the server",
        move |_| {
            out.line(BootstrapToken::generate())?;
            Ok(())
        },
    )
    .long_about(concat!(
        "Generate and print a bootstrap token, but do not create it on the server.\n",
        "\n",
        "The token can be passed to 'ckubeadm init --token' or 'ckubeadm token create'.\n",
        "Tokens are random and of the form \"[a-z0-9]{6}.[a-z0-9]{16}\"."
    ))
}

fn new_cmd_token_create(out: &Sink, err: &Sink) -> CommandNode {
    let out = out.clone();
    let err = err.clone();
    CommandNode::leaf(
        "create",
        "Create bootstrap tokens on the server",
        move |inv| run_create(inv.matches(), &out, &err),
    )
    .arg(
        Arg::new("token")
            .value_name("TOKEN")
            .help("Token to create; a random one is generated when omitted"),
    )
    .arg(
        Arg::new("ttl")
            .long("ttl")
            .value_name("DURATION")
            .default_value(default_value(ConfigKind::MasterConfiguration, "tokenTTL"))
            .help("The duration before the token is automatically deleted (e.g. 1s, 2m, 3h); 0 means never expires"),
    )
    .arg(
        Arg::new("description")
            .long("description")
            .value_name("TEXT")
            .help("A human friendly description of how this token is used"),
    )
    .arg(
        Arg::new("usages")
            .long("usages")
            .value_name("USAGES")
            .value_delimiter(',')
            .action(ArgAction::Append)
            .default_values(DEFAULT_TOKEN_USAGES.iter().copied())
            .help("Describes the ways in which this token can be used"),
    )
    .arg(
        Arg::new("groups")
            .long("groups")
            .value_name("GROUPS")
            .value_delimiter(',')
            .action(ArgAction::Append)
            .default_value(DEFAULT_TOKEN_GROUP)
            .help("Extra groups this token will authenticate as when used for authentication"),
    )
}

/// A validated token request.
#[derive(Debug)]
pub struct TokenRequest {
    pub token: BootstrapToken,
    pub ttl: TokenTtl,
    pub description: Option<String>,
    pub usages: Vec<String>,
    pub groups: Vec<String>,
}

impl TokenRequest {
    /// Parse and validate the `create` arguments.
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let token = match string_value(matches, "token") {
            Some(token) => token.parse()?,
            None => BootstrapToken::generate(),
        };
        let ttl: TokenTtl = string_value(matches, "ttl")
            .ok_or_else(|| anyhow!("--ttl has no value"))?
            .parse()?;
        let usages = string_values(matches, "usages");
        validate_usages(&usages)?;
        let groups = string_values(matches, "groups");
        validate_groups(&groups)?;
        Ok(Self {
            token,
            ttl,
            description: string_value(matches, "description"),
            usages,
            groups,
        })
    }
}

fn run_create(matches: &ArgMatches, out: &Sink, err: &Sink) -> Result<()> {
    let request = TokenRequest::from_matches(matches).context("failed to create token")?;
    tracing::debug!(
        token_id = request.token.id(),
        ttl_secs = request.ttl.as_duration().as_secs(),
        usages = ?request.usages,
        groups = ?request.groups,
        "creating bootstrap token"
    );
    if request.ttl.never_expires() {
        err.line(
            "[token] WARNING: TTL 0 means this token never expires; delete it once it is no longer needed",
        )?;
    }
    out.line(&request.token)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::build_root;

    #[derive(Debug)]
    struct Output {
        out: String,
        err: String,
    }

    fn run(args: &[&str]) -> Result<Output> {
        let (out, out_capture) = Sink::capture();
        let (err, err_capture) = Sink::capture();
        build_root(out, err).execute(args.iter().copied())?;
        Ok(Output {
            out: out_capture.contents(),
            err: err_capture.contents(),
        })
    }

    fn is_token(line: &str) -> bool {
        line.trim_end().parse::<BootstrapToken>().is_ok()
    }

    #[test]
    fn test_generate_prints_a_token() {
        let output = run(&["ckubeadm", "token", "generate"]).unwrap();
        assert!(is_token(&output.out));
        assert!(output.err.is_empty());
    }

    #[test]
    fn test_create_echoes_given_token() {
        let output = run(&["ckubeadm", "token", "create", "abcdef.0123456789abcdef"]).unwrap();
        assert_eq!(output.out, "abcdef.0123456789abcdef\n");
        assert!(output.err.is_empty());
    }

    #[test]
    fn test_zero_ttl_warns_on_err_sink() {
        let output = run(&["ckubeadm", "token", "create", "--ttl", "0"]).unwrap();
        assert!(is_token(&output.out));
        assert!(output.err.contains("never expires"));
    }

    #[test]
    fn test_unknown_usage_is_rejected() {
        let err = run(&["ckubeadm", "token", "create", "--usages", "signing,bogus"]).unwrap_err();
        assert!(format!("{err:#}").contains("bogus"));
        assert!(err.downcast_ref::<ckubeadm_core::Error>().is_some());
    }

    #[test]
    fn test_group_without_prefix_is_rejected() {
        let err = run(&["ckubeadm", "token", "create", "--groups", "system:nodes"]).unwrap_err();
        assert!(format!("{err:#}").contains("system:bootstrappers:"));
    }

    #[test]
    fn test_bare_token_prints_help() {
        let output = run(&["ckubeadm", "token"]).unwrap();
        assert!(output.out.contains("generate"));
        assert!(output.out.contains("create"));
    }
}
