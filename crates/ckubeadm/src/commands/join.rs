//! `ckubeadm join` - plan joining a node to a cluster

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches};
use ckubeadm_core::{plan::node_plan, NodeConfiguration};

use super::{
    config_arg, load_config_arg, skip_preflight_arg, string_value, string_values, write_steps,
};
use crate::cli::{CommandNode, Sink};

const JOIN_LONG_ABOUT: &str = concat!(
    "When joining a cluster, a bidirectional trust has to be established\n",
    "between the node and the master.\n",
    "\n",
    "Token-based discovery fetches the cluster info from one of the given API\n",
    "server endpoints and verifies the root CA public key against\n",
    "--discovery-token-ca-cert-hash (format \"sha256:<hex>\"). File-based\n",
    "discovery reads it from --discovery-file instead.\n",
    "\n",
    "--token sets both the discovery token and the TLS bootstrap token when\n",
    "they are not given separately."
);

const CONFIG_FLAGS: [&str; 8] = [
    "api-server-endpoint",
    "token",
    "discovery-token",
    "discovery-file",
    "tls-bootstrap-token",
    "discovery-token-ca-cert-hash",
    "discovery-token-unsafe-skip-ca-verification",
    "node-name",
];

pub fn new_cmd_join(out: &Sink) -> CommandNode {
    let out = out.clone();
    CommandNode::leaf(
        "join",
        "Run this on any machine you wish to join an existing cluster",
        move |inv| run_join(inv.matches(), &out),
    )
    .long_about(JOIN_LONG_ABOUT)
    .args(join_args())
}

fn join_args() -> Vec<Arg> {
    vec![
        Arg::new("api-server-endpoint")
            .value_name("API_SERVER_ENDPOINT")
            .num_args(1..)
            .action(ArgAction::Append)
            .help("host:port of an API server used for token-based discovery"),
        config_arg().conflicts_with_all(CONFIG_FLAGS),
        Arg::new("token")
            .long("token")
            .value_name("TOKEN")
            .help("Use this token for both discovery-token and tls-bootstrap-token"),
        Arg::new("discovery-token")
            .long("discovery-token")
            .value_name("TOKEN")
            .help("A token used to validate cluster information fetched from the master"),
        Arg::new("discovery-file")
            .long("discovery-file")
            .value_name("FILE")
            .help("A file or URL from which to load cluster information"),
        Arg::new("tls-bootstrap-token")
            .long("tls-bootstrap-token")
            .value_name("TOKEN")
            .help("A token used for TLS bootstrapping"),
        Arg::new("discovery-token-ca-cert-hash")
            .long("discovery-token-ca-cert-hash")
            .value_name("HASH")
            .action(ArgAction::Append)
            .help("For token-based discovery, validate that the root CA public key matches this hash (format: \"sha256:<hex>\")"),
        Arg::new("discovery-token-unsafe-skip-ca-verification")
            .long("discovery-token-unsafe-skip-ca-verification")
            .action(ArgAction::SetTrue)
            .help("For token-based discovery, allow joining without --discovery-token-ca-cert-hash pinning"),
        Arg::new("node-name")
            .long("node-name")
            .value_name("NAME")
            .help("Specify the node name"),
        skip_preflight_arg(),
    ]
}

/// Build the node configuration from `--config` or the flags, then expand
/// the `token` shorthand.
pub fn resolve_node_config(matches: &ArgMatches) -> Result<NodeConfiguration> {
    let config = match load_config_arg::<NodeConfiguration>(matches)? {
        Some(config) => config,
        None => NodeConfiguration {
            discovery_file: string_value(matches, "discovery-file"),
            discovery_token: string_value(matches, "discovery-token"),
            discovery_token_api_servers: string_values(matches, "api-server-endpoint"),
            discovery_token_ca_cert_hashes: string_values(matches, "discovery-token-ca-cert-hash"),
            discovery_token_unsafe_skip_ca_verification: matches
                .get_flag("discovery-token-unsafe-skip-ca-verification"),
            node_name: string_value(matches, "node-name"),
            tls_bootstrap_token: string_value(matches, "tls-bootstrap-token"),
            token: string_value(matches, "token"),
            ..NodeConfiguration::default()
        },
    };
    Ok(config.with_token_shorthand())
}

fn run_join(matches: &ArgMatches, out: &Sink) -> Result<()> {
    let config = resolve_node_config(matches)?;
    config.validate().context("invalid node configuration")?;
    if config.discovery_token_unsafe_skip_ca_verification {
        tracing::warn!("token-based discovery without CA pinning is unsafe");
    }
    write_steps(
        out,
        &node_plan(&config, matches.get_flag("skip-preflight-checks")),
    )?;
    out.line("")?;
    out.line("Run 'kubectl get nodes' on the master to see this machine join once it is up.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::build_root;

    const TOKEN: &str = "abcdef.0123456789abcdef";
    const HASH: &str = "sha256:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn run(args: &[&str]) -> Result<String> {
        let (out, capture) = Sink::capture();
        let (err, _) = Sink::capture();
        build_root(out, err).execute(args.iter().copied())?;
        Ok(capture.contents())
    }

    #[test]
    fn test_token_discovery_with_pinning() {
        let output = run(&[
            "ckubeadm",
            "join",
            "--token",
            TOKEN,
            "10.0.0.1:6443",
            "--discovery-token-ca-cert-hash",
            HASH,
        ])
        .unwrap();
        assert!(output.contains("10.0.0.1:6443"));
        assert!(output.contains("1 pinned public key hash"));
        assert!(!output.contains("0123456789abcdef0123"));
    }

    #[test]
    fn test_missing_pin_is_rejected() {
        let err = run(&["ckubeadm", "join", "--token", TOKEN, "10.0.0.1:6443"]).unwrap_err();
        assert!(format!("{err:#}").contains("discoveryTokenCACertHashes"));
    }

    #[test]
    fn test_unsafe_skip_allows_missing_pin() {
        let output = run(&[
            "ckubeadm",
            "join",
            "--token",
            TOKEN,
            "10.0.0.1:6443",
            "--discovery_token_unsafe_skip_ca_verification",
        ])
        .unwrap();
        assert!(output.contains("skip CA public key pinning"));
    }

    #[test]
    fn test_file_discovery() {
        let output = run(&[
            "ckubeadm",
            "join",
            "--discovery-file",
            "/etc/kubernetes/discovery.yaml",
            "--tls-bootstrap-token",
            TOKEN,
        ])
        .unwrap();
        assert!(output.contains("read cluster-info from /etc/kubernetes/discovery.yaml"));
    }

    #[test]
    fn test_no_discovery_method() {
        let err = run(&["ckubeadm", "join"]).unwrap_err();
        assert!(err.downcast_ref::<ckubeadm_core::Error>().is_some());
    }
}
