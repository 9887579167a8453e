//! `ckubeadm init` - plan the bootstrap of a Kubernetes master
//!
//! The configuration comes either from `--config` or from the flags, each
//! starting from the registered defaults. It is validated before anything
//! is printed.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches};
use ckubeadm_core::{
    config::{ApiEndpoint, Networking},
    plan::master_plan,
    BootstrapToken, ConfigKind, MasterConfiguration, TokenTtl,
};

use super::{
    cert_dir_arg, config_arg, default_value, load_config_arg, skip_preflight_arg, string_value,
    string_values, write_steps,
};
use crate::cli::{CommandNode, Sink};

const INIT_LONG_ABOUT: &str = concat!(
    "Run this in order to set up the Kubernetes master.\n",
    "\n",
    "The master configuration is read from --config when given, otherwise\n",
    "from the flags. The certificates, kubeconfig files, static pod\n",
    "manifests, bootstrap token and add-ons are printed in the order they\n",
    "are created, followed by the command nodes use to join the cluster."
);

/// Flags that describe the master configuration and so conflict with `--config`.
const CONFIG_FLAGS: [&str; 11] = [
    "apiserver-advertise-address",
    "apiserver-bind-port",
    "apiserver-cert-extra-sans",
    "cert-dir",
    "kubernetes-version",
    "node-name",
    "pod-network-cidr",
    "service-cidr",
    "service-dns-domain",
    "token",
    "token-ttl",
];

pub fn new_cmd_init(out: &Sink) -> CommandNode {
    let out = out.clone();
    CommandNode::leaf(
        "init",
        "Run this in order to set up the Kubernetes master",
        move |inv| run_init(inv.matches(), &out),
    )
    .long_about(INIT_LONG_ABOUT)
    .args(init_args())
}

fn init_args() -> Vec<Arg> {
    let master = |key| default_value(ConfigKind::MasterConfiguration, key);
    vec![
        config_arg().conflicts_with_all(CONFIG_FLAGS),
        Arg::new("apiserver-advertise-address")
            .long("apiserver-advertise-address")
            .value_name("ADDRESS")
            .help("The IP address the API server will advertise it's listening on"),
        Arg::new("apiserver-bind-port")
            .long("apiserver-bind-port")
            .value_name("PORT")
            .value_parser(value_parser!(u16))
            .default_value(master("api.bindPort"))
            .help("Port for the API server to bind to"),
        Arg::new("apiserver-cert-extra-sans")
            .long("apiserver-cert-extra-sans")
            .value_name("SANS")
            .value_delimiter(',')
            .action(ArgAction::Append)
            .help("Extra Subject Alternative Names for the API server serving certificate; IP addresses or DNS names"),
        cert_dir_arg(),
        Arg::new("kubernetes-version")
            .long("kubernetes-version")
            .value_name("VERSION")
            .default_value(master("kubernetesVersion"))
            .help("Choose a specific Kubernetes version for the control plane"),
        Arg::new("node-name")
            .long("node-name")
            .value_name("NAME")
            .help("Specify the node name"),
        Arg::new("pod-network-cidr")
            .long("pod-network-cidr")
            .value_name("CIDR")
            .help("Range of IP addresses for the pod network; if set, every node is allocated a CIDR from it"),
        Arg::new("service-cidr")
            .long("service-cidr")
            .value_name("CIDR")
            .default_value(master("networking.serviceSubnet"))
            .help("Use alternative range of IP address for service VIPs"),
        Arg::new("service-dns-domain")
            .long("service-dns-domain")
            .value_name("DOMAIN")
            .default_value(master("networking.dnsDomain"))
            .help("Use alternative domain for services, e.g. \"myorg.internal\""),
        Arg::new("token")
            .long("token")
            .value_name("TOKEN")
            .help("The token to use for establishing bidirectional trust between nodes and masters"),
        Arg::new("token-ttl")
            .long("token-ttl")
            .value_name("DURATION")
            .default_value(master("tokenTTL"))
            .help("The duration before the bootstrap token is automatically deleted; 0 means never expires"),
        skip_preflight_arg(),
        Arg::new("dry-run")
            .long("dry-run")
            .action(ArgAction::SetTrue)
            .help("Don't apply any changes; just output what would be done"),
    ]
}

/// Build the master configuration from `--config` or the flags.
pub fn resolve_master_config(matches: &ArgMatches) -> Result<MasterConfiguration> {
    if let Some(config) = load_config_arg::<MasterConfiguration>(matches)? {
        return Ok(config);
    }
    let defaults = MasterConfiguration::default();
    Ok(MasterConfiguration {
        api: ApiEndpoint {
            advertise_address: string_value(matches, "apiserver-advertise-address"),
            bind_port: matches
                .get_one::<u16>("apiserver-bind-port")
                .copied()
                .unwrap_or(defaults.api.bind_port),
        },
        networking: Networking {
            service_subnet: string_value(matches, "service-cidr")
                .unwrap_or(defaults.networking.service_subnet),
            pod_subnet: string_value(matches, "pod-network-cidr"),
            dns_domain: string_value(matches, "service-dns-domain")
                .unwrap_or(defaults.networking.dns_domain),
        },
        kubernetes_version: string_value(matches, "kubernetes-version")
            .unwrap_or(defaults.kubernetes_version),
        certificates_dir: string_value(matches, "cert-dir").unwrap_or(defaults.certificates_dir),
        node_name: string_value(matches, "node-name"),
        token: string_value(matches, "token"),
        token_ttl: string_value(matches, "token-ttl").unwrap_or(defaults.token_ttl),
        api_server_cert_sans: string_values(matches, "apiserver-cert-extra-sans"),
        ..defaults
    })
}

fn run_init(matches: &ArgMatches, out: &Sink) -> Result<()> {
    let config = resolve_master_config(matches)?;
    config
        .validate()
        .context("invalid master configuration")?;

    let token = match &config.token {
        Some(token) => token.parse::<BootstrapToken>()?,
        None => {
            tracing::debug!("no token given, generating one");
            BootstrapToken::generate()
        }
    };
    let ttl: TokenTtl = config.token_ttl.parse()?;

    if matches.get_flag("dry-run") {
        out.line("[dryrun] Would perform the following steps; no changes are made")?;
    }
    out.line(format_args!(
        "[init] Using Kubernetes version: {}",
        config.kubernetes_version
    ))?;
    write_steps(
        out,
        &master_plan(&config, &token, ttl, matches.get_flag("skip-preflight-checks")),
    )?;

    let endpoint = format!(
        "{}:{}",
        config
            .api
            .advertise_address
            .as_deref()
            .unwrap_or("<master-ip>"),
        config.api.bind_port
    );
    out.line("")?;
    out.line("You can now join any number of machines by running the following on each node as root:")?;
    out.line("")?;
    out.line(format_args!(
        "  ckubeadm join --token {token} {endpoint} --discovery-token-ca-cert-hash sha256:<ca-cert-hash>"
    ))?;
    Ok(())
}
