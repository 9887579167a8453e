//! `ckubeadm alpha phase` - run single steps of `init`
//!
//! Every group has one leaf per artifact plus an `all` leaf. Leaves resolve
//! the master configuration from `--config` (or the defaults with
//! `--cert-dir` applied), validate it and print what the step produces.

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches};
use ckubeadm_core::{
    plan::{
        addon_step, certificate_step, controlplane_step, etcd_step, kubeconfig_step,
        markmaster_step, master_preflight_checks, node_preflight_checks, Addon, Certificate,
        ControlPlaneComponent, Kubeconfig, PlanStep,
    },
    MasterConfiguration, NodeConfiguration,
};
use strum::IntoEnumIterator;

use super::{cert_dir_arg, config_arg, load_config_arg, string_value, write_steps};
use crate::cli::{CommandNode, Sink};

type StepFn<T> = fn(T, &MasterConfiguration) -> PlanStep;

pub fn new_cmd_phase(out: &Sink) -> CommandNode {
    CommandNode::container("phase", "Invoke subsets of ckubeadm functions separately for a manual install")
        .long_about(concat!(
            "Invoke subsets of the 'init' workflow separately for a manual install.\n",
            "\n",
            "Each phase prints the artifacts it produces for the resolved master\n",
            "configuration. The 'all' subcommand of a group covers every artifact\n",
            "of that group in 'init' order."
        ))
        .subcommand(new_cmd_preflight(out))
        .subcommand(phase_group(
            "certs",
            "Generate certificates for a Kubernetes cluster",
            "Generate all PKI assets necessary to establish the control plane",
            Certificate::name,
            |c| c.description().to_string(),
            certificate_step,
            out,
        ))
        .subcommand(phase_group(
            "kubeconfig",
            "Generate all kubeconfig files necessary to establish the control plane and the admin kubeconfig file",
            "Generate all kubeconfig files",
            Kubeconfig::name,
            |k| k.description().to_string(),
            |k, _| kubeconfig_step(k),
            out,
        ))
        .subcommand(phase_group(
            "controlplane",
            "Generate all static pod manifest files necessary to establish the control plane",
            "Generate all static pod manifest files",
            ControlPlaneComponent::name,
            |c| format!("Generate the static pod manifest for {}", c.pod_name()),
            controlplane_step,
            out,
        ))
        .subcommand(
            CommandNode::container("etcd", "Generate static pod manifest file for etcd")
                .subcommand(phase_leaf(
                    "local",
                    "Generate the static pod manifest file for a single-node etcd",
                    |_| vec![etcd_step()],
                    out,
                )),
        )
        .subcommand(phase_leaf(
            "mark-master",
            "Mark a node as master",
            |config| vec![markmaster_step(config)],
            out,
        ))
        .subcommand(phase_group(
            "addon",
            "Install an addon to a Kubernetes cluster",
            "Install all addons",
            Addon::name,
            |a| format!("Install the {} addon", a.name()),
            addon_step,
            out,
        ))
}

fn phase_args() -> [Arg; 2] {
    [config_arg().conflicts_with("cert-dir"), cert_dir_arg()]
}

/// A container named `name` with an `all` leaf followed by one leaf per
/// variant of `T`.
fn phase_group<T>(
    name: &'static str,
    about: &'static str,
    all_about: &'static str,
    item_name: fn(T) -> &'static str,
    item_about: fn(T) -> String,
    step: StepFn<T>,
    out: &Sink,
) -> CommandNode
where
    T: IntoEnumIterator + Copy + 'static,
{
    let all = phase_leaf(
        "all",
        all_about,
        move |config| T::iter().map(|item| step(item, config)).collect(),
        out,
    );
    T::iter().fold(
        CommandNode::container(name, about).subcommand(all),
        |group, item| {
            group.subcommand(phase_leaf(
                item_name(item),
                item_about(item),
                move |config| vec![step(item, config)],
                out,
            ))
        },
    )
}

fn phase_leaf<F>(
    name: &'static str,
    about: impl Into<String>,
    steps: F,
    out: &Sink,
) -> CommandNode
where
    F: Fn(&MasterConfiguration) -> Vec<PlanStep> + 'static,
{
    let out = out.clone();
    CommandNode::leaf(name, about, move |inv| {
        let config = resolve_master_config(inv.matches())?;
        tracing::debug!(phase = %inv.command_path(), "running phase");
        write_steps(&out, &steps(&config))
    })
    .args(phase_args())
}

fn new_cmd_preflight(out: &Sink) -> CommandNode {
    let master_out = out.clone();
    let node_out = out.clone();
    CommandNode::container("preflight", "Run pre-flight checks")
        .subcommand(
            CommandNode::leaf("master", "Run master pre-flight checks", move |inv| {
                let config = resolve_master_config(inv.matches())?;
                write_steps(&master_out, &master_preflight_checks(&config))
            })
            .args(phase_args()),
        )
        .subcommand(
            CommandNode::leaf("node", "Run node pre-flight checks", move |inv| {
                let config = load_config_arg::<NodeConfiguration>(inv.matches())?
                    .unwrap_or_default();
                write_steps(&node_out, &node_preflight_checks(&config))
            })
            .arg(config_arg()),
        )
}

/// `--config` when given, otherwise the defaults with `--cert-dir` applied.
fn resolve_master_config(matches: &ArgMatches) -> Result<MasterConfiguration> {
    let config = match load_config_arg::<MasterConfiguration>(matches)? {
        Some(config) => config,
        None => MasterConfiguration {
            certificates_dir: string_value(matches, "cert-dir")
                .ok_or_else(|| anyhow!("--cert-dir has no value"))?,
            ..MasterConfiguration::default()
        },
    };
    config
        .validate()
        .context("invalid master configuration")?;
    Ok(config)
}
