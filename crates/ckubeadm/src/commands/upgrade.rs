//! `ckubeadm upgrade` - check and plan control plane upgrades
//!
//! Targets are checked against the supported version window
//! ([`MINIMUM_CONTROL_PLANE_VERSION`] up to the [`SUPPORTED_VERSION`] minor).
//! Pre-releases and newer minors need `--allow-experimental-upgrades`.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches};
use ckubeadm_core::{
    plan::{etcd_manifest_path, ControlPlaneComponent},
    version::{MINIMUM_CONTROL_PLANE_VERSION, SUPPORTED_VERSION},
    KubernetesVersion,
};
use itertools::Itertools;
use strum::IntoEnumIterator;

use super::string_value;
use crate::cli::{CommandNode, Sink};

pub fn new_cmd_upgrade(out: &Sink) -> CommandNode {
    CommandNode::container(
        "upgrade",
        "Upgrade your cluster smoothly to a newer version with this command",
    )
    .subcommand(new_cmd_upgrade_plan(out))
    .subcommand(new_cmd_upgrade_apply(out))
}

fn allow_experimental_arg() -> Arg {
    Arg::new("allow-experimental-upgrades")
        .long("allow-experimental-upgrades")
        .action(ArgAction::SetTrue)
        .help("Allow upgrading to alpha/beta/release candidate versions and to versions newer than the supported one")
}

fn new_cmd_upgrade_plan(out: &Sink) -> CommandNode {
    let out = out.clone();
    CommandNode::leaf(
        "plan",
        "Check which versions are available to upgrade to and validate whether your cluster is upgradeable",
        move |inv| run_plan(inv.matches(), &out),
    )
    .arg(
        Arg::new("version")
            .value_name("VERSION")
            .help("Version to plan the upgrade to; defaults to the supported version"),
    )
    .arg(allow_experimental_arg())
}

fn new_cmd_upgrade_apply(out: &Sink) -> CommandNode {
    let out = out.clone();
    CommandNode::leaf(
        "apply",
        "Upgrade your Kubernetes cluster to the specified version",
        move |inv| run_apply(inv.matches(), &out),
    )
    .arg(
        Arg::new("version")
            .value_name("VERSION")
            .required(true)
            .help("Version to upgrade to"),
    )
    .arg(allow_experimental_arg())
    .arg(
        Arg::new("dry-run")
            .long("dry-run")
            .action(ArgAction::SetTrue)
            .help("Do not change any state, just output what actions would be performed"),
    )
    .arg(
        Arg::new("force")
            .long("force")
            .action(ArgAction::SetTrue)
            .help("Force upgrading although some requirements might not be met; implies non-interactive mode"),
    )
    .arg(
        Arg::new("yes")
            .short('y')
            .long("yes")
            .action(ArgAction::SetTrue)
            .help("Perform the upgrade and do not prompt for confirmation"),
    )
}

fn target_version(matches: &ArgMatches) -> Result<KubernetesVersion> {
    string_value(matches, "version").map_or(Ok(SUPPORTED_VERSION), |version| {
        version
            .parse()
            .with_context(|| format!("invalid upgrade target {version:?}"))
    })
}

/// Lines describing how every control plane component moves to `target`.
pub fn upgrade_steps(target: &KubernetesVersion) -> Vec<String> {
    ControlPlaneComponent::iter()
        .map(|component| {
            format!(
                "{} -> {target}: {}",
                component.pod_name(),
                component.manifest_path().display()
            )
        })
        .chain(std::iter::once(format!(
            "etcd: {} (unchanged)",
            etcd_manifest_path().display()
        )))
        .collect()
}

fn run_plan(matches: &ArgMatches, out: &Sink) -> Result<()> {
    let target = target_version(matches)?;
    out.line(format_args!(
        "[upgrade/versions] Supported control plane versions: {MINIMUM_CONTROL_PLANE_VERSION} to {}.{}.x",
        SUPPORTED_VERSION.major(),
        SUPPORTED_VERSION.minor()
    ))?;
    target.check_upgrade_target(matches.get_flag("allow-experimental-upgrades"))?;
    out.line(format_args!("[upgrade/versions] Target version: {target}"))?;
    out.line("")?;
    out.line("Components that will be upgraded:")?;
    upgrade_steps(&target)
        .iter()
        .try_for_each(|step| out.line(format_args!("  {step}")))?;
    out.line("")?;
    out.line(format_args!(
        "You can now apply the upgrade by executing: ckubeadm upgrade apply {target}"
    ))?;
    Ok(())
}

fn run_apply(matches: &ArgMatches, out: &Sink) -> Result<()> {
    let target = string_value(matches, "version")
        .ok_or_else(|| anyhow!("a version to upgrade to is required"))?;
    let target: KubernetesVersion = target
        .parse()
        .with_context(|| format!("invalid upgrade target {target:?}"))?;
    let force = matches.get_flag("force");
    let dry_run = matches.get_flag("dry-run");

    if let Err(err) = target.check_upgrade_target(matches.get_flag("allow-experimental-upgrades")) {
        if !force {
            return Err(err.into());
        }
        tracing::warn!(error = %err, "ignoring version check because of --force");
    }
    if !(dry_run || force || matches.get_flag("yes")) {
        bail!("upgrade apply needs confirmation; pass -y/--yes, --force or --dry-run");
    }

    let prefix = if dry_run { "[dryrun]" } else { "[upgrade/apply]" };
    out.line(format_args!("{prefix} Upgrading your static pod-hosted control plane to version {target}"))?;
    let steps = upgrade_steps(&target);
    tracing::debug!(steps = %steps.iter().join("; "), "upgrade steps");
    steps
        .iter()
        .try_for_each(|step| out.line(format_args!("{prefix} {step}")))?;
    Ok(())
}
