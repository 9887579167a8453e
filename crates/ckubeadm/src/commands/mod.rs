//! Command factories
//!
//! Each module exposes a `new_cmd_<name>` factory returning a fully
//! configured [`CommandNode`](crate::cli::CommandNode). Factories capture
//! clones of the sinks they are given and read flag defaults from the
//! process-wide defaults registry.

pub mod completion;
pub mod config;
pub mod init;
pub mod join;
pub mod phase;
pub mod reset;
pub mod token;
pub mod upgrade;
pub mod version;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches};
use ckubeadm_core::{
    config::{load_config_file, ConfigDocument},
    ensure_defaults_registered,
    plan::PlanStep,
    ConfigKind,
};

use crate::cli::Sink;

/// Registered default for a dotted key, or `""` when the key is unknown.
pub(crate) fn default_value(kind: ConfigKind, key: &str) -> &'static str {
    ensure_defaults_registered().get(kind, key).unwrap_or_default()
}

pub(crate) fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .value_name("FILE")
        .value_parser(clap::value_parser!(PathBuf))
        .help("Path to ckubeadm config file (WARNING: usage of a configuration file is experimental)")
}

pub(crate) fn cert_dir_arg() -> Arg {
    Arg::new("cert-dir")
        .long("cert-dir")
        .value_name("DIR")
        .default_value(default_value(ConfigKind::MasterConfiguration, "certificatesDir"))
        .help("The path where to save and store the certificates")
}

pub(crate) fn skip_preflight_arg() -> Arg {
    Arg::new("skip-preflight-checks")
        .long("skip-preflight-checks")
        .action(ArgAction::SetTrue)
        .help("Skip preflight checks normally run before modifying the system")
}

pub(crate) fn string_value(matches: &ArgMatches, id: &str) -> Option<String> {
    matches.get_one::<String>(id).cloned()
}

pub(crate) fn string_values(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Load `--config` when it was given.
pub(crate) fn load_config_arg<T: ConfigDocument>(matches: &ArgMatches) -> Result<Option<T>> {
    matches
        .get_one::<PathBuf>("config")
        .map(|path| load_config(path))
        .transpose()
}

fn load_config<T: ConfigDocument>(path: &Path) -> Result<T> {
    load_config_file(path)
        .with_context(|| format!("failed to load {} from {}", T::KIND, path.display()))
}

pub(crate) fn write_steps(out: &Sink, steps: &[PlanStep]) -> Result<()> {
    steps.iter().try_for_each(|step| out.line(step))?;
    Ok(())
}
