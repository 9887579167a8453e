//! `ckubeadm config` - inspect configuration documents

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{builder::PossibleValuesParser, Arg, ArgAction, ArgMatches};
use ckubeadm_core::{
    config::{document_kind, parse_document, to_yaml},
    ConfigKind, Error, MasterConfiguration, NodeConfiguration,
};
use strum::IntoEnumIterator;

use super::{config_arg, string_values};
use crate::cli::{CommandNode, Sink};

const CONFIG_LONG_ABOUT: &str = concat!(
    "Configuration documents are YAML with an apiVersion/kind header; every\n",
    "field that is left out takes its default.\n",
    "\n",
    "Use 'print-default' to see the defaults of each kind and 'view' to check\n",
    "a file the way 'init' and 'join' read it."
);

const DOCUMENT_SEPARATOR: &str = "---\n";

pub fn new_cmd_config(out: &Sink) -> CommandNode {
    CommandNode::container("config", "Manage configuration for ckubeadm")
        .long_about(CONFIG_LONG_ABOUT)
        .subcommand(new_cmd_print_default(out))
        .subcommand(new_cmd_view(out))
}

fn new_cmd_print_default(out: &Sink) -> CommandNode {
    let out = out.clone();
    CommandNode::leaf(
        "print-default",
        "Print the default values for the configuration documents",
        move |inv| {
            let kinds = selected_kinds(inv.matches())?;
            out.text(&print_defaults(&kinds)?)?;
            Ok(())
        },
    )
    .arg(
        Arg::new("api-objects")
            .long("api-objects")
            .value_name("KINDS")
            .value_delimiter(',')
            .action(ArgAction::Append)
            .value_parser(PossibleValuesParser::new(
                ConfigKind::iter().map(<&'static str>::from),
            ))
            .help("Configuration kinds to print; all kinds when omitted"),
    )
}

fn new_cmd_view(out: &Sink) -> CommandNode {
    let out = out.clone();
    CommandNode::leaf(
        "view",
        "Validate a configuration file and print it with defaults filled in",
        move |inv| {
            let path = inv
                .matches()
                .get_one::<PathBuf>("config")
                .ok_or_else(|| anyhow!("--config is required"))?;
            out.text(&view_file(path)?)?;
            Ok(())
        },
    )
    .arg(config_arg().required(true))
}

fn selected_kinds(matches: &ArgMatches) -> Result<Vec<ConfigKind>> {
    let names = string_values(matches, "api-objects");
    if names.is_empty() {
        return Ok(ConfigKind::iter().collect());
    }
    names
        .iter()
        .map(|name| {
            name.parse::<ConfigKind>()
                .with_context(|| format!("unknown configuration kind {name:?}"))
        })
        .collect()
}

/// Default documents of `kinds`, separated by `---`.
pub fn print_defaults(kinds: &[ConfigKind]) -> Result<String> {
    let documents = kinds
        .iter()
        .map(|kind| match kind {
            ConfigKind::MasterConfiguration => to_yaml(&MasterConfiguration::default()),
            ConfigKind::NodeConfiguration => to_yaml(&NodeConfiguration::default()),
        })
        .collect::<ckubeadm_core::Result<Vec<_>>>()?;
    Ok(documents.join(DOCUMENT_SEPARATOR))
}

/// Load, validate and re-render a configuration file of either kind.
pub fn view_file(path: &Path) -> Result<String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::io(path.display().to_string(), e))?;
    let source = path.display().to_string();
    let rendered = match document_kind(&source, &contents)? {
        ConfigKind::MasterConfiguration => {
            let config: MasterConfiguration = parse_document(&source, &contents)?;
            config.validate()?;
            to_yaml(&config)?
        }
        ConfigKind::NodeConfiguration => {
            let config = parse_document::<NodeConfiguration>(&source, &contents)?
                .with_token_shorthand();
            config.validate()?;
            to_yaml(&config)?
        }
    };
    tracing::debug!(path = %source, "configuration is valid");
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use ckubeadm_core::config::load_config_file;

    use super::*;
    use crate::cli::build_root;

    fn run(args: &[&str]) -> Result<String> {
        let (out, capture) = Sink::capture();
        let (err, _) = Sink::capture();
        build_root(out, err).execute(args.iter().copied())?;
        Ok(capture.contents())
    }

    fn file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_print_default_all_kinds() {
        let output = run(&["ckubeadm", "config", "print-default"]).unwrap();
        assert!(output.contains("kind: MasterConfiguration"));
        assert!(output.contains("kind: NodeConfiguration"));
        assert!(output.contains("---\n"));
        assert!(output.contains("bindPort: 6443"));
    }

    #[test]
    fn test_print_default_single_kind() {
        let output = run(&[
            "ckubeadm",
            "config",
            "print-default",
            "--api_objects",
            "NodeConfiguration",
        ])
        .unwrap();
        assert!(output.contains("kind: NodeConfiguration"));
        assert!(!output.contains("MasterConfiguration"));
        assert!(!output.contains("---"));
    }

    #[test]
    fn test_print_default_round_trips_through_view() {
        let master = print_defaults(&[ConfigKind::MasterConfiguration]).unwrap();
        let file = file(&master);
        assert_eq!(view_file(file.path()).unwrap(), master);
        assert_eq!(
            load_config_file::<MasterConfiguration>(file.path()).unwrap(),
            MasterConfiguration::default()
        );
    }

    #[test]
    fn test_view_fills_defaults_and_expands_token() {
        let file = file(concat!(
            "apiVersion: kubeadm.k8s.io/v1alpha1\n",
            "kind: NodeConfiguration\n",
            "token: abcdef.0123456789abcdef\n",
            "discoveryTokenAPIServers: [\"10.0.0.1:6443\"]\n",
            "discoveryTokenUnsafeSkipCAVerification: true\n",
        ));
        let path = file.path().to_string_lossy().into_owned();
        let output = run(&["ckubeadm", "config", "view", "--config", &path]).unwrap();
        assert!(output.contains("caCertPath: /etc/kubernetes/pki/ca.crt"));
        assert!(output.contains("tlsBootstrapToken: abcdef.0123456789abcdef"));
        assert!(load_config_file::<MasterConfiguration>(file.path()).is_err());
    }

    #[test]
    fn test_view_rejects_unknown_kind() {
        let file = file("apiVersion: kubeadm.k8s.io/v1alpha1\nkind: ClusterConfiguration\n");
        let err = view_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("unknown kind"));
    }

    #[test]
    fn test_view_rejects_headerless_file_like_init() {
        let file = file("api:\n  bindPort: 8443\ntoken: abcdef.0123456789abcdef\n");
        let err = view_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("no apiVersion"));
        assert!(load_config_file::<MasterConfiguration>(file.path()).is_err());
    }

    #[test]
    fn test_view_missing_file_is_system_error() {
        let err = view_file(Path::new("/nonexistent/ckubeadm.yaml")).unwrap_err();
        assert_eq!(crate::cli::error::get_exit_code(&err), 2);
    }

    #[test]
    fn test_view_requires_config() {
        let err = run(&["ckubeadm", "config", "view"]).unwrap_err();
        assert!(err.downcast_ref::<clap::Error>().is_some());
    }
}
