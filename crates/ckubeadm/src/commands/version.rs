//! Version command - build information in human, short, JSON or YAML form

use anyhow::{Context, Result};
use clap::{builder::PossibleValuesParser, Arg};
use ckubeadm_core::constants::PROGRAM_NAME;
use serde::Serialize;
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::cli::{CommandNode, Sink};

/// Formats selectable with `--output`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    Short,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Version output structure
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionOutput {
    pub client_version: VersionInfo,
}

/// Detailed version information
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub major: String,
    pub minor: String,
    /// `v` followed by the package version
    pub git_version: String,
    /// Git commit hash (if available at build time)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<String>,
    /// Build timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_date: Option<String>,
    /// Rust version used for compilation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rust_version: Option<String>,
    pub platform: String,
}

pub fn new_cmd_version(out: &Sink) -> CommandNode {
    let out = out.clone();
    CommandNode::leaf("version", "Print the version of ckubeadm", move |inv| {
        let format = inv
            .matches()
            .get_one::<String>("output")
            .map(|name| name.parse::<OutputFormat>())
            .transpose()
            .context("invalid output format")?;
        run(format, &out)
    })
    .arg(
        Arg::new("output")
            .short('o')
            .long("output")
            .value_name("FORMAT")
            .value_parser(PossibleValuesParser::new(
                OutputFormat::iter().map(OutputFormat::name),
            ))
            .help("Output format; available options are 'short', 'json' and 'yaml'"),
    )
}

/// Run the version command
pub fn run(format: Option<OutputFormat>, out: &Sink) -> Result<()> {
    let info = gather_version_info();
    match format {
        None => out.line(format_args!(
            "{PROGRAM_NAME} version: {} ({}, {})",
            info.git_version,
            info.git_commit.as_deref().unwrap_or("unknown commit"),
            info.platform
        ))?,
        Some(OutputFormat::Short) => out.line(&info.git_version)?,
        Some(OutputFormat::Json) => out.line(serde_json::to_string_pretty(&VersionOutput {
            client_version: info,
        })?)?,
        Some(OutputFormat::Yaml) => out.text(&serde_yaml::to_string(&VersionOutput {
            client_version: info,
        })?)?,
    }
    Ok(())
}

/// Gather all version information
pub fn gather_version_info() -> VersionInfo {
    VersionInfo {
        major: env!("CARGO_PKG_VERSION_MAJOR").to_string(),
        minor: env!("CARGO_PKG_VERSION_MINOR").to_string(),
        git_version: format!("v{}", env!("CARGO_PKG_VERSION")),
        git_commit: option_env!("GIT_COMMIT").map(String::from),
        build_date: option_env!("BUILD_DATE").map(String::from),
        rust_version: option_env!("RUSTC_VERSION").map(String::from),
        platform: format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
    }
}
