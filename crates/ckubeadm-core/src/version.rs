//! Kubernetes versions and version labels

use std::{cmp::Ordering, fmt, str::FromStr, sync::OnceLock};

use regex::Regex;

use crate::{Error, Result};

/// Oldest control plane version `init` will deploy and `upgrade` will target.
pub const MINIMUM_CONTROL_PLANE_VERSION: KubernetesVersion = KubernetesVersion::new(1, 8, 0);

/// Newest version this build knows how to deploy without opting in.
pub const SUPPORTED_VERSION: KubernetesVersion = KubernetesVersion::new(1, 9, 0);

fn version_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^v?(\d+)\.(\d+)\.(\d+)(?:-([0-9A-Za-z.-]+))?$").ok())
        .as_ref()
}

fn label_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(stable|latest)(-\d+(\.\d+)?)?$").ok())
        .as_ref()
}

/// An exact `vMAJOR.MINOR.PATCH[-PRE]` version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KubernetesVersion {
    major: u32,
    minor: u32,
    patch: u32,
    pre_release: Option<String>,
}

impl KubernetesVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            pre_release: None,
        }
    }

    pub const fn major(&self) -> u32 {
        self.major
    }

    pub const fn minor(&self) -> u32 {
        self.minor
    }

    pub const fn patch(&self) -> u32 {
        self.patch
    }

    pub fn pre_release(&self) -> Option<&str> {
        self.pre_release.as_deref()
    }

    /// Whether this version is a newer minor release than [`SUPPORTED_VERSION`].
    pub fn is_newer_than_supported(&self) -> bool {
        (self.major, self.minor) > (SUPPORTED_VERSION.major, SUPPORTED_VERSION.minor)
    }

    /// Reject versions older than [`MINIMUM_CONTROL_PLANE_VERSION`].
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedVersion` for too-old versions.
    pub fn check_control_plane(&self) -> Result<()> {
        if *self < MINIMUM_CONTROL_PLANE_VERSION {
            return Err(Error::UnsupportedVersion(format!(
                "{self} is older than the minimum supported control plane version {MINIMUM_CONTROL_PLANE_VERSION}"
            )));
        }
        Ok(())
    }

    /// Check an upgrade target against the supported window.
    ///
    /// Pre-releases and versions past [`SUPPORTED_VERSION`] need
    /// `allow_experimental`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedVersion` when the target is outside the window.
    pub fn check_upgrade_target(&self, allow_experimental: bool) -> Result<()> {
        self.check_control_plane()?;
        if allow_experimental {
            return Ok(());
        }
        if self.is_newer_than_supported() {
            return Err(Error::UnsupportedVersion(format!(
                "{self} is newer than the supported version {SUPPORTED_VERSION}; \
                 pass --allow-experimental-upgrades to continue"
            )));
        }
        if self.pre_release.is_some() {
            return Err(Error::UnsupportedVersion(format!(
                "{self} is a pre-release; pass --allow-experimental-upgrades to continue"
            )));
        }
        Ok(())
    }
}

impl FromStr for KubernetesVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::UnsupportedVersion(format!("{s:?} is not a valid version"));
        let captures = version_pattern()
            .and_then(|pattern| pattern.captures(s))
            .ok_or_else(invalid)?;
        let number = |index: usize| -> Result<u32> {
            captures
                .get(index)
                .and_then(|m| m.as_str().parse().ok())
                .ok_or_else(invalid)
        };
        Ok(Self {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            pre_release: captures.get(4).map(|m| m.as_str().to_string()),
        })
    }
}

impl fmt::Display for KubernetesVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre_release {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl Ord for KubernetesVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.pre_release, &other.pre_release) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => cmp_pre_release(a, b),
            })
    }
}

/// Dot-separated identifiers compare numerically when both are numeric,
/// numeric identifiers sort before alphanumeric ones, and a shorter tag
/// sorts first when it is a prefix of the other.
fn cmp_pre_release(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        let ordering = match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match (x.parse::<u64>(), y.parse::<u64>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                (Ok(_), Err(_)) => Ordering::Less,
                (Err(_), Ok(_)) => Ordering::Greater,
                (Err(_), Err(_)) => x.cmp(y),
            },
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
}

impl PartialOrd for KubernetesVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// What a user may pass as `--kubernetes-version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// A release label such as `stable`, `stable-1.9` or `latest`,
    /// resolved against the release bucket at deploy time.
    Label(String),
    Exact(KubernetesVersion),
}

impl FromStr for VersionSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if label_pattern().is_some_and(|pattern| pattern.is_match(s)) {
            return Ok(Self::Label(s.to_string()));
        }
        s.parse().map(Self::Exact)
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(label) => f.write_str(label),
            Self::Exact(version) => fmt::Display::fmt(version, f),
        }
    }
}
