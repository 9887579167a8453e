//! Bootstrap plans
//!
//! Derives the artifacts a bootstrap step produces (certificates,
//! kubeconfig files, static pod manifests) from a configuration, and the
//! ordered steps of `init`, `join` and `reset`.

use std::{fmt, path::PathBuf};

use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::{
    config::{MasterConfiguration, NodeConfiguration},
    constants::{
        ADMIN_KUBECONFIG, CONTROLLER_MANAGER_KUBECONFIG, ETCD, ETCD_DATA_DIR, KUBELET_DIR,
        KUBELET_KUBECONFIG, KUBERNETES_DIR, KUBE_APISERVER, KUBE_CONTROLLER_MANAGER,
        KUBE_SCHEDULER, MANIFESTS_SUBDIR, MASTER_LABEL, SCHEDULER_KUBECONFIG,
    },
    token::{BootstrapToken, TokenTtl},
};

/// Certificate/key pairs in the certificates directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub enum Certificate {
    #[strum(serialize = "ca")]
    Ca,
    #[strum(serialize = "apiserver")]
    ApiServer,
    #[strum(serialize = "apiserver-kubelet-client")]
    ApiServerKubeletClient,
    #[strum(serialize = "sa")]
    ServiceAccount,
    #[strum(serialize = "front-proxy-ca")]
    FrontProxyCa,
    #[strum(serialize = "front-proxy-client")]
    FrontProxyClient,
}

impl Certificate {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Ca => "Self-signed certificate authority for the cluster",
            Self::ApiServer => "API server serving certificate",
            Self::ApiServerKubeletClient => "Client certificate the API server uses for kubelets",
            Self::ServiceAccount => "Key pair used to sign service account tokens",
            Self::FrontProxyCa => "Certificate authority for the front proxy",
            Self::FrontProxyClient => "Client certificate for the front proxy",
        }
    }

    /// Files written for this certificate under `cert_dir`.
    pub fn files(self, cert_dir: &str) -> Vec<PathBuf> {
        let base = PathBuf::from(cert_dir);
        let name = self.name();
        match self {
            Self::ServiceAccount => vec![base.join("sa.key"), base.join("sa.pub")],
            _ => vec![
                base.join(format!("{name}.crt")),
                base.join(format!("{name}.key")),
            ],
        }
    }
}

/// Kubeconfig files under the Kubernetes directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub enum Kubeconfig {
    #[strum(serialize = "admin")]
    Admin,
    #[strum(serialize = "kubelet")]
    Kubelet,
    #[strum(serialize = "controller-manager")]
    ControllerManager,
    #[strum(serialize = "scheduler")]
    Scheduler,
}

impl Kubeconfig {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Admin => "Kubeconfig for the cluster administrator",
            Self::Kubelet => "Kubeconfig for the kubelet on the master",
            Self::ControllerManager => "Kubeconfig for the controller manager",
            Self::Scheduler => "Kubeconfig for the scheduler",
        }
    }

    pub fn path(self) -> PathBuf {
        let file = match self {
            Self::Admin => ADMIN_KUBECONFIG,
            Self::Kubelet => KUBELET_KUBECONFIG,
            Self::ControllerManager => CONTROLLER_MANAGER_KUBECONFIG,
            Self::Scheduler => SCHEDULER_KUBECONFIG,
        };
        PathBuf::from(KUBERNETES_DIR).join(file)
    }
}

/// Control plane components deployed as static pods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub enum ControlPlaneComponent {
    #[strum(serialize = "apiserver")]
    ApiServer,
    #[strum(serialize = "controller-manager")]
    ControllerManager,
    #[strum(serialize = "scheduler")]
    Scheduler,
}

impl ControlPlaneComponent {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub const fn pod_name(self) -> &'static str {
        match self {
            Self::ApiServer => KUBE_APISERVER,
            Self::ControllerManager => KUBE_CONTROLLER_MANAGER,
            Self::Scheduler => KUBE_SCHEDULER,
        }
    }

    pub fn manifest_path(self) -> PathBuf {
        manifest_path(self.pod_name())
    }
}

/// Cluster add-ons installed after the control plane is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub enum Addon {
    #[strum(serialize = "kube-dns")]
    KubeDns,
    #[strum(serialize = "kube-proxy")]
    KubeProxy,
}

impl Addon {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

pub fn manifest_path(pod_name: &str) -> PathBuf {
    PathBuf::from(KUBERNETES_DIR)
        .join(MANIFESTS_SUBDIR)
        .join(format!("{pod_name}.yaml"))
}

pub fn etcd_manifest_path() -> PathBuf {
    manifest_path(ETCD)
}

/// One line of a plan, rendered as `[phase] detail`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub phase: &'static str,
    pub detail: String,
}

impl PlanStep {
    pub fn new(phase: &'static str, detail: impl Into<String>) -> Self {
        Self {
            phase,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.phase, self.detail)
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn preflight_step(skip: bool) -> PlanStep {
    if skip {
        PlanStep::new("preflight", "skipping pre-flight checks")
    } else {
        PlanStep::new("preflight", "run pre-flight checks")
    }
}

pub fn certificate_step(certificate: Certificate, config: &MasterConfiguration) -> PlanStep {
    PlanStep::new(
        "certificates",
        format!(
            "{}: {}",
            certificate.name(),
            join_paths(&certificate.files(&config.certificates_dir))
        ),
    )
}

pub fn kubeconfig_step(kubeconfig: Kubeconfig) -> PlanStep {
    PlanStep::new(
        "kubeconfig",
        format!("{}: {}", kubeconfig.name(), kubeconfig.path().display()),
    )
}

pub fn controlplane_step(component: ControlPlaneComponent, config: &MasterConfiguration) -> PlanStep {
    PlanStep::new(
        "controlplane",
        format!(
            "{} {}: {}",
            component.pod_name(),
            config.kubernetes_version,
            component.manifest_path().display()
        ),
    )
}

pub fn etcd_step() -> PlanStep {
    PlanStep::new(
        "etcd",
        format!(
            "local etcd: {} (data in {ETCD_DATA_DIR})",
            etcd_manifest_path().display()
        ),
    )
}

pub fn markmaster_step(config: &MasterConfiguration) -> PlanStep {
    let node = config.node_name.as_deref().unwrap_or("<hostname>");
    PlanStep::new(
        "markmaster",
        format!("label node {node} with {MASTER_LABEL}=\"\" and taint it NoSchedule"),
    )
}

pub fn bootstrap_token_step(token: &BootstrapToken, ttl: TokenTtl) -> PlanStep {
    let expiry = if ttl.never_expires() {
        "never expires".to_string()
    } else {
        format!("expires after {ttl}")
    };
    PlanStep::new("bootstraptoken", format!("token {token} ({expiry})"))
}

pub fn addon_step(addon: Addon, config: &MasterConfiguration) -> PlanStep {
    let detail = match addon {
        Addon::KubeDns => format!("kube-dns serving {}", config.networking.dns_domain),
        Addon::KubeProxy => match &config.networking.pod_subnet {
            Some(cidr) => format!("kube-proxy with cluster CIDR {cidr}"),
            None => "kube-proxy".to_string(),
        },
    };
    PlanStep::new("addons", detail)
}

/// Every step `init` runs, in order.
pub fn master_plan(
    config: &MasterConfiguration,
    token: &BootstrapToken,
    ttl: TokenTtl,
    skip_preflight: bool,
) -> Vec<PlanStep> {
    std::iter::once(preflight_step(skip_preflight))
        .chain(Certificate::iter().map(|c| certificate_step(c, config)))
        .chain(Kubeconfig::iter().map(kubeconfig_step))
        .chain(ControlPlaneComponent::iter().map(|c| controlplane_step(c, config)))
        .chain([
            etcd_step(),
            markmaster_step(config),
            bootstrap_token_step(token, ttl),
        ])
        .chain(Addon::iter().map(|a| addon_step(a, config)))
        .collect()
}

/// Every step `join` runs, in order.
pub fn node_plan(config: &NodeConfiguration, skip_preflight: bool) -> Vec<PlanStep> {
    let discovery = match (&config.discovery_file, &config.discovery_token) {
        (Some(file), _) => PlanStep::new("discovery", format!("read cluster-info from {file}")),
        (None, token) => {
            let token_id = token
                .as_deref()
                .and_then(|t| t.split_once('.'))
                .map_or("<none>", |(id, _)| id);
            PlanStep::new(
                "discovery",
                format!(
                    "fetch cluster-info from {} using token id {token_id}",
                    config.discovery_token_api_servers.join(", ")
                ),
            )
        }
    };
    let pinning = if config.discovery_token_unsafe_skip_ca_verification {
        PlanStep::new("discovery", "skip CA public key pinning (unsafe)")
    } else {
        PlanStep::new(
            "discovery",
            format!(
                "verify the cluster CA against {} pinned public key hash(es)",
                config.discovery_token_ca_cert_hashes.len()
            ),
        )
    };
    let bootstrap = PlanStep::new(
        "bootstrap",
        format!(
            "request a kubelet client certificate and write {}",
            Kubeconfig::Kubelet.path().display()
        ),
    );
    let steps = vec![preflight_step(skip_preflight), discovery];
    let steps = if config.discovery_file.is_some() {
        steps
    } else {
        steps.into_iter().chain(std::iter::once(pinning)).collect()
    };
    steps.into_iter().chain(std::iter::once(bootstrap)).collect()
}

/// Checks run before bringing up a master.
pub fn master_preflight_checks(config: &MasterConfiguration) -> Vec<PlanStep> {
    let port = |port: u16| PlanStep::new("preflight", format!("port {port} is free"));
    let empty_dir = |dir: PathBuf| {
        PlanStep::new("preflight", format!("{} is absent or empty", dir.display()))
    };
    std::iter::once(PlanStep::new("preflight", "running as root"))
        .chain([config.api.bind_port, 10250, 10251, 10252, 2379].map(port))
        .chain(ControlPlaneComponent::iter().map(|c| {
            PlanStep::new(
                "preflight",
                format!("{} does not exist", c.manifest_path().display()),
            )
        }))
        .chain([
            empty_dir(PathBuf::from(ETCD_DATA_DIR)),
            empty_dir(PathBuf::from(&config.certificates_dir)),
        ])
        .collect()
}

/// Checks run before joining a node.
pub fn node_preflight_checks(config: &NodeConfiguration) -> Vec<PlanStep> {
    [
        PlanStep::new("preflight", "running as root"),
        PlanStep::new("preflight", "port 10250 is free"),
        PlanStep::new(
            "preflight",
            format!(
                "{} is absent or empty",
                PathBuf::from(KUBERNETES_DIR).join(MANIFESTS_SUBDIR).display()
            ),
        ),
        PlanStep::new(
            "preflight",
            format!("{} does not exist", Kubeconfig::Kubelet.path().display()),
        ),
        PlanStep::new("preflight", format!("{} does not exist", config.ca_cert_path)),
    ]
    .into()
}

/// Paths `reset` removes.
pub fn reset_paths(cert_dir: &str) -> Vec<PathBuf> {
    [
        PathBuf::from(KUBERNETES_DIR).join(MANIFESTS_SUBDIR),
        PathBuf::from(KUBELET_DIR),
        PathBuf::from(ETCD_DATA_DIR),
        PathBuf::from(cert_dir),
    ]
    .into_iter()
    .chain(Kubeconfig::iter().map(Kubeconfig::path))
    .collect()
}
