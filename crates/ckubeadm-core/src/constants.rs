//! Well-known names, paths and default values

/// Program identifier used for the root command and completion scripts
pub const PROGRAM_NAME: &str = "ckubeadm";

/// API group/version of the configuration documents
pub const API_VERSION: &str = "kubeadm.k8s.io/v1alpha1";

pub const KUBERNETES_DIR: &str = "/etc/kubernetes";
pub const MANIFESTS_SUBDIR: &str = "manifests";
pub const KUBELET_DIR: &str = "/var/lib/kubelet";
pub const ETCD_DATA_DIR: &str = "/var/lib/etcd";

pub const DEFAULT_CERTIFICATES_DIR: &str = "/etc/kubernetes/pki";
pub const DEFAULT_CA_CERT_PATH: &str = "/etc/kubernetes/pki/ca.crt";
pub const DEFAULT_API_BIND_PORT: u16 = 6443;
pub const DEFAULT_SERVICE_SUBNET: &str = "10.96.0.0/12";
pub const DEFAULT_DNS_DOMAIN: &str = "cluster.local";
pub const DEFAULT_KUBERNETES_VERSION: &str = "stable-1.9";
pub const DEFAULT_TOKEN_TTL: &str = "24h";

pub const DEFAULT_TOKEN_USAGES: &[&str] = &["signing", "authentication"];
pub const DEFAULT_TOKEN_GROUP: &str = "system:bootstrappers:kubeadm:default-node-token";
pub const BOOTSTRAP_GROUP_PREFIX: &str = "system:bootstrappers:";

pub const ADMIN_KUBECONFIG: &str = "admin.conf";
pub const KUBELET_KUBECONFIG: &str = "kubelet.conf";
pub const CONTROLLER_MANAGER_KUBECONFIG: &str = "controller-manager.conf";
pub const SCHEDULER_KUBECONFIG: &str = "scheduler.conf";

pub const KUBE_APISERVER: &str = "kube-apiserver";
pub const KUBE_CONTROLLER_MANAGER: &str = "kube-controller-manager";
pub const KUBE_SCHEDULER: &str = "kube-scheduler";
pub const ETCD: &str = "etcd";

pub const MASTER_LABEL: &str = "node-role.kubernetes.io/master";
