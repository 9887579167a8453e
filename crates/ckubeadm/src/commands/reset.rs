//! `ckubeadm reset` - list what reverting `init` or `join` removes

use std::path::Path;

use anyhow::{anyhow, Result};
use ckubeadm_core::{
    plan::{preflight_step, reset_paths},
    Error,
};

use super::{cert_dir_arg, skip_preflight_arg, string_value};
use crate::cli::{CommandNode, Sink};

pub fn new_cmd_reset(out: &Sink) -> CommandNode {
    let out = out.clone();
    CommandNode::leaf(
        "reset",
        "Run this to revert any changes made to this host by 'ckubeadm init' or 'ckubeadm join'",
        move |inv| {
            let cert_dir = string_value(inv.matches(), "cert-dir")
                .ok_or_else(|| anyhow!("--cert-dir has no value"))?;
            run(&cert_dir, inv.matches().get_flag("skip-preflight-checks"), &out)
        },
    )
    .arg(cert_dir_arg().help("The path to the directory where the certificates are stored"))
    .arg(skip_preflight_arg())
}

pub fn run(cert_dir: &str, skip_preflight: bool, out: &Sink) -> Result<()> {
    if !Path::new(cert_dir).is_absolute() {
        return Err(Error::validation("cert-dir", format!("{cert_dir:?} must be an absolute path")).into());
    }
    out.line(preflight_step(skip_preflight))?;
    out.line("[reset] Stopping the kubelet service")?;
    out.line("[reset] Removing kubernetes-managed containers")?;
    reset_paths(cert_dir)
        .iter()
        .try_for_each(|path| out.line(format_args!("[reset] Deleting {}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_cert_dir_and_kubeconfigs() {
        let (out, capture) = Sink::capture();
        run("/srv/pki", true, &out).unwrap();
        let output = capture.contents();
        assert!(output.starts_with("[preflight] skipping pre-flight checks\n"));
        assert!(output.contains("[reset] Deleting /srv/pki\n"));
        assert!(output.contains("[reset] Deleting /etc/kubernetes/admin.conf\n"));
    }

    #[test]
    fn test_relative_cert_dir_is_rejected() {
        let (out, capture) = Sink::capture();
        let err = run("pki", false, &out).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>().map(Error::exit_code),
            Some(1)
        );
        assert!(capture.contents().is_empty());
    }

    #[test]
    fn test_default_cert_dir_through_the_tree() {
        let (out, capture) = Sink::capture();
        let (err, _) = Sink::capture();
        crate::cli::build_root(out, err)
            .execute(["ckubeadm", "reset"])
            .unwrap();
        assert!(capture
            .contents()
            .contains("[reset] Deleting /etc/kubernetes/pki\n"));
    }
}
