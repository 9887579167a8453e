//! End-to-end runs of the `ckubeadm` binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn ckubeadm() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ckubeadm"))
}

#[test]
fn help_shows_examples_and_children() {
    ckubeadm()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ckubeadm init"))
        .stdout(predicate::str::contains("ckubeadm join"))
        .stdout(predicate::str::contains("alpha"));
}

#[test]
fn bare_root_prints_help() {
    ckubeadm()
        .assert()
        .success()
        .stdout(predicate::str::contains("Example usage"));
}

#[test]
fn alpha_lists_experimental_commands() {
    ckubeadm()
        .arg("alpha")
        .assert()
        .success()
        .stdout(predicate::str::contains("Experimental sub-commands not yet fully functional."))
        .stdout(predicate::str::contains("phase"));
}

#[test]
fn version_short() {
    ckubeadm()
        .args(["version", "-o", "short"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("v{}\n", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn token_generate_prints_a_token() {
    ckubeadm()
        .args(["token", "generate"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^[a-z0-9]{6}\.[a-z0-9]{16}\n$").unwrap());
}

#[test]
fn zero_ttl_warning_goes_to_stderr() {
    ckubeadm()
        .args(["token", "create", "abcdef.0123456789abcdef", "--ttl", "0"])
        .assert()
        .success()
        .stdout("abcdef.0123456789abcdef\n")
        .stderr(predicate::str::contains("never expires"));
}

#[test]
fn config_print_default() {
    ckubeadm()
        .args(["config", "print-default"])
        .assert()
        .success()
        .stdout(predicate::str::contains("apiVersion: kubeadm.k8s.io/v1alpha1"))
        .stdout(predicate::str::contains("serviceSubnet: 10.96.0.0/12"));
}

#[test]
fn underscore_flag_is_converted_with_a_warning() {
    ckubeadm()
        .args(["init", "--token", "abcdef.0123456789abcdef", "--pod_network_cidr", "10.244.0.0/16"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10.244.0.0/16"))
        .stderr(predicate::str::contains(
            "pod_network_cidr has been converted to pod-network-cidr",
        ));
}

#[test]
fn invalid_configuration_exits_with_user_error() {
    ckubeadm()
        .args(["init", "--service-cidr", "bogus"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("networking.serviceSubnet"));
}

#[test]
fn unknown_command_is_a_usage_error() {
    ckubeadm()
        .arg("phase")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}
