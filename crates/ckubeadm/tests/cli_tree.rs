//! Structural properties of the assembled command tree.

use std::collections::HashSet;

use ckubeadm::cli::{
    build_root, CommandNode, RootCommand, Sink, ALPHA, EXPERIMENTAL_COMMANDS, STABLE_COMMANDS,
};
use ckubeadm_core::registration_count;

fn root() -> RootCommand {
    let (out, _) = Sink::capture();
    let (err, _) = Sink::capture();
    build_root(out, err)
}

fn alpha(root: &RootCommand) -> &CommandNode {
    root.node().find_child(ALPHA).unwrap()
}

fn count_named(node: &CommandNode, name: &str) -> usize {
    node.children()
        .iter()
        .map(|child| usize::from(child.name() == name) + count_named(child, name))
        .sum()
}

fn assert_unique_siblings(node: &CommandNode) {
    let names = node.child_names();
    let unique: HashSet<&str> = names.iter().copied().collect();
    assert_eq!(unique.len(), names.len(), "duplicate child under {}", node.name());
    node.children().iter().for_each(assert_unique_siblings);
}

#[test]
fn root_is_named_and_has_nine_children() {
    let root = root();
    assert_eq!(root.node().name(), "ckubeadm");
    assert_eq!(root.node().children().len(), 9);
}

#[test]
fn child_names_are_unique_everywhere() {
    assert_unique_siblings(root().node());
}

#[test]
fn stable_commands_mount_in_fixed_order_then_alpha() {
    let root = root();
    let mut expected = STABLE_COMMANDS.to_vec();
    expected.push(ALPHA);
    assert_eq!(root.node().child_names(), expected);
}

#[test]
fn alpha_is_a_container_on_root_only() {
    let root = root();
    let alpha = alpha(&root);
    assert!(!alpha.is_runnable());
    assert_eq!(alpha.children().len(), EXPERIMENTAL_COMMANDS.len());
    assert_eq!(count_named(root.node(), ALPHA), 1);
}

#[test]
fn stable_names_are_not_under_alpha() {
    let root = root();
    let alpha_children = alpha(&root).child_names();
    for name in STABLE_COMMANDS {
        assert!(root.node().find_child(name).is_some(), "{name} missing on root");
        assert!(!alpha_children.contains(&name), "{name} mounted under alpha");
    }
}

#[test]
fn experimental_commands_are_not_on_root() {
    let root = root();
    for name in alpha(&root).child_names() {
        assert!(root.node().find_child(name).is_none(), "{name} mounted on root");
    }
}

#[test]
fn builds_are_deterministic() {
    fn names(node: &CommandNode) -> Vec<String> {
        std::iter::once(node.name().to_string())
            .chain(node.children().iter().flat_map(names))
            .collect()
    }
    assert_eq!(names(root().node()), names(root().node()));
}

#[test]
fn defaults_register_exactly_once() {
    let _first = root();
    let _second = root();
    assert_eq!(registration_count(), 1);
}

#[test]
fn underscore_and_dash_flags_match_identically() {
    let root = root();
    let value = |flag: &str| {
        let matches = root
            .try_get_matches_from(["ckubeadm", "init", flag, "10.244.0.0/16"])
            .unwrap();
        matches
            .subcommand_matches("init")
            .and_then(|init| init.get_one::<String>("pod-network-cidr"))
            .cloned()
    };
    assert_eq!(value("--pod_network_cidr"), value("--pod-network-cidr"));
    assert_eq!(value("--pod_network_cidr").as_deref(), Some("10.244.0.0/16"));
}

#[test]
fn normalization_reaches_nested_commands() {
    let root = root();
    let matches = root
        .try_get_matches_from(["ckubeadm", "alpha", "phase", "certs", "ca", "--cert_dir=/srv/pki"])
        .unwrap();
    let cert_dir = matches
        .subcommand_matches("alpha")
        .and_then(|m| m.subcommand_matches("phase"))
        .and_then(|m| m.subcommand_matches("certs"))
        .and_then(|m| m.subcommand_matches("ca"))
        .and_then(|m| m.get_one::<String>("cert-dir"));
    assert_eq!(cert_dir.map(String::as_str), Some("/srv/pki"));
}

#[test]
fn clap_tree_passes_debug_asserts() {
    root().to_clap().debug_assert();
}
