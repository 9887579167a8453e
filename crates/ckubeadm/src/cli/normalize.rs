//! Flag-name normalization
//!
//! A normalization policy maps a flag name, as typed by the user without its
//! leading dashes, to the canonical name it was declared under. The root
//! command owns exactly one policy and applies it to every flag token of
//! the command line before matching, so it reaches every descendant.

use std::ffi::OsString;

/// A flag-name normalization policy.
pub type NormalizeFn = fn(&str) -> String;

/// Replace `_` word separators with `-`.
pub fn word_sep_normalize(name: &str) -> String {
    name.replace('_', "-")
}

/// [`word_sep_normalize`], logging a warning whenever it rewrites a name.
pub fn warn_word_sep_normalize(name: &str) -> String {
    let normalized = word_sep_normalize(name);
    if normalized != name {
        tracing::warn!(
            "using an underscore in a flag name is not supported. {name} has been converted to {normalized}."
        );
    }
    normalized
}

/// Apply `normalize` to the name part of every long flag in `args`.
///
/// The first element is the program name and is passed through. Only
/// `--name` and `--name=value` tokens are rewritten; values, positionals,
/// short flags and everything after a bare `--` are left alone.
pub fn normalize_args<I, T>(args: I, normalize: NormalizeFn) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(index, arg)| {
            if index == 0 || passthrough {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                passthrough = true;
                return arg;
            }
            normalize_token(text, normalize).map_or(arg, OsString::from)
        })
        .collect()
}

fn normalize_token(token: &str, normalize: NormalizeFn) -> Option<String> {
    let flag = token.strip_prefix("--")?;
    let (name, value) = match flag.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (flag, None),
    };
    let canonical = normalize(name);
    if canonical == name {
        return None;
    }
    Some(match value {
        Some(value) => format!("--{canonical}={value}"),
        None => format!("--{canonical}"),
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn normalized(args: &[&str]) -> Vec<String> {
        normalize_args(args.iter().copied(), word_sep_normalize)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_word_sep_normalize() {
        assert_eq!(word_sep_normalize("pod_network_cidr"), "pod-network-cidr");
        assert_eq!(word_sep_normalize("pod-network-cidr"), "pod-network-cidr");
    }

    #[test]
    fn test_rewrites_long_flags_only() {
        assert_eq!(
            normalized(&["ckubeadm", "init", "--pod_network_cidr", "10_0", "-o", "x_y"]),
            vec!["ckubeadm", "init", "--pod-network-cidr", "10_0", "-o", "x_y"]
        );
    }

    #[test]
    fn test_rewrites_name_but_not_value() {
        assert_eq!(
            normalized(&["ckubeadm", "token", "create", "--description=my_token"]),
            vec!["ckubeadm", "token", "create", "--description=my_token"]
        );
        assert_eq!(
            normalized(&["ckubeadm", "init", "--node_name=node_1"]),
            vec!["ckubeadm", "init", "--node-name=node_1"]
        );
    }

    #[test]
    fn test_stops_after_double_dash() {
        assert_eq!(
            normalized(&["ckubeadm", "--a_b", "--", "--c_d"]),
            vec!["ckubeadm", "--a-b", "--", "--c_d"]
        );
    }

    #[test]
    fn test_program_name_untouched() {
        assert_eq!(normalized(&["--weird_bin"]), vec!["--weird_bin"]);
    }

    proptest! {
        #[test]
        fn prop_normalization_is_idempotent(name in "[a-z_-]{1,24}") {
            let once = word_sep_normalize(&name);
            prop_assert_eq!(word_sep_normalize(&once), once.clone());
            prop_assert!(!once.contains('_'));
        }

        #[test]
        fn prop_separators_resolve_identically(words in proptest::collection::vec("[a-z]{1,8}", 1..4)) {
            let dashed = format!("--{}", words.join("-"));
            let underscored = format!("--{}", words.join("_"));
            prop_assert_eq!(
                normalized(&["ckubeadm", dashed.as_str()]),
                normalized(&["ckubeadm", underscored.as_str()])
            );
        }
    }
}
