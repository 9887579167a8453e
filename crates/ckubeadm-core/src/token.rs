//! Bootstrap tokens
//!
//! A bootstrap token has the form `[a-z0-9]{6}.[a-z0-9]{16}`: a public
//! token id and a secret. Tokens carry a TTL, a set of usages and the
//! groups they authenticate as.

use std::{fmt, str::FromStr, sync::OnceLock, time::Duration};

use rand::Rng;
use regex::Regex;

use crate::{
    constants::{BOOTSTRAP_GROUP_PREFIX, DEFAULT_TOKEN_USAGES},
    Error, Result,
};

const TOKEN_ID_LEN: usize = 6;
const TOKEN_SECRET_LEN: usize = 16;
const TOKEN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

fn token_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^([a-z0-9]{6})\.([a-z0-9]{16})$").ok())
        .as_ref()
}

/// A parsed bootstrap token.
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapToken {
    id: String,
    secret: String,
}

impl BootstrapToken {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut random = |len: usize| -> String {
            (0..len)
                .map(|_| char::from(TOKEN_CHARSET[rng.gen_range(0..TOKEN_CHARSET.len())]))
                .collect()
        };
        Self {
            id: random(TOKEN_ID_LEN),
            secret: random(TOKEN_SECRET_LEN),
        }
    }

    /// Public part of the token.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl FromStr for BootstrapToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let captures = token_pattern()
            .and_then(|pattern| pattern.captures(s))
            .ok_or_else(|| {
                Error::InvalidToken(format!(
                    "token {s:?} was not of the form \"[a-z0-9]{{6}}.[a-z0-9]{{16}}\""
                ))
            })?;
        match (captures.get(1), captures.get(2)) {
            (Some(id), Some(secret)) => Ok(Self {
                id: id.as_str().to_string(),
                secret: secret.as_str().to_string(),
            }),
            _ => Err(Error::InvalidToken(format!("token {s:?} is incomplete"))),
        }
    }
}

impl fmt::Display for BootstrapToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.id, self.secret)
    }
}

// The secret never ends up in logs through `{:?}`.
impl fmt::Debug for BootstrapToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapToken")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Token lifetime. Zero means the token never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TokenTtl(Duration);

impl TokenTtl {
    pub const fn as_duration(self) -> Duration {
        self.0
    }

    pub const fn never_expires(self) -> bool {
        self.0.is_zero()
    }
}

impl FromStr for TokenTtl {
    type Err = Error;

    /// Accepts `0` or a sequence of `<int><unit>` with units `h`, `m`, `s`
    /// (`24h`, `1h30m`, `24h0m0s`).
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidToken(format!("invalid token ttl {s:?}"));
        if s == "0" {
            return Ok(Self(Duration::ZERO));
        }
        if s.is_empty() {
            return Err(invalid());
        }

        let mut seconds: u64 = 0;
        let mut digits = String::new();
        for c in s.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let multiplier = match c {
                'h' => 3600,
                'm' => 60,
                's' => 1,
                _ => return Err(invalid()),
            };
            let amount: u64 = digits.parse().map_err(|_| invalid())?;
            seconds = amount
                .checked_mul(multiplier)
                .and_then(|part| seconds.checked_add(part))
                .ok_or_else(invalid)?;
            digits.clear();
        }
        if !digits.is_empty() {
            return Err(invalid());
        }
        Ok(Self(Duration::from_secs(seconds)))
    }
}

impl fmt::Display for TokenTtl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.0.as_secs();
        if total == 0 {
            return write!(f, "0s");
        }
        write!(f, "{}h{}m{}s", total / 3600, (total % 3600) / 60, total % 60)
    }
}

/// Check token usages against the known set.
///
/// # Errors
///
/// Returns `InvalidToken` naming the first unknown usage.
pub fn validate_usages<S: AsRef<str>>(usages: &[S]) -> Result<()> {
    usages
        .iter()
        .map(AsRef::as_ref)
        .find(|usage| !DEFAULT_TOKEN_USAGES.contains(usage))
        .map_or(Ok(()), |usage| {
            Err(Error::InvalidToken(format!(
                "unknown usage {usage:?}, valid usages are {}",
                DEFAULT_TOKEN_USAGES.join(",")
            )))
        })
}

/// Check extra groups carry the bootstrap group prefix.
///
/// # Errors
///
/// Returns `InvalidToken` naming the first bad group.
pub fn validate_groups<S: AsRef<str>>(groups: &[S]) -> Result<()> {
    groups
        .iter()
        .map(AsRef::as_ref)
        .find(|group| {
            !group.starts_with(BOOTSTRAP_GROUP_PREFIX) || group.len() == BOOTSTRAP_GROUP_PREFIX.len()
        })
        .map_or(Ok(()), |group| {
            Err(Error::InvalidToken(format!(
                "group {group:?} must start with {BOOTSTRAP_GROUP_PREFIX:?}"
            )))
        })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_parse_valid_token() {
        let token: BootstrapToken = "abcdef.0123456789abcdef".parse().unwrap();
        assert_eq!(token.id(), "abcdef");
        assert_eq!(token.to_string(), "abcdef.0123456789abcdef");
    }

    #[test]
    fn test_parse_rejects_bad_tokens() {
        for bad in [
            "",
            "abcdef",
            "ABCDEF.0123456789abcdef",
            "abcde.0123456789abcdef",
            "abcdef:0123456789abcdef",
            "abcdef.0123456789abcdef0",
        ] {
            assert!(bad.parse::<BootstrapToken>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_debug_redacts_secret() {
        let token: BootstrapToken = "abcdef.0123456789abcdef".parse().unwrap();
        let debug = format!("{token:?}");
        assert!(debug.contains("abcdef"));
        assert!(!debug.contains("0123456789abcdef"));
    }

    #[test]
    fn test_ttl_parsing() {
        assert_eq!("24h".parse::<TokenTtl>().unwrap().as_duration().as_secs(), 86_400);
        assert_eq!("1h30m".parse::<TokenTtl>().unwrap().as_duration().as_secs(), 5_400);
        assert_eq!("24h0m0s".parse::<TokenTtl>().unwrap().as_duration().as_secs(), 86_400);
        assert!("0".parse::<TokenTtl>().unwrap().never_expires());
    }

    #[test]
    fn test_ttl_rejects_garbage() {
        for bad in ["", "h", "24", "24x", "1d", "-1h"] {
            assert!(bad.parse::<TokenTtl>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_ttl_display() {
        assert_eq!("90m".parse::<TokenTtl>().unwrap().to_string(), "1h30m0s");
        assert_eq!("0".parse::<TokenTtl>().unwrap().to_string(), "0s");
    }

    #[test]
    fn test_usages_and_groups() {
        assert!(validate_usages(&["signing", "authentication"]).is_ok());
        assert!(validate_usages(&["signing", "root"]).is_err());
        assert!(validate_groups(&["system:bootstrappers:workers"]).is_ok());
        assert!(validate_groups(&["system:masters"]).is_err());
        assert!(validate_groups(&["system:bootstrappers:"]).is_err());
    }

    proptest! {
        #[test]
        fn prop_generated_tokens_parse(_seed in 0u8..32) {
            let token = BootstrapToken::generate();
            let reparsed: BootstrapToken = token.to_string().parse().unwrap();
            prop_assert_eq!(reparsed, token);
        }

        #[test]
        fn prop_ttl_display_parses_back(secs in 0u64..10_000_000) {
            let ttl = TokenTtl(Duration::from_secs(secs));
            let reparsed: TokenTtl = ttl.to_string().parse().unwrap();
            prop_assert_eq!(reparsed, ttl);
        }
    }
}
