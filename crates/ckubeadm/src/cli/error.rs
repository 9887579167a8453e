//! Error formatting for CLI output

/// Format an error for user display
///
/// Uses the top-level message and appends the first cause when it adds
/// information the message does not already carry.
#[must_use]
pub fn format_error(err: &anyhow::Error) -> String {
    let msg = err.to_string();
    match err.source().map(ToString::to_string) {
        Some(source_msg) if !source_msg.is_empty() && !msg.contains(&source_msg) => {
            format!("{msg}\nCause: {source_msg}")
        }
        _ => msg,
    }
}

/// Extract appropriate exit code from an error
///
/// # Exit Codes
/// * 0 - Success (not returned here)
/// * 1 - User error (invalid flags, configuration, token or version)
/// * 2 - System error (IO failure, anything unclassified)
///
/// Usage errors from clap keep clap's own exit code.
#[must_use]
pub fn get_exit_code(err: &anyhow::Error) -> i32 {
    if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
        return clap_err.exit_code();
    }
    if let Some(core_err) = err.downcast_ref::<ckubeadm_core::Error>() {
        return core_err.exit_code();
    }
    2
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn test_format_error_simple() {
        let err = anyhow::anyhow!("Simple error");
        assert_eq!(format_error(&err), "Simple error");
    }

    #[test]
    fn test_format_error_with_cause() {
        let err = Err::<(), _>(ckubeadm_core::Error::InvalidToken("bad".into()))
            .context("failed to create token")
            .unwrap_err();
        let formatted = format_error(&err);
        assert!(formatted.starts_with("failed to create token"));
        assert!(formatted.contains("Cause:"));
        assert!(formatted.contains("bad"));
    }

    #[test]
    fn test_exit_code_from_core_error_through_context() {
        let err = Err::<(), _>(ckubeadm_core::Error::validation("api.bindPort", "zero"))
            .context("invalid master configuration")
            .unwrap_err();
        assert_eq!(get_exit_code(&err), 1);

        let io = ckubeadm_core::Error::io(
            "/nope",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(get_exit_code(&anyhow::Error::new(io)), 2);
    }

    #[test]
    fn test_exit_code_defaults_to_system_error() {
        assert_eq!(get_exit_code(&anyhow::anyhow!("boom")), 2);
    }
}
