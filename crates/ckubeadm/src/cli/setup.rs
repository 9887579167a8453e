//! Process setup for the `ckubeadm` binary

use anyhow::Result;

/// Initialize tracing subscriber for logging
///
/// Configures the tracing subscriber with:
/// - Environment filter from `RUST_LOG` (defaults to INFO level)
/// - Stderr output, so command output on stdout stays clean
///
/// # Errors
/// Returns an error if a global subscriber is already installed
pub fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice_fails_cleanly() {
        // Whichever call loses the race to install the global subscriber
        // reports an error instead of panicking.
        let first = init_tracing();
        let second = init_tracing();
        assert!(first.is_err() || second.is_err());
    }
}
