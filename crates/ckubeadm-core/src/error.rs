//! Error types for ckubeadm-core
//!
//! Errors fall into two categories:
//! - **User errors**: invalid configuration, bad flags, malformed tokens (exit code 1)
//! - **System errors**: IO failures while reading configuration (exit code 2)

use thiserror::Error;

/// Core error type for ckubeadm operations
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration is structurally wrong (wrong kind, unknown API version)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration document could not be parsed
    #[error("failed to parse {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// A configuration field failed validation
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    /// A bootstrap token or token attribute is malformed
    #[error("invalid bootstrap token: {0}")]
    InvalidToken(String),

    /// A Kubernetes version is malformed or outside the supported window
    #[error("unsupported kubernetes version: {0}")]
    UnsupportedVersion(String),

    /// Reading a configuration file failed
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a validation error for a dotted field path.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a parse error for a named source (file path or `<stdin>`).
    pub fn parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create an IO error for a path.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error.
    ///
    /// * 1 - User error (invalid input, validation failure, bad configuration)
    /// * 2 - System error (IO failure)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfig(_)
            | Self::Parse { .. }
            | Self::Validation { .. }
            | Self::InvalidToken(_)
            | Self::UnsupportedVersion(_) => 1,
            Self::Io { .. } => 2,
        }
    }
}

/// Result type alias for ckubeadm-core operations
pub type Result<T> = std::result::Result<T, Error>;
