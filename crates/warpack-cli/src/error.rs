//! CLI error types with exit code handling
//!
//! Every command returns a [`CliError`], which knows the exit code the
//! process should end with.

use miette::Diagnostic;
use thiserror::Error;
use warpack_core::PackagingError;

use crate::exit_codes;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// The project configuration is unusable
    #[error("Configuration error: {message}")]
    #[diagnostic(code(warpack::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// A configured deployment descriptor is missing
    #[error("{message}")]
    #[diagnostic(
        code(warpack::cli::descriptor),
        help("check the webXml and containerConfigXml entries of warpack.yaml")
    )]
    Descriptor { message: String },

    /// Copy or extraction failed
    #[error("IO error: {message}")]
    #[diagnostic(code(warpack::cli::io))]
    Io { message: String },

    /// Invalid command line arguments
    #[error("Invalid argument: {message}")]
    #[diagnostic(code(warpack::cli::usage))]
    Usage { message: String },

    #[error("{message}")]
    #[diagnostic(code(warpack::cli::error))]
    Other { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Descriptor { .. } => exit_codes::DESCRIPTOR_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }
}

impl From<PackagingError> for CliError {
    fn from(err: PackagingError) -> Self {
        match &err {
            PackagingError::MissingDescriptor { .. } => CliError::Descriptor {
                message: err.to_string(),
            },
            PackagingError::Io { .. } | PackagingError::Unpack { .. } => CliError::Io {
                message: err.to_string(),
            },
            PackagingError::YamlParse(_) => CliError::Config {
                message: err.to_string(),
                help: Some("warpack.yaml keys are camelCase, e.g. webappDirectory".to_string()),
            },
            _ if err.is_config() => CliError::Config {
                message: err.to_string(),
                help: None,
            },
            _ => CliError::Other {
                message: err.to_string(),
            },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_codes_by_failure() {
        let missing = PackagingError::MissingDescriptor {
            path: PathBuf::from("web.xml"),
        };
        assert_eq!(CliError::from(missing).exit_code(), exit_codes::DESCRIPTOR_ERROR);

        let mapping = PackagingError::FileNameMapping {
            mapping: "${x".to_string(),
            message: "unterminated".to_string(),
        };
        assert_eq!(CliError::from(mapping).exit_code(), exit_codes::CONFIG_ERROR);

        let io = PackagingError::io("a.txt", std::io::Error::other("disk full"));
        let err = CliError::from(io);
        assert_eq!(err.exit_code(), exit_codes::IO_ERROR);
        assert!(err.to_string().contains("a.txt"));

        assert_eq!(CliError::usage("bad").exit_code(), exit_codes::USAGE_ERROR);
    }
}
