//! Core error types

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackagingError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The specified deployment descriptor '{path}' does not exist")]
    MissingDescriptor { path: PathBuf },

    #[error("Error unpacking file [{file}] to [{destination}]: {message}")]
    Unpack {
        file: PathBuf,
        destination: PathBuf,
        message: String,
    },

    #[error("Invalid file name mapping '{mapping}': {message}")]
    FileNameMapping { mapping: String, message: String },

    #[error("Could not load filter properties from {path}: {message}")]
    FilterProperties { path: PathBuf, message: String },

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to parse configuration: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

impl PackagingError {
    /// Attach a path to an I/O error
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether the failure comes from configuration rather than the filesystem
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::MissingDescriptor { .. }
                | Self::FileNameMapping { .. }
                | Self::FilterProperties { .. }
                | Self::InvalidPattern { .. }
                | Self::InvalidConfig { .. }
                | Self::YamlParse(_)
        )
    }
}

/// Extension trait to attach the offending path to `std::io` results
pub trait IoResultExt<T> {
    fn with_path(self, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|e| PackagingError::io(path, e))
    }
}

pub type Result<T> = std::result::Result<T, PackagingError>;
