//! Shared utility functions for CLI commands

use std::path::{Path, PathBuf};

use warpack_core::WarConfig;

use crate::error::{CliError, Result};

/// Split a `key=value` filter definition
pub fn parse_define(define: &str) -> Result<(String, String)> {
    match define.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(CliError::usage(format!(
            "expected key=value, got '{}'",
            define
        ))),
    }
}

/// Load the configuration file given on the command line, or the project's
pub fn load_config(path: &Path, config: Option<&Path>) -> Result<WarConfig> {
    let config = match config {
        Some(file) => WarConfig::load_from(file)?,
        None => WarConfig::load_project(path)?,
    };
    tracing::debug!(
        "Loaded configuration for {} ({} dependencies, {} overlays)",
        config.base_dir.display(),
        config.dependencies.len(),
        config.overlays.len()
    );
    Ok(config)
}

/// Make `path` absolute against the working directory
pub fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_define() {
        assert_eq!(
            parse_define("env=prod").unwrap(),
            ("env".to_string(), "prod".to_string())
        );
        assert_eq!(
            parse_define("url=jdbc:h2:mem;MODE=x").unwrap(),
            ("url".to_string(), "jdbc:h2:mem;MODE=x".to_string())
        );
        assert_eq!(
            parse_define("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
    }

    #[test]
    fn test_parse_define_invalid() {
        assert!(parse_define("novalue").is_err());
        assert!(parse_define("=value").is_err());
    }

    #[test]
    fn test_absolute() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolute(Path::new("out")).unwrap(), cwd.join("out"));
        assert_eq!(absolute(&cwd).unwrap(), cwd);
    }
}
