//! Warpack Core - assembles exploded web applications
//!
//! This crate builds the directory layout of a web application archive:
//! - `ProtectedPaths`: first-writer-wins registry of packaged paths
//! - `packaging`: copy primitives and the packaging tasks
//! - `filter`: `${token}` and `@token@` substitution while copying
//! - `Packager`: plans and runs the tasks of a `WarConfig`

pub mod archive;
pub mod artifact;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod packager;
pub mod packaging;
pub mod registry;
pub mod scanner;

pub use archive::{ArchiverManager, Unarchiver};
pub use artifact::{Artifact, Scope};
pub use config::{CONFIG_FILE_NAME, Overlay, WarConfig, WebResource};
pub use context::PackagingContext;
pub use error::{PackagingError, Result};
pub use filter::FilterProperties;
pub use packager::{Packager, PackagingSummary};
pub use packaging::PackagingTask;
pub use registry::ProtectedPaths;
pub use scanner::{DirectoryScanner, FileEnumerator};
