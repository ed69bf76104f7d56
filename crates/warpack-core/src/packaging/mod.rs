//! Packaging tasks
//!
//! Each task copies one category of sources into the webapp directory.
//! Tasks run in a fixed order and the first one to write a target path
//! wins, so the order of [`PackagingTask`]s is the precedence policy.

mod artifacts;
mod classes;
mod overlay;
pub mod primitives;
mod project;

pub use artifacts::ArtifactsTask;
pub use classes::ClassesTask;
pub use overlay::OverlayTask;
pub use project::ProjectTask;

use crate::context::PackagingContext;
use crate::error::Result;

pub const WEB_INF_PATH: &str = "WEB-INF";

pub const META_INF_PATH: &str = "META-INF";

pub const CLASSES_PATH: &str = "WEB-INF/classes/";

pub const LIB_PATH: &str = "WEB-INF/lib/";

pub const TLD_PATH: &str = "WEB-INF/tld/";

/// One unit of the packaging sequence
///
/// Classes and dependencies are not separate entries: [`ProjectTask`] runs
/// them after the descriptors.
#[derive(Debug, Clone)]
pub enum PackagingTask {
    /// The project's own resources, sources, descriptors, classes and
    /// dependencies
    Project(ProjectTask),
    Overlay(OverlayTask),
}

impl PackagingTask {
    pub fn perform(&self, ctx: &mut PackagingContext) -> Result<()> {
        match self {
            PackagingTask::Project(task) => task.perform(ctx),
            PackagingTask::Overlay(task) => task.perform(ctx),
        }
    }

    /// Short human-readable description
    pub fn describe(&self) -> String {
        match self {
            PackagingTask::Project(_) => "project".to_string(),
            PackagingTask::Overlay(task) => format!("overlay {}", task.id()),
        }
    }
}
