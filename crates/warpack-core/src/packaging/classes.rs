//! Compiled classes task

use crate::context::{PackagingContext, same_path};
use crate::error::Result;

use super::CLASSES_PATH;
use super::primitives::{copy_files, resolve_files_to_include};

/// Copies the compiled classes directory into `WEB-INF/classes`
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassesTask;

impl ClassesTask {
    pub fn perform(&self, ctx: &mut PackagingContext) -> Result<()> {
        let classes = ctx.classes_directory.clone();
        if !classes.is_dir() {
            tracing::debug!("classes directory does not exist - skipping.");
            return Ok(());
        }

        if same_path(&classes, &ctx.target_path(CLASSES_PATH)) {
            tracing::debug!("classes directory is already WEB-INF/classes - skipping.");
            return Ok(());
        }

        let files = resolve_files_to_include(ctx, &classes, &[], &[])?;
        let copied = copy_files(ctx, &classes, &files, Some(CLASSES_PATH))?;
        tracing::info!("Packaged {} classes and resources", copied);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WarConfig;
    use tempfile::TempDir;

    #[test]
    fn test_copies_classes() {
        let temp = TempDir::new().unwrap();
        let classes = temp.path().join("target/classes/com/example");
        std::fs::create_dir_all(&classes).unwrap();
        std::fs::write(classes.join("App.class"), "cafebabe").unwrap();

        let mut ctx = PackagingContext::new(&WarConfig::for_project(temp.path()));
        ClassesTask.perform(&mut ctx).unwrap();

        assert!(
            temp.path()
                .join("target/webapp/WEB-INF/classes/com/example/App.class")
                .exists()
        );
        assert!(ctx.protected.contains("WEB-INF/classes/com/example/App.class"));
    }

    #[test]
    fn test_missing_classes_directory_is_skipped() {
        let temp = TempDir::new().unwrap();
        let mut ctx = PackagingContext::new(&WarConfig::for_project(temp.path()));

        ClassesTask.perform(&mut ctx).unwrap();
        assert!(ctx.protected.is_empty());
    }
}
