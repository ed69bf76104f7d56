//! Overlay archives merged into the webapp
//!
//! An overlay is unpacked under the work directory, then copied file by file
//! through the registry, so it only fills paths nobody packaged before it.

use std::path::PathBuf;

use crate::context::PackagingContext;
use crate::error::{IoResultExt, Result};

use super::primitives::{copy_files, resolve_files_to_include, unpack_archive};

/// Unpacks an archive and merges its content into the webapp
///
/// Files already claimed by an earlier task are kept.
#[derive(Debug, Clone)]
pub struct OverlayTask {
    id: String,
    file: PathBuf,
    includes: Vec<String>,
    excludes: Vec<String>,
    target_path: Option<String>,
}

impl OverlayTask {
    pub fn new(id: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            file: file.into(),
            includes: Vec::new(),
            excludes: Vec::new(),
            target_path: None,
        }
    }

    pub fn with_includes(mut self, includes: Vec<String>) -> Self {
        self.includes = includes;
        self
    }

    pub fn with_excludes(mut self, excludes: Vec<String>) -> Self {
        self.excludes = excludes;
        self
    }

    pub fn with_target_path(mut self, target_path: Option<String>) -> Self {
        self.target_path = target_path;
        self
    }

    /// Name of the overlay, also its unpack directory under the work directory
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn perform(&self, ctx: &mut PackagingContext) -> Result<()> {
        let file = ctx.resolve_project_path(&self.file);
        let unpack_dir = ctx.work_directory.join(&self.id);

        if unpack_dir.exists() {
            std::fs::remove_dir_all(&unpack_dir).with_path(&unpack_dir)?;
        }
        std::fs::create_dir_all(&unpack_dir).with_path(&unpack_dir)?;

        if !unpack_archive(ctx, &file, &unpack_dir)? {
            return Ok(());
        }

        let files = resolve_files_to_include(ctx, &unpack_dir, &self.includes, &self.excludes)?;
        let copied = copy_files(ctx, &unpack_dir, &files, self.target_path.as_deref())?;
        tracing::info!("Overlay [{}]: packaged {} files", self.id, copied);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::test_support::write_zip;
    use crate::config::WarConfig;
    use std::path::Path;
    use tempfile::TempDir;

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_overlay_fills_unclaimed_paths() {
        let temp = TempDir::new().unwrap();
        let war = temp.path().join("repo/skin.war");
        std::fs::create_dir_all(war.parent().unwrap()).unwrap();
        write_zip(
            &war,
            &[
                ("index.html", "overlay index"),
                ("css/skin.css", "skin"),
                ("META-INF/MANIFEST.MF", "Manifest-Version: 1.0"),
            ],
        );

        let mut ctx = PackagingContext::new(&WarConfig::for_project(temp.path()));
        ctx.protected.try_claim("index.html");

        OverlayTask::new("skin-1.0", &war)
            .with_excludes(vec!["META-INF/MANIFEST.MF".to_string()])
            .perform(&mut ctx)
            .unwrap();

        let out = temp.path().join("target/webapp");
        assert!(!out.join("index.html").exists());
        assert_eq!(read(&out.join("css/skin.css")), "skin");
        assert!(!out.join("META-INF/MANIFEST.MF").exists());
        assert!(
            temp.path()
                .join("target/war/work/skin-1.0/index.html")
                .exists()
        );
    }

    #[test]
    fn test_overlay_target_path_and_includes() {
        let temp = TempDir::new().unwrap();
        let war = temp.path().join("skin.war");
        write_zip(&war, &[("a.css", "a"), ("b.js", "b")]);

        let mut ctx = PackagingContext::new(&WarConfig::for_project(temp.path()));
        OverlayTask::new("skin", "skin.war")
            .with_includes(vec!["*.css".to_string()])
            .with_target_path(Some("static".to_string()))
            .perform(&mut ctx)
            .unwrap();

        let packaged: Vec<_> = ctx.protected.iter().collect();
        assert_eq!(packaged, vec!["static/a.css"]);
    }

    #[test]
    fn test_stale_unpack_directory_is_cleaned() {
        let temp = TempDir::new().unwrap();
        let war = temp.path().join("skin.war");
        write_zip(&war, &[("fresh.html", "fresh")]);
        let stale = temp.path().join("target/war/work/skin/stale.html");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "stale").unwrap();

        let mut ctx = PackagingContext::new(&WarConfig::for_project(temp.path()));
        OverlayTask::new("skin", &war).perform(&mut ctx).unwrap();

        assert!(!stale.exists());
        assert!(!ctx.protected.contains("stale.html"));
        assert!(ctx.protected.contains("fresh.html"));
    }

    #[test]
    fn test_unknown_extension_is_skipped() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("skin.rar");
        std::fs::write(&archive, "not an archive").unwrap();

        let mut ctx = PackagingContext::new(&WarConfig::for_project(temp.path()));
        OverlayTask::new("skin", &archive).perform(&mut ctx).unwrap();

        assert!(ctx.protected.is_empty());
        assert_eq!(ctx.skipped_archives, vec![archive]);
    }

    #[test]
    fn test_corrupt_archive_is_fatal() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("skin.war");
        std::fs::write(&archive, "not a zip").unwrap();

        let mut ctx = PackagingContext::new(&WarConfig::for_project(temp.path()));
        let err = OverlayTask::new("skin", &archive)
            .perform(&mut ctx)
            .unwrap_err();
        assert!(!err.is_config());
    }
}
