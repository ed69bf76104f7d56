//! State of one packaging run
//!
//! A [`PackagingContext`] is created once per run and passed by `&mut` to
//! every task and primitive. It owns the protected-path registry and the
//! services used to enumerate files and extract archives.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::archive::ArchiverManager;
use crate::config::WarConfig;
use crate::error::Result;
use crate::filter::FilterProperties;
use crate::registry::{ProtectedPaths, normalize};
use crate::scanner::{DirectoryScanner, FileEnumerator};

pub struct PackagingContext {
    /// Output root of the exploded webapp
    pub webapp_directory: PathBuf,

    /// Directory relative resource and artifact paths resolve against
    pub project_dir: PathBuf,

    pub webapp_source_directory: PathBuf,
    pub webapp_source_includes: Vec<String>,
    pub webapp_source_excludes: Vec<String>,
    pub classes_directory: PathBuf,
    pub work_directory: PathBuf,
    pub output_file_name_mapping: Option<String>,

    /// Target paths written so far
    pub protected: ProtectedPaths,

    /// Archives skipped because no extractor handles their extension
    pub skipped_archives: Vec<PathBuf>,

    filter_files: Vec<PathBuf>,
    inline_filters: IndexMap<String, String>,
    filter_properties: Option<FilterProperties>,

    enumerator: Box<dyn FileEnumerator>,
    archivers: ArchiverManager,
}

impl PackagingContext {
    /// Build the context of a run from its configuration
    pub fn new(config: &WarConfig) -> Self {
        Self {
            webapp_directory: config.resolve(&config.webapp_directory),
            project_dir: config.base_dir.clone(),
            webapp_source_directory: config.resolve(&config.webapp_source_directory),
            webapp_source_includes: config.webapp_source_includes.clone(),
            webapp_source_excludes: config.webapp_source_excludes.clone(),
            classes_directory: config.resolve(&config.classes_directory),
            work_directory: config.resolve(&config.work_directory),
            output_file_name_mapping: config.output_file_name_mapping.clone(),
            protected: ProtectedPaths::new(),
            skipped_archives: Vec::new(),
            filter_files: config.filters.iter().map(|f| config.resolve(f)).collect(),
            inline_filters: config.filter_properties.clone(),
            filter_properties: None,
            enumerator: Box::new(DirectoryScanner::new()),
            archivers: ArchiverManager::default(),
        }
    }

    pub fn with_enumerator(mut self, enumerator: impl FileEnumerator + 'static) -> Self {
        self.enumerator = Box::new(enumerator);
        self
    }

    pub fn with_archivers(mut self, archivers: ArchiverManager) -> Self {
        self.archivers = archivers;
        self
    }

    /// Use `properties` instead of loading the configured filter files
    pub fn with_filter_properties(mut self, properties: FilterProperties) -> Self {
        self.filter_properties = Some(properties);
        self
    }

    pub fn enumerator(&self) -> &dyn FileEnumerator {
        self.enumerator.as_ref()
    }

    pub fn archivers(&self) -> &ArchiverManager {
        &self.archivers
    }

    /// Filter properties, loaded on first use
    pub fn filter_properties(&mut self) -> Result<&FilterProperties> {
        if self.filter_properties.is_none() {
            let loaded = FilterProperties::load(&self.filter_files, &self.inline_filters)?;
            tracing::debug!("Loaded {} filter properties", loaded.len());
            self.filter_properties = Some(loaded);
        }
        Ok(self.filter_properties.get_or_insert_with(FilterProperties::new))
    }

    /// Absolute location of a target-relative path
    pub fn target_path(&self, relative: &str) -> PathBuf {
        self.webapp_directory.join(normalize(relative))
    }

    /// Resolve `path` against the project directory
    pub fn resolve_project_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }
}

impl std::fmt::Debug for PackagingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackagingContext")
            .field("webapp_directory", &self.webapp_directory)
            .field("project_dir", &self.project_dir)
            .field("protected", &self.protected.len())
            .finish_non_exhaustive()
    }
}

/// Whether two paths designate the same location
///
/// Existing paths are compared after canonicalization, others as written.
pub fn same_path(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
