//! Archive extraction for overlays and dependency archives
//!
//! Extractors are registered per lower-cased file extension. Asking the
//! [`ArchiverManager`] for an extension it does not know returns `None`,
//! which callers treat as "skip this file" rather than as a failure.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use filetime::FileTime;
use flate2::read::GzDecoder;
use tar::Archive;

use crate::error::{IoResultExt, PackagingError, Result};

/// Extracts one archive format into a directory
pub trait Unarchiver {
    /// Extract `archive` into `dest`, overwriting existing files
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()>;
}

/// Gzip-compressed tarballs (`.tgz`, `.tar.gz`)
#[derive(Debug, Default, Clone, Copy)]
pub struct TarGzUnarchiver;

impl Unarchiver for TarGzUnarchiver {
    fn extract(&self, archive_path: &Path, dest: &Path) -> Result<()> {
        let file = File::open(archive_path).with_path(archive_path)?;
        let decoder = GzDecoder::new(file);
        let mut archive = Archive::new(decoder);
        archive.set_overwrite(true);

        std::fs::create_dir_all(dest).with_path(dest)?;
        archive
            .unpack(dest)
            .map_err(|e| unpack_error(archive_path, dest, e))
    }
}

/// Uncompressed tarballs
#[derive(Debug, Default, Clone, Copy)]
pub struct TarUnarchiver;

impl Unarchiver for TarUnarchiver {
    fn extract(&self, archive_path: &Path, dest: &Path) -> Result<()> {
        let file = File::open(archive_path).with_path(archive_path)?;
        let mut archive = Archive::new(file);
        archive.set_overwrite(true);

        std::fs::create_dir_all(dest).with_path(dest)?;
        archive
            .unpack(dest)
            .map_err(|e| unpack_error(archive_path, dest, e))
    }
}

/// Zip-based archives (`.zip`, `.jar`, `.war`, `.ear`)
///
/// Extracted files carry the modification time recorded in the archive,
/// like tar entries do.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipUnarchiver;

impl Unarchiver for ZipUnarchiver {
    fn extract(&self, archive_path: &Path, dest: &Path) -> Result<()> {
        let file = File::open(archive_path).with_path(archive_path)?;
        let mut archive =
            zip::ZipArchive::new(file).map_err(|e| unpack_error(archive_path, dest, e))?;

        std::fs::create_dir_all(dest).with_path(dest)?;
        archive
            .extract(dest)
            .map_err(|e| unpack_error(archive_path, dest, e))?;

        for index in 0..archive.len() {
            let entry = archive
                .by_index(index)
                .map_err(|e| unpack_error(archive_path, dest, e))?;
            if entry.is_dir() {
                continue;
            }
            let Some(name) = entry.enclosed_name() else {
                continue;
            };
            let Some(mtime) = zip_mtime(entry.last_modified()) else {
                continue;
            };
            let target = dest.join(name);
            filetime::set_file_mtime(&target, mtime).with_path(&target)?;
        }
        Ok(())
    }
}

/// Zip timestamps have no zone; they are read as UTC
fn zip_mtime(time: zip::DateTime) -> Option<FileTime> {
    let date = NaiveDate::from_ymd_opt(
        time.year().into(),
        time.month().into(),
        time.day().into(),
    )?;
    let timestamp = date
        .and_hms_opt(time.hour().into(), time.minute().into(), time.second().into())?
        .and_utc()
        .timestamp();
    Some(FileTime::from_unix_time(timestamp, 0))
}

fn unpack_error(archive: &Path, dest: &Path, err: impl std::fmt::Display) -> PackagingError {
    PackagingError::Unpack {
        file: archive.to_path_buf(),
        destination: dest.to_path_buf(),
        message: err.to_string(),
    }
}

/// Registry of extractors keyed by file extension
pub struct ArchiverManager {
    unarchivers: HashMap<String, Box<dyn Unarchiver>>,
}

impl ArchiverManager {
    /// A manager without any extractor
    pub fn empty() -> Self {
        Self {
            unarchivers: HashMap::new(),
        }
    }

    /// Register `unarchiver` for `extension` (case-insensitive)
    pub fn register(&mut self, extension: &str, unarchiver: impl Unarchiver + 'static) {
        self.unarchivers
            .insert(extension.to_lowercase(), Box::new(unarchiver));
    }

    pub fn with(mut self, extension: &str, unarchiver: impl Unarchiver + 'static) -> Self {
        self.register(extension, unarchiver);
        self
    }

    /// Extractor registered for `extension`, if any
    pub fn unarchiver(&self, extension: &str) -> Option<&dyn Unarchiver> {
        self.unarchivers
            .get(&extension.to_lowercase())
            .map(|u| u.as_ref())
    }

    /// Registered extensions, sorted
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<_> = self.unarchivers.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }
}

impl Default for ArchiverManager {
    fn default() -> Self {
        Self::empty()
            .with("zip", ZipUnarchiver)
            .with("jar", ZipUnarchiver)
            .with("war", ZipUnarchiver)
            .with("ear", ZipUnarchiver)
            .with("tgz", TarGzUnarchiver)
            .with("gz", TarGzUnarchiver)
            .with("tar", TarUnarchiver)
    }
}

impl std::fmt::Debug for ArchiverManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiverManager")
            .field("extensions", &self.extensions())
            .finish()
    }
}

/// Lower-cased extension of `path` (empty when there is none)
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
