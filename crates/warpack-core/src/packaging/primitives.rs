//! Copy, filter and unpack operations shared by the packaging tasks
//!
//! Every ordinary write goes through the protected-path registry first: a
//! target path claimed by an earlier task is never overwritten. Only
//! [`copy_file_if_newer`] bypasses the registry, for deployment descriptors.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use filetime::FileTime;

use crate::archive::extension_of;
use crate::artifact::{
    Artifact, DEFAULT_FILE_NAME_MAPPING, DEFAULT_FILE_NAME_MAPPING_CLASSIFIER,
    evaluate_file_name_mapping,
};
use crate::context::PackagingContext;
use crate::error::{IoResultExt, PackagingError, Result};
use crate::filter;
use crate::scanner::{DEFAULT_EXCLUDES, DEFAULT_INCLUDES};

/// Copy `source` to `target` (relative to the webapp root) unless the
/// target was already packaged
///
/// Returns whether the file was copied. The source modification time is
/// preserved.
pub fn copy_file(ctx: &mut PackagingContext, source: &Path, target: &str) -> Result<bool> {
    if !ctx.protected.try_claim(target) {
        return Ok(false);
    }

    let destination = ctx.target_path(target);
    copy_preserving_mtime(source, &destination)?;
    Ok(true)
}

/// Like [`copy_file`], streaming the content through the token filters
pub fn copy_filtered_file(ctx: &mut PackagingContext, source: &Path, target: &str) -> Result<bool> {
    if !ctx.protected.try_claim(target) {
        return Ok(false);
    }

    let destination = ctx.target_path(target);
    let properties = ctx.filter_properties()?;

    create_parent_dirs(&destination)?;
    let input = File::open(source).with_path(source)?;
    let output = File::create(&destination).with_path(&destination)?;
    let mut writer = BufWriter::new(output);

    filter::copy_filtered(input, &mut writer, properties).with_path(source)?;
    writer.flush().with_path(&destination)?;
    Ok(true)
}

/// Copy every path of `files` (relative to `base_dir`), prefixing targets
/// with `target_prefix` when given
///
/// Returns the number of files actually copied.
pub fn copy_files(
    ctx: &mut PackagingContext,
    base_dir: &Path,
    files: &[String],
    target_prefix: Option<&str>,
) -> Result<usize> {
    let mut copied = 0;
    for file in files {
        let target = join_target(target_prefix, file);
        if copy_file(ctx, &base_dir.join(file), &target)? {
            copied += 1;
        }
    }
    Ok(copied)
}

/// Copy `source` over `destination` only if the destination is missing or
/// strictly older
///
/// Bypasses the protected-path registry. Equal timestamps count as up to
/// date.
pub fn copy_file_if_newer(source: &Path, destination: &Path) -> Result<bool> {
    let source_mtime = modification_time(source)?;

    let outdated = match std::fs::metadata(destination) {
        Ok(metadata) => FileTime::from_last_modification_time(&metadata) < source_mtime,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => return Err(PackagingError::io(destination, e)),
    };

    if outdated {
        copy_preserving_mtime(source, destination)?;
        tracing::debug!("Copied {} to {}", source.display(), destination.display());
    } else {
        tracing::debug!("{} is up to date", destination.display());
    }
    Ok(outdated)
}

/// Extract `file` into `destination` with the extractor registered for its
/// extension
///
/// Returns `false` (after a warning) when no extractor handles the
/// extension; extraction failures are errors.
pub fn unpack_archive(ctx: &mut PackagingContext, file: &Path, destination: &Path) -> Result<bool> {
    let extension = extension_of(file);

    let Some(unarchiver) = ctx.archivers().unarchiver(&extension) else {
        tracing::warn!(
            "Skip unpacking dependency file [{}] with unknown extension [{}]",
            file.display(),
            extension
        );
        ctx.skipped_archives.push(file.to_path_buf());
        return Ok(false);
    };

    tracing::debug!("Unpacking {} to {}", file.display(), destination.display());
    unarchiver.extract(file, destination)?;
    Ok(true)
}

/// Files under `base_dir` to package
///
/// Empty `includes` mean everything; the default excludes always apply.
pub fn resolve_files_to_include(
    ctx: &PackagingContext,
    base_dir: &Path,
    includes: &[String],
    excludes: &[String],
) -> Result<Vec<String>> {
    let includes: Vec<String> = if includes.is_empty() {
        DEFAULT_INCLUDES.iter().map(|s| s.to_string()).collect()
    } else {
        includes.to_vec()
    };

    let excludes: Vec<String> = excludes
        .iter()
        .cloned()
        .chain(DEFAULT_EXCLUDES.iter().map(|s| s.to_string()))
        .collect();

    ctx.enumerator().enumerate(base_dir, &includes, &excludes)
}

/// File name of `artifact` inside the webapp
pub fn artifact_target_name(ctx: &PackagingContext, artifact: &Artifact) -> Result<String> {
    let mapping = match (&ctx.output_file_name_mapping, artifact.classifier()) {
        (Some(mapping), _) => mapping.as_str(),
        (None, Some(_)) => DEFAULT_FILE_NAME_MAPPING_CLASSIFIER,
        (None, None) => DEFAULT_FILE_NAME_MAPPING,
    };
    evaluate_file_name_mapping(mapping, artifact)
}

/// `prefix/path`, or `path` when there is no prefix
pub(crate) fn join_target(prefix: Option<&str>, path: &str) -> String {
    match prefix.map(|p| p.trim_end_matches(['/', '\\'])) {
        Some(prefix) if !prefix.is_empty() => format!("{}/{}", prefix, path),
        _ => path.to_string(),
    }
}

fn modification_time(path: &Path) -> Result<FileTime> {
    let metadata = std::fs::metadata(path).with_path(path)?;
    Ok(FileTime::from_last_modification_time(&metadata))
}

fn create_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_path(parent)?;
    }
    Ok(())
}

fn copy_preserving_mtime(source: &Path, destination: &Path) -> Result<()> {
    let mtime = modification_time(source)?;
    create_parent_dirs(destination)?;
    std::fs::copy(source, destination).with_path(source)?;
    filetime::set_file_mtime(destination, mtime).with_path(destination)?;
    Ok(())
}
