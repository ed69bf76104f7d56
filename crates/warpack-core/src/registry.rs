//! Protected-path registry
//!
//! Records every target path written to the output tree during a packaging
//! run. The first task to claim a path owns it: later ordinary copies to the
//! same path are rejected, which is how source precedence is enforced.

use indexmap::IndexSet;

/// Target-relative paths already packaged in the current run
///
/// Paths always use `/` as separator, regardless of platform.
#[derive(Debug, Default, Clone)]
pub struct ProtectedPaths {
    paths: IndexSet<String>,
}

impl ProtectedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `path` for the caller
    ///
    /// Returns `true` and records the path if nobody claimed it yet, `false`
    /// (without mutation) otherwise.
    pub fn try_claim(&mut self, path: &str) -> bool {
        let path = normalize(path);
        if self.paths.contains(&path) {
            tracing::debug!(" - {} wasn't copied because it has already been packaged.", path);
            false
        } else {
            tracing::debug!(" + {} has been claimed.", path);
            self.paths.insert(path);
            true
        }
    }

    /// Record `path` whether or not it was already claimed
    pub fn force_claim(&mut self, path: &str) {
        let path = normalize(path);
        tracing::debug!(" ! {} is protected.", path);
        self.paths.insert(path);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(&normalize(path))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Claimed paths in claim order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

/// Normalize separators, collapse duplicate or leading slashes and fold
/// `..` segments
///
/// A `..` above the root is dropped, so the result always stays inside the
/// output tree.
pub(crate) fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    segments.join("/")
}
