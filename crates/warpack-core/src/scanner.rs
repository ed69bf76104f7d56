//! File enumeration with Ant-style include/exclude patterns
//!
//! Patterns follow the usual conventions: `*` matches within one path
//! segment, `**` matches any number of segments and a trailing `/` stands
//! for `/**`. Paths are matched relative to the scanned base directory,
//! always with `/` separators.

use std::path::Path;

use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

use crate::error::{IoResultExt, PackagingError, Result};

/// Include pattern used when none is configured
pub const DEFAULT_INCLUDES: &[&str] = &["**/**"];

/// Version-control and OS metadata files excluded from every scan
pub const DEFAULT_EXCLUDES: &[&str] = &[
    // Miscellaneous typical temporary files
    "**/*~",
    "**/#*#",
    "**/.#*",
    "**/%*%",
    "**/._*",
    // CVS
    "**/CVS",
    "**/CVS/**",
    "**/.cvsignore",
    // SCCS
    "**/SCCS",
    "**/SCCS/**",
    // Visual SourceSafe
    "**/vssver.scc",
    // Subversion
    "**/.svn",
    "**/.svn/**",
    // Mac
    "**/.DS_Store",
    // Git
    "**/.git",
    "**/.git/**",
    "**/.gitattributes",
    "**/.gitignore",
    "**/.gitmodules",
    // Mercurial
    "**/.hg",
    "**/.hg/**",
    "**/.hgignore",
    // Bazaar
    "**/.bzr",
    "**/.bzr/**",
    "**/.bzrignore",
];

/// Lists the files of a directory tree matching include/exclude patterns
pub trait FileEnumerator {
    /// Relative paths (with `/` separators) of the files under `base_dir`
    /// matching at least one include and no exclude, sorted
    fn enumerate(
        &self,
        base_dir: &Path,
        includes: &[String],
        excludes: &[String],
    ) -> Result<Vec<String>>;
}

/// Filesystem enumerator walking the tree with `walkdir`
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryScanner;

impl DirectoryScanner {
    pub fn new() -> Self {
        Self
    }
}

impl FileEnumerator for DirectoryScanner {
    fn enumerate(
        &self,
        base_dir: &Path,
        includes: &[String],
        excludes: &[String],
    ) -> Result<Vec<String>> {
        if !base_dir.is_dir() {
            return Ok(Vec::new());
        }

        let includes = if includes.is_empty() {
            compile(DEFAULT_INCLUDES.iter().copied())?
        } else {
            compile(includes.iter().map(String::as_str))?
        };
        let excludes = compile(excludes.iter().map(String::as_str))?;

        let mut files = Vec::new();
        for entry in WalkDir::new(base_dir).follow_links(true) {
            let entry = entry.map_err(std::io::Error::from).with_path(base_dir)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(base_dir) else {
                continue;
            };
            let relative = relative_path(relative);

            if matches_any(&includes, &relative) && !matches_any(&excludes, &relative) {
                files.push(relative);
            }
        }

        files.sort();
        Ok(files)
    }
}

/// Join path components with `/`
fn relative_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

fn matches_any(patterns: &[Pattern], path: &str) -> bool {
    patterns
        .iter()
        .any(|pattern| pattern.matches_with(path, MATCH_OPTIONS))
}

fn compile<'a>(patterns: impl Iterator<Item = &'a str>) -> Result<Vec<Pattern>> {
    patterns
        .map(|pattern| {
            Pattern::new(&to_glob(pattern)).map_err(|e| PackagingError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}

/// Translate an Ant-style pattern into a `glob` pattern
fn to_glob(pattern: &str) -> String {
    let mut glob = pattern.trim().replace('\\', "/");
    while glob.starts_with('/') {
        glob.remove(0);
    }
    if glob.ends_with('/') {
        glob.push_str("**");
    }
    while glob.contains("**/**") {
        glob = glob.replace("**/**", "**");
    }
    if glob == "**" || glob.ends_with("/**") {
        glob.push_str("/*");
    }
    glob
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        std::fs::create_dir_all(root.join("css")).unwrap();
        std::fs::create_dir_all(root.join("WEB-INF/jsp")).unwrap();
        std::fs::create_dir_all(root.join(".git/objects")).unwrap();
        std::fs::create_dir_all(root.join("images/CVS")).unwrap();

        std::fs::write(root.join("index.html"), "<html/>").unwrap();
        std::fs::write(root.join("css/site.css"), "body {}").unwrap();
        std::fs::write(root.join("WEB-INF/jsp/home.jsp"), "<%@ page %>").unwrap();
        std::fs::write(root.join(".git/objects/abc"), "blob").unwrap();
        std::fs::write(root.join("images/CVS/Entries"), "").unwrap();
        std::fs::write(root.join(".DS_Store"), "").unwrap();
        std::fs::write(root.join("index.html~"), "backup").unwrap();

        temp
    }

    fn defaults() -> Vec<String> {
        DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_includes_everything() {
        let temp = create_tree();
        let files = DirectoryScanner::new()
            .enumerate(temp.path(), &[], &[])
            .unwrap();

        assert!(files.contains(&"index.html".to_string()));
        assert!(files.contains(&"css/site.css".to_string()));
        assert!(files.contains(&"WEB-INF/jsp/home.jsp".to_string()));
        assert!(files.contains(&".git/objects/abc".to_string()));
    }

    #[test]
    fn test_default_excludes() {
        let temp = create_tree();
        let files = DirectoryScanner::new()
            .enumerate(temp.path(), &[], &defaults())
            .unwrap();

        assert_eq!(
            files,
            vec!["WEB-INF/jsp/home.jsp", "css/site.css", "index.html"]
        );
    }

    #[test]
    fn test_includes_and_excludes() {
        let temp = create_tree();
        let files = DirectoryScanner::new()
            .enumerate(
                temp.path(),
                &["**/*.html".to_string(), "css/".to_string()],
                &["index.*".to_string()],
            )
            .unwrap();

        assert_eq!(files, vec!["css/site.css"]);
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        let temp = create_tree();
        let files = DirectoryScanner::new()
            .enumerate(temp.path(), &["*".to_string()], &defaults())
            .unwrap();

        assert_eq!(files, vec!["index.html"]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        let files = DirectoryScanner::new()
            .enumerate(&temp.path().join("missing"), &[], &[])
            .unwrap();

        assert!(files.is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        let temp = create_tree();
        let result = DirectoryScanner::new().enumerate(temp.path(), &["[abc".to_string()], &[]);

        let err = result.unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("[abc"));
    }

    #[test]
    fn test_to_glob() {
        assert_eq!(to_glob("**/**"), "**/*");
        assert_eq!(to_glob("WEB-INF/"), "WEB-INF/**/*");
        assert_eq!(to_glob("/css/*.css"), "css/*.css");
        assert_eq!(to_glob("**/CVS/**"), "**/CVS/**/*");
        assert_eq!(to_glob("**/*.xml"), "**/*.xml");
    }
}
