//! Packaging configuration
//!
//! Loaded from a `warpack.yaml` file. Relative paths are resolved against
//! the directory containing that file (the project directory).

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::artifact::Artifact;
use crate::error::{IoResultExt, PackagingError, Result};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "warpack.yaml";

/// Configuration of one packaging run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarConfig {
    /// Project directory, set from the location of the configuration file
    #[serde(skip)]
    pub base_dir: PathBuf,

    /// Output root of the exploded webapp
    #[serde(default = "default_webapp_directory")]
    pub webapp_directory: PathBuf,

    /// Webapp sources copied wholesale
    #[serde(default = "default_webapp_source_directory")]
    pub webapp_source_directory: PathBuf,

    #[serde(default)]
    pub webapp_source_includes: Vec<String>,

    #[serde(default)]
    pub webapp_source_excludes: Vec<String>,

    /// Compiled classes, packaged under `WEB-INF/classes`
    #[serde(default = "default_classes_directory")]
    pub classes_directory: PathBuf,

    /// Scratch directory overlays are unpacked into
    #[serde(default = "default_work_directory")]
    pub work_directory: PathBuf,

    /// Primary deployment descriptor, packaged as `WEB-INF/web.xml`
    #[serde(default)]
    pub web_xml: Option<PathBuf>,

    /// Container-specific descriptor, packaged under `META-INF`
    #[serde(default)]
    pub container_config_xml: Option<PathBuf>,

    /// File name mapping applied to every packaged dependency
    #[serde(default)]
    pub output_file_name_mapping: Option<String>,

    /// `.properties` files providing filter tokens
    #[serde(default)]
    pub filters: Vec<PathBuf>,

    /// Inline filter tokens, overriding the filter files
    #[serde(default)]
    pub filter_properties: IndexMap<String, String>,

    #[serde(default)]
    pub web_resources: Vec<WebResource>,

    /// Resolved dependencies of the project
    #[serde(default)]
    pub dependencies: Vec<Artifact>,

    #[serde(default)]
    pub overlays: Vec<Overlay>,
}

fn default_webapp_directory() -> PathBuf {
    PathBuf::from("target/webapp")
}

fn default_webapp_source_directory() -> PathBuf {
    PathBuf::from("src/main/webapp")
}

fn default_classes_directory() -> PathBuf {
    PathBuf::from("target/classes")
}

fn default_work_directory() -> PathBuf {
    PathBuf::from("target/war/work")
}

impl Default for WarConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            webapp_directory: default_webapp_directory(),
            webapp_source_directory: default_webapp_source_directory(),
            webapp_source_includes: Vec::new(),
            webapp_source_excludes: Vec::new(),
            classes_directory: default_classes_directory(),
            work_directory: default_work_directory(),
            web_xml: None,
            container_config_xml: None,
            output_file_name_mapping: None,
            filters: Vec::new(),
            filter_properties: IndexMap::new(),
            web_resources: Vec::new(),
            dependencies: Vec::new(),
            overlays: Vec::new(),
        }
    }
}

impl WarConfig {
    /// Default configuration rooted at `base_dir`
    pub fn for_project(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let mut config: Self = serde_yaml::from_str(&content)?;
        config.base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(config)
    }

    /// Load `warpack.yaml` from a project directory
    pub fn load_project(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Err(PackagingError::InvalidConfig {
                message: format!("{} not found in {}", CONFIG_FILE_NAME, dir.display()),
            });
        }
        Self::load_from(&path)
    }

    /// Resolve `path` against the project directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// A directory of web resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebResource {
    /// Source directory, absolute or project-relative
    pub directory: PathBuf,

    #[serde(default)]
    pub includes: Vec<String>,

    #[serde(default)]
    pub excludes: Vec<String>,

    /// Prefix prepended to every target path
    #[serde(default)]
    pub target_path: Option<String>,

    /// Apply token substitution while copying
    #[serde(default)]
    pub filtering: bool,
}

impl WebResource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            includes: Vec::new(),
            excludes: Vec::new(),
            target_path: None,
            filtering: false,
        }
    }

    pub fn filtered(mut self) -> Self {
        self.filtering = true;
        self
    }

    pub fn with_target_path(mut self, target_path: impl Into<String>) -> Self {
        self.target_path = Some(target_path.into());
        self
    }
}

/// An archive merged into the webapp
///
/// Either references a `war` dependency (`groupId`/`artifactId`) or names an
/// archive `file` directly. An entry with `current: true` marks where the
/// project's own packaging runs relative to the overlays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    #[serde(default)]
    pub current: bool,

    #[serde(default)]
    pub group_id: Option<String>,

    #[serde(default)]
    pub artifact_id: Option<String>,

    #[serde(default)]
    pub classifier: Option<String>,

    #[serde(default)]
    pub file: Option<PathBuf>,

    #[serde(default)]
    pub includes: Vec<String>,

    /// Defaults to [`DEFAULT_OVERLAY_EXCLUDES`] when empty
    #[serde(default)]
    pub excludes: Vec<String>,

    #[serde(default)]
    pub target_path: Option<String>,

    #[serde(default)]
    pub skip: bool,
}

/// Files never copied from an overlay unless excludes are configured
pub const DEFAULT_OVERLAY_EXCLUDES: &[&str] = &["META-INF/MANIFEST.MF"];

impl Overlay {
    /// The placeholder for the project's own packaging
    pub fn current_project() -> Self {
        Self {
            current: true,
            ..Self::default()
        }
    }

    /// Overlay of a dependency, with default settings
    pub fn for_artifact(artifact: &Artifact) -> Self {
        Self {
            group_id: Some(artifact.group_id.clone()),
            artifact_id: Some(artifact.artifact_id.clone()),
            classifier: artifact.classifier().map(str::to_string),
            ..Self::default()
        }
    }

    /// Overlay of an archive on disk, with default settings
    pub fn for_file(file: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(file.into()),
            ..Self::default()
        }
    }

    /// Whether this overlay refers to `artifact`
    pub fn matches(&self, artifact: &Artifact) -> bool {
        let Some(artifact_id) = &self.artifact_id else {
            return false;
        };
        artifact_id == &artifact.artifact_id
            && self
                .group_id
                .as_ref()
                .is_none_or(|group_id| group_id == &artifact.group_id)
            && self.classifier.as_deref() == artifact.classifier()
    }

    /// Effective excludes
    pub fn effective_excludes(&self) -> Vec<String> {
        if self.excludes.is_empty() {
            DEFAULT_OVERLAY_EXCLUDES
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            self.excludes.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_applies_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "webXml: conf/web.xml\n").unwrap();

        let config = WarConfig::load_from(&path).unwrap();

        assert_eq!(config.base_dir, temp.path());
        assert_eq!(config.webapp_directory, PathBuf::from("target/webapp"));
        assert_eq!(
            config.webapp_source_directory,
            PathBuf::from("src/main/webapp")
        );
        assert_eq!(config.web_xml, Some(PathBuf::from("conf/web.xml")));
        assert!(config.web_resources.is_empty());
    }

    #[test]
    fn test_load_full_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"webappDirectory: out/app
outputFileNameMapping: "${artifactId}.${extension}"
filters:
  - filters/prod.properties
filterProperties:
  env: prod
webResources:
  - directory: src/main/config
    filtering: true
    targetPath: WEB-INF/conf
    includes: ["**/*.properties"]
dependencies:
  - groupId: org.example
    artifactId: shared-ui
    version: "1.0"
    type: war
    file: repo/shared-ui-1.0.war
overlays:
  - artifactId: shared-ui
    excludes: ["WEB-INF/web.xml"]
  - current: true
"#,
        )
        .unwrap();

        let config = WarConfig::load_from(&path).unwrap();

        assert_eq!(config.webapp_directory, PathBuf::from("out/app"));
        assert_eq!(config.filter_properties.get("env").unwrap(), "prod");
        assert_eq!(config.web_resources.len(), 1);
        assert!(config.web_resources[0].filtering);
        assert_eq!(
            config.web_resources[0].target_path.as_deref(),
            Some("WEB-INF/conf")
        );
        assert_eq!(config.overlays.len(), 2);
        assert!(config.overlays[0].matches(&config.dependencies[0]));
        assert!(config.overlays[1].current);
    }

    #[test]
    fn test_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "webResources: {not: [a list").unwrap();

        let err = WarConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, PackagingError::YamlParse(_)));
    }

    #[test]
    fn test_load_project_requires_file() {
        let temp = TempDir::new().unwrap();
        let err = WarConfig::load_project(temp.path()).unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_resolve() {
        let config = WarConfig::for_project("/work/project");
        assert_eq!(
            config.resolve(Path::new("src/main/webapp")),
            PathBuf::from("/work/project/src/main/webapp")
        );
        assert_eq!(config.resolve(Path::new("/abs")), PathBuf::from("/abs"));
    }

    #[test]
    fn test_overlay_default_excludes() {
        let overlay = Overlay::for_file("skin.zip");
        assert_eq!(overlay.effective_excludes(), vec!["META-INF/MANIFEST.MF"]);
    }
}
