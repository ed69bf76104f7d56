//! Resolved dependency artifacts and their packaged file names

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{PackagingError, Result};

/// Mapping used when the artifact has no classifier
pub const DEFAULT_FILE_NAME_MAPPING: &str = "${artifactId}-${version}.${extension}";

/// Mapping used when the artifact carries a classifier
pub const DEFAULT_FILE_NAME_MAPPING_CLASSIFIER: &str =
    "${artifactId}-${version}-${classifier}.${extension}";

/// A resolved dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,

    #[serde(default)]
    pub classifier: Option<String>,

    /// Packaging type (`jar`, `war`, `tld`, ...)
    #[serde(default = "default_type", rename = "type")]
    pub artifact_type: String,

    #[serde(default)]
    pub scope: Scope,

    #[serde(default)]
    pub optional: bool,

    /// Location of the resolved file
    pub file: PathBuf,
}

fn default_type() -> String {
    "jar".to_string()
}

/// Dependency scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Compile,
    Runtime,
    Provided,
    Test,
    System,
}

impl Scope {
    /// Whether the dependency is needed by the running webapp
    pub fn is_runtime(self) -> bool {
        matches!(self, Scope::Compile | Scope::Runtime | Scope::System)
    }
}

impl Artifact {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            classifier: None,
            artifact_type: default_type(),
            scope: Scope::default(),
            optional: false,
            file: file.into(),
        }
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    pub fn with_type(mut self, artifact_type: impl Into<String>) -> Self {
        self.artifact_type = artifact_type.into();
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Classifier, if present and not blank
    pub fn classifier(&self) -> Option<&str> {
        self.classifier
            .as_deref()
            .filter(|classifier| !classifier.trim().is_empty())
    }

    /// File extension of the packaged artifact
    ///
    /// Derived from the type: `ejb`, `ejb-client` and `test-jar` are jars.
    pub fn extension(&self) -> &str {
        match self.artifact_type.as_str() {
            "ejb" | "ejb-client" | "test-jar" | "java-source" | "javadoc" => "jar",
            other => other,
        }
    }

    /// `groupId:artifactId:type[:classifier]:version`
    pub fn id(&self) -> String {
        match self.classifier() {
            Some(classifier) => format!(
                "{}:{}:{}:{}:{}",
                self.group_id, self.artifact_id, self.artifact_type, classifier, self.version
            ),
            None => format!(
                "{}:{}:{}:{}",
                self.group_id, self.artifact_id, self.artifact_type, self.version
            ),
        }
    }

    fn property(&self, name: &str) -> Option<&str> {
        match name {
            "groupId" => Some(&self.group_id),
            "artifactId" => Some(&self.artifact_id),
            "version" | "baseVersion" => Some(&self.version),
            "classifier" => Some(self.classifier().unwrap_or_default()),
            "type" => Some(&self.artifact_type),
            "extension" => Some(self.extension()),
            _ => None,
        }
    }
}

/// Evaluate a file name mapping such as `${artifactId}.${extension}`
///
/// Unknown properties and unterminated expressions are configuration errors.
pub fn evaluate_file_name_mapping(mapping: &str, artifact: &Artifact) -> Result<String> {
    let mut out = String::with_capacity(mapping.len());
    let mut rest = mapping;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let expression = &rest[start + 2..];
        let end = expression
            .find('}')
            .ok_or_else(|| PackagingError::FileNameMapping {
                mapping: mapping.to_string(),
                message: "unterminated '${' expression".to_string(),
            })?;

        let name = expression[..end].trim();
        let value = artifact
            .property(name)
            .ok_or_else(|| PackagingError::FileNameMapping {
                mapping: mapping.to_string(),
                message: format!("unknown property '{}'", name),
            })?;
        out.push_str(value);
        rest = &expression[end + 1..];
    }
    out.push_str(rest);

    if out.trim().is_empty() || out.contains('/') || out.contains('\\') {
        return Err(PackagingError::FileNameMapping {
            mapping: mapping.to_string(),
            message: format!("'{}' is not a valid file name", out),
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> Artifact {
        Artifact::new("org.example", "commons", "1.2.0", "/repo/commons-1.2.0.jar")
    }

    #[test]
    fn test_default_mapping() {
        let name = evaluate_file_name_mapping(DEFAULT_FILE_NAME_MAPPING, &artifact()).unwrap();
        assert_eq!(name, "commons-1.2.0.jar");
    }

    #[test]
    fn test_classifier_mapping() {
        let artifact = artifact().with_classifier("jdk8");
        let name =
            evaluate_file_name_mapping(DEFAULT_FILE_NAME_MAPPING_CLASSIFIER, &artifact).unwrap();
        assert_eq!(name, "commons-1.2.0-jdk8.jar");
    }

    #[test]
    fn test_custom_mapping() {
        let artifact = artifact().with_type("ejb");
        let name = evaluate_file_name_mapping("${groupId}.${artifactId}.${extension}", &artifact)
            .unwrap();
        assert_eq!(name, "org.example.commons.jar");
    }

    #[test]
    fn test_blank_classifier_is_ignored() {
        let artifact = artifact().with_classifier("  ");
        assert_eq!(artifact.classifier(), None);
        assert_eq!(artifact.id(), "org.example:commons:jar:1.2.0");
    }

    #[test]
    fn test_unknown_property_is_config_error() {
        let err = evaluate_file_name_mapping("${nope}.jar", &artifact()).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("unknown property 'nope'"));
    }

    #[test]
    fn test_unterminated_expression() {
        let err = evaluate_file_name_mapping("${artifactId.jar", &artifact()).unwrap_err();
        assert!(matches!(err, PackagingError::FileNameMapping { .. }));
    }

    #[test]
    fn test_mapping_cannot_escape_directory() {
        assert!(evaluate_file_name_mapping("../${artifactId}.jar", &artifact()).is_err());
    }

    #[test]
    fn test_scope_runtime() {
        assert!(Scope::Compile.is_runtime());
        assert!(Scope::Runtime.is_runtime());
        assert!(!Scope::Provided.is_runtime());
        assert!(!Scope::Test.is_runtime());
    }

    #[test]
    fn test_deserialize_defaults() {
        let artifact: Artifact = serde_yaml::from_str(
            "groupId: org.example\nartifactId: taglib\nversion: '2.0'\ntype: tld\nfile: lib/taglib.tld\n",
        )
        .unwrap();

        assert_eq!(artifact.artifact_type, "tld");
        assert_eq!(artifact.scope, Scope::Compile);
        assert!(!artifact.optional);
    }
}
