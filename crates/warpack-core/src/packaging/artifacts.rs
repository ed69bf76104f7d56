//! Dependency artifacts copied into `WEB-INF/lib` and `WEB-INF/tld`

use crate::artifact::Artifact;
use crate::context::PackagingContext;
use crate::error::Result;

use super::primitives::{artifact_target_name, copy_file};
use super::{LIB_PATH, TLD_PATH};

/// Copies the project's runtime dependencies into the webapp
///
/// Jars land in `WEB-INF/lib`, tag library descriptors in `WEB-INF/tld`.
/// `war` dependencies are overlays and handled by [`super::OverlayTask`].
#[derive(Debug, Clone, Default)]
pub struct ArtifactsTask {
    artifacts: Vec<Artifact>,
}

impl ArtifactsTask {
    pub fn new(artifacts: Vec<Artifact>) -> Self {
        Self { artifacts }
    }

    pub fn perform(&self, ctx: &mut PackagingContext) -> Result<()> {
        for artifact in &self.artifacts {
            if artifact.optional || !artifact.scope.is_runtime() {
                tracing::debug!(
                    "Skipping {} (scope {:?}, optional: {})",
                    artifact.id(),
                    artifact.scope,
                    artifact.optional
                );
                continue;
            }

            let Some(directory) = target_directory(artifact) else {
                continue;
            };

            let name = artifact_target_name(ctx, artifact)?;
            let file = ctx.resolve_project_path(&artifact.file);
            copy_file(ctx, &file, &format!("{}{}", directory, name))?;
        }
        Ok(())
    }
}

fn target_directory(artifact: &Artifact) -> Option<&'static str> {
    match artifact.artifact_type.as_str() {
        "jar" | "ejb" | "ejb-client" | "test-jar" => Some(LIB_PATH),
        "tld" => Some(TLD_PATH),
        "war" => {
            tracing::debug!("{} is packaged as an overlay", artifact.id());
            None
        }
        other => {
            tracing::debug!(
                "Artifact of type [{}] is not supported, ignoring [{}]",
                other,
                artifact.id()
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::Scope;
    use crate::config::WarConfig;
    use std::path::Path;
    use tempfile::TempDir;

    fn artifact(temp: &Path, id: &str, artifact_type: &str, content: &str) -> Artifact {
        let file = temp.join(format!("repo/{}.{}", id, artifact_type));
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(&file, content).unwrap();
        Artifact::new("org.example", id, "1.0", file).with_type(artifact_type)
    }

    #[test]
    fn test_routes_by_type() {
        let temp = TempDir::new().unwrap();
        let task = ArtifactsTask::new(vec![
            artifact(temp.path(), "core", "jar", "jar"),
            artifact(temp.path(), "beans", "ejb", "ejb"),
            artifact(temp.path(), "tags", "tld", "tld"),
            artifact(temp.path(), "skin", "war", "war"),
            artifact(temp.path(), "parent", "pom", "pom"),
        ]);

        let mut ctx = PackagingContext::new(&WarConfig::for_project(temp.path()));
        task.perform(&mut ctx).unwrap();

        let packaged: Vec<_> = ctx.protected.iter().collect();
        assert_eq!(
            packaged,
            vec![
                "WEB-INF/lib/core-1.0.jar",
                "WEB-INF/lib/beans-1.0.jar",
                "WEB-INF/tld/tags-1.0.tld",
            ]
        );
        assert!(
            temp.path()
                .join("target/webapp/WEB-INF/lib/beans-1.0.jar")
                .exists()
        );
    }

    #[test]
    fn test_skips_non_runtime_and_optional() {
        let temp = TempDir::new().unwrap();
        let mut optional = artifact(temp.path(), "extra", "jar", "jar");
        optional.optional = true;
        let task = ArtifactsTask::new(vec![
            artifact(temp.path(), "servlet-api", "jar", "jar").with_scope(Scope::Provided),
            artifact(temp.path(), "junit", "jar", "jar").with_scope(Scope::Test),
            optional,
            artifact(temp.path(), "driver", "jar", "jar").with_scope(Scope::Runtime),
        ]);

        let mut ctx = PackagingContext::new(&WarConfig::for_project(temp.path()));
        task.perform(&mut ctx).unwrap();

        let packaged: Vec<_> = ctx.protected.iter().collect();
        assert_eq!(packaged, vec!["WEB-INF/lib/driver-1.0.jar"]);
    }

    #[test]
    fn test_colliding_names_keep_first() {
        let temp = TempDir::new().unwrap();
        let first = artifact(temp.path(), "util", "jar", "first");
        let mut second = artifact(temp.path(), "util-copy", "jar", "second");
        second.artifact_id = "util".to_string();

        let mut ctx = PackagingContext::new(&WarConfig::for_project(temp.path()));
        ArtifactsTask::new(vec![first, second])
            .perform(&mut ctx)
            .unwrap();

        let content =
            std::fs::read_to_string(temp.path().join("target/webapp/WEB-INF/lib/util-1.0.jar"))
                .unwrap();
        assert_eq!(content, "first");
    }

    #[test]
    fn test_malformed_mapping_fails() {
        let temp = TempDir::new().unwrap();
        let mut config = WarConfig::for_project(temp.path());
        config.output_file_name_mapping = Some("${artifactId".to_string());

        let mut ctx = PackagingContext::new(&config);
        let err = ArtifactsTask::new(vec![artifact(temp.path(), "core", "jar", "jar")])
            .perform(&mut ctx)
            .unwrap_err();
        assert!(err.is_config());
    }
}
