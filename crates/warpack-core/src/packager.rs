//! Plans and runs the packaging sequence of a project

use std::path::{Path, PathBuf};

use crate::archive::ArchiverManager;
use crate::artifact::Artifact;
use crate::config::{Overlay, WarConfig};
use crate::context::PackagingContext;
use crate::error::{IoResultExt, PackagingError, Result};
use crate::filter::FilterProperties;
use crate::packaging::{ArtifactsTask, OverlayTask, PackagingTask, ProjectTask};
use crate::scanner::FileEnumerator;

/// Outcome of a packaging run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagingSummary {
    pub webapp_directory: PathBuf,

    /// Packaged paths, in the order they were claimed
    pub packaged: Vec<String>,

    /// Overlay archives nobody could extract
    pub skipped_archives: Vec<PathBuf>,
}

/// Runs the packaging tasks of one project in order
#[derive(Debug)]
pub struct Packager {
    context: PackagingContext,
    tasks: Vec<PackagingTask>,
}

impl Packager {
    /// Plan the tasks described by `config`
    pub fn from_config(config: &WarConfig) -> Result<Self> {
        let tasks = plan_tasks(config)?;
        Ok(Self {
            context: PackagingContext::new(config),
            tasks,
        })
    }

    pub fn with_enumerator(mut self, enumerator: impl FileEnumerator + 'static) -> Self {
        self.context = self.context.with_enumerator(enumerator);
        self
    }

    pub fn with_archivers(mut self, archivers: ArchiverManager) -> Self {
        self.context = self.context.with_archivers(archivers);
        self
    }

    pub fn with_filter_properties(mut self, properties: FilterProperties) -> Self {
        self.context = self.context.with_filter_properties(properties);
        self
    }

    pub fn tasks(&self) -> &[PackagingTask] {
        &self.tasks
    }

    pub fn webapp_directory(&self) -> &Path {
        &self.context.webapp_directory
    }

    /// Run every task; the first failure stops the run
    pub fn package(mut self) -> Result<PackagingSummary> {
        let output = self.context.webapp_directory.clone();
        std::fs::create_dir_all(&output).with_path(&output)?;
        tracing::info!("Assembling webapp in [{}]", output.display());

        for task in &self.tasks {
            tracing::info!("Packaging {}", task.describe());
            task.perform(&mut self.context)?;
        }

        Ok(PackagingSummary {
            webapp_directory: output,
            packaged: self.context.protected.iter().map(str::to_string).collect(),
            skipped_archives: self.context.skipped_archives,
        })
    }
}

fn plan_tasks(config: &WarConfig) -> Result<Vec<PackagingTask>> {
    let war_dependencies: Vec<&Artifact> = config
        .dependencies
        .iter()
        .filter(|a| a.artifact_type == "war" && !a.optional && a.scope.is_runtime())
        .collect();

    let mut overlays = config.overlays.clone();
    if overlays.iter().filter(|o| o.current).count() > 1 {
        return Err(PackagingError::InvalidConfig {
            message: "only one overlay can mark the current project".to_string(),
        });
    }
    if !overlays.iter().any(|o| o.current) {
        overlays.insert(0, Overlay::current_project());
    }

    // Dependencies without an explicit entry are applied after the listed ones
    for artifact in &war_dependencies {
        if !overlays.iter().any(|o| o.matches(artifact)) {
            overlays.push(Overlay::for_artifact(artifact));
        }
    }

    let mut tasks = Vec::with_capacity(overlays.len());
    for overlay in &overlays {
        if overlay.current {
            tasks.push(PackagingTask::Project(project_task(config)));
            continue;
        }
        if overlay.skip {
            tracing::debug!("Skipping overlay {:?}", overlay.artifact_id);
            continue;
        }
        tasks.push(PackagingTask::Overlay(overlay_task(
            overlay,
            &war_dependencies,
        )?));
    }
    Ok(tasks)
}

fn project_task(config: &WarConfig) -> ProjectTask {
    ProjectTask::new(
        config.web_resources.clone(),
        ArtifactsTask::new(config.dependencies.clone()),
    )
    .with_web_xml(config.web_xml.clone())
    .with_container_config_xml(config.container_config_xml.clone())
}

fn overlay_task(overlay: &Overlay, war_dependencies: &[&Artifact]) -> Result<OverlayTask> {
    let (id, file) = match (&overlay.file, &overlay.artifact_id) {
        (Some(file), _) => (file_stem(file), file.clone()),
        (None, Some(artifact_id)) => {
            let artifact = war_dependencies
                .iter()
                .find(|a| overlay.matches(a))
                .ok_or_else(|| PackagingError::InvalidConfig {
                    message: format!("overlay [{}] is not a war dependency", artifact_id),
                })?;
            (overlay_id(artifact), artifact.file.clone())
        }
        (None, None) => {
            return Err(PackagingError::InvalidConfig {
                message: "overlay needs an artifactId or a file".to_string(),
            });
        }
    };

    Ok(OverlayTask::new(id, file)
        .with_includes(overlay.includes.clone())
        .with_excludes(overlay.effective_excludes())
        .with_target_path(overlay.target_path.clone()))
}

/// `artifactId-version[-classifier]`
fn overlay_id(artifact: &Artifact) -> String {
    match artifact.classifier() {
        Some(classifier) => format!(
            "{}-{}-{}",
            artifact.artifact_id, artifact.version, classifier
        ),
        None => format!("{}-{}", artifact.artifact_id, artifact.version),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "overlay".to_string())
}
