//! Packaging of the project's own content

use std::path::{Path, PathBuf};

use crate::config::WebResource;
use crate::context::{PackagingContext, same_path};
use crate::error::{IoResultExt, PackagingError, Result};

use super::primitives::{
    copy_file, copy_file_if_newer, copy_files, copy_filtered_file, join_target,
    resolve_files_to_include,
};
use super::{ArtifactsTask, ClassesTask, META_INF_PATH, WEB_INF_PATH};

/// Packages the project's own content
///
/// In order:
/// 1. web resources
/// 2. the webapp source directory
/// 3. the deployment descriptors, which always win over an overlay
/// 4. the compiled classes
/// 5. the dependencies
#[derive(Debug, Clone, Default)]
pub struct ProjectTask {
    web_resources: Vec<WebResource>,
    web_xml: Option<PathBuf>,
    container_config_xml: Option<PathBuf>,
    classes: ClassesTask,
    artifacts: ArtifactsTask,
}

impl ProjectTask {
    pub fn new(web_resources: Vec<WebResource>, artifacts: ArtifactsTask) -> Self {
        Self {
            web_resources,
            artifacts,
            ..Self::default()
        }
    }

    pub fn with_web_xml(mut self, web_xml: Option<PathBuf>) -> Self {
        self.web_xml = web_xml;
        self
    }

    pub fn with_container_config_xml(mut self, container_config_xml: Option<PathBuf>) -> Self {
        self.container_config_xml = container_config_xml;
        self
    }

    pub fn perform(&self, ctx: &mut PackagingContext) -> Result<()> {
        let webinf_dir = ctx.webapp_directory.join(WEB_INF_PATH);
        std::fs::create_dir_all(&webinf_dir).with_path(&webinf_dir)?;
        let metainf_dir = ctx.webapp_directory.join(META_INF_PATH);
        std::fs::create_dir_all(&metainf_dir).with_path(&metainf_dir)?;

        self.handle_web_resources(ctx)?;
        self.handle_webapp_source_directory(ctx)?;
        self.handle_deployment_descriptors(ctx, &webinf_dir, &metainf_dir)?;
        self.classes.perform(ctx)?;
        self.artifacts.perform(ctx)?;
        Ok(())
    }

    fn handle_web_resources(&self, ctx: &mut PackagingContext) -> Result<()> {
        for resource in &self.web_resources {
            let directory = ctx.resolve_project_path(&resource.directory);

            if same_path(&directory, &ctx.webapp_directory) {
                continue;
            }

            if !directory.is_dir() {
                tracing::warn!(
                    "Not copying webapp resources [{}]: directory does not exist!",
                    directory.display()
                );
                continue;
            }

            copy_resources(ctx, resource, &directory)?;
        }
        Ok(())
    }

    fn handle_webapp_source_directory(&self, ctx: &mut PackagingContext) -> Result<()> {
        let source = ctx.webapp_source_directory.clone();

        if !source.exists() {
            tracing::debug!("webapp sources directory does not exist - skipping.");
            return Ok(());
        }
        if same_path(&source, &ctx.webapp_directory) {
            tracing::debug!("webapp sources directory is the webapp directory - skipping.");
            return Ok(());
        }

        let files = resolve_files_to_include(
            ctx,
            &source,
            &ctx.webapp_source_includes,
            &ctx.webapp_source_excludes,
        )?;
        let copied = copy_files(ctx, &source, &files, None)?;
        tracing::info!(
            "Copied {} webapp sources from [{}]",
            copied,
            source.display()
        );
        Ok(())
    }

    fn handle_deployment_descriptors(
        &self,
        ctx: &mut PackagingContext,
        webinf_dir: &Path,
        metainf_dir: &Path,
    ) -> Result<()> {
        if let Some(web_xml) = configured(&self.web_xml) {
            let web_xml = existing_descriptor(ctx, web_xml)?;
            copy_file_if_newer(&web_xml, &webinf_dir.join("web.xml"))?;
            ctx.protected.force_claim(&format!("{}/web.xml", WEB_INF_PATH));
        }

        if let Some(container_config) = configured(&self.container_config_xml) {
            let container_config = existing_descriptor(ctx, container_config)?;
            let name = file_name(&container_config);
            copy_file_if_newer(&container_config, &metainf_dir.join(&name))?;
            ctx.protected
                .force_claim(&format!("{}/{}", META_INF_PATH, name));
        }

        Ok(())
    }
}

/// Copy the files of one web resource directory
fn copy_resources(ctx: &mut PackagingContext, resource: &WebResource, directory: &Path) -> Result<()> {
    tracing::info!(
        "Copy webapp resources [{}] to [{}]",
        directory.display(),
        ctx.webapp_directory.display()
    );

    let files = resolve_files_to_include(ctx, directory, &resource.includes, &resource.excludes)?;
    for file in &files {
        let source = directory.join(file);
        let target = join_target(resource.target_path.as_deref(), file);
        if resource.filtering {
            copy_filtered_file(ctx, &source, &target)?;
        } else {
            copy_file(ctx, &source, &target)?;
        }
    }
    Ok(())
}

/// A descriptor reference counts as configured when it names a file
fn configured(path: &Option<PathBuf>) -> Option<&Path> {
    path.as_deref()
        .filter(|p| p.file_name().is_some_and(|name| !name.is_empty()))
}

fn existing_descriptor(ctx: &PackagingContext, path: &Path) -> Result<PathBuf> {
    let resolved = ctx.resolve_project_path(path);
    if !resolved.is_file() {
        return Err(PackagingError::MissingDescriptor { path: resolved });
    }
    Ok(resolved)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}
