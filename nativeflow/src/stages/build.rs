use super::{names, Stage};
use crate::adapters::{CommandRunner, CommandSpec, MetadataReader};
use crate::config::PipelineSettings;
use crate::context::BuildContext;
use crate::errors::NativeflowError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Runs the native build.
///
/// The project metadata is read first, but an empty platform config is
/// always the reported failure, even when the metadata read failed too.
pub struct BuildNativeAppStage {
    metadata: Arc<dyn MetadataReader>,
    runner: Arc<dyn CommandRunner>,
    configuration: String,
    sdk: String,
    derived_data_dir: String,
}

impl std::fmt::Debug for BuildNativeAppStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildNativeAppStage")
            .field("configuration", &self.configuration)
            .field("sdk", &self.sdk)
            .field("derived_data_dir", &self.derived_data_dir)
            .finish_non_exhaustive()
    }
}

impl BuildNativeAppStage {
    /// Creates the stage with the build configuration, SDK and derived data
    /// directory taken from `settings`.
    #[must_use]
    pub fn new(
        metadata: Arc<dyn MetadataReader>,
        runner: Arc<dyn CommandRunner>,
        settings: &PipelineSettings,
    ) -> Self {
        Self {
            metadata,
            runner,
            configuration: settings.build_configuration.clone(),
            sdk: settings.sdk.clone(),
            derived_data_dir: settings.derived_data_dir.clone(),
        }
    }
}

#[async_trait]
impl Stage for BuildNativeAppStage {
    fn name(&self) -> &str {
        names::BUILD_NATIVE_APP
    }

    async fn execute(&self, ctx: BuildContext) -> Result<BuildContext, NativeflowError> {
        let native_root = ctx.require_native_root(self.name())?;
        let project = ctx.require_native_project(self.name())?;
        let config = ctx.require_platform_config(self.name())?;

        let metadata = self.metadata.read(native_root, project).await;

        if config.is_empty() {
            if let Err(e) = &metadata {
                warn!(error = %e, "Metadata read also failed");
            }
            return Err(NativeflowError::ConfigDirNotDetected);
        }

        let metadata = metadata?;
        let scheme = metadata
            .first_scheme()
            .ok_or_else(|| NativeflowError::Metadata(format!("{} lists no schemes", project.name)))?;

        let command = CommandSpec::new("xcodebuild")
            .arg(project.xcodebuild_flag())
            .arg(project.name.clone())
            .args(["-scheme", scheme])
            .args(["-configuration", self.configuration.as_str()])
            .args(["-sdk", self.sdk.as_str()])
            .args(["-derivedDataPath", self.derived_data_dir.as_str()])
            .args(["clean", "build"])
            .current_dir(native_root);

        info!(scheme, command = %command, "Building project");
        self.runner.run(&command).await?;
        Ok(ctx)
    }
}
