//! Native project discovery and dependency installation.

use super::{names, Stage};
use crate::adapters::{CommandRunner, CommandSpec, ProjectLocator};
use crate::context::BuildContext;
use crate::errors::NativeflowError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Locates the native project inside the platform subtree.
///
/// Fails with [`NativeflowError::PlatformMissing`] when the subtree does not
/// exist and with [`NativeflowError::ProjectNotFound`] when it holds no
/// project descriptor. On success the context records the subtree as its
/// native root; the process working directory is left alone.
pub struct LocateNativeProjectStage {
    locator: Arc<dyn ProjectLocator>,
    platform_dir: String,
}

impl std::fmt::Debug for LocateNativeProjectStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocateNativeProjectStage")
            .field("platform_dir", &self.platform_dir)
            .finish_non_exhaustive()
    }
}

impl LocateNativeProjectStage {
    /// Creates the stage. `platform_dir` is relative to the project root.
    #[must_use]
    pub fn new(locator: Arc<dyn ProjectLocator>, platform_dir: impl Into<String>) -> Self {
        Self {
            locator,
            platform_dir: platform_dir.into(),
        }
    }
}

#[async_trait]
impl Stage for LocateNativeProjectStage {
    fn name(&self) -> &str {
        names::LOCATE_NATIVE_PROJECT
    }

    async fn execute(&self, ctx: BuildContext) -> Result<BuildContext, NativeflowError> {
        let native_root = ctx.root_path().join(&self.platform_dir);
        if !native_root.is_dir() {
            return Err(NativeflowError::PlatformMissing { path: native_root });
        }

        let Some(project) = self.locator.locate(&native_root)? else {
            return Err(NativeflowError::ProjectNotFound { path: native_root });
        };

        info!(project = %project.name, native_root = %native_root.display(), "start iOS app");
        Ok(ctx.with_native_project(native_root, project)?)
    }
}

/// Runs the dependency manager (`pod update`) in the native root.
///
/// A failing command is surfaced as is.
pub struct InstallNativeDependenciesStage {
    runner: Arc<dyn CommandRunner>,
    command: Vec<String>,
}

impl std::fmt::Debug for InstallNativeDependenciesStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallNativeDependenciesStage")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

impl InstallNativeDependenciesStage {
    /// Creates the stage running the `command` argv.
    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>, command: Vec<String>) -> Self {
        Self { runner, command }
    }
}

#[async_trait]
impl Stage for InstallNativeDependenciesStage {
    fn name(&self) -> &str {
        names::INSTALL_NATIVE_DEPENDENCIES
    }

    async fn execute(&self, ctx: BuildContext) -> Result<BuildContext, NativeflowError> {
        let native_root = ctx.require_native_root(self.name())?;
        let Some(command) = CommandSpec::from_argv(&self.command) else {
            debug!("No dependency command configured");
            return Ok(ctx);
        };

        info!(command = %command, "Updating native dependencies");
        self.runner.run(&command.current_dir(native_root)).await?;
        Ok(ctx)
    }
}
