//! Stage trait and the iOS pipeline stages.
//!
//! A stage takes the context produced by its predecessor and either returns
//! an enriched context or fails. Stages never remove or overwrite fields.

mod assets;
mod build;
mod config;
mod devices;
mod native;
mod options;
mod toolchain;

pub use assets::{CopyBundleAssetsStage, StageReleaseAssetsStage};
pub use build::BuildNativeAppStage;
pub use config::ResolvePlatformConfigStage;
pub use devices::{ChooseDeviceStage, ListDevicesStage};
pub use native::{InstallNativeDependenciesStage, LocateNativeProjectStage};
pub use options::SeedOptionsStage;
pub use toolchain::{CheckToolchainStage, CompileBundleStage};

use crate::context::BuildContext;
use crate::errors::NativeflowError;
use async_trait::async_trait;
use std::fmt::Debug;

/// Stage names used by the iOS pipelines.
pub mod names {
    /// Ensures the deployment helper is installed.
    pub const CHECK_TOOLCHAIN: &str = "check_toolchain";
    /// Compiles the script bundle.
    pub const COMPILE_BUNDLE: &str = "compile_bundle";
    /// Copies bundle files into the native tree.
    pub const COPY_BUNDLE_ASSETS: &str = "copy_bundle_assets";
    /// Seeds caller options.
    pub const SEED_OPTIONS: &str = "seed_options";
    /// Locates the native project.
    pub const LOCATE_NATIVE_PROJECT: &str = "locate_native_project";
    /// Updates native dependencies.
    pub const INSTALL_NATIVE_DEPENDENCIES: &str = "install_native_dependencies";
    /// Loads the platform config.
    pub const RESOLVE_PLATFORM_CONFIG: &str = "resolve_platform_config";
    /// Runs the native build.
    pub const BUILD_NATIVE_APP: &str = "build_native_app";
    /// Copies release artifacts.
    pub const STAGE_RELEASE_ASSETS: &str = "stage_release_assets";
    /// Enumerates devices.
    pub const LIST_DEVICES: &str = "list_devices";
    /// Prompts for a device.
    pub const CHOOSE_DEVICE: &str = "choose_device";
}

/// Trait for pipeline stages.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the name of the stage.
    fn name(&self) -> &str;

    /// Executes the stage.
    ///
    /// Receives the context of the previous stage by value and returns it,
    /// possibly enriched, or the error that stops the pipeline.
    async fn execute(&self, ctx: BuildContext) -> Result<BuildContext, NativeflowError>;
}

/// A stage backed by a plain function.
pub struct FnStage<F>
where
    F: Fn(BuildContext) -> Result<BuildContext, NativeflowError> + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> FnStage<F>
where
    F: Fn(BuildContext) -> Result<BuildContext, NativeflowError> + Send + Sync,
{
    /// Creates a new function-based stage.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Debug for FnStage<F>
where
    F: Fn(BuildContext) -> Result<BuildContext, NativeflowError> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStage").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F> Stage for FnStage<F>
where
    F: Fn(BuildContext) -> Result<BuildContext, NativeflowError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: BuildContext) -> Result<BuildContext, NativeflowError> {
        (self.func)(ctx)
    }
}

/// A stage that passes the context through untouched.
#[derive(Debug, Clone)]
pub struct NoOpStage {
    name: String,
}

impl NoOpStage {
    /// Creates a new no-op stage.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Stage for NoOpStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: BuildContext) -> Result<BuildContext, NativeflowError> {
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BuildOptions;

    #[tokio::test]
    async fn test_fn_stage() {
        let stage = FnStage::new("seed", |ctx: BuildContext| {
            Ok(ctx.with_options(BuildOptions::new())?)
        });
        assert_eq!(stage.name(), "seed");

        let ctx = stage.execute(BuildContext::new("/app")).await.unwrap();
        assert!(ctx.options().is_some());
    }

    #[tokio::test]
    async fn test_fn_stage_error() {
        let stage = FnStage::new("fail", |_ctx| Err(NativeflowError::NoDevices));
        assert!(matches!(
            stage.execute(BuildContext::new("/app")).await,
            Err(NativeflowError::NoDevices)
        ));
    }

    #[tokio::test]
    async fn test_noop_stage() {
        let stage = NoOpStage::new("noop");
        let ctx = BuildContext::new("/app");
        let out = stage.execute(ctx.clone()).await.unwrap();
        assert_eq!(out, ctx);
        assert!(format!("{stage:?}").contains("noop"));
    }
}
