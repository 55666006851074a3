//! The fixed iOS pipelines.
//!
//! `build`: check toolchain, compile bundle, copy bundle assets, seed
//! options, locate native project, install native dependencies, resolve
//! platform config, build native app, stage release assets.
//!
//! `run`: seed options, locate native project, list devices, choose device.

use super::{Pipeline, PipelineBuilder};
use crate::adapters::{
    BundleCompiler, CliclackChooser, CommandBundleCompiler, CommandRunner, ConfigResolver,
    DeployHelperInstaller, DeviceChooser, DeviceLister, FileStager, IosConfigResolver,
    MetadataReader, ProjectLocator, TokioCommandRunner, ToolchainInstaller, WalkdirStager,
    XcodeProjectLocator, XcodebuildMetadataReader, XctraceDeviceLister,
};
use crate::config::PipelineSettings;
use crate::context::BuildOptions;
use crate::errors::NativeflowError;
use crate::events::EventSink;
use crate::stages::{
    BuildNativeAppStage, CheckToolchainStage, ChooseDeviceStage, CompileBundleStage,
    CopyBundleAssetsStage, InstallNativeDependenciesStage, ListDevicesStage,
    LocateNativeProjectStage, ResolvePlatformConfigStage, SeedOptionsStage,
    StageReleaseAssetsStage,
};
use std::sync::Arc;

/// Name of the build pipeline.
pub const IOS_BUILD_PIPELINE: &str = "ios-build";

/// Name of the run pipeline.
pub const IOS_RUN_PIPELINE: &str = "ios-run";

/// Flag merged into every non-empty iOS config.
const EXTRA_CONFIG_FLAG: &str = "Ws";

/// The collaborators the iOS stages drive.
#[derive(Clone)]
pub struct IosCollaborators {
    /// Deployment helper installer.
    pub installer: Arc<dyn ToolchainInstaller>,
    /// Script bundle compiler.
    pub compiler: Arc<dyn BundleCompiler>,
    /// File stager for bundle and release assets.
    pub stager: Arc<dyn FileStager>,
    /// Native project locator.
    pub locator: Arc<dyn ProjectLocator>,
    /// External command runner.
    pub runner: Arc<dyn CommandRunner>,
    /// Platform config resolver.
    pub resolver: Arc<dyn ConfigResolver>,
    /// Native metadata reader.
    pub metadata: Arc<dyn MetadataReader>,
    /// Device lister.
    pub lister: Arc<dyn DeviceLister>,
    /// Interactive device chooser.
    pub chooser: Arc<dyn DeviceChooser>,
}

impl std::fmt::Debug for IosCollaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IosCollaborators").finish_non_exhaustive()
    }
}

impl IosCollaborators {
    /// Wires the real tools: `tokio::process`, `xcodebuild`, `xcrun` and an
    /// interactive prompt.
    #[must_use]
    pub fn system(settings: &PipelineSettings, events: Arc<dyn EventSink>) -> Self {
        let runner: Arc<dyn CommandRunner> = Arc::new(TokioCommandRunner::new());
        Self {
            installer: Arc::new(DeployHelperInstaller::new(
                settings.deploy_helper.clone(),
                settings.deploy_helper_install.clone(),
                Arc::clone(&runner),
            )),
            compiler: Arc::new(CommandBundleCompiler::new(
                settings.bundle_command.clone(),
                Arc::clone(&runner),
            )),
            stager: Arc::new(WalkdirStager::new(events, settings.copy_concurrency)),
            locator: Arc::new(XcodeProjectLocator::new()),
            resolver: Arc::new(IosConfigResolver::new()),
            metadata: Arc::new(XcodebuildMetadataReader::new(Arc::clone(&runner))),
            lister: Arc::new(XctraceDeviceLister::new(Arc::clone(&runner), true)),
            chooser: Arc::new(CliclackChooser::new()),
            runner,
        }
    }
}

/// Builds the iOS build pipeline.
///
/// Release staging is always part of the pipeline and does nothing unless
/// `options` sets `release`.
pub fn ios_build_pipeline(
    collaborators: &IosCollaborators,
    settings: &PipelineSettings,
    options: BuildOptions,
    events: Arc<dyn EventSink>,
) -> Result<Pipeline, NativeflowError> {
    let c = collaborators;
    let pipeline = PipelineBuilder::new(IOS_BUILD_PIPELINE)
        .events(events)
        .stage(Arc::new(CheckToolchainStage::new(Arc::clone(&c.installer))))?
        .stage(Arc::new(CompileBundleStage::new(Arc::clone(&c.compiler))))?
        .stage(Arc::new(CopyBundleAssetsStage::new(Arc::clone(&c.stager), settings)?))?
        .stage(Arc::new(SeedOptionsStage::new(options)))?
        .stage(Arc::new(LocateNativeProjectStage::new(
            Arc::clone(&c.locator),
            settings.platform_dir.clone(),
        )))?
        .stage(Arc::new(InstallNativeDependenciesStage::new(
            Arc::clone(&c.runner),
            settings.dependency_command.clone(),
        )))?
        .stage(Arc::new(
            ResolvePlatformConfigStage::new(Arc::clone(&c.resolver), settings.config_dir.clone())
                .with_extra_flag(EXTRA_CONFIG_FLAG, serde_json::json!("")),
        ))?
        .stage(Arc::new(BuildNativeAppStage::new(
            Arc::clone(&c.metadata),
            Arc::clone(&c.runner),
            settings,
        )))?
        .stage(Arc::new(StageReleaseAssetsStage::new(Arc::clone(&c.stager), settings)?))?
        .build()?;
    Ok(pipeline)
}

/// Builds the run pipeline that picks a deployment target.
pub fn ios_run_pipeline(
    collaborators: &IosCollaborators,
    settings: &PipelineSettings,
    options: BuildOptions,
    events: Arc<dyn EventSink>,
) -> Result<Pipeline, NativeflowError> {
    let c = collaborators;
    let pipeline = PipelineBuilder::new(IOS_RUN_PIPELINE)
        .events(events)
        .stage(Arc::new(SeedOptionsStage::new(options)))?
        .stage(Arc::new(LocateNativeProjectStage::new(
            Arc::clone(&c.locator),
            settings.platform_dir.clone(),
        )))?
        .stage(Arc::new(ListDevicesStage::new(Arc::clone(&c.lister))))?
        .stage(Arc::new(ChooseDeviceStage::new(Arc::clone(&c.chooser))))?
        .build()?;
    Ok(pipeline)
}
