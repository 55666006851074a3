//! Best-effort file staging steps.
//!
//! Both stages delegate to a [`FileStager`]; individual copy failures are
//! logged by the stager and never fail the stage.

use super::{names, Stage};
use crate::adapters::{CopyFilter, FileStager};
use crate::config::PipelineSettings;
use crate::context::{BuildContext, BuildOptions};
use crate::errors::NativeflowError;
use async_trait::async_trait;
use std::path::{Component, Path};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Copies the compiled script bundle into the native project tree.
///
/// When the destination lies inside the platform directory and that
/// directory does not exist yet, the copy is skipped so the locate stage
/// reports the missing platform.
pub struct CopyBundleAssetsStage {
    stager: Arc<dyn FileStager>,
    src_dir: String,
    dest_dir: String,
    platform_dir: String,
    filter: CopyFilter,
}

impl std::fmt::Debug for CopyBundleAssetsStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CopyBundleAssetsStage")
            .field("src_dir", &self.src_dir)
            .field("dest_dir", &self.dest_dir)
            .finish_non_exhaustive()
    }
}

impl CopyBundleAssetsStage {
    /// Creates the stage from the bundle directories and patterns in
    /// `settings`.
    pub fn new(stager: Arc<dyn FileStager>, settings: &PipelineSettings) -> Result<Self, NativeflowError> {
        Ok(Self {
            stager,
            src_dir: settings.dist_dir.clone(),
            dest_dir: settings.bundle_dest_dir.clone(),
            platform_dir: settings.platform_dir.clone(),
            filter: CopyFilter::new(
                settings.bundle_include.as_slice(),
                settings.bundle_exclude.as_slice(),
            )?,
        })
    }
}

#[async_trait]
impl Stage for CopyBundleAssetsStage {
    fn name(&self) -> &str {
        names::COPY_BUNDLE_ASSETS
    }

    async fn execute(&self, ctx: BuildContext) -> Result<BuildContext, NativeflowError> {
        let src = ctx.root_path().join(&self.src_dir);
        let dest = ctx.root_path().join(&self.dest_dir);
        let platform_root = ctx.root_path().join(&self.platform_dir);
        if dest.starts_with(&platform_root) && !platform_root.is_dir() {
            warn!(
                platform = %platform_root.display(),
                "Platform directory missing, skipping bundle copy"
            );
            return Ok(ctx);
        }
        info!(src = %src.display(), dest = %dest.display(), "Move JSbundle to dist");

        let report = self.stager.stage(&src, &dest, &self.filter).await?;
        if !report.failed.is_empty() {
            warn!(failed = report.failed.len(), "Some bundle files were not copied");
        }
        info!(copied = report.copied_count(), "Move {} files.", report.matched);
        Ok(ctx)
    }
}

/// Copies build products into `<release_dir>/<version>`.
///
/// Runs only when the `release` option is set. The version directory comes
/// from the platform config.
pub struct StageReleaseAssetsStage {
    stager: Arc<dyn FileStager>,
    products_dir: String,
    release_dir: String,
    version_key: String,
    filter: CopyFilter,
}

impl std::fmt::Debug for StageReleaseAssetsStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageReleaseAssetsStage")
            .field("products_dir", &self.products_dir)
            .field("release_dir", &self.release_dir)
            .field("version_key", &self.version_key)
            .finish_non_exhaustive()
    }
}

impl StageReleaseAssetsStage {
    /// Creates the stage from the release settings.
    pub fn new(stager: Arc<dyn FileStager>, settings: &PipelineSettings) -> Result<Self, NativeflowError> {
        Ok(Self {
            stager,
            products_dir: settings.products_dir.clone(),
            release_dir: settings.release_dir.clone(),
            version_key: settings.release_version_key.clone(),
            filter: CopyFilter::new(settings.release_include.as_slice(), &[])?,
        })
    }
}

#[async_trait]
impl Stage for StageReleaseAssetsStage {
    fn name(&self) -> &str {
        names::STAGE_RELEASE_ASSETS
    }

    async fn execute(&self, ctx: BuildContext) -> Result<BuildContext, NativeflowError> {
        if !ctx.options().is_some_and(BuildOptions::release) {
            debug!("Release staging not requested");
            return Ok(ctx);
        }

        let native_root = ctx.require_native_root(self.name())?;
        let config = ctx.require_platform_config(self.name())?;
        let version = config.get_str(&self.version_key).ok_or_else(|| {
            NativeflowError::missing_field(self.name(), format!("platform_config.{}", self.version_key))
        })?;

        let src = native_root.join(&self.products_dir);
        if !is_plain_dir_name(version) {
            return Err(NativeflowError::InvalidReleaseVersion {
                version: version.to_string(),
            });
        }
        let dest = ctx.root_path().join(&self.release_dir).join(version);
        info!(dest = %dest.display(), "Move Release File");

        let report = self.stager.stage(&src, &dest, &self.filter).await?;
        info!(copied = report.copied_count(), "Move {} files. SUCCESSFUL", report.matched);
        Ok(ctx)
    }
}

/// True for a single normal path component such as `1.2.0`.
fn is_plain_dir_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::copy::MockFileStager;
    use crate::adapters::{CopyReport, WalkdirStager};
    use crate::context::{NativeProject, PlatformConfig};
    use crate::events::CollectingEventSink;
    use std::path::{Path, PathBuf};

    #[tokio::test]
    async fn test_copy_bundle_paths_and_filter() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("platforms/ios")).unwrap();
        let expected_src = root.path().join("dist");
        let expected_dest = root.path().join("platforms/ios/bundlejs");

        let mut stager = MockFileStager::new();
        stager
            .expect_stage()
            .withf(move |src, dest, filter| {
                src == expected_src
                    && dest == expected_dest
                    && filter.matches("index.js")
                    && !filter.matches("index.web.js")
            })
            .times(1)
            .returning(|_, _, _| Ok(CopyReport::default()));

        let stage = CopyBundleAssetsStage::new(Arc::new(stager), &PipelineSettings::default()).unwrap();
        stage.execute(BuildContext::new(root.path())).await.unwrap();
    }

    #[tokio::test]
    async fn test_copy_bundle_leaves_missing_platform_alone() {
        let mut stager = MockFileStager::new();
        stager.expect_stage().times(0);

        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("dist")).unwrap();
        let stage = CopyBundleAssetsStage::new(Arc::new(stager), &PipelineSettings::default()).unwrap();

        stage.execute(BuildContext::new(root.path())).await.unwrap();
        assert!(!root.path().join("platforms").exists());
    }

    #[tokio::test]
    async fn test_copy_bundle_tolerates_file_failures() {
        let root = tempfile::tempdir().unwrap();
        let dist = root.path().join("dist");
        std::fs::create_dir_all(&dist).unwrap();
        for name in ["a.js", "b.js", "c.web.js", "d.css"] {
            std::fs::write(dist.join(name), name).unwrap();
        }
        std::fs::create_dir_all(root.path().join("platforms/ios/bundlejs/b.js")).unwrap();

        let stager = WalkdirStager::new(Arc::new(CollectingEventSink::new()), 2);
        let stage = CopyBundleAssetsStage::new(Arc::new(stager), &PipelineSettings::default()).unwrap();

        let ctx = stage.execute(BuildContext::new(root.path())).await.unwrap();
        assert_eq!(ctx.root_path(), root.path());
        assert!(root.path().join("platforms/ios/bundlejs/a.js").is_file());
    }

    #[tokio::test]
    async fn test_copy_bundle_missing_dist_fails() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("platforms/ios")).unwrap();
        let stager = WalkdirStager::new(Arc::new(CollectingEventSink::new()), 2);
        let stage = CopyBundleAssetsStage::new(Arc::new(stager), &PipelineSettings::default()).unwrap();
        assert!(matches!(
            stage.execute(BuildContext::new(root.path())).await,
            Err(NativeflowError::Io(_))
        ));
    }

    fn release_context(release: bool, config: PlatformConfig) -> BuildContext {
        BuildContext::new("/app")
            .with_options(BuildOptions::new().with_value("release", serde_json::json!(release)))
            .unwrap()
            .with_native_project("/app/platforms/ios", NativeProject::new("App.xcodeproj", false, "/p"))
            .unwrap()
            .with_platform_config(config)
            .unwrap()
    }

    fn versioned(version: &str) -> PlatformConfig {
        let mut config = PlatformConfig::new();
        config.insert("BuildVersion", serde_json::json!(version));
        config
    }

    #[tokio::test]
    async fn test_release_skipped_without_flag() {
        let mut stager = MockFileStager::new();
        stager.expect_stage().times(0);

        let stage = StageReleaseAssetsStage::new(Arc::new(stager), &PipelineSettings::default()).unwrap();
        stage.execute(release_context(false, versioned("1.0.0"))).await.unwrap();
        stage.execute(BuildContext::new("/app")).await.unwrap();
    }

    #[tokio::test]
    async fn test_release_copies_into_version_dir() {
        let mut stager = MockFileStager::new();
        stager
            .expect_stage()
            .withf(|src, dest, filter| {
                src == Path::new("/app/platforms/ios/build/Build/Products/Release-iphoneos")
                    && dest == PathBuf::from("/app/release/ios/2.1.0").as_path()
                    && filter.matches("App.ipa")
                    && !filter.matches("App.apk")
            })
            .times(1)
            .returning(|_, _, _| Ok(CopyReport::default()));

        let stage = StageReleaseAssetsStage::new(Arc::new(stager), &PipelineSettings::default()).unwrap();
        stage.execute(release_context(true, versioned("2.1.0"))).await.unwrap();
    }

    #[tokio::test]
    async fn test_release_requires_version() {
        let mut stager = MockFileStager::new();
        stager.expect_stage().times(0);

        let mut config = PlatformConfig::new();
        config.insert("AppName", serde_json::json!("Demo"));

        let stage = StageReleaseAssetsStage::new(Arc::new(stager), &PipelineSettings::default()).unwrap();
        let err = stage.execute(release_context(true, config)).await.unwrap_err();
        assert!(matches!(
            err,
            NativeflowError::MissingField { ref field, .. } if field == "platform_config.BuildVersion"
        ));
    }

    #[tokio::test]
    async fn test_release_version_must_stay_inside_release_dir() {
        for version in ["../../outside", "/tmp/abs", "1.0/extra", "..", ""] {
            let mut stager = MockFileStager::new();
            stager.expect_stage().times(0);

            let stage = StageReleaseAssetsStage::new(Arc::new(stager), &PipelineSettings::default()).unwrap();
            let err = stage.execute(release_context(true, versioned(version))).await.unwrap_err();
            assert!(
                matches!(err, NativeflowError::InvalidReleaseVersion { .. }),
                "version {version:?}: {err}"
            );
            assert_eq!(err.kind(), crate::errors::ErrorKind::Configuration);
        }
        assert!(is_plain_dir_name("2.1.0"));
        assert!(is_plain_dir_name("v2.1.0-beta"));
    }
}
