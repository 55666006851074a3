use super::{names, Stage};
use crate::adapters::{ConfigResolver, PlatformConfigLoader};
use crate::context::{BuildContext, Platform};
use crate::errors::NativeflowError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Loads the platform config from the project root and resolves it.
///
/// Load failures propagate; an empty result is recorded as is and rejected
/// later by the build stage.
pub struct ResolvePlatformConfigStage {
    resolver: Arc<dyn ConfigResolver>,
    config_dir: String,
    extra_flags: BTreeMap<String, serde_json::Value>,
}

impl std::fmt::Debug for ResolvePlatformConfigStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvePlatformConfigStage")
            .field("config_dir", &self.config_dir)
            .field("extra_flags", &self.extra_flags)
            .finish_non_exhaustive()
    }
}

impl ResolvePlatformConfigStage {
    /// Creates the stage. `config_dir` is relative to the project root.
    #[must_use]
    pub fn new(resolver: Arc<dyn ConfigResolver>, config_dir: impl Into<String>) -> Self {
        Self {
            resolver,
            config_dir: config_dir.into(),
            extra_flags: BTreeMap::new(),
        }
    }

    /// Adds a flag merged into every non-empty config.
    #[must_use]
    pub fn with_extra_flag(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra_flags.insert(key.into(), value);
        self
    }
}

#[async_trait]
impl Stage for ResolvePlatformConfigStage {
    fn name(&self) -> &str {
        names::RESOLVE_PLATFORM_CONFIG
    }

    async fn execute(&self, ctx: BuildContext) -> Result<BuildContext, NativeflowError> {
        let loader = PlatformConfigLoader::new(
            Arc::clone(&self.resolver),
            ctx.root_path(),
            Platform::Ios,
            self.extra_flags.clone(),
        )
        .with_config_dir(&self.config_dir);

        let mut config = loader.get_config().await?;
        loader.resolver().resolve(&mut config);

        info!(
            dir = %loader.config_dir().display(),
            keys = config.len(),
            "Resolved platform config"
        );
        Ok(ctx.with_platform_config(config)?)
    }
}
