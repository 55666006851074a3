//! Stages that prepare the toolchain and the script bundle.

use super::{names, Stage};
use crate::adapters::{BundleCompiler, ToolchainInstaller};
use crate::context::BuildContext;
use crate::errors::NativeflowError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Ensures the deployment helper is available.
pub struct CheckToolchainStage {
    installer: Arc<dyn ToolchainInstaller>,
}

impl std::fmt::Debug for CheckToolchainStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckToolchainStage").finish_non_exhaustive()
    }
}

impl CheckToolchainStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(installer: Arc<dyn ToolchainInstaller>) -> Self {
        Self { installer }
    }
}

#[async_trait]
impl Stage for CheckToolchainStage {
    fn name(&self) -> &str {
        names::CHECK_TOOLCHAIN
    }

    async fn execute(&self, ctx: BuildContext) -> Result<BuildContext, NativeflowError> {
        self.installer.ensure().await?;
        Ok(ctx)
    }
}

/// Compiles the script bundle in the project root.
pub struct CompileBundleStage {
    compiler: Arc<dyn BundleCompiler>,
}

impl std::fmt::Debug for CompileBundleStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompileBundleStage").finish_non_exhaustive()
    }
}

impl CompileBundleStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(compiler: Arc<dyn BundleCompiler>) -> Self {
        Self { compiler }
    }
}

#[async_trait]
impl Stage for CompileBundleStage {
    fn name(&self) -> &str {
        names::COMPILE_BUNDLE
    }

    async fn execute(&self, ctx: BuildContext) -> Result<BuildContext, NativeflowError> {
        info!(root = %ctx.root_path().display(), "Compiling script bundle");
        self.compiler.compile(ctx.root_path()).await?;
        Ok(ctx)
    }
}
