use super::{names, Stage};
use crate::context::{BuildContext, BuildOptions};
use crate::errors::NativeflowError;
use async_trait::async_trait;

/// Packages the caller options into the context.
#[derive(Debug, Clone, Default)]
pub struct SeedOptionsStage {
    options: BuildOptions,
}

impl SeedOptionsStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Stage for SeedOptionsStage {
    fn name(&self) -> &str {
        names::SEED_OPTIONS
    }

    async fn execute(&self, ctx: BuildContext) -> Result<BuildContext, NativeflowError> {
        Ok(ctx.with_options(self.options.clone())?)
    }
}
