//! Stages for driver tests.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::context::BuildContext;
use crate::errors::NativeflowError;
use crate::stages::Stage;

type Enrich = Box<dyn Fn(BuildContext) -> Result<BuildContext, NativeflowError> + Send + Sync>;

/// A stage that records every context it receives.
///
/// Passes the context through unless built with [`RecordingStage::enriching`].
pub struct RecordingStage {
    name: String,
    inputs: Mutex<Vec<BuildContext>>,
    enrich: Option<Enrich>,
}

impl std::fmt::Debug for RecordingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingStage")
            .field("name", &self.name)
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}

impl RecordingStage {
    /// Creates a pass-through recording stage.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Mutex::new(Vec::new()),
            enrich: None,
        }
    }

    /// Creates a recording stage that transforms the context with `enrich`.
    #[must_use]
    pub fn enriching(
        name: impl Into<String>,
        enrich: impl Fn(BuildContext) -> Result<BuildContext, NativeflowError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            enrich: Some(Box::new(enrich)),
            ..Self::new(name)
        }
    }

    /// Returns the number of times the stage was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inputs.lock().len()
    }

    /// Returns the contexts received, in call order.
    #[must_use]
    pub fn recorded_contexts(&self) -> Vec<BuildContext> {
        self.inputs.lock().clone()
    }

    /// Returns the context of the most recent call.
    #[must_use]
    pub fn last_context(&self) -> Option<BuildContext> {
        self.inputs.lock().last().cloned()
    }

    /// Resets call tracking.
    pub fn reset(&self) {
        self.inputs.lock().clear();
    }
}

#[async_trait]
impl Stage for RecordingStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: BuildContext) -> Result<BuildContext, NativeflowError> {
        self.inputs.lock().push(ctx.clone());
        match &self.enrich {
            Some(enrich) => enrich(ctx),
            None => Ok(ctx),
        }
    }
}

/// A stage that always fails.
pub struct FailingStage {
    name: String,
    error: Box<dyn Fn() -> NativeflowError + Send + Sync>,
    calls: Mutex<usize>,
}

impl std::fmt::Debug for FailingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailingStage")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl FailingStage {
    /// Creates a stage that fails with the error built by `error`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        error: impl Fn() -> NativeflowError + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            error: Box::new(error),
            calls: Mutex::new(0),
        }
    }

    /// Returns the number of times the stage was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl Stage for FailingStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, _ctx: BuildContext) -> Result<BuildContext, NativeflowError> {
        *self.calls.lock() += 1;
        Err((self.error)())
    }
}
