//! Result of one pipeline run.

use super::Diagnostic;
use crate::context::BuildContext;
use crate::errors::NativeflowError;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Timing of one executed stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRecord {
    /// Stage name.
    pub name: String,
    /// Wall-clock time the stage took.
    pub duration: Duration,
    /// Whether the stage resolved.
    pub succeeded: bool,
}

impl StageRecord {
    /// Duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }
}

/// The stage that stopped a run and why.
#[derive(Debug)]
pub struct PipelineFailure {
    /// Name of the failing stage.
    pub stage: String,
    /// The error the stage returned, unchanged.
    pub error: NativeflowError,
    /// What the terminal handler reported.
    pub diagnostic: Diagnostic,
}

/// Outcome of [`Pipeline::run`](super::Pipeline::run).
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Pipeline name.
    pub pipeline: String,
    /// Run id shared with the context.
    pub run_id: Uuid,
    /// Stages that were invoked, in order. A failing stage is the last entry.
    pub stages: Vec<StageRecord>,
    /// Total wall-clock time.
    pub duration: Duration,
    /// The final context, or the failure that stopped the run.
    pub result: Result<BuildContext, PipelineFailure>,
}

impl PipelineOutcome {
    /// Returns true if every stage resolved.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns the final context of a successful run.
    #[must_use]
    pub fn context(&self) -> Option<&BuildContext> {
        self.result.as_ref().ok()
    }

    /// Returns the failure of an unsuccessful run.
    #[must_use]
    pub fn failure(&self) -> Option<&PipelineFailure> {
        self.result.as_ref().err()
    }

    /// Names of the stages that were invoked.
    #[must_use]
    pub fn executed_stages(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }

    /// Converts into the final context or the stage error.
    pub fn into_result(self) -> Result<BuildContext, NativeflowError> {
        self.result.map_err(|failure| failure.error)
    }
}
