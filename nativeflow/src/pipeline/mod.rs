//! Pipeline building and execution.
//!
//! This module provides:
//! - A builder that validates stage lists
//! - The sequential driver and the outcome of a run
//! - The terminal failure reporter
//! - The fixed iOS build and run pipelines

mod builder;
mod driver;
mod ios;
mod outcome;
mod reporter;

#[cfg(test)]
mod integration_tests;

pub use builder::PipelineBuilder;
pub use driver::Pipeline;
pub use ios::{
    ios_build_pipeline, ios_run_pipeline, IosCollaborators, IOS_BUILD_PIPELINE, IOS_RUN_PIPELINE,
};
pub use outcome::{PipelineFailure, PipelineOutcome, StageRecord};
pub use reporter::{Diagnostic, FailureReporter};
