//! Event sink system for observability.
//!
//! Stages and the pipeline driver report progress as named events
//! (`stage.started`, `copy.file_failed`, ...). Sinks decide what to do with
//! them: drop them, log them through `tracing`, or collect them for tests.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// Event names emitted by the pipeline driver and the stages.
pub mod names {
    /// A pipeline run began.
    pub const PIPELINE_STARTED: &str = "pipeline.started";
    /// Every stage resolved.
    pub const PIPELINE_COMPLETED: &str = "pipeline.completed";
    /// A stage rejected and the run stopped.
    pub const PIPELINE_FAILED: &str = "pipeline.failed";
    /// A stage is about to run.
    pub const STAGE_STARTED: &str = "stage.started";
    /// A stage resolved.
    pub const STAGE_COMPLETED: &str = "stage.completed";
    /// A stage rejected.
    pub const STAGE_FAILED: &str = "stage.failed";
    /// A file copy began.
    pub const COPY_FILE_STARTED: &str = "copy.file_started";
    /// A file copy finished.
    pub const COPY_FILE_COMPLETED: &str = "copy.file_completed";
    /// A file copy failed.
    pub const COPY_FILE_FAILED: &str = "copy.file_failed";
}
