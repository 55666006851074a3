//! Testing utilities for nativeflow pipelines.
//!
//! This module provides:
//! - Recording and failing stages for driver tests
//! - In-memory command runner and device chooser
//! - Context fixtures and outcome assertions
//! - Capture of log output

mod assertions;
mod fakes;
mod fixtures;
mod logs;
mod mocks;

pub use assertions::{
    assert_context_extends, assert_executed, assert_failed_at, assert_failure_kind,
    assert_pipeline_succeeded,
};
pub use fakes::{RecordingCommandRunner, ScriptedChooser};
pub use fixtures::{
    ready_context, sample_config, sample_devices, XCODEBUILD_LIST_JSON, XCTRACE_TWO_DEVICES,
};
pub use logs::LogCapture;
pub use mocks::{FailingStage, RecordingStage};
