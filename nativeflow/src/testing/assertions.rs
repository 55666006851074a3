//! Assertions on pipeline outcomes.

use crate::context::BuildContext;
use crate::errors::ErrorKind;
use crate::pipeline::PipelineOutcome;

/// Asserts that every stage resolved.
pub fn assert_pipeline_succeeded(outcome: &PipelineOutcome) {
    if let Some(failure) = outcome.failure() {
        panic!(
            "Expected success, stage '{}' failed: {}",
            failure.stage, failure.error
        );
    }
}

/// Asserts that the run stopped at `stage`.
pub fn assert_failed_at(outcome: &PipelineOutcome, stage: &str) {
    let failure = outcome
        .failure()
        .unwrap_or_else(|| panic!("Expected failure at '{stage}', pipeline succeeded"));
    assert_eq!(
        failure.stage, stage,
        "Expected failure at '{stage}', got '{}': {}",
        failure.stage, failure.error
    );
    assert_eq!(
        outcome.stages.last().map(|s| s.name.as_str()),
        Some(stage),
        "Stages ran after the failing one: {:?}",
        outcome.executed_stages()
    );
}

/// Asserts the taxonomy bucket of the failure.
pub fn assert_failure_kind(outcome: &PipelineOutcome, expected: ErrorKind) {
    let failure = outcome
        .failure()
        .unwrap_or_else(|| panic!("Expected {expected} failure, pipeline succeeded"));
    assert_eq!(
        failure.error.kind(),
        expected,
        "Expected {expected} failure, got: {}",
        failure.error
    );
}

/// Asserts that exactly `expected` stages were invoked, in order.
pub fn assert_executed(outcome: &PipelineOutcome, expected: &[&str]) {
    assert_eq!(
        outcome.executed_stages(),
        expected,
        "Unexpected stage sequence"
    );
}

/// Asserts that `later` keeps every field of `earlier` unchanged.
pub fn assert_context_extends(later: &BuildContext, earlier: &BuildContext) {
    assert!(
        later.extends(earlier),
        "Context lost or changed fields. Before: {:?}, after: {:?}",
        earlier.fields(),
        later.fields()
    );
}
