//! Sequential pipeline execution.

use super::{FailureReporter, PipelineFailure, PipelineOutcome, StageRecord};
use crate::context::BuildContext;
use crate::events::{names, EventSink};
use crate::stages::Stage;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// An ordered list of stages run against one context.
///
/// Each stage gets the context its predecessor returned. The first failure
/// stops the run; no later stage is invoked and the error goes to the
/// [`FailureReporter`].
pub struct Pipeline {
    name: String,
    stages: Vec<Arc<dyn Stage>>,
    events: Arc<dyn EventSink>,
    reporter: FailureReporter,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("stages", &self.stage_names())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub(crate) fn new(
        name: String,
        stages: Vec<Arc<dyn Stage>>,
        events: Arc<dyn EventSink>,
        reporter: FailureReporter,
    ) -> Self {
        Self {
            name,
            stages,
            events,
            reporter,
        }
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Runs every stage in order against `ctx`.
    ///
    /// Never panics or returns early with an error: a failure is reported
    /// and carried in the outcome.
    pub async fn run(&self, ctx: BuildContext) -> PipelineOutcome {
        let run_id = ctx.identity().pipeline_run_id;
        let started = Instant::now();
        let mut records = Vec::with_capacity(self.stages.len());

        info!(pipeline = %self.name, run_id = %ctx.identity().short_id(), "Pipeline started");
        self.events.emit(
            names::PIPELINE_STARTED,
            Some(serde_json::json!({
                "pipeline": &self.name,
                "run_id": run_id.to_string(),
                "stages": self.stage_names(),
            })),
        );

        let mut ctx = ctx;
        for stage in &self.stages {
            let stage_name = stage.name().to_string();
            self.events.emit(
                names::STAGE_STARTED,
                Some(serde_json::json!({ "stage": &stage_name })),
            );

            let stage_start = Instant::now();
            let result = stage.execute(ctx).await;
            let duration = stage_start.elapsed();
            let duration_ms = duration.as_secs_f64() * 1000.0;

            match result {
                Ok(next) => {
                    debug!(stage = %stage_name, duration_ms, "Stage completed");
                    self.events.emit(
                        names::STAGE_COMPLETED,
                        Some(serde_json::json!({
                            "stage": &stage_name,
                            "duration_ms": duration_ms,
                        })),
                    );
                    records.push(StageRecord {
                        name: stage_name,
                        duration,
                        succeeded: true,
                    });
                    ctx = next;
                }
                Err(error) => {
                    self.events.emit(
                        names::STAGE_FAILED,
                        Some(serde_json::json!({
                            "stage": &stage_name,
                            "error": error.to_string(),
                            "duration_ms": duration_ms,
                        })),
                    );
                    records.push(StageRecord {
                        name: stage_name.clone(),
                        duration,
                        succeeded: false,
                    });

                    let diagnostic = self.reporter.report(&stage_name, &error);
                    self.events.emit(
                        names::PIPELINE_FAILED,
                        Some(serde_json::json!({
                            "pipeline": &self.name,
                            "run_id": run_id.to_string(),
                            "stage": &stage_name,
                            "code": &diagnostic.code,
                        })),
                    );

                    return PipelineOutcome {
                        pipeline: self.name.clone(),
                        run_id,
                        stages: records,
                        duration: started.elapsed(),
                        result: Err(PipelineFailure {
                            stage: stage_name,
                            error,
                            diagnostic,
                        }),
                    };
                }
            }
        }

        let duration = started.elapsed();
        info!(
            pipeline = %self.name,
            duration_ms = duration.as_secs_f64() * 1000.0,
            "Pipeline completed"
        );
        self.events.emit(
            names::PIPELINE_COMPLETED,
            Some(serde_json::json!({
                "pipeline": &self.name,
                "run_id": run_id.to_string(),
                "duration_ms": duration.as_secs_f64() * 1000.0,
            })),
        );

        PipelineOutcome {
            pipeline: self.name.clone(),
            run_id,
            stages: records,
            duration,
            result: Ok(ctx),
        }
    }
}
