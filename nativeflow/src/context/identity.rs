//! Run identity for correlating the log lines of one pipeline run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIdentity {
    /// The unique ID for this pipeline run.
    pub pipeline_run_id: Uuid,

    /// When the run started.
    pub started_at: DateTime<Utc>,
}

impl Default for RunIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl RunIdentity {
    /// Creates a new run identity with a generated run ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_pipeline_run_id(Uuid::new_v4())
    }

    /// Creates a run identity with a specific run ID.
    #[must_use]
    pub fn with_pipeline_run_id(pipeline_run_id: Uuid) -> Self {
        Self {
            pipeline_run_id,
            started_at: Utc::now(),
        }
    }

    /// Returns the short form of the run ID used in log lines.
    #[must_use]
    pub fn short_id(&self) -> String {
        self.pipeline_run_id.simple().to_string()[..8].to_string()
    }
}
