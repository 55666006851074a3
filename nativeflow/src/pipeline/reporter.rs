//! Terminal failure handler.
//!
//! Every rejection of a pipeline run ends up here exactly once. The handler
//! logs the error, adds a remediation hint where one applies, and returns
//! the [`Diagnostic`] so callers can render it. It never fails.

use crate::errors::{ErrorKind, NativeflowError, BUILD_FAILURE_HINT};
use crate::stages::names;
use serde::Serialize;
use tracing::{error, info};

/// What the terminal handler reported for a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Stage that failed.
    pub stage: String,
    /// Error code from [`NativeflowError::info`].
    pub code: String,
    /// Taxonomy bucket.
    pub kind: ErrorKind,
    /// The error message.
    pub message: String,
    /// Remediation hint, if any applies.
    pub hint: Option<String>,
    /// Documentation link.
    pub doc_url: Option<String>,
}

/// Logs pipeline failures and decides on remediation hints.
#[derive(Debug, Clone, Default)]
pub struct FailureReporter {
    build_stages: Vec<String>,
}

impl FailureReporter {
    /// Creates a reporter that treats process failures of the dependency
    /// and native build stages as build failures.
    #[must_use]
    pub fn new() -> Self {
        Self {
            build_stages: vec![
                names::INSTALL_NATIVE_DEPENDENCIES.to_string(),
                names::BUILD_NATIVE_APP.to_string(),
            ],
        }
    }

    /// Builds the diagnostic for `error` raised by `stage`.
    #[must_use]
    pub fn diagnose(&self, stage: &str, error: &NativeflowError) -> Diagnostic {
        let info = error.info();
        let kind = error.kind();
        let hint = match kind {
            ErrorKind::ExternalProcess => self
                .build_stages
                .iter()
                .any(|s| s == stage)
                .then(|| BUILD_FAILURE_HINT.to_string()),
            ErrorKind::InteractiveInput => None,
            ErrorKind::Environment | ErrorKind::Configuration | ErrorKind::Internal => info.fix_hint,
        };

        Diagnostic {
            stage: stage.to_string(),
            code: info.code,
            kind,
            message: error.to_string(),
            hint,
            doc_url: info.doc_url,
        }
    }

    /// Logs `error` and returns its diagnostic.
    pub fn report(&self, stage: &str, error: &NativeflowError) -> Diagnostic {
        let diagnostic = self.diagnose(stage, error);
        error!(
            stage,
            code = %diagnostic.code,
            kind = %diagnostic.kind,
            "{}",
            diagnostic.message
        );
        if let Some(hint) = &diagnostic.hint {
            info!("=> {hint}");
        }
        if let Some(url) = &diagnostic.doc_url {
            info!("See {url}");
        }
        diagnostic
    }
}
