//! Error types for the nativeflow pipeline.
//!
//! Every stage either resolves with an enriched context or rejects with a
//! [`NativeflowError`]. The variants follow the failure taxonomy of the build:
//! environment problems, configuration problems, external process failures,
//! interactive-input failures and internal contract violations.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Advisory printed after build-related failures.
pub const BUILD_FAILURE_HINT: &str = "You should config `CodeSign` and `Profile` in the `ios.config.json`\n\n    \
     We suggest that you open the `platform/ios` directory.\n\n    \
     Package your project as a normal ios project!";

/// The main error type for nativeflow operations.
#[derive(Debug, Error)]
pub enum NativeflowError {
    /// The platform subtree has not been scaffolded yet.
    #[error("iOS project not found at {}", .path.display())]
    PlatformMissing {
        /// The expected platform directory.
        path: PathBuf,
    },

    /// The platform subtree exists but holds no Xcode project files.
    #[error("Could not find Xcode project files in {}", .path.display())]
    ProjectNotFound {
        /// The directory that was searched.
        path: PathBuf,
    },

    /// A required external helper could not be ensured.
    #[error("Toolchain helper '{tool}' unavailable: {reason}")]
    Toolchain {
        /// The helper binary name.
        tool: String,
        /// Why it could not be installed or found.
        reason: String,
    },

    /// The resolved platform configuration is empty.
    #[error("iOS config dir not detected.")]
    ConfigDirNotDetected,

    /// The release version from the platform config is not a plain
    /// directory name.
    #[error("Release version '{version}' is not a valid directory name")]
    InvalidReleaseVersion {
        /// The configured version.
        version: String,
    },

    /// An external command failed. The process error is kept unchanged.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Device selection was attempted with no candidates.
    #[error("No ios devices found.")]
    NoDevices,

    /// The interactive chooser failed or was cancelled.
    #[error("Device prompt failed: {0}")]
    Prompt(String),

    /// Native project metadata could not be read or was unusable.
    #[error("Unable to read native project metadata: {0}")]
    Metadata(String),

    /// A stage attempted to overwrite a context field.
    #[error("{0}")]
    ContextConflict(#[from] ContextConflictError),

    /// A stage found a field missing that an earlier stage should have set.
    #[error("Stage '{stage}' requires context field '{field}' which is not set")]
    MissingField {
        /// The stage that noticed.
        stage: String,
        /// The missing field.
        field: String,
    },

    /// The pipeline definition is invalid.
    #[error("{0}")]
    Validation(#[from] PipelineValidationError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`NativeflowError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing platform subtree, project descriptor or toolchain.
    Environment,
    /// Empty or unusable platform configuration.
    Configuration,
    /// Non-zero exit or spawn failure of an external command.
    ExternalProcess,
    /// No devices or a failed prompt.
    InteractiveInput,
    /// Contract violations and local IO.
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Environment => write!(f, "environment"),
            Self::Configuration => write!(f, "configuration"),
            Self::ExternalProcess => write!(f, "external_process"),
            Self::InteractiveInput => write!(f, "interactive_input"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

impl NativeflowError {
    /// Creates a missing-field error.
    #[must_use]
    pub fn missing_field(stage: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            stage: stage.into(),
            field: field.into(),
        }
    }

    /// Creates a toolchain error.
    #[must_use]
    pub fn toolchain(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Toolchain {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Returns the taxonomy bucket of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PlatformMissing { .. } | Self::ProjectNotFound { .. } | Self::Toolchain { .. } => {
                ErrorKind::Environment
            }
            Self::ConfigDirNotDetected | Self::Metadata(_) | Self::InvalidReleaseVersion { .. } => {
                ErrorKind::Configuration
            }
            Self::Process(_) => ErrorKind::ExternalProcess,
            Self::NoDevices | Self::Prompt(_) => ErrorKind::InteractiveInput,
            Self::ContextConflict(_)
            | Self::MissingField { .. }
            | Self::Validation(_)
            | Self::Serialization(_)
            | Self::Io(_) => ErrorKind::Internal,
        }
    }

    /// Returns structured diagnostics for this error.
    #[must_use]
    pub fn info(&self) -> ErrorInfo {
        let summary = self.to_string();
        match self {
            Self::PlatformMissing { path } => ErrorInfo::new("ENV-001-PLATFORM_MISSING", summary)
                .with_fix_hint("You should run `weex create` or `weex platform add ios` first")
                .with_context_entry("path", path.display().to_string()),
            Self::ProjectNotFound { path } => ErrorInfo::new("ENV-002-PROJECT_NOT_FOUND", summary)
                .with_fix_hint(
                    "Please make sure you have installed iOS Develop Environment and CocoaPods",
                )
                .with_doc_url("http://alibaba.github.io/weex/doc/advanced/integrate-to-ios.html")
                .with_context_entry("path", path.display().to_string()),
            Self::Toolchain { tool, .. } => ErrorInfo::new("ENV-003-TOOLCHAIN", summary)
                .with_fix_hint(format!("Install '{tool}' manually and make sure it is on PATH"))
                .with_context_entry("tool", tool.clone()),
            Self::ConfigDirNotDetected => {
                ErrorInfo::new("CFG-001-EMPTY", summary).with_fix_hint(BUILD_FAILURE_HINT)
            }
            Self::Metadata(_) => {
                ErrorInfo::new("CFG-002-METADATA", summary).with_fix_hint(BUILD_FAILURE_HINT)
            }
            Self::InvalidReleaseVersion { version } => {
                ErrorInfo::new("CFG-003-RELEASE_VERSION", summary)
                    .with_fix_hint("Set `BuildVersion` in the ios config to a plain version such as `1.2.0`")
                    .with_context_entry("version", version.clone())
            }
            Self::Process(err) => ErrorInfo::new("PROC-001-FAILED", summary)
                .with_context_entry("command", err.command_line()),
            Self::NoDevices => ErrorInfo::new("INPUT-001-NO_DEVICES", summary),
            Self::Prompt(_) => ErrorInfo::new("INPUT-002-PROMPT", summary),
            Self::ContextConflict(err) => ErrorInfo::new("INT-001-CONFLICT", summary)
                .with_context_entry("field", err.field.clone()),
            Self::MissingField { stage, field } => ErrorInfo::new("INT-002-MISSING_FIELD", summary)
                .with_context_entry("stage", stage.clone())
                .with_context_entry("field", field.clone()),
            Self::Validation(err) => err
                .error_info
                .clone()
                .unwrap_or_else(|| ErrorInfo::new("INT-003-VALIDATION", summary)),
            Self::Serialization(_) => ErrorInfo::new("INT-004-SERIALIZATION", summary),
            Self::Io(_) => ErrorInfo::new("INT-005-IO", summary),
        }
    }
}

impl From<serde_json::Error> for NativeflowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Failure of an external command.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The command could not be started.
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        /// The rendered command line.
        command: String,
        /// The underlying io error.
        #[source]
        source: std::io::Error,
    },

    /// The command ran and exited unsuccessfully.
    #[error("Command `{command}` failed with {status}{}", stderr_suffix(.stderr))]
    Exit {
        /// The rendered command line.
        command: String,
        /// The exit status.
        status: ExitStatus,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

impl ProcessError {
    /// Returns the rendered command line.
    #[must_use]
    pub fn command_line(&self) -> String {
        match self {
            Self::Spawn { command, .. } | Self::Exit { command, .. } => command.clone(),
        }
    }

    /// Returns the exit code, if the process ran and exited with one.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Spawn { .. } => None,
            Self::Exit { status, .. } => status.code(),
        }
    }
}

/// Structured diagnostics attached to an error.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Error code (e.g., "ENV-001-PLATFORM_MISSING").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// URL to documentation.
    pub doc_url: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ErrorInfo {
    /// Creates a new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            doc_url: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Sets the documentation URL.
    #[must_use]
    pub fn with_doc_url(mut self, url: impl Into<String>) -> Self {
        self.doc_url = Some(url.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Error raised when a stage tries to set a context field twice.
#[derive(Debug, Clone, Error)]
#[error("Context conflict: field '{field}' is already set")]
pub struct ContextConflictError {
    /// The conflicting field.
    pub field: String,
}

impl ContextConflictError {
    /// Creates a new context conflict error.
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self { field: field.into() }
    }
}

/// Error raised when a pipeline definition is invalid.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The stages involved in the error.
    pub stages: Vec<String>,
    /// Optional structured info.
    pub error_info: Option<ErrorInfo>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stages: Vec::new(),
            error_info: None,
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<String>) -> Self {
        self.stages = stages;
        self
    }

    /// Sets the structured info.
    #[must_use]
    pub fn with_error_info(mut self, info: ErrorInfo) -> Self {
        self.error_info = Some(info);
        self
    }
}
