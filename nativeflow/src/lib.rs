//! # Nativeflow
//!
//! Build pipeline orchestration for native iOS app bundles.
//!
//! A build is a fixed sequence of stages that each receive the context the
//! previous stage produced:
//!
//! - **Sequential stages**: the first failure stops the run and is reported once
//! - **Monotonic context**: stages add facts and never overwrite them
//! - **Mockable collaborators**: every external tool sits behind a trait
//! - **Event-driven observability**: pipeline and stage events for logging and tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nativeflow::prelude::*;
//!
//! let settings = PipelineSettings::load(&root)?;
//! let events: Arc<dyn EventSink> = Arc::new(LoggingEventSink::debug());
//! let collaborators = IosCollaborators::system(&settings, events.clone());
//! let pipeline = ios_build_pipeline(&collaborators, &settings, BuildOptions::new(), events)?;
//!
//! let outcome = pipeline.run(BuildContext::new(root)).await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod adapters;
pub mod cli;
pub mod config;
pub mod context;
pub mod errors;
pub mod events;
pub mod observability;
pub mod pipeline;
pub mod stages;
pub mod testing;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::PipelineSettings;
    pub use crate::context::{
        BuildContext, BuildOptions, Device, NativeProject, Platform, PlatformConfig, RunIdentity,
    };
    pub use crate::errors::{ErrorKind, NativeflowError, PipelineValidationError, ProcessError};
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::pipeline::{
        ios_build_pipeline, ios_run_pipeline, IosCollaborators, Pipeline, PipelineBuilder,
        PipelineOutcome,
    };
    pub use crate::stages::Stage;
    pub use std::sync::Arc;
}
