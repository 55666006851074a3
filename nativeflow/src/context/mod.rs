//! Context management for pipeline execution.
//!
//! This module provides:
//! - The accumulating [`BuildContext`] threaded through every stage
//! - The values it carries (options, project handle, platform config, devices)
//! - Run identity used to correlate log lines

mod build;
mod identity;
mod models;

pub use build::BuildContext;
pub use identity::RunIdentity;
pub use models::{BuildOptions, Device, NativeProject, Platform, PlatformConfig};
