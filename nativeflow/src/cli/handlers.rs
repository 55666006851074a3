//! Subcommand handlers. Each returns the process exit code.

use super::commands::{BuildArgs, DevicesArgs};
use super::output;
use crate::adapters::XctraceDeviceLister;
use crate::config::PipelineSettings;
use crate::context::{BuildContext, BuildOptions};
use crate::events::{EventSink, LoggingEventSink};
use crate::pipeline::{ios_build_pipeline, ios_run_pipeline, IosCollaborators, PipelineOutcome};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error};

/// Runs the build pipeline.
pub async fn handle_build(args: BuildArgs) -> i32 {
    match run_build(args).await {
        Ok(outcome) => exit_code(&outcome),
        Err(e) => {
            error!("Build failed: {e:#}");
            1
        }
    }
}

/// Runs the device selection pipeline.
pub async fn handle_devices(args: DevicesArgs) -> i32 {
    match run_devices(&args).await {
        Ok(code) => code,
        Err(e) => {
            error!("Device selection failed: {e:#}");
            1
        }
    }
}

async fn run_build(args: BuildArgs) -> Result<PipelineOutcome> {
    let root = resolve_root(args.root.as_deref())?;
    let mut settings = PipelineSettings::load(&root)
        .with_context(|| format!("Failed to load settings for {}", root.display()))?;
    if let Some(dir) = args.config {
        settings = settings.with_config_dir(dir);
    }
    if let Some(configuration) = args.configuration {
        settings = settings.with_build_configuration(configuration);
    }
    debug!(root = %root.display(), ?settings, "Resolved build settings");

    let events: Arc<dyn EventSink> = Arc::new(LoggingEventSink::debug());
    let collaborators = IosCollaborators::system(&settings, Arc::clone(&events));
    let options = BuildOptions::new().with_value("release", serde_json::json!(args.release));
    let pipeline = ios_build_pipeline(&collaborators, &settings, options, events)?;

    cliclack::intro(format!("nativeflow {}", pipeline.name()))?;
    let outcome = pipeline.run(BuildContext::new(root)).await;
    output::print_outcome(&outcome)?;
    Ok(outcome)
}

async fn run_devices(args: &DevicesArgs) -> Result<i32> {
    let root = resolve_root(args.root.as_deref())?;
    let settings = PipelineSettings::load(&root)
        .with_context(|| format!("Failed to load settings for {}", root.display()))?;

    let events: Arc<dyn EventSink> = Arc::new(LoggingEventSink::debug());
    let mut collaborators = IosCollaborators::system(&settings, Arc::clone(&events));
    if args.no_simulators {
        collaborators.lister = Arc::new(XctraceDeviceLister::new(
            Arc::clone(&collaborators.runner),
            false,
        ));
    }
    let pipeline = ios_run_pipeline(&collaborators, &settings, BuildOptions::new(), events)?;

    let outcome = pipeline.run(BuildContext::new(root)).await;
    let Some(device) = outcome.context().and_then(BuildContext::device) else {
        output::print_outcome(&outcome)?;
        return Ok(exit_code(&outcome));
    };

    let rendered = output::format_device(device, args.json)?;
    if args.json {
        println!("{rendered}");
    } else {
        cliclack::log::success(format!("Deploying to {rendered}"))?;
    }
    Ok(0)
}

fn resolve_root(root: Option<&Path>) -> Result<PathBuf> {
    let root = match root {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    root.canonicalize()
        .with_context(|| format!("Project root {} does not exist", root.display()))
}

fn exit_code(outcome: &PipelineOutcome) -> i32 {
    i32::from(!outcome.is_success())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_root_canonicalizes() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("app");
        std::fs::create_dir(&nested).unwrap();

        let resolved = resolve_root(Some(&nested.join("..").join("app"))).unwrap();
        assert_eq!(resolved, nested.canonicalize().unwrap());
    }

    #[test]
    fn test_resolve_root_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_root(Some(&dir.path().join("nope"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
