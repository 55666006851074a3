//! Terminal rendering of pipeline outcomes.

use crate::context::Device;
use crate::pipeline::PipelineOutcome;
use std::io;

/// One line per executed stage, with its duration.
#[must_use]
pub fn stage_summary(outcome: &PipelineOutcome) -> String {
    outcome
        .stages
        .iter()
        .map(|s| {
            let mark = if s.succeeded { "ok" } else { "failed" };
            format!("{:<28} {:>6} {:>9.1} ms", s.name, mark, s.duration_ms())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prints the outcome of a pipeline run.
pub fn print_outcome(outcome: &PipelineOutcome) -> io::Result<()> {
    cliclack::log::step(stage_summary(outcome))?;
    match outcome.failure() {
        None => cliclack::outro(format!(
            "{} finished in {:.1}s",
            outcome.pipeline,
            outcome.duration.as_secs_f64()
        )),
        Some(failure) => {
            let diagnostic = &failure.diagnostic;
            cliclack::log::error(format!("[{}] {}", diagnostic.code, diagnostic.message))?;
            if let Some(hint) = &diagnostic.hint {
                cliclack::log::warning(hint)?;
            }
            cliclack::outro_cancel(format!("{} stopped at {}", outcome.pipeline, failure.stage))
        }
    }
}

/// Renders a chosen device.
pub fn format_device(device: &Device, json: bool) -> Result<String, serde_json::Error> {
    if json {
        serde_json::to_string_pretty(device)
    } else {
        Ok(format!("{} ({})", device.label(), device.id))
    }
}
