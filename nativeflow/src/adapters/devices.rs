//! Deployment target enumeration and interactive choice.

use super::process::{CommandRunner, CommandSpec};
use crate::context::Device;
use crate::errors::NativeflowError;
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tokio::task::spawn_blocking;
use tracing::debug;

/// Prompt shown above the device list.
pub const DEVICE_PROMPT: &str = "Choose one of the following devices";

/// Section label the device choices are grouped under.
pub const DEVICE_SECTION: &str = " = devices = ";

/// Enumerates deployment targets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceLister: Send + Sync {
    /// Lists the available devices.
    async fn list(&self) -> Result<Vec<Device>, NativeflowError>;
}

/// Picks one device out of a non-empty candidate list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceChooser: Send + Sync {
    /// Returns the index of the chosen device in `devices`.
    async fn choose(&self, devices: &[Device]) -> Result<usize, NativeflowError>;
}

/// [`DeviceLister`] backed by `xcrun xctrace list devices`.
pub struct XctraceDeviceLister {
    runner: Arc<dyn CommandRunner>,
    include_simulators: bool,
}

impl std::fmt::Debug for XctraceDeviceLister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XctraceDeviceLister")
            .field("include_simulators", &self.include_simulators)
            .finish_non_exhaustive()
    }
}

impl XctraceDeviceLister {
    /// Creates a lister that runs commands through `runner`.
    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>, include_simulators: bool) -> Self {
        Self {
            runner,
            include_simulators,
        }
    }
}

#[async_trait]
impl DeviceLister for XctraceDeviceLister {
    async fn list(&self) -> Result<Vec<Device>, NativeflowError> {
        let command = CommandSpec::new("xcrun").args(["xctrace", "list", "devices"]);
        let stdout = self.runner.run(&command).await?;
        let devices: Vec<Device> = parse_xctrace_devices(&stdout)
            .into_iter()
            .filter(|d| self.include_simulators || !d.is_simulator)
            .collect();
        debug!(count = devices.len(), "Listed devices");
        Ok(devices)
    }
}

fn device_line() -> &'static Regex {
    static LINE: OnceLock<Regex> = OnceLock::new();
    LINE.get_or_init(|| {
        // Literal pattern, checked by the parser tests.
        #[allow(clippy::unwrap_used)]
        let re = Regex::new(
            r"^(?P<name>.+?) \((?P<version>[0-9][0-9.]*)\) \((?P<id>[0-9A-Za-z-]+)\)$",
        )
        .unwrap();
        re
    })
}

/// Parses `xcrun xctrace list devices` output.
///
/// The first entry under the first `== Devices ==` header is the host Mac
/// and is skipped, whatever its format. Offline devices are skipped; entries
/// under `== Simulators ==` are flagged as simulators.
#[must_use]
pub fn parse_xctrace_devices(output: &str) -> Vec<Device> {
    #[derive(Clone, Copy, PartialEq)]
    enum Section {
        Devices,
        Offline,
        Simulators,
    }

    let mut section = Section::Devices;
    let mut seen_devices_header = false;
    let mut host_pending = false;
    let mut devices = Vec::new();

    for line in output.lines().map(str::trim) {
        if line.starts_with("==") {
            section = if line.contains("Offline") {
                Section::Offline
            } else if line.contains("Simulator") {
                Section::Simulators
            } else {
                host_pending = !seen_devices_header;
                seen_devices_header = true;
                Section::Devices
            };
            continue;
        }
        if line.is_empty() || section == Section::Offline {
            continue;
        }
        if host_pending {
            host_pending = false;
            debug!(host = line, "Skipping host machine");
            continue;
        }
        if let Some(caps) = device_line().captures(line) {
            devices.push(Device::new(
                &caps["name"],
                &caps["version"],
                &caps["id"],
                section == Section::Simulators,
            ));
        }
    }

    devices
}

/// [`DeviceChooser`] that shows a `cliclack` single-choice prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliclackChooser;

impl CliclackChooser {
    /// Creates a new chooser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DeviceChooser for CliclackChooser {
    async fn choose(&self, devices: &[Device]) -> Result<usize, NativeflowError> {
        let devices = devices.to_vec();
        spawn_blocking(move || {
            cliclack::log::step(DEVICE_SECTION)?;
            let mut select = cliclack::select(DEVICE_PROMPT);
            for (index, device) in devices.iter().enumerate() {
                let hint = if device.is_simulator { "simulator" } else { "" };
                select = select.item(index, device.label(), hint);
            }
            select.interact()
        })
        .await
        .map_err(|e| NativeflowError::Prompt(e.to_string()))?
        .map_err(|e| NativeflowError::Prompt(e.to_string()))
    }
}
