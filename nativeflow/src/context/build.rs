//! The accumulating record threaded through every stage.

use super::{BuildOptions, Device, NativeProject, PlatformConfig, RunIdentity};
use crate::errors::{ContextConflictError, NativeflowError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Context passed from stage to stage.
///
/// Fields are only ever added. Each `with_*` setter refuses to overwrite a
/// field that an earlier stage already set, so a stage can rely on what its
/// predecessors produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildContext {
    identity: RunIdentity,
    root_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<BuildOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    native_root: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    native_project: Option<NativeProject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    platform_config: Option<PlatformConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    devices: Option<Vec<Device>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    device: Option<Device>,
}

impl BuildContext {
    /// Creates a context rooted at `root_path`.
    #[must_use]
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self::with_identity(root_path, RunIdentity::new())
    }

    /// Creates a context with a specific run identity.
    #[must_use]
    pub fn with_identity(root_path: impl Into<PathBuf>, identity: RunIdentity) -> Self {
        Self {
            identity,
            root_path: root_path.into(),
            options: None,
            native_root: None,
            native_project: None,
            platform_config: None,
            devices: None,
            device: None,
        }
    }

    /// Returns the run identity.
    #[must_use]
    pub fn identity(&self) -> &RunIdentity {
        &self.identity
    }

    /// Returns the project root captured at pipeline start.
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Returns the caller options, if seeded.
    #[must_use]
    pub fn options(&self) -> Option<&BuildOptions> {
        self.options.as_ref()
    }

    /// Returns the native project directory, once located.
    #[must_use]
    pub fn native_root(&self) -> Option<&Path> {
        self.native_root.as_deref()
    }

    /// Returns the located native project.
    #[must_use]
    pub fn native_project(&self) -> Option<&NativeProject> {
        self.native_project.as_ref()
    }

    /// Returns the resolved platform config.
    #[must_use]
    pub fn platform_config(&self) -> Option<&PlatformConfig> {
        self.platform_config.as_ref()
    }

    /// Returns the enumerated deployment candidates.
    #[must_use]
    pub fn devices(&self) -> Option<&[Device]> {
        self.devices.as_deref()
    }

    /// Returns the chosen device.
    #[must_use]
    pub fn device(&self) -> Option<&Device> {
        self.device.as_ref()
    }

    /// Seeds the caller options.
    pub fn with_options(mut self, options: BuildOptions) -> Result<Self, ContextConflictError> {
        set_once(&mut self.options, options, "options")?;
        Ok(self)
    }

    /// Records the located native project and the directory it lives in.
    pub fn with_native_project(
        mut self,
        native_root: impl Into<PathBuf>,
        project: NativeProject,
    ) -> Result<Self, ContextConflictError> {
        if self.native_project.is_some() {
            return Err(ContextConflictError::new("native_project"));
        }
        set_once(&mut self.native_root, native_root.into(), "native_root")?;
        self.native_project = Some(project);
        Ok(self)
    }

    /// Records the resolved platform config.
    pub fn with_platform_config(
        mut self,
        config: PlatformConfig,
    ) -> Result<Self, ContextConflictError> {
        set_once(&mut self.platform_config, config, "platform_config")?;
        Ok(self)
    }

    /// Records the deployment candidates.
    pub fn with_devices(mut self, devices: Vec<Device>) -> Result<Self, ContextConflictError> {
        set_once(&mut self.devices, devices, "devices")?;
        Ok(self)
    }

    /// Records the chosen device.
    pub fn with_device(mut self, device: Device) -> Result<Self, ContextConflictError> {
        set_once(&mut self.device, device, "device")?;
        Ok(self)
    }

    /// Returns the native root or a missing-field error naming `stage`.
    pub fn require_native_root(&self, stage: &str) -> Result<&Path, NativeflowError> {
        self.native_root()
            .ok_or_else(|| NativeflowError::missing_field(stage, "native_root"))
    }

    /// Returns the native project or a missing-field error naming `stage`.
    pub fn require_native_project(&self, stage: &str) -> Result<&NativeProject, NativeflowError> {
        self.native_project()
            .ok_or_else(|| NativeflowError::missing_field(stage, "native_project"))
    }

    /// Returns the platform config or a missing-field error naming `stage`.
    pub fn require_platform_config(
        &self,
        stage: &str,
    ) -> Result<&PlatformConfig, NativeflowError> {
        self.platform_config()
            .ok_or_else(|| NativeflowError::missing_field(stage, "platform_config"))
    }

    /// Names of the fields that are currently set.
    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = vec!["root_path"];
        if self.options.is_some() {
            fields.push("options");
        }
        if self.native_root.is_some() {
            fields.push("native_root");
        }
        if self.native_project.is_some() {
            fields.push("native_project");
        }
        if self.platform_config.is_some() {
            fields.push("platform_config");
        }
        if self.devices.is_some() {
            fields.push("devices");
        }
        if self.device.is_some() {
            fields.push("device");
        }
        fields
    }

    /// Returns true if every field set on `earlier` is present and unchanged here.
    #[must_use]
    pub fn extends(&self, earlier: &Self) -> bool {
        fn kept<T: PartialEq>(before: &Option<T>, after: &Option<T>) -> bool {
            before.is_none() || before == after
        }

        self.identity == earlier.identity
            && self.root_path == earlier.root_path
            && kept(&earlier.options, &self.options)
            && kept(&earlier.native_root, &self.native_root)
            && kept(&earlier.native_project, &self.native_project)
            && kept(&earlier.platform_config, &self.platform_config)
            && kept(&earlier.devices, &self.devices)
            && kept(&earlier.device, &self.device)
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, field: &str) -> Result<(), ContextConflictError> {
    if slot.is_some() {
        return Err(ContextConflictError::new(field));
    }
    *slot = Some(value);
    Ok(())
}
