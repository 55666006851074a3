//! Values carried by the build context.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Target platform of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Apple iOS.
    #[default]
    Ios,
}

impl Platform {
    /// Returns the tag used in config file names and directories.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Ios => "ios",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Caller-supplied options. Opaque to the pipeline except for a few flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildOptions {
    values: BTreeMap<String, serde_json::Value>,
}

impl BuildOptions {
    /// Creates an empty options bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Gets a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Returns a boolean flag, `false` when absent or not a bool.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.values
            .get(key)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }

    /// Returns true if release staging was requested.
    #[must_use]
    pub fn release(&self) -> bool {
        self.flag("release")
    }

    /// Returns true if no options were given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A located Xcode project or workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeProject {
    /// File name, e.g. `App.xcworkspace`.
    pub name: String,
    /// Whether this is a workspace rather than a plain project.
    pub is_workspace: bool,
    /// Full path to the descriptor.
    pub path: PathBuf,
}

impl NativeProject {
    /// Creates a project handle.
    #[must_use]
    pub fn new(name: impl Into<String>, is_workspace: bool, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            is_workspace,
            path: path.into(),
        }
    }

    /// Returns the `xcodebuild` selector flag for this descriptor.
    #[must_use]
    pub fn xcodebuild_flag(&self) -> &'static str {
        if self.is_workspace {
            "-workspace"
        } else {
            "-project"
        }
    }
}

/// Resolved platform build settings (versions, signing references, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformConfig {
    values: BTreeMap<String, serde_json::Value>,
}

impl PlatformConfig {
    /// Creates an empty config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Gets a string value.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(serde_json::Value::as_str)
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.values.insert(key.into(), value);
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Merges another map on top of this one.
    pub fn extend(&mut self, other: BTreeMap<String, serde_json::Value>) {
        self.values.extend(other);
    }

    /// Mutable access to all values.
    pub fn values_mut(&mut self) -> impl Iterator<Item = (&String, &mut serde_json::Value)> {
        self.values.iter_mut()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing was resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A deployment target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Display name.
    pub name: String,
    /// OS version.
    pub version: String,
    /// Device or simulator identifier.
    pub id: String,
    /// Whether this is a simulator.
    pub is_simulator: bool,
}

impl Device {
    /// Creates a device.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        id: impl Into<String>,
        is_simulator: bool,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            id: id.into(),
            is_simulator,
        }
    }

    /// Label shown in the device prompt.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ios: {}", self.name, self.version)
    }
}
