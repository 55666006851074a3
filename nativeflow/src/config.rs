//! Pipeline settings: every path, command and constant the stages use.
//!
//! Settings come from `<root>/nativeflow.toml` when present, then from
//! `NATIVEFLOW_*` environment variables. Anything unspecified falls back to
//! the defaults below.

use crate::errors::NativeflowError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Name of the optional settings file in the project root.
pub const SETTINGS_FILE: &str = "nativeflow.toml";

/// Settings for the build and run pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Directory holding the compiled script bundle, relative to the root.
    #[serde(default = "default_dist_dir")]
    pub dist_dir: String,
    /// Where bundle files are staged inside the native project tree.
    #[serde(default = "default_bundle_dest_dir")]
    pub bundle_dest_dir: String,
    /// File name patterns copied from the dist directory.
    #[serde(default = "default_bundle_include")]
    pub bundle_include: Vec<String>,
    /// File name patterns skipped even when included.
    #[serde(default = "default_bundle_exclude")]
    pub bundle_exclude: Vec<String>,
    /// Platform subtree, relative to the root.
    #[serde(default = "default_platform_dir")]
    pub platform_dir: String,
    /// Directory scanned for platform config files, relative to the root.
    #[serde(default = "default_config_dir")]
    pub config_dir: String,
    /// Command that compiles the script bundle.
    #[serde(default = "default_bundle_command")]
    pub bundle_command: Vec<String>,
    /// Command that updates native dependencies.
    #[serde(default = "default_dependency_command")]
    pub dependency_command: Vec<String>,
    /// Deployment helper that must be on `PATH`.
    #[serde(default = "default_deploy_helper")]
    pub deploy_helper: String,
    /// Command that installs the deployment helper.
    #[serde(default = "default_deploy_helper_install")]
    pub deploy_helper_install: Vec<String>,
    /// Xcode build configuration name.
    #[serde(default = "default_build_configuration")]
    pub build_configuration: String,
    /// Target SDK.
    #[serde(default = "default_sdk")]
    pub sdk: String,
    /// Derived data directory, relative to the native root.
    #[serde(default = "default_derived_data_dir")]
    pub derived_data_dir: String,
    /// Build products directory, relative to the native root.
    #[serde(default = "default_products_dir")]
    pub products_dir: String,
    /// Release directory, relative to the root.
    #[serde(default = "default_release_dir")]
    pub release_dir: String,
    /// File name patterns staged as release artifacts.
    #[serde(default = "default_release_include")]
    pub release_include: Vec<String>,
    /// Platform config key naming the release version directory.
    #[serde(default = "default_release_version_key")]
    pub release_version_key: String,
    /// Maximum number of files copied at once.
    #[serde(default = "default_copy_concurrency")]
    pub copy_concurrency: usize,
}

fn default_dist_dir() -> String {
    "dist".to_string()
}

fn default_bundle_dest_dir() -> String {
    "platforms/ios/bundlejs".to_string()
}

fn default_bundle_include() -> Vec<String> {
    vec!["*.js".to_string()]
}

fn default_bundle_exclude() -> Vec<String> {
    vec!["*.web.js".to_string()]
}

fn default_platform_dir() -> String {
    "platforms/ios".to_string()
}

fn default_config_dir() -> String {
    ".".to_string()
}

fn default_bundle_command() -> Vec<String> {
    vec!["npm".to_string(), "run".to_string(), "build".to_string()]
}

fn default_dependency_command() -> Vec<String> {
    vec!["pod".to_string(), "update".to_string()]
}

fn default_deploy_helper() -> String {
    "ios-deploy".to_string()
}

fn default_deploy_helper_install() -> Vec<String> {
    vec![
        "npm".to_string(),
        "install".to_string(),
        "-g".to_string(),
        "ios-deploy".to_string(),
    ]
}

fn default_build_configuration() -> String {
    "PROD".to_string()
}

fn default_sdk() -> String {
    "iphoneos".to_string()
}

fn default_derived_data_dir() -> String {
    "build".to_string()
}

fn default_products_dir() -> String {
    "build/Build/Products/Release-iphoneos".to_string()
}

fn default_release_dir() -> String {
    "release/ios".to_string()
}

fn default_release_include() -> Vec<String> {
    vec!["*.ipa".to_string(), "*.app".to_string()]
}

fn default_release_version_key() -> String {
    "BuildVersion".to_string()
}

fn default_copy_concurrency() -> usize {
    8
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            dist_dir: default_dist_dir(),
            bundle_dest_dir: default_bundle_dest_dir(),
            bundle_include: default_bundle_include(),
            bundle_exclude: default_bundle_exclude(),
            platform_dir: default_platform_dir(),
            config_dir: default_config_dir(),
            bundle_command: default_bundle_command(),
            dependency_command: default_dependency_command(),
            deploy_helper: default_deploy_helper(),
            deploy_helper_install: default_deploy_helper_install(),
            build_configuration: default_build_configuration(),
            sdk: default_sdk(),
            derived_data_dir: default_derived_data_dir(),
            products_dir: default_products_dir(),
            release_dir: default_release_dir(),
            release_include: default_release_include(),
            release_version_key: default_release_version_key(),
            copy_concurrency: default_copy_concurrency(),
        }
    }
}

impl PipelineSettings {
    /// Creates settings with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings for the project at `root`.
    ///
    /// Reads `root/nativeflow.toml` if it exists, then applies environment
    /// overrides.
    pub fn load(root: &Path) -> Result<Self, NativeflowError> {
        let path = root.join(SETTINGS_FILE);
        let settings = if path.is_file() {
            debug!(path = %path.display(), "Loading pipeline settings");
            Self::from_toml_file(&path)?
        } else {
            Self::default()
        };
        Ok(settings.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Parses a TOML settings file.
    pub fn from_toml_file(path: &Path) -> Result<Self, NativeflowError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Parses TOML settings text.
    pub fn from_toml_str(raw: &str) -> Result<Self, NativeflowError> {
        toml::from_str(raw).map_err(|e| NativeflowError::Serialization(e.to_string()))
    }

    /// Applies `NATIVEFLOW_*` overrides using `lookup` to read variables.
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup("NATIVEFLOW_BUILD_CONFIGURATION") {
            self.build_configuration = value;
        }
        if let Some(value) = lookup("NATIVEFLOW_SDK") {
            self.sdk = value;
        }
        if let Some(value) = lookup("NATIVEFLOW_PLATFORM_DIR") {
            self.platform_dir = value;
        }
        if let Some(value) = lookup("NATIVEFLOW_CONFIG_DIR") {
            self.config_dir = value;
        }
        self
    }

    /// Sets the platform config directory.
    #[must_use]
    pub fn with_config_dir(mut self, dir: impl Into<String>) -> Self {
        self.config_dir = dir.into();
        self
    }

    /// Sets the build configuration name.
    #[must_use]
    pub fn with_build_configuration(mut self, name: impl Into<String>) -> Self {
        self.build_configuration = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = PipelineSettings::new();
        assert_eq!(settings.platform_dir, "platforms/ios");
        assert_eq!(settings.build_configuration, "PROD");
        assert_eq!(settings.sdk, "iphoneos");
        assert_eq!(settings.derived_data_dir, "build");
        assert_eq!(settings.bundle_include, vec!["*.js".to_string()]);
        assert_eq!(settings.bundle_exclude, vec!["*.web.js".to_string()]);
        assert_eq!(settings.dependency_command, vec!["pod", "update"]);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = PipelineSettings::from_toml_str(
            r#"
            build_configuration = "Release"
            release_include = ["*.ipa"]
            "#,
        )
        .unwrap();

        assert_eq!(settings.build_configuration, "Release");
        assert_eq!(settings.release_include, vec!["*.ipa".to_string()]);
        assert_eq!(settings.sdk, "iphoneos");
    }

    #[test]
    fn test_invalid_toml() {
        let err = PipelineSettings::from_toml_str("build_configuration = [").unwrap_err();
        assert!(matches!(err, NativeflowError::Serialization(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("NATIVEFLOW_SDK", "iphonesimulator"),
            ("NATIVEFLOW_BUILD_CONFIGURATION", "Debug"),
        ]
        .into_iter()
        .collect();

        let settings = PipelineSettings::new()
            .with_env_overrides(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(settings.sdk, "iphonesimulator");
        assert_eq!(settings.build_configuration, "Debug");
        assert_eq!(settings.platform_dir, "platforms/ios");
    }

    #[test]
    fn test_load_from_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "copy_concurrency = 2\n").unwrap();

        let settings = PipelineSettings::load(dir.path()).unwrap();
        assert_eq!(settings.copy_concurrency, 2);
    }

    #[test]
    fn test_load_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = PipelineSettings::load(dir.path()).unwrap();
        assert_eq!(settings.dist_dir, "dist");
    }
}
