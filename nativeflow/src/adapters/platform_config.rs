//! Platform configuration loading and resolution.
//!
//! Config values live in JSON files in the project's config directory, one
//! or more per platform (`ios.config.json`, `config.ios.json`, ...). The
//! loader merges every file whose name mentions the platform tag; a resolver
//! then normalises the merged map for that platform.

use crate::context::{Platform, PlatformConfig};
use crate::errors::NativeflowError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default build version when neither `BuildVersion` nor `Version` is set.
pub const DEFAULT_BUILD_VERSION: &str = "1.0.0";

/// Platform-specific normalisation of a loaded config.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigResolver: Send + Sync {
    /// Normalises `config` in place.
    fn resolve(&self, config: &mut PlatformConfig);
}

/// Resolver for iOS configs.
///
/// Leaves an empty config untouched. Otherwise trims string values and
/// derives `BuildVersion` from `Version` when it is missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct IosConfigResolver;

impl IosConfigResolver {
    /// Creates a new resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ConfigResolver for IosConfigResolver {
    fn resolve(&self, config: &mut PlatformConfig) {
        if config.is_empty() {
            return;
        }

        for (_, value) in config.values_mut() {
            if let serde_json::Value::String(s) = value {
                let trimmed = s.trim();
                if trimmed.len() != s.len() {
                    *s = trimmed.to_string();
                }
            }
        }

        if !config.contains_key("BuildVersion") {
            let version = config
                .get_str("Version")
                .unwrap_or(DEFAULT_BUILD_VERSION)
                .to_string();
            config.insert("BuildVersion", serde_json::Value::String(version));
        }
    }
}

/// Loads the raw platform config for one project root.
pub struct PlatformConfigLoader {
    resolver: Arc<dyn ConfigResolver>,
    root: PathBuf,
    platform: Platform,
    extra_flags: BTreeMap<String, serde_json::Value>,
    config_dir: PathBuf,
}

impl std::fmt::Debug for PlatformConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformConfigLoader")
            .field("root", &self.root)
            .field("platform", &self.platform)
            .field("extra_flags", &self.extra_flags)
            .field("config_dir", &self.config_dir)
            .finish_non_exhaustive()
    }
}

impl PlatformConfigLoader {
    /// Creates a loader for `platform` configs under `root`.
    ///
    /// `extra_flags` are added to a non-empty config for keys it does not set.
    #[must_use]
    pub fn new(
        resolver: Arc<dyn ConfigResolver>,
        root: impl Into<PathBuf>,
        platform: Platform,
        extra_flags: BTreeMap<String, serde_json::Value>,
    ) -> Self {
        let root = root.into();
        Self {
            resolver,
            config_dir: root.clone(),
            root,
            platform,
            extra_flags,
        }
    }

    /// Sets the config directory, relative to the root.
    #[must_use]
    pub fn with_config_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config_dir = self.root.join(dir);
        self
    }

    /// Returns the resolver for this platform.
    #[must_use]
    pub fn resolver(&self) -> &dyn ConfigResolver {
        self.resolver.as_ref()
    }

    /// Returns the directory that is scanned.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Loads and merges every config file for the platform.
    ///
    /// A missing directory or no matching files yields an empty config.
    pub async fn get_config(&self) -> Result<PlatformConfig, NativeflowError> {
        let files = self.config_files().await?;
        let mut config = PlatformConfig::new();

        for file in &files {
            debug!(file = %file.display(), "Reading platform config");
            let raw = tokio::fs::read_to_string(file).await?;
            let values: BTreeMap<String, serde_json::Value> = serde_json::from_str(&raw)
                .map_err(|e| {
                    NativeflowError::Serialization(format!("{}: {e}", file.display()))
                })?;
            config.extend(values);
        }

        if !config.is_empty() {
            for (key, value) in &self.extra_flags {
                if !config.contains_key(key) {
                    config.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(config)
    }

    async fn config_files(&self) -> Result<Vec<PathBuf>, NativeflowError> {
        let mut entries = match tokio::fs::read_dir(&self.config_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(dir = %self.config_dir.display(), "Config directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let tag = self.platform.tag();
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let lower = name.to_ascii_lowercase();
            if lower.ends_with(".json") && lower.contains(tag) && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}
