//! Xcode project discovery and metadata.

use super::process::{CommandRunner, CommandSpec};
use crate::context::NativeProject;
use crate::errors::NativeflowError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const WORKSPACE_EXT: &str = "xcworkspace";
const PROJECT_EXT: &str = "xcodeproj";

/// Finds a native project descriptor in a directory.
#[cfg_attr(test, mockall::automock)]
pub trait ProjectLocator: Send + Sync {
    /// Returns the descriptor found directly inside `dir`, if any.
    fn locate(&self, dir: &Path) -> Result<Option<NativeProject>, NativeflowError>;
}

/// Looks for `*.xcworkspace`, then `*.xcodeproj`, among the entries of a
/// directory. Names are compared in sorted order so the choice is stable.
#[derive(Debug, Clone, Copy, Default)]
pub struct XcodeProjectLocator;

impl XcodeProjectLocator {
    /// Creates a new locator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ProjectLocator for XcodeProjectLocator {
    fn locate(&self, dir: &Path) -> Result<Option<NativeProject>, NativeflowError> {
        let mut names: Vec<String> = std::fs::read_dir(dir)?
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();

        let pick = |ext: &str| {
            names
                .iter()
                .find(|name| Path::new(name).extension().is_some_and(|e| e == ext))
                .cloned()
        };

        let found = pick(WORKSPACE_EXT)
            .map(|name| (name, true))
            .or_else(|| pick(PROJECT_EXT).map(|name| (name, false)));

        Ok(found.map(|(name, is_workspace)| {
            let path = dir.join(&name);
            debug!(project = %name, is_workspace, "Located Xcode project");
            NativeProject::new(name, is_workspace, path)
        }))
    }
}

/// Build metadata of a native project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Project or workspace name.
    #[serde(default)]
    pub name: Option<String>,
    /// Available build schemes, in the order the toolchain lists them.
    #[serde(default)]
    pub schemes: Vec<String>,
    /// Build configurations.
    #[serde(default)]
    pub configurations: Vec<String>,
    /// Targets.
    #[serde(default)]
    pub targets: Vec<String>,
}

impl ProjectMetadata {
    /// Returns the scheme the build uses.
    #[must_use]
    pub fn first_scheme(&self) -> Option<&str> {
        self.schemes.first().map(String::as_str)
    }

    /// Parses the JSON printed by `xcodebuild -list -json`.
    pub fn from_list_json(raw: &str) -> Result<Self, NativeflowError> {
        #[derive(Deserialize)]
        struct ListOutput {
            project: Option<ProjectMetadata>,
            workspace: Option<ProjectMetadata>,
        }

        let output: ListOutput = serde_json::from_str(raw)
            .map_err(|e| NativeflowError::Metadata(format!("invalid xcodebuild -list output: {e}")))?;
        output
            .project
            .or(output.workspace)
            .ok_or_else(|| NativeflowError::Metadata("xcodebuild -list printed no project".to_string()))
    }
}

/// Reads native project metadata.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataReader: Send + Sync {
    /// Reads the metadata of `project`, located in `native_root`.
    async fn read(
        &self,
        native_root: &Path,
        project: &NativeProject,
    ) -> Result<ProjectMetadata, NativeflowError>;
}

/// [`MetadataReader`] that asks `xcodebuild -list -json`.
pub struct XcodebuildMetadataReader {
    runner: Arc<dyn CommandRunner>,
}

impl std::fmt::Debug for XcodebuildMetadataReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XcodebuildMetadataReader").finish_non_exhaustive()
    }
}

impl XcodebuildMetadataReader {
    /// Creates a reader that runs commands through `runner`.
    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl MetadataReader for XcodebuildMetadataReader {
    async fn read(
        &self,
        native_root: &Path,
        project: &NativeProject,
    ) -> Result<ProjectMetadata, NativeflowError> {
        let command = CommandSpec::new("xcodebuild")
            .args(["-list", "-json"])
            .arg(project.xcodebuild_flag())
            .arg(project.name.clone())
            .current_dir(native_root);
        let stdout = self.runner.run(&command).await?;
        ProjectMetadata::from_list_json(&stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::process::MockCommandRunner;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_locator_prefers_workspace() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("App.xcodeproj")).unwrap();
        std::fs::create_dir(dir.path().join("App.xcworkspace")).unwrap();
        std::fs::write(dir.path().join("Podfile"), "").unwrap();

        let project = XcodeProjectLocator::new().locate(dir.path()).unwrap().unwrap();
        assert_eq!(project.name, "App.xcworkspace");
        assert!(project.is_workspace);
        assert_eq!(project.path, dir.path().join("App.xcworkspace"));
    }

    #[test]
    fn test_locator_falls_back_to_project() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("WeexDemo.xcodeproj")).unwrap();

        let project = XcodeProjectLocator::new().locate(dir.path()).unwrap().unwrap();
        assert_eq!(project.name, "WeexDemo.xcodeproj");
        assert!(!project.is_workspace);
    }

    #[test]
    fn test_locator_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Podfile"), "").unwrap();
        assert!(XcodeProjectLocator::new().locate(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_locator_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(XcodeProjectLocator::new()
            .locate(&dir.path().join("missing"))
            .is_err());
    }

    #[test]
    fn test_parse_project_list() {
        let raw = r#"{"project":{"name":"WeexDemo","schemes":["WeexDemo","WeexDemoTests"],"configurations":["Debug","PROD"],"targets":["WeexDemo"]}}"#;
        let metadata = ProjectMetadata::from_list_json(raw).unwrap();
        assert_eq!(metadata.first_scheme(), Some("WeexDemo"));
        assert_eq!(metadata.configurations, vec!["Debug", "PROD"]);
    }

    #[test]
    fn test_parse_workspace_list() {
        let raw = r#"{"workspace":{"name":"App","schemes":["App"]}}"#;
        let metadata = ProjectMetadata::from_list_json(raw).unwrap();
        assert_eq!(metadata.name.as_deref(), Some("App"));
        assert_eq!(metadata.first_scheme(), Some("App"));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            ProjectMetadata::from_list_json("not json"),
            Err(NativeflowError::Metadata(_))
        ));
        assert!(matches!(
            ProjectMetadata::from_list_json("{}"),
            Err(NativeflowError::Metadata(_))
        ));
    }

    #[tokio::test]
    async fn test_reader_runs_xcodebuild_list() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd| {
                cmd.program == "xcodebuild"
                    && cmd.args == ["-list", "-json", "-workspace", "App.xcworkspace"]
                    && cmd.cwd.as_deref() == Some(Path::new("/app/platforms/ios"))
            })
            .times(1)
            .returning(|_| Ok(r#"{"workspace":{"schemes":["App"]}}"#.to_string()));

        let reader = XcodebuildMetadataReader::new(Arc::new(runner));
        let project = NativeProject::new("App.xcworkspace", true, "/app/platforms/ios/App.xcworkspace");
        let metadata = reader
            .read(Path::new("/app/platforms/ios"), &project)
            .await
            .unwrap();

        assert_eq!(metadata.schemes, vec!["App"]);
    }
}
