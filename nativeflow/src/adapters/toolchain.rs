//! Deployment helper installation and script bundle compilation.

use super::process::{CommandRunner, CommandSpec};
use crate::errors::NativeflowError;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Makes sure a required external helper is installed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToolchainInstaller: Send + Sync {
    /// Resolves once the helper is available.
    async fn ensure(&self) -> Result<(), NativeflowError>;
}

/// Produces the application script bundle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BundleCompiler: Send + Sync {
    /// Compiles the bundle of the project at `root`.
    async fn compile(&self, root: &Path) -> Result<(), NativeflowError>;
}

type Lookup = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Installs the deployment helper (`ios-deploy` by default) when it is not
/// on `PATH`.
pub struct DeployHelperInstaller {
    helper: String,
    install: Vec<String>,
    runner: Arc<dyn CommandRunner>,
    lookup: Lookup,
}

impl std::fmt::Debug for DeployHelperInstaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployHelperInstaller")
            .field("helper", &self.helper)
            .field("install", &self.install)
            .finish_non_exhaustive()
    }
}

impl DeployHelperInstaller {
    /// Creates an installer for `helper`, installed with the `install` argv.
    #[must_use]
    pub fn new(helper: impl Into<String>, install: Vec<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            helper: helper.into(),
            install,
            runner,
            lookup: Arc::new(|name| which::which(name).is_ok()),
        }
    }

    /// Replaces the `PATH` lookup.
    #[must_use]
    pub fn with_lookup(mut self, lookup: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.lookup = Arc::new(lookup);
        self
    }
}

#[async_trait]
impl ToolchainInstaller for DeployHelperInstaller {
    async fn ensure(&self) -> Result<(), NativeflowError> {
        if (self.lookup)(&self.helper) {
            debug!(helper = %self.helper, "Deployment helper already installed");
            return Ok(());
        }

        let Some(command) = CommandSpec::from_argv(&self.install) else {
            return Err(NativeflowError::toolchain(
                &self.helper,
                "not installed and no install command is configured",
            ));
        };

        info!(helper = %self.helper, command = %command, "Installing deployment helper");
        self.runner
            .run(&command)
            .await
            .map_err(|e| NativeflowError::toolchain(&self.helper, e.to_string()))?;

        if (self.lookup)(&self.helper) {
            Ok(())
        } else {
            Err(NativeflowError::toolchain(
                &self.helper,
                "still not on PATH after installation",
            ))
        }
    }
}

/// Compiles the script bundle by running a project command (`npm run build`
/// by default) in the project root.
pub struct CommandBundleCompiler {
    command: Vec<String>,
    runner: Arc<dyn CommandRunner>,
}

impl std::fmt::Debug for CommandBundleCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandBundleCompiler")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

impl CommandBundleCompiler {
    /// Creates a compiler running the `command` argv.
    #[must_use]
    pub fn new(command: Vec<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { command, runner }
    }
}

#[async_trait]
impl BundleCompiler for CommandBundleCompiler {
    async fn compile(&self, root: &Path) -> Result<(), NativeflowError> {
        let Some(command) = CommandSpec::from_argv(&self.command) else {
            warn!("No bundle command configured, skipping compilation");
            return Ok(());
        };
        self.runner.run(&command.current_dir(root)).await?;
        Ok(())
    }
}
