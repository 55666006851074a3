//! Command line argument model.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Build and deploy orchestration for native iOS app bundles
#[derive(Parser, Debug)]
#[command(
    name = "nativeflow",
    about = "Build pipeline orchestrator for native iOS app bundles",
    version,
    long_about = "nativeflow compiles the script bundle, stages it into the iOS project, \
                  updates native dependencies and runs xcodebuild, stopping at the first \
                  failing step with a remediation hint."
)]
pub struct CliArgs {
    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level name, overriding `-v` and `-q`.
    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    /// Debug logging.
    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    /// Errors only.
    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,

    /// `human` or `json`.
    #[arg(
        long,
        global = true,
        value_name = "FORMAT",
        default_value = "human",
        help = "Log line format: human or json"
    )]
    pub log_format: String,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the app.
    #[command(
        about = "Build the iOS app",
        long_about = "Runs the iOS build pipeline in the project root.\n\n\
                      Examples:\n  \
                      nativeflow build\n  \
                      nativeflow build --release\n  \
                      nativeflow build --root ../app --config configs"
    )]
    Build(BuildArgs),

    /// Pick a deployment device.
    #[command(
        about = "Choose a deployment device",
        long_about = "Locates the iOS project, lists connected devices and prompts for one.\n\n\
                      Examples:\n  \
                      nativeflow devices\n  \
                      nativeflow devices --no-simulators --json"
    )]
    Devices(DevicesArgs),
}

/// Arguments of `build`.
#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    /// Project root.
    #[arg(
        long,
        value_name = "PATH",
        help = "Project root (defaults to current directory)"
    )]
    pub root: Option<PathBuf>,

    /// Stage release artifacts after the build.
    #[arg(long, help = "Copy build products into the versioned release directory")]
    pub release: bool,

    /// Config directory override.
    #[arg(
        long,
        value_name = "DIR",
        help = "Directory with ios config files, relative to the root"
    )]
    pub config: Option<String>,

    /// Build configuration override.
    #[arg(long, value_name = "NAME", help = "Xcode build configuration")]
    pub configuration: Option<String>,
}

/// Arguments of `devices`.
#[derive(Parser, Debug, Clone)]
pub struct DevicesArgs {
    /// Project root.
    #[arg(
        long,
        value_name = "PATH",
        help = "Project root (defaults to current directory)"
    )]
    pub root: Option<PathBuf>,

    /// List physical devices only.
    #[arg(long, help = "Leave simulators out of the list")]
    pub no_simulators: bool,

    /// JSON output.
    #[arg(long, help = "Print the chosen device as JSON")]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        let args = CliArgs::parse_from(["nativeflow", "build", "--release", "--config", "configs"]);
        match args.command {
            Commands::Build(build) => {
                assert!(build.release);
                assert_eq!(build.config.as_deref(), Some("configs"));
                assert!(build.root.is_none());
            }
            Commands::Devices(_) => panic!("expected build"),
        }
        assert_eq!(args.log_format, "human");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = CliArgs::parse_from(["nativeflow", "devices", "-v", "--json"]);
        assert!(args.verbose);
        assert!(matches!(args.command, Commands::Devices(DevicesArgs { json: true, .. })));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(CliArgs::try_parse_from(["nativeflow", "build", "-v", "-q"]).is_err());
    }
}
