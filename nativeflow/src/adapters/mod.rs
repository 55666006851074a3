//! Collaborators the stages drive.
//!
//! Each file pairs a small trait, the seam stages depend on and tests mock,
//! with the implementation the CLI wires in.

pub mod copy;
pub mod devices;
pub mod platform_config;
pub mod process;
pub mod toolchain;
pub mod xcode;

pub use copy::{CopyFailure, CopyFilter, CopyReport, FileStager, WalkdirStager};
pub use devices::{
    parse_xctrace_devices, CliclackChooser, DeviceChooser, DeviceLister, XctraceDeviceLister,
    DEVICE_PROMPT, DEVICE_SECTION,
};
pub use platform_config::{
    ConfigResolver, IosConfigResolver, PlatformConfigLoader, DEFAULT_BUILD_VERSION,
};
pub use process::{CommandRunner, CommandSpec, TokioCommandRunner};
pub use toolchain::{BundleCompiler, CommandBundleCompiler, DeployHelperInstaller, ToolchainInstaller};
pub use xcode::{
    MetadataReader, ProjectLocator, ProjectMetadata, XcodeProjectLocator, XcodebuildMetadataReader,
};
