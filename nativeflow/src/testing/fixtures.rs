//! Context and device fixtures.

use std::path::Path;

use crate::context::{BuildContext, BuildOptions, Device, NativeProject, PlatformConfig};

/// Output of `xcodebuild -list -json` for a workspace with one app scheme.
pub const XCODEBUILD_LIST_JSON: &str =
    r#"{"workspace":{"name":"App","schemes":["App","AppTests"]}}"#;

/// Output of `xcrun xctrace list devices` with the host and two connected
/// devices.
pub const XCTRACE_TWO_DEVICES: &str = "== Devices ==
Build Mac (14.2.1) (0000FE00-1111-2222-3333-444455556666)
Ann's iPhone (17.2) (00008110-001A2B3C4D5E6F70)
iPad Air (16.4) (00008103-000A1B2C3D4E5F60)
";

/// Two physical devices.
#[must_use]
pub fn sample_devices() -> Vec<Device> {
    vec![
        Device::new("Ann's iPhone", "17.2", "00008110-001A2B3C4D5E6F70", false),
        Device::new("iPad Air", "16.4", "00008103-000A1B2C3D4E5F60", false),
    ]
}

/// A non-empty platform config with a build version.
#[must_use]
pub fn sample_config() -> PlatformConfig {
    let mut config = PlatformConfig::new();
    config.insert("AppName", serde_json::json!("Demo"));
    config.insert("CodeSign", serde_json::json!("iPhone Distribution"));
    config.insert("BuildVersion", serde_json::json!("1.0.0"));
    config
}

/// A context as the build stage expects it: options, a workspace under
/// `<root>/platforms/ios` and `config`.
#[must_use]
pub fn ready_context(root: &Path, config: PlatformConfig) -> BuildContext {
    let native_root = root.join("platforms/ios");
    let project = NativeProject::new("App.xcworkspace", true, native_root.join("App.xcworkspace"));
    BuildContext::new(root)
        .with_options(BuildOptions::new())
        .and_then(|ctx| ctx.with_native_project(native_root, project))
        .and_then(|ctx| ctx.with_platform_config(config))
        .unwrap_or_else(|e| unreachable!("fresh context cannot conflict: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{parse_xctrace_devices, ProjectMetadata};

    #[test]
    fn test_fixtures_agree() {
        assert_eq!(parse_xctrace_devices(XCTRACE_TWO_DEVICES), sample_devices());
        let metadata = ProjectMetadata::from_list_json(XCODEBUILD_LIST_JSON).unwrap();
        assert_eq!(metadata.first_scheme(), Some("App"));
    }

    #[test]
    fn test_ready_context() {
        let ctx = ready_context(Path::new("/app"), sample_config());
        assert_eq!(
            ctx.fields(),
            vec!["root_path", "options", "native_root", "native_project", "platform_config"]
        );
    }
}
