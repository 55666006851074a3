//! End-to-end runs of the iOS pipelines against a project tree on disk.
//!
//! The filesystem collaborators are the real ones. Commands go through a
//! [`RecordingCommandRunner`] and the prompt through a [`ScriptedChooser`].

#[cfg(test)]
mod tests {
    use crate::adapters::{
        CommandBundleCompiler, DeployHelperInstaller, IosConfigResolver, WalkdirStager,
        XcodeProjectLocator, XcodebuildMetadataReader, XctraceDeviceLister,
    };
    use crate::config::PipelineSettings;
    use crate::context::{BuildContext, BuildOptions};
    use crate::errors::{ErrorKind, NativeflowError};
    use crate::events::{names as events, CollectingEventSink, EventSink};
    use crate::pipeline::{ios_build_pipeline, ios_run_pipeline, IosCollaborators, PipelineOutcome};
    use crate::stages::names;
    use crate::testing::{
        assert_executed, assert_failed_at, assert_failure_kind, assert_pipeline_succeeded,
        sample_devices, RecordingCommandRunner, ScriptedChooser, XCODEBUILD_LIST_JSON,
        XCTRACE_TWO_DEVICES,
    };
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Harness {
        dir: TempDir,
        settings: PipelineSettings,
        runner: Arc<RecordingCommandRunner>,
        chooser: Arc<ScriptedChooser>,
        events: Arc<CollectingEventSink>,
    }

    impl Harness {
        fn new(runner: RecordingCommandRunner) -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
                settings: PipelineSettings::default(),
                runner: Arc::new(runner),
                chooser: Arc::new(ScriptedChooser::new(0)),
                events: Arc::new(CollectingEventSink::new()),
            }
        }

        fn with_choice(mut self, index: usize) -> Self {
            self.chooser = Arc::new(ScriptedChooser::new(index));
            self
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn native_root(&self) -> PathBuf {
            self.root().join("platforms/ios")
        }

        fn write(&self, relative: &str, contents: &str) {
            let path = self.root().join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, contents).unwrap();
        }

        fn mkdir(&self, relative: &str) {
            std::fs::create_dir_all(self.root().join(relative)).unwrap();
        }

        /// A compiled bundle, an iOS workspace and one iOS config file.
        fn scaffold(&self) {
            self.write("dist/index.js", "// entry");
            self.write("dist/index.web.js", "// web only");
            self.write("dist/vendor.js", "// vendor");
            self.write("dist/pages/home.js", "// page");
            self.write("dist/style.css", "body {}");
            self.mkdir("platforms/ios/App.xcworkspace");
            self.write("platforms/ios/Podfile", "platform :ios, '12.0'");
            self.write(
                "ios.config.json",
                r#"{"AppName": " Demo ", "BuildVersion": "2.1.0"}"#,
            );
        }

        fn collaborators(&self) -> IosCollaborators {
            let sink: Arc<dyn EventSink> = self.events.clone();
            IosCollaborators {
                installer: Arc::new(
                    DeployHelperInstaller::new(
                        self.settings.deploy_helper.clone(),
                        self.settings.deploy_helper_install.clone(),
                        self.runner.clone(),
                    )
                    .with_lookup(|_| true),
                ),
                compiler: Arc::new(CommandBundleCompiler::new(
                    self.settings.bundle_command.clone(),
                    self.runner.clone(),
                )),
                stager: Arc::new(WalkdirStager::new(sink, 4)),
                locator: Arc::new(XcodeProjectLocator::new()),
                runner: self.runner.clone(),
                resolver: Arc::new(IosConfigResolver::new()),
                metadata: Arc::new(XcodebuildMetadataReader::new(self.runner.clone())),
                lister: Arc::new(XctraceDeviceLister::new(self.runner.clone(), true)),
                chooser: self.chooser.clone(),
            }
        }

        async fn build(&self, options: BuildOptions) -> PipelineOutcome {
            let pipeline = ios_build_pipeline(
                &self.collaborators(),
                &self.settings,
                options,
                self.events.clone(),
            )
            .unwrap();
            pipeline.run(BuildContext::new(self.root())).await
        }

        async fn run(&self) -> PipelineOutcome {
            let pipeline = ios_run_pipeline(
                &self.collaborators(),
                &self.settings,
                BuildOptions::new(),
                self.events.clone(),
            )
            .unwrap();
            pipeline.run(BuildContext::new(self.root())).await
        }

        fn started_stages(&self) -> Vec<String> {
            self.events
                .events_of_type(events::STAGE_STARTED)
                .into_iter()
                .filter_map(|(_, data)| data?.get("stage")?.as_str().map(str::to_string))
                .collect()
        }
    }

    fn runner() -> RecordingCommandRunner {
        RecordingCommandRunner::new()
            .with_stdout("xcodebuild -list", XCODEBUILD_LIST_JSON)
            .with_stdout("xcrun", XCTRACE_TWO_DEVICES)
    }

    const ALL_BUILD_STAGES: [&str; 9] = [
        names::CHECK_TOOLCHAIN,
        names::COMPILE_BUNDLE,
        names::COPY_BUNDLE_ASSETS,
        names::SEED_OPTIONS,
        names::LOCATE_NATIVE_PROJECT,
        names::INSTALL_NATIVE_DEPENDENCIES,
        names::RESOLVE_PLATFORM_CONFIG,
        names::BUILD_NATIVE_APP,
        names::STAGE_RELEASE_ASSETS,
    ];

    #[tokio::test]
    async fn test_build_end_to_end() {
        let h = Harness::new(runner());
        h.scaffold();

        let outcome = h.build(BuildOptions::new()).await;

        assert_pipeline_succeeded(&outcome);
        assert_executed(&outcome, &ALL_BUILD_STAGES);

        let ctx = outcome.context().unwrap();
        let project = ctx.native_project().unwrap();
        assert_eq!(project.name, "App.xcworkspace");
        assert!(project.is_workspace);
        assert_eq!(ctx.native_root(), Some(h.native_root().as_path()));

        let config = ctx.platform_config().unwrap();
        assert_eq!(config.get_str("AppName"), Some("Demo"));
        assert_eq!(config.get_str("BuildVersion"), Some("2.1.0"));
        assert!(config.contains_key("Ws"));

        let bundle = h.native_root().join("bundlejs");
        assert!(bundle.join("index.js").is_file());
        assert!(bundle.join("pages/home.js").is_file());
        assert!(!bundle.join("index.web.js").exists());
        assert!(!bundle.join("style.css").exists());

        let pods = h.runner.commands_for("pod");
        assert_eq!(pods.len(), 1);
        assert_eq!(pods[0].cwd.as_deref(), Some(h.native_root().as_path()));

        let build = h
            .runner
            .commands_for("xcodebuild")
            .into_iter()
            .find(|c| c.args.iter().any(|a| a == "build"))
            .unwrap();
        assert_eq!(
            build.args,
            [
                "-workspace",
                "App.xcworkspace",
                "-scheme",
                "App",
                "-configuration",
                "PROD",
                "-sdk",
                "iphoneos",
                "-derivedDataPath",
                "build",
                "clean",
                "build",
            ]
        );
        assert_eq!(build.cwd.as_deref(), Some(h.native_root().as_path()));
        assert!(!h.root().join("release").exists());
    }

    #[tokio::test]
    async fn test_missing_platform_dir_stops_before_native_work() {
        let h = Harness::new(runner());
        h.write("dist/index.js", "// entry");
        h.write("ios.config.json", r#"{"AppName": "Demo"}"#);

        let outcome = h.build(BuildOptions::new()).await;

        assert_failed_at(&outcome, names::LOCATE_NATIVE_PROJECT);
        assert!(matches!(
            outcome.failure().unwrap().error,
            NativeflowError::PlatformMissing { .. }
        ));
        assert!(outcome.failure().unwrap().diagnostic.hint.as_deref().unwrap().contains("weex platform add ios"));
        assert!(!h.native_root().exists());
        assert!(h.runner.commands_for("pod").is_empty());
        assert!(h.runner.commands_for("xcodebuild").is_empty());
        let started = h.started_stages();
        assert!(!started.iter().any(|s| s == names::INSTALL_NATIVE_DEPENDENCIES));
        assert!(!started.iter().any(|s| s == names::RESOLVE_PLATFORM_CONFIG));
    }

    #[tokio::test]
    async fn test_platform_dir_without_project() {
        let missing = {
            let h = Harness::new(runner());
            h.write("dist/index.js", "");
            h.build(BuildOptions::new()).await
        };

        let h = Harness::new(runner());
        h.write("dist/index.js", "");
        h.write("platforms/ios/Podfile", "");
        let empty = h.build(BuildOptions::new()).await;

        assert_failed_at(&empty, names::LOCATE_NATIVE_PROJECT);
        assert_failure_kind(&empty, ErrorKind::Environment);
        let empty = empty.failure().unwrap();
        let missing = missing.failure().unwrap();
        assert!(matches!(empty.error, NativeflowError::ProjectNotFound { .. }));
        assert_ne!(empty.error.to_string(), missing.error.to_string());
        assert_ne!(empty.diagnostic.hint, missing.diagnostic.hint);
        assert!(h.runner.commands_for("pod").is_empty());
    }

    #[tokio::test]
    async fn test_empty_config_wins_over_metadata() {
        for metadata_fails in [false, true] {
            let runner = if metadata_fails {
                runner().with_failure("xcodebuild -list", "xcodebuild: no such project")
            } else {
                runner()
            };
            let h = Harness::new(runner);
            h.scaffold();
            std::fs::remove_file(h.root().join("ios.config.json")).unwrap();

            let outcome = h.build(BuildOptions::new()).await;

            assert_failed_at(&outcome, names::BUILD_NATIVE_APP);
            let failure = outcome.failure().unwrap();
            assert!(
                matches!(failure.error, NativeflowError::ConfigDirNotDetected),
                "metadata_fails={metadata_fails}: {}",
                failure.error
            );
            assert_eq!(failure.diagnostic.code, "CFG-001-EMPTY");
            assert!(failure.diagnostic.hint.is_some());
            assert!(!h
                .runner
                .commands_for("xcodebuild")
                .iter()
                .any(|c| c.args.iter().any(|a| a == "build")));
        }
    }

    #[tokio::test]
    async fn test_copy_reports_matched_files() {
        let h = Harness::new(runner());
        h.scaffold();

        let outcome = h.build(BuildOptions::new()).await;
        assert_pipeline_succeeded(&outcome);

        // index.js, vendor.js and pages/home.js match; the rest is filtered out.
        assert_eq!(h.events.events_of_type(events::COPY_FILE_STARTED).len(), 3);
        assert_eq!(h.events.events_of_type(events::COPY_FILE_COMPLETED).len(), 3);
        assert!(h.events.events_of_type(events::COPY_FILE_FAILED).is_empty());
    }

    #[tokio::test]
    async fn test_release_assets_are_versioned() {
        let h = Harness::new(runner());
        h.scaffold();
        h.write("platforms/ios/build/Build/Products/Release-iphoneos/App.ipa", "ipa");
        h.write("platforms/ios/build/Build/Products/Release-iphoneos/App.dSYM.zip", "syms");

        let outcome = h
            .build(BuildOptions::new().with_value("release", serde_json::json!(true)))
            .await;

        assert_pipeline_succeeded(&outcome);
        let release = h.root().join("release/ios/2.1.0");
        assert!(release.join("App.ipa").is_file());
        assert!(!release.join("App.dSYM.zip").exists());
    }

    #[tokio::test]
    async fn test_run_picks_nth_device() {
        let h = Harness::new(runner()).with_choice(1);
        h.scaffold();

        let outcome = h.run().await;

        assert_pipeline_succeeded(&outcome);
        let ctx = outcome.context().unwrap();
        assert_eq!(ctx.device(), Some(&sample_devices()[1]));
        assert_eq!(ctx.devices().unwrap().len(), 2);
        assert!(ctx.native_project().is_some());
        assert_eq!(h.chooser.prompt_count(), 1);
        assert_eq!(h.chooser.prompts()[0], sample_devices());
    }

    #[tokio::test]
    async fn test_run_without_devices_never_prompts() {
        let h = Harness::new(runner().with_stdout("xcrun", "== Devices ==\n"));
        h.scaffold();

        let outcome = h.run().await;

        assert_failed_at(&outcome, names::CHOOSE_DEVICE);
        assert!(matches!(outcome.failure().unwrap().error, NativeflowError::NoDevices));
        assert_eq!(outcome.failure().unwrap().error.to_string(), "No ios devices found.");
        assert_eq!(h.chooser.prompt_count(), 0);
    }

    #[tokio::test]
    async fn test_run_with_out_of_range_choice() {
        let h = Harness::new(runner()).with_choice(5);
        h.scaffold();

        let outcome = h.run().await;

        assert_failed_at(&outcome, names::CHOOSE_DEVICE);
        assert_failure_kind(&outcome, ErrorKind::InteractiveInput);
    }

    #[tokio::test]
    async fn test_failed_bundle_compile_stops_everything() {
        let h = Harness::new(runner().with_failure("npm run", "npm: command not found"));
        h.scaffold();

        let outcome = h.build(BuildOptions::new()).await;

        assert_failed_at(&outcome, names::COMPILE_BUNDLE);
        assert_failure_kind(&outcome, ErrorKind::ExternalProcess);
        assert!(outcome.failure().unwrap().diagnostic.hint.is_none());
        assert!(!h.native_root().join("bundlejs").exists());
        assert!(h.runner.commands_for("pod").is_empty());
    }
}
