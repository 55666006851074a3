//! Best-effort recursive file staging.
//!
//! A copy operation walks the source tree, keeps the files whose names pass
//! the [`CopyFilter`], and copies each one to the same relative path under the
//! destination, overwriting existing files. Individual failures are reported
//! as events and collected in the [`CopyReport`]; they never abort the copy.

use crate::errors::NativeflowError;
use crate::events::{names, EventSink};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// File name filter built from `*`/`?` glob patterns.
#[derive(Debug, Clone)]
pub struct CopyFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl CopyFilter {
    /// Compiles include and exclude patterns.
    ///
    /// An empty include list accepts every file name.
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self, NativeflowError> {
        Ok(Self {
            include: include.iter().map(|p| glob_to_regex(p.as_ref())).collect::<Result<_, _>>()?,
            exclude: exclude.iter().map(|p| glob_to_regex(p.as_ref())).collect::<Result<_, _>>()?,
        })
    }

    /// Returns true if `file_name` should be copied.
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|re| re.is_match(file_name));
        included && !self.exclude.iter().any(|re| re.is_match(file_name))
    }
}

fn glob_to_regex(pattern: &str) -> Result<Regex, NativeflowError> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => re.push_str("[^/]*"),
            '?' => re.push_str("[^/]"),
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).map_err(|e| {
        NativeflowError::Serialization(format!("invalid file pattern '{pattern}': {e}"))
    })
}

/// A file that could not be copied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyFailure {
    /// Source file.
    pub src: PathBuf,
    /// Intended destination.
    pub dest: PathBuf,
    /// Error message.
    pub error: String,
}

/// Outcome of a copy operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyReport {
    /// Number of source files that passed the filter. This is the count a
    /// staging step reports, whatever happened to the individual copies.
    pub matched: usize,
    /// Destination paths written.
    pub copied: Vec<PathBuf>,
    /// Files that failed.
    pub failed: Vec<CopyFailure>,
}

impl CopyReport {
    /// Number of files written.
    #[must_use]
    pub fn copied_count(&self) -> usize {
        self.copied.len()
    }

    /// Returns true if every matched file was written.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.copied.len() == self.matched
    }
}

/// Stages files from one directory tree into another.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStager: Send + Sync {
    /// Copies files under `src` that pass `filter` into `dest`.
    ///
    /// Fails only when the operation as a whole cannot run (for example a
    /// missing source directory); per-file failures land in the report.
    async fn stage(
        &self,
        src: &Path,
        dest: &Path,
        filter: &CopyFilter,
    ) -> Result<CopyReport, NativeflowError>;
}

/// [`FileStager`] that walks the source with `walkdir` and copies with
/// bounded concurrency.
pub struct WalkdirStager {
    events: Arc<dyn EventSink>,
    concurrency: usize,
}

impl std::fmt::Debug for WalkdirStager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalkdirStager")
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl WalkdirStager {
    /// Creates a stager that reports per-file events to `events`.
    #[must_use]
    pub fn new(events: Arc<dyn EventSink>, concurrency: usize) -> Self {
        Self {
            events,
            concurrency: concurrency.max(1),
        }
    }

    fn collect_sources(
        src: &Path,
        dest: &Path,
        filter: &CopyFilter,
        report: &mut CopyReport,
    ) -> Vec<(PathBuf, PathBuf)> {
        let mut files = Vec::new();
        for entry in WalkDir::new(src).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| src.to_path_buf());
                    warn!(path = %path.display(), error = %e, "Unable to read source entry");
                    report.failed.push(CopyFailure {
                        dest: dest.to_path_buf(),
                        src: path,
                        error: e.to_string(),
                    });
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if !filter.matches(name) {
                continue;
            }
            let relative = entry.path().strip_prefix(src).unwrap_or_else(|_| entry.path());
            files.push((entry.path().to_path_buf(), dest.join(relative)));
        }
        files
    }
}

#[async_trait]
impl FileStager for WalkdirStager {
    async fn stage(
        &self,
        src: &Path,
        dest: &Path,
        filter: &CopyFilter,
    ) -> Result<CopyReport, NativeflowError> {
        if !src.is_dir() {
            return Err(NativeflowError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("source directory {} does not exist", src.display()),
            )));
        }

        let mut report = CopyReport::default();
        let files = Self::collect_sources(src, dest, filter, &mut report);
        report.matched = files.len();
        debug!(src = %src.display(), dest = %dest.display(), matched = files.len(), "Staging files");

        let results: Vec<Result<PathBuf, CopyFailure>> = stream::iter(files)
            .map(|(from, to)| {
                let events = Arc::clone(&self.events);
                async move { copy_one(events.as_ref(), from, to).await }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for result in results {
            match result {
                Ok(path) => report.copied.push(path),
                Err(failure) => report.failed.push(failure),
            }
        }
        report.copied.sort();

        info!(
            copied = report.copied_count(),
            failed = report.failed.len(),
            "Move {} files.",
            report.matched
        );
        Ok(report)
    }
}

async fn copy_one(events: &dyn EventSink, from: PathBuf, to: PathBuf) -> Result<PathBuf, CopyFailure> {
    events.emit(
        names::COPY_FILE_STARTED,
        Some(serde_json::json!({ "src": from.display().to_string() })),
    );

    let result = async {
        if let Some(parent) = to.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(&from, &to).await
    }
    .await;

    match result {
        Ok(_) => {
            events.emit(
                names::COPY_FILE_COMPLETED,
                Some(serde_json::json!({ "dest": to.display().to_string() })),
            );
            Ok(to)
        }
        Err(e) => {
            events.emit(
                names::COPY_FILE_FAILED,
                Some(serde_json::json!({
                    "dest": to.display().to_string(),
                    "error": e.to_string(),
                })),
            );
            Err(CopyFailure {
                src: from,
                dest: to,
                error: e.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingEventSink;
    use pretty_assertions::assert_eq;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"content").unwrap();
    }

    fn bundle_filter() -> CopyFilter {
        CopyFilter::new(&["*.js"], &["*.web.js"]).unwrap()
    }

    #[test]
    fn test_filter_include_exclude() {
        let filter = bundle_filter();
        assert!(filter.matches("index.js"));
        assert!(!filter.matches("index.web.js"));
        assert!(!filter.matches("index.js.map"));
        assert!(!filter.matches("README.md"));
    }

    #[test]
    fn test_filter_question_mark_and_literals() {
        let filter = CopyFilter::new(&["app?.ipa"], &[]).unwrap();
        assert!(filter.matches("app1.ipa"));
        assert!(!filter.matches("app10.ipa"));
        assert!(!filter.matches("app1xipa"));
    }

    #[test]
    fn test_empty_include_accepts_all() {
        let filter = CopyFilter::new::<&str>(&[], &[]).unwrap();
        assert!(filter.matches("anything.bin"));
    }

    #[tokio::test]
    async fn test_stage_counts_matching_files() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        touch(&src.path().join("index.js"));
        touch(&src.path().join("vendor.js"));
        touch(&src.path().join("index.web.js"));
        touch(&src.path().join("notes.md"));
        touch(&src.path().join("pages/home.js"));

        let sink = Arc::new(CollectingEventSink::new());
        let stager = WalkdirStager::new(sink.clone(), 2);
        let report = stager.stage(src.path(), dest.path(), &bundle_filter()).await.unwrap();

        assert_eq!(report.matched, 3);
        assert_eq!(report.copied_count(), 3);
        assert!(report.is_complete());
        assert!(dest.path().join("pages/home.js").is_file());
        assert!(!dest.path().join("index.web.js").exists());
        assert_eq!(sink.events_of_type(names::COPY_FILE_STARTED).len(), 3);
        assert_eq!(sink.events_of_type(names::COPY_FILE_COMPLETED).len(), 3);
    }

    #[tokio::test]
    async fn test_stage_overwrites_existing_files() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("index.js"), b"new").unwrap();
        std::fs::write(dest.path().join("index.js"), b"old").unwrap();

        let stager = WalkdirStager::new(Arc::new(CollectingEventSink::new()), 4);
        stager.stage(src.path(), dest.path(), &bundle_filter()).await.unwrap();

        assert_eq!(std::fs::read(dest.path().join("index.js")).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_stage_per_file_failure_does_not_abort() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        touch(&src.path().join("a.js"));
        touch(&src.path().join("b.js"));
        touch(&src.path().join("c.js"));
        // A directory where a file should go makes that one copy fail.
        std::fs::create_dir_all(dest.path().join("b.js")).unwrap();

        let sink = Arc::new(CollectingEventSink::new());
        let stager = WalkdirStager::new(sink.clone(), 1);
        let report = stager.stage(src.path(), dest.path(), &bundle_filter()).await.unwrap();

        assert_eq!(report.matched, 3);
        assert_eq!(report.copied_count(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].dest, dest.path().join("b.js"));
        assert!(!report.is_complete());
        assert_eq!(sink.events_of_type(names::COPY_FILE_FAILED).len(), 1);
    }

    #[tokio::test]
    async fn test_stage_missing_source_rejects() {
        let dest = tempfile::tempdir().unwrap();
        let stager = WalkdirStager::new(Arc::new(CollectingEventSink::new()), 1);
        let err = stager
            .stage(&dest.path().join("missing"), dest.path(), &bundle_filter())
            .await
            .unwrap_err();
        assert!(matches!(err, NativeflowError::Io(_)));
    }
}
