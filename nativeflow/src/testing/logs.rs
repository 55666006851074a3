//! In-memory capture of `tracing` output.

use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use tracing::subscriber::DefaultGuard;
use tracing::Level;

#[derive(Debug, Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Collects formatted log lines from the current thread.
///
/// Install it with [`LogCapture::record`] for synchronous code, or keep the
/// guard from [`LogCapture::install`] alive across a current-thread
/// `#[tokio::test]`.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: SharedBuffer,
}

impl LogCapture {
    /// Creates an empty capture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes this capture the thread's subscriber until the guard drops.
    #[must_use]
    pub fn install(&self) -> DefaultGuard {
        let buffer = self.buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || buffer.clone())
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .with_max_level(Level::TRACE)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Runs `f` with this capture installed.
    pub fn record<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.install();
        f()
    }

    /// Everything captured so far.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.0.lock()).into_owned()
    }

    /// Number of records logged at exactly `level`.
    #[must_use]
    pub fn count_at(&self, level: Level) -> usize {
        self.contents()
            .lines()
            .filter(|line| line.trim_start().starts_with(level.as_str()))
            .count()
    }
}
