//! Log capture for asserting on the `[Coverity] ...` argument lines.

#![allow(dead_code)]

use async_trait::async_trait;
use cov_ci::{CommandInvocation, CommandOutcome, CommandRunner, RecordingRunner};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::subscriber::DefaultGuard;

/// In-memory sink for a `tracing_subscriber::fmt` subscriber.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Route this thread's events into a fresh capture until the guard drops.
    pub fn install() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    /// Every `[Coverity] <tool> command line arguments: [...]` message logged so far.
    pub fn argument_lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.buffer())
            .lines()
            .filter_map(|line| line.find("[Coverity] ").map(|at| line[at..].to_string()))
            .filter(|line| line.contains(" command line arguments: ["))
            .collect()
    }

    fn buffer(&self) -> MutexGuard<'_, Vec<u8>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Recording runner that notes how many argument lines were logged at each launch.
pub struct LaunchLogRunner {
    log: LogCapture,
    inner: RecordingRunner,
    lines_at_launch: Mutex<Vec<usize>>,
}

impl LaunchLogRunner {
    pub fn new(log: LogCapture) -> Self {
        Self {
            log,
            inner: RecordingRunner::new(),
            lines_at_launch: Mutex::new(Vec::new()),
        }
    }

    pub fn lines_at_launch(&self) -> Vec<usize> {
        self.lines_at_launch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn invocations(&self) -> Vec<CommandInvocation> {
        self.inner.invocations()
    }
}

#[async_trait]
impl CommandRunner for LaunchLogRunner {
    async fn execute(&self, invocation: &CommandInvocation) -> cov_ci::Result<CommandOutcome> {
        let logged = self.log.argument_lines().len();
        self.lines_at_launch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(logged);
        self.inner.execute(invocation).await
    }
}
