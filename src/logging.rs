//! Tracing setup for hosts embedding the workspace.
//!
//! Each event is written to a daily rolling file and forwarded, one line at
//! a time, over a bounded channel the host can drain into its own log
//! panel. Lines are dropped when the host falls behind.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_PREFIX: &str = "vfs_workspace.log";
pub const DEFAULT_FILTER: &str = "vfs_workspace=info";
pub const DEFAULT_LINE_CAPACITY: usize = 1024;

#[derive(Clone, Debug)]
pub struct LoggingOptions {
    pub log_dir: PathBuf,
    /// Used when `RUST_LOG` is unset. Falls back to [`DEFAULT_FILTER`].
    pub filter: Option<String>,
    /// Lines buffered for the host before new ones are dropped.
    pub line_capacity: usize,
    /// Also log panics through tracing. The previous hook still runs.
    pub capture_panics: bool,
}

impl LoggingOptions {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            filter: None,
            line_capacity: DEFAULT_LINE_CAPACITY,
            capture_panics: false,
        }
    }
}

pub struct LoggingGuard {
    _worker: WorkerGuard,
    log_dir: PathBuf,
    lines: Option<Receiver<String>>,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// The receiving end of the line channel; `None` once taken.
    pub fn take_lines(&mut self) -> Option<Receiver<String>> {
        self.lines.take()
    }
}

#[derive(Clone)]
struct LogSink {
    file: NonBlocking,
    lines: SyncSender<String>,
}

/// Writer for a single event. The formatted record is mirrored into
/// `record` and forwarded when the writer is dropped.
struct EventWriter {
    file: NonBlocking,
    record: Vec<u8>,
    lines: SyncSender<String>,
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = EventWriter;

    fn make_writer(&'a self) -> Self::Writer {
        EventWriter {
            file: self.file.clone(),
            record: Vec::new(),
            lines: self.lines.clone(),
        }
    }
}

impl Write for EventWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.file.write(buf)?;
        self.record.extend_from_slice(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Drop for EventWriter {
    fn drop(&mut self) {
        forward_lines(&self.record, &self.lines);
    }
}

/// Sends the non-empty lines of `record`; returns how many were accepted.
fn forward_lines(record: &[u8], lines: &SyncSender<String>) -> usize {
    let mut sent = 0;
    for line in String::from_utf8_lossy(record).lines() {
        if line.is_empty() {
            continue;
        }
        match lines.try_send(line.to_string()) {
            Ok(()) => sent += 1,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => break,
        }
    }
    sent
}

/// `RUST_LOG` wins over the configured filter, which wins over the default.
fn filter_directive(env: Option<String>, configured: Option<&str>) -> String {
    env.filter(|value| !value.trim().is_empty())
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

fn prepare_log_dir(preferred: &Path) -> Option<PathBuf> {
    if std::fs::create_dir_all(preferred).is_ok() {
        return Some(preferred.to_path_buf());
    }
    let fallback = std::env::temp_dir().join("vfs_workspace").join("logs");
    std::fs::create_dir_all(&fallback).ok()?;
    Some(fallback)
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(panic = %info, "panic");
        previous(info);
    }));
}

/// Installs the global subscriber. Returns `None` if no log directory is
/// usable or a subscriber is already installed.
pub fn init(options: &LoggingOptions) -> Option<LoggingGuard> {
    let log_dir = prepare_log_dir(&options.log_dir)?;

    let appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (file, worker) = tracing_appender::non_blocking(appender);
    let (line_tx, line_rx) = mpsc::sync_channel(options.line_capacity.max(1));

    let directive = filter_directive(std::env::var("RUST_LOG").ok(), options.filter.as_deref());
    let env_filter =
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(LogSink {
            file,
            lines: line_tx,
        })
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .ok()?;

    if options.capture_panics {
        install_panic_hook();
    }

    tracing::info!(log_dir = %log_dir.display(), %directive, "tracing initialized");

    Some(LoggingGuard {
        _worker: worker,
        log_dir,
        lines: Some(line_rx),
    })
}

#[cfg(test)]
#[path = "../tests/unit/logging.rs"]
mod tests;
