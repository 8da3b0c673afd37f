//! Where retry events go: an append-only file under the XDG state dir, or
//! stderr when that file cannot be opened.
//!
//! Call one of these before building a retry policy; the policy's span is
//! created at build time and is disabled if no subscriber exists yet.

use anyhow::Result;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Retry decisions are DEBUG/WARN under the `sqlretry` target; everything
/// else only at INFO.
const DEFAULT_FILTER: &str = "info,sqlretry=debug";

/// Per-event handle on the log file. A failed handle clone degrades to
/// stderr rather than dropping the event.
enum LogSink {
    File(fs::File),
    Stderr,
}

impl io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::File(f) => f.write(buf),
            LogSink::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::File(f) => f.flush(),
            LogSink::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct SharedLogFile(fs::File);

impl<'a> MakeWriter<'a> for SharedLogFile {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(LogSink::File)
            .unwrap_or(LogSink::Stderr)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn install<W>(writer: W) -> Result<()>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

/// Path of the log file: `~/.local/state/sqlretry/sqlretry.log`.
pub fn log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("sqlretry")?;
    Ok(xdg_dirs.get_state_home().join("sqlretry.log"))
}

/// Send retry events to [`log_path`], creating the state directory if needed.
///
/// Errors when the file cannot be opened or a global subscriber is already
/// installed.
pub fn init_logging() -> Result<()> {
    let path = log_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;

    install(SharedLogFile(file))?;
    tracing::info!(target: "sqlretry", "retry log at {}", path.display());
    Ok(())
}

/// Send retry events to stderr. Hosts fall back to this when the state
/// directory is unwritable; a subscriber that is already installed wins.
pub fn init_logging_stderr() {
    let _ = install(io::stderr);
}
