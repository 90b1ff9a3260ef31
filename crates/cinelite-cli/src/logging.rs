//! Log output routing.
//!
//! Logs go to stdout, except while the browser owns the terminal: then
//! they are appended to a file so they cannot scribble over the screen.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use tracing_subscriber::fmt::MakeWriter;

/// Log file written while the browser runs, next to `config.toml`.
pub const BROWSER_LOG_FILE: &str = "cinelite.log";

/// Where log events currently go.
#[derive(Debug)]
enum Route {
    Terminal,
    File(File),
    Discard,
}

static ROUTE: Mutex<Route> = Mutex::new(Route::Terminal);

fn set_route(route: Route) {
    *ROUTE.lock().unwrap_or_else(PoisonError::into_inner) = route;
}

/// `MakeWriter` for the fmt layer that follows the current route.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOutput;

/// Writer for a single log event.
#[derive(Debug)]
pub enum LogWriter {
    /// Normal terminal output.
    Stdout(io::Stdout),
    /// Browser log file.
    File(File),
    /// Dropped output (no usable log file while the terminal is taken).
    Discard(io::Sink),
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(w) => w.write(buf),
            Self::File(w) => w.write(buf),
            Self::Discard(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
            Self::Discard(w) => w.flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for LogOutput {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        let route = ROUTE.lock().unwrap_or_else(PoisonError::into_inner);
        match &*route {
            Route::Terminal => LogWriter::Stdout(io::stdout()),
            Route::File(file) => file
                .try_clone()
                .map_or_else(|_| LogWriter::Discard(io::sink()), LogWriter::File),
            Route::Discard => LogWriter::Discard(io::sink()),
        }
    }
}

/// Keeps logs away from the terminal until dropped.
#[derive(Debug)]
#[must_use = "logs return to the terminal as soon as the guard is dropped"]
pub struct TerminalGuard {
    _private: (),
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        set_route(Route::Terminal);
    }
}

fn open_log(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))
}

/// Appends log output to `path` until the returned guard is dropped.
///
/// When the file cannot be opened the output is dropped instead; the
/// failure is logged to the terminal before switching.
pub fn divert_to_file(path: &Path) -> TerminalGuard {
    match open_log(path) {
        Ok(file) => {
            tracing::debug!(path = %path.display(), "browser logs redirected");
            set_route(Route::File(file));
        }
        Err(e) => {
            tracing::warn!(error = %e, "browser logs will be discarded");
            set_route(Route::Discard);
        }
    }
    TerminalGuard { _private: () }
}
