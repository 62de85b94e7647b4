// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Logging setup.
//!
//! ```text
//! init_logging(&LogSettings)
//!        |
//!        v
//!    registry
//!    |       |
//!    v       v
//! stderr    log file (optional)
//! compact   append, no ANSI
//! EnvFilter non_blocking
//!        |
//!        v
//!    LogGuard (flush on drop)
//! ```
//!
//! The stderr layer honors `RUST_LOG`, falling back to a default filter
//! chosen by the caller. The file layer is only installed when logging is
//! enabled in the settings.

use chrono::Local;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used by the file layer.
pub const FILE_FILTER: &str = "info";

/// Options for [`init_logging`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Stderr filter directive when `RUST_LOG` is unset, e.g., `off`.
    pub default_filter: String,

    /// Append events to this file as well.
    pub log_file: Option<PathBuf>,
}

impl LogSettings {
    /// Log to stderr only.
    pub fn new(default_filter: impl Into<String>) -> Self {
        Self {
            default_filter: default_filter.into(),
            log_file: None,
        }
    }

    /// Also log to target file.
    pub fn with_log_file(mut self, log_file: impl Into<PathBuf>) -> Self {
        self.log_file = Some(log_file.into());
        self
    }
}

/// Keeps the file writer alive.
///
/// Buffered events are flushed when dropped.
#[derive(Debug)]
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// - Return [`LoggingError::Filter`] if default filter cannot be parsed.
/// - Return [`LoggingError::Open`] if log file cannot be opened.
/// - Return [`LoggingError::Install`] if a global subscriber already exists.
pub fn init_logging(settings: &LogSettings) -> Result<LogGuard> {
    let stderr_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.default_filter))?;
    let stderr_layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(stderr_filter);

    let (file_layer, file_guard) = match &settings.log_file {
        Some(log_file) => {
            let file = LogFile::new(log_file).open_append()?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_ansi(false)
                .with_filter(EnvFilter::try_new(FILE_FILTER)?);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| LoggingError::Install(err.to_string()))?;

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}

/// Append-only log file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    path: PathBuf,
}

impl LogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes, zero if the file does not exist.
    pub fn size(&self) -> u64 {
        fs::metadata(&self.path)
            .map(|meta| meta.len())
            .unwrap_or(0)
    }

    /// Truncate the file, leaving a single header line.
    ///
    /// # Errors
    ///
    /// - Return [`LoggingError::Open`] if the file cannot be written.
    pub fn clear(&self) -> Result<()> {
        self.create_parent()?;
        let header = format!(
            "# Dotfiles Manager Log - Cleared {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        fs::write(&self.path, header).map_err(|err| self.open_error(err))
    }

    /// Last `count` lines, oldest first.
    ///
    /// Empty if the file does not exist or cannot be read.
    pub fn tail(&self, count: usize) -> Vec<String> {
        let Ok(data) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };

        let lines = data.lines().collect::<Vec<_>>();
        let start = lines.len().saturating_sub(count);
        lines[start..].iter().map(ToString::to_string).collect()
    }

    fn open_append(&self) -> Result<fs::File> {
        self.create_parent()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| self.open_error(err))?;
        if file.metadata().map(|meta| meta.len() == 0).unwrap_or(false) {
            writeln!(file, "# Dotfiles Manager Log").map_err(|err| self.open_error(err))?;
        }

        Ok(file)
    }

    fn create_parent(&self) -> Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|err| self.open_error(err))
            }
            _ => Ok(()),
        }
    }

    fn open_error(&self, err: std::io::Error) -> LoggingError {
        LoggingError::Open {
            source: err,
            path: self.path.clone(),
        }
    }
}

/// Logging error types.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to open log file {:?}", path.display())]
    Open {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("failed to install logger: {0}")]
    Install(String),
}

/// Friendly result alias :3
pub type Result<T, E = LoggingError> = std::result::Result<T, E>;
