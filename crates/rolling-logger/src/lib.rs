//! Rolling Logger
//!
//! Daily rolling log files plus a circular buffer of the most recent lines,
//! installed as the global `tracing` subscriber. Records emitted through the
//! `log` facade are bridged into the same sink.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use chrono::{Local, NaiveDate};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Lines kept in memory for `recent_logs`
pub const BUFFER_CAPACITY: usize = 500;

/// Log files kept on disk, newest first
pub const MAX_LOG_FILES: usize = 7;

static LOGGER: OnceLock<RollingLogger> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("logger already initialized")]
    AlreadyInitialized,
    #[error("logger not initialized")]
    NotInitialized,
    #[error("failed to prepare log file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to install subscriber: {0}")]
    Subscriber(String),
}

struct Inner {
    dir: PathBuf,
    app_name: String,
    date: NaiveDate,
    file: File,
    buffer: VecDeque<String>,
    capacity: usize,
}

impl Inner {
    fn file_name(app_name: &str, date: NaiveDate) -> String {
        format!("{}-{}.log", app_name, date.format("%Y-%m-%d"))
    }

    fn open_file(dir: &Path, app_name: &str, date: NaiveDate) -> io::Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(Self::file_name(app_name, date)))
    }

    /// Switch to a new file when the day changes
    fn roll_if_needed(&mut self, today: NaiveDate) -> io::Result<()> {
        if today == self.date {
            return Ok(());
        }
        self.file.flush()?;
        self.file = Self::open_file(&self.dir, &self.app_name, today)?;
        self.date = today;
        prune_old_files(&self.dir, &self.app_name, MAX_LOG_FILES)
    }

    fn append(&mut self, buf: &[u8], today: NaiveDate) -> io::Result<()> {
        self.roll_if_needed(today)?;
        self.file.write_all(buf)?;

        for line in String::from_utf8_lossy(buf).lines() {
            if line.is_empty() {
                continue;
            }
            if self.buffer.len() == self.capacity {
                self.buffer.pop_front();
            }
            self.buffer.push_back(line.to_string());
        }
        Ok(())
    }
}

/// Remove all but the newest `keep` log files of this app
fn prune_old_files(dir: &Path, app_name: &str, keep: usize) -> io::Result<()> {
    let prefix = format!("{}-", app_name);
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(&prefix) && name.ends_with(".log"))
                .unwrap_or(false)
        })
        .collect();

    // Date-stamped names sort chronologically
    files.sort();
    if files.len() > keep {
        for path in &files[..files.len() - keep] {
            fs::remove_file(path)?;
        }
    }
    Ok(())
}

/// File sink with an in-memory tail
#[derive(Clone)]
pub struct RollingLogger {
    inner: Arc<Mutex<Inner>>,
}

impl RollingLogger {
    pub fn new(log_dir: impl Into<PathBuf>, app_name: &str) -> Result<Self, LoggerError> {
        Self::with_capacity(log_dir, app_name, BUFFER_CAPACITY)
    }

    pub fn with_capacity(
        log_dir: impl Into<PathBuf>,
        app_name: &str,
        capacity: usize,
    ) -> Result<Self, LoggerError> {
        let dir = log_dir.into();
        fs::create_dir_all(&dir)?;

        let date = Local::now().date_naive();
        let file = Inner::open_file(&dir, app_name, date)?;
        prune_old_files(&dir, app_name, MAX_LOG_FILES)?;

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                dir,
                app_name: app_name.to_string(),
                date,
                file,
                buffer: VecDeque::with_capacity(capacity),
                capacity: capacity.max(1),
            })),
        })
    }

    /// Most recent lines, oldest first
    pub fn recent(&self) -> Vec<String> {
        match self.inner.lock() {
            Ok(inner) => inner.buffer.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Path of the file currently written to
    pub fn current_file(&self) -> Option<PathBuf> {
        let inner = self.inner.lock().ok()?;
        Some(inner.dir.join(Inner::file_name(&inner.app_name, inner.date)))
    }
}

pub struct RollingWriter {
    inner: Arc<Mutex<Inner>>,
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log sink poisoned"))?;
        inner.append(buf, Local::now().date_naive())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log sink poisoned"))?;
        inner.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingLogger {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RollingWriter {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn to_level_filter(level: log::LevelFilter) -> LevelFilter {
    match level {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    }
}

/// Install the global logger at `Info` level
pub fn init_logger(log_dir: impl Into<PathBuf>, app_name: &str) -> Result<(), LoggerError> {
    init_logger_with_level(log_dir, app_name, log::LevelFilter::Info)
}

/// Install the global logger.
///
/// Fails with `AlreadyInitialized` on the second call in a process.
pub fn init_logger_with_level(
    log_dir: impl Into<PathBuf>,
    app_name: &str,
    level: log::LevelFilter,
) -> Result<(), LoggerError> {
    if LOGGER.get().is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }

    let logger = RollingLogger::new(log_dir, app_name)?;

    tracing_subscriber::fmt()
        .with_writer(logger.clone())
        .with_ansi(false)
        .with_max_level(to_level_filter(level))
        .try_init()
        .map_err(|e| LoggerError::Subscriber(e.to_string()))?;

    LOGGER
        .set(logger)
        .map_err(|_| LoggerError::AlreadyInitialized)
}

fn ensure_initialized() -> Result<(), LoggerError> {
    LOGGER.get().map(|_| ()).ok_or(LoggerError::NotInitialized)
}

pub fn info(message: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::info!("{}", message);
    Ok(())
}

pub fn warn(message: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::warn!("{}", message);
    Ok(())
}

pub fn error(message: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::error!("{}", message);
    Ok(())
}

/// Tail of the global logger, empty before `init_logger`
pub fn recent_logs() -> Vec<String> {
    LOGGER.get().map(RollingLogger::recent).unwrap_or_default()
}
