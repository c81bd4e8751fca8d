// src/logging.rs

//! Process-wide logging setup and runtime control.
//!
//! [`init`] installs the global subscriber once. While running, the filter
//! can be swapped with [`set_level`] and the output redirected between
//! stdout and stderr with [`set_channel`]; both take effect immediately on
//! every thread that logs.

use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};

use lazy_static::lazy_static;
use thiserror::Error;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, reload};

lazy_static! {
    static ref RELOAD: Mutex<Option<reload::Handle<EnvFilter, Registry>>> = Mutex::new(None);
}

static CHANNEL: AtomicU8 = AtomicU8::new(0);

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("logging is not initialized")]
    NotInitialized,

    #[error("invalid filter directive: {0}")]
    InvalidFilter(String),

    #[error("filter reload failed: {0}")]
    Reload(String),

    #[error("unknown log channel '{0}', expected stdout or stderr")]
    UnknownChannel(String),
}

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LogChannel {
    Stdout = 0,
    Stderr = 1,
}

impl FromStr for LogChannel {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            other => Err(LoggingError::UnknownChannel(other.to_string())),
        }
    }
}

impl fmt::Display for LogChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        })
    }
}

/// Writer that checks the selected channel on every write, so a channel
/// switch applies to lines logged after it with no re-initialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelWriter;

pub enum ChannelStream {
    Stdout(io::Stdout),
    Stderr(io::Stderr),
}

impl io::Write for ChannelStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(out) => out.write(buf),
            Self::Stderr(err) => err.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(out) => out.flush(),
            Self::Stderr(err) => err.flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for ChannelWriter {
    type Writer = ChannelStream;

    fn make_writer(&'a self) -> Self::Writer {
        match CHANNEL.load(Ordering::Relaxed) {
            0 => ChannelStream::Stdout(io::stdout()),
            _ => ChannelStream::Stderr(io::stderr()),
        }
    }
}

/// Installs the global subscriber with a reloadable filter. `RUST_LOG`
/// wins over `default_filter` when set. Returns `false` when some other
/// subscriber got there first, in which case level and channel control
/// stay inert.
pub fn init(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let (filter, handle) = reload::Layer::new(filter);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(ChannelWriter),
        )
        .try_init()
        .is_ok();

    if installed {
        *RELOAD.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
    }
    installed
}

/// Replaces the active filter, e.g. `"info"` or `"debug,hyper=warn"`.
pub fn set_level(directives: &str) -> Result<(), LoggingError> {
    let filter =
        EnvFilter::try_new(directives).map_err(|e| LoggingError::InvalidFilter(e.to_string()))?;
    let guard = RELOAD.lock().unwrap_or_else(|e| e.into_inner());
    let handle = guard.as_ref().ok_or(LoggingError::NotInitialized)?;
    handle
        .reload(filter)
        .map_err(|e| LoggingError::Reload(e.to_string()))
}

/// The directives currently filtering log output, or `None` before [`init`].
pub fn level() -> Option<String> {
    let guard = RELOAD.lock().unwrap_or_else(|e| e.into_inner());
    let handle = guard.as_ref()?;
    handle.with_current(|filter| filter.to_string()).ok()
}

pub fn set_channel(channel: LogChannel) {
    CHANNEL.store(channel as u8, Ordering::Relaxed);
}

pub fn channel() -> LogChannel {
    match CHANNEL.load(Ordering::Relaxed) {
        0 => LogChannel::Stdout,
        _ => LogChannel::Stderr,
    }
}
