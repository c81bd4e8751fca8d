// src/imaging/error.rs

//! Error taxonomy for the transform pipeline.
//!
//! One variant per pipeline stage that can fail, so a caller can tell a bad
//! source from a bad destination without parsing message text. The async path
//! never raises across the thread boundary: every variant travels inside the
//! job's outcome and reaches the caller through its one-shot handler.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of one transform job.
#[derive(Error, Debug)]
pub enum TransformError {
    /// Source bytes or file could not be read or decoded.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The resize step could not be carried out.
    #[error("resize failed: {0}")]
    Resize(String),

    /// Creating the output directory chain failed. Carries the OS error.
    #[error("cannot create output directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Encoding or writing the output failed.
    #[error("encode failed: {0}")]
    Encode(String),

    /// The worker running the job panicked or was torn down mid-flight.
    /// Not produced by the pipeline itself; exists so the completion handler
    /// still fires when a codec bug takes the worker down.
    #[error("worker failed: {0}")]
    Worker(String),
}

/// Convenience result alias for transform operations.
pub type TransformResult<T> = Result<T, TransformError>;

impl TransformError {
    pub(crate) fn decode<T: Into<String>>(msg: T) -> Self {
        Self::Decode(msg.into())
    }

    pub(crate) fn resize<T: Into<String>>(msg: T) -> Self {
        Self::Resize(msg.into())
    }

    pub(crate) fn encode<T: Into<String>>(msg: T) -> Self {
        Self::Encode(msg.into())
    }

    pub(crate) fn directory(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Directory {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn worker<T: Into<String>>(msg: T) -> Self {
        Self::Worker(msg.into())
    }

    /// OS error code for directory failures, when the platform reported one.
    pub fn os_error(&self) -> Option<i32> {
        match self {
            Self::Directory { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_error_keeps_os_code() {
        let err = TransformError::directory(
            "/tmp/out",
            io::Error::from_raw_os_error(13), // EACCES
        );
        assert_eq!(err.os_error(), Some(13));
        let text = err.to_string();
        assert!(text.contains("/tmp/out"), "message should name the path: {text}");
    }

    #[test]
    fn non_directory_errors_have_no_os_code() {
        assert_eq!(TransformError::decode("bad magic").os_error(), None);
        assert_eq!(TransformError::encode("short write").os_error(), None);
    }
}
