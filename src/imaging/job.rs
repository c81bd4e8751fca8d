// src/imaging/job.rs

//! Job descriptors for the transform pipeline.
//!
//! A [`TransformRequest`] is what callers hand to the pool; everything in it
//! is copied into a crate-private [`TransformJob`] at submit time, so the
//! caller can reuse or mutate its request and options without racing a job
//! already in flight.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::imaging::error::TransformResult;
use crate::imaging::filter::FilterKind;

// ── Request side ─────────────────────────────────────────────

/// Where the source image comes from.
#[derive(Clone)]
pub enum Source {
    /// An already-loaded encoded image.
    Bytes(Vec<u8>),
    /// A file to read lazily on the worker.
    Path(PathBuf),
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(data) => write!(f, "Bytes({} bytes)", data.len()),
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
        }
    }
}

impl From<Vec<u8>> for Source {
    fn from(data: Vec<u8>) -> Self {
        Self::Bytes(data)
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

/// Transform parameters. All fields are optional in the serialized form and
/// default to "leave the image alone".
///
/// A `width` or `height` of zero means "derive from the other side"; both
/// zero means no resize. `quality` above 100 means the codec default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    pub width: u32,
    pub height: u32,
    /// Output format name ("jpg", "png", ...). `None` keeps the source format
    /// unless the target path's extension says otherwise.
    pub format: Option<String>,
    /// Resize filter name, resolved through [`FilterKind::resolve`].
    pub filter: String,
    pub quality: u32,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            format: None,
            filter: String::new(),
            quality: 101,
        }
    }
}

/// One unit of work for the pool: a source, an optional destination, and the
/// options to apply in between. No target means the encoded result comes back
/// in the completion as a blob.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    pub source: Source,
    pub target: Option<PathBuf>,
    pub options: TransformOptions,
}

impl TransformRequest {
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            source: Source::Bytes(data),
            target: None,
            options: TransformOptions::default(),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::Path(path.into()),
            target: None,
            options: TransformOptions::default(),
        }
    }

    /// Sets the output file. Parent directories are created by the worker.
    pub fn to(mut self, target: impl Into<PathBuf>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with(mut self, options: TransformOptions) -> Self {
        self.options = options;
        self
    }
}

// ── Completion side ──────────────────────────────────────────

/// What a finished job produced.
#[derive(Clone)]
pub enum TransformOutput {
    /// The result was written to `path`; dimensions are those of the image
    /// actually produced.
    Written {
        path: PathBuf,
        width: u32,
        height: u32,
    },
    /// No target was given, so the encoded image comes back in memory.
    Blob {
        data: Vec<u8>,
        width: u32,
        height: u32,
    },
}

impl TransformOutput {
    /// Dimensions of the produced image, whichever way it was delivered.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Written { width, height, .. } | Self::Blob { width, height, .. } => {
                (*width, *height)
            }
        }
    }
}

impl fmt::Debug for TransformOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Written {
                path,
                width,
                height,
            } => f
                .debug_struct("Written")
                .field("path", path)
                .field("width", width)
                .field("height", height)
                .finish(),
            Self::Blob {
                data,
                width,
                height,
            } => f
                .debug_struct("Blob")
                .field("data", &format_args!("{} bytes", data.len()))
                .field("width", width)
                .field("height", height)
                .finish(),
        }
    }
}

/// Callback invoked exactly once with the job's outcome, on the thread that
/// pumps the relay.
pub type CompletionHandler = Box<dyn FnOnce(TransformResult<TransformOutput>) + Send + 'static>;

/// Snapshot of a request taken at submit time. Owns everything it needs so
/// the worker never reaches back into caller state.
#[derive(Debug, Clone)]
pub(crate) struct TransformJob {
    pub source: Source,
    pub target: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
    pub format: Option<String>,
    pub filter: FilterKind,
    pub quality: u32,
}

impl TransformJob {
    pub fn from_request(request: &TransformRequest) -> Self {
        Self {
            source: request.source.clone(),
            target: request.target.clone(),
            width: request.options.width,
            height: request.options.height,
            format: request.options.format.clone(),
            filter: FilterKind::resolve(&request.options.filter),
            quality: request.options.quality,
        }
    }
}

/// A finished job waiting on the relay channel: the outcome plus the handler
/// to hand it to.
pub(crate) struct CompletedJob {
    pub outcome: TransformResult<TransformOutput>,
    pub handler: CompletionHandler,
}

impl CompletedJob {
    /// Runs the handler. Consumes the job, so each outcome is delivered once.
    pub fn relay(self) {
        (self.handler)(self.outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_deserialize_from_empty_object() {
        let options: TransformOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.width, 0);
        assert_eq!(options.height, 0);
        assert_eq!(options.format, None);
        assert_eq!(options.filter, "");
        assert_eq!(options.quality, 101);
    }

    #[test]
    fn options_deserialize_partial_object() {
        let options: TransformOptions =
            serde_json::from_str(r#"{"width": 400, "filter": "catrom"}"#).unwrap();
        assert_eq!(options.width, 400);
        assert_eq!(options.height, 0);
        assert_eq!(options.filter, "catrom");
    }

    #[test]
    fn job_snapshot_is_independent_of_the_request() {
        let mut request = TransformRequest::from_bytes(vec![1, 2, 3]).with(TransformOptions {
            width: 400,
            filter: "catrom".into(),
            ..TransformOptions::default()
        });
        let job = TransformJob::from_request(&request);

        request.options.width = 9999;
        request.options.filter = "point".into();

        assert_eq!(job.width, 400);
        assert_eq!(job.filter, FilterKind::Catrom);
    }

    #[test]
    fn source_debug_does_not_dump_pixel_data() {
        let source = Source::Bytes(vec![0u8; 4096]);
        assert_eq!(format!("{source:?}"), "Bytes(4096 bytes)");
    }
}
