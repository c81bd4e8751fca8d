//! Offloads blocking image transforms onto a bounded worker pool and relays
//! each outcome back to the submitting thread exactly once.
//!
//! The crate grew out of a script-host binding layer, which is why a few
//! small text and geo helpers live here alongside the imaging core: they
//! share the same callers, the same logging, and the same serialization.
//!
//! ```no_run
//! use offstage::{TransformOptions, TransformPool, TransformRequest};
//!
//! # async fn demo() {
//! let mut pool = TransformPool::new(4);
//! let request = TransformRequest::from_path("portrait.png")
//!     .to("thumbs/portrait.jpg")
//!     .with(TransformOptions {
//!         width: 400,
//!         quality: 80,
//!         ..TransformOptions::default()
//!     });
//! pool.submit(&request, |outcome| {
//!     if let Err(e) = outcome {
//!         eprintln!("transform failed: {e}");
//!     }
//! });
//! while pool.relay_next().await {}
//! # }
//! ```

// Module declarations in dependency order
pub mod logging;
pub mod imaging;
pub mod words;
pub mod geo;
pub mod ident;

// Public exports for external consumers
pub use imaging::{
    CompletionHandler, FilterKind, Source, TransformError, TransformOptions, TransformOutput,
    TransformPool, TransformRequest, TransformResult, resize_sync,
};
pub use logging::{LogChannel, LoggingError};
