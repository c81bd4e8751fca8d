// src/imaging/mod.rs

//! Image transform offload.
//!
//! Decode, optionally resize, optionally re-encode, then write to disk or
//! return the bytes, with the blocking work on a bounded pool and every
//! completion relayed back to the submitting thread.

mod error;
mod executor;
mod filter;
mod job;
mod pool;

pub use error::{TransformError, TransformResult};
pub use filter::FilterKind;
pub use job::{CompletionHandler, Source, TransformOptions, TransformOutput, TransformRequest};
pub use pool::{TransformPool, resize_sync};
