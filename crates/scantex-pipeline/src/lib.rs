//! Scan-to-textured-mesh conversion pipeline.
//!
//! Drives external mesh tools over the filesystem: decimate and repair
//! the scan, unwrap UVs, bake the scan's color onto a texture, and
//! convert to the requested output format; per item or across a whole
//! directory. Intermediate artifacts are cleaned up on every exit
//! path.

pub mod batch;
mod commands;
pub mod error;
pub mod job;
pub mod metrics;
pub mod processor;

pub use batch::{BatchSummary, CompletedItem, FailedItem, run_batch};
pub use error::PipelineError;
pub use job::{Job, JobOutcome, JobPaths, MeshFormat};
pub use processor::PipelineProcessor;
