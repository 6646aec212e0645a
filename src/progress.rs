//! Progress-callback trait for pipeline stage events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::ToolConfigBuilder::progress_callback`] to be told when each
//! stage of a run starts, finishes, or fails. The CLI uses it to drive a
//! spinner; embedders can forward events to whatever UI they own.
//!
//! # Example
//!
//! ```rust
//! use edgequake_legaldoc::{PipelineProgressCallback, Stage, ToolConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     finished: AtomicUsize,
//! }
//!
//! impl PipelineProgressCallback for CountingCallback {
//!     fn on_stage_complete(&self, stage: Stage) {
//!         self.finished.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{stage} done");
//!     }
//! }
//!
//! let config = ToolConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { finished: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::sync::Arc;

/// A step of a pipeline run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Format decoding of a selected file.
    Decode,
    /// Character-limit check.
    SizeCheck,
    /// Instruction and response-shape construction.
    BuildRequest,
    /// The call to the generation service.
    Invoke,
    /// Parsing the model output.
    DecodeResponse,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Decode => "reading document",
            Stage::SizeCheck => "checking size",
            Stage::BuildRequest => "preparing request",
            Stage::Invoke => "waiting for the model",
            Stage::DecodeResponse => "reading response",
        })
    }
}

/// Called by the pipeline around each stage.
///
/// Implementations must be `Send + Sync`; decoding runs on the blocking pool
/// and sessions may be driven from several tasks. All methods default to no-ops.
pub trait PipelineProgressCallback: Send + Sync {
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    fn on_stage_complete(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage fails; the run stops after this.
    fn on_stage_error(&self, stage: Stage, error: &str) {
        let _ = (stage, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ToolConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;

/// Run `f` as `stage`, reporting start and completion or failure.
pub(crate) fn track<T, E: fmt::Display>(
    progress: Option<&ProgressCallback>,
    stage: Stage,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    if let Some(cb) = progress {
        cb.on_stage_start(stage);
    }
    let result = f();
    report(progress, stage, &result);
    result
}

pub(crate) fn report<T, E: fmt::Display>(
    progress: Option<&ProgressCallback>,
    stage: Stage,
    result: &Result<T, E>,
) {
    if let Some(cb) = progress {
        match result {
            Ok(_) => cb.on_stage_complete(stage),
            Err(e) => cb.on_stage_error(stage, &e.to_string()),
        }
    }
}
