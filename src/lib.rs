//! # edgequake-legaldoc
//!
//! Contract analysis with a generative model: extract clauses, compare two
//! versions, or draft a new agreement from a template.
//!
//! ## Pipeline Overview
//!
//! ```text
//! .txt / .pdf / .docx
//!  │
//!  ├─ 1. Decode    bytes → text (pdfium / zip+XML on the blocking pool)
//!  ├─ 2. Guard     ≤ 100,000 characters per input
//!  ├─ 3. Build     mode-specific instruction (+ JSON schema for extraction)
//!  ├─ 4. Invoke    one POST to Gemini generateContent, no retries
//!  ├─ 5. Decode    strict clause JSON / diff lines / draft text
//!  └─ 6. Present   result, "nothing found", or a short error banner
//! ```
//!
//! Each tool is driven by a [`SessionController`], which owns the tool's
//! inputs and last result and discards completions superseded by a newer
//! action.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_legaldoc::{Collaborators, InputSlot, Presentation, SessionController, Tool, ToolConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ToolConfig::builder()
//!         .api_key(std::env::var("GEMINI_API_KEY")?)
//!         .build()?;
//!     Collaborators::global().load(&config).await?;
//!
//!     let session = SessionController::new(Tool::ClauseExtractor, &config)?;
//!     session.select_path(InputSlot::Primary, "nda.pdf").await?;
//!     session.submit().await?;
//!
//!     if let Presentation::Clauses(result) = session.presentation() {
//!         for clause in &result.clauses {
//!             println!("{}: {}", clause.clause_type, clause.summary);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `legaldoc` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-legaldoc = { version = "0.1", default-features = false }
//! ```
//!
//! PDF decoding needs a pdfium shared library at runtime. Point
//! [`ToolConfig::pdfium_lib_path`] at it, or install it on the system
//! library path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod execute;
pub mod output;
pub mod pipeline;
pub mod present;
pub mod progress;
pub mod prompts;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ToolConfig, ToolConfigBuilder};
pub use error::LegalDocError;
pub use execute::execute;
pub use output::{
    Clause, ComparisonResult, DiffKind, DiffLine, ExtractionResult, GenerationResult,
    OperationResult,
};
pub use pipeline::collaborators::{ArchiveTextExtractor, Collaborators, PageTextExtractor};
pub use pipeline::decode::FormatDecoder;
pub use pipeline::guard::MAX_INPUT_CHARS;
pub use pipeline::input::{Document, DocumentFormat, NormalizedText};
pub use pipeline::request::{ModelRequest, OperationRequest, ResponseShape, TemplateKind};
pub use pipeline::transport::{GeminiClient, GenerationService};
pub use present::Presentation;
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback, Stage};
pub use session::{InputSlot, SessionController, SessionSnapshot, SessionState, SlotSnapshot, Tool};
