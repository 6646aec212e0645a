//! Error types for the edgequake-legaldoc library.
//!
//! Every failure of a pipeline run is a [`LegalDocError`]. All variants are
//! terminal for the current run: nothing is retried automatically, and there is
//! no partial success (an extraction either yields every clause or an error).
//!
//! The variants map onto pipeline stages:
//!
//! | Stage | Variants |
//! |-------|----------|
//! | Input | `FileNotFound`, `PermissionDenied`, `UnsupportedFormat`, `MissingInput` |
//! | Format decode | `DecodeFailure` |
//! | Size guard | `TooLarge` |
//! | Transport | `TransportError`, `NetworkError` |
//! | Response decode | `MalformedResponse`, `EmptyResponse` |
//!
//! The error is `Clone` because the session controller keeps the last failure
//! in its state record for the presentation layer to read.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-legaldoc library.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LegalDocError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The filename extension is not one of `.txt`, `.pdf`, `.docx`.
    #[error("Unsupported file type '{extension}' for '{filename}'\nSupported: .txt, .pdf, .docx")]
    UnsupportedFormat { filename: String, extension: String },

    /// A required input was absent or blank at submit time.
    #[error("Missing input: {what}")]
    MissingInput { what: String },

    // ── Decode errors ─────────────────────────────────────────────────────
    /// The document could not be turned into text.
    #[error("Failed to read '{filename}': {detail}")]
    DecodeFailure { filename: String, detail: String },

    // ── Size guard ────────────────────────────────────────────────────────
    /// Decoded text exceeds the per-request character limit.
    #[error("Document is too large: {length} characters (limit {limit})")]
    TooLarge { length: usize, limit: usize },

    // ── Transport errors ──────────────────────────────────────────────────
    /// The generation endpoint answered with a non-success HTTP status.
    #[error("Generation service returned HTTP {status}: {message}")]
    TransportError { status: u16, message: String },

    /// The exchange could not complete, or the envelope carried no output.
    #[error("Network error: {0}")]
    NetworkError(String),

    // ── Response errors ───────────────────────────────────────────────────
    /// The model output did not match the expected shape.
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// The model output resolved to an empty string.
    #[error("The model returned an empty response")]
    EmptyResponse,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LegalDocError {
    /// Shorthand for the decode failure raised when a collaborator is not ready.
    pub fn library_not_loaded(filename: impl Into<String>) -> Self {
        LegalDocError::DecodeFailure {
            filename: filename.into(),
            detail: "library not loaded".to_string(),
        }
    }

    /// HTTP status for transport failures, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            LegalDocError::TransportError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short, user-facing banner text for this error.
    ///
    /// `action` is the verb phrase of the running tool, e.g. "extract clauses".
    ///
    /// Input problems are reported directly; service and response failures
    /// get the tool-specific "try again" wording.
    pub fn user_message(&self, action: &str) -> String {
        match self {
            LegalDocError::FileNotFound { .. } | LegalDocError::PermissionDenied { .. } => {
                "The selected file could not be opened.".to_string()
            }
            LegalDocError::UnsupportedFormat { .. } => {
                "Unsupported file type. Please upload a .txt, .pdf, or .docx file.".to_string()
            }
            LegalDocError::MissingInput { what } => format!("Please provide {what}."),
            LegalDocError::DecodeFailure { detail, .. } => {
                format!("The file could not be read ({detail}).")
            }
            LegalDocError::TooLarge { limit, .. } => format!(
                "The document is too large. Please use a document under {limit} characters."
            ),
            LegalDocError::TransportError { .. }
            | LegalDocError::NetworkError(_)
            | LegalDocError::MalformedResponse(_)
            | LegalDocError::EmptyResponse => format!(
                "Failed to {}. The AI model might be busy or the input is invalid. Please try again.",
                action
            ),
            LegalDocError::InvalidConfig(_) | LegalDocError::Internal(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}
