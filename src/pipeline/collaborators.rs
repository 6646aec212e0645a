//! External decoding collaborators and their process-wide ready gate.
//!
//! PDF and word-archive decoding are delegated to libraries that must be
//! loaded once before the first decode. [`Collaborators`] owns that lifecycle:
//! each slot is a `OnceLock` that is either empty ("not loaded") or holds the
//! installed collaborator forever. The format decoder asks the registry for a
//! collaborator on every call and fails with `DecodeFailure("library not
//! loaded")` when the slot is still empty.
//!
//! ```text
//!  not loaded ──install/load──▶ ready   (one-way, first install wins)
//! ```

use crate::config::ToolConfig;
use crate::error::LegalDocError;
use crate::pipeline::{docx::DocxTextExtractor, pdf::PdfiumTextExtractor};
use once_cell::sync::Lazy;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

/// Page-indexed text extraction from a binary PDF buffer.
pub trait PageTextExtractor: Send + Sync {
    /// Return the text of every page, in page order.
    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<String>, String>;
}

/// Raw-text extraction from a word-processor archive buffer.
pub trait ArchiveTextExtractor: Send + Sync {
    fn raw_text(&self, bytes: &[u8]) -> Result<String, String>;
}

/// Registry of loaded decoding collaborators.
#[derive(Default)]
pub struct Collaborators {
    pdf: OnceLock<Arc<dyn PageTextExtractor>>,
    archive: OnceLock<Arc<dyn ArchiveTextExtractor>>,
}

static GLOBAL: Lazy<Arc<Collaborators>> = Lazy::new(|| Arc::new(Collaborators::new()));

impl Collaborators {
    /// An empty registry: nothing is loaded yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry shared by every session.
    pub fn global() -> Arc<Collaborators> {
        Arc::clone(&GLOBAL)
    }

    /// Load the real collaborators: bind pdfium and install the docx reader.
    ///
    /// Binding pdfium loads a shared library, so it runs on a blocking thread.
    /// A pdfium failure is returned but the archive reader is still installed,
    /// leaving `.txt` and `.docx` decoding usable.
    pub async fn load(&self, config: &ToolConfig) -> Result<(), LegalDocError> {
        self.install_archive(Arc::new(DocxTextExtractor));

        if self.pdf.get().is_some() {
            return Ok(());
        }

        let lib_path = config.pdfium_lib_path.clone();
        let bound = tokio::task::spawn_blocking(move || PdfiumTextExtractor::bind(lib_path.as_deref()))
            .await
            .map_err(|e| LegalDocError::Internal(format!("pdfium bind task panicked: {e}")))?;

        match bound {
            Ok(extractor) => {
                self.install_pdf(Arc::new(extractor));
                info!("Decoding collaborators ready");
                Ok(())
            }
            Err(e) => {
                warn!("PDF decoding unavailable: {}", e);
                Err(e)
            }
        }
    }

    /// Install a PDF collaborator. Returns `false` if one was already installed.
    pub fn install_pdf(&self, extractor: Arc<dyn PageTextExtractor>) -> bool {
        self.pdf.set(extractor).is_ok()
    }

    /// Install a word-archive collaborator. Returns `false` if one was already installed.
    pub fn install_archive(&self, extractor: Arc<dyn ArchiveTextExtractor>) -> bool {
        self.archive.set(extractor).is_ok()
    }

    pub fn pdf(&self) -> Option<Arc<dyn PageTextExtractor>> {
        self.pdf.get().cloned()
    }

    pub fn archive(&self) -> Option<Arc<dyn ArchiveTextExtractor>> {
        self.archive.get().cloned()
    }

    /// True once both collaborators are installed.
    pub fn is_ready(&self) -> bool {
        self.pdf.get().is_some() && self.archive.get().is_some()
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("pdf", &self.pdf.get().map(|_| "<loaded>"))
            .field("archive", &self.archive.get().map(|_| "<loaded>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPages;

    impl PageTextExtractor for FixedPages {
        fn page_texts(&self, _bytes: &[u8]) -> Result<Vec<String>, String> {
            Ok(vec!["one".into()])
        }
    }

    #[test]
    fn new_registry_is_not_ready() {
        let c = Collaborators::new();
        assert!(!c.is_ready());
        assert!(c.pdf().is_none());
        assert!(c.archive().is_none());
    }

    #[test]
    fn first_install_wins() {
        let c = Collaborators::new();
        assert!(c.install_pdf(Arc::new(FixedPages)));
        assert!(!c.install_pdf(Arc::new(FixedPages)));
        assert!(c.pdf().is_some());
        assert!(!c.is_ready(), "archive still missing");
        c.install_archive(Arc::new(DocxTextExtractor));
        assert!(c.is_ready());
    }
}
