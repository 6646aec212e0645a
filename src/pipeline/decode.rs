//! Format decoding: turn a [`Document`] into [`NormalizedText`].
//!
//! Dispatch is by the document's format tag, which was fixed from the filename
//! extension when the document was created. Unsupported extensions therefore
//! never reach a collaborator.
//!
//! PDF pages are joined with `\n` in page order so line-oriented consumers
//! (the comparison tool) see page boundaries as line boundaries.

use crate::error::LegalDocError;
use crate::pipeline::collaborators::Collaborators;
use crate::pipeline::input::{Document, DocumentFormat, NormalizedText};
use std::sync::Arc;
use tracing::{debug, info, warn};

const UTF8_BOM: char = '\u{FEFF}';

/// Decodes documents using the collaborators of a [`Collaborators`] registry.
#[derive(Debug, Clone)]
pub struct FormatDecoder {
    collaborators: Arc<Collaborators>,
}

impl Default for FormatDecoder {
    fn default() -> Self {
        Self::new(Collaborators::global())
    }
}

impl FormatDecoder {
    pub fn new(collaborators: Arc<Collaborators>) -> Self {
        Self { collaborators }
    }

    /// Create the document and decode it in one step.
    pub async fn decode_file(
        &self,
        filename: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Result<NormalizedText, LegalDocError> {
        let document = Document::new(filename, bytes)?;
        self.decode(&document).await
    }

    /// Decode a document into text.
    ///
    /// PDF and word-archive extraction are blocking library calls and run
    /// on the blocking thread pool.
    pub async fn decode(&self, document: &Document) -> Result<NormalizedText, LegalDocError> {
        let filename = document.filename().to_string();
        debug!("Decoding '{}' as {}", filename, document.format());

        let text = match document.format() {
            DocumentFormat::Plain => decode_plain(&filename, document.bytes()),
            DocumentFormat::PdfPages => {
                let pdf = self
                    .collaborators
                    .pdf()
                    .ok_or_else(|| LegalDocError::library_not_loaded(&filename))?;
                let bytes = document.shared_bytes();
                let pages = run_blocking(&filename, move || pdf.page_texts(&bytes)).await?;
                debug!("'{}': {} pages", filename, pages.len());
                pages.join("\n")
            }
            DocumentFormat::WordArchive => {
                let archive = self
                    .collaborators
                    .archive()
                    .ok_or_else(|| LegalDocError::library_not_loaded(&filename))?;
                let bytes = document.shared_bytes();
                run_blocking(&filename, move || archive.raw_text(&bytes)).await?
            }
        };

        let text = NormalizedText::new(text);
        info!("Decoded '{}': {} characters", filename, text.char_len());
        Ok(text)
    }
}

/// Plain text is read as UTF-8. Invalid sequences are replaced rather than
/// rejected; a leading byte-order mark is dropped.
fn decode_plain(filename: &str, bytes: &[u8]) -> String {
    let text = match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(e) => {
            warn!(
                "'{}' is not valid UTF-8 (first bad byte at {}); replacing invalid sequences",
                filename,
                e.valid_up_to()
            );
            String::from_utf8_lossy(bytes).into_owned()
        }
    };
    match text.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

async fn run_blocking<T, F>(filename: &str, f: F) -> Result<T, LegalDocError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, String> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| LegalDocError::Internal(format!("decode task panicked: {e}")))?
        .map_err(|detail| LegalDocError::DecodeFailure {
            filename: filename.to_string(),
            detail,
        })
}
