//! PDF page-text extraction via pdfium.
//!
//! `pdfium-render` wraps the pdfium C++ library. It is bound once per process
//! (see [`crate::pipeline::collaborators`]) and every extraction is a blocking
//! call, so the format decoder runs it under `spawn_blocking`.

use crate::error::LegalDocError;
use crate::pipeline::collaborators::PageTextExtractor;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// A bound pdfium library.
pub struct PdfiumTextExtractor {
    pdfium: Pdfium,
}

impl PdfiumTextExtractor {
    /// Bind pdfium from `lib_path` if given, else from the system library search path.
    pub fn bind(lib_path: Option<&Path>) -> Result<Self, LegalDocError> {
        let bindings = match lib_path {
            Some(path) => Pdfium::bind_to_library(path),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| LegalDocError::DecodeFailure {
            filename: "libpdfium".to_string(),
            detail: format!("failed to bind pdfium: {e:?}"),
        })?;

        info!(
            "Bound pdfium from {}",
            lib_path
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "system library path".to_string())
        );

        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl PageTextExtractor for PdfiumTextExtractor {
    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<String>, String> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| {
                let err_str = format!("{e:?}");
                if err_str.contains("Password") || err_str.contains("password") {
                    "PDF is encrypted and requires a password".to_string()
                } else {
                    format!("PDF is corrupt: {err_str}")
                }
            })?;

        let pages = document.pages();
        let mut texts = Vec::with_capacity(pages.len() as usize);

        for (idx, page) in pages.iter().enumerate() {
            let text = page
                .text()
                .map_err(|e| format!("text extraction failed for page {}: {e:?}", idx + 1))?;
            let content = text.all();
            debug!("Page {}: {} chars", idx + 1, content.chars().count());
            texts.push(content);
        }

        Ok(texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shareable<T: Send + Sync + 'static>() {}

    #[test]
    fn extractor_can_live_in_the_process_registry() {
        shareable::<PdfiumTextExtractor>();
        shareable::<std::sync::Arc<dyn PageTextExtractor>>();
    }
}
