//! Input documents: raw bytes plus a format tag chosen from the filename.
//!
//! The format is decided strictly by extension, before any byte is looked at.
//! A `Document` can only be constructed for a supported extension, so every
//! later stage can match exhaustively on [`DocumentFormat`].

use crate::error::LegalDocError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Declared format of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentFormat {
    /// `.txt`: bytes are UTF-8 text.
    Plain,
    /// `.pdf`: text is extracted page by page.
    PdfPages,
    /// `.docx`: raw text is extracted from the word-processor archive.
    WordArchive,
}

impl DocumentFormat {
    /// Pick the format from the filename extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Result<Self, LegalDocError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "txt" => Ok(DocumentFormat::Plain),
            "pdf" => Ok(DocumentFormat::PdfPages),
            "docx" => Ok(DocumentFormat::WordArchive),
            _ => Err(LegalDocError::UnsupportedFormat {
                filename: filename.to_string(),
                extension: if extension.is_empty() {
                    "(none)".to_string()
                } else {
                    format!(".{extension}")
                },
            }),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentFormat::Plain => "plain",
            DocumentFormat::PdfPages => "pdf-pages",
            DocumentFormat::WordArchive => "word-archive",
        })
    }
}

/// An uploaded file: immutable bytes, a filename, and its format.
///
/// Bytes are reference-counted so decoding can move a handle onto a blocking
/// thread without copying the buffer.
#[derive(Debug, Clone)]
pub struct Document {
    filename: String,
    format: DocumentFormat,
    bytes: Arc<[u8]>,
}

impl Document {
    /// Create a document, rejecting unsupported extensions.
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Result<Self, LegalDocError> {
        let filename = filename.into();
        let format = DocumentFormat::from_filename(&filename)?;
        let bytes: Vec<u8> = bytes.into();
        Ok(Self {
            filename,
            format,
            bytes: Arc::from(bytes),
        })
    }

    /// Read a document from disk.
    ///
    /// The extension is checked first so an unsupported file is rejected
    /// without being read.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, LegalDocError> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        DocumentFormat::from_filename(&filename)?;

        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LegalDocError::FileNotFound {
                path: PathBuf::from(path),
            },
            std::io::ErrorKind::PermissionDenied => LegalDocError::PermissionDenied {
                path: PathBuf::from(path),
            },
            _ => LegalDocError::DecodeFailure {
                filename: filename.clone(),
                detail: e.to_string(),
            },
        })?;

        debug!("Read {} ({} bytes)", path.display(), bytes.len());
        Self::new(filename, bytes)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }
}

/// The decoded text of a document (or text pasted by the user).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, the quantity the size guard measures.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    /// True when the text has no non-whitespace content.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for NormalizedText {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NormalizedText {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(DocumentFormat::from_filename("a.txt").unwrap(), DocumentFormat::Plain);
        assert_eq!(DocumentFormat::from_filename("A.PDF").unwrap(), DocumentFormat::PdfPages);
        assert_eq!(
            DocumentFormat::from_filename("draft.v2.docx").unwrap(),
            DocumentFormat::WordArchive
        );
    }

    #[test]
    fn unsupported_extensions_rejected() {
        for name in ["contract.doc", "notes.md", "scan.png", "README"] {
            let err = DocumentFormat::from_filename(name).unwrap_err();
            assert!(
                matches!(err, LegalDocError::UnsupportedFormat { .. }),
                "{name}: {err:?}"
            );
        }
    }

    #[test]
    fn missing_extension_reported_as_none() {
        match DocumentFormat::from_filename("Makefile") {
            Err(LegalDocError::UnsupportedFormat { extension, .. }) => assert_eq!(extension, "(none)"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn char_len_counts_characters_not_bytes() {
        let t = NormalizedText::new("§§§");
        assert_eq!(t.char_len(), 3);
        assert_eq!(t.as_str().len(), 6);
    }

    #[test]
    fn blank_detection() {
        assert!(NormalizedText::new("  \n\t").is_blank());
        assert!(!NormalizedText::new(" x ").is_blank());
    }

    #[tokio::test]
    async fn from_path_missing_file() {
        let err = Document::from_path("/definitely/not/here.txt").await.unwrap_err();
        assert!(matches!(err, LegalDocError::FileNotFound { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn from_path_rejects_extension_before_reading() {
        // The file does not exist; the extension check must fire first.
        let err = Document::from_path("/definitely/not/here.xlsx").await.unwrap_err();
        assert!(matches!(err, LegalDocError::UnsupportedFormat { .. }), "{err:?}");
    }
}
