//! Raw-text extraction from `.docx` word-processor archives.
//!
//! A `.docx` file is a zip archive; the body lives in `word/document.xml` as
//! WordprocessingML. Raw text is the concatenation of every `<w:t>` run,
//! with tabs and breaks kept and one blank line after each paragraph.
//! Formatting, numbering, headers and footers are ignored.

use crate::pipeline::collaborators::ArchiveTextExtractor;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// zip + quick-xml backed archive reader.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxTextExtractor;

impl ArchiveTextExtractor for DocxTextExtractor {
    fn raw_text(&self, bytes: &[u8]) -> Result<String, String> {
        let xml = read_document_part(bytes)?;
        paragraphs_to_text(&xml)
    }
}

fn read_document_part(bytes: &[u8]) -> Result<String, String> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| format!("not a word archive: {e}"))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|_| format!("archive has no {DOCUMENT_PART}"))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| format!("failed to read {DOCUMENT_PART}: {e}"))?;
    Ok(xml)
}

/// Walk the WordprocessingML body and collect paragraph text.
///
/// Whitespace is significant inside `<w:t xml:space="preserve">`, so the
/// reader must not trim text events.
///
/// Paragraphs nest (a text box `<w:txbxContent>` holds its own `<w:p>`
/// inside a run of the outer paragraph), so open paragraphs are kept on a
/// stack. An inner paragraph is emitted when it closes, before the rest of
/// its enclosing paragraph.
fn paragraphs_to_text(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);

    let mut buf = Vec::new();
    let mut out = String::new();
    let mut open: Vec<String> = Vec::new();
    let mut in_text = false;
    let mut in_props = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"p" => open.push(String::new()),
                b"pPr" => in_props = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                // <w:tab/> inside <w:pPr><w:tabs> is a tab stop, not a character
                b"tab" if !in_props => current(&mut open, &mut out).push('\t'),
                b"br" | b"cr" => current(&mut open, &mut out).push('\n'),
                b"p" => out.push_str("\n\n"),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e.unescape().map_err(|e| format!("bad XML text: {e}"))?;
                current(&mut open, &mut out).push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"pPr" => in_props = false,
                b"p" => {
                    if let Some(paragraph) = open.pop() {
                        out.push_str(&paragraph);
                        out.push_str("\n\n");
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "malformed {DOCUMENT_PART} at byte {}: {e}",
                    reader.buffer_position()
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    // keep text of paragraphs the document never closed
    for paragraph in open {
        out.push_str(&paragraph);
        out.push_str("\n\n");
    }
    Ok(out.trim_end().to_string())
}

/// Buffer of the innermost open paragraph, or the output itself for text
/// outside any paragraph.
fn current<'a>(open: &'a mut [String], out: &'a mut String) -> &'a mut String {
    match open.last_mut() {
        Some(paragraph) => paragraph,
        None => out,
    }
}
