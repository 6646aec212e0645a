//! Size guard: reject text that is too long for a single service request.
//!
//! Length is measured in characters of the decoded text, not file bytes.

use crate::error::LegalDocError;
use crate::pipeline::input::NormalizedText;
use tracing::warn;

/// Upper bound on characters per input text sent to the generation service.
pub const MAX_INPUT_CHARS: usize = 100_000;

/// Succeeds iff `text` has at most `limit` characters.
pub fn check(text: &NormalizedText, limit: usize) -> Result<(), LegalDocError> {
    let length = text.char_len();
    if length > limit {
        warn!("Input rejected: {} characters exceeds limit {}", length, limit);
        return Err(LegalDocError::TooLarge { length, limit });
    }
    Ok(())
}

/// Check several texts independently and report a single error.
///
/// When more than one text is over the limit, the longest one is reported.
pub fn check_each<'a>(
    texts: impl IntoIterator<Item = &'a NormalizedText>,
    limit: usize,
) -> Result<(), LegalDocError> {
    let longest_over = texts
        .into_iter()
        .map(NormalizedText::char_len)
        .filter(|&len| len > limit)
        .max();

    match longest_over {
        Some(length) => {
            warn!("Input rejected: {} characters exceeds limit {}", length, limit);
            Err(LegalDocError::TooLarge { length, limit })
        }
        None => Ok(()),
    }
}
