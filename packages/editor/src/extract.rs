//! # Content Extraction
//!
//! Picks the richest clipboard format and runs its transform pipeline.
//!
//! | format       | pipeline                                              |
//! |--------------|-------------------------------------------------------|
//! | `text/html`  | [`clean_ms_word`] when Word markup, then [`normalize_html`] |
//! | `text/plain` | [`promote_plain_text`]                                |
//! | neither      | empty string                                          |

use crate::clipboard::{ClipboardData, MIME_HTML, MIME_PLAIN};
use crate::PasteError;
use splice_transform::{
    clean_ms_word, is_ms_word_content, normalize_html, promote_plain_text, NormalizeOptions,
};
use tracing::{debug, instrument};

/// Insertable markup for a clipboard payload
///
/// An empty or unrecognized payload yields an empty string, never an error.
#[instrument(skip_all)]
pub fn extract_content(
    payload: &dyn ClipboardData,
    options: &NormalizeOptions,
) -> Result<String, PasteError> {
    if payload.holds(MIME_HTML) {
        let content = payload.get_data(MIME_HTML).unwrap_or_default();
        if is_ms_word_content(&content) {
            debug!(bytes = content.len(), "extracting word-processor html");
            let cleaned = clean_ms_word(&content, &options.parse)?;
            return Ok(normalize_html(&cleaned, options)?);
        }
        debug!(bytes = content.len(), "extracting html");
        return Ok(normalize_html(&content, options)?);
    }

    if payload.holds(MIME_PLAIN) {
        let text = payload.get_data(MIME_PLAIN).unwrap_or_default();
        debug!(bytes = text.len(), "extracting plain text");
        return Ok(promote_plain_text(&text));
    }

    Ok(String::new())
}
