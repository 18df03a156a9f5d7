//! # Splice Transform
//!
//! String-to-string transforms applied to clipboard content before it is
//! inserted into a document.
//!
//! ```text
//! text/html ──┬─ is_ms_word_content? ── clean_ms_word ──┐
//!             │                                         ├─ normalize_html ──→ markup
//!             └─────────────────────────────────────────┘
//! text/plain ─── promote_plain_text ────────────────────────────────────────→ markup
//! ```
//!
//! Every transform parses into a scratch [`splice_dom::Document`], rewrites
//! the tree and serializes it back, so the output is always well-formed.

mod error;
pub mod html;
pub mod ms_word;
pub mod plain;
pub mod style;

pub use error::{TransformError, TransformResult};
pub use html::{normalize_html, NormalizeOptions};
pub use ms_word::{clean_ms_word, is_ms_word_content};
pub use plain::promote_plain_text;
