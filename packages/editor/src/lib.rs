//! # Splice Editor
//!
//! Paste handling for editable documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ clipboard: MIME payload of a paste event    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ extract: pick html or plain text            │
//! │  - Word markup → clean_ms_word              │
//! │  - html → normalize_html                    │
//! │  - plain text → promote_plain_text          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ insertion: markup → live document           │
//! │  - Remove the selection                     │
//! │  - Split ancestors until nesting is legal   │
//! │  - Reconcile the trailing edge              │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ undo_stack: journaled batch per paste       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Content model decides legality**: the engine never hardcodes tags,
//!    it asks a [`ContentModel`]
//! 2. **Boundaries stay valid**: every returned boundary names an attached
//!    node and an in-range offset
//! 3. **All or nothing per paste**: a failed paste is reverted by its undo
//!    scope
//!
//! ## Usage
//!
//! ```rust,ignore
//! use splice_editor::{EditSession, EditorEvent, MimePayload};
//!
//! let mut session = EditSession::new("client-1", document);
//! session.set_selection(Some(caret));
//!
//! let event = EditorEvent::paste(host, MimePayload::html("<p>Hello</p>"));
//! let event = session.handle_paste(event)?;
//!
//! // event.range spans the pasted content
//! session.undo()?;
//! ```

mod clipboard;
mod config;
mod content;
mod editing;
mod errors;
mod event;
mod extract;
mod insertion;
mod session;
mod tree_ops;
mod undo_stack;

pub use clipboard::{ClipboardData, MimePayload, MIME_HTML, MIME_PLAIN};
pub use config::{PasteConfig, DEFAULT_CONFIG_NAME};
pub use content::{ContentModel, HtmlContentModel, GROUP_CONTAINERS};
pub use editing::remove;
pub use errors::{ConfigError, PasteError};
pub use event::{EditorEvent, EventKind};
pub use extract::extract_content;
pub use insertion::insert;
pub use session::EditSession;
pub use tree_ops::{insert_at, split};
pub use undo_stack::{ChangeBatch, UndoStack};

// Re-export dependencies for convenience
pub use splice_dom::{Boundary, Document, NodeId, Range};
pub use splice_markup::ParseOptions;
pub use splice_transform::NormalizeOptions;
