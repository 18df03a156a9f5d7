//! # Edit Session
//!
//! Owns one editable document together with its selection, content model,
//! undo history and configuration, and turns paste events into undoable
//! insertions.
//!
//! ```text
//! EditorEvent (paste) ──→ handle_paste
//!                           ├─ editing host attached?        no → pass through
//!                           ├─ prevent default
//!                           ├─ insertion range resolvable?   no → pass through
//!                           ├─ extract_content               empty → pass through
//!                           └─ undo capture "paste" { insert }
//!                                 └─→ event.range = inserted range
//! ```

use crate::config::PasteConfig;
use crate::content::{ContentModel, HtmlContentModel};
use crate::event::EditorEvent;
use crate::extract::extract_content;
use crate::insertion::insert;
use crate::undo_stack::UndoStack;
use crate::PasteError;
use splice_dom::{Document, DomResult, NodeId, Range};
use tracing::{debug, info, warn};

/// Single editing session over one document
///
/// Every paste allocates arena slots for the parsed fragment and for the
/// halves of split ancestors. Undo only detaches them, so
/// [`Document::node_count`] grows for the lifetime of the session. To
/// reclaim them, serialize the document and start a new session from the
/// re-parsed markup (the undo history does not carry over).
pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    /// Document being edited
    pub document: Document,

    /// Current selection, used when an event carries no range; collapsed
    /// after the pasted content once a paste succeeds
    pub selection: Option<Range>,

    model: Box<dyn ContentModel>,
    undo_stack: UndoStack,
    config: PasteConfig,
}

impl EditSession {
    /// Create new edit session with the default config and HTML content model
    pub fn new(id: impl Into<String>, document: Document) -> Self {
        Self::with_config(id, document, PasteConfig::default())
    }

    pub fn with_config(id: impl Into<String>, document: Document, config: PasteConfig) -> Self {
        Self {
            id: id.into(),
            document,
            selection: None,
            model: Box::new(HtmlContentModel::new()),
            undo_stack: UndoStack::with_max_levels(config.undo_levels),
            config,
        }
    }

    /// Replace the content model consulted by insertion
    pub fn with_model(mut self, model: impl ContentModel + 'static) -> Self {
        self.model = Box::new(model);
        self
    }

    /// Update selection
    pub fn set_selection(&mut self, range: Option<Range>) {
        self.selection = range;
    }

    pub fn config(&self) -> &PasteConfig {
        &self.config
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo_stack
    }

    /// Handle an editor event, pasting its clipboard content when it is a
    /// paste
    ///
    /// Events that are not pastes, target no editing host, have no usable
    /// range or carry nothing insertable are returned without touching the
    /// document. On success the returned event's `range` spans the
    /// inserted content. A failed paste leaves the document unchanged.
    pub fn handle_paste(&mut self, mut event: EditorEvent) -> Result<EditorEvent, PasteError> {
        if !event.is_paste() {
            return Ok(event);
        }

        match self.paste(&mut event) {
            Ok(()) => Ok(event),
            Err(err) if err.is_skip() => {
                debug!(session = %self.id, reason = %err, "paste skipped");
                Ok(event)
            }
            Err(err) => {
                warn!(session = %self.id, error = %err, "paste failed");
                Err(err)
            }
        }
    }

    fn paste(&mut self, event: &mut EditorEvent) -> Result<(), PasteError> {
        let host = event
            .editable
            .filter(|host| {
                self.document.is_attached(*host) && self.model.is_editing_host(&self.document, *host)
            })
            .ok_or(PasteError::NoEditableTarget)?;

        event.prevent_default();

        let range = self
            .resolve_range(host, event.range.or(self.selection))
            .ok_or(PasteError::NoInsertionPoint)?;

        let markup = match &event.clipboard {
            Some(clipboard) => extract_content(clipboard, &self.config.normalize_options())?,
            None => String::new(),
        };
        if markup.is_empty() {
            return Err(PasteError::EmptyContent);
        }

        let model = self.model.as_ref();
        let parse = &self.config.parse;
        let (start, end) = self.undo_stack.capture(&mut self.document, "paste", |doc| {
            insert(doc, model, range.start, range.end, &markup, parse)
        })?;

        info!(session = %self.id, bytes = markup.len(), "pasted content");
        event.range = Some(Range::new(start, end));
        self.selection = Some(Range::collapsed(end));
        Ok(())
    }

    /// A range whose boundaries are valid and inside `host`
    fn resolve_range(&self, host: NodeId, range: Option<Range>) -> Option<Range> {
        let range = range?;
        let usable = [range.start, range.end].iter().all(|boundary| {
            self.document.is_valid_boundary(*boundary)
                && self.document.contains(host, boundary.container)
        });
        usable.then_some(range)
    }

    /// Undo the most recent paste
    pub fn undo(&mut self) -> DomResult<bool> {
        let undone = self.undo_stack.undo(&mut self.document)?;
        if undone {
            self.selection = None;
        }
        Ok(undone)
    }

    /// Redo the most recently undone paste
    pub fn redo(&mut self) -> DomResult<bool> {
        let redone = self.undo_stack.redo(&mut self.document)?;
        if redone {
            self.selection = None;
        }
        Ok(redone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MimePayload;
    use crate::event::EventKind;
    use splice_dom::Boundary;
    use splice_markup::{parse_document, serialize_document};

    fn session(source: &str) -> (EditSession, NodeId) {
        let doc = parse_document(source).unwrap();
        let host = doc.first_child(doc.root()).unwrap();
        (EditSession::new("client-1", doc), host)
    }

    fn caret_in_first_text(session: &EditSession, host: NodeId, offset: usize) -> Range {
        let doc = &session.document;
        let mut node = host;
        while !doc.is_text(node) {
            node = doc.first_child(node).unwrap();
        }
        Range::collapsed(Boundary::new(node, offset))
    }

    #[test]
    fn test_session_creation() {
        let (session, _) = session("<div contenteditable=\"true\">a</div>");
        assert_eq!(session.id, "client-1");
        assert_eq!(session.selection, None);
        assert_eq!(session.config().undo_levels, 100);
        assert!(!session.undo_stack().can_undo());
    }

    #[test]
    fn test_non_paste_event_passes_through() {
        let (mut session, host) = session("<div contenteditable=\"true\">a</div>");
        let event = EditorEvent::new(EventKind::Keydown).with_editable(host);

        let result = session.handle_paste(event.clone()).unwrap();
        assert_eq!(result, event);
    }

    #[test]
    fn test_paste_plain_text() {
        let (mut session, host) = session("<div contenteditable=\"true\"><p>abcd</p></div>");
        let caret = caret_in_first_text(&session, host, 2);
        let event = EditorEvent::paste(host, MimePayload::plain("XY")).with_range(caret);

        let result = session.handle_paste(event).unwrap();

        assert!(result.default_prevented);
        assert_eq!(
            serialize_document(&session.document),
            "<div contenteditable=\"true\"><p>abXYcd</p></div>"
        );
        let range = result.range.unwrap();
        assert!(session.document.is_valid_boundary(range.start));
        assert!(session.document.is_valid_boundary(range.end));
        assert_eq!(session.selection, Some(Range::collapsed(range.end)));
        assert_eq!(session.undo_stack().undo_description(), Some("paste"));
    }

    #[test]
    fn test_paste_uses_session_selection() {
        let (mut session, host) = session("<div contenteditable=\"true\"><p>ab</p></div>");
        let caret = caret_in_first_text(&session, host, 2);
        session.set_selection(Some(caret));

        session
            .handle_paste(EditorEvent::paste(host, MimePayload::html("c<b>d</b>")))
            .unwrap();

        assert_eq!(
            serialize_document(&session.document),
            "<div contenteditable=\"true\"><p>abc<b>d</b></p></div>"
        );
    }

    #[test]
    fn test_non_host_target_is_skipped() {
        let (mut session, host) = session("<div contenteditable=\"true\"><p>ab</p></div>");
        let p = session.document.first_child(host).unwrap();
        let caret = caret_in_first_text(&session, host, 1);
        let event = EditorEvent::paste(p, MimePayload::plain("x")).with_range(caret);

        let result = session.handle_paste(event).unwrap();

        assert!(!result.default_prevented);
        assert_eq!(
            serialize_document(&session.document),
            "<div contenteditable=\"true\"><p>ab</p></div>"
        );
    }

    #[test]
    fn test_missing_range_is_skipped_but_prevented() {
        let (mut session, host) = session("<div contenteditable=\"true\">ab</div>");
        let result = session
            .handle_paste(EditorEvent::paste(host, MimePayload::plain("x")))
            .unwrap();

        assert!(result.default_prevented);
        assert_eq!(result.range, None);
        assert!(!session.undo_stack().can_undo());
    }

    #[test]
    fn test_range_outside_host_is_skipped() {
        let (mut session, host) =
            session("<div contenteditable=\"true\">ab</div><p>outside</p>");
        let outside = session.document.child(session.document.root(), 1).unwrap();
        let event = EditorEvent::paste(host, MimePayload::plain("x"))
            .with_range(Range::collapsed(Boundary::new(outside, 0)));

        let result = session.handle_paste(event).unwrap();
        assert_eq!(result.range, Some(Range::collapsed(Boundary::new(outside, 0))));
        assert_eq!(session.document.text_content(outside), "outside");
    }

    #[test]
    fn test_empty_clipboard_is_skipped() {
        let (mut session, host) = session("<div contenteditable=\"true\">ab</div>");
        let caret = caret_in_first_text(&session, host, 1);
        let event = EditorEvent::paste(host, MimePayload::new()).with_range(caret);

        let result = session.handle_paste(event).unwrap();
        assert_eq!(result.range, Some(caret));
        assert!(!session.undo_stack().can_undo());
    }

    #[test]
    fn test_oversized_clipboard_fails_without_changes() {
        let doc = parse_document("<div contenteditable=\"true\">ab</div>").unwrap();
        let host = doc.first_child(doc.root()).unwrap();
        let mut config = PasteConfig::default();
        config.parse.max_input_bytes = 8;
        let mut session = EditSession::with_config("client-1", doc, config);
        let caret = caret_in_first_text(&session, host, 1);
        let event = EditorEvent::paste(host, MimePayload::html("<p>far too long</p>")).with_range(caret);

        let result = session.handle_paste(event);

        assert!(matches!(result, Err(PasteError::Transform(_))));
        assert_eq!(
            serialize_document(&session.document),
            "<div contenteditable=\"true\">ab</div>"
        );
    }

    #[test]
    fn test_undo_and_redo_paste() {
        let (mut session, host) = session("<div contenteditable=\"true\"><p>abcd</p></div>");
        let caret = caret_in_first_text(&session, host, 2);
        session
            .handle_paste(EditorEvent::paste(host, MimePayload::html("<ul><li>x</li></ul>")).with_range(caret))
            .unwrap();
        let pasted = serialize_document(&session.document);
        assert_eq!(
            pasted,
            "<div contenteditable=\"true\"><p>ab</p><ul><li>x</li></ul><p>cd</p></div>"
        );

        assert!(session.undo().unwrap());
        assert_eq!(
            serialize_document(&session.document),
            "<div contenteditable=\"true\"><p>abcd</p></div>"
        );
        assert_eq!(session.selection, None);

        assert!(session.redo().unwrap());
        assert_eq!(serialize_document(&session.document), pasted);
        assert!(!session.redo().unwrap());
    }
}
