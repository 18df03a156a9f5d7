//! Editor events delivered to the paste handler

use crate::clipboard::MimePayload;
use splice_dom::{NodeId, Range};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Paste,
    Copy,
    Cut,
    Keydown,
    Input,
}

/// An event as seen by the editing layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorEvent {
    pub kind: EventKind,

    /// Editing host the event targets, if any
    pub editable: Option<NodeId>,

    /// Clipboard data carried by the native event
    pub clipboard: Option<MimePayload>,

    /// Set once a handler has taken over the native default action
    pub default_prevented: bool,

    /// Selection reported back to the host; on input, the range to act on
    pub range: Option<Range>,
}

impl EditorEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            editable: None,
            clipboard: None,
            default_prevented: false,
            range: None,
        }
    }

    pub fn paste(editable: NodeId, clipboard: MimePayload) -> Self {
        Self::new(EventKind::Paste)
            .with_editable(editable)
            .with_clipboard(clipboard)
    }

    pub fn with_editable(mut self, editable: NodeId) -> Self {
        self.editable = Some(editable);
        self
    }

    pub fn with_clipboard(mut self, clipboard: MimePayload) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn with_range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    /// Paste events, or any event carrying clipboard data
    pub fn is_paste(&self) -> bool {
        self.kind == EventKind::Paste || self.clipboard.is_some()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}
