//! # Paste History
//!
//! Groups the journaled changes of one edit into a batch that can be
//! reverted and replayed as a unit.
//!
//! - [`UndoStack::capture`] opens the document journal around an edit and
//!   commits what it recorded; a failing edit is reverted before its error
//!   is returned
//! - Undo reverts the newest batch, redo replays the newest undone batch
//! - Committing a batch forgets everything that was undone
//!
//! ```rust,ignore
//! let mut history = UndoStack::new();
//! history.capture(&mut doc, "paste", |doc| insert(doc, &model, start, end, markup, &options))?;
//! history.undo(&mut doc)?;
//! history.redo(&mut doc)?;
//! ```

use splice_dom::{Change, Document, DomError, DomResult};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Journaled changes committed by one capture scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBatch {
    /// Changes in the order they were applied
    pub changes: Vec<Change>,

    /// Label of the scope that produced the batch (e.g. `paste`)
    pub description: Option<String>,
}

impl ChangeBatch {
    pub fn new(changes: Vec<Change>) -> Self {
        Self {
            changes,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Bounded history of committed batches
#[derive(Debug)]
pub struct UndoStack {
    /// Committed batches, oldest first
    done: VecDeque<ChangeBatch>,

    /// Reverted batches, most recently reverted last
    undone: Vec<ChangeBatch>,

    /// History bound; 0 keeps everything
    max_levels: usize,
}

impl UndoStack {
    /// History of 100 batches
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            done: VecDeque::new(),
            undone: Vec::new(),
            max_levels,
        }
    }

    /// Run `edit` as a single undoable step
    ///
    /// Nested captures join the outermost scope.
    pub fn capture<T, E, F>(&mut self, doc: &mut Document, description: &str, edit: F) -> Result<T, E>
    where
        F: FnOnce(&mut Document) -> Result<T, E>,
        E: From<DomError>,
    {
        if doc.is_journaling() {
            return edit(doc);
        }

        doc.begin_journal();
        let result = edit(doc);
        let changes = doc.take_journal();

        match result {
            Ok(value) => {
                if !changes.is_empty() {
                    debug!(description, changes = changes.len(), "captured undo step");
                    self.push_batch(ChangeBatch::new(changes).with_description(description));
                }
                Ok(value)
            }
            Err(err) => {
                warn!(description, changes = changes.len(), "aborting undo scope");
                doc.revert(&changes)?;
                Err(err)
            }
        }
    }

    /// Commit an already applied batch
    pub fn push_batch(&mut self, batch: ChangeBatch) {
        self.done.push_back(batch);
        if self.max_levels > 0 && self.done.len() > self.max_levels {
            self.done.pop_front();
        }
        self.undone.clear();
    }

    /// Revert the newest batch; `false` when there is nothing to undo
    pub fn undo(&mut self, doc: &mut Document) -> DomResult<bool> {
        let Some(batch) = self.done.pop_back() else {
            return Ok(false);
        };
        doc.revert(&batch.changes)?;
        self.undone.push(batch);
        Ok(true)
    }

    /// Replay the newest reverted batch; `false` when there is nothing to redo
    pub fn redo(&mut self, doc: &mut Document) -> DomResult<bool> {
        let Some(batch) = self.undone.pop() else {
            return Ok(false);
        };
        doc.replay(&batch.changes)?;
        self.done.push_back(batch);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.done.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.undone.len()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Forget all history
    pub fn clear(&mut self) {
        self.done.clear();
        self.undone.clear();
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.done.back()?.description.as_deref()
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.undone.last()?.description.as_deref()
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
