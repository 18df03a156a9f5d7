//! # Document Arena
//!
//! Owns every node of one document, including detached fragments created by
//! the parser. Query methods are infallible and return empty/`None` results
//! for unknown ids; mutation methods validate their inputs and return
//! [`DomError`] instead of leaving the tree in a half-applied state.
//!
//! Slots are never reclaimed. Detaching a node only unlinks it, so ids held
//! by a journal stay valid for revert and replay, and the arena grows with
//! every node ever created.
//!
//! ## Journal
//!
//! While a journal is open every successful mutation appends a [`Change`].
//! The journal can later be reverted (undo) or replayed (redo).

use crate::journal::Change;
use crate::{DomError, DomResult, Element, Node, NodeData, NodeId};
use tracing::trace;

/// Arena-backed document tree
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    journal: Option<Vec<Change>>,
}

impl Document {
    /// Create an empty document containing only the `#document` root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
            root: NodeId(0),
            journal: None,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of arena slots (attached and detached)
    ///
    /// Only ever increases; see the module docs.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(data));
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element(Element::new(tag)))
    }

    /// Create a detached element from a prepared payload
    pub fn create_element_with(&mut self, element: Element) -> NodeId {
        self.alloc(NodeData::Element(element))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Comment(text.into()))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn get(&self, id: NodeId) -> DomResult<&Node> {
        self.nodes.get(id.0).ok_or(DomError::NodeNotFound(id))
    }

    fn get_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(DomError::NodeNotFound(id))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Position of `id` among its parent's children
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_of(id)?;
        self.child(parent, index + 1)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_of(id)?;
        index.checked_sub(1).and_then(|i| self.child(parent, i))
    }

    /// Node name, or an empty string for unknown ids
    pub fn node_name(&self, id: NodeId) -> &str {
        self.node(id).map(Node::name).unwrap_or("")
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.node(id).map(|node| &node.data) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.tag.as_str())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attribute(name))
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.node(id).map(|node| &node.data) {
            Some(NodeData::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.text(id).is_some()
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn is_container(&self, id: NodeId) -> bool {
        self.node(id).map(Node::is_container).unwrap_or(false)
    }

    /// Node length (characters for text, child count for containers)
    pub fn length(&self, id: NodeId) -> usize {
        self.node(id).map(Node::length).unwrap_or(0)
    }

    /// Parent chain of `id`, nearest first, excluding `id` itself
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// Inclusive containment check
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).any(|candidate| candidate == ancestor)
    }

    /// Whether `id` is reachable from the document root
    pub fn is_attached(&self, id: NodeId) -> bool {
        if self.node(id).is_none() {
            return false;
        }
        id == self.root || self.ancestors(id).last() == Some(self.root)
    }

    /// Pre-order descendants of `id`, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|node| self.text(node))
            .collect()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Insert a detached `child` into `parent` at `index`
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> DomResult<()> {
        let parent_node = self.get(parent)?;
        if !parent_node.is_container() {
            return Err(DomError::NotAContainer(parent));
        }
        let length = parent_node.children.len();
        if index > length {
            return Err(DomError::OffsetOutOfBounds {
                node: parent,
                offset: index,
                length,
            });
        }
        if self.get(child)?.parent.is_some() {
            return Err(DomError::AlreadyAttached(child));
        }
        if child == self.root || self.contains(child, parent) {
            return Err(DomError::CycleDetected);
        }

        self.raw_insert(parent, index, child);
        self.record(Change::Inserted {
            parent,
            index,
            node: child,
        });
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let index = self.get(parent)?.children.len();
        self.insert_child(parent, index, child)
    }

    /// Insert `node` immediately before `reference`
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) -> DomResult<()> {
        let parent = self.parent(reference).ok_or(DomError::Detached(reference))?;
        let index = self.index_of(reference).ok_or(DomError::Detached(reference))?;
        self.insert_child(parent, index, node)
    }

    /// Insert `node` immediately after `reference`
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> DomResult<()> {
        let parent = self.parent(reference).ok_or(DomError::Detached(reference))?;
        let index = self.index_of(reference).ok_or(DomError::Detached(reference))?;
        self.insert_child(parent, index + 1, node)
    }

    /// Detach `node` from its parent, returning where it was
    pub fn detach(&mut self, node: NodeId) -> DomResult<(NodeId, usize)> {
        let parent = self.get(node)?.parent.ok_or(DomError::Detached(node))?;
        let index = self.index_of(node).ok_or(DomError::Detached(node))?;

        self.raw_remove(parent, index);
        self.record(Change::Removed {
            parent,
            index,
            node,
        });
        Ok((parent, index))
    }

    /// Move `node` under `parent` at `index`
    ///
    /// `index` is interpreted after `node` has been detached from its
    /// current position.
    pub fn move_node(&mut self, node: NodeId, parent: NodeId, index: usize) -> DomResult<()> {
        if !self.is_container(parent) {
            return Err(DomError::NotAContainer(parent));
        }
        // Validate before detaching so a failed move never orphans the node
        if node == self.root || self.contains(node, parent) {
            return Err(DomError::CycleDetected);
        }
        let still_there = if self.parent(node) == Some(parent) { 1 } else { 0 };
        let length = self.children(parent).len() - still_there;
        if index > length {
            return Err(DomError::OffsetOutOfBounds {
                node: parent,
                offset: index,
                length,
            });
        }

        if self.parent(node).is_some() {
            self.detach(node)?;
        }
        self.insert_child(parent, index, node)
    }

    /// Replace the content of a text node
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> DomResult<()> {
        let after = text.into();
        let node = self.get_mut(id)?;
        let NodeData::Text(current) = &mut node.data else {
            return Err(DomError::NotText(id));
        };
        let before = std::mem::replace(current, after.clone());
        self.record(Change::TextChanged {
            node: id,
            before,
            after,
        });
        Ok(())
    }

    /// Delete the characters `start..end` of a text node
    pub fn delete_text(&mut self, id: NodeId, start: usize, end: usize) -> DomResult<()> {
        let text = self.text(id).ok_or(DomError::NotText(id))?;
        let length = text.chars().count();
        if start > end || end > length {
            return Err(DomError::OffsetOutOfBounds {
                node: id,
                offset: end.max(start),
                length,
            });
        }
        let updated: String = text
            .chars()
            .take(start)
            .chain(text.chars().skip(end))
            .collect();
        self.set_text(id, updated)
    }

    /// Split a text node at a character offset
    ///
    /// The original node keeps the leading characters; a new node holding
    /// the trailing characters is inserted right after it and returned.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> DomResult<NodeId> {
        let text = self.text(id).ok_or(DomError::NotText(id))?;
        let length = text.chars().count();
        if offset > length {
            return Err(DomError::OffsetOutOfBounds {
                node: id,
                offset,
                length,
            });
        }
        if self.parent(id).is_none() {
            return Err(DomError::Detached(id));
        }

        let head: String = text.chars().take(offset).collect();
        let tail: String = text.chars().skip(offset).collect();

        let right = self.create_text(tail);
        self.set_text(id, head)?;
        self.insert_after(id, right)?;
        trace!(node = %id, offset, right = %right, "split text node");
        Ok(right)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> DomResult<()> {
        let value = value.into();
        let name = name.to_ascii_lowercase();
        let before = self.write_attribute(id, &name, Some(value.clone()))?;
        self.record(Change::AttributeChanged {
            node: id,
            name,
            before,
            after: Some(value),
        });
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<()> {
        let name = name.to_ascii_lowercase();
        let before = self.write_attribute(id, &name, None)?;
        if before.is_some() {
            self.record(Change::AttributeChanged {
                node: id,
                name,
                before,
                after: None,
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Journal
    // ------------------------------------------------------------------

    /// Start recording changes (restarts an already open journal)
    pub fn begin_journal(&mut self) {
        self.journal = Some(Vec::new());
    }

    pub fn is_journaling(&self) -> bool {
        self.journal.is_some()
    }

    /// Close the journal and return the recorded changes
    pub fn take_journal(&mut self) -> Vec<Change> {
        self.journal.take().unwrap_or_default()
    }

    /// Undo `changes` (given in application order)
    pub fn revert(&mut self, changes: &[Change]) -> DomResult<()> {
        let journal = self.journal.take();
        let result = changes
            .iter()
            .rev()
            .try_for_each(|change| self.apply_change(&change.inverse()));
        self.journal = journal;
        result
    }

    /// Re-apply `changes` (given in application order)
    pub fn replay(&mut self, changes: &[Change]) -> DomResult<()> {
        let journal = self.journal.take();
        let result = changes
            .iter()
            .try_for_each(|change| self.apply_change(change));
        self.journal = journal;
        result
    }

    fn apply_change(&mut self, change: &Change) -> DomResult<()> {
        match change {
            Change::Inserted { parent, index, node } => {
                if self.get(*node)?.parent.is_some() {
                    return Err(DomError::JournalMismatch(format!("{node} is still attached")));
                }
                if !self.is_container(*parent) || *index > self.children(*parent).len() {
                    return Err(DomError::JournalMismatch(format!(
                        "cannot insert {node} into {parent} at {index}"
                    )));
                }
                self.raw_insert(*parent, *index, *node);
            }
            Change::Removed { parent, index, node } => {
                if self.child(*parent, *index) != Some(*node) {
                    return Err(DomError::JournalMismatch(format!(
                        "{node} is not child {index} of {parent}"
                    )));
                }
                self.raw_remove(*parent, *index);
            }
            Change::TextChanged { node, after, .. } => match &mut self.get_mut(*node)?.data {
                NodeData::Text(text) => *text = after.clone(),
                _ => return Err(DomError::NotText(*node)),
            },
            Change::AttributeChanged {
                node, name, after, ..
            } => {
                self.write_attribute(*node, name, after.clone())?;
            }
        }
        Ok(())
    }

    fn record(&mut self, change: Change) {
        if let Some(journal) = &mut self.journal {
            journal.push(change);
        }
    }

    fn raw_insert(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    fn raw_remove(&mut self, parent: NodeId, index: usize) {
        let child = self.nodes[parent.0].children.remove(index);
        self.nodes[child.0].parent = None;
    }

    /// Set or clear an attribute, returning the previous value
    fn write_attribute(&mut self, id: NodeId, name: &str, value: Option<String>) -> DomResult<Option<String>> {
        let node = self.get_mut(id)?;
        let NodeData::Element(element) = &mut node.data else {
            return Err(DomError::NotAnElement(id));
        };
        let position = element
            .attributes
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name));

        let before = match (position, value) {
            (Some(i), Some(value)) => Some(std::mem::replace(&mut element.attributes[i].1, value)),
            (Some(i), None) => Some(element.attributes.remove(i).1),
            (None, Some(value)) => {
                element.attributes.push((name.to_string(), value));
                None
            }
            (None, None) => None,
        };
        Ok(before)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a node's ancestors, nearest first
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph_with_text(doc: &mut Document, text: &str) -> (NodeId, NodeId) {
        let p = doc.create_element("P");
        let t = doc.create_text(text);
        doc.append_child(doc.root(), p).unwrap();
        doc.append_child(p, t).unwrap();
        (p, t)
    }

    #[test]
    fn test_tag_names_are_lowercased() {
        let mut doc = Document::new();
        let div = doc.create_element("DIV");
        assert_eq!(doc.node_name(div), "div");
        assert_eq!(doc.node_name(doc.root()), "#document");
    }

    #[test]
    fn test_insert_and_detach() {
        let mut doc = Document::new();
        let (p, t) = paragraph_with_text(&mut doc, "Hello");

        assert!(doc.is_attached(t));
        assert_eq!(doc.index_of(p), Some(0));

        let (parent, index) = doc.detach(p).unwrap();
        assert_eq!(parent, doc.root());
        assert_eq!(index, 0);
        assert!(!doc.is_attached(t));
        assert_eq!(doc.parent(t), Some(p));
    }

    #[test]
    fn test_insert_rejects_attached_child() {
        let mut doc = Document::new();
        let (p, t) = paragraph_with_text(&mut doc, "Hello");
        let div = doc.create_element("div");
        doc.append_child(doc.root(), div).unwrap();

        assert_eq!(doc.append_child(div, t), Err(DomError::AlreadyAttached(t)));
        assert_eq!(doc.children(p), &[t]);
    }

    #[test]
    fn test_insert_rejects_cycles() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner).unwrap();

        assert_eq!(doc.move_node(outer, inner, 0), Err(DomError::CycleDetected));
        assert_eq!(doc.parent(inner), Some(outer));
    }

    #[test]
    fn test_text_cannot_hold_children() {
        let mut doc = Document::new();
        let (_, t) = paragraph_with_text(&mut doc, "Hi");
        let b = doc.create_element("b");
        assert_eq!(doc.append_child(t, b), Err(DomError::NotAContainer(t)));
    }

    #[test]
    fn test_split_text_uses_character_offsets() {
        let mut doc = Document::new();
        let (p, t) = paragraph_with_text(&mut doc, "héllo");

        let right = doc.split_text(t, 2).unwrap();
        assert_eq!(doc.text(t), Some("hé"));
        assert_eq!(doc.text(right), Some("llo"));
        assert_eq!(doc.children(p), &[t, right]);
    }

    #[test]
    fn test_split_detached_text_fails() {
        let mut doc = Document::new();
        let t = doc.create_text("abc");
        assert_eq!(doc.split_text(t, 1), Err(DomError::Detached(t)));
        assert_eq!(doc.text(t), Some("abc"));
    }

    #[test]
    fn test_move_node_within_same_parent() {
        let mut doc = Document::new();
        let a = doc.create_text("a");
        let b = doc.create_text("b");
        let c = doc.create_text("c");
        for node in [a, b, c] {
            doc.append_child(doc.root(), node).unwrap();
        }

        doc.move_node(a, doc.root(), 2).unwrap();
        assert_eq!(doc.children(doc.root()), &[b, c, a]);
    }

    #[test]
    fn test_attributes_are_case_insensitive() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.set_attribute(div, "contentEditable", "true").unwrap();
        assert_eq!(doc.attribute(div, "contenteditable"), Some("true"));

        doc.remove_attribute(div, "CONTENTEDITABLE").unwrap();
        assert_eq!(doc.attribute(div, "contenteditable"), None);
    }

    #[test]
    fn test_journal_revert_and_replay() {
        let mut doc = Document::new();
        let (p, t) = paragraph_with_text(&mut doc, "Hello world");
        assert_eq!(doc.node_count(), 3);

        doc.begin_journal();
        let right = doc.split_text(t, 5).unwrap();
        let b = doc.create_element("b");
        doc.insert_after(t, b).unwrap();
        doc.set_attribute(p, "class", "lead").unwrap();
        doc.detach(right).unwrap();
        let changes = doc.take_journal();
        assert!(!doc.is_journaling());
        assert_eq!(changes.len(), 5);

        doc.revert(&changes).unwrap();
        assert_eq!(doc.children(p), &[t]);
        assert_eq!(doc.node_count(), 5);
        assert_eq!(doc.text(t), Some("Hello world"));
        assert_eq!(doc.attribute(p, "class"), None);

        doc.replay(&changes).unwrap();
        assert_eq!(doc.children(p), &[t, b]);
        assert_eq!(doc.text(t), Some("Hello"));
        assert_eq!(doc.attribute(p, "class"), Some("lead"));
    }

    #[test]
    fn test_descendants_are_preorder() {
        let mut doc = Document::new();
        let (p, t) = paragraph_with_text(&mut doc, "x");
        let ul = doc.create_element("ul");
        let li = doc.create_element("li");
        doc.append_child(doc.root(), ul).unwrap();
        doc.append_child(ul, li).unwrap();

        assert_eq!(doc.descendants(doc.root()), vec![p, t, ul, li]);
        assert_eq!(doc.text_content(doc.root()), "x");
    }
}
