//! # Range Deletion
//!
//! Removes everything between two boundaries and collapses to the start.
//!
//! ```text
//! <p>a[b</p><p>c]d</p>  →  <p>a|d</p>
//! ```
//!
//! Partially selected text is trimmed, fully selected nodes are detached
//! (only the outermost ones), and when the selection started and ended in
//! two sibling blocks of the same kind those blocks are joined.

use crate::content::ContentModel;
use splice_dom::{Boundary, Document, DomError, DomResult, NodeId};
use std::cmp::Ordering;
use tracing::{debug, trace};

/// Delete the content between `start` and `end`
///
/// Returns the collapsed boundary. It always refers to a node that is still
/// attached: only content after the start point is removed.
pub fn remove(
    doc: &mut Document,
    model: &dyn ContentModel,
    start: Boundary,
    end: Boundary,
) -> DomResult<Boundary> {
    let (start, end) = match doc.compare_boundaries(start, end)? {
        Ordering::Equal => return Ok(start),
        Ordering::Less => (start, end),
        Ordering::Greater => (end, start),
    };

    if start.container == end.container && doc.is_text(start.container) {
        doc.delete_text(start.container, start.offset, end.offset)?;
        return Ok(start);
    }

    let mut end = split_text_edge(doc, end)?;
    let splits_start = doc.is_text(start.container)
        && start.offset > 0
        && start.offset < doc.length(start.container);
    let start = split_text_edge(doc, start)?;
    // The trailing half of the start text lands in front of `end`
    if splits_start && end.container == start.container && end.offset >= start.offset {
        end.offset += 1;
    }

    if start == end {
        return Ok(start);
    }

    let common = common_ancestor(doc, start.container, end.container)
        .ok_or(DomError::DisjointTrees)?;

    let mut removals: Vec<NodeId> = Vec::new();

    let mut container = start.container;
    let mut offset = start.offset;
    let mut left_branch = None;
    while container != common {
        removals.extend_from_slice(&doc.children(container)[offset.min(doc.length(container))..]);
        left_branch = Some(container);
        offset = doc.index_of(container).ok_or(DomError::Detached(container))? + 1;
        container = doc.parent(container).ok_or(DomError::Detached(container))?;
    }
    let left_index = offset;

    let mut container = end.container;
    let mut offset = end.offset;
    let mut right_branch = None;
    while container != common {
        removals.extend_from_slice(&doc.children(container)[..offset.min(doc.length(container))]);
        right_branch = Some(container);
        offset = doc.index_of(container).ok_or(DomError::Detached(container))?;
        container = doc.parent(container).ok_or(DomError::Detached(container))?;
    }
    let right_index = offset;

    if left_index < right_index {
        removals.extend_from_slice(&doc.children(common)[left_index..right_index]);
    }

    for node in &removals {
        doc.detach(*node)?;
    }
    debug!(removed = removals.len(), "removed selection");

    if let (Some(left), Some(right)) = (left_branch, right_branch) {
        merge_siblings(doc, model, left, right)?;
    }

    Ok(start)
}

/// Split a text boundary strictly inside its node and return the
/// equivalent boundary in the parent
fn split_text_edge(doc: &mut Document, boundary: Boundary) -> DomResult<Boundary> {
    let container = boundary.container;
    if !doc.is_text(container) {
        return Ok(boundary);
    }
    if boundary.offset > 0 && boundary.offset < doc.length(container) {
        doc.split_text(container, boundary.offset)?;
        return doc.boundary_after(container);
    }
    let normalized = doc.normalize_boundary(boundary);
    if doc.is_text(normalized.container) {
        return Err(DomError::Detached(container));
    }
    Ok(normalized)
}

fn common_ancestor(doc: &Document, a: NodeId, b: NodeId) -> Option<NodeId> {
    let chain: Vec<NodeId> = std::iter::once(a).chain(doc.ancestors(a)).collect();
    std::iter::once(b)
        .chain(doc.ancestors(b))
        .find(|candidate| chain.contains(candidate))
}

/// Join `right` into `left` when both are adjacent blocks of the same kind
fn merge_siblings(
    doc: &mut Document,
    model: &dyn ContentModel,
    left: NodeId,
    right: NodeId,
) -> DomResult<()> {
    let mergeable = doc.next_sibling(left) == Some(right)
        && doc.is_element(left)
        && doc.node_name(left) == doc.node_name(right)
        && !model.is_void_type(doc, left)
        && !model.is_void_type(doc, right)
        && !model.is_group_container(doc, left);
    if !mergeable {
        return Ok(());
    }

    for child in doc.children(right).to_vec() {
        let index = doc.length(left);
        doc.move_node(child, left, index)?;
    }
    doc.detach(right)?;
    trace!(left = %left, right = %right, "merged partial blocks");
    Ok(())
}
