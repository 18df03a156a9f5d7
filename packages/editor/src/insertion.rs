//! # Boundary Insertion
//!
//! Inserts a markup string at a range of the live document.
//!
//! ```text
//! markup ──parse──→ forest (detached, inside the same arena)
//!                     │
//!   selection ──remove──→ collapsed boundary
//!                     │
//!   unwrap the clipboard's outer block (unless void or a list/table)
//!                     │
//!   for each node: split ancestors until nesting is legal, insert
//!                     │
//!   reconcile the trailing edge with the content that follows
//! ```
//!
//! The trailing-edge step removes the line break a pasted paragraph would
//! otherwise leave behind: following inline content is pulled into the
//! last pasted block, or the last pasted block is folded into the block
//! that follows.

use crate::content::ContentModel;
use crate::editing::remove;
use crate::tree_ops::{insert_at, split};
use crate::PasteError;
use splice_dom::{Boundary, Document, NodeId};
use splice_markup::{parse_fragment_with, ParseOptions};
use tracing::{debug, instrument, trace};

/// Replace the range `start..end` with `markup`
///
/// Returns the boundaries around the inserted content. When nothing is
/// inserted both boundaries are the collapsed deletion point.
#[instrument(skip_all, fields(bytes = markup.len()))]
pub fn insert(
    doc: &mut Document,
    model: &dyn ContentModel,
    start: Boundary,
    end: Boundary,
    markup: &str,
    options: &ParseOptions,
) -> Result<(Boundary, Boundary), PasteError> {
    let fragment = parse_fragment_with(doc, markup, options)?;
    let collapsed = remove(doc, model, start, end)?;

    if doc.children(fragment).is_empty() {
        return Ok((collapsed, collapsed));
    }

    // Void detection relies on editability, which detached nodes only get
    // from an explicitly editable ancestor
    doc.set_attribute(fragment, "contenteditable", "true")?;

    let mut nodes = doc.children(fragment).to_vec();
    let first = nodes[0];
    if !doc.is_text(first) && !model.is_void_type(doc, first) && !model.is_group_container(doc, first) {
        trace!(wrapper = doc.node_name(first), "unwrapping outer element");
        let mut unwrapped = doc.children(first).to_vec();
        unwrapped.extend_from_slice(&nodes[1..]);
        nodes = unwrapped;
    }

    let Some(&last) = nodes.last() else {
        return Ok((collapsed, collapsed));
    };

    let mut at = collapsed;
    for &node in &nodes {
        let name = doc.node_name(node).to_string();
        at = split(doc, at, |doc, container| {
            model.is_editing_host(doc, container) || model.allows_nesting(doc.node_name(container), &name)
        })?;
        at = insert_at(doc, at, node)?;
    }

    let (end, merged_into) = reconcile_trailing_edge(doc, model, last, at)?;

    let start = match nodes.iter().find(|node| doc.parent(**node).is_some()) {
        Some(&node) => doc.boundary_before(node)?,
        None => match merged_into {
            Some(next) => Boundary::new(next, 0),
            None => collapsed,
        },
    };

    debug!(nodes = nodes.len(), merged = merged_into.is_some(), "inserted markup");
    Ok((start, end))
}

/// Fold the boundary between pasted `last` and the content after `at`
///
/// Returns the end boundary and, when `last` was dissolved into the
/// following block, that block.
fn reconcile_trailing_edge(
    doc: &mut Document,
    model: &dyn ContentModel,
    last: NodeId,
    at: Boundary,
) -> Result<(Boundary, Option<NodeId>), PasteError> {
    let Some(next) = doc.node_after(at) else {
        return Ok((at, None));
    };
    if !matches!(doc.node_name(last), "p" | "div") {
        return Ok((at, None));
    }

    if model.has_inline_style(doc, next) {
        let end = doc.end_of(last);
        let mut run = Vec::new();
        let mut current = Some(next);
        while let Some(node) = current {
            if model.has_linebreaking_style(doc, node) {
                break;
            }
            run.push(node);
            current = doc.next_sibling(node);
        }
        for node in &run {
            let index = doc.length(last);
            doc.move_node(*node, last, index)?;
        }
        trace!(moved = run.len(), "pulled trailing inline run into pasted block");
        return Ok((end, None));
    }

    if !model.is_void_type(doc, next) && !model.is_group_container(doc, next) {
        let children = doc.children(last).to_vec();
        for (index, child) in children.iter().enumerate() {
            doc.move_node(*child, next, index)?;
        }
        doc.detach(last)?;
        trace!(moved = children.len(), "folded pasted block into following block");
        return Ok((Boundary::new(next, children.len()), Some(next)));
    }

    Ok((at, None))
}
