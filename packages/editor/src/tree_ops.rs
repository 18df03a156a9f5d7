//! # Tree Splitting
//!
//! Primitives that move a boundary outward by splitting its ancestors,
//! and place a node at a boundary.
//!
//! ```text
//! <p>ab|cd</p>   split until <div>  →  <p>ab</p>|<p>cd</p>
//! <p>|abcd</p>   split until <div>  →  |<p>abcd</p>        (no empty half)
//! ```

use splice_dom::{Boundary, Document, DomError, DomResult, NodeId};
use tracing::trace;

/// Split ancestors of `boundary` until `until` accepts its container
///
/// Each step divides the current container at the boundary into a left
/// half (the original node) and a right half (a shallow copy holding the
/// trailing children), then moves the boundary one level up, between the
/// halves. Splits at either edge of a container move the boundary before
/// or after it without creating an empty half. Returns the boundary in the
/// accepted container.
pub fn split<F>(doc: &mut Document, boundary: Boundary, mut until: F) -> DomResult<Boundary>
where
    F: FnMut(&Document, NodeId) -> bool,
{
    let mut boundary = boundary;
    loop {
        let container = boundary.container;
        if until(&*doc, container) {
            return Ok(boundary);
        }

        let length = doc.length(container);
        if boundary.offset > length {
            return Err(DomError::OffsetOutOfBounds {
                node: container,
                offset: boundary.offset,
                length,
            });
        }

        boundary = if boundary.offset == 0 {
            doc.boundary_before(container)?
        } else if boundary.offset == length {
            doc.boundary_after(container)?
        } else if doc.is_text(container) {
            doc.split_text(container, boundary.offset)?;
            doc.boundary_after(container)?
        } else {
            split_element(doc, container, boundary.offset)?;
            doc.boundary_after(container)?
        };
    }
}

/// Move the children of `node` from `offset` on into a new right sibling
fn split_element(doc: &mut Document, node: NodeId, offset: usize) -> DomResult<NodeId> {
    let mut element = doc.element(node).cloned().ok_or(DomError::NotAnElement(node))?;
    element.attributes.retain(|(name, _)| name != "id");

    let right = doc.create_element_with(element);
    doc.insert_after(node, right)?;

    let trailing = doc.children(node)[offset..].to_vec();
    for (index, child) in trailing.into_iter().enumerate() {
        doc.move_node(child, right, index)?;
    }
    trace!(node = %node, offset, right = %right, "split element");
    Ok(right)
}

/// Insert `node` at `boundary` and return the boundary right after it
///
/// `node` is detached from wherever it currently lives. A text boundary
/// strictly inside its node splits the text first.
pub fn insert_at(doc: &mut Document, boundary: Boundary, node: NodeId) -> DomResult<Boundary> {
    if doc.parent(node).is_some() {
        doc.detach(node)?;
    }

    let container = boundary.container;
    if doc.is_text(container) {
        let length = doc.length(container);
        if boundary.offset == 0 {
            doc.insert_before(container, node)?;
        } else if boundary.offset >= length {
            doc.insert_after(container, node)?;
        } else {
            doc.split_text(container, boundary.offset)?;
            doc.insert_after(container, node)?;
        }
    } else {
        doc.insert_child(container, boundary.offset, node)?;
    }

    doc.boundary_after(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use splice_markup::{parse_document, serialize_document};

    fn is(tag: &'static str) -> impl FnMut(&Document, NodeId) -> bool {
        move |doc, node| doc.node_name(node) == tag
    }

    #[test]
    fn test_split_text_and_paragraph() {
        let mut doc = parse_document("<div><p class=\"x\" id=\"a\">abcd</p></div>").unwrap();
        let div = doc.first_child(doc.root()).unwrap();
        let p = doc.first_child(div).unwrap();
        let text = doc.first_child(p).unwrap();

        let at = split(&mut doc, Boundary::new(text, 2), is("div")).unwrap();

        assert_eq!(at, Boundary::new(div, 1));
        assert_eq!(
            serialize_document(&doc),
            "<div><p class=\"x\" id=\"a\">ab</p><p class=\"x\">cd</p></div>"
        );
    }

    #[test]
    fn test_split_at_edges_creates_no_empty_half() {
        let mut doc = parse_document("<div><p><b>ab</b></p></div>").unwrap();
        let div = doc.first_child(doc.root()).unwrap();
        let p = doc.first_child(div).unwrap();
        let b = doc.first_child(p).unwrap();
        let text = doc.first_child(b).unwrap();

        let at = split(&mut doc, Boundary::new(text, 0), is("div")).unwrap();
        assert_eq!(at, Boundary::new(div, 0));

        let at = split(&mut doc, Boundary::new(text, 2), is("div")).unwrap();
        assert_eq!(at, Boundary::new(div, 1));
        assert_eq!(serialize_document(&doc), "<div><p><b>ab</b></p></div>");
    }

    #[test]
    fn test_split_nested_inline() {
        let mut doc = parse_document("<div><p>x<b>ab</b>y</p></div>").unwrap();
        let div = doc.first_child(doc.root()).unwrap();
        let p = doc.first_child(div).unwrap();
        let b = doc.child(p, 1).unwrap();
        let text = doc.first_child(b).unwrap();

        let at = split(&mut doc, Boundary::new(text, 1), is("div")).unwrap();
        assert_eq!(at, Boundary::new(div, 1));
        assert_eq!(
            serialize_document(&doc),
            "<div><p>x<b>a</b></p><p><b>b</b>y</p></div>"
        );
    }

    #[test]
    fn test_split_stops_immediately_when_accepted() {
        let mut doc = parse_document("<p>abc</p>").unwrap();
        let p = doc.first_child(doc.root()).unwrap();
        let at = split(&mut doc, Boundary::new(p, 1), is("p")).unwrap();
        assert_eq!(at, Boundary::new(p, 1));
    }

    #[test]
    fn test_split_past_detached_root_fails() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let text = doc.create_text("ab");
        doc.append_child(p, text).unwrap();

        let result = split(&mut doc, Boundary::new(p, 1), |_, _| false);
        assert_eq!(result, Err(DomError::Detached(p)));
    }

    #[test]
    fn test_insert_at_text_boundary() {
        let mut doc = parse_document("<p>abcd</p>").unwrap();
        let p = doc.first_child(doc.root()).unwrap();
        let text = doc.first_child(p).unwrap();
        let b = doc.create_element("b");

        let after = insert_at(&mut doc, Boundary::new(text, 2), b).unwrap();
        assert_eq!(after, Boundary::new(p, 2));
        assert_eq!(serialize_document(&doc), "<p>ab<b></b>cd</p>");
    }

    #[test]
    fn test_insert_at_moves_attached_node() {
        let mut doc = parse_document("<p>one</p><p>two</p>").unwrap();
        let root = doc.root();
        let first = doc.first_child(root).unwrap();
        let second = doc.child(root, 1).unwrap();

        let after = insert_at(&mut doc, Boundary::new(root, 0), second).unwrap();
        assert_eq!(after, Boundary::new(root, 1));
        assert_eq!(doc.index_of(first), Some(1));
        assert_eq!(serialize_document(&doc), "<p>two</p><p>one</p>");
    }
}
