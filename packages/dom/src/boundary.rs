//! # Boundaries
//!
//! A boundary is a `(container, offset)` position. The offset counts
//! children when the container is an element and characters when it is a
//! text node. Boundaries are plain values: they are never updated behind the
//! caller's back, so code that mutates the tree derives fresh boundaries from
//! the nodes it just touched.

use crate::{Document, DomError, DomResult, NodeId};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Boundary {
    pub container: NodeId,
    pub offset: usize,
}

impl Boundary {
    pub fn new(container: NodeId, offset: usize) -> Self {
        Self { container, offset }
    }
}

/// Ordered pair of boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Boundary,
    pub end: Boundary,
}

impl Range {
    pub fn new(start: Boundary, end: Boundary) -> Self {
        Self { start, end }
    }

    pub fn collapsed(at: Boundary) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

impl Document {
    /// Boundary immediately before `node` in its parent
    pub fn boundary_before(&self, node: NodeId) -> DomResult<Boundary> {
        let parent = self.parent(node).ok_or(DomError::Detached(node))?;
        let index = self.index_of(node).ok_or(DomError::Detached(node))?;
        Ok(Boundary::new(parent, index))
    }

    /// Boundary immediately after `node` in its parent
    pub fn boundary_after(&self, node: NodeId) -> DomResult<Boundary> {
        let before = self.boundary_before(node)?;
        Ok(Boundary::new(before.container, before.offset + 1))
    }

    /// Boundary at the end of `node`'s content
    pub fn end_of(&self, node: NodeId) -> Boundary {
        Boundary::new(node, self.length(node))
    }

    /// Whether the boundary names an attached node and an in-range offset
    pub fn is_valid_boundary(&self, boundary: Boundary) -> bool {
        self.is_attached(boundary.container) && boundary.offset <= self.length(boundary.container)
    }

    /// Whether the boundary is at the very end of its container
    pub fn is_at_end(&self, boundary: Boundary) -> bool {
        boundary.offset >= self.length(boundary.container)
    }

    /// Move text boundaries at either edge of their node up to the parent
    ///
    /// Boundaries strictly inside a text node, or in a detached text node,
    /// are returned unchanged.
    pub fn normalize_boundary(&self, boundary: Boundary) -> Boundary {
        if !self.is_text(boundary.container) {
            return boundary;
        }
        if boundary.offset == 0 {
            return self.boundary_before(boundary.container).unwrap_or(boundary);
        }
        if self.is_at_end(boundary) {
            return self.boundary_after(boundary.container).unwrap_or(boundary);
        }
        boundary
    }

    /// The whole node that starts at `boundary`, if any
    pub fn node_after(&self, boundary: Boundary) -> Option<NodeId> {
        let boundary = self.normalize_boundary(boundary);
        if self.is_text(boundary.container) {
            return None;
        }
        self.child(boundary.container, boundary.offset)
    }

    /// The whole node that ends at `boundary`, if any
    pub fn node_before(&self, boundary: Boundary) -> Option<NodeId> {
        let boundary = self.normalize_boundary(boundary);
        if self.is_text(boundary.container) {
            return None;
        }
        boundary
            .offset
            .checked_sub(1)
            .and_then(|index| self.child(boundary.container, index))
    }

    /// Compare two boundaries in document order
    pub fn compare_boundaries(&self, a: Boundary, b: Boundary) -> DomResult<Ordering> {
        let (top_a, path_a) = self.boundary_path(a)?;
        let (top_b, path_b) = self.boundary_path(b)?;
        if top_a != top_b {
            return Err(DomError::DisjointTrees);
        }
        // A path that is a prefix of another sorts first: `(p, 1)` comes
        // before any position inside `p`'s second child.
        Ok(path_a.cmp(&path_b))
    }

    /// Index path from the top-most ancestor down to the boundary
    fn boundary_path(&self, boundary: Boundary) -> DomResult<(NodeId, Vec<usize>)> {
        if self.node(boundary.container).is_none() {
            return Err(DomError::NodeNotFound(boundary.container));
        }
        let mut path = vec![boundary.offset];
        let mut current = boundary.container;
        while let Some(parent) = self.parent(current) {
            let index = self.index_of(current).ok_or(DomError::Detached(current))?;
            path.push(index);
            current = parent;
        }
        path.reverse();
        Ok((current, path))
    }
}
