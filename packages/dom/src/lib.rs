//! # Splice DOM
//!
//! Arena-backed document tree used by the paste engine.
//!
//! ## Design
//!
//! - Nodes live in a single arena and are addressed by [`NodeId`]
//! - Nodes are never freed; removing a node detaches it from its parent
//! - Positions are expressed as [`Boundary`] values derived from the live tree
//! - Every structural change can be journaled and reverted as a unit
//!
//! ```text
//! #document
//!  └─ div contenteditable="true"
//!      ├─ p
//!      │   └─ "Hello"        ← Boundary(text, 3) sits between "Hel" and "lo"
//!      └─ ul
//! ```

mod boundary;
mod document;
mod errors;
mod journal;
mod node;

pub use boundary::{Boundary, Range};
pub use document::{Ancestors, Document};
pub use errors::{DomError, DomResult};
pub use journal::Change;
pub use node::{Element, Node, NodeData, NodeId};
