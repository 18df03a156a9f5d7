//! # Splice Markup
//!
//! Turns markup strings into detached node forests inside a
//! [`splice_dom::Document`] and back into strings.
//!
//! Parsing is delegated to html5ever, so clipboard HTML gets the same
//! error recovery a browser applies: implied end tags, stray end tags,
//! character references and misnested formatting are all resolved before
//! the nodes reach the arena. This crate only rejects input that exceeds
//! the configured size or nesting limits.

pub mod error;
pub mod escape;
pub mod parser;
pub mod serializer;
pub mod tags;

pub use error::{ParseError, ParseResult};
pub use parser::{parse_document, parse_fragment, parse_fragment_with, MarkupParser, ParseOptions};
pub use serializer::{serialize_children, serialize_document, serialize_node, Serializer};
