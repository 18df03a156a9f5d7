//! # Fragment Parser
//!
//! Runs clipboard markup through html5ever's fragment algorithm (with a
//! `body` context element) and copies the resulting tree into an existing
//! [`Document`] as a detached forest, so the parsed nodes can later be moved
//! into the live tree without copying.
//!
//! ```text
//! "<p>A<b>B</b></p>"  →  div (detached fragment container)
//!                          └─ p
//!                              ├─ "A"
//!                              └─ b
//!                                  └─ "B"
//! ```
//!
//! html5ever owns tokenization, character references and error recovery.
//! This module only enforces the size and nesting limits of
//! [`ParseOptions`] and maps nodes into the arena.

use crate::{ParseError, ParseResult};
use html5ever::tendril::TendrilSink;
use html5ever::{local_name, namespace_url, ns, parse_fragment as parse_html, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use serde::{Deserialize, Serialize};
use splice_dom::{Document, Element, NodeId};
use tracing::{debug, trace};

/// Limits applied while parsing untrusted markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseOptions {
    /// Maximum element nesting depth
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum accepted input size in bytes
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,
}

fn default_max_depth() -> usize {
    256
}

fn default_max_input_bytes() -> usize {
    4 * 1024 * 1024
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_input_bytes: default_max_input_bytes(),
        }
    }
}

/// Parse `markup` into a detached `div` whose children are the forest
pub fn parse_fragment(doc: &mut Document, markup: &str) -> ParseResult<NodeId> {
    parse_fragment_with(doc, markup, &ParseOptions::default())
}

/// [`parse_fragment`] with explicit limits
pub fn parse_fragment_with(doc: &mut Document, markup: &str, options: &ParseOptions) -> ParseResult<NodeId> {
    let container = doc.create_element("div");
    MarkupParser::new(doc, container, options).parse(markup)?;
    Ok(container)
}

/// Parse `markup` into a fresh document, placing the forest under the root
///
/// The markup is treated as body content: no `html`, `head` or `body`
/// elements are synthesized around it.
pub fn parse_document(markup: &str) -> ParseResult<Document> {
    let mut doc = Document::new();
    let root = doc.root();
    MarkupParser::new(&mut doc, root, &ParseOptions::default()).parse(markup)?;
    Ok(doc)
}

/// Copies html5ever output into a target container of a [`Document`]
pub struct MarkupParser<'a> {
    doc: &'a mut Document,
    target: NodeId,
    options: &'a ParseOptions,
}

impl<'a> MarkupParser<'a> {
    pub fn new(doc: &'a mut Document, target: NodeId, options: &'a ParseOptions) -> Self {
        Self { doc, target, options }
    }

    /// Append the nodes described by `markup` to the target container
    pub fn parse(mut self, markup: &str) -> ParseResult<()> {
        if markup.len() > self.options.max_input_bytes {
            return Err(ParseError::too_large(markup.len(), self.options.max_input_bytes));
        }

        let context = QualName::new(None, ns!(html), local_name!("body"));
        let dom = parse_html(RcDom::default(), ParseOpts::default(), context, Vec::new()).one(markup);
        if !dom.errors.is_empty() {
            trace!(errors = dom.errors.len(), "recovered from malformed markup");
        }

        // Fragment parsing nests the forest in a synthetic `html` root
        let root = dom.document.children.borrow().first().cloned();
        if let Some(root) = root {
            self.append_forest(&root)?;
        }

        debug!(
            bytes = markup.len(),
            top_level = self.doc.children(self.target).len(),
            "parsed markup"
        );
        Ok(())
    }

    /// Copy the children of `root` below the target, in document order
    fn append_forest(&mut self, root: &Handle) -> ParseResult<()> {
        let mut pending: Vec<(Handle, NodeId, usize)> = root
            .children
            .borrow()
            .iter()
            .rev()
            .map(|child| (child.clone(), self.target, 1))
            .collect();

        while let Some((handle, parent, depth)) = pending.pop() {
            let Some(id) = self.create_node(&handle, depth)? else {
                continue;
            };
            self.doc.append_child(parent, id)?;
            pending.extend(
                handle
                    .children
                    .borrow()
                    .iter()
                    .rev()
                    .map(|child| (child.clone(), id, depth + 1)),
            );
        }
        Ok(())
    }

    /// Arena node for one html5ever node; doctypes and processing
    /// instructions have no counterpart
    fn create_node(&mut self, handle: &Handle, depth: usize) -> ParseResult<Option<NodeId>> {
        let id = match &handle.data {
            NodeData::Text { contents } => self.doc.create_text(contents.borrow().to_string()),
            NodeData::Comment { contents } => self.doc.create_comment(contents.to_string()),
            NodeData::Element { name, attrs, .. } => {
                if depth > self.options.max_depth {
                    return Err(ParseError::too_deep(depth, self.options.max_depth));
                }
                let attributes = attrs
                    .borrow()
                    .iter()
                    .map(|attr| (qualified_name(&attr.name), attr.value.to_string()))
                    .collect();
                self.doc.create_element_with(Element {
                    tag: name.local.to_string(),
                    attributes,
                })
            }
            NodeData::Document | NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => {
                return Ok(None)
            }
        };
        Ok(Some(id))
    }
}

/// `prefix:local` for foreign attributes such as `xlink:href`
fn qualified_name(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{prefix}:{}", name.local),
        None => name.local.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::serialize_children;

    fn roundtrip(markup: &str) -> String {
        let mut doc = Document::new();
        let fragment = parse_fragment(&mut doc, markup).unwrap();
        serialize_children(&doc, fragment)
    }

    #[test]
    fn test_parse_nested_inline() {
        let mut doc = Document::new();
        let fragment = parse_fragment(&mut doc, "<p>A<b>B</b></p>").unwrap();

        assert!(!doc.is_attached(fragment));
        let children = doc.children(fragment).to_vec();
        assert_eq!(children.len(), 1);
        assert_eq!(doc.node_name(children[0]), "p");
        assert_eq!(doc.text_content(children[0]), "AB");
    }

    #[test]
    fn test_empty_markup_yields_empty_forest() {
        let mut doc = Document::new();
        let fragment = parse_fragment(&mut doc, "").unwrap();
        assert!(doc.children(fragment).is_empty());
    }

    #[test]
    fn test_implied_end_tags() {
        assert_eq!(roundtrip("<p>one<p>two"), "<p>one</p><p>two</p>");
        assert_eq!(
            roundtrip("<ul><li>a<li>b</ul>"),
            "<ul><li>a</li><li>b</li></ul>"
        );
        assert_eq!(
            roundtrip("<table><tr><td>1<td>2<tr><td>3</table>"),
            "<table><tbody><tr><td>1</td><td>2</td></tr><tr><td>3</td></tr></tbody></table>"
        );
        assert_eq!(roundtrip("<p>text<div>block</div>"), "<p>text</p><div>block</div>");
    }

    #[test]
    fn test_stray_end_tags_are_ignored() {
        assert_eq!(roundtrip("a</b>c</span>"), "ac");
        assert_eq!(roundtrip("<i>x</b>y</i>"), "<i>xy</i>");
    }

    #[test]
    fn test_document_wrappers_are_not_synthesized() {
        assert_eq!(
            roundtrip("<html><head><title>t</title></head><body><p>x</p></body></html>"),
            "<title>t</title><p>x</p>"
        );
    }

    #[test]
    fn test_void_and_raw_text_elements() {
        assert_eq!(roundtrip("a<br>b<img src=x.png>"), "a<br>b<img src=\"x.png\">");
        assert_eq!(
            roundtrip("<script>if (a < b) {}</script>after"),
            "<script>if (a < b) {}</script>after"
        );
    }

    #[test]
    fn test_entities_are_decoded() {
        let mut doc = Document::new();
        let fragment = parse_fragment(&mut doc, "Fish &amp; Chips &lt;3").unwrap();
        let text = doc.first_child(fragment).unwrap();
        assert_eq!(doc.text(text), Some("Fish & Chips <3"));
    }

    #[test]
    fn test_named_references_outside_ascii() {
        let mut doc = Document::new();
        let fragment =
            parse_fragment(&mut doc, "caf&eacute; &ouml; 2&times;3 &laquo;x&raquo; &#x263A;").unwrap();
        let text = doc.first_child(fragment).unwrap();
        assert_eq!(doc.text(text), Some("café ö 2×3 «x» ☺"));
        assert_eq!(roundtrip("AT&T &bogus;"), "AT&amp;T &amp;bogus;");
    }

    #[test]
    fn test_office_namespaced_tags_keep_their_prefix() {
        assert_eq!(
            roundtrip("<p class=MsoNormal>x<o:p></o:p></p><![if !supportLists]>"),
            "<p class=\"MsoNormal\">x<o:p></o:p></p><!--[if !supportLists]-->"
        );
    }

    #[test]
    fn test_depth_limit() {
        let options = ParseOptions {
            max_depth: 3,
            ..ParseOptions::default()
        };
        let mut doc = Document::new();
        let result = parse_fragment_with(&mut doc, "<div><div><div><div>deep</div></div></div></div>", &options);
        assert_eq!(result, Err(ParseError::too_deep(4, 3)));

        let mut doc = Document::new();
        assert!(parse_fragment_with(&mut doc, "<div><div><div>fits</div></div></div>", &options).is_ok());
    }

    #[test]
    fn test_size_limit() {
        let options = ParseOptions {
            max_input_bytes: 4,
            ..ParseOptions::default()
        };
        let mut doc = Document::new();
        let result = parse_fragment_with(&mut doc, "<p>too long</p>", &options);
        assert_eq!(result, Err(ParseError::too_large(15, 4)));
    }

    #[test]
    fn test_parse_document_attaches_to_root() {
        let doc = parse_document("<div contenteditable=\"true\"><p>Hi</p></div>").unwrap();
        let host = doc.first_child(doc.root()).unwrap();
        assert!(doc.is_attached(host));
        assert_eq!(doc.attribute(host, "contenteditable"), Some("true"));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: ParseOptions = serde_json::from_str(r#"{ "maxDepth": 12 }"#).unwrap();
        assert_eq!(options.max_depth, 12);
        assert_eq!(options.max_input_bytes, 4 * 1024 * 1024);
    }
}
