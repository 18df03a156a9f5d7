//! # Content Model
//!
//! Nesting rules and node classification consulted by the insertion
//! engine. The engine only sees the [`ContentModel`] trait, so tests and
//! embedders can swap in stricter or looser policies.
//!
//! | classification | meaning                                                  |
//! |----------------|----------------------------------------------------------|
//! | void type      | atomic: never unwrapped, never merged into               |
//! | group container| structure that loses meaning when unwrapped (lists, tables) |
//! | editing host   | outermost editable element; splitting stops here         |

use splice_dom::{Document, NodeId};
use splice_markup::tags::{is_block_element, is_void_element};
use splice_transform::style::declaration;

pub trait ContentModel {
    /// Whether an element named `container` may directly contain `child`
    ///
    /// Names are DOM node names: lowercase tags, `#text` or `#comment`.
    fn allows_nesting(&self, container: &str, child: &str) -> bool;

    fn is_void_type(&self, doc: &Document, node: NodeId) -> bool;

    fn is_group_container(&self, doc: &Document, node: NodeId) -> bool;

    fn is_editing_host(&self, doc: &Document, node: NodeId) -> bool;

    /// Whether the node renders inline
    fn has_inline_style(&self, doc: &Document, node: NodeId) -> bool;

    /// Whether the node starts a new line
    fn has_linebreaking_style(&self, doc: &Document, node: NodeId) -> bool;
}

pub const GROUP_CONTAINERS: &[&str] = &[
    "audio", "colgroup", "dl", "fieldset", "figure", "hgroup", "map", "menu", "object", "ol",
    "select", "table", "tbody", "tfoot", "thead", "tr", "ul", "video",
];

/// Containers limited to phrasing content
const PHRASING_CONTAINERS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "del", "dfn", "dt", "em", "font", "h1",
    "h2", "h3", "h4", "h5", "h6", "i", "ins", "kbd", "label", "legend", "mark", "p", "pre", "q",
    "s", "samp", "small", "span", "strike", "strong", "sub", "summary", "sup", "time", "u", "var",
];

const PHRASING_CONTENT: &[&str] = &[
    "#comment", "#text", "a", "abbr", "area", "audio", "b", "bdi", "bdo", "br", "button",
    "canvas", "cite", "code", "data", "del", "dfn", "em", "embed", "font", "i", "iframe", "img",
    "input", "ins", "kbd", "label", "map", "mark", "math", "object", "q", "s", "samp", "select",
    "small", "span", "strike", "strong", "sub", "sup", "svg", "textarea", "time", "u", "var",
    "video", "wbr",
];

/// Elements only valid inside one specific kind of parent
const NEEDS_SPECIFIC_PARENT: &[&str] = &[
    "caption", "col", "colgroup", "dd", "dt", "li", "optgroup", "option", "tbody", "td", "tfoot",
    "th", "thead", "tr",
];

/// Content model for HTML documents
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlContentModel;

impl HtmlContentModel {
    pub fn new() -> Self {
        Self
    }

    /// Nearest `contenteditable` decision at or above `node`
    pub fn is_editable(&self, doc: &Document, node: NodeId) -> bool {
        let start = if doc.is_element(node) {
            Some(node)
        } else {
            doc.parent(node)
        };
        let mut current = start;
        while let Some(id) = current {
            if let Some(value) = doc.attribute(id, "contenteditable") {
                match value.to_ascii_lowercase().as_str() {
                    "" | "true" | "plaintext-only" => return true,
                    "false" => return false,
                    _ => {}
                }
            }
            current = doc.parent(id);
        }
        false
    }

    fn display(&self, doc: &Document, node: NodeId) -> Option<String> {
        doc.attribute(node, "style")
            .and_then(|style| declaration(style, "display"))
            .map(|value| value.to_ascii_lowercase())
    }
}

impl ContentModel for HtmlContentModel {
    fn allows_nesting(&self, container: &str, child: &str) -> bool {
        let container = container.to_ascii_lowercase();
        let child = child.to_ascii_lowercase();
        let (container, child) = (container.as_str(), child.as_str());

        if is_void_element(container) || (container.starts_with('#') && container != "#document") {
            return false;
        }

        match container {
            "ul" | "ol" | "menu" => child == "li",
            "dl" => matches!(child, "dt" | "dd"),
            "table" => matches!(child, "caption" | "colgroup" | "thead" | "tbody" | "tfoot" | "tr"),
            "thead" | "tbody" | "tfoot" => child == "tr",
            "tr" => matches!(child, "td" | "th"),
            "colgroup" => child == "col",
            "select" => matches!(child, "option" | "optgroup"),
            "optgroup" => child == "option",
            "a" if child == "a" => false,
            _ if PHRASING_CONTAINERS.contains(&container) => PHRASING_CONTENT.contains(&child),
            _ => !NEEDS_SPECIFIC_PARENT.contains(&child),
        }
    }

    fn is_void_type(&self, doc: &Document, node: NodeId) -> bool {
        let void_tag = doc.tag(node).map(is_void_element).unwrap_or(false);
        void_tag || !self.is_editable(doc, node)
    }

    fn is_group_container(&self, doc: &Document, node: NodeId) -> bool {
        doc.tag(node)
            .map(|tag| GROUP_CONTAINERS.contains(&tag))
            .unwrap_or(false)
    }

    fn is_editing_host(&self, doc: &Document, node: NodeId) -> bool {
        if !doc.is_element(node) || !self.is_editable(doc, node) {
            return false;
        }
        let explicit = doc
            .attribute(node, "contenteditable")
            .map(|value| !value.eq_ignore_ascii_case("false"))
            .unwrap_or(false);
        explicit
            && doc
                .parent(node)
                .map(|parent| !self.is_editable(doc, parent))
                .unwrap_or(true)
    }

    fn has_inline_style(&self, doc: &Document, node: NodeId) -> bool {
        let Some(tag) = doc.tag(node) else {
            return !doc.is_container(node);
        };
        match self.display(doc, node) {
            Some(display) => display.starts_with("inline") || display == "contents",
            None => !is_block_element(tag),
        }
    }

    fn has_linebreaking_style(&self, doc: &Document, node: NodeId) -> bool {
        match doc.tag(node) {
            Some("br") => true,
            Some(_) => !self.has_inline_style(doc, node),
            None => false,
        }
    }
}
