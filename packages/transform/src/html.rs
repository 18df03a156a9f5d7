//! # HTML Normalization
//!
//! Reduces arbitrary clipboard HTML to the small vocabulary an editable
//! document accepts:
//!
//! - comments and non-content elements (`script`, `style`, `head`, form
//!   controls, embedded objects, Office `o:*` tags) are dropped with their
//!   content
//! - elements outside the allowed tag list are unwrapped, keeping children
//! - attributes are filtered per tag; event handlers and script URLs never
//!   survive
//! - whitespace-only text next to blocks is removed

use crate::TransformResult;
use serde::{Deserialize, Serialize};
use splice_dom::{Document, DomError, DomResult, NodeId};
use splice_markup::tags::is_block_element;
use splice_markup::{parse_fragment_with, serialize_children, ParseOptions};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Elements removed together with everything inside them
const DROPPED_ELEMENTS: &[&str] = &[
    "applet", "base", "button", "embed", "frame", "frameset", "head", "iframe", "input", "link",
    "meta", "noscript", "object", "option", "script", "select", "style", "template", "textarea",
    "title", "xml",
];

/// Attributes holding a URL
const URL_ATTRIBUTES: &[&str] = &["action", "background", "formaction", "href", "src"];

/// Options for [`normalize_html`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeOptions {
    /// Tags kept as elements; anything else is unwrapped
    #[serde(default = "default_allowed_tags")]
    pub allowed_tags: Vec<String>,

    /// Attributes kept per tag; the `*` entry applies to every tag
    #[serde(default = "default_allowed_attributes")]
    pub allowed_attributes: BTreeMap<String, Vec<String>>,

    /// Keep `class` attributes
    #[serde(default)]
    pub keep_classes: bool,

    /// Keep `style` attributes
    #[serde(default)]
    pub keep_styles: bool,

    /// Parser limits, supplied by the caller rather than the config file
    #[serde(skip)]
    pub parse: ParseOptions,
}

fn default_allowed_tags() -> Vec<String> {
    [
        "a", "abbr", "b", "blockquote", "br", "caption", "cite", "code", "col", "colgroup", "dd",
        "del", "div", "dl", "dt", "em", "figcaption", "figure", "h1", "h2", "h3", "h4", "h5", "h6",
        "hr", "i", "img", "ins", "li", "mark", "ol", "p", "pre", "q", "s", "small", "span",
        "strike", "strong", "sub", "sup", "table", "tbody", "td", "tfoot", "th", "thead", "tr",
        "u", "ul",
    ]
    .iter()
    .map(|tag| tag.to_string())
    .collect()
}

fn default_allowed_attributes() -> BTreeMap<String, Vec<String>> {
    let entries: &[(&str, &[&str])] = &[
        ("*", &["dir", "lang", "title"]),
        ("a", &["href", "name", "target"]),
        ("col", &["span"]),
        ("colgroup", &["span"]),
        ("img", &["alt", "height", "src", "width"]),
        ("ol", &["start", "type"]),
        ("td", &["colspan", "rowspan"]),
        ("th", &["colspan", "rowspan", "scope"]),
    ];
    entries
        .iter()
        .map(|(tag, attributes)| {
            (
                tag.to_string(),
                attributes.iter().map(|name| name.to_string()).collect(),
            )
        })
        .collect()
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            allowed_tags: default_allowed_tags(),
            allowed_attributes: default_allowed_attributes(),
            keep_classes: false,
            keep_styles: false,
            parse: ParseOptions::default(),
        }
    }
}

impl NormalizeOptions {
    pub fn allows_tag(&self, tag: &str) -> bool {
        self.allowed_tags.iter().any(|allowed| allowed == tag)
    }

    pub fn allows_attribute(&self, tag: &str, name: &str) -> bool {
        match name {
            "class" => return self.keep_classes,
            "style" => return self.keep_styles,
            _ => {}
        }
        ["*", tag].iter().any(|key| {
            self.allowed_attributes
                .get(*key)
                .map(|names| names.iter().any(|allowed| allowed == name))
                .unwrap_or(false)
        })
    }
}

/// Normalize clipboard HTML into editor-safe markup
pub fn normalize_html(markup: &str, options: &NormalizeOptions) -> TransformResult<String> {
    let mut doc = Document::new();
    let fragment = parse_fragment_with(&mut doc, markup, &options.parse)?;

    clean_children(&mut doc, fragment, options, false)?;
    prune_whitespace(&mut doc, fragment)?;

    let output = serialize_children(&doc, fragment);
    debug!(input = markup.len(), output = output.len(), "normalized html");
    Ok(output)
}

/// Replace `node` by its children
pub(crate) fn unwrap_element(doc: &mut Document, node: NodeId) -> DomResult<()> {
    let (parent, index) = doc.detach(node)?;
    let children = doc.children(node).to_vec();
    for (offset, child) in children.into_iter().enumerate() {
        doc.move_node(child, parent, index + offset)?;
    }
    Ok(())
}

fn clean_children(
    doc: &mut Document,
    parent: NodeId,
    options: &NormalizeOptions,
    in_pre: bool,
) -> DomResult<()> {
    for child in doc.children(parent).to_vec() {
        if doc.text(child).is_some() {
            if !in_pre {
                collapse_line_breaks(doc, child)?;
            }
            continue;
        }

        let Some(tag) = doc.tag(child).map(str::to_string) else {
            // Comments
            doc.detach(child)?;
            continue;
        };

        if DROPPED_ELEMENTS.contains(&tag.as_str()) || tag.starts_with("o:") {
            trace!(tag, "dropping element");
            doc.detach(child)?;
            continue;
        }

        clean_children(doc, child, options, in_pre || tag == "pre")?;

        if !options.allows_tag(&tag) {
            trace!(tag, "unwrapping element");
            unwrap_element(doc, child)?;
            continue;
        }

        clean_attributes(doc, child, &tag, options)?;

        let bare = doc
            .element(child)
            .map(|element| element.attributes.is_empty())
            .unwrap_or(false);
        if tag == "span" && bare {
            unwrap_element(doc, child)?;
        }
    }
    Ok(())
}

fn clean_attributes(
    doc: &mut Document,
    node: NodeId,
    tag: &str,
    options: &NormalizeOptions,
) -> DomResult<()> {
    let attributes = doc
        .element(node)
        .ok_or(DomError::NotAnElement(node))?
        .attributes
        .clone();

    for (name, value) in attributes {
        let keep = !name.starts_with("on")
            && options.allows_attribute(tag, &name)
            && !(URL_ATTRIBUTES.contains(&name.as_str()) && is_unsafe_url(tag, &name, &value));
        if !keep {
            doc.remove_attribute(node, &name)?;
        }
    }
    Ok(())
}

fn is_unsafe_url(tag: &str, name: &str, value: &str) -> bool {
    let url: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    if url.starts_with("javascript:") || url.starts_with("vbscript:") {
        return true;
    }
    url.starts_with("data:") && !(tag == "img" && name == "src" && url.starts_with("data:image/"))
}

/// Outside `pre`, source line breaks are plain whitespace
fn collapse_line_breaks(doc: &mut Document, node: NodeId) -> DomResult<()> {
    let Some(text) = doc.text(node) else {
        return Ok(());
    };
    if !text.contains(|c: char| matches!(c, '\n' | '\r')) {
        return Ok(());
    }

    let mut collapsed = String::with_capacity(text.len());
    let mut in_break = false;
    for c in text.chars() {
        if matches!(c, '\n' | '\r') {
            if !in_break {
                let trimmed = collapsed.trim_end_matches(|c: char| c == ' ' || c == '\t').len();
                collapsed.truncate(trimmed);
                collapsed.push(' ');
                in_break = true;
            }
        } else if in_break && matches!(c, ' ' | '\t') {
            continue;
        } else {
            in_break = false;
            collapsed.push(c);
        }
    }
    doc.set_text(node, collapsed)
}

fn is_blank(text: &str) -> bool {
    text.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c'))
}

fn is_block(doc: &Document, node: Option<NodeId>) -> bool {
    node.and_then(|id| doc.tag(id)).map(is_block_element).unwrap_or(false)
}

/// Remove whitespace-only text at container edges or next to block elements
fn prune_whitespace(doc: &mut Document, parent: NodeId) -> DomResult<()> {
    if doc.tag(parent) == Some("pre") {
        return Ok(());
    }
    for child in doc.children(parent).to_vec() {
        if doc.is_element(child) {
            prune_whitespace(doc, child)?;
            continue;
        }
        let blank = doc.text(child).map(is_blank).unwrap_or(false);
        if !blank {
            continue;
        }
        let previous = doc.previous_sibling(child);
        let next = doc.next_sibling(child);
        let at_edge = previous.is_none() || next.is_none();
        if at_edge || is_block(doc, previous) || is_block(doc, next) {
            doc.detach(child)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(markup: &str) -> String {
        normalize_html(markup, &NormalizeOptions::default()).unwrap()
    }

    #[test]
    fn test_drops_scripts_and_comments() {
        assert_eq!(
            normalize("<p>a<script>alert(1)</script><!-- x -->b</p>"),
            "<p>ab</p>"
        );
    }

    #[test]
    fn test_unwraps_unknown_elements() {
        assert_eq!(
            normalize("<html><body><font color=red>hi</font></body></html>"),
            "hi"
        );
        assert_eq!(normalize("<section><p>x</p></section>"), "<p>x</p>");
    }

    #[test]
    fn test_filters_attributes() {
        assert_eq!(
            normalize("<p class=\"lead\" onclick=\"x()\" title=\"t\">a</p>"),
            "<p title=\"t\">a</p>"
        );
        assert_eq!(
            normalize("<a href=\" javascript:alert(1)\" target=\"_blank\">x</a>"),
            "<a target=\"_blank\">x</a>"
        );
        assert_eq!(
            normalize("<img src=\"data:image/png;base64,AAAA\"><a href=\"data:text/html,x\">y</a>"),
            "<img src=\"data:image/png;base64,AAAA\"><a>y</a>"
        );
    }

    #[test]
    fn test_styles_kept_when_requested() {
        let options = NormalizeOptions {
            keep_styles: true,
            ..NormalizeOptions::default()
        };
        assert_eq!(
            normalize_html("<span style=\"color: red\">x</span>", &options).unwrap(),
            "<span style=\"color: red\">x</span>"
        );
        assert_eq!(normalize("<span style=\"color: red\">x</span>"), "x");
    }

    #[test]
    fn test_contenteditable_is_stripped() {
        assert_eq!(
            normalize("<div contenteditable=\"false\">x</div>"),
            "<div>x</div>"
        );
    }

    #[test]
    fn test_whitespace_between_blocks_is_removed() {
        assert_eq!(
            normalize("\n<p>one</p>\n  <p>two</p>\n"),
            "<p>one</p><p>two</p>"
        );
        assert_eq!(normalize("<b>a</b> <i>b</i>"), "<b>a</b> <i>b</i>");
    }

    #[test]
    fn test_line_breaks_collapse_outside_pre() {
        assert_eq!(normalize("<p>one\n   two</p>"), "<p>one two</p>");
        assert_eq!(normalize("<pre>one\n  two</pre>"), "<pre>one\n  two</pre>");
    }

    #[test]
    fn test_nbsp_only_text_is_kept() {
        assert_eq!(normalize("<p>&nbsp;</p>"), "<p>&nbsp;</p>");
    }

    #[test]
    fn test_options_deserialize() {
        let options: NormalizeOptions =
            serde_json::from_str(r#"{ "allowedTags": ["p"], "keepClasses": true }"#).unwrap();
        assert_eq!(options.allowed_tags, vec!["p".to_string()]);
        assert!(options.keep_classes);
        assert!(options.allows_attribute("a", "href"));
        assert_eq!(normalize_html("<p class=\"x\"><b>y</b></p>", &options).unwrap(), "<p class=\"x\">y</p>");
    }
}
