//! # Word-Processor Cleanup
//!
//! Office applications put HTML on the clipboard that carries its own
//! list model: every list item is a paragraph with an `mso-list` style
//! naming its nesting level, and the bullet or number is literal text in a
//! `mso-list:Ignore` span.
//!
//! ```text
//! <p class=MsoListParagraphCxSpFirst style='mso-list:l0 level1 lfo1'>
//!   <span style='mso-list:Ignore'>1.</span>First
//! </p>
//! <p class=MsoListParagraphCxSpLast style='mso-list:l0 level2 lfo1'>
//!   <span style='mso-list:Ignore'>o</span>Nested
//! </p>
//!
//!   →  <ol><li>First<ul><li>Nested</li></ul></li></ol>
//! ```
//!
//! [`clean_ms_word`] rebuilds real lists from those paragraphs and strips
//! the Office-only markup; [`crate::normalize_html`] runs afterwards.

use crate::html::unwrap_element;
use crate::style::{declaration, parse_declarations, serialize_declarations};
use crate::TransformResult;
use regex::{Regex, RegexSet};
use splice_dom::{Document, DomError, DomResult, NodeId};
use splice_markup::{parse_fragment_with, serialize_children, ParseOptions};
use std::sync::OnceLock;
use tracing::debug;

/// Elements Office emits outside the document body
const OFFICE_METADATA: &[&str] = &["head", "link", "meta", "script", "style", "title", "xml"];

fn word_markers() -> &'static RegexSet {
    static MARKERS: OnceLock<RegexSet> = OnceLock::new();
    MARKERS.get_or_init(|| {
        RegexSet::new([
            r"(?i)urn:schemas-microsoft-com:office",
            r#"(?i)class\s*=\s*["']?Mso"#,
            r"(?i)mso-[a-z-]+\s*:",
            r#"(?i)<meta[^>]+content\s*=\s*["']?Microsoft Word"#,
        ])
        .expect("word marker patterns compile")
    })
}

fn level_pattern() -> &'static Regex {
    static LEVEL: OnceLock<Regex> = OnceLock::new();
    LEVEL.get_or_init(|| Regex::new(r"(?i)level(\d+)").expect("level pattern compiles"))
}

fn ordered_marker_pattern() -> &'static Regex {
    static ORDERED: OnceLock<Regex> = OnceLock::new();
    ORDERED.get_or_init(|| {
        Regex::new(r"^\(?([0-9]+|[a-zA-Z]|[ivxlcdmIVXLCDM]+)[.)]$").expect("marker pattern compiles")
    })
}

/// Whether `markup` was produced by a word processor
pub fn is_ms_word_content(markup: &str) -> bool {
    word_markers().is_match(markup)
}

/// Convert word-processor markup into plain structural HTML
pub fn clean_ms_word(markup: &str, options: &ParseOptions) -> TransformResult<String> {
    let mut doc = Document::new();
    let fragment = parse_fragment_with(&mut doc, markup, options)?;

    strip_office_nodes(&mut doc, fragment)?;
    let lists = convert_lists(&mut doc, fragment)?;
    strip_office_attributes(&mut doc, fragment)?;

    let output = serialize_children(&doc, fragment);
    debug!(input = markup.len(), output = output.len(), lists, "cleaned word markup");
    Ok(output)
}

/// Drop comments (including conditional comments), metadata and `o:*`
/// elements; unwrap other namespaced elements
fn strip_office_nodes(doc: &mut Document, parent: NodeId) -> DomResult<()> {
    for child in doc.children(parent).to_vec() {
        if doc.text(child).is_some() {
            continue;
        }
        let Some(tag) = doc.tag(child).map(str::to_string) else {
            doc.detach(child)?;
            continue;
        };
        if tag.starts_with("o:") || OFFICE_METADATA.contains(&tag.as_str()) {
            doc.detach(child)?;
            continue;
        }
        strip_office_nodes(doc, child)?;
        if tag.contains(':') {
            unwrap_element(doc, child)?;
        }
    }
    Ok(())
}

fn mso_list(doc: &Document, node: NodeId) -> Option<String> {
    doc.attribute(node, "style")
        .and_then(|style| declaration(style, "mso-list"))
}

fn is_marker_span(doc: &Document, node: NodeId) -> bool {
    mso_list(doc, node)
        .map(|value| value.eq_ignore_ascii_case("ignore"))
        .unwrap_or(false)
}

fn has_marker_span(doc: &Document, node: NodeId) -> bool {
    doc.descendants(node)
        .into_iter()
        .any(|descendant| is_marker_span(doc, descendant))
}

fn is_list_paragraph(doc: &Document, node: NodeId) -> bool {
    if doc.tag(node) != Some("p") {
        return false;
    }
    if let Some(value) = mso_list(doc, node) {
        return level_pattern().is_match(&value);
    }
    let list_class = doc
        .attribute(node, "class")
        .map(|class| class.to_ascii_lowercase().starts_with("msolistparagraph"))
        .unwrap_or(false);
    list_class && has_marker_span(doc, node)
}

fn list_level(doc: &Document, node: NodeId) -> usize {
    mso_list(doc, node)
        .and_then(|value| {
            level_pattern()
                .captures(&value)
                .and_then(|captures| captures.get(1))
                .and_then(|level| level.as_str().parse::<usize>().ok())
        })
        .unwrap_or(1)
        .max(1)
}

/// Remove the bullet/number span of a list paragraph, returning its text
fn take_marker(doc: &mut Document, paragraph: NodeId) -> DomResult<Option<String>> {
    let Some(span) = doc
        .descendants(paragraph)
        .into_iter()
        .find(|node| is_marker_span(doc, *node))
    else {
        return Ok(None);
    };
    let marker = doc.text_content(span).trim().to_string();
    doc.detach(span)?;
    Ok(Some(marker))
}

fn is_blank_text(doc: &Document, node: NodeId) -> bool {
    doc.text(node)
        .map(|text| text.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r')))
        .unwrap_or(false)
}

/// Replace runs of list paragraphs with nested lists; returns the number of
/// top-level lists built
fn convert_lists(doc: &mut Document, parent: NodeId) -> DomResult<usize> {
    let mut built = 0;
    for child in doc.children(parent).to_vec() {
        if doc.is_element(child) && !is_list_paragraph(doc, child) {
            built += convert_lists(doc, child)?;
        }
    }

    let mut run: Vec<NodeId> = Vec::new();
    for child in doc.children(parent).to_vec() {
        if is_list_paragraph(doc, child) {
            run.push(child);
        } else if run.is_empty() || !is_blank_text(doc, child) {
            if !run.is_empty() {
                built += build_lists(doc, &run)?;
                run.clear();
            }
        }
    }
    if !run.is_empty() {
        built += build_lists(doc, &run)?;
    }
    Ok(built)
}

struct OpenList {
    level: usize,
    list: NodeId,
    item: Option<NodeId>,
}

fn build_lists(doc: &mut Document, run: &[NodeId]) -> DomResult<usize> {
    let Some(&anchor) = run.first() else {
        return Ok(0);
    };

    let mut roots: Vec<NodeId> = Vec::new();
    let mut stack: Vec<OpenList> = Vec::new();

    for &paragraph in run {
        let level = list_level(doc, paragraph);
        let ordered = take_marker(doc, paragraph)?
            .map(|marker| ordered_marker_pattern().is_match(&marker))
            .unwrap_or(false);
        let tag = if ordered { "ol" } else { "ul" };

        while let Some(top) = stack.last() {
            let deeper = top.level > level;
            let switched = top.level == level && doc.node_name(top.list) != tag;
            if !(deeper || switched) {
                break;
            }
            stack.pop();
        }

        let reuse = matches!(stack.last(), Some(top) if top.level == level);
        if !reuse {
            let list = doc.create_element(tag);
            match stack.last().and_then(|top| top.item) {
                Some(item) => doc.append_child(item, list)?,
                None => roots.push(list),
            }
            stack.push(OpenList {
                level,
                list,
                item: None,
            });
        }

        let item = doc.create_element("li");
        for child in doc.children(paragraph).to_vec() {
            let index = doc.length(item);
            doc.move_node(child, item, index)?;
        }
        let top = stack.last_mut().ok_or(DomError::Detached(paragraph))?;
        doc.append_child(top.list, item)?;
        top.item = Some(item);
    }

    for &list in &roots {
        doc.insert_before(anchor, list)?;
    }
    for &paragraph in run {
        doc.detach(paragraph)?;
    }
    Ok(roots.len())
}

/// Remove leftover marker spans, `Mso*` classes and `mso-*` declarations
fn strip_office_attributes(doc: &mut Document, fragment: NodeId) -> DomResult<()> {
    for node in doc.descendants(fragment) {
        if !doc.is_element(node) || !doc.contains(fragment, node) {
            continue;
        }
        if is_marker_span(doc, node) {
            doc.detach(node)?;
            continue;
        }

        if let Some(class) = doc.attribute(node, "class") {
            let kept: Vec<&str> = class
                .split_whitespace()
                .filter(|name| !name.to_ascii_lowercase().starts_with("mso"))
                .collect();
            let kept = kept.join(" ");
            if kept.is_empty() {
                doc.remove_attribute(node, "class")?;
            } else {
                doc.set_attribute(node, "class", kept)?;
            }
        }

        if let Some(style) = doc.attribute(node, "style") {
            let kept: Vec<(String, String)> = parse_declarations(style)
                .into_iter()
                .filter(|(property, _)| !property.starts_with("mso-"))
                .collect();
            if kept.is_empty() {
                doc.remove_attribute(node, "style")?;
            } else {
                let style = serialize_declarations(&kept);
                doc.set_attribute(node, "style", style)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(markup: &str) -> String {
        clean_ms_word(markup, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_detects_word_markup() {
        assert!(is_ms_word_content(
            "<html xmlns:o=\"urn:schemas-microsoft-com:office:office\">"
        ));
        assert!(is_ms_word_content("<p class=MsoNormal>x</p>"));
        assert!(is_ms_word_content("<p style=\"mso-margin-top-alt:auto\">x</p>"));
        assert!(is_ms_word_content(
            "<meta name=Generator content=\"Microsoft Word 15\">"
        ));
        assert!(!is_ms_word_content("<p class=\"lead\">Hello</p>"));
        assert!(!is_ms_word_content("plain words about Microsoft Word"));
    }

    #[test]
    fn test_strips_office_markup() {
        assert_eq!(
            clean("<!--[if gte mso 9]><xml>x</xml><![endif]--><p class=MsoNormal>Hi<o:p>&nbsp;</o:p></p>"),
            "<p>Hi</p>"
        );
        assert_eq!(
            clean("<p class=\"MsoNormal lead\" style=\"mso-line-height-alt:12pt; color: red\">x</p>"),
            "<p class=\"lead\" style=\"color: red\">x</p>"
        );
        assert_eq!(clean("<st1:place>Paris</st1:place>"), "Paris");
    }

    #[test]
    fn test_converts_flat_list() {
        let markup = "<p class=MsoListParagraphCxSpFirst style='mso-list:l0 level1 lfo1'>\
            <![if !supportLists]><span style='mso-list:Ignore'>1.<span>&nbsp;&nbsp;</span></span><![endif]>First</p>\n\
            <p class=MsoListParagraphCxSpLast style='mso-list:l0 level1 lfo1'>\
            <![if !supportLists]><span style='mso-list:Ignore'>2.<span>&nbsp;&nbsp;</span></span><![endif]>Second</p>";
        assert_eq!(clean(markup), "<ol><li>First</li><li>Second</li></ol>\n");
    }

    #[test]
    fn test_converts_nested_bullets() {
        let markup = "<p style='mso-list:l0 level1 lfo1'><span style='mso-list:Ignore'>·</span>One</p>\
            <p style='mso-list:l0 level2 lfo1'><span style='mso-list:Ignore'>o</span>Inner</p>\
            <p style='mso-list:l0 level1 lfo1'><span style='mso-list:Ignore'>·</span>Two</p>\
            <p class=MsoNormal>After</p>";
        assert_eq!(
            clean(markup),
            "<ul><li>One<ul><li>Inner</li></ul></li><li>Two</li></ul><p>After</p>"
        );
    }

    #[test]
    fn test_list_type_switch_starts_new_list() {
        let markup = "<p style='mso-list:l0 level1 lfo1'><span style='mso-list:Ignore'>a)</span>A</p>\
            <p style='mso-list:l1 level1 lfo2'><span style='mso-list:Ignore'>-</span>B</p>";
        assert_eq!(clean(markup), "<ol><li>A</li></ol><ul><li>B</li></ul>");
    }

    #[test]
    fn test_list_paragraph_class_without_marker_is_kept() {
        assert_eq!(
            clean("<p class=MsoListParagraph>Indented</p>"),
            "<p>Indented</p>"
        );
    }
}
