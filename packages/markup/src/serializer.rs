use crate::escape::{escape_attribute, escape_text};
use crate::tags::{is_raw_text_element, is_void_element};
use splice_dom::{Document, NodeData, NodeId};

/// Serializer converts a (sub)tree back to markup
///
/// Output is compact: no indentation is added and text is escaped so that
/// parsing the result reproduces the same tree.
pub struct Serializer<'a> {
    doc: &'a Document,
    output: String,
}

impl<'a> Serializer<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            output: String::new(),
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    pub fn write_node(&mut self, id: NodeId) {
        let doc = self.doc;
        let Some(node) = doc.node(id) else {
            return;
        };

        match &node.data {
            NodeData::Document => self.write_children(id),
            NodeData::Text(text) => {
                let raw = doc
                    .parent(id)
                    .and_then(|parent| doc.tag(parent))
                    .map(is_raw_text_element)
                    .unwrap_or(false);
                if raw {
                    self.output.push_str(text);
                } else {
                    self.output.push_str(&escape_text(text));
                }
            }
            NodeData::Comment(text) => {
                self.output.push_str("<!--");
                self.output.push_str(text);
                self.output.push_str("-->");
            }
            NodeData::Element(element) => {
                self.output.push('<');
                self.output.push_str(&element.tag);
                for (name, value) in &element.attributes {
                    self.output.push(' ');
                    self.output.push_str(name);
                    self.output.push_str("=\"");
                    self.output.push_str(&escape_attribute(value));
                    self.output.push('"');
                }
                self.output.push('>');

                if is_void_element(&element.tag) {
                    return;
                }

                self.write_children(id);
                self.output.push_str("</");
                self.output.push_str(&element.tag);
                self.output.push('>');
            }
        }
    }

    pub fn write_children(&mut self, id: NodeId) {
        let doc = self.doc;
        for child in doc.children(id) {
            self.write_node(*child);
        }
    }
}

/// Serialize a node including its own tag
pub fn serialize_node(doc: &Document, id: NodeId) -> String {
    let mut serializer = Serializer::new(doc);
    serializer.write_node(id);
    serializer.finish()
}

/// Serialize only the children of a node
pub fn serialize_children(doc: &Document, id: NodeId) -> String {
    let mut serializer = Serializer::new(doc);
    serializer.write_children(id);
    serializer.finish()
}

/// Serialize the whole document
pub fn serialize_document(doc: &Document) -> String {
    serialize_children(doc, doc.root())
}
