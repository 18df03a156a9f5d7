use std::fmt;

/// Index of a node in the document arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element payload: lowercase tag name plus ordered attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Node payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// Tree root
    Document,

    /// HTML element
    Element(Element),

    /// Text node
    Text(String),

    /// Comment node
    Comment(String),
}

/// Arena slot
#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// DOM-style node name (`#text`, `#comment`, `#document` or the tag)
    pub fn name(&self) -> &str {
        match &self.data {
            NodeData::Document => "#document",
            NodeData::Element(element) => &element.tag,
            NodeData::Text(_) => "#text",
            NodeData::Comment(_) => "#comment",
        }
    }

    /// Whether this node may hold children at all
    pub fn is_container(&self) -> bool {
        matches!(self.data, NodeData::Document | NodeData::Element(_))
    }

    /// Node length: characters for text/comments, child count otherwise
    pub fn length(&self) -> usize {
        match &self.data {
            NodeData::Text(text) | NodeData::Comment(text) => text.chars().count(),
            NodeData::Document | NodeData::Element(_) => self.children.len(),
        }
    }
}
