use crate::NodeId;

/// One primitive change recorded while a journal is open
///
/// Node creation is not journaled: arena slots are never reused, so a
/// created-then-reverted node simply stays detached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// `node` was inserted as child `index` of `parent`
    Inserted {
        parent: NodeId,
        index: usize,
        node: NodeId,
    },

    /// `node` was removed from position `index` of `parent`
    Removed {
        parent: NodeId,
        index: usize,
        node: NodeId,
    },

    /// Text content replaced
    TextChanged {
        node: NodeId,
        before: String,
        after: String,
    },

    /// Attribute set (`after = Some`) or removed (`after = None`)
    AttributeChanged {
        node: NodeId,
        name: String,
        before: Option<String>,
        after: Option<String>,
    },
}

impl Change {
    /// The change that undoes this one
    pub fn inverse(&self) -> Change {
        match self {
            Change::Inserted { parent, index, node } => Change::Removed {
                parent: *parent,
                index: *index,
                node: *node,
            },
            Change::Removed { parent, index, node } => Change::Inserted {
                parent: *parent,
                index: *index,
                node: *node,
            },
            Change::TextChanged { node, before, after } => Change::TextChanged {
                node: *node,
                before: after.clone(),
                after: before.clone(),
            },
            Change::AttributeChanged {
                node,
                name,
                before,
                after,
            } => Change::AttributeChanged {
                node: *node,
                name: name.clone(),
                before: after.clone(),
                after: before.clone(),
            },
        }
    }
}
