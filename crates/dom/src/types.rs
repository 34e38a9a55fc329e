use std::sync::Arc;

/// Stable identity of a node within one [`crate::Document`].
///
/// Keys are never reused, so a key taken from a removed subtree keeps failing
/// lookups even after new nodes are created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub u32);

impl NodeKey {
    /// Reserved sentinel for "unassigned/invalid" identity.
    pub const INVALID: NodeKey = NodeKey(0);
}

pub type Attribute = (Arc<str>, Option<String>);

/// Owned snapshot of a subtree, materialized from the arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Document {
        key: NodeKey,
        children: Vec<Node>,
    },
    Fragment {
        key: NodeKey,
        children: Vec<Node>,
    },
    Element {
        key: NodeKey,
        name: Arc<str>,
        attributes: Vec<Attribute>,
        children: Vec<Node>,
    },
    Text {
        key: NodeKey,
        text: String,
    },
}

impl Node {
    pub fn key(&self) -> NodeKey {
        match self {
            Node::Document { key, .. } => *key,
            Node::Fragment { key, .. } => *key,
            Node::Element { key, .. } => *key,
            Node::Text { key, .. } => *key,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document { children, .. }
            | Node::Fragment { children, .. }
            | Node::Element { children, .. } => children,
            Node::Text { .. } => &[],
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            Node::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .and_then(|(_, v)| v.as_deref()),
            _ => None,
        }
    }

    pub fn has_attr(&self, name: &str) -> bool {
        match self {
            Node::Element { attributes, .. } => {
                attributes.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
            }
            _ => false,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|value| value.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn is_element(&self, tag: &str) -> bool {
        matches!(self, Node::Element { name, .. } if name.eq_ignore_ascii_case(tag))
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        fn walk(node: &Node, out: &mut String) {
            match node {
                Node::Text { text, .. } => out.push_str(text),
                _ => {
                    for c in node.children() {
                        walk(c, out);
                    }
                }
            }
        }
        let mut out = String::new();
        walk(self, &mut out);
        out
    }
}
