use crate::{Attribute, DomError, Node, NodeKey};
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory document: an arena of nodes addressed by [`NodeKey`].
///
/// Invariants:
/// - The document root always exists and has no parent.
/// - A node has at most one parent; operations never create cycles.
/// - Element and attribute names are stored ASCII-lowercase.
/// - Keys are allocated monotonically and never handed out twice.
/// - Removing a node frees its whole subtree.
pub struct Document {
    nodes: Vec<Option<NodeRecord>>,
    live: HashMap<NodeKey, usize>,
    free: Vec<usize>,
    next_key: u32,
    root: NodeKey,
}

struct NodeRecord {
    kind: NodeKind,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

impl NodeRecord {
    fn allows_children(&self) -> bool {
        !matches!(self.kind, NodeKind::Text { .. })
    }
}

enum NodeKind {
    Document,
    Fragment,
    Element {
        name: Arc<str>,
        attributes: Vec<Attribute>,
    },
    Text {
        text: String,
    },
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            live: HashMap::new(),
            free: Vec::new(),
            next_key: 1,
            root: NodeKey::INVALID,
        };
        doc.root = doc.insert(NodeKind::Document);
        doc
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Number of live nodes, the root included.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.live.contains_key(&key)
    }

    // --- creation ---

    pub fn create_element(&mut self, name: &str) -> NodeKey {
        self.insert(NodeKind::Element {
            name: Arc::from(name.to_ascii_lowercase()),
            attributes: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeKey {
        self.insert(NodeKind::Text { text: text.into() })
    }

    /// A detached container whose children move to the new parent when it is appended.
    pub fn create_fragment(&mut self) -> NodeKey {
        self.insert(NodeKind::Fragment)
    }

    /// Element with an optional single text child and class, built from fresh nodes only.
    pub(crate) fn create_text_element(
        &mut self,
        name: &str,
        text: &str,
        class: Option<&str>,
    ) -> NodeKey {
        let mut attributes = Vec::new();
        if let Some(class) = class {
            attributes.push((Arc::from("class"), Some(class.to_string())));
        }
        let (element, element_index) = self.insert_at(NodeKind::Element {
            name: Arc::from(name.to_ascii_lowercase()),
            attributes,
        });
        if !text.is_empty() {
            let (text_key, text_index) = self.insert_at(NodeKind::Text {
                text: text.to_string(),
            });
            if let Some(record) = self.nodes[text_index].as_mut() {
                record.parent = Some(element);
            }
            if let Some(record) = self.nodes[element_index].as_mut() {
                record.children.push(text_key);
            }
        }
        element
    }

    fn insert(&mut self, kind: NodeKind) -> NodeKey {
        self.insert_at(kind).0
    }

    fn insert_at(&mut self, kind: NodeKind) -> (NodeKey, usize) {
        let key = NodeKey(self.next_key);
        self.next_key += 1;
        let record = NodeRecord {
            kind,
            parent: None,
            children: Vec::new(),
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(record);
                index
            }
            None => {
                self.nodes.push(Some(record));
                self.nodes.len() - 1
            }
        };
        self.live.insert(key, index);
        (key, index)
    }

    fn record(&self, key: NodeKey) -> Result<&NodeRecord, DomError> {
        self.live
            .get(&key)
            .and_then(|&index| self.nodes[index].as_ref())
            .ok_or(DomError::MissingKey(key))
    }

    fn record_mut(&mut self, key: NodeKey) -> Result<&mut NodeRecord, DomError> {
        let index = *self.live.get(&key).ok_or(DomError::MissingKey(key))?;
        self.nodes[index].as_mut().ok_or(DomError::MissingKey(key))
    }

    // --- structure ---

    /// Append `child` as the last child of `parent`.
    ///
    /// Appending a fragment moves the fragment's children instead and consumes the fragment.
    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        if parent == child {
            return Err(DomError::CycleDetected { parent, child });
        }
        if !self.record(parent)?.allows_children() {
            return Err(DomError::InvalidParent(parent));
        }
        let (is_fragment, has_parent) = {
            let record = self.record(child)?;
            if matches!(record.kind, NodeKind::Document) {
                return Err(DomError::InvalidParent(child));
            }
            (matches!(record.kind, NodeKind::Fragment), record.parent.is_some())
        };
        if self.is_descendant(child, parent) {
            return Err(DomError::CycleDetected { parent, child });
        }

        if is_fragment {
            let moved = std::mem::take(&mut self.record_mut(child)?.children);
            for &grandchild in &moved {
                self.record_mut(grandchild)?.parent = Some(parent);
            }
            self.record_mut(parent)?.children.extend(moved);
            self.free_subtree(child);
            return Ok(());
        }

        if has_parent {
            return Err(DomError::InvalidParent(child));
        }
        self.record_mut(parent)?.children.push(child);
        self.record_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Detach `key` from its parent and free its subtree. Returns the number of nodes freed.
    pub fn remove(&mut self, key: NodeKey) -> Result<usize, DomError> {
        if key == self.root {
            return Err(DomError::WrongNodeKind(key));
        }
        let parent = self.record_mut(key)?.parent.take();
        if let Some(parent) = parent {
            if let Ok(parent_record) = self.record_mut(parent) {
                parent_record.children.retain(|k| *k != key);
            }
        }
        let freed = self.free_subtree(key);
        log::trace!(target: "dom", "removed {key:?} ({freed} nodes)");
        Ok(freed)
    }

    /// Remove every child of `parent`. Returns how many direct children were removed.
    pub fn remove_children(&mut self, parent: NodeKey) -> Result<usize, DomError> {
        let children = std::mem::take(&mut self.record_mut(parent)?.children);
        let count = children.len();
        let mut freed = 0;
        for child in children {
            freed += self.free_subtree(child);
        }
        log::trace!(target: "dom", "cleared {parent:?}: {count} children, {freed} nodes");
        Ok(count)
    }

    fn free_subtree(&mut self, key: NodeKey) -> usize {
        let Some(index) = self.live.remove(&key) else {
            return 0;
        };
        let Some(record) = self.nodes[index].take() else {
            return 0;
        };
        self.free.push(index);
        1 + record
            .children
            .into_iter()
            .map(|child| self.free_subtree(child))
            .sum::<usize>()
    }

    fn is_descendant(&self, ancestor: NodeKey, maybe_descendant: NodeKey) -> bool {
        let Ok(record) = self.record(ancestor) else {
            return false;
        };
        let mut stack: Vec<NodeKey> = record.children.clone();
        while let Some(current) = stack.pop() {
            if current == maybe_descendant {
                return true;
            }
            if let Ok(r) = self.record(current) {
                stack.extend(r.children.iter().copied());
            }
        }
        false
    }

    pub fn children(&self, key: NodeKey) -> Result<&[NodeKey], DomError> {
        Ok(&self.record(key)?.children)
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.record(key).ok().and_then(|r| r.parent)
    }

    pub fn tag_name(&self, key: NodeKey) -> Option<&str> {
        match &self.record(key).ok()?.kind {
            NodeKind::Element { name, .. } => Some(&**name),
            _ => None,
        }
    }

    pub fn is_element(&self, key: NodeKey, tag: &str) -> bool {
        self.tag_name(key)
            .is_some_and(|name| name.eq_ignore_ascii_case(tag))
    }

    // --- text ---

    pub fn text_content(&self, key: NodeKey) -> Result<String, DomError> {
        let mut out = String::new();
        self.collect_text(key, &mut out)?;
        Ok(out)
    }

    fn collect_text(&self, key: NodeKey, out: &mut String) -> Result<(), DomError> {
        let record = self.record(key)?;
        match &record.kind {
            NodeKind::Text { text } => out.push_str(text),
            _ => {
                for &child in &record.children {
                    self.collect_text(child, out)?;
                }
            }
        }
        Ok(())
    }

    /// Replace the children of `key` with a single text node (none for empty text).
    pub fn set_text_content(&mut self, key: NodeKey, text: &str) -> Result<(), DomError> {
        let record = self.record_mut(key)?;
        if let NodeKind::Text { text: existing } = &mut record.kind {
            existing.clear();
            existing.push_str(text);
            return Ok(());
        }
        self.remove_children(key)?;
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(key, text_node)?;
        }
        Ok(())
    }

    // --- attributes ---

    fn attributes(&self, key: NodeKey) -> Result<&[Attribute], DomError> {
        match &self.record(key)?.kind {
            NodeKind::Element { attributes, .. } => Ok(attributes),
            _ => Err(DomError::WrongNodeKind(key)),
        }
    }

    fn attributes_mut(&mut self, key: NodeKey) -> Result<&mut Vec<Attribute>, DomError> {
        match &mut self.record_mut(key)?.kind {
            NodeKind::Element { attributes, .. } => Ok(attributes),
            _ => Err(DomError::WrongNodeKind(key)),
        }
    }

    pub fn attribute(&self, key: NodeKey, name: &str) -> Option<&str> {
        self.attributes(key)
            .ok()?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn has_attribute(&self, key: NodeKey, name: &str) -> bool {
        self.attributes(key)
            .map(|attrs| attrs.iter().any(|(k, _)| k.eq_ignore_ascii_case(name)))
            .unwrap_or(false)
    }

    pub fn set_attribute(
        &mut self,
        key: NodeKey,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        self.put_attribute(key, name, Some(value.into()))
    }

    /// Set or clear a boolean attribute such as `disabled`.
    pub fn set_flag(&mut self, key: NodeKey, name: &str, on: bool) -> Result<(), DomError> {
        if on {
            if !self.has_attribute(key, name) {
                self.put_attribute(key, name, None)?;
            }
            Ok(())
        } else {
            self.remove_attribute(key, name).map(|_| ())
        }
    }

    fn put_attribute(
        &mut self,
        key: NodeKey,
        name: &str,
        value: Option<String>,
    ) -> Result<(), DomError> {
        let name = name.to_ascii_lowercase();
        let attrs = self.attributes_mut(key)?;
        match attrs.iter_mut().find(|(k, _)| &**k == name.as_str()) {
            Some(slot) => slot.1 = value,
            None => attrs.push((Arc::from(name), value)),
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, key: NodeKey, name: &str) -> Result<bool, DomError> {
        let attrs = self.attributes_mut(key)?;
        let before = attrs.len();
        attrs.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        Ok(attrs.len() != before)
    }

    /// Read a `data-*` attribute, e.g. `data("post-id")` for `data-post-id`.
    pub fn data(&self, key: NodeKey, name: &str) -> Option<&str> {
        self.attribute(key, &format!("data-{name}"))
    }

    pub fn set_data(
        &mut self,
        key: NodeKey,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        self.set_attribute(key, &format!("data-{name}"), value)
    }

    // --- class list ---

    pub fn classes(&self, key: NodeKey) -> impl Iterator<Item = &str> + '_ {
        self.attribute(key, "class")
            .unwrap_or("")
            .split_ascii_whitespace()
    }

    pub fn has_class(&self, key: NodeKey, class: &str) -> bool {
        self.classes(key).any(|c| c == class)
    }

    pub fn add_class(&mut self, key: NodeKey, class: &str) -> Result<(), DomError> {
        self.attributes(key)?;
        if self.has_class(key, class) {
            return Ok(());
        }
        let mut classes: Vec<String> = self.classes(key).map(str::to_string).collect();
        classes.push(class.to_string());
        self.set_attribute(key, "class", classes.join(" "))
    }

    pub fn remove_class(&mut self, key: NodeKey, class: &str) -> Result<bool, DomError> {
        self.attributes(key)?;
        if !self.has_class(key, class) {
            return Ok(false);
        }
        let classes: Vec<String> = self
            .classes(key)
            .filter(|c| *c != class)
            .map(str::to_string)
            .collect();
        self.set_attribute(key, "class", classes.join(" "))?;
        Ok(true)
    }

    /// Flip `class` on `key`. Returns whether the class is present afterwards.
    pub fn toggle_class(&mut self, key: NodeKey, class: &str) -> Result<bool, DomError> {
        if self.remove_class(key, class)? {
            Ok(false)
        } else {
            self.add_class(key, class)?;
            Ok(true)
        }
    }

    // --- queries ---

    /// Descendants of `scope` in document order, `scope` itself excluded.
    pub fn descendants(&self, scope: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let Ok(record) = self.record(scope) else {
            return out;
        };
        let mut stack: Vec<NodeKey> = record.children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Ok(r) = self.record(current) {
                stack.extend(r.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn query_tag(&self, scope: NodeKey, tag: &str) -> Option<NodeKey> {
        self.descendants(scope)
            .into_iter()
            .find(|&k| self.is_element(k, tag))
    }

    pub fn query_all_tag(&self, scope: NodeKey, tag: &str) -> Vec<NodeKey> {
        self.descendants(scope)
            .into_iter()
            .filter(|&k| self.is_element(k, tag))
            .collect()
    }

    /// `tag[data-name]` under `scope`, in document order.
    pub fn query_all_with_data(&self, scope: NodeKey, tag: &str, name: &str) -> Vec<NodeKey> {
        self.descendants(scope)
            .into_iter()
            .filter(|&k| self.is_element(k, tag) && self.data(k, name).is_some())
            .collect()
    }

    /// First `tag[data-name="value"]` under `scope`.
    pub fn query_data(&self, scope: NodeKey, tag: &str, name: &str, value: &str) -> Option<NodeKey> {
        self.descendants(scope)
            .into_iter()
            .find(|&k| self.is_element(k, tag) && self.data(k, name) == Some(value))
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeKey> {
        self.descendants(self.root)
            .into_iter()
            .find(|&k| self.attribute(k, "id") == Some(id))
    }

    // --- snapshots ---

    pub fn materialize(&self, key: NodeKey) -> Result<Node, DomError> {
        let record = self.record(key)?;
        let children = record
            .children
            .iter()
            .map(|&child| self.materialize(child))
            .collect::<Result<Vec<_>, _>>()?;
        let node = match &record.kind {
            NodeKind::Document => Node::Document { key, children },
            NodeKind::Fragment => Node::Fragment { key, children },
            NodeKind::Element { name, attributes } => Node::Element {
                key,
                name: Arc::clone(name),
                attributes: attributes.clone(),
                children,
            },
            NodeKind::Text { text } => Node::Text {
                key,
                text: text.clone(),
            },
        };
        Ok(node)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(doc: &mut Document, items: &[&str]) -> NodeKey {
        let ul = doc.create_element("ul");
        for item in items {
            let li = doc.create_element("li");
            doc.set_text_content(li, item).unwrap();
            doc.append_child(ul, li).unwrap();
        }
        ul
    }

    #[test]
    fn appends_and_reads_text() {
        let mut doc = Document::new();
        let ul = list(&mut doc, &["a", "b"]);
        doc.append_child(doc.root(), ul).unwrap();
        assert_eq!(doc.text_content(ul).unwrap(), "ab");
        assert_eq!(doc.children(ul).unwrap().len(), 2);
        assert_eq!(doc.parent(ul), Some(doc.root()));
    }

    #[test]
    fn element_names_are_lowercased() {
        let mut doc = Document::new();
        let el = doc.create_element("SECTION");
        assert_eq!(doc.tag_name(el), Some("section"));
        assert!(doc.is_element(el, "Section"));
    }

    #[test]
    fn rejects_cycles_and_second_parent() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner).unwrap();

        assert_eq!(
            doc.append_child(inner, outer),
            Err(DomError::CycleDetected {
                parent: inner,
                child: outer
            })
        );
        assert_eq!(
            doc.append_child(outer, outer),
            Err(DomError::CycleDetected {
                parent: outer,
                child: outer
            })
        );

        let other = doc.create_element("div");
        assert_eq!(
            doc.append_child(other, inner),
            Err(DomError::InvalidParent(inner))
        );
    }

    #[test]
    fn text_nodes_cannot_have_children() {
        let mut doc = Document::new();
        let text = doc.create_text("x");
        let el = doc.create_element("p");
        assert_eq!(doc.append_child(text, el), Err(DomError::InvalidParent(text)));
    }

    #[test]
    fn appending_fragment_moves_its_children() {
        let mut doc = Document::new();
        let fragment = doc.create_fragment();
        let a = doc.create_element("article");
        let b = doc.create_element("article");
        doc.append_child(fragment, a).unwrap();
        doc.append_child(fragment, b).unwrap();

        let main = doc.create_element("main");
        doc.append_child(main, fragment).unwrap();

        assert_eq!(doc.children(main).unwrap(), &[a, b]);
        assert!(!doc.contains(fragment));
        assert_eq!(doc.parent(a), Some(main));
    }

    #[test]
    fn remove_children_frees_whole_subtrees() {
        let mut doc = Document::new();
        let ul = list(&mut doc, &["a", "b", "c"]);
        let before = doc.len();
        let first_li = doc.children(ul).unwrap()[0];

        assert_eq!(doc.remove_children(ul).unwrap(), 3);
        assert_eq!(doc.len(), before - 6);
        assert!(!doc.contains(first_li));
        assert!(doc.children(ul).unwrap().is_empty());
    }

    #[test]
    fn removed_keys_are_never_reused() {
        let mut doc = Document::new();
        let old = doc.create_element("button");
        doc.remove(old).unwrap();
        let new = doc.create_element("button");
        assert_ne!(old, new);
        assert!(!doc.contains(old));
        assert_eq!(doc.attribute(old, "data-post-id"), None);
    }

    #[test]
    fn root_cannot_be_removed() {
        let mut doc = Document::new();
        let root = doc.root();
        assert_eq!(doc.remove(root), Err(DomError::WrongNodeKind(root)));
    }

    #[test]
    fn class_list_toggles() {
        let mut doc = Document::new();
        let section = doc.create_element("section");
        doc.add_class(section, "comments").unwrap();
        doc.add_class(section, "hide").unwrap();
        doc.add_class(section, "hide").unwrap();
        assert_eq!(doc.attribute(section, "class"), Some("comments hide"));

        assert!(!doc.toggle_class(section, "hide").unwrap());
        assert!(!doc.has_class(section, "hide"));
        assert!(doc.has_class(section, "comments"));

        assert!(doc.toggle_class(section, "hide").unwrap());
        assert_eq!(doc.attribute(section, "class"), Some("comments hide"));
    }

    #[test]
    fn attributes_on_text_nodes_are_rejected() {
        let mut doc = Document::new();
        let text = doc.create_text("x");
        assert_eq!(
            doc.set_attribute(text, "id", "a"),
            Err(DomError::WrongNodeKind(text))
        );
        assert_eq!(doc.add_class(text, "c"), Err(DomError::WrongNodeKind(text)));
    }

    #[test]
    fn flags_and_data_attributes() {
        let mut doc = Document::new();
        let select = doc.create_element("select");
        doc.set_flag(select, "disabled", true).unwrap();
        assert!(doc.has_attribute(select, "disabled"));
        assert_eq!(doc.attribute(select, "disabled"), None);
        doc.set_flag(select, "disabled", false).unwrap();
        assert!(!doc.has_attribute(select, "disabled"));

        let button = doc.create_element("button");
        doc.set_data(button, "post-id", "7").unwrap();
        assert_eq!(doc.data(button, "post-id"), Some("7"));
        assert_eq!(doc.attribute(button, "DATA-POST-ID"), Some("7"));
    }

    #[test]
    fn queries_walk_in_document_order() {
        let mut doc = Document::new();
        let main = doc.create_element("main");
        doc.append_child(doc.root(), main).unwrap();
        for id in ["1", "2"] {
            let article = doc.create_element("article");
            let button = doc.create_element("button");
            doc.set_data(button, "post-id", id).unwrap();
            let section = doc.create_element("section");
            doc.set_data(section, "post-id", id).unwrap();
            doc.append_child(article, button).unwrap();
            doc.append_child(article, section).unwrap();
            doc.append_child(main, article).unwrap();
        }
        let plain = doc.create_element("button");
        doc.append_child(main, plain).unwrap();

        let buttons = doc.query_all_with_data(main, "button", "post-id");
        let ids: Vec<_> = buttons.iter().map(|&b| doc.data(b, "post-id")).collect();
        assert_eq!(ids, vec![Some("1"), Some("2")]);
        assert_eq!(doc.query_all_tag(main, "button").len(), 3);

        let section = doc.query_data(main, "section", "post-id", "2").unwrap();
        assert!(doc.is_element(section, "section"));
        assert_eq!(doc.query_data(main, "section", "post-id", "3"), None);
        assert_eq!(doc.query_tag(doc.root(), "main"), Some(main));
    }

    #[test]
    fn element_by_id_searches_from_root() {
        let mut doc = Document::new();
        let body = doc.create_element("body");
        let select = doc.create_element("select");
        doc.set_attribute(select, "id", "selectMenu").unwrap();
        doc.append_child(body, select).unwrap();
        doc.append_child(doc.root(), body).unwrap();
        assert_eq!(doc.element_by_id("selectMenu"), Some(select));
        assert_eq!(doc.element_by_id("missing"), None);
    }

    #[test]
    fn set_text_content_replaces_children() {
        let mut doc = Document::new();
        let button = doc.create_element("button");
        doc.set_text_content(button, "Show Comments").unwrap();
        doc.set_text_content(button, "Hide Comments").unwrap();
        assert_eq!(doc.children(button).unwrap().len(), 1);
        assert_eq!(doc.text_content(button).unwrap(), "Hide Comments");
        doc.set_text_content(button, "").unwrap();
        assert!(doc.children(button).unwrap().is_empty());
    }

    #[test]
    fn materialize_mirrors_the_arena() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.add_class(p, "lead").unwrap();
        doc.set_text_content(p, "hello").unwrap();
        doc.append_child(doc.root(), p).unwrap();

        let node = doc.materialize(doc.root()).unwrap();
        let Node::Document { children, .. } = &node else {
            panic!("expected document, got {node:?}");
        };
        assert_eq!(children.len(), 1);
        assert!(children[0].is_element("p"));
        assert!(children[0].has_class("lead"));
        assert_eq!(children[0].text_content(), "hello");
    }
}
