pub mod parser;

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Element,
    Text,
}

/// Child-index path from the tree root to a node.
///
/// Paths are stable as long as the tree's shape is not changed, which holds
/// for text toggling: only text payloads are rewritten, never children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(pub Vec<usize>);

impl NodePath {
    pub fn child(&self, idx: usize) -> NodePath {
        let mut steps = self.0.clone();
        steps.push(idx);
        NodePath(steps)
    }
}

/// Owned, mutable DOM node.
#[derive(Debug, Clone)]
pub struct DomNode {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub text: String,
    pub children: Vec<DomNode>,
    pub node_type: NodeType,
}

impl DomNode {
    pub fn document(children: Vec<DomNode>) -> Self {
        Self {
            tag: "#document".into(),
            attributes: HashMap::new(),
            text: String::new(),
            children,
            node_type: NodeType::Document,
        }
    }

    pub fn element(
        tag: impl Into<String>,
        attrs: HashMap<String, String>,
        children: Vec<DomNode>,
    ) -> Self {
        Self {
            tag: tag.into(),
            attributes: attrs,
            text: String::new(),
            children,
            node_type: NodeType::Element,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            tag: String::new(),
            attributes: HashMap::new(),
            text: content.into(),
            children: Vec::new(),
            node_type: NodeType::Text,
        }
    }

    /// Collect all text content recursively
    pub fn collect_text(&self) -> String {
        let mut buf = String::new();
        self.collect_text_inner(&mut buf);
        buf
    }

    fn collect_text_inner(&self, buf: &mut String) {
        if !self.text.is_empty() {
            if !buf.is_empty() {
                buf.push(' ');
            }
            buf.push_str(self.text.trim());
        }
        for child in &self.children {
            child.collect_text_inner(buf);
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|name| name == class))
            .unwrap_or(false)
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Depth-first search for the first element carrying `id`.
    pub fn find_by_id(&self, id: &str) -> Option<&DomNode> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_id(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut DomNode> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_by_id_mut(id))
    }

    /// Path of the first node (depth-first, pre-order) matching `pred`.
    pub fn find_path(&self, pred: &dyn Fn(&DomNode) -> bool) -> Option<NodePath> {
        fn walk(
            node: &DomNode,
            path: NodePath,
            pred: &dyn Fn(&DomNode) -> bool,
        ) -> Option<NodePath> {
            if pred(node) {
                return Some(path);
            }
            node.children
                .iter()
                .enumerate()
                .find_map(|(idx, child)| walk(child, path.child(idx), pred))
        }
        walk(self, NodePath::default(), pred)
    }

    pub fn node_at(&self, path: &NodePath) -> Option<&DomNode> {
        path.0
            .iter()
            .try_fold(self, |node, &idx| node.children.get(idx))
    }

    pub fn node_at_mut(&mut self, path: &NodePath) -> Option<&mut DomNode> {
        path.0
            .iter()
            .try_fold(self, |node, &idx| node.children.get_mut(idx))
    }
}

/// Parsed, mutable page.
#[derive(Debug, Clone)]
pub struct DomTree {
    pub root: DomNode,
}

impl DomTree {
    /// Visible text of the whole page, space-joined.
    pub fn visible_text(&self) -> String {
        self.root.collect_text()
    }

    /// Path of `<body>`, or the root when the tree has none.
    pub fn body_path(&self) -> NodePath {
        self.root
            .find_path(&|n: &DomNode| n.node_type == NodeType::Element && n.tag == "body")
            .unwrap_or_default()
    }

    /// Visible text under `<body>`.
    pub fn body_text(&self) -> String {
        self.root
            .node_at(&self.body_path())
            .map(DomNode::collect_text)
            .unwrap_or_default()
    }

    /// Overwrite the payload of the text node at `path`.
    ///
    /// Returns `false` when the path no longer points at a text node.
    pub fn set_text(&mut self, path: &NodePath, text: &str) -> bool {
        match self.root.node_at_mut(path) {
            Some(node) if node.is_text() => {
                node.text.clear();
                node.text.push_str(text);
                true
            }
            _ => false,
        }
    }
}
