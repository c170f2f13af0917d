//! Snapshot-once conversion cache.
//!
//! Text nodes are collected a single time. Each entry keeps its original
//! text and, after the first conversion, the converted text, so every later
//! toggle is a replay that never walks the tree or calls the converter again.

use super::{ScriptConverter, ToggleState, Variant};
use crate::config::Region;
use crate::dom::{DomNode, DomTree, NodePath, NodeType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSnapshot {
    pub path: NodePath,
    pub original: String,
    /// Filled on the first conversion, then reused.
    pub converted: Option<String>,
}

fn matches_region(node: &DomNode, region: &Region) -> bool {
    if node.node_type != NodeType::Element {
        return false;
    }
    match region {
        Region::Id(id) => node.id() == Some(id.as_str()),
        Region::Class(class) => node.has_class(class),
        Region::Link(href) => node.tag == "a" && node.attr("href") == Some(href.as_str()),
    }
}

/// Every text node under `<body>`, in document order, outside `excluded`.
pub fn snapshot(tree: &DomTree, excluded: &[Region]) -> Vec<TextSnapshot> {
    let mut out = Vec::new();
    let body_path = tree.body_path();
    if let Some(body) = tree.root.node_at(&body_path) {
        collect(body, body_path, excluded, &mut out);
    }
    out
}

fn collect(node: &DomNode, path: NodePath, excluded: &[Region], out: &mut Vec<TextSnapshot>) {
    if node.is_text() {
        out.push(TextSnapshot {
            original: node.text.clone(),
            path,
            converted: None,
        });
        return;
    }
    if excluded.iter().any(|region| matches_region(node, region)) {
        return;
    }
    for (idx, child) in node.children.iter().enumerate() {
        collect(child, path.child(idx), excluded, out);
    }
}

/// Two-state toggle over a fixed set of text snapshots.
#[derive(Debug, Clone)]
pub struct TextConversionCache {
    entries: Vec<TextSnapshot>,
    state: ToggleState,
    original_variant: Variant,
}

impl TextConversionCache {
    pub fn new(entries: Vec<TextSnapshot>, original_variant: Variant) -> Self {
        Self {
            entries,
            state: ToggleState::Original,
            original_variant,
        }
    }

    pub fn build(tree: &DomTree, excluded: &[Region], original_variant: Variant) -> Self {
        let entries = snapshot(tree, excluded);
        log::debug!("Snapshotted {} text nodes", entries.len());
        Self::new(entries, original_variant)
    }

    pub fn entries(&self) -> &[TextSnapshot] {
        &self.entries
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    pub fn original_variant(&self) -> Variant {
        self.original_variant
    }

    /// Variant the tree currently shows.
    pub fn displayed_variant(&self) -> Variant {
        match self.state {
            ToggleState::Original => self.original_variant,
            ToggleState::Converted => self.original_variant.other(),
        }
    }

    /// Flip between original and converted text, writing into `tree`.
    pub fn toggle(&mut self, tree: &mut DomTree, converter: &dyn ScriptConverter) -> ToggleState {
        match self.state {
            ToggleState::Original => {
                let from = self.original_variant;
                let mut convert = converter.converter(from, from.other());
                for entry in &mut self.entries {
                    let text = entry
                        .converted
                        .get_or_insert_with(|| convert(&entry.original));
                    write(tree, &entry.path, text);
                }
                self.state = ToggleState::Converted;
            }
            ToggleState::Converted => {
                for entry in &self.entries {
                    write(tree, &entry.path, &entry.original);
                }
                self.state = ToggleState::Original;
            }
        }
        self.state
    }
}

fn write(tree: &mut DomTree, path: &NodePath, text: &str) {
    if !tree.set_text(path, text) {
        log::warn!("Text node at {:?} disappeared", path);
    }
}
