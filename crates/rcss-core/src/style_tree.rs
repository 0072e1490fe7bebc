//! Specificity Tree
//!
//! Rules are stored in a tree of selector components. Each node is one
//! component (tag, id, class, ...) below its parent, so the path from the
//! root to a node spells out a selector. A rule's declarations land on the
//! node at the end of its selector path, tagged with the rule's
//! specificity.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Children are
//! keyed by `(kind, name)`, so two children never share a key.

use std::collections::BTreeMap;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::properties::{PropertyDictionary, Specificity};
use crate::selectors::{CompoundSelector, NodeKind, SelectorComponent, StructuralSelectorRegistry};

/// Index of a node in a [`StyleTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One selector path prefix
#[derive(Debug, Clone)]
pub struct StyleTreeNode {
    kind: NodeKind,
    name: String,
    parent: Option<NodeId>,
    properties: PropertyDictionary,
    children: BTreeMap<(NodeKind, String), NodeId>,
}

impl StyleTreeNode {
    fn new(kind: NodeKind, name: String, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            name,
            parent,
            properties: PropertyDictionary::new(),
            children: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Declarations attached directly at this node
    pub fn properties(&self) -> &PropertyDictionary {
        &self.properties
    }

    /// Child ids in (kind, name) order
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.values().copied()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// The selector component this node stands for; `None` for the root
    pub fn component(&self) -> Option<SelectorComponent> {
        SelectorComponent::from_node(self.kind, &self.name)
    }
}

/// Arena-backed tree of style nodes
#[derive(Debug, Clone)]
pub struct StyleTree {
    nodes: Vec<StyleTreeNode>,
}

impl Default for StyleTree {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleTree {
    /// Tree holding only the root
    pub fn new() -> Self {
        Self {
            nodes: vec![StyleTreeNode::new(NodeKind::Root, String::new(), None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn get(&self, id: NodeId) -> Option<&StyleTreeNode> {
        self.nodes.get(id.index())
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing but the root exists
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn child(&self, parent: NodeId, kind: NodeKind, name: &str) -> Option<NodeId> {
        self.get(parent)?.children.get(&(kind, name.to_string())).copied()
    }

    /// Existing child with this key, or a new one
    pub fn get_or_create_child(&mut self, parent: NodeId, kind: NodeKind, name: &str) -> NodeId {
        let key = (kind, name.to_string());
        if let Some(&id) = self.nodes[parent.index()].children.get(&key) {
            return id;
        }

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(StyleTreeNode::new(kind, key.1.clone(), Some(parent)));
        self.nodes[parent.index()].children.insert(key, id);
        id
    }

    /// Merge a rule's declarations into the tree for one selector (one
    /// entry of a selector list). Whitespace separates compound selectors,
    /// which nest as tree depth. Returns the leaf that received the
    /// properties.
    pub fn import_properties(
        &mut self,
        selector: &str,
        properties: &PropertyDictionary,
        specificity: Specificity,
        registry: &StructuralSelectorRegistry,
    ) -> NodeId {
        let mut leaf = self.root();
        for compound in selector.split_whitespace() {
            for component in CompoundSelector::parse(compound, registry).components() {
                leaf = self.get_or_create_child(leaf, component.kind(), component.name());
            }
        }

        self.nodes[leaf.index()]
            .properties
            .import_with_specificity(properties, specificity);
        leaf
    }

    /// Follow a component path from the root without creating nodes
    pub fn find(&self, path: &[SelectorComponent]) -> Option<NodeId> {
        path.iter()
            .try_fold(self.root(), |node, component| self.child(node, component.kind(), component.name()))
    }

    /// Resolve selector text to its node, if the tree has one
    pub fn lookup(&self, selector: &str, registry: &StructuralSelectorRegistry) -> Option<NodeId> {
        let path: Vec<SelectorComponent> = selector
            .split_whitespace()
            .flat_map(|compound| CompoundSelector::parse(compound, registry).components())
            .collect();
        self.find(&path)
    }

    /// Components from the root down to `id`
    pub fn path(&self, id: NodeId) -> Vec<SelectorComponent> {
        let mut path = Vec::new();
        let mut current = self.get(id);
        while let Some(node) = current {
            if let Some(component) = node.component() {
                path.push(component);
            }
            current = node.parent.and_then(|p| self.get(p));
        }
        path.reverse();
        path
    }

    /// The compound selectors spelled by the path to `id`. Every compound
    /// starts at a tag node.
    pub fn selector_chain(&self, id: NodeId) -> Vec<CompoundSelector> {
        let path = self.path(id);
        let mut chain = Vec::new();
        let mut start = 0;
        for i in 1..=path.len() {
            if i == path.len() || path[i].kind() == NodeKind::Tag {
                if i > start {
                    chain.push(CompoundSelector::from_components(&path[start..i]));
                }
                start = i;
            }
        }
        chain
    }

    /// Nodes carrying at least one declaration, in arena order
    pub fn styled_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.properties.is_empty())
            .map(|(i, _)| NodeId(i as u32))
    }

    /// Copy every node and declaration of `other` into this tree. Incoming
    /// specificities are shifted by `offset` before the usual
    /// higher-or-equal-wins merge.
    pub fn merge(&mut self, other: &StyleTree, offset: u32) {
        let mut stack = vec![(other.root(), self.root())];
        while let Some((from, to)) = stack.pop() {
            let source = &other[from];
            self.nodes[to.index()].properties.merge(&source.properties, offset);
            for child in source.children() {
                let child_node = &other[child];
                let target = self.get_or_create_child(to, child_node.kind, &child_node.name);
                stack.push((child, target));
            }
        }
    }

    /// Owned, order-stable copy of the tree for comparison and dumping
    pub fn snapshot(&self) -> StyleTreeSnapshot {
        self.snapshot_node(self.root())
    }

    fn snapshot_node(&self, id: NodeId) -> StyleTreeSnapshot {
        let node = &self[id];
        StyleTreeSnapshot {
            kind: node.kind,
            name: node.name.clone(),
            properties: node.properties.clone(),
            children: node.children().map(|child| self.snapshot_node(child)).collect(),
        }
    }
}

impl Index<NodeId> for StyleTree {
    type Output = StyleTreeNode;

    fn index(&self, id: NodeId) -> &StyleTreeNode {
        &self.nodes[id.index()]
    }
}

/// Structural copy of a subtree, children in key order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleTreeSnapshot {
    pub kind: NodeKind,
    pub name: String,
    pub properties: PropertyDictionary,
    pub children: Vec<StyleTreeSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::PropertyValue;

    fn dict(name: &str, value: &str) -> PropertyDictionary {
        let mut d = PropertyDictionary::new();
        d.set(name, PropertyValue::Raw(value.into()), Specificity::default());
        d
    }

    fn tag(name: &str) -> SelectorComponent {
        SelectorComponent::Tag(name.into())
    }

    #[test]
    fn test_class_path_under_wildcard_tag() {
        let registry = StructuralSelectorRegistry::new();
        let mut tree = StyleTree::new();
        let leaf = tree.import_properties(".foo", &dict("color", "red"), Specificity(0), &registry);

        assert_eq!(tree.find(&[tag(""), SelectorComponent::Class("foo".into())]), Some(leaf));
        assert_eq!(tree.len(), 3);
        assert_eq!(tree[leaf].properties().get("color").unwrap().specificity, Specificity(0));
    }

    #[test]
    fn test_children_are_unique() {
        let registry = StructuralSelectorRegistry::new();
        let mut tree = StyleTree::new();
        let a = tree.import_properties("div.x", &dict("top", "1px"), Specificity(0), &registry);
        let b = tree.import_properties("div.x", &dict("left", "2px"), Specificity(1), &registry);

        assert_eq!(a, b);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree[a].properties().len(), 2);
    }

    #[test]
    fn test_descendant_depth() {
        let registry = StructuralSelectorRegistry::new();
        let mut tree = StyleTree::new();
        let leaf = tree.import_properties("div p.note", &dict("color", "red"), Specificity(0), &registry);

        assert_eq!(
            tree.path(leaf),
            vec![tag("div"), tag("p"), SelectorComponent::Class("note".into())]
        );
        let chain = tree.selector_chain(leaf);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].tag, "div");
        assert_eq!(chain[1].classes, vec!["note"]);
    }

    #[test]
    fn test_lower_specificity_does_not_overwrite() {
        let registry = StructuralSelectorRegistry::new();
        let mut tree = StyleTree::new();
        let leaf = tree.import_properties("p", &dict("color", "red"), Specificity(3), &registry);
        tree.import_properties("p", &dict("color", "blue"), Specificity(1), &registry);

        assert_eq!(tree[leaf].properties().value("color"), Some(&PropertyValue::Raw("red".into())));
    }

    #[test]
    fn test_lookup() {
        let registry = StructuralSelectorRegistry::with_defaults();
        let mut tree = StyleTree::new();
        let leaf = tree.import_properties("li:first-child.b.a", &dict("x", "y"), Specificity(0), &registry);

        assert_eq!(tree.lookup("li.a.b:first-child", &registry), Some(leaf));
        assert_eq!(tree.lookup("li.a", &registry).map(|id| tree[id].properties().is_empty()), Some(true));
        assert_eq!(tree.lookup("ul", &registry), None);
    }

    #[test]
    fn test_merge_shifts_specificity() {
        let registry = StructuralSelectorRegistry::new();
        let mut base = StyleTree::new();
        let leaf = base.import_properties("p", &dict("color", "red"), Specificity(4), &registry);

        let mut extra = StyleTree::new();
        extra.import_properties("p", &dict("color", "blue"), Specificity(0), &registry);
        extra.import_properties("a", &dict("color", "green"), Specificity(1), &registry);

        base.merge(&extra, 5);
        let color = base[leaf].properties().get("color").unwrap();
        assert_eq!(color.value, PropertyValue::Raw("blue".into()));
        assert_eq!(color.specificity, Specificity(5));
        assert!(base.lookup("a", &registry).is_some());
    }

    #[test]
    fn test_snapshot_equality() {
        let registry = StructuralSelectorRegistry::new();
        let mut a = StyleTree::new();
        let mut b = StyleTree::new();
        a.import_properties("p", &dict("x", "1"), Specificity(0), &registry);
        a.import_properties("div", &dict("x", "2"), Specificity(1), &registry);
        b.import_properties("div", &dict("x", "2"), Specificity(1), &registry);
        b.import_properties("p", &dict("x", "1"), Specificity(0), &registry);

        assert_eq!(a.snapshot(), b.snapshot());
    }
}
