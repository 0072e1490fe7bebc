//! Style Cascade & Resolver
//!
//! Matches elements against a parsed [`StyleTree`] and resolves which
//! declaration wins for every property:
//! 1. Every tree node whose selector chain matches the element contributes
//! 2. Contributions are ordered by selector specificity, then rule order
//! 3. Later contributions override earlier ones

use crate::properties::{Property, PropertyDictionary};
use crate::selectors::{CompoundSelector, SelectorSpecificity, StructuralSelectorRegistry};
use crate::style_tree::{NodeId, StyleTree};

/// Element view needed for selector matching
///
/// Positions are 1-based. The "type" variants only count siblings sharing
/// the element's tag name.
pub trait StyledElement {
    fn tag_name(&self) -> &str;

    fn id(&self) -> Option<&str>;

    fn has_class(&self, class: &str) -> bool;

    /// Dynamic state such as `hover` or `checked`
    fn has_pseudo_class(&self, pseudo_class: &str) -> bool;

    fn sibling_index(&self) -> usize;

    fn sibling_count(&self) -> usize;

    fn type_index(&self) -> usize;

    fn type_count(&self) -> usize;

    fn child_count(&self) -> usize;

    fn parent(&self) -> Option<Self>
    where
        Self: Sized;
}

/// Check a compound chain with descendant semantics: the last compound
/// must match `element`, the earlier ones its ancestors in order.
pub fn matches_chain<E: StyledElement>(
    chain: &[CompoundSelector],
    element: &E,
    registry: &StructuralSelectorRegistry,
) -> bool {
    let Some((last, ancestors)) = chain.split_last() else {
        return false;
    };
    if !last.matches(element, registry) {
        return false;
    }

    let mut candidate = element.parent();
    for compound in ancestors.iter().rev() {
        loop {
            let Some(current) = candidate else {
                return false;
            };
            let matched = compound.matches(&current, registry);
            candidate = current.parent();
            if matched {
                break;
            }
        }
    }
    true
}

/// Style resolver over one style tree
pub struct StyleResolver<'a> {
    tree: &'a StyleTree,
    registry: &'a StructuralSelectorRegistry,
}

impl<'a> StyleResolver<'a> {
    pub fn new(tree: &'a StyleTree, registry: &'a StructuralSelectorRegistry) -> Self {
        Self { tree, registry }
    }

    /// Styled nodes applying to `element`, with their selector specificity
    pub fn matching_nodes<E: StyledElement>(&self, element: &E) -> Vec<(NodeId, SelectorSpecificity)> {
        self.tree
            .styled_nodes()
            .filter_map(|id| {
                let chain = self.tree.selector_chain(id);
                matches_chain(&chain, element, self.registry).then(|| {
                    let specificity = chain
                        .iter()
                        .fold(SelectorSpecificity::default(), |acc, c| acc.combine(c.specificity()));
                    (id, specificity)
                })
            })
            .collect()
    }

    /// Compute the winning declaration of every property for `element`
    pub fn compute<E: StyledElement>(&self, element: &E) -> PropertyDictionary {
        let mut matches: Vec<(&str, &Property, SelectorSpecificity)> = Vec::new();
        for (id, selector_specificity) in self.matching_nodes(element) {
            for (name, property) in self.tree[id].properties().iter() {
                matches.push((name, property, selector_specificity));
            }
        }

        // Stable sort: selector specificity first, then rule order
        matches.sort_by(|a, b| a.2.cmp(&b.2).then(a.1.specificity.cmp(&b.1.specificity)));

        let mut style = PropertyDictionary::new();
        for (name, property, _) in matches {
            style.set(name, property.value.clone(), property.specificity);
        }
        style
    }
}
