//! Selector Components
//!
//! A compound selector such as `div#main.b.a:hover:first-child` is broken
//! into a tag, an optional id, and sorted lists of classes, structural
//! pseudo-classes and ordinary pseudo-classes. The sort means `.a.b` and
//! `.b.a` describe the same path through the style tree.
//!
//! Structural pseudo-classes are the ones resolved by a positional
//! predicate. Which names count as structural is decided by a
//! [`StructuralSelectorRegistry`] that the caller constructs and owns.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cascade::StyledElement;

/// Kind of a style tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Root,
    Tag,
    Id,
    Class,
    StructuralPseudoClass,
    PseudoClass,
}

/// One matcher inside a compound selector
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectorComponent {
    /// Tag name; empty matches any element
    Tag(String),
    Id(String),
    Class(String),
    PseudoClass(String),
    /// Pseudo-class resolved through the structural selector registry,
    /// including any argument, e.g. `nth-child(2n+1)`
    StructuralPseudoClass(String),
}

impl SelectorComponent {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Tag(_) => NodeKind::Tag,
            Self::Id(_) => NodeKind::Id,
            Self::Class(_) => NodeKind::Class,
            Self::PseudoClass(_) => NodeKind::PseudoClass,
            Self::StructuralPseudoClass(_) => NodeKind::StructuralPseudoClass,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Tag(name)
            | Self::Id(name)
            | Self::Class(name)
            | Self::PseudoClass(name)
            | Self::StructuralPseudoClass(name) => name,
        }
    }

    /// Rebuild a component from a tree node's kind and name
    pub fn from_node(kind: NodeKind, name: &str) -> Option<Self> {
        let name = name.to_string();
        Some(match kind {
            NodeKind::Root => return None,
            NodeKind::Tag => Self::Tag(name),
            NodeKind::Id => Self::Id(name),
            NodeKind::Class => Self::Class(name),
            NodeKind::PseudoClass => Self::PseudoClass(name),
            NodeKind::StructuralPseudoClass => Self::StructuralPseudoClass(name),
        })
    }
}

impl fmt::Display for SelectorComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(name) if name.is_empty() => write!(f, "*"),
            Self::Tag(name) => write!(f, "{}", name),
            Self::Id(name) => write!(f, "#{}", name),
            Self::Class(name) => write!(f, ".{}", name),
            Self::PseudoClass(name) | Self::StructuralPseudoClass(name) => write!(f, ":{}", name),
        }
    }
}

/// Selector specificity packed as (ids, classes, tags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SelectorSpecificity(pub u32);

impl SelectorSpecificity {
    pub fn new(ids: u8, classes: u8, tags: u8) -> Self {
        Self(((ids as u32) << 16) | ((classes as u32) << 8) | (tags as u32))
    }

    pub fn ids(&self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    pub fn classes(&self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    pub fn tags(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Component-wise sum, saturating each field
    pub fn combine(self, other: Self) -> Self {
        Self::new(
            self.ids().saturating_add(other.ids()),
            self.classes().saturating_add(other.classes()),
            self.tags().saturating_add(other.tags()),
        )
    }
}

/// One space-delimited fragment of a selector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    /// Empty for the wildcard
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub structural_pseudo_classes: Vec<String>,
    pub pseudo_classes: Vec<String>,
}

impl CompoundSelector {
    /// Decompose a compound selector. Never fails: text without a known
    /// prefix is taken as the tag name.
    pub fn parse(text: &str, registry: &StructuralSelectorRegistry) -> Self {
        let mut compound = CompoundSelector::default();

        let boundaries: Vec<usize> = text
            .char_indices()
            .filter(|&(i, c)| i > 0 && matches!(c, '#' | '.' | ':'))
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();

        let mut start = 0;
        for end in boundaries {
            let identifier = &text[start..end];
            start = end;

            let mut chars = identifier.chars();
            match chars.next() {
                Some('#') => {
                    if !chars.as_str().is_empty() {
                        compound.id = Some(chars.as_str().to_string());
                    }
                }
                Some('.') => {
                    if !chars.as_str().is_empty() {
                        compound.classes.push(chars.as_str().to_string());
                    }
                }
                Some(':') => {
                    let name = chars.as_str();
                    if name.is_empty() {
                        continue;
                    }
                    if registry.is_registered(name) {
                        compound.structural_pseudo_classes.push(name.to_string());
                    } else {
                        compound.pseudo_classes.push(name.to_string());
                    }
                }
                Some(_) => compound.tag = identifier.to_string(),
                None => {}
            }
        }

        if compound.tag == "*" {
            compound.tag.clear();
        }
        compound.classes.sort();
        compound.structural_pseudo_classes.sort();
        compound.pseudo_classes.sort();
        compound
    }

    /// Components in tree descent order: tag (always), id, classes,
    /// structural pseudo-classes, pseudo-classes
    pub fn components(&self) -> Vec<SelectorComponent> {
        let mut components = Vec::with_capacity(
            2 + self.classes.len() + self.structural_pseudo_classes.len() + self.pseudo_classes.len(),
        );
        components.push(SelectorComponent::Tag(self.tag.clone()));
        if let Some(id) = &self.id {
            components.push(SelectorComponent::Id(id.clone()));
        }
        components.extend(self.classes.iter().cloned().map(SelectorComponent::Class));
        components.extend(
            self.structural_pseudo_classes
                .iter()
                .cloned()
                .map(SelectorComponent::StructuralPseudoClass),
        );
        components.extend(self.pseudo_classes.iter().cloned().map(SelectorComponent::PseudoClass));
        components
    }

    /// Rebuild from a run of components (as stored along a tree path)
    pub fn from_components<'c>(components: impl IntoIterator<Item = &'c SelectorComponent>) -> Self {
        let mut compound = CompoundSelector::default();
        for component in components {
            match component {
                SelectorComponent::Tag(name) => compound.tag = name.clone(),
                SelectorComponent::Id(name) => compound.id = Some(name.clone()),
                SelectorComponent::Class(name) => compound.classes.push(name.clone()),
                SelectorComponent::StructuralPseudoClass(name) => {
                    compound.structural_pseudo_classes.push(name.clone())
                }
                SelectorComponent::PseudoClass(name) => compound.pseudo_classes.push(name.clone()),
            }
        }
        compound
    }

    pub fn specificity(&self) -> SelectorSpecificity {
        let clamp = |n: usize| n.min(u8::MAX as usize) as u8;
        SelectorSpecificity::new(
            self.id.is_some() as u8,
            clamp(self.classes.len() + self.structural_pseudo_classes.len() + self.pseudo_classes.len()),
            !self.tag.is_empty() as u8,
        )
    }

    /// Check this compound against a single element
    pub fn matches(&self, element: &dyn StyledElement, registry: &StructuralSelectorRegistry) -> bool {
        if !self.tag.is_empty() && self.tag != element.tag_name() {
            return false;
        }
        if let Some(id) = &self.id {
            if element.id() != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| element.has_class(c))
            && self
                .structural_pseudo_classes
                .iter()
                .all(|s| registry.is_applicable(s, element))
            && self.pseudo_classes.iter().all(|p| element.has_pseudo_class(p))
    }
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let components = self.components();
        for component in &components {
            // A bare wildcard is only printed when nothing else follows
            if matches!(component, SelectorComponent::Tag(t) if t.is_empty()) && components.len() > 1 {
                continue;
            }
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones
pub fn expand_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `An+B` argument of the `nth-*` pseudo-classes. Matches every 1-based
/// position equal to `step * k + offset` for some `k >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthExpression {
    pub step: i32,
    pub offset: i32,
}

impl NthExpression {
    pub fn new(step: i32, offset: i32) -> Self {
        Self { step, offset }
    }

    /// Accepts `odd`, `even`, a bare integer, or `An+B` with optional
    /// whitespace and an implied `1` for a bare `n`.
    pub fn parse(text: &str) -> Option<Self> {
        let text: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match text.as_str() {
            "odd" => return Some(Self::new(2, 1)),
            "even" => return Some(Self::new(2, 0)),
            _ => {}
        }

        let Some((step, offset)) = text.split_once('n') else {
            return text.parse().ok().map(|offset| Self::new(0, offset));
        };
        let step = match step {
            "" | "+" => 1,
            "-" => -1,
            other => other.parse().ok()?,
        };
        let offset = match offset {
            "" => 0,
            other => other.strip_prefix('+').unwrap_or(other).parse().ok()?,
        };
        Some(Self::new(step, offset))
    }

    pub fn matches(&self, position: usize) -> bool {
        let Ok(position) = i64::try_from(position) else {
            return false;
        };
        let Some(distance) = position.checked_sub(i64::from(self.offset)) else {
            return false;
        };
        let step = i64::from(self.step);
        match step.cmp(&0) {
            Ordering::Equal => distance == 0,
            Ordering::Greater => distance >= 0 && distance.checked_rem(step) == Some(0),
            Ordering::Less => distance <= 0 && distance.checked_rem(step) == Some(0),
        }
    }
}

impl Default for NthExpression {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

/// Positional predicate behind a structural pseudo-class
pub trait StructuralSelector: Send + Sync {
    /// `nth` is the parsed argument, or the default `1` when none was given
    fn is_applicable(&self, element: &dyn StyledElement, nth: NthExpression) -> bool;
}

/// Stock positional selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionalSelector {
    FirstChild,
    LastChild,
    OnlyChild,
    NthChild,
    NthLastChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthOfType,
    NthLastOfType,
    Empty,
}

impl StructuralSelector for PositionalSelector {
    fn is_applicable(&self, element: &dyn StyledElement, nth: NthExpression) -> bool {
        let index = element.sibling_index();
        let count = element.sibling_count();
        let type_index = element.type_index();
        let type_count = element.type_count();
        let from_end = |i: usize, n: usize| n.saturating_sub(i).saturating_add(1);

        match self {
            Self::FirstChild => index == 1,
            Self::LastChild => index == count,
            Self::OnlyChild => count == 1,
            Self::NthChild => nth.matches(index),
            Self::NthLastChild => nth.matches(from_end(index, count)),
            Self::FirstOfType => type_index == 1,
            Self::LastOfType => type_index == type_count,
            Self::OnlyOfType => type_count == 1,
            Self::NthOfType => nth.matches(type_index),
            Self::NthLastOfType => nth.matches(from_end(type_index, type_count)),
            Self::Empty => element.child_count() == 0,
        }
    }
}

/// Registry of structural pseudo-class predicates, keyed by name
#[derive(Default)]
pub struct StructuralSelectorRegistry {
    selectors: HashMap<String, Box<dyn StructuralSelector>>,
}

impl fmt::Debug for StructuralSelectorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.selectors.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("StructuralSelectorRegistry").field("selectors", &names).finish()
    }
}

impl StructuralSelectorRegistry {
    /// Empty registry: every pseudo-class is treated as ordinary
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the stock positional selectors
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (name, selector) in [
            ("first-child", PositionalSelector::FirstChild),
            ("last-child", PositionalSelector::LastChild),
            ("only-child", PositionalSelector::OnlyChild),
            ("nth-child", PositionalSelector::NthChild),
            ("nth-last-child", PositionalSelector::NthLastChild),
            ("first-of-type", PositionalSelector::FirstOfType),
            ("last-of-type", PositionalSelector::LastOfType),
            ("only-of-type", PositionalSelector::OnlyOfType),
            ("nth-of-type", PositionalSelector::NthOfType),
            ("nth-last-of-type", PositionalSelector::NthLastOfType),
            ("empty", PositionalSelector::Empty),
        ] {
            registry.register(name, Box::new(selector));
        }
        registry
    }

    /// Register a selector, replacing any existing one with that name
    pub fn register(&mut self, name: &str, selector: Box<dyn StructuralSelector>) {
        self.selectors.insert(name.to_ascii_lowercase(), selector);
    }

    /// Whether `name` (with or without an argument) names a structural selector
    pub fn is_registered(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Predicate for `name`; any `(...)` argument is ignored for lookup
    pub fn get(&self, name: &str) -> Option<&dyn StructuralSelector> {
        let (base, _) = split_argument(name);
        self.selectors.get(&base.to_ascii_lowercase()).map(|s| s.as_ref())
    }

    /// Evaluate a structural pseudo-class such as `nth-child(odd)`.
    /// Unknown names and unparseable arguments never match.
    pub fn is_applicable(&self, name: &str, element: &dyn StyledElement) -> bool {
        let Some(selector) = self.get(name) else {
            return false;
        };
        let nth = match split_argument(name).1 {
            Some(argument) => match NthExpression::parse(argument) {
                Some(nth) => nth,
                None => return false,
            },
            None => NthExpression::default(),
        };
        selector.is_applicable(element, nth)
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

/// `nth-child(2n+1)` -> (`nth-child`, Some(`2n+1`))
fn split_argument(name: &str) -> (&str, Option<&str>) {
    match name.split_once('(') {
        Some((base, rest)) => (base.trim(), Some(rest.trim_end_matches(')').trim())),
        None => (name.trim(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compound() {
        let registry = StructuralSelectorRegistry::with_defaults();
        let compound = CompoundSelector::parse("div#main.b.a:hover:first-child", &registry);

        assert_eq!(compound.tag, "div");
        assert_eq!(compound.id.as_deref(), Some("main"));
        assert_eq!(compound.classes, vec!["a", "b"]);
        assert_eq!(compound.structural_pseudo_classes, vec!["first-child"]);
        assert_eq!(compound.pseudo_classes, vec!["hover"]);
    }

    #[test]
    fn test_descent_order() {
        let registry = StructuralSelectorRegistry::with_defaults();
        let compound = CompoundSelector::parse(":hover.z#x:last-child", &registry);

        assert_eq!(
            compound.components(),
            vec![
                SelectorComponent::Tag(String::new()),
                SelectorComponent::Id("x".into()),
                SelectorComponent::Class("z".into()),
                SelectorComponent::StructuralPseudoClass("last-child".into()),
                SelectorComponent::PseudoClass("hover".into()),
            ]
        );
    }

    #[test]
    fn test_class_order_is_irrelevant() {
        let registry = StructuralSelectorRegistry::new();
        assert_eq!(
            CompoundSelector::parse(".a.b", &registry),
            CompoundSelector::parse(".b.a", &registry)
        );
    }

    #[test]
    fn test_registry_decides_structural() {
        let empty = StructuralSelectorRegistry::new();
        let compound = CompoundSelector::parse("li:first-child", &empty);
        assert_eq!(compound.pseudo_classes, vec!["first-child"]);
        assert!(compound.structural_pseudo_classes.is_empty());
    }

    #[test]
    fn test_nth_argument_lookup() {
        let registry = StructuralSelectorRegistry::with_defaults();
        assert!(registry.is_registered("nth-child(2n+1)"));
        assert!(registry.is_registered("NTH-OF-TYPE(3)"));
        assert!(!registry.is_registered("hover"));
    }

    #[test]
    fn test_wildcard_tag() {
        let registry = StructuralSelectorRegistry::new();
        let compound = CompoundSelector::parse("*.x", &registry);
        assert_eq!(compound.tag, "");
        assert_eq!(compound.to_string(), ".x");
    }

    #[test]
    fn test_specificity() {
        let registry = StructuralSelectorRegistry::new();
        let s = CompoundSelector::parse("p#a.b.c:hover", &registry).specificity();
        assert_eq!(s.ids(), 1);
        assert_eq!(s.classes(), 3);
        assert_eq!(s.tags(), 1);
        assert!(s > CompoundSelector::parse("p.b.c.d.e", &registry).specificity());
    }

    #[test]
    fn test_expand_list() {
        assert_eq!(expand_list(" h1 ,h2,, div p "), vec!["h1", "h2", "div p"]);
        assert!(expand_list("  ").is_empty());
    }

    #[test]
    fn test_nth_parse() {
        assert_eq!(NthExpression::parse("odd"), Some(NthExpression::new(2, 1)));
        assert_eq!(NthExpression::parse("EVEN"), Some(NthExpression::new(2, 0)));
        assert_eq!(NthExpression::parse("4"), Some(NthExpression::new(0, 4)));
        assert_eq!(NthExpression::parse("3n"), Some(NthExpression::new(3, 0)));
        assert_eq!(NthExpression::parse(" 2n + 1 "), Some(NthExpression::new(2, 1)));
        assert_eq!(NthExpression::parse("-n+3"), Some(NthExpression::new(-1, 3)));
        assert_eq!(NthExpression::parse("+n-1"), Some(NthExpression::new(1, -1)));
        assert_eq!(NthExpression::parse("n+x"), None);
        assert_eq!(NthExpression::parse("banana"), None);
    }

    #[test]
    fn test_nth_matches() {
        let odd = NthExpression::new(2, 1);
        assert!(odd.matches(1) && !odd.matches(2) && odd.matches(3));

        let first_three = NthExpression::new(-1, 3);
        assert!(first_three.matches(1) && first_three.matches(3));
        assert!(!first_three.matches(4));

        let only_second = NthExpression::new(0, 2);
        assert!(only_second.matches(2) && !only_second.matches(4));

        let every_third = NthExpression::new(3, -1);
        assert!(every_third.matches(2) && every_third.matches(5) && !every_third.matches(3));
    }

    #[test]
    fn test_nth_extreme_offsets() {
        let low = NthExpression::parse("n-2147483648").unwrap();
        assert_eq!(low, NthExpression::new(1, i32::MIN));
        assert!(low.matches(1));

        assert!(!NthExpression::new(-1, i32::MIN).matches(1));
        assert!(!NthExpression::new(i32::MIN, i32::MAX).matches(1));
        assert!(!NthExpression::new(i32::MIN, 0).matches(usize::MAX));
        assert!(NthExpression::new(0, i32::MAX).matches(i32::MAX as usize));
    }

    #[test]
    fn test_positional_selectors() {
        use crate::cascade::tests::TestElement;

        let registry = StructuralSelectorRegistry::with_defaults();
        let list = TestElement::root("ul");
        let second = list.child("li", 2, 3);

        assert!(registry.is_applicable("nth-child(2)", &second));
        assert!(registry.is_applicable("nth-last-child(2)", &second));
        assert!(registry.is_applicable("nth-child(-n+2)", &second));
        assert!(!registry.is_applicable("nth-child(odd)", &second));
        assert!(!registry.is_applicable("first-child", &second));
        assert!(registry.is_applicable("nth-of-type(even)", &second));
        assert!(registry.is_applicable("nth-child(n-2147483648)", &second));
        assert!(!registry.is_applicable("nth-last-child(-2147483648)", &second));
        assert!(!registry.is_applicable("nth-child(banana)", &second));
    }
}
