//! rcss Stylesheet Parser & Style Tree
//!
//! Parses RCSS stylesheets (a restricted CSS dialect: tag, id, class,
//! pseudo-class and structural pseudo-class selectors, flat declaration
//! blocks, `@keyframes`) into a specificity tree that can be matched
//! against document elements.

pub mod cascade;
pub mod config;
mod declarations;
pub mod diagnostics;
mod error;
pub mod keyframes;
pub mod parser;
pub mod properties;
mod reader;
pub mod selectors;
pub mod stream;
pub mod style_tree;
mod stylesheet;

pub use cascade::{StyleResolver, StyledElement};
pub use config::ParserConfig;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::CssError;
pub use keyframes::{KeyframeBlock, KeyframesMap, KeyframesSequence};
pub use parser::StyleSheetParser;
pub use properties::{DeclarationParser, Property, PropertyDictionary, PropertySpecification, PropertyValue, Specificity};
pub use reader::BufferedReader;
pub use selectors::{SelectorComponent, StructuralSelectorRegistry};
pub use stream::{ByteStream, MemoryStream, ReaderStream};
pub use style_tree::{NodeId, StyleTree, StyleTreeNode, StyleTreeSnapshot};
pub use stylesheet::{StyleSheet, StyleSheetSpecification};

/// Parse stylesheet text against the stock property and selector tables
pub fn parse_stylesheet(css: &str) -> StyleSheet {
    StyleSheet::parse_str(css, "inline", &StyleSheetSpecification::with_defaults())
}
