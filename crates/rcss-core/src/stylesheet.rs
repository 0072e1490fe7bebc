//! Style Sheets

use std::fs::File;
use std::path::Path;

use crate::cascade::{StyleResolver, StyledElement};
use crate::config::ParserConfig;
use crate::diagnostics::Diagnostics;
use crate::keyframes::{KeyframesMap, KeyframesSequence};
use crate::parser::StyleSheetParser;
use crate::properties::{PropertyDictionary, PropertySpecification};
use crate::selectors::StructuralSelectorRegistry;
use crate::stream::{ByteStream, MemoryStream, ReaderStream};
use crate::style_tree::StyleTree;
use crate::CssError;

/// Property and selector tables a stylesheet is parsed against
#[derive(Debug)]
pub struct StyleSheetSpecification {
    pub properties: PropertySpecification,
    pub selectors: StructuralSelectorRegistry,
}

impl StyleSheetSpecification {
    pub fn with_defaults() -> Self {
        Self {
            properties: PropertySpecification::with_defaults(),
            selectors: StructuralSelectorRegistry::with_defaults(),
        }
    }

    /// Parser bound to these tables
    pub fn parser(&self, config: ParserConfig) -> StyleSheetParser<'_> {
        StyleSheetParser::with_config(&self.properties, &self.selectors, config)
    }
}

impl Default for StyleSheetSpecification {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Parsed stylesheet
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    pub tree: StyleTree,
    pub keyframes: KeyframesMap,
    /// Rule blocks read, across every combined sheet
    pub rule_count: usize,
    pub diagnostics: Diagnostics,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stylesheet from a byte stream
    pub fn parse(
        stream: &mut dyn ByteStream,
        spec: &StyleSheetSpecification,
        config: ParserConfig,
    ) -> Result<Self, CssError> {
        config.validate()?;

        let mut sheet = Self::new();
        let mut parser = spec.parser(config);
        sheet.rule_count = parser.parse(&mut sheet.tree, &mut sheet.keyframes, stream);
        sheet.diagnostics = parser.take_diagnostics();
        Ok(sheet)
    }

    /// Parse stylesheet text with the default configuration
    pub fn parse_str(css: &str, source: &str, spec: &StyleSheetSpecification) -> Self {
        let mut sheet = Self::new();
        let mut stream = MemoryStream::from_text(css, source);
        let mut parser = spec.parser(ParserConfig::default());
        sheet.rule_count = parser.parse(&mut sheet.tree, &mut sheet.keyframes, &mut stream);
        sheet.diagnostics = parser.take_diagnostics();
        sheet
    }

    /// Open and parse a stylesheet file
    pub fn load_file(
        path: impl AsRef<Path>,
        spec: &StyleSheetSpecification,
        config: ParserConfig,
    ) -> Result<Self, CssError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = File::open(path).map_err(|e| CssError::io(name.clone(), e))?;
        let mut stream = ReaderStream::new(file, name);
        Self::parse(&mut stream, spec, config)
    }

    pub fn keyframes(&self, name: &str) -> Option<&KeyframesSequence> {
        self.keyframes.get(name)
    }

    /// Merge `other` into this sheet. Its rules rank after every rule
    /// already here; keyframes with the same name are replaced.
    pub fn combine(&mut self, other: &StyleSheet) {
        self.tree.merge(&other.tree, self.rule_count as u32);
        for (name, sequence) in &other.keyframes {
            self.keyframes.insert(name.clone(), sequence.clone());
        }
        self.rule_count += other.rule_count;
        self.diagnostics.extend(other.diagnostics.clone());
    }

    /// Resolved declarations for one element
    pub fn compute_style<E: StyledElement>(&self, element: &E, spec: &StyleSheetSpecification) -> PropertyDictionary {
        StyleResolver::new(&self.tree, &spec.selectors).compute(element)
    }
}
