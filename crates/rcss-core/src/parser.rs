//! Stylesheet Parser
//!
//! Drives a small state machine over the `{`, `@` and `}` tokens of the
//! character stream. Ordinary rule blocks are merged into a [`StyleTree`];
//! `@keyframes` blocks are collected into a [`KeyframesMap`].
//!
//! The transition table is the pure function [`transition`]; the parser
//! only executes the [`Action`] it returns.

use crate::config::ParserConfig;
use crate::declarations::read_declarations;
use crate::diagnostics::Diagnostics;
use crate::keyframes::{self, KeyframesMap, KeyframesSequence};
use crate::properties::{DeclarationParser, PropertyDictionary, Specificity};
use crate::reader::BufferedReader;
use crate::selectors::{StructuralSelectorRegistry, expand_list};
use crate::stream::{ByteStream, MemoryStream};
use crate::style_tree::StyleTree;

/// Parser state between tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Global,
    /// After `@`, waiting for the at-rule's `{`
    KeyframesIdentifier,
    /// Inside an at-rule body, reading time-selector blocks
    KeyframesRules,
    /// Terminal; nothing further is read
    Invalid,
}

impl ParseState {
    pub fn is_terminal(self) -> bool {
        self == ParseState::Invalid
    }
}

/// Structural characters the parser reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    OpenBlock,
    AtRule,
    CloseBlock,
}

impl Token {
    pub fn from_char(c: char) -> Option<Token> {
        match c {
            '{' => Some(Token::OpenBlock),
            '@' => Some(Token::AtRule),
            '}' => Some(Token::CloseBlock),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Token::OpenBlock => '{',
            Token::AtRule => '@',
            Token::CloseBlock => '}',
        }
    }
}

/// Work to do after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Pending text is a selector list; read its declaration block
    StyleRule,
    BeginAtRule,
    /// Pending text names the keyframes sequence
    OpenKeyframes,
    /// Pending text is a time selector list; read its declaration block
    KeyframeBlock,
    CloseKeyframes,
    /// Token out of place at the top level; skipped
    StrayToken,
    /// Token out of place inside an at-rule; the parse stops
    IllegalToken,
}

/// The parser's transition table
pub fn transition(state: ParseState, token: Token) -> (ParseState, Action) {
    use ParseState::*;

    match (state, token) {
        (Global, Token::OpenBlock) => (Global, Action::StyleRule),
        (Global, Token::AtRule) => (KeyframesIdentifier, Action::BeginAtRule),
        (Global, Token::CloseBlock) => (Global, Action::StrayToken),
        (KeyframesIdentifier, Token::OpenBlock) => (KeyframesRules, Action::OpenKeyframes),
        (KeyframesRules, Token::OpenBlock) => (KeyframesRules, Action::KeyframeBlock),
        (KeyframesRules, Token::CloseBlock) => (Global, Action::CloseKeyframes),
        (KeyframesIdentifier | KeyframesRules | Invalid, _) => (Invalid, Action::IllegalToken),
    }
}

/// Read up to the next token, collecting everything before it in `pending`
fn find_token(reader: &mut BufferedReader<'_>, pending: &mut String) -> Option<Token> {
    pending.clear();
    while let Some(c) = reader.read_character() {
        match Token::from_char(c) {
            Some(token) => return Some(token),
            None => pending.push(c),
        }
    }
    None
}

/// Name of the keyframes sequence in an at-rule prelude, or empty when the
/// prelude does not start with `keyword`
fn keyframes_identifier(prelude: &str, keyword: &str) -> String {
    prelude
        .trim_start()
        .strip_prefix(keyword)
        .map(|rest| rest.trim().to_string())
        .unwrap_or_default()
}

/// Stylesheet parser
///
/// Holds its collaborators by reference. Diagnostics are reset at the start
/// of every parse.
pub struct StyleSheetParser<'a> {
    declarations: &'a dyn DeclarationParser,
    selectors: &'a StructuralSelectorRegistry,
    config: ParserConfig,
    diagnostics: Diagnostics,
}

impl<'a> StyleSheetParser<'a> {
    pub fn new(declarations: &'a dyn DeclarationParser, selectors: &'a StructuralSelectorRegistry) -> Self {
        Self::with_config(declarations, selectors, ParserConfig::default())
    }

    pub fn with_config(
        declarations: &'a dyn DeclarationParser,
        selectors: &'a StructuralSelectorRegistry,
        config: ParserConfig,
    ) -> Self {
        Self {
            declarations,
            selectors,
            config,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Diagnostics from the last parse
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }

    /// Parse a whole stylesheet. Rules go into `tree`, keyframes into
    /// `keyframes`. Returns the number of rule blocks read.
    pub fn parse(&mut self, tree: &mut StyleTree, keyframes: &mut KeyframesMap, stream: &mut dyn ByteStream) -> usize {
        self.diagnostics.clear();
        let mut reader = BufferedReader::new(stream, self.config.buffer_size);
        let source = reader.source_name().to_string();
        tracing::debug!("Parsing stylesheet: {}", source);

        let mut rule_count = 0usize;
        let mut state = ParseState::Global;
        let mut identifier = String::new();
        let mut pending = String::new();

        while let Some(token) = find_token(&mut reader, &mut pending) {
            let (next, action) = transition(state, token);
            match action {
                Action::StyleRule => {
                    let mut properties = PropertyDictionary::new();
                    read_declarations(&mut reader, self.declarations, &mut properties, &mut self.diagnostics);

                    let specificity = Specificity(rule_count as u32);
                    for selector in expand_list(&pending) {
                        tree.import_properties(&selector, &properties, specificity, self.selectors);
                    }
                    rule_count += 1;
                }
                Action::BeginAtRule => identifier.clear(),
                Action::OpenKeyframes => {
                    identifier = keyframes_identifier(&pending, &self.config.keyframes_keyword);
                }
                Action::KeyframeBlock => {
                    let mut properties = PropertyDictionary::new();
                    read_declarations(&mut reader, self.declarations, &mut properties, &mut self.diagnostics);
                    self.add_keyframe_block(keyframes, &identifier, &pending, &properties, &source, reader.line());
                }
                Action::CloseKeyframes => {}
                Action::StrayToken => {
                    self.diagnostics.warn(
                        &source,
                        reader.line(),
                        format!(
                            "Invalid character '{}' found while parsing stylesheet. Trying to proceed.",
                            token.as_char()
                        ),
                    );
                }
                Action::IllegalToken => {
                    let context = match state {
                        ParseState::KeyframesIdentifier => "keyframes identifier",
                        _ => "keyframes",
                    };
                    self.diagnostics.warn(
                        &source,
                        reader.line(),
                        format!(
                            "Invalid character '{}' found while parsing {} in stylesheet",
                            token.as_char(),
                            context
                        ),
                    );
                }
            }

            state = next;
            if state.is_terminal() {
                break;
            }
        }

        if let Some(e) = reader.take_read_error() {
            self.diagnostics
                .error(&source, reader.line(), format!("Failed to read stylesheet: {}", e));
        }

        keyframes::postprocess(keyframes);

        tracing::debug!(
            "Parsed {} rules and {} keyframes from {}",
            rule_count,
            keyframes.len(),
            source
        );
        rule_count
    }

    /// Parse a bare declaration list, as found in an inline style
    /// attribute. The final declaration needs no trailing `;`.
    pub fn parse_properties(&mut self, target: &mut PropertyDictionary, text: &str, source: &str) -> bool {
        self.diagnostics.clear();
        let body = format!("{};}}", text);
        let mut stream = MemoryStream::from_text(&body, source);
        let mut reader = BufferedReader::new(&mut stream, self.config.buffer_size);
        read_declarations(&mut reader, self.declarations, target, &mut self.diagnostics)
    }

    fn add_keyframe_block(
        &mut self,
        keyframes: &mut KeyframesMap,
        identifier: &str,
        rules: &str,
        properties: &PropertyDictionary,
        source: &str,
        line: u32,
    ) -> bool {
        if !keyframes::is_valid_identifier(identifier) {
            self.diagnostics
                .warn(source, line, format!("Invalid keyframes identifier '{}'", identifier));
            return false;
        }
        if properties.is_empty() {
            return true;
        }

        let times = keyframes::parse_time_selectors(rules);
        if times.is_empty() {
            self.diagnostics
                .warn(source, line, format!("Invalid keyframes rule(s) '{}'", rules.trim()));
            return false;
        }

        let sequence = keyframes
            .entry(identifier.to_string())
            .or_insert_with(|| KeyframesSequence::new(identifier));
        for time in times {
            sequence.insert_block(time, properties, self.config.keyframe_time_epsilon);
        }
        true
    }
}
