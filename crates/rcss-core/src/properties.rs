//! Property Dictionaries & Declaration Parsing
//!
//! Declarations read from a rule body are handed to a [`DeclarationParser`],
//! which validates the value and stores typed [`Property`] entries in a
//! [`PropertyDictionary`]. [`PropertySpecification`] is the stock parser:
//! a table of registered properties and shorthands, each with an ordered
//! list of value parsers.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Rule precedence. Higher wins; rules later in source order get higher values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Specificity(pub u32);

impl Specificity {
    /// Shift by `offset`, saturating
    pub fn offset(self, offset: u32) -> Self {
        Self(self.0.saturating_add(offset))
    }
}

/// Property value - parsed and typed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Keyword from the property's allowed set, lowercased
    Keyword(String),
    /// Unitless number (opacity, z-index, line-height factor)
    Number(f32),
    /// Length value (px, em, rem, %, ...)
    Length(Length),
    /// Color value
    Color(Color),
    /// String with quotes removed (font-family, content, ...)
    String(String),
    /// Unparsed text for values this crate passes through untouched
    Raw(String),
}

/// CSS length value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Length {
    pub value: f32,
    pub unit: LengthUnit,
}

impl Length {
    pub fn px(value: f32) -> Self {
        Self { value, unit: LengthUnit::Px }
    }

    pub fn em(value: f32) -> Self {
        Self { value, unit: LengthUnit::Em }
    }

    pub fn percent(value: f32) -> Self {
        Self { value, unit: LengthUnit::Percent }
    }

    pub fn zero() -> Self {
        Self { value: 0.0, unit: LengthUnit::Px }
    }
}

/// Length units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LengthUnit {
    Px,
    Em,
    Rem,
    Percent,
    Vw,
    Vh,
    Vmin,
    Vmax,
    Deg,
    Rad,
}

impl LengthUnit {
    fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "px" => Self::Px,
            "em" => Self::Em,
            "rem" => Self::Rem,
            "%" => Self::Percent,
            "vw" => Self::Vw,
            "vh" => Self::Vh,
            "vmin" => Self::Vmin,
            "vmax" => Self::Vmax,
            "deg" => Self::Deg,
            "rad" => Self::Rad,
            _ => return None,
        })
    }
}

/// CSS color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Color {
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse any supported color notation
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with('#') {
            return Self::from_hex(value);
        }

        let lower = value.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return Self::from_rgb_args(args);
        }

        Self::from_name(&lower)
    }

    /// Parse a hex color (#RGB, #RGBA, #RRGGBB, #RRGGBBAA)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => Some(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            4 => Some(Self::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Parse the argument list of rgb()/rgba(): three channels and an optional alpha
    fn from_rgb_args(args: &str) -> Option<Self> {
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return None;
        }

        let channel = |s: &str| -> Option<u8> {
            let v = match s.strip_suffix('%') {
                Some(pct) => pct.parse::<f32>().ok()? * 2.55,
                None => s.parse::<f32>().ok()?,
            };
            Some(v.round().clamp(0.0, 255.0) as u8)
        };

        let alpha = match parts.get(3) {
            Some(a) => {
                let a: f32 = a.parse().ok()?;
                // rgba() alpha is 0..1 in CSS, 0..255 in RCSS; accept both
                if a <= 1.0 { (a.max(0.0) * 255.0).round() as u8 } else { a.min(255.0) as u8 }
            }
            None => 255,
        };

        Some(Self::rgba(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, alpha))
    }

    /// Parse a named color
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "transparent" => Self::TRANSPARENT,
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "blue" => Self::rgb(0, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            "cyan" | "aqua" => Self::rgb(0, 255, 255),
            "magenta" | "fuchsia" => Self::rgb(255, 0, 255),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "silver" => Self::rgb(192, 192, 192),
            "maroon" => Self::rgb(128, 0, 0),
            "olive" => Self::rgb(128, 128, 0),
            "lime" => Self::rgb(0, 255, 0),
            "navy" => Self::rgb(0, 0, 128),
            "purple" => Self::rgb(128, 0, 128),
            "teal" => Self::rgb(0, 128, 128),
            "orange" => Self::rgb(255, 165, 0),
            _ => return None,
        })
    }
}

/// A declared value together with the precedence of the rule that set it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub value: PropertyValue,
    pub specificity: Specificity,
}

impl Property {
    pub fn new(value: PropertyValue, specificity: Specificity) -> Self {
        Self { value, specificity }
    }
}

/// Mapping from property name to value, ordered by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyDictionary {
    properties: BTreeMap<String, Property>,
}

impl PropertyDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing any existing entry
    pub fn set(&mut self, name: impl Into<String>, value: PropertyValue, specificity: Specificity) {
        self.properties.insert(name.into(), Property::new(value, specificity));
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Shortcut for the value of a property
    pub fn value(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name).map(|p| &p.value)
    }

    pub fn remove(&mut self, name: &str) -> Option<Property> {
        self.properties.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Copy every entry of `other`, overwriting existing keys
    pub fn import(&mut self, other: &PropertyDictionary) {
        for (name, property) in &other.properties {
            self.properties.insert(name.clone(), property.clone());
        }
    }

    /// Copy every entry of `other` stamped with `specificity`. An existing
    /// entry is only replaced when its specificity is not higher.
    pub fn import_with_specificity(&mut self, other: &PropertyDictionary, specificity: Specificity) {
        for (name, property) in &other.properties {
            match self.properties.get(name) {
                Some(existing) if existing.specificity > specificity => {}
                _ => {
                    self.properties
                        .insert(name.clone(), Property::new(property.value.clone(), specificity));
                }
            }
        }
    }

    /// Merge entries of `other`, keeping their own specificities shifted by
    /// `offset`. Same replacement rule as [`Self::import_with_specificity`].
    pub fn merge(&mut self, other: &PropertyDictionary, offset: u32) {
        for (name, property) in &other.properties {
            let specificity = property.specificity.offset(offset);
            match self.properties.get(name) {
                Some(existing) if existing.specificity > specificity => {}
                _ => {
                    self.properties
                        .insert(name.clone(), Property::new(property.value.clone(), specificity));
                }
            }
        }
    }

    /// Property names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn clear(&mut self) {
        self.properties.clear();
    }
}

/// Validates one `name: value` declaration and stores the result
pub trait DeclarationParser {
    /// Returns false when the declaration is rejected; `target` must then
    /// be left unchanged.
    fn parse_declaration(
        &self,
        target: &mut PropertyDictionary,
        name: &str,
        value: &str,
        source: &str,
        line: u32,
    ) -> bool;
}

/// Accepts any non-empty declaration and stores the value text verbatim
#[derive(Debug, Clone, Copy, Default)]
pub struct RawDeclarationParser;

impl DeclarationParser for RawDeclarationParser {
    fn parse_declaration(
        &self,
        target: &mut PropertyDictionary,
        name: &str,
        value: &str,
        _source: &str,
        _line: u32,
    ) -> bool {
        if name.is_empty() || value.is_empty() {
            return false;
        }
        target.set(name.to_ascii_lowercase(), PropertyValue::Raw(value.to_string()), Specificity::default());
        true
    }
}

/// One way of interpreting a value string
#[derive(Debug, Clone, PartialEq)]
pub enum ValueParser {
    /// One of a fixed set of keywords
    Keyword(Vec<String>),
    Number,
    /// Length; bare numbers are taken as px
    Length,
    LengthPercent,
    /// Bare numbers stay numbers, dimensions become lengths
    NumberLengthPercent,
    Color,
    String,
    /// Any non-empty text
    Raw,
}

impl ValueParser {
    /// Keyword parser from a comma-separated list
    pub fn keywords(list: &str) -> Self {
        Self::Keyword(
            list.split(',')
                .map(|k| k.trim().to_ascii_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        )
    }

    pub fn parse(&self, value: &str) -> Option<PropertyValue> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        match self {
            Self::Keyword(allowed) => {
                let lower = value.to_ascii_lowercase();
                allowed.iter().any(|k| *k == lower).then_some(PropertyValue::Keyword(lower))
            }
            Self::Number => parse_number(value).map(PropertyValue::Number),
            Self::Length => parse_length(value, false).map(PropertyValue::Length),
            Self::LengthPercent => parse_length(value, true).map(PropertyValue::Length),
            Self::NumberLengthPercent => match parse_number(value) {
                Some(n) => Some(PropertyValue::Number(n)),
                None => parse_length(value, true).map(PropertyValue::Length),
            },
            Self::Color => Color::parse(value).map(PropertyValue::Color),
            Self::String => Some(PropertyValue::String(unquote(value))),
            Self::Raw => Some(PropertyValue::Raw(value.to_string())),
        }
    }
}

fn parse_number(value: &str) -> Option<f32> {
    value.parse::<f32>().ok().filter(|n| n.is_finite())
}

fn parse_length(value: &str, allow_percent: bool) -> Option<Length> {
    let split = value
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+')))
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    let (number, suffix) = value.split_at(split);
    let number = parse_number(number)?;

    let unit = if suffix.is_empty() {
        LengthUnit::Px
    } else {
        LengthUnit::from_suffix(&suffix.to_ascii_lowercase())?
    };
    if unit == LengthUnit::Percent && !allow_percent {
        return None;
    }
    Some(Length { value: number, unit })
}

fn unquote(value: &str) -> String {
    let inner = ['"', '\'']
        .iter()
        .find_map(|q| value.strip_prefix(*q).and_then(|v| v.strip_suffix(*q)))
        .unwrap_or(value);
    inner.replace("\\\"", "\"").replace("\\'", "'")
}

/// Split a value on top-level whitespace, keeping quoted text and
/// parenthesised groups together
pub fn split_values(value: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in value.chars() {
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                quote = Some(c);
                current.push(c);
            }
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    values.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        values.push(current);
    }
    values
}

/// Registered property: default, inheritance, accepted value forms
#[derive(Debug, Clone)]
pub struct PropertyDefinition {
    pub name: String,
    pub default_value: String,
    pub inherited: bool,
    pub forces_layout: bool,
    parsers: Vec<ValueParser>,
}

impl PropertyDefinition {
    pub fn add_parser(&mut self, parser: ValueParser) -> &mut Self {
        self.parsers.push(parser);
        self
    }

    pub fn parsers(&self) -> &[ValueParser] {
        &self.parsers
    }

    /// First successful interpretation of `value`
    pub fn parse_value(&self, value: &str) -> Option<PropertyValue> {
        self.parsers.iter().find_map(|p| p.parse(value))
    }
}

/// How a shorthand distributes its value over its components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShorthandType {
    /// Top/right/bottom/left from one to four values
    Box,
    /// A single value copies to every component; otherwise values map in order
    Replicate,
    /// Each value goes to the next component that accepts it
    FallThrough,
    /// The whole value is passed to every component
    Recursive,
}

#[derive(Debug, Clone)]
pub struct ShorthandDefinition {
    pub name: String,
    pub components: Vec<String>,
    pub kind: ShorthandType,
}

/// Table of registered properties and shorthands
#[derive(Debug, Clone, Default)]
pub struct PropertySpecification {
    properties: HashMap<String, PropertyDefinition>,
    shorthands: HashMap<String, ShorthandDefinition>,
}

impl PropertySpecification {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table pre-populated with the stock property set
    pub fn with_defaults() -> Self {
        let mut spec = Self::new();
        spec.register_default_properties();
        spec
    }

    /// Register (or replace) a property definition
    pub fn register_property(
        &mut self,
        name: &str,
        default_value: &str,
        inherited: bool,
        forces_layout: bool,
    ) -> &mut PropertyDefinition {
        let name = name.to_ascii_lowercase();
        let definition = PropertyDefinition {
            name: name.clone(),
            default_value: default_value.to_string(),
            inherited,
            forces_layout,
            parsers: Vec::new(),
        };
        match self.properties.entry(name) {
            Entry::Occupied(mut slot) => {
                slot.insert(definition);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(definition),
        }
    }

    /// Register a shorthand over a comma-separated component list. Fails if
    /// any component is neither a property nor a shorthand.
    pub fn register_shorthand(&mut self, name: &str, components: &str, kind: ShorthandType) -> bool {
        let components: Vec<String> = components
            .split(',')
            .map(|c| c.trim().to_ascii_lowercase())
            .filter(|c| !c.is_empty())
            .collect();

        let unknown = components
            .iter()
            .find(|c| !self.properties.contains_key(*c) && !self.shorthands.contains_key(*c));
        if let Some(unknown) = unknown {
            tracing::warn!("Shorthand '{}' refers to unknown property '{}'", name, unknown);
            return false;
        }
        if components.is_empty() {
            return false;
        }

        let name = name.to_ascii_lowercase();
        self.shorthands.insert(name.clone(), ShorthandDefinition { name, components, kind });
        true
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.get(name)
    }

    pub fn shorthand(&self, name: &str) -> Option<&ShorthandDefinition> {
        self.shorthands.get(name)
    }

    /// Names of all registered properties, sorted
    pub fn registered_properties(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.properties.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Names of inherited properties, sorted
    pub fn inherited_properties(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .properties
            .values()
            .filter(|d| d.inherited)
            .map(|d| d.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Parse a declaration into `target`. All-or-nothing for shorthands.
    pub fn parse_property_declaration(&self, target: &mut PropertyDictionary, name: &str, value: &str) -> bool {
        let name = name.trim().to_ascii_lowercase();
        let mut parsed = PropertyDictionary::new();
        if !self.parse_into(&mut parsed, &name, value.trim(), 0) {
            return false;
        }
        target.import(&parsed);
        true
    }

    fn parse_into(&self, target: &mut PropertyDictionary, name: &str, value: &str, depth: usize) -> bool {
        // Recursive shorthands cannot legitimately nest this deep
        if depth > 8 {
            return false;
        }

        if let Some(definition) = self.properties.get(name) {
            return match definition.parse_value(value) {
                Some(parsed) => {
                    target.set(name, parsed, Specificity::default());
                    true
                }
                None => false,
            };
        }

        let Some(shorthand) = self.shorthands.get(name) else {
            tracing::debug!("Property name '{}' not registered", name);
            return false;
        };

        match shorthand.kind {
            ShorthandType::Recursive => shorthand
                .components
                .iter()
                .all(|component| self.parse_into(target, component, value, depth + 1)),
            ShorthandType::Box => {
                let values = split_values(value);
                let order: &[usize] = match values.len() {
                    1 => &[0, 0, 0, 0],
                    2 => &[0, 1, 0, 1],
                    3 => &[0, 1, 2, 1],
                    4 => &[0, 1, 2, 3],
                    _ => return false,
                };
                shorthand
                    .components
                    .iter()
                    .zip(order)
                    .all(|(component, &i)| self.parse_into(target, component, &values[i], depth + 1))
            }
            ShorthandType::Replicate => {
                let values = split_values(value);
                if values.is_empty() || values.len() > shorthand.components.len() {
                    return false;
                }
                shorthand.components.iter().enumerate().all(|(i, component)| {
                    let v = if values.len() == 1 { &values[0] } else { values.get(i).unwrap_or(&values[values.len() - 1]) };
                    self.parse_into(target, component, v, depth + 1)
                })
            }
            ShorthandType::FallThrough => {
                let mut next = 0;
                for v in split_values(value) {
                    let accepted = shorthand.components[next..]
                        .iter()
                        .position(|component| self.parse_into(target, component, &v, depth + 1));
                    match accepted {
                        Some(offset) => next += offset + 1,
                        None => return false,
                    }
                }
                true
            }
        }
    }

    fn register_default_properties(&mut self) {
        use ValueParser as P;

        for side in ["top", "right", "bottom", "left"] {
            self.register_property(&format!("margin-{}", side), "0px", false, true)
                .add_parser(P::keywords("auto"))
                .add_parser(P::LengthPercent);
        }
        self.register_shorthand("margin", "margin-top, margin-right, margin-bottom, margin-left", ShorthandType::Box);

        for side in ["top", "right", "bottom", "left"] {
            self.register_property(&format!("padding-{}", side), "0px", false, true)
                .add_parser(P::LengthPercent);
        }
        self.register_shorthand("padding", "padding-top, padding-right, padding-bottom, padding-left", ShorthandType::Box);

        for side in ["top", "right", "bottom", "left"] {
            self.register_property(&format!("border-{}-width", side), "0px", false, true)
                .add_parser(P::Length);
            self.register_property(&format!("border-{}-color", side), "black", false, false)
                .add_parser(P::Color);
        }
        self.register_shorthand(
            "border-width",
            "border-top-width, border-right-width, border-bottom-width, border-left-width",
            ShorthandType::Box,
        );
        self.register_shorthand(
            "border-color",
            "border-top-color, border-right-color, border-bottom-color, border-left-color",
            ShorthandType::Box,
        );
        for side in ["top", "right", "bottom", "left"] {
            self.register_shorthand(
                &format!("border-{}", side),
                &format!("border-{0}-width, border-{0}-color", side),
                ShorthandType::FallThrough,
            );
        }
        self.register_shorthand("border", "border-top, border-right, border-bottom, border-left", ShorthandType::Recursive);

        self.register_property("display", "inline", false, true)
            .add_parser(P::keywords("none, block, inline, inline-block"));
        self.register_property("position", "static", false, true)
            .add_parser(P::keywords("static, relative, absolute, fixed"));
        for (side, default) in [("top", "auto"), ("right", "auto"), ("bottom", "auto"), ("left", "auto")] {
            self.register_property(side, default, false, false)
                .add_parser(P::keywords("auto"))
                .add_parser(P::LengthPercent);
        }

        self.register_property("float", "none", false, true).add_parser(P::keywords("none, left, right"));
        self.register_property("clear", "none", false, true).add_parser(P::keywords("none, left, right, both"));
        self.register_property("z-index", "auto", false, false)
            .add_parser(P::keywords("auto, top, bottom"))
            .add_parser(P::Number);

        for (name, default) in [("width", "auto"), ("height", "auto")] {
            self.register_property(name, default, false, true)
                .add_parser(P::keywords("auto"))
                .add_parser(P::LengthPercent);
        }
        for (name, default) in [("min-width", "0px"), ("max-width", "-1px"), ("min-height", "0px"), ("max-height", "-1px")] {
            self.register_property(name, default, false, true).add_parser(P::LengthPercent);
        }

        self.register_property("line-height", "1.2", true, true).add_parser(P::NumberLengthPercent);
        self.register_property("vertical-align", "baseline", false, true)
            .add_parser(P::keywords("baseline, middle, sub, super, text-top, text-bottom, top, bottom"))
            .add_parser(P::LengthPercent);

        self.register_property("overflow-x", "visible", false, true)
            .add_parser(P::keywords("visible, hidden, auto, scroll"));
        self.register_property("overflow-y", "visible", false, true)
            .add_parser(P::keywords("visible, hidden, auto, scroll"));
        self.register_shorthand("overflow", "overflow-x, overflow-y", ShorthandType::Replicate);
        self.register_property("clip", "auto", true, false)
            .add_parser(P::keywords("auto, none"))
            .add_parser(P::Number);
        self.register_property("visibility", "visible", false, false).add_parser(P::keywords("visible, hidden"));

        self.register_property("background-color", "transparent", false, false).add_parser(P::Color);
        self.register_shorthand("background", "background-color", ShorthandType::FallThrough);
        self.register_property("color", "white", true, false).add_parser(P::Color);
        self.register_property("image-color", "white", false, false).add_parser(P::Color);
        self.register_property("opacity", "1", true, false).add_parser(P::Number);

        self.register_property("font-family", "", true, true).add_parser(P::String);
        self.register_property("font-charset", "U+0020-007E", true, false).add_parser(P::String);
        self.register_property("font-style", "normal", true, true).add_parser(P::keywords("normal, italic"));
        self.register_property("font-weight", "normal", true, true).add_parser(P::keywords("normal, bold"));
        self.register_property("font-size", "12px", true, true).add_parser(P::LengthPercent);
        self.register_shorthand(
            "font",
            "font-style, font-weight, font-size, font-family, font-charset",
            ShorthandType::FallThrough,
        );

        self.register_property("text-align", "left", true, true)
            .add_parser(P::keywords("left, right, center, justify"));
        self.register_property("text-decoration", "none", true, false).add_parser(P::keywords("none, underline"));
        self.register_property("text-transform", "none", true, true)
            .add_parser(P::keywords("none, capitalize, uppercase, lowercase"));
        self.register_property("white-space", "normal", true, true)
            .add_parser(P::keywords("normal, pre, nowrap, pre-wrap, pre-line"));
        self.register_property("content", "", false, true).add_parser(P::String);

        self.register_property("cursor", "", true, false).add_parser(P::String);
        self.register_property("drag", "none", false, false)
            .add_parser(P::keywords("none, drag, drag-drop, block, clone"));
        self.register_property("tab-index", "none", false, false).add_parser(P::keywords("none, auto"));
        self.register_property("focus", "auto", true, false).add_parser(P::keywords("none, auto"));
        self.register_property("scrollbar-margin", "0", false, false).add_parser(P::Length);
        self.register_property("pointer-events", "auto", true, false).add_parser(P::keywords("auto, none"));

        self.register_property("perspective", "none", false, false)
            .add_parser(P::keywords("none"))
            .add_parser(P::Length);
        self.register_property("perspective-origin-x", "50%", false, false)
            .add_parser(P::keywords("left, center, right"))
            .add_parser(P::LengthPercent);
        self.register_property("perspective-origin-y", "50%", false, false)
            .add_parser(P::keywords("top, center, bottom"))
            .add_parser(P::LengthPercent);
        self.register_shorthand("perspective-origin", "perspective-origin-x, perspective-origin-y", ShorthandType::FallThrough);
        self.register_property("transform", "none", false, false)
            .add_parser(P::keywords("none"))
            .add_parser(P::Raw);
        self.register_property("transform-origin-x", "50%", false, false)
            .add_parser(P::keywords("left, center, right"))
            .add_parser(P::LengthPercent);
        self.register_property("transform-origin-y", "50%", false, false)
            .add_parser(P::keywords("top, center, bottom"))
            .add_parser(P::LengthPercent);
        self.register_property("transform-origin-z", "0", false, false).add_parser(P::Length);
        self.register_shorthand(
            "transform-origin",
            "transform-origin-x, transform-origin-y, transform-origin-z",
            ShorthandType::FallThrough,
        );

        self.register_property("transition", "none", false, false)
            .add_parser(P::keywords("none"))
            .add_parser(P::Raw);
        self.register_property("animation", "none", false, false)
            .add_parser(P::keywords("none"))
            .add_parser(P::Raw);
    }
}

impl DeclarationParser for PropertySpecification {
    fn parse_declaration(
        &self,
        target: &mut PropertyDictionary,
        name: &str,
        value: &str,
        source: &str,
        line: u32,
    ) -> bool {
        let accepted = self.parse_property_declaration(target, name, value);
        if !accepted {
            tracing::debug!(source, line, "Rejected declaration '{}: {}'", name, value);
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parsing() {
        assert_eq!(Color::parse("#ff0000"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("#f00"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("#f008"), Some(Color::rgba(255, 0, 0, 136)));
        assert_eq!(Color::parse("Blue"), Some(Color::rgb(0, 0, 255)));
        assert_eq!(Color::parse("rgb(10, 20, 30)"), Some(Color::rgb(10, 20, 30)));
        assert_eq!(Color::parse("rgba(10, 20, 30, 0.5)"), Some(Color::rgba(10, 20, 30, 128)));
        assert_eq!(Color::parse("#zzz"), None);
        assert_eq!(Color::parse("bluish"), None);
    }

    #[test]
    fn test_length_parsing() {
        assert_eq!(ValueParser::Length.parse("10px"), Some(PropertyValue::Length(Length::px(10.0))));
        assert_eq!(ValueParser::Length.parse("4"), Some(PropertyValue::Length(Length::px(4.0))));
        assert_eq!(ValueParser::Length.parse("50%"), None);
        assert_eq!(ValueParser::LengthPercent.parse("50%"), Some(PropertyValue::Length(Length::percent(50.0))));
        assert_eq!(ValueParser::LengthPercent.parse("-1.5em"), Some(PropertyValue::Length(Length::em(-1.5))));
        assert_eq!(ValueParser::LengthPercent.parse("3furlongs"), None);
        assert_eq!(ValueParser::NumberLengthPercent.parse("1.2"), Some(PropertyValue::Number(1.2)));
    }

    #[test]
    fn test_keyword_case_insensitive() {
        let parser = ValueParser::keywords("none, block");
        assert_eq!(parser.parse("BLOCK"), Some(PropertyValue::Keyword("block".into())));
        assert_eq!(parser.parse("flex"), None);
    }

    #[test]
    fn test_string_unquotes() {
        assert_eq!(
            ValueParser::String.parse("\"a;b}c\""),
            Some(PropertyValue::String("a;b}c".into()))
        );
    }

    #[test]
    fn test_split_values() {
        assert_eq!(split_values("1px  rgb(1, 2, 3) \"a b\""), vec!["1px", "rgb(1, 2, 3)", "\"a b\""]);
    }

    #[test]
    fn test_import_with_specificity() {
        let mut node = PropertyDictionary::new();
        let mut rule = PropertyDictionary::new();
        rule.set("color", PropertyValue::Raw("red".into()), Specificity::default());

        node.import_with_specificity(&rule, Specificity(5));
        assert_eq!(node.get("color").unwrap().specificity, Specificity(5));

        let mut older = PropertyDictionary::new();
        older.set("color", PropertyValue::Raw("blue".into()), Specificity::default());
        node.import_with_specificity(&older, Specificity(2));
        assert_eq!(node.value("color"), Some(&PropertyValue::Raw("red".into())));

        // Equal specificity: the later import wins
        node.import_with_specificity(&older, Specificity(5));
        assert_eq!(node.value("color"), Some(&PropertyValue::Raw("blue".into())));
    }

    #[test]
    fn test_box_shorthand() {
        let spec = PropertySpecification::with_defaults();
        let mut dict = PropertyDictionary::new();
        assert!(spec.parse_property_declaration(&mut dict, "margin", "1px 2px"));
        assert_eq!(dict.value("margin-top"), Some(&PropertyValue::Length(Length::px(1.0))));
        assert_eq!(dict.value("margin-right"), Some(&PropertyValue::Length(Length::px(2.0))));
        assert_eq!(dict.value("margin-bottom"), Some(&PropertyValue::Length(Length::px(1.0))));
        assert_eq!(dict.value("margin-left"), Some(&PropertyValue::Length(Length::px(2.0))));
    }

    #[test]
    fn test_recursive_shorthand() {
        let spec = PropertySpecification::with_defaults();
        let mut dict = PropertyDictionary::new();
        assert!(spec.parse_property_declaration(&mut dict, "border", "2px red"));
        assert_eq!(dict.len(), 8);
        assert_eq!(dict.value("border-left-color"), Some(&PropertyValue::Color(Color::rgb(255, 0, 0))));
    }

    #[test]
    fn test_failed_shorthand_leaves_target_untouched() {
        let spec = PropertySpecification::with_defaults();
        let mut dict = PropertyDictionary::new();
        assert!(!spec.parse_property_declaration(&mut dict, "padding", "1px banana"));
        assert!(dict.is_empty());
    }

    #[test]
    fn test_unknown_property_rejected() {
        let spec = PropertySpecification::with_defaults();
        let mut dict = PropertyDictionary::new();
        assert!(!spec.parse_property_declaration(&mut dict, "flux-capacitor", "on"));
        assert!(!spec.parse_property_declaration(&mut dict, "display", "sideways"));
    }

    #[test]
    fn test_registered_lists() {
        let spec = PropertySpecification::with_defaults();
        assert!(spec.registered_properties().contains(&"color"));
        assert!(spec.inherited_properties().contains(&"font-size"));
        assert!(!spec.inherited_properties().contains(&"width"));
        assert!(!PropertySpecification::new().register_shorthand("x", "nope", ShorthandType::Box));
    }
}
