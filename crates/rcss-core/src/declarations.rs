//! Declaration Reader
//!
//! Reads `name: value;` pairs straight from the character stream up to and
//! including the `}` that closes the rule body. Double-quoted spans inside a
//! value are copied verbatim, so `;` and `}` may appear in string values.

use crate::diagnostics::Diagnostics;
use crate::properties::{DeclarationParser, PropertyDictionary};
use crate::reader::BufferedReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Name,
    Value,
    Quote,
}

/// Read one declaration block into `target`. Returns true once the block
/// is closed or the stream runs out.
pub(crate) fn read_declarations(
    reader: &mut BufferedReader<'_>,
    parser: &dyn DeclarationParser,
    target: &mut PropertyDictionary,
    diagnostics: &mut Diagnostics,
) -> bool {
    let source = reader.source_name().to_string();
    let mut name = String::new();
    let mut value = String::new();
    let mut state = State::Name;
    let mut previous = '\0';

    while let Some(character) = reader.read_character() {
        match state {
            State::Name => match character {
                ';' => {
                    let trimmed = name.trim();
                    if !trimmed.is_empty() {
                        diagnostics.warn(
                            &source,
                            reader.line(),
                            format!("Found name with no value parsing property declaration '{}'", trimmed),
                        );
                    }
                    name.clear();
                }
                '}' => {
                    let trimmed = name.trim();
                    if !trimmed.is_empty() {
                        diagnostics.warn(
                            &source,
                            reader.line(),
                            format!("End of rule encountered while parsing property declaration '{}'", trimmed),
                        );
                    }
                    return true;
                }
                ':' => {
                    name = name.trim().to_string();
                    state = State::Value;
                }
                _ => name.push(character),
            },
            State::Value => match character {
                ';' => {
                    commit(parser, target, &name, &value, &source, reader.line(), diagnostics);
                    name.clear();
                    value.clear();
                    state = State::Name;
                }
                '}' => {
                    diagnostics.warn(
                        &source,
                        reader.line(),
                        format!(
                            "End of rule encountered while parsing property declaration '{}: {};'",
                            name,
                            value.trim()
                        ),
                    );
                    return true;
                }
                _ => {
                    value.push(character);
                    if character == '"' {
                        state = State::Quote;
                    }
                }
            },
            State::Quote => {
                value.push(character);
                if character == '"' && previous != '\\' {
                    state = State::Value;
                }
            }
        }
        previous = character;
    }

    if !name.trim().is_empty() || !value.trim().is_empty() {
        diagnostics.warn(
            &source,
            reader.line(),
            format!("Invalid property declaration '{}':'{}'", name.trim(), value.trim()),
        );
    }
    true
}

fn commit(
    parser: &dyn DeclarationParser,
    target: &mut PropertyDictionary,
    name: &str,
    value: &str,
    source: &str,
    line: u32,
    diagnostics: &mut Diagnostics,
) {
    let value = value.trim();
    if !parser.parse_declaration(target, name, value, source, line) {
        diagnostics.warn(
            source,
            line,
            format!("Syntax error parsing property declaration '{}: {};'", name, value),
        );
    }
}
