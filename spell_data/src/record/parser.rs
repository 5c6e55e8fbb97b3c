//! Block parsing: one raw record block into a `Spell`.

use std::collections::BTreeMap;

use crate::error::{ParseError, ParseResult};
use crate::record::Spell;

/// Extract the name from a `new entry "<name>"` header line.
fn entry_name(line: &str) -> Option<&str> {
    line.strip_prefix("new entry \"")?.strip_suffix('"')
}

/// Extract key and value from a `data "<key>" "<value>"` line.
/// The value may be empty.
fn data_pair(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("data \"")?;
    let (key, rest) = rest.split_once('"')?;
    let value = rest.strip_prefix(" \"")?.strip_suffix('"')?;
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Extract the parent name from a `using "<parent>"` line.
fn using_name(line: &str) -> Option<&str> {
    line.strip_prefix("using \"")?.strip_suffix('"')
}

impl Spell {
    /// Parse one newline-separated record block into a spell.
    ///
    /// The block grammar is fixed: a `new entry` header, the literal
    /// `type "SpellData"` marker, a `SpellType` category line, and then any
    /// number of attribute assignments or a single inheritance directive.
    /// A line matching none of these is a fatal error naming the line.
    pub fn parse_block(block: &str) -> ParseResult<Spell> {
        let lines: Vec<&str> = block.split('\n').collect();
        if lines.len() < 3 {
            return Err(ParseError::TooFewLines);
        }

        let name = entry_name(lines[0]).ok_or(ParseError::MissingHeader)?;
        if lines[1] != "type \"SpellData\"" {
            return Err(ParseError::MissingTypeMarker);
        }
        let spell_type = match data_pair(lines[2]) {
            Some(("SpellType", value)) => value,
            _ => return Err(ParseError::MissingNameOrType),
        };
        if name.is_empty() || spell_type.is_empty() {
            return Err(ParseError::MissingNameOrType);
        }

        let mut using = None;
        let mut data = BTreeMap::new();
        for line in &lines[3..] {
            if let Some((key, value)) = data_pair(line) {
                data.insert(key.to_string(), value.to_string());
            } else if let Some(parent) = using_name(line) {
                using = Some(parent.to_string());
            } else {
                return Err(ParseError::InvalidLine(line.to_string()));
            }
        }

        Ok(Spell::with_data(
            name.to_string(),
            spell_type.to_string(),
            using,
            data,
        ))
    }
}
