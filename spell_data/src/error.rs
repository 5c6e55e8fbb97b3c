//! Parse errors for spell record blocks.

use thiserror::Error;

/// Raised when a record block cannot be parsed into a spell.
///
/// Every variant is fatal: a malformed block aborts the whole load rather
/// than being silently skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A block needs at least the header, type marker, and category lines.
    #[error("too few lines")]
    TooFewLines,

    /// Line 1 did not match `new entry "<name>"`.
    #[error("missing spell name header")]
    MissingHeader,

    /// Line 2 was not the fixed `type "SpellData"` marker.
    #[error("missing type field")]
    MissingTypeMarker,

    /// Line 3 did not supply a non-empty `SpellType`, or the name was empty.
    #[error("no name or type")]
    MissingNameOrType,

    /// A body line was neither an attribute assignment nor a `using` directive.
    #[error("invalid line {0}")]
    InvalidLine(String),
}

/// Convenient result type for record parsing.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
