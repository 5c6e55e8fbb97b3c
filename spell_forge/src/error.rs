//! Error types for linking and generation.

use thiserror::Error;

use spell_data::ParseError;

/// Main error type for the forge.
///
/// Link errors and the transmutation invariant are always fatal; tolerated
/// conditions (unresolved container or root references) never surface here,
/// they are only logged.
#[derive(Error, Debug)]
pub enum ForgeError {
    /// A record block failed to parse.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A spell names itself as its inheritance parent.
    #[error("spell {0} is referencing itself for inheritance")]
    SelfInheritance(String),

    /// A spell names itself as its container.
    #[error("spell {0} is referencing itself for containerization")]
    SelfContainment(String),

    /// An inheritance parent could not be resolved. Unlike containment,
    /// parent resolution is mandatory.
    #[error("unknown parent spell {parent} for spell {name}")]
    UnknownParent { name: String, parent: String },

    /// A transmuted variant ended up with the wrong damage type. This is a
    /// programming-invariant failure, not a data error; the offending
    /// spells are dumped to the log before this is raised.
    #[error(
        "transmuted variant {variant} of {source_spell} has damage type {found:?}, expected {expected}"
    )]
    TransmutationMismatch {
        source_spell: String,
        variant: String,
        expected: String,
        found: Option<String>,
    },

    /// File system failure while loading or writing the corpus.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient result type using `ForgeError`.
pub type Result<T> = std::result::Result<T, ForgeError>;
