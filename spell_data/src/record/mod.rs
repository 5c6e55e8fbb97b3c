//! Spell records: the typed entity, its block parser, and serialization.
//!
//! A record is one `new entry "<Name>"` block of key-value lines. The
//! `Spell` type wraps it with identity, an ordered attribute map, derived
//! read accessors, and the mutation operations the variant forge relies on.

mod parser;
mod serialize;
mod spell;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use spell::*;
