//! # Spell Forge
//!
//! The graph-and-pipeline crate. It interfaces with `spell_data`, links a
//! flat spell collection into a relationship graph, and forges meta-spell
//! variants onto existing level chains.
//!
//! ## Core Components
//!
//! - **library**: corpus loading, the linked `SpellGraph`, and the
//!   predicate-filter query surface
//! - **generator**: the detachment and transmutation variant algorithms
//! - **diff**: unified line diff between two serialized spells
//!
//! ## Design Philosophy
//!
//! - **Name-keyed**: every relationship is a name lookup against the graph
//!   store, never an owning reference
//! - **Batch**: one load, one link, any number of queries or one generation
//!   pass; there is no incremental mode
//! - **Structural only**: the forge guarantees referential consistency of
//!   the record graph, not the game balance of what it emits

pub mod diff;
pub mod error;
pub mod generator;
pub mod library;

pub use error::*;
pub use generator::*;
pub use library::*;
