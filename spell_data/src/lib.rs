//! # Spell Data
//!
//! The record-model crate - contains the typed `Spell` entity, the block
//! parser, the damage element enum, and deterministic serialization.
//! This crate knows nothing about the spell graph or the filesystem.

pub mod elements;
pub mod error;
pub mod record;

pub use elements::*;
pub use error::*;
pub use record::*;
