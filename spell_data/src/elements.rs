//! Damage elements: the transmutable subset of damage types.

use serde::{Deserialize, Serialize};

/// The five damage types a spell can be transmuted between.
///
/// Other damage types (Necrotic, Radiant, ...) exist in the corpus but are
/// not part of the transmutation cycle, so a spell dealing one of those is
/// simply not elemental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    Acid,
    Cold,
    Fire,
    Lightning,
    Thunder,
}

impl Element {
    /// All elements, in the order variants are generated.
    pub const ALL: [Element; 5] = [
        Element::Acid,
        Element::Cold,
        Element::Fire,
        Element::Lightning,
        Element::Thunder,
    ];

    /// The attribute-value spelling of this element.
    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Acid => "Acid",
            Element::Cold => "Cold",
            Element::Fire => "Fire",
            Element::Lightning => "Lightning",
            Element::Thunder => "Thunder",
        }
    }

    /// Parse an attribute value into an element, if it is one.
    pub fn parse(value: &str) -> Option<Element> {
        match value {
            "Acid" => Some(Element::Acid),
            "Cold" => Some(Element::Cold),
            "Fire" => Some(Element::Fire),
            "Lightning" => Some(Element::Lightning),
            "Thunder" => Some(Element::Thunder),
            _ => None,
        }
    }

    /// The other four elements this one can be transmuted into.
    pub fn complements(&self) -> Vec<Element> {
        Element::ALL.iter().copied().filter(|e| e != self).collect()
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
