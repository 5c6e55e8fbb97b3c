//! Composable predicate filters over the spell collection.

use spell_data::Spell;

use crate::library::SpellGraph;

/// A conjunction of spell predicates, plus an optional explicit name list.
///
/// Every enabled predicate must hold for a spell to match; the default
/// filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpellFilter {
    /// Restrict selection to these names; empty means the whole collection.
    pub names: Vec<String>,
    /// Actual castable spells only.
    pub spell: bool,
    /// Spells without a container reference only.
    pub base: bool,
    /// Concentration spells only.
    pub concentration: bool,
    /// Spells with a member list only.
    pub container: bool,
    /// Elemental spells only.
    pub elemental: bool,
    /// Harmful spells only.
    pub harmful: bool,
    /// Leveled spells only.
    pub leveled: bool,
}

impl SpellFilter {
    /// Create a filter that matches every spell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to an explicit name list.
    pub fn with_names(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.names = names.into_iter().collect();
        self
    }

    /// Require the castable-spell flag.
    pub fn spells(mut self) -> Self {
        self.spell = true;
        self
    }

    /// Require the absence of a container reference.
    pub fn base(mut self) -> Self {
        self.base = true;
        self
    }

    /// Require the concentration flag.
    pub fn concentration(mut self) -> Self {
        self.concentration = true;
        self
    }

    /// Require a non-empty member list.
    pub fn containers(mut self) -> Self {
        self.container = true;
        self
    }

    /// Require an elemental damage type.
    pub fn elemental(mut self) -> Self {
        self.elemental = true;
        self
    }

    /// Require the harmful flag.
    pub fn harmful(mut self) -> Self {
        self.harmful = true;
        self
    }

    /// Require a level-chain position.
    pub fn leveled(mut self) -> Self {
        self.leveled = true;
        self
    }

    /// Whether a spell passes every enabled predicate.
    pub fn matches(&self, spell: &Spell) -> bool {
        if self.spell && !spell.is_spell() {
            return false;
        }
        if self.base && spell.has_spell_container() {
            return false;
        }
        if self.concentration && !spell.is_concentration() {
            return false;
        }
        if self.container && !spell.has_container_spells() {
            return false;
        }
        if self.elemental && !spell.is_elemental() {
            return false;
        }
        if self.harmful && !spell.is_harmful() {
            return false;
        }
        if self.leveled && !spell.is_leveled() {
            return false;
        }
        true
    }

    /// Names of matching spells, honoring the explicit name list when set.
    /// Names that resolve to nothing are silently skipped.
    pub fn select(&self, graph: &SpellGraph) -> Vec<String> {
        let candidates: Vec<&Spell> = if self.names.is_empty() {
            graph.spells().collect()
        } else {
            self.names
                .iter()
                .filter_map(|name| graph.get(name))
                .collect()
        };
        candidates
            .into_iter()
            .filter(|spell| self.matches(spell))
            .map(|spell| spell.name.clone())
            .collect()
    }
}
