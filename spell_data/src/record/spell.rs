//! The spell entity: identity, attribute map, accessors, and mutators.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::elements::Element;

/// Flag marking a spell as a linked container of alternative spells.
pub const FLAG_LINKED_CONTAINER: &str = "IsLinkedSpellContainer";
/// Flag marking a spell as requiring concentration.
pub const FLAG_CONCENTRATION: &str = "IsConcentration";
/// Flag marking a spell as harmful.
pub const FLAG_HARMFUL: &str = "IsHarmful";
/// Flag marking a record as an actual castable spell (not a data-only entry).
pub const FLAG_SPELL: &str = "IsSpell";
/// Flag marking a spell as temporary.
pub const FLAG_TEMPORARY: &str = "Temporary";

/// Attribute naming the container a spell belongs to.
pub const ATTR_CONTAINER_ID: &str = "SpellContainerID";
/// Attribute listing a container's member spell names.
pub const ATTR_CONTAINER_SPELLS: &str = "ContainerSpells";
/// Attribute naming the root spell of a level chain.
pub const ATTR_ROOT_SPELL_ID: &str = "RootSpellID";
/// Attribute holding the semicolon-joined flag set.
pub const ATTR_FLAGS: &str = "SpellFlags";
/// Attribute holding the semicolon-joined use costs.
pub const ATTR_USE_COSTS: &str = "UseCosts";
/// Attribute holding ` and `-joined requirement conditions.
pub const ATTR_REQUIREMENTS: &str = "RequirementConditions";

/// Descriptive and property fields rewritten by an element swap.
const SWAP_FIELDS: [&str; 5] = [
    "DescriptionParams",
    "TooltipDamageList",
    "SpellFail",
    "SpellProperties",
    "SpellSuccess",
];

/// One named record in the spell corpus.
///
/// The attribute map is free-form and open-ended; this type layers typed
/// accessors and mutators on top and is the only place allowed to touch
/// the raw map. Relationship edges (parent, container, level chain) are
/// *not* stored here - the graph derives them from attributes on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spell {
    /// Unique name within a loaded corpus.
    pub name: String,
    /// Category tag from the `SpellType` data line.
    pub spell_type: String,
    /// Optional inheritance parent, resolved by name at use time.
    pub using: Option<String>,
    data: BTreeMap<String, String>,
}

impl Spell {
    /// Create an empty spell with the given name and category tag.
    pub fn new(name: impl Into<String>, spell_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spell_type: spell_type.into(),
            using: None,
            data: BTreeMap::new(),
        }
    }

    pub(crate) fn with_data(
        name: String,
        spell_type: String,
        using: Option<String>,
        data: BTreeMap<String, String>,
    ) -> Self {
        Self {
            name,
            spell_type,
            using,
            data,
        }
    }

    /// Raw read access to one attribute value.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub(crate) fn attributes(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    fn set_attribute(&mut self, key: &str, value: String) {
        self.data.insert(key.to_string(), value);
    }

    fn split_set(&self, key: &str, separator: &str) -> BTreeSet<String> {
        match self.data.get(key) {
            Some(value) if !value.is_empty() => value
                .split(separator)
                .map(str::to_string)
                .collect(),
            _ => BTreeSet::new(),
        }
    }

    fn join_set(&mut self, key: &str, separator: &str, values: BTreeSet<String>) {
        let joined = values.into_iter().collect::<Vec<_>>().join(separator);
        self.set_attribute(key, joined);
    }

    // --- Read accessors -------------------------------------------------

    /// The flag set from `SpellFlags`.
    pub fn flags(&self) -> BTreeSet<String> {
        self.split_set(ATTR_FLAGS, ";")
    }

    /// The use-cost set from `UseCosts`.
    pub fn use_costs(&self) -> BTreeSet<String> {
        self.split_set(ATTR_USE_COSTS, ";")
    }

    /// Member names listed in `ContainerSpells`.
    pub fn container_spells(&self) -> BTreeSet<String> {
        self.split_set(ATTR_CONTAINER_SPELLS, ";")
    }

    /// The requirement condition set from `RequirementConditions`.
    pub fn requirement_conditions(&self) -> BTreeSet<String> {
        self.split_set(ATTR_REQUIREMENTS, " and ")
    }

    /// The raw damage type attribute value.
    pub fn damage_type(&self) -> Option<&str> {
        self.attribute("DamageType")
    }

    /// The damage type parsed as a transmutable element.
    pub fn damage_element(&self) -> Option<Element> {
        self.damage_type().and_then(Element::parse)
    }

    /// Power level of this spell: nonzero `PowerLevel`, else `Level`, else 0.
    pub fn level(&self) -> i32 {
        let parse = |key: &str| {
            self.data
                .get(key)
                .and_then(|v| v.parse::<i32>().ok())
                .unwrap_or(0)
        };
        match parse("PowerLevel") {
            0 => parse("Level"),
            level => level,
        }
    }

    /// The container this spell names, if the attribute is present.
    ///
    /// An empty value is returned as `Some("")`: the key exists but links
    /// nothing, which matters for container inheritance during linking.
    pub fn spell_container_id(&self) -> Option<&str> {
        self.attribute(ATTR_CONTAINER_ID)
    }

    /// The level-chain root this spell names, if present.
    pub fn root_spell_id(&self) -> Option<&str> {
        self.attribute(ATTR_ROOT_SPELL_ID)
    }

    /// Elements this spell can be transmuted into: the full enum minus the
    /// current damage element. Empty when the spell is not elemental.
    pub fn transmutable_elements(&self) -> Vec<Element> {
        match self.damage_element() {
            Some(element) => element.complements(),
            None => Vec::new(),
        }
    }

    // --- Predicates -----------------------------------------------------

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags().contains(flag)
    }

    pub fn has_using(&self) -> bool {
        self.using.is_some()
    }

    /// Whether a non-empty container reference is present.
    pub fn has_spell_container(&self) -> bool {
        self.spell_container_id().is_some_and(|v| !v.is_empty())
    }

    /// Whether a non-empty member list is present.
    pub fn has_container_spells(&self) -> bool {
        self.attribute(ATTR_CONTAINER_SPELLS)
            .is_some_and(|v| !v.is_empty())
    }

    /// Whether a non-empty level-chain root reference is present.
    pub fn has_root_spell(&self) -> bool {
        self.root_spell_id().is_some_and(|v| !v.is_empty())
    }

    pub fn is_concentration(&self) -> bool {
        self.has_flag(FLAG_CONCENTRATION)
    }

    pub fn is_container(&self) -> bool {
        self.has_flag(FLAG_LINKED_CONTAINER)
    }

    /// Whether the damage type is one of the five transmutable elements.
    pub fn is_elemental(&self) -> bool {
        self.damage_element().is_some()
    }

    pub fn is_harmful(&self) -> bool {
        self.has_flag(FLAG_HARMFUL)
    }

    /// A leveled spell sits on a level chain: it references a root spell
    /// and carries a nonzero level.
    pub fn is_leveled(&self) -> bool {
        self.has_root_spell() && self.level() != 0
    }

    /// Whether this record is an actual castable spell rather than a
    /// data-only entry.
    pub fn is_spell(&self) -> bool {
        self.has_flag(FLAG_SPELL)
    }

    pub fn is_temporary(&self) -> bool {
        self.has_flag(FLAG_TEMPORARY)
    }

    // --- Mutators -------------------------------------------------------

    /// Add a cost to the use costs. Idempotent; the set is re-serialized
    /// sorted and deduplicated.
    pub fn add_cost(&mut self, value: &str) {
        let mut costs = self.use_costs();
        costs.insert(value.to_string());
        self.join_set(ATTR_USE_COSTS, ";", costs);
    }

    /// Add a requirement condition. Idempotent, sorted.
    pub fn add_requirement_condition(&mut self, value: &str) {
        let mut conditions = self.requirement_conditions();
        conditions.insert(value.to_string());
        self.join_set(ATTR_REQUIREMENTS, " and ", conditions);
    }

    /// Set a flag. Idempotent; the flag set is re-serialized sorted.
    pub fn set_flag(&mut self, flag: &str) {
        let mut flags = self.flags();
        flags.insert(flag.to_string());
        self.join_set(ATTR_FLAGS, ";", flags);
    }

    /// Unset a flag. Idempotent; the flag set is re-serialized sorted.
    pub fn unset_flag(&mut self, flag: &str) {
        let mut flags = self.flags();
        flags.remove(flag);
        self.join_set(ATTR_FLAGS, ";", flags);
    }

    /// Turn this spell into a linked container. The member-list attribute
    /// is created when missing but an existing list is preserved.
    pub fn containerize(&mut self) {
        self.set_flag(FLAG_LINKED_CONTAINER);
        self.data
            .entry(ATTR_CONTAINER_SPELLS.to_string())
            .or_default();
    }

    /// Ensure this spell is not a container: the flag is cleared and the
    /// member list is emptied. Freshly duplicated spells may have inherited
    /// stale container fields from their source.
    pub fn decontainerize(&mut self) {
        self.unset_flag(FLAG_LINKED_CONTAINER);
        self.set_attribute(ATTR_CONTAINER_SPELLS, String::new());
    }

    /// Add a member name to the member list, sorted and deduplicated.
    pub fn add_member_name(&mut self, member: &str) {
        let mut members = self.container_spells();
        members.insert(member.to_string());
        self.join_set(ATTR_CONTAINER_SPELLS, ";", members);
    }

    /// Point this spell at a container by name.
    pub fn set_container(&mut self, container: &str) {
        self.set_attribute(ATTR_CONTAINER_ID, container.to_string());
    }

    /// Rewrite the level-chain root reference. A no-op when the spell has
    /// no root reference to begin with.
    pub fn set_root_spell_id(&mut self, root: &str) {
        if self.has_root_spell() {
            self.set_attribute(ATTR_ROOT_SPELL_ID, root.to_string());
        }
    }

    /// Copy selected attributes from another spell, overwriting only when
    /// the source value is non-empty.
    pub fn copy_data(&mut self, source: &Spell, keys: &[&str]) {
        for key in keys {
            if let Some(value) = source.data.get(*key) {
                if !value.is_empty() {
                    self.set_attribute(key, value.clone());
                }
            }
        }
    }

    /// Fill one attribute from another spell when it is absent or empty
    /// locally. Copy-on-read-default for inherited fields.
    pub fn inherit(&mut self, source: &Spell, key: &str) {
        let unset = self.data.get(key).is_none_or(|v| v.is_empty());
        if unset {
            let value = source.data.get(key).cloned().unwrap_or_default();
            self.set_attribute(key, value);
        }
    }

    /// Set the damage type and substitute the old element token by the new
    /// one across the descriptive and property fields.
    ///
    /// This is a literal text substitution, not a structured edit: if the
    /// token appears outside a damage expression it is rewritten too.
    pub fn swap_element(&mut self, to: Element, from: Option<&str>) {
        let from = from
            .map(str::to_string)
            .or_else(|| self.damage_type().map(str::to_string));
        self.set_attribute("DamageType", to.as_str().to_string());
        let Some(from) = from else { return };
        for field in SWAP_FIELDS {
            if let Some(value) = self.data.get(field) {
                if !value.is_empty() {
                    let swapped = value.replace(&from, to.as_str());
                    self.set_attribute(field, swapped);
                }
            }
        }
    }

    /// Deep-copy this spell under a new name, sharing type, inheritance
    /// parent, and the full attribute map.
    pub fn duplicate(&self, name: &str) -> Spell {
        Spell {
            name: name.to_string(),
            spell_type: self.spell_type.clone(),
            using: self.using.clone(),
            data: self.data.clone(),
        }
    }

    // --- Variant construction -------------------------------------------

    /// Build a postfixed name. For leveled spells the postfix lands before
    /// the trailing level segment (`Target_Hex_2` -> `Target_Hex_Frost_2`),
    /// otherwise it is appended.
    pub fn postfix_name(&self, postfix: &str) -> String {
        if self.is_leveled() {
            let segments: Vec<&str> = self.name.split('_').collect();
            if let Some((level, base)) = segments.split_last() {
                let mut parts: Vec<&str> = base.to_vec();
                parts.push(postfix);
                parts.push(level);
                return parts.join("_");
            }
        }
        format!("{}_{}", self.name, postfix)
    }

    /// Build the postfixed name of the inheritance parent. Parent names
    /// carry no level segment, so the postfix is always appended.
    pub fn postfix_using(&self, postfix: &str) -> Option<String> {
        self.using.as_ref().map(|using| format!("{using}_{postfix}"))
    }

    fn postfix_root_spell_id(&self, postfix: &str) -> String {
        format!("{}_{}", self.root_spell_id().unwrap_or(""), postfix)
    }

    /// Create a generated variant of this spell: a duplicate under the
    /// postfixed name, containerized under `self`, with the root reference
    /// re-derived the same way. Deprioritized variants carry a leading `_`
    /// marker on both name and derived root id so canonical alternatives
    /// list first.
    pub fn create_variant(&self, postfix: &str, deprioritized: bool) -> Spell {
        let (name, root) = if deprioritized {
            (
                format!("_{}", self.postfix_name(postfix)),
                format!("_{}", self.postfix_root_spell_id(postfix)),
            )
        } else {
            (
                self.postfix_name(postfix),
                self.postfix_root_spell_id(postfix),
            )
        };
        let mut variant = self.duplicate(&name);
        variant.set_container(&self.name);
        variant.set_root_spell_id(&root);
        variant
    }
}

impl PartialEq for Spell {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Spell {}

impl PartialOrd for Spell {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Spell {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}
