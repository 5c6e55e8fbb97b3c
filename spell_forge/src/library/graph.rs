//! The spell graph: a name-keyed store with relationship indexes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use spell_data::{Spell, ATTR_CONTAINER_ID, ATTR_FLAGS};

use crate::error::{ForgeError, Result};

/// The main spell graph structure.
///
/// Spells are held in a name-keyed table; inheritance, containment, and
/// level-chain relationships are expressed as name lookups in index maps
/// rather than owning references, so the graph stays cycle-free while
/// traversal remains O(1). All indexes are rebuilt by [`link`](Self::link)
/// and never serialized with the corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpellGraph {
    /// All spells stored by name.
    spells: BTreeMap<String, Spell>,

    /// Index: child name -> inheritance parent name.
    parents: HashMap<String, String>,

    /// Index: parent name -> child names.
    children: HashMap<String, BTreeSet<String>>,

    /// Index: member name -> container name.
    containers: HashMap<String, String>,

    /// Index: container name -> member names.
    members: HashMap<String, BTreeSet<String>>,

    /// Index: root name -> upleveled derivative names.
    upleveled: HashMap<String, BTreeSet<String>>,

    /// Names of inheritance tree roots (spells without `using`).
    roots: BTreeSet<String>,
}

impl SpellGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a spell. The last spell inserted under a name wins; duplicate
    /// names are not detected.
    pub fn insert(&mut self, spell: Spell) {
        self.spells.insert(spell.name.clone(), spell);
    }

    /// Get a spell by name.
    pub fn get(&self, name: &str) -> Option<&Spell> {
        self.spells.get(name)
    }

    /// Get a mutable spell by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Spell> {
        self.spells.get_mut(name)
    }

    /// Whether a spell with this name is loaded.
    pub fn contains(&self, name: &str) -> bool {
        self.spells.contains_key(name)
    }

    /// All spells, in name order.
    pub fn spells(&self) -> impl Iterator<Item = &Spell> {
        self.spells.values()
    }

    /// All spell names, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.spells.keys().map(String::as_str)
    }

    /// The total number of loaded spells.
    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    // --- Traversal ------------------------------------------------------

    /// The inheritance parent of a spell, if linked.
    pub fn parent_of(&self, name: &str) -> Option<&str> {
        self.parents.get(name).map(String::as_str)
    }

    /// The inheritance children of a spell, in name order.
    pub fn children_of(&self, name: &str) -> impl Iterator<Item = &str> {
        self.children
            .get(name)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// The container of a spell, if linked.
    pub fn container_of(&self, name: &str) -> Option<&str> {
        self.containers.get(name).map(String::as_str)
    }

    /// The linked members of a container, in name order.
    pub fn members_of(&self, name: &str) -> impl Iterator<Item = &str> {
        self.members
            .get(name)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Whether any member links to this spell as its container.
    pub fn has_members(&self, name: &str) -> bool {
        self.members.get(name).is_some_and(|m| !m.is_empty())
    }

    /// The upleveled derivatives of a root, in name order.
    pub fn upleveled_of(&self, name: &str) -> impl Iterator<Item = &str> {
        self.upleveled
            .get(name)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Names of inheritance tree roots.
    pub fn root_names(&self) -> impl Iterator<Item = &str> {
        self.roots.iter().map(String::as_str)
    }

    /// A spell followed by its upleveled derivatives: the full level chain
    /// in processing order.
    pub fn upleveled_chain(&self, name: &str) -> Vec<String> {
        let mut chain = vec![name.to_string()];
        chain.extend(self.upleveled_of(name).map(str::to_string));
        chain
    }

    // --- Linking --------------------------------------------------------

    /// Resolve all relationships in two passes.
    ///
    /// Pass 1 links containment and level chains; an unresolved container
    /// or root reference is tolerated and logged. Pass 2 links the
    /// inheritance tree; there an unresolved parent is fatal.
    pub fn link(&mut self) -> Result<()> {
        self.parents.clear();
        self.children.clear();
        self.containers.clear();
        self.members.clear();
        self.upleveled.clear();
        self.roots.clear();

        let names: Vec<String> = self.spells.keys().cloned().collect();
        self.link_containment(&names)?;
        self.link_inheritance(&names)?;
        Ok(())
    }

    /// Pass 1: containment and level-chain edges.
    fn link_containment(&mut self, names: &[String]) -> Result<()> {
        for name in names {
            // A spell that inherits from a parent without naming a container
            // picks up the parent's container. Lookup is against the fully
            // loaded collection, so load order does not matter.
            let inherited = match self.spells.get(name) {
                Some(spell) if spell.attribute(ATTR_CONTAINER_ID).is_none() => spell
                    .using
                    .as_ref()
                    .and_then(|parent| self.spells.get(parent))
                    .and_then(|parent| parent.spell_container_id())
                    .filter(|id| !id.is_empty())
                    .map(str::to_string),
                _ => None,
            };
            if let Some(container) = inherited {
                log::debug!("inheriting container from parent: {name}");
                if let Some(spell) = self.spells.get_mut(name) {
                    spell.set_container(&container);
                }
            }

            let Some(spell) = self.spells.get(name) else {
                continue;
            };

            if let Some(container) = spell.spell_container_id().filter(|id| !id.is_empty()) {
                if container == name.as_str() {
                    return Err(ForgeError::SelfContainment(name.clone()));
                }
                if self.spells.contains_key(container) {
                    self.containers.insert(name.clone(), container.to_string());
                    self.members
                        .entry(container.to_string())
                        .or_default()
                        .insert(name.clone());
                } else {
                    log::debug!("missing container spell {container} for spell {name}");
                }
            }

            let Some(spell) = self.spells.get(name) else {
                continue;
            };
            if let Some(root) = spell.root_spell_id().filter(|id| !id.is_empty()) {
                if self.spells.contains_key(root) {
                    self.upleveled
                        .entry(root.to_string())
                        .or_default()
                        .insert(name.clone());
                } else {
                    log::debug!("missing root spell {root} for spell {name}");
                }
            }
        }
        Ok(())
    }

    /// Pass 2: the inheritance tree.
    fn link_inheritance(&mut self, names: &[String]) -> Result<()> {
        for name in names {
            let using = self.spells.get(name).and_then(|s| s.using.clone());
            match using {
                None => {
                    self.roots.insert(name.clone());
                }
                Some(parent) => {
                    if parent == *name {
                        return Err(ForgeError::SelfInheritance(name.clone()));
                    }
                    if !self.spells.contains_key(&parent) {
                        return Err(ForgeError::UnknownParent {
                            name: name.clone(),
                            parent,
                        });
                    }
                    self.parents.insert(name.clone(), parent.clone());
                    self.children.entry(parent).or_default().insert(name.clone());
                }
            }
        }
        Ok(())
    }

    // --- Generation bookkeeping -----------------------------------------

    /// Insert a generated spell and register the relationship edges its
    /// attributes resolve to. Unresolvable references stay unlinked, same
    /// as Pass 1.
    pub fn adopt(&mut self, spell: Spell) {
        let name = spell.name.clone();

        if let Some(container) = spell
            .spell_container_id()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
        {
            if self.spells.contains_key(&container) {
                self.containers.insert(name.clone(), container.clone());
                self.members.entry(container).or_default().insert(name.clone());
            }
        }
        if let Some(root) = spell
            .root_spell_id()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
        {
            if self.spells.contains_key(&root) {
                self.upleveled.entry(root).or_default().insert(name.clone());
            }
        }
        match spell.using.clone() {
            Some(parent) if self.spells.contains_key(&parent) => {
                self.parents.insert(name.clone(), parent.clone());
                self.children.entry(parent).or_default().insert(name.clone());
            }
            Some(_) => {}
            None => {
                self.roots.insert(name.clone());
            }
        }

        self.insert(spell);
    }

    /// Register a member under a container, keeping the member-list
    /// attribute and both index directions consistent in one step.
    ///
    /// The member's own container attribute must already name the
    /// container; [`Spell::create_variant`] guarantees that for generated
    /// spells.
    pub fn register_member(&mut self, container: &str, member: &str) {
        if let Some(spell) = self.spells.get_mut(container) {
            spell.add_member_name(member);
        }
        self.members
            .entry(container.to_string())
            .or_default()
            .insert(member.to_string());
        self.containers
            .insert(member.to_string(), container.to_string());
    }

    /// Move a spell onto a new inheritance parent, updating the `using`
    /// directive and both index directions.
    pub fn reparent(&mut self, child: &str, new_parent: &str) {
        if let Some(old_parent) = self.parents.get(child).cloned() {
            if let Some(siblings) = self.children.get_mut(&old_parent) {
                siblings.remove(child);
            }
        }
        if let Some(spell) = self.spells.get_mut(child) {
            spell.using = Some(new_parent.to_string());
        }
        self.parents.insert(child.to_string(), new_parent.to_string());
        self.children
            .entry(new_parent.to_string())
            .or_default()
            .insert(child.to_string());
        self.roots.remove(child);
    }

    /// Fill a chain member's flag set from its root when unset.
    pub fn inherit_flags(&mut self, member: &str, root: &Spell) {
        if let Some(spell) = self.spells.get_mut(member) {
            spell.inherit(root, ATTR_FLAGS);
        }
    }
}
