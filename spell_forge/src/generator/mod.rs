//! The variant forge: detachment and transmutation meta-spell generation.
//!
//! Both algorithms share the same scaffolding. They select fresh root
//! spells by capability, walk each root's level chain, graft a common
//! variant plus capability-specific variants onto every chain member, and
//! turn the member itself into a linked container of the new alternatives.
//! They differ only in the capability gate and the per-level variants they
//! build.

use std::collections::BTreeMap;

use spell_data::{Spell, FLAG_CONCENTRATION};

use crate::error::{ForgeError, Result};
use crate::library::{SpellFilter, SpellGraph};

/// Requirement condition gating detached variants.
const DETACHED_CONDITION: &str = "HasStatus('METAMAGIC_DETACHED', context.Source)";
/// Requirement condition gating transmuted variants.
const TRANSMUTED_CONDITION: &str = "HasStatus('METAMAGIC_TRANSMUTED', context.Source)";
/// Postfix of the common (behaves-as-original) variant.
const COMMON_POSTFIX: &str = "Common";
/// Postfix of the detached variant.
const DETACHED_POSTFIX: &str = "Detached";
/// Postfix of captured original spells.
const ORIGINAL_POSTFIX: &str = "Original";

/// Whether a spell is a fresh root a generation pass would process: no
/// inheritance parent, no members, not somebody's container member, not
/// temporary.
fn is_fresh_root(graph: &SpellGraph, name: &str) -> bool {
    graph.parent_of(name).is_none()
        && !graph.has_members(name)
        && graph
            .get(name)
            .is_some_and(|s| !s.has_spell_container() && !s.is_temporary())
}

/// Fresh roots matching a capability filter, in name order: exactly the
/// set a generation pass with that filter would walk.
pub fn fresh_roots(graph: &SpellGraph, filter: &SpellFilter) -> Vec<String> {
    filter
        .select(graph)
        .into_iter()
        .filter(|name| is_fresh_root(graph, name))
        .collect()
}

/// Tuning for a generation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratorOptions {
    /// Capture an untouched `Original` duplicate of each processed chain
    /// and re-parent loose children onto it, so pre-generation inheritance
    /// edges survive. Dormant: no shipped pipeline enables it yet.
    pub capture_originals: bool,
}

/// One generation run: holds the options and the per-root output groups.
///
/// A run is an explicit context threaded through the pipeline; generated
/// membership lives here and in the graph, never in process-wide state.
/// Running detachment before transmutation over the same graph makes the
/// second pass skip roots the first one containerized.
#[derive(Debug, Default)]
pub struct GeneratorRun {
    options: GeneratorOptions,
    /// Root name -> every spell name emitted for that root, in order.
    groups: BTreeMap<String, Vec<String>>,
}

impl GeneratorRun {
    /// Create a run with the given options.
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            options,
            groups: BTreeMap::new(),
        }
    }

    /// The per-root output groups accumulated so far.
    pub fn groups(&self) -> &BTreeMap<String, Vec<String>> {
        &self.groups
    }

    /// Generate detached variants for every fresh concentration spell.
    ///
    /// A detached variant drops the concentration flag, costs sorcery
    /// points scaling with the level (`2 * level + 1`), and is gated on the
    /// detachment status.
    pub fn detach(&mut self, graph: &mut SpellGraph, names: &[String]) -> Result<Vec<String>> {
        let filter = SpellFilter::new()
            .with_names(names.iter().cloned())
            .spells()
            .concentration();
        self.run(graph, &filter, |_root, member, _common| {
            let mut detached = member.create_variant(DETACHED_POSTFIX, true);
            detached.unset_flag(FLAG_CONCENTRATION);
            detached.add_cost(&format!("SorceryPoints:{}", 2 * member.level() + 1));
            detached.add_requirement_condition(DETACHED_CONDITION);
            Ok(vec![detached])
        })
    }

    /// Generate transmuted variants for every fresh harmful elemental
    /// spell: one per element the root can transmute into.
    ///
    /// Every produced variant must deal the requested element; a mismatch
    /// is a fatal invariant failure dumped in full to the log.
    pub fn transmute(&mut self, graph: &mut SpellGraph, names: &[String]) -> Result<Vec<String>> {
        let filter = SpellFilter::new()
            .with_names(names.iter().cloned())
            .spells()
            .elemental()
            .harmful();
        self.run(graph, &filter, |root, member, common| {
            let mut variants = Vec::new();
            for element in root.transmutable_elements() {
                let mut transmuted = member.create_variant(element.as_str(), true);
                transmuted.swap_element(element, root.damage_type());
                transmuted.add_cost("SorceryPoint:1");
                transmuted.add_requirement_condition(TRANSMUTED_CONDITION);

                if transmuted.damage_element() != Some(element) {
                    log::error!(
                        "transmutation produced a wrong damage type; source, common, and variant follow\n{}\n\n{}\n\n{}",
                        member.to_text(),
                        common.to_text(),
                        transmuted.to_text()
                    );
                    return Err(ForgeError::TransmutationMismatch {
                        source_spell: member.name.clone(),
                        variant: transmuted.name.clone(),
                        expected: element.as_str().to_string(),
                        found: transmuted.damage_type().map(str::to_string),
                    });
                }
                variants.push(transmuted);
            }
            Ok(variants)
        })
    }

    /// The shared scaffolding: selection, level-chain walk, containment
    /// bookkeeping, and group registration.
    fn run<F>(&mut self, graph: &mut SpellGraph, filter: &SpellFilter, build: F) -> Result<Vec<String>>
    where
        F: Fn(&Spell, &Spell, &Spell) -> Result<Vec<Spell>>,
    {
        let candidates = filter.select(graph);
        let mut emitted = Vec::new();

        for root_name in candidates {
            if !is_fresh_root(graph, &root_name) {
                log::debug!("skipping: {root_name}");
                continue;
            }
            let Some(root) = graph.get(&root_name).cloned() else {
                continue;
            };
            log::info!("creating variants for {root_name}");

            let mut group = Vec::new();
            if self.options.capture_originals {
                let captured = capture_originals(graph, &root);
                group.extend(relink_children(graph, &root_name, &captured));
                for original in captured.into_values() {
                    group.push(original.name.clone());
                    graph.adopt(original);
                }
            }

            for member_name in graph.upleveled_chain(&root_name) {
                log::info!("...{member_name}");

                // Chain members often leave flags to inheritance; give them
                // the root's set before deriving variants from them.
                graph.inherit_flags(&member_name, &root);
                let Some(member) = graph.get(&member_name).cloned() else {
                    continue;
                };

                // The common variant preserves the original behavior as a
                // selectable alternative.
                let common = member.create_variant(COMMON_POSTFIX, false);
                let mut member_spells = vec![common.clone()];
                member_spells.extend(build(&root, &member, &common)?);

                if let Some(spell) = graph.get_mut(&member_name) {
                    spell.containerize();
                }

                // A duplicate may have inherited stale container fields from
                // its source; a member must never look like a container.
                let mut member_names = Vec::new();
                for mut spell in member_spells {
                    spell.decontainerize();
                    member_names.push(spell.name.clone());
                    graph.adopt(spell);
                }
                for name in &member_names {
                    graph.register_member(&member_name, name);
                }

                group.push(member_name.clone());
                group.extend(member_names);
            }

            emitted.extend(group.iter().cloned());
            self.groups.insert(root_name, group);
        }

        Ok(emitted)
    }
}

/// Duplicate a root and its upleveled members into an untouched parallel
/// `Original` chain, re-parenting the live members onto their originals.
///
/// Returns the captured originals keyed by the live spell they mirror.
fn capture_originals(graph: &mut SpellGraph, root: &Spell) -> BTreeMap<String, Spell> {
    let mut originals = BTreeMap::new();
    let root_original = root.duplicate(&root.postfix_name(ORIGINAL_POSTFIX));
    let root_original_name = root_original.name.clone();
    originals.insert(root.name.clone(), root_original);

    for member_name in graph
        .upleveled_of(&root.name)
        .map(str::to_string)
        .collect::<Vec<_>>()
    {
        let Some(member) = graph.get(&member_name) else {
            continue;
        };
        let Some(original_parent) = member.postfix_using(ORIGINAL_POSTFIX) else {
            continue;
        };
        let original_name = member.postfix_name(ORIGINAL_POSTFIX);
        graph.reparent(&member_name, &original_parent);

        let Some(member) = graph.get(&member_name) else {
            continue;
        };
        let mut original = member.duplicate(&original_name);
        original.set_root_spell_id(&root_original_name);
        originals.insert(member_name, original);
    }
    originals
}

/// Re-parent the root's loose children (not leveled, not container
/// members) onto the captured originals, preserving their pre-generation
/// inheritance defaults. Second-degree children follow their parents and
/// need no relinking of their own.
fn relink_children(
    graph: &mut SpellGraph,
    root_name: &str,
    originals: &BTreeMap<String, Spell>,
) -> Vec<String> {
    let children: Vec<String> = graph.children_of(root_name).map(str::to_string).collect();
    let mut relinked = Vec::new();

    for child_name in children {
        let Some(child) = graph.get(&child_name) else {
            continue;
        };
        if child.is_leveled() || graph.members_of(root_name).any(|m| m == child_name) {
            continue;
        }
        let Some(old_parent) = child.using.clone() else {
            continue;
        };
        let Some(original) = originals.get(&old_parent) else {
            continue;
        };
        let new_parent = original.name.clone();
        graph.reparent(&child_name, &new_parent);
        relinked.push(child_name);
    }
    relinked
}

#[cfg(test)]
mod tests {
    use super::*;
    use spell_data::Element;

    const GLOOM: &str = r#"new entry "Target_Gloom"
type "SpellData"
data "SpellType" "Target"
data "Level" "2"
data "UseCosts" "ActionPoint:1;SpellSlotsGroup:1:1:2"
data "SpellFlags" "HasVerbalComponent;IsSpell;IsConcentration""#;

    const GLOOM_3: &str = r#"new entry "Target_Gloom_3"
type "SpellData"
data "SpellType" "Target"
using "Target_Gloom"
data "UseCosts" "ActionPoint:1;SpellSlotsGroup:1:1:3"
data "RootSpellID" "Target_Gloom"
data "PowerLevel" "3""#;

    const GLOOM_RITE: &str = r#"new entry "Target_Gloom_Rite"
type "SpellData"
data "SpellType" "Target"
using "Target_Gloom"
data "SpellFlags" "IsSpell""#;

    const EMBERRAY: &str = r#"new entry "Projectile_Emberray"
type "SpellData"
data "SpellType" "Projectile"
data "Level" "2"
data "SpellSuccess" "DealDamage(2d6,Fire,Magical)"
data "TooltipDamageList" "DealDamage(6d6,Fire)"
data "UseCosts" "ActionPoint:1;SpellSlotsGroup:1:1:2"
data "SpellFlags" "HasVerbalComponent;IsSpell;IsHarmful"
data "DamageType" "Fire""#;

    const EMBERRAY_3: &str = r#"new entry "Projectile_Emberray_3"
type "SpellData"
data "SpellType" "Projectile"
using "Projectile_Emberray"
data "DescriptionParams" "DealDamage(2d6,Fire);4"
data "UseCosts" "ActionPoint:1;SpellSlotsGroup:1:1:3"
data "RootSpellID" "Projectile_Emberray"
data "PowerLevel" "3""#;

    const FLAMEWALL: &str = r#"new entry "Wall_Flamewall"
type "SpellData"
data "SpellType" "Wall"
data "Level" "4"
data "SpellSuccess" "DealDamage(5d8,Fire,Magical)"
data "UseCosts" "ActionPoint:1"
data "SpellFlags" "IsSpell;IsConcentration;IsHarmful"
data "DamageType" "Fire""#;

    fn graph_from(blocks: &[&str]) -> SpellGraph {
        let mut graph = SpellGraph::new();
        for block in blocks {
            graph.insert(Spell::parse_block(block).unwrap());
        }
        graph.link().unwrap();
        graph
    }

    #[test]
    fn test_detach_emits_chain_and_variants() {
        let mut graph = graph_from(&[GLOOM, GLOOM_3]);
        let mut run = GeneratorRun::default();
        let emitted = run.detach(&mut graph, &[]).unwrap();

        assert_eq!(
            emitted,
            vec![
                "Target_Gloom".to_string(),
                "Target_Gloom_Common".to_string(),
                "_Target_Gloom_Detached".to_string(),
                "Target_Gloom_3".to_string(),
                "Target_Gloom_Common_3".to_string(),
                "_Target_Gloom_Detached_3".to_string(),
            ]
        );
        assert_eq!(run.groups()["Target_Gloom"], emitted);
    }

    #[test]
    fn test_detached_variant_never_concentration() {
        let mut graph = graph_from(&[GLOOM, GLOOM_3]);
        let mut run = GeneratorRun::default();
        run.detach(&mut graph, &[]).unwrap();

        for name in ["_Target_Gloom_Detached", "_Target_Gloom_Detached_3"] {
            let detached = graph.get(name).unwrap();
            assert!(!detached.is_concentration(), "{name} kept concentration");
            assert!(detached
                .requirement_conditions()
                .contains(DETACHED_CONDITION));
        }
    }

    #[test]
    fn test_detached_cost_scales_with_level() {
        let mut graph = graph_from(&[GLOOM, GLOOM_3]);
        let mut run = GeneratorRun::default();
        run.detach(&mut graph, &[]).unwrap();

        let base = graph.get("_Target_Gloom_Detached").unwrap();
        assert!(base.use_costs().contains("SorceryPoints:5"));
        let upcast = graph.get("_Target_Gloom_Detached_3").unwrap();
        assert!(upcast.use_costs().contains("SorceryPoints:7"));
    }

    #[test]
    fn test_chain_members_become_containers() {
        let mut graph = graph_from(&[GLOOM, GLOOM_3]);
        let mut run = GeneratorRun::default();
        run.detach(&mut graph, &[]).unwrap();

        for name in ["Target_Gloom", "Target_Gloom_3"] {
            let container = graph.get(name).unwrap();
            assert!(container.is_container());
            assert_eq!(container.container_spells().len(), 2);
            assert_eq!(graph.members_of(name).count(), 2);
        }
        // Members must never look like containers themselves.
        let common = graph.get("Target_Gloom_Common").unwrap();
        assert!(!common.is_container());
        assert_eq!(common.attribute("ContainerSpells"), Some(""));
        assert_eq!(graph.container_of("Target_Gloom_Common"), Some("Target_Gloom"));
    }

    #[test]
    fn test_chain_member_inherits_flags_from_root() {
        let mut graph = graph_from(&[GLOOM, GLOOM_3]);
        let mut run = GeneratorRun::default();
        run.detach(&mut graph, &[]).unwrap();

        // The common upcast keeps the inherited concentration flag.
        let common = graph.get("Target_Gloom_Common_3").unwrap();
        assert!(common.is_concentration());
        assert_eq!(common.root_spell_id(), Some("Target_Gloom_Common"));
    }

    #[test]
    fn test_detach_skips_children_and_containers() {
        let mut graph = graph_from(&[GLOOM, GLOOM_3, GLOOM_RITE]);
        let mut run = GeneratorRun::default();
        run.detach(&mut graph, &[]).unwrap();

        // The rite is a child of Target_Gloom; it never becomes a root
        // group even though it is a spell.
        assert!(!run.groups().contains_key("Target_Gloom_Rite"));
    }

    #[test]
    fn test_transmute_produces_one_variant_per_element() {
        let mut graph = graph_from(&[EMBERRAY, EMBERRAY_3]);
        let mut run = GeneratorRun::default();
        let emitted = run.transmute(&mut graph, &[]).unwrap();

        // Per chain member: the member, a common variant, and one variant
        // per element other than fire.
        assert_eq!(emitted.len(), 12);
        for element in [Element::Acid, Element::Cold, Element::Lightning, Element::Thunder] {
            let name = format!("_Projectile_Emberray_{element}");
            let variant = graph.get(&name).unwrap();
            assert_eq!(variant.damage_element(), Some(element));
            assert!(variant.use_costs().contains("SorceryPoint:1"));
            assert!(variant
                .requirement_conditions()
                .contains(TRANSMUTED_CONDITION));
        }
    }

    #[test]
    fn test_transmute_rewrites_damage_expressions() {
        let mut graph = graph_from(&[EMBERRAY, EMBERRAY_3]);
        let mut run = GeneratorRun::default();
        run.transmute(&mut graph, &[]).unwrap();

        let cold = graph.get("_Projectile_Emberray_Cold").unwrap();
        assert_eq!(
            cold.attribute("SpellSuccess"),
            Some("DealDamage(2d6,Cold,Magical)")
        );
        assert_eq!(
            cold.attribute("TooltipDamageList"),
            Some("DealDamage(6d6,Cold)")
        );

        // Upcast entries inherit the damage type but still get their
        // descriptive fields rewritten.
        let cold_3 = graph.get("_Projectile_Emberray_Cold_3").unwrap();
        assert_eq!(cold_3.damage_element(), Some(Element::Cold));
        assert_eq!(
            cold_3.attribute("DescriptionParams"),
            Some("DealDamage(2d6,Cold);4")
        );
    }

    #[test]
    fn test_transmute_skips_roots_detach_already_containerized() {
        let mut graph = graph_from(&[FLAMEWALL]);
        let mut run = GeneratorRun::default();
        let detached = run.detach(&mut graph, &[]).unwrap();
        assert!(!detached.is_empty());

        let transmuted = run.transmute(&mut graph, &[]).unwrap();
        assert!(transmuted.is_empty());
        // The detach group survives untouched.
        assert!(run.groups()["Wall_Flamewall"].contains(&"_Wall_Flamewall_Detached".to_string()));
    }

    #[test]
    fn test_name_restriction_limits_roots() {
        let mut graph = graph_from(&[GLOOM, GLOOM_3, FLAMEWALL]);
        let mut run = GeneratorRun::default();
        run.detach(&mut graph, &["Wall_Flamewall".to_string()])
            .unwrap();
        assert!(run.groups().contains_key("Wall_Flamewall"));
        assert!(!run.groups().contains_key("Target_Gloom"));
    }

    #[test]
    fn test_capture_originals_builds_parallel_chain() {
        let mut graph = graph_from(&[GLOOM, GLOOM_3, GLOOM_RITE]);
        let mut run = GeneratorRun::new(GeneratorOptions {
            capture_originals: true,
        });
        run.detach(&mut graph, &[]).unwrap();

        // Untouched copy of the root: same flags, no container markings.
        let original = graph.get("Target_Gloom_Original").unwrap();
        assert!(original.is_concentration());
        assert!(!original.is_container());
        assert!(!original.has_root_spell());

        // The upcast original forms its own chain under the original root.
        let original_3 = graph.get("Target_Gloom_Original_3").unwrap();
        assert_eq!(original_3.using.as_deref(), Some("Target_Gloom_Original"));
        assert_eq!(original_3.root_spell_id(), Some("Target_Gloom_Original"));

        // Live chain members now inherit from the originals.
        let live_3 = graph.get("Target_Gloom_3").unwrap();
        assert_eq!(live_3.using.as_deref(), Some("Target_Gloom_Original"));
    }

    #[test]
    fn test_capture_originals_relinks_loose_children() {
        let mut graph = graph_from(&[GLOOM, GLOOM_3, GLOOM_RITE]);
        let mut run = GeneratorRun::new(GeneratorOptions {
            capture_originals: true,
        });
        run.detach(&mut graph, &[]).unwrap();

        assert_eq!(
            graph.parent_of("Target_Gloom_Rite"),
            Some("Target_Gloom_Original")
        );
        let group = &run.groups()["Target_Gloom"];
        assert!(group.contains(&"Target_Gloom_Rite".to_string()));
        assert!(group.contains(&"Target_Gloom_Original".to_string()));
        assert!(group.contains(&"Target_Gloom_Original_3".to_string()));
    }

    #[test]
    fn test_fresh_roots_with_combined_capabilities() {
        let mut graph = graph_from(&[GLOOM, GLOOM_3, EMBERRAY, FLAMEWALL]);
        let filter = SpellFilter::new()
            .spells()
            .concentration()
            .elemental()
            .harmful();

        // Only the spell carrying every capability qualifies; being a
        // concentration spell (gloom) or an elemental one (emberray) alone
        // is not enough.
        assert_eq!(fresh_roots(&graph, &filter), vec!["Wall_Flamewall"]);

        // Once generated it is a container with members, no longer fresh.
        GeneratorRun::default().detach(&mut graph, &[]).unwrap();
        assert!(fresh_roots(&graph, &filter).is_empty());
    }

    #[test]
    fn test_fresh_roots_excludes_container_members() {
        let mut graph = graph_from(&[GLOOM, GLOOM_3]);
        GeneratorRun::default().detach(&mut graph, &[]).unwrap();

        let filter = SpellFilter::new().spells().concentration();
        // The common variant kept the concentration flag but lives inside
        // the generated container.
        assert!(graph.get("Target_Gloom_Common").unwrap().is_concentration());
        assert!(fresh_roots(&graph, &filter).is_empty());
    }

    #[test]
    fn test_capture_is_off_by_default() {
        let mut graph = graph_from(&[GLOOM, GLOOM_3]);
        let mut run = GeneratorRun::default();
        run.detach(&mut graph, &[]).unwrap();
        assert!(graph.get("Target_Gloom_Original").is_none());
    }
}
