//! Record blocks used across the crate's unit tests.

/// A concentration spell with no damage type.
pub const DARKNESS: &str = r#"new entry "Target_Darkness"
type "SpellData"
data "SpellType" "Target"
data "Level" "2"
data "SpellSchool" "Evocation"
data "SpellProperties" "GROUND:CreateSurface(5,10,DarknessCloud,true)"
data "TargetRadius" "18"
data "Icon" "Spell_Evocation_Darkness"
data "CycleConditions" "Enemy() and not Dead()"
data "UseCosts" "ActionPoint:1;SpellSlotsGroup:1:1:2"
data "SpellFlags" "HasVerbalComponent;IsSpell;IsConcentration;Stealth;Invisible"
data "MemoryCost" "1""#;

/// The upcast level-3 entry of the darkness chain.
pub const DARKNESS_3: &str = r#"new entry "Target_Darkness_3"
type "SpellData"
data "SpellType" "Target"
using "Target_Darkness"
data "UseCosts" "ActionPoint:1;SpellSlotsGroup:1:1:3"
data "RootSpellID" "Target_Darkness"
data "PowerLevel" "3""#;

/// A harmful elemental cantrip dealing fire damage.
pub const EMBERBOLT: &str = r#"new entry "Projectile_FireBolt"
type "SpellData"
data "SpellType" "Projectile"
data "Level" "0"
data "SpellSchool" "Evocation"
data "SpellProperties" "GROUND:SurfaceChange(Ignite);GROUND:SurfaceChange(Melt)"
data "TargetRadius" "18"
data "SpellRoll" "Attack(AttackType.RangedSpellAttack)"
data "SpellSuccess" "DealDamage(LevelMapValue(D10Cantrip),Fire,Magical)"
data "TooltipDamageList" "DealDamage(LevelMapValue(D10Cantrip),Fire)"
data "CycleConditions" "Enemy() and not Dead()"
data "UseCosts" "ActionPoint:1"
data "SpellFlags" "HasVerbalComponent;HasSomaticComponent;IsSpell;IsHarmful"
data "DamageType" "Fire""#;

/// A pre-built container listing six member spells.
pub const HEX: &str = r#"new entry "Target_Hex"
type "SpellData"
data "SpellType" "Target"
data "Level" "1"
data "SpellSchool" "Enchantment"
data "ContainerSpells" "Target_Hex_Strength;Target_Hex_Dexterity;Target_Hex_Constitution;Target_Hex_Intelligence;Target_Hex_Wisdom;Target_Hex_Charisma"
data "TargetRadius" "18"
data "Icon" "Spell_Enchantment_Hex"
data "TooltipDamageList" "DealDamage(1d6,Necrotic)"
data "CycleConditions" "Enemy() and not Dead()"
data "UseCosts" "BonusActionPoint:1;SpellSlotsGroup:1:1:1"
data "SpellFlags" "HasVerbalComponent;HasSomaticComponent;IsConcentration;IsSpell;IsLinkedSpellContainer;IsHarmful"
data "MemoryCost" "1""#;
