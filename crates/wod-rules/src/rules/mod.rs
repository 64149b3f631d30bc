//! Rule tables: per-archetype creation rules.
//!
//! A [`RuleTable`] is pure data. Built-in tables come from the preset
//! functions in [`preset`]; a table can also be loaded from JSON to override
//! the defaults. Tables are never mutated once built.

pub mod preset;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use wod_core::{Archetype, PriorityTier, SpendKind, StepId, TraitGroup};

use crate::affinity::AffinityKind;
use crate::error::{RuleError, RuleResult};

/// Complete creation rules for one archetype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTable {
    /// Which archetype these rules build.
    pub archetype: Archetype,
    /// Wizard steps in order.
    pub steps: Vec<StepId>,
    /// Identity fields and affinity spheres.
    pub concept: ConceptRules,
    /// Attribute priorities and limits.
    pub attributes: TraitGroupRules,
    /// Ability priorities and limits.
    pub abilities: TraitGroupRules,
    /// Advantage sub-tables.
    pub advantages: AdvantageRules,
    /// Merit and flaw caps, when the archetype has the step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merits_flaws: Option<MeritFlawRules>,
    /// Freebie pool, exchange rates, and caps.
    pub freebies: FreebieRules,
}

impl RuleTable {
    /// The built-in rules for an archetype.
    pub fn preset(archetype: Archetype) -> Self {
        match archetype {
            Archetype::Mortal => preset::mortal(),
            Archetype::Mage => preset::mage(),
            Archetype::Technocrat => preset::technocrat(),
            Archetype::Demon => preset::demon(),
        }
    }

    /// Look up the built-in rules by archetype name.
    ///
    /// NPC variants (`"Mage-NPC"`) and unknown names have no wizard.
    pub fn for_archetype(name: &str) -> RuleResult<Self> {
        if name.trim().ends_with("-NPC") {
            return Err(RuleError::UnsupportedArchetype(name.to_string()));
        }
        let archetype: Archetype = name
            .parse()
            .map_err(|_| RuleError::UnsupportedArchetype(name.to_string()))?;
        Ok(Self::preset(archetype))
    }

    /// Parse a rule table from JSON.
    pub fn from_json(json: &str) -> RuleResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a rule table from a JSON file.
    pub fn from_path(path: &Path) -> RuleResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Serialize the table as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> RuleResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns true if the wizard for this archetype includes `step`.
    pub fn has_step(&self, step: StepId) -> bool {
        self.steps.contains(&step)
    }

    /// Rules for a priority-funded trait group.
    pub fn group(&self, group: TraitGroup) -> &TraitGroupRules {
        match group {
            TraitGroup::Attributes => &self.attributes,
            TraitGroup::Abilities => &self.abilities,
        }
    }

    /// Freebie cost of one unit of `kind`, if it can be bought at all.
    pub fn freebie_cost(&self, kind: SpendKind) -> Option<u32> {
        self.freebies.costs.get(kind)
    }

    /// Upper bound for `kind` when bought with freebies.
    pub fn freebie_limit(&self, kind: SpendKind) -> Option<u32> {
        self.freebies.limits.get(kind)
    }

    /// Freebie cost of one dot of the named background.
    pub fn background_cost(&self, name: &str) -> u32 {
        let base = self.freebie_cost(SpendKind::Background).unwrap_or(0);
        match &self.advantages.backgrounds {
            Some(bg) => base * bg.unit_cost(name),
            None => base,
        }
    }

    /// Starting Enlightenment, or 1 if the archetype does not track it.
    pub fn enlightenment_starting(&self) -> u32 {
        self.advantages
            .enlightenment
            .as_ref()
            .map_or(1, |e| e.starting)
    }

    /// Display name of a sphere key.
    pub fn sphere_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.advantages
            .spheres
            .as_ref()
            .and_then(|s| s.available.get(key))
            .map_or(key, String::as_str)
    }
}

/// Identity fields for the concept step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptRules {
    /// Fields in display order.
    pub fields: Vec<ConceptField>,
    /// Affinity spheres keyed by a concept field, when the archetype has them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<AffinityRules>,
}

/// A single identity field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptField {
    /// Key in the wizard data.
    pub name: String,
    /// Human-readable label used in messages.
    pub label: String,
    /// How the UI collects it.
    pub kind: FieldKind,
    /// Whether the field must be filled in.
    #[serde(default)]
    pub required: bool,
}

/// Input widget type for a concept field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Choice from a list.
    Select,
}

/// Static affinity-sphere map for an archetype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffinityRules {
    /// The concept field naming the character's group (e.g. "convention").
    pub field: String,
    /// What kind of group that field names.
    pub kind: AffinityKind,
    /// Sphere keys per group name.
    pub spheres: BTreeMap<String, Vec<String>>,
}

/// Point pools per priority tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityPools {
    /// Primary pool.
    pub primary: u32,
    /// Secondary pool.
    pub secondary: u32,
    /// Tertiary pool.
    pub tertiary: u32,
}

impl PriorityPools {
    /// Points granted by a tier.
    pub fn allowed(&self, tier: PriorityTier) -> u32 {
        match tier {
            PriorityTier::Primary => self.primary,
            PriorityTier::Secondary => self.secondary,
            PriorityTier::Tertiary => self.tertiary,
        }
    }
}

/// A trait category and the traits it contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitCategory {
    /// Category name (e.g. "physical").
    pub name: String,
    /// Trait names in display order.
    pub traits: Vec<String>,
}

/// Rules for attributes or abilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitGroupRules {
    /// Pool per priority tier.
    pub priorities: PriorityPools,
    /// The three categories, in display order.
    pub categories: Vec<TraitCategory>,
    /// Free dots every trait starts with.
    pub starting: u32,
    /// Highest rating allowed during priority spending.
    pub max_at_creation: u32,
}

impl TraitGroupRules {
    /// Look up a category.
    pub fn category(&self, name: &str) -> Option<&TraitCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Category names in order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }
}

/// Advantage sub-tables. Absent sub-tables are not validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvantageRules {
    /// Background pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backgrounds: Option<BackgroundRules>,
    /// Sphere pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spheres: Option<SphereRules>,
    /// Enlightenment (Arete).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enlightenment: Option<EnlightenmentRules>,
    /// Lore path pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lore: Option<LoreRules>,
    /// Virtue pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtues: Option<VirtueRules>,
    /// Faith.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faith: Option<FaithRules>,
    /// Starting permanent Willpower.
    pub willpower: WillpowerRules,
}

/// Background pool rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundRules {
    /// Points to distribute.
    pub points: u32,
    /// Highest rating for a single background.
    pub max_per_background: u32,
    /// Backgrounds the player may choose.
    pub available: Vec<String>,
    /// Backgrounds that cost two points per dot.
    #[serde(default)]
    pub double_cost: Vec<String>,
}

impl BackgroundRules {
    /// Pool points per dot of the named background.
    pub fn unit_cost(&self, name: &str) -> u32 {
        if self.double_cost.iter().any(|d| d == name) {
            2
        } else {
            1
        }
    }
}

/// Sphere pool rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SphereRules {
    /// Points to distribute.
    pub points: u32,
    /// Display names keyed by sphere id.
    pub available: BTreeMap<String, String>,
}

/// Enlightenment rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnlightenmentRules {
    /// Starting Enlightenment.
    pub starting: u32,
}

/// Lore path pool rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoreRules {
    /// Points to distribute.
    pub points: u32,
    /// Highest rating for a single path during the advantages step.
    pub max_at_creation: u32,
}

/// Virtue pool rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtueRules {
    /// Free dots every virtue starts with.
    pub starting: u32,
    /// Points to distribute above the starting dots.
    pub points: u32,
    /// Highest rating for a single virtue.
    pub max: u32,
    /// Virtue names.
    pub available: Vec<String>,
}

/// Faith rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaithRules {
    /// Starting Faith.
    pub starting: u32,
}

/// Willpower rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WillpowerRules {
    /// Starting permanent Willpower.
    pub starting: u32,
}

/// Merit and flaw caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeritFlawRules {
    /// Highest merit total.
    pub max_merits: u32,
    /// Highest flaw total.
    pub max_flaws: u32,
}

impl Default for MeritFlawRules {
    fn default() -> Self {
        Self {
            max_merits: 7,
            max_flaws: 7,
        }
    }
}

/// Freebie pool rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreebieRules {
    /// Points to spend.
    pub total: u32,
    /// Cost per unit.
    pub costs: SpendTable,
    /// Highest rating reachable with freebies.
    pub limits: SpendTable,
}

/// A number per spend kind. Missing entries mean "not applicable".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendTable {
    /// Attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<u32>,
    /// Abilities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability: Option<u32>,
    /// Backgrounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<u32>,
    /// Spheres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sphere: Option<u32>,
    /// Enlightenment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enlightenment: Option<u32>,
    /// Willpower.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub willpower: Option<u32>,
    /// Lore paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lore: Option<u32>,
    /// Faith.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faith: Option<u32>,
    /// Virtues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtue: Option<u32>,
}

impl SpendTable {
    /// The entry for a spend kind.
    pub fn get(&self, kind: SpendKind) -> Option<u32> {
        match kind {
            SpendKind::Attribute => self.attribute,
            SpendKind::Ability => self.ability,
            SpendKind::Background => self.background,
            SpendKind::Sphere => self.sphere,
            SpendKind::Enlightenment => self.enlightenment,
            SpendKind::Willpower => self.willpower,
            SpendKind::Lore => self.lore,
            SpendKind::Faith => self.faith,
            SpendKind::Virtue => self.virtue,
        }
    }

    /// Spend kinds that have an entry, in [`SpendKind::ALL`] order.
    pub fn kinds(&self) -> impl Iterator<Item = (SpendKind, u32)> + '_ {
        SpendKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|v| (kind, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_archetype_known() {
        let table = RuleTable::for_archetype("Technocrat").unwrap();
        assert_eq!(table.archetype, Archetype::Technocrat);
        assert!(table.has_step(StepId::MeritsFlaws));
    }

    #[test]
    fn for_archetype_unknown_or_npc() {
        assert!(matches!(
            RuleTable::for_archetype("Werewolf"),
            Err(RuleError::UnsupportedArchetype(ref n)) if n == "Werewolf"
        ));
        assert!(matches!(
            RuleTable::for_archetype("Mage-NPC"),
            Err(RuleError::UnsupportedArchetype(_))
        ));
    }

    #[test]
    fn json_round_trip_preserves_table() {
        for archetype in Archetype::ALL {
            let table = RuleTable::preset(archetype);
            let json = table.to_json_pretty().unwrap();
            assert_eq!(RuleTable::from_json(&json).unwrap(), table, "{archetype}");
        }
    }

    #[test]
    fn from_path_reads_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mortal.json");
        let mut table = RuleTable::preset(Archetype::Mortal);
        table.freebies.total = 30;
        std::fs::write(&path, table.to_json_pretty().unwrap()).unwrap();

        let loaded = RuleTable::from_path(&path).unwrap();
        assert_eq!(loaded.freebies.total, 30);
    }

    #[test]
    fn from_path_missing_file() {
        let err = RuleTable::from_path(Path::new("/nonexistent/rules.json")).unwrap_err();
        assert!(matches!(err, RuleError::Io { .. }));
    }

    #[test]
    fn background_cost_doubles() {
        let table = RuleTable::preset(Archetype::Mage);
        assert_eq!(table.background_cost("Resources"), 1);
        assert_eq!(table.background_cost("Device"), 2);

        let demon = RuleTable::preset(Archetype::Demon);
        assert_eq!(demon.background_cost("Device"), 1);
    }

    #[test]
    fn sphere_names_fall_back_to_key() {
        let table = RuleTable::preset(Archetype::Technocrat);
        assert_eq!(table.sphere_name("correspondence"), "Data");
        assert_eq!(table.sphere_name("unknown"), "unknown");
    }
}
