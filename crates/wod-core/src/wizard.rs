use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::category::{PriorityTier, TraitGroup};
use crate::rating::{Rating, saturating_sum};

/// Trait ratings keyed by category, then by trait name.
pub type TraitValues = BTreeMap<String, BTreeMap<String, Rating>>;

/// A character build in progress.
///
/// Owned and mutated by the caller across wizard steps. Validators only ever
/// read it. The serde layout matches the progress JSON the wizard saves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WizardData {
    /// Identity fields (name, concept, nature, ...).
    pub concept: ConceptData,
    /// Attribute priorities and dots.
    pub attributes: TraitAllocation,
    /// Ability priorities and dots.
    pub abilities: TraitAllocation,
    /// Backgrounds, spheres, lore, virtues, and related scalars.
    pub advantages: Advantages,
    /// Merits and flaws with their derived totals.
    pub merits_flaws: MeritsFlaws,
    /// Freebie bookkeeping.
    pub freebies: FreebieState,
}

impl WizardData {
    /// The allocation for a priority-funded trait group.
    pub fn allocation(&self, group: TraitGroup) -> &TraitAllocation {
        match group {
            TraitGroup::Attributes => &self.attributes,
            TraitGroup::Abilities => &self.abilities,
        }
    }

    /// Mutable access to a trait group's allocation.
    pub fn allocation_mut(&mut self, group: TraitGroup) -> &mut TraitAllocation {
        match group {
            TraitGroup::Attributes => &mut self.attributes,
            TraitGroup::Abilities => &mut self.abilities,
        }
    }
}

/// Flat identity fields. Values are whatever the UI stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptData(BTreeMap<String, Value>);

impl ConceptData {
    /// Raw value of a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field to a string value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), Value::String(value.into()));
    }

    /// Set a field to an arbitrary raw value.
    pub fn set_raw(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// The field as trimmed text, if it is a non-blank string.
    pub fn text(&self, field: &str) -> Option<&str> {
        match self.0.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim()),
            _ => None,
        }
    }

    /// True if the field is absent, null, or blank once coerced to text.
    ///
    /// Numbers and booleans always coerce to non-empty text. An empty list
    /// coerces to the empty string.
    pub fn is_blank(&self, field: &str) -> bool {
        match self.0.get(field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(Value::Array(items)) => items.is_empty(),
            Some(_) => false,
        }
    }
}

/// Priority assignment plus trait dots for one trait group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TraitAllocation {
    /// Which category sits in each priority tier.
    pub priority_selection: PrioritySelection,
    /// Dots per category per trait.
    pub values: TraitValues,
}

impl TraitAllocation {
    /// Rating of a single trait.
    pub fn rating(&self, category: &str, name: &str) -> Option<&Rating> {
        self.values.get(category)?.get(name)
    }

    /// Set a single trait.
    pub fn set(&mut self, category: &str, name: &str, dots: u32) {
        self.values
            .entry(category.to_string())
            .or_default()
            .insert(name.to_string(), Rating::new(dots));
    }
}

/// Tier to category mapping. A blank category counts as unassigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrioritySelection {
    /// Category given the primary pool.
    pub primary: Option<String>,
    /// Category given the secondary pool.
    pub secondary: Option<String>,
    /// Category given the tertiary pool.
    pub tertiary: Option<String>,
}

impl PrioritySelection {
    /// The category assigned to a tier.
    pub fn get(&self, tier: PriorityTier) -> Option<&str> {
        let slot = match tier {
            PriorityTier::Primary => &self.primary,
            PriorityTier::Secondary => &self.secondary,
            PriorityTier::Tertiary => &self.tertiary,
        };
        slot.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Assign (or clear) a tier.
    pub fn set(&mut self, tier: PriorityTier, category: Option<String>) {
        let slot = match tier {
            PriorityTier::Primary => &mut self.primary,
            PriorityTier::Secondary => &mut self.secondary,
            PriorityTier::Tertiary => &mut self.tertiary,
        };
        *slot = category;
    }

    /// The first tier holding `category`.
    pub fn tier_of(&self, category: &str) -> Option<PriorityTier> {
        PriorityTier::ALL
            .into_iter()
            .find(|tier| self.get(*tier) == Some(category))
    }

    /// True when every tier has a category.
    pub fn is_complete(&self) -> bool {
        PriorityTier::ALL.iter().all(|tier| self.get(*tier).is_some())
    }
}

/// A named background and its dots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Background {
    /// Background name (e.g. "Resources").
    pub name: String,
    /// Dots.
    pub value: u32,
}

impl Background {
    /// Create a background entry.
    pub fn new(name: impl Into<String>, value: u32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Advantage-step data shared by every archetype.
///
/// Fields an archetype does not use stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Advantages {
    /// Background entries, in the order the player added them.
    pub backgrounds: Vec<Background>,
    /// Sphere dots keyed by sphere id.
    pub spheres: BTreeMap<String, u32>,
    /// Current Enlightenment (Arete), when the archetype has it.
    pub enlightenment: Option<u32>,
    /// Freebie points already converted into Enlightenment.
    pub freebies_spent: u32,
    /// Lore path dots keyed by path id.
    pub lore: BTreeMap<String, u32>,
    /// Virtue dots keyed by virtue name.
    pub virtues: BTreeMap<String, u32>,
    /// Current Faith, when the archetype has it.
    pub faith: Option<u32>,
}

impl Advantages {
    /// Dots in a background, 0 if it is not listed.
    pub fn background(&self, name: &str) -> u32 {
        self.backgrounds
            .iter()
            .find(|bg| bg.name == name)
            .map_or(0, |bg| bg.value)
    }

    /// Sum of all sphere dots.
    pub fn sphere_total(&self) -> u32 {
        saturating_sum(self.spheres.values().copied())
    }

    /// The highest single sphere rating.
    pub fn highest_sphere(&self) -> u32 {
        self.spheres.values().copied().max().unwrap_or(0)
    }
}

/// A merit or a flaw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeritFlawEntry {
    /// Display name.
    pub name: String,
    /// Point value.
    pub value: u32,
}

impl MeritFlawEntry {
    /// Create an entry.
    pub fn new(name: impl Into<String>, value: u32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Merits and flaws plus the totals derived from them.
///
/// The derived fields are caller-maintained caches; rules recompute them from
/// the two lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeritsFlaws {
    /// Chosen merits.
    pub merits: Vec<MeritFlawEntry>,
    /// Chosen flaws.
    pub flaws: Vec<MeritFlawEntry>,
    /// Sum of merit values.
    pub merit_points: u32,
    /// Sum of flaw values.
    pub flaw_points: u32,
    /// Extra freebie points granted by surplus flaws.
    pub freebie_bonus: u32,
}

/// Freebie-step bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FreebieState {
    /// Points left to spend. Derived; never authoritative on its own.
    pub remaining: i32,
    /// Spends on kinds with no natural baseline (e.g. "willpower").
    pub spent: BTreeMap<String, u32>,
    /// Snapshot taken when the freebies step is first entered.
    pub baselines: Option<Baselines>,
}

impl FreebieState {
    /// Willpower dots bought with freebies.
    pub fn willpower_spent(&self) -> u32 {
        self.spent.get("willpower").copied().unwrap_or(0)
    }
}

/// Values captured on first entry to the freebies step.
///
/// Anything above a baseline was bought with freebies; nothing may be
/// lowered below it during the freebies step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Baselines {
    /// Attribute dots.
    pub attributes: TraitValues,
    /// Ability dots.
    pub abilities: TraitValues,
    /// Background dots.
    pub backgrounds: Vec<Background>,
    /// Sphere dots.
    pub spheres: BTreeMap<String, u32>,
    /// Lore path dots.
    pub lore: BTreeMap<String, u32>,
    /// Virtue dots.
    pub virtues: BTreeMap<String, u32>,
    /// Faith.
    pub faith: Option<u32>,
    /// Willpower bought before the snapshot (always 0 in practice).
    pub willpower: u32,
}

impl Baselines {
    /// Baseline dots of a background, 0 if it was not present.
    pub fn background(&self, name: &str) -> u32 {
        self.backgrounds
            .iter()
            .find(|bg| bg.name == name)
            .map_or(0, |bg| bg.value)
    }

    /// Baseline trait values for a group.
    pub fn traits(&self, group: TraitGroup) -> &TraitValues {
        match group {
            TraitGroup::Attributes => &self.attributes,
            TraitGroup::Abilities => &self.abilities,
        }
    }
}
