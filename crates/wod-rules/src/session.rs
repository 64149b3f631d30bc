//! Caller-side wizard operations.
//!
//! `WizardSession` owns a build and applies one change at a time. A change
//! that would break a pool, a cap, or a freebie baseline is refused with a
//! [`RuleError`] and leaves the build untouched.

use std::collections::BTreeMap;
use std::fmt;

use wod_core::rating::{MAX_RAW_DOTS, saturating_sum, signed_points};
use wod_core::{
    Background, Baselines, MeritFlawEntry, PriorityTier, Rating, SpendKind, TraitGroup, WizardData,
};

use crate::error::{RuleError, RuleResult};
use crate::ledger::{FreebieLedger, capture_baselines};
use crate::merits::{MAX_ENTRY_VALUE, MeritFlawTally};
use crate::rules::RuleTable;
use crate::validate::Validator;

/// Something freebie points can be spent on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FreebieTarget {
    /// An attribute in a category.
    Attribute {
        /// Category (e.g. "physical").
        category: String,
        /// Attribute name.
        name: String,
    },
    /// An ability in a category.
    Ability {
        /// Category (e.g. "talents").
        category: String,
        /// Ability name.
        name: String,
    },
    /// A background.
    Background(String),
    /// A sphere, by key.
    Sphere(String),
    /// A lore path, by id.
    Lore(String),
    /// A virtue.
    Virtue(String),
    /// Faith.
    Faith,
    /// Permanent Willpower.
    Willpower,
    /// Enlightenment (Arete).
    Enlightenment,
}

impl FreebieTarget {
    /// An attribute target.
    pub fn attribute(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Attribute {
            category: category.into(),
            name: name.into(),
        }
    }

    /// An ability target.
    pub fn ability(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Ability {
            category: category.into(),
            name: name.into(),
        }
    }

    /// The exchange rate that applies.
    pub fn kind(&self) -> SpendKind {
        match self {
            Self::Attribute { .. } => SpendKind::Attribute,
            Self::Ability { .. } => SpendKind::Ability,
            Self::Background(_) => SpendKind::Background,
            Self::Sphere(_) => SpendKind::Sphere,
            Self::Lore(_) => SpendKind::Lore,
            Self::Virtue(_) => SpendKind::Virtue,
            Self::Faith => SpendKind::Faith,
            Self::Willpower => SpendKind::Willpower,
            Self::Enlightenment => SpendKind::Enlightenment,
        }
    }
}

impl fmt::Display for FreebieTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute { name, .. } | Self::Ability { name, .. } => f.write_str(name),
            Self::Background(name) | Self::Sphere(name) | Self::Lore(name) | Self::Virtue(name) => {
                f.write_str(name)
            }
            Self::Faith => f.write_str("Faith"),
            Self::Willpower => f.write_str("Willpower"),
            Self::Enlightenment => f.write_str("Enlightenment"),
        }
    }
}

/// A character build being edited under one archetype's rules.
#[derive(Debug, Clone)]
pub struct WizardSession<'a> {
    table: &'a RuleTable,
    data: WizardData,
}

impl<'a> WizardSession<'a> {
    /// Start a fresh build with every trait at its starting value.
    pub fn blank(table: &'a RuleTable) -> Self {
        let mut data = WizardData::default();
        for group in [TraitGroup::Attributes, TraitGroup::Abilities] {
            let rules = table.group(group);
            let allocation = data.allocation_mut(group);
            for category in &rules.categories {
                for name in &category.traits {
                    allocation.set(&category.name, name, rules.starting);
                }
            }
        }
        let advantages = &mut data.advantages;
        advantages.enlightenment = table.advantages.enlightenment.map(|e| e.starting);
        advantages.faith = table.advantages.faith.map(|f| f.starting);
        if let Some(virtues) = &table.advantages.virtues {
            for name in &virtues.available {
                advantages.virtues.insert(name.clone(), virtues.starting);
            }
        }
        data.freebies.remaining = signed_points(table.freebies.total);
        Self { table, data }
    }

    /// Continue editing saved progress.
    pub fn resume(table: &'a RuleTable, data: WizardData) -> Self {
        Self { table, data }
    }

    /// The rules in force.
    pub fn table(&self) -> &'a RuleTable {
        self.table
    }

    /// The build.
    pub fn data(&self) -> &WizardData {
        &self.data
    }

    /// Give up the session and keep the build.
    pub fn into_data(self) -> WizardData {
        self.data
    }

    /// A validator over this session's rules.
    pub fn validator(&self) -> Validator<'a> {
        Validator::new(self.table)
    }

    // -- concept and priorities ---------------------------------------------

    /// Set an identity field.
    pub fn set_concept(&mut self, field: &str, value: &str) {
        self.data.concept.set(field, value);
    }

    /// Put a category in a priority tier.
    ///
    /// A category can hold only one tier: any other tier it held is cleared.
    pub fn assign_priority(
        &mut self,
        group: TraitGroup,
        tier: PriorityTier,
        category: &str,
    ) -> RuleResult<()> {
        if self.table.group(group).category(category).is_none() {
            return Err(RuleError::UnknownCategory(category.to_string()));
        }
        let selection = &mut self.data.allocation_mut(group).priority_selection;
        for other in PriorityTier::ALL {
            if other != tier && selection.get(other) == Some(category) {
                selection.set(other, None);
            }
        }
        selection.set(tier, Some(category.to_string()));
        Ok(())
    }

    /// Raise or lower a priority-funded trait.
    ///
    /// Stays within `[starting, maxAtCreation]` and, once the category has a
    /// tier, within that tier's pool. A stored freebie balance is
    /// recalculated afterwards.
    pub fn modify_trait(
        &mut self,
        group: TraitGroup,
        category: &str,
        name: &str,
        delta: i32,
    ) -> RuleResult<u32> {
        let rules = self.table.group(group);
        let starting = rules.starting;
        let current = self.trait_value(group, category, name)?;
        let new = bounded(name, current, delta, starting, rules.max_at_creation)?;

        let allocation = self.data.allocation(group);
        if delta > 0 {
            if let Some(tier) = allocation.priority_selection.tier_of(category) {
                let allowed = rules.priorities.allowed(tier);
                let spent: u32 = allocation
                    .values
                    .get(category)
                    .into_iter()
                    .flatten()
                    .filter_map(|(_, rating)| rating.dots())
                    .map(|dots| dots.saturating_sub(starting))
                    .sum();
                let after = spent - current.saturating_sub(starting) + (new - starting);
                if after > allowed {
                    return Err(RuleError::PoolExhausted {
                        pool: group.pool_label(category),
                        max: allowed,
                    });
                }
            }
        }

        self.data.allocation_mut(group).set(category, name, new);
        self.refresh_remaining();
        Ok(new)
    }

    // -- advantages ---------------------------------------------------------

    /// Set a background's dots. Zero removes it.
    pub fn set_background(&mut self, name: &str, value: u32) -> RuleResult<u32> {
        let rules = self
            .table
            .advantages
            .backgrounds
            .as_ref()
            .ok_or(RuleError::NotApplicable("backgrounds"))?;
        if !rules.available.iter().any(|b| b == name) {
            return Err(RuleError::UnknownTrait(name.to_string()));
        }
        if value > rules.max_per_background {
            return Err(RuleError::AtMaximum {
                name: name.to_string(),
                max: rules.max_per_background,
            });
        }
        let others = saturating_sum(
            self.data
                .advantages
                .backgrounds
                .iter()
                .filter(|bg| bg.name != name)
                .map(|bg| bg.value.saturating_mul(rules.unit_cost(&bg.name))),
        );
        if others.saturating_add(value * rules.unit_cost(name)) > rules.points {
            return Err(RuleError::PoolExhausted {
                pool: "background".to_string(),
                max: rules.points,
            });
        }
        upsert_background(&mut self.data.advantages.backgrounds, name, value);
        self.refresh_remaining();
        Ok(value)
    }

    /// Raise or lower a sphere during the advantages step.
    ///
    /// No sphere may rise above the current Enlightenment.
    pub fn modify_sphere(&mut self, sphere: &str, delta: i32) -> RuleResult<u32> {
        let rules = self
            .table
            .advantages
            .spheres
            .as_ref()
            .ok_or(RuleError::NotApplicable("spheres"))?;
        if !rules.available.contains_key(sphere) {
            return Err(RuleError::UnknownTrait(sphere.to_string()));
        }
        let display = self.table.sphere_name(sphere);
        let spheres = &self.data.advantages.spheres;
        let current = spheres.get(sphere).copied().unwrap_or(0);
        let new = bounded(display, current, delta, 0, u32::MAX)?;

        if delta > 0 {
            let total = self
                .data
                .advantages
                .sphere_total()
                .saturating_sub(current)
                .saturating_add(new);
            if total > rules.points {
                return Err(RuleError::PoolExhausted {
                    pool: "sphere".to_string(),
                    max: rules.points,
                });
            }
            let enlightenment = self.enlightenment();
            if new > enlightenment {
                return Err(RuleError::SphereExceedsEnlightenment {
                    sphere: display.to_string(),
                    enlightenment,
                });
            }
        }

        set_or_remove(&mut self.data.advantages.spheres, sphere, new);
        self.refresh_remaining();
        Ok(new)
    }

    /// Buy or refund Enlightenment with freebie points.
    ///
    /// Never drops below the starting value or below the highest sphere.
    pub fn modify_enlightenment(&mut self, delta: i32) -> RuleResult<u32> {
        let rules = self
            .table
            .advantages
            .enlightenment
            .ok_or(RuleError::NotApplicable("Enlightenment purchases"))?;
        let cost = self
            .table
            .freebie_cost(SpendKind::Enlightenment)
            .unwrap_or(0);
        let max = self
            .table
            .freebie_limit(SpendKind::Enlightenment)
            .unwrap_or(MAX_RAW_DOTS);
        let current = self.enlightenment();
        let new = bounded("Enlightenment", current, delta, rules.starting, max)?;

        if delta > 0 {
            let price = cost.saturating_mul(delta.unsigned_abs());
            let available = self.freebies_available();
            if available < signed_points(price) {
                return Err(RuleError::NotEnoughFreebies {
                    cost: price,
                    available,
                });
            }
        } else {
            let too_high: Vec<String> = self
                .data
                .advantages
                .spheres
                .iter()
                .filter(|(_, value)| **value > new)
                .map(|(key, value)| format!("{} ({value})", self.table.sphere_name(key)))
                .collect();
            if !too_high.is_empty() {
                return Err(RuleError::EnlightenmentBelowSpheres {
                    enlightenment: new,
                    spheres: too_high.join(", "),
                });
            }
        }

        let advantages = &mut self.data.advantages;
        advantages.enlightenment = Some(new);
        let spent = i64::from(advantages.freebies_spent) + i64::from(delta) * i64::from(cost);
        advantages.freebies_spent = spent.max(0) as u32;
        self.refresh_remaining();
        Ok(new)
    }

    /// Raise or lower a lore path during the advantages step. Zero removes it.
    pub fn modify_lore(&mut self, path: &str, delta: i32) -> RuleResult<u32> {
        let rules = self
            .table
            .advantages
            .lore
            .ok_or(RuleError::NotApplicable("lore paths"))?;
        let lore = &self.data.advantages.lore;
        let current = lore.get(path).copied().unwrap_or(0);
        let new = bounded(path, current, delta, 0, rules.max_at_creation)?;
        if delta > 0 {
            let total = saturating_sum(lore.values().copied())
                .saturating_sub(current)
                .saturating_add(new);
            if total > rules.points {
                return Err(RuleError::PoolExhausted {
                    pool: "lore".to_string(),
                    max: rules.points,
                });
            }
        }
        set_or_remove(&mut self.data.advantages.lore, path, new);
        self.refresh_remaining();
        Ok(new)
    }

    /// Raise or lower a virtue during the advantages step.
    pub fn modify_virtue(&mut self, name: &str, delta: i32) -> RuleResult<u32> {
        let rules = self
            .table
            .advantages
            .virtues
            .as_ref()
            .ok_or(RuleError::NotApplicable("virtues"))?;
        if !rules.available.iter().any(|v| v == name) {
            return Err(RuleError::UnknownTrait(name.to_string()));
        }
        let virtues = &self.data.advantages.virtues;
        let value_of = |v: &str| virtues.get(v).copied().unwrap_or(rules.starting);
        let current = value_of(name);
        let new = bounded(name, current, delta, rules.starting, rules.max)?;
        if delta > 0 {
            let spent = saturating_sum(
                rules
                    .available
                    .iter()
                    .filter(|v| *v != name)
                    .map(|v| value_of(v).saturating_sub(rules.starting)),
            );
            if spent.saturating_add(new - rules.starting) > rules.points {
                return Err(RuleError::PoolExhausted {
                    pool: "virtue".to_string(),
                    max: rules.points,
                });
            }
        }
        self.data.advantages.virtues.insert(name.to_string(), new);
        self.refresh_remaining();
        Ok(new)
    }

    // -- merits and flaws ---------------------------------------------------

    /// Take a merit.
    pub fn add_merit(&mut self, name: &str, value: u32) -> RuleResult<MeritFlawTally> {
        self.add_entry(true, name, value)
    }

    /// Take a flaw.
    pub fn add_flaw(&mut self, name: &str, value: u32) -> RuleResult<MeritFlawTally> {
        self.add_entry(false, name, value)
    }

    /// Drop a merit by name.
    pub fn remove_merit(&mut self, name: &str) -> RuleResult<MeritFlawTally> {
        self.remove_entry(true, name)
    }

    /// Drop a flaw by name.
    pub fn remove_flaw(&mut self, name: &str) -> RuleResult<MeritFlawTally> {
        self.remove_entry(false, name)
    }

    fn entries_mut(&mut self, merit: bool) -> RuleResult<&mut Vec<MeritFlawEntry>> {
        if self.table.merits_flaws.is_none() {
            return Err(RuleError::NotApplicable("merits and flaws"));
        }
        let data = &mut self.data.merits_flaws;
        Ok(if merit { &mut data.merits } else { &mut data.flaws })
    }

    fn add_entry(&mut self, merit: bool, name: &str, value: u32) -> RuleResult<MeritFlawTally> {
        if value > MAX_ENTRY_VALUE {
            return Err(RuleError::InvalidMeritFlawValue {
                name: name.to_string(),
                value,
            });
        }
        self.entries_mut(merit)?
            .push(MeritFlawEntry::new(name, value));
        Ok(self.retally())
    }

    fn remove_entry(&mut self, merit: bool, name: &str) -> RuleResult<MeritFlawTally> {
        let entries = self.entries_mut(merit)?;
        let index = entries
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| RuleError::UnknownTrait(name.to_string()))?;
        entries.remove(index);
        Ok(self.retally())
    }

    fn retally(&mut self) -> MeritFlawTally {
        let tally = MeritFlawTally::from_data(&self.data.merits_flaws);
        tally.apply(&mut self.data.merits_flaws);
        self.refresh_remaining();
        tally
    }

    // -- freebies -----------------------------------------------------------

    /// Enter the freebies step.
    ///
    /// Baselines are captured the first time only; re-entering keeps them.
    /// Returns the recalculated balance.
    pub fn enter_freebies(&mut self) -> i32 {
        if self.data.freebies.baselines.is_none() {
            self.data.freebies.baselines = Some(capture_baselines(self.table, &self.data));
            tracing::debug!(archetype = %self.table.archetype, "captured freebie baselines");
        }
        self.refresh_remaining()
    }

    /// Spend (or refund, with a negative delta) freebie points on a target.
    ///
    /// Refuses to go below the baseline, above the kind's freebie limit, or
    /// past the remaining balance. The balance is recalculated from scratch
    /// afterwards.
    pub fn spend_freebie(&mut self, target: FreebieTarget, delta: i32) -> RuleResult<u32> {
        let Some(baselines) = &self.data.freebies.baselines else {
            return Err(RuleError::FreebiesNotStarted);
        };
        if target == FreebieTarget::Enlightenment {
            return self.modify_enlightenment(delta);
        }
        let kind = target.kind();
        if self.table.freebie_cost(kind).is_none() {
            return Err(RuleError::NotApplicable(not_applicable_label(kind)));
        }

        let (current, baseline) = self.freebie_position(&target, baselines)?;
        let label = target.to_string();
        let new = match current.checked_add_signed(delta) {
            Some(value) if delta < 0 && value < baseline => None,
            other => other,
        }
        .ok_or_else(|| RuleError::BelowBaseline(label.clone()))?;

        if delta > 0 {
            let limit = self.freebie_cap(&target);
            if new > limit {
                return Err(RuleError::AtMaximum {
                    name: label,
                    max: limit,
                });
            }
            if let FreebieTarget::Sphere(key) = &target {
                let enlightenment = self.enlightenment();
                if new > enlightenment {
                    return Err(RuleError::SphereExceedsEnlightenment {
                        sphere: self.table.sphere_name(key).to_string(),
                        enlightenment,
                    });
                }
            }
        }

        let before = self.freebies_available();
        let mut trial = self.data.clone();
        write_value(self.table, &mut trial, &target, new);
        if delta > 0 {
            let after = FreebieLedger::recalculate(self.table, &trial).map_or(0, |l| l.remaining());
            if after < 0 {
                return Err(RuleError::NotEnoughFreebies {
                    cost: before.saturating_sub(after).unsigned_abs(),
                    available: before,
                });
            }
        }

        self.data = trial;
        let remaining = self.refresh_remaining();
        tracing::debug!(trait_name = %label, value = new, remaining, "freebie spend applied");
        Ok(new)
    }

    /// The freebie ledger, once baselines exist.
    pub fn ledger(&self) -> Option<FreebieLedger> {
        FreebieLedger::recalculate(self.table, &self.data)
    }

    /// Highest value freebies can buy: the kind's limit, else the trait's
    /// creation cap.
    fn freebie_cap(&self, target: &FreebieTarget) -> u32 {
        let fallback = match target {
            FreebieTarget::Attribute { .. } => Some(self.table.attributes.max_at_creation),
            FreebieTarget::Ability { .. } => Some(self.table.abilities.max_at_creation),
            FreebieTarget::Background(_) => self
                .table
                .advantages
                .backgrounds
                .as_ref()
                .map(|rules| rules.max_per_background),
            _ => None,
        };
        self.table
            .freebie_limit(target.kind())
            .or(fallback)
            .unwrap_or(MAX_RAW_DOTS)
    }

    fn freebie_position(
        &self,
        target: &FreebieTarget,
        baselines: &Baselines,
    ) -> RuleResult<(u32, u32)> {
        let advantages = &self.data.advantages;
        let adv_rules = &self.table.advantages;
        match target {
            FreebieTarget::Attribute { category, name } => {
                self.trait_position(TraitGroup::Attributes, category, name, baselines)
            }
            FreebieTarget::Ability { category, name } => {
                self.trait_position(TraitGroup::Abilities, category, name, baselines)
            }
            FreebieTarget::Background(name) => {
                let known = adv_rules
                    .backgrounds
                    .as_ref()
                    .is_some_and(|rules| rules.available.iter().any(|b| b == name));
                if !known {
                    return Err(RuleError::UnknownTrait(name.clone()));
                }
                Ok((advantages.background(name), baselines.background(name)))
            }
            FreebieTarget::Sphere(key) => {
                let known = adv_rules
                    .spheres
                    .as_ref()
                    .is_some_and(|rules| rules.available.contains_key(key));
                if !known {
                    return Err(RuleError::UnknownTrait(key.clone()));
                }
                Ok((
                    advantages.spheres.get(key).copied().unwrap_or(0),
                    baselines.spheres.get(key).copied().unwrap_or(0),
                ))
            }
            FreebieTarget::Lore(path) => Ok((
                advantages.lore.get(path).copied().unwrap_or(0),
                baselines.lore.get(path).copied().unwrap_or(0),
            )),
            FreebieTarget::Virtue(name) => {
                let rules = adv_rules
                    .virtues
                    .as_ref()
                    .ok_or(RuleError::NotApplicable("virtues"))?;
                if !rules.available.iter().any(|v| v == name) {
                    return Err(RuleError::UnknownTrait(name.clone()));
                }
                Ok((
                    advantages.virtues.get(name).copied().unwrap_or(rules.starting),
                    baselines.virtues.get(name).copied().unwrap_or(rules.starting),
                ))
            }
            FreebieTarget::Faith => {
                let starting = adv_rules
                    .faith
                    .ok_or(RuleError::NotApplicable("Faith purchases"))?
                    .starting;
                Ok((
                    advantages.faith.unwrap_or(starting),
                    baselines.faith.unwrap_or(starting),
                ))
            }
            FreebieTarget::Willpower => {
                let starting = adv_rules.willpower.starting;
                Ok((
                    starting.saturating_add(self.data.freebies.willpower_spent()),
                    starting.saturating_add(baselines.willpower),
                ))
            }
            FreebieTarget::Enlightenment => {
                let current = self.enlightenment();
                Ok((current, current))
            }
        }
    }

    fn trait_position(
        &self,
        group: TraitGroup,
        category: &str,
        name: &str,
        baselines: &Baselines,
    ) -> RuleResult<(u32, u32)> {
        let current = self.trait_value(group, category, name)?;
        let baseline = baselines
            .traits(group)
            .get(category)
            .and_then(|traits| traits.get(name))
            .and_then(Rating::dots)
            .unwrap_or(self.table.group(group).starting);
        Ok((current, baseline))
    }

    /// Current dots of a configured trait. Unusable ratings read as starting.
    fn trait_value(&self, group: TraitGroup, category: &str, name: &str) -> RuleResult<u32> {
        let rules = self.table.group(group);
        let configured = rules
            .category(category)
            .ok_or_else(|| RuleError::UnknownCategory(category.to_string()))?;
        if !configured.traits.iter().any(|t| t == name) {
            return Err(RuleError::UnknownTrait(name.to_string()));
        }
        Ok(self
            .data
            .allocation(group)
            .rating(category, name)
            .and_then(Rating::dots)
            .unwrap_or(rules.starting))
    }

    fn enlightenment(&self) -> u32 {
        self.data
            .advantages
            .enlightenment
            .filter(|e| *e > 0)
            .unwrap_or_else(|| self.table.enlightenment_starting())
    }

    /// Points that can still be spent.
    ///
    /// Before baselines exist only Enlightenment purchases are tracked.
    fn freebies_available(&self) -> i32 {
        match FreebieLedger::recalculate(self.table, &self.data) {
            Some(ledger) => ledger.remaining(),
            None => {
                let bonus = MeritFlawTally::from_data(&self.data.merits_flaws).freebie_bonus;
                signed_points(self.table.freebies.total.saturating_add(bonus))
                    .saturating_sub(signed_points(self.data.advantages.freebies_spent))
            }
        }
    }

    /// Recalculate and store the balance. The stored value never goes negative.
    fn refresh_remaining(&mut self) -> i32 {
        let Some(ledger) = FreebieLedger::recalculate(self.table, &self.data) else {
            return self.data.freebies.remaining;
        };
        let remaining = ledger.remaining();
        if remaining < 0 {
            tracing::warn!(remaining, "freebie ledger is overspent, storing 0");
        }
        self.data.freebies.remaining = remaining.max(0);
        remaining
    }
}

/// Apply `delta` to `current`, staying within `[min, max]`.
fn bounded(name: &str, current: u32, delta: i32, min: u32, max: u32) -> RuleResult<u32> {
    match current.checked_add_signed(delta) {
        Some(value) if value < min => Err(RuleError::AtMinimum {
            name: name.to_string(),
            min,
        }),
        Some(value) if value > max => Err(RuleError::AtMaximum {
            name: name.to_string(),
            max,
        }),
        Some(value) => Ok(value),
        None if delta < 0 => Err(RuleError::AtMinimum {
            name: name.to_string(),
            min,
        }),
        None => Err(RuleError::AtMaximum {
            name: name.to_string(),
            max,
        }),
    }
}

fn set_or_remove(values: &mut BTreeMap<String, u32>, key: &str, value: u32) {
    if value == 0 {
        values.remove(key);
    } else {
        values.insert(key.to_string(), value);
    }
}

fn upsert_background(backgrounds: &mut Vec<Background>, name: &str, value: u32) {
    if let Some(bg) = backgrounds.iter_mut().find(|bg| bg.name == name) {
        bg.value = value;
    } else {
        backgrounds.push(Background::new(name, value));
    }
    backgrounds.retain(|bg| bg.value > 0);
}

fn write_value(table: &RuleTable, data: &mut WizardData, target: &FreebieTarget, value: u32) {
    let advantages = &mut data.advantages;
    match target {
        FreebieTarget::Attribute { category, name } => data.attributes.set(category, name, value),
        FreebieTarget::Ability { category, name } => data.abilities.set(category, name, value),
        FreebieTarget::Background(name) => {
            upsert_background(&mut advantages.backgrounds, name, value)
        }
        FreebieTarget::Sphere(key) => set_or_remove(&mut advantages.spheres, key, value),
        FreebieTarget::Lore(path) => set_or_remove(&mut advantages.lore, path, value),
        FreebieTarget::Virtue(name) => {
            advantages.virtues.insert(name.clone(), value);
        }
        FreebieTarget::Faith => advantages.faith = Some(value),
        FreebieTarget::Enlightenment => advantages.enlightenment = Some(value),
        FreebieTarget::Willpower => {
            let bought = value.saturating_sub(table.advantages.willpower.starting);
            set_or_remove(
                &mut data.freebies.spent,
                SpendKind::Willpower.as_str(),
                bought,
            );
        }
    }
}

fn not_applicable_label(kind: SpendKind) -> &'static str {
    match kind {
        SpendKind::Attribute => "attribute purchases",
        SpendKind::Ability => "ability purchases",
        SpendKind::Background => "backgrounds",
        SpendKind::Sphere => "spheres",
        SpendKind::Enlightenment => "Enlightenment purchases",
        SpendKind::Willpower => "Willpower purchases",
        SpendKind::Lore => "lore paths",
        SpendKind::Faith => "Faith purchases",
        SpendKind::Virtue => "virtues",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::tests::allocated_technocrat;
    use wod_core::{Archetype, StepId};

    fn technocrat() -> RuleTable {
        RuleTable::preset(Archetype::Technocrat)
    }

    #[test]
    fn blank_starts_every_trait() {
        let table = RuleTable::preset(Archetype::Demon);
        let session = WizardSession::blank(&table);
        let data = session.data();
        assert_eq!(
            data.attributes.rating("mental", "Wits").and_then(Rating::dots),
            Some(1)
        );
        assert_eq!(
            data.abilities.rating("skills", "Stealth").and_then(Rating::dots),
            Some(0)
        );
        assert_eq!(data.advantages.virtues["Courage"], 1);
        assert_eq!(data.advantages.faith, Some(3));
        assert_eq!(data.advantages.enlightenment, None);
        assert_eq!(data.freebies.remaining, 15);
    }

    #[test]
    fn priority_reassignment_moves_category() {
        let table = technocrat();
        let mut session = WizardSession::blank(&table);
        session
            .assign_priority(TraitGroup::Attributes, PriorityTier::Primary, "social")
            .unwrap();
        session
            .assign_priority(TraitGroup::Attributes, PriorityTier::Tertiary, "social")
            .unwrap();
        let selection = &session.data().attributes.priority_selection;
        assert_eq!(selection.get(PriorityTier::Primary), None);
        assert_eq!(selection.get(PriorityTier::Tertiary), Some("social"));

        let err = session
            .assign_priority(TraitGroup::Abilities, PriorityTier::Primary, "physical")
            .unwrap_err();
        assert!(matches!(err, RuleError::UnknownCategory(_)));
    }

    #[test]
    fn modify_trait_respects_bounds_and_pool() {
        let table = technocrat();
        let mut session = WizardSession::blank(&table);
        let err = session
            .modify_trait(TraitGroup::Attributes, "physical", "Strength", -1)
            .unwrap_err();
        assert!(matches!(err, RuleError::AtMinimum { min: 1, .. }));

        session
            .assign_priority(TraitGroup::Attributes, PriorityTier::Tertiary, "physical")
            .unwrap();
        for _ in 0..3 {
            session
                .modify_trait(TraitGroup::Attributes, "physical", "Strength", 1)
                .unwrap();
        }
        let err = session
            .modify_trait(TraitGroup::Attributes, "physical", "Dexterity", 1)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot add more physical attribute points (maximum 3)"
        );

        let err = session
            .modify_trait(TraitGroup::Attributes, "physical", "Luck", 1)
            .unwrap_err();
        assert!(matches!(err, RuleError::UnknownTrait(_)));
    }

    #[test]
    fn backgrounds_count_double_cost() {
        let table = technocrat();
        let mut session = WizardSession::blank(&table);
        session.set_background("Device", 3).unwrap();
        let err = session.set_background("Resources", 2).unwrap_err();
        assert!(matches!(err, RuleError::PoolExhausted { max: 7, .. }));
        session.set_background("Resources", 1).unwrap();
        session.set_background("Device", 0).unwrap();
        assert_eq!(session.data().advantages.backgrounds.len(), 1);
        assert!(matches!(
            session.set_background("Herd", 1),
            Err(RuleError::UnknownTrait(_))
        ));
    }

    #[test]
    fn spheres_are_capped_by_enlightenment() {
        let table = technocrat();
        let mut session = WizardSession::blank(&table);
        session.modify_sphere("forces", 1).unwrap();
        let err = session.modify_sphere("forces", 1).unwrap_err();
        assert_eq!(err.to_string(), "Forces cannot exceed Enlightenment (1)");

        session.modify_enlightenment(1).unwrap();
        assert_eq!(session.modify_sphere("forces", 1).unwrap(), 2);
        assert_eq!(session.data().advantages.freebies_spent, 4);

        let err = session.modify_enlightenment(-1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot reduce Enlightenment to 1: Forces (2) would exceed it"
        );
    }

    #[test]
    fn zero_enlightenment_reads_as_starting() {
        let table = technocrat();
        let mut data = WizardSession::blank(&table).into_data();
        data.advantages.enlightenment = Some(0);
        let mut session = WizardSession::resume(&table, data);
        assert_eq!(session.modify_sphere("forces", 1).unwrap(), 1);
        let err = session.modify_sphere("forces", 1).unwrap_err();
        assert_eq!(err.to_string(), "Forces cannot exceed Enlightenment (1)");
    }

    #[test]
    fn sphere_pool_is_limited() {
        let table = technocrat();
        let mut session = WizardSession::blank(&table);
        for sphere in ["forces", "matter", "time", "mind", "life", "prime"] {
            session.modify_sphere(sphere, 1).unwrap();
        }
        let err = session.modify_sphere("spirit", 1).unwrap_err();
        assert!(matches!(err, RuleError::PoolExhausted { max: 6, .. }));
        session.modify_sphere("prime", -1).unwrap();
        assert!(!session.data().advantages.spheres.contains_key("prime"));
    }

    #[test]
    fn enlightenment_limits() {
        let table = technocrat();
        let mut session = WizardSession::blank(&table);
        assert!(matches!(
            session.modify_enlightenment(-1),
            Err(RuleError::AtMinimum { min: 1, .. })
        ));
        session.modify_enlightenment(1).unwrap();
        session.modify_enlightenment(1).unwrap();
        assert!(matches!(
            session.modify_enlightenment(1),
            Err(RuleError::AtMaximum { max: 3, .. })
        ));
        session.modify_enlightenment(-1).unwrap();
        assert_eq!(session.data().advantages.freebies_spent, 4);
    }

    #[test]
    fn enlightenment_needs_freebies() {
        let mut table = technocrat();
        table.freebies.total = 3;
        let mut session = WizardSession::blank(&table);
        let err = session.modify_enlightenment(1).unwrap_err();
        assert!(matches!(
            err,
            RuleError::NotEnoughFreebies {
                cost: 4,
                available: 3
            }
        ));
    }

    #[test]
    fn demon_lore_and_virtues() {
        let table = RuleTable::preset(Archetype::Demon);
        let mut session = WizardSession::blank(&table);
        session.modify_lore("flame", 3).unwrap();
        assert!(matches!(
            session.modify_lore("humanity", 1),
            Err(RuleError::PoolExhausted { max: 3, .. })
        ));
        session.modify_virtue("Courage", 2).unwrap();
        session.modify_virtue("Conscience", 1).unwrap();
        assert!(matches!(
            session.modify_virtue("Self-Control", 1),
            Err(RuleError::PoolExhausted { .. })
        ));
        assert!(matches!(
            session.modify_virtue("Conviction", 1),
            Err(RuleError::UnknownTrait(_))
        ));
        assert!(matches!(
            session.modify_sphere("forces", 1),
            Err(RuleError::NotApplicable("spheres"))
        ));
    }

    #[test]
    fn merits_and_flaws_keep_totals_current() {
        let table = technocrat();
        let mut session = WizardSession::blank(&table);
        let tally = session.add_flaw("Nightmares", 3).unwrap();
        assert_eq!(tally.freebie_bonus, 3);
        let tally = session.add_merit("Acute Senses", 1).unwrap();
        assert_eq!(tally.freebie_bonus, 0);
        assert_eq!(session.data().merits_flaws.merit_points, 1);

        assert!(matches!(
            session.add_merit("Luck", 8),
            Err(RuleError::InvalidMeritFlawValue { value: 8, .. })
        ));
        assert!(matches!(
            session.remove_flaw("Phobia"),
            Err(RuleError::UnknownTrait(_))
        ));
        let tally = session.remove_merit("Acute Senses").unwrap();
        assert_eq!(tally.freebie_bonus, 3);

        let mortal = RuleTable::preset(Archetype::Mortal);
        let mut session = WizardSession::blank(&mortal);
        assert!(matches!(
            session.add_flaw("Nightmares", 1),
            Err(RuleError::NotApplicable(_))
        ));
    }

    #[test]
    fn freebies_require_baselines() {
        let table = technocrat();
        let mut session = WizardSession::blank(&table);
        assert!(matches!(
            session.spend_freebie(FreebieTarget::Willpower, 1),
            Err(RuleError::FreebiesNotStarted)
        ));
        assert_eq!(session.enter_freebies(), 15);
    }

    #[test]
    fn freebie_spend_and_refund() {
        let table = technocrat();
        let mut session = WizardSession::resume(&table, allocated_technocrat());
        session.enter_freebies();

        let target = FreebieTarget::attribute("physical", "Stamina");
        assert_eq!(session.spend_freebie(target.clone(), 1).unwrap(), 4);
        assert_eq!(session.data().freebies.remaining, 10);
        assert_eq!(session.spend_freebie(target.clone(), -1).unwrap(), 3);
        assert_eq!(session.data().freebies.remaining, 15);

        let err = session.spend_freebie(target, -1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Stamina cannot be decreased below its value before freebies"
        );
    }

    #[test]
    fn priority_edits_refresh_the_stored_balance() {
        let table = technocrat();
        let mut session = WizardSession::resume(&table, allocated_technocrat());
        session.enter_freebies();
        session
            .spend_freebie(FreebieTarget::attribute("physical", "Stamina"), 1)
            .unwrap();
        assert_eq!(session.data().freebies.remaining, 10);

        session
            .modify_trait(TraitGroup::Attributes, "physical", "Stamina", -1)
            .unwrap();
        assert_eq!(session.data().freebies.remaining, 15);
    }

    #[test]
    fn freebie_spend_guards() {
        let table = technocrat();
        let mut session = WizardSession::resume(&table, allocated_technocrat());
        session.enter_freebies();

        // Strength is already 4; limit 5.
        let strength = FreebieTarget::attribute("physical", "Strength");
        session.spend_freebie(strength.clone(), 1).unwrap();
        assert!(matches!(
            session.spend_freebie(strength, 1),
            Err(RuleError::AtMaximum { max: 5, .. })
        ));

        // Spheres stay under Enlightenment (1).
        assert!(matches!(
            session.spend_freebie(FreebieTarget::Sphere("forces".into()), 1),
            Err(RuleError::SphereExceedsEnlightenment { .. })
        ));

        // 5 left after this; two Wits dots cost 10.
        session
            .spend_freebie(FreebieTarget::attribute("social", "Appearance"), 1)
            .unwrap();
        assert_eq!(session.data().freebies.remaining, 5);
        let err = session
            .spend_freebie(FreebieTarget::attribute("mental", "Wits"), 2)
            .unwrap_err();
        assert!(matches!(
            err,
            RuleError::NotEnoughFreebies {
                cost: 10,
                available: 5
            }
        ));
        assert_eq!(
            session
                .data()
                .attributes
                .rating("mental", "Wits")
                .and_then(Rating::dots),
            Some(2)
        );

        assert!(matches!(
            session.spend_freebie(FreebieTarget::Faith, 1),
            Err(RuleError::NotApplicable(_))
        ));
    }

    #[test]
    fn enlightenment_through_freebies() {
        let table = technocrat();
        let mut session = WizardSession::resume(&table, allocated_technocrat());
        session.enter_freebies();
        assert_eq!(
            session
                .spend_freebie(FreebieTarget::Enlightenment, 1)
                .unwrap(),
            2
        );
        assert_eq!(session.data().freebies.remaining, 11);
        session
            .spend_freebie(FreebieTarget::Sphere("forces".into()), 1)
            .unwrap();
        assert_eq!(session.data().freebies.remaining, 4);
    }

    #[test]
    fn willpower_is_tracked_in_spent_map() {
        let table = technocrat();
        let mut session = WizardSession::resume(&table, allocated_technocrat());
        session.enter_freebies();
        session.spend_freebie(FreebieTarget::Willpower, 3).unwrap();
        assert_eq!(session.data().freebies.willpower_spent(), 3);
        assert!(matches!(
            session.spend_freebie(FreebieTarget::Willpower, 3),
            Err(RuleError::AtMaximum { max: 10, .. })
        ));
        session.spend_freebie(FreebieTarget::Willpower, -3).unwrap();
        assert!(session.data().freebies.spent.is_empty());
    }

    #[test]
    fn reentering_freebies_keeps_baselines() {
        let table = technocrat();
        let mut session = WizardSession::resume(&table, allocated_technocrat());
        session.enter_freebies();
        session
            .spend_freebie(FreebieTarget::Background("Resources".into()), 2)
            .unwrap();
        assert_eq!(session.enter_freebies(), 13);
        assert_eq!(
            session
                .data()
                .freebies
                .baselines
                .as_ref()
                .unwrap()
                .background("Resources"),
            3
        );
    }

    #[test]
    fn demon_freebies() {
        let table = RuleTable::preset(Archetype::Demon);
        let mut session = WizardSession::blank(&table);
        session.modify_lore("flame", 3).unwrap();
        session.enter_freebies();
        session.spend_freebie(FreebieTarget::Faith, 1).unwrap();
        session
            .spend_freebie(FreebieTarget::Lore("flame".into()), 1)
            .unwrap();
        session
            .spend_freebie(FreebieTarget::Virtue("Courage".into()), 1)
            .unwrap();
        assert_eq!(session.data().freebies.remaining, 0);
        let verdict = session.validator().validate_step(StepId::Freebies, session.data());
        assert!(verdict.valid, "{verdict}");
    }
}
