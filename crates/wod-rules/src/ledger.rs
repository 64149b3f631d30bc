//! Freebie recalculation.
//!
//! The freebie balance is never tracked incrementally. Every change goes
//! through [`FreebieLedger::recalculate`], which prices each value above its
//! baseline from scratch.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use wod_core::rating::{saturating_sum, signed_points};
use wod_core::{Baselines, Rating, SpendKind, TraitGroup, TraitValues, WizardData};

use crate::merits::MeritFlawTally;
use crate::rules::RuleTable;

/// Snapshot the values that count as already paid for.
///
/// Taken on first entry to the freebies step. Faith is recorded at its
/// current value, or the starting value when unset.
pub fn capture_baselines(table: &RuleTable, data: &WizardData) -> Baselines {
    let faith = table
        .advantages
        .faith
        .map(|f| data.advantages.faith.unwrap_or(f.starting));
    Baselines {
        attributes: data.attributes.values.clone(),
        abilities: data.abilities.values.clone(),
        backgrounds: data.advantages.backgrounds.clone(),
        spheres: data.advantages.spheres.clone(),
        lore: data.advantages.lore.clone(),
        virtues: data.advantages.virtues.clone(),
        faith,
        willpower: 0,
    }
}

/// Freebie points spent per kind, recomputed from a build and its baselines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreebieLedger {
    /// The archetype's freebie pool.
    pub total: u32,
    /// Extra points granted by flaws.
    pub bonus: u32,
    /// Points spent per kind. Kinds with nothing spent are omitted.
    pub spent: BTreeMap<SpendKind, u32>,
}

impl FreebieLedger {
    /// Price every value above its baseline.
    ///
    /// Returns `None` until baselines have been captured.
    pub fn recalculate(table: &RuleTable, data: &WizardData) -> Option<Self> {
        let baselines = data.freebies.baselines.as_ref()?;
        let mut ledger = Self {
            total: table.freebies.total,
            bonus: MeritFlawTally::from_data(&data.merits_flaws).freebie_bonus,
            spent: BTreeMap::new(),
        };

        for (group, kind) in [
            (TraitGroup::Attributes, SpendKind::Attribute),
            (TraitGroup::Abilities, SpendKind::Ability),
        ] {
            let Some(cost) = table.freebie_cost(kind) else {
                continue;
            };
            let dots = trait_increase(
                &data.allocation(group).values,
                baselines.traits(group),
                table.group(group).starting,
            );
            ledger.add(kind, dots.saturating_mul(cost));
        }

        if table.freebie_cost(SpendKind::Background).is_some() {
            let points = saturating_sum(data.advantages.backgrounds.iter().map(|bg| {
                let increase = bg.value.saturating_sub(baselines.background(&bg.name));
                increase.saturating_mul(table.background_cost(&bg.name))
            }));
            ledger.add(SpendKind::Background, points);
        }

        if let Some(cost) = table.freebie_cost(SpendKind::Sphere) {
            let dots = map_increase(&data.advantages.spheres, &baselines.spheres, 0);
            ledger.add(SpendKind::Sphere, dots.saturating_mul(cost));
        }

        if table.freebie_cost(SpendKind::Enlightenment).is_some() {
            ledger.add(SpendKind::Enlightenment, data.advantages.freebies_spent);
        }

        if let Some(cost) = table.freebie_cost(SpendKind::Willpower) {
            let points = data.freebies.willpower_spent().saturating_mul(cost);
            ledger.add(SpendKind::Willpower, points);
        }

        if let Some(cost) = table.freebie_cost(SpendKind::Lore) {
            let dots = map_increase(&data.advantages.lore, &baselines.lore, 0);
            ledger.add(SpendKind::Lore, dots.saturating_mul(cost));
        }

        if let (Some(cost), Some(rules)) =
            (table.freebie_cost(SpendKind::Virtue), &table.advantages.virtues)
        {
            let dots = map_increase(&data.advantages.virtues, &baselines.virtues, rules.starting);
            ledger.add(SpendKind::Virtue, dots.saturating_mul(cost));
        }

        if let (Some(cost), Some(rules)) =
            (table.freebie_cost(SpendKind::Faith), table.advantages.faith)
        {
            let base = baselines.faith.unwrap_or(rules.starting);
            let current = data.advantages.faith.unwrap_or(base);
            let points = current.saturating_sub(base).saturating_mul(cost);
            ledger.add(SpendKind::Faith, points);
        }

        Some(ledger)
    }

    fn add(&mut self, kind: SpendKind, points: u32) {
        if points > 0 {
            let spent = self.spent.entry(kind).or_default();
            *spent = spent.saturating_add(points);
        }
    }

    /// Points spent on one kind.
    pub fn spent_on(&self, kind: SpendKind) -> u32 {
        self.spent.get(&kind).copied().unwrap_or(0)
    }

    /// Points spent across all kinds.
    pub fn total_spent(&self) -> u32 {
        saturating_sum(self.spent.values().copied())
    }

    /// Points available before any spending.
    pub fn available(&self) -> u32 {
        self.total.saturating_add(self.bonus)
    }

    /// Points left. Negative means the build is overspent.
    pub fn remaining(&self) -> i32 {
        signed_points(self.available()).saturating_sub(signed_points(self.total_spent()))
    }
}

impl fmt::Display for FreebieLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} freebie points spent ({} remaining)",
            self.total_spent(),
            self.available(),
            self.remaining()
        )
    }
}

/// Dots above baseline across a trait group. An unusable current rating
/// counts as "no change"; an unusable or missing baseline reads as starting.
fn trait_increase(current: &TraitValues, baseline: &TraitValues, starting: u32) -> u32 {
    current
        .iter()
        .flat_map(|(category, traits)| {
            traits.iter().map(move |(name, rating)| {
                let Some(now) = rating.dots() else {
                    return 0;
                };
                let base = baseline
                    .get(category)
                    .and_then(|b| b.get(name))
                    .and_then(Rating::dots)
                    .unwrap_or(starting);
                now.saturating_sub(base)
            })
        })
        .sum()
}

fn map_increase(
    current: &BTreeMap<String, u32>,
    baseline: &BTreeMap<String, u32>,
    default: u32,
) -> u32 {
    saturating_sum(
        current
            .iter()
            .map(|(name, now)| now.saturating_sub(baseline.get(name).copied().unwrap_or(default))),
    )
}
