//! Attributes and abilities: priority assignment, then point spend.

use std::collections::BTreeSet;

use wod_core::{PriorityTier, TraitGroup, WizardData};

use super::{PointBreakdown, Verdict};
use crate::rules::RuleTable;

pub(super) fn check(table: &RuleTable, group: TraitGroup, data: &WizardData) -> Verdict {
    let rules = table.group(group);
    let allocation = data.allocation(group);
    let selection = &allocation.priority_selection;
    let noun = group.noun();

    if !selection.is_complete() {
        return Verdict::fail(format!("Please assign priority to all {noun} categories"));
    }
    let assigned: BTreeSet<&str> = PriorityTier::ALL
        .into_iter()
        .filter_map(|tier| selection.get(tier))
        .collect();
    if assigned.len() != PriorityTier::ALL.len() {
        return Verdict::fail(format!("Each {noun} category must have a unique priority"));
    }
    if let Some(unknown) = assigned.iter().find(|c| rules.category(c).is_none()) {
        return Verdict::fail(format!("Unknown {noun} category: {unknown}"));
    }

    // Details for every category first, so a failure still reports them all.
    let mut verdict = Verdict::pass();
    for category in &rules.categories {
        let Some(tier) = selection.tier_of(&category.name) else {
            continue;
        };
        let mut spent = 0i32;
        for (name, rating) in allocation.values.get(&category.name).into_iter().flatten() {
            match rating.dots() {
                Some(dots) => spent += dots as i32 - rules.starting as i32,
                None => verdict.warn(format!(
                    "{name} has an unusable rating {} and was counted as 0",
                    rating.as_value()
                )),
            }
        }
        let allowed = rules.priorities.allowed(tier);
        verdict
            .details
            .insert(category.name.clone(), PointBreakdown::new(spent, allowed));
    }

    for category in &rules.categories {
        let Some(detail) = verdict.details.get(&category.name).copied() else {
            continue;
        };
        let over_max = allocation
            .values
            .get(&category.name)
            .into_iter()
            .flatten()
            .find_map(|(name, rating)| {
                rating
                    .dots()
                    .filter(|dots| *dots > rules.max_at_creation)
                    .map(|dots| (name, dots))
            });
        if let Some((name, dots)) = over_max {
            return verdict.reject(format!(
                "{name} exceeds maximum ({dots}/{})",
                rules.max_at_creation
            ));
        }

        let pool = group.pool_label(&category.name);
        if detail.overspent() {
            return verdict.reject(format!(
                "Too many points spent on {pool} ({}/{})",
                detail.spent, detail.allowed
            ));
        }
        if detail.remaining > 0 {
            return verdict.reject(format!(
                "Please spend all {pool} points ({} remaining)",
                detail.remaining
            ));
        }
    }

    verdict
}
