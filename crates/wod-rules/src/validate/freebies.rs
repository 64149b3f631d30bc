//! Freebies: recalculated balance and per-kind caps.

use std::collections::BTreeMap;

use wod_core::{SpendKind, WizardData};

use super::{FreebieSummary, Verdict};
use crate::ledger::FreebieLedger;
use crate::rules::RuleTable;

pub(super) fn check(table: &RuleTable, data: &WizardData) -> Verdict {
    let mut verdict = Verdict::pass();
    let stored = data.freebies.remaining;
    let remaining = match FreebieLedger::recalculate(table, data) {
        Some(ledger) => {
            let recalculated = ledger.remaining();
            if recalculated != stored {
                tracing::debug!(stored, recalculated, "stored freebie balance is stale");
            }
            recalculated
        }
        None => stored,
    };

    if remaining < 0 {
        verdict.warn(format!(
            "freebie balance is negative ({remaining}); a spend got past its cost check"
        ));
        return verdict.reject(format!(
            "You've overspent freebie points by {}",
            remaining.unsigned_abs()
        ));
    }

    if let Some(message) = limit_violation(table, data) {
        return verdict.reject(message);
    }

    if remaining > 0 {
        return verdict.reject(format!(
            "You must spend all freebie points ({remaining} remaining)"
        ));
    }

    verdict.freebies = Some(FreebieSummary {
        remaining,
        total: table.freebies.total,
    });
    verdict
}

/// Values pushed past their freebie cap, re-checked here even though the
/// spending operations already refuse them.
fn limit_violation(table: &RuleTable, data: &WizardData) -> Option<String> {
    let advantages = &data.advantages;
    let lore = table.advantages.lore.and(table.freebie_limit(SpendKind::Lore));
    let faith = table.advantages.faith.and(table.freebie_limit(SpendKind::Faith));
    let virtue = table
        .advantages
        .virtues
        .as_ref()
        .and(table.freebie_limit(SpendKind::Virtue));

    lore.and_then(|limit| over_limit(&advantages.lore, limit))
        .or_else(|| {
            faith.and_then(|limit| {
                advantages
                    .faith
                    .filter(|f| *f > limit)
                    .map(|f| format!("Faith cannot exceed {limit} ({f})"))
            })
        })
        .or_else(|| virtue.and_then(|limit| over_limit(&advantages.virtues, limit)))
}

fn over_limit(values: &BTreeMap<String, u32>, limit: u32) -> Option<String> {
    values
        .iter()
        .find(|(_, v)| **v > limit)
        .map(|(name, value)| format!("{name} cannot exceed {limit} ({value})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::capture_baselines;
    use wod_core::{Archetype, MeritFlawEntry};

    fn entered(table: &RuleTable, mut data: WizardData) -> WizardData {
        data.freebies.baselines = Some(capture_baselines(table, &data));
        data
    }

    #[test]
    fn stored_balance_without_baselines() {
        let table = RuleTable::preset(Archetype::Mortal);
        let mut data = WizardData::default();
        data.freebies.remaining = 3;
        let verdict = check(&table, &data);
        assert_eq!(
            verdict.message.as_deref(),
            Some("You must spend all freebie points (3 remaining)")
        );

        data.freebies.remaining = 0;
        let verdict = check(&table, &data);
        assert!(verdict.valid);
        assert_eq!(verdict.freebies.unwrap().total, 21);
    }

    #[test]
    fn negative_balance_is_reported() {
        let table = RuleTable::preset(Archetype::Mortal);
        let mut data = WizardData::default();
        data.freebies.remaining = -2;
        let verdict = check(&table, &data);
        assert_eq!(
            verdict.message.as_deref(),
            Some("You've overspent freebie points by 2")
        );
        assert_eq!(verdict.warnings.len(), 1);
    }

    #[test]
    fn ledger_overrides_stale_field() {
        let table = RuleTable::preset(Archetype::Mage);
        let mut data = entered(&table, WizardData::default());
        data.freebies.remaining = 0;
        let verdict = check(&table, &data);
        assert_eq!(
            verdict.message.as_deref(),
            Some("You must spend all freebie points (15 remaining)")
        );

        data.merits_flaws.flaws = vec![MeritFlawEntry::new("Deranged", 2)];
        data.advantages.freebies_spent = 4;
        data.freebies.spent.insert("willpower".into(), 13);
        assert!(check(&table, &data).valid);
    }

    #[test]
    fn demon_caps() {
        let table = RuleTable::preset(Archetype::Demon);
        let mut data = WizardData::default();
        data.advantages.faith = Some(11);
        let verdict = check(&table, &data);
        assert_eq!(verdict.message.as_deref(), Some("Faith cannot exceed 10 (11)"));

        data.advantages.faith = Some(3);
        data.advantages.lore.insert("radiance".into(), 6);
        let verdict = check(&table, &data);
        assert_eq!(
            verdict.message.as_deref(),
            Some("radiance cannot exceed 5 (6)")
        );

        data.advantages.lore.clear();
        data.advantages.virtues.insert("Courage".into(), 6);
        let verdict = check(&table, &data);
        assert_eq!(verdict.message.as_deref(), Some("Courage cannot exceed 5 (6)"));
    }
}
