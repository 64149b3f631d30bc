//! Merits and flaws: per-entry range, pool caps, and balance.

use wod_core::MeritsFlaws;

use super::Verdict;
use crate::merits::{MAX_ENTRY_VALUE, MeritFlawTally};
use crate::rules::RuleTable;

pub(super) fn check(table: &RuleTable, data: &MeritsFlaws) -> Verdict {
    let rules = table.merits_flaws.unwrap_or_default();
    let tally = MeritFlawTally::from_data(data);
    let verdict = Verdict {
        merits_flaws: Some(tally),
        ..Verdict::pass()
    };

    if let Some(entry) = data
        .merits
        .iter()
        .chain(&data.flaws)
        .find(|e| e.value > MAX_ENTRY_VALUE)
    {
        return verdict.reject(format!(
            "{} has an invalid value ({}/{MAX_ENTRY_VALUE})",
            entry.name, entry.value
        ));
    }
    if tally.merit_points > rules.max_merits {
        return verdict.reject(format!(
            "Merits cannot exceed {} points ({} spent)",
            rules.max_merits, tally.merit_points
        ));
    }
    if tally.flaw_points > rules.max_flaws {
        return verdict.reject(format!(
            "Flaws cannot exceed {} points ({} taken)",
            rules.max_flaws, tally.flaw_points
        ));
    }
    if !tally.balanced {
        return verdict.reject(format!(
            "Merits ({}) must be balanced by flaws ({}): need {} more flaw points",
            tally.merit_points,
            tally.flaw_points,
            tally.flaws_needed()
        ));
    }
    verdict
}
