//! Merit and flaw totals.

use serde::{Deserialize, Serialize};
use wod_core::rating::saturating_sum;
use wod_core::{MeritFlawEntry, MeritsFlaws};

/// Highest value of a single merit or flaw.
pub const MAX_ENTRY_VALUE: u32 = 7;

/// Totals derived from a merit list and a flaw list.
///
/// Surplus flaws turn into freebie points only for a character with no
/// merits at all. A character with merits must balance them with flaws and
/// gets nothing for any flaws beyond that.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeritFlawTally {
    /// Sum of merit values.
    pub merit_points: u32,
    /// Sum of flaw values.
    pub flaw_points: u32,
    /// Freebie points granted by flaws.
    pub freebie_bonus: u32,
    /// True unless merits outweigh flaws.
    pub balanced: bool,
}

impl MeritFlawTally {
    /// Tally two lists.
    pub fn from_entries(merits: &[MeritFlawEntry], flaws: &[MeritFlawEntry]) -> Self {
        let merit_points = saturating_sum(merits.iter().map(|m| m.value));
        let flaw_points = saturating_sum(flaws.iter().map(|f| f.value));
        Self::from_points(merit_points, flaw_points)
    }

    /// Tally the lists stored in a build, ignoring its cached totals.
    pub fn from_data(data: &MeritsFlaws) -> Self {
        Self::from_entries(&data.merits, &data.flaws)
    }

    /// Tally pre-summed totals.
    pub fn from_points(merit_points: u32, flaw_points: u32) -> Self {
        let freebie_bonus = if merit_points == 0 { flaw_points } else { 0 };
        Self {
            merit_points,
            flaw_points,
            freebie_bonus,
            balanced: merit_points <= flaw_points,
        }
    }

    /// Flaw points still needed to cover the merits.
    pub fn flaws_needed(&self) -> u32 {
        self.merit_points.saturating_sub(self.flaw_points)
    }

    /// Write the totals back into the build's cached fields.
    pub fn apply(&self, data: &mut MeritsFlaws) {
        data.merit_points = self.merit_points;
        data.flaw_points = self.flaw_points;
        data.freebie_bonus = self.freebie_bonus;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(values: &[u32]) -> Vec<MeritFlawEntry> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| MeritFlawEntry::new(format!("entry {i}"), *v))
            .collect()
    }

    #[test]
    fn merits_outweigh_flaws() {
        let tally = MeritFlawTally::from_entries(&entries(&[3]), &entries(&[1]));
        assert!(!tally.balanced);
        assert_eq!(tally.flaws_needed(), 2);
        assert_eq!(tally.freebie_bonus, 0);
    }

    #[test]
    fn even_trade_grants_nothing() {
        let tally = MeritFlawTally::from_entries(&entries(&[3]), &entries(&[3]));
        assert!(tally.balanced);
        assert_eq!(tally.freebie_bonus, 0);
    }

    #[test]
    fn flaws_only_become_freebies() {
        let tally = MeritFlawTally::from_entries(&[], &entries(&[4]));
        assert!(tally.balanced);
        assert_eq!(tally.freebie_bonus, 4);
    }

    #[test]
    fn surplus_with_merits_is_not_converted() {
        let tally = MeritFlawTally::from_entries(&entries(&[1]), &entries(&[2, 3]));
        assert!(tally.balanced);
        assert_eq!(tally.flaw_points, 5);
        assert_eq!(tally.freebie_bonus, 0);
    }

    #[test]
    fn oversized_entries_saturate() {
        let tally = MeritFlawTally::from_entries(&entries(&[u32::MAX, 1]), &entries(&[2]));
        assert_eq!(tally.merit_points, u32::MAX);
        assert!(!tally.balanced);
        assert_eq!(tally.flaws_needed(), u32::MAX - 2);
    }

    #[test]
    fn apply_refreshes_cache() {
        let mut data = MeritsFlaws {
            flaws: entries(&[2]),
            merit_points: 9,
            ..MeritsFlaws::default()
        };
        MeritFlawTally::from_data(&data).apply(&mut data);
        assert_eq!(
            (data.merit_points, data.flaw_points, data.freebie_bonus),
            (0, 2, 2)
        );
    }
}
