//! Step validation.
//!
//! A [`Validator`] checks a [`WizardData`] snapshot against a [`RuleTable`]
//! and never mutates it. Each step's checks live in their own submodule and
//! short-circuit on the first violation found.

mod advantages;
mod concept;
mod freebies;
mod merits_flaws;
mod priorities;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use wod_core::rating::signed_points;
use wod_core::{StepId, TraitGroup, WizardData};

use crate::affinity::AffinityLookup;
use crate::merits::MeritFlawTally;
use crate::rules::RuleTable;

/// Points spent against a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointBreakdown {
    /// Points spent. Negative when traits sit below their starting value.
    pub spent: i32,
    /// `allowed - spent`.
    pub remaining: i32,
    /// Pool size.
    pub allowed: u32,
}

impl PointBreakdown {
    /// Breakdown for `spent` points out of `allowed`.
    pub fn new(spent: i32, allowed: u32) -> Self {
        Self {
            spent,
            remaining: signed_points(allowed).saturating_sub(spent),
            allowed,
        }
    }

    /// Breakdown for an unsigned spend, clamped to the signed range.
    pub fn from_points(spent: u32, allowed: u32) -> Self {
        Self::new(signed_points(spent), allowed)
    }

    /// True if more was spent than allowed.
    pub fn overspent(&self) -> bool {
        i64::from(self.spent) > i64::from(self.allowed)
    }
}

impl fmt::Display for PointBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({} remaining)", self.spent, self.allowed, self.remaining)
    }
}

/// Freebie balance reported by a passing freebies check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreebieSummary {
    /// Points left.
    pub remaining: i32,
    /// The archetype's freebie pool.
    pub total: u32,
}

/// Result of validating a step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// Whether the step passes.
    pub valid: bool,
    /// Why it failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Point breakdown per category or sub-table checked so far.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, PointBreakdown>,
    /// Merit and flaw totals, for the merits and flaws step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merits_flaws: Option<MeritFlawTally>,
    /// Freebie balance, for a passing freebies step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freebies: Option<FreebieSummary>,
    /// Malformed input that was tolerated rather than rejected.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Verdict {
    /// A passing verdict.
    pub fn pass() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    /// A failing verdict.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Turn this verdict into a failure, keeping details and warnings.
    pub fn reject(mut self, message: impl Into<String>) -> Self {
        self.valid = false;
        self.message = Some(message.into());
        self
    }

    /// Record tolerated malformed input.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "tolerated malformed wizard data");
        self.warnings.push(message);
    }

    /// Breakdown for a category, if it was checked.
    pub fn detail(&self, name: &str) -> Option<&PointBreakdown> {
        self.details.get(name)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.valid, &self.message) {
            (true, None) => f.write_str("valid"),
            (true, Some(message)) => write!(f, "valid: {message}"),
            (false, Some(message)) => write!(f, "invalid: {message}"),
            (false, None) => f.write_str("invalid"),
        }
    }
}

/// Checks wizard data against one archetype's rules.
#[derive(Clone, Copy)]
pub struct Validator<'a> {
    table: &'a RuleTable,
    affinities: Option<&'a dyn AffinityLookup>,
}

impl fmt::Debug for Validator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("archetype", &self.table.archetype)
            .field("affinities", &self.affinities.is_some())
            .finish()
    }
}

impl<'a> Validator<'a> {
    /// Create a validator that uses the table's static affinity map.
    pub fn new(table: &'a RuleTable) -> Self {
        Self {
            table,
            affinities: None,
        }
    }

    /// Consult reference data for affinity spheres before the static map.
    pub fn with_affinities(mut self, lookup: &'a dyn AffinityLookup) -> Self {
        self.affinities = Some(lookup);
        self
    }

    /// The rules being checked against.
    pub fn table(&self) -> &'a RuleTable {
        self.table
    }

    /// Validate a single step.
    ///
    /// Steps that are not part of the archetype's wizard are rejected.
    pub fn validate_step(&self, step: StepId, data: &WizardData) -> Verdict {
        if !self.table.has_step(step) {
            return Verdict::fail("Unknown step");
        }
        let verdict = match step {
            StepId::Concept => concept::check(self.table, &data.concept),
            StepId::Attributes => priorities::check(self.table, TraitGroup::Attributes, data),
            StepId::Abilities => priorities::check(self.table, TraitGroup::Abilities, data),
            StepId::Advantages => advantages::check(self.table, self.affinities, data),
            StepId::MeritsFlaws => merits_flaws::check(self.table, &data.merits_flaws),
            StepId::Freebies => freebies::check(self.table, data),
            StepId::Review => Verdict::pass(),
        };
        tracing::debug!(
            archetype = %self.table.archetype,
            step = %step,
            valid = verdict.valid,
            message = verdict.message.as_deref().unwrap_or(""),
            "validated step"
        );
        verdict
    }

    /// Validate a finished build.
    ///
    /// Only concept and freebies are checked: freebies may legitimately top
    /// up the earlier point-spending steps after the fact.
    pub fn validate_all(&self, data: &WizardData) -> Verdict {
        let mut warnings = Vec::new();
        let mut freebies = None;
        for step in [StepId::Concept, StepId::Freebies] {
            if !self.table.has_step(step) {
                continue;
            }
            let verdict = self.validate_step(step, data);
            warnings.extend(verdict.warnings.iter().cloned());
            freebies = freebies.or(verdict.freebies);
            if !verdict.valid {
                let message = verdict.message.as_deref().unwrap_or("invalid");
                let mut failed = Verdict::fail(format!("Step {step}: {message}"));
                failed.warnings = warnings;
                return failed;
            }
        }
        Verdict {
            freebies,
            warnings,
            ..Verdict::pass()
        }
    }
}
