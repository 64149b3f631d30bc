//! Point-budget rules for the World of Darkness character creation wizard.
//!
//! A [`RuleTable`] describes one archetype's creation rules: the step order,
//! priority pools, advantage sub-tables, and freebie exchange rates. The
//! [`Validator`] checks a [`wod_core::WizardData`] snapshot against a table
//! and returns a [`Verdict`]. The [`WizardSession`] is the caller side: it
//! mutates a build one click at a time and keeps the freebie ledger honest.

pub mod affinity;
pub mod error;
pub mod ledger;
pub mod merits;
pub mod rules;
pub mod session;
pub mod validate;

pub use affinity::{AffinityCatalog, AffinityKind, AffinityLookup};
pub use error::{RuleError, RuleResult};
pub use ledger::{FreebieLedger, capture_baselines};
pub use merits::MeritFlawTally;
pub use rules::RuleTable;
pub use session::{FreebieTarget, WizardSession};
pub use validate::{FreebieSummary, PointBreakdown, Validator, Verdict};
