//! Core types for the World of Darkness character creation wizard.
//!
//! This crate defines the data a wizard session works on: which archetype is
//! being built, which step it is on, and the in-progress [`WizardData`]. It
//! carries no rules; the point budgets and validation live in `wod-rules`.

/// Character archetypes that have a creation wizard.
pub mod archetype;
/// Priority tiers and the trait groups they fund.
pub mod category;
/// Error types used throughout the crate.
pub mod error;
/// Saved wizard progress as persisted by a caller.
pub mod progress;
/// Raw trait ratings with defensive numeric coercion.
pub mod rating;
/// Freebie spend categories.
pub mod spend;
/// Wizard step identifiers.
pub mod step;
/// The in-progress character build.
pub mod wizard;

/// Re-export archetype types.
pub use archetype::Archetype;
/// Re-export priority and trait group types.
pub use category::{PriorityTier, TraitGroup};
/// Re-export error types.
pub use error::{WodError, WodResult};
/// Re-export saved progress.
pub use progress::SavedProgress;
/// Re-export rating type.
pub use rating::Rating;
/// Re-export spend kinds.
pub use spend::SpendKind;
/// Re-export step identifiers.
pub use step::StepId;
/// Re-export wizard data types.
pub use wizard::{
    Advantages, Background, Baselines, ConceptData, FreebieState, MeritFlawEntry, MeritsFlaws,
    PrioritySelection, TraitAllocation, TraitValues, WizardData,
};
