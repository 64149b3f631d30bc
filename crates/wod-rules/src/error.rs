//! Error types for the rules engine.
//!
//! Validation rejections are not errors: they come back as a
//! [`Verdict`](crate::Verdict). These errors cover configuration lookups and
//! wizard operations the caller must not perform.

use std::path::PathBuf;

use wod_core::WodError;

/// Errors that can occur while loading rules or editing a build.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// There is no wizard configuration for this archetype.
    #[error("no wizard configuration for archetype \"{0}\"")]
    UnsupportedArchetype(String),

    /// A rule table or reference file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A rule table or reference file is not valid JSON for its shape.
    #[error("invalid rules data: {0}")]
    InvalidData(#[from] serde_json::Error),

    /// The archetype's rules have no such feature (e.g. spheres for a Mortal).
    #[error("{0} are not part of this archetype's rules")]
    NotApplicable(&'static str),

    /// A trait category is not configured for this trait group.
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// The named trait does not exist in the build.
    #[error("unknown trait: {0}")]
    UnknownTrait(String),

    /// All points of a pool are already spent.
    #[error("cannot add more {pool} points (maximum {max})")]
    PoolExhausted {
        /// Pool name.
        pool: String,
        /// Pool size.
        max: u32,
    },

    /// The value is already at its maximum.
    #[error("{name} is already at its maximum ({max})")]
    AtMaximum {
        /// Trait name.
        name: String,
        /// Maximum value.
        max: u32,
    },

    /// The value is already at its minimum.
    #[error("{name} cannot go below {min}")]
    AtMinimum {
        /// Trait name.
        name: String,
        /// Minimum value.
        min: u32,
    },

    /// Raising a sphere would put it above Enlightenment.
    #[error("{sphere} cannot exceed Enlightenment ({enlightenment})")]
    SphereExceedsEnlightenment {
        /// Sphere display name.
        sphere: String,
        /// Current Enlightenment.
        enlightenment: u32,
    },

    /// Lowering Enlightenment would leave spheres above it.
    #[error("cannot reduce Enlightenment to {enlightenment}: {spheres} would exceed it")]
    EnlightenmentBelowSpheres {
        /// The Enlightenment value that was requested.
        enlightenment: u32,
        /// The spheres that are too high, with their ratings.
        spheres: String,
    },

    /// Not enough freebie points for the purchase.
    #[error("not enough freebie points (cost {cost}, {available} available)")]
    NotEnoughFreebies {
        /// Cost of one step.
        cost: u32,
        /// Points available.
        available: i32,
    },

    /// Freebie spending requires the baseline snapshot.
    #[error("the freebies step has not been entered yet")]
    FreebiesNotStarted,

    /// A freebie-funded value cannot drop below its baseline.
    #[error("{0} cannot be decreased below its value before freebies")]
    BelowBaseline(String),

    /// A merit or flaw value is outside 0..=7.
    #[error("{name} has an invalid value {value} (must be 0-7)")]
    InvalidMeritFlawValue {
        /// Merit or flaw name.
        name: String,
        /// The rejected value.
        value: u32,
    },

    /// Wraps a core parsing error.
    #[error(transparent)]
    Core(#[from] WodError),
}

/// Convenience result type for rules operations.
pub type RuleResult<T> = Result<T, RuleError>;
