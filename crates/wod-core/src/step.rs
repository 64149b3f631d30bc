use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WodError;

/// One page of the character creation wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepId {
    /// Name, concept, and archetype-specific identity fields.
    Concept,
    /// Priority-funded attribute dots.
    Attributes,
    /// Priority-funded ability dots.
    Abilities,
    /// Backgrounds, spheres, lore, and virtues.
    Advantages,
    /// Optional merits balanced by flaws.
    MeritsFlaws,
    /// The late-stage flexible point pool.
    Freebies,
    /// Terminal summary page.
    Review,
}

impl StepId {
    /// Every step, in wizard order.
    pub const ALL: [StepId; 7] = [
        Self::Concept,
        Self::Attributes,
        Self::Abilities,
        Self::Advantages,
        Self::MeritsFlaws,
        Self::Freebies,
        Self::Review,
    ];

    /// The identifier used in saved progress and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Concept => "concept",
            Self::Attributes => "attributes",
            Self::Abilities => "abilities",
            Self::Advantages => "advantages",
            Self::MeritsFlaws => "merits-flaws",
            Self::Freebies => "freebies",
            Self::Review => "review",
        }
    }

    /// A short human-readable title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Concept => "Concept & Identity",
            Self::Attributes => "Attributes",
            Self::Abilities => "Abilities",
            Self::Advantages => "Advantages",
            Self::MeritsFlaws => "Merits & Flaws",
            Self::Freebies => "Freebie Points",
            Self::Review => "Review",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepId {
    type Err = WodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|step| step.as_str() == s.trim())
            .ok_or_else(|| WodError::UnknownStep(s.to_string()))
    }
}
