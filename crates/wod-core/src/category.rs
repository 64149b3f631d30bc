use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WodError;

/// A priority label granting a fixed point pool to one trait category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityTier {
    /// The largest pool.
    Primary,
    /// The middle pool.
    Secondary,
    /// The smallest pool.
    Tertiary,
}

impl PriorityTier {
    /// All tiers, largest pool first.
    pub const ALL: [PriorityTier; 3] = [Self::Primary, Self::Secondary, Self::Tertiary];

    /// Lowercase identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Tertiary => "tertiary",
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriorityTier {
    type Err = WodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| WodError::UnknownTier(s.to_string()))
    }
}

/// A trait group whose categories are funded by priority tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraitGroup {
    /// Physical, social, and mental attributes.
    Attributes,
    /// Talents, skills, and knowledges.
    Abilities,
}

impl TraitGroup {
    /// Singular noun used in messages ("attribute", "ability").
    pub fn noun(self) -> &'static str {
        match self {
            Self::Attributes => "attribute",
            Self::Abilities => "ability",
        }
    }

    /// How a category's point pool is named in messages.
    ///
    /// Attribute categories are adjectives ("physical attribute points"),
    /// ability categories are already nouns ("talents points").
    pub fn pool_label(self, category: &str) -> String {
        match self {
            Self::Attributes => format!("{category} attribute"),
            Self::Abilities => category.to_string(),
        }
    }
}

impl fmt::Display for TraitGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attributes => f.write_str("attributes"),
            Self::Abilities => f.write_str("abilities"),
        }
    }
}
