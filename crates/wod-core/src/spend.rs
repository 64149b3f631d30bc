use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WodError;

/// What a freebie point can be exchanged for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendKind {
    /// One attribute dot.
    Attribute,
    /// One ability dot.
    Ability,
    /// One background dot (doubled for double-cost backgrounds).
    Background,
    /// One sphere dot.
    Sphere,
    /// One point of Enlightenment (Arete).
    Enlightenment,
    /// One point of permanent Willpower.
    Willpower,
    /// One dot in a Lore path.
    Lore,
    /// One point of Faith.
    Faith,
    /// One virtue dot.
    Virtue,
}

impl SpendKind {
    /// Every spend kind.
    pub const ALL: [SpendKind; 9] = [
        Self::Attribute,
        Self::Ability,
        Self::Background,
        Self::Sphere,
        Self::Enlightenment,
        Self::Willpower,
        Self::Lore,
        Self::Faith,
        Self::Virtue,
    ];

    /// Lowercase identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attribute => "attribute",
            Self::Ability => "ability",
            Self::Background => "background",
            Self::Sphere => "sphere",
            Self::Enlightenment => "enlightenment",
            Self::Willpower => "willpower",
            Self::Lore => "lore",
            Self::Faith => "faith",
            Self::Virtue => "virtue",
        }
    }
}

impl fmt::Display for SpendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpendKind {
    type Err = WodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| WodError::UnknownSpendKind(s.to_string()))
    }
}
