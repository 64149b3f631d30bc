use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WodError;

/// A character type with its own creation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Archetype {
    /// An ordinary human with no supernatural powers.
    Mortal,
    /// A Traditions mage working magick through the Spheres.
    Mage,
    /// A Technocracy agent working Enlightened Science through the Spheres.
    Technocrat,
    /// One of the Fallen, with Lore paths and Faith.
    Demon,
}

impl Archetype {
    /// Every archetype that has a creation wizard, in menu order.
    pub const ALL: [Archetype; 4] = [Self::Mortal, Self::Mage, Self::Technocrat, Self::Demon];

    /// The canonical display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Mortal => "Mortal",
            Self::Mage => "Mage",
            Self::Technocrat => "Technocrat",
            Self::Demon => "Demon",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Archetype {
    type Err = WodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| WodError::UnknownArchetype(s.to_string()))
    }
}
