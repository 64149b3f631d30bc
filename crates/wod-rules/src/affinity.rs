//! Affinity-sphere lookup.
//!
//! Mages and Technocrats must put at least one sphere dot into an affinity
//! sphere of their Tradition or Convention. The validator asks an optional
//! [`AffinityLookup`] collaborator first and falls back to the static map in
//! the rule table when the collaborator is absent or knows nothing.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RuleError, RuleResult};
use crate::rules::preset::SPHERE_KEYS;

/// What kind of group a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AffinityKind {
    /// A Council of Nine Tradition.
    Tradition,
    /// A Technocratic Convention.
    Convention,
    /// A Disparate craft.
    DisparateCraft,
}

impl AffinityKind {
    /// Category key in the reference data file.
    pub fn category(self) -> &'static str {
        match self {
            Self::Tradition => "traditions",
            Self::Convention => "conventions",
            Self::DisparateCraft => "disparateCrafts",
        }
    }
}

/// A source of affinity spheres, typically reference data loaded at startup.
pub trait AffinityLookup {
    /// Sphere keys for the named group. Empty if unknown.
    fn affinity_spheres(&self, name: &str, kind: AffinityKind) -> Vec<String>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AffinityEntry {
    #[serde(default)]
    affinity_spheres: Vec<String>,
}

/// Affinity reference data in the `affinities.json` shape.
///
/// ```json
/// { "traditions": { "Verbena": { "affinitySpheres": ["life", "forces"] } },
///   "conventions": {}, "disparateCrafts": { "Hollow Ones": { "affinitySpheres": ["any"] } } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffinityCatalog {
    #[serde(default)]
    traditions: BTreeMap<String, AffinityEntry>,
    #[serde(default)]
    conventions: BTreeMap<String, AffinityEntry>,
    #[serde(default)]
    disparate_crafts: BTreeMap<String, AffinityEntry>,
}

impl AffinityCatalog {
    /// Parse reference data from JSON.
    pub fn from_json(json: &str) -> RuleResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load reference data from a JSON file.
    pub fn from_path(path: &Path) -> RuleResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Register a group's affinity spheres.
    pub fn insert(&mut self, kind: AffinityKind, name: impl Into<String>, spheres: &[&str]) {
        let entry = AffinityEntry {
            affinity_spheres: spheres.iter().map(|s| s.to_string()).collect(),
        };
        self.entries_mut(kind).insert(name.into(), entry);
    }

    /// Number of groups across all kinds.
    pub fn len(&self) -> usize {
        self.traditions.len() + self.conventions.len() + self.disparate_crafts.len()
    }

    /// True if the catalog holds no groups.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self, kind: AffinityKind) -> &BTreeMap<String, AffinityEntry> {
        match kind {
            AffinityKind::Tradition => &self.traditions,
            AffinityKind::Convention => &self.conventions,
            AffinityKind::DisparateCraft => &self.disparate_crafts,
        }
    }

    fn entries_mut(&mut self, kind: AffinityKind) -> &mut BTreeMap<String, AffinityEntry> {
        match kind {
            AffinityKind::Tradition => &mut self.traditions,
            AffinityKind::Convention => &mut self.conventions,
            AffinityKind::DisparateCraft => &mut self.disparate_crafts,
        }
    }
}

impl AffinityLookup for AffinityCatalog {
    fn affinity_spheres(&self, name: &str, kind: AffinityKind) -> Vec<String> {
        let Some(entry) = self.entries(kind).get(name) else {
            return Vec::new();
        };
        if entry.affinity_spheres.iter().any(|s| s == "any") {
            return SPHERE_KEYS.iter().map(|s| s.to_string()).collect();
        }
        entry.affinity_spheres.clone()
    }
}
