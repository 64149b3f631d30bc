use serde::{Deserialize, Serialize};

use crate::error::WodResult;
use crate::step::StepId;
use crate::wizard::WizardData;

/// Wizard progress as a caller persists it between sessions.
///
/// The archetype stays plain text: resolving it to rules is the rule table's
/// job, and an unsupported archetype must surface there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProgress {
    /// Archetype name, e.g. "Technocrat".
    pub archetype: String,
    /// The step the player was on, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<StepId>,
    /// The build itself.
    #[serde(default)]
    pub wizard_data: WizardData,
}

impl SavedProgress {
    /// Create progress for an archetype.
    pub fn new(archetype: impl Into<String>, wizard_data: WizardData) -> Self {
        Self {
            archetype: archetype.into(),
            current_step: None,
            wizard_data,
        }
    }

    /// Decode progress from JSON text.
    pub fn from_json(json: &str) -> WodResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode progress as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> WodResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
