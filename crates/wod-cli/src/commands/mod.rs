pub mod archetypes;
pub mod freebies;
pub mod new;
pub mod rules;
pub mod validate;

use std::fs;
use std::path::Path;

use wod_core::SavedProgress;
use wod_rules::RuleTable;

/// Read a saved-progress file.
fn load_progress(path: &Path) -> Result<SavedProgress, String> {
    let text =
        fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    SavedProgress::from_json(&text).map_err(|e| format!("{}: {e}", path.display()))
}

/// The rules for a saved build: an override file when given, else the
/// archetype's preset.
fn load_table(archetype: &str, rules: Option<&Path>) -> Result<RuleTable, String> {
    let Some(path) = rules else {
        return RuleTable::for_archetype(archetype).map_err(|e| e.to_string());
    };
    let table = RuleTable::from_path(path).map_err(|e| e.to_string())?;
    if !table.archetype.name().eq_ignore_ascii_case(archetype.trim()) {
        tracing::warn!(
            build = archetype,
            rules = %table.archetype,
            "rule table is for a different archetype than the build"
        );
    }
    Ok(table)
}
