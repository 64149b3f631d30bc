use std::fs;
use std::path::Path;

use wod_core::SavedProgress;
use wod_rules::{RuleTable, WizardSession};

pub fn run(archetype: &str, output: Option<&Path>) -> Result<(), String> {
    let rules = RuleTable::for_archetype(archetype).map_err(|e| e.to_string())?;
    let session = WizardSession::blank(&rules);

    let mut progress = SavedProgress::new(rules.archetype.name(), session.into_data());
    progress.current_step = rules.steps.first().copied();
    let json = progress.to_json_pretty().map_err(|e| e.to_string())?;

    match output {
        Some(path) => {
            if path.exists() {
                return Err(format!("{} already exists", path.display()));
            }
            fs::write(path, format!("{json}\n"))
                .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
            println!("  Created blank {} build at {}", rules.archetype, path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
