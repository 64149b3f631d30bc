use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use wod_core::StepId;
use wod_rules::{AffinityCatalog, Validator, Verdict};

pub fn run(
    file: &Path,
    step: Option<&str>,
    affinities: Option<&Path>,
    rules: Option<&Path>,
    json: bool,
) -> Result<(), String> {
    let progress = super::load_progress(file)?;
    let table = super::load_table(&progress.archetype, rules)?;
    let catalog = affinities
        .map(AffinityCatalog::from_path)
        .transpose()
        .map_err(|e| e.to_string())?;

    let mut validator = Validator::new(&table);
    if let Some(catalog) = &catalog {
        validator = validator.with_affinities(catalog);
    }

    let verdict = match step {
        Some(step) => {
            let step: StepId = step.parse().map_err(|e: wod_core::WodError| e.to_string())?;
            validator.validate_step(step, &progress.wizard_data)
        }
        None => validator.validate_all(&progress.wizard_data),
    };
    tracing::info!(file = %file.display(), valid = verdict.valid, "validated build");

    if json {
        let text = serde_json::to_string_pretty(&verdict).map_err(|e| e.to_string())?;
        println!("{text}");
    } else {
        print_verdict(&verdict);
    }

    if verdict.valid {
        Ok(())
    } else {
        Err(format!("{} is not valid", file.display()))
    }
}

fn print_verdict(verdict: &Verdict) {
    let status = if verdict.valid {
        "VALID".green().bold()
    } else {
        "INVALID".red().bold()
    };
    match &verdict.message {
        Some(message) => println!("  {status}  {message}"),
        None => println!("  {status}"),
    }

    if !verdict.details.is_empty() {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Pool", "Spent", "Allowed", "Remaining"]);
        for (name, breakdown) in &verdict.details {
            table.add_row(vec![
                name.clone(),
                breakdown.spent.to_string(),
                breakdown.allowed.to_string(),
                breakdown.remaining.to_string(),
            ]);
        }
        println!("{table}");
    }

    if let Some(tally) = &verdict.merits_flaws {
        println!(
            "  Merits {} / Flaws {} (freebie bonus {})",
            tally.merit_points, tally.flaw_points, tally.freebie_bonus
        );
    }
    if let Some(freebies) = &verdict.freebies {
        println!(
            "  Freebies: {} of {} remaining",
            freebies.remaining, freebies.total
        );
    }
    for warning in &verdict.warnings {
        println!("  {}  {warning}", "WARN".yellow().bold());
    }
}
