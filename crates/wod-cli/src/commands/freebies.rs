use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use wod_core::SpendKind;
use wod_rules::{FreebieLedger, RuleError};

pub fn run(file: &Path, rules: Option<&Path>) -> Result<(), String> {
    let progress = super::load_progress(file)?;
    let table = super::load_table(&progress.archetype, rules)?;
    let data = &progress.wizard_data;

    let ledger = FreebieLedger::recalculate(&table, data)
        .ok_or_else(|| format!("{}: {}", file.display(), RuleError::FreebiesNotStarted))?;

    let mut out = Table::new();
    out.set_content_arrangement(ContentArrangement::Dynamic);
    out.set_header(vec!["Spent on", "Cost", "Points"]);
    for kind in SpendKind::ALL {
        let Some(cost) = table.freebie_cost(kind) else {
            continue;
        };
        out.add_row(vec![
            kind.to_string(),
            cost.to_string(),
            ledger.spent_on(kind).to_string(),
        ]);
    }

    println!("{out}");
    println!();
    if ledger.bonus > 0 {
        println!("  {} bonus points from flaws", ledger.bonus);
    }
    let summary = ledger.to_string();
    if ledger.remaining() < 0 {
        println!("  {}", summary.red().bold());
    } else {
        println!("  {summary}");
    }

    let stored = data.freebies.remaining;
    if stored != ledger.remaining() {
        println!(
            "  {}  stored balance {stored} is stale",
            "NOTE".yellow().bold()
        );
    }
    Ok(())
}
