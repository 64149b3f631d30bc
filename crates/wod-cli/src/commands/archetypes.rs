use comfy_table::{ContentArrangement, Table};
use wod_core::Archetype;
use wod_rules::RuleTable;

pub fn run() -> Result<(), String> {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Archetype", "Steps", "Freebies"]);

    for archetype in Archetype::ALL {
        let rules = RuleTable::preset(archetype);
        let steps: Vec<String> = rules.steps.iter().map(ToString::to_string).collect();
        table.add_row(vec![
            archetype.to_string(),
            steps.join(", "),
            rules.freebies.total.to_string(),
        ]);
    }

    println!("{table}");
    Ok(())
}
