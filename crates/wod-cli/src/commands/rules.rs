use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use wod_core::{SpendKind, TraitGroup};
use wod_rules::RuleTable;
use wod_rules::rules::FieldKind;

pub fn run(archetype: &str, json: bool) -> Result<(), String> {
    let rules = RuleTable::for_archetype(archetype).map_err(|e| e.to_string())?;

    if json {
        println!("{}", rules.to_json_pretty().map_err(|e| e.to_string())?);
        return Ok(());
    }

    let steps: Vec<String> = rules.steps.iter().map(ToString::to_string).collect();
    println!();
    println!("  {}", rules.archetype.to_string().bold());
    println!("  {}", steps.join(" > ").dimmed());
    println!();

    print_concept(&rules);
    print_trait_groups(&rules);
    print_advantages(&rules);
    print_freebies(&rules);
    Ok(())
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

fn print_concept(rules: &RuleTable) {
    let mut table = new_table(vec!["Field", "Label", "Kind", "Required"]);
    for field in &rules.concept.fields {
        let kind = match field.kind {
            FieldKind::Text => "text",
            FieldKind::Select => "select",
        };
        let required = if field.required { "yes" } else { "" };
        table.add_row(vec![field.name.as_str(), field.label.as_str(), kind, required]);
    }
    println!("  {}", "Concept".bold().underline());
    println!("{table}");
    if let Some(affinity) = &rules.concept.affinity {
        println!(
            "  Affinity spheres keyed by {} ({} entries)",
            affinity.field,
            affinity.spheres.len()
        );
    }
    println!();
}

fn print_trait_groups(rules: &RuleTable) {
    let mut table = new_table(vec!["Group", "Priorities", "Categories", "Start", "Max"]);
    for group in [TraitGroup::Attributes, TraitGroup::Abilities] {
        let group_rules = rules.group(group);
        let pools = group_rules.priorities;
        let categories: Vec<&str> = group_rules.category_names().collect();
        table.add_row(vec![
            group.to_string(),
            format!("{}/{}/{}", pools.primary, pools.secondary, pools.tertiary),
            categories.join(", "),
            group_rules.starting.to_string(),
            group_rules.max_at_creation.to_string(),
        ]);
    }
    println!("  {}", "Priorities".bold().underline());
    println!("{table}");
    println!();
}

fn print_advantages(rules: &RuleTable) {
    let advantages = &rules.advantages;
    let mut table = new_table(vec!["Advantage", "Points", "Notes"]);

    if let Some(backgrounds) = &advantages.backgrounds {
        let mut notes = format!("max {} each", backgrounds.max_per_background);
        if !backgrounds.double_cost.is_empty() {
            notes.push_str(&format!(
                "; double cost: {}",
                backgrounds.double_cost.join(", ")
            ));
        }
        table.add_row(vec![
            "Backgrounds".to_string(),
            backgrounds.points.to_string(),
            notes,
        ]);
    }
    if let Some(spheres) = &advantages.spheres {
        let names: Vec<&str> = spheres.available.values().map(String::as_str).collect();
        table.add_row(vec![
            "Spheres".to_string(),
            spheres.points.to_string(),
            names.join(", "),
        ]);
    }
    if let Some(enlightenment) = advantages.enlightenment {
        table.add_row(vec![
            "Enlightenment".to_string(),
            String::new(),
            format!("starts at {}", enlightenment.starting),
        ]);
    }
    if let Some(lore) = advantages.lore {
        table.add_row(vec![
            "Lore".to_string(),
            lore.points.to_string(),
            format!("max {} per path", lore.max_at_creation),
        ]);
    }
    if let Some(virtues) = &advantages.virtues {
        table.add_row(vec![
            "Virtues".to_string(),
            virtues.points.to_string(),
            format!(
                "{} from {}, max {}",
                virtues.available.join(", "),
                virtues.starting,
                virtues.max
            ),
        ]);
    }
    if let Some(faith) = advantages.faith {
        table.add_row(vec![
            "Faith".to_string(),
            String::new(),
            format!("starts at {}", faith.starting),
        ]);
    }
    table.add_row(vec![
        "Willpower".to_string(),
        String::new(),
        format!("starts at {}", advantages.willpower.starting),
    ]);

    println!("  {}", "Advantages".bold().underline());
    println!("{table}");
    if let Some(limits) = rules.merits_flaws {
        println!(
            "  Merits up to {}, flaws up to {}",
            limits.max_merits, limits.max_flaws
        );
    }
    println!();
}

fn print_freebies(rules: &RuleTable) {
    let mut table = new_table(vec!["Spend on", "Cost", "Limit"]);
    for kind in SpendKind::ALL {
        let Some(cost) = rules.freebie_cost(kind) else {
            continue;
        };
        let limit = rules
            .freebie_limit(kind)
            .map_or_else(|| "-".to_string(), |l| l.to_string());
        table.add_row(vec![kind.to_string(), cost.to_string(), limit]);
    }
    println!(
        "  {} ({} points)",
        "Freebies".bold().underline(),
        rules.freebies.total
    );
    println!("{table}");
}
