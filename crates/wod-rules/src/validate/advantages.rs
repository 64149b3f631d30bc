//! Advantages: backgrounds, spheres, lore paths, and virtues.
//!
//! Each configured sub-table is checked in turn. Its breakdown is recorded
//! before its checks run, so a failure carries every breakdown computed so far.

use wod_core::WizardData;
use wod_core::rating::{saturating_sum, signed_points};

use super::{PointBreakdown, Verdict};
use crate::affinity::AffinityLookup;
use crate::rules::RuleTable;

type Checked = Result<(), String>;

pub(super) fn check(
    table: &RuleTable,
    affinities: Option<&dyn AffinityLookup>,
    data: &WizardData,
) -> Verdict {
    let mut verdict = Verdict::pass();
    let outcome = backgrounds(table, data, &mut verdict)
        .and_then(|()| spheres(table, affinities, data, &mut verdict))
        .and_then(|()| lore(table, data, &mut verdict))
        .and_then(|()| virtues(table, data, &mut verdict));
    match outcome {
        Ok(()) => verdict,
        Err(message) => verdict.reject(message),
    }
}

fn record(verdict: &mut Verdict, name: &str, spent: u32, allowed: u32) -> PointBreakdown {
    let breakdown = PointBreakdown::from_points(spent, allowed);
    verdict.details.insert(name.to_string(), breakdown);
    breakdown
}

fn backgrounds(table: &RuleTable, data: &WizardData, verdict: &mut Verdict) -> Checked {
    let Some(rules) = &table.advantages.backgrounds else {
        return Ok(());
    };
    let entries = &data.advantages.backgrounds;
    let spent = saturating_sum(
        entries
            .iter()
            .map(|bg| bg.value.saturating_mul(rules.unit_cost(&bg.name))),
    );
    let detail = record(verdict, "backgrounds", spent, rules.points);

    if let Some(bg) = entries.iter().find(|bg| bg.value > rules.max_per_background) {
        return Err(format!(
            "{} exceeds maximum ({}/{})",
            bg.name, bg.value, rules.max_per_background
        ));
    }
    if detail.overspent() {
        return Err(format!(
            "Too many background points spent ({spent}/{})",
            rules.points
        ));
    }
    if detail.remaining > 0 {
        return Err(format!(
            "Please spend all background points ({} remaining)",
            detail.remaining
        ));
    }
    Ok(())
}

fn spheres(
    table: &RuleTable,
    affinities: Option<&dyn AffinityLookup>,
    data: &WizardData,
    verdict: &mut Verdict,
) -> Checked {
    let Some(rules) = &table.advantages.spheres else {
        return Ok(());
    };
    let values = &data.advantages.spheres;
    let spent = data.advantages.sphere_total();
    let enlightenment = data
        .advantages
        .enlightenment
        .filter(|e| *e > 0)
        .unwrap_or_else(|| table.enlightenment_starting());
    let detail = record(verdict, "spheres", spent, rules.points);

    if let Some((key, value)) = values.iter().find(|(_, v)| **v > enlightenment) {
        return Err(format!(
            "{} ({value}) cannot exceed your Enlightenment ({enlightenment})",
            table.sphere_name(key)
        ));
    }
    if detail.overspent() {
        return Err(format!(
            "Too many sphere points spent ({spent}/{})",
            rules.points
        ));
    }

    let affinity = affinity_spheres(table, affinities, data);
    if !affinity.is_empty() && spent > 0 {
        let in_affinity = saturating_sum(
            affinity
                .iter()
                .map(|key| values.get(key).copied().unwrap_or(0)),
        );
        if in_affinity == 0 {
            let names: Vec<&str> = affinity.iter().map(|k| table.sphere_name(k)).collect();
            return Err(format!(
                "Must have at least 1 point in an affinity sphere ({})",
                names.join(", ")
            ));
        }
    }

    if detail.remaining > 0 {
        return Err(format!(
            "Please spend all sphere points ({} remaining)",
            detail.remaining
        ));
    }
    Ok(())
}

/// Affinity spheres for the build's Tradition or Convention.
///
/// Reference data wins when it has an answer; otherwise the table's map.
fn affinity_spheres(
    table: &RuleTable,
    affinities: Option<&dyn AffinityLookup>,
    data: &WizardData,
) -> Vec<String> {
    let Some(rules) = &table.concept.affinity else {
        return Vec::new();
    };
    let Some(group) = data.concept.text(&rules.field) else {
        return Vec::new();
    };
    if let Some(lookup) = affinities {
        let found = lookup.affinity_spheres(group, rules.kind);
        if !found.is_empty() {
            return found;
        }
        tracing::debug!(group, "no reference affinity data, using built-in map");
    }
    rules.spheres.get(group).cloned().unwrap_or_default()
}

fn lore(table: &RuleTable, data: &WizardData, verdict: &mut Verdict) -> Checked {
    let Some(rules) = table.advantages.lore else {
        return Ok(());
    };
    let values = &data.advantages.lore;
    let spent = saturating_sum(values.values().copied());
    let detail = record(verdict, "lore", spent, rules.points);

    if let Some((path, value)) = values.iter().find(|(_, v)| **v > rules.max_at_creation) {
        return Err(format!(
            "{path} exceeds maximum ({value}/{})",
            rules.max_at_creation
        ));
    }
    if detail.overspent() {
        return Err(format!("Too many lore points spent ({spent}/{})", rules.points));
    }
    if detail.remaining > 0 {
        return Err(format!(
            "Please spend all lore points ({} remaining)",
            detail.remaining
        ));
    }
    Ok(())
}

fn virtues(table: &RuleTable, data: &WizardData, verdict: &mut Verdict) -> Checked {
    let Some(rules) = &table.advantages.virtues else {
        return Ok(());
    };
    let value_of = |name: &str| {
        data.advantages
            .virtues
            .get(name)
            .copied()
            .unwrap_or(rules.starting)
    };
    let starting = signed_points(rules.starting);
    let spent = rules
        .available
        .iter()
        .map(|name| signed_points(value_of(name)).saturating_sub(starting))
        .fold(0, i32::saturating_add);
    let detail = PointBreakdown::new(spent, rules.points);
    verdict.details.insert("virtues".to_string(), detail);

    if let Some(name) = rules.available.iter().find(|name| value_of(name) > rules.max) {
        return Err(format!(
            "{name} exceeds maximum ({}/{})",
            value_of(name),
            rules.max
        ));
    }
    if detail.overspent() {
        return Err(format!(
            "Too many virtue points spent ({spent}/{})",
            rules.points
        ));
    }
    if detail.remaining > 0 {
        return Err(format!(
            "Please spend all virtue points ({} remaining)",
            detail.remaining
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affinity::{AffinityCatalog, AffinityKind};
    use wod_core::{Archetype, Background};

    fn technocrat_data() -> WizardData {
        let mut data = WizardData::default();
        data.concept.set("convention", "Progenitors");
        data.advantages.backgrounds = vec![
            Background::new("Resources", 3),
            Background::new("Enhancement", 2),
        ];
        data.advantages.enlightenment = Some(1);
        for sphere in ["life", "prime", "forces", "mind", "matter", "time"] {
            data.advantages.spheres.insert(sphere.to_string(), 1);
        }
        data
    }

    #[test]
    fn balanced_technocrat_passes() {
        let table = RuleTable::preset(Archetype::Technocrat);
        let verdict = check(&table, None, &technocrat_data());
        assert!(verdict.valid, "{verdict}");
        assert_eq!(verdict.details["backgrounds"], PointBreakdown::new(7, 7));
        assert_eq!(verdict.details["spheres"], PointBreakdown::new(6, 6));
    }

    #[test]
    fn double_cost_backgrounds_overspend() {
        let table = RuleTable::preset(Archetype::Technocrat);
        let mut data = technocrat_data();
        data.advantages.backgrounds[1].value = 3;
        let verdict = check(&table, None, &data);
        assert_eq!(
            verdict.message.as_deref(),
            Some("Too many background points spent (9/7)")
        );
        assert!(!verdict.details.contains_key("spheres"));
    }

    #[test]
    fn background_over_max() {
        let table = RuleTable::preset(Archetype::Mage);
        let mut data = WizardData::default();
        data.advantages.backgrounds = vec![Background::new("Avatar", 6)];
        let verdict = check(&table, None, &data);
        assert_eq!(verdict.message.as_deref(), Some("Avatar exceeds maximum (6/5)"));
    }

    #[test]
    fn sphere_above_enlightenment() {
        let table = RuleTable::preset(Archetype::Technocrat);
        let mut data = technocrat_data();
        data.advantages.spheres.insert("prime".into(), 2);
        let verdict = check(&table, None, &data);
        assert_eq!(
            verdict.message.as_deref(),
            Some("Primal Utility (2) cannot exceed your Enlightenment (1)")
        );
        // Earlier sub-table breakdowns survive the failure.
        assert!(verdict.details.contains_key("backgrounds"));
        assert!(verdict.details.contains_key("spheres"));
    }

    #[test]
    fn sphere_pool_overspent() {
        let table = RuleTable::preset(Archetype::Technocrat);
        let mut data = technocrat_data();
        data.advantages.enlightenment = Some(2);
        data.advantages.spheres.insert("life".into(), 2);
        let verdict = check(&table, None, &data);
        assert_eq!(
            verdict.message.as_deref(),
            Some("Too many sphere points spent (7/6)")
        );
        assert_eq!(verdict.details["backgrounds"], PointBreakdown::new(7, 7));
        assert_eq!(verdict.details["spheres"], PointBreakdown::new(7, 6));
    }

    #[test]
    fn zero_enlightenment_reads_as_starting() {
        let table = RuleTable::preset(Archetype::Technocrat);
        let mut data = technocrat_data();
        data.advantages.enlightenment = Some(0);
        let verdict = check(&table, None, &data);
        assert!(verdict.valid, "{verdict}");
    }

    #[test]
    fn oversized_background_is_rejected() {
        let table = RuleTable::preset(Archetype::Technocrat);
        let mut data = technocrat_data();
        data.advantages.backgrounds = vec![Background::new("Device", 2_147_483_648)];
        let verdict = check(&table, None, &data);
        assert_eq!(
            verdict.message.as_deref(),
            Some("Device exceeds maximum (2147483648/5)")
        );
        assert_eq!(verdict.details["backgrounds"].spent, i32::MAX);
    }

    #[test]
    fn oversized_spheres_are_rejected() {
        let table = RuleTable::preset(Archetype::Technocrat);
        let mut data = technocrat_data();
        data.advantages.spheres.insert("life".into(), u32::MAX);
        data.advantages.spheres.insert("prime".into(), u32::MAX);
        let verdict = check(&table, None, &data);
        assert_eq!(
            verdict.message.as_deref(),
            Some("Life (4294967295) cannot exceed your Enlightenment (1)")
        );
        assert!(verdict.details["spheres"].overspent());
    }

    #[test]
    fn missing_affinity_sphere() {
        let table = RuleTable::preset(Archetype::Technocrat);
        let mut data = technocrat_data();
        data.advantages.spheres.clear();
        data.advantages.spheres.insert("forces".into(), 1);
        let verdict = check(&table, None, &data);
        assert_eq!(
            verdict.message.as_deref(),
            Some("Must have at least 1 point in an affinity sphere (Life, Primal Utility)")
        );
    }

    #[test]
    fn no_spheres_skips_affinity_check() {
        let table = RuleTable::preset(Archetype::Technocrat);
        let mut data = technocrat_data();
        data.advantages.spheres.clear();
        let verdict = check(&table, None, &data);
        assert_eq!(
            verdict.message.as_deref(),
            Some("Please spend all sphere points (6 remaining)")
        );
    }

    #[test]
    fn reference_data_overrides_static_map() {
        let table = RuleTable::preset(Archetype::Technocrat);
        let mut catalog = AffinityCatalog::default();
        catalog.insert(AffinityKind::Convention, "Progenitors", &["entropy"]);
        let data = technocrat_data();
        let verdict = check(&table, Some(&catalog), &data);
        assert_eq!(
            verdict.message.as_deref(),
            Some("Must have at least 1 point in an affinity sphere (Entropy)")
        );
    }

    #[test]
    fn empty_reference_data_falls_back() {
        let table = RuleTable::preset(Archetype::Technocrat);
        let catalog = AffinityCatalog::default();
        let verdict = check(&table, Some(&catalog), &technocrat_data());
        assert!(verdict.valid, "{verdict}");
    }

    #[test]
    fn unknown_convention_has_no_affinity() {
        let table = RuleTable::preset(Archetype::Technocrat);
        let mut data = technocrat_data();
        data.concept.set("convention", "Ivory Tower");
        data.advantages.spheres.clear();
        for sphere in ["correspondence", "entropy", "spirit", "mind", "matter", "time"] {
            data.advantages.spheres.insert(sphere.to_string(), 1);
        }
        assert!(check(&table, None, &data).valid);
    }

    fn demon_data() -> WizardData {
        let mut data = WizardData::default();
        data.advantages.backgrounds = vec![Background::new("Pacts", 5)];
        data.advantages.lore.insert("flame".into(), 2);
        data.advantages.lore.insert("humanity".into(), 1);
        data.advantages.virtues.insert("Conscience".into(), 2);
        data.advantages.virtues.insert("Courage".into(), 3);
        data
    }

    #[test]
    fn demon_passes() {
        let table = RuleTable::preset(Archetype::Demon);
        let verdict = check(&table, None, &demon_data());
        assert!(verdict.valid, "{verdict}");
        assert_eq!(verdict.details["lore"], PointBreakdown::new(3, 3));
        assert_eq!(verdict.details["virtues"], PointBreakdown::new(3, 3));
    }

    #[test]
    fn demon_lore_over_creation_max() {
        let table = RuleTable::preset(Archetype::Demon);
        let mut data = demon_data();
        data.advantages.lore.clear();
        data.advantages.lore.insert("flame".into(), 4);
        let verdict = check(&table, None, &data);
        assert_eq!(verdict.message.as_deref(), Some("flame exceeds maximum (4/3)"));
    }

    #[test]
    fn demon_lore_pool_overspent() {
        let table = RuleTable::preset(Archetype::Demon);
        let mut data = demon_data();
        data.advantages.lore.insert("radiance".into(), 1);
        let verdict = check(&table, None, &data);
        assert_eq!(
            verdict.message.as_deref(),
            Some("Too many lore points spent (4/3)")
        );
        assert_eq!(verdict.details["backgrounds"], PointBreakdown::new(5, 5));
        assert_eq!(verdict.details["lore"], PointBreakdown::new(4, 3));
        assert!(!verdict.details.contains_key("virtues"));
    }

    #[test]
    fn demon_virtue_pool_overspent() {
        let table = RuleTable::preset(Archetype::Demon);
        let mut data = demon_data();
        data.advantages.virtues.insert("Self-Control".into(), 2);
        let verdict = check(&table, None, &data);
        assert_eq!(
            verdict.message.as_deref(),
            Some("Too many virtue points spent (4/3)")
        );
        assert_eq!(verdict.details["backgrounds"], PointBreakdown::new(5, 5));
        assert_eq!(verdict.details["lore"], PointBreakdown::new(3, 3));
        assert_eq!(verdict.details["virtues"], PointBreakdown::new(4, 3));
    }

    #[test]
    fn oversized_lore_and_virtues_are_rejected() {
        let table = RuleTable::preset(Archetype::Demon);
        let mut data = demon_data();
        data.advantages.lore.insert("radiance".into(), u32::MAX);
        let verdict = check(&table, None, &data);
        assert_eq!(
            verdict.message.as_deref(),
            Some("radiance exceeds maximum (4294967295/3)")
        );

        let mut data = demon_data();
        data.advantages.virtues.insert("Self-Control".into(), u32::MAX);
        let verdict = check(&table, None, &data);
        assert_eq!(
            verdict.message.as_deref(),
            Some("Self-Control exceeds maximum (4294967295/5)")
        );
    }

    #[test]
    fn demon_virtues_underspent() {
        let table = RuleTable::preset(Archetype::Demon);
        let mut data = demon_data();
        data.advantages.virtues.clear();
        let verdict = check(&table, None, &data);
        assert_eq!(
            verdict.message.as_deref(),
            Some("Please spend all virtue points (3 remaining)")
        );
        assert_eq!(verdict.details.len(), 3);
    }

    #[test]
    fn mortal_has_only_backgrounds() {
        let table = RuleTable::preset(Archetype::Mortal);
        let mut data = WizardData::default();
        data.advantages.backgrounds = vec![Background::new("Contacts", 5)];
        let verdict = check(&table, None, &data);
        assert!(verdict.valid);
        assert_eq!(verdict.details.len(), 1);
    }
}
