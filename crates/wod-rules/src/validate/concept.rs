//! Concept: required identity fields.

use wod_core::ConceptData;

use super::Verdict;
use crate::rules::RuleTable;

/// First required field that is blank, in declaration order.
pub(super) fn check(table: &RuleTable, concept: &ConceptData) -> Verdict {
    table
        .concept
        .fields
        .iter()
        .find(|field| field.required && concept.is_blank(&field.name))
        .map_or_else(Verdict::pass, |field| {
            Verdict::fail(format!("{} is required", field.label))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wod_core::Archetype;

    fn mortal_concept() -> ConceptData {
        let mut concept = ConceptData::default();
        concept.set("name", "Jo");
        concept.set("concept", "Cabbie");
        concept.set("nature", "Survivor");
        concept.set("demeanor", "Loner");
        concept
    }

    #[test]
    fn complete_concept_passes() {
        let table = RuleTable::preset(Archetype::Mortal);
        assert!(check(&table, &mortal_concept()).valid);
    }

    #[test]
    fn first_blank_field_wins() {
        let table = RuleTable::preset(Archetype::Mortal);
        let mut concept = mortal_concept();
        concept.set("nature", "   ");
        concept.set_raw("demeanor", json!(null));
        let verdict = check(&table, &concept);
        assert_eq!(verdict.message.as_deref(), Some("Nature is required"));
    }

    #[test]
    fn optional_fields_do_not_matter() {
        let table = RuleTable::preset(Archetype::Technocrat);
        let mut concept = mortal_concept();
        concept.set("convention", "Syndicate");
        concept.set("amalgam", "");
        concept.set("favourite colour", "");
        assert!(check(&table, &concept).valid);

        concept.set("convention", "");
        assert_eq!(
            check(&table, &concept).message.as_deref(),
            Some("Convention is required")
        );
    }

    #[test]
    fn non_string_values_count_as_filled() {
        let table = RuleTable::preset(Archetype::Mortal);
        let mut concept = mortal_concept();
        concept.set_raw("name", json!(7));
        assert!(check(&table, &concept).valid);
    }
}
