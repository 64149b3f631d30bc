//! Built-in rule tables for the supported archetypes.
//!
//! These produce the same [`RuleTable`] a JSON override with the book values
//! would, but without requiring a file.

use std::collections::BTreeMap;

use wod_core::{Archetype, StepId};

use crate::affinity::AffinityKind;
use crate::rules::{
    AdvantageRules, AffinityRules, BackgroundRules, ConceptField, ConceptRules,
    EnlightenmentRules, FaithRules, FieldKind, FreebieRules, LoreRules, MeritFlawRules,
    PriorityPools, RuleTable, SpendTable, SphereRules, TraitCategory, TraitGroupRules,
    VirtueRules, WillpowerRules,
};

/// Nine sphere keys, alphabetical.
pub const SPHERE_KEYS: [&str; 9] = [
    "correspondence",
    "entropy",
    "forces",
    "life",
    "matter",
    "mind",
    "prime",
    "spirit",
    "time",
];

const MAGE_ABILITIES: [(&str, &[&str]); 3] = [
    (
        "talents",
        &[
            "Alertness", "Art", "Athletics", "Awareness", "Brawl", "Empathy", "Expression",
            "Intimidation", "Leadership", "Streetwise", "Subterfuge",
        ],
    ),
    (
        "skills",
        &[
            "Crafts", "Drive", "Etiquette", "Firearms", "Martial Arts", "Meditation", "Melee",
            "Research", "Stealth", "Survival", "Technology",
        ],
    ),
    (
        "knowledges",
        &[
            "Academics", "Computer", "Cosmology", "Enigmas", "Esoterica", "Investigation", "Law",
            "Medicine", "Occult", "Politics", "Science",
        ],
    ),
];

const CLASSIC_ABILITIES: [(&str, &[&str]); 3] = [
    (
        "talents",
        &[
            "Alertness", "Athletics", "Awareness", "Brawl", "Empathy", "Expression",
            "Intimidation", "Leadership", "Streetwise", "Subterfuge",
        ],
    ),
    (
        "skills",
        &[
            "Animal Ken", "Crafts", "Drive", "Etiquette", "Firearms", "Melee", "Performance",
            "Security", "Stealth", "Survival",
        ],
    ),
    (
        "knowledges",
        &[
            "Academics", "Computer", "Finance", "Investigation", "Law", "Linguistics", "Medicine",
            "Occult", "Politics", "Science",
        ],
    ),
];

const AWAKENED_BACKGROUNDS: [&str; 27] = [
    "Allies",
    "Alternate Identity",
    "Arcane",
    "Avatar",
    "Backup",
    "Certification",
    "Contacts",
    "Cult",
    "Destiny",
    "Device",
    "Dream",
    "Enhancement",
    "Fame",
    "Influence",
    "Library",
    "Mentor",
    "Node",
    "Patron",
    "Rank",
    "Requisitions",
    "Resources",
    "Retainers",
    "Sanctum",
    "Secret Weapons",
    "Spies",
    "Status",
    "Wonder",
];

/// Technocracy agent (Mage: the Ascension, Technocracy side).
///
/// Spheres use the Technocracy's names for Correspondence, Prime and Spirit.
/// The chosen Convention decides the affinity spheres.
pub fn technocrat() -> RuleTable {
    let mut fields = identity_fields();
    fields.push(field("convention", "Convention", FieldKind::Select, true));
    fields.push(field("amalgam", "Amalgam", FieldKind::Text, false));
    fields.push(field("eidolon", "Eidolon", FieldKind::Text, false));

    let affinity = AffinityRules {
        field: "convention".to_string(),
        kind: AffinityKind::Convention,
        spheres: affinity_map(&[
            ("Iteration X", &["forces", "matter", "time"]),
            ("New World Order", &["mind", "correspondence"]),
            ("Progenitors", &["life", "prime"]),
            ("Syndicate", &["entropy", "mind", "prime"]),
            ("Void Engineers", &["spirit", "correspondence", "forces"]),
        ]),
    };

    let sphere_names = sphere_names(&[
        ("correspondence", "Data"),
        ("prime", "Primal Utility"),
        ("spirit", "Dimensional Science"),
    ]);

    awakened(Archetype::Technocrat, fields, affinity, sphere_names)
}

/// Traditions mage (Mage: the Ascension).
///
/// The chosen Tradition decides the affinity spheres.
pub fn mage() -> RuleTable {
    let mut fields = identity_fields();
    fields.push(field("tradition", "Tradition", FieldKind::Select, true));
    fields.push(field("cabal", "Cabal", FieldKind::Text, false));
    fields.push(field("essence", "Essence", FieldKind::Text, false));

    let affinity = AffinityRules {
        field: "tradition".to_string(),
        kind: AffinityKind::Tradition,
        spheres: affinity_map(&[
            ("Akashic Brotherhood", &["mind", "life"]),
            ("Celestial Chorus", &["prime", "forces", "spirit"]),
            ("Cult of Ecstasy", &["time", "life", "mind"]),
            ("Dreamspeakers", &["spirit", "forces", "life", "matter"]),
            ("Euthanatos", &["entropy", "life", "spirit"]),
            ("Order of Hermes", &["forces"]),
            ("Sons of Ether", &["matter", "forces", "prime"]),
            ("Verbena", &["life", "forces"]),
            ("Virtual Adepts", &["correspondence", "forces"]),
        ]),
    };

    awakened(Archetype::Mage, fields, affinity, sphere_names(&[]))
}

/// Ordinary human. No merits and flaws step and a larger freebie pool.
pub fn mortal() -> RuleTable {
    RuleTable {
        archetype: Archetype::Mortal,
        steps: vec![
            StepId::Concept,
            StepId::Attributes,
            StepId::Abilities,
            StepId::Advantages,
            StepId::Freebies,
            StepId::Review,
        ],
        concept: ConceptRules {
            fields: identity_fields(),
            affinity: None,
        },
        attributes: attribute_rules(),
        abilities: ability_rules(&CLASSIC_ABILITIES),
        advantages: AdvantageRules {
            backgrounds: Some(BackgroundRules {
                points: 5,
                max_per_background: 5,
                available: strings(&[
                    "Allies",
                    "Contacts",
                    "Fame",
                    "Influence",
                    "Mentor",
                    "Resources",
                    "Status",
                ]),
                double_cost: Vec::new(),
            }),
            spheres: None,
            enlightenment: None,
            lore: None,
            virtues: None,
            faith: None,
            willpower: WillpowerRules { starting: 1 },
        },
        merits_flaws: None,
        freebies: FreebieRules {
            total: 21,
            costs: SpendTable {
                attribute: Some(5),
                ability: Some(2),
                background: Some(1),
                willpower: Some(1),
                ..SpendTable::default()
            },
            limits: SpendTable {
                attribute: Some(5),
                ability: Some(5),
                background: Some(5),
                willpower: Some(10),
                ..SpendTable::default()
            },
        },
    }
}

/// One of the Fallen (Demon: the Fallen).
///
/// Lore paths replace spheres; virtues and Faith are bought at creation.
pub fn demon() -> RuleTable {
    let mut fields = identity_fields();
    fields.push(field("house", "House", FieldKind::Select, false));
    fields.push(field(
        "apocalypticForm",
        "Apocalyptic Form",
        FieldKind::Select,
        false,
    ));

    RuleTable {
        archetype: Archetype::Demon,
        steps: full_steps(),
        concept: ConceptRules {
            fields,
            affinity: None,
        },
        attributes: attribute_rules(),
        abilities: ability_rules(&CLASSIC_ABILITIES),
        advantages: AdvantageRules {
            backgrounds: Some(BackgroundRules {
                points: 5,
                max_per_background: 5,
                available: strings(&[
                    "Allies",
                    "Contacts",
                    "Eminence",
                    "Fame",
                    "Followers",
                    "Influence",
                    "Legacy",
                    "Mentor",
                    "Pacts",
                    "Paragon",
                    "Resources",
                ]),
                double_cost: Vec::new(),
            }),
            spheres: None,
            enlightenment: None,
            lore: Some(LoreRules {
                points: 3,
                max_at_creation: 3,
            }),
            virtues: Some(VirtueRules {
                starting: 1,
                points: 3,
                max: 5,
                available: strings(&["Conscience", "Self-Control", "Courage"]),
            }),
            faith: Some(FaithRules { starting: 3 }),
            willpower: WillpowerRules { starting: 0 },
        },
        merits_flaws: Some(MeritFlawRules::default()),
        freebies: FreebieRules {
            total: 15,
            costs: SpendTable {
                attribute: Some(5),
                ability: Some(2),
                background: Some(1),
                lore: Some(7),
                faith: Some(6),
                virtue: Some(2),
                willpower: Some(1),
                ..SpendTable::default()
            },
            limits: SpendTable {
                attribute: Some(5),
                ability: Some(5),
                background: Some(5),
                lore: Some(5),
                faith: Some(10),
                virtue: Some(5),
                willpower: Some(10),
                ..SpendTable::default()
            },
        },
    }
}

/// Shared shape of the two sphere-using archetypes.
fn awakened(
    archetype: Archetype,
    fields: Vec<ConceptField>,
    affinity: AffinityRules,
    sphere_names: BTreeMap<String, String>,
) -> RuleTable {
    RuleTable {
        archetype,
        steps: full_steps(),
        concept: ConceptRules {
            fields,
            affinity: Some(affinity),
        },
        attributes: attribute_rules(),
        abilities: ability_rules(&MAGE_ABILITIES),
        advantages: AdvantageRules {
            backgrounds: Some(BackgroundRules {
                points: 7,
                max_per_background: 5,
                available: strings(&AWAKENED_BACKGROUNDS),
                double_cost: strings(&["Enhancement", "Device"]),
            }),
            spheres: Some(SphereRules {
                points: 6,
                available: sphere_names,
            }),
            enlightenment: Some(EnlightenmentRules { starting: 1 }),
            lore: None,
            virtues: None,
            faith: None,
            willpower: WillpowerRules { starting: 5 },
        },
        merits_flaws: Some(MeritFlawRules::default()),
        freebies: FreebieRules {
            total: 15,
            costs: SpendTable {
                attribute: Some(5),
                ability: Some(2),
                background: Some(1),
                sphere: Some(7),
                enlightenment: Some(4),
                willpower: Some(1),
                ..SpendTable::default()
            },
            limits: SpendTable {
                attribute: Some(5),
                ability: Some(5),
                background: Some(5),
                sphere: Some(3),
                enlightenment: Some(3),
                willpower: Some(10),
                ..SpendTable::default()
            },
        },
    }
}

fn full_steps() -> Vec<StepId> {
    StepId::ALL.to_vec()
}

fn identity_fields() -> Vec<ConceptField> {
    vec![
        field("name", "Name", FieldKind::Text, true),
        field("concept", "Concept", FieldKind::Text, true),
        field("nature", "Nature", FieldKind::Select, true),
        field("demeanor", "Demeanor", FieldKind::Select, true),
    ]
}

fn field(name: &str, label: &str, kind: FieldKind, required: bool) -> ConceptField {
    ConceptField {
        name: name.to_string(),
        label: label.to_string(),
        kind,
        required,
    }
}

fn attribute_rules() -> TraitGroupRules {
    TraitGroupRules {
        priorities: PriorityPools {
            primary: 7,
            secondary: 5,
            tertiary: 3,
        },
        categories: vec![
            category("physical", &["Strength", "Dexterity", "Stamina"]),
            category("social", &["Charisma", "Manipulation", "Appearance"]),
            category("mental", &["Perception", "Intelligence", "Wits"]),
        ],
        starting: 1,
        max_at_creation: 5,
    }
}

fn ability_rules(lists: &[(&str, &[&str]); 3]) -> TraitGroupRules {
    TraitGroupRules {
        priorities: PriorityPools {
            primary: 13,
            secondary: 9,
            tertiary: 5,
        },
        categories: lists
            .iter()
            .map(|(name, traits)| category(name, traits))
            .collect(),
        starting: 0,
        max_at_creation: 3,
    }
}

fn category(name: &str, traits: &[&str]) -> TraitCategory {
    TraitCategory {
        name: name.to_string(),
        traits: strings(traits),
    }
}

fn affinity_map(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(name, spheres)| (name.to_string(), strings(spheres)))
        .collect()
}

/// Display names for all nine spheres, with the given renames applied.
fn sphere_names(renames: &[(&str, &str)]) -> BTreeMap<String, String> {
    SPHERE_KEYS
        .iter()
        .map(|key| {
            let display = renames
                .iter()
                .find(|(k, _)| k == key)
                .map_or_else(|| capitalize(key), |(_, name)| name.to_string());
            (key.to_string(), display)
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wod_core::{PriorityTier, SpendKind};

    #[test]
    fn technocrat_preset() {
        let t = technocrat();
        assert_eq!(t.archetype, Archetype::Technocrat);
        assert_eq!(t.steps.len(), 7);
        assert_eq!(t.attributes.priorities.allowed(PriorityTier::Primary), 7);
        assert_eq!(t.abilities.priorities.allowed(PriorityTier::Tertiary), 5);
        assert_eq!(t.freebies.total, 15);
        assert_eq!(t.freebie_cost(SpendKind::Sphere), Some(7));
        assert_eq!(t.freebie_limit(SpendKind::Enlightenment), Some(3));
        assert_eq!(t.sphere_name("prime"), "Primal Utility");
        assert_eq!(t.sphere_name("forces"), "Forces");

        let affinity = t.concept.affinity.as_ref().unwrap();
        assert_eq!(affinity.field, "convention");
        assert_eq!(affinity.spheres["Progenitors"], vec!["life", "prime"]);
    }

    #[test]
    fn mage_preset() {
        let m = mage();
        assert!(m.concept.fields.iter().any(|f| f.name == "tradition" && f.required));
        assert_eq!(m.sphere_name("spirit"), "Spirit");
        let affinity = m.concept.affinity.as_ref().unwrap();
        assert_eq!(affinity.kind, AffinityKind::Tradition);
        assert_eq!(affinity.spheres["Order of Hermes"], vec!["forces"]);
    }

    #[test]
    fn mortal_preset() {
        let m = mortal();
        assert!(!m.has_step(StepId::MeritsFlaws));
        assert!(m.merits_flaws.is_none());
        assert_eq!(m.freebies.total, 21);
        assert_eq!(m.advantages.willpower.starting, 1);
        assert_eq!(m.freebie_cost(SpendKind::Sphere), None);
        assert_eq!(m.advantages.backgrounds.as_ref().unwrap().points, 5);
    }

    #[test]
    fn demon_preset() {
        let d = demon();
        let virtues = d.advantages.virtues.as_ref().unwrap();
        assert_eq!((virtues.starting, virtues.points, virtues.max), (1, 3, 5));
        assert_eq!(d.advantages.lore.unwrap().points, 3);
        assert_eq!(d.advantages.faith.unwrap().starting, 3);
        assert_eq!(d.freebie_cost(SpendKind::Faith), Some(6));
        assert_eq!(d.freebie_limit(SpendKind::Lore), Some(5));
        assert_eq!(d.freebie_limit(SpendKind::Virtue), Some(5));
        assert!(d.advantages.backgrounds.as_ref().unwrap().double_cost.is_empty());
    }

    #[test]
    fn presets_share_attribute_layout() {
        for archetype in Archetype::ALL {
            let table = RuleTable::preset(archetype);
            let names: Vec<&str> = table.attributes.category_names().collect();
            assert_eq!(names, ["physical", "social", "mental"], "{archetype}");
            assert_eq!(table.attributes.starting, 1);
            assert_eq!(table.abilities.starting, 0);
            assert_eq!(table.abilities.categories.len(), 3);
        }
    }
}
