//! Writes mod units into parsed rules/art documents.
//!
//! Every entry point takes the document by value and hands back the new
//! state; the `_with` variants also report what happened to an observer.

use std::collections::HashSet;
use std::path::Path;

use crate::ini::{ConfigDocument, Section};
use crate::model::{Category, Faction, ModUnit, yes_no};

pub const LOCO_DRIVE: &str = "{4A582741-9839-11d1-B709-00A024DDAFD1}";
pub const LOCO_HOVER: &str = "{4A582742-9839-11d1-B709-00A024DDAFD1}";
pub const LOCO_FOOT: &str = "{4A582744-9839-11d1-B709-00A024DDAFD1}";
pub const LOCO_FLY: &str = "{4A582746-9839-11d1-B709-00A024DDAFD1}";
pub const LOCO_SHIP: &str = "{2BEA74E1-7CCA-11d3-BE14-00104B62A16C}";

const CATEGORY_ORDER: [Category; 4] = [
    Category::Infantry,
    Category::Vehicle,
    Category::Aircraft,
    Category::Structure,
];

/// Locomotor identifier for a movement-mode name. Unknown names walk.
pub fn locomotor_id(name: &str) -> &'static str {
    match name.trim().to_ascii_lowercase().as_str() {
        "foot" => LOCO_FOOT,
        "drive" | "track" | "tracked" => LOCO_DRIVE,
        "wheel" | "wheeled" => LOCO_DRIVE,
        "fly" => LOCO_FLY,
        "hover" => LOCO_HOVER,
        "ship" | "float" => LOCO_SHIP,
        _ => LOCO_FOOT,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectEvent {
    TypeListAdded {
        list: &'static str,
        index: usize,
        id: String,
    },
    TypeListSkipped {
        list: &'static str,
        id: String,
    },
    UnknownCategory {
        unit: String,
    },
    UnitDefined {
        id: String,
    },
    ArtDefined {
        id: String,
    },
    ArtSkipped {
        id: String,
    },
}

fn report(observer: &mut dyn FnMut(&InjectEvent), event: InjectEvent) {
    match &event {
        InjectEvent::TypeListAdded { list, index, id } => {
            tracing::debug!(list = *list, index = *index, id = %id, "type list entry added")
        }
        InjectEvent::TypeListSkipped { list, id } => {
            tracing::debug!(list = *list, id = %id, "type list entry already present")
        }
        InjectEvent::UnknownCategory { unit } => {
            tracing::warn!(unit = %unit, "unit has no known category, skipped")
        }
        InjectEvent::UnitDefined { id } => tracing::debug!(id = %id, "unit section written"),
        InjectEvent::ArtDefined { id } => tracing::debug!(id = %id, "art section written"),
        InjectEvent::ArtSkipped { id } => {
            tracing::warn!(id = %id, "art section exists in base config, left untouched")
        }
    }
    observer(&event);
}

pub fn inject_type_list_entries(doc: ConfigDocument, units: &[ModUnit]) -> ConfigDocument {
    inject_type_list_entries_with(doc, units, &mut |_| {})
}

/// Append each unit's id to its category's type list. Ids already present
/// anywhere in the list are skipped, so repeated calls are idempotent.
pub fn inject_type_list_entries_with(
    mut doc: ConfigDocument,
    units: &[ModUnit],
    observer: &mut dyn FnMut(&InjectEvent),
) -> ConfigDocument {
    for unit in units.iter().filter(|u| u.category == Category::Unknown) {
        report(
            observer,
            InjectEvent::UnknownCategory {
                unit: unit.internal_name.clone(),
            },
        );
    }
    for category in CATEGORY_ORDER {
        let Some(list) = category.type_list() else {
            continue;
        };
        let mut members = units.iter().filter(|u| u.category == category).peekable();
        if members.peek().is_none() {
            continue;
        }
        let mut index = doc.next_index(list);
        let section = doc.ensure_section(list);
        for unit in members {
            let id = unit.section_id();
            if section.values().any(|v| *v == id) {
                report(observer, InjectEvent::TypeListSkipped { list, id });
                continue;
            }
            section.insert(index.to_string(), id.clone());
            report(observer, InjectEvent::TypeListAdded { list, index, id });
            index += 1;
        }
    }
    doc
}

pub fn add_unit_definitions(doc: ConfigDocument, units: &[ModUnit]) -> ConfigDocument {
    add_unit_definitions_with(doc, units, &mut |_| {})
}

/// Write a complete rules section per unit, replacing any earlier one.
pub fn add_unit_definitions_with(
    mut doc: ConfigDocument,
    units: &[ModUnit],
    observer: &mut dyn FnMut(&InjectEvent),
) -> ConfigDocument {
    for unit in units {
        let id = unit.section_id();
        doc.replace_section(&id, rules_section(unit));
        report(observer, InjectEvent::UnitDefined { id });
    }
    doc
}

fn put(section: &mut Section, key: &str, value: impl ToString) {
    section.insert(key.to_string(), value.to_string());
}

fn by_faction(faction: Faction, gdi: &'static str, other: &'static str) -> &'static str {
    if faction == Faction::Gdi { gdi } else { other }
}

fn default_prerequisite(unit: &ModUnit) -> &'static str {
    match unit.category {
        Category::Infantry => by_faction(unit.faction, "GABARR", "NAHAND"),
        Category::Vehicle => by_faction(unit.faction, "GAWEAP", "NAWEAP"),
        _ => by_faction(unit.faction, "GAAIRC", "NAAIRCR"),
    }
}

fn default_weapon(category: Category) -> &'static str {
    match category {
        Category::Infantry => "M1Carbine",
        Category::Vehicle => "120mm",
        _ => "Maverick",
    }
}

fn default_locomotor(category: Category) -> &'static str {
    match category {
        Category::Vehicle => LOCO_DRIVE,
        Category::Aircraft => LOCO_FLY,
        _ => LOCO_FOOT,
    }
}

/// Rules section for one unit: overrides first, category defaults otherwise.
pub fn rules_section(unit: &ModUnit) -> Section {
    let o = &unit.rules_overrides;
    let mut s = Section::new();

    put(&mut s, "Name", o.name.as_deref().unwrap_or(&unit.display_name));
    put(&mut s, "TechLevel", o.tech_level.unwrap_or(unit.tech_level));
    put(&mut s, "Strength", o.strength.unwrap_or(unit.strength));
    put(&mut s, "Speed", o.speed.unwrap_or(unit.speed));
    let cost = o.cost.unwrap_or(unit.cost);
    put(&mut s, "Cost", cost);
    put(&mut s, "Sight", o.sight.unwrap_or(5));
    let armor = match unit.category {
        Category::Infantry => "light",
        _ => "heavy",
    };
    put(&mut s, "Armor", o.armor.as_deref().unwrap_or(armor));
    let points = if cost == 0 { 5 } else { cost.div_euclid(20) };
    put(&mut s, "Points", o.points.unwrap_or(points));
    put(&mut s, "Owner", o.owner.as_deref().unwrap_or("GDI,Nod"));
    put(
        &mut s,
        "Prerequisite",
        o.prerequisite
            .as_deref()
            .unwrap_or(default_prerequisite(unit)),
    );
    put(
        &mut s,
        "Primary",
        o.primary.as_deref().unwrap_or(default_weapon(unit.category)),
    );
    if let Some(secondary) = &o.secondary {
        put(&mut s, "Secondary", secondary);
    }

    match unit.category {
        Category::Infantry => {
            put(&mut s, "Category", "Soldier");
            put(&mut s, "Pip", "white");
            put(&mut s, "Crushable", yes_no(o.crushable.unwrap_or(true)));
            put(&mut s, "CrushSound", "InfantrySquish");
            put(&mut s, "VoiceSelect", "15-I000,15-I006,15-I010");
            put(&mut s, "VoiceMove", "15-I012,15-I016,15-I020");
            put(&mut s, "VoiceAttack", "15-I032,15-I038,15-I044");
            if let Some(elite) = &o.elite {
                put(&mut s, "Elite", elite);
            }
        }
        Category::Vehicle => {
            put(&mut s, "Category", "AFV");
            put(&mut s, "Crushable", yes_no(o.crushable.unwrap_or(false)));
            put(&mut s, "Crusher", yes_no(o.crusher.unwrap_or(true)));
            put(&mut s, "Turret", yes_no(o.turret.unwrap_or(true)));
        }
        Category::Aircraft => {
            put(&mut s, "Category", "AirPower");
            put(&mut s, "Landable", "yes");
        }
        Category::Structure => {
            put(&mut s, "Power", unit.power.saturating_sub(unit.power_drain));
            if let Some(cat) = &unit.build_category {
                put(&mut s, "BuildCat", cat);
            }
            if unit.is_factory {
                put(&mut s, "Factory", "UnitType");
            }
            put(&mut s, "Capturable", "yes");
        }
        Category::Unknown => {}
    }

    let locomotor = match &o.locomotor {
        Some(name) => locomotor_id(name),
        None => default_locomotor(unit.category),
    };
    put(&mut s, "Locomotor", locomotor);

    for (k, v) in &o.extra {
        put(&mut s, k, v.to_ini());
    }
    s
}

pub fn add_art_definitions(doc: ConfigDocument, units: &[ModUnit]) -> ConfigDocument {
    add_art_definitions_with(doc, units, &mut |_| {})
}

/// Write an art section per unit unless the base document already has one
/// under that name; base-game art is never replaced.
pub fn add_art_definitions_with(
    mut doc: ConfigDocument,
    units: &[ModUnit],
    observer: &mut dyn FnMut(&InjectEvent),
) -> ConfigDocument {
    let existing: HashSet<String> = doc.section_names().into_iter().map(String::from).collect();
    for unit in units {
        let id = unit.section_id();
        if existing.contains(&id) {
            report(observer, InjectEvent::ArtSkipped { id });
            continue;
        }
        doc.replace_section(&id, art_section(unit));
        report(observer, InjectEvent::ArtDefined { id });
    }
    doc
}

pub fn art_section(unit: &ModUnit) -> Section {
    let o = &unit.art_overrides;
    let mut s = Section::new();

    put(&mut s, "Image", unit.section_id());
    let cameo = match &o.cameo {
        Some(c) => c.to_ascii_uppercase().chars().take(8).collect(),
        None => unit.cameo_convention(),
    };
    put(&mut s, "Cameo", cameo);

    match unit.category {
        Category::Infantry => {
            put(
                &mut s,
                "Sequence",
                o.sequence.as_deref().unwrap_or("InfantrySequence"),
            );
            put(&mut s, "ActiveAnim", "Idle");
            put(&mut s, "Crawler", "no");
            put(&mut s, "Remapable", "yes");
        }
        Category::Vehicle => {
            put(&mut s, "Voxel", yes_no(o.voxel.unwrap_or(false)));
            put(&mut s, "Shadow", "yes");
            put(&mut s, "Remapable", "yes");
            put(&mut s, "Normalized", "yes");
        }
        Category::Aircraft => {
            put(&mut s, "Voxel", yes_no(o.voxel.unwrap_or(false)));
            put(&mut s, "Shadow", "yes");
            put(&mut s, "Rotors", "yes");
            put(&mut s, "PitchSpeed", "0.5");
        }
        Category::Structure => {
            let foundation = unit.foundation().map_or("2x2", |f| f.as_str());
            put(&mut s, "Foundation", foundation);
            if let Some(stem) = unit
                .files
                .buildup
                .as_deref()
                .and_then(|p| Path::new(p).file_stem())
            {
                put(&mut s, "Buildup", stem.to_string_lossy().to_ascii_uppercase());
            }
            put(&mut s, "Bib", yes_no(unit.has_bib));
        }
        Category::Unknown => {}
    }
    put(&mut s, "SecondaryFireOffset", "0,0,0");

    for (k, v) in &o.extra {
        put(&mut s, k, v.to_ini());
    }
    s
}
